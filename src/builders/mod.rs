//! Builders to construct preloaders from configuration and host ports.

pub mod preloader_builder;

pub use preloader_builder::PreloaderBuilder;
