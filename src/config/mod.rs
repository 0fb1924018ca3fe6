//! Configuration models for loaders, the idle scheduler, and timeouts.

pub mod preload;

pub use preload::{IdleConfig, PreloadConfig};
