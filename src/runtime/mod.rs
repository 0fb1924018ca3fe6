//! Runtime adapters and API surface.

pub mod api;
pub mod tokio_spawner;

pub use api::{submit_request, PreloadAck, PreloadRequest};
pub use tokio_spawner::TokioSpawner;
