//! Infrastructure adapters for host capabilities and resource fetching.

pub mod fetcher;
pub mod host;

pub use host::{AlwaysVisible, FrameIdleYield, IdleSlotGrantor, TimerFallbackYield, TokioIdleYield, VisibilityFlag};
