//! Host capability adapters.

pub mod idle;
pub mod visibility;

pub use idle::{FrameIdleYield, IdleSlotGrantor, TimerFallbackYield, TokioIdleYield};
pub use visibility::{AlwaysVisible, VisibilityFlag};
