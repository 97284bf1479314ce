pub mod controller;
pub mod loop_worker;

pub use controller::{CaptureController, SessionHandle};
pub use loop_worker::{CapturedFrame, FrameSource};
