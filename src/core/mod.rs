//! Core types, frame inputs and the camera rig

pub mod types;
pub mod error;
pub mod logging;
pub mod time;
pub mod audio;
pub mod camera;
pub mod camera_rig;

pub use types::*;
pub use error::Error;
pub use time::{FrameClock, FrameInput};
pub use audio::{AudioBand, AudioConfig, AudioEnvelope, AudioResponse};
pub use camera::CameraPose;
pub use camera_rig::{CameraRig, CameraRigConfig, Obstacle};
