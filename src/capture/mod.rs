// # Capture Module
//
// Camera abstraction, countdown scanner and crop editor.

pub mod crop;
pub mod device;
pub mod scanner;
pub mod still;

pub use crop::{CropEditor, CropRegion};
pub use device::{
    CameraDevice, CapturedFrame, Facing, FrameEncoder, JpegFrameEncoder, StreamRequest, VideoStream,
};
pub use scanner::{Alerter, CroppedImage, LogAlerter, Scanner, ScannerConfig, ScannerState};
pub use still::StillCamera;
