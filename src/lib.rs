mod config;
mod device;
mod error;

// pipeline modules
pub mod adb;
pub mod output;
pub mod select;
pub mod session;
pub mod transcode;
pub mod transfer;
pub mod utils;

// main types
pub use adb::Adb;
pub use config::{Config, ConfigBuilder};
pub use device::{Device, DeviceStatus};
pub use error::{Error, Result, Stage};
pub use output::{OutputKind, OutputRequest};
pub use session::RecordingSession;
pub use transcode::{Capabilities, Ffmpeg};

pub mod prelude {
    pub use super::{
        Adb, Config, ConfigBuilder, Device, DeviceStatus, Error, Ffmpeg, OutputKind,
        OutputRequest, RecordingSession, Result,
    };
}
