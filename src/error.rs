use std::fmt;
use thiserror::Error;

/// Pipeline stage that a failed transcoder invocation belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Palette,
    Gif,
    Video,
    Optimize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Palette => write!(f, "palette generation"),
            Stage::Gif => write!(f, "GIF encoding"),
            Stage::Video => write!(f, "video encoding"),
            Stage::Optimize => write!(f, "GIF optimization"),
        }
    }
}

/// Everything that can go wrong between `adb devices` and the finished file.
#[derive(Debug, Error)]
pub enum Error {
    /// A required external tool is not on PATH.
    #[error("this program requires {0} in PATH")]
    MissingTool(String),

    /// The installed ffmpeg lacks a codec or filter we cannot work without.
    #[error("installed ffmpeg is missing required {0}")]
    MissingCapability(String),

    /// ffmpeg exists but its probe commands failed outright.
    #[error("incompatible ffmpeg version detected, please update to a newer ffmpeg")]
    IncompatibleFfmpeg,

    /// No usable device in `adb devices` output.
    #[error("no adb devices found, connect one")]
    NoDevice,

    /// The on-device recorder died before the user asked it to stop.
    #[error("recording has failed, it's possible that your device does not support recording")]
    RecordingUnsupported,

    /// `adb pull` or the remote cleanup exited non-zero.
    #[error("could not download recording from the device: {0}")]
    TransferFailed(String),

    /// A transcoder invocation exited non-zero.
    #[error("{stage} failed: {message}")]
    TranscodeFailed { stage: Stage, message: String },

    /// Bad destination filename or a nonsensical flag combination.
    #[error("{0}")]
    Usage(String),

    /// An external command could not be spawned or produced garbage.
    #[error("command failed: {0}")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this failure. Each fatal class gets its own
    /// code so scripts can tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) => 2,
            Error::MissingTool(_) => 3,
            Error::MissingCapability(_) | Error::IncompatibleFfmpeg => 4,
            Error::NoDevice => 5,
            Error::RecordingUnsupported => 6,
            Error::TransferFailed(_) => 7,
            Error::TranscodeFailed { .. } => 8,
            Error::Command(_) | Error::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_fatal_class() {
        let errors = [
            Error::Usage("x".into()),
            Error::MissingTool("adb".into()),
            Error::MissingCapability("gif encoder".into()),
            Error::NoDevice,
            Error::RecordingUnsupported,
            Error::TransferFailed("x".into()),
            Error::TranscodeFailed {
                stage: Stage::Gif,
                message: "x".into(),
            },
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c != 0));
    }

    #[test]
    fn incompatible_ffmpeg_shares_the_capability_code() {
        assert_eq!(
            Error::IncompatibleFfmpeg.exit_code(),
            Error::MissingCapability("libx264 encoder".into()).exit_code()
        );
    }
}
