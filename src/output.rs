use crate::error::{Error, Result};
use std::path::PathBuf;

pub const DEFAULT_SIZE: u32 = 480;
pub const DEFAULT_VIDEO_QUALITY: u32 = 24;
const DEFAULT_GIF_FPS: u32 = 15;
const DEFAULT_VIDEO_FPS: u32 = 60;

/// Output format, chosen by destination extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Gif,
    Video,
}

/// What the user asked for, fixed once at startup.
#[derive(Debug, Clone)]
pub struct OutputRequest {
    pub dest: PathBuf,
    pub kind: OutputKind,
    /// output frame rate
    pub fps: u32,
    /// short-side pixel size; the long side follows the aspect ratio
    pub size: u32,
    /// x264 CRF, lower is better (video mode only)
    pub quality: u32,
}

impl OutputRequest {
    /// Build a request from the destination path and optional overrides.
    /// The extension picks the format and the frame-rate default: 15 fps
    /// for GIF, 60 for MP4.
    pub fn new(dest: PathBuf, fps: Option<u32>, size: u32, quality: u32) -> Result<Self> {
        let extension = dest
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());

        let kind = match extension.as_deref() {
            Some("gif") => OutputKind::Gif,
            Some("mp4") => OutputKind::Video,
            _ => {
                return Err(Error::Usage(format!(
                    "filename must end with .gif or .mp4: {}",
                    dest.display()
                )))
            }
        };

        let fps = fps.unwrap_or(match kind {
            OutputKind::Gif => DEFAULT_GIF_FPS,
            OutputKind::Video => DEFAULT_VIDEO_FPS,
        });

        Ok(OutputRequest {
            dest,
            kind,
            fps,
            size,
            quality,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults(dest: &str) -> Result<OutputRequest> {
        OutputRequest::new(PathBuf::from(dest), None, DEFAULT_SIZE, DEFAULT_VIDEO_QUALITY)
    }

    #[test]
    fn gif_destination_defaults_to_15_fps() {
        let request = defaults("clip.gif").unwrap();
        assert_eq!(request.kind, OutputKind::Gif);
        assert_eq!(request.fps, 15);
        assert_eq!(request.size, 480);
    }

    #[test]
    fn mp4_destination_defaults_to_60_fps() {
        let request = defaults("clip.mp4").unwrap();
        assert_eq!(request.kind, OutputKind::Video);
        assert_eq!(request.fps, 60);
        assert_eq!(request.quality, 24);
    }

    #[test]
    fn extension_matching_is_case_insensitive() {
        assert_eq!(defaults("CLIP.GIF").unwrap().kind, OutputKind::Gif);
        assert_eq!(defaults("clip.Mp4").unwrap().kind, OutputKind::Video);
    }

    #[test]
    fn explicit_fps_wins_over_the_default() {
        let request =
            OutputRequest::new(PathBuf::from("clip.gif"), Some(30), 320, 24).unwrap();
        assert_eq!(request.fps, 30);
        assert_eq!(request.size, 320);
    }

    #[test]
    fn other_extensions_are_rejected() {
        for bad in ["clip.webm", "clip", "clip.mp4.bak", ".mp4"] {
            let err = defaults(bad).unwrap_err();
            assert!(matches!(err, Error::Usage(_)), "accepted {:?}", bad);
        }
    }
}
