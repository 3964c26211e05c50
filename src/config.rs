use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recorder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// adb executable name or path
    pub adb: PathBuf,
    /// ffmpeg executable name or path
    pub ffmpeg: PathBuf,
    /// gifsicle executable name or path (optional optimizer)
    pub gifsicle: PathBuf,
    /// screenrecord bit rate in bits per second
    pub bit_rate: u32,
    /// temporary recording path on the device
    pub remote_path: String,
    /// recorder liveness poll interval (milliseconds)
    pub poll_interval_ms: u64,
    /// wait after stopping before pulling, so the on-device container
    /// index finishes writing (milliseconds)
    pub settle_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            adb: PathBuf::from("adb"),
            ffmpeg: PathBuf::from("ffmpeg"),
            gifsicle: PathBuf::from("gifsicle"),
            bit_rate: 8_000_000,
            remote_path: "/sdcard/tmp_record.mp4".to_string(),
            poll_interval_ms: 200,
            settle_delay_ms: 2000,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    adb: Option<PathBuf>,
    ffmpeg: Option<PathBuf>,
    gifsicle: Option<PathBuf>,
    bit_rate: Option<u32>,
    remote_path: Option<String>,
    poll_interval_ms: Option<u64>,
    settle_delay_ms: Option<u64>,
}

impl ConfigBuilder {
    /// Set the adb executable name or path.
    pub fn adb(mut self, path: impl Into<PathBuf>) -> Self {
        self.adb = Some(path.into());
        self
    }

    /// Set the ffmpeg executable name or path.
    pub fn ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg = Some(path.into());
        self
    }

    /// Set the gifsicle executable name or path.
    pub fn gifsicle(mut self, path: impl Into<PathBuf>) -> Self {
        self.gifsicle = Some(path.into());
        self
    }

    /// Set the screenrecord bit rate.
    pub fn bit_rate(mut self, bit_rate: u32) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    /// Set the temporary recording path on the device.
    pub fn remote_path(mut self, path: &str) -> Self {
        self.remote_path = Some(path.to_string());
        self
    }

    /// Set the recorder poll interval.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    /// Set the post-stop settle delay.
    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = Some(ms);
        self
    }

    /// Build the configuration, defaulting anything unset.
    pub fn build(self) -> Config {
        let default = Config::default();

        Config {
            adb: self.adb.unwrap_or(default.adb),
            ffmpeg: self.ffmpeg.unwrap_or(default.ffmpeg),
            gifsicle: self.gifsicle.unwrap_or(default.gifsicle),
            bit_rate: self.bit_rate.unwrap_or(default.bit_rate),
            remote_path: self.remote_path.unwrap_or(default.remote_path),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(default.poll_interval_ms),
            settle_delay_ms: self.settle_delay_ms.unwrap_or(default.settle_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_default_config() {
        let built = Config::builder().build();
        let default = Config::default();
        assert_eq!(built.adb, default.adb);
        assert_eq!(built.bit_rate, default.bit_rate);
        assert_eq!(built.remote_path, default.remote_path);
        assert_eq!(built.settle_delay_ms, default.settle_delay_ms);
    }

    #[test]
    fn builder_overrides_stick() {
        let config = Config::builder()
            .adb("/opt/platform-tools/adb")
            .bit_rate(4_000_000)
            .poll_interval_ms(50)
            .build();
        assert_eq!(config.adb, PathBuf::from("/opt/platform-tools/adb"));
        assert_eq!(config.bit_rate, 4_000_000);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.ffmpeg, PathBuf::from("ffmpeg"));
    }
}
