use crate::config::Config;
use crate::device::{parse_devices, Device};
use crate::error::{Error, Result};
use crate::utils::which;
use log::{debug, info, trace, warn};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output};

/// Thin wrapper around the adb executable.
#[derive(Debug, Clone)]
pub struct Adb {
    path: PathBuf,
    config: Config,
}

impl Adb {
    /// Resolve adb on the search path and wrap it.
    pub fn new(config: &Config) -> Result<Self> {
        let path = which(&config.adb)
            .ok_or_else(|| Error::MissingTool(config.adb.display().to_string()))?;
        debug!("using adb at {:?}", path);
        Ok(Adb {
            path,
            config: config.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        trace!("adb {:?}", args);
        Command::new(&self.path)
            .args(args)
            .output()
            .map_err(|e| Error::Command(format!("could not execute adb: {}", e)))
    }

    /// List devices currently usable for recording.
    pub fn devices(&self) -> Result<Vec<Device>> {
        let output = self.run(&["devices", "-l"])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Command(format!("adb devices failed: {}", stderr)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("adb devices output: {}", stdout);

        let devices = parse_devices(&stdout);
        info!("found {} usable adb device(s)", devices.len());
        Ok(devices)
    }

    /// Run a shell command on the device and wait for it.
    pub fn shell(&self, device_id: &str, command: &str) -> Result<String> {
        let output = self.run(&["-s", device_id, "shell", command])?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(Error::Command(format!(
                "adb shell '{}' failed: {}",
                command, stderr
            )));
        }
        if !stderr.is_empty() {
            warn!("adb shell '{}' wrote to stderr: {}", command, stderr);
        }

        Ok(stdout)
    }

    /// Pull a file from the device to a local path.
    pub fn pull(&self, device_id: &str, remote: &str, local: &Path) -> Result<()> {
        info!("pulling {} -> {:?}", remote, local);
        let local = local
            .to_str()
            .ok_or_else(|| Error::Command(format!("non-UTF-8 local path: {:?}", local)))?;
        let output = self.run(&["-s", device_id, "pull", remote, local])?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Command(format!("adb pull failed: {}", stderr)));
        }

        debug!("pulled {} from {}", remote, device_id);
        Ok(())
    }

    /// Start `screenrecord` on the device, writing to the configured remote
    /// path. Returns the local wrapper process; the caller owns its lifetime.
    pub fn spawn_screenrecord(&self, device_id: &str) -> Result<Child> {
        let command = format!(
            "screenrecord --bit-rate {} {}",
            self.config.bit_rate, self.config.remote_path
        );
        debug!("starting recorder on {}: {}", device_id, command);

        Command::new(&self.path)
            .args(["-s", device_id, "shell", &command])
            .spawn()
            .map_err(|e| Error::Command(format!("could not start adb screenrecord: {}", e)))
    }
}
