use crate::adb::Adb;
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use log::{debug, info, warn};
use std::process::Child;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One screen-recording run on a device.
///
/// The local adb wrapper and the on-device `screenrecord` live and die
/// together: stopping the wrapper is how the recorder learns to finalize
/// the file. The session polls the wrapper and watches the Ctrl-C flag;
/// the user interrupt is the normal way a recording ends.
pub struct RecordingSession {
    child: Child,
    device_id: String,
    started: DateTime<Local>,
    interrupted: Arc<AtomicBool>,
    poll_interval: Duration,
    settle_delay: Duration,
}

impl RecordingSession {
    /// Register the interrupt flag and start the on-device recorder.
    pub fn start(adb: &Adb, device_id: &str) -> Result<Self> {
        let interrupted = register_interrupt_flag()?;
        let child = adb.spawn_screenrecord(device_id)?;
        info!("recording started on {}", device_id);

        Ok(RecordingSession {
            child,
            device_id: device_id.to_string(),
            started: Local::now(),
            interrupted,
            poll_interval: Duration::from_millis(adb.config().poll_interval_ms),
            settle_delay: Duration::from_millis(adb.config().settle_delay_ms),
        })
    }

    /// Block until the user interrupts or the recorder stops by itself,
    /// then shut down gracefully. Returns the recorded wall-clock seconds.
    ///
    /// A recorder that dies without being asked means the device could not
    /// record at all (screenrecord needs Android 4.4; emulators often lack
    /// it), which is unrecoverable.
    pub fn wait(mut self) -> Result<i64> {
        loop {
            if self.interrupted.load(Ordering::SeqCst) {
                debug!("interrupt received, stopping recorder");
                break;
            }

            match self.child.try_wait()? {
                None => thread::sleep(self.poll_interval),
                Some(status) => {
                    // Ctrl-C reaches the adb child through the terminal's
                    // process group before our flag flips; re-check once
                    // before calling the exit a failure.
                    thread::sleep(self.poll_interval);
                    if self.interrupted.load(Ordering::SeqCst) {
                        break;
                    }
                    if status.success() {
                        // screenrecord's own time limit ran out
                        info!("recorder on {} stopped on its own", self.device_id);
                        break;
                    }
                    warn!("recorder on {} exited with {}", self.device_id, status);
                    return Err(Error::RecordingUnsupported);
                }
            }
        }

        self.stop()
    }

    fn stop(mut self) -> Result<i64> {
        if self.child.try_wait()?.is_none() {
            terminate(&mut self.child).map_err(|e| {
                warn!("could not signal recorder: {}", e);
                Error::RecordingUnsupported
            })?;
        }
        self.child.wait()?;

        // The on-device MP4 gets its index written asynchronously after the
        // recorder is signalled; pulling too early yields a broken file.
        thread::sleep(self.settle_delay);

        let elapsed = Local::now()
            .signed_duration_since(self.started)
            .num_seconds();
        info!("recording on {} finished after {}s", self.device_id, elapsed);
        Ok(elapsed)
    }
}

#[cfg(unix)]
fn register_interrupt_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&flag))
        .map_err(|e| Error::Command(format!("could not install Ctrl-C handler: {}", e)))?;
    Ok(flag)
}

#[cfg(not(unix))]
fn register_interrupt_flag() -> Result<Arc<AtomicBool>> {
    // No flag registration off Unix; Ctrl-C tears the process down and the
    // temp-path guards still clean up local files.
    Ok(Arc::new(AtomicBool::new(false)))
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM)
        .map_err(|e| std::io::Error::from_raw_os_error(e as i32))
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> std::io::Result<()> {
    child.kill()
}
