use crate::adb::Adb;
use crate::error::{Error, Result};
use crate::utils::TempPath;
use log::debug;

/// Pull the finished recording into a guarded local temp file and delete
/// the on-device copy.
///
/// The returned [`TempPath`] removes the local file when dropped, so the
/// download survives exactly as long as the caller holds it, whatever the
/// transcode step does afterwards. Any non-zero adb exit is a transfer
/// failure; there are no retries.
pub fn download_recording(adb: &Adb, device_id: &str) -> Result<TempPath> {
    let local = TempPath::with_extension("mp4");
    let remote = adb.config().remote_path.clone();

    adb.pull(device_id, &remote, local.as_path())
        .map_err(|e| Error::TransferFailed(e.to_string()))?;
    adb.shell(device_id, &format!("rm {}", remote))
        .map_err(|e| Error::TransferFailed(e.to_string()))?;

    debug!("recording downloaded to {:?}", local.as_path());
    Ok(local)
}
