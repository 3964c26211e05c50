use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Connection state reported by `adb devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Online,
    Offline,
    Unauthorized,
    Recovery,
    Sideload,
    Bootloader,
    Other(String),
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Online => write!(f, "online"),
            DeviceStatus::Offline => write!(f, "offline"),
            DeviceStatus::Unauthorized => write!(f, "unauthorized"),
            DeviceStatus::Recovery => write!(f, "recovery"),
            DeviceStatus::Sideload => write!(f, "sideload"),
            DeviceStatus::Bootloader => write!(f, "bootloader"),
            DeviceStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for DeviceStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "device" | "online" => DeviceStatus::Online,
            "offline" => DeviceStatus::Offline,
            "unauthorized" => DeviceStatus::Unauthorized,
            "recovery" => DeviceStatus::Recovery,
            "sideload" => DeviceStatus::Sideload,
            "bootloader" | "fastboot" => DeviceStatus::Bootloader,
            _ => DeviceStatus::Other(s.to_string()),
        }
    }
}

/// One connected device as reported by `adb devices -l`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub status: DeviceStatus,
    /// `key:value` attributes from the long listing (model, product, ...)
    pub attributes: HashMap<String, String>,
}

impl Device {
    pub fn new(id: &str, status: impl Into<DeviceStatus>) -> Self {
        Self {
            id: id.to_string(),
            status: status.into(),
            attributes: HashMap::new(),
        }
    }

    /// Human-readable model name, `"(unknown)"` when the listing omits it.
    pub fn model(&self) -> &str {
        self.attributes
            .get("model")
            .map(String::as_str)
            .unwrap_or("(unknown)")
    }
}

/// Parse `adb devices -l` output into usable devices.
///
/// The header line and anything with fewer than two tokens is skipped, as
/// are entries whose status is not `device` (offline or unauthorized ones
/// are no use for recording). Tokens after the status become attributes
/// when they contain a colon; anything else is ignored.
pub fn parse_devices(output: &str) -> Vec<Device> {
    let mut devices = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("List of") {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let id = match tokens.next() {
            Some(id) => id,
            None => continue,
        };
        let status = match tokens.next() {
            Some(status) => DeviceStatus::from(status),
            None => continue,
        };
        if status != DeviceStatus::Online {
            continue;
        }

        let mut device = Device::new(id, status);
        for token in tokens {
            if let Some((key, value)) = token.split_once(':') {
                device.attributes.insert(key.to_string(), value.to_string());
            }
        }
        devices.push(device);
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
List of devices attached
emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_x86_64 transport_id:1
0123456789ABCDEF       device usb:1-1 product:walleye model:Pixel_2 device:walleye transport_id:2
FA79X1A00000           unauthorized usb:1-2 transport_id:3
ZX1G22KHQK             offline
";

    #[test]
    fn keeps_only_status_device_lines() {
        let devices = parse_devices(LISTING);
        assert_eq!(devices.len(), 2);
        assert!(devices.iter().all(|d| d.status == DeviceStatus::Online));
        assert_eq!(devices[0].id, "emulator-5554");
        assert_eq!(devices[1].id, "0123456789ABCDEF");
    }

    #[test]
    fn collects_colon_attributes_and_ignores_the_rest() {
        let devices = parse_devices(LISTING);
        let pixel = &devices[1];
        assert_eq!(pixel.attributes.get("model").map(String::as_str), Some("Pixel_2"));
        assert_eq!(pixel.attributes.get("usb").map(String::as_str), Some("1-1"));
        assert!(!pixel.attributes.contains_key("0123456789ABCDEF"));
    }

    #[test]
    fn model_falls_back_to_unknown() {
        let devices = parse_devices("serial1 device\n");
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].model(), "(unknown)");
    }

    #[test]
    fn skips_header_daemon_and_short_lines() {
        let output = "\
* daemon not running; starting now at tcp:5037
* daemon started successfully
List of devices attached
loneword
";
        assert!(parse_devices(output).is_empty());
    }

    #[test]
    fn empty_output_yields_no_devices() {
        assert!(parse_devices("").is_empty());
        assert!(parse_devices("List of devices attached\n\n").is_empty());
    }

    #[test]
    fn status_round_trips_common_states() {
        assert_eq!(DeviceStatus::from("device"), DeviceStatus::Online);
        assert_eq!(DeviceStatus::from("offline"), DeviceStatus::Offline);
        assert_eq!(DeviceStatus::from("unauthorized"), DeviceStatus::Unauthorized);
        assert_eq!(
            DeviceStatus::from("weird"),
            DeviceStatus::Other("weird".to_string())
        );
    }
}
