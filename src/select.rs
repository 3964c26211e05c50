use crate::device::Device;
use crate::error::{Error, Result};
use colored::Colorize;
use std::io::{BufRead, Write};

/// Pick the device to record from.
///
/// Zero devices is fatal, a single device is taken without asking, and
/// anything more gets a numbered menu. Invalid input re-prompts; only a
/// closed input stream ends the loop early.
pub fn choose_device<'a>(
    devices: &'a [Device],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<&'a Device> {
    match devices.len() {
        0 => Err(Error::NoDevice),
        1 => Ok(&devices[0]),
        _ => prompt_for_device(devices, input, out),
    }
}

fn prompt_for_device<'a>(
    devices: &'a [Device],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<&'a Device> {
    writeln!(out, "{}", "Multiple devices found, choose one:".green())?;
    writeln!(out, "===============")?;
    for (num, device) in devices.iter().enumerate() {
        writeln!(
            out,
            "{} {} - {}",
            format!("[{}]", num).green(),
            device.model().white(),
            device.id.yellow()
        )?;
    }
    writeln!(out, "===============")?;

    loop {
        write!(out, "{}", format!(" Choose[0-{}]: ", devices.len() - 1).green())?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Command("input closed while choosing a device".into()));
        }

        if let Ok(choice) = line.trim().parse::<usize>() {
            if let Some(device) = devices.get(choice) {
                return Ok(device);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::parse_devices;

    fn two_devices() -> Vec<Device> {
        parse_devices(
            "List of devices attached\n\
             serial-a device model:Pixel_2\n\
             serial-b device model:Nexus_5\n",
        )
    }

    #[test]
    fn no_devices_is_fatal() {
        let mut out = Vec::new();
        let err = choose_device(&[], &mut "".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, Error::NoDevice));
    }

    #[test]
    fn single_device_skips_the_menu() {
        let devices = parse_devices("serial-a device model:Pixel_2\n");
        let mut out = Vec::new();
        let chosen = choose_device(&devices, &mut "".as_bytes(), &mut out).unwrap();
        assert_eq!(chosen.id, "serial-a");
        assert!(out.is_empty());
    }

    #[test]
    fn menu_accepts_a_valid_index() {
        let devices = two_devices();
        let mut out = Vec::new();
        let chosen = choose_device(&devices, &mut "1\n".as_bytes(), &mut out).unwrap();
        assert_eq!(chosen.id, "serial-b");
    }

    #[test]
    fn menu_rejects_garbage_and_out_of_range_until_valid() {
        let devices = two_devices();
        let mut out = Vec::new();
        let input = "abc\n7\n-1\n\n0\n";
        let chosen = choose_device(&devices, &mut input.as_bytes(), &mut out).unwrap();
        assert_eq!(chosen.id, "serial-a");

        // one prompt per rejected line plus the accepted one
        let rendered = String::from_utf8(out).unwrap();
        assert_eq!(rendered.matches("Choose[0-1]").count(), 5);
    }

    #[test]
    fn closed_input_ends_the_loop_with_an_error() {
        let devices = two_devices();
        let mut out = Vec::new();
        let err = choose_device(&devices, &mut "nope\n".as_bytes(), &mut out).unwrap_err();
        assert!(matches!(err, Error::Command(_)));
    }

    #[test]
    fn menu_shows_model_or_unknown() {
        let devices = parse_devices(
            "serial-a device model:Pixel_2\n\
             serial-b device\n",
        );
        let mut out = Vec::new();
        let _ = choose_device(&devices, &mut "0\n".as_bytes(), &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("Pixel_2"));
        assert!(rendered.contains("(unknown)"));
    }
}
