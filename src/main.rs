use clap::Parser;
use colored::Colorize;
use log::debug;
use std::io;
use std::path::PathBuf;
use std::process;

use screengif::{
    output, select, transfer, Adb, Config, Error, Ffmpeg, OutputKind, OutputRequest,
    RecordingSession, Result,
};

/// Records an Android device screen to an optimized GIF or MP4 file.
/// The output format is chosen by the file extension.
#[derive(Parser, Debug)]
#[command(name = "screengif", version, about, long_about = None)]
struct Args {
    /// Output file, <name>.gif or <name>.mp4
    filename: PathBuf,

    /// Convert an existing mp4 file to an optimized GIF instead of recording
    #[arg(short = 'i', long)]
    input_file: Option<PathBuf>,

    /// Size of the shortest side of the output
    #[arg(short, long, default_value_t = output::DEFAULT_SIZE)]
    size: u32,

    /// Frame rate of the output; defaults to 15 for GIF and 60 for MP4
    #[arg(short, long)]
    fps: Option<u32>,

    /// Video quality as x264 CRF, lower is better (video mode only)
    #[arg(short = 'q', long, default_value_t = output::DEFAULT_VIDEO_QUALITY)]
    video_quality: u32,

    /// adb executable to use
    #[arg(long, default_value = "adb")]
    adb: PathBuf,

    /// ffmpeg executable to use
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}", e.to_string().red());
        if matches!(e, Error::RecordingUnsupported) {
            eprintln!("Recording is supported on devices running KitKat (4.4) or newer.");
            eprintln!("Genymotion and the stock emulator do not support it.");
        }
        process::exit(e.exit_code());
    }
}

fn run(args: &Args) -> Result<()> {
    let config = Config::builder()
        .adb(&args.adb)
        .ffmpeg(&args.ffmpeg)
        .build();

    let ffmpeg = Ffmpeg::new(&config)?;
    let capabilities = ffmpeg.check_capabilities()?;
    if !capabilities.libx264 {
        println!(
            "{}",
            "Missing libx264 encoder in your installed ffmpeg, will not be able to create videos."
                .yellow()
        );
    }

    let request = OutputRequest::new(
        args.filename.clone(),
        args.fps,
        args.size,
        args.video_quality,
    )?;
    debug!("output request: {:?}", request);

    // Standalone conversion, no device involved.
    if let Some(input) = &args.input_file {
        if request.kind == OutputKind::Video {
            return Err(Error::Usage(
                "there's no point in converting video to video".into(),
            ));
        }
        println!("{}", "Converting video to GIF...".green());
        ffmpeg.create_gif(input, &request)?;
        println!("{}", "Done!".green());
        println!("{}", format!("Created {}", request.dest.display()).yellow());
        return Ok(());
    }

    let adb = Adb::new(&config)?;
    let devices = adb.devices()?;
    let stdin = io::stdin();
    let device = select::choose_device(&devices, &mut stdin.lock(), &mut io::stdout())?;

    println!(
        "{}",
        format!("Starting recording on {}...", device.id).green()
    );
    println!("{}", "Press Ctrl+C to stop recording.".yellow());

    let session = RecordingSession::start(&adb, &device.id)?;
    let elapsed = session.wait()?;

    println!(
        "{}",
        format!("Recording done ({}s), downloading file...", elapsed).green()
    );
    let recording = transfer::download_recording(&adb, &device.id)?;

    match request.kind {
        OutputKind::Video => {
            println!("{}", "Optimizing video...".green());
            ffmpeg.optimize_video(recording.as_path(), &request)?;
        }
        OutputKind::Gif => {
            println!("{}", "Converting video to GIF...".green());
            ffmpeg.create_gif(recording.as_path(), &request)?;
        }
    }

    println!("{}", "Done!".green());
    println!("{}", format!("Created {}", request.dest.display()).yellow());
    Ok(())
}
