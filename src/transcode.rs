use crate::config::Config;
use crate::error::{Error, Result, Stage};
use crate::output::{OutputKind, OutputRequest};
use crate::utils::{which, TempPath};
use log::{debug, info, trace};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ffmpeg version (\S+)").unwrap()
});

/// Filters the GIF pipeline cannot work without.
const REQUIRED_FILTERS: [&str; 5] = ["format", "fps", "scale", "palettegen", "paletteuse"];

/// What the installed ffmpeg turned out to support.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// H.264 encoder present; without it only GIF output works.
    pub libx264: bool,
}

/// Wrapper around the ffmpeg executable plus the optional gifsicle
/// optimizer.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    path: PathBuf,
    gifsicle: Option<PathBuf>,
}

impl Ffmpeg {
    /// Resolve ffmpeg (required) and gifsicle (optional) on the search path.
    pub fn new(config: &Config) -> Result<Self> {
        let path = which(&config.ffmpeg)
            .ok_or_else(|| Error::MissingTool(config.ffmpeg.display().to_string()))?;
        let gifsicle = which(&config.gifsicle);

        debug!("using ffmpeg at {:?}", path);
        match &gifsicle {
            Some(p) => debug!("using gifsicle at {:?}", p),
            None => debug!("gifsicle not found, GIF output will not be size-optimized"),
        }

        Ok(Ffmpeg { path, gifsicle })
    }

    pub fn has_gifsicle(&self) -> bool {
        self.gifsicle.is_some()
    }

    /// Verify the installed ffmpeg can drive the pipeline at all.
    ///
    /// The GIF encoder and the palette filters are mandatory; a missing
    /// libx264 is reported back so the caller can warn instead of failing.
    pub fn check_capabilities(&self) -> Result<Capabilities> {
        if let Some(version) = self.version() {
            info!("ffmpeg version {}", version);
        }

        let codecs = self.probe("-codecs")?;
        if !has_entry(&codecs, "gif") {
            return Err(Error::MissingCapability("GIF encoder".into()));
        }
        let libx264 = has_entry(&codecs, "libx264");

        let filters = self.probe("-filters")?;
        let missing: Vec<&str> = REQUIRED_FILTERS
            .iter()
            .copied()
            .filter(|name| !has_entry(&filters, name))
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingCapability(format!(
                "filters: {}",
                missing.join(", ")
            )));
        }

        Ok(Capabilities { libx264 })
    }

    fn version(&self) -> Option<String> {
        let output = Command::new(&self.path).arg("-version").output().ok()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        VERSION_RE
            .captures(&stdout)
            .map(|caps| caps[1].to_string())
    }

    fn probe(&self, listing: &str) -> Result<String> {
        let output = Command::new(&self.path)
            .args(["-hide_banner", listing])
            .output()
            .map_err(|_| Error::IncompatibleFfmpeg)?;

        if !output.status.success() {
            return Err(Error::IncompatibleFfmpeg);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Re-encode a pulled recording as H.264 MP4.
    pub fn optimize_video(&self, input: &Path, request: &OutputRequest) -> Result<()> {
        self.run(&video_args(input, request), Stage::Video)
    }

    /// Convert a recording to an optimized GIF.
    ///
    /// Two ffmpeg passes (palette generation, palette-based encode), plus a
    /// gifsicle pass when the optimizer is installed. All intermediates are
    /// guard-owned, so they disappear on every path out of here.
    pub fn create_gif(&self, input: &Path, request: &OutputRequest) -> Result<()> {
        let graph = filter_graph(OutputKind::Gif, request.fps, request.size);
        let palette = TempPath::with_extension("png");
        let staged = self.gifsicle.as_ref().map(|_| TempPath::with_extension("gif"));
        let encode_target: &Path = staged
            .as_ref()
            .map(TempPath::as_path)
            .unwrap_or(&request.dest);

        self.run(&palette_args(input, &graph, palette.as_path()), Stage::Palette)?;
        self.run(
            &encode_args(input, &graph, palette.as_path(), encode_target),
            Stage::Gif,
        )?;

        if let (Some(gifsicle), Some(staged)) = (&self.gifsicle, &staged) {
            info!("optimizing GIF with gifsicle");
            run_command(
                Command::new(gifsicle)
                    .arg("-O3")
                    .arg(staged.as_path())
                    .arg("-o")
                    .arg(&request.dest),
                Stage::Optimize,
            )?;
        }

        Ok(())
    }

    fn run(&self, args: &[OsString], stage: Stage) -> Result<()> {
        trace!("ffmpeg {:?}", args);
        run_command(Command::new(&self.path).args(args), stage)
    }
}

fn run_command(command: &mut Command, stage: Stage) -> Result<()> {
    let output = command.output().map_err(|e| Error::TranscodeFailed {
        stage,
        message: format!("could not run {:?}: {}", command.get_program(), e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            output.status.to_string()
        } else {
            stderr
        };
        return Err(Error::TranscodeFailed { stage, message });
    }

    Ok(())
}

/// True when a `-codecs` or `-filters` listing names the entry. Both
/// listings put capability flags first and the name second.
fn has_entry(listing: &str, name: &str) -> bool {
    listing
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(name))
}

/// Aspect-preserving filter chain: fix the short side, let ffmpeg compute
/// the long one. MP4 needs even dimensions (`-2`) for the codec; GIF takes
/// whatever falls out (`-1`).
fn filter_graph(kind: OutputKind, fps: u32, size: u32) -> String {
    match kind {
        OutputKind::Video => format!(
            "format=pix_fmts=yuv420p,fps={fps},scale=w='if(gt(iw,ih),-2,{size})':h='if(gt(iw,ih),{size},-2)':flags=lanczos"
        ),
        OutputKind::Gif => format!(
            "fps={fps},scale=w='if(gt(iw,ih),-1,{size})':h='if(gt(iw,ih),{size},-1)':flags=lanczos"
        ),
    }
}

fn video_args(input: &Path, request: &OutputRequest) -> Vec<OsString> {
    let graph = filter_graph(OutputKind::Video, request.fps, request.size);
    let mut args: Vec<OsString> = Vec::new();
    args.extend(["-v", "warning", "-i"].map(OsString::from));
    args.push(input.into());
    args.extend(["-codec:v", "libx264", "-preset", "slow", "-crf"].map(OsString::from));
    args.push(request.quality.to_string().into());
    args.push("-vf".into());
    args.push(graph.into());
    args.extend(["-y", "-f", "mp4"].map(OsString::from));
    args.push(request.dest.as_os_str().into());
    args
}

fn palette_args(input: &Path, graph: &str, palette: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.extend(["-v", "warning", "-i"].map(OsString::from));
    args.push(input.into());
    args.push("-vf".into());
    args.push(format!("{},palettegen", graph).into());
    args.push("-y".into());
    args.push(palette.into());
    args
}

fn encode_args(input: &Path, graph: &str, palette: &Path, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.extend(["-v", "warning", "-i"].map(OsString::from));
    args.push(input.into());
    args.push("-i".into());
    args.push(palette.into());
    args.push("-lavfi".into());
    args.push(format!("{}[x];[x][1:v]paletteuse=dither=floyd_steinberg", graph).into());
    args.extend(["-y", "-f", "gif"].map(OsString::from));
    args.push(dest.into());
    args
}
