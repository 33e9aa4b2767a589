use std::io::{Read, Write as _};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{FilmError, FilmResult};
use crate::raster::surface::Surface;

/// Video container and codec pair produced by [`FfmpegSink`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoContainer {
    /// WebM with VP9.
    #[default]
    Webm,
    /// Fragmented MP4 with H.264.
    Mp4,
}

impl VideoContainer {
    /// `ffmpeg` encoder name.
    pub fn encoder(self) -> &'static str {
        match self {
            Self::Webm => "libvpx-vp9",
            Self::Mp4 => "libx264",
        }
    }

    /// MIME type of the produced bytes.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Webm => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// `ffmpeg` executable, looked up on `PATH` when relative.
    pub binary: PathBuf,
    /// Output container.
    pub container: VideoContainer,
}

impl FfmpegSinkOpts {
    /// Options for `container` using `ffmpeg` from `PATH`.
    pub fn new(container: VideoContainer) -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            container,
        }
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// Sink that pipes raw RGBA frames into `ffmpeg` and collects the container bytes from stdout.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<Drain>,
    stderr_drain: Option<Drain>,
    cfg: Option<SinkConfig>,
    last_idx: Option<u64>,
    output: Option<Vec<u8>>,
}

impl FfmpegSink {
    /// A sink that has not been started yet.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
            output: None,
        }
    }

    /// Container bytes, available after a successful `end`.
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.output.take()
    }

    fn output_args(&self) -> Vec<&'static str> {
        let mut args = vec!["-an", "-c:v", self.opts.container.encoder(), "-pix_fmt", "yuv420p"];
        match self.opts.container {
            VideoContainer::Webm => {
                args.extend(["-b:v", "0", "-crf", "32", "-deadline", "realtime", "-f", "webm"]);
            }
            VideoContainer::Mp4 => {
                args.extend([
                    "-preset",
                    "veryfast",
                    "-movflags",
                    "frag_keyframe+empty_moov",
                    "-f",
                    "mp4",
                ]);
            }
        }
        args.push("pipe:1");
        args
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> FilmResult<()> {
        if cfg.fps == 0 {
            return Err(FilmError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(FilmError::validation("video width/height must be non-zero"));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(FilmError::validation(
                "video width/height must be even (required for yuv420p output)",
            ));
        }
        ensure_encoder(&self.opts)?;

        let mut cmd = Command::new(&self.opts.binary);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.width, cfg.height),
                "-r",
                &cfg.fps.to_string(),
                "-i",
                "pipe:0",
            ])
            .args(self.output_args());

        let mut child = cmd.spawn().map_err(|e| {
            FilmError::unsupported_format(format!(
                "failed to spawn '{}': {e}",
                self.opts.binary.display()
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| FilmError::processing("failed to open ffmpeg stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FilmError::processing("failed to open ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FilmError::processing("failed to open ffmpeg stderr"))?;

        self.stdout_drain = Some(spawn_drain(stdout));
        self.stderr_drain = Some(spawn_drain(stderr));
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.output = None;
        tracing::debug!(
            container = ?self.opts.container,
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps,
            "ffmpeg sink started"
        );
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &Surface) -> FilmResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| FilmError::processing("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx <= last
        {
            return Err(FilmError::processing(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(FilmError::processing(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(FilmError::processing("ffmpeg sink is already finalized"));
        };
        stdin
            .write_all(frame.data())
            .map_err(|e| FilmError::processing(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn end(&mut self) -> FilmResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| FilmError::processing("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| FilmError::processing(format!("failed to wait for ffmpeg: {e}")))?;
        let stdout = join_drain(self.stdout_drain.take(), "stdout")?;
        let stderr = join_drain(self.stderr_drain.take(), "stderr")?;
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            let msg = format!("ffmpeg exited with status {status}: {}", stderr.trim());
            if stderr.contains("Unknown encoder") || stderr.contains("Encoder not found") {
                return Err(FilmError::unsupported_format(msg));
            }
            return Err(FilmError::processing(msg));
        }
        tracing::debug!(bytes = stdout.len(), "ffmpeg sink finished");
        self.output = Some(stdout);
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!(error = %e, "ffmpeg already exited");
            }
            let _ = child.wait();
            tracing::warn!("ffmpeg sink dropped before end; encoder stopped");
        }
        let _ = join_drain(self.stdout_drain.take(), "stdout");
        let _ = join_drain(self.stderr_drain.take(), "stderr");
    }
}

fn spawn_drain(mut pipe: impl Read + Send + 'static) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<Drain>, what: &str) -> FilmResult<Vec<u8>> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| FilmError::processing(format!("ffmpeg {what} drain thread panicked")))?
            .map_err(|e| FilmError::processing(format!("ffmpeg {what} read failed: {e}"))),
        None => Ok(Vec::new()),
    }
}

/// Check that `opts.binary` runs and lists the container's encoder.
///
/// Fails with `UnsupportedFormat` otherwise.
pub fn ensure_encoder(opts: &FfmpegSinkOpts) -> FilmResult<()> {
    let out = Command::new(&opts.binary)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            FilmError::unsupported_format(format!(
                "'{}' is not available: {e}",
                opts.binary.display()
            ))
        })?;
    if !out.status.success() {
        return Err(FilmError::unsupported_format(format!(
            "'{} -encoders' exited with {}",
            opts.binary.display(),
            out.status
        )));
    }
    let listing = String::from_utf8_lossy(&out.stdout);
    let encoder = opts.container.encoder();
    if !listing
        .lines()
        .any(|l| l.split_whitespace().nth(1) == Some(encoder))
    {
        return Err(FilmError::unsupported_format(format!(
            "ffmpeg has no '{encoder}' encoder for {} output",
            opts.container.extension()
        )));
    }
    Ok(())
}

/// True when `ffmpeg` from `PATH` can produce `container`.
pub fn is_container_supported(container: VideoContainer) -> bool {
    ensure_encoder(&FfmpegSinkOpts::new(container)).is_ok()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
