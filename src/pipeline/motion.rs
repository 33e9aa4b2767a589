use std::path::PathBuf;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{FilmError, FilmResult};
use crate::geometry::poster::{POSTER_WIDTH, PosterLayout};
use crate::pipeline::stitch::BURST_LEN;
use crate::raster::surface::Surface;

/// Motion export settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionOptions {
    /// How many times the four frames cycle.
    pub loops: u32,
    /// How long each frame stays on screen.
    pub interval_ms: u32,
    /// Output frame rate.
    pub fps: u32,
    /// Output width; rounded down to even, height follows the poster ratio.
    pub width: u32,
    /// Output container.
    pub container: VideoContainer,
    /// `ffmpeg` executable.
    pub ffmpeg: PathBuf,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            loops: 4,
            interval_ms: 150,
            fps: 30,
            width: 1080,
            container: VideoContainer::Webm,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl MotionOptions {
    /// Reject out-of-range settings.
    pub fn validate(&self) -> FilmResult<()> {
        if self.loops == 0 || self.loops > 100 {
            return Err(FilmError::validation(format!(
                "motion.loops {} is outside 1..=100",
                self.loops
            )));
        }
        if !(10..=10_000).contains(&self.interval_ms) {
            return Err(FilmError::validation(format!(
                "motion.interval_ms {} is outside 10..=10000",
                self.interval_ms
            )));
        }
        if !(1..=120).contains(&self.fps) {
            return Err(FilmError::validation(format!(
                "motion.fps {} is outside 1..=120",
                self.fps
            )));
        }
        if !(64..=POSTER_WIDTH).contains(&self.width) {
            return Err(FilmError::validation(format!(
                "motion.width {} is outside 64..={POSTER_WIDTH}",
                self.width
            )));
        }
        Ok(())
    }

    /// Timeline length: `loops × 4 × interval`.
    pub fn timeline_ms(&self) -> u64 {
        u64::from(self.loops) * BURST_LEN as u64 * u64::from(self.interval_ms)
    }

    /// Number of output frames covering the timeline at `fps`.
    pub fn frame_count(&self) -> u64 {
        (self.timeline_ms() * u64::from(self.fps)).div_ceil(1000)
    }
}

/// Exporter lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    /// Not started.
    #[default]
    Idle,
    /// Frames are being written to the sink.
    Recording,
    /// Finished, successfully or not.
    Stopped,
}

/// What an export produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionStats {
    /// Frames pushed to the sink.
    pub frames_written: u64,
    /// Output frame rate.
    pub fps: u32,
    /// Playback duration (`frames_written / fps`).
    pub duration_ms: f64,
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
    /// Burst frame shown by each output frame.
    pub shown: Vec<u8>,
}

/// Replays four frames inside the poster's image slot, sampling the timeline at the sink fps.
#[derive(Debug)]
pub struct MotionExporter {
    opts: MotionOptions,
    state: MotionState,
}

impl MotionExporter {
    /// An idle exporter.
    pub fn new(opts: MotionOptions) -> Self {
        Self {
            opts,
            state: MotionState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Record the clip into `sink`. An exporter records once; afterwards it stays `Stopped`.
    #[tracing::instrument(level = "debug", skip_all, fields(loops = self.opts.loops, fps = self.opts.fps))]
    pub fn export(
        &mut self,
        poster: &Surface,
        frames: &[Surface],
        sink: &mut dyn FrameSink,
    ) -> FilmResult<MotionStats> {
        if self.state != MotionState::Idle {
            return Err(FilmError::processing(format!(
                "motion exporter is {:?}, expected Idle",
                self.state
            )));
        }
        if frames.len() != BURST_LEN {
            return Err(FilmError::invalid_input(format!(
                "motion export needs exactly {BURST_LEN} frames, got {}",
                frames.len()
            )));
        }
        self.opts.validate()?;

        self.state = MotionState::Recording;
        let res = self.record(poster, frames, sink);
        self.state = MotionState::Stopped;
        res
    }

    fn record(
        &self,
        poster: &Surface,
        frames: &[Surface],
        sink: &mut dyn FrameSink,
    ) -> FilmResult<MotionStats> {
        let layout = PosterLayout::scaled(self.opts.width);
        let background = poster.resize(layout.width, layout.height, FilterType::Lanczos3)?;
        let slot = layout.image_slot;
        let stills = frames
            .iter()
            .map(|f| {
                let pic = f.cover_fit(slot.w, slot.h, FilterType::Lanczos3)?;
                let mut canvas = background.clone();
                canvas.blit(&pic, slot.x, slot.y)?;
                Ok(canvas)
            })
            .collect::<FilmResult<Vec<Surface>>>()?;

        let cfg = SinkConfig {
            width: layout.width,
            height: layout.height,
            fps: self.opts.fps,
        };
        let total = self.opts.frame_count();
        let interval = u64::from(self.opts.interval_ms);
        let fps = u64::from(self.opts.fps);

        sink.begin(cfg)?;
        let mut shown = Vec::with_capacity(total as usize);
        for i in 0..total {
            // Output frame i starts at i * 1000 / fps ms.
            let t_ms = i * 1000 / fps;
            let k = ((t_ms / interval) % BURST_LEN as u64) as usize;
            sink.push_frame(i, &stills[k])?;
            shown.push(k as u8);
        }
        sink.end()?;

        let stats = MotionStats {
            frames_written: total,
            fps: self.opts.fps,
            duration_ms: total as f64 * 1000.0 / fps as f64,
            width: layout.width,
            height: layout.height,
            shown,
        };
        tracing::info!(
            frames = stats.frames_written,
            duration_ms = stats.duration_ms,
            "motion recorded"
        );
        Ok(stats)
    }
}

/// An encoded motion clip.
#[derive(Clone, Debug)]
pub struct MotionClip {
    /// Container used.
    pub container: VideoContainer,
    /// Container bytes.
    pub bytes: Vec<u8>,
    /// Export statistics.
    pub stats: MotionStats,
}

impl MotionClip {
    /// MIME type of [`MotionClip::bytes`].
    pub fn mime(&self) -> &'static str {
        self.container.mime()
    }
}

/// Export a clip through `ffmpeg`. Fails with `UnsupportedFormat` when the encoder is missing.
pub fn export_motion(
    poster: &Surface,
    frames: &[Surface],
    opts: &MotionOptions,
) -> FilmResult<MotionClip> {
    opts.validate()?;
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        binary: opts.ffmpeg.clone(),
        container: opts.container,
    });
    let stats = MotionExporter::new(opts.clone()).export(poster, frames, &mut sink)?;
    let bytes = sink
        .take_output()
        .ok_or_else(|| FilmError::processing("ffmpeg produced no output"))?;
    Ok(MotionClip {
        container: opts.container,
        bytes,
        stats,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/motion.rs"]
mod tests;
