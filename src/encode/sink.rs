use crate::foundation::error::{FilmError, FilmResult};
use crate::foundation::math::pixel_digest;
use crate::raster::surface::Surface;

/// Stream parameters announced to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
}

impl SinkConfig {
    /// Duration of one output frame in milliseconds.
    pub fn frame_ms(&self) -> f64 {
        1000.0 / f64::from(self.fps.max(1))
    }
}

/// Consumer of rendered motion frames.
///
/// `push_frame` is called with strictly increasing indices between one `begin` and one `end`.
pub trait FrameSink {
    /// Called once before any frame.
    fn begin(&mut self, cfg: SinkConfig) -> FilmResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: u64, frame: &Surface) -> FilmResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> FilmResult<()>;
}

/// One frame captured by [`InMemorySink`].
#[derive(Clone, Debug)]
pub struct CapturedFrame {
    /// Output frame index.
    pub idx: u64,
    /// Digest of the frame pixels.
    pub digest: u64,
    /// Pixels, when the sink keeps them.
    pub surface: Option<Surface>,
}

/// Sink that records frames in memory, for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    keep_pixels: bool,
    frames: Vec<CapturedFrame>,
    finished: bool,
}

impl InMemorySink {
    /// A sink that keeps full frame pixels.
    pub fn new() -> Self {
        Self {
            keep_pixels: true,
            ..Self::default()
        }
    }

    /// A sink that keeps only per-frame digests.
    pub fn digests_only() -> Self {
        Self::default()
    }

    /// Configuration received in `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[CapturedFrame] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Playback duration of the captured frames at the configured fps.
    pub fn duration_ms(&self) -> f64 {
        self.cfg
            .map(|c| self.frames.len() as f64 * c.frame_ms())
            .unwrap_or(0.0)
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FilmResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &Surface) -> FilmResult<()> {
        let Some(cfg) = self.cfg else {
            return Err(FilmError::processing("in-memory sink not started"));
        };
        if frame.dimensions() != (cfg.width, cfg.height) {
            return Err(FilmError::processing(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                cfg.width,
                cfg.height
            )));
        }
        if let Some(last) = self.frames.last()
            && idx <= last.idx
        {
            return Err(FilmError::processing("in-memory sink received out-of-order frame"));
        }
        self.frames.push(CapturedFrame {
            idx,
            digest: pixel_digest(frame.data()),
            surface: self.keep_pixels.then(|| frame.clone()),
        });
        Ok(())
    }

    fn end(&mut self) -> FilmResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
