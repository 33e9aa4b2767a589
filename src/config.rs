//! JSON-loadable configuration shared by every stage.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{FilmError, FilmResult};
use crate::geometry::grid::GridVariant;
use crate::pipeline::develop::DevelopOptions;
use crate::pipeline::motion::MotionOptions;
use crate::pipeline::poster::PosterOptions;
use crate::pipeline::stitch::StitchOptions;

/// Pipeline configuration. Every section falls back to its defaults when omitted.
///
/// `grid_variant` is deliberately top-level: the stitcher and the developer must agree on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilmConfig {
    /// Grid layout for both stitch and develop.
    pub grid_variant: GridVariant,
    /// Decode deadline per image in milliseconds; `0` disables it.
    pub decode_timeout_ms: u64,
    /// Stitcher settings.
    pub stitch: StitchOptions,
    /// Developer settings.
    pub develop: DevelopOptions,
    /// Poster settings.
    pub poster: PosterOptions,
    /// Motion export settings.
    pub motion: MotionOptions,
}

impl Default for FilmConfig {
    fn default() -> Self {
        Self {
            grid_variant: GridVariant::Simple,
            decode_timeout_ms: 5000,
            stitch: StitchOptions::default(),
            develop: DevelopOptions::default(),
            poster: PosterOptions::default(),
            motion: MotionOptions::default(),
        }
    }
}

impl FilmConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> FilmResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| FilmError::validation(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: &Path) -> FilmResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Check every section.
    pub fn validate(&self) -> FilmResult<()> {
        self.stitch_options().validate()?;
        self.develop_options().validate()?;
        self.poster.validate()?;
        self.motion.validate()
    }

    /// Decode deadline, if enabled.
    pub fn decode_timeout(&self) -> Option<Duration> {
        (self.decode_timeout_ms > 0).then(|| Duration::from_millis(self.decode_timeout_ms))
    }

    /// Stitch options carrying the shared variant and decode deadline.
    pub fn stitch_options(&self) -> StitchOptions {
        StitchOptions {
            variant: self.grid_variant,
            decode_timeout: self.decode_timeout(),
            ..self.stitch.clone()
        }
    }

    /// Develop options carrying the shared variant and decode deadline.
    pub fn develop_options(&self) -> DevelopOptions {
        DevelopOptions {
            variant: self.grid_variant,
            decode_timeout: self.decode_timeout(),
            ..self.develop.clone()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
