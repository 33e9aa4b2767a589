//! Filmgrid turns a four-frame burst into a developed film proof.
//!
//! A burst flows through five stages:
//!
//! - [`stitch_burst`] packs the frames into a 2×2 proof sheet described by [`GridGeometry`]
//! - [`develop_frames`] applies a [`FilmStock`] look, blurs two quadrants and slices the frames
//! - [`render_poster`] typesets the composite onto a 2:3 poster
//! - [`MotionExporter`] replays the frames in the poster's image slot into a [`FrameSink`]
//! - [`Pipeline`] chains the stages over a persistable [`BurstRecord`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Encoded inputs, payload transport and fonts.
pub mod assets;
/// JSON configuration.
pub mod config;
/// Pixel kernels.
pub mod effects;
/// Still and motion encoders.
pub mod encode;
/// Shared value types and errors.
pub mod foundation;
/// Grid and poster layout math.
pub mod geometry;
/// The burst stages.
pub mod pipeline;
/// RGBA8 surfaces.
pub mod raster;
/// Film stock presets.
pub mod stock;

pub use crate::foundation::core::{RectPx, Rgba8};
pub use crate::foundation::error::{FilmError, FilmResult};

pub use crate::assets::payload::{FramePayload, parse_data_url, to_data_url};
pub use crate::assets::text::{TextMeasure, Typesetter};
pub use crate::config::FilmConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, VideoContainer};
pub use crate::encode::image::{ColorMode, EncodeFormat, EncodedImage, encode_surface};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::geometry::grid::{
    GridGeometry, GridRatios, GridVariant, Quadrant, compute_grid_geometry,
};
pub use crate::geometry::poster::PosterLayout;
pub use crate::pipeline::cancel::CancelToken;
pub use crate::pipeline::develop::{
    DevelopOptions, DevelopedBurst, FixedSelector, QuadrantSelector, RandomSelector,
    develop_frames, develop_surface,
};
pub use crate::pipeline::job::{
    BurstArtifacts, BurstRecord, JobReport, JobStatus, NoopObserver, Pipeline, RunContext,
    StatusObserver,
};
pub use crate::pipeline::motion::{
    MotionClip, MotionExporter, MotionOptions, MotionState, MotionStats, export_motion,
};
pub use crate::pipeline::poster::{
    Poster, PosterMeta, PosterOptions, fit_title_size, render_poster, render_poster_surface,
};
pub use crate::pipeline::stitch::{
    BannerText, ProofSheet, StitchOptions, stitch_burst, stitch_surfaces,
};
pub use crate::raster::surface::Surface;
pub use crate::stock::{FilmStock, StockParams};
