use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::assets::decode::{decode_image, decode_image_with_timeout};
use crate::assets::payload::{FramePayload, decode_payload};
use crate::assets::text::Typesetter;
use crate::config::FilmConfig;
use crate::foundation::error::{FilmError, FilmResult};
use crate::geometry::grid::{GridGeometry, Quadrant};
use crate::pipeline::cancel::CancelToken;
use crate::pipeline::develop::{DevelopedBurst, QuadrantSelector, develop_surface};
use crate::pipeline::poster::{Poster, PosterMeta, render_poster_surface};
use crate::pipeline::stitch::{BURST_LEN, BannerText, ProofSheet, stitch_burst};
use crate::raster::surface::Surface;
use crate::stock::FilmStock;

/// Lifecycle of a burst record, as seen by the persistence layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Captured, not started.
    #[default]
    Pending,
    /// A stage is running.
    Processing,
    /// All requested artifacts exist.
    Completed,
    /// A stage failed; `error` says why.
    Failed,
}

/// Persistable description of one burst and its artifacts (as `data:` URLs).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstRecord {
    /// Caller-chosen identifier.
    pub id: String,
    /// Film stock.
    pub stock: FilmStock,
    /// Location name.
    pub location_name: Option<String>,
    /// Coordinates.
    pub coordinates: Option<String>,
    /// Capture date label.
    pub date: Option<String>,
    /// Proof sheet.
    pub original_url: Option<String>,
    /// Developed composite.
    pub processed_url: Option<String>,
    /// Developed frames in capture order.
    #[serde(default)]
    pub processed_frames: Vec<String>,
    /// Poster.
    pub poster_url: Option<String>,
    /// Geometry used for stitching and developing.
    pub geometry: Option<GridGeometry>,
    /// Quadrants that were blurred.
    pub blurred: Option<[Quadrant; 2]>,
    /// Current status.
    pub status: JobStatus,
    /// Display string of the error that failed the job.
    pub error: Option<String>,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Last change, unix milliseconds.
    pub updated_at: u64,
}

impl BurstRecord {
    /// A pending record.
    pub fn new(id: impl Into<String>, stock: FilmStock) -> Self {
        let now = now_ms();
        Self {
            id: id.into(),
            stock,
            created_at: now,
            updated_at: now,
            ..Self::default()
        }
    }

    fn poster_meta(&self) -> PosterMeta {
        PosterMeta {
            location: self.location_name.clone(),
            date: self.date.clone(),
            stock_label: Some(self.stock.label().to_string()),
            coordinates: self.coordinates.clone(),
        }
    }

    fn banner(&self) -> BannerText {
        BannerText {
            location: self.location_name.clone(),
            coordinates: self.coordinates.clone(),
            date: self.date.clone(),
        }
    }

    fn touch(&mut self, status: JobStatus) {
        self.status = status;
        self.updated_at = now_ms().max(self.created_at);
    }
}

/// Receives the record after every status change.
pub trait StatusObserver {
    /// Called with the updated record.
    fn on_status(&mut self, record: &BurstRecord);
}

impl<F: FnMut(&BurstRecord)> StatusObserver for F {
    fn on_status(&mut self, record: &BurstRecord) {
        self(record)
    }
}

/// Observer that ignores updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl StatusObserver for NoopObserver {
    fn on_status(&mut self, _: &BurstRecord) {}
}

/// Artifacts of a completed run. Stages that did not run are `None`.
#[derive(Clone, Debug, Default)]
pub struct BurstArtifacts {
    /// Stitched sheet.
    pub sheet: Option<ProofSheet>,
    /// Developed burst.
    pub developed: Option<DevelopedBurst>,
    /// Poster.
    pub poster: Option<Poster>,
}

/// Outcome of [`Pipeline::run`]: the final record plus whatever artifacts were produced.
#[derive(Debug)]
pub struct JobReport {
    /// Final record (`completed` or `failed`).
    pub record: BurstRecord,
    /// Produced artifacts; empty when the job failed.
    pub artifacts: BurstArtifacts,
}

impl JobReport {
    /// The artifacts, or the failure as an error.
    pub fn into_result(self) -> FilmResult<BurstArtifacts> {
        match self.record.status {
            JobStatus::Completed => Ok(self.artifacts),
            _ => Err(FilmError::processing(
                self.record
                    .error
                    .unwrap_or_else(|| "job did not complete".to_string()),
            )),
        }
    }
}

/// Collaborators a run needs besides its inputs.
pub struct RunContext<'a> {
    /// Blur quadrant choice.
    pub selector: &'a mut dyn QuadrantSelector,
    /// Font for banners and posters; without it no poster is rendered.
    pub typesetter: Option<&'a mut Typesetter>,
    /// Status sink.
    pub observer: &'a mut dyn StatusObserver,
}

/// Drives stitch → develop → poster for one burst and keeps its [`BurstRecord`] current.
#[derive(Clone, Debug)]
pub struct Pipeline {
    config: FilmConfig,
    cancel: CancelToken,
}

impl Pipeline {
    /// A pipeline over a validated configuration.
    pub fn new(config: FilmConfig) -> FilmResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cancel: CancelToken::new(),
        })
    }

    /// Use `token` for cancellation.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// The token this pipeline polls.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Configuration in use.
    pub fn config(&self) -> &FilmConfig {
        &self.config
    }

    /// Run every stage from raw frames. Failures are reported in the record; once stitching
    /// succeeds the sheet stays on the record so [`Pipeline::retry_from_sheet`] can resume.
    pub fn run(
        &self,
        mut record: BurstRecord,
        frames: &[FramePayload],
        ctx: RunContext<'_>,
    ) -> JobReport {
        record.error = None;
        record.touch(JobStatus::Processing);
        ctx.observer.on_status(&record);
        let RunContext {
            selector,
            mut typesetter,
            observer,
        } = ctx;

        let sheet = match self.stitch_stage(&record, frames, typesetter.as_deref_mut()) {
            Ok(sheet) => sheet,
            Err(e) => return Self::fail(record, e, observer),
        };
        // Kept on failure: retries start from the sheet.
        record.original_url = Some(sheet.encoded.to_data_url());
        record.geometry = Some(sheet.geometry);

        match self.develop_and_poster(&record, sheet.surface.clone(), selector, typesetter) {
            Ok(mut artifacts) => {
                artifacts.sheet = Some(sheet);
                self.complete(record, artifacts, observer)
            }
            Err(e) => Self::fail(record, e, observer),
        }
    }

    /// Re-run develop and poster from the record's stored proof sheet.
    ///
    /// Raw frames are not needed; this is the retry path after a develop or poster failure.
    pub fn retry_from_sheet(&self, mut record: BurstRecord, ctx: RunContext<'_>) -> JobReport {
        record.error = None;
        record.touch(JobStatus::Processing);
        ctx.observer.on_status(&record);
        let RunContext {
            selector,
            typesetter,
            observer,
        } = ctx;

        let res = self
            .stored_sheet(&record)
            .and_then(|sheet| self.develop_and_poster(&record, sheet, selector, typesetter));
        match res {
            Ok(artifacts) => self.complete(record, artifacts, observer),
            Err(e) => Self::fail(record, e, observer),
        }
    }

    fn stored_sheet(&self, record: &BurstRecord) -> FilmResult<Surface> {
        let url = record
            .original_url
            .as_deref()
            .ok_or_else(|| FilmError::invalid_input("record has no proof sheet to retry from"))?;
        let bytes = decode_payload(url)?;
        match self.config.decode_timeout() {
            Some(t) => decode_image_with_timeout(&bytes, t),
            None => decode_image(&bytes),
        }
    }

    fn stitch_stage(
        &self,
        record: &BurstRecord,
        frames: &[FramePayload],
        typesetter: Option<&mut Typesetter>,
    ) -> FilmResult<ProofSheet> {
        self.cancel.check("stitch")?;
        if frames.len() != BURST_LEN {
            return Err(FilmError::invalid_input(format!(
                "a burst needs exactly {BURST_LEN} frames, got {}",
                frames.len()
            )));
        }
        let bytes = frames
            .iter()
            .map(|f| f.bytes().map(|b| b.into_owned()))
            .collect::<FilmResult<Vec<Vec<u8>>>>()?;
        let banner = record.banner();
        let banner = typesetter.is_some().then_some(&banner);
        stitch_burst(&bytes, &self.config.stitch_options(), banner, typesetter)
    }

    fn develop_and_poster(
        &self,
        record: &BurstRecord,
        sheet: Surface,
        selector: &mut dyn QuadrantSelector,
        typesetter: Option<&mut Typesetter>,
    ) -> FilmResult<BurstArtifacts> {
        self.cancel.check("develop")?;
        let developed = develop_surface(
            sheet,
            record.stock,
            &self.config.develop_options(),
            selector,
            Some(&self.cancel),
        )?;
        let poster = match typesetter {
            Some(ts) => {
                self.cancel.check("poster")?;
                Some(render_poster_surface(
                    &developed.composite_surface,
                    &record.poster_meta(),
                    ts,
                    &self.config.poster,
                )?)
            }
            None => {
                tracing::debug!(id = %record.id, "no typesetter; poster skipped");
                None
            }
        };
        Ok(BurstArtifacts {
            sheet: None,
            developed: Some(developed),
            poster,
        })
    }

    fn complete(
        &self,
        mut record: BurstRecord,
        artifacts: BurstArtifacts,
        observer: &mut dyn StatusObserver,
    ) -> JobReport {
        if let Some(d) = &artifacts.developed {
            record.processed_url = Some(d.composite.to_data_url());
            record.processed_frames = d.frames.iter().map(|f| f.to_data_url()).collect();
            record.blurred = Some(d.blurred);
            record.geometry = Some(d.geometry);
        }
        if let Some(p) = &artifacts.poster {
            record.poster_url = Some(p.encoded.to_data_url());
        }
        record.touch(JobStatus::Completed);
        tracing::info!(id = %record.id, stock = %record.stock, "burst completed");
        observer.on_status(&record);
        JobReport { record, artifacts }
    }

    fn fail(mut record: BurstRecord, err: FilmError, observer: &mut dyn StatusObserver) -> JobReport {
        tracing::warn!(id = %record.id, error = %err, "burst failed");
        record.error = Some(err.to_string());
        record.touch(JobStatus::Failed);
        observer.on_status(&record);
        JobReport {
            record,
            artifacts: BurstArtifacts::default(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
