//! Background tasks and the orchestrator that fronts them.
//!
//! Analysis runs as a one-shot task per request; drawing runs in a
//! long-lived task that owns its surface. Both talk to the caller only
//! through channels.

pub mod analysis;
pub mod draw;
pub mod protocol;

use std::any::Any;

use crate::canvas::surface::Surface;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::types::{ProgressEvent, SpectrogramGrid};

pub use analysis::{spawn_analysis, AnalysisJob};
pub use draw::DrawWorker;
pub use protocol::{AnalysisEvent, AnalysisRequest, DrawAck, DrawRequest};

pub struct Orchestrator {
    config: AnalysisConfig,
}

impl Orchestrator {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Start an analysis; the returned job yields progress and the result.
    pub fn start_analysis(&self, request: AnalysisRequest) -> Result<AnalysisJob> {
        log::debug!(
            "starting analysis: {} channels, {} Hz, {:.2}s",
            request.channel_count,
            request.sample_rate,
            request.duration
        );
        spawn_analysis(request, self.config.clone())
    }

    /// Run an analysis to completion.
    pub async fn analyze<F>(&self, request: AnalysisRequest, on_progress: F) -> Result<SpectrogramGrid>
    where
        F: FnMut(&ProgressEvent),
    {
        self.start_analysis(request)?.finish(on_progress).await
    }

    /// Move `surface` into a new draw task.
    pub async fn attach_surface<S>(&self, surface: S) -> Result<DrawWorker<S>>
    where
        S: Surface + Send + 'static,
    {
        DrawWorker::start(surface).await
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
