//! Background analysis task.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::AnalysisConfig;
use crate::dsp::analyzer::Analyzer;
use crate::error::{EngineError, Result};
use crate::types::{AudioChannelSet, ProgressEvent, SpectrogramGrid};
use crate::worker::panic_message;
use crate::worker::protocol::{AnalysisEvent, AnalysisRequest};

/// Handle to a running analysis. Dropping it cancels the task.
pub struct AnalysisJob {
    events: mpsc::UnboundedReceiver<AnalysisEvent>,
    task: JoinHandle<()>,
    last_progress: Option<ProgressEvent>,
    finished: bool,
}

/// Start analysing `request` on the current tokio runtime.
pub fn spawn_analysis(request: AnalysisRequest, config: AnalysisConfig) -> Result<AnalysisJob> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| EngineError::TaskSetupFailure(e.to_string()))?;
    let (tx, rx) = mpsc::unbounded_channel();
    let task = runtime.spawn(run_analysis(request, config, tx));
    Ok(AnalysisJob {
        events: rx,
        task,
        last_progress: None,
        finished: false,
    })
}

async fn run_analysis(
    request: AnalysisRequest,
    config: AnalysisConfig,
    tx: mpsc::UnboundedSender<AnalysisEvent>,
) {
    let outcome = AssertUnwindSafe(analyze_request(request, config, tx.clone()))
        .catch_unwind()
        .await;
    let terminal = match outcome {
        Ok(Ok(grid)) => AnalysisEvent::Result(grid),
        Ok(Err(e)) => {
            log::error!("analysis failed: {e}");
            AnalysisEvent::Error(e.to_string())
        }
        Err(panic) => {
            let msg = format!("analysis task panicked: {}", panic_message(panic.as_ref()));
            log::error!("{msg}");
            AnalysisEvent::Error(msg)
        }
    };
    // The job may already be gone; nothing left to tell anyone then.
    let _ = tx.send(terminal);
}

async fn analyze_request(
    request: AnalysisRequest,
    config: AnalysisConfig,
    tx: mpsc::UnboundedSender<AnalysisEvent>,
) -> Result<SpectrogramGrid> {
    if request.channel_count != request.channel_buffers.len() {
        return Err(EngineError::InvalidInput(format!(
            "request claims {} channels but carries {}",
            request.channel_count,
            request.channel_buffers.len()
        )));
    }
    let analyzer = Analyzer::new(AnalysisConfig {
        time_slice_secs: request.time_slice.unwrap_or(config.time_slice_secs),
        ..config
    })?;
    let audio = AudioChannelSet::new(request.channel_buffers, request.sample_rate, request.duration)?;
    analyzer
        .analyze(&audio, |event| {
            let _ = tx.send(AnalysisEvent::Progress(event));
        })
        .await
}

impl AnalysisJob {
    /// Next event in slice order. After the terminal event this returns `None`.
    pub async fn next_event(&mut self) -> Option<AnalysisEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await;
        Some(self.observe(event))
    }

    /// Next event if one is already queued, without waiting.
    pub fn try_next_event(&mut self) -> Option<AnalysisEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => Some(self.observe(Some(event))),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => Some(self.observe(None)),
        }
    }

    fn observe(&mut self, event: Option<AnalysisEvent>) -> AnalysisEvent {
        match event {
            Some(AnalysisEvent::Progress(p)) => {
                self.last_progress = Some(p.clone());
                AnalysisEvent::Progress(p)
            }
            Some(terminal) => {
                self.finished = true;
                terminal
            }
            None => {
                // Sender dropped without a terminal event.
                self.finished = true;
                AnalysisEvent::Error("analysis task ended without a result".into())
            }
        }
    }

    /// Drive the job to completion, handing each progress event to `on_progress`.
    pub async fn finish<F>(mut self, mut on_progress: F) -> Result<SpectrogramGrid>
    where
        F: FnMut(&ProgressEvent),
    {
        while let Some(event) = self.next_event().await {
            match event {
                AnalysisEvent::Progress(p) => on_progress(&p),
                AnalysisEvent::Result(grid) => return Ok(grid),
                AnalysisEvent::Error(msg) => return Err(EngineError::TaskFailed(msg)),
            }
        }
        Err(EngineError::TaskFailed("analysis already finished".into()))
    }

    /// Abort the task. Undelivered events are discarded; the last progress
    /// snapshot this job handed out is returned.
    pub fn cancel(mut self) -> Option<ProgressEvent> {
        self.task.abort();
        self.finished = true;
        log::info!(
            "analysis cancelled after {} slices",
            self.last_progress.as_ref().map_or(0, |p| p.processed_slices)
        );
        self.last_progress.take()
    }

    /// Last progress snapshot handed out so far.
    pub fn last_progress(&self) -> Option<&ProgressEvent> {
        self.last_progress.as_ref()
    }
}

impl Drop for AnalysisJob {
    fn drop(&mut self) {
        self.task.abort();
    }
}
