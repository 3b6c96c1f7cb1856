//! Background draw task owning a drawable surface.

use std::panic::AssertUnwindSafe;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::canvas::spectrogram_renderer::{render, RenderStats};
use crate::canvas::surface::Surface;
use crate::config::RenderConfig;
use crate::error::{EngineError, Result};
use crate::types::SpectrogramGrid;
use crate::worker::panic_message;
use crate::worker::protocol::{DrawAck, DrawRequest};

struct DrawCommand {
    request: DrawRequest,
    reply: oneshot::Sender<DrawAck>,
}

/// Handle to the task that owns surface `S`.
///
/// The surface is moved in by [`DrawWorker::start`] and only comes back
/// through [`DrawWorker::shutdown`]. `draw` takes `&mut self`, so requests
/// are serialized by the borrow checker.
pub struct DrawWorker<S> {
    commands: mpsc::Sender<DrawCommand>,
    task: JoinHandle<S>,
}

impl<S> DrawWorker<S>
where
    S: Surface + Send + 'static,
{
    /// Hand `surface` to a new draw task and wait for it to report ready.
    pub async fn start(surface: S) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| EngineError::TaskSetupFailure(e.to_string()))?;
        let (commands, rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = oneshot::channel();
        let task = runtime.spawn(run_draw_task(surface, rx, ready_tx));

        match ready_rx.await {
            Ok(DrawAck::Ready) => Ok(Self { commands, task }),
            Ok(DrawAck::Error(msg)) => Err(EngineError::DrawSurfaceUnavailable(msg)),
            Ok(other) => Err(EngineError::TaskFailed(format!(
                "draw task sent {other:?} before ready"
            ))),
            Err(_) => Err(EngineError::TaskSetupFailure(
                "draw task exited before taking the surface".into(),
            )),
        }
    }

    /// Render one request and wait for its acknowledgment.
    pub async fn draw(&mut self, request: DrawRequest) -> Result<RenderStats> {
        let (reply, ack) = oneshot::channel();
        self.commands
            .send(DrawCommand { request, reply })
            .await
            .map_err(|_| EngineError::TaskFailed("draw task is gone".into()))?;

        match ack.await {
            Ok(DrawAck::DrawComplete(stats)) => Ok(stats),
            Ok(DrawAck::Error(msg)) => Err(EngineError::TaskFailed(msg)),
            Ok(DrawAck::Ready) => Err(EngineError::TaskFailed("unexpected ready acknowledgment".into())),
            Err(_) => Err(EngineError::TaskFailed("draw task dropped the request".into())),
        }
    }

    pub async fn draw_grid(&mut self, grid: SpectrogramGrid, config: &RenderConfig) -> Result<RenderStats> {
        self.draw(DrawRequest::new(grid, config)).await
    }

    /// Stop the task and take the surface back.
    pub async fn shutdown(self) -> Result<S> {
        drop(self.commands);
        self.task
            .await
            .map_err(|e| EngineError::TaskFailed(format!("draw task died: {e}")))
    }
}

async fn run_draw_task<S: Surface>(
    mut surface: S,
    mut commands: mpsc::Receiver<DrawCommand>,
    ready: oneshot::Sender<DrawAck>,
) -> S {
    let (w, h) = surface.size();
    log::debug!("draw task took ownership of a {w}x{h} surface");
    if ready.send(DrawAck::Ready).is_err() {
        return surface;
    }

    while let Some(DrawCommand { request, reply }) = commands.recv().await {
        let config = request.render_config();
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            render(&mut surface, &request.grid, &config)
        }));
        let ack = match outcome {
            Ok(Ok(stats)) => DrawAck::DrawComplete(stats),
            Ok(Err(e)) => {
                log::error!("draw failed: {e}");
                DrawAck::Error(e.to_string())
            }
            Err(panic) => {
                let msg = format!("draw task panicked: {}", panic_message(panic.as_ref()));
                log::error!("{msg}");
                DrawAck::Error(msg)
            }
        };
        let _ = reply.send(ack);
    }
    log::debug!("draw task shutting down");
    surface
}
