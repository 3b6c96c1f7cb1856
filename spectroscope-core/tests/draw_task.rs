use spectroscope_core::canvas::colors::BACKGROUND;
use spectroscope_core::{
    AnalysisConfig, AnalysisRequest, DrawWorker, EngineError, Orchestrator, PixmapSurface, RenderConfig, Rgba,
    SpectrogramFrame, SpectrogramGrid, Surface,
};

fn tone_grid() -> SpectrogramGrid {
    let mut magnitudes = vec![0.0; 2048];
    // ~1 kHz at 44.1 kHz / 4096
    magnitudes[93] = 0.8;
    let frames = (0..20)
        .map(|i| SpectrogramFrame {
            magnitudes: magnitudes.clone(),
            time_offset: i as f64 * 0.05,
        })
        .collect();
    SpectrogramGrid::new(frames, 44100, 4096, 0.05)
}

fn render_config() -> RenderConfig {
    RenderConfig {
        width: 320,
        height: 200,
        duration: 1.0,
        ..Default::default()
    }
}

/// Surface that cannot be resized, like a canvas whose context was lost.
struct LostContext;

impl Surface for LostContext {
    fn resize(&mut self, _width: u32, _height: u32) -> spectroscope_core::Result<()> {
        Err(EngineError::DrawSurfaceUnavailable("context lost".into()))
    }
    fn size(&self) -> (u32, u32) {
        (0, 0)
    }
    fn set_scale(&mut self, _scale: f32) {}
    fn clear(&mut self, _color: Rgba) {}
    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _color: Rgba) {}
    fn stroke_line(&mut self, _from: (f32, f32), _to: (f32, f32), _width: f32, _color: Rgba) {}
}

/// Surface that panics on its first draw and behaves afterwards.
struct Flaky {
    inner: PixmapSurface,
    armed: bool,
}

impl Surface for Flaky {
    fn resize(&mut self, width: u32, height: u32) -> spectroscope_core::Result<()> {
        if std::mem::take(&mut self.armed) {
            panic!("driver fault");
        }
        self.inner.resize(width, height)
    }
    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }
    fn set_scale(&mut self, scale: f32) {
        self.inner.set_scale(scale)
    }
    fn clear(&mut self, color: Rgba) {
        self.inner.clear(color)
    }
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.inner.fill_rect(x, y, w, h, color)
    }
    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgba) {
        self.inner.stroke_line(from, to, width, color)
    }
}

#[tokio::test]
async fn test_draw_writes_into_owned_surface() {
    let mut worker = DrawWorker::start(PixmapSurface::new(1, 1).unwrap()).await.unwrap();
    let stats = worker.draw_grid(tone_grid(), &render_config()).await.unwrap();
    assert_eq!(stats.columns, 20);
    assert_eq!(stats.cells, 20);

    let surface = worker.shutdown().await.unwrap();
    assert_eq!(surface.size(), (320, 200));
    let corner = surface.pixel(319, 0).unwrap();
    assert_eq!(&corner[..3], &[BACKGROUND.r, BACKGROUND.g, BACKGROUND.b]);
}

#[tokio::test]
async fn test_many_draws_on_one_surface() {
    let mut worker = DrawWorker::start(PixmapSurface::new(1, 1).unwrap()).await.unwrap();
    for dpr in [1.0, 2.0, 1.5] {
        let config = RenderConfig {
            device_pixel_ratio: dpr,
            ..render_config()
        };
        worker.draw_grid(tone_grid(), &config).await.unwrap();
    }
    let surface = worker.shutdown().await.unwrap();
    assert_eq!(surface.size(), (480, 300));
}

#[tokio::test]
async fn test_unavailable_surface_is_acknowledged_as_error() {
    let mut worker = DrawWorker::start(LostContext).await.unwrap();
    let err = worker.draw_grid(tone_grid(), &render_config()).await.unwrap_err();
    assert!(matches!(err, EngineError::TaskFailed(msg) if msg.contains("context lost")));
    // the task keeps serving after an error
    assert!(worker.draw_grid(tone_grid(), &render_config()).await.is_err());
}

#[tokio::test]
async fn test_panicking_draw_surfaces_as_error_not_silence() {
    let surface = Flaky {
        inner: PixmapSurface::new(1, 1).unwrap(),
        armed: true,
    };
    let mut worker = DrawWorker::start(surface).await.unwrap();
    let err = worker.draw_grid(tone_grid(), &render_config()).await.unwrap_err();
    assert!(matches!(err, EngineError::TaskFailed(msg) if msg.contains("driver fault")));

    let stats = worker.draw_grid(tone_grid(), &render_config()).await.unwrap();
    assert_eq!(stats.columns, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_analysis_then_draw_end_to_end() {
    let orchestrator = Orchestrator::new(AnalysisConfig::default()).unwrap();
    let samples: Vec<f32> = (0..44100)
        .map(|i| (2.0 * std::f64::consts::PI * 1000.0 * i as f64 / 44100.0).sin() as f32 * 0.5)
        .collect();
    let mut events = 0;
    let grid = orchestrator
        .analyze(AnalysisRequest::new(vec![samples], 44100), |_| events += 1)
        .await
        .unwrap();
    assert_eq!(events, 20);

    let mut worker = orchestrator
        .attach_surface(PixmapSurface::new(1, 1).unwrap())
        .await
        .unwrap();
    let stats = worker.draw_grid(grid, &render_config()).await.unwrap();
    assert_eq!(stats.columns, 20);
    assert!(stats.cells > 0);

    let png = worker.shutdown().await.unwrap().encode_png().unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn test_start_outside_runtime_is_setup_failure() {
    let result = futures::executor::block_on(DrawWorker::start(PixmapSurface::new(1, 1).unwrap()));
    assert!(matches!(result, Err(EngineError::TaskSetupFailure(_))));
}
