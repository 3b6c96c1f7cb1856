use spectroscope_core::worker::spawn_analysis;
use spectroscope_core::{AnalysisConfig, AnalysisEvent, AnalysisRequest, EngineError, Orchestrator};

fn sine(freq: f64, sample_rate: u32, secs: f64) -> Vec<f32> {
    let len = (sample_rate as f64 * secs).round() as usize;
    (0..len)
        .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin() as f32 * 0.5)
        .collect()
}

#[tokio::test]
async fn test_progress_arrives_in_order_before_result() {
    let orchestrator = Orchestrator::new(AnalysisConfig::default()).unwrap();
    let request = AnalysisRequest::new(vec![sine(440.0, 44100, 1.0)], 44100);
    let mut job = orchestrator.start_analysis(request).unwrap();

    let mut processed = Vec::new();
    let mut grid = None;
    while let Some(event) = job.next_event().await {
        match event {
            AnalysisEvent::Progress(p) => {
                assert!(grid.is_none(), "progress after the terminal event");
                assert_eq!(p.frames.len(), p.processed_slices);
                processed.push(p.processed_slices);
            }
            AnalysisEvent::Result(g) => grid = Some(g),
            AnalysisEvent::Error(msg) => panic!("unexpected error: {msg}"),
        }
    }

    let grid = grid.expect("no result");
    assert_eq!(grid.len(), 20);
    assert_eq!(processed, (1..=20).collect::<Vec<_>>());
    assert!(job.next_event().await.is_none());
}

#[tokio::test]
async fn test_stereo_request_downmixes() {
    let orchestrator = Orchestrator::new(AnalysisConfig::default()).unwrap();
    let len = 44100 / 4;
    let request = AnalysisRequest::new(vec![vec![1.0; len], vec![-1.0; len]], 44100);
    let grid = orchestrator.analyze(request, |_| {}).await.unwrap();

    assert_eq!(grid.len(), 5);
    assert!(grid.frames().iter().all(|f| f.magnitudes.iter().all(|&m| m == 0.0)));
}

#[tokio::test]
async fn test_request_uses_orchestrator_slice_length() {
    let config = AnalysisConfig {
        time_slice_secs: 0.1,
        ..Default::default()
    };
    let orchestrator = Orchestrator::new(config).unwrap();
    let grid = orchestrator
        .analyze(AnalysisRequest::new(vec![vec![0.1; 44100]], 44100), |_| {})
        .await
        .unwrap();
    assert_eq!(grid.len(), 10);
    assert_eq!(grid.time_slice_secs(), 0.1);

    // an explicit slice length on the request still wins
    let request = AnalysisRequest::new(vec![vec![0.1; 44100]], 44100).with_time_slice(0.25);
    let grid = orchestrator.analyze(request, |_| {}).await.unwrap();
    assert_eq!(grid.len(), 4);
    assert_eq!(grid.time_slice_secs(), 0.25);
}

#[tokio::test]
async fn test_bad_request_yields_single_error() {
    let orchestrator = Orchestrator::new(AnalysisConfig::default()).unwrap();
    let mut request = AnalysisRequest::new(vec![vec![0.0; 4410]], 44100);
    request.channel_count = 2;
    let mut job = orchestrator.start_analysis(request).unwrap();

    let mut events = Vec::new();
    while let Some(event) = job.next_event().await {
        events.push(event);
    }
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], AnalysisEvent::Error(msg) if msg.contains("channels")));
}

#[tokio::test]
async fn test_invalid_fft_size_is_reported_as_error_event() {
    let config = AnalysisConfig {
        fft_size: 1000,
        ..Default::default()
    };
    let request = AnalysisRequest::new(vec![vec![0.0; 4410]], 44100);
    let job = spawn_analysis(request, config).unwrap();
    let err = job.finish(|_| {}).await.unwrap_err();
    assert!(matches!(err, EngineError::TaskFailed(msg) if msg.contains("power of two")));
}

#[tokio::test]
async fn test_long_analysis_yields_to_the_host() {
    // 200 slices with a progress event for each; the analyzer yields every 50
    // slices, so the host sees events before the whole run is done.
    let config = AnalysisConfig {
        fft_size: 256,
        progress_updates: 200,
        ..Default::default()
    };
    let orchestrator = Orchestrator::new(config).unwrap();
    let request = AnalysisRequest::new(vec![sine(440.0, 8000, 10.0)], 8000);
    let mut job = orchestrator.start_analysis(request).unwrap();

    let first = job.next_event().await.unwrap();
    assert!(matches!(first, AnalysisEvent::Progress(_)));
    let mut batch = 1;
    while let Some(event) = job.try_next_event() {
        assert!(!event.is_terminal(), "whole analysis ran without yielding");
        batch += 1;
    }
    assert!(batch < 200, "saw {batch} events in the first batch");

    let grid = job.finish(|_| {}).await.unwrap();
    assert_eq!(grid.len(), 200);
}

#[tokio::test]
async fn test_cancel_keeps_last_snapshot() {
    let config = AnalysisConfig {
        fft_size: 256,
        progress_updates: 200,
        ..Default::default()
    };
    let orchestrator = Orchestrator::new(config).unwrap();
    let request = AnalysisRequest::new(vec![sine(440.0, 8000, 10.0)], 8000);
    let mut job = orchestrator.start_analysis(request).unwrap();

    let Some(AnalysisEvent::Progress(first)) = job.next_event().await else {
        panic!("expected progress first");
    };
    let snapshot = job.cancel().expect("a snapshot was delivered");
    assert_eq!(snapshot, first);
    assert!(snapshot.processed_slices < 200);
}

#[test]
fn test_spawn_outside_runtime_is_setup_failure() {
    let request = AnalysisRequest::new(vec![vec![0.0; 100]], 8000);
    let err = spawn_analysis(request, AnalysisConfig::default()).err().unwrap();
    assert!(matches!(err, EngineError::TaskSetupFailure(_)));
}
