mod cli;
mod decode;

use anyhow::Context;
use clap::Parser;
use spectroscope_core::{AnalysisRequest, Orchestrator, PixmapSurface, Surface};

use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let (analysis, mut render) = args.resolve()?;

    let audio = decode::read_wav(&args.input)?;
    render.duration = audio.duration;

    let orchestrator = Orchestrator::new(analysis)?;
    let request =
        AnalysisRequest::new(audio.channels, audio.sample_rate).with_duration(audio.duration);

    let mut last_logged = None;
    let grid = orchestrator
        .analyze(request, |p| {
            let pct = p.percentage_complete.floor() as u32;
            if last_logged != Some(pct) {
                log::info!("analysing: {}% ({}/{} slices)", pct, p.processed_slices, p.total_slices);
                last_logged = Some(pct);
            }
        })
        .await
        .context("analysis failed")?;
    log::info!(
        "{} frames x {} bins, {:.1} Hz per bin",
        grid.len(),
        grid.bin_count(),
        grid.frequency_resolution()
    );

    let mut worker = orchestrator.attach_surface(PixmapSurface::new(1, 1)?).await?;
    let stats = worker.draw_grid(grid, &render).await.context("render failed")?;
    let surface = worker.shutdown().await?;
    surface
        .save_png(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let (width, height) = surface.size();
    log::info!(
        "wrote {} ({}x{}, {} columns, {} cells)",
        args.output.display(),
        width,
        height,
        stats.columns,
        stats.cells
    );
    Ok(())
}
