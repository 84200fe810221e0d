// src/main.rs
use std::fs;
use std::path::Path;
use anyhow::{bail, Context, Result};
use logssar::{ArtifactPipeline, LogProgress, Recording, RejectionOptions};
fn load_options(path: Option<&str>) -> Result<RejectionOptions> {
    let Some(path) = path else {
        return Ok(RejectionOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading options {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing options {path}"))
}
fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() > 3 {
        bail!("usage: logssar <recording.json> [options.json] [output.json]");
    }
    let text = fs::read_to_string(&args[0])
        .with_context(|| format!("reading recording {}", args[0]))?;
    let recording: Recording =
        serde_json::from_str(&text).with_context(|| format!("parsing recording {}", args[0]))?;
    log::info!(
        "{}: {} samples at {} Hz ({:.1} s), {} stimuli",
        args[0],
        recording.len(),
        recording.sample_rate_hz,
        recording.duration_s(),
        recording.stimulus_indices.len()
    );
    let options = load_options(args.get(1).map(String::as_str))?;
    let mut pipeline = ArtifactPipeline::new(options, LogProgress);
    let result = pipeline
        .run_recording(&recording)
        .context("artifact rejection failed")?;
    let json = serde_json::to_string(&result)?;
    match args.get(2) {
        Some(out) => fs::write(Path::new(out), json).with_context(|| format!("writing {out}"))?,
        None => println!("{json}"),
    }
    Ok(())
}
