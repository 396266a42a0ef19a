mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use trackscope::config::{self, AnalysisConfig};
use trackscope::{AnalysisError, AnalysisResult, BufferCache};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Explicit --config must load; an auto-detected one only warns.
    let mut config = match cli.config.as_ref() {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match config::discover_config() {
            Some(path) => match config::load_config(&path) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    cfg
                }
                Err(err) => {
                    log::warn!("Ignoring config {}: {}", path.display(), err);
                    AnalysisConfig::default()
                }
            },
            None => AnalysisConfig::default(),
        },
    };

    if let Some(timeout) = cli.timeout {
        config.timeout_secs = Some(timeout);
    }
    if let Some(transform) = cli.transform {
        config.transform = transform;
    }
    if cli.sequential {
        config.parallel = false;
    }
    config.validate()?;

    let mut cache = BufferCache::new(cli.cache_size);
    let pb = if cli.inputs.len() > 1 {
        let pb = ProgressBar::new(cli.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")
                .context("Invalid progress bar template")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut failures = 0usize;
    for input in &cli.inputs {
        match analyze_file(&mut cache, input, &config) {
            Ok(result) => print_result(input, &result, &cli)?,
            Err(err) => {
                failures += 1;
                let aborted = err
                    .downcast_ref::<AnalysisError>()
                    .is_some_and(AnalysisError::is_abort);
                if aborted {
                    log::warn!("{}: {:#}, skipping", input.display(), err);
                } else {
                    log::error!("{}: {:#}", input.display(), err);
                }
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Analysis complete");
    }
    let (hits, misses) = cache.stats();
    log::debug!("Buffer cache: {} hits, {} misses", hits, misses);

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, cli.inputs.len());
    }
    Ok(())
}

fn analyze_file(
    cache: &mut BufferCache,
    input: &std::path::Path,
    config: &AnalysisConfig,
) -> Result<AnalysisResult> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    log::info!("Decoding {}...", input.display());
    let buffer = cache.load(input)?;
    let result = trackscope::analyze(&buffer, config)
        .with_context(|| format!("Analysis of {} failed", input.display()))?;
    Ok(result)
}

fn print_result(input: &std::path::Path, result: &AnalysisResult, cli: &Cli) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if cli.legacy {
        println!("{}", serde_json::to_string(&result.legacy())?);
        return Ok(());
    }

    println!("{}", input.display());
    println!(
        "  tempo        {:.1} BPM{}",
        result.tempo,
        if result.tempo_is_default { " (default)" } else { "" }
    );
    println!("  key          {}", result.key);
    println!("  mood         {}", result.mood);
    println!("  energy       {:.0}/100", result.energy);
    println!("  danceability {:.0}/100", result.danceability);
    println!(
        "  genre        {} ({:.0}%){}",
        result.genre.primary,
        result.genre.confidence * 100.0,
        if result.genre.subgenres.is_empty() {
            String::new()
        } else {
            format!(" [{}]", result.genre.subgenres.join(", "))
        }
    );
    println!(
        "  rhythm       {} {}, {} onsets{}",
        result.rhythm.time_signature,
        result.rhythm.groove,
        result.rhythm.onsets.len(),
        if result.rhythm.polyrhythmic { ", polyrhythmic" } else { "" }
    );
    let chords: Vec<&str> = result.harmony.chords.iter().map(|c| c.label.as_str()).collect();
    println!("  chords       {}", chords.join(" "));
    if let Some(emotion) = result.emotion.dominant() {
        println!("  emotion      {:?}", emotion);
    }
    println!(
        "  loudness     {:.1} LUFS, DR {:.1} dB, HNR {:.1} dB",
        result.technical.loudness_lufs,
        result.technical.dynamic_range_db,
        result.technical.harmonic_to_noise_db
    );
    println!("  fingerprint  {}", result.fingerprint.digest);
    Ok(())
}
