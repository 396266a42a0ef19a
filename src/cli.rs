use clap::Parser;
use std::path::PathBuf;

use trackscope::config::TransformKind;

#[derive(Parser, Debug)]
#[command(name = "trackscope", about = "Tempo, key, mood and genre analysis for audio files")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Config file (defaults to ./trackscope.toml, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Print only tempo, key, mood, energy and danceability
    #[arg(long, conflicts_with = "json")]
    pub legacy: bool,

    /// Abort an analysis after this many seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Spectral transform strategy
    #[arg(long, value_enum)]
    pub transform: Option<TransformKind>,

    /// Run the analyzers one after another instead of on the thread pool
    #[arg(long)]
    pub sequential: bool,

    /// Number of decoded files kept in memory
    #[arg(long, default_value_t = 8)]
    pub cache_size: usize,
}
