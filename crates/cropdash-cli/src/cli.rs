use clap::{Parser, Subcommand};
use cropdash_core::models::{Language, ModelFamily, ScalingMethod};
use std::path::PathBuf;

/// Cropdash - Crop advisory and model research dashboards in the terminal
#[derive(Parser, Debug)]
#[command(name = "cropdash")]
#[command(about = "Crop advisory and model research dashboards", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Backend to talk to (http or memory)
    #[arg(long, global = true, default_value = "http")]
    pub client: ClientBackend,

    /// Backend base URL (e.g., http://127.0.0.1:5000/api)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Language for recommendations (en, hi, mr, es, fr)
    #[arg(long, global = true)]
    pub language: Option<Language>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ClientBackend {
    /// Live prediction backend over HTTP (default)
    Http,
    /// Built-in fixture data, no network
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Type a location and list the suggestions it settles on
    Search(SearchArgs),

    /// Search, pick a suggestion and fetch a crop recommendation
    Predict(PredictArgs),

    /// Load every research metric and summarize the snapshot
    Dashboard(DashboardArgs),

    /// Run a what-if simulation over the research dashboard
    Simulate(SimulateArgs),

    /// Show the static training reports
    Artifacts,

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Location text, fed in one character at a time
    pub text: String,

    /// Delay between simulated keystrokes in milliseconds
    #[arg(long, default_value = "80")]
    pub keystroke_ms: u64,
}

#[derive(Parser, Debug)]
pub struct PredictArgs {
    /// Location text to search for
    pub text: String,

    /// Which suggestion to accept (1-based)
    #[arg(long, default_value = "1")]
    pub pick: usize,

    /// Delay between simulated keystrokes in milliseconds
    #[arg(long, default_value = "80")]
    pub keystroke_ms: u64,
}

#[derive(Parser, Debug)]
pub struct DashboardArgs {
    /// Print the full payload of one metric (e.g., cross-validation)
    #[arg(long)]
    pub metric: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Model family (e.g., "Random Forest", adaboost, gradient-boosting)
    #[arg(long, default_value = "Random Forest")]
    pub model: ModelFamily,

    /// Number of estimators (10-500)
    #[arg(long, default_value = "100")]
    pub estimators: u32,

    /// Maximum tree depth (1-50, unlimited if omitted)
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Learning rate for boosting models (0.01-1.0)
    #[arg(long, default_value = "0.1")]
    pub learning_rate: f64,

    /// Number of KMeans clusters (2-50)
    #[arg(long, default_value = "22")]
    pub clusters: u32,

    /// Oversample minority classes with SMOTE
    #[arg(long)]
    pub smote: bool,

    /// Feature scaling (standard or minmax)
    #[arg(long, default_value = "standard")]
    pub scaling: ScalingMethod,

    /// Reset afterwards and confirm production metrics are restored
    #[arg(long)]
    pub reset: bool,
}
