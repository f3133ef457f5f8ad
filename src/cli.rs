use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_SOURCE_URL: &str =
    "https://github.com/Cybroad/TUT-Syllabus-API/archive/refs/heads/main.zip";

#[derive(Parser, Debug)]
#[command(
    name = "syllabus-index",
    version,
    about = "Builds the department-partitioned syllabus search index"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Update(UpdateArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: String,

    /// Read a previously downloaded archive instead of fetching `--source-url`.
    #[arg(long)]
    pub archive_path: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "api")]
    pub api_dir: String,

    #[arg(long, default_value = "search_index.json")]
    pub index_file: String,

    #[arg(long)]
    pub department_tables: Option<PathBuf>,

    #[arg(long, default_value_t = 500)]
    pub progress_every: usize,

    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    #[arg(long)]
    pub run_manifest: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "api")]
    pub api_dir: String,

    #[arg(long)]
    pub run_manifest: Option<PathBuf>,
}
