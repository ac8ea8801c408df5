use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "geecache",
    version,
    about = "Byte-budgeted LRU cache node serving cache-aside groups over HTTP"
)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "GEECACHE_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the configured groups over HTTP
    Serve(ServeArgs),
    /// Resolve one key through a configured group and print the bytes
    Get(GetArgs),
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Node config (YAML)
    #[arg(long, short = 'c', env = "GEECACHE_CONFIG")]
    pub config: PathBuf,

    /// Listen address; overrides the config file and `GEECACHE_ADDR`
    #[arg(long)]
    pub addr: Option<String>,

    /// Request prefix; overrides the config file and `GEECACHE_BASE_PATH`
    #[arg(long)]
    pub base_path: Option<String>,
}

#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Node config (YAML)
    #[arg(long, short = 'c', env = "GEECACHE_CONFIG")]
    pub config: PathBuf,

    pub group: String,

    pub key: String,
}
