use clap::Parser;

use geecache_cli::args::Cli;
use geecache_cli::commands::dispatch;
use geecache_cli::logging;
use geecache_core::CacheError;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            e.downcast_ref::<CacheError>()
                .map(CacheError::exit_code)
                .unwrap_or(2)
        }
    };
    std::process::exit(code);
}
