use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use geecache_core::{CacheError, HttpPool, NodeConfig, Registry};
use tokio::net::TcpListener;
use tracing::info;

use crate::args::{Cli, Command, GetArgs, ServeArgs};
use crate::server;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Get(args) => cmd_get(args).await,
    }
}

/// Load config, apply overrides and wire the registry.
///
/// Precedence is file, then `GEECACHE_*` environment, then CLI flags. Any
/// failure here is a startup misconfiguration and ends the process.
pub fn prepare(
    config_path: &std::path::Path,
    addr: Option<String>,
    base_path: Option<String>,
) -> Result<(NodeConfig, Arc<Registry>), CacheError> {
    let mut config = NodeConfig::load(config_path)?.with_env_overrides();
    if let Some(addr) = addr {
        config.addr = addr;
    }
    if let Some(base_path) = base_path {
        config.base_path = base_path;
    }
    config.validate()?;

    let registry = Arc::new(config.build_registry()?);
    info!(groups = ?registry.group_names(), "registry ready");
    Ok((config, registry))
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<i32> {
    let (config, registry) = prepare(&args.config, args.addr, args.base_path)?;

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    let self_addr = format!("http://{}", listener.local_addr()?);
    let pool = Arc::new(HttpPool::new(self_addr, registry).with_base_path(config.base_path)?);

    server::serve(listener, pool, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;
    Ok(0)
}

async fn cmd_get(args: GetArgs) -> anyhow::Result<i32> {
    let (_config, registry) = prepare(&args.config, None, None)?;
    let group = registry
        .get_group(&args.group)
        .ok_or_else(|| CacheError::GroupNotFound {
            group: args.group.clone(),
        })?;

    let key = args.key;
    let view = tokio::task::spawn_blocking(move || group.get(&key)).await??;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&view.byte_slice())?;
    stdout.flush()?;
    Ok(0)
}
