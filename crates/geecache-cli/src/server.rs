//! HTTP front end for [`HttpPool`].
//!
//! Every request goes to one fallback handler. The path is percent-decoded
//! and the lookup runs on tokio's blocking pool, since a loader may block for
//! as long as its backing store takes.

use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use geecache_core::{HttpPool, PoolResponse};
use tokio::net::TcpListener;
use tracing::{error, info};

pub fn router(pool: Arc<HttpPool>) -> Router {
    Router::new().fallback(handle).with_state(pool)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, pool: Arc<HttpPool>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, base_path = pool.base_path(), "geecache is running");
    axum::serve(listener, router(pool))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}

async fn handle(State(pool): State<Arc<HttpPool>>, method: Method, uri: Uri) -> Response {
    let path = match urlencoding::decode(uri.path()) {
        Ok(path) => path.into_owned(),
        Err(_) => {
            return (StatusCode::BAD_REQUEST, "request path is not valid UTF-8").into_response();
        }
    };

    let method = method.as_str().to_string();
    match tokio::task::spawn_blocking(move || pool.serve(&method, &path)).await {
        Ok(resp) => into_response(resp),
        Err(err) => {
            error!(error = %err, "lookup task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "lookup task failed").into_response()
        }
    }
}

fn into_response(resp: PoolResponse) -> Response {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = [(header::CONTENT_TYPE, resp.content_type)];
    (status, headers, resp.body).into_response()
}
