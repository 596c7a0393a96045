//! HTTP server for the shared document.
//!
//! Routes:
//!
//! | Method          | Path           | Action                                 |
//! |-----------------|----------------|----------------------------------------|
//! | GET, HEAD       | `/`            | Editor page                            |
//! | GET, HEAD       | `/api/content` | `{"content": ...}` (`?raw` for text)   |
//! | GET, HEAD       | `/raw`         | Document as `text/plain`               |
//! | POST, PUT       | `/api/content` | Save (JSON `{"content"}` or raw text)  |

mod lifecycle;
mod payload;
mod response;

use crate::{
    actor::{Coordinator, ReconcilerHandle},
    config::cfg,
    core::is_shutdown,
    debug,
    embed::serve::{INDEX_HTML, IndexVars},
    log,
    reload::start_ws_server,
    utils::mime,
};
use anyhow::{Context, Result};
use crossbeam::channel;
use std::io::Read;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

use payload::{MAX_BODY_BYTES, PayloadError, normalize_payload};

/// Request worker threads
const REQUEST_THREADS: usize = 4;

/// What request handlers need, shared across the pool.
#[derive(Clone)]
struct ServeContext {
    handle: ReconcilerHandle,
    /// Rendered editor page (fixed once the WebSocket port is known)
    index_html: Arc<str>,
}

/// Serve the document until Ctrl+C.
pub fn serve() -> Result<()> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    // Watchers attach inside build(), before the document is read
    let engine = Coordinator::with_config(Arc::clone(&config))
        .with_shutdown_signal(shutdown_rx)
        .build();
    let handle = engine.handle();

    let ws_port = start_ws_server(config.serve.interface, config.serve.ws_port, engine.broadcaster())
        .context("Failed to start live-update server")?;
    let actors = lifecycle::spawn_actors(engine)?;

    log!("serve"; "http://{}", addr);
    log!("serve"; "document: {}", config.document_path().display());
    debug!("serve"; "live updates: ws://{}:{}", config.serve.interface, ws_port);

    let title = config
        .document_path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let index_html = INDEX_HTML.render(&IndexVars {
        title: &title,
        ws_port,
        version: env!("CARGO_PKG_VERSION"),
    });

    let ctx = ServeContext {
        handle,
        index_html: Arc::from(index_html),
    };
    run_request_loop(&server, ctx)?;
    lifecycle::wait_for_shutdown(actors);
    Ok(())
}

fn run_request_loop(server: &Server, ctx: ServeContext) -> Result<()> {
    // Handlers block on the reconciler; keep them off the accept thread
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(REQUEST_THREADS)
        .thread_name(|i| format!("syncpad-http-{i}"))
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let ctx = ctx.clone();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
    Ok(())
}

// =============================================================================
// routing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Index,
    /// `/api/content`; `raw` when the query asks for plain text
    Content { raw: bool },
    Raw,
    NotFound,
}

impl Route {
    fn parse(url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let path = path.trim_end_matches('/');

        match path {
            "" | "/index.html" => Self::Index,
            "/api/content" => Self::Content {
                raw: query_flag(query, "raw"),
            },
            "/raw" => Self::Raw,
            _ => Self::NotFound,
        }
    }

    /// `Allow` header value for 405 responses
    fn allowed(self) -> &'static str {
        match self {
            Self::Content { .. } => "GET, HEAD, POST, PUT",
            _ => "GET, HEAD",
        }
    }
}

/// Whether `name` appears in the query string (`raw`, `raw=1`, `raw=true`).
fn query_flag(query: &str, name: &str) -> bool {
    query.split('&').any(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        key == name && !matches!(value, "0" | "false")
    })
}

/// Handle a single HTTP request
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    // Early exit if shutdown requested
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let route = Route::parse(request.url());
    let method = request.method().clone();

    match (route, method) {
        (Route::NotFound, _) => response::respond_not_found(request),
        (Route::Index, Method::Get | Method::Head) => {
            response::respond_index(request, ctx.index_html.to_string())
        }
        (Route::Content { raw }, Method::Get | Method::Head) => {
            let Ok(content) = ctx.handle.get_blocking() else {
                return response::respond_unavailable(request);
            };
            if raw {
                response::respond_content_raw(request, &content)
            } else {
                response::respond_content_json(request, &content)
            }
        }
        (Route::Raw, Method::Get | Method::Head) => {
            let Ok(content) = ctx.handle.get_blocking() else {
                return response::respond_unavailable(request);
            };
            response::respond_content_raw(request, &content)
        }
        (Route::Content { .. }, Method::Post | Method::Put) => handle_save(request, ctx),
        (route, _) => response::respond_method_not_allowed(request, route.allowed()),
    }
}

/// Write endpoint: normalize the body, then hand it to the reconciler.
fn handle_save(mut request: Request, ctx: &ServeContext) -> Result<()> {
    let is_json = response::header_value(&request, "Content-Type")
        .is_some_and(|value| mime::is_json(&value));

    let content = match read_body(&mut request).and_then(|body| normalize_payload(body, is_json)) {
        Ok(content) => content,
        Err(e) => {
            debug!("serve"; "rejected write: {}", e);
            return response::respond_bad_payload(request, e.status(), &e.to_string());
        }
    };

    match ctx.handle.save_blocking(content) {
        Ok(outcome) => response::respond_saved(request, outcome.changed()),
        Err(e) => {
            log!("serve"; "save failed: {e:#}");
            response::respond_unavailable(request)
        }
    }
}

/// Read the body, refusing anything over the size limit.
fn read_body(request: &mut Request) -> Result<Vec<u8>, PayloadError> {
    if request.body_length().is_some_and(|len| len > MAX_BODY_BYTES) {
        return Err(PayloadError::TooLarge);
    }

    let mut body = Vec::new();
    let limit = MAX_BODY_BYTES as u64 + 1;
    request.as_reader().take(limit).read_to_end(&mut body)?;
    Ok(body)
}
