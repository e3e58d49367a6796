//! Static preview server for the distribution root.
//!
//! A URI resolves to the first existing file of:
//!
//! | request  | candidates                                                 |
//! |----------|------------------------------------------------------------|
//! | `/`      | `index.html`, `index`                                      |
//! | `/a/b`   | `a/b`, `a/b.html`, `a/b/index.html`, `a/b/index`           |
//!
//! so both file naming policies preview correctly.

use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use percent_encoding::percent_decode_str;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::config::SnapConfig;
use crate::core::Cancellation;
use crate::utils::mime::{self, types::PLAIN};
use crate::{debug, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Serve `output.dir` until Ctrl+C.
pub fn run_preview(config: &SnapConfig, cancel: &Cancellation) -> Result<()> {
    let root = &config.output.dir;
    if !root.is_dir() {
        log!("warn"; "{} does not exist yet, run `snapsite generate` first",
            config.root_relative(root).display());
    }

    let (server, addr) = bind_with_retry(config.preview.interface, config.preview.port)?;
    log!("preview"; "http://{}", addr);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create preview worker pool")?;

    while !cancel.is_cancelled() {
        let request = match server.recv_timeout(Duration::from_millis(200)) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                log!("preview"; "accept error: {e}");
                continue;
            }
        };
        let root = root.clone();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &root) {
                log!("preview"; "request error: {e}");
            }
        });
    }

    log!("preview"; "stopped");
    Ok(())
}

/// Bind to the specified interface and port, with automatic port retry.
fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("preview"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

fn handle_request(request: Request, root: &Path) -> Result<()> {
    debug!("preview"; "{} {}", request.method(), request.url());

    if !matches!(request.method(), Method::Get | Method::Head) {
        return send(request, 405, PLAIN, b"405 Method Not Allowed".to_vec());
    }

    let Some(path) = resolve_path(request.url(), root) else {
        let custom = root.join("404.html");
        if custom.is_file() {
            let body = fs::read(&custom)?;
            return send(request, 404, mime::types::HTML, body);
        }
        return send(request, 404, PLAIN, b"404 Not Found".to_vec());
    };

    let body = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    send(request, 200, mime::from_path(&path), body)
}

fn send(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let header = Header::from_bytes("Content-Type", content_type)
        .map_err(|()| anyhow!("invalid content type `{content_type}`"))?;
    let body = if request.method() == &Method::Head { Vec::new() } else { body };
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header);
    request.respond(response)?;
    Ok(())
}

/// Resolve a request URL to a file under `root`.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    // Canonicalize to resolve symlinks and verify path is under root
    let root = root.canonicalize().ok()?;
    candidates(&clean)
        .into_iter()
        .filter_map(|candidate| root.join(candidate).canonicalize().ok())
        .find(|path| path.starts_with(&root) && path.is_file())
}

fn candidates(clean: &str) -> Vec<String> {
    if clean.is_empty() {
        return vec!["index.html".into(), "index".into()];
    }
    vec![
        clean.to_string(),
        format!("{clean}.html"),
        format!("{clean}/index.html"),
        format!("{clean}/index"),
    ]
}

/// Decode, strip query string, trim slashes.
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    decoded.trim_matches('/').to_string()
}
