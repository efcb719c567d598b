//! Static resources.
//!
//! [`StaticFiles`] serves a directory mounted with
//! [`Router::resources_path`](crate::Router::resources_path):
//!
//! - directory requests fall back to `index.html`
//! - `ETag` and `Last-Modified` validators with `304 Not Modified`
//! - content type guessed from the file extension
//! - `..` segments, hidden files and paths escaping the root are refused

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use http::{Method, StatusCode};
use http_body_util::Full;
use thiserror::Error;
use tracing::debug;

use crate::handler::Response;
use crate::response::{empty, plain_text};

/// Errors raised while serving a resource.
#[derive(Debug, Error)]
pub enum StaticFileError {
    /// Nothing to serve at this path.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The path is refused.
    #[error("forbidden path: {0}")]
    Forbidden(String),

    /// Only GET and HEAD are served.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StaticFileError {
    /// The status answered for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A directory of static resources.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index_file: Option<String>,
    serve_hidden: bool,
}

impl StaticFiles {
    /// Serves files below `root`, with `index.html` as directory index.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            index_file: Some("index.html".to_string()),
            serve_hidden: false,
        }
    }

    /// Sets the directory index file; `None` disables it.
    #[must_use]
    pub fn index(mut self, index: Option<&str>) -> Self {
        self.index_file = index.map(str::to_string);
        self
    }

    /// Serves files whose name starts with a dot.
    #[must_use]
    pub fn serve_hidden(mut self, enabled: bool) -> Self {
        self.serve_hidden = enabled;
        self
    }

    /// The served directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serves `relative` (a path below the root), answering errors as
    /// plain text responses.
    #[must_use]
    pub fn serve(&self, relative: &str, method: &Method, headers: &HeaderMap) -> Response {
        match self.handle(relative, method, headers) {
            Ok(response) => response,
            Err(e) => {
                debug!(path = relative, error = %e, "static resource refused");
                plain_text(e.status_code(), e.to_string())
            }
        }
    }

    /// Serves `relative`, reporting failures as [`StaticFileError`].
    pub fn handle(&self, relative: &str, method: &Method, headers: &HeaderMap) -> Result<Response, StaticFileError> {
        if method != Method::GET && method != Method::HEAD {
            return Err(StaticFileError::MethodNotAllowed);
        }

        let mut path = self.resolve_path(relative)?;
        if path.is_dir() {
            path = match &self.index_file {
                Some(index) if path.join(index).is_file() => path.join(index),
                _ => return Err(StaticFileError::NotFound(relative.to_string())),
            };
        }

        self.serve_file(&path, method, headers)
    }

    fn resolve_path(&self, relative: &str) -> Result<PathBuf, StaticFileError> {
        let relative = relative.trim_start_matches('/');

        for component in Path::new(relative).components() {
            match component {
                Component::Normal(name) => {
                    let hidden = name.to_str().is_some_and(|n| n.starts_with('.'));
                    if hidden && !self.serve_hidden {
                        return Err(StaticFileError::Forbidden(relative.to_string()));
                    }
                }
                Component::CurDir => {}
                _ => return Err(StaticFileError::Forbidden(relative.to_string())),
            }
        }

        let root = self
            .root
            .canonicalize()
            .map_err(|_| StaticFileError::NotFound(relative.to_string()))?;
        let full = root
            .join(relative)
            .canonicalize()
            .map_err(|_| StaticFileError::NotFound(relative.to_string()))?;

        if !full.starts_with(&root) {
            return Err(StaticFileError::Forbidden(relative.to_string()));
        }

        Ok(full)
    }

    fn serve_file(&self, path: &Path, method: &Method, headers: &HeaderMap) -> Result<Response, StaticFileError> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified().ok();
        let etag = entity_tag(path, metadata.len(), modified);

        if is_not_modified(headers, etag.as_deref(), modified) {
            let mut response = empty(StatusCode::NOT_MODIFIED);
            if let Some(etag) = etag.as_deref().and_then(|e| HeaderValue::from_str(e).ok()) {
                response.headers_mut().insert(ETAG, etag);
            }
            return Ok(response);
        }

        let body = if method == Method::HEAD {
            Bytes::new()
        } else {
            Bytes::from(std::fs::read(path)?)
        };

        let mut response = Response::new(Full::new(body));
        let out = response.headers_mut();
        out.insert(CONTENT_TYPE, HeaderValue::from_static(mime_type(path)));
        out.insert(CONTENT_LENGTH, HeaderValue::from(metadata.len()));
        if let Some(etag) = etag.as_deref().and_then(|e| HeaderValue::from_str(e).ok()) {
            out.insert(ETAG, etag);
        }
        if let Some(modified) = modified {
            if let Ok(value) = HeaderValue::from_str(&httpdate::fmt_http_date(modified)) {
                out.insert(LAST_MODIFIED, value);
            }
        }

        Ok(response)
    }
}

fn entity_tag(path: &Path, size: u64, modified: Option<SystemTime>) -> Option<String> {
    let secs = modified?.duration_since(SystemTime::UNIX_EPOCH).ok()?.as_secs();
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    Some(format!("\"{secs:x}-{size:x}-{:x}\"", hasher.finish() & 0xffff))
}

fn is_not_modified(headers: &HeaderMap, etag: Option<&str>, modified: Option<SystemTime>) -> bool {
    if let Some(candidates) = headers.get(IF_NONE_MATCH).and_then(|v| v.to_str().ok()) {
        return etag.is_some_and(|etag| candidates == "*" || candidates.split(',').any(|c| c.trim() == etag));
    }

    let since = headers
        .get(IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok());

    match (since, modified) {
        (Some(since), Some(modified)) => {
            let secs = |t: SystemTime| t.duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
            secs(modified) <= secs(since)
        }
        _ => false,
    }
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "txt" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "wasm" => "application/wasm",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
