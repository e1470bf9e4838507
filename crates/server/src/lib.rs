//! Static file server for the roadside web build.
//!
//! Serves files below a root directory over GET and HEAD. Request paths are
//! percent-decoded, any `..` segment is refused, and the resolved file is
//! canonicalised so a symlink cannot reach outside the root.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 4173;

/// Failures while resolving or reading a requested file.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("request path leaves the served root")]
    Forbidden,
    #[error("request path is not valid percent-encoded UTF-8")]
    MalformedPath,
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl ServeError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Forbidden => StatusCode::FORBIDDEN,
            ServeError::MalformedPath => StatusCode::INTERNAL_SERVER_ERROR,
            ServeError::Io(err) => match err.kind() {
                io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match status {
            StatusCode::FORBIDDEN => "Forbidden",
            StatusCode::NOT_FOUND => "Not found",
            _ => "Internal server error",
        };
        (status, body).into_response()
    }
}

/// Bad values in the server's environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    Port(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub root: PathBuf,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT, root: PathBuf::from(".") }
    }
}

impl ServeConfig {
    /// Read `HOST`, `PORT` and `SERVE_ROOT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::Port(port))?;
        }
        if let Some(root) = lookup("SERVE_ROOT") {
            config.root = PathBuf::from(root);
        }
        Ok(config)
    }
}

/// Router that answers every path from files below `root`.
pub fn router(root: impl Into<PathBuf>) -> Router {
    Router::new().fallback(serve).with_state(Arc::new(root.into()))
}

async fn serve(State(root): State<Arc<PathBuf>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, "GET, HEAD")], "Method not allowed").into_response();
    }

    match load(&root, uri.path()).await {
        Ok((path, bytes)) => {
            log::debug!("{} {} -> {} ({} bytes)", method, uri.path(), path.display(), bytes.len());
            let headers = [
                (CONTENT_TYPE, HeaderValue::from_static(content_type(&path))),
                (CONTENT_LENGTH, HeaderValue::from(bytes.len())),
            ];
            let body = if method == Method::HEAD { Body::empty() } else { Body::from(bytes) };
            (headers, body).into_response()
        }
        Err(err) => {
            match err.status() {
                StatusCode::FORBIDDEN => log::warn!("Refused {} {}: {}", method, uri.path(), err),
                StatusCode::NOT_FOUND => log::debug!("{} {} -> 404", method, uri.path()),
                _ => log::error!("{} {} failed: {}", method, uri.path(), err),
            }
            err.into_response()
        }
    }
}

/// Resolve a raw request path to a file under `root` and read it.
async fn load(root: &Path, raw_path: &str) -> Result<(PathBuf, Vec<u8>), ServeError> {
    let relative = relative_path(raw_path)?;
    let mut path = root.join(relative);
    if tokio::fs::metadata(&path).await?.is_dir() {
        path.push("index.html");
    }

    let resolved = tokio::fs::canonicalize(&path).await?;
    let base = tokio::fs::canonicalize(root).await?;
    if !resolved.starts_with(&base) {
        return Err(ServeError::Forbidden);
    }

    let bytes = tokio::fs::read(&resolved).await?;
    Ok((resolved, bytes))
}

/// Decoded request path as a relative path. Empty and `.` segments are
/// dropped; a `..` segment anywhere is refused.
fn relative_path(raw_path: &str) -> Result<PathBuf, ServeError> {
    let decoded = percent_decode(raw_path).ok_or(ServeError::MalformedPath)?;
    let mut relative = PathBuf::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(ServeError::Forbidden),
            _ => relative.push(segment),
        }
    }
    Ok(relative)
}

/// Decode `%XX` escapes. `None` on a truncated escape, a non-hex digit, or a
/// result that is not UTF-8.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Scratch tree: `secret.txt` next to a served `site/` directory.
    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let site = dir.path().join("site");
            std::fs::create_dir_all(site.join("sub")).unwrap();
            std::fs::write(dir.path().join("secret.txt"), "keys are under the mat").unwrap();
            std::fs::write(site.join("index.html"), "<h1>Roadside</h1>").unwrap();
            std::fs::write(site.join("main.js"), "console.log('moon');").unwrap();
            std::fs::write(site.join("sub").join("index.html"), "<p>motel</p>").unwrap();
            std::fs::write(site.join("tape.xyz"), [0u8, 1, 2]).unwrap();
            Self { dir }
        }

        fn site(&self) -> PathBuf {
            self.dir.path().join("site")
        }
    }

    async fn send(root: PathBuf, method: Method, uri: &str) -> Response {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        router(root).oneshot(request).await.unwrap()
    }

    async fn get(root: PathBuf, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = send(root, Method::GET, uri).await;
        let status = response.status();
        let mime = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, mime, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn root_serves_index_html() {
        let fx = Fixture::new();
        let (status, mime, body) = get(fx.site(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mime.as_deref(), Some("text/html; charset=utf-8"));
        assert_eq!(body, "<h1>Roadside</h1>");
    }

    #[tokio::test]
    async fn directory_resolves_to_its_index() {
        let fx = Fixture::new();
        let (status, _, body) = get(fx.site(), "/sub").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<p>motel</p>");
    }

    #[tokio::test]
    async fn content_type_follows_extension() {
        let fx = Fixture::new();
        let (status, mime, _) = get(fx.site(), "/main.js").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mime.as_deref(), Some("text/javascript; charset=utf-8"));

        let (_, mime, _) = get(fx.site(), "/tape.xyz").await;
        assert_eq!(mime.as_deref(), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn parent_segments_are_forbidden() {
        let fx = Fixture::new();
        for uri in ["/../secret.txt", "/%2e%2e/secret.txt", "/sub/..%2F..%2Fsecret.txt", "/..%5Csecret.txt"] {
            let (status, _, body) = get(fx.site(), uri).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
            assert!(!body.contains("mat"), "{uri} leaked the secret");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_out_of_root_is_forbidden() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink(fx.dir.path().join("secret.txt"), fx.site().join("leak.txt")).unwrap();
        let (status, _, body) = get(fx.site(), "/leak.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, "Forbidden");
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let fx = Fixture::new();
        let (status, _, body) = get(fx.site(), "/nowhere.html").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Not found");
    }

    #[tokio::test]
    async fn malformed_escape_is_500() {
        let fx = Fixture::new();
        let (status, _, _) = get(fx.site(), "/bad%zz.html").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let (status, _, _) = get(fx.site(), "/%+41").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn head_has_headers_but_no_body() {
        let fx = Fixture::new();
        let response = send(fx.site(), Method::HEAD, "/index.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_LENGTH).unwrap(), "17");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let fx = Fixture::new();
        let response = send(fx.site(), Method::POST, "/index.html").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, HEAD");
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("/a%20b").as_deref(), Some("/a b"));
        assert_eq!(percent_decode("/%2E%2e").as_deref(), Some("/.."));
        assert_eq!(percent_decode("/trailing%2"), None);
        assert_eq!(percent_decode("/%ff"), None);
        assert_eq!(percent_decode("/%+41"), None);
        assert_eq!(percent_decode("/%+2e%+2e/secret"), None);
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config = ServeConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServeConfig::default());
        assert_eq!(config.port, 4173);

        let config = ServeConfig::from_lookup(|key| match key {
            "PORT" => Some("8080".into()),
            "SERVE_ROOT" => Some("dist".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.root, PathBuf::from("dist"));

        assert!(ServeConfig::from_lookup(|key| (key == "PORT").then(|| "highway".into())).is_err());
    }
}
