//! Static asset store
//!
//! Every request outside the chat endpoint is handed to the asset store and
//! its response is returned untouched.

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Anything that can answer a request with a static asset
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn fetch(&self, req: Request<Body>) -> Response;
}

/// Serves files from a directory, resolving `index.html` for directory paths
#[derive(Clone)]
pub struct DirAssets {
    root: PathBuf,
    service: ServeDir,
}

impl DirAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let service = ServeDir::new(&root).append_index_html_on_directories(true);
        Self { root, service }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl AssetStore for DirAssets {
    async fn fetch(&self, req: Request<Body>) -> Response {
        let result: Result<_, Infallible> = self.service.clone().oneshot(req).await;
        match result {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Scratch directory under the system temp dir, removed on drop
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "chatgate-assets-{}-{}",
                name,
                std::process::id()
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_file_contents() {
        let dir = ScratchDir::new("file");
        std::fs::write(dir.0.join("app.js"), "console.log(1);").unwrap();

        let assets = DirAssets::new(&dir.0);
        let response = assets.fetch(get("/app.js")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"console.log(1);");
    }

    #[tokio::test]
    async fn test_directory_resolves_index() {
        let dir = ScratchDir::new("index");
        std::fs::write(dir.0.join("index.html"), "<h1>hi</h1>").unwrap();

        let assets = DirAssets::new(&dir.0);
        let response = assets.fetch(get("/")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"<h1>hi</h1>");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = ScratchDir::new("missing");
        let assets = DirAssets::new(&dir.0);

        let response = assets.fetch(get("/nope.css")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
