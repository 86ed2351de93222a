//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::handler::Handler;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::ServerConfig;
use crate::middleware;
use crate::pages;

/// Create the router serving `config.root`.
pub fn create_router(config: &ServerConfig) -> Router {
    let root = Arc::new(config.root.clone());
    let files = ServeDir::new(config.root.as_path())
        .append_index_html_on_directories(true)
        .fallback(pages::serve_html_sibling.with_state(root));

    Router::new().fallback_service(files).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::cache_control_layer(config.cache_max_age))
            .layer(middleware::content_type_options_layer()),
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path();
            fs::create_dir_all(root.join("blog")).unwrap();
            fs::create_dir_all(root.join("styles")).unwrap();
            fs::write(root.join("index.html"), "<h1>Home</h1>").unwrap();
            fs::write(root.join("about.html"), "<h1>About</h1>").unwrap();
            fs::write(root.join("blog/index.html"), "<h1>Blog</h1>").unwrap();
            fs::write(root.join("styles/base.css"), "body{}").unwrap();
            Self { dir }
        }

        fn router(&self, cache_max_age: Option<u64>) -> Router {
            create_router(&ServerConfig {
                root: self.dir.path().to_path_buf(),
                cache_max_age,
                ..ServerConfig::default()
            })
        }
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_serves_root_index() {
        let fixture = Fixture::new();
        let (status, headers, body) = get(fixture.router(Some(3600)), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Home</h1>");
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=3600");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert!(
            headers[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }

    #[tokio::test]
    async fn test_serves_directory_index() {
        let fixture = Fixture::new();
        let (status, _, body) = get(fixture.router(None), "/blog/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Blog</h1>");
    }

    #[tokio::test]
    async fn test_serves_extensionless_route() {
        let fixture = Fixture::new();
        let (status, headers, body) = get(fixture.router(None), "/about").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>About</h1>");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_serves_stylesheet_with_mime_type() {
        let fixture = Fixture::new();
        let (status, headers, body) = get(fixture.router(Some(60)), "/styles/base.css").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{}");
        assert!(
            headers[header::CONTENT_TYPE]
                .to_str()
                .unwrap()
                .starts_with("text/css")
        );
        assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=60");
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let fixture = Fixture::new();
        let (status, headers, body) = get(fixture.router(Some(60)), "/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404 Not Found"), "{body}");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    }

    #[tokio::test]
    async fn test_missing_asset_is_not_found() {
        let fixture = Fixture::new();
        let (status, _, _) = get(fixture.router(None), "/styles/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
