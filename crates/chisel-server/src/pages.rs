//! Fallbacks for requests `ServeDir` cannot answer directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Serve `<path>.html` for extensionless paths, else a 404 page.
pub(crate) async fn serve_html_sibling(State(root): State<Arc<PathBuf>>, request: Request) -> Response {
    let Some(file) = html_sibling(&root, request.uri().path()) else {
        return not_found();
    };

    match ServeFile::new(file).oneshot(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(),
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// `<root>/<path>.html` for a clean, extensionless request path.
fn html_sibling(root: &Path, request_path: &str) -> Option<PathBuf> {
    let path = request_path.trim_matches('/');
    if path.is_empty() || path.split('/').any(|segment| segment == ".." || segment.is_empty()) {
        return None;
    }
    if Path::new(path).extension().is_some() {
        return None;
    }
    Some(root.join(format!("{path}.html")))
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CACHE_CONTROL, "no-cache")],
        Html(
            "<!DOCTYPE html>\n<html><head><title>404 Not Found</title></head>\
             <body><h1>404 Not Found</h1>\
             <p>The requested page was not found on this server.</p></body></html>",
        ),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_html_sibling() {
        let root = Path::new("/out");
        assert_eq!(html_sibling(root, "/about"), Some(PathBuf::from("/out/about.html")));
        assert_eq!(
            html_sibling(root, "/blog/post/"),
            Some(PathBuf::from("/out/blog/post.html"))
        );
        assert_eq!(html_sibling(root, "/"), None);
        assert_eq!(html_sibling(root, "/style.css"), None);
        assert_eq!(html_sibling(root, "/../secret"), None);
        assert_eq!(html_sibling(root, "/a//b"), None);
    }
}
