//! Security headers added to every response.

use axum::{
    body::Body,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Prefix of the Swagger UI and its `OpenAPI` document.
pub const DOCS_PATH: &str = "/api-docs";

const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

// Swagger UI ships inline bootstrap script and styles.
const DOCS_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; \
     img-src 'self' data:; \
     frame-ancestors 'none'";

const HEADERS: [(HeaderName, &str); 9] = [
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
    (header::X_DNS_PREFETCH_CONTROL, "off"),
    (header::REFERRER_POLICY, "no-referrer"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=15552000; includeSubDomains",
    ),
    (HeaderName::from_static("x-download-options"), "noopen"),
    (
        HeaderName::from_static("x-permitted-cross-domain-policies"),
        "none",
    ),
    (
        HeaderName::from_static("cross-origin-opener-policy"),
        "same-origin",
    ),
    (
        HeaderName::from_static("cross-origin-resource-policy"),
        "same-origin",
    ),
];

/// Middleware that fills in the security headers a handler did not set itself.
pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let is_docs = request.uri().path().starts_with(DOCS_PATH);
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for (name, value) in HEADERS {
        headers
            .entry(name)
            .or_insert(HeaderValue::from_static(value));
    }

    let csp = if is_docs { DOCS_CSP } else { API_CSP };
    headers
        .entry(header::CONTENT_SECURITY_POLICY)
        .or_insert(HeaderValue::from_static(csp));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/framed",
                get(|| async { ([(header::X_FRAME_OPTIONS, "DENY")], "ok") }),
            )
            .route("/api-docs/", get(|| async { "docs" }))
            .layer(middleware::from_fn(security_headers))
    }

    async fn get_headers(uri: &str) -> Result<axum::http::HeaderMap> {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;
        Ok(response.headers().clone())
    }

    #[tokio::test]
    async fn adds_all_headers() -> Result<()> {
        let headers = get_headers("/").await?;

        for (name, value) in HEADERS {
            assert_eq!(headers.get(&name).and_then(|v| v.to_str().ok()), Some(value));
        }
        assert_eq!(
            headers.get(header::CONTENT_SECURITY_POLICY),
            Some(&HeaderValue::from_static(API_CSP))
        );
        Ok(())
    }

    #[tokio::test]
    async fn keeps_handler_headers() -> Result<()> {
        let headers = get_headers("/framed").await?;
        assert_eq!(
            headers.get(header::X_FRAME_OPTIONS),
            Some(&HeaderValue::from_static("DENY"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn docs_get_relaxed_csp() -> Result<()> {
        let headers = get_headers("/api-docs/").await?;
        let csp = headers
            .get(header::CONTENT_SECURITY_POLICY)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(csp.contains("script-src 'self' 'unsafe-inline'"));
        assert!(csp.contains("frame-ancestors 'none'"));
        Ok(())
    }
}
