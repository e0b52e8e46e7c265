//! Fixed response headers set on every route.

use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use tower_http::set_header::SetResponseHeaderLayer;

/// Browsers must honour the declared content type of images and maps.
pub(crate) const NO_SNIFF: (&str, &str) = ("x-content-type-options", "nosniff");

/// Responses may not be framed by other sites.
pub(crate) const DENY_FRAMING: (&str, &str) = ("x-frame-options", "DENY");

/// Layer overwriting `name` with `value` on each response.
pub(crate) fn fixed_header(
    (name, value): (&'static str, &'static str),
) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_fixed_header_overrides_handler_value() {
        let app = Router::new()
            .route(
                "/",
                get(|| async { ([("x-frame-options", "SAMEORIGIN")], "ok") }),
            )
            .layer(fixed_header(DENY_FRAMING))
            .layer(fixed_header(NO_SNIFF));

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }
}
