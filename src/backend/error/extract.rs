//! `Json`, `Query` and `Path` wrappers whose rejections are `BackendError`s,
//! so a malformed body, query string or path answers with the usual error JSON.

use axum::extract::{FromRequest, FromRequestParts};

use crate::backend::error::types::BackendError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BackendError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(BackendError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BackendError))]
pub struct ApiPath<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    async fn numbered(ApiPath(n): ApiPath<u32>) -> String {
        n.to_string()
    }

    #[tokio::test]
    async fn test_bad_path_segment_is_a_json_400() {
        let app = Router::new().route("/items/{n}", get(numbered));

        let ok = app
            .clone()
            .oneshot(Request::get("/items/7").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/items/seven").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["errorCode"], "E005");
        assert_eq!(body["status"], 400);
    }
}
