//! Tenant extraction from the `X-Local-ID` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use almacen_shared::{AppError, types::LocalId};

use crate::error::ApiError;

/// Header naming the Local a request acts on.
pub const LOCAL_HEADER: &str = "x-local-id";

/// The Local a request is scoped to.
///
/// Every order and product handler takes this extractor, so the tenant is
/// always an explicit argument to the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalContext(pub LocalId);

impl LocalContext {
    /// Returns the Local ID.
    #[must_use]
    pub fn local_id(&self) -> LocalId {
        self.0
    }
}

impl<S> FromRequestParts<S> for LocalContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(LOCAL_HEADER)
            .ok_or_else(|| AppError::BadRequest("X-Local-ID header is required".to_string()))?;

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<LocalId>().ok())
            .map(LocalContext)
            .ok_or_else(|| AppError::BadRequest("X-Local-ID must be a UUID".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<LocalContext, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("X-Local-ID", value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        LocalContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header() {
        let id = LocalId::new();
        let ctx = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(ctx.local_id(), id);
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, ApiError::App(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_malformed_header_rejected() {
        let err = extract(Some("not-a-uuid")).await.unwrap_err();
        assert!(matches!(err, ApiError::App(AppError::BadRequest(_))));
    }
}
