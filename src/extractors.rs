//! Request extractors for the license routes.
//!
//! `Json`, `Query` and `Path` wrap axum's extractors so a malformed body, query
//! string or path segment becomes an `invalid_input` error body instead of
//! axum's plain-text rejection. `AdminCredential` pulls the admin bearer token.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::AppError;
use crate::util::extract_bearer_token;

/// JSON body extractor and response type. Rejections map to
/// `AppError::InvalidInput`.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        axum::Json::<T>::from_request(req, state)
            .await
            .map(|axum::Json(body)| Json(body))
            .map_err(AppError::from)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Query string extractor (admin listing window).
#[derive(Debug, Clone)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Query(query)| Query(query))
            .map_err(AppError::from)
    }
}

/// Path extractor (license key segment).
#[derive(Debug, Clone)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map(|axum::extract::Path(segment)| Path(segment))
            .map_err(AppError::from)
    }
}

/// Bearer token from the `Authorization` header, if any.
///
/// Never rejects: a missing credential is passed through as `None` so the
/// engine decides whether the operation needs one.
#[derive(Debug, Clone, Default)]
pub struct AdminCredential(pub Option<String>);

impl AdminCredential {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Prefer the header credential, falling back to one supplied in the body.
    pub fn or_body<'a>(&'a self, body: Option<&'a str>) -> Option<&'a str> {
        self.as_deref().or(body.map(str::trim).filter(|s| !s.is_empty()))
    }
}

impl<S> FromRequestParts<S> for AdminCredential
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AdminCredential(
            extract_bearer_token(&parts.headers).map(String::from),
        ))
    }
}
