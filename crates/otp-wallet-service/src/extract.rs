//! Request extractors whose rejections use the API error envelope.
//!
//! axum's own `Json` and `Query` reject malformed input with a plain-text 422
//! or 400. These wrappers route the same failures through [`ApiError`] so
//! clients always get `{"error": {"code": "bad_request", ...}}`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string parameters.
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
