//! Response envelope shared by all handlers.
//!
//! Successful responses are `{ "data": ... }`; errors use the shape built by
//! [`crate::error::AppError`].

use serde::Serialize;

/// Standard `{ "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
