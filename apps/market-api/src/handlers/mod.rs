//! HTTP handlers.
//!
//! Handlers unwrap extractor results themselves so that a malformed body
//! or path becomes an [`ApiError`](crate::ApiError) with a `{"message"}`
//! body instead of axum's plain-text rejection.

pub mod buyers;
pub mod health;
pub mod orders;
pub mod products;
pub mod sellers;
