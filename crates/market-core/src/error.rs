//! # Error Types
//!
//! Domain-specific error types for market-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  market-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - A single bad request field                     │
//! │                                                                         │
//! │  market-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  market-api errors                                                     │
//! │  └── ApiError         - { status, message } sent to the client         │
//! │                                                                         │
//! │  Flow: ValidationError | CoreError → ApiError(400) → {"message": ...}  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations detected outside of plain field validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Image upload carried no files.
    #[error("No images attached to the request")]
    NoImagesAttached,

    /// Image upload carried more files than a product may hold.
    #[error("Too many images attached, maximum is {max}")]
    TooManyImages { max: usize },

    /// Product already carries images (attach is one-shot).
    #[error("Product {0} already has images")]
    ImagesAlreadyAttached(i64),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A request field that failed validation.
///
/// The `Display` output is the exact message returned to the client, e.g.
/// `Bad order_quantity data`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is missing, empty, out of range or not in its allowed set.
    #[error("Bad {field} data")]
    BadField { field: String },

    /// Value is not one of the allowed enum spellings.
    #[error("Bad {field} data")]
    NotAllowed { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::BadField`].
    pub fn bad(field: impl Into<String>) -> Self {
        ValidationError::BadField {
            field: field.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
