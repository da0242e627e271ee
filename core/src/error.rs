//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the crate.
//!
//! Only structurally invalid top-level input is a hard failure
//! (`InvalidDocument`). Resolution-level failures (malformed refs, missing
//! documents or entities, cycles) are recovered locally into stubs and never
//! surface here.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The input is not a valid document at all (root is neither object nor
    /// boolean, unparseable YAML/JSON, missing mandatory root fields).
    /// We ignore this for `From<String>` to avoid conflict with General.
    #[from(ignore)]
    #[display("Invalid Document: {_0}")]
    InvalidDocument(String),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
