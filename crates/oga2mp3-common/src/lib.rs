//! Oga2mp3-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across oga2mp3:
//!
//! - **Typed IDs**: [`ConversionId`], the per-request identifier that names
//!   every temporary artifact
//! - **Core Types**: the [`ConversionStage`] a request moves through
//! - **Path Utilities**: artifact file naming and audio extension checks
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use oga2mp3_common::{ConversionId, Error, Result};
//! use oga2mp3_common::paths::input_file_name;
//!
//! let id = ConversionId::new();
//! assert!(input_file_name(id).ends_with(".oga"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::bad_request("empty request body"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
