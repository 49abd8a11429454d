//! Shared types and rules for the Farm Assist platform
//!
//! This crate holds the pieces that must behave identically on the gateway
//! (backend) and in the mobile front end (via WASM): input validation and
//! the normalizers that turn third-party JSON into display models.

pub mod models;
pub mod normalize;
pub mod types;
pub mod validation;

pub use models::*;
pub use normalize::*;
pub use types::*;
pub use validation::*;
