//! REST API client module for the brickhub registry.
//!
//! This module provides the `RegistryClient` for the token-grant and brick
//! upload endpoints, and the `ApiError` type that collapses transport,
//! status, and body-parse failures into a single caller-facing message.

pub mod client;
pub mod error;

pub use client::{RegistryClient, TokenResponse};
pub use error::{ApiError, UNKNOWN_ERROR_MESSAGE};
