//! Authentication module for the registry session lifecycle.
//!
//! This module provides:
//! - `Session`: the Anonymous/Authenticated state machine
//! - `Credentials` and `CredentialStore`: the durable authorization record
//! - `claims`: access-token payload decoding and identity derivation
//!
//! Credentials are persisted to the platform config directory and refreshed
//! transparently when a gated operation finds them expired.

pub mod claims;
pub mod credentials;
pub mod session;

pub use claims::{decode_claims, derive_user, DecodeError, User};
pub use credentials::{CredentialStore, Credentials};
pub use session::{AuthError, Clock, Session};
