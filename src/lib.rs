//! Client-side session manager for the brickhub package registry.
//!
//! This crate handles the full credential lifecycle for a registry user:
//! password login, durable credential storage, local expiry detection,
//! transparent token refresh, and the single gated operation of publishing
//! a brick bundle.
//!
//! The [`Session`] type is the entry point. Construct one with a
//! [`RegistryClient`] and a [`CredentialStore`]; it restores any persisted
//! identity and exposes `login`, `logout`, `current_user`, and `publish`.

pub mod api;
pub mod auth;

pub use api::{ApiError, RegistryClient};
pub use auth::{AuthError, CredentialStore, Credentials, Session, User};
