//! # auth-adapters
//!
//! Implementations of [`domains::IdentityGateway`]. The identity provider is
//! treated as opaque: all this crate does is turn request credentials into
//! a [`domains::Principal`] or nothing.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtIdentityGateway;
