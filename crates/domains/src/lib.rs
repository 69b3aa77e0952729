//! # domains
//!
//! Domain models, port traits and the tagged error type shared by every
//! other crate in the workspace. Nothing in here performs I/O.

pub mod error;
pub mod models;
pub mod ports;

pub use error::*;
pub use models::*;
pub use ports::*;
