//! # services
//!
//! Application operations over the domain ports: profile writes, user
//! listings, activity, the thread feed and the page access gate.
//!
//! Every public operation wraps whatever failed underneath in a single
//! [`ServiceError`] naming the operation; the original [`domains::ErrorKind`]
//! stays reachable through [`ServiceError::kind`].

pub mod access;
pub mod error;
pub mod pagination;
mod population;
pub mod threads;
pub mod users;

pub use access::{Access, PageAccess, ONBOARDING_PATH};
pub use error::{Result, ServiceError};
pub use pagination::PageParams;
pub use threads::{AddCommentParams, CreateThreadParams, ThreadService};
pub use users::{FetchUsersParams, UpdateUserParams, UserService, PROFILE_EDIT_PATH};
