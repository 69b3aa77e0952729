//! # PageAccess
//!
//! Gate in front of every signed-in page: the caller must be authenticated
//! and must have finished onboarding.

use std::sync::Arc;

use domains::{Credentials, IdentityGateway, Principal, User, UserRepository};
use tracing::{debug, instrument};

use crate::error::{OperationExt, Result};

pub const ONBOARDING_PATH: &str = "/onboarding";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted { principal: Principal, user: User },
    Redirect(&'static str),
}

pub struct PageAccess {
    identity: Arc<dyn IdentityGateway>,
    users: Arc<dyn UserRepository>,
}

impl PageAccess {
    pub fn new(identity: Arc<dyn IdentityGateway>, users: Arc<dyn UserRepository>) -> Self {
        Self { identity, users }
    }

    /// Resolves the principal only. Used by onboarding submissions, which
    /// must work before a profile exists.
    pub async fn principal(&self, credentials: &Credentials) -> Result<Option<Principal>> {
        self.identity
            .current_principal(credentials)
            .await
            .during("resolve principal")
    }

    #[instrument(skip_all)]
    pub async fn authorize(&self, credentials: &Credentials) -> Result<Access> {
        let Some(principal) = self.principal(credentials).await? else {
            debug!("anonymous request");
            return Ok(Access::Redirect(ONBOARDING_PATH));
        };

        match self
            .users
            .find_by_id(&principal.id)
            .await
            .during("fetch user")?
        {
            Some(user) if user.onboarded => Ok(Access::Granted { principal, user }),
            _ => {
                debug!(principal = %principal.id, "profile missing or not onboarded");
                Ok(Access::Redirect(ONBOARDING_PATH))
            }
        }
    }
}
