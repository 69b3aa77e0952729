//! HS256 bearer tokens issued by the identity provider. The `sub` claim is
//! the identity id users are keyed by.

use async_trait::async_trait;
use domains::{Credentials, IdentityGateway, Principal, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

pub struct JwtIdentityGateway {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityGateway {
    pub fn new(secret: &[u8], issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl IdentityGateway for JwtIdentityGateway {
    /// Expired, malformed or wrongly signed tokens resolve to an anonymous
    /// caller rather than an error.
    async fn current_principal(&self, credentials: &Credentials) -> Result<Option<Principal>> {
        let Some(token) = credentials.bearer.as_deref() else {
            return Ok(None);
        };

        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) if !data.claims.sub.trim().is_empty() => Ok(Some(Principal {
                id: data.claims.sub,
            })),
            Ok(_) => {
                debug!("token without subject");
                Ok(None)
            }
            Err(err) => {
                debug!(error = %err, "bearer token rejected");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-secret";

    fn token(sub: &str, exp_offset: i64, iss: Option<&str>, secret: &[u8]) -> String {
        let exp = (chrono::Utc::now().timestamp() + exp_offset) as u64;
        let claims = Claims {
            sub: sub.into(),
            exp,
            iss: iss.map(str::to_string),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn bearer(token: String) -> Credentials {
        Credentials { bearer: Some(token) }
    }

    #[tokio::test]
    async fn valid_token_resolves_subject() {
        let gateway = JwtIdentityGateway::new(SECRET, None);
        let principal = gateway
            .current_principal(&bearer(token("user_1", 3600, None, SECRET)))
            .await
            .unwrap();
        assert_eq!(principal, Some(Principal { id: "user_1".into() }));
    }

    #[tokio::test]
    async fn missing_expired_or_forged_tokens_are_anonymous() {
        let gateway = JwtIdentityGateway::new(SECRET, None);
        for credentials in [
            Credentials::default(),
            bearer(token("user_1", -3600, None, SECRET)),
            bearer(token("user_1", 3600, None, b"other-secret")),
            bearer("not-a-jwt".into()),
        ] {
            assert!(gateway.current_principal(&credentials).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn issuer_is_enforced_when_configured() {
        let gateway = JwtIdentityGateway::new(SECRET, Some("https://id.example"));
        let wrong = gateway
            .current_principal(&bearer(token("u", 3600, Some("https://evil"), SECRET)))
            .await
            .unwrap();
        let right = gateway
            .current_principal(&bearer(token("u", 3600, Some("https://id.example"), SECRET)))
            .await
            .unwrap();
        assert!(wrong.is_none());
        assert!(right.is_some());
    }
}
