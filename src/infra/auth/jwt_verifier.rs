use crate::core::auth::{AuthError, AuthVerifier};
use crate::core::social::UserId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Numeric user id, as a string
    pub sub: String,
    pub exp: usize,
}

/// HS256 bearer token verifier. Tokens are issued by the account service.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

impl AuthVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Unauthenticated,
            })?;

        match token_data.claims.sub.parse::<UserId>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(AuthError::Unauthenticated),
        }
    }
}
