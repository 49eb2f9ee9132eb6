// Auth port - turns a bearer credential into a verified user id.
//
// Token issuance lives outside this service; the core only ever sees the
// verified id.

use crate::core::social::UserId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing or invalid credentials")]
    Unauthenticated,

    #[error("Credentials have expired")]
    Expired,
}

pub trait AuthVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}
