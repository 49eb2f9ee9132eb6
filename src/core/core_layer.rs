// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "auth/auth_verifier.rs"]
pub mod auth;

#[path = "gateway/mod.rs"]
pub mod gateway;

#[path = "messaging/eligibility_policy.rs"]
pub mod messaging;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "social/mod.rs"]
pub mod social;
