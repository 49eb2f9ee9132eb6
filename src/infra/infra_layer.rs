// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "auth/mod.rs"]
pub mod auth;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "realtime/mod.rs"]
pub mod realtime;

#[path = "social/mod.rs"]
pub mod social;
