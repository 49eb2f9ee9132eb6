// Core gateway module - orchestrates filtering, eligibility and toggles
// against the record store.

pub mod gateway_models;
pub mod moderation_gateway;

pub use gateway_models::*;
pub use moderation_gateway::*;
