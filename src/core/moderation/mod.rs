// Core moderation module - profanity and adult-content filtering.
// Following the same pattern as the social module.

pub mod moderation_models;
pub mod text_filter;

pub use moderation_models::*;
pub use text_filter::*;
