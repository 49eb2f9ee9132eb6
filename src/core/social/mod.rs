// Core social module - users, posts, relations and the toggle state machine.

pub mod record_store;
pub mod social_models;
pub mod toggle_service;

pub use record_store::*;
pub use social_models::*;
pub use toggle_service::*;
