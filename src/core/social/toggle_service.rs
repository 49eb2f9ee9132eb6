// Toggle state service - at-most-once relations (likes, follows).
//
// Each relation pair is a two-state machine: Absent <-> Active.
// State is entirely record presence, so the store's unique key is what keeps
// two concurrent "toggle on" requests from producing two records.

use super::record_store::{StoreError, ToggleStore};
use super::social_models::ToggleKey;
use serde::Serialize;

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleState {
    /// Whether the relation exists after the call
    pub active: bool,
    /// Whether THIS call caused the transition. False when a concurrent
    /// request got there first.
    #[serde(skip)]
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct ToggleStateService;

impl ToggleStateService {
    pub fn new() -> Self {
        Self
    }

    /// Flip the relation for `key`: delete it if present, create it if absent.
    ///
    /// A create that loses to a concurrent create is not an error; the live
    /// state is re-read and returned with `changed = false`.
    pub async fn toggle<S>(&self, store: &S, key: &ToggleKey) -> Result<ToggleState, StoreError>
    where
        S: ToggleStore + ?Sized,
    {
        if store.relation_exists(key).await? {
            let removed = store.delete_relation(key).await?;
            return Ok(ToggleState {
                active: false,
                changed: removed,
            });
        }

        match store.insert_relation(key).await {
            Ok(()) => Ok(ToggleState {
                active: true,
                changed: true,
            }),
            Err(StoreError::Conflict) => {
                tracing::debug!(
                    kind = ?key.kind,
                    actor_id = key.actor_id,
                    target_id = key.target_id,
                    "Toggle create lost a race, returning current state"
                );
                let active = store.relation_exists(key).await?;
                Ok(ToggleState {
                    active,
                    changed: false,
                })
            }
            Err(e) => Err(e),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
