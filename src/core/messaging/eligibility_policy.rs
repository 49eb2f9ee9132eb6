// Messaging eligibility - who may send a direct message to whom.
//
// Adults and minors may only talk to each other when a follow edge exists
// between them (either direction). Same-group pairs are always allowed.
// This is a pure decision; the gateway fetches the users and the follow
// state and re-evaluates on every send.

use crate::core::social::User;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagingDecision {
    Allowed,
    /// Sender and receiver are the same user
    SelfTarget,
    /// One adult and one minor with no follow edge between them
    AgeRestricted,
}

pub struct MessagingEligibilityPolicy;

impl MessagingEligibilityPolicy {
    /// Decide, with a reason, whether `sender` may message `receiver`.
    ///
    /// `are_friends` means a follow edge exists in at least one direction.
    pub fn evaluate(sender: &User, receiver: &User, are_friends: bool) -> MessagingDecision {
        if sender.id == receiver.id {
            return MessagingDecision::SelfTarget;
        }

        let mixed_pair = (sender.is_adult() && receiver.is_minor())
            || (sender.is_minor() && receiver.is_adult());

        if !mixed_pair || are_friends {
            MessagingDecision::Allowed
        } else {
            MessagingDecision::AgeRestricted
        }
    }

    pub fn can_message(sender: &User, receiver: &User, are_friends: bool) -> bool {
        Self::evaluate(sender, receiver, are_friends) == MessagingDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: u64, age: u32) -> User {
        User {
            id,
            name: format!("user{}", id),
            age,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_same_age_group_always_allowed() {
        let pairs = [(20, 45), (19, 19), (12, 18), (0, 17)];
        for (a, b) in pairs {
            let sender = user(1, a);
            let receiver = user(2, b);
            assert!(MessagingEligibilityPolicy::can_message(&sender, &receiver, false));
            assert!(MessagingEligibilityPolicy::can_message(&receiver, &sender, false));
        }
    }

    #[test]
    fn test_adult_minor_gate_is_symmetric() {
        let minor = user(1, 17);
        let adult = user(2, 30);

        assert_eq!(
            MessagingEligibilityPolicy::evaluate(&minor, &adult, false),
            MessagingDecision::AgeRestricted
        );
        assert_eq!(
            MessagingEligibilityPolicy::evaluate(&adult, &minor, false),
            MessagingDecision::AgeRestricted
        );

        assert!(MessagingEligibilityPolicy::can_message(&minor, &adult, true));
        assert!(MessagingEligibilityPolicy::can_message(&adult, &minor, true));
    }

    #[test]
    fn test_boundary_age() {
        // 18 is a minor, 19 an adult
        let eighteen = user(1, 18);
        let nineteen = user(2, 19);
        assert!(!MessagingEligibilityPolicy::can_message(&eighteen, &nineteen, false));
    }

    #[test]
    fn test_self_message_rejected_regardless_of_friendship() {
        for age in [10, 25] {
            let me = user(7, age);
            assert_eq!(
                MessagingEligibilityPolicy::evaluate(&me, &me, true),
                MessagingDecision::SelfTarget
            );
            assert!(!MessagingEligibilityPolicy::can_message(&me, &me, false));
        }
    }
}
