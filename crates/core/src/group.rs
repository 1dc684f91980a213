//! Signature groups and their ordering rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::participant::Participant;

/// Ordering rule of a group, serialized as the backend `ruleId`.
///
/// | `ruleId` | Rule                               |
/// |----------|------------------------------------|
/// | `null`   | no rule                            |
/// | `1`      | simple, any order                  |
/// | `2`      | parallel, all sign concurrently    |
/// | `3`      | sequential, strict order           |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<u8>", into = "Option<u8>")]
pub enum GroupRule {
    #[default]
    None,
    Simple,
    Parallel,
    Sequential,
}

impl GroupRule {
    pub fn from_id(rule_id: Option<u8>) -> Result<Self, CoreError> {
        match rule_id {
            None => Ok(Self::None),
            Some(1) => Ok(Self::Simple),
            Some(2) => Ok(Self::Parallel),
            Some(3) => Ok(Self::Sequential),
            Some(other) => Err(CoreError::Validation(format!(
                "Invalid group rule id {other}. Must be one of: null, 1, 2, 3"
            ))),
        }
    }

    pub fn id(&self) -> Option<u8> {
        match self {
            Self::None => None,
            Self::Simple => Some(1),
            Self::Parallel => Some(2),
            Self::Sequential => Some(3),
        }
    }

    /// Whether the rule imposes any ordering across or within groups.
    pub fn constrains_order(&self) -> bool {
        matches!(self, Self::Parallel | Self::Sequential)
    }
}

impl TryFrom<Option<u8>> for GroupRule {
    type Error = CoreError;

    fn try_from(value: Option<u8>) -> Result<Self, Self::Error> {
        Self::from_id(value)
    }
}

impl From<GroupRule> for Option<u8> {
    fn from(rule: GroupRule) -> Self {
        rule.id()
    }
}

/// An ordered cluster of participants sharing one rule.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureGroup {
    #[serde(rename = "ruleId", default)]
    pub rule: GroupRule,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl SignatureGroup {
    pub fn new(rule: GroupRule) -> Self {
        Self {
            rule,
            participants: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Only empty groups may be removed.
    pub fn is_removable(&self) -> bool {
        self.is_empty()
    }

    /// The rule as it actually behaves: sequential over fewer than two
    /// participants is simple.
    pub fn effective_rule(&self) -> GroupRule {
        match self.rule {
            GroupRule::Sequential if self.participants.len() < 2 => GroupRule::Simple,
            rule => rule,
        }
    }

    pub fn can_move_participant_up(&self, index: usize) -> bool {
        index > 0 && index < self.participants.len()
    }

    pub fn can_move_participant_down(&self, index: usize) -> bool {
        index < self.participants.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn rule_ids_round_trip() {
        for id in [None, Some(1), Some(2), Some(3)] {
            assert_eq!(GroupRule::from_id(id).unwrap().id(), id);
        }
    }

    #[test]
    fn out_of_range_rule_is_rejected() {
        assert_matches!(GroupRule::from_id(Some(4)), Err(CoreError::Validation(_)));
        assert_matches!(GroupRule::from_id(Some(0)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn group_serializes_rule_as_rule_id() {
        let group = SignatureGroup::new(GroupRule::Sequential);
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["ruleId"], 3);

        let none = serde_json::to_value(SignatureGroup::default()).unwrap();
        assert!(none["ruleId"].is_null());
    }

    #[test]
    fn group_rejects_unknown_rule_id_on_input() {
        let result: Result<SignatureGroup, _> =
            serde_json::from_value(serde_json::json!({"ruleId": 9, "participants": []}));
        assert!(result.is_err());
    }

    #[test]
    fn participant_move_boundaries() {
        let mut group = SignatureGroup::default();
        assert!(!group.can_move_participant_down(0));
        group
            .participants
            .push(Participant::external("Ana", "ana@example.com", "52998224725"));
        group
            .participants
            .push(Participant::external("Bia", "bia@example.com", "52998224725"));
        assert!(group.can_move_participant_down(0));
        assert!(!group.can_move_participant_down(1));
        assert!(!group.can_move_participant_down(usize::MAX));
        assert!(!group.can_move_participant_up(usize::MAX));
    }

    #[test]
    fn sequential_single_participant_behaves_as_simple() {
        let mut group = SignatureGroup::new(GroupRule::Sequential);
        group
            .participants
            .push(Participant::external("Ana", "ana@example.com", "52998224725"));
        assert_eq!(group.effective_rule(), GroupRule::Simple);

        group
            .participants
            .push(Participant::external("Bia", "bia@example.com", "52998224725"));
        assert_eq!(group.effective_rule(), GroupRule::Sequential);
    }

    #[test]
    fn empty_group_is_removable() {
        let mut group = SignatureGroup::default();
        assert!(group.is_removable());
        group
            .participants
            .push(Participant::external("Ana", "ana@example.com", "52998224725"));
        assert!(!group.is_removable());
    }
}
