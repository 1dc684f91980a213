//! The signature request aggregate: ordered groups plus ordered documents.
//!
//! Group order is the signing-stage order whenever any group's rule
//! constrains ordering; inside a sequential group, participant order is the
//! signing order. Confirmation prompts for destructive operations belong to
//! the caller, not to this model.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::CoreError;
use crate::group::{GroupRule, SignatureGroup};
use crate::participant::{IcpDocumentType, Participant, ParticipantRole, ValidationMethod};
use crate::types::TempId;

/// One step of the signing plan: everyone in it signs concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningStage {
    pub group_index: usize,
    pub participants: Vec<TempId>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    #[serde(default)]
    pub groups: Vec<SignatureGroup>,
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl SignatureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- groups ----

    /// Append an empty group with no rule and return its index.
    pub fn add_group(&mut self) -> usize {
        self.groups.push(SignatureGroup::new(GroupRule::None));
        self.groups.len() - 1
    }

    /// Remove an empty group. Non-empty groups are never silently dropped.
    pub fn remove_group(&mut self, index: usize) -> Result<SignatureGroup, CoreError> {
        let group = self.group(index)?;
        if !group.is_removable() {
            return Err(CoreError::Conflict(format!(
                "group {index} still has {} participant(s)",
                group.len()
            )));
        }
        Ok(self.groups.remove(index))
    }

    pub fn group(&self, index: usize) -> Result<&SignatureGroup, CoreError> {
        self.groups
            .get(index)
            .ok_or_else(|| CoreError::not_found("group", index.to_string()))
    }

    fn group_mut(&mut self, index: usize) -> Result<&mut SignatureGroup, CoreError> {
        self.groups
            .get_mut(index)
            .ok_or_else(|| CoreError::not_found("group", index.to_string()))
    }

    pub fn can_move_group_up(&self, index: usize) -> bool {
        index > 0 && index < self.groups.len()
    }

    pub fn can_move_group_down(&self, index: usize) -> bool {
        index < self.groups.len().saturating_sub(1)
    }

    /// Move a group; `to` is clamped to the last index.
    pub fn move_group(&mut self, from: usize, to: usize) -> Result<(), CoreError> {
        self.group(from)?;
        let to = to.min(self.groups.len() - 1);
        let group = self.groups.remove(from);
        self.groups.insert(to, group);
        Ok(())
    }

    /// Assign a rule by backend id; only the range is checked.
    pub fn set_group_rule(&mut self, index: usize, rule_id: Option<u8>) -> Result<(), CoreError> {
        let rule = GroupRule::from_id(rule_id)?;
        self.group_mut(index)?.rule = rule;
        Ok(())
    }

    // ---- participants ----

    /// Append a participant to a group, assigning an `idTemp` when empty.
    pub fn add_participant(
        &mut self,
        group_index: usize,
        mut participant: Participant,
    ) -> Result<TempId, CoreError> {
        self.group(group_index)?;
        if participant.id_temp.is_empty() {
            participant.id_temp = uuid::Uuid::new_v4().to_string();
        } else if self.participant(&participant.id_temp).is_some() {
            return Err(CoreError::Conflict(format!(
                "participant {} is already in this request",
                participant.id_temp
            )));
        }

        let id = participant.id_temp.clone();
        tracing::debug!(group_index, id_temp = %id, "Participant added");
        self.group_mut(group_index)?.participants.push(participant);
        Ok(id)
    }

    pub fn remove_participant(
        &mut self,
        group_index: usize,
        participant_index: usize,
    ) -> Result<Participant, CoreError> {
        let group = self.group_mut(group_index)?;
        if participant_index >= group.participants.len() {
            return Err(CoreError::not_found(
                "participant",
                participant_index.to_string(),
            ));
        }
        Ok(group.participants.remove(participant_index))
    }

    /// Move a participant inside its group; `to` is clamped to
    /// `[0, group.len() - 1]`.
    pub fn move_participant(
        &mut self,
        group_index: usize,
        from: usize,
        to: usize,
    ) -> Result<(), CoreError> {
        let group = self.group_mut(group_index)?;
        if from >= group.participants.len() {
            return Err(CoreError::not_found("participant", from.to_string()));
        }
        let to = to.min(group.participants.len() - 1);
        let participant = group.participants.remove(from);
        group.participants.insert(to, participant);
        Ok(())
    }

    fn participant_at_mut(
        &mut self,
        group_index: usize,
        participant_index: usize,
    ) -> Result<&mut Participant, CoreError> {
        self.group_mut(group_index)?
            .participants
            .get_mut(participant_index)
            .ok_or_else(|| CoreError::not_found("participant", participant_index.to_string()))
    }

    pub fn set_participant_role(
        &mut self,
        group_index: usize,
        participant_index: usize,
        role: ParticipantRole,
    ) -> Result<(), CoreError> {
        self.participant_at_mut(group_index, participant_index)?
            .set_role(role);
        Ok(())
    }

    pub fn set_participant_validation(
        &mut self,
        group_index: usize,
        participant_index: usize,
        method: ValidationMethod,
    ) -> Result<(), CoreError> {
        self.participant_at_mut(group_index, participant_index)?
            .set_validation(method)
    }

    pub fn set_participant_validation_icp(
        &mut self,
        group_index: usize,
        participant_index: usize,
        doc_type: Option<IcpDocumentType>,
    ) -> Result<(), CoreError> {
        self.participant_at_mut(group_index, participant_index)?
            .set_validation_icp(doc_type);
        Ok(())
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.groups.iter().flat_map(|g| g.participants.iter())
    }

    pub fn participant(&self, id_temp: &str) -> Option<&Participant> {
        self.participants().find(|p| p.id_temp == id_temp)
    }

    /// Write back a participant returned by the position editor.
    pub fn apply_participant(&mut self, updated: Participant) -> Result<(), CoreError> {
        let slot = self
            .groups
            .iter_mut()
            .flat_map(|g| g.participants.iter_mut())
            .find(|p| p.id_temp == updated.id_temp)
            .ok_or_else(|| CoreError::not_found("participant", updated.id_temp.clone()))?;
        *slot = updated;
        Ok(())
    }

    // ---- documents ----

    pub fn add_document(&mut self, document: Document) -> Result<(), CoreError> {
        if self.has_document(&document.doc_key) {
            return Err(CoreError::Conflict(format!(
                "document {} is already attached",
                document.doc_key
            )));
        }
        self.documents.push(document);
        Ok(())
    }

    /// Detach a document and drop every stored position that references it.
    pub fn remove_document(&mut self, doc_key: &str) -> Result<Document, CoreError> {
        let index = self
            .documents
            .iter()
            .position(|d| d.doc_key == doc_key)
            .ok_or_else(|| CoreError::not_found("document", doc_key))?;
        for participant in self.groups.iter_mut().flat_map(|g| g.participants.iter_mut()) {
            participant.forget_document(doc_key);
        }
        Ok(self.documents.remove(index))
    }

    pub fn has_document(&self, doc_key: &str) -> bool {
        self.documents.iter().any(|d| d.doc_key == doc_key)
    }

    // ---- planning ----

    /// Derive the ordered signing plan.
    ///
    /// When no group constrains ordering, every signer forms one stage.
    /// Otherwise groups are stages in order, and a sequential group expands
    /// into one stage per signer. Non-signing roles are not scheduled.
    pub fn signing_stages(&self) -> Vec<SigningStage> {
        let ordered = self
            .groups
            .iter()
            .any(|g| g.effective_rule().constrains_order());

        if !ordered {
            let participants: Vec<TempId> = self
                .participants()
                .filter(|p| p.role.signs())
                .map(|p| p.id_temp.clone())
                .collect();
            if participants.is_empty() {
                return Vec::new();
            }
            return vec![SigningStage {
                group_index: 0,
                participants,
            }];
        }

        let mut stages = Vec::new();
        for (group_index, group) in self.groups.iter().enumerate() {
            let signers = group
                .participants
                .iter()
                .filter(|p| p.role.signs())
                .map(|p| p.id_temp.clone());

            if group.effective_rule() == GroupRule::Sequential {
                stages.extend(signers.map(|id| SigningStage {
                    group_index,
                    participants: vec![id],
                }));
            } else {
                let participants: Vec<TempId> = signers.collect();
                if !participants.is_empty() {
                    stages.push(SigningStage {
                        group_index,
                        participants,
                    });
                }
            }
        }
        stages
    }

    /// Check the request is complete enough to send.
    pub fn validate_for_submit(&self) -> Result<(), CoreError> {
        if self.documents.is_empty() {
            return Err(CoreError::Validation(
                "at least one document is required".to_string(),
            ));
        }
        if let Some(index) = self.groups.iter().position(|g| g.is_empty()) {
            return Err(CoreError::Validation(format!("group {index} has no participants")));
        }
        if !self.participants().any(|p| p.role.signs()) {
            return Err(CoreError::Validation(
                "at least one signer is required".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
