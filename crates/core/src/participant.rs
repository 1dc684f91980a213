//! Signature-request participants and their stored positions.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::position::SignaturePosition;
use crate::types::TempId;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// What a participant does in the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    Signatario,
    Approver,
    Observer,
    /// Any role this client does not model explicitly.
    #[serde(other)]
    Other,
}

impl ParticipantRole {
    /// Only signers are scheduled into signing stages.
    pub fn signs(&self) -> bool {
        matches!(self, Self::Signatario)
    }
}

/// How a signer proves identity at signing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationMethod {
    PorToken,
    PorSenha,
    IcpBrasil,
}

impl ValidationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PorToken => "POR_TOKEN",
            Self::PorSenha => "POR_SENHA",
            Self::IcpBrasil => "ICP_BRASIL",
        }
    }

    /// Methods offered to a participant; `POR_SENHA` needs a backend account.
    pub fn available_for(is_internal: bool) -> &'static [ValidationMethod] {
        if is_internal {
            &[Self::PorToken, Self::PorSenha, Self::IcpBrasil]
        } else {
            &[Self::PorToken, Self::IcpBrasil]
        }
    }
}

/// ICP-Brasil certificate holder document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IcpDocumentType {
    Cpf,
    Cnpj,
}

/// Whether rubric marks are collected from a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RubricOption {
    #[default]
    NotSign,
    RequiredSign,
    OptionalSign,
}

// ---------------------------------------------------------------------------
// Position containers
// ---------------------------------------------------------------------------

/// Stored full-signature placements for a participant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePositionConfig {
    pub position_defined: bool,
    #[serde(default)]
    pub docs_and_position: Vec<SignaturePosition>,
}

/// Stored rubric placements for a participant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricPosition {
    pub rubric_option: RubricOption,
    pub all_pages: bool,
    #[serde(default)]
    pub docs_and_position: Vec<SignaturePosition>,
}

// ---------------------------------------------------------------------------
// Participant
// ---------------------------------------------------------------------------

/// One person taking part in a signature request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub id_temp: TempId,
    pub name: String,
    pub email: String,
    pub cpf: String,
    /// Present only for internal participants known to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(rename = "type")]
    pub role: ParticipantRole,
    pub validation: ValidationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_icp: Option<IcpDocumentType>,
    #[serde(default)]
    pub signature_position: SignaturePositionConfig,
    #[serde(default)]
    pub rubric_position: RubricPosition,
}

impl Participant {
    /// A participant backed by an existing account.
    pub fn internal(
        account_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        cpf: impl Into<String>,
    ) -> Self {
        Self::with_account(Some(account_id.into()), name, email, cpf)
    }

    /// A participant entered by hand, unknown to the backend.
    pub fn external(
        name: impl Into<String>,
        email: impl Into<String>,
        cpf: impl Into<String>,
    ) -> Self {
        Self::with_account(None, name, email, cpf)
    }

    fn with_account(
        account_id: Option<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        cpf: impl Into<String>,
    ) -> Self {
        Self {
            id_temp: TempId::new(),
            name: name.into(),
            email: email.into(),
            cpf: cpf.into(),
            account_id,
            role: ParticipantRole::Signatario,
            validation: ValidationMethod::PorToken,
            validation_icp: None,
            signature_position: SignaturePositionConfig::default(),
            rubric_position: RubricPosition::default(),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.account_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn set_role(&mut self, role: ParticipantRole) {
        self.role = role;
    }

    /// Assign the validation method.
    ///
    /// `POR_SENHA` is rejected for participants without an account. Leaving
    /// `ICP_BRASIL` clears the ICP document qualifier.
    pub fn set_validation(&mut self, method: ValidationMethod) -> Result<(), CoreError> {
        if method == ValidationMethod::PorSenha && !self.is_internal() {
            return Err(CoreError::Validation(format!(
                "{} is only available to participants with an account",
                method.as_str()
            )));
        }
        self.validation = method;
        if method != ValidationMethod::IcpBrasil {
            self.validation_icp = None;
        }
        Ok(())
    }

    pub fn set_validation_icp(&mut self, doc_type: Option<IcpDocumentType>) {
        self.validation_icp = doc_type;
    }

    /// Whether any full-signature position has been stored.
    pub fn has_signature_positions(&self) -> bool {
        self.signature_position.position_defined
            && !self.signature_position.docs_and_position.is_empty()
    }

    /// Drop every stored position referencing `doc_key`.
    ///
    /// A set emptied by this call loses its flag; an already-empty set (for
    /// example rubrics on all pages) is left as it was.
    pub fn forget_document(&mut self, doc_key: &str) {
        let signatures = &mut self.signature_position.docs_and_position;
        let before = signatures.len();
        signatures.retain(|p| p.doc_key != doc_key);
        if before > 0 && signatures.is_empty() {
            self.signature_position.position_defined = false;
        }

        let rubrics = &mut self.rubric_position.docs_and_position;
        let before = rubrics.len();
        rubrics.retain(|p| p.doc_key != doc_key);
        if before > 0 && rubrics.is_empty() {
            self.rubric_position.rubric_option = RubricOption::NotSign;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
