//! Explicit session context: auth tokens and the signed-in user's profile.
//!
//! Populated on login and cleared on logout. Handed to every client at
//! construction; clones share the same state.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: Option<Timestamp>,
}

impl AuthTokens {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    tokens: Option<AuthTokens>,
    profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, tokens: AuthTokens, profile: Option<UserProfile>) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(
            user = profile.as_ref().map(|p| p.id.as_str()).unwrap_or("unknown"),
            "Session started"
        );
        state.tokens = Some(tokens);
        state.profile = profile;
    }

    /// Replace tokens after a refresh, keeping the profile.
    pub fn update_tokens(&self, tokens: AuthTokens) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.tokens = Some(tokens);
    }

    pub fn set_profile(&self, profile: UserProfile) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.profile = Some(profile);
    }

    /// Clear everything; returns the tokens that were active.
    pub fn logout(&self) -> Option<AuthTokens> {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.profile = None;
        let tokens = state.tokens.take();
        if tokens.is_some() {
            tracing::info!("Session cleared");
        }
        tokens
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .is_some()
    }

    pub fn access_token(&self) -> Result<String, CoreError> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| CoreError::Unauthorized("no active session".to_string()))
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile
            .clone()
    }
}
