//! REST clients for the identity provider and the four backends.
//!
//! Every client shares one [`SessionContext`]; logging in through
//! [`auth::OidcClient`] is what makes the others usable.

pub mod auth;
pub mod cloud;
pub mod config;
pub mod error;
pub mod http;
pub mod notifications;
pub mod response;
pub mod signature;
pub mod workflow;

use signdesk_core::session::SessionContext;

use crate::auth::OidcClient;
use crate::cloud::CloudClient;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::notifications::NotificationClient;
use crate::signature::SignatureClient;
use crate::workflow::WorkflowClient;

/// All service clients wired to one connection pool and session.
pub struct Backend {
    pub session: SessionContext,
    pub auth: OidcClient,
    pub workflow: WorkflowClient,
    pub signature: SignatureClient,
    pub cloud: CloudClient,
    pub notifications: NotificationClient,
}

impl Backend {
    pub fn new(config: &ClientConfig, session: SessionContext) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let http = |base: &str| HttpClient::new(client.clone(), base, session.clone());

        Ok(Self {
            auth: OidcClient::new(client.clone(), config, session.clone()),
            workflow: WorkflowClient::new(http(&config.bpms_url)),
            signature: SignatureClient::new(http(&config.signature_url)),
            cloud: CloudClient::new(http(&config.cloud_url)),
            notifications: NotificationClient::new(http(&config.notifications_url)),
            session,
        })
    }
}
