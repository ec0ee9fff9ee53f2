//! Manual out-of-band authorization-code flow
//!
//! ```text
//! Init ──start──▶ AwaitingUserCode ──submit_code──▶ Exchanging ──▶ Complete
//!                                                        └──────▶ Failed
//! ```
//!
//! Nothing is retried. `Failed` is terminal until `reset()` puts the flow back
//! in `Init`.

use credential_core::storage::ENCRYPTED_PREFIX;
use credential_core::{CredentialError, CredentialFacade, Result, SecretString};
use tracing::{info, warn};

use crate::authorization::authorization_url;
use crate::operator::Operator;
use crate::token::{CodeExchange, TokenClient, TokenGrant};

/// Where the flow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Init,
    AwaitingUserCode,
    Exchanging,
    Complete,
    Failed,
}

/// OAuth client registration used for the exchange
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl OAuthClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }

    /// The mail client registration from the credential store
    pub fn from_facade(facade: &CredentialFacade) -> Result<Self> {
        let creds = facade.get_mail_oauth_credentials()?;
        if creds.client_id.is_empty() || creds.client_secret.is_empty() {
            return Err(CredentialError::NotConfigured(
                "OAuth client id and secret must be set before running the flow".to_string(),
            ));
        }
        Ok(Self {
            client_id: creds.client_id,
            client_secret: creds.client_secret,
        })
    }
}

/// One run of the manual consent + code exchange
pub struct ManualOAuthFlow<'a> {
    facade: &'a CredentialFacade,
    client: OAuthClient,
    token_client: TokenClient,
    state: FlowState,
}

impl<'a> ManualOAuthFlow<'a> {
    /// Flow against the token endpoint named in the facade's settings
    pub fn new(facade: &'a CredentialFacade, client: OAuthClient) -> Result<Self> {
        let token_client = TokenClient::new(facade.settings().oauth.token_url.clone())?;
        Ok(Self::with_token_client(facade, client, token_client))
    }

    pub fn with_token_client(
        facade: &'a CredentialFacade,
        client: OAuthClient,
        token_client: TokenClient,
    ) -> Self {
        Self {
            facade,
            client,
            token_client,
            state: FlowState::Init,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Back to `Init` so the operator can start over
    pub fn reset(&mut self) {
        self.state = FlowState::Init;
    }

    /// Build the consent URL and wait for the operator's code
    pub fn start(&mut self) -> Result<String> {
        self.expect_state(FlowState::Init)?;

        let url = authorization_url(&self.facade.settings().oauth, &self.client.client_id)?;
        self.state = FlowState::AwaitingUserCode;

        info!("Awaiting authorization code for client {}", truncate(&self.client.client_id));
        Ok(url)
    }

    /// Exchange the operator's code for tokens and persist the refresh token.
    ///
    /// Blank input is rejected without leaving `AwaitingUserCode`. Every
    /// failure after the request is sent ends in `Failed`.
    pub fn submit_code(&mut self, code: &str) -> Result<TokenGrant> {
        self.expect_state(FlowState::AwaitingUserCode)?;

        let code = code.trim();
        if code.is_empty() {
            return Err(CredentialError::UserInputError(
                "no authorization code was entered".to_string(),
            ));
        }

        self.state = FlowState::Exchanging;
        match self.exchange_and_persist(code) {
            Ok(grant) => {
                self.state = FlowState::Complete;
                Ok(grant)
            }
            Err(e) => {
                warn!("OAuth flow failed: {}", e);
                self.state = FlowState::Failed;
                Err(e)
            }
        }
    }

    /// Drive the flow through `operator`. After a blank code the flow is still
    /// awaiting one, and calling `run` again prompts for it again.
    pub fn run(&mut self, operator: &mut dyn Operator) -> Result<TokenGrant> {
        let url = if self.state == FlowState::AwaitingUserCode {
            authorization_url(&self.facade.settings().oauth, &self.client.client_id)?
        } else {
            self.start()?
        };
        operator.present_url(&url)?;
        let code = operator.read_authorization_code()?;
        self.submit_code(&code)
    }

    fn exchange_and_persist(&self, code: &str) -> Result<TokenGrant> {
        let settings = &self.facade.settings().oauth;
        let grant = self.token_client.exchange_code(&CodeExchange {
            client_id: &self.client.client_id,
            client_secret: self.client.client_secret.expose(),
            code,
            redirect_uri: &settings.redirect_uri,
        })?;

        // One rewrite for all keys so a failure leaves none of them half-updated
        let mut encrypted = Vec::with_capacity(settings.refresh_token_keys.len());
        for key in &settings.refresh_token_keys {
            let encoded = self.facade.key_manager().encrypt_string(grant.refresh_token.expose())?;
            encrypted.push((key.as_str(), format!("{}{}", ENCRYPTED_PREFIX, encoded)));
        }
        let updates: Vec<(&str, &str)> = encrypted
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        self.facade.store().update_all(&updates)?;

        info!(
            "Refresh token saved under {}; restart the workflow to pick it up",
            settings.refresh_token_keys.join(", ")
        );
        Ok(grant)
    }

    fn expect_state(&self, expected: FlowState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CredentialError::FlowStateError(format!(
                "expected {:?}, flow is {:?}",
                expected, self.state
            )))
        }
    }
}

fn truncate(value: &str) -> String {
    let head: String = value.chars().take(30).collect();
    if head.len() < value.len() {
        format!("{}...", head)
    } else {
        head
    }
}
