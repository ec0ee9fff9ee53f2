//! # oauth-exchange
//!
//! Manual OAuth2 authorization-code exchange for the workflow's mail and
//! spreadsheet access:
//! - Consent URL with the out-of-band redirect (no local listener)
//! - Operator-pasted code exchanged in a single blocking request
//! - Refresh token persisted, encrypted, through the credential store
//! - Client id reconciliation against a downloaded client-secrets file

pub mod authorization;
pub mod client_secrets;
pub mod flow;
pub mod operator;
pub mod token;

pub use authorization::authorization_url;
pub use client_secrets::{reconcile_client_id, ClientIdStatus};
pub use flow::{FlowState, ManualOAuthFlow, OAuthClient};
pub use operator::{ConsoleOperator, Operator};
pub use token::{TokenClient, TokenGrant};
