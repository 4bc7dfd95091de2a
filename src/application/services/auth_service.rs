//! Authentication service for the OpenAir login flow.

use std::sync::Arc;

use crate::domain::entities::Credentials;
use crate::domain::gateway::{AccountingTransport, AuthOutcome, GatewayError};
use crate::domain::openair::{ApplicationIdentity, RequestDocument, TaskQuery, auth_status, parse_tree};

/// Checks credentials against the remote accounting service.
///
/// Each call performs exactly one request/response exchange: encode the
/// request document, post it through the transport, parse the reply and read
/// the `Auth` status. Nothing is retried or cached.
pub struct AuthService {
    transport: Arc<dyn AccountingTransport>,
    application: ApplicationIdentity,
    query: TaskQuery,
}

impl AuthService {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `transport` - delivers request documents to the remote service
    /// - `application` - identity and API key sent with every request
    /// - `query` - task filters attached to the login request
    pub fn new(
        transport: Arc<dyn AccountingTransport>,
        application: ApplicationIdentity,
        query: TaskQuery,
    ) -> Self {
        Self {
            transport,
            application,
            query,
        }
    }

    /// Builds the request document for `credentials`.
    pub fn request_document<'a>(&'a self, credentials: &'a Credentials) -> RequestDocument<'a> {
        RequestDocument::new(
            &self.application,
            credentials,
            vec![self.query.to_read_command()],
        )
    }

    /// Authenticates `credentials` with the remote service.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Encode`] if the request cannot be serialized
    /// - [`GatewayError::Transport`] / [`GatewayError::HttpStatus`] from the transport
    /// - [`GatewayError::Parse`] if the reply is not well-formed XML
    ///
    /// A well-formed reply without a success status is `Ok(Unauthorized)`.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<AuthOutcome, GatewayError> {
        let body = self.request_document(credentials).to_xml()?;

        tracing::debug!(user = %credentials.username, "Sending auth request to accounting service");

        let raw = self.transport.send(body).await?;
        let tree = parse_tree(&raw)?;
        let outcome = AuthOutcome::from_status(auth_status(&tree));

        tracing::debug!(user = %credentials.username, ?outcome, "Accounting service replied");

        Ok(outcome)
    }

    /// Returns `true` only when the service reports the success status.
    ///
    /// Transport and parse failures count as a failed login, same as a
    /// rejected password.
    pub async fn is_authenticated(&self, credentials: &Credentials) -> bool {
        match self.authenticate(credentials).await {
            Ok(outcome) => outcome.is_authorized(),
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Authentication exchange failed");
                false
            }
        }
    }
}
