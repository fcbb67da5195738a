//! Guard stage for protected operations.
//!
//! A protected operation implements [`Handler`] for its payload type and is
//! wrapped in [`Guarded`]. The guard runs the [`AuthGate`] first and only
//! invokes the handler for granted requests, so handlers never see an
//! unauthenticated caller.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use keyward_authn::{
//!     AuthGate, Result,
//!     guard::{AuthorizedRequest, GuardOutcome, Guarded, Handler},
//!     strategy::SignatureStrategy,
//! };
//! use keyward_storage::auth::MemoryKeyRegistry;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct RenameHost {
//!     owner: String,
//!     host: String,
//! }
//!
//! struct RenameHostHandler;
//!
//! #[async_trait]
//! impl Handler<RenameHost> for RenameHostHandler {
//!     type Output = String;
//!
//!     async fn handle(&self, request: AuthorizedRequest<RenameHost>) -> Result<String> {
//!         request.require_identity(&request.payload.owner)?;
//!         Ok(format!("renamed {}", request.payload.host))
//!     }
//! }
//!
//! # async fn example(body: &[u8]) -> Result<()> {
//! let gate = AuthGate::new(Arc::new(MemoryKeyRegistry::new()), Arc::new(SignatureStrategy));
//! let guarded = Guarded::new(gate, RenameHostHandler);
//!
//! match guarded.call_json(body).await? {
//!     GuardOutcome::Completed(reply) => println!("{reply}"),
//!     GuardOutcome::Rejected => println!("{}", GuardOutcome::<String>::REJECTION_MESSAGE),
//! }
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;

use async_trait::async_trait;
use keyward_storage::auth::UserRecord;
use serde::de::DeserializeOwned;

use crate::{
    envelope::SignedRequest,
    error::{AuthError, Result},
    gate::{AuthGate, Verdict},
};

/// A request that passed the gate, with its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedRequest<P> {
    /// The authenticated user.
    pub user: UserRecord,
    /// The operation-specific payload.
    pub payload: P,
}

impl<P> AuthorizedRequest<P> {
    /// Returns the authenticated username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.user.username.as_str()
    }

    /// Requires the authenticated user to be `username`.
    ///
    /// Used by operations that act on a particular user's resources.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] if the authenticated user is someone
    /// else.
    pub fn require_identity(&self, username: &str) -> Result<()> {
        if self.username() == username {
            Ok(())
        } else {
            tracing::info!(actor = self.username(), requested = username, "identity check failed");
            Err(AuthError::forbidden(self.username(), username))
        }
    }
}

/// A protected operation.
#[async_trait]
pub trait Handler<P>: Send + Sync
where
    P: Send + 'static,
{
    /// The operation's result.
    type Output: Send;

    /// Runs the operation for an authenticated caller.
    async fn handle(&self, request: AuthorizedRequest<P>) -> Result<Self::Output>;
}

/// Result of calling a guarded handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome<R> {
    /// The gate granted the request and the handler returned.
    Completed(R),
    /// The gate denied the request; the handler was not invoked.
    Rejected,
}

impl<R> GuardOutcome<R> {
    /// The message shown to callers for every rejection.
    pub const REJECTION_MESSAGE: &'static str = "access denied";

    /// Returns `true` if the request was rejected.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }

    /// Returns the handler's result, if it ran.
    #[must_use]
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(output) => Some(output),
            Self::Rejected => None,
        }
    }
}

/// A handler wrapped in the authentication gate.
pub struct Guarded<H, P> {
    gate: AuthGate,
    handler: H,
    _payload: PhantomData<fn() -> P>,
}

impl<H, P> Guarded<H, P>
where
    H: Handler<P>,
    P: DeserializeOwned + Send + 'static,
{
    /// Wraps `handler` so it runs only for authorized requests.
    pub fn new(gate: AuthGate, handler: H) -> Self {
        Self { gate, handler, _payload: PhantomData }
    }

    /// Returns the wrapped handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Authorizes `envelope` and, if granted, decodes its payload and runs
    /// the handler.
    ///
    /// # Errors
    ///
    /// Returns any error from [`AuthGate::authorize`], an
    /// [`AuthError::InvalidPayload`] if the signed message does not decode
    /// into `P`, or the handler's own error.
    pub async fn call(&self, envelope: &SignedRequest) -> Result<GuardOutcome<H::Output>> {
        let user = match self.gate.authorize(envelope).await? {
            Verdict::Granted(user) => user,
            Verdict::Denied => return Ok(GuardOutcome::Rejected),
        };

        let payload = envelope.payload::<P>()?;
        let output = self.handler.handle(AuthorizedRequest { user, payload }).await?;
        Ok(GuardOutcome::Completed(output))
    }

    /// Parses the envelope from its JSON wire form, then behaves like
    /// [`call`](Self::call).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEnvelope`] for a malformed body, otherwise
    /// the errors of [`call`](Self::call).
    pub async fn call_json(&self, body: &[u8]) -> Result<GuardOutcome<H::Output>> {
        let envelope = SignedRequest::from_json(body)?;
        self.call(&envelope).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use keyward_storage::{
        auth::KeyRegistry,
        testutil::{make_key, make_user, registry_with_users},
    };
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::{
        assert_auth_error,
        strategy::SignatureStrategy,
        testutil::{test_keypair, test_public_key},
    };

    #[derive(Debug, Serialize, Deserialize)]
    struct DeleteHost {
        owner: String,
        host: String,
    }

    #[derive(Default)]
    struct CountingHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Handler<DeleteHost> for CountingHandler {
        type Output = String;

        async fn handle(&self, request: AuthorizedRequest<DeleteHost>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            request.require_identity(&request.payload.owner)?;
            Ok(format!("deleted {}", request.payload.host))
        }
    }

    async fn guarded() -> Guarded<CountingHandler, DeleteHost> {
        let registry = registry_with_users(&["alice"]).await;
        registry.add_key(&make_key("alice", "k1", &test_public_key(0))).await.unwrap();
        let gate = AuthGate::new(Arc::new(registry), Arc::new(SignatureStrategy));
        Guarded::new(gate, CountingHandler::default())
    }

    fn request(username: &str, owner: &str, key_index: usize) -> SignedRequest {
        let payload = DeleteHost { owner: owner.into(), host: "db-01".into() };
        SignedRequest::sign(username, &payload, &test_keypair(key_index)).unwrap()
    }

    #[tokio::test]
    async fn test_granted_request_reaches_handler() {
        let guarded = guarded().await;

        let outcome = guarded.call(&request("alice", "alice", 0)).await.unwrap();

        assert_eq!(outcome, GuardOutcome::Completed("deleted db-01".to_owned()));
        assert_eq!(guarded.handler().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_request_never_reaches_handler() {
        let guarded = guarded().await;

        let outcome = guarded.call(&request("alice", "alice", 1)).await.unwrap();
        assert!(outcome.is_rejected());

        let outcome = guarded.call(&request("mallory", "mallory", 0)).await.unwrap();
        assert!(outcome.is_rejected());

        assert_eq!(guarded.handler().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_identity_check() {
        let guarded = guarded().await;

        let result = guarded.call(&request("alice", "bob", 0)).await;
        assert!(
            matches!(result, Err(AuthError::Forbidden { ref actor, ref target }) if actor == "alice" && target == "bob")
        );
    }

    #[tokio::test]
    async fn test_signed_but_wrong_payload_shape() {
        let guarded = guarded().await;
        let envelope = SignedRequest::sign("alice", &["not", "a", "struct"], &test_keypair(0)).unwrap();

        assert_auth_error!(guarded.call(&envelope).await, InvalidPayload);
        assert_eq!(guarded.handler().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_call_json() {
        let guarded = guarded().await;
        let body = request("alice", "alice", 0).to_json().unwrap();

        let outcome = guarded.call_json(body.as_bytes()).await.unwrap();
        assert_eq!(outcome.completed().as_deref(), Some("deleted db-01"));

        assert_auth_error!(guarded.call_json(b"{}").await, InvalidEnvelope);
    }

    #[test]
    fn test_require_identity() {
        let request = AuthorizedRequest { user: make_user("alice"), payload: () };

        assert!(request.require_identity("alice").is_ok());
        assert_auth_error!(request.require_identity("bob"), Forbidden);
    }

    #[test]
    fn test_rejection_message_is_uniform() {
        assert_eq!(GuardOutcome::<()>::REJECTION_MESSAGE, "access denied");
    }
}
