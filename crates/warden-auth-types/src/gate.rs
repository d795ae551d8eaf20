//! Authenticated and administrative access gates.
//!
//! A gate establishes *who* the caller is. Whether that caller may do a given
//! thing is a permission check performed later against the RBAC store.

use std::sync::Arc;

use uuid::Uuid;
use warden_core::context::RequestContext;
use warden_domain::identity::{Identity, Scope};

use crate::token::{AuthError, CredentialValidator};

/// The two issuers a credential may come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuers {
    /// Issuer of end-user credentials (`JWT_ISSUER`).
    pub user: String,
    /// Issuer of administrative credentials (`JWT_ISSUER_ADMIN`).
    pub admin: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error(transparent)]
    Credential(#[from] AuthError),
    #[error("credential issuer not accepted")]
    UnknownIssuer,
    #[error("administrative credential required")]
    NotAdmin,
    #[error("credential subject is not a user id")]
    MalformedSubject,
}

/// Validates bearer credentials and resolves them to an [`Identity`].
#[derive(Clone)]
pub struct AccessGate {
    validator: Arc<dyn CredentialValidator>,
    issuers: Issuers,
}

impl AccessGate {
    pub fn new(validator: Arc<dyn CredentialValidator>, issuers: Issuers) -> Self {
        Self { validator, issuers }
    }

    /// Authenticated gate: valid signature, unexpired, issued by one of the two issuers.
    pub fn authenticate(&self, token: &str) -> Result<Identity, GateError> {
        let claims = self.validator.decode(token)?;
        let scope = if claims.iss == self.issuers.admin {
            Scope::Admin
        } else if claims.iss == self.issuers.user {
            Scope::User
        } else {
            return Err(GateError::UnknownIssuer);
        };
        let user_id = claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| GateError::MalformedSubject)?;
        Ok(Identity {
            user_id: user_id.into(),
            scope,
        })
    }

    /// Administrative gate: as [`authenticate`](Self::authenticate), and the
    /// issuer must be the administrative one.
    pub fn authenticate_admin(&self, token: &str) -> Result<Identity, GateError> {
        let identity = self.authenticate(token)?;
        if !identity.is_admin() {
            return Err(GateError::NotAdmin);
        }
        Ok(identity)
    }

    /// Run the authenticated gate and bind the identity to a copy of `ctx`.
    pub fn enter(&self, ctx: &RequestContext, token: &str) -> Result<RequestContext, GateError> {
        let identity = self.authenticate(token)?;
        Ok(ctx.clone().with_identity(identity))
    }

    /// Run the administrative gate and bind the identity to a copy of `ctx`.
    pub fn enter_admin(
        &self,
        ctx: &RequestContext,
        token: &str,
    ) -> Result<RequestContext, GateError> {
        let identity = self.authenticate_admin(token)?;
        Ok(ctx.clone().with_identity(identity))
    }
}

/// Extract the credential from an `Authorization` header value.
///
/// Accepts `Bearer <token>`; the scheme is case-insensitive.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
