//! axum extractors for the access gates.
//!
//! Both read `Authorization: Bearer <token>`, run the matching gate and hand
//! the handler a fresh [`RequestContext`] carrying the caller identity.
//! Any gate failure is a 401.

use axum::extract::{FromRef, FromRequestParts};
use http::StatusCode;
use http::header::AUTHORIZATION;
use http::request::Parts;
use warden_core::context::RequestContext;

use crate::gate::{AccessGate, GateError, bearer_token};

/// Caller passed the authenticated gate.
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestContext);

/// Caller passed the administrative gate.
#[derive(Debug, Clone)]
pub struct Admin(pub RequestContext);

fn credential(parts: &Parts) -> Result<&str, GateError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(GateError::MissingCredential)
}

fn reject(err: GateError) -> StatusCode {
    tracing::debug!(error = %err, "access gate rejected request");
    StatusCode::UNAUTHORIZED
}

impl<S> FromRequestParts<S> for Authenticated
where
    AccessGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Resolve synchronously and return a 'static future; an `async fn` here
    // would capture `parts` and `state` (E0195 on axum-core 0.5).
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let gate = AccessGate::from_ref(state);
        let result = credential(parts)
            .and_then(|token| gate.enter(&RequestContext::background(), token))
            .map(Self)
            .map_err(reject);
        async move { result }
    }
}

impl<S> FromRequestParts<S> for Admin
where
    AccessGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let gate = AccessGate::from_ref(state);
        let result = credential(parts)
            .and_then(|token| gate.enter_admin(&RequestContext::background(), token))
            .map(Self)
            .map_err(reject);
        async move { result }
    }
}
