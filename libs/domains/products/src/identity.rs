//! Caller identity as seen by the product core.
//!
//! Resolved upstream (token verification, user lookup) and placed in the
//! request extensions. Handlers take `Identity` when one is required and
//! `Option<Identity>` when the caller may be anonymous.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use utoipa::ToSchema;

use crate::error::ProductError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User id; stored as the product `owner`
    pub owner_id: String,
    pub owner_email: String,
}

impl Identity {
    pub fn new(owner_id: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            owner_email: owner_email.into(),
        }
    }

    pub fn owns(&self, owner: &str) -> bool {
        self.owner_id == owner
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(|| ProductError::Unauthorized("Sign in to perform this action".to_string()))
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned())
    }
}
