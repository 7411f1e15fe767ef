use std::fmt;

use axum::{
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, request::Parts},
};
use axum_extra::TypedHeader;
use headers::Header;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const IDENTITY_PREFIX: &str = "user-";
const IDENTITY_SUFFIX_LEN: usize = 9;
const MAX_IDENTITY_LEN: usize = 64;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static CLIENT_IDENTITY_HEADER: HeaderName = HeaderName::from_static("x-client-identity");

/// Pseudo-identity of one browser profile.
///
/// Not backed by any authentication: it only lets the like flow recognise a
/// repeat endorsement from the same device. The browser keeps it in local
/// storage and sends it back on every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..IDENTITY_SUFFIX_LEN)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();

        Self(format!("{IDENTITY_PREFIX}{suffix}"))
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();

        if raw.is_empty() || raw.len() > MAX_IDENTITY_LEN {
            return Err(AppError::BadRequest("Invalid client identity".into()));
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::BadRequest("Invalid client identity".into()));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ClientIdentity {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClientIdentity> for String {
    fn from(identity: ClientIdentity) -> Self {
        identity.0
    }
}

/// `x-client-identity` request header.
pub struct ClientIdentityHeader(pub ClientIdentity);

impl Header for ClientIdentityHeader {
    fn name() -> &'static HeaderName {
        &CLIENT_IDENTITY_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let raw = value.to_str().map_err(|_| headers::Error::invalid())?;

        ClientIdentity::parse(raw)
            .map(ClientIdentityHeader)
            .map_err(|_| headers::Error::invalid())
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(self.0.as_str()) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Extracts the caller's identity; rejects the request when it is missing.
pub struct Identity(pub ClientIdentity);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(ClientIdentityHeader(identity)) =
            TypedHeader::<ClientIdentityHeader>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::BadRequest("Missing or invalid x-client-identity header".into())
                })?;

        Ok(Identity(identity))
    }
}

/// Like [`Identity`], but a missing or malformed header yields `None`.
pub struct MaybeIdentity(pub Option<ClientIdentity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = TypedHeader::<ClientIdentityHeader>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(ClientIdentityHeader(identity))| identity);

        Ok(MaybeIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_identity_has_expected_shape() {
        let identity = ClientIdentity::generate();
        let suffix = identity.as_str().strip_prefix(IDENTITY_PREFIX).unwrap();

        assert_eq!(suffix.len(), IDENTITY_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert!(ClientIdentity::parse(identity.as_str()).is_ok());
    }

    #[test]
    fn parse_rejects_blank_and_odd_characters() {
        assert!(ClientIdentity::parse("").is_err());
        assert!(ClientIdentity::parse("   ").is_err());
        assert!(ClientIdentity::parse("user 1").is_err());
        assert!(ClientIdentity::parse(&"a".repeat(65)).is_err());
        assert_eq!(ClientIdentity::parse(" user-abc ").unwrap().as_str(), "user-abc");
    }
}
