//! Credential extraction.

use crate::error::AuthError;

/// A credential presented with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <value>`
    Bearer(String),
    /// `X-API-Key: <value>`
    ApiKey(String),
}

impl Credential {
    /// Extract a credential from the `Authorization` and `X-API-Key` header
    /// values. A bearer token takes precedence.
    pub fn from_headers(
        authorization: Option<&str>,
        x_api_key: Option<&str>,
    ) -> Result<Self, AuthError> {
        if let Some(token) = authorization.and_then(parse_bearer) {
            return Ok(Credential::Bearer(token.to_string()));
        }
        match x_api_key.map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Credential::ApiKey(key.to_string())),
            _ => Err(AuthError::Missing),
        }
    }

    /// The raw secret regardless of how it was presented.
    pub fn secret(&self) -> &str {
        match self {
            Credential::Bearer(value) | Credential::ApiKey(value) => value,
        }
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
