//! JWT Token Issuer
//! Mission: Issue and verify HS256 tokens per the configured validation settings

use crate::auth::models::Claims;
use crate::config::TokenValidation;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, warn};

/// Minimum HS256 key length with enough entropy to resist brute force.
const MIN_SIGNING_KEY_BYTES: usize = 32;

/// Issues and verifies tokens under a single set of validation settings.
pub struct TokenIssuer {
    settings: TokenValidation,
}

impl TokenIssuer {
    pub fn new(settings: TokenValidation) -> Self {
        if settings.signing_key.len() < MIN_SIGNING_KEY_BYTES {
            warn!(
                key_bytes = settings.signing_key.len(),
                min_bytes = MIN_SIGNING_KEY_BYTES,
                "Signing key is shorter than the HS256 minimum; tokens will be weak"
            );
        }

        Self { settings }
    }

    pub fn settings(&self) -> &TokenValidation {
        &self.settings
    }

    /// Issue a signed token for an authenticated identity.
    ///
    /// Pure computation with no clock access of its own: identical inputs,
    /// including both supplied timestamps, produce byte-identical tokens.
    /// Callers pre-validate the identity; roles pass through as given,
    /// order-preserving and without deduplication.
    pub fn issue_token(
        &self,
        username: &str,
        email: &str,
        roles: &[String],
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String> {
        let claims = Claims {
            sub: username.to_string(),
            email: email.to_string(),
            role: roles.to_vec(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!(
            username,
            roles = roles.len(),
            exp = claims.exp,
            "Issuing token"
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.signing_key.as_bytes()),
        )
        .context("Failed to encode JWT")
    }

    /// Verify a token and return its claims.
    ///
    /// Signature, expiry, audience, and issuer checks each honor their
    /// configured toggle; `clock_skew_minutes` applies as leeway on the
    /// time-based checks.
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.settings.clock_skew_minutes.max(0) as u64 * 60;
        validation.validate_exp = self.settings.validate_lifetime;
        validation.validate_aud = self.settings.validate_audience;
        if self.settings.validate_audience {
            validation.set_audience(&[self.settings.audience.as_str()]);
        }
        if self.settings.validate_issuer {
            validation.set_issuer(&[self.settings.issuer.as_str()]);
        }
        if !self.settings.validate_signing_key {
            warn!("Token signature validation is disabled");
            validation.insecure_disable_signature_validation();
        }

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.signing_key.as_bytes()),
            &validation,
        )
        .context("Invalid or expired token")?;

        debug!(sub = %decoded.claims.sub, "Validated token");

        Ok(decoded.claims)
    }
}
