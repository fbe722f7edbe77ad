// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification.

use crate::config::Config;
use crate::error::AppError;
use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Identity extracted from a valid ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
}

/// Token verification error categories.
#[derive(Debug, Clone)]
pub enum TokenError {
    /// The token is malformed, expired or issued for another project.
    Invalid(String),
    /// Keys could not be fetched.
    Transient(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(reason) => {
                tracing::debug!(reason = %reason, "Rejected ID token");
                AppError::InvalidToken
            }
            TokenError::Transient(reason) => {
                AppError::Internal(anyhow::anyhow!("Token keys unavailable: {}", reason))
            }
        }
    }
}

#[derive(Clone)]
enum VerifierMode {
    Google,
    /// Auth emulator tokens are unsigned; only the claims are checked.
    Emulator,
    StaticKey {
        kid: String,
        algorithm: Algorithm,
        decoding_key: Arc<DecodingKey>,
    },
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for Firebase Authentication ID tokens.
pub struct TokenVerifier {
    http_client: reqwest::Client,
    project_id: String,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl TokenVerifier {
    /// Create a production verifier that fetches and caches the securetoken JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self::build(config, VerifierMode::Google)?;
        tracing::info!(project = %verifier.project_id, "Initialized ID token verifier");
        Ok(verifier)
    }

    /// Create a verifier for tokens minted by the Firebase Auth emulator.
    ///
    /// Emulator tokens carry `alg: none`, so signatures are not checked. Never
    /// use this outside local development.
    pub fn new_for_emulator(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self::build(config, VerifierMode::Emulator)?;
        tracing::warn!(
            project = %verifier.project_id,
            "ID token signatures are NOT verified (auth emulator)"
        );
        Ok(verifier)
    }

    /// Create a verifier with a fixed key for one `kid`.
    ///
    /// Intended for local and integration tests, which sign tokens with HS256.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        algorithm: Algorithm,
        decoding_key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        if kid.trim().is_empty() {
            anyhow::bail!("static token kid must not be empty");
        }

        Self::build(
            config,
            VerifierMode::StaticKey {
                kid,
                algorithm,
                decoding_key: Arc::new(decoding_key),
            },
        )
    }

    fn build(config: &Config, mode: VerifierMode) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building token verifier HTTP client")?;

        Ok(Self {
            http_client,
            project_id: config.firebase_project_id.clone(),
            mode,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Expected `iss` claim for this project.
    pub fn issuer(&self) -> String {
        format!("{}{}", ISSUER_PREFIX, self.project_id)
    }

    /// Verify an ID token and return the identity it carries.
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Invalid("token is empty".to_string()));
        }

        if matches!(self.mode, VerifierMode::Emulator) {
            let claims = decode_unsigned_claims(token)?;
            self.check_unsigned_claims(&claims)?;
            return identity_from_claims(claims);
        }

        let header = decode_header(token)
            .map_err(|e| TokenError::Invalid(format!("invalid JWT header: {e}")))?;

        let expected_alg = match &self.mode {
            VerifierMode::StaticKey { algorithm, .. } => *algorithm,
            VerifierMode::Google | VerifierMode::Emulator => Algorithm::RS256,
        };
        if header.alg != expected_alg {
            return Err(TokenError::Invalid(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| TokenError::Invalid("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let issuer = self.issuer();
        let mut validation = Validation::new(expected_alg);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<IdTokenClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| TokenError::Invalid(format!("JWT validation failed: {e}")))?
            .claims;

        identity_from_claims(claims)
    }

    /// The issuer, audience and expiry checks `decode` performs for signed tokens.
    fn check_unsigned_claims(&self, claims: &IdTokenClaims) -> Result<(), TokenError> {
        if claims.iss != self.issuer() {
            return Err(TokenError::Invalid(format!("unexpected issuer: {}", claims.iss)));
        }
        if claims.aud != self.project_id {
            return Err(TokenError::Invalid(format!("unexpected audience: {}", claims.aud)));
        }
        if (claims.exp as u64) + CLOCK_SKEW_SECS < now_unix_secs() {
            return Err(TokenError::Invalid("token expired".to_string()));
        }
        Ok(())
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, TokenError> {
        if let VerifierMode::StaticKey {
            kid: static_kid,
            decoding_key,
            ..
        } = &self.mode
        {
            if kid == static_kid {
                return Ok(decoding_key.clone());
            }
            return Err(TokenError::Invalid(format!(
                "unknown JWT kid for static verifier: {kid}"
            )));
        }

        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Keys rotate; a miss on a fresh cache forces one refetch.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(TokenError::Invalid(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), TokenError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!("Refreshing securetoken JWKS cache");

        let response = self
            .http_client
            .get(SECURETOKEN_JWKS_URL)
            .send()
            .await
            .map_err(|e| TokenError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(TokenError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| TokenError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(TokenError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Securetoken JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if jwk.use_.as_deref().is_some_and(|use_| use_ != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

/// Claims of a Firebase ID token.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: usize,
    pub iat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

/// Payload of an unsigned JWT, without any signature check.
fn decode_unsigned_claims(token: &str) -> Result<IdTokenClaims, TokenError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| TokenError::Invalid("malformed JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::Invalid(format!("invalid JWT payload encoding: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Invalid(format!("invalid JWT claims: {e}")))
}

/// Checks shared by every verifier mode once the claims are trusted.
fn identity_from_claims(claims: IdTokenClaims) -> Result<VerifiedIdentity, TokenError> {
    validate_iat(claims.iat)?;

    if claims.sub.is_empty() {
        return Err(TokenError::Invalid("empty sub claim".to_string()));
    }

    let uid = claims.user_id.unwrap_or_else(|| claims.sub.clone());
    if uid != claims.sub {
        return Err(TokenError::Invalid("user_id does not match sub".to_string()));
    }

    Ok(VerifiedIdentity {
        uid,
        email: claims.email,
        email_verified: claims.email_verified.unwrap_or(false),
    })
}

fn validate_iat(iat: Option<usize>) -> Result<(), TokenError> {
    let Some(iat) = iat else {
        return Err(TokenError::Invalid("missing iat claim".to_string()));
    };

    if iat as u64 > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(TokenError::Invalid("iat claim is in the future".to_string()));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value.split(',').find_map(|directive| {
        directive
            .trim()
            .strip_prefix("max-age=")
            .and_then(|raw| raw.trim_matches('"').parse::<u64>().ok())
    })
}

pub(crate) fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"unit-test-secret";

    fn verifier() -> TokenVerifier {
        TokenVerifier::new_with_static_key(
            &Config::test_default(),
            "test-kid",
            Algorithm::HS256,
            DecodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    fn sign(claims: &IdTokenClaims, kid: &str) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());
        encode(&header, claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    fn claims(uid: &str) -> IdTokenClaims {
        let now = now_unix_secs() as usize;
        IdTokenClaims {
            iss: "https://securetoken.google.com/test-project".to_string(),
            aud: "test-project".to_string(),
            sub: uid.to_string(),
            exp: now + 3600,
            iat: Some(now),
            user_id: Some(uid.to_string()),
            email: Some("user@example.com".to_string()),
            email_verified: Some(true),
        }
    }

    #[tokio::test]
    async fn test_valid_token() {
        let identity = verifier().verify(&sign(&claims("u1"), "test-kid")).await.unwrap();
        assert_eq!(identity.uid, "u1");
        assert_eq!(identity.email.as_deref(), Some("user@example.com"));
        assert!(identity.email_verified);
    }

    #[tokio::test]
    async fn test_rejects_wrong_audience_and_kid() {
        let v = verifier();

        let mut other = claims("u1");
        other.aud = "other-project".to_string();
        assert!(matches!(
            v.verify(&sign(&other, "test-kid")).await,
            Err(TokenError::Invalid(_))
        ));

        assert!(matches!(
            v.verify(&sign(&claims("u1"), "unknown")).await,
            Err(TokenError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_expired_and_mismatched_uid() {
        let v = verifier();

        let mut expired = claims("u1");
        expired.exp = 1_000;
        expired.iat = Some(900);
        assert!(v.verify(&sign(&expired, "test-kid")).await.is_err());

        let mut mismatched = claims("u1");
        mismatched.user_id = Some("u2".to_string());
        assert!(v.verify(&sign(&mismatched, "test-kid")).await.is_err());
    }

    fn unsigned(claims: &IdTokenClaims) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{header}.{payload}.")
    }

    #[tokio::test]
    async fn test_emulator_accepts_unsigned_tokens() {
        let v = TokenVerifier::new_for_emulator(&Config::test_default()).unwrap();
        let identity = v.verify(&unsigned(&claims("u1"))).await.unwrap();
        assert_eq!(identity.uid, "u1");
        assert!(identity.email_verified);

        let mut other = claims("u1");
        other.aud = "other-project".to_string();
        assert!(matches!(
            v.verify(&unsigned(&other)).await,
            Err(TokenError::Invalid(_))
        ));

        let mut expired = claims("u1");
        expired.exp = 1_000;
        expired.iat = Some(900);
        assert!(v.verify(&unsigned(&expired)).await.is_err());
        assert!(v.verify("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_static_verifier_rejects_unsigned_tokens() {
        assert!(verifier().verify(&unsigned(&claims("u1"))).await.is_err());
    }

    #[test]
    fn test_parse_cache_control_max_age() {
        assert_eq!(parse_cache_control_max_age("public, max-age=3600"), Some(3600));
        assert_eq!(parse_cache_control_max_age("max-age=\"120\""), Some(120));
        assert_eq!(parse_cache_control_max_age("no-cache"), None);
    }
}
