/**
 * Session Management and JWT Tokens
 *
 * Issues and verifies the HS256 session token carried in the session cookie,
 * and builds the `Set-Cookie` values that install and clear it.
 *
 * # Cookie Attributes
 *
 * - Always `HttpOnly; Path=/; Max-Age=<ttl>`
 * - Development: `SameSite=Strict`
 * - Production: `Secure; SameSite=None` so a cross-site client can send it
 */

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::AppConfig;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Any other claims the client posted
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The verified identity behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    cookie_name: String,
    secure: bool,
}

impl SessionManager {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: i64::try_from(config.session_ttl_secs).unwrap_or(i64::MAX),
            cookie_name: config.session_cookie.clone(),
            secure: config.deployment.is_production(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Sign a token for `email`. `exp` and `iat` in `extra` are replaced.
    pub fn issue(&self, email: &str, mut extra: Map<String, Value>) -> Result<String, jsonwebtoken::errors::Error> {
        extra.remove("email");
        extra.remove("exp");
        extra.remove("iat");

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            email: email.to_string(),
            exp: now.saturating_add(self.ttl_secs),
            iat: now,
            extra,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Principal, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(Principal {
            email: data.claims.email,
        })
    }

    /// `Set-Cookie` value installing `token`
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; {}",
            self.cookie_name,
            token,
            self.ttl_secs,
            self.same_site()
        )
    }

    /// `Set-Cookie` value removing the session cookie
    pub fn clear_cookie(&self) -> String {
        format!("{}=; HttpOnly; Path=/; Max-Age=0; {}", self.cookie_name, self.same_site())
    }

    fn same_site(&self) -> &'static str {
        if self.secure {
            "Secure; SameSite=None"
        } else {
            "SameSite=Strict"
        }
    }

    /// The session token from the cookie, or from `Authorization: Bearer`
    pub fn extract_credential(&self, headers: &HeaderMap) -> Option<String> {
        let from_cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, token)| token.to_string());

        from_cookie.filter(|token| !token.is_empty()).or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
        })
    }
}
