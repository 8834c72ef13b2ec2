/**
 * Bearer Token Validation
 *
 * Tokens are issued by an external identity provider (Keycloak style): the
 * caller's roles live under `realm_access.roles`. The verifier checks the
 * signature, expiry and, when configured, the issuer. Audience is not checked.
 *
 * HS256 is used with `JWT_SECRET`; RS256 with `JWT_PUBLIC_KEY_PEM`.
 */

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::shared::config::JwtSettings;
use crate::shared::ConfigError;

/// Realm-level role list
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealmAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject, recorded as the auditor of writes
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub realm_access: RealmAccess,
}

impl Claims {
    /// Claims for `sub` holding `roles`, valid for `ttl_seconds`
    pub fn new(sub: impl Into<String>, roles: &[&str], ttl_seconds: u64) -> Self {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        Self {
            sub: sub.into(),
            exp: now + ttl_seconds,
            iat: Some(now),
            iss: None,
            preferred_username: None,
            realm_access: RealmAccess {
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.realm_access.roles.iter().any(|r| r == role)
    }
}

/// Validates bearer tokens against the configured key
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("issuer", &self.validation.iss)
            .finish()
    }
}

impl JwtVerifier {
    pub fn from_settings(settings: &JwtSettings) -> Result<Self, ConfigError> {
        let (key, algorithm) = match (&settings.public_key_pem, &settings.secret) {
            (Some(pem), _) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    ConfigError::Invalid(format!("JWT_PUBLIC_KEY_PEM is not a valid RSA key: {}", e))
                })?;
                (key, Algorithm::RS256)
            }
            (None, Some(secret)) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            (None, None) => return Err(ConfigError::MissingValue("JWT_SECRET or JWT_PUBLIC_KEY_PEM")),
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Ok(Self { key, validation })
    }

    /// Verify and decode a JWT token
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }
}

/// Sign `claims` with an HS256 secret
///
/// Used by local tooling and tests; production tokens come from the
/// identity provider.
pub fn create_token(secret: &str, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> JwtSettings {
        JwtSettings {
            secret: Some(secret.to_string()),
            ..JwtSettings::default()
        }
    }

    #[test]
    fn test_create_and_verify() {
        let verifier = JwtVerifier::from_settings(&settings("secret")).unwrap();
        let token = create_token("secret", &Claims::new("alice", &["ROLE_ADMIN"], 60)).unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.has_role("ROLE_ADMIN"));
        assert!(!claims.has_role("ROLE_USER"));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let verifier = JwtVerifier::from_settings(&settings("secret")).unwrap();
        let token = create_token("other", &Claims::new("alice", &[], 60)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let verifier = JwtVerifier::from_settings(&settings("secret")).unwrap();
        let mut claims = Claims::new("alice", &["ROLE_ADMIN"], 0);
        claims.exp = 1_000;
        let token = create_token("secret", &claims).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_issuer_is_checked_when_configured() {
        let mut config = settings("secret");
        config.issuer = Some("https://idp.local/realms/app".to_string());
        let verifier = JwtVerifier::from_settings(&config).unwrap();

        let good = create_token(
            "secret",
            &Claims::new("alice", &[], 60).with_issuer("https://idp.local/realms/app"),
        )
        .unwrap();
        let bad = create_token("secret", &Claims::new("alice", &[], 60).with_issuer("elsewhere"))
            .unwrap();

        assert!(verifier.verify(&good).is_ok());
        assert!(verifier.verify(&bad).is_err());
    }

    #[test]
    fn test_missing_realm_access_means_no_roles() {
        let verifier = JwtVerifier::from_settings(&settings("secret")).unwrap();
        let claims = serde_json::json!({"sub": "svc", "exp": chrono::Utc::now().timestamp() + 60});
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let decoded = verifier.verify(&token).unwrap();
        assert!(decoded.realm_access.roles.is_empty());
    }

    #[test]
    fn test_no_key_configured() {
        assert!(JwtVerifier::from_settings(&JwtSettings::default()).is_err());
    }
}
