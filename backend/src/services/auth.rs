//! PIN gate: exchanges the shared access PIN for a session token

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

/// Subject of every session token; there is a single shared identity
pub const STAFF_SUBJECT: &str = "staff";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    pin: String,
    pin_hash: String,
    jwt_secret: String,
    session_expiry: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub pin: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Session token returned by login
#[derive(Debug, Serialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authenticated session, inserted into request extensions by the middleware
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthSession {
    pub subject: String,
    pub expires_at: i64,
    /// False when no PIN is configured and every request is let through
    pub pin_protected: bool,
}

impl AuthSession {
    pub fn open() -> Self {
        Self {
            subject: STAFF_SUBJECT.to_string(),
            expires_at: 0,
            pin_protected: false,
        }
    }
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            pin: config.pin.clone(),
            pin_hash: config.pin_hash.clone(),
            jwt_secret: config.jwt_secret.clone(),
            session_expiry: config.session_expiry,
        }
    }

    pub fn pin_required(&self) -> bool {
        !self.pin.is_empty() || !self.pin_hash.is_empty()
    }

    fn signing_secret(&self) -> Option<&[u8]> {
        let secret = self.jwt_secret.trim();
        (!secret.is_empty()).then_some(secret.as_bytes())
    }

    fn pin_matches(&self, pin: &str) -> AppResult<bool> {
        if !self.pin_hash.is_empty() {
            return verify(pin, &self.pin_hash)
                .map_err(|e| AppError::Internal(format!("PIN verification failed: {}", e)));
        }
        Ok(!self.pin.is_empty() && pin == self.pin)
    }

    /// Check the PIN and issue a session token
    pub fn login(&self, input: &LoginInput) -> AppResult<SessionToken> {
        if !self.pin_required() {
            return self.issue();
        }
        if !self.pin_matches(input.pin.trim())? {
            tracing::warn!("Rejected login with wrong PIN");
            return Err(AppError::InvalidCredentials);
        }
        tracing::info!("Session opened");
        self.issue()
    }

    fn issue(&self) -> AppResult<SessionToken> {
        let secret = self
            .signing_secret()
            .ok_or_else(|| AppError::Internal("Session secret is not configured".to_string()))?;
        let now = Utc::now();
        let claims = Claims {
            sub: STAFF_SUBJECT.to_string(),
            exp: (now + Duration::seconds(self.session_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(SessionToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.session_expiry,
        })
    }

    pub fn validate_token(&self, token: &str) -> AppResult<AuthSession> {
        let Some(secret) = self.signing_secret() else {
            tracing::error!("Session secret is not configured; rejecting token");
            return Err(AppError::Unauthorized {
                message: "Session secret is not configured".to_string(),
                message_pt: "Sessão indisponível".to_string(),
            });
        };
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized {
            message: format!("Invalid token: {}", e),
            message_pt: "Sessão inválida ou expirada".to_string(),
        })?;

        Ok(AuthSession {
            subject: token_data.claims.sub,
            expires_at: token_data.claims.exp,
            pin_protected: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn with_pin(pin: &str, pin_hash: &str) -> AuthService {
        let mut config = Config::for_tests().auth;
        config.pin = pin.to_string();
        config.pin_hash = pin_hash.to_string();
        AuthService::new(&config)
    }

    fn login(service: &AuthService, pin: &str) -> AppResult<SessionToken> {
        service.login(&LoginInput {
            pin: pin.to_string(),
        })
    }

    #[test]
    fn test_plain_pin() {
        let service = with_pin("4321", "");
        let token = login(&service, " 4321 ").unwrap();
        assert_eq!(token.token_type, "Bearer");

        let session = service.validate_token(&token.access_token).unwrap();
        assert_eq!(session.subject, STAFF_SUBJECT);
        assert!(session.pin_protected);

        assert!(matches!(
            login(&service, "0000"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashed_pin() {
        let hash = bcrypt::hash("2468", 4).unwrap();
        let service = with_pin("", &hash);
        assert!(login(&service, "2468").is_ok());
        assert!(matches!(
            login(&service, "1357"),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_no_pin_configured_always_logs_in() {
        let service = with_pin("", "");
        assert!(!service.pin_required());
        assert!(login(&service, "").is_ok());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let service = with_pin("4321", "");
        let token = login(&service, "4321").unwrap();

        let mut other = Config::for_tests().auth;
        other.pin = "4321".to_string();
        other.jwt_secret = "another-secret".to_string();
        let err = AuthService::new(&other)
            .validate_token(&token.access_token)
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_empty_secret_neither_issues_nor_accepts_tokens() {
        let mut config = Config::for_tests().auth;
        config.pin = "4321".to_string();
        config.jwt_secret = String::new();
        let service = AuthService::new(&config);

        assert!(matches!(login(&service, "4321"), Err(AppError::Internal(_))));

        // Signed with an empty key, which decodes fine unless refused
        let now = Utc::now();
        let forged = encode(
            &Header::default(),
            &Claims {
                sub: "anyone".to_string(),
                exp: (now + Duration::seconds(60)).timestamp(),
                iat: now.timestamp(),
            },
            &EncodingKey::from_secret(b""),
        )
        .unwrap();
        assert!(matches!(
            service.validate_token(&forged),
            Err(AppError::Unauthorized { .. })
        ));
    }
}
