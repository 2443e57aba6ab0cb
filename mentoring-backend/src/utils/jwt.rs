// src/utils/jwt.rs

use crate::config::AppConfig;
use crate::domain::session_user::SessionUser;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const SESSION_TOKEN_TYPE: &str = "session";
const OIDC_FLOW_TOKEN_TYPE: &str = "oidc_flow";

/// JWT関連のエラー
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to decode JWT: {0}")]
    DecodingError(String),

    #[error("JWT token has expired")]
    TokenExpired,

    #[error("Invalid JWT token")]
    InvalidToken,

    #[error("Invalid JWT configuration: {0}")]
    ConfigurationError(String),
}

/// セッショントークンのClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (email)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
    pub typ: String,
    pub user: SessionUser,
}

/// OIDC 認可フロー中の state / nonce を保持するClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OidcFlowClaims {
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
    pub typ: String,
    pub state: String,
    pub nonce: String,
}

/// JWT設定
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    /// セッションの有効期限（秒）
    pub session_expiry_seconds: i64,
    /// 認可フローの有効期限（秒）
    pub flow_expiry_seconds: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            secret_key: config.secret_key.clone(),
            session_expiry_seconds: config.session_cookie_age_secs,
            flow_expiry_seconds: 10 * 60,
            issuer: "mentoring-backend".to_string(),
            audience: "mentoring-backend-users".to_string(),
        }
    }

    /// 秘密鍵の検証
    pub fn validate(&self) -> Result<(), JwtError> {
        if self.secret_key.len() < 32 {
            return Err(JwtError::ConfigurationError(
                "JWT secret key must be at least 32 characters".to_string(),
            ));
        }

        if self.session_expiry_seconds <= 0 || self.flow_expiry_seconds <= 0 {
            return Err(JwtError::ConfigurationError(
                "Token expiry must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// JWTトークン管理
pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Result<Self, JwtError> {
        config.validate()?;

        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    pub fn session_expiry_seconds(&self) -> i64 {
        self.config.session_expiry_seconds
    }

    pub fn flow_expiry_seconds(&self) -> i64 {
        self.config.flow_expiry_seconds
    }

    /// セッショントークンを生成
    pub fn generate_session_token(&self, user: SessionUser) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.session_expiry_seconds);

        let claims = SessionClaims {
            sub: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            typ: SESSION_TOKEN_TYPE.to_string(),
            user,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::EncodingError)
    }

    /// セッショントークンを検証・デコード
    pub fn verify_session_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let claims: SessionClaims = self.decode_claims(token)?;
        if claims.typ != SESSION_TOKEN_TYPE {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }

    /// 認可フロー用トークンを生成
    pub fn generate_flow_token(&self, state: &str, nonce: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.flow_expiry_seconds);

        let claims = OidcFlowClaims {
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            typ: OIDC_FLOW_TOKEN_TYPE.to_string(),
            state: state.to_string(),
            nonce: nonce.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(JwtError::EncodingError)
    }

    pub fn verify_flow_token(&self, token: &str) -> Result<OidcFlowClaims, JwtError> {
        let claims: OidcFlowClaims = self.decode_claims(token)?;
        if claims.typ != OIDC_FLOW_TOKEN_TYPE {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }

    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}
