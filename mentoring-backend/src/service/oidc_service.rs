// src/service/oidc_service.rs

use crate::api::dto::oidc_dto::{IdTokenClaims, TokenResponse};
use crate::config::{AppConfig, OidcConfig};
use crate::domain::capability::GroupCapabilityMap;
use crate::domain::session_user::SessionUser;
use crate::error::{AppError, AppResult};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

const HTTP_TIMEOUT_SECS: u64 = 10;

/// OIDC Relying Party としての認証処理
pub struct OidcService {
    config: OidcConfig,
    callback_url: String,
    group_capabilities: GroupCapabilityMap,
    http: reqwest::Client,
}

impl OidcService {
    pub fn new(app_config: &AppConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::InternalServerError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            config: app_config.oidc.clone(),
            callback_url: app_config.oidc_callback_url(),
            group_capabilities: app_config.group_capabilities.clone(),
            http,
        })
    }

    /// 認可エンドポイントへのリダイレクトURL
    pub fn authorization_url(&self, state: &str, nonce: &str) -> String {
        let params = [
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("scope", self.config.scopes.as_str()),
            ("state", state),
            ("nonce", nonce),
        ];
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.config.authorization_endpoint.contains('?') {
            '&'
        } else {
            '?'
        };
        format!("{}{}{}", self.config.authorization_endpoint, separator, query)
    }

    /// 認可コードからセッションユーザーを確立する
    pub async fn authenticate(&self, code: &str, nonce: &str) -> AppResult<SessionUser> {
        let tokens = self.exchange_code(code).await?;
        let id_claims = self.verify_id_token(&tokens.id_token, nonce).await?;
        let userinfo = self.fetch_userinfo(&tokens.access_token).await?;

        let user = self.session_user_from_userinfo(&userinfo)?;
        info!(
            sub = %id_claims.sub,
            email = %user.email,
            is_staff = user.is_staff(),
            "OIDC authentication succeeded"
        );
        Ok(user)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<TokenResponse> {
        let response = self
            .http
            .post(&self.config.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token endpoint rejected authorization code");
            return Err(AppError::Unauthorized(
                "Authorization code was rejected".to_string(),
            ));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Invalid token response: {}", e))
        })
    }

    async fn fetch_jwks(&self) -> AppResult<JwkSet> {
        self.http
            .get(&self.config.jwks_endpoint)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::ExternalServiceError(format!("JWKS request failed: {}", e)))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Invalid JWKS: {}", e)))
    }

    /// ID トークンの署名・audience・nonce を検証
    pub async fn verify_id_token(&self, id_token: &str, nonce: &str) -> AppResult<IdTokenClaims> {
        let header = decode_header(id_token).map_err(|e| {
            warn!(error = %e, "Malformed ID token");
            AppError::Unauthorized("Invalid ID token".to_string())
        })?;
        if header.alg != Algorithm::RS256 {
            warn!(alg = ?header.alg, "Unexpected ID token algorithm");
            return Err(AppError::Unauthorized("Invalid ID token".to_string()));
        }

        let jwks = self.fetch_jwks().await?;
        let jwk = match header.kid.as_deref() {
            Some(kid) => jwks.find(kid),
            None if jwks.keys.len() == 1 => jwks.keys.first(),
            None => None,
        }
        .ok_or_else(|| {
            warn!(kid = ?header.kid, "No matching signing key in JWKS");
            AppError::Unauthorized("Invalid ID token".to_string())
        })?;

        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            AppError::ExternalServiceError(format!("Unusable signing key: {}", e))
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.config.client_id]);

        let claims = decode::<IdTokenClaims>(id_token, &key, &validation)
            .map_err(|e| {
                warn!(error = %e, "ID token verification failed");
                AppError::Unauthorized("Invalid ID token".to_string())
            })?
            .claims;

        if claims.nonce.as_deref() != Some(nonce) {
            warn!(sub = %claims.sub, "ID token nonce mismatch");
            return Err(AppError::Unauthorized("Invalid ID token".to_string()));
        }

        Ok(claims)
    }

    async fn fetch_userinfo(&self, access_token: &str) -> AppResult<Value> {
        self.http
            .get(&self.config.user_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::ExternalServiceError(format!("Userinfo request failed: {}", e)))?
            .json::<Value>()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Invalid userinfo: {}", e)))
    }

    /// userinfo クレームからセッションユーザーを作成（グループ → 権限）
    pub fn session_user_from_userinfo(&self, userinfo: &Value) -> AppResult<SessionUser> {
        let email = userinfo
            .get("email")
            .and_then(Value::as_str)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Identity has no email address".to_string()))?;

        let full_name = userinfo
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(email);

        let groups: Vec<&str> = userinfo
            .get(&self.config.groups_claim)
            .and_then(Value::as_array)
            .map(|groups| groups.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        Ok(SessionUser::new(email, full_name)
            .with_capabilities(self.group_capabilities.capabilities_for(groups)))
    }
}

/// state / nonce 用のランダム文字列
pub fn generate_random_token(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
