use super::app::{ConfigError, Lookup};

// OIDC_OP_* の既定値は https://auth.mozilla.auth0.com/.well-known/openid-configuration から
const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://auth.mozilla.auth0.com/authorize";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://auth.mozilla.auth0.com/oauth/token";
const DEFAULT_USER_ENDPOINT: &str = "https://auth.mozilla.auth0.com/userinfo";
const DEFAULT_JWKS_ENDPOINT: &str = "https://auth.mozilla.auth0.com/.well-known/jwks.json";
const DEFAULT_GROUPS_CLAIM: &str = "https://sso.mozilla.com/claim/groups";

/// OIDC Relying Party 設定
#[derive(Clone, Debug)]
pub struct OidcConfig {
    pub client_id: String,
    pub client_secret: String,
    pub sign_algo: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub user_endpoint: String,
    pub jwks_endpoint: String,
    pub scopes: String,
    /// userinfo 内でグループ一覧を保持するクレーム名
    pub groups_claim: String,
}

impl OidcConfig {
    pub(super) fn from_source(lookup: &Lookup<'_>) -> Result<Self, ConfigError> {
        let sign_algo = lookup("OIDC_RP_SIGN_ALGO").unwrap_or_else(|| "RS256".to_string());
        if sign_algo != "RS256" {
            return Err(ConfigError::Invalid {
                key: "OIDC_RP_SIGN_ALGO",
                reason: format!("unsupported algorithm '{}', only RS256 is accepted", sign_algo),
            });
        }

        Ok(Self {
            client_id: lookup("OIDC_RP_CLIENT_ID").ok_or(ConfigError::Missing("OIDC_RP_CLIENT_ID"))?,
            client_secret: lookup("OIDC_RP_CLIENT_SECRET")
                .ok_or(ConfigError::Missing("OIDC_RP_CLIENT_SECRET"))?,
            sign_algo,
            authorization_endpoint: lookup("OIDC_OP_AUTHORIZATION_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_AUTHORIZATION_ENDPOINT.to_string()),
            token_endpoint: lookup("OIDC_OP_TOKEN_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_TOKEN_ENDPOINT.to_string()),
            user_endpoint: lookup("OIDC_OP_USER_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_USER_ENDPOINT.to_string()),
            jwks_endpoint: lookup("OIDC_OP_JWKS_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_JWKS_ENDPOINT.to_string()),
            scopes: lookup("OIDC_RP_SCOPES").unwrap_or_else(|| "openid email profile".to_string()),
            groups_claim: lookup("OIDC_GROUPS_CLAIM")
                .unwrap_or_else(|| DEFAULT_GROUPS_CLAIM.to_string()),
        })
    }

    /// テスト用の設定（エンドポイントは base_url 配下）
    pub fn for_testing(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client_id: "mentoring-test-client".to_string(),
            client_secret: "mentoring-test-client-secret".to_string(),
            sign_algo: "RS256".to_string(),
            authorization_endpoint: format!("{}/authorize", base),
            token_endpoint: format!("{}/oauth/token", base),
            user_endpoint: format!("{}/userinfo", base),
            jwks_endpoint: format!("{}/.well-known/jwks.json", base),
            scopes: "openid email profile".to_string(),
            groups_claim: DEFAULT_GROUPS_CLAIM.to_string(),
        }
    }
}
