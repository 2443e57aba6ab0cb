use super::app::{parse_bool, parse_number, ConfigError, Lookup};

/// Content-Security-Policy の各ディレクティブ
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSecurityPolicy {
    pub default_src: Vec<String>,
    pub font_src: Vec<String>,
    pub style_src: Vec<String>,
}

impl ContentSecurityPolicy {
    pub fn new(debug: bool) -> Self {
        let mut default_src = vec!["'self'".to_string(), "'unsafe-inline'".to_string()];
        // フロントエンドの開発ビルドは eval を必要とする
        if debug {
            default_src.push("'unsafe-eval'".to_string());
        }

        Self {
            default_src,
            font_src: vec![
                "'self'".to_string(),
                "https://fonts.gstatic.com".to_string(),
            ],
            style_src: vec![
                "'self'".to_string(),
                "'unsafe-inline'".to_string(),
                "https://fonts.googleapis.com".to_string(),
            ],
        }
    }

    pub fn header_value(&self) -> String {
        format!(
            "default-src {}; font-src {}; style-src {}",
            self.default_src.join(" "),
            self.font_src.join(" "),
            self.style_src.join(" ")
        )
    }
}

#[derive(Clone, Debug)]
pub struct SecurityConfig {
    pub cookie_secure: bool,
    pub ssl_redirect: bool,
    pub hsts_seconds: u64,
    pub referrer_policy: String,
    pub content_type_nosniff: bool,
    /// リバースプロキシがHTTPS終端を示すヘッダー（名前, 値）
    pub proxy_ssl_header: (String, String),
    pub csp: ContentSecurityPolicy,
}

impl SecurityConfig {
    pub(super) fn from_source(
        lookup: &Lookup<'_>,
        is_development: bool,
        debug: bool,
    ) -> Result<Self, ConfigError> {
        let ssl_redirect = match lookup("SECURE_SSL_REDIRECT") {
            Some(value) => parse_bool("SECURE_SSL_REDIRECT", &value)?,
            None => !is_development,
        };

        Ok(Self {
            cookie_secure: !is_development,
            ssl_redirect,
            hsts_seconds: parse_number(lookup, "SECURE_HSTS_SECONDS", 3600)?,
            referrer_policy: lookup("SECURE_REFERRER_POLICY")
                .unwrap_or_else(|| "same-origin".to_string()),
            content_type_nosniff: true,
            proxy_ssl_header: ("x-forwarded-proto".to_string(), "https".to_string()),
            csp: ContentSecurityPolicy::new(debug),
        })
    }

    pub fn for_testing() -> Self {
        Self {
            cookie_secure: false,
            ssl_redirect: false,
            hsts_seconds: 3600,
            referrer_policy: "same-origin".to_string(),
            content_type_nosniff: true,
            proxy_ssl_header: ("x-forwarded-proto".to_string(), "https".to_string()),
            csp: ContentSecurityPolicy::new(true),
        }
    }
}
