// src/config.rs
mod app;
mod oidc;
mod security;

pub use app::{AppConfig, ConfigError};
pub use oidc::OidcConfig;
pub use security::{ContentSecurityPolicy, SecurityConfig};

pub type Config = AppConfig;
