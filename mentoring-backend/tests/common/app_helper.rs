// tests/common/app_helper.rs

use axum::{body::to_bytes, response::Response, Router};
use mentoring_backend::{
    api::{app_router, AppState},
    config::{AppConfig, OidcConfig},
};
use serde_json::Value;

use crate::common;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: common::db::TestDatabase,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn staff_token(&self) -> String {
        common::auth_helper::session_token(&self.state.jwt_manager, common::auth_helper::staff_user())
    }

    pub fn member_token(&self) -> String {
        common::auth_helper::session_token(
            &self.state.jwt_manager,
            common::auth_helper::member_user(),
        )
    }
}

/// テスト用設定でアプリをセットアップ
pub async fn setup_app() -> TestApp {
    setup_app_with_config(AppConfig::for_testing()).await
}

/// OIDC エンドポイントを指定してアプリをセットアップ
pub async fn setup_app_with_provider(base_url: &str) -> TestApp {
    let mut config = AppConfig::for_testing();
    config.oidc = OidcConfig::for_testing(base_url);
    setup_app_with_config(config).await
}

pub async fn setup_app_with_config(config: AppConfig) -> TestApp {
    common::init_test_env();

    let db = common::db::TestDatabase::new().await;
    let state = AppState::new(db.connection.clone(), &config).expect("build app state");
    let router = app_router(state.clone());

    TestApp { router, state, db }
}

pub async fn body_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
