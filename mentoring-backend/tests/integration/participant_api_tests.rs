// tests/integration/participant_api_tests.rs
use axum::http::StatusCode;
use mentoring_backend::domain::participant_role::ParticipantRole;
use serde_json::Value;
use std::collections::BTreeSet;
use tower::ServiceExt;

use crate::common::app_helper::{body_json, setup_app};
use crate::common::auth_helper::{create_cookie_request, create_request};
use crate::common::test_data::create_participant;

const PARTICIPANT_FIELDS: [&str; 14] = [
    "id",
    "email",
    "role",
    "full_name",
    "manager",
    "approved",
    "time_availability",
    "org",
    "org_chart_distance",
    "org_level",
    "time_at_org_level",
    "interests",
    "track_change",
    "comments",
];

fn field_names(participant: &Value) -> BTreeSet<String> {
    participant.as_object().unwrap().keys().cloned().collect()
}

#[tokio::test]
async fn test_staff_lists_participants_with_exact_fields() {
    let app = setup_app().await;
    create_participant(&app.db.connection, "ada@example.com", ParticipantRole::Mentor).await;
    create_participant(&app.db.connection, "grace@example.com", ParticipantRole::Learner).await;

    let response = app
        .app()
        .oneshot(create_request("GET", "/api/participants", Some(&app.staff_token()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let participants = json.as_array().unwrap();
    assert_eq!(participants.len(), 2);

    let expected: BTreeSet<String> = PARTICIPANT_FIELDS.iter().map(|f| f.to_string()).collect();
    for participant in participants {
        assert_eq!(field_names(participant), expected);
        // ライフサイクル管理用の値は公開しない
        assert!(participant.get("expires").is_none());
    }

    assert_eq!(participants[0]["email"], "ada@example.com");
    assert_eq!(participants[0]["role"], "mentor");
    assert_eq!(participants[0]["approved"], false);
    assert_eq!(
        participants[0]["interests"],
        serde_json::json!(["rust", "leadership"])
    );
}

#[tokio::test]
async fn test_staff_gets_participant_by_id() {
    let app = setup_app().await;
    let created =
        create_participant(&app.db.connection, "ada@example.com", ParticipantRole::Both).await;

    let response = app
        .app()
        .oneshot(create_request(
            "GET",
            &format!("/api/participants/{}", created.id),
            Some(&app.staff_token()),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], created.id);
    assert_eq!(json["full_name"], "Test ada");
    assert_eq!(field_names(&json).len(), PARTICIPANT_FIELDS.len());
}

#[tokio::test]
async fn test_unknown_participant_is_not_found() {
    let app = setup_app().await;

    let response = app
        .app()
        .oneshot(create_request("GET", "/api/participants/999", Some(&app.staff_token()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error_type"], "not_found");
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let app = setup_app().await;

    let response = app
        .app()
        .oneshot(create_request("GET", "/api/participants/abc", Some(&app.staff_token()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_participant_by_email() {
    let app = setup_app().await;
    create_participant(&app.db.connection, "ada@example.com", ParticipantRole::Mentor).await;

    let found = app
        .app()
        .oneshot(create_request(
            "GET",
            "/api/participants/by_email?email=ada%40example.com",
            Some(&app.staff_token()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    assert_eq!(body_json(found).await["email"], "ada@example.com");

    let missing = app
        .app()
        .oneshot(create_request(
            "GET",
            "/api/participants/by_email?email=nobody%40example.com",
            Some(&app.staff_token()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_requests_are_unauthorized() {
    let app = setup_app().await;
    let created =
        create_participant(&app.db.connection, "ada@example.com", ParticipantRole::Mentor).await;

    for uri in [
        "/api/participants".to_string(),
        format!("/api/participants/{}", created.id),
        "/api/participants/by_email?email=ada%40example.com".to_string(),
    ] {
        let response = app
            .app()
            .oneshot(create_request("GET", &uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_non_staff_requests_are_forbidden() {
    let app = setup_app().await;
    let created =
        create_participant(&app.db.connection, "ada@example.com", ParticipantRole::Mentor).await;
    let token = app.member_token();

    for uri in [
        "/api/participants".to_string(),
        format!("/api/participants/{}", created.id),
        "/api/participants/by_email?email=ada%40example.com".to_string(),
    ] {
        let response = app
            .app()
            .oneshot(create_request("GET", &uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", uri);

        let json = body_json(response).await;
        assert_eq!(json["error_type"], "forbidden");
    }
}

#[tokio::test]
async fn test_mutating_methods_are_not_allowed_for_anyone() {
    let app = setup_app().await;
    let created =
        create_participant(&app.db.connection, "ada@example.com", ParticipantRole::Mentor).await;

    let tokens = [None, Some(app.member_token()), Some(app.staff_token())];
    let uris = [
        "/api/participants".to_string(),
        format!("/api/participants/{}", created.id),
    ];
    let body = serde_json::json!({ "email": "changed@example.com", "approved": true });

    for token in &tokens {
        for uri in &uris {
            for method in ["POST", "PUT", "PATCH", "DELETE"] {
                let response = app
                    .app()
                    .oneshot(create_request(
                        method,
                        uri,
                        token.as_deref(),
                        Some(body.clone()),
                    ))
                    .await
                    .unwrap();
                assert_eq!(
                    response.status(),
                    StatusCode::METHOD_NOT_ALLOWED,
                    "{} {}",
                    method,
                    uri
                );
            }
        }
    }

    // 変更されていない
    let response = app
        .app()
        .oneshot(create_request(
            "GET",
            &format!("/api/participants/{}", created.id),
            Some(&app.staff_token()),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["email"], "ada@example.com");
    assert_eq!(json["approved"], false);
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = setup_app().await;

    let response = app
        .app()
        .oneshot(create_cookie_request(
            "/api/participants",
            &format!("mentoring_session={}", app.staff_token()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_tampered_token_is_treated_as_anonymous() {
    let app = setup_app().await;
    let mut token = app.staff_token();
    token.push('x');

    let response = app
        .app()
        .oneshot(create_request("GET", "/api/participants", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
