// tests/integration/retention_tests.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use mentoring_backend::domain::expiration::ExpirationPolicy;
use mentoring_backend::domain::pairing_model;
use mentoring_backend::domain::participant_role::ParticipantRole;
use mentoring_backend::repository::pairing_repository::PairingRepository;
use mentoring_backend::repository::participant_repository::ParticipantRepository;
use mentoring_backend::service::retention_service::RetentionService;
use sea_orm::{EntityTrait, PaginatorTrait};
use std::sync::Arc;

use crate::common::db::TestDatabase;
use crate::common::test_data::create_participant_at;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[tokio::test]
async fn test_sweep_deletes_only_lapsed_unpaired_participants() {
    let db = TestDatabase::new().await;
    let conn = &db.connection;

    // 2024-06-29 に失効
    let lapsed = create_participant_at(conn, "lapsed@example.com", ParticipantRole::Mentor, at(2024, 1, 1)).await;
    // 2024-12-28 に失効
    let current = create_participant_at(conn, "current@example.com", ParticipantRole::Learner, at(2024, 7, 1)).await;
    // 失効済みだがアクティブなペアリング中
    let paired_mentor = create_participant_at(conn, "pm@example.com", ParticipantRole::Mentor, at(2024, 1, 1)).await;
    let paired_learner = create_participant_at(conn, "pl@example.com", ParticipantRole::Learner, at(2024, 1, 1)).await;
    PairingRepository::create_on(conn, paired_mentor.id, paired_learner.id, "active-pair".to_string(), at(2024, 8, 1))
        .await
        .unwrap();
    // 失効済みでペアリングも終了済み
    let ended_mentor = create_participant_at(conn, "em@example.com", ParticipantRole::Mentor, at(2024, 1, 1)).await;
    PairingRepository::create_on(conn, ended_mentor.id, current.id, "ended-pair".to_string(), at(2024, 6, 1))
        .await
        .unwrap();

    let service = RetentionService::new(conn.clone(), ExpirationPolicy::default());
    let deleted = service.sweep(at(2024, 7, 1)).await.unwrap();
    assert_eq!(deleted, 2);

    let repo = ParticipantRepository::new(conn.clone(), ExpirationPolicy::default());
    assert!(repo.find_by_id(lapsed.id).await.unwrap().is_none());
    assert!(repo.find_by_id(ended_mentor.id).await.unwrap().is_none());
    assert!(repo.find_by_id(current.id).await.unwrap().is_some());
    assert!(repo.find_by_id(paired_mentor.id).await.unwrap().is_some());
    assert!(repo.find_by_id(paired_learner.id).await.unwrap().is_some());

    // 削除された参加者のペアリングは連鎖削除される
    let pairings = pairing_model::Entity::find().all(conn).await.unwrap();
    assert_eq!(pairings.len(), 1);
    assert_eq!(pairings[0].pair_id, "active-pair");
}

#[tokio::test]
async fn test_sweep_releases_pairs_once_pairing_ends() {
    let db = TestDatabase::new().await;
    let conn = &db.connection;
    let mentor = create_participant_at(conn, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1)).await;
    let learner = create_participant_at(conn, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1)).await;
    PairingRepository::create_on(conn, mentor.id, learner.id, "pair".to_string(), at(2024, 8, 1))
        .await
        .unwrap();
    let service = RetentionService::new(conn.clone(), ExpirationPolicy::default());

    assert_eq!(service.sweep(at(2024, 7, 15)).await.unwrap(), 0);
    assert_eq!(service.sweep(at(2024, 8, 2)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_sweep_on_boundary_treats_expiry_as_lapsed() {
    let db = TestDatabase::new().await;
    let conn = &db.connection;
    create_participant_at(conn, "a@example.com", ParticipantRole::Mentor, at(2024, 1, 1)).await;
    let service = RetentionService::new(conn.clone(), ExpirationPolicy::default());

    assert_eq!(service.sweep(at(2024, 6, 28)).await.unwrap(), 0);
    assert_eq!(service.sweep(at(2024, 6, 29)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_periodic_sweep_runs_in_background() {
    let db = TestDatabase::new().await;
    let conn = &db.connection;
    create_participant_at(conn, "old@example.com", ParticipantRole::Mentor, Utc::now() - Duration::days(200)).await;
    create_participant_at(conn, "new@example.com", ParticipantRole::Learner, Utc::now()).await;

    let service = Arc::new(RetentionService::new(conn.clone(), ExpirationPolicy::default()));
    let handle = service.spawn_periodic(std::time::Duration::from_millis(20));
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    handle.abort();

    let count = mentoring_backend::domain::participant_model::Entity::find()
        .count(conn)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
