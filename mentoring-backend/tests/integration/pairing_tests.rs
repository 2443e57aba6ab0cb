// tests/integration/pairing_tests.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use mentoring_backend::config::AppConfig;
use mentoring_backend::domain::expiration::ExpirationPolicy;
use mentoring_backend::domain::pairing_model;
use mentoring_backend::domain::participant_role::ParticipantRole;
use mentoring_backend::error::AppError;
use mentoring_backend::repository::pairing_repository::PairingRepository;
use mentoring_backend::repository::participant_repository::ParticipantRepository;
use mentoring_backend::service::pairing_service::PairingService;
use mentoring_backend::utils::pair_id::PairIdHasher;
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::common::db::TestDatabase;
use crate::common::test_data::create_participant_at;

const PAIR_SECRET: &str = "test-pair-id-secret-that-is-at-least-32-chars";

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn service(db: &TestDatabase, grace_days: i64) -> PairingService {
    PairingService::new(
        db.connection.clone(),
        ExpirationPolicy::new(Duration::days(180), Duration::days(grace_days)),
        PairIdHasher::new(PAIR_SECRET).unwrap(),
    )
}

#[tokio::test]
async fn test_pairing_extends_both_participants() {
    let db = TestDatabase::new().await;
    // 2024-06-29 に失効予定
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;

    let outcome = service(&db, 30)
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 3, 1))
        .await
        .unwrap();

    assert!(!outcome.renewed);
    assert_eq!(outcome.pairing.ends_at, at(2024, 9, 1));
    assert_eq!(outcome.mentor.expires, at(2024, 10, 1));
    assert_eq!(outcome.learner.expires, at(2024, 10, 1));

    let repo = ParticipantRepository::new(db.connection.clone(), ExpirationPolicy::default());
    for id in [mentor.id, learner.id] {
        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert!(stored.expires >= outcome.pairing.ends_at + Duration::days(30));
    }
}

#[tokio::test]
async fn test_pairing_never_shortens_expiration() {
    let db = TestDatabase::new().await;
    // 2025-06-29 に失効予定（ペアリング終了 + 猶予より後）
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2025, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;

    let outcome = service(&db, 30)
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 3, 1))
        .await
        .unwrap();

    assert_eq!(outcome.mentor.expires, mentor.expires);
    assert_eq!(outcome.learner.expires, at(2024, 10, 1));
}

#[tokio::test]
async fn test_pair_id_is_keyed_hash_of_ids() {
    let db = TestDatabase::new().await;
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;

    let outcome = service(&db, 30)
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 3, 1))
        .await
        .unwrap();

    let expected = PairIdHasher::new(PAIR_SECRET)
        .unwrap()
        .pair_id(mentor.id, learner.id);
    assert_eq!(outcome.pairing.pair_id, expected);
    assert_ne!(outcome.pairing.pair_id, format!("{}:{}", mentor.id, learner.id));
}

#[tokio::test]
async fn test_renewal_keeps_single_pairing_with_later_end() {
    let db = TestDatabase::new().await;
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;
    let service = service(&db, 30);

    service
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 3, 1))
        .await
        .unwrap();
    let renewed = service
        .record_pairing_at(mentor.id, learner.id, at(2024, 12, 1), at(2024, 4, 1))
        .await
        .unwrap();

    assert!(renewed.renewed);
    assert_eq!(renewed.pairing.ends_at, at(2024, 12, 1));
    assert_eq!(renewed.mentor.expires, at(2024, 12, 31));

    // より早い終了日での再記録は終了日を縮めない
    let again = service
        .record_pairing_at(mentor.id, learner.id, at(2024, 10, 1), at(2024, 5, 1))
        .await
        .unwrap();
    assert_eq!(again.pairing.ends_at, at(2024, 12, 1));

    let count = pairing_model::Entity::find()
        .count(&db.connection)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_invalid_pairings_are_rejected() {
    let db = TestDatabase::new().await;
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let service = service(&db, 30);

    let self_pairing = service
        .record_pairing_at(mentor.id, mentor.id, at(2024, 9, 1), at(2024, 3, 1))
        .await;
    assert!(matches!(self_pairing, Err(AppError::ValidationError(_))));

    let past_end = service
        .record_pairing_at(mentor.id, 999, at(2024, 2, 1), at(2024, 3, 1))
        .await;
    assert!(matches!(past_end, Err(AppError::ValidationError(_))));

    let unknown = service
        .record_pairing_at(mentor.id, 999, at(2024, 9, 1), at(2024, 3, 1))
        .await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    // 失敗したトランザクションは何も残さない
    let repo = ParticipantRepository::new(db.connection.clone(), ExpirationPolicy::default());
    let stored = repo.find_by_id(mentor.id).await.unwrap().unwrap();
    assert_eq!(stored.expires, mentor.expires);
}

#[tokio::test]
async fn test_service_from_app_config_uses_configured_secret_and_grace() {
    let db = TestDatabase::new().await;
    let config = AppConfig::for_testing();
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;

    let service = PairingService::from_app_config(db.connection.clone(), &config).unwrap();
    let outcome = service
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 3, 1))
        .await
        .unwrap();

    let expected = PairIdHasher::new(&config.pair_id_hash_secret)
        .unwrap()
        .pair_id(mentor.id, learner.id);
    assert_eq!(outcome.pairing.pair_id, expected);
    assert_eq!(
        outcome.mentor.expires,
        at(2024, 9, 1) + Duration::days(config.pairing_grace_days)
    );
}

#[tokio::test]
async fn test_pairing_end_out_of_range_is_rejected() {
    let db = TestDatabase::new().await;
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;

    let result = service(&db, 30)
        .record_pairing_at(mentor.id, learner.id, DateTime::<Utc>::MAX_UTC, at(2024, 3, 1))
        .await;
    assert!(matches!(result, Err(AppError::ValidationError(_))));

    let count = pairing_model::Entity::find().count(&db.connection).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_pairing_keeps_lapsed_record() {
    let db = TestDatabase::new().await;
    // どちらも 2024-06-29 に失効済み
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;

    let outcome = service(&db, 30)
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 8, 1))
        .await
        .unwrap();

    assert_eq!(outcome.mentor.expires, at(2024, 10, 1));
    assert_eq!(outcome.learner.expires, at(2024, 10, 1));
}

#[tokio::test]
async fn test_active_pairings_for_participant() {
    let db = TestDatabase::new().await;
    let mentor =
        create_participant_at(&db.connection, "m@example.com", ParticipantRole::Mentor, at(2024, 1, 1))
            .await;
    let learner =
        create_participant_at(&db.connection, "l@example.com", ParticipantRole::Learner, at(2024, 1, 1))
            .await;
    service(&db, 30)
        .record_pairing_at(mentor.id, learner.id, at(2024, 9, 1), at(2024, 3, 1))
        .await
        .unwrap();

    let repo = PairingRepository::new(db.connection.clone());
    let active = repo
        .find_active_for_participant(learner.id, at(2024, 8, 1))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert!(active[0].involves(mentor.id));
    assert!(active[0].is_active_at(at(2024, 8, 1)));

    let ended = repo
        .find_active_for_participant(learner.id, at(2024, 9, 2))
        .await
        .unwrap();
    assert!(ended.is_empty());
}
