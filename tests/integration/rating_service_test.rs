// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::SqliteHarness;
use ratingrs::application::bootstrap;
use ratingrs::config::settings::Settings;
use ratingrs::domain::pagination::PageParams;
use ratingrs::utils::errors::ErrorKind;
use uuid::Uuid;

/// 分数在 1~5 之间才能创建成功
#[tokio::test]
async fn test_score_bounds_against_storage() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();
    let service_id = Uuid::new_v4();

    for score in -2..=8 {
        let result = service
            .create_rating(Uuid::new_v4(), service_id, score)
            .await;
        if (1..=5).contains(&score) {
            assert_eq!(result.unwrap().score, score);
        } else {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
        }
    }

    let avg = service.get_average_rating(service_id).await.unwrap();
    assert_eq!(avg.total_ratings, 5);
    assert_eq!(avg.average_score, 3.0);
}

/// 先打 5 分再打 2 分，只留下一条 2 分
#[tokio::test]
async fn test_rating_twice_keeps_latest_score() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());

    service.create_rating(user_id, service_id, 5).await.unwrap();
    service.create_rating(user_id, service_id, 2).await.unwrap();

    let stored = service
        .get_rating_by_user_and_service(user_id, service_id)
        .await
        .unwrap();
    assert_eq!(stored.score, 2);

    let page = service
        .list_ratings_by_service(service_id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);

    let avg = service.get_average_rating(service_id).await.unwrap();
    assert_eq!(avg.average_score, 2.0);
}

#[tokio::test]
async fn test_review_on_foreign_rating_persists_nothing() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();
    let (owner, intruder, service_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let rating = service.create_rating(owner, service_id, 4).await.unwrap();
    let err = service
        .create_review(intruder, service_id, rating.id, "Hijack", "Not my rating")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OwnershipMismatch);

    let page = service
        .list_reviews_by_service(service_id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    // the owner can still review it
    let review = service
        .create_review(owner, service_id, rating.id, "Good", "Does the job")
        .await
        .unwrap();
    assert_eq!(review.score, 4);
}

#[tokio::test]
async fn test_comment_on_missing_review_persists_nothing() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();
    let review_id = Uuid::new_v4();

    let err = service
        .create_comment(Uuid::new_v4(), review_id, "First!")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let page = service
        .list_comments_by_review(review_id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_review_update_keeps_score_and_identity() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());

    let rating = service.create_rating(user_id, service_id, 1).await.unwrap();
    let review = service
        .create_review(user_id, service_id, rating.id, "Bad", "Broke on day one")
        .await
        .unwrap();

    let err = service
        .update_review(review.id, "Bad", "")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let updated = service
        .update_review(review.id, "Fixed", "Support replaced it")
        .await
        .unwrap();
    assert_eq!(updated.id, review.id);
    assert_eq!(updated.score, 1);

    let fetched = service.get_review_by_id(review.id).await.unwrap();
    assert_eq!(fetched.title, "Fixed");
    assert_eq!(fetched.created_at, review.created_at);
}

/// 超出列宽的文本在写入前就被拒绝，两种存储得到同样的 Validation
#[tokio::test]
async fn test_overlong_text_is_validation_error() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());

    let rating = service.create_rating(user_id, service_id, 4).await.unwrap();
    let err = service
        .create_review(user_id, service_id, rating.id, &"t".repeat(300), "body")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let page = service
        .list_reviews_by_service(service_id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    let review = service
        .create_review(user_id, service_id, rating.id, "Fine", "body")
        .await
        .unwrap();
    let err = service
        .update_review(review.id, &"t".repeat(256), "body")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        service.get_review_by_id(review.id).await.unwrap().title,
        "Fine"
    );

    let err = service
        .register_user(&"u".repeat(100), "long@example.com", "hash")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        service
            .get_user_by_email("long@example.com")
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_users_through_service() {
    let harness = SqliteHarness::start().await;
    let service = harness.service();

    let user = service
        .register_user("  carol  ", "carol@example.com", "$argon2id$hash")
        .await
        .unwrap();
    assert_eq!(user.username, "carol");
    assert_eq!(
        service.get_user_by_email("carol@example.com").await.unwrap().id,
        user.id
    );

    let err = service
        .register_user("carol2", "carol@example.com", "$argon2id$hash")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_bootstrap_from_settings() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("boot.db").display());

    let settings: Settings = Settings::with_defaults()
        .unwrap()
        .set_override("database.url", url)
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    let service = bootstrap::build_rating_service(&settings).await.unwrap();
    let avg = service.get_average_rating(Uuid::new_v4()).await.unwrap();
    assert_eq!(avg.total_ratings, 0);
}
