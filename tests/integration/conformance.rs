// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use ratingrs::domain::models::comment::Comment;
use ratingrs::domain::models::rating::Rating;
use ratingrs::domain::models::review::Review;
use ratingrs::domain::models::user::User;
use ratingrs::domain::pagination::PageParams;
use ratingrs::domain::repositories::{
    CommentRepository, RatingRepository, Repository, RepositoryError, ReviewRepository,
    UserRepository,
};
use uuid::Uuid;

/// 为同一个服务造一条评分和一条评论
async fn seed_review(
    repo: &dyn Repository,
    service_id: Uuid,
    score: i32,
    title: &str,
) -> Review {
    let user_id = Uuid::new_v4();
    let rating = repo
        .create_rating(&Rating::new(user_id, service_id, score).unwrap())
        .await
        .unwrap();
    repo.create_review(&Review::new(user_id, service_id, rating.id, title, "body").unwrap())
        .await
        .unwrap()
}

pub async fn users_round_trip(repo: &dyn Repository) {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("user_{}", &suffix[..12]);
    let email = format!("{}@example.com", username);

    let user = repo
        .create_user(&User::new(&username, &email, "$argon2id$v=19$hash").unwrap())
        .await
        .unwrap();

    let by_id = repo.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id, user);
    assert_eq!(
        repo.find_user_by_email(&email).await.unwrap().unwrap().id,
        user.id
    );
    assert_eq!(
        repo.find_user_by_username(&username)
            .await
            .unwrap()
            .unwrap()
            .id,
        user.id
    );
    assert!(repo
        .find_user_by_email("missing@example.com")
        .await
        .unwrap()
        .is_none());

    let duplicate = User::new(&username, format!("other_{}", email), "hash").unwrap();
    let err = repo.create_user(&duplicate).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists(_)));

    let mut changed = user.clone();
    changed.update_password_hash("$argon2id$v=19$other").unwrap();
    repo.update_user_password(&changed).await.unwrap();
    assert_eq!(
        repo.find_user_by_id(user.id)
            .await
            .unwrap()
            .unwrap()
            .password_hash,
        "$argon2id$v=19$other"
    );

    let ghost = User::new("ghost", "ghost@example.com", "hash").unwrap();
    let err = repo.update_user_password(&ghost).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { entity: "user" }));

    // 列宽上限：用户名 64 个字符，邮箱 255 个字符
    let suffix = Uuid::new_v4().simple().to_string();
    let long_username = format!("{}_{}", "名".repeat(31), suffix);
    let label = "b".repeat(60);
    let long_email = format!(
        "{}{}@{}.{}.{}.{}",
        suffix,
        "a".repeat(32),
        label,
        label,
        label,
        "c".repeat(7)
    );
    assert_eq!(long_username.chars().count(), 64);
    assert_eq!(long_email.chars().count(), 255);

    let widest = repo
        .create_user(&User::new(&long_username, &long_email, "hash").unwrap())
        .await
        .unwrap();
    let fetched = repo.find_user_by_id(widest.id).await.unwrap().unwrap();
    assert_eq!(fetched.username, long_username);
    assert_eq!(fetched.email, long_email);

    let err = User::new(format!("{}x", long_username), "wide@example.com", "hash").unwrap_err();
    assert_eq!(err.field, "username");
    let err = User::new("wide", format!("x{}", long_email), "hash").unwrap_err();
    assert_eq!(err.field, "email");
}

pub async fn ratings_round_trip(repo: &dyn Repository) {
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());
    let rating = Rating::new(user_id, service_id, 4).unwrap();

    let stored = repo.create_rating(&rating).await.unwrap();
    assert_eq!(stored, rating);
    assert_eq!(
        repo.find_rating_by_id(rating.id).await.unwrap().unwrap(),
        rating
    );
    assert_eq!(
        repo.find_rating_by_user_and_service(user_id, service_id)
            .await
            .unwrap()
            .unwrap()
            .id,
        rating.id
    );
    assert!(repo
        .find_rating_by_id(Uuid::new_v4())
        .await
        .unwrap()
        .is_none());

    let second = Rating::new(user_id, service_id, 1).unwrap();
    let err = repo.create_rating(&second).await.unwrap_err();
    assert!(
        matches!(&err, RepositoryError::AlreadyExists(msg) if msg == "rating already exists for this user and service"),
        "unexpected error: {err:?}"
    );

    let mut changed = rating.clone();
    changed.update_score(2).unwrap();
    repo.update_rating(&changed).await.unwrap();
    let fetched = repo.find_rating_by_id(rating.id).await.unwrap().unwrap();
    assert_eq!(fetched.score, 2);
    assert_eq!(fetched.created_at, rating.created_at);
    assert_eq!(fetched.updated_at, changed.updated_at);

    let ghost = Rating::new(Uuid::new_v4(), service_id, 3).unwrap();
    let err = repo.update_rating(&ghost).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { entity: "rating" }));
}

pub async fn upsert_overwrites_existing_rating(repo: &dyn Repository) {
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());

    let first = repo
        .upsert_rating(&Rating::new(user_id, service_id, 5).unwrap())
        .await
        .unwrap();
    let second = repo
        .upsert_rating(&Rating::new(user_id, service_id, 2).unwrap())
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.score, 2);
    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at >= first.updated_at);

    let page = repo
        .list_ratings_by_service(service_id, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].score, 2);
}

pub async fn average_rating(repo: &dyn Repository) {
    let service_id = Uuid::new_v4();

    let empty = repo.average_rating(service_id).await.unwrap();
    assert_eq!(empty.service_id, service_id);
    assert_eq!(empty.average_score, 0.0);
    assert_eq!(empty.total_ratings, 0);

    for score in [5, 3, 4] {
        repo.create_rating(&Rating::new(Uuid::new_v4(), service_id, score).unwrap())
            .await
            .unwrap();
    }
    // other services do not leak into the aggregate
    repo.create_rating(&Rating::new(Uuid::new_v4(), Uuid::new_v4(), 1).unwrap())
        .await
        .unwrap();

    let avg = repo.average_rating(service_id).await.unwrap();
    assert!((avg.average_score - 4.0).abs() < f64::EPSILON);
    assert_eq!(avg.total_ratings, 3);
}

pub async fn reviews_round_trip(repo: &dyn Repository) {
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());

    let orphan = Review::new(user_id, service_id, Uuid::new_v4(), "Title", "Body").unwrap();
    let err = repo.create_review(&orphan).await.unwrap_err();
    assert!(
        matches!(err, RepositoryError::NotFound { entity: "rating" }),
        "unexpected error: {err:?}"
    );

    let rating = repo
        .create_rating(&Rating::new(user_id, service_id, 3).unwrap())
        .await
        .unwrap();
    let review = Review::new(user_id, service_id, rating.id, "Solid", "Works as advertised").unwrap();
    repo.create_review(&review).await.unwrap();

    let fetched = repo.find_review_by_id(review.id).await.unwrap().unwrap();
    assert_eq!(fetched.review, review);
    assert_eq!(fetched.score, 3);

    let again = Review::new(user_id, service_id, rating.id, "Again", "Second").unwrap();
    let err = repo.create_review(&again).await.unwrap_err();
    assert!(
        matches!(&err, RepositoryError::AlreadyExists(msg) if msg == "review already exists for this rating"),
        "unexpected error: {err:?}"
    );

    let mut changed = review.clone();
    changed.update_content("Solid!", "Still works").unwrap();
    repo.update_review(&changed).await.unwrap();
    let fetched = repo.find_review_by_id(review.id).await.unwrap().unwrap();
    assert_eq!(fetched.review, changed);

    assert!(repo
        .find_review_by_id(Uuid::new_v4())
        .await
        .unwrap()
        .is_none());
    let err = repo.update_review(&again).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { entity: "review" }));

    // 标题上限 255 个字符，按字符而不是字节计
    let (user_id, service_id) = (Uuid::new_v4(), Uuid::new_v4());
    let rating = repo
        .create_rating(&Rating::new(user_id, service_id, 5).unwrap())
        .await
        .unwrap();
    let err = Review::new(user_id, service_id, rating.id, "t".repeat(256), "Body").unwrap_err();
    assert_eq!(err.field, "title");

    let title = "评".repeat(255);
    let widest = Review::new(user_id, service_id, rating.id, &title, "Body").unwrap();
    repo.create_review(&widest).await.unwrap();
    let fetched = repo.find_review_by_id(widest.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, title);
}

pub async fn comments_round_trip(repo: &dyn Repository) {
    let missing_review = Uuid::new_v4();
    let orphan = Comment::new(Uuid::new_v4(), missing_review, "hello").unwrap();
    let err = repo.create_comment(&orphan).await.unwrap_err();
    assert!(
        matches!(err, RepositoryError::NotFound { entity: "review" }),
        "unexpected error: {err:?}"
    );
    let page = repo
        .list_comments_by_review(missing_review, &PageParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(repo.find_comment_by_id(orphan.id).await.unwrap().is_none());

    let review = seed_review(repo, Uuid::new_v4(), 4, "Nice").await;
    let comment = Comment::new(Uuid::new_v4(), review.id, "I agree").unwrap();
    repo.create_comment(&comment).await.unwrap();
    assert_eq!(
        repo.find_comment_by_id(comment.id).await.unwrap().unwrap(),
        comment
    );

    let mut changed = comment.clone();
    changed.update_content("I strongly agree").unwrap();
    repo.update_comment(&changed).await.unwrap();
    assert_eq!(
        repo.find_comment_by_id(comment.id)
            .await
            .unwrap()
            .unwrap()
            .content,
        "I strongly agree"
    );

    let err = repo.update_comment(&orphan).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { entity: "comment" }));
}

pub async fn list_window_sizes(repo: &dyn Repository) {
    let service_id = Uuid::new_v4();
    let n: i64 = 7;
    for i in 0..n {
        seed_review(repo, service_id, (i % 5 + 1) as i32, &format!("review {}", i)).await;
    }

    for limit in [1, 3, 7, 10] {
        for offset in [0, 2, 6, 7, 12] {
            let params = PageParams::with_offset(limit, offset, "", "desc");
            let page = repo
                .list_reviews_by_service(service_id, &params)
                .await
                .unwrap();
            let expected = limit.min((n - offset).max(0));
            assert_eq!(
                page.items.len() as i64,
                expected,
                "limit={limit} offset={offset}"
            );
            assert_eq!(page.total, n);
            assert!(page.items.iter().all(|r| r.service_id == service_id));
        }
    }

    // zero or negative inputs fall back to the defaults
    let page = repo
        .list_reviews_by_service(service_id, &PageParams::with_offset(0, -3, "", "desc"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 7);

    let page = repo
        .list_ratings_by_service(service_id, &PageParams::with_page(2, 5, "", "desc"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, n);
}

pub async fn sort_orders(repo: &dyn Repository) {
    let service_id = Uuid::new_v4();
    for (score, title) in [(3, "banana"), (5, "Apple"), (1, "cherry"), (4, "apple")] {
        seed_review(repo, service_id, score, title).await;
    }

    let ids = |items: &[ratingrs::domain::models::review::ReviewWithRating]| {
        items.iter().map(|r| r.id).collect::<Vec<_>>()
    };

    for direction in ["asc", "desc"] {
        let unknown = repo
            .list_reviews_by_service(service_id, &PageParams::with_offset(10, 0, "nope", direction))
            .await
            .unwrap();
        let created = repo
            .list_reviews_by_service(
                service_id,
                &PageParams::with_offset(10, 0, "created_at", direction),
            )
            .await
            .unwrap();
        assert_eq!(ids(&unknown.items), ids(&created.items));
    }

    let by_score = repo
        .list_reviews_by_service(service_id, &PageParams::with_offset(10, 0, "SCORE", "asc"))
        .await
        .unwrap();
    let scores: Vec<i32> = by_score.items.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![1, 3, 4, 5]);

    let by_title = repo
        .list_reviews_by_service(service_id, &PageParams::with_offset(10, 0, "title", "asc"))
        .await
        .unwrap();
    let titles: Vec<&str> = by_title.items.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple", "apple", "banana", "cherry"]);

    let ratings = repo
        .list_ratings_by_service(service_id, &PageParams::with_offset(10, 0, "score", "desc"))
        .await
        .unwrap();
    let scores: Vec<i32> = ratings.items.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![5, 4, 3, 1]);

    // default order: newest first
    let newest_first = repo
        .list_ratings_by_service(service_id, &PageParams::default())
        .await
        .unwrap();
    assert!(newest_first
        .items
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

pub async fn comments_default_to_conversation_order(repo: &dyn Repository) {
    let review = seed_review(repo, Uuid::new_v4(), 5, "Thread").await;

    for text in ["first", "second", "third"] {
        repo.create_comment(&Comment::new(Uuid::new_v4(), review.id, text).unwrap())
            .await
            .unwrap();
        // distinct timestamps
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let page = repo
        .list_comments_by_review(review.id, &PageParams::default())
        .await
        .unwrap();
    let contents: Vec<&str> = page.items.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);

    let page = repo
        .list_comments_by_review(review.id, &PageParams::with_offset(10, 0, "content", "desc"))
        .await
        .unwrap();
    let contents: Vec<&str> = page.items.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["third", "second", "first"]);
}

/// 依次执行全部用例，供需要共享昂贵环境的后端使用
pub async fn run_all(repo: &dyn Repository) {
    users_round_trip(repo).await;
    ratings_round_trip(repo).await;
    upsert_overwrites_existing_rating(repo).await;
    average_rating(repo).await;
    reviews_round_trip(repo).await;
    comments_round_trip(repo).await;
    list_window_sizes(repo).await;
    sort_orders(repo).await;
    comments_default_to_conversation_order(repo).await;
}
