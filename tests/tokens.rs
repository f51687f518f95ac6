mod common;

use futures_util::future::join_all;

use campus_rides::error::DomainError;
use campus_rides::repositories::tokens::TokenRepository;

use common::{signup, store};

#[tokio::test]
async fn issue_and_redeem_scenario() {
    let store = store();
    let tokens = TokenRepository::new(store.clone());
    for (identifier, role) in [
        ("u1", "student"),
        ("manager-a", "manager"),
        ("u3", "student"),
        ("u4", "student"),
        ("manager-b", "manager"),
        ("u6", "student"),
        ("u7", "student"),
        ("u8", "student"),
        ("student-a", "student"),
        ("student-b", "student"),
    ] {
        signup(&store, identifier, role).await;
    }

    let issued = tokens.issue_token(2, "ABC123").await.unwrap();
    assert!(!issued.is_used);
    assert_eq!(issued.issued_by, 2);
    assert_eq!(issued.owned_by, None);

    let duplicate = tokens.issue_token(5, "ABC123").await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));

    let redeemed = tokens.redeem_token(9, "ABC123").await.unwrap();
    assert!(redeemed.is_used);
    assert_eq!(redeemed.owned_by, Some(9));
    let used_at = redeemed.used_at;
    assert!(used_at.is_some());

    let second = tokens.redeem_token(10, "ABC123").await;
    assert!(matches!(second, Err(DomainError::Conflict(_))));

    let owned = tokens.tokens_owned_by(9).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].used_at, used_at);
    assert!(tokens.tokens_owned_by(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_redemptions_have_one_winner() {
    let store = store();
    let tokens = TokenRepository::new(store.clone());
    let manager = signup(&store, "manager", "manager").await;
    let mut students = Vec::new();
    for n in 0..6 {
        students.push(signup(&store, &format!("student-{}", n), "student").await);
    }
    tokens.issue_token(manager.id, "RACE").await.unwrap();

    let results = join_all(
        students
            .iter()
            .map(|student| tokens.redeem_token(student.id, "RACE")),
    )
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(DomainError::Conflict(_)))));
}

#[tokio::test]
async fn unknown_token_and_users_are_not_found() {
    let store = store();
    let tokens = TokenRepository::new(store.clone());
    let manager = signup(&store, "manager", "manager").await;

    assert!(matches!(
        tokens.redeem_token(manager.id, "MISSING").await,
        Err(DomainError::NotFound { entity: "Token", .. })
    ));
    assert!(matches!(
        tokens.issue_token(999, "X1").await,
        Err(DomainError::NotFound { entity: "User", .. })
    ));

    tokens.issue_token(manager.id, "X1").await.unwrap();
    assert!(matches!(
        tokens.redeem_token(999, "X1").await,
        Err(DomainError::NotFound { entity: "User", .. })
    ));
    assert_eq!(tokens.tokens_by_usage(false).await.unwrap().len(), 1);
}

#[tokio::test]
async fn issuer_may_redeem_own_token() {
    let store = store();
    let tokens = TokenRepository::new(store.clone());
    let manager = signup(&store, "manager", "manager").await;

    tokens.issue_token(manager.id, "SELF").await.unwrap();
    let redeemed = tokens.redeem_token(manager.id, "SELF").await.unwrap();

    assert_eq!(redeemed.owned_by, Some(manager.id));
}

#[tokio::test]
async fn listing_splits_used_and_unused() {
    let store = store();
    let tokens = TokenRepository::new(store.clone());
    let manager = signup(&store, "manager", "manager").await;
    let student = signup(&store, "student", "student").await;

    for value in ["T1", "T2", "T3"] {
        tokens.issue_token(manager.id, value).await.unwrap();
    }
    tokens.redeem_token(student.id, "T2").await.unwrap();

    let used: Vec<String> = tokens
        .tokens_by_usage(true)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.token_value)
        .collect();
    assert_eq!(used, vec!["T2".to_string()]);
    assert_eq!(tokens.tokens_by_usage(false).await.unwrap().len(), 2);

    let empty = tokens.issue_token(manager.id, "").await;
    assert!(matches!(empty, Err(DomainError::Validation(_))));
}
