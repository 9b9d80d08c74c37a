//! Registration, login and profile edits.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use vibe_core::{LocationInput, Role, UserPatch, UserService, VibeError};
use vibe_testing::{InMemoryStore, TestServices, test_clock};
use vibe_testing::fixtures::user_draft;

#[tokio::test]
async fn test_register_normalizes_and_hashes() {
    let services = TestServices::new();
    let user = services
        .users
        .register(user_draft("Ada Lovelace", "  Ada@Example.COM ", Role::Business))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.role, Role::Business);
    assert_ne!(user.password_hash, "hunter22");
    assert!(bcrypt::verify("hunter22", &user.password_hash).unwrap());
    assert_eq!(user.location.unwrap().coordinates, [-73.9857, 40.7484]);
}

#[tokio::test]
async fn test_register_defaults_role_and_requires_location() {
    let services = TestServices::new();

    let mut draft = user_draft("Bob", "bob@example.com", Role::User);
    draft.role = None;
    assert_eq!(services.users.register(draft).await.unwrap().role, Role::User);

    let mut missing = user_draft("Carol", "carol@example.com", Role::User);
    missing.location = Some(LocationInput { coordinates: None });
    let err = services.users.register(missing).await.unwrap_err();
    assert_eq!(err, VibeError::validation("Location coordinates are required"));
}

#[tokio::test]
async fn test_register_rejects_duplicate_email_and_weak_password() {
    let services = TestServices::new();
    services
        .users
        .register(user_draft("Ada", "ada@example.com", Role::User))
        .await
        .unwrap();

    let err = services
        .users
        .register(user_draft("Ada Again", "ADA@example.com", Role::User))
        .await
        .unwrap_err();
    assert_eq!(err, VibeError::conflict("This email already exists"));

    let mut weak = user_draft("Eve", "eve@example.com", Role::User);
    weak.password = "mypassword123".to_string();
    assert!(matches!(
        services.users.register(weak).await,
        Err(VibeError::Validation(_))
    ));
}

#[tokio::test]
async fn test_login_distinguishes_unknown_user_and_bad_password() {
    let services = TestServices::new();
    let ada = services
        .users
        .register(user_draft("Ada", "ada@example.com", Role::User))
        .await
        .unwrap();

    let logged_in = services.users.login("ADA@example.com", "hunter22").await.unwrap();
    assert_eq!(logged_in.id, ada.id);

    let err = services.users.login("ada@example.com", "wrong-one").await.unwrap_err();
    assert_eq!(err, VibeError::Unauthorized("Incorrect password".to_string()));

    let err = services.users.login("nobody@example.com", "hunter22").await.unwrap_err();
    assert_eq!(err, VibeError::Unauthorized("User not found".to_string()));
}

#[tokio::test]
async fn test_update_is_self_only_and_rehashes_password() {
    let services = TestServices::new();
    let ada = services
        .users
        .register(user_draft("Ada", "ada@example.com", Role::User))
        .await
        .unwrap();
    let bob = services
        .users
        .register(user_draft("Bob", "bob@example.com", Role::User))
        .await
        .unwrap();

    let err = services
        .users
        .update(&bob, ada.id, UserPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::Forbidden(_)));

    let updated = services
        .users
        .update(
            &ada,
            ada.id,
            UserPatch {
                name: Some("Countess Ada".to_string()),
                password: Some("analytical-engine".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Countess Ada");
    services.users.login("ada@example.com", "analytical-engine").await.unwrap();

    let err = services
        .users
        .update(
            &ada,
            ada.id,
            UserPatch {
                email: Some("bob@example.com".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, VibeError::Conflict(_)));
}

#[tokio::test]
async fn test_bad_hashing_cost_is_a_server_fault() {
    let users = UserService::new(Arc::new(InMemoryStore::new()), Arc::new(test_clock()), 99);

    let err = users
        .register(user_draft("Dora", "dora@example.com", Role::User))
        .await
        .unwrap_err();

    assert!(matches!(err, VibeError::Storage(_)), "got {err:?}");
    assert!(users.login("dora@example.com", "hunter22").await.is_err());
}
