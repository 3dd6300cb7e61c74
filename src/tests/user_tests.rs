use crate::core::errors::GearShareError;
use crate::tests::{create_test_service, register_user};

#[tokio::test]
async fn test_register_user() {
    let service = create_test_service();
    let user = register_user(&service, "Test User", "test@example.com").await;

    assert_eq!(user.name, "Test User");
    assert_eq!(user.email, "test@example.com");
    // Stored as a bcrypt hash, never the raw password
    assert_ne!(user.password, "hunter22");

    let fetched = service.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, user.id);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let service = create_test_service();
    register_user(&service, "First", "dup@example.com").await;

    let result = service
        .register(None, "Second".to_string(), "dup@example.com".to_string(), "pw123456".to_string())
        .await;
    assert!(matches!(result, Err(GearShareError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn test_register_invalid_email() {
    let service = create_test_service();
    let result = service
        .register(None, "Test User".to_string(), "invalid".to_string(), "pw123456".to_string())
        .await;
    assert!(matches!(result, Err(GearShareError::InvalidEmail(_))));
}

#[tokio::test]
async fn test_register_empty_password() {
    let service = create_test_service();
    let result = service
        .register(None, "Test User".to_string(), "test@example.com".to_string(), String::new())
        .await;
    assert!(matches!(result, Err(GearShareError::InvalidInput(_, _))));
}

#[tokio::test]
async fn test_login_round_trip() {
    let service = create_test_service();
    let user = register_user(&service, "Login User", "login@example.com").await;

    let token = service.authenticate("login@example.com", "hunter22").await.unwrap();
    let claims = service.validate_token(&token).unwrap();
    assert_eq!(claims.sub, user.id);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let service = create_test_service();
    register_user(&service, "Login User", "login@example.com").await;

    let result = service.authenticate("login@example.com", "not-the-password").await;
    assert!(matches!(result, Err(GearShareError::InvalidCredentials)));

    let result = service.authenticate("nobody@example.com", "hunter22").await;
    assert!(matches!(result, Err(GearShareError::InvalidCredentials)));
}
