//! Session lifecycle through the service

use folio_auth::{
    AuthConfig, AuthError, MemorySessionStore, MemoryUserStore, SessionService, SessionStore,
    TokenIssuer,
};
use folio_content::ErrorCategory;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn service() -> (SessionService, Arc<MemorySessionStore>) {
    let sessions = Arc::new(MemorySessionStore::new());
    let service = SessionService::new(
        Arc::new(MemoryUserStore::new()),
        sessions.clone(),
        TokenIssuer::generate(3_600),
    );
    (service, sessions)
}

#[tokio::test]
async fn register_opens_a_session() {
    let (service, _) = service();
    let session = service.register("editor", "secret-pass").await.unwrap();
    let account = service.authenticate(&session.token).await.unwrap();
    assert_eq!(account, session.account);
    assert_eq!(account.username, "editor");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (service, _) = service();
    service.register("editor", "secret-pass").await.unwrap();
    let err = service.register("editor", "other-pass").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
}

#[tokio::test]
async fn short_password_rejected() {
    let (service, _) = service();
    let err = service.register("editor", "abc").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Invalid);
}

#[tokio::test]
async fn login_checks_credentials() {
    let (service, _) = service();
    service.register("editor", "secret-pass").await.unwrap();

    let err = service.login("nobody", "secret-pass").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound(_)));
    assert_eq!(err.category(), ErrorCategory::NotFound);

    let err = service.login("editor", "wrong-pass").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn login_revokes_earlier_sessions_of_the_same_user() {
    let (service, sessions) = service();
    let first = service.register("editor", "secret-pass").await.unwrap();
    let other = service.register("writer", "secret-pass").await.unwrap();

    let second = service.login("editor", "secret-pass").await.unwrap();

    assert!(matches!(
        service.authenticate(&first.token).await.unwrap_err(),
        AuthError::Revoked
    ));
    assert!(service.authenticate(&second.token).await.is_ok());
    assert!(service.authenticate(&other.token).await.is_ok());
    assert!(sessions.contains(&other.token).await.unwrap());
}

#[tokio::test]
async fn login_drops_expired_and_foreign_tokens() {
    let (service, sessions) = service();
    service.register("editor", "secret-pass").await.unwrap();
    let (stale, _) = service.issuer().issue_at("someone", 0).unwrap();
    let (foreign, _) = TokenIssuer::generate(3_600).issue("someone").unwrap();
    sessions.add(stale.clone()).await.unwrap();
    sessions.add(foreign.clone()).await.unwrap();

    service.login("editor", "secret-pass").await.unwrap();

    assert!(!sessions.contains(&stale).await.unwrap());
    assert!(!sessions.contains(&foreign).await.unwrap());
}

#[tokio::test]
async fn logout_revokes_token() {
    let (service, _) = service();
    let session = service.register("editor", "secret-pass").await.unwrap();
    service.logout(&session.token).await.unwrap();
    service.logout(&session.token).await.unwrap();
    let err = service.authenticate(&session.token).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Unauthorized);
}

#[tokio::test]
async fn expired_active_token_rejected() {
    let (service, sessions) = service();
    let session = service.register("editor", "secret-pass").await.unwrap();
    let (expired, _) = service
        .issuer()
        .issue_at(&session.account.id, 0)
        .unwrap();
    sessions.add(expired.clone()).await.unwrap();
    assert!(matches!(
        service.authenticate(&expired).await.unwrap_err(),
        AuthError::Expired { .. }
    ));
}

#[tokio::test]
async fn file_backed_sessions_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = AuthConfig::new()
        .with_users_db(dir.path().join("users.json"))
        .with_sessions_db(dir.path().join("sessions.json"))
        .with_key_file(dir.path().join("signing.key"));

    let token = {
        let service = SessionService::from_config(&config).await.unwrap();
        service.register("editor", "secret-pass").await.unwrap().token
    };

    let service = SessionService::from_config(&config).await.unwrap();
    let account = service.authenticate(&token).await.unwrap();
    assert_eq!(account.username, "editor");
    service.login("editor", "secret-pass").await.unwrap();
    assert!(service.authenticate(&token).await.is_err());
}
