//! Account and session persistence

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A stored account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable id
    pub id: String,
    /// Login name, unique
    pub username: String,
    /// Argon2 PHC string
    #[serde(rename = "password")]
    pub password_hash: String,
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable id
    pub id: String,
    /// Login name
    pub username: String,
}

impl From<&User> for Account {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
        }
    }
}

/// Account storage
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Account with this login name
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Account with this id
    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>>;

    /// Add an account
    ///
    /// Fails with [`AuthError::UserExists`] if the username is taken.
    async fn insert(&self, user: User) -> AuthResult<()>;
}

/// Active session tokens
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Token is in the active list
    async fn contains(&self, token: &str) -> AuthResult<bool>;

    /// Append a token
    async fn add(&self, token: String) -> AuthResult<()>;

    /// Remove a token, reporting whether it was present
    async fn remove(&self, token: &str) -> AuthResult<bool>;

    /// Keep only tokens for which `keep` holds, returning how many were dropped
    async fn retain(&self, keep: &(dyn for<'a> Fn(&'a str) -> bool + Send + Sync)) -> AuthResult<usize>;
}

/// Accounts held in memory
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: User) -> AuthResult<()> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UserExists(user.username));
        }
        users.push(user);
        Ok(())
    }
}

/// Sessions held in memory
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tokens: RwLock<Vec<String>>,
}

impl MemorySessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn contains(&self, token: &str) -> AuthResult<bool> {
        Ok(self.tokens.read().iter().any(|t| t == token))
    }

    async fn add(&self, token: String) -> AuthResult<()> {
        self.tokens.write().push(token);
        Ok(())
    }

    async fn remove(&self, token: &str) -> AuthResult<bool> {
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|t| t != token);
        Ok(tokens.len() != before)
    }

    async fn retain(&self, keep: &(dyn for<'a> Fn(&'a str) -> bool + Send + Sync)) -> AuthResult<usize> {
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|t| keep(t.as_str()));
        Ok(before - tokens.len())
    }
}

/// A JSON array on disk, rewritten whole on every change
#[derive(Debug)]
struct JsonFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFile {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load<T: DeserializeOwned>(&self) -> AuthResult<Vec<T>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => {
                serde_json::from_str(&text).map_err(|e| AuthError::corrupt(&self.path, e))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AuthError::io_error(&self.path, e)),
        }
    }

    async fn save<T: Serialize + Sync>(&self, items: &[T]) -> AuthResult<()> {
        let json =
            serde_json::to_string_pretty(items).map_err(|e| AuthError::corrupt(&self.path, e))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AuthError::io_error(parent, e))?;
        }
        let tmp = tmp_path(&self.path);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AuthError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AuthError::io_error(&self.path, e))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
}

/// Accounts in a JSON file
#[derive(Debug)]
pub struct JsonUserStore {
    file: JsonFile,
}

impl JsonUserStore {
    /// Store backed by `path`; a missing file is an empty store
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl UserStore for JsonUserStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let users: Vec<User> = self.file.load().await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn find_by_id(&self, id: &str) -> AuthResult<Option<User>> {
        let users: Vec<User> = self.file.load().await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    async fn insert(&self, user: User) -> AuthResult<()> {
        let _guard = self.file.lock.lock().await;
        let mut users: Vec<User> = self.file.load().await?;
        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UserExists(user.username));
        }
        users.push(user);
        self.file.save(&users).await
    }
}

/// Sessions in a JSON file
#[derive(Debug)]
pub struct JsonSessionStore {
    file: JsonFile,
}

impl JsonSessionStore {
    /// Store backed by `path`; a missing file is an empty store
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }
}

#[async_trait]
impl SessionStore for JsonSessionStore {
    async fn contains(&self, token: &str) -> AuthResult<bool> {
        let tokens: Vec<String> = self.file.load().await?;
        Ok(tokens.iter().any(|t| t == token))
    }

    async fn add(&self, token: String) -> AuthResult<()> {
        let _guard = self.file.lock.lock().await;
        let mut tokens: Vec<String> = self.file.load().await?;
        tokens.push(token);
        self.file.save(&tokens).await
    }

    async fn remove(&self, token: &str) -> AuthResult<bool> {
        let _guard = self.file.lock.lock().await;
        let mut tokens: Vec<String> = self.file.load().await?;
        let before = tokens.len();
        tokens.retain(|t| t != token);
        if tokens.len() == before {
            return Ok(false);
        }
        self.file.save(&tokens).await?;
        Ok(true)
    }

    async fn retain(&self, keep: &(dyn for<'a> Fn(&'a str) -> bool + Send + Sync)) -> AuthResult<usize> {
        let _guard = self.file.lock.lock().await;
        let mut tokens: Vec<String> = self.file.load().await?;
        let before = tokens.len();
        tokens.retain(|t| keep(t.as_str()));
        let dropped = before - tokens.len();
        if dropped > 0 {
            self.file.save(&tokens).await?;
        }
        Ok(dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.into(),
            username: name.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    async fn exercise_users(store: &dyn UserStore) {
        store.insert(user("1", "alice")).await.unwrap();
        let err = store.insert(user("2", "alice")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserExists(_)));
        assert_eq!(store.find_by_id("1").await.unwrap().unwrap().username, "alice");
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    async fn exercise_sessions(store: &dyn SessionStore) {
        store.add("a".into()).await.unwrap();
        store.add("b".into()).await.unwrap();
        assert!(store.contains("a").await.unwrap());
        assert!(store.remove("a").await.unwrap());
        assert!(!store.remove("a").await.unwrap());
        assert_eq!(store.retain(&|t| t != "b").await.unwrap(), 1);
        assert!(!store.contains("b").await.unwrap());
    }

    #[tokio::test]
    async fn memory_stores() {
        exercise_users(&MemoryUserStore::new()).await;
        exercise_sessions(&MemorySessionStore::new()).await;
    }

    #[tokio::test]
    async fn json_stores() {
        let dir = tempfile::tempdir().unwrap();
        exercise_users(&JsonUserStore::new(dir.path().join("db/users.json"))).await;
        exercise_sessions(&JsonSessionStore::new(dir.path().join("db/sessions.json"))).await;
    }

    #[tokio::test]
    async fn json_users_keep_password_field_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        JsonUserStore::new(&path).insert(user("1", "alice")).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["password"], "$argon2id$stub");
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonSessionStore::new(&path).contains("x").await.unwrap_err();
        assert!(matches!(err, AuthError::Corrupt { .. }));
    }
}
