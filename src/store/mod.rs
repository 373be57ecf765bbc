//! User identity store.
//!
//! # Responsibilities
//! - Hold the minimal identity material the access-control layer needs:
//!   id, username, email, password digest, admin flag
//! - Answer `lookup(username)` at login time
//!
//! # Design Decisions
//! - Trait seam: handlers depend on `UserStore`, not on a concrete
//!   backend, so the in-memory map and a database-backed store swap
//!   freely
//! - Domain persistence proper (memorials, memories, images, relational
//!   integrity) lives outside this crate

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use thiserror::Error;

/// Stored identity row.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Material for a new registration. The password arrives pre-hashed;
/// plaintext never crosses this seam.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Email already exists")]
    EmailTaken,
}

/// Identity lookup contract consumed by the access-control layer.
pub trait UserStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<UserRecord>;
    fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;
    fn list(&self) -> Vec<UserRecord>;
}

/// Process-local store keyed by username.
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryUserStore {
    fn lookup(&self, username: &str) -> Option<UserRecord> {
        self.users
            .read()
            .expect("user store lock poisoned")
            .get(username)
            .cloned()
    }

    fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().expect("user store lock poisoned");
        if users.contains_key(&user.username) {
            return Err(StoreError::UsernameTaken);
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::EmailTaken);
        }
        let record = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            username: user.username.clone(),
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
        };
        users.insert(user.username, record.clone());
        Ok(record)
    }

    fn list(&self) -> Vec<UserRecord> {
        let mut all: Vec<UserRecord> = self
            .users
            .read()
            .expect("user store lock poisoned")
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|u| u.id);
        all
    }
}
