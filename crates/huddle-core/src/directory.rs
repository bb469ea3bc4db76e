use std::collections::HashMap;
use std::sync::RwLock;

use huddle_types::UserId;

use crate::error::{CoreError, Result};

/// The user collaborator the core depends on.
///
/// Implementations own credentials and profiles; the core only asks who an
/// actor is, whether they hold global ownership and what their handle is.
pub trait UserDirectory: Send + Sync {
    /// Resolve a bearer token to a user id. Fails with `AccessDenied`.
    fn validate_actor(&self, token: &str) -> Result<UserId>;

    fn user_exists(&self, user: UserId) -> Result<bool>;

    fn is_global_owner(&self, user: UserId) -> Result<bool>;

    /// Fails with `NotFound` for unknown users.
    fn user_handle(&self, user: UserId) -> Result<String>;
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    handle: String,
    global_owner: bool,
    token: String,
}

/// In-process directory keyed by user id. Tokens are opaque strings chosen
/// at insertion time.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<UserId, DirectoryEntry>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user whose token is `token-{id}`.
    pub fn insert(&self, user: UserId, handle: &str, global_owner: bool) -> Result<()> {
        let entry = DirectoryEntry {
            handle: handle.to_string(),
            global_owner,
            token: format!("token-{user}"),
        };
        self.users
            .write()
            .map_err(|e| CoreError::Internal(format!("directory lock poisoned: {e}")))?
            .insert(user, entry);
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<UserId, DirectoryEntry>) -> T) -> Result<T> {
        let users = self
            .users
            .read()
            .map_err(|e| CoreError::Internal(format!("directory lock poisoned: {e}")))?;
        Ok(f(&users))
    }
}

impl UserDirectory for MemoryDirectory {
    fn validate_actor(&self, token: &str) -> Result<UserId> {
        self.read(|users| {
            users
                .iter()
                .find(|(_, entry)| entry.token == token)
                .map(|(id, _)| *id)
        })?
        .ok_or_else(|| CoreError::denied("invalid token"))
    }

    fn user_exists(&self, user: UserId) -> Result<bool> {
        self.read(|users| users.contains_key(&user))
    }

    fn is_global_owner(&self, user: UserId) -> Result<bool> {
        self.read(|users| users.get(&user).is_some_and(|e| e.global_owner))
    }

    fn user_handle(&self, user: UserId) -> Result<String> {
        self.read(|users| users.get(&user).map(|e| e.handle.clone()))?
            .ok_or_else(|| CoreError::not_found(format!("user {user}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_resolve_to_their_user() {
        let dir = MemoryDirectory::new();
        dir.insert(7, "ada", true).unwrap();

        assert_eq!(dir.validate_actor("token-7").unwrap(), 7);
        assert!(matches!(
            dir.validate_actor("token-8"),
            Err(CoreError::AccessDenied(_))
        ));
        assert_eq!(dir.user_handle(7).unwrap(), "ada");
        assert!(dir.is_global_owner(7).unwrap());
        assert!(!dir.is_global_owner(8).unwrap());
        assert!(matches!(dir.user_handle(8), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn insert_reports_a_poisoned_lock() {
        let dir = std::sync::Arc::new(MemoryDirectory::new());
        let poisoner = dir.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.users.write().unwrap();
            panic!("poison the directory lock");
        })
        .join();

        assert!(matches!(
            dir.insert(1, "ada", false),
            Err(CoreError::Internal(_))
        ));
    }
}
