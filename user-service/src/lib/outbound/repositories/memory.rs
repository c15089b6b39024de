use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// Credential store kept in process memory.
///
/// Backs the `test` environment. All writes take the single lock, so the
/// email uniqueness check and the insert are atomic.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<UserId, User>, candidate: &User) -> bool {
    users
        .values()
        .any(|u| u.id != candidate.id && u.email == candidate.email)
}

fn pending<'a>(users: &'a mut HashMap<UserId, User>, id: &UserId) -> Result<&'a mut User, UserError> {
    match users.get_mut(id) {
        Some(user) if user.is_active => Err(UserError::AlreadyActive(id.to_string())),
        Some(user) => Ok(user),
        None => Err(UserError::NotFound(id.to_string())),
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if email_taken(&users, &user) {
            return Err(UserError::EmailAlreadyExists(user.email.as_str().to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email.as_str() == email).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id.0));

        Ok(users
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if first_name.is_some() {
            user.first_name = first_name;
        }
        if last_name.is_some() {
            user.last_name = last_name;
        }
        Ok(user.clone())
    }

    async fn set_password_hash(&self, id: &UserId, password_hash: &str) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        user.password_hash = password_hash.to_string();
        Ok(user.clone())
    }

    async fn replace_pending_password(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = pending(&mut users, id)?;

        user.password_hash = password_hash.to_string();
        Ok(user.clone())
    }

    async fn activate(&self, id: &UserId) -> Result<User, UserError> {
        let mut users = self.users.write().await;
        let user = pending(&mut users, id)?;

        user.is_active = true;
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(UserError::NotFound(id.to_string()))
    }
}
