use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, NewUser};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    /// Fails with `Conflict` when the phone number is taken.
    async fn create_user(&self, input: NewUser) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn update_pin(&self, user_id: Uuid, pin_hash: String) -> Result<(), AuthError>;
    async fn update_picture(&self, user_id: Uuid, picture: String) -> Result<(), AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,  // key: phone number
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
    }

    fn poisoned<T>(_: T) -> AuthError {
        AuthError::Repository("mock lock poisoned".into())
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.get(phone_number).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, input: NewUser) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            if users.contains_key(&input.phone_number) {
                return Err(AuthError::Conflict);
            }
            let now = chrono::Utc::now().fixed_offset();
            let user = AuthUser {
                id: Uuid::new_v4(),
                created_at: now,
                updated_at: now,
                phone_number: input.phone_number.clone(),
                name: input.name,
                picture: input.picture,
                balance: 0.0,
                cashback: 0.0,
            };
            users.insert(input.phone_number, user.clone());
            drop(users);
            let mut creds = self.creds.lock().map_err(poisoned)?;
            creds.insert(user.id, Credentials { user_id: user.id, pin_hash: input.pin_hash });
            Ok(user)
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().map_err(poisoned)?;
            Ok(creds.get(&user_id).cloned())
        }

        async fn update_pin(&self, user_id: Uuid, pin_hash: String) -> Result<(), AuthError> {
            let mut creds = self.creds.lock().map_err(poisoned)?;
            creds.insert(user_id, Credentials { user_id, pin_hash });
            Ok(())
        }

        async fn update_picture(&self, user_id: Uuid, picture: String) -> Result<(), AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            let user = users.values_mut().find(|u| u.id == user_id).ok_or(AuthError::NotFound)?;
            user.picture = picture;
            Ok(())
        }
    }
}
