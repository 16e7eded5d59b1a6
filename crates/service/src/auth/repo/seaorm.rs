use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, NewUser};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_phone(&self.db, phone_number)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(AuthUser::from))
    }

    async fn create_user(&self, input: NewUser) -> Result<AuthUser, AuthError> {
        let row = models::user::NewUser {
            phone_number: input.phone_number,
            name: input.name,
            pin_hash: input.pin_hash,
            picture: input.picture,
        };
        match models::user::create(&self.db, row).await {
            Ok(created) => Ok(AuthUser::from(created)),
            Err(models::errors::ModelError::Validation(msg)) => Err(AuthError::Validation(msg)),
            // lost a race against a concurrent registration of the same phone
            Err(models::errors::ModelError::Db(msg)) if msg.contains("duplicate key") => Err(AuthError::Conflict),
            Err(models::errors::ModelError::Db(msg)) => Err(AuthError::Repository(msg)),
        }
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|u| Credentials { user_id: u.id, pin_hash: u.pin }))
    }

    async fn update_pin(&self, user_id: Uuid, pin_hash: String) -> Result<(), AuthError> {
        models::user::set_pin(&self.db, user_id, &pin_hash)
            .await
            .map_err(|e| match e {
                models::errors::ModelError::Validation(_) => AuthError::NotFound,
                models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
            })
    }

    async fn update_picture(&self, user_id: Uuid, picture: String) -> Result<(), AuthError> {
        models::user::set_picture(&self.db, user_id, &picture)
            .await
            .map_err(|e| match e {
                models::errors::ModelError::Validation(_) => AuthError::NotFound,
                models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
            })
    }
}
