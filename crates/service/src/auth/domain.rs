use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub phone_number: String,
    pub name: String,
    pub pin: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub phone_number: String,
    pub pin: String,
}

/// Public user projection. Carries no secret material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub phone_number: String,
    pub name: String,
    pub picture: String,
    pub balance: f64,
    pub cashback: f64,
}

impl From<models::user::Model> for AuthUser {
    fn from(u: models::user::Model) -> Self {
        Self {
            id: u.id,
            created_at: u.created_at,
            updated_at: u.updated_at,
            phone_number: u.phone_number,
            name: u.name,
            picture: u.picture,
            balance: u.balance,
            cashback: u.cashback,
        }
    }
}

/// User row to insert; the pin is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub phone_number: String,
    pub name: String,
    pub picture: String,
    pub pin_hash: String,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub pin_hash: String,
}

/// Login/registration result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
    pub refresh_token: String,
}
