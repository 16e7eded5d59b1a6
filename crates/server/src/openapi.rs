//! OpenAPI document served at `/api-docs/openapi.json`.
//!
//! The `*Doc` structs mirror the JSON shapes of the entities and request bodies
//! so the persistence types stay free of utoipa derives.

use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequestDoc { pub phone_number: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestDoc { pub phone_number: String, pub pin: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestDoc { pub phone_number: String, pub name: String, pub pin: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequestDoc { pub phone_number: String, pub otp: String, pub name: String, pub pin: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPinRequestDoc { pub phone_number: String, pub otp: String, pub new_pin: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequestDoc { pub refresh_token: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: Uuid,
    pub phone_number: String,
    pub name: String,
    pub picture: String,
    pub balance: f64,
    pub cashback: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDoc { pub user: UserDoc, pub access_token: String, pub refresh_token: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponseDoc {
    pub user: UserDoc,
    pub access_token: String,
    pub refresh_token: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct ExistsDoc { pub exists: bool }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityDoc {
    pub id: Uuid,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct CreateCityDoc { pub name: String, pub lat: Option<f64>, pub lon: Option<f64> }

#[derive(Serialize, ToSchema)]
pub struct UpdateCityDoc { pub name: Option<String>, pub lat: Option<f64>, pub lon: Option<f64> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WashDoc {
    pub id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub city_id: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct CityWithWashesDoc {
    #[serde(flatten)]
    pub city: CityDoc,
    pub washes: Vec<WashDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDoc {
    pub id: Uuid,
    pub address: String,
    pub description: String,
    pub schedule: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "box")]
    pub box_count: i32,
    pub distance: Option<i32>,
    pub pictures: Option<String>,
    pub wash_id: Uuid,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostDoc {
    pub address: String,
    pub description: String,
    pub schedule: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "box")]
    pub box_count: i32,
    pub distance: Option<i32>,
    pub pictures: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceDoc { pub id: Uuid, pub service_name: String, pub price: f64, pub wash_id: Uuid }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceDoc { pub service_name: String, pub price: f64 }

#[derive(Serialize, ToSchema)]
pub struct WashDetailsDoc {
    #[serde(flatten)]
    pub wash: WashDoc,
    pub posts: Vec<PostDoc>,
    pub price: Vec<PriceDoc>,
}

#[derive(Serialize, ToSchema)]
pub struct WashForUserDoc {
    #[serde(flatten)]
    pub details: WashDetailsDoc,
    pub balance: f64,
    pub bonus: f64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostPatchDoc {
    pub id: Option<Uuid>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub pictures: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWashDoc { pub name: String, pub picture: Option<String>, pub city_id: Option<Uuid> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWashDoc {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub city_id: Option<Uuid>,
    pub posts: Option<Vec<PostPatchDoc>>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceUpdateDoc { pub balance: f64, pub bonus: f64 }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WashUserDoc { pub user_id: Uuid, pub wash_id: Uuid, pub balance: f64, pub bonus: f64, pub updated_at: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryDoc {
    pub media_url: String,
    /// `image` or `video`
    pub media_type: String,
    pub duration: i32,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryDoc {
    pub id: Uuid,
    pub wash_id: Uuid,
    pub media_url: String,
    pub media_type: String,
    pub duration: i32,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryItemDoc {
    pub id: u32,
    pub index: u32,
    pub media_url: String,
    pub media_type: String,
    pub duration: i32,
    pub is_seen: bool,
    pub is_read_more: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WashStoriesDoc { pub wash_id: Uuid, pub name: String, pub picture: Option<String>, pub stories: Vec<StoryItemDoc> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoryGroupDoc {
    pub id: u32,
    pub wash_id: Uuid,
    pub name: String,
    pub picture: Option<String>,
    pub is_seen: bool,
    pub stories: Vec<StoryItemDoc>,
}

#[derive(Serialize, ToSchema)]
pub struct WashRefDoc { pub id: Uuid, pub name: String }

#[derive(Serialize, ToSchema)]
pub struct FavoritePostDoc { pub id: Uuid, pub address: String, pub description: String, pub wash: Option<WashRefDoc> }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDoc {
    pub id: Uuid,
    pub created_at: String,
    pub updated_at: String,
    pub phone_number: String,
    pub name: String,
    pub picture: String,
    pub balance: f64,
    pub cashback: f64,
    pub favorites: Vec<FavoritePostDoc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteToggleDoc { pub post_id: Uuid, pub is_favorite: bool, pub message: String }

struct BearerAddon;

impl Modify for BearerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAddon),
    info(title = "Car wash API"),
    paths(
        crate::routes::health,
        crate::routes::auth::send_otp,
        crate::routes::auth::send_registration_otp,
        crate::routes::auth::verify_otp_and_set_new_password,
        crate::routes::auth::login,
        crate::routes::auth::register,
        crate::routes::auth::verify_otp,
        crate::routes::auth::check_user_exists,
        crate::routes::auth::access_token,
        crate::routes::cities::list,
        crate::routes::cities::create,
        crate::routes::cities::get_one,
        crate::routes::cities::update,
        crate::routes::cities::remove,
        crate::routes::washing::list,
        crate::routes::washing::create,
        crate::routes::washing::by_city,
        crate::routes::washing::get_one,
        crate::routes::washing::update,
        crate::routes::washing::remove,
        crate::routes::washing::get_balance,
        crate::routes::washing::update_balance,
        crate::routes::washing::add_price,
        crate::routes::washing::list_prices,
        crate::routes::washing::create_story,
        crate::routes::washing::list_stories,
        crate::routes::washing::stories_with_info,
        crate::routes::washing::grouped_stories,
        crate::routes::posts::create,
        crate::routes::users::profile,
        crate::routes::users::toggle_favorite,
    ),
    components(
        schemas(
            HealthResponse,
            MessageDoc,
            crate::errors::ErrorBody,
            crate::errors::ErrorDetails,
            PhoneRequestDoc,
            LoginRequestDoc,
            RegisterRequestDoc,
            VerifyOtpRequestDoc,
            ResetPinRequestDoc,
            RefreshRequestDoc,
            UserDoc,
            SessionDoc,
            RegisterResponseDoc,
            ExistsDoc,
            CityDoc,
            CreateCityDoc,
            UpdateCityDoc,
            CityWithWashesDoc,
            WashDoc,
            PostDoc,
            CreatePostDoc,
            PriceDoc,
            CreatePriceDoc,
            WashDetailsDoc,
            WashForUserDoc,
            PostPatchDoc,
            CreateWashDoc,
            UpdateWashDoc,
            BalanceUpdateDoc,
            WashUserDoc,
            CreateStoryDoc,
            StoryDoc,
            StoryItemDoc,
            WashStoriesDoc,
            StoryGroupDoc,
            WashRefDoc,
            FavoritePostDoc,
            ProfileDoc,
            FavoriteToggleDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "cities"),
        (name = "washing"),
        (name = "stories"),
        (name = "posts"),
        (name = "users")
    )
)]
pub struct ApiDoc;
