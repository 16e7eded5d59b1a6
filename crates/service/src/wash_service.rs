//! Washes with their posts, price lists, and the per-user balance ledger.

use std::collections::HashMap;

use uuid::Uuid;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, LoaderTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{city, post, price, user, wash, wash_user};
use crate::errors::ServiceError;

/// A wash with its posts and price list (`price` key).
#[derive(Debug, Clone, Serialize)]
pub struct WashDetails {
    #[serde(flatten)]
    pub wash: wash::Model,
    pub posts: Vec<post::Model>,
    pub price: Vec<price::Model>,
}

/// [`WashDetails`] plus the caller's ledger values at that wash.
#[derive(Debug, Clone, Serialize)]
pub struct WashForUser {
    #[serde(flatten)]
    pub details: WashDetails,
    pub balance: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWash {
    pub name: String,
    pub picture: Option<String>,
    pub city_id: Option<Uuid>,
}

/// Patch for posts of a wash. Without `id` it applies to every post of the wash.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub id: Option<Uuid>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub pictures: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWash {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub city_id: Option<Uuid>,
    pub posts: Option<Vec<PostPatch>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BalanceUpdate {
    pub balance: f64,
    pub bonus: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrice {
    pub service_name: String,
    pub price: f64,
}

/// `%term%` with LIKE metacharacters escaped by `\`, lowercased.
pub fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Flatten ledger rows onto washes; washes without a row get zeros.
pub fn attach_balances(washes: Vec<WashDetails>, ledger: &[wash_user::Model]) -> Vec<WashForUser> {
    let by_wash: HashMap<Uuid, &wash_user::Model> = ledger.iter().map(|row| (row.wash_id, row)).collect();
    washes
        .into_iter()
        .map(|details| {
            let (balance, bonus) = by_wash
                .get(&details.wash.id)
                .map(|row| (row.balance, row.bonus))
                .unwrap_or((0.0, 0.0));
            WashForUser { details, balance, bonus }
        })
        .collect()
}

pub(crate) async fn ensure_wash<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<wash::Model, ServiceError> {
    wash::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Wash"))
}

async fn ensure_city<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<(), ServiceError> {
    city::Entity::find_by_id(id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("City"))?;
    Ok(())
}

async fn with_children(db: &DatabaseConnection, washes: Vec<wash::Model>) -> Result<Vec<WashDetails>, ServiceError> {
    let posts = washes.load_many(post::Entity, db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let prices = washes.load_many(price::Entity, db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(washes
        .into_iter()
        .zip(posts)
        .zip(prices)
        .map(|((wash, posts), price)| WashDetails { wash, posts, price })
        .collect())
}

/// All washes with posts and prices, optionally filtered by a case-insensitive name substring.
#[instrument(skip(db))]
pub async fn list_washes(db: &DatabaseConnection, search: Option<&str>) -> Result<Vec<WashDetails>, ServiceError> {
    let mut query = wash::Entity::find().order_by_asc(wash::Column::CreatedAt);
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(wash::Column::Name)))
                .like(LikeExpr::new(like_pattern(term)).escape('\\')),
        );
    }
    let washes = query.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    with_children(db, washes).await
}

pub async fn get_wash(db: &DatabaseConnection, id: Uuid) -> Result<WashDetails, ServiceError> {
    let found = ensure_wash(db, id).await?;
    let mut details = with_children(db, vec![found]).await?;
    details.pop().ok_or_else(|| ServiceError::not_found("Wash"))
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_wash(db: &DatabaseConnection, input: CreateWash) -> Result<wash::Model, ServiceError> {
    if let Some(city_id) = input.city_id {
        ensure_city(db, city_id).await?;
    }
    let created = wash::create(db, &input.name, input.picture, input.city_id).await?;
    info!(wash_id = %created.id, event = "wash_created", "wash created");
    Ok(created)
}

/// Washes of one city, each with the user's balance and bonus there.
#[instrument(skip(db))]
pub async fn washes_by_city(db: &DatabaseConnection, city_id: Uuid, user_id: Uuid) -> Result<Vec<WashForUser>, ServiceError> {
    ensure_city(db, city_id).await?;
    let washes = wash::Entity::find()
        .filter(wash::Column::CityId.eq(city_id))
        .order_by_asc(wash::Column::CreatedAt)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let ids: Vec<Uuid> = washes.iter().map(|w| w.id).collect();
    let ledger = wash_user::Entity::find()
        .filter(wash_user::Column::UserId.eq(user_id))
        .filter(wash_user::Column::WashId.is_in(ids))
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let details = with_children(db, washes).await?;
    Ok(attach_balances(details, &ledger))
}

async fn apply_post_patch<C: ConnectionTrait>(db: &C, wash_id: Uuid, patch: &PostPatch) -> Result<(), ServiceError> {
    let mut update = post::Entity::update_many().filter(post::Column::WashId.eq(wash_id));
    if let Some(post_id) = patch.id {
        update = update.filter(post::Column::Id.eq(post_id));
    }
    let mut touched = false;
    if let Some(address) = &patch.address {
        update = update.col_expr(post::Column::Address, Expr::value(address.clone()));
        touched = true;
    }
    if let Some(description) = &patch.description {
        update = update.col_expr(post::Column::Description, Expr::value(description.clone()));
        touched = true;
    }
    if let Some(pictures) = &patch.pictures {
        update = update.col_expr(post::Column::Pictures, Expr::value(pictures.clone()));
        touched = true;
    }
    if !touched {
        return Ok(());
    }
    let res = update
        .col_expr(post::Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if patch.id.is_some() && res.rows_affected == 0 {
        return Err(ServiceError::not_found("Post"));
    }
    Ok(())
}

/// Update scalar fields and nested post patches in one transaction.
#[instrument(skip(db, patch))]
pub async fn update_wash(db: &DatabaseConnection, id: Uuid, patch: UpdateWash) -> Result<WashDetails, ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let found = ensure_wash(&txn, id).await?;
    if let Some(city_id) = patch.city_id {
        ensure_city(&txn, city_id).await?;
    }

    let mut am: wash::ActiveModel = found.into();
    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("name must not be empty".into()));
        }
        am.name = Set(name);
    }
    if let Some(picture) = patch.picture {
        am.picture = Set(Some(picture));
    }
    if let Some(city_id) = patch.city_id {
        am.city_id = Set(Some(city_id));
    }
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    for post_patch in patch.posts.unwrap_or_default() {
        apply_post_patch(&txn, id, &post_patch).await?;
    }
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(wash_id = %id, event = "wash_updated", "wash updated");

    get_wash(db, id).await
}

/// Delete a wash; posts, prices, stories and ledger rows go with it.
#[instrument(skip(db))]
pub async fn delete_wash(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = wash::Entity::delete_by_id(id).exec(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Wash"));
    }
    info!(wash_id = %id, event = "wash_deleted", "wash deleted");
    Ok(())
}

pub async fn get_user_balance(db: &DatabaseConnection, user_id: Uuid, wash_id: Uuid) -> Result<wash_user::Model, ServiceError> {
    wash_user::Entity::find_by_id((user_id, wash_id))
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("Balance"))
}

/// Set the user's balance and bonus at a wash in a single upsert.
#[instrument(skip(db))]
pub async fn update_user_balance(db: &DatabaseConnection, user_id: Uuid, wash_id: Uuid, input: BalanceUpdate) -> Result<wash_user::Model, ServiceError> {
    if !input.balance.is_finite() || !input.bonus.is_finite() {
        return Err(ServiceError::Validation("balance and bonus must be numbers".into()));
    }
    user::Entity::find_by_id(user_id)
        .one(db).await.map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("User"))?;
    ensure_wash(db, wash_id).await?;

    let am = wash_user::ActiveModel {
        user_id: Set(user_id),
        wash_id: Set(wash_id),
        balance: Set(input.balance),
        bonus: Set(input.bonus),
        updated_at: Set(Utc::now().into()),
    };
    let row = wash_user::Entity::insert(am)
        .on_conflict(
            OnConflict::columns([wash_user::Column::UserId, wash_user::Column::WashId])
                .update_columns([wash_user::Column::Balance, wash_user::Column::Bonus, wash_user::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_with_returning(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(user_id = %user_id, wash_id = %wash_id, event = "balance_updated", "balance updated");
    Ok(row)
}

pub async fn add_price(db: &DatabaseConnection, wash_id: Uuid, input: CreatePrice) -> Result<price::Model, ServiceError> {
    ensure_wash(db, wash_id).await?;
    let created = price::create(db, wash_id, &input.service_name, input.price).await?;
    Ok(created)
}

pub async fn list_prices(db: &DatabaseConnection, wash_id: Uuid) -> Result<Vec<price::Model>, ServiceError> {
    ensure_wash(db, wash_id).await?;
    let prices = price::Entity::find()
        .filter(price::Column::WashId.eq(wash_id))
        .order_by_asc(price::Column::CreatedAt)
        .all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn details(name: &str) -> WashDetails {
        let now = Utc::now().fixed_offset();
        WashDetails {
            wash: wash::Model { id: Uuid::new_v4(), name: name.into(), picture: None, city_id: None, created_at: now, updated_at: now },
            posts: vec![],
            price: vec![],
        }
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("Foam"), "%foam%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
        assert_eq!(like_pattern("МОЙКА"), "%мойка%");
    }

    #[test]
    fn balances_default_to_zero() {
        let a = details("A");
        let b = details("B");
        let row = wash_user::Model {
            user_id: Uuid::new_v4(),
            wash_id: b.wash.id,
            balance: 120.5,
            bonus: 7.0,
            updated_at: Utc::now().fixed_offset(),
        };
        let out = attach_balances(vec![a, b], &[row]);
        assert_eq!((out[0].balance, out[0].bonus), (0.0, 0.0));
        assert_eq!((out[1].balance, out[1].bonus), (120.5, 7.0));

        let json = serde_json::to_value(&out[1]).unwrap();
        assert_eq!(json["balance"], 120.5);
        assert_eq!(json["name"], "B");
        assert!(json.get("price").is_some());
        assert!(json.get("washUsers").is_none());
    }

    fn sample_post(address: &str) -> post::NewPost {
        post::NewPost {
            address: address.into(),
            description: "desc".into(),
            schedule: "24/7".into(),
            lat: 1.0,
            lon: 2.0,
            box_count: 3,
            distance: None,
            pictures: None,
        }
    }

    #[tokio::test]
    async fn wash_lifecycle() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };

        let missing = create_wash(&db, CreateWash { name: "x".into(), picture: None, city_id: Some(Uuid::new_v4()) }).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));

        let tag = Uuid::new_v4().simple().to_string();
        let w = create_wash(&db, CreateWash { name: format!("Super_Wash 100% {}", tag), picture: None, city_id: None }).await?;
        let p1 = post::create(&db, w.id, sample_post("first")).await?;
        post::create(&db, w.id, sample_post("second")).await?;
        add_price(&db, w.id, CreatePrice { service_name: "Foam".into(), price: 100.0 }).await?;

        let found = list_washes(&db, Some(&format!("wash 100% {}", tag.to_uppercase()))).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].posts.len(), 2);
        assert_eq!(found[0].price.len(), 1);
        // `_` is literal, not a single-char wildcard
        assert!(list_washes(&db, Some(&format!("super-wash 100% {}", tag))).await?.is_empty());

        // bulk patch without id
        update_wash(&db, w.id, UpdateWash { posts: Some(vec![PostPatch { description: Some("bulk".into()), ..Default::default() }]), ..Default::default() }).await?;
        let after = get_wash(&db, w.id).await?;
        assert!(after.posts.iter().all(|p| p.description == "bulk"));

        // targeted patch with id
        update_wash(&db, w.id, UpdateWash {
            name: Some(format!("Renamed {}", tag)),
            posts: Some(vec![PostPatch { id: Some(p1.id), address: Some("only me".into()), ..Default::default() }]),
            ..Default::default()
        }).await?;
        let after = get_wash(&db, w.id).await?;
        assert_eq!(after.wash.name, format!("Renamed {}", tag));
        assert_eq!(after.posts.iter().filter(|p| p.address == "only me").count(), 1);

        // failing patch rolls the scalar change back
        let bad = update_wash(&db, w.id, UpdateWash {
            name: Some("Rolled back".into()),
            posts: Some(vec![PostPatch { id: Some(Uuid::new_v4()), address: Some("x".into()), ..Default::default() }]),
            ..Default::default()
        }).await;
        assert!(matches!(bad, Err(ServiceError::NotFound(_))));
        assert_eq!(get_wash(&db, w.id).await?.wash.name, format!("Renamed {}", tag));

        delete_wash(&db, w.id).await?;
        assert!(matches!(get_wash(&db, w.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_wash(&db, w.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(list_prices(&db, w.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn price_for_unknown_wash_is_not_found() -> Result<(), anyhow::Error> {
        use sea_orm::PaginatorTrait;
        let Some(db) = get_db().await? else { return Ok(()) };

        let ghost = Uuid::new_v4();
        let res = add_price(&db, ghost, CreatePrice { service_name: "Foam".into(), price: 100.0 }).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        let stored = price::Entity::find().filter(price::Column::WashId.eq(ghost)).count(&db).await?;
        assert_eq!(stored, 0);
        Ok(())
    }

    #[tokio::test]
    async fn long_names_and_addresses_are_stored() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };

        let name = "W".repeat(300);
        let w = create_wash(&db, CreateWash { name: name.clone(), picture: None, city_id: None }).await?;
        let mut long = sample_post(&"A".repeat(300));
        long.schedule = "S".repeat(300);
        post::create(&db, w.id, long).await?;
        add_price(&db, w.id, CreatePrice { service_name: "P".repeat(300), price: 1.0 }).await?;

        let stored = get_wash(&db, w.id).await?;
        assert_eq!(stored.wash.name, name);
        assert_eq!(stored.posts[0].address.len(), 300);
        assert_eq!(stored.price[0].service_name.len(), 300);

        delete_wash(&db, w.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn balance_upsert_and_city_listing() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };

        let phone = format!("7{:010}", Uuid::new_v4().as_u128() % 10_000_000_000);
        let u = user::create(&db, user::NewUser { phone_number: phone, name: "Ledger".into(), pin_hash: "h".into(), picture: "p".into() }).await?;
        let c = city::create(&db, &format!("Ledger city {}", Uuid::new_v4()), None, None).await?;
        let w1 = create_wash(&db, CreateWash { name: "W1".into(), picture: None, city_id: Some(c.id) }).await?;
        let w2 = create_wash(&db, CreateWash { name: "W2".into(), picture: None, city_id: Some(c.id) }).await?;

        assert!(matches!(get_user_balance(&db, u.id, w1.id).await, Err(ServiceError::NotFound(_))));
        let listed = washes_by_city(&db, c.id, u.id).await?;
        assert!(listed.iter().all(|w| w.balance == 0.0 && w.bonus == 0.0));

        update_user_balance(&db, u.id, w1.id, BalanceUpdate { balance: 10.0, bonus: 1.0 }).await?;
        let row = update_user_balance(&db, u.id, w1.id, BalanceUpdate { balance: 25.0, bonus: 2.0 }).await?;
        assert_eq!((row.balance, row.bonus), (25.0, 2.0));
        assert_eq!(get_user_balance(&db, u.id, w1.id).await?.balance, 25.0);

        let listed = washes_by_city(&db, c.id, u.id).await?;
        let l1 = listed.iter().find(|w| w.details.wash.id == w1.id).unwrap();
        let l2 = listed.iter().find(|w| w.details.wash.id == w2.id).unwrap();
        assert_eq!((l1.balance, l1.bonus), (25.0, 2.0));
        assert_eq!((l2.balance, l2.bonus), (0.0, 0.0));

        let no_user = update_user_balance(&db, Uuid::new_v4(), w1.id, BalanceUpdate { balance: 1.0, bonus: 1.0 }).await;
        assert!(matches!(no_user, Err(ServiceError::NotFound(_))));
        assert!(matches!(washes_by_city(&db, Uuid::new_v4(), u.id).await, Err(ServiceError::NotFound(_))));

        delete_wash(&db, w1.id).await?;
        delete_wash(&db, w2.id).await?;
        city::Entity::delete_by_id(c.id).exec(&db).await?;
        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }
}
