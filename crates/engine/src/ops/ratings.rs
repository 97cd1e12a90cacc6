use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, Rating, RatingSummary, ResultEngine, Session, ratings,
    ratings::{MAX_RATING, MIN_RATING},
    stores,
};

use super::{Engine, access::require_store, with_tx};

/// One of the caller's ratings with the store it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct UserRating {
    pub rating: Rating,
    pub store_name: String,
    pub store_address: String,
}

fn validate_rating(value: i64) -> ResultEngine<i32> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(EngineError::InvalidRating(format!(
            "rating must be an integer between {MIN_RATING} and {MAX_RATING}, got {value}"
        )));
    }
    i32::try_from(value).map_err(|_| EngineError::InvalidRating(value.to_string()))
}

impl Engine {
    /// Create or update the caller's rating of a store.
    ///
    /// At most one row exists per (store, user). A concurrent insert of the
    /// same pair trips the unique index and falls back to an update.
    pub async fn upsert_rating(
        &self,
        session: &Session,
        store_id: i32,
        value: i64,
    ) -> ResultEngine<Rating> {
        session.ensure(session.can_rate())?;
        let value = validate_rating(value)?;
        let user_id = session.user_id;

        with_tx!(self, |db_tx| {
            require_store(&db_tx, store_id).await?;
            let now = Utc::now();

            let existing = find_pair(&db_tx, store_id, user_id).await?;
            let model = match existing {
                Some(model) => update_value(&db_tx, model, value, now).await?,
                None => {
                    let insert = ratings::ActiveModel {
                        id: ActiveValue::NotSet,
                        store_id: ActiveValue::Set(store_id),
                        user_id: ActiveValue::Set(user_id),
                        rating: ActiveValue::Set(value),
                        created_at: ActiveValue::Set(now),
                        updated_at: ActiveValue::Set(now),
                    }
                    .insert(&db_tx)
                    .await;
                    match insert {
                        Ok(model) => model,
                        Err(err)
                            if matches!(
                                err.sql_err(),
                                Some(SqlErr::UniqueConstraintViolation(_))
                            ) =>
                        {
                            let model = find_pair(&db_tx, store_id, user_id)
                                .await?
                                .ok_or(EngineError::Database(err))?;
                            update_value(&db_tx, model, value, now).await?
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
            };

            tracing::debug!(store_id, user_id, rating = value, "rating saved");
            Ok(Rating::from(model))
        })
    }

    /// Every rating row, oldest first.
    pub async fn ratings(&self) -> ResultEngine<Vec<Rating>> {
        Ok(ratings::Entity::find()
            .order_by_asc(ratings::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Rating::from)
            .collect())
    }

    /// The caller's own ratings joined with store name and address.
    pub async fn user_ratings(&self, session: &Session) -> ResultEngine<Vec<UserRating>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(session.user_id))
            .order_by_desc(ratings::Column::UpdatedAt)
            .find_also_related(stores::Entity)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(rating, store)| {
                store.map(|store| UserRating {
                    rating: Rating::from(rating),
                    store_name: store.name,
                    store_address: store.address,
                })
            })
            .collect())
    }

    /// Aggregate of one store, recomputed from its rating rows.
    pub async fn store_summary(&self, store_id: i32) -> ResultEngine<RatingSummary> {
        require_store(&self.database, store_id).await?;
        let mut summaries = summaries(&self.database, Some(&[store_id])).await?;
        Ok(summaries
            .remove(&store_id)
            .unwrap_or_else(|| RatingSummary::empty(store_id)))
    }
}

async fn find_pair<C: ConnectionTrait>(
    db: &C,
    store_id: i32,
    user_id: i32,
) -> ResultEngine<Option<ratings::Model>> {
    Ok(ratings::Entity::find()
        .filter(ratings::Column::StoreId.eq(store_id))
        .filter(ratings::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

async fn update_value<C: ConnectionTrait>(
    db: &C,
    model: ratings::Model,
    value: i32,
    now: chrono::DateTime<Utc>,
) -> ResultEngine<ratings::Model> {
    let mut active: ratings::ActiveModel = model.into();
    active.rating = ActiveValue::Set(value);
    active.updated_at = ActiveValue::Set(now);
    Ok(active.update(db).await?)
}

/// Per-store summaries for `store_ids` (all stores when `None`).
///
/// Stores without ratings are absent from the map.
pub(super) async fn summaries<C: ConnectionTrait>(
    db: &C,
    store_ids: Option<&[i32]>,
) -> ResultEngine<HashMap<i32, RatingSummary>> {
    let mut query = ratings::Entity::find()
        .select_only()
        .column(ratings::Column::StoreId)
        .column(ratings::Column::Rating)
        .column_as(Expr::col(ratings::Column::Id).count(), "count")
        .group_by(ratings::Column::StoreId)
        .group_by(ratings::Column::Rating);
    if let Some(ids) = store_ids {
        query = query.filter(ratings::Column::StoreId.is_in(ids.iter().copied()));
    }

    let rows: Vec<(i32, i32, i64)> = query.into_tuple().all(db).await?;

    let mut summaries: HashMap<i32, RatingSummary> = HashMap::new();
    for (store_id, value, count) in rows {
        summaries
            .entry(store_id)
            .or_insert_with(|| RatingSummary::empty(store_id))
            .record(value, u64::try_from(count).unwrap_or_default());
    }
    Ok(summaries)
}
