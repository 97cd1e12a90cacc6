use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, Rating, RatingSummary, ResultEngine, Role, Session, Store, ratings, stores, users,
    validation,
};

use super::{
    Engine,
    access::{require_feedback_access, require_store, require_store_owner},
    contains_ci, normalize_search,
    ratings::summaries,
    with_tx,
};

/// Fields of a store, used both to create and to edit one.
#[derive(Clone, Debug)]
pub struct StoreDraft {
    pub name: String,
    pub address: String,
    pub owner_id: Option<i32>,
}

#[derive(Clone, Debug, Default)]
pub struct StoreFilter {
    /// Case-insensitive match on name or address.
    pub search: Option<String>,
}

/// A store with its current rating aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct StoreListing {
    pub store: Store,
    pub summary: RatingSummary,
}

/// A rating together with who submitted it.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub rating: Rating,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoreFeedback {
    pub store: Store,
    pub summary: RatingSummary,
    pub ratings: Vec<Feedback>,
}

impl Engine {
    /// Create a store (administrator only).
    pub async fn add_store(&self, session: &Session, draft: StoreDraft) -> ResultEngine<Store> {
        session.ensure(session.can_manage())?;
        let name = validation::validate_store_name(&draft.name)?;
        let address = validation::validate_address(&draft.address)?;

        with_tx!(self, |db_tx| {
            require_store_owner(&db_tx, draft.owner_id).await?;

            let model = stores::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                address: ActiveValue::Set(address),
                owner_id: ActiveValue::Set(draft.owner_id),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(store_id = model.id, by = session.user_id, "store created");
            Ok(Store::from(model))
        })
    }

    /// Edit a store (administrator only).
    pub async fn edit_store(
        &self,
        session: &Session,
        store_id: i32,
        draft: StoreDraft,
    ) -> ResultEngine<Store> {
        session.ensure(session.can_manage())?;
        let name = validation::validate_store_name(&draft.name)?;
        let address = validation::validate_address(&draft.address)?;

        with_tx!(self, |db_tx| {
            let model = require_store(&db_tx, store_id).await?;
            require_store_owner(&db_tx, draft.owner_id).await?;

            let mut active: stores::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            active.address = ActiveValue::Set(address);
            active.owner_id = ActiveValue::Set(draft.owner_id);
            let model = active.update(&db_tx).await?;

            tracing::info!(store_id, by = session.user_id, "store updated");
            Ok(Store::from(model))
        })
    }

    /// Delete a store and every rating it received (administrator only).
    pub async fn delete_store(&self, session: &Session, store_id: i32) -> ResultEngine<()> {
        session.ensure(session.can_manage())?;

        with_tx!(self, |db_tx| {
            require_store(&db_tx, store_id).await?;

            ratings::Entity::delete_many()
                .filter(ratings::Column::StoreId.eq(store_id))
                .exec(&db_tx)
                .await?;
            stores::Entity::delete_by_id(store_id).exec(&db_tx).await?;

            tracing::info!(store_id, by = session.user_id, "store deleted");
            Ok(())
        })
    }

    /// Public listing ordered by id, each store with its aggregate.
    pub async fn stores(&self, filter: &StoreFilter) -> ResultEngine<Vec<StoreListing>> {
        let mut query = stores::Entity::find().order_by_asc(stores::Column::Id);
        if let Some(search) = normalize_search(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(stores::Column::Name, &search))
                    .add(contains_ci(stores::Column::Address, &search)),
            );
        }
        let models = query.all(&self.database).await?;

        let mut summaries = summaries(&self.database, None).await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let summary = summaries
                    .remove(&model.id)
                    .unwrap_or_else(|| RatingSummary::empty(model.id));
                StoreListing {
                    store: Store::from(model),
                    summary,
                }
            })
            .collect())
    }

    /// Aggregate and individual ratings of one store, for its owner or an
    /// administrator.
    pub async fn store_feedback(
        &self,
        session: &Session,
        store_id: i32,
    ) -> ResultEngine<StoreFeedback> {
        let store = require_feedback_access(&self.database, session, store_id).await?;
        let mut feedback = self.feedback_for(vec![store]).await?;
        feedback
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("Store".to_string()))
    }

    /// Every store owned by the calling store owner, with its feedback.
    pub async fn owner_dashboard(&self, session: &Session) -> ResultEngine<Vec<StoreFeedback>> {
        session.require_any(&[Role::StoreOwner])?;
        let owned = stores::Entity::find()
            .filter(stores::Column::OwnerId.eq(session.user_id))
            .order_by_asc(stores::Column::Id)
            .all(&self.database)
            .await?;
        self.feedback_for(owned).await
    }

    async fn feedback_for(&self, models: Vec<stores::Model>) -> ResultEngine<Vec<StoreFeedback>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = models.iter().map(|store| store.id).collect();

        let rows = ratings::Entity::find()
            .filter(ratings::Column::StoreId.is_in(ids.iter().copied()))
            .order_by_desc(ratings::Column::UpdatedAt)
            .find_also_related(users::Entity)
            .all(&self.database)
            .await?;

        let mut result: Vec<StoreFeedback> = models
            .into_iter()
            .map(|model| StoreFeedback {
                summary: RatingSummary::empty(model.id),
                store: Store::from(model),
                ratings: Vec::new(),
            })
            .collect();

        for (rating, user) in rows {
            let Some(entry) = result
                .iter_mut()
                .find(|feedback| feedback.store.id == rating.store_id)
            else {
                continue;
            };
            entry.summary.record(rating.rating, 1);
            let (user_name, user_email) = user
                .map(|user| (user.name, user.email))
                .unwrap_or_default();
            entry.ratings.push(Feedback {
                rating: Rating::from(rating),
                user_name,
                user_email,
            });
        }

        Ok(result)
    }
}
