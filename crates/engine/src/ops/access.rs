use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, Role, Session, stores, users};

use super::Engine;

impl Engine {
    /// Resolve the caller behind a verified token.
    ///
    /// Fails with `KeyNotFound` when the account was deleted after the token
    /// was issued.
    pub async fn session(&self, user_id: i32) -> ResultEngine<Session> {
        let model = require_user(&self.database, user_id).await?;
        let role = Role::try_from(model.role.as_str())?;
        Ok(Session::new(model.id, role))
    }
}

pub(super) async fn require_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("User".to_string()))
}

pub(super) async fn require_store<C: ConnectionTrait>(
    db: &C,
    store_id: i32,
) -> ResultEngine<stores::Model> {
    stores::Entity::find_by_id(store_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("Store".to_string()))
}

/// A store may only be assigned to an existing store owner.
pub(super) async fn require_store_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Option<i32>,
) -> ResultEngine<()> {
    let Some(owner_id) = owner_id else {
        return Ok(());
    };
    let owner = users::Entity::find_by_id(owner_id).one(db).await?;
    let is_owner = owner
        .map(|model| Role::try_from(model.role.as_str()))
        .transpose()?
        .is_some_and(|role| role == Role::StoreOwner);
    if !is_owner {
        return Err(EngineError::InvalidInput(
            "Store owner must be an existing user with the Store Owner role.".to_string(),
        ));
    }
    Ok(())
}

/// Whether `email` belongs to an account other than `except`.
pub(super) async fn email_taken<C: ConnectionTrait>(
    db: &C,
    email: &str,
    except: Option<i32>,
) -> ResultEngine<bool> {
    let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(users::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

/// Feedback visibility is checked against the store row, but a non-admin
/// caller is told only that access is denied, whether or not the store exists.
pub(super) async fn require_feedback_access<C: ConnectionTrait>(
    db: &C,
    session: &Session,
    store_id: i32,
) -> ResultEngine<stores::Model> {
    let store = stores::Entity::find_by_id(store_id).one(db).await?;
    match (session.role, store) {
        (Role::Administrator, Some(store)) => Ok(store),
        (Role::Administrator, None) => Err(EngineError::KeyNotFound("Store".to_string())),
        (Role::StoreOwner | Role::NormalUser, Some(store))
            if session.can_view_store_feedback(store.owner_id) =>
        {
            Ok(store)
        }
        (Role::StoreOwner | Role::NormalUser, _) => Err(EngineError::access_denied()),
    }
}
