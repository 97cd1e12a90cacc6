use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, ResultEngine, Role, Session, User, password, ratings, stores, users,
    validation::{self, Profile},
};

use super::{
    Engine, access::email_taken, access::require_user, contains_ci, normalize_search, with_tx,
};

/// Fields of a new account.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: String,
    pub password: String,
    pub role: Role,
}

/// Profile edit. `role` is applied only for administrators; `password` is
/// kept when `None`.
#[derive(Clone, Debug)]
pub struct UserEdit {
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct UserFilter {
    /// Case-insensitive match on name, email or address.
    pub search: Option<String>,
    pub role: Option<Role>,
}

fn conflict_on_unique(err: DbErr) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::ExistingKey("Email".to_string())
        }
        _ => EngineError::Database(err),
    }
}

impl Engine {
    /// Public self-registration.
    ///
    /// Administrators cannot register themselves; they are created by
    /// another administrator or from the admin CLI.
    pub async fn sign_up(&self, input: NewUser) -> ResultEngine<User> {
        self.insert_user(input, |role| match role {
            Role::NormalUser | Role::StoreOwner => Ok(()),
            Role::Administrator => Err(EngineError::Forbidden(
                "Administrators cannot sign up.".to_string(),
            )),
        })
        .await
    }

    /// Create an account of any role (administrator only).
    pub async fn create_user(&self, session: &Session, input: NewUser) -> ResultEngine<User> {
        session.ensure(session.can_manage())?;
        self.insert_user(input, |_| Ok(())).await
    }

    async fn insert_user(
        &self,
        input: NewUser,
        allow_role: impl FnOnce(Role) -> ResultEngine<()>,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            // A registered email is a conflict whatever the other fields hold.
            let requested = validation::normalize_email(&input.email);
            if email_taken(&db_tx, &requested, None).await? {
                return Err(EngineError::ExistingKey("Email".to_string()));
            }

            let Profile {
                name,
                email,
                address,
            } = validation::validate_profile(&input.name, &input.email, &input.address)?;
            validation::validate_password(&input.password)?;
            allow_role(input.role)?;

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                password: ActiveValue::Set(password::hash_password(&input.password)?),
                address: ActiveValue::Set(address),
                role: ActiveValue::Set(input.role.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await
            .map_err(conflict_on_unique)?;

            tracing::info!(user_id = model.id, role = %input.role, "user created");
            User::try_from(model)
        })
    }

    /// Check an email/password pair.
    ///
    /// An unknown email is `KeyNotFound`; a wrong password is
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = validation::normalize_email(email);
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("User".to_string()))?;

        if !password::verify_password(password, &model.password) {
            tracing::warn!(user_id = model.id, "login rejected: wrong password");
            return Err(EngineError::InvalidCredentials);
        }
        User::try_from(model)
    }

    pub async fn user(&self, user_id: i32) -> ResultEngine<User> {
        User::try_from(require_user(&self.database, user_id).await?)
    }

    /// List accounts ordered by id.
    pub async fn users(&self, filter: &UserFilter) -> ResultEngine<Vec<User>> {
        let mut query = users::Entity::find().order_by_asc(users::Column::Id);
        if let Some(search) = normalize_search(filter.search.as_deref()) {
            query = query.filter(
                Condition::any()
                    .add(contains_ci(users::Column::Name, &search))
                    .add(contains_ci(users::Column::Email, &search))
                    .add(contains_ci(users::Column::Address, &search)),
            );
        }
        if let Some(role) = filter.role {
            query = query.filter(users::Column::Role.eq(role.as_str()));
        }

        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    /// Self-service password change. The old password must verify.
    pub async fn change_password(
        &self,
        session: &Session,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> ResultEngine<()> {
        session.ensure(session.user_id == user_id)?;
        validation::validate_password(new_password)?;

        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, user_id).await?;
            if !password::verify_password(old_password, &model.password) {
                return Err(EngineError::InvalidCredentials);
            }

            let mut active: users::ActiveModel = model.into();
            active.password = ActiveValue::Set(password::hash_password(new_password)?);
            active.update(&db_tx).await?;

            tracing::info!(user_id, "password changed");
            Ok(())
        })
    }

    /// Edit a profile: the owner of the account or an administrator.
    ///
    /// Only administrators may change a role. Demoting a store owner releases
    /// the stores they owned.
    pub async fn edit_user(
        &self,
        session: &Session,
        user_id: i32,
        edit: UserEdit,
    ) -> ResultEngine<User> {
        session.ensure(session.can_edit_profile(user_id))?;
        let Profile {
            name,
            email,
            address,
        } = validation::validate_profile(&edit.name, &edit.email, &edit.address)?;
        if let Some(new_password) = edit.password.as_deref() {
            validation::validate_password(new_password)?;
        }

        with_tx!(self, |db_tx| {
            let model = require_user(&db_tx, user_id).await?;
            let current_role = Role::try_from(model.role.as_str())?;
            let role = match edit.role {
                Some(role) if role != current_role => {
                    session.ensure(session.can_manage())?;
                    role
                }
                _ => current_role,
            };

            if email_taken(&db_tx, &email, Some(user_id)).await? {
                return Err(EngineError::ExistingKey("Email".to_string()));
            }

            let mut active: users::ActiveModel = model.into();
            active.name = ActiveValue::Set(name);
            active.email = ActiveValue::Set(email);
            active.address = ActiveValue::Set(address);
            active.role = ActiveValue::Set(role.as_str().to_string());
            if let Some(new_password) = edit.password.as_deref() {
                active.password = ActiveValue::Set(password::hash_password(new_password)?);
            }
            let model = active.update(&db_tx).await.map_err(conflict_on_unique)?;

            if current_role == Role::StoreOwner && role != Role::StoreOwner {
                release_stores(&db_tx, user_id).await?;
            }

            tracing::info!(user_id, by = session.user_id, "user updated");
            User::try_from(model)
        })
    }

    /// Delete an account (administrator only).
    ///
    /// The user's ratings are removed and their stores become ownerless.
    pub async fn delete_user(&self, session: &Session, user_id: i32) -> ResultEngine<()> {
        session.ensure(session.can_manage())?;

        with_tx!(self, |db_tx| {
            require_user(&db_tx, user_id).await?;

            ratings::Entity::delete_many()
                .filter(ratings::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            release_stores(&db_tx, user_id).await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            tracing::info!(user_id, by = session.user_id, "user deleted");
            Ok(())
        })
    }
}

async fn release_stores<C: ConnectionTrait>(db: &C, owner_id: i32) -> ResultEngine<()> {
    stores::Entity::update_many()
        .col_expr(stores::Column::OwnerId, Expr::value(Option::<i32>::None))
        .filter(stores::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;
    Ok(())
}
