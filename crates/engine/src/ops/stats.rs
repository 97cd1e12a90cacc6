use sea_orm::{PaginatorTrait, QueryFilter, prelude::*};

use crate::{ResultEngine, Role, Session, ratings, stores, users};

use super::Engine;

/// Totals shown on the administrator dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_stores: u64,
    pub total_ratings: u64,
    pub normal_users: u64,
    pub store_owners: u64,
    pub administrators: u64,
}

impl DashboardStats {
    fn set_role_count(&mut self, role: Role, count: u64) {
        match role {
            Role::NormalUser => self.normal_users = count,
            Role::StoreOwner => self.store_owners = count,
            Role::Administrator => self.administrators = count,
        }
    }
}

impl Engine {
    pub async fn dashboard(&self, session: &Session) -> ResultEngine<DashboardStats> {
        session.ensure(session.can_manage())?;

        let mut stats = DashboardStats {
            total_users: users::Entity::find().count(&self.database).await?,
            total_stores: stores::Entity::find().count(&self.database).await?,
            total_ratings: ratings::Entity::find().count(&self.database).await?,
            ..Default::default()
        };
        for role in Role::ALL {
            let count = users::Entity::find()
                .filter(users::Column::Role.eq(role.as_str()))
                .count(&self.database)
                .await?;
            stats.set_role_count(role, count);
        }
        Ok(stats)
    }
}
