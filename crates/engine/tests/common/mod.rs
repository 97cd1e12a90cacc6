#![allow(dead_code)]

use engine::{Engine, NewUser, Role, Session, Store, StoreDraft, StoreFilter, User};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

pub const PASSWORD: &str = "Abcdef1!";

/// An administrator session that is not backed by a row; enough to seed data.
pub fn root() -> Session {
    Session::new(0, Role::Administrator)
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn new_user(name: &str, role: Role) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        address: format!("{name} street 1"),
        password: PASSWORD.to_string(),
        role,
    }
}

pub async fn user(engine: &Engine, name: &str, role: Role) -> (User, Session) {
    let user = engine.create_user(&root(), new_user(name, role)).await.unwrap();
    let session = Session::new(user.id, user.role);
    (user, session)
}

pub async fn store(engine: &Engine, name: &str, owner_id: Option<i32>) -> Store {
    engine
        .add_store(
            &root(),
            StoreDraft {
                name: name.to_string(),
                address: format!("{name} avenue 2"),
                owner_id,
            },
        )
        .await
        .unwrap()
}

/// Look a store up through the public listing.
pub async fn find_store(engine: &Engine, store_id: i32) -> Option<Store> {
    engine
        .stores(&StoreFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|listing| listing.store)
        .find(|store| store.id == store_id)
}
