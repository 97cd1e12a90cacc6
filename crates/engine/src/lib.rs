//! Domain core of the store rating service.
//!
//! The [`Engine`] owns the database handle and exposes every operation the
//! HTTP layer needs: accounts, stores, ratings and their aggregates. Callers
//! that need identity pass an explicit [`Session`].

pub use error::EngineError;
pub use ops::{
    DashboardStats, Engine, EngineBuilder, Feedback, NewUser, StoreDraft, StoreFeedback,
    StoreFilter, StoreListing, UserEdit, UserFilter, UserRating,
};
pub use ratings::Rating;
pub use roles::{Role, Session};
pub use stores::Store;
pub use summary::RatingSummary;
pub use users::User;

pub mod password;
pub mod validation;

mod error;
mod ops;
mod ratings;
mod roles;
mod stores;
mod summary;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
