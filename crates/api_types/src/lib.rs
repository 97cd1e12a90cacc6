use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of an account.
///
/// Serialized with the labels the web client shows to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Normal User")]
    NormalUser,
    #[serde(rename = "Store Owner")]
    StoreOwner,
    #[serde(rename = "System Administrator")]
    Administrator,
}

/// Generic acknowledgement returned by mutations without a payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub mod user {
    use super::*;

    /// Public view of a user. The password hash never leaves the server.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub address: String,
        pub role: Role,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUp {
        pub name: String,
        pub email: String,
        pub address: String,
        pub password: String,
        /// Older clients send the role under `type`.
        #[serde(alias = "type")]
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignUpResponse {
        pub message: String,
        pub user: UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub message: String,
        pub token: String,
        pub user: UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionResponse {
        pub success: bool,
        pub user: UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordChange {
        #[serde(alias = "oldPassword")]
        pub old_password: String,
        #[serde(alias = "newPassword")]
        pub new_password: String,
    }

    /// Profile edit. `role` is honoured only for administrators and
    /// `password` is left unchanged when absent.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserEdit {
        pub name: String,
        pub email: String,
        pub address: String,
        #[serde(default, alias = "type")]
        pub role: Option<Role>,
        #[serde(default)]
        pub password: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserQuery {
        pub search: Option<String>,
        pub role: Option<Role>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}

pub mod store {
    use super::*;
    use crate::rating::{FeedbackEntry, RatingSummary};

    /// A store listing with its derived rating figures.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StoreView {
        pub id: i32,
        pub name: String,
        pub address: String,
        pub owner_id: Option<i32>,
        pub created_at: DateTime<Utc>,
        /// Mean rating rounded to one decimal, `0.0` when unrated.
        pub average_rating: f64,
        pub rating_count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StoreNew {
        pub name: String,
        pub address: String,
        #[serde(default)]
        pub owner_id: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StoreQuery {
        pub search: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StoresResponse {
        pub stores: Vec<StoreView>,
    }

    /// Aggregate and individual ratings of a single store.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct StoreFeedback {
        pub store: StoreView,
        pub summary: RatingSummary,
        pub ratings: Vec<FeedbackEntry>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnerDashboard {
        pub stores: Vec<StoreFeedback>,
    }
}

pub mod rating {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatingView {
        pub id: i32,
        pub store_id: i32,
        pub user_id: i32,
        pub rating: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Body of `add-rating`. Non-integer values are rejected while decoding.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatingNew {
        pub rating: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatingSaved {
        pub success: bool,
        pub message: String,
        pub rating: RatingView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatingsResponse {
        pub ratings: Vec<RatingView>,
    }

    /// One of the caller's ratings with the store it belongs to.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRatingView {
        #[serde(flatten)]
        pub rating: RatingView,
        pub store_name: String,
        pub store_address: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRatingsResponse {
        pub ratings: Vec<UserRatingView>,
    }

    /// A rating as seen by the store's owner or an administrator.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedbackEntry {
        #[serde(flatten)]
        pub rating: RatingView,
        pub user_name: String,
        pub user_email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RatingSummary {
        pub store_id: i32,
        pub average: f64,
        pub average_display: f64,
        pub count: u64,
        /// Counts of 1 through 5 star ratings, in that order.
        pub distribution: [u64; 5],
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        pub total_users: u64,
        pub total_stores: u64,
        pub total_ratings: u64,
        pub normal_users: u64,
        pub store_owners: u64,
        pub administrators: u64,
    }
}
