use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub(crate) const USER_COLUMNS: &str = "id, username, email, full_name, phone, address, city, state, zip_code, profile_picture, bio, is_active, is_admin, created_at, updated_at";

pub(crate) const CATEGORY_COLUMNS: &str = "id, name, description, icon, created_at";

pub(crate) const POST_COLUMNS: &str = "p.id, p.user_id, p.title, p.description, p.category_id, p.quantity, p.expiry_date, p.pickup_location, p.pickup_time_start, p.pickup_time_end, p.is_available, p.is_claimed, p.claimed_by, p.claimed_at, p.created_at, p.updated_at";

pub(crate) const IMAGE_COLUMNS: &str = "id, food_post_id, image_path, is_primary, created_at";

pub(crate) const MESSAGE_COLUMNS: &str = "id, sender_id, receiver_id, food_post_id, subject, message, is_read, created_at";

pub(crate) const REVIEW_COLUMNS: &str = "id, reviewer_id, reviewed_user_id, food_post_id, rating, comment, created_at";

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            full_name: row.get(3)?,
            phone: row.get(4)?,
            address: row.get(5)?,
            city: row.get(6)?,
            state: row.get(7)?,
            zip_code: row.get(8)?,
            profile_picture: row.get(9)?,
            bio: row.get(10)?,
            is_active: row.get(11)?,
            is_admin: row.get(12)?,
            created_at: row.get(13)?,
            updated_at: row.get(14)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub bio: Option<String>,
    // Only the seed tool hands out admin rights.
    #[serde(skip)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodPost {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub quantity: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub pickup_location: String,
    pub pickup_time_start: Option<NaiveTime>,
    pub pickup_time_end: Option<NaiveTime>,
    pub is_available: bool,
    pub is_claimed: bool,
    pub claimed_by: Option<i64>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodPost {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            category_id: row.get(4)?,
            quantity: row.get(5)?,
            expiry_date: row.get(6)?,
            pickup_location: row.get(7)?,
            pickup_time_start: row.get(8)?,
            pickup_time_end: row.get(9)?,
            is_available: row.get(10)?,
            is_claimed: row.get(11)?,
            claimed_by: row.get(12)?,
            claimed_at: row.get(13)?,
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodPost {
    pub title: String,
    pub description: String,
    pub category_id: Option<i64>,
    pub quantity: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub pickup_location: String,
    pub pickup_time_start: Option<NaiveTime>,
    pub pickup_time_end: Option<NaiveTime>,
    #[serde(default)]
    pub images: Vec<NewFoodImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodPostUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub quantity: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub pickup_location: Option<String>,
    pub pickup_time_start: Option<NaiveTime>,
    pub pickup_time_end: Option<NaiveTime>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodImage {
    pub id: i64,
    pub food_post_id: i64,
    pub image_path: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl FoodImage {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            food_post_id: row.get(1)?,
            image_path: row.get(2)?,
            is_primary: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFoodImage {
    pub image_path: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodPostDetail {
    #[serde(flatten)]
    pub post: FoodPost,
    pub user: User,
    pub category: Option<Category>,
    pub images: Vec<FoodImage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodPostSummary {
    #[serde(flatten)]
    pub post: FoodPost,
    pub user: User,
    pub category: Option<Category>,
    pub primary_image: Option<FoodImage>,
}

/// Search filters for listings. `None` skips the filter.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub query: Option<String>,
    pub category_id: Option<i64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_available: Option<bool>,
    pub limit: usize,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            query: None,
            category_id: None,
            city: None,
            state: None,
            is_available: Some(true),
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub food_post_id: Option<i64>,
    pub subject: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            sender_id: row.get(1)?,
            receiver_id: row.get(2)?,
            food_post_id: row.get(3)?,
            subject: row.get(4)?,
            message: row.get(5)?,
            is_read: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub receiver_id: i64,
    pub food_post_id: Option<i64>,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    #[serde(flatten)]
    pub message: Message,
    pub sender: User,
    pub receiver: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: i64,
    pub reviewer_id: i64,
    pub reviewed_user_id: i64,
    pub food_post_id: Option<i64>,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            reviewer_id: row.get(1)?,
            reviewed_user_id: row.get(2)?,
            food_post_id: row.get(3)?,
            rating: row.get(4)?,
            comment: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub reviewed_user_id: i64,
    pub food_post_id: Option<i64>,
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: Review,
    pub reviewer: User,
    pub reviewed_user: User,
}
