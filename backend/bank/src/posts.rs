use chrono::{NaiveTime, Utc};
use rusqlite::{
    Connection, OptionalExtension, TransactionBehavior, params, params_from_iter, types::Value,
};
use tracing::info;

use crate::{
    categories::{fetch_category, fetch_optional_category},
    database::Database,
    error::BankError,
    models::{
        FoodImage, FoodPost, FoodPostDetail, FoodPostSummary, FoodPostUpdate, IMAGE_COLUMNS,
        NewFoodPost, POST_COLUMNS, PostFilter,
    },
    users::fetch_user,
};

/// Upper bound on rows returned by any listing.
pub const MAX_RESULTS: usize = 50;

pub(crate) fn fetch_post(conn: &Connection, id: i64) -> Result<FoodPost, BankError> {
    conn.query_row(
        &format!("SELECT {POST_COLUMNS} FROM food_posts p WHERE p.id = ?1"),
        [id],
        FoodPost::from_row,
    )
    .optional()?
    .ok_or(BankError::NotFound("Food post"))
}

pub(crate) fn post_exists(conn: &Connection, id: i64) -> Result<bool, BankError> {
    Ok(conn
        .query_row("SELECT 1 FROM food_posts WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some())
}

fn fetch_images(conn: &Connection, post_id: i64) -> Result<Vec<FoodImage>, BankError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {IMAGE_COLUMNS} FROM food_images WHERE food_post_id = ?1 ORDER BY id"
    ))?;
    let images = stmt
        .query_map([post_id], FoodImage::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(images)
}

fn detail(conn: &Connection, post: FoodPost) -> Result<FoodPostDetail, BankError> {
    Ok(FoodPostDetail {
        user: fetch_user(conn, post.user_id)?,
        category: fetch_optional_category(conn, post.category_id)?,
        images: fetch_images(conn, post.id)?,
        post,
    })
}

fn summary(conn: &Connection, post: FoodPost) -> Result<FoodPostSummary, BankError> {
    let images = fetch_images(conn, post.id)?;

    Ok(FoodPostSummary {
        user: fetch_user(conn, post.user_id)?,
        category: fetch_optional_category(conn, post.category_id)?,
        primary_image: primary_image(&images).cloned(),
        post,
    })
}

/// First image flagged primary, falling back to the first image.
pub fn primary_image(images: &[FoodImage]) -> Option<&FoodImage> {
    images
        .iter()
        .find(|image| image.is_primary)
        .or_else(|| images.first())
}

/// `%` and `_` in user input match literally.
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');

    pattern
}

fn check_owner(
    conn: &Connection,
    post_id: i64,
    caller_id: i64,
    action: &'static str,
) -> Result<(), BankError> {
    let owner: i64 = conn
        .query_row(
            "SELECT user_id FROM food_posts WHERE id = ?1",
            [post_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(BankError::NotFound("Food post"))?;

    if owner != caller_id {
        return Err(BankError::Forbidden(action));
    }

    Ok(())
}

impl Database {
    pub async fn create_post(
        &self,
        owner_id: i64,
        new_post: NewFoodPost,
    ) -> Result<FoodPostDetail, BankError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if let Some(category_id) = new_post.category_id {
                fetch_category(&tx, category_id)?;
            }

            let now = Utc::now();
            tx.execute(
                "INSERT INTO food_posts (user_id, title, description, category_id, quantity, expiry_date, pickup_location, pickup_time_start, pickup_time_end, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                params![
                    owner_id,
                    new_post.title,
                    new_post.description,
                    new_post.category_id,
                    new_post.quantity,
                    new_post.expiry_date,
                    new_post.pickup_location,
                    new_post.pickup_time_start,
                    new_post.pickup_time_end,
                    now,
                ],
            )?;
            let post_id = tx.last_insert_rowid();

            let has_primary = new_post.images.iter().any(|image| image.is_primary);
            for (index, image) in new_post.images.iter().enumerate() {
                tx.execute(
                    "INSERT INTO food_images (food_post_id, image_path, is_primary, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        post_id,
                        image.image_path,
                        image.is_primary || (!has_primary && index == 0),
                        now,
                    ],
                )?;
            }

            let post = detail(&tx, fetch_post(&tx, post_id)?)?;
            tx.commit()?;

            info!(
                "User {owner_id} posted {post_id} with {} images",
                post.images.len()
            );

            Ok(post)
        })
        .await
    }

    pub async fn post(&self, id: i64) -> Result<FoodPostDetail, BankError> {
        self.call(move |conn| {
            let post = fetch_post(conn, id)?;
            detail(conn, post)
        })
        .await
    }

    pub async fn search_posts(&self, filter: PostFilter) -> Result<Vec<FoodPostSummary>, BankError> {
        self.call(move |conn| {
            let mut sql = format!(
                "SELECT {POST_COLUMNS} FROM food_posts p JOIN users u ON u.id = p.user_id WHERE 1 = 1"
            );
            let mut values: Vec<Value> = Vec::new();

            if let Some(query) = filter.query.as_deref().filter(|q| !q.is_empty()) {
                sql.push_str(
                    " AND (p.title LIKE ? ESCAPE '\\' OR p.description LIKE ? ESCAPE '\\')",
                );
                let pattern = like_pattern(query);
                values.push(Value::Text(pattern.clone()));
                values.push(Value::Text(pattern));
            }
            if let Some(category_id) = filter.category_id {
                sql.push_str(" AND p.category_id = ?");
                values.push(Value::Integer(category_id));
            }
            if let Some(city) = filter.city {
                sql.push_str(" AND u.city = ? COLLATE NOCASE");
                values.push(Value::Text(city));
            }
            if let Some(state) = filter.state {
                sql.push_str(" AND u.state = ? COLLATE NOCASE");
                values.push(Value::Text(state));
            }
            if let Some(is_available) = filter.is_available {
                sql.push_str(" AND p.is_available = ?");
                values.push(Value::Integer(is_available.into()));
            }

            sql.push_str(" ORDER BY p.id DESC LIMIT ?");
            values.push(Value::Integer(filter.limit.clamp(1, MAX_RESULTS) as i64));

            let posts = {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(values), FoodPost::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };

            posts.into_iter().map(|post| summary(conn, post)).collect()
        })
        .await
    }

    /// Fields left as `None` keep their stored value. Only the owner may
    /// update. The owner check and the write share one immediate transaction.
    pub async fn update_post(
        &self,
        id: i64,
        caller_id: i64,
        update: FoodPostUpdate,
    ) -> Result<FoodPostDetail, BankError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            check_owner(&tx, id, caller_id, "update this post")?;

            if let Some(category_id) = update.category_id {
                fetch_category(&tx, category_id)?;
            }

            let (stored_start, stored_end): (Option<NaiveTime>, Option<NaiveTime>) =
                tx.query_row(
                    "SELECT pickup_time_start, pickup_time_end FROM food_posts WHERE id = ?1",
                    [id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
            let start = update.pickup_time_start.or(stored_start);
            let end = update.pickup_time_end.or(stored_end);
            if let (Some(start), Some(end)) = (start, end) {
                if start > end {
                    return Err(BankError::Invalid(
                        "Pickup window must start before it ends".to_string(),
                    ));
                }
            }

            tx.execute(
                "UPDATE food_posts SET
                    title = COALESCE(?2, title),
                    description = COALESCE(?3, description),
                    category_id = COALESCE(?4, category_id),
                    quantity = COALESCE(?5, quantity),
                    expiry_date = COALESCE(?6, expiry_date),
                    pickup_location = COALESCE(?7, pickup_location),
                    pickup_time_start = COALESCE(?8, pickup_time_start),
                    pickup_time_end = COALESCE(?9, pickup_time_end),
                    is_available = COALESCE(?10, is_available),
                    updated_at = ?11
                 WHERE id = ?1",
                params![
                    id,
                    update.title,
                    update.description,
                    update.category_id,
                    update.quantity,
                    update.expiry_date,
                    update.pickup_location,
                    update.pickup_time_start,
                    update.pickup_time_end,
                    update.is_available,
                    Utc::now(),
                ],
            )?;

            let post = detail(&tx, fetch_post(&tx, id)?)?;
            tx.commit()?;

            Ok(post)
        })
        .await
    }

    /// Removes the post and its images. Messages and reviews that mention
    /// it keep existing with the reference cleared.
    pub async fn delete_post(&self, id: i64, caller_id: i64) -> Result<(), BankError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            check_owner(&tx, id, caller_id, "delete this post")?;
            let images = tx.execute("DELETE FROM food_images WHERE food_post_id = ?1", [id])?;
            tx.execute("DELETE FROM food_posts WHERE id = ?1", [id])?;
            tx.commit()?;

            info!("User {caller_id} deleted post {id} and {images} images");

            Ok(())
        })
        .await
    }
}
