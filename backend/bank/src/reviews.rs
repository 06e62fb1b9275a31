use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior, params};

use crate::{
    database::Database,
    error::BankError,
    models::{NewReview, REVIEW_COLUMNS, Review, ReviewView},
    posts::{MAX_RESULTS, post_exists},
    users::{fetch_user, user_exists},
};

fn view(conn: &Connection, review: Review) -> Result<ReviewView, BankError> {
    Ok(ReviewView {
        reviewer: fetch_user(conn, review.reviewer_id)?,
        reviewed_user: fetch_user(conn, review.reviewed_user_id)?,
        review,
    })
}

impl Database {
    pub async fn create_review(
        &self,
        reviewer_id: i64,
        new_review: NewReview,
    ) -> Result<ReviewView, BankError> {
        self.call(move |conn| {
            if new_review.reviewed_user_id == reviewer_id {
                return Err(BankError::Invalid("Cannot review yourself".to_string()));
            }
            if !(1..=5).contains(&new_review.rating) {
                return Err(BankError::Invalid(
                    "Rating must be between 1 and 5".to_string(),
                ));
            }

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if !user_exists(&tx, new_review.reviewed_user_id)? {
                return Err(BankError::NotFound("User"));
            }
            if let Some(post_id) = new_review.food_post_id {
                if !post_exists(&tx, post_id)? {
                    return Err(BankError::NotFound("Food post"));
                }
            }

            tx.execute(
                "INSERT INTO reviews (reviewer_id, reviewed_user_id, food_post_id, rating, comment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    reviewer_id,
                    new_review.reviewed_user_id,
                    new_review.food_post_id,
                    new_review.rating,
                    new_review.comment,
                    Utc::now(),
                ],
            )?;

            let review = tx.query_row(
                &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"),
                [tx.last_insert_rowid()],
                Review::from_row,
            )?;

            let review = view(&tx, review)?;
            tx.commit()?;

            Ok(review)
        })
        .await
    }

    /// Reviews received by `user_id`, newest first.
    pub async fn reviews_for(&self, user_id: i64) -> Result<Vec<ReviewView>, BankError> {
        self.call(move |conn| {
            if !user_exists(conn, user_id)? {
                return Err(BankError::NotFound("User"));
            }

            let reviews = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews
                     WHERE reviewed_user_id = ?1
                     ORDER BY id DESC LIMIT ?2"
                ))?;
                let rows = stmt
                    .query_map(params![user_id, MAX_RESULTS as i64], Review::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };

            reviews
                .into_iter()
                .map(|review| view(conn, review))
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::tests::temp_database, users::tests::new_user};

    fn review(reviewed_user_id: i64, rating: u8) -> NewReview {
        NewReview {
            reviewed_user_id,
            food_post_id: None,
            rating,
            comment: Some("Friendly pickup".to_string()),
        }
    }

    #[tokio::test]
    async fn lists_received_reviews() {
        let (_dir, database) = temp_database().await;
        let alice = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();
        let carol = database.create_user(new_user("carol")).await.unwrap();

        database.create_review(bob.id, review(alice.id, 5)).await.unwrap();
        database.create_review(carol.id, review(alice.id, 4)).await.unwrap();
        database.create_review(alice.id, review(bob.id, 3)).await.unwrap();

        let received = database.reviews_for(alice.id).await.unwrap();
        let ratings: Vec<u8> = received.iter().map(|r| r.review.rating).collect();

        assert_eq!(ratings, [4, 5]);
        assert_eq!(received[0].reviewer.username, "carol");
        assert_eq!(received[0].reviewed_user.username, "alice");
    }

    #[tokio::test]
    async fn rejects_bad_reviews() {
        let (_dir, database) = temp_database().await;
        let alice = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();

        assert!(matches!(
            database.create_review(alice.id, review(alice.id, 5)).await,
            Err(BankError::Invalid(_))
        ));
        assert!(matches!(
            database.create_review(alice.id, review(bob.id, 6)).await,
            Err(BankError::Invalid(_))
        ));
        assert!(matches!(
            database.create_review(alice.id, review(bob.id, 0)).await,
            Err(BankError::Invalid(_))
        ));
        assert!(matches!(
            database.create_review(alice.id, review(404, 3)).await,
            Err(BankError::NotFound("User"))
        ));
        assert!(matches!(
            database.reviews_for(404).await,
            Err(BankError::NotFound("User"))
        ));
    }
}
