//! # Claims
//!
//! A claim moves a post from "available" to "claimed by someone". Many people
//! can hit the claim button on the same post at once, only one of them may win.
//!
//!
//!
//! ## Guarantee
//!
//! - At most one successful claim per post, ever
//! - The owner can never claim their own post
//! - A post marked unavailable by its owner cannot be claimed
//!
//!
//!
//! ## How
//!
//! 1. `BEGIN IMMEDIATE` takes SQLite's write lock up front. Every other writer,
//!    in this process or another one on the same file, queues on `busy_timeout`.
//! 2. Read owner, availability and claim state.
//! 3. Reject missing, unavailable or already claimed posts, then self-claims.
//! 4. Conditional `UPDATE ... WHERE is_available = 1 AND is_claimed = 0`, the
//!    predicate repeats the checks from step 3 and exactly one row must change.
//! 5. Commit.
//!
//! Losers wait for the winner to commit, then read `is_claimed = 1` and get
//! [`BankError::Unavailable`].
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::{debug, info};

use crate::{database::Database, error::BankError, models::FoodPost, posts::fetch_post};

pub fn claim_post(
    conn: &mut Connection,
    post_id: i64,
    claimant_id: i64,
    now: DateTime<Utc>,
) -> Result<FoodPost, BankError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let (owner_id, is_available, is_claimed): (i64, bool, bool) = tx
        .query_row(
            "SELECT user_id, is_available, is_claimed FROM food_posts WHERE id = ?1",
            [post_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?
        .ok_or(BankError::NotFound("Food post"))?;

    if !is_available || is_claimed {
        return Err(BankError::Unavailable);
    }

    if owner_id == claimant_id {
        return Err(BankError::OwnPost);
    }

    let changed = tx.execute(
        "UPDATE food_posts
         SET is_claimed = 1, claimed_by = ?2, claimed_at = ?3, updated_at = ?3
         WHERE id = ?1 AND is_available = 1 AND is_claimed = 0",
        params![post_id, claimant_id, now],
    )?;

    if changed != 1 {
        return Err(BankError::Unavailable);
    }

    let post = fetch_post(&tx, post_id)?;
    tx.commit()?;

    Ok(post)
}

impl Database {
    pub async fn claim_post(&self, post_id: i64, claimant_id: i64) -> Result<FoodPost, BankError> {
        let result = self
            .call(move |conn| claim_post(conn, post_id, claimant_id, Utc::now()))
            .await;

        match &result {
            Ok(_) => info!("User {claimant_id} claimed post {post_id}"),
            Err(e) => debug!("User {claimant_id} failed to claim post {post_id}: {e}"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::tests::temp_database,
        models::FoodPostUpdate,
        posts::tests::new_post,
        users::tests::new_user,
    };

    #[tokio::test]
    async fn claims_available_post() {
        let (_dir, database) = temp_database().await;
        let owner = database.create_user(new_user("alice")).await.unwrap();
        let claimant = database.create_user(new_user("bob")).await.unwrap();
        let post = database.create_post(owner.id, new_post("Eggs")).await.unwrap();

        let claimed = database.claim_post(post.post.id, claimant.id).await.unwrap();

        assert!(claimed.is_claimed);
        assert_eq!(claimed.claimed_by, Some(claimant.id));
        assert!(claimed.claimed_at.is_some());
    }

    #[tokio::test]
    async fn second_claim_is_rejected() {
        let (_dir, database) = temp_database().await;
        let owner = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();
        let carol = database.create_user(new_user("carol")).await.unwrap();
        let post = database.create_post(owner.id, new_post("Eggs")).await.unwrap();

        database.claim_post(post.post.id, bob.id).await.unwrap();

        assert!(matches!(
            database.claim_post(post.post.id, carol.id).await,
            Err(BankError::Unavailable)
        ));
        assert!(matches!(
            database.claim_post(post.post.id, bob.id).await,
            Err(BankError::Unavailable)
        ));

        let stored = database.post(post.post.id).await.unwrap();
        assert_eq!(stored.post.claimed_by, Some(bob.id));
    }

    #[tokio::test]
    async fn owner_cannot_claim() {
        let (_dir, database) = temp_database().await;
        let owner = database.create_user(new_user("alice")).await.unwrap();
        let post = database.create_post(owner.id, new_post("Eggs")).await.unwrap();

        assert!(matches!(
            database.claim_post(post.post.id, owner.id).await,
            Err(BankError::OwnPost)
        ));
        assert!(!database.post(post.post.id).await.unwrap().post.is_claimed);
    }

    #[tokio::test]
    async fn unavailable_and_missing_posts() {
        let (_dir, database) = temp_database().await;
        let owner = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();
        let post = database.create_post(owner.id, new_post("Eggs")).await.unwrap();

        database
            .update_post(
                post.post.id,
                owner.id,
                FoodPostUpdate {
                    is_available: Some(false),
                    ..FoodPostUpdate::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            database.claim_post(post.post.id, bob.id).await,
            Err(BankError::Unavailable)
        ));
        assert!(matches!(
            database.claim_post(9999, bob.id).await,
            Err(BankError::NotFound("Food post"))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_claims_have_one_winner() {
        let (_dir, database) = temp_database().await;
        let owner = database.create_user(new_user("owner")).await.unwrap();
        let post = database.create_post(owner.id, new_post("Soup")).await.unwrap();

        let mut claimants = Vec::new();
        for i in 0..16 {
            let user = database
                .create_user(new_user(&format!("neighbor{i}")))
                .await
                .unwrap();
            claimants.push(user.id);
        }
        // The owner joins the race too and must never win.
        claimants.push(owner.id);

        let handles: Vec<_> = claimants
            .iter()
            .map(|&claimant| {
                let database = database.clone();
                let post_id = post.post.id;
                tokio::spawn(async move { database.claim_post(post_id, claimant).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.expect("claim task"));
        }

        let winners: Vec<i64> = results
            .iter()
            .filter_map(|result| result.as_ref().ok())
            .filter_map(|post| post.claimed_by)
            .collect();
        assert_eq!(winners.len(), 1);
        assert_ne!(winners[0], owner.id);

        for result in &results {
            if let Err(e) = result {
                assert!(
                    matches!(e, BankError::Unavailable | BankError::OwnPost),
                    "unexpected error: {e}"
                );
            }
        }

        let stored = database.post(post.post.id).await.unwrap();
        assert_eq!(stored.post.claimed_by, Some(winners[0]));
    }
}
