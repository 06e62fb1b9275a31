use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use tracing::info;

use crate::{
    database::Database,
    error::BankError,
    models::{NewUser, USER_COLUMNS, User, UserUpdate},
};

pub(crate) fn fetch_user(conn: &Connection, id: i64) -> Result<User, BankError> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        [id],
        User::from_row,
    )
    .optional()?
    .ok_or(BankError::NotFound("User"))
}

pub(crate) fn user_exists(conn: &Connection, id: i64) -> Result<bool, BankError> {
    Ok(conn
        .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
        .optional()?
        .is_some())
}

impl Database {
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, BankError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let taken = |column: &str, value: &str| -> Result<bool, BankError> {
                Ok(tx
                    .query_row(
                        &format!("SELECT 1 FROM users WHERE {column} = ?1 COLLATE NOCASE"),
                        [value],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some())
            };

            if taken("username", &new_user.username)? {
                return Err(BankError::Duplicate("Username"));
            }
            if taken("email", &new_user.email)? {
                return Err(BankError::Duplicate("Email"));
            }

            let now = Utc::now();
            tx.execute(
                "INSERT INTO users (username, email, full_name, phone, address, city, state, zip_code, bio, is_admin, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                params![
                    new_user.username,
                    new_user.email,
                    new_user.full_name,
                    new_user.phone,
                    new_user.address,
                    new_user.city,
                    new_user.state,
                    new_user.zip_code,
                    new_user.bio,
                    new_user.is_admin,
                    now,
                ],
            )?;

            let user = fetch_user(&tx, tx.last_insert_rowid())?;
            tx.commit()?;

            info!("Registered user {} ({})", user.username, user.id);

            Ok(user)
        })
        .await
    }

    pub async fn user(&self, id: i64) -> Result<User, BankError> {
        self.call(move |conn| fetch_user(conn, id)).await
    }

    pub async fn user_by_username(&self, username: String) -> Result<Option<User>, BankError> {
        self.call(move |conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                    [username],
                    User::from_row,
                )
                .optional()?)
        })
        .await
    }

    /// Fields left as `None` keep their stored value.
    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, BankError> {
        self.call(move |conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    full_name = COALESCE(?2, full_name),
                    phone = COALESCE(?3, phone),
                    address = COALESCE(?4, address),
                    city = COALESCE(?5, city),
                    state = COALESCE(?6, state),
                    zip_code = COALESCE(?7, zip_code),
                    bio = COALESCE(?8, bio),
                    updated_at = ?9
                 WHERE id = ?1",
                params![
                    id,
                    update.full_name,
                    update.phone,
                    update.address,
                    update.city,
                    update.state,
                    update.zip_code,
                    update.bio,
                    Utc::now(),
                ],
            )?;

            if changed == 0 {
                return Err(BankError::NotFound("User"));
            }

            fetch_user(conn, id)
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::tests::temp_database;

    pub(crate) fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            city: Some("Springfield".to_string()),
            ..NewUser::default()
        }
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let (_dir, database) = temp_database().await;

        let created = database.create_user(new_user("alice")).await.unwrap();
        let fetched = database.user(created.id).await.unwrap();

        assert_eq!(fetched.username, "alice");
        assert!(fetched.is_active);
        assert!(!fetched.is_admin);
    }

    #[tokio::test]
    async fn rejects_duplicate_username_and_email() {
        let (_dir, database) = temp_database().await;
        database.create_user(new_user("alice")).await.unwrap();

        let same_name = database.create_user(new_user("ALICE")).await;
        assert!(matches!(same_name, Err(BankError::Duplicate("Username"))));

        let mut same_email = new_user("bob");
        same_email.email = "alice@example.com".to_string();
        let same_email = database.create_user(same_email).await;
        assert!(matches!(same_email, Err(BankError::Duplicate("Email"))));
    }

    #[tokio::test]
    async fn update_keeps_unset_fields() {
        let (_dir, database) = temp_database().await;
        let user = database.create_user(new_user("alice")).await.unwrap();

        let updated = database
            .update_user(
                user.id,
                UserUpdate {
                    bio: Some("Grows too many tomatoes".to_string()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.bio.as_deref(), Some("Grows too many tomatoes"));
        assert_eq!(updated.city.as_deref(), Some("Springfield"));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (_dir, database) = temp_database().await;

        assert!(matches!(
            database.user(42).await,
            Err(BankError::NotFound("User"))
        ));
    }
}
