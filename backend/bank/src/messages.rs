use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior, params};

use crate::{
    database::Database,
    error::BankError,
    models::{MESSAGE_COLUMNS, Message, MessageView, NewMessage},
    posts::{MAX_RESULTS, post_exists},
    users::{fetch_user, user_exists},
};

fn view(conn: &Connection, message: Message) -> Result<MessageView, BankError> {
    Ok(MessageView {
        sender: fetch_user(conn, message.sender_id)?,
        receiver: fetch_user(conn, message.receiver_id)?,
        message,
    })
}

impl Database {
    pub async fn send_message(
        &self,
        sender_id: i64,
        new_message: NewMessage,
    ) -> Result<MessageView, BankError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if !user_exists(&tx, new_message.receiver_id)? {
                return Err(BankError::NotFound("Receiver"));
            }
            if let Some(post_id) = new_message.food_post_id {
                if !post_exists(&tx, post_id)? {
                    return Err(BankError::NotFound("Food post"));
                }
            }

            tx.execute(
                "INSERT INTO messages (sender_id, receiver_id, food_post_id, subject, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    sender_id,
                    new_message.receiver_id,
                    new_message.food_post_id,
                    new_message.subject,
                    new_message.message,
                    Utc::now(),
                ],
            )?;

            let message = tx.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                [tx.last_insert_rowid()],
                Message::from_row,
            )?;

            let message = view(&tx, message)?;
            tx.commit()?;

            Ok(message)
        })
        .await
    }

    /// Sent and received, newest first.
    pub async fn messages_for(&self, user_id: i64) -> Result<Vec<MessageView>, BankError> {
        self.call(move |conn| {
            let messages = {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE sender_id = ?1 OR receiver_id = ?1
                     ORDER BY id DESC LIMIT ?2"
                ))?;
                let rows = stmt
                    .query_map(params![user_id, MAX_RESULTS as i64], Message::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            };

            messages
                .into_iter()
                .map(|message| view(conn, message))
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::tests::temp_database, posts::tests::new_post, users::tests::new_user};

    fn note(receiver_id: i64, text: &str) -> NewMessage {
        NewMessage {
            receiver_id,
            food_post_id: None,
            subject: None,
            message: text.to_string(),
        }
    }

    #[tokio::test]
    async fn inbox_holds_both_directions() {
        let (_dir, database) = temp_database().await;
        let alice = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();
        let carol = database.create_user(new_user("carol")).await.unwrap();

        database.send_message(alice.id, note(bob.id, "hi bob")).await.unwrap();
        database.send_message(bob.id, note(alice.id, "hi alice")).await.unwrap();
        database.send_message(bob.id, note(carol.id, "hi carol")).await.unwrap();

        let inbox = database.messages_for(alice.id).await.unwrap();
        let texts: Vec<&str> = inbox.iter().map(|m| m.message.message.as_str()).collect();

        assert_eq!(texts, ["hi alice", "hi bob"]);
        assert_eq!(inbox[0].sender.username, "bob");
        assert!(!inbox[0].message.is_read);
    }

    #[tokio::test]
    async fn rejects_unknown_receiver_and_post() {
        let (_dir, database) = temp_database().await;
        let alice = database.create_user(new_user("alice")).await.unwrap();

        assert!(matches!(
            database.send_message(alice.id, note(404, "anyone?")).await,
            Err(BankError::NotFound("Receiver"))
        ));

        let bob = database.create_user(new_user("bob")).await.unwrap();
        let mut about_post = note(bob.id, "still there?");
        about_post.food_post_id = Some(404);
        assert!(matches!(
            database.send_message(alice.id, about_post).await,
            Err(BankError::NotFound("Food post"))
        ));
    }

    #[tokio::test]
    async fn post_deleted_while_sending_is_not_found() {
        let (_dir, database) = temp_database().await;
        let alice = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();
        let post = database.create_post(alice.id, new_post("Figs")).await.unwrap();

        let mut other = Connection::open(database.path()).unwrap();
        other.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        let deleting = other
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .unwrap();
        deleting
            .execute("DELETE FROM food_posts WHERE id = ?1", [post.post.id])
            .unwrap();

        let mut about_post = note(alice.id, "are the figs ripe?");
        about_post.food_post_id = Some(post.post.id);
        let sending = tokio::spawn({
            let database = database.clone();
            async move { database.send_message(bob.id, about_post).await }
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        deleting.commit().unwrap();

        assert!(matches!(
            sending.await.unwrap(),
            Err(BankError::NotFound("Food post"))
        ));
        assert!(database.messages_for(bob.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_post_keeps_messages() {
        let (_dir, database) = temp_database().await;
        let alice = database.create_user(new_user("alice")).await.unwrap();
        let bob = database.create_user(new_user("bob")).await.unwrap();
        let post = database.create_post(alice.id, new_post("Kale")).await.unwrap();

        let mut about_post = note(alice.id, "can I have the kale?");
        about_post.food_post_id = Some(post.post.id);
        database.send_message(bob.id, about_post).await.unwrap();

        database.delete_post(post.post.id, alice.id).await.unwrap();

        let inbox = database.messages_for(alice.id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message.food_post_id, None);
    }
}
