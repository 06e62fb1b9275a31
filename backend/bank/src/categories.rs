use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::{
    database::Database,
    error::BankError,
    models::{CATEGORY_COLUMNS, Category, NewCategory},
};

pub(crate) fn fetch_category(conn: &Connection, id: i64) -> Result<Category, BankError> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"),
        [id],
        Category::from_row,
    )
    .optional()?
    .ok_or(BankError::NotFound("Category"))
}

pub(crate) fn fetch_optional_category(
    conn: &Connection,
    id: Option<i64>,
) -> Result<Option<Category>, BankError> {
    id.map(|id| fetch_category(conn, id)).transpose()
}

impl Database {
    pub async fn categories(&self) -> Result<Vec<Category>, BankError> {
        self.call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"))?;
            let categories = stmt
                .query_map([], Category::from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(categories)
        })
        .await
    }

    pub async fn create_category(&self, category: NewCategory) -> Result<Category, BankError> {
        self.call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let exists = tx
                .query_row(
                    "SELECT 1 FROM categories WHERE name = ?1 COLLATE NOCASE",
                    [&category.name],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if exists {
                return Err(BankError::Duplicate("Category"));
            }

            tx.execute(
                "INSERT INTO categories (name, description, icon, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![category.name, category.description, category.icon, Utc::now()],
            )?;

            let created = fetch_category(&tx, tx.last_insert_rowid())?;
            tx.commit()?;

            Ok(created)
        })
        .await
    }

    pub async fn category_count(&self) -> Result<i64, BankError> {
        self.call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::temp_database;

    fn category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
            icon: None,
        }
    }

    #[tokio::test]
    async fn lists_by_name() {
        let (_dir, database) = temp_database().await;

        for name in ["Vegetables", "Dairy", "Fruits"] {
            database.create_category(category(name)).await.unwrap();
        }

        let names: Vec<String> = database
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, ["Dairy", "Fruits", "Vegetables"]);
        assert_eq!(database.category_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rejects_duplicate_name() {
        let (_dir, database) = temp_database().await;
        database.create_category(category("Dairy")).await.unwrap();

        assert!(matches!(
            database.create_category(category("dairy")).await,
            Err(BankError::Duplicate("Category"))
        ));
    }
}
