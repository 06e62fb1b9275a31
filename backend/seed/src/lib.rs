//! # Seeding
//!
//! First-run data for a fresh database.
//!
//! ## Categories
//! - Ten fixed categories with a short description and an emoji icon
//! - Only inserted when the table is empty, so admins can rename or add
//!   categories later without the seed fighting them
//!
//! ## Test users
//! - `testuser`, a regular neighbor
//! - `admin`, allowed to create categories
//! - Inserted when missing, looked up by username
//!
//! Running the seed twice is a no-op.
use anyhow::{Context, Result};
use bank::{
    Database,
    models::{NewCategory, NewUser},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub const CATEGORIES: [(&str, &str, &str); 10] = [
    ("Fruits", "Fresh fruits and berries", "🍎"),
    ("Vegetables", "Fresh vegetables and greens", "🥬"),
    ("Grains", "Rice, pasta, bread, cereals", "🍞"),
    ("Dairy", "Milk, cheese, yogurt, eggs", "🥛"),
    ("Meat", "Chicken, beef, pork, fish", "🥩"),
    ("Prepared Food", "Cooked meals, leftovers", "🍽️"),
    ("Baked Goods", "Bread, pastries, desserts", "🧁"),
    ("Pantry Items", "Canned goods, spices, condiments", "🥫"),
    ("Beverages", "Drinks, juices, coffee, tea", "☕"),
    ("Other", "Miscellaneous food items", "📦"),
];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub new_categories: usize,
    pub new_users: usize,
}

pub fn test_users() -> [NewUser; 2] {
    [
        NewUser {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            full_name: Some("Test User".to_string()),
            phone: Some("555-0123".to_string()),
            address: Some("123 Test Street".to_string()),
            city: Some("Test City".to_string()),
            state: Some("Test State".to_string()),
            zip_code: Some("12345".to_string()),
            bio: Some("This is a test user for development purposes".to_string()),
            is_admin: false,
        },
        NewUser {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            full_name: Some("Admin User".to_string()),
            phone: Some("555-0124".to_string()),
            address: Some("456 Admin Avenue".to_string()),
            city: Some("Admin City".to_string()),
            state: Some("Admin State".to_string()),
            zip_code: Some("54321".to_string()),
            bio: Some("This is an admin user for testing admin functionality".to_string()),
            is_admin: true,
        },
    ]
}

pub async fn seed_database(database: &Database, with_test_users: bool) -> Result<SeedReport> {
    let users = if with_test_users {
        test_users().to_vec()
    } else {
        Vec::new()
    };

    let pb = ProgressBar::new((CATEGORIES.len() + users.len()) as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut report = SeedReport::default();

    let existing = database
        .category_count()
        .await
        .context("Failed to count categories")?;

    if existing == 0 {
        for (name, description, icon) in CATEGORIES {
            pb.set_message(format!("Category {name}"));

            database
                .create_category(NewCategory {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    icon: Some(icon.to_string()),
                })
                .await
                .with_context(|| format!("Failed to insert category {name}"))?;

            report.new_categories += 1;
            pb.inc(1);
        }
    } else {
        info!("{existing} categories already exist, skipping");
        pb.inc(CATEGORIES.len() as u64);
    }

    for user in users {
        pb.set_message(format!("User {}", user.username));

        if database.user_by_username(user.username.clone()).await?.is_some() {
            info!("User {} already exists, skipping", user.username);
        } else {
            let username = user.username.clone();
            database
                .create_user(user)
                .await
                .with_context(|| format!("Failed to insert user {username}"))?;

            report.new_users += 1;
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    Ok(report)
}
