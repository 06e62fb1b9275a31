use std::sync::LazyLock;

use axum::{
    Json,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
};
use bank::models::{FoodPostUpdate, NewCategory, NewFoodPost, NewMessage, NewUser};
use chrono::NaiveTime;
use regex::Regex;

use crate::error::AppError::{self, BadRequest, MalformedPayload};

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").expect("valid username regex"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const MAX_EMAIL_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 50;

pub fn read_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| MalformedPayload(rejection.body_text()))
}

pub fn read_path<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(value)| value)
        .map_err(|rejection| MalformedPayload(rejection.body_text()))
}

/// Trims and collapses runs of whitespace. Empty input becomes `None`.
pub fn sanitize(input: &str) -> Option<String> {
    let collapsed = WHITESPACE.replace_all(input.trim(), " ").into_owned();

    (!collapsed.is_empty()).then_some(collapsed)
}

fn required(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(BadRequest(format!("{field} must not be empty")));
    }

    Ok(())
}

fn pickup_window(start: Option<NaiveTime>, end: Option<NaiveTime>) -> Result<(), AppError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(BadRequest(
                "Pickup window must start before it ends".to_string(),
            ));
        }
    }

    Ok(())
}

fn title(value: &str) -> Result<(), AppError> {
    required("Title", value)?;

    if value.chars().count() > MAX_TITLE_LEN {
        return Err(BadRequest(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> Result<(), AppError> {
    if !USERNAME.is_match(&user.username) {
        return Err(BadRequest(
            "Username must be 3-50 letters, digits, '.', '_' or '-'".to_string(),
        ));
    }

    if user.email.len() > MAX_EMAIL_LEN || !EMAIL.is_match(&user.email) {
        return Err(BadRequest("Invalid email address".to_string()));
    }

    Ok(())
}

pub fn validate_new_category(category: &NewCategory) -> Result<(), AppError> {
    required("Name", &category.name)?;

    if category.name.chars().count() > MAX_CATEGORY_LEN {
        return Err(BadRequest(format!(
            "Name must be at most {MAX_CATEGORY_LEN} characters"
        )));
    }

    Ok(())
}

pub fn validate_new_post(post: &NewFoodPost) -> Result<(), AppError> {
    title(&post.title)?;
    required("Description", &post.description)?;
    required("Pickup location", &post.pickup_location)?;
    pickup_window(post.pickup_time_start, post.pickup_time_end)?;

    for image in &post.images {
        required("Image path", &image.image_path)?;
    }

    Ok(())
}

pub fn validate_post_update(update: &FoodPostUpdate) -> Result<(), AppError> {
    if let Some(value) = &update.title {
        title(value)?;
    }
    if let Some(value) = &update.description {
        required("Description", value)?;
    }
    if let Some(value) = &update.pickup_location {
        required("Pickup location", value)?;
    }

    pickup_window(update.pickup_time_start, update.pickup_time_end)
}

pub fn validate_message(message: &NewMessage) -> Result<(), AppError> {
    required("Message", &message.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            ..NewUser::default()
        }
    }

    fn post() -> NewFoodPost {
        NewFoodPost {
            title: "Zucchini".to_string(),
            description: "Too many".to_string(),
            category_id: None,
            quantity: None,
            expiry_date: None,
            pickup_location: "Side gate".to_string(),
            pickup_time_start: None,
            pickup_time_end: None,
            images: Vec::new(),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("  fresh   bread "), Some("fresh bread".to_string()));
        assert_eq!(sanitize("tabs\tand\nlines"), Some("tabs and lines".to_string()));
        assert_eq!(sanitize("100%_off"), Some("100%_off".to_string()));
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("     "), None);
    }

    #[test]
    fn test_usernames() {
        assert!(validate_new_user(&user("alice", "alice@example.com")).is_ok());
        assert!(validate_new_user(&user("a.b-c_d", "x@y.io")).is_ok());
        assert!(validate_new_user(&user("al", "alice@example.com")).is_err());
        assert!(validate_new_user(&user("alice smith", "alice@example.com")).is_err());
        assert!(validate_new_user(&user(&"a".repeat(51), "alice@example.com")).is_err());
    }

    #[test]
    fn test_emails() {
        assert!(validate_new_user(&user("alice", "alice")).is_err());
        assert!(validate_new_user(&user("alice", "alice@example")).is_err());
        assert!(validate_new_user(&user("alice", "a lice@example.com")).is_err());
    }

    #[test]
    fn test_post_fields() {
        assert!(validate_new_post(&post()).is_ok());

        let mut blank_title = post();
        blank_title.title = "   ".to_string();
        assert!(validate_new_post(&blank_title).is_err());

        let mut long_title = post();
        long_title.title = "z".repeat(201);
        assert!(validate_new_post(&long_title).is_err());

        let mut no_location = post();
        no_location.pickup_location = String::new();
        assert!(validate_new_post(&no_location).is_err());
    }

    #[test]
    fn test_pickup_window() {
        let mut backwards = post();
        backwards.pickup_time_start = NaiveTime::from_hms_opt(18, 0, 0);
        backwards.pickup_time_end = NaiveTime::from_hms_opt(9, 0, 0);
        assert!(validate_new_post(&backwards).is_err());

        let update = FoodPostUpdate {
            pickup_time_start: NaiveTime::from_hms_opt(9, 0, 0),
            pickup_time_end: NaiveTime::from_hms_opt(18, 0, 0),
            ..FoodPostUpdate::default()
        };
        assert!(validate_post_update(&update).is_ok());
    }
}
