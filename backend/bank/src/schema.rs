//! Table definitions. Applied on every [`crate::Database::open`], so each
//! statement has to stay idempotent.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    username        TEXT NOT NULL UNIQUE,
    email           TEXT NOT NULL UNIQUE,
    full_name       TEXT,
    phone           TEXT,
    address         TEXT,
    city            TEXT,
    state           TEXT,
    zip_code        TEXT,
    profile_picture TEXT,
    bio             TEXT,
    is_active       INTEGER NOT NULL DEFAULT 1,
    is_admin        INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    icon        TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS food_posts (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id           INTEGER NOT NULL REFERENCES users(id),
    title             TEXT NOT NULL,
    description       TEXT NOT NULL,
    category_id       INTEGER REFERENCES categories(id),
    quantity          TEXT,
    expiry_date       TEXT,
    pickup_location   TEXT NOT NULL,
    pickup_time_start TEXT,
    pickup_time_end   TEXT,
    is_available      INTEGER NOT NULL DEFAULT 1,
    is_claimed        INTEGER NOT NULL DEFAULT 0,
    claimed_by        INTEGER REFERENCES users(id),
    claimed_at        TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    CHECK (is_claimed = 0 OR (claimed_by IS NOT NULL AND claimed_at IS NOT NULL)),
    CHECK (claimed_by IS NULL OR claimed_by <> user_id)
);

CREATE INDEX IF NOT EXISTS idx_food_posts_user_id ON food_posts(user_id);
CREATE INDEX IF NOT EXISTS idx_food_posts_category_id ON food_posts(category_id);

CREATE TABLE IF NOT EXISTS food_images (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    food_post_id INTEGER NOT NULL REFERENCES food_posts(id) ON DELETE CASCADE,
    image_path   TEXT NOT NULL,
    is_primary   INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_food_images_post_id ON food_images(food_post_id);

CREATE TABLE IF NOT EXISTS messages (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    sender_id    INTEGER NOT NULL REFERENCES users(id),
    receiver_id  INTEGER NOT NULL REFERENCES users(id),
    food_post_id INTEGER REFERENCES food_posts(id) ON DELETE SET NULL,
    subject      TEXT,
    message      TEXT NOT NULL,
    is_read      INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_sender_id ON messages(sender_id);
CREATE INDEX IF NOT EXISTS idx_messages_receiver_id ON messages(receiver_id);

CREATE TABLE IF NOT EXISTS reviews (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    reviewer_id      INTEGER NOT NULL REFERENCES users(id),
    reviewed_user_id INTEGER NOT NULL REFERENCES users(id),
    food_post_id     INTEGER REFERENCES food_posts(id) ON DELETE SET NULL,
    rating           INTEGER NOT NULL CHECK (rating >= 1 AND rating <= 5),
    comment          TEXT,
    created_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_reviewed_user_id ON reviews(reviewed_user_id);
"#;
