use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use time::OffsetDateTime;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true)
            .foreign_keys(true);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("connect to database")?;
        Ok(Self { db, config })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }
}

/// Fills empty tables with sample users, categories and recipes. Runs once
/// at startup before the listener binds; tables that already hold rows are
/// left untouched.
pub async fn seed(db: &SqlitePool) -> anyhow::Result<()> {
    let now = OffsetDateTime::now_utc();

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    if users == 0 {
        for (username, email) in [
            ("john_chef", "john@recipes.com"),
            ("maria_cook", "maria@recipes.com"),
            ("alex_baker", "alex@recipes.com"),
        ] {
            let hash = hash_password("password123").context("hash seed password")?;
            sqlx::query(
                "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(username)
            .bind(email)
            .bind(hash)
            .bind(now)
            .execute(db)
            .await?;
        }
        info!("seeded sample users");
    }

    let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(db)
        .await?;
    if categories == 0 {
        for (name, description) in [
            ("Breakfast", "Morning meals to start your day"),
            ("Lunch", "Midday meals"),
            ("Dinner", "Evening meals"),
            ("Dessert", "Sweet treats and desserts"),
            ("Snacks", "Quick bites and snacks"),
        ] {
            sqlx::query("INSERT INTO categories (name, description, created_at) VALUES (?, ?, ?)")
                .bind(name)
                .bind(description)
                .bind(now)
                .execute(db)
                .await?;
        }
        info!("seeded sample categories");
    }

    let recipes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
        .fetch_one(db)
        .await?;
    if recipes == 0 {
        let rows: [(&str, &str, &str, i64, i64, i64, &str, bool, i64, i64); 3] = [
            ("Rice", "water, rice, oil, salt", "add ingredients, cook", 4, 20, 4, "easy", true, 1, 3),
            ("Beans", "water, beans, oil, salt, seasoning", "add ingredients, cook", 7, 30, 6, "medium", false, 2, 3),
            ("Pork Chops", "Pork Chop, seasoning, oil", "add ingredients, cook", 2, 10, 2, "hard", false, 1, 3),
        ];
        for (title, ingredients, instructions, prep, cook, servings, difficulty, favorite, user_id, category_id) in rows {
            sqlx::query(
                r#"
                INSERT INTO recipes (title, ingredients, instructions, prep_time,
                    cook_time, servings, difficulty, favorite, user_id, category_id, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(title)
            .bind(ingredients)
            .bind(instructions)
            .bind(prep)
            .bind(cook)
            .bind(servings)
            .bind(difficulty)
            .bind(favorite)
            .bind(user_id)
            .bind(category_id)
            .bind(now)
            .execute(db)
            .await?;
        }
        info!("seeded sample recipes");
    }

    Ok(())
}
