use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Bare recipe row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub difficulty: String,
    pub favorite: bool,
    pub user_id: i64,
    pub category_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Recipe joined with its author's username and category name, the shape
/// returned by the read endpoints.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecipeWithMeta {
    pub id: i64,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub difficulty: String,
    pub favorite: bool,
    pub user_id: i64,
    pub category_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub author: String,
    pub category_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

pub struct NewRecipe<'a> {
    pub title: &'a str,
    pub ingredients: &'a str,
    pub instructions: &'a str,
    pub prep_time: i64,
    pub cook_time: i64,
    pub servings: i64,
    pub difficulty: &'a str,
    pub favorite: bool,
    pub user_id: i64,
    pub category_id: i64,
}

/// Listing filter. Anything the parser does not recognize means "no filter";
/// the predicate strings are fixed at compile time, so user input never
/// reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
    Favorite,
    NotFavorite,
}

impl Filter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("easy") => Filter::Easy,
            Some("medium") => Filter::Medium,
            Some("hard") => Filter::Hard,
            Some("favorite") => Filter::Favorite,
            Some("notFavorite") => Filter::NotFavorite,
            _ => Filter::All,
        }
    }

    fn predicate(self) -> &'static str {
        match self {
            Filter::All => "",
            Filter::Easy => " WHERE recipes.difficulty = 'easy'",
            Filter::Medium => " WHERE recipes.difficulty = 'medium'",
            Filter::Hard => " WHERE recipes.difficulty = 'hard'",
            Filter::Favorite => " WHERE recipes.favorite = 1",
            Filter::NotFavorite => " WHERE recipes.favorite = 0",
        }
    }
}

const JOINED: &str = r#"
    SELECT recipes.*, users.username AS author, categories.name AS category_name
    FROM recipes
    JOIN users ON recipes.user_id = users.id
    JOIN categories ON recipes.category_id = categories.id
"#;

impl Recipe {
    pub async fn list(db: &SqlitePool, filter: Filter) -> anyhow::Result<Vec<RecipeWithMeta>> {
        let query = format!("{JOINED}{}", filter.predicate());
        let rows = sqlx::query_as::<_, RecipeWithMeta>(&query)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn search(db: &SqlitePool, term: &str) -> anyhow::Result<Vec<RecipeWithMeta>> {
        let query = format!(
            "{JOINED} WHERE recipes.title LIKE ? OR recipes.ingredients LIKE ? \
             OR users.username LIKE ? OR categories.name LIKE ?"
        );
        let pattern = format!("%{term}%");
        let rows = sqlx::query_as::<_, RecipeWithMeta>(&query)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn get_joined(db: &SqlitePool, id: i64) -> anyhow::Result<Option<RecipeWithMeta>> {
        let query = format!("{JOINED} WHERE recipes.id = ?");
        let row = sqlx::query_as::<_, RecipeWithMeta>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn get(db: &SqlitePool, id: i64) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn create(db: &SqlitePool, new: NewRecipe<'_>) -> anyhow::Result<Recipe> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (title, ingredients, instructions, prep_time,
                cook_time, servings, difficulty, favorite, user_id, category_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.title)
        .bind(new.ingredients)
        .bind(new.instructions)
        .bind(new.prep_time)
        .bind(new.cook_time)
        .bind(new.servings)
        .bind(new.difficulty)
        .bind(new.favorite)
        .bind(new.user_id)
        .bind(new.category_id)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await?;
        Ok(recipe)
    }

    /// Writes every mutable column; the caller has already merged omitted
    /// fields with the stored values. The owner column is never touched.
    pub async fn update(db: &SqlitePool, recipe: &Recipe) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE recipes
            SET title = ?, ingredients = ?, instructions = ?, prep_time = ?,
                cook_time = ?, servings = ?, difficulty = ?, favorite = ?, category_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.instructions)
        .bind(recipe.prep_time)
        .bind(recipe.cook_time)
        .bind(recipe.servings)
        .bind(&recipe.difficulty)
        .bind(recipe.favorite)
        .bind(recipe.category_id)
        .bind(recipe.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn set_favorite(db: &SqlitePool, id: i64, favorite: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE recipes SET favorite = ? WHERE id = ?")
            .bind(favorite)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM recipes WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(db)
            .await?;
        Ok(count)
    }

    pub async fn count_favorite(db: &SqlitePool) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE favorite = 1")
            .fetch_one(db)
            .await?;
        Ok(count)
    }
}

impl Category {
    pub async fn exists(db: &SqlitePool, id: i64) -> anyhow::Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(found.is_some())
    }

    pub async fn list(db: &SqlitePool) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(db)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parses_known_values() {
        assert_eq!(Filter::parse(Some("easy")), Filter::Easy);
        assert_eq!(Filter::parse(Some("medium")), Filter::Medium);
        assert_eq!(Filter::parse(Some("hard")), Filter::Hard);
        assert_eq!(Filter::parse(Some("favorite")), Filter::Favorite);
        assert_eq!(Filter::parse(Some("notFavorite")), Filter::NotFavorite);
    }

    #[test]
    fn unknown_filter_means_no_filter() {
        assert_eq!(Filter::parse(Some("bogus")), Filter::All);
        assert_eq!(Filter::parse(Some("")), Filter::All);
        assert_eq!(Filter::parse(Some("FAVORITE")), Filter::All);
        assert_eq!(Filter::parse(None), Filter::All);
    }

    #[test]
    fn all_filter_adds_no_predicate() {
        assert_eq!(Filter::All.predicate(), "");
        assert!(Filter::Favorite.predicate().contains("favorite = 1"));
        assert!(Filter::NotFavorite.predicate().contains("favorite = 0"));
    }
}
