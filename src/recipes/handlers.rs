use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    db::AppState,
    error::ApiError,
    recipes::{
        dto::{
            CreateRecipeRequest, ListQuery, ListResponse, RecipeEnvelope, SearchQuery,
            SearchResponse, StatsResponse, UpdateRecipeRequest,
        },
        repo::{Category, Filter, NewRecipe, Recipe, RecipeWithMeta},
    },
};

const SEARCH_EXAMPLE: &str = "/api/recipes/search?q=rice";

#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = Filter::parse(params.filter.as_deref());
    let recipes = Recipe::list(&state.db, filter).await?;
    Ok(Json(ListResponse {
        count: recipes.len(),
        recipes,
    }))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Some(term) = params.q.filter(|q| !q.is_empty()) else {
        return Err(ApiError::MissingQuery {
            example: SEARCH_EXAMPLE,
        });
    };
    let results = Recipe::search(&state.db, &term).await?;
    Ok(Json(SearchResponse {
        query: term,
        count: results.len(),
        results,
    }))
}

#[instrument(skip(state))]
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeWithMeta>, ApiError> {
    let recipe = Recipe::get_joined(&state.db, id)
        .await?
        .ok_or(ApiError::RecipeNotFound { id: Some(id) })?;
    Ok(Json(recipe))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeEnvelope<RecipeWithMeta>>), ApiError> {
    const REQUIRED: &[&str] = &[
        "title",
        "ingredients",
        "instructions",
        "prep_time",
        "cook_time",
        "servings",
        "difficulty",
        "favorite",
        "category_id",
    ];

    let (
        Some(title),
        Some(ingredients),
        Some(instructions),
        Some(prep_time),
        Some(cook_time),
        Some(servings),
        Some(difficulty),
        Some(favorite),
        Some(category_id),
    ) = (
        payload.title.filter(|v| !v.is_empty()),
        payload.ingredients.filter(|v| !v.is_empty()),
        payload.instructions.filter(|v| !v.is_empty()),
        payload.prep_time.filter(|v| *v != 0),
        payload.cook_time.filter(|v| *v != 0),
        payload.servings.filter(|v| *v != 0),
        payload.difficulty.filter(|v| !v.is_empty()),
        payload.favorite,
        payload.category_id.filter(|v| *v != 0),
    )
    else {
        return Err(ApiError::MissingFields(REQUIRED));
    };

    if !Category::exists(&state.db, category_id).await? {
        return Err(ApiError::UnknownCategory {
            hint: category_hint(&state).await?,
        });
    }

    let recipe = Recipe::create(
        &state.db,
        NewRecipe {
            title: &title,
            ingredients: &ingredients,
            instructions: &instructions,
            prep_time,
            cook_time,
            servings,
            difficulty: &difficulty,
            favorite,
            user_id,
            category_id,
        },
    )
    .await?;

    let joined = Recipe::get_joined(&state.db, recipe.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("created recipe {} vanished", recipe.id))?;

    info!(recipe_id = recipe.id, user_id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeEnvelope {
            message: "Recipe created successfully",
            recipe: joined,
        }),
    ))
}

/// Lists the ids the client could have used; built from the table at the
/// moment validation fails.
async fn category_hint(state: &AppState) -> anyhow::Result<String> {
    let categories = Category::list(&state.db).await?;
    let known: Vec<String> = categories
        .iter()
        .map(|c| format!("{} ({})", c.id, c.name))
        .collect();
    Ok(format!("Available categories: {}", known.join(", ")))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeEnvelope<RecipeWithMeta>>, ApiError> {
    let existing = Recipe::get(&state.db, id)
        .await?
        .ok_or(ApiError::RecipeNotFound { id: Some(id) })?;

    if existing.user_id != user_id {
        return Err(ApiError::NotOwner {
            action: "update",
            owner: existing.user_id,
            requester: user_id,
        });
    }

    // Field-by-field merge; the owner never changes.
    let merged = Recipe {
        title: payload.title.unwrap_or(existing.title),
        ingredients: payload.ingredients.unwrap_or(existing.ingredients),
        instructions: payload.instructions.unwrap_or(existing.instructions),
        prep_time: payload.prep_time.unwrap_or(existing.prep_time),
        cook_time: payload.cook_time.unwrap_or(existing.cook_time),
        servings: payload.servings.unwrap_or(existing.servings),
        difficulty: payload.difficulty.unwrap_or(existing.difficulty),
        favorite: payload.favorite.unwrap_or(existing.favorite),
        category_id: payload.category_id.unwrap_or(existing.category_id),
        id: existing.id,
        user_id: existing.user_id,
        created_at: existing.created_at,
    };
    Recipe::update(&state.db, &merged).await?;

    let joined = Recipe::get_joined(&state.db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("updated recipe {id} vanished"))?;

    info!(recipe_id = id, user_id, "recipe updated");
    Ok(Json(RecipeEnvelope {
        message: "Recipe updated successfully",
        recipe: joined,
    }))
}

#[instrument(skip(state))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeEnvelope<Recipe>>, ApiError> {
    let recipe = Recipe::get(&state.db, id)
        .await?
        .ok_or(ApiError::RecipeNotFound { id: None })?;

    Recipe::set_favorite(&state.db, id, !recipe.favorite).await?;

    let updated = Recipe::get(&state.db, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("toggled recipe {id} vanished"))?;

    Ok(Json(RecipeEnvelope {
        message: "Recipe toggled",
        recipe: updated,
    }))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeEnvelope<Recipe>>, ApiError> {
    let recipe = Recipe::get(&state.db, id)
        .await?
        .ok_or(ApiError::RecipeNotFound { id: Some(id) })?;

    if recipe.user_id != user_id {
        return Err(ApiError::NotOwner {
            action: "delete",
            owner: recipe.user_id,
            requester: user_id,
        });
    }

    Recipe::delete(&state.db, id).await?;

    info!(recipe_id = id, user_id, "recipe deleted");
    Ok(Json(RecipeEnvelope {
        message: "Recipe deleted successfully",
        recipe,
    }))
}

#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let total = Recipe::count(&state.db).await?;
    let favorite = Recipe::count_favorite(&state.db).await?;
    Ok(Json(StatsResponse {
        total,
        favorite,
        not_favorite: total - favorite,
        completion_rate: completion_rate(total, favorite),
    }))
}

fn completion_rate(total: i64, favorite: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((favorite as f64 / total as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::completion_rate;

    #[test]
    fn completion_rate_rounds_to_nearest_percent() {
        assert_eq!(completion_rate(4, 1), 25);
        assert_eq!(completion_rate(3, 1), 33);
        assert_eq!(completion_rate(3, 2), 67);
        assert_eq!(completion_rate(5, 5), 100);
    }

    #[test]
    fn completion_rate_of_empty_store_is_zero() {
        assert_eq!(completion_rate(0, 0), 0);
    }
}
