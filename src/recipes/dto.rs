use serde::{Deserialize, Serialize};

use crate::recipes::repo::RecipeWithMeta;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Creation payload. All fields are required; they stay optional here so the
/// handler can answer with the full required-field list. `favorite` only has
/// to be present, so an explicit `false` is accepted.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    pub favorite: Option<bool>,
    pub category_id: Option<i64>,
}

/// Partial update: omitted fields keep their stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub ingredients: Option<String>,
    pub instructions: Option<String>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<String>,
    pub favorite: Option<bool>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub count: usize,
    pub recipes: Vec<RecipeWithMeta>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<RecipeWithMeta>,
}

#[derive(Debug, Serialize)]
pub struct RecipeEnvelope<T> {
    pub message: &'static str,
    pub recipe: T,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total: i64,
    pub favorite: i64,
    #[serde(rename = "notFavorite")]
    pub not_favorite: i64,
    #[serde(rename = "completionRate")]
    pub completion_rate: i64,
}
