//! Client of the recipe REST service.

use crate::cache::RecipeQuery;
use crate::config::API_PREFIX;
use crate::error::{AppError, Result};
use crate::model::{
    Credentials, Ingredient, LikedRecipesResponse, LoginResponse, Recipe, Registration,
    UploadImage, User, UserEnvelope,
};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// Operations the UI needs from the recipe service.
///
/// The browser build talks to the server through [`HttpRecipeService`];
/// tests substitute an in-memory double.
#[async_trait(?Send)]
pub trait RecipeService {
    /// Recipes for a pantry. Fails with `UnexpectedShape` when the body is not an array.
    async fn recipes_by_ingredients(&self, query: &RecipeQuery) -> Result<Vec<Recipe>>;

    async fn liked_recipes(&self, email: &str) -> Result<Vec<Recipe>>;

    async fn like_recipe(&self, email: &str, recipe_id: &str) -> Result<()>;

    async fn unlike_recipe(&self, email: &str, recipe_id: &str) -> Result<()>;

    async fn add_ingredient(&self, email: &str, ingredient: &str) -> Result<()>;

    async fn remove_ingredient(&self, email: &str, ingredient: &str) -> Result<()>;

    async fn clear_ingredients(&self, email: &str) -> Result<()>;

    /// Catalogue of ingredient names the service accepts.
    async fn allowed_ingredients(&self) -> Result<Vec<Ingredient>>;

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;

    async fn register(&self, registration: &Registration) -> Result<User>;

    async fn upgrade_to_premium(&self, email: &str) -> Result<User>;

    /// Send a photo to the recognition endpoint and return the raw text parts
    /// it answers with (comma-separated ingredient names).
    async fn recognize_ingredients(&self, image: UploadImage) -> Result<Vec<String>>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Recognition {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CandidateContent {
    #[serde(default)]
    parts: Option<Vec<String>>,
}

impl Recognition {
    fn into_parts(self) -> Vec<String> {
        self.candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .unwrap_or_default()
    }
}

/// Decode a recipe list, rejecting anything that is not a JSON array.
fn recipes_from_value(value: Value) -> Result<Vec<Recipe>> {
    if !value.is_array() {
        return Err(AppError::UnexpectedShape(format!(
            "expected a recipe array, got {}",
            kind_of(&value)
        )));
    }
    Ok(serde_json::from_value(value)?)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `reqwest` backed implementation. Requests go to `<base_url>/api/v1/...`.
#[derive(Clone, Debug)]
pub struct HttpRecipeService {
    client: Client,
    base_url: String,
}

impl HttpRecipeService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Service on the same origin as the page.
    pub fn same_origin() -> Result<Self> {
        let origin = gloo_utils::window()
            .location()
            .origin()
            .map_err(AppError::browser)?;
        Ok(Self::new(origin))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
        Err(AppError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        Ok(self.send(request).await?.json::<T>().await?)
    }

    async fn post(&self, path: &str, body: Value) -> Result<()> {
        self.send(self.client.post(self.url(path)).json(&body)).await?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl RecipeService for HttpRecipeService {
    async fn recipes_by_ingredients(&self, query: &RecipeQuery) -> Result<Vec<Recipe>> {
        let ingredients = query.ingredients.join(",");
        let premium = query.premium.to_string();
        debug!("Requesting recipes for [{}] (premium: {})", ingredients, premium);
        let request = self
            .client
            .get(self.url("/recipes/by-multiple-criteria"))
            .query(&[("ingredient", ingredients.as_str()), ("premium", premium.as_str())]);
        let value: Value = self.send_json(request).await?;
        recipes_from_value(value)
    }

    async fn liked_recipes(&self, email: &str) -> Result<Vec<Recipe>> {
        let request = self
            .client
            .get(self.url("/users/liked-recipes"))
            .query(&[("email", email)]);
        let body: LikedRecipesResponse = self.send_json(request).await?;
        Ok(body.liked_recipes)
    }

    async fn like_recipe(&self, email: &str, recipe_id: &str) -> Result<()> {
        self.post("/like-recipe", json!({ "email": email, "recipe_id": recipe_id }))
            .await
    }

    async fn unlike_recipe(&self, email: &str, recipe_id: &str) -> Result<()> {
        self.post("/unlike-recipe", json!({ "email": email, "recipe_id": recipe_id }))
            .await
    }

    async fn add_ingredient(&self, email: &str, ingredient: &str) -> Result<()> {
        self.post(
            "/user-ingredients/add",
            json!({ "email": email, "ingredient": ingredient }),
        )
        .await
    }

    async fn remove_ingredient(&self, email: &str, ingredient: &str) -> Result<()> {
        self.post(
            "/user-ingredients/remove",
            json!({ "email": email, "ingredient": ingredient }),
        )
        .await
    }

    async fn clear_ingredients(&self, email: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url("/user-ingredients/remove/all"))
            .json(&json!({ "email": email }));
        self.send(request).await?;
        Ok(())
    }

    async fn allowed_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.send_json(self.client.get(self.url("/ingredients"))).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.send_json(self.client.post(self.url("/login")).json(credentials))
            .await
    }

    async fn register(&self, registration: &Registration) -> Result<User> {
        self.send_json(self.client.post(self.url("/register")).json(registration))
            .await
    }

    async fn upgrade_to_premium(&self, email: &str) -> Result<User> {
        let request = self
            .client
            .post(self.url("/upgrade"))
            .json(&json!({ "email": email }));
        let body: UserEnvelope = self.send_json(request).await?;
        Ok(body.user)
    }

    async fn recognize_ingredients(&self, image: UploadImage) -> Result<Vec<String>> {
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new().part("image", part);
        let body: Recognition = self
            .send_json(self.client.post(self.url("/gen")).multipart(form))
            .await?;
        Ok(body.into_parts())
    }
}
