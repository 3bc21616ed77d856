//! In-memory stand-in for the recipe service, shared by unit tests.

use crate::api::RecipeService;
use crate::cache::RecipeQuery;
use crate::error::{AppError, Result};
use crate::model::{
    Credentials, Ingredient, LoginResponse, Recipe, Registration, UploadImage, User,
};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

pub fn catalogue() -> Vec<Ingredient> {
    ["Ovo", "Leite", "Tomate", "Cebola", "Alface", "Farinha"]
        .iter()
        .enumerate()
        .map(|(i, name)| Ingredient {
            id: i.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Records every call and fails on demand.
pub struct FakeService {
    user: RefCell<User>,
    token: RefCell<Option<String>>,
    recipes: RefCell<Vec<Recipe>>,
    recognized: RefCell<Vec<String>>,
    failures: RefCell<HashSet<&'static str>>,
    calls: RefCell<HashMap<&'static str, usize>>,
    in_flight: RefCell<Option<Box<dyn Fn()>>>,
}

impl FakeService {
    pub fn with_user(email: &str, ingredients: &[&str]) -> Self {
        let user = User {
            name: "Ana".into(),
            email: email.into(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            ..User::default()
        };
        Self {
            user: RefCell::new(user),
            token: RefCell::new(None),
            recipes: RefCell::new(Vec::new()),
            recognized: RefCell::new(Vec::new()),
            failures: RefCell::new(HashSet::new()),
            calls: RefCell::new(HashMap::new()),
            in_flight: RefCell::new(None),
        }
    }

    pub fn user(&self) -> User {
        self.user.borrow().clone()
    }

    pub fn issue_token(&self, token: Option<&str>) {
        *self.token.borrow_mut() = token.map(str::to_string);
    }

    pub fn serve_recipes(&self, recipes: Vec<Recipe>) {
        *self.recipes.borrow_mut() = recipes;
    }

    pub fn serve_recognition(&self, parts: &[&str]) {
        *self.recognized.borrow_mut() = parts.iter().map(|s| s.to_string()).collect();
    }

    /// Make the next call to `operation` fail with a 500.
    pub fn fail_next(&self, operation: &'static str) {
        self.failures.borrow_mut().insert(operation);
    }

    /// Run `action` inside every following call, as if it happened while
    /// the request was pending.
    pub fn while_pending(&self, action: impl Fn() + 'static) {
        *self.in_flight.borrow_mut() = Some(Box::new(action));
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.borrow().get(operation).copied().unwrap_or(0)
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        *self.calls.borrow_mut().entry(operation).or_insert(0) += 1;
        if let Some(action) = self.in_flight.borrow().as_ref() {
            action();
        }
        if self.failures.borrow_mut().remove(operation) {
            return Err(AppError::Status {
                status: 500,
                message: format!("{} failed", operation),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl RecipeService for FakeService {
    async fn recipes_by_ingredients(&self, _query: &RecipeQuery) -> Result<Vec<Recipe>> {
        self.record("recipes_by_ingredients")?;
        Ok(self.recipes.borrow().clone())
    }

    async fn liked_recipes(&self, _email: &str) -> Result<Vec<Recipe>> {
        self.record("liked_recipes")?;
        let liked = self.user.borrow().liked_recipes.clone();
        Ok(self
            .recipes
            .borrow()
            .iter()
            .filter(|r| liked.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn like_recipe(&self, _email: &str, recipe_id: &str) -> Result<()> {
        self.record("like_recipe")?;
        let mut user = self.user.borrow_mut();
        if !user.likes(recipe_id) {
            user.liked_recipes.push(recipe_id.to_string());
        }
        Ok(())
    }

    async fn unlike_recipe(&self, _email: &str, recipe_id: &str) -> Result<()> {
        self.record("unlike_recipe")?;
        self.user.borrow_mut().liked_recipes.retain(|id| id != recipe_id);
        Ok(())
    }

    async fn add_ingredient(&self, _email: &str, ingredient: &str) -> Result<()> {
        self.record("add_ingredient")?;
        self.user.borrow_mut().ingredients.push(ingredient.to_string());
        Ok(())
    }

    async fn remove_ingredient(&self, _email: &str, ingredient: &str) -> Result<()> {
        self.record("remove_ingredient")?;
        self.user.borrow_mut().ingredients.retain(|i| i != ingredient);
        Ok(())
    }

    async fn clear_ingredients(&self, _email: &str) -> Result<()> {
        self.record("clear_ingredients")?;
        self.user.borrow_mut().ingredients.clear();
        Ok(())
    }

    async fn allowed_ingredients(&self) -> Result<Vec<Ingredient>> {
        self.record("allowed_ingredients")?;
        Ok(catalogue())
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.record("login")?;
        let user = self.user();
        if user.email != credentials.email {
            return Err(AppError::Status {
                status: 401,
                message: "Credenciais inválidas".into(),
            });
        }
        Ok(LoginResponse {
            message: "Login bem sucedido!".into(),
            user,
            token: self.token.borrow().clone(),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<User> {
        self.record("register")?;
        Ok(User {
            name: registration.name.clone(),
            email: registration.email.clone(),
            ingredients: registration.ingredients.clone(),
            ..User::default()
        })
    }

    async fn upgrade_to_premium(&self, _email: &str) -> Result<User> {
        self.record("upgrade_to_premium")?;
        let mut user = self.user.borrow_mut();
        user.premium = true;
        Ok(user.clone())
    }

    async fn recognize_ingredients(&self, _image: UploadImage) -> Result<Vec<String>> {
        self.record("recognize_ingredients")?;
        Ok(self.recognized.borrow().clone())
    }
}
