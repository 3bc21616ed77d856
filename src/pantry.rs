//! Pantry and likes: call the service, then bring the persisted user in line.
//!
//! Every operation reads the current user from the [`Session`], performs the
//! remote action and, only when that succeeds, stores and returns the updated
//! user. On failure the stored user is left as it was.

use crate::api::RecipeService;
use crate::config::UPLOAD_EXTENSIONS;
use crate::error::AppError;
use crate::model::{Ingredient, UploadImage, User};
use crate::session::Session;
use crate::storage::KeyValueStore;
use log::{debug, info, warn};
use thiserror::Error;

/// Why a typed or recognized ingredient was not added.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngredientRejection {
    #[error("Ingredient name is empty")]
    Blank,
    #[error("'{0}' is already in the pantry")]
    AlreadyAdded(String),
    #[error("'{0}' is not an allowed ingredient")]
    NotAllowed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    #[error("An image is required")]
    Missing,
    #[error("Unsupported image format: '{0}'")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum PantryError {
    #[error(transparent)]
    Rejected(#[from] IngredientRejection),
    #[error(transparent)]
    Upload(#[from] UploadRejection),
    #[error(transparent)]
    App(#[from] AppError),
}

/// Validate a candidate against the pantry and the catalogue.
///
/// Comparison is case-insensitive. On success the catalogue's spelling is
/// returned so the pantry stays consistent with what the service knows.
pub fn check_new_ingredient(
    user: &User,
    candidate: &str,
    allowed: &[Ingredient],
) -> Result<String, IngredientRejection> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err(IngredientRejection::Blank);
    }
    if user.has_ingredient(trimmed) {
        return Err(IngredientRejection::AlreadyAdded(trimmed.to_string()));
    }
    let wanted = trimmed.to_lowercase();
    allowed
        .iter()
        .find(|i| i.name.to_lowercase() == wanted)
        .map(|i| i.name.clone())
        .ok_or_else(|| IngredientRejection::NotAllowed(trimmed.to_string()))
}

pub async fn add_ingredient<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
    candidate: &str,
    allowed: &[Ingredient],
) -> Result<User, PantryError> {
    let user = session.require_user()?;
    let name = check_new_ingredient(&user, candidate, allowed)?;
    service.add_ingredient(&user.email, &name).await?;
    // Re-read: other edits may have been saved while the request was out.
    let mut user = session.require_user()?;
    if !user.has_ingredient(&name) {
        user.ingredients.push(name);
    }
    session.save_user(&user)?;
    debug!("Pantry now has {} ingredients", user.ingredients.len());
    Ok(user)
}

pub async fn remove_ingredient<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
    name: &str,
) -> Result<User, AppError> {
    let email = session.require_user()?.email;
    service.remove_ingredient(&email, name).await?;
    let mut user = session.require_user()?;
    user.ingredients.retain(|i| i != name);
    session.save_user(&user)?;
    Ok(user)
}

pub async fn clear_ingredients<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
) -> Result<User, AppError> {
    let email = session.require_user()?.email;
    service.clear_ingredients(&email).await?;
    let mut user = session.require_user()?;
    user.ingredients.clear();
    session.save_user(&user)?;
    info!("Cleared pantry for {}", user.email);
    Ok(user)
}

/// Like or unlike a recipe and return the new liked set.
///
/// `currently_liked` picks the endpoint. A liked id is stored at most once.
pub async fn toggle_like<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
    recipe_id: &str,
    currently_liked: bool,
) -> Result<Vec<String>, AppError> {
    let email = session.require_user()?.email;
    if currently_liked {
        service.unlike_recipe(&email, recipe_id).await?;
    } else {
        service.like_recipe(&email, recipe_id).await?;
    }
    let mut user = session.require_user()?;
    user.liked_recipes.retain(|id| id != recipe_id);
    if !currently_liked {
        user.liked_recipes.push(recipe_id.to_string());
    }
    debug!(
        "Recipe {} {}",
        recipe_id,
        if currently_liked { "unliked" } else { "liked" }
    );
    session.save_user(&user)?;
    Ok(user.liked_recipes)
}

pub async fn upgrade_to_premium<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
) -> Result<User, AppError> {
    let current = session.require_user()?;
    let mut upgraded = service.upgrade_to_premium(&current.email).await?;
    // The service answers with the full record; keep local likes if it omitted them.
    if upgraded.liked_recipes.is_empty() {
        upgraded.liked_recipes = current.liked_recipes;
    }
    upgraded.premium = true;
    session.save_user(&upgraded)?;
    info!("{} upgraded to premium", upgraded.email);
    Ok(upgraded)
}

/// Reject uploads that are missing or not JPEG before anything is sent.
pub fn check_upload_name(file_name: Option<&str>) -> Result<(), UploadRejection> {
    let name = file_name.ok_or(UploadRejection::Missing)?;
    let extension = name.rsplit('.').next().unwrap_or_default().to_lowercase();
    if UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(UploadRejection::UnsupportedFormat(extension))
    }
}

/// Upper-case the first character.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn recognition output ("tomate, cebola") into ingredient names.
pub fn parse_recognized(parts: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for part in parts {
        for raw in part.split(',') {
            let name = capitalize(raw.trim());
            if !name.is_empty() && !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Outcome of adding a batch of recognized ingredients.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecognitionReport {
    pub added: Vec<String>,
    pub already_added: Vec<String>,
    pub rejected: Vec<String>,
    pub failed: Vec<String>,
}

impl RecognitionReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.already_added.is_empty()
            && self.rejected.is_empty()
            && self.failed.is_empty()
    }
}

/// Add each recognized name in turn; one bad name does not stop the rest.
pub async fn add_recognized<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
    names: &[String],
    allowed: &[Ingredient],
) -> RecognitionReport {
    let mut report = RecognitionReport::default();
    for name in names {
        match add_ingredient(service, session, name, allowed).await {
            Ok(_) => report.added.push(name.clone()),
            Err(PantryError::Rejected(IngredientRejection::AlreadyAdded(_))) => {
                report.already_added.push(name.clone())
            }
            Err(PantryError::Rejected(_)) => report.rejected.push(name.clone()),
            Err(e) => {
                warn!("Error adding ingredient '{}': {}", name, e);
                report.failed.push(name.clone());
            }
        }
    }
    report
}

/// Check the file name, send the photo for recognition and add whatever
/// known ingredients come back.
pub async fn scan_image<S: KeyValueStore>(
    service: &dyn RecipeService,
    session: &Session<S>,
    image: UploadImage,
    allowed: &[Ingredient],
) -> Result<RecognitionReport, PantryError> {
    check_upload_name(Some(&image.file_name))?;
    session.require_user()?;
    let parts = service.recognize_ingredients(image).await?;
    let names = parse_recognized(&parts);
    info!("Recognized {} ingredient names", names.len());
    Ok(add_recognized(service, session, &names, allowed).await)
}
