//! Wire and storage payloads shared with the recipe service.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The service encodes absent lists as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    AfternoonSnack,
    Dessert,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::AfternoonSnack,
        MealType::Dessert,
    ];

    pub fn code(self) -> u8 {
        match self {
            MealType::Breakfast => 1,
            MealType::Lunch => 2,
            MealType::Dinner => 3,
            MealType::AfternoonSnack => 4,
            MealType::Dessert => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    /// Lower-case label as shown on recipe badges.
    pub fn label(self) -> &'static str {
        match self {
            MealType::Breakfast => "café da manhã",
            MealType::Lunch => "almoço",
            MealType::Dinner => "jantar",
            MealType::AfternoonSnack => "lanche da tarde",
            MealType::Dessert => "sobremesa",
        }
    }

    /// Case-insensitive lookup by label, as used by the meal type selector.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_lowercase();
        Self::ALL.into_iter().find(|m| m.label() == wanted)
    }
}

impl TryFrom<u8> for MealType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MealType::from_code(code).ok_or_else(|| format!("unknown meal type code {}", code))
    }
}

impl From<MealType> for u8 {
    fn from(meal: MealType) -> u8 {
        meal.code()
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "fácil" => Difficulty::Easy,
            "médio" => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub type_of: MealType,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub restriction: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub percentage: f64,
}

impl Recipe {
    pub fn difficulty_tier(&self) -> Difficulty {
        Difficulty::classify(&self.difficulty)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub restriction: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub liked_recipes: Vec<String>,
    #[serde(default)]
    pub premium: bool,
}

impl User {
    pub fn likes(&self, recipe_id: &str) -> bool {
        self.liked_recipes.iter().any(|id| id == recipe_id)
    }

    /// Case-insensitive pantry membership.
    pub fn has_ingredient(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.ingredients.iter().any(|i| i.to_lowercase() == wanted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
}

/// Envelope used by endpoints answering `{ "message": ..., "user": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    #[serde(default)]
    pub message: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikedRecipesResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub liked_recipes: Vec<Recipe>,
}

/// Image upload handed to the recognition endpoint.
#[derive(Debug, Clone)]
pub struct UploadImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
