//! Helpers for listing recipes: filtering, ordering and display text.

use crate::model::{MealType, Recipe, User};

/// Meal type and free-text filter from the recipe toolbar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// `None` shows every meal type.
    pub meal_type: Option<MealType>,
    pub search: String,
}

impl RecipeFilter {
    /// Search text must appear in the name or the description, ignoring case.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(meal) = self.meal_type {
            if recipe.type_of != meal {
                return false;
            }
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || recipe.name.to_lowercase().contains(&needle)
            || recipe.description.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Liked recipes first; otherwise the original order is kept.
pub fn sort_liked_first(recipes: &mut [Recipe], user: Option<&User>) {
    if let Some(user) = user {
        recipes.sort_by_key(|r| !user.likes(&r.id));
    }
}

/// How many of the recipe's ingredients are already in the pantry.
pub fn count_available(recipe: &Recipe, user: Option<&User>) -> usize {
    match user {
        Some(user) => recipe
            .ingredients
            .iter()
            .filter(|i| user.ingredients.contains(i))
            .count(),
        None => 0,
    }
}

/// Cut `text` to `max_chars` characters, appending "..." when shortened.
pub fn preview_description(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Recipe descriptions carry `<br>` line breaks.
pub fn format_description(text: &str) -> String {
    text.replace("<br>", "\n")
}

pub fn availability_label(count: usize) -> &'static str {
    if count == 1 {
        "receita disponível"
    } else {
        "receitas disponíveis"
    }
}
