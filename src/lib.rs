//! Browser client for the pantry recipe service.
//!
//! The library holds everything that does not touch the DOM directly so it
//! can be tested natively: the recipe query cache, the service client,
//! session persistence and the pantry/like synchronization routines. The
//! Yew front end in `main.rs` wires these into pages.

pub mod api;
pub mod browse;
pub mod cache;
pub mod config;
pub mod error;
pub mod logger;
pub mod model;
pub mod pantry;
pub mod session;
pub mod storage;
pub mod theme;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use api::{HttpRecipeService, RecipeService};
pub use cache::{QueryKey, RecipeCache, RecipeQuery};
pub use error::{AppError, Result};
pub use model::{Ingredient, MealType, Recipe, User};
pub use session::Session;
pub use storage::{BrowserStore, KeyValueStore, MemoryStore};
