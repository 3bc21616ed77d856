//! Application-level configuration constants.

// Remote service
pub const API_PREFIX: &str = "/api/v1";

// Persistent storage keys
pub const RECENT_REQUESTS_KEY: &str = "storedRequests";
pub const RECIPE_ENTRY_PREFIX: &str = "storedRecipes";
pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const THEME_KEY: &str = "theme";
pub const ALLOWED_INGREDIENTS_KEY: &str = "allowedIngredients";

// Recipe query cache
pub const RECIPE_CACHE_CAPACITY: usize = 15;
/// Minimum match percentage a recipe needs to be kept.
pub const MATCH_THRESHOLD: f64 = 100.0;

// UI behavior
pub const TOAST_DURATION_MS: u32 = 5_000;
pub const DESCRIPTION_PREVIEW_CHARS: usize = 115;
pub const UPLOAD_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];
pub const DEFAULT_PANTRY: [&str; 1] = ["Alface"];

// Themes
pub const DEFAULT_THEME: &str = "winter";
pub const NIGHT_THEME: &str = "night";
