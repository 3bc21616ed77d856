//! Bearer token and the locally persisted copy of the logged-in user.

use crate::api::RecipeService;
use crate::config::{ALLOWED_INGREDIENTS_KEY, TOKEN_KEY, USER_KEY};
use crate::error::{AppError, Result};
use crate::model::{Credentials, Ingredient, User};
use crate::storage::{get_json, set_json, KeyValueStore};
use log::{info, warn};

#[derive(Clone, Debug)]
pub struct Session<S> {
    store: S,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Reading session token failed: {}", e);
                None
            }
        }
    }

    /// Only the presence of a token is checked.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn user(&self) -> Option<User> {
        get_json(&self.store, USER_KEY)
    }

    /// The logged-in user, or `NotLoggedIn`.
    pub fn require_user(&self) -> Result<User> {
        self.user().ok_or(AppError::NotLoggedIn)
    }

    pub fn save_user(&self, user: &User) -> Result<()> {
        set_json(&self.store, USER_KEY, user)
    }

    /// Log in and persist token and user. The service does not always issue
    /// a token; the email then stands in for it so presence checks pass.
    pub async fn login(&self, service: &dyn RecipeService, credentials: &Credentials) -> Result<User> {
        let response = service.login(credentials).await?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| response.user.email.clone());
        self.store.set(TOKEN_KEY, &token)?;
        self.save_user(&response.user)?;
        info!("Logged in as {}", response.user.email);
        Ok(response.user)
    }

    /// Forget token and user. Cached recipes and theme stay.
    pub fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        info!("Logged out");
        Ok(())
    }

    /// Ingredient catalogue, fetched once and then served from storage.
    /// Fetch failures degrade to an empty catalogue.
    pub async fn allowed_ingredients(&self, service: &dyn RecipeService) -> Vec<Ingredient> {
        if let Some(stored) = get_json::<Vec<Ingredient>, _>(&self.store, ALLOWED_INGREDIENTS_KEY) {
            return stored;
        }
        match service.allowed_ingredients().await {
            Ok(list) => {
                if let Err(e) = set_json(&self.store, ALLOWED_INGREDIENTS_KEY, &list) {
                    warn!("Could not store ingredient catalogue: {}", e);
                }
                list
            }
            Err(e) => {
                warn!("Error fetching allowed ingredients: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::FakeService;
    use futures::executor::block_on;

    fn credentials() -> Credentials {
        Credentials {
            email: "ana@exemplo.com".into(),
            password: "segredo".into(),
        }
    }

    #[test]
    fn login_persists_token_and_user() {
        let session = Session::new(MemoryStore::new());
        let service = FakeService::with_user("ana@exemplo.com", &["Ovo"]);
        service.issue_token(Some("abc"));

        let user = block_on(session.login(&service, &credentials())).unwrap();
        assert_eq!(user.ingredients, vec!["Ovo".to_string()]);
        assert_eq!(session.token().as_deref(), Some("abc"));
        assert_eq!(session.user(), Some(user));
    }

    #[test]
    fn missing_token_falls_back_to_email() {
        let session = Session::new(MemoryStore::new());
        let service = FakeService::with_user("ana@exemplo.com", &[]);
        block_on(session.login(&service, &credentials())).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().as_deref(), Some("ana@exemplo.com"));
    }

    #[test]
    fn failed_login_stores_nothing() {
        let store = MemoryStore::new();
        let session = Session::new(store.clone());
        let service = FakeService::with_user("ana@exemplo.com", &[]);
        service.fail_next("login");
        assert!(block_on(session.login(&service, &credentials())).is_err());
        assert!(store.is_empty());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn logout_keeps_other_keys() {
        let store = MemoryStore::new();
        let session = Session::new(store.clone());
        store.set("token", "abc").unwrap();
        store.set("theme", "night").unwrap();
        session.save_user(&User::default()).unwrap();

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("night"));
    }

    #[test]
    fn empty_token_is_not_a_session() {
        let store = MemoryStore::new();
        store.set("token", "").unwrap();
        assert!(!Session::new(store).is_authenticated());
    }

    #[test]
    fn ingredient_catalogue_is_fetched_once() {
        let session = Session::new(MemoryStore::new());
        let service = FakeService::with_user("ana@exemplo.com", &[]);
        let first = block_on(session.allowed_ingredients(&service));
        let second = block_on(session.allowed_ingredients(&service));
        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert_eq!(service.calls("allowed_ingredients"), 1);
    }

    #[test]
    fn catalogue_failure_is_empty_and_not_stored() {
        let store = MemoryStore::new();
        let session = Session::new(store.clone());
        let service = FakeService::with_user("ana@exemplo.com", &[]);
        service.fail_next("allowed_ingredients");
        assert!(block_on(session.allowed_ingredients(&service)).is_empty());
        assert_eq!(store.get("allowedIngredients").unwrap(), None);
    }
}
