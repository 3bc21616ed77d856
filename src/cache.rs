//! Bounded cache of recipe queries, persisted through a [`KeyValueStore`].
//!
//! Recipe lookups are keyed by the user's pantry, so moving between pages or
//! toggling back to a previous ingredient set does not hit the network again.
//!
//! # Storage layout
//! - `storedRequests`: JSON array of query keys, least recently used first
//! - `storedRecipes:<key>`: JSON array of the recipes kept for that key
//!
//! # Eviction
//! The recency list is capped at `capacity`. A hit moves its key to the back;
//! a miss appends it. Whatever falls off the front loses its entry too.

use crate::config::{MATCH_THRESHOLD, RECENT_REQUESTS_KEY, RECIPE_CACHE_CAPACITY, RECIPE_ENTRY_PREFIX};
use crate::error::Result;
use crate::model::{Recipe, User};
use crate::storage::{get_json, set_json, KeyValueStore};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// Cache key derived from an ingredient set and premium flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What gets sent to the recipe service.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecipeQuery {
    /// Pantry in the user's own order.
    pub ingredients: Vec<String>,
    pub premium: bool,
}

impl RecipeQuery {
    pub fn new<I, T>(ingredients: I, premium: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            premium,
        }
    }

    /// Anonymous visitors query with an empty, non-premium pantry.
    pub fn for_user(user: Option<&User>) -> Self {
        match user {
            Some(u) => Self::new(u.ingredients.iter().cloned(), u.premium),
            None => Self::default(),
        }
    }

    /// Sorted, comma-joined ingredients; premium queries get a `|premium` suffix.
    /// An empty non-premium pantry yields the empty key.
    pub fn key(&self) -> QueryKey {
        let mut sorted: Vec<&str> = self.ingredients.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let mut key = sorted.join(",");
        if self.premium {
            key.push_str("|premium");
        }
        QueryKey(key)
    }
}

/// Keep only recipes whose match percentage reaches `threshold`, in order.
pub fn retain_matches(recipes: Vec<Recipe>, threshold: f64) -> Vec<Recipe> {
    recipes
        .into_iter()
        .filter(|r| r.percentage >= threshold)
        .collect()
}

pub struct RecipeCache<S> {
    store: S,
    capacity: usize,
    threshold: f64,
}

impl<S: KeyValueStore> RecipeCache<S> {
    /// A capacity of zero is treated as one.
    pub fn new(store: S, capacity: usize, threshold: f64) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            threshold,
        }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, RECIPE_CACHE_CAPACITY, MATCH_THRESHOLD)
    }

    /// Cached keys, least recently used first.
    ///
    /// A queue that no longer decodes cannot say which entries it owned, so
    /// every stored entry goes with it.
    pub fn keys(&self) -> Vec<QueryKey> {
        let raw = match self.store.get(RECENT_REQUESTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Reading recency queue failed: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Recency queue is corrupt, dropping cached recipes: {}", e);
                if let Err(e) = self.purge_entries() {
                    warn!("Could not clear cached recipes: {}", e);
                }
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.keys().contains(key) && self.read_entry(key).is_some()
    }

    /// Return recipes for `query`, calling `fetch` only on a miss.
    ///
    /// A failed fetch leaves the cache untouched and is handed back to the
    /// caller. Storage write failures are logged; the fetched list is still
    /// returned.
    pub async fn get_recipes<F, Fut>(&self, query: &RecipeQuery, fetch: F) -> Result<Vec<Recipe>>
    where
        F: FnOnce(RecipeQuery) -> Fut,
        Fut: Future<Output = Result<Vec<Recipe>>>,
    {
        let key = query.key();
        if let Some(hit) = self.lookup(&key) {
            debug!("Recipe cache hit for '{}' ({} recipes)", key, hit.len());
            return Ok(hit);
        }

        debug!("Recipe cache miss for '{}'", key);
        let fetched = fetch(query.clone()).await?;
        let total = fetched.len();
        let kept = retain_matches(fetched, self.threshold);
        info!(
            "Fetched {} recipes for '{}', {} meet the {}% threshold",
            total,
            key,
            kept.len(),
            self.threshold
        );

        if let Err(e) = self.insert(&key, &kept) {
            warn!("Could not persist recipes for '{}': {}", key, e);
        }
        Ok(kept)
    }

    /// Read a stored entry and mark it most recently used. A key listed in
    /// the recency queue without an entry is dropped and reported as a miss.
    pub fn lookup(&self, key: &QueryKey) -> Option<Vec<Recipe>> {
        match self.read_entry(key) {
            Some(recipes) => {
                if let Err(e) = self.touch(key) {
                    warn!("Could not refresh recency of '{}': {}", key, e);
                }
                Some(recipes)
            }
            None => {
                let mut recent = self.keys();
                let before = recent.len();
                recent.retain(|k| k != key);
                if recent.len() != before {
                    debug!("Dropping dangling cache key '{}'", key);
                    if let Err(e) = set_json(&self.store, RECENT_REQUESTS_KEY, &recent) {
                        warn!("Could not rewrite recency queue: {}", e);
                    }
                }
                None
            }
        }
    }

    /// Evict before writing so a full store has room for the new entry. If
    /// the entry still does not fit, the queue is written without it.
    fn insert(&self, key: &QueryKey, recipes: &[Recipe]) -> Result<()> {
        let (mut recent, evicted) = self.promote(key);
        self.evict(&evicted)?;
        let stored = set_json(&self.store, &entry_key(key), recipes);
        if stored.is_err() {
            recent.retain(|k| k != key);
        }
        set_json(&self.store, RECENT_REQUESTS_KEY, &recent)?;
        stored
    }

    /// Move `key` to the back of the queue and evict overflow from the front.
    fn touch(&self, key: &QueryKey) -> Result<()> {
        let (recent, evicted) = self.promote(key);
        set_json(&self.store, RECENT_REQUESTS_KEY, &recent)?;
        self.evict(&evicted)
    }

    /// The queue with `key` at the back, and the keys pushed off the front.
    fn promote(&self, key: &QueryKey) -> (Vec<QueryKey>, Vec<QueryKey>) {
        let mut recent = self.keys();
        recent.retain(|k| k != key);
        recent.push(key.clone());
        let overflow = recent.len().saturating_sub(self.capacity);
        let evicted = recent.drain(..overflow).collect();
        (recent, evicted)
    }

    fn evict(&self, keys: &[QueryKey]) -> Result<()> {
        for old in keys {
            debug!("Evicting cached recipes for '{}'", old);
            self.store.remove(&entry_key(old))?;
        }
        Ok(())
    }

    fn purge_entries(&self) -> Result<()> {
        let prefix = format!("{}:", RECIPE_ENTRY_PREFIX);
        for key in self.store.keys()? {
            if key.starts_with(&prefix) {
                self.store.remove(&key)?;
            }
        }
        set_json(&self.store, RECENT_REQUESTS_KEY, &Vec::<QueryKey>::new())
    }

    fn read_entry(&self, key: &QueryKey) -> Option<Vec<Recipe>> {
        get_json(&self.store, &entry_key(key))
    }
}

fn entry_key(key: &QueryKey) -> String {
    format!("{}:{}", RECIPE_ENTRY_PREFIX, key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::model::MealType;
    use crate::storage::MemoryStore;
    use futures::executor::block_on;
    use std::cell::Cell;

    fn recipe(id: &str, percentage: f64) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: format!("Receita {}", id),
            description: String::new(),
            image: String::new(),
            type_of: MealType::Lunch,
            cuisine: "brasileira".into(),
            difficulty: "fácil".into(),
            restriction: vec![],
            ingredients: vec![],
            premium: false,
            percentage,
        }
    }

    fn ids(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.id.as_str()).collect()
    }

    /// Store that refuses new recipe entries past `limit`, like a full
    /// `localStorage`.
    #[derive(Clone)]
    struct QuotaStore {
        inner: MemoryStore,
        limit: usize,
    }

    impl QuotaStore {
        fn new(limit: usize) -> Self {
            Self {
                inner: MemoryStore::new(),
                limit,
            }
        }

        fn entries(&self) -> usize {
            self.inner
                .keys()
                .unwrap()
                .iter()
                .filter(|k| k.starts_with("storedRecipes:"))
                .count()
        }
    }

    impl KeyValueStore for QuotaStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let is_new_entry =
                key.starts_with("storedRecipes:") && self.inner.get(key)?.is_none();
            if is_new_entry && self.entries() >= self.limit {
                return Err(AppError::Storage("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> Result<Vec<String>> {
            self.inner.keys()
        }
    }

    /// Run a lookup whose fetch returns `response` and bumps `calls`.
    fn query<S: KeyValueStore>(
        cache: &RecipeCache<S>,
        q: &RecipeQuery,
        calls: &Cell<usize>,
        response: Vec<Recipe>,
    ) -> Result<Vec<Recipe>> {
        block_on(cache.get_recipes(q, |_| {
            calls.set(calls.get() + 1);
            async move { Ok(response) }
        }))
    }

    #[test]
    fn keeps_only_perfect_matches_and_serves_hits_from_storage() {
        let cache = RecipeCache::with_defaults(MemoryStore::new());
        let q = RecipeQuery::new(["Ovo", "Leite"], false);
        let calls = Cell::new(0);

        let first = query(&cache, &q, &calls, vec![recipe("1", 100.0), recipe("2", 80.0)]).unwrap();
        assert_eq!(ids(&first), ["1"]);

        let second = query(&cache, &q, &calls, vec![recipe("9", 100.0)]).unwrap();
        assert_eq!(ids(&second), ["1"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn oldest_key_is_evicted_past_capacity() {
        let cache = RecipeCache::new(MemoryStore::new(), 5, MATCH_THRESHOLD);
        let calls = Cell::new(0);
        let sets: Vec<RecipeQuery> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|i| RecipeQuery::new([*i], false))
            .collect();

        for q in &sets {
            query(&cache, q, &calls, vec![recipe("1", 100.0)]).unwrap();
        }
        assert_eq!(calls.get(), 6);
        assert_eq!(cache.len(), 5);
        assert!(!cache.contains(&sets[0].key()));

        // F is still cached.
        query(&cache, &sets[5], &calls, vec![]).unwrap();
        assert_eq!(calls.get(), 6);

        // A has to be fetched again.
        query(&cache, &sets[0], &calls, vec![]).unwrap();
        assert_eq!(calls.get(), 7);
    }

    #[test]
    fn hits_refresh_recency() {
        let cache = RecipeCache::new(MemoryStore::new(), 2, MATCH_THRESHOLD);
        let calls = Cell::new(0);
        let a = RecipeQuery::new(["A"], false);
        let b = RecipeQuery::new(["B"], false);
        let c = RecipeQuery::new(["C"], false);

        query(&cache, &a, &calls, vec![]).unwrap();
        query(&cache, &b, &calls, vec![]).unwrap();
        query(&cache, &a, &calls, vec![]).unwrap();
        query(&cache, &c, &calls, vec![]).unwrap();

        assert_eq!(calls.get(), 3);
        assert!(cache.contains(&a.key()));
        assert!(!cache.contains(&b.key()));
        assert_eq!(cache.keys(), vec![a.key(), c.key()]);
    }

    #[test]
    fn failed_fetch_leaves_cache_untouched() {
        let store = MemoryStore::new();
        let cache = RecipeCache::with_defaults(store.clone());
        let q = RecipeQuery::new(["Ovo"], false);

        let result = block_on(cache.get_recipes(&q, |_| async {
            Err(AppError::UnexpectedShape("expected an array".into()))
        }));
        assert!(result.is_err());
        assert!(cache.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn eviction_removes_stored_entry() {
        let store = MemoryStore::new();
        let cache = RecipeCache::new(store.clone(), 1, MATCH_THRESHOLD);
        let calls = Cell::new(0);
        let a = RecipeQuery::new(["A"], false);
        let b = RecipeQuery::new(["B"], false);

        query(&cache, &a, &calls, vec![recipe("1", 100.0)]).unwrap();
        query(&cache, &b, &calls, vec![recipe("2", 100.0)]).unwrap();

        assert_eq!(store.get("storedRecipes:A").unwrap(), None);
        assert!(store.get("storedRecipes:B").unwrap().is_some());
    }

    #[test]
    fn dangling_key_is_treated_as_miss() {
        let store = MemoryStore::new();
        let cache = RecipeCache::with_defaults(store.clone());
        let calls = Cell::new(0);
        let q = RecipeQuery::new(["Ovo"], false);
        query(&cache, &q, &calls, vec![recipe("1", 100.0)]).unwrap();

        store.remove("storedRecipes:Ovo").unwrap();
        assert!(!cache.contains(&q.key()));

        let again = query(&cache, &q, &calls, vec![recipe("2", 100.0)]).unwrap();
        assert_eq!(ids(&again), ["2"]);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.keys(), vec![q.key()]);
    }

    #[test]
    fn key_ignores_pantry_order_but_not_premium() {
        let a = RecipeQuery::new(["Ovo", "Leite"], false);
        let b = RecipeQuery::new(["Leite", "Ovo"], false);
        let premium = RecipeQuery::new(["Ovo", "Leite"], true);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key().as_str(), "Leite,Ovo");
        assert_ne!(a.key(), premium.key());
        assert_eq!(RecipeQuery::for_user(None).key().as_str(), "");
    }

    #[test]
    fn empty_pantry_is_a_valid_key() {
        let cache = RecipeCache::with_defaults(MemoryStore::new());
        let calls = Cell::new(0);
        let q = RecipeQuery::default();
        query(&cache, &q, &calls, vec![]).unwrap();
        query(&cache, &q, &calls, vec![]).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn service_failure_degrades_to_retry_later() {
        use crate::api::RecipeService;
        use crate::test_support::FakeService;

        let cache = RecipeCache::with_defaults(MemoryStore::new());
        let service = FakeService::with_user("ana@exemplo.com", &["Ovo"]);
        service.serve_recipes(vec![recipe("1", 100.0), recipe("2", 50.0)]);
        let q = RecipeQuery::for_user(Some(&service.user()));

        service.fail_next("recipes_by_ingredients");
        let svc = &service;
        let first = block_on(cache.get_recipes(&q, |q| async move {
            svc.recipes_by_ingredients(&q).await
        }));
        assert!(first.is_err());

        let second = block_on(cache.get_recipes(&q, |q| async move {
            svc.recipes_by_ingredients(&q).await
        }))
        .unwrap();
        assert_eq!(ids(&second), ["1"]);
        assert_eq!(service.calls("recipes_by_ingredients"), 2);
    }

    #[test]
    fn full_store_still_makes_room_for_new_keys() {
        let store = QuotaStore::new(2);
        let cache = RecipeCache::new(store.clone(), 2, MATCH_THRESHOLD);
        let calls = Cell::new(0);
        let keys: Vec<RecipeQuery> = ["A", "B", "C", "D"]
            .iter()
            .map(|i| RecipeQuery::new([*i], false))
            .collect();

        for q in &keys {
            query(&cache, q, &calls, vec![recipe("1", 100.0)]).unwrap();
        }
        assert_eq!(cache.keys(), vec![keys[2].key(), keys[3].key()]);
        assert_eq!(store.entries(), 2);

        query(&cache, &keys[3], &calls, vec![]).unwrap();
        assert_eq!(calls.get(), 4);
        query(&cache, &keys[0], &calls, vec![recipe("1", 100.0)]).unwrap();
        assert_eq!(calls.get(), 5);
    }

    #[test]
    fn write_failure_still_returns_fetched_recipes() {
        let cache = RecipeCache::with_defaults(QuotaStore::new(0));
        let calls = Cell::new(0);
        let q = RecipeQuery::new(["Ovo"], false);

        let first = query(&cache, &q, &calls, vec![recipe("1", 100.0), recipe("2", 10.0)]).unwrap();
        assert_eq!(ids(&first), ["1"]);
        assert!(cache.is_empty());

        query(&cache, &q, &calls, vec![recipe("1", 100.0)]).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn corrupt_queue_drops_the_entries_it_tracked() {
        let store = MemoryStore::new();
        let cache = RecipeCache::new(store.clone(), 2, MATCH_THRESHOLD);
        let calls = Cell::new(0);
        for i in ["A", "B"] {
            query(&cache, &RecipeQuery::new([i], false), &calls, vec![]).unwrap();
        }
        store.set("storedRequests", "garbage").unwrap();
        store.set("theme", "night").unwrap();

        for i in ["C", "D", "E"] {
            query(&cache, &RecipeQuery::new([i], false), &calls, vec![]).unwrap();
        }
        assert_eq!(cache.len(), 2);
        assert_eq!(store.get("storedRecipes:A").unwrap(), None);
        assert_eq!(store.get("storedRecipes:B").unwrap(), None);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("night"));
        // queue, two entries, theme
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn filtering_is_idempotent() {
        let input = vec![recipe("1", 100.0), recipe("2", 99.9), recipe("3", 120.0)];
        let once = retain_matches(input, MATCH_THRESHOLD);
        let twice = retain_matches(once.clone(), MATCH_THRESHOLD);
        assert_eq!(ids(&once), ["1", "3"]);
        assert_eq!(once, twice);
    }
}
