use crate::config::{DEFAULT_THEME, NIGHT_THEME, THEME_KEY};
use crate::error::{AppError, Result};
use crate::storage::KeyValueStore;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Winter,
    Night,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Winter => DEFAULT_THEME,
            Theme::Night => NIGHT_THEME,
        }
    }

    pub fn from_name(name: &str) -> Self {
        if name == NIGHT_THEME {
            Theme::Night
        } else {
            Theme::Winter
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Winter => Theme::Night,
            Theme::Night => Theme::Winter,
        }
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match store.get(THEME_KEY) {
            Ok(Some(name)) => Self::from_name(&name),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Reading theme preference failed: {}", e);
                Theme::default()
            }
        }
    }

    pub fn persist<S: KeyValueStore + ?Sized>(self, store: &S) -> Result<()> {
        store.set(THEME_KEY, self.name())
    }

    /// Set `data-theme` on the document root.
    pub fn apply(self) -> Result<()> {
        let root = gloo_utils::document()
            .document_element()
            .ok_or_else(|| AppError::Browser("document has no root element".into()))?;
        root.set_attribute("data-theme", self.name())
            .map_err(AppError::browser)
    }
}
