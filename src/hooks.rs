use crate::pages::Page;
use gloo_timers::callback::Timeout;
use pantry_recipes::config::TOAST_DURATION_MS;
use pantry_recipes::{BrowserStore, RecipeCache, RecipeService, Session, User};
use std::rc::Rc;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Long-lived handles shared by every page.
pub struct Services {
    pub api: Rc<dyn RecipeService>,
    pub store: BrowserStore,
    pub session: Session<BrowserStore>,
    pub cache: RecipeCache<BrowserStore>,
}

/// Context handed down from `App`.
#[derive(Clone)]
pub struct AppContext {
    pub services: Rc<Services>,
    /// Logged-in user as last persisted. Pages set it from the value the
    /// pantry operations return.
    pub user: UseStateHandle<Option<User>>,
    pub navigate: Callback<Page>,
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.services, &other.services) && *self.user == *other.user
    }
}

#[hook]
pub fn use_app() -> AppContext {
    use_context::<AppContext>().expect("AppContext is provided by App")
}

/// State for a plain text input.
#[derive(Clone)]
pub struct TextInput {
    /// Current text content of the input.
    pub text: String,
    /// Callback for the input's `oninput` event.
    pub oninput: Callback<InputEvent>,
    /// Reset the text programmatically.
    pub set: Callback<String>,
}

#[hook]
pub fn use_text_input(initial: &str) -> TextInput {
    let text = use_state(|| initial.to_string());

    let oninput = {
        let text = text.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text.set(input.value());
        })
    };

    let set = {
        let text = text.clone();
        Callback::from(move |value: String| text.set(value))
    };

    TextInput {
        text: (*text).clone(),
        oninput,
        set,
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A notification that hides itself after a few seconds.
#[derive(Clone)]
pub struct Toast {
    pub message: Option<(ToastKind, String)>,
    pub show: Callback<(ToastKind, String)>,
}

#[hook]
pub fn use_toast() -> Toast {
    let message = use_state(|| None::<(ToastKind, String)>);
    // Replacing the handle drops (and cancels) the previous timer.
    let timer = use_mut_ref(|| None::<Timeout>);

    let show = {
        let message = message.clone();
        Callback::from(move |toast: (ToastKind, String)| {
            message.set(Some(toast));
            let hide = message.clone();
            *timer.borrow_mut() = Some(Timeout::new(TOAST_DURATION_MS, move || hide.set(None)));
        })
    };

    Toast {
        message: (*message).clone(),
        show,
    }
}
