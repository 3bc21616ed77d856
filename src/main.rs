//! Yew front end for the pantry recipe client.
//! Builds the shared services, routes between pages and owns the theme.

use hooks::{AppContext, Services};
use log::{error, info, LevelFilter};
use pages::{Configs, Dashboard, Ingredients, Liked, Login, Page, Register};
use pantry_recipes::theme::Theme;
use pantry_recipes::{logger, AppError, BrowserStore, HttpRecipeService, RecipeCache, Session};
use std::rc::Rc;
use yew::prelude::*;

mod components;
mod hooks;
mod pages;

use components::Navbar;

fn build_services() -> Result<Rc<Services>, AppError> {
    let store = BrowserStore::open()?;
    let api = HttpRecipeService::same_origin()?;
    Ok(Rc::new(Services {
        api: Rc::new(api),
        session: Session::new(store.clone()),
        cache: RecipeCache::with_defaults(store.clone()),
        store,
    }))
}

/// Apply the auth guard: no token means login, a token skips the auth forms.
fn guard(page: Page, authenticated: bool) -> Page {
    match (page.requires_auth(), authenticated) {
        (true, false) => Page::Login,
        (false, true) => Page::Dashboard,
        _ => page,
    }
}

fn current_path() -> String {
    gloo_utils::window()
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_string())
}

fn push_path(page: Page) {
    let pushed = gloo_utils::window()
        .history()
        .and_then(|h| h.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(page.path())));
    if let Err(e) = pushed {
        error!("Error updating history: {}", AppError::browser(e));
    }
}

#[derive(Properties)]
struct ShellProps {
    services: Rc<Services>,
}

impl PartialEq for ShellProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.services, &other.services)
    }
}

#[function_component(Shell)]
fn shell(props: &ShellProps) -> Html {
    let services = props.services.clone();
    let user = use_state(|| services.session.user());
    let theme = use_state(|| Theme::load(&services.store));
    let page = use_state(|| {
        guard(
            Page::from_path(&current_path()),
            services.session.is_authenticated(),
        )
    });

    {
        let theme = *theme;
        use_effect_with(theme, move |theme| {
            if let Err(e) = theme.apply() {
                error!("Error applying theme: {}", e);
            }
        });
    }
    // Keep the address bar in step with the page actually shown.
    use_effect_with(*page, |page| {
        if current_path() != page.path() {
            push_path(*page);
        }
    });

    let navigate = {
        let page = page.clone();
        let services = services.clone();
        Callback::from(move |target: Page| {
            page.set(guard(target, services.session.is_authenticated()));
        })
    };

    let on_toggle_theme = {
        let theme = theme.clone();
        let services = services.clone();
        Callback::from(move |_| {
            let next = theme.toggled();
            if let Err(e) = next.persist(&services.store) {
                error!("Error saving theme: {}", e);
            }
            theme.set(next);
        })
    };

    let on_logout = {
        let services = services.clone();
        let user = user.clone();
        let navigate = navigate.clone();
        Callback::from(move |_| {
            if let Err(e) = services.session.logout() {
                error!("Error logging out: {}", e);
            }
            info!("Logged out");
            user.set(None);
            navigate.emit(Page::Login);
        })
    };

    let context = AppContext {
        services: services.clone(),
        user: user.clone(),
        navigate: navigate.clone(),
    };

    let content = match *page {
        Page::Login => html! { <Login /> },
        Page::Register => html! { <Register /> },
        Page::Dashboard => html! { <Dashboard /> },
        Page::Ingredients => html! { <Ingredients /> },
        Page::Liked => html! { <Liked /> },
        Page::Configs => html! { <Configs /> },
    };

    html! {
        <ContextProvider<AppContext> context={context}>
            <div class="app-container">
                if page.requires_auth() {
                    <Navbar
                        user={(*user).clone()}
                        night={*theme == Theme::Night}
                        {on_toggle_theme}
                        on_navigate={navigate}
                        {on_logout}
                    />
                }
                <main class="content">{ content }</main>
            </div>
        </ContextProvider<AppContext>>
    }
}

/// Root component. Opens storage and the service client once.
#[function_component]
pub fn App() -> Html {
    let services = use_memo((), |_| build_services().map_err(|e| e.to_string()));

    match &*services {
        Ok(services) => html! { <Shell services={services.clone()} /> },
        Err(message) => {
            error!("Error starting up: {}", message);
            html! {
                <div class="startup-error">
                    <p>{ "Não foi possível iniciar o aplicativo." }</p>
                    <p class="text-sm">{ message.clone() }</p>
                </div>
            }
        }
    }
}

fn main() {
    console_error_panic_hook::set_once();
    logger::init(LevelFilter::Info);
    yew::Renderer::<App>::new().render();
}
