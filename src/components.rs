//! Pure Yew view components for the recipe pages.
//!
//! These render from props only; pages own the state and the service calls.

use crate::hooks::{Toast, ToastKind};
use crate::pages::Page;
use pantry_recipes::browse::{availability_label, format_description, preview_description, RecipeFilter};
use pantry_recipes::config::DESCRIPTION_PREVIEW_CHARS;
use pantry_recipes::model::Difficulty;
use pantry_recipes::pantry::capitalize;
use pantry_recipes::{MealType, Recipe, User};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// Label of the "no meal type filter" option.
pub const ALL_MEAL_TYPES: &str = "Todos os tipos de receitas";

#[derive(Properties, PartialEq)]
pub struct NavbarProps {
    pub user: Option<User>,
    pub night: bool,
    pub on_toggle_theme: Callback<()>,
    pub on_navigate: Callback<Page>,
    pub on_logout: Callback<()>,
}

#[function_component(Navbar)]
pub fn navbar(props: &NavbarProps) -> Html {
    let confirming = use_state(|| false);
    let link = |page: Page, label: &'static str| {
        let on_navigate = props.on_navigate.clone();
        html! {
            <li><a onclick={Callback::from(move |_| on_navigate.emit(page))}>{ label }</a></li>
        }
    };

    html! {
        <div class="navbar bg-base-100">
            <div class="navbar-start">
                <ul class="menu menu-horizontal">
                    { link(Page::Dashboard, "Receitas") }
                    { link(Page::Ingredients, "Ingredientes") }
                    { link(Page::Liked, "Favoritas") }
                    { link(Page::Configs, "Configurações") }
                </ul>
            </div>
            <div class="navbar-end">
                if props.user.as_ref().map(|u| u.premium).unwrap_or(false) {
                    <div class="badge text-neutral bg-yellow-400">{ "PRO" }</div>
                }
                <label class="swap swap-rotate">
                    <input type="checkbox"
                        class="theme-controller"
                        checked={props.night}
                        onclick={props.on_toggle_theme.reform(|_| ())}
                    />
                    { if props.night { "🌙" } else { "☀" } }
                </label>
                if *confirming {
                    <div class="logout-confirmation">
                        <span>{ "Deseja mesmo sair?" }</span>
                        <button class="btn btn-sm btn-secondary"
                            onclick={props.on_logout.reform(|_| ())}>{ "Sair" }</button>
                        <button class="btn btn-sm"
                            onclick={
                                let confirming = confirming.clone();
                                Callback::from(move |_| confirming.set(false))
                            }>{ "Cancelar" }</button>
                    </div>
                } else {
                    <button class="btn btn-ghost"
                        onclick={
                            let confirming = confirming.clone();
                            Callback::from(move |_| confirming.set(true))
                        }>{ "Sair" }</button>
                }
            </div>
        </div>
    }
}

/// Renders the current toast, if any.
pub fn render_toast(toast: &Toast) -> Html {
    match &toast.message {
        Some((kind, text)) => {
            let class = match kind {
                ToastKind::Info => "alert alert-info",
                ToastKind::Success => "alert alert-success",
                ToastKind::Error => "alert alert-error",
            };
            html! {
                <div class="toast toast-end">
                    <div class={class}><span>{ text.clone() }</span></div>
                </div>
            }
        }
        None => html! {},
    }
}

#[derive(Properties, PartialEq)]
pub struct RecipeToolbarProps {
    pub filter: RecipeFilter,
    pub on_change: Callback<RecipeFilter>,
}

/// Meal type selector and search box.
#[function_component(RecipeToolbar)]
pub fn recipe_toolbar(props: &RecipeToolbarProps) -> Html {
    let on_meal = {
        let filter = props.filter.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            on_change.emit(RecipeFilter {
                meal_type: MealType::from_label(&select.value()),
                ..filter.clone()
            });
        })
    };
    let on_search = {
        let filter = props.filter.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_change.emit(RecipeFilter {
                search: input.value(),
                ..filter.clone()
            });
        })
    };
    let selected = props.filter.meal_type;

    html! {
        <div class="flex">
            <select class="select select-secondary w-full max-w-xs mr-4" onchange={on_meal}>
                <option value={ALL_MEAL_TYPES} selected={selected.is_none()}>{ ALL_MEAL_TYPES }</option>
                { MealType::ALL.iter().map(|meal| html! {
                    <option value={meal.label()} selected={selected == Some(*meal)}>
                        { capitalize(meal.label()) }
                    </option>
                }).collect::<Html>() }
            </select>
            <input type="text"
                class="input input-secondary input-bordered"
                placeholder="Procurar"
                value={props.filter.search.clone()}
                oninput={on_search}
            />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RecipeCardProps {
    pub recipe: Recipe,
    pub liked: bool,
    pub available: usize,
    pub show_premium: bool,
    /// Emits `(recipe id, currently liked)`.
    pub on_toggle_like: Callback<(String, bool)>,
    pub on_open: Callback<Recipe>,
}

#[function_component(RecipeCard)]
pub fn recipe_card(props: &RecipeCardProps) -> Html {
    let recipe = &props.recipe;
    let difficulty_class = match recipe.difficulty_tier() {
        Difficulty::Easy => "badge badge-success mr-1",
        Difficulty::Medium => "badge badge-warning mr-1",
        Difficulty::Hard => "badge badge-error mr-1",
    };
    let needed = recipe.ingredients.len();
    let on_like = {
        let id = recipe.id.clone();
        let liked = props.liked;
        props.on_toggle_like.reform(move |_| (id.clone(), liked))
    };
    let on_open = {
        let recipe = recipe.clone();
        props.on_open.reform(move |_| recipe.clone())
    };

    html! {
        <div class="card card-side bg-base-200 shadow-xl">
            <figure class="w-96 h-full">
                <img class="h-full w-full object-cover" src={recipe.image.clone()} alt={recipe.name.clone()} />
            </figure>
            <div class="card-body">
                <div class="flex justify-between">
                    <h2 class="font-bold text-lg card-title">
                        { recipe.name.clone() }
                        if props.show_premium && recipe.premium {
                            <div class="badge text-neutral bg-yellow-400">{ "PRO" }</div>
                        }
                    </h2>
                    <div class="tooltip tooltip-secondary"
                        data-tip={format!(
                            "Nesta receita, você tem {} ingredientes necessários para fazer a receita, e precisa de {} para fazê-la.",
                            props.available, needed)}>
                        <button class="btn btn-sm btn-secondary">
                            { format!("{} de {}", props.available, needed) }
                        </button>
                    </div>
                </div>
                <div class="badge font-semibold badge-secondary mr-1">{ recipe.type_of.label() }</div>
                <p class="mt-2">{ preview_description(&recipe.description, DESCRIPTION_PREVIEW_CHARS) }</p>
                <div class="badges font-medium">
                    { recipe.restriction.iter().map(|r| html! {
                        <div class="badge badge-accent mr-1">{ r.clone() }</div>
                    }).collect::<Html>() }
                    <div class="badge badge-info mr-1">{ recipe.cuisine.clone() }</div>
                    <div class={difficulty_class}>{ recipe.difficulty.clone() }</div>
                </div>
                <div class="flex gap-1 justify-between mt-3">
                    <button class={classes!("btn", "btn-md", "btn-secondary", props.liked.then_some("bg-yellow-400"))}
                        onclick={on_like}>
                        { if props.liked { "★" } else { "☆" } }
                    </button>
                    <button class="btn btn-md btn-secondary" onclick={on_open}>{ "Ver receita" }</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RecipeListProps {
    pub recipes: Vec<Recipe>,
    pub filter: RecipeFilter,
    pub user: Option<User>,
    pub on_toggle_like: Callback<(String, bool)>,
    pub on_open: Callback<Recipe>,
}

/// Filtered grid with a count header.
#[function_component(RecipeList)]
pub fn recipe_list(props: &RecipeListProps) -> Html {
    let user = props.user.as_ref();
    let visible = props.filter.apply(&props.recipes);

    html! {
        <>
            <div class="recipe-count">
                <h2 class="text-2xl mt-5 font-bold">{ visible.len() }</h2>
                <p class="text-lg">{ availability_label(visible.len()) }</p>
            </div>
            <div class="grid grid-cols-2 gap-4 mt-4">
                { visible.into_iter().map(|recipe| html! {
                    <RecipeCard
                        key={recipe.id.clone()}
                        recipe={recipe.clone()}
                        liked={user.map(|u| u.likes(&recipe.id)).unwrap_or(false)}
                        available={pantry_recipes::browse::count_available(recipe, user)}
                        show_premium={user.is_some()}
                        on_toggle_like={props.on_toggle_like.clone()}
                        on_open={props.on_open.clone()}
                    />
                }).collect::<Html>() }
            </div>
        </>
    }
}

#[derive(Properties, PartialEq)]
pub struct RecipeModalProps {
    pub recipe: Option<Recipe>,
    pub on_close: Callback<()>,
}

#[function_component(RecipeModal)]
pub fn recipe_modal(props: &RecipeModalProps) -> Html {
    let Some(recipe) = &props.recipe else {
        return html! {};
    };
    html! {
        <div class="modal modal-open">
            <div class="modal-box">
                <img src={recipe.image.clone()} alt={recipe.name.clone()} />
                <h3 class="font-bold text-lg">{ recipe.name.clone() }</h3>
                <p class="py-4 whitespace-pre-line">{ format_description(&recipe.description) }</p>
                <div class="modal-action">
                    <button class="btn" onclick={props.on_close.reform(|_| ())}>{ "Fechar" }</button>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PantryListProps {
    pub ingredients: Vec<String>,
    pub on_remove: Callback<String>,
}

#[function_component(PantryList)]
pub fn pantry_list(props: &PantryListProps) -> Html {
    if props.ingredients.is_empty() {
        return html! { <p class="text-lg">{ "Nenhum ingrediente adicionado." }</p> };
    }
    html! {
        <ul class="pantry">
            { props.ingredients.iter().map(|name| {
                let remove = {
                    let name = name.clone();
                    props.on_remove.reform(move |_| name.clone())
                };
                html! {
                    <li key={name.clone()}>
                        <span>{ name.clone() }</span>
                        <button class="btn btn-xs btn-ghost" onclick={remove}>{ "✕" }</button>
                    </li>
                }
            }).collect::<Html>() }
        </ul>
    }
}
