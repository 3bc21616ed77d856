//! Page components. Each page owns its view state and calls into the
//! library for anything that talks to the service or to storage.

use crate::components::{
    render_toast, PantryList, RecipeList, RecipeModal, RecipeToolbar,
};
use crate::hooks::{use_app, use_text_input, use_toast, AppContext, Toast, ToastKind};
use log::{error, warn};
use pantry_recipes::browse::{sort_liked_first, RecipeFilter};
use pantry_recipes::model::UploadImage;
use pantry_recipes::pantry::{
    self, check_upload_name, IngredientRejection, PantryError, RecognitionReport, UploadRejection,
};
use pantry_recipes::validation::{validate_credentials, validate_registration};
use pantry_recipes::{AppError, Ingredient, Recipe, RecipeQuery};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{File, HtmlInputElement};
use yew::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Dashboard,
    Ingredients,
    Liked,
    Configs,
}

impl Page {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Page::Login,
            "/register" => Page::Register,
            "/dashboard/add" => Page::Ingredients,
            "/dashboard/liked" => Page::Liked,
            "/dashboard/config" => Page::Configs,
            _ => Page::Dashboard,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Page::Login => "/login",
            Page::Register => "/register",
            Page::Dashboard => "/dashboard",
            Page::Ingredients => "/dashboard/add",
            Page::Liked => "/dashboard/liked",
            Page::Configs => "/dashboard/config",
        }
    }

    /// Pages behind the token check.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Page::Login | Page::Register)
    }
}

fn show_error(toast: &Toast, message: impl Into<String>) {
    toast.show.emit((ToastKind::Error, message.into()));
}

/// Toast for a failed pantry addition.
fn report_pantry_error(toast: &Toast, err: PantryError) {
    match err {
        PantryError::Rejected(IngredientRejection::Blank) => {}
        PantryError::Rejected(IngredientRejection::AlreadyAdded(name)) => toast
            .show
            .emit((ToastKind::Info, format!("{} já foi adicionado", name))),
        PantryError::Rejected(IngredientRejection::NotAllowed(name)) => {
            error!("Error: Ingredient not allowed: {}", name);
            show_error(toast, format!("{} não é um ingrediente permitido", name));
        }
        PantryError::Upload(UploadRejection::Missing) => {
            show_error(toast, "Selecione uma imagem primeiro")
        }
        PantryError::Upload(UploadRejection::UnsupportedFormat(ext)) => {
            show_error(toast, format!("Formato .{} não suportado, use JPG", ext))
        }
        PantryError::App(e) => {
            error!("Error updating pantry: {}", e);
            show_error(toast, "Não foi possível atualizar os ingredientes");
        }
    }
}

fn summarize(report: &RecognitionReport) -> String {
    if report.is_empty() {
        return "Nenhum ingrediente reconhecido".to_string();
    }
    let mut lines = Vec::new();
    if !report.added.is_empty() {
        lines.push(format!("Adicionados: {}", report.added.join(", ")));
    }
    if !report.already_added.is_empty() {
        lines.push(format!("Já adicionados: {}", report.already_added.join(", ")));
    }
    if !report.rejected.is_empty() {
        lines.push(format!("Não permitidos: {}", report.rejected.join(", ")));
    }
    if !report.failed.is_empty() {
        lines.push(format!("Falharam: {}", report.failed.join(", ")));
    }
    lines.join(" · ")
}

async fn read_upload(file: File) -> Result<UploadImage, AppError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(AppError::browser)?;
    Ok(UploadImage {
        file_name: file.name(),
        bytes: js_sys::Uint8Array::new(&buffer).to_vec(),
    })
}

/// Ingredient catalogue, loaded once per mount.
#[hook]
fn use_allowed_ingredients(ctx: &AppContext) -> UseStateHandle<Vec<Ingredient>> {
    let allowed = use_state(Vec::<Ingredient>::new);
    {
        let allowed = allowed.clone();
        let services = ctx.services.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let list = services
                    .session
                    .allowed_ingredients(services.api.as_ref())
                    .await;
                allowed.set(list);
            });
        });
    }
    allowed
}

/// Like/unlike handler that writes the new liked set back into the user.
/// `on_done` gets the same `(id, was liked)` pair once the service agreed.
fn toggle_like_callback(
    ctx: &AppContext,
    toast: &Toast,
    on_done: Option<Callback<(String, bool)>>,
) -> Callback<(String, bool)> {
    let services = ctx.services.clone();
    let user = ctx.user.clone();
    let toast = toast.clone();
    Callback::from(move |(recipe_id, liked): (String, bool)| {
        let services = services.clone();
        let user = user.clone();
        let toast = toast.clone();
        let on_done = on_done.clone();
        spawn_local(async move {
            match pantry::toggle_like(services.api.as_ref(), &services.session, &recipe_id, liked)
                .await
            {
                Ok(_) => {
                    // The session copy also carries pantry edits that landed
                    // while the request was in flight.
                    user.set(services.session.user());
                    if let Some(on_done) = on_done {
                        on_done.emit((recipe_id, liked));
                    }
                }
                Err(e) => {
                    error!("Error toggling like on {}: {}", recipe_id, e);
                    show_error(&toast, "Não foi possível atualizar as favoritas");
                }
            }
        });
    })
}

#[derive(Properties, PartialEq)]
pub struct PantryPanelProps {
    pub allowed: Vec<Ingredient>,
}

/// Pantry list, manual add box and photo upload.
#[function_component(PantryPanel)]
pub fn pantry_panel(props: &PantryPanelProps) -> Html {
    let ctx = use_app();
    let toast = use_toast();
    let new_ingredient = use_text_input("");
    let selected_file = use_state(|| None::<File>);
    let uploading = use_state(|| false);

    let on_add = {
        let services = ctx.services.clone();
        let user = ctx.user.clone();
        let toast = toast.clone();
        let allowed = props.allowed.clone();
        let candidate = new_ingredient.text.clone();
        let reset = new_ingredient.set.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let services = services.clone();
            let user = user.clone();
            let toast = toast.clone();
            let allowed = allowed.clone();
            let candidate = candidate.clone();
            reset.emit(String::new());
            spawn_local(async move {
                match pantry::add_ingredient(
                    services.api.as_ref(),
                    &services.session,
                    &candidate,
                    &allowed,
                )
                .await
                {
                    Ok(updated) => user.set(Some(updated)),
                    Err(e) => report_pantry_error(&toast, e),
                }
            });
        })
    };

    let on_remove = {
        let services = ctx.services.clone();
        let user = ctx.user.clone();
        let toast = toast.clone();
        Callback::from(move |name: String| {
            let services = services.clone();
            let user = user.clone();
            let toast = toast.clone();
            spawn_local(async move {
                match pantry::remove_ingredient(services.api.as_ref(), &services.session, &name)
                    .await
                {
                    Ok(updated) => user.set(Some(updated)),
                    Err(e) => {
                        error!("Error removing ingredient: {}", e);
                        show_error(&toast, "Não foi possível remover o ingrediente");
                    }
                }
            });
        })
    };

    let on_file = {
        let selected_file = selected_file.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            selected_file.set(input.files().and_then(|files| files.get(0)));
        })
    };

    let on_upload = {
        let services = ctx.services.clone();
        let user = ctx.user.clone();
        let toast = toast.clone();
        let allowed = props.allowed.clone();
        let selected_file = selected_file.clone();
        let uploading = uploading.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let file = (*selected_file).clone();
            let name = file.as_ref().map(|f| f.name());
            if let Err(rejection) = check_upload_name(name.as_deref()) {
                report_pantry_error(&toast, rejection.into());
                return;
            }
            let Some(file) = file else { return };
            let services = services.clone();
            let user = user.clone();
            let toast = toast.clone();
            let allowed = allowed.clone();
            let uploading = uploading.clone();
            uploading.set(true);
            spawn_local(async move {
                let outcome = match read_upload(file).await {
                    Ok(image) => {
                        pantry::scan_image(
                            services.api.as_ref(),
                            &services.session,
                            image,
                            &allowed,
                        )
                        .await
                    }
                    Err(e) => Err(e.into()),
                };
                match outcome {
                    Ok(report) => {
                        toast.show.emit((ToastKind::Success, summarize(&report)));
                        user.set(services.session.user());
                    }
                    Err(e) => report_pantry_error(&toast, e),
                }
                uploading.set(false);
            });
        })
    };

    let ingredients = (*ctx.user)
        .as_ref()
        .map(|u| u.ingredients.clone())
        .unwrap_or_default();

    html! {
        <div class="pantry-panel">
            <h1 class="flex-grow text-2xl mb-2 font-bold">{ "Ingredientes" }</h1>
            <PantryList {ingredients} {on_remove} />
            <form class="flex mt-2" onsubmit={on_add}>
                <input type="text"
                    class="input input-bordered w-full"
                    list="allowed-ingredients"
                    placeholder="Adicionar ingrediente"
                    value={new_ingredient.text.clone()}
                    oninput={new_ingredient.oninput.clone()}
                />
                <datalist id="allowed-ingredients">
                    { props.allowed.iter().map(|i| html! { <option value={i.name.clone()} /> }).collect::<Html>() }
                </datalist>
                <button type="submit" class="btn btn-secondary ml-2">{ "Adicionar" }</button>
            </form>
            <form class="w-full mt-4" onsubmit={on_upload}>
                <label class="upload-dropzone">
                    if let Some(file) = &*selected_file {
                        <p class="text-sm font-semibold">{ "Arquivo selecionado:" }</p>
                        <p class="text-sm">{ file.name() }</p>
                    } else {
                        <p class="text-sm"><span class="font-semibold">{ "Clique para enviar" }</span>{ " uma foto (JPG)" }</p>
                    }
                    <input type="file" name="image" class="hidden" accept=".jpg,.jpeg" onchange={on_file} />
                </label>
                <button type="submit" class="btn btn-secondary w-full mt-2" disabled={*uploading}>
                    { if *uploading { "Analisando..." } else { "Reconhecer ingredientes" } }
                </button>
            </form>
            { render_toast(&toast) }
        </div>
    }
}

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let ctx = use_app();
    let toast = use_toast();
    let allowed = use_allowed_ingredients(&ctx);
    let recipes = use_state(Vec::<Recipe>::new);
    let loading = use_state(|| true);
    let filter = use_state(RecipeFilter::default);
    let modal = use_state(|| None::<Recipe>);

    // Reload whenever the pantry or premium status changes.
    {
        let query = RecipeQuery::for_user((*ctx.user).as_ref());
        let services = ctx.services.clone();
        let recipes = recipes.clone();
        let loading = loading.clone();
        use_effect_with(query, move |query| {
            let query = query.clone();
            loading.set(true);
            spawn_local(async move {
                let api = services.api.clone();
                let result = services
                    .cache
                    .get_recipes(&query, |q| async move { api.recipes_by_ingredients(&q).await })
                    .await;
                match result {
                    Ok(list) => recipes.set(list),
                    Err(e) => {
                        error!("Error fetching recipes: {}", e);
                        recipes.set(Vec::new());
                    }
                }
                loading.set(false);
            });
        });
    }

    let mut sorted = (*recipes).clone();
    sort_liked_first(&mut sorted, (*ctx.user).as_ref());

    let on_filter = {
        let filter = filter.clone();
        Callback::from(move |f: RecipeFilter| filter.set(f))
    };
    let on_open = {
        let modal = modal.clone();
        Callback::from(move |r: Recipe| modal.set(Some(r)))
    };
    let on_close = {
        let modal = modal.clone();
        Callback::from(move |_| modal.set(None))
    };
    let on_add_page = ctx.navigate.reform(|_: MouseEvent| Page::Ingredients);

    html! {
        <div class="dashboard">
            <div class="recipes-area">
                <div class="flex">
                    <h1 class="flex-grow text-2xl font-bold">{ "Receitas" }</h1>
                    <RecipeToolbar filter={(*filter).clone()} on_change={on_filter} />
                </div>
                if *loading {
                    <span class="loading loading-dots loading-lg"></span>
                } else if sorted.is_empty() {
                    <p class="text-2xl font-semibold">
                        { "Nenhuma receita aqui ainda. Comece " }
                        <a class="underline text-secondary" onclick={on_add_page}>{ "adicionando novos ingredientes" }</a>
                        { "." }
                    </p>
                } else {
                    <RecipeList
                        recipes={sorted}
                        filter={(*filter).clone()}
                        user={(*ctx.user).clone()}
                        on_toggle_like={toggle_like_callback(&ctx, &toast, None)}
                        {on_open}
                    />
                }
            </div>
            <PantryPanel allowed={(*allowed).clone()} />
            <RecipeModal recipe={(*modal).clone()} {on_close} />
            { render_toast(&toast) }
        </div>
    }
}

#[function_component(Ingredients)]
pub fn ingredients() -> Html {
    let ctx = use_app();
    let allowed = use_allowed_ingredients(&ctx);
    html! {
        <div class="ingredients-page">
            <PantryPanel allowed={(*allowed).clone()} />
        </div>
    }
}

#[function_component(Liked)]
pub fn liked() -> Html {
    let ctx = use_app();
    let toast = use_toast();
    let recipes = use_state(Vec::<Recipe>::new);
    let loading = use_state(|| true);
    let filter = use_state(RecipeFilter::default);
    let modal = use_state(|| None::<Recipe>);

    {
        let email = (*ctx.user).as_ref().map(|u| u.email.clone());
        let services = ctx.services.clone();
        let recipes = recipes.clone();
        let loading = loading.clone();
        use_effect_with(email, move |email| {
            let email = email.clone();
            spawn_local(async move {
                if let Some(email) = email {
                    match services.api.liked_recipes(&email).await {
                        Ok(list) => recipes.set(list),
                        Err(e) => error!("Error fetching recipes: {}", e),
                    }
                }
                loading.set(false);
            });
        });
    }

    // Unliked recipes leave the list right away.
    let on_unliked = {
        let recipes = recipes.clone();
        Callback::from(move |(id, was_liked): (String, bool)| {
            if was_liked {
                let remaining: Vec<Recipe> =
                    recipes.iter().filter(|r| r.id != id).cloned().collect();
                recipes.set(remaining);
            }
        })
    };
    let visible = (*recipes).clone();

    let on_filter = {
        let filter = filter.clone();
        Callback::from(move |f: RecipeFilter| filter.set(f))
    };
    let on_open = {
        let modal = modal.clone();
        Callback::from(move |r: Recipe| modal.set(Some(r)))
    };
    let on_close = {
        let modal = modal.clone();
        Callback::from(move |_| modal.set(None))
    };

    html! {
        <div class="liked-page">
            <div class="flex">
                <h1 class="flex-grow text-2xl font-bold">{ "Receitas favoritas" }</h1>
                <RecipeToolbar filter={(*filter).clone()} on_change={on_filter} />
            </div>
            if *loading {
                <span class="loading loading-dots loading-lg"></span>
            } else if visible.is_empty() {
                <p class="text-2xl font-semibold">{ "Nenhuma receita favorita ainda." }</p>
            } else {
                <RecipeList
                    recipes={visible}
                    filter={(*filter).clone()}
                    user={(*ctx.user).clone()}
                    on_toggle_like={toggle_like_callback(&ctx, &toast, Some(on_unliked))}
                    {on_open}
                />
            }
            <RecipeModal recipe={(*modal).clone()} {on_close} />
            { render_toast(&toast) }
        </div>
    }
}

#[function_component(Configs)]
pub fn configs() -> Html {
    let ctx = use_app();
    let toast = use_toast();
    let busy = use_state(|| false);
    let premium = (*ctx.user).as_ref().map(|u| u.premium).unwrap_or(false);

    let on_upgrade = {
        let services = ctx.services.clone();
        let user = ctx.user.clone();
        let toast = toast.clone();
        let busy = busy.clone();
        Callback::from(move |_| {
            let services = services.clone();
            let user = user.clone();
            let toast = toast.clone();
            let busy = busy.clone();
            busy.set(true);
            spawn_local(async move {
                match pantry::upgrade_to_premium(services.api.as_ref(), &services.session).await {
                    Ok(updated) => {
                        user.set(Some(updated));
                        toast.show.emit((ToastKind::Success, "Agora você é PRO!".into()));
                    }
                    Err(e) => {
                        error!("Error upgrading account: {}", e);
                        show_error(&toast, "Não foi possível atualizar a conta");
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_clear = {
        let services = ctx.services.clone();
        let user = ctx.user.clone();
        let toast = toast.clone();
        Callback::from(move |_| {
            let services = services.clone();
            let user = user.clone();
            let toast = toast.clone();
            spawn_local(async move {
                match pantry::clear_ingredients(services.api.as_ref(), &services.session).await {
                    Ok(updated) => user.set(Some(updated)),
                    Err(e) => {
                        error!("Error clearing pantry: {}", e);
                        show_error(&toast, "Não foi possível limpar os ingredientes");
                    }
                }
            });
        })
    };

    html! {
        <div class="configs-page">
            <h1 class="text-2xl font-bold">{ "Configurações de usuário" }</h1>
            <div class="mt-6">
                if premium {
                    <div class="badge text-neutral bg-yellow-400">{ "PRO" }</div>
                } else {
                    <button class="btn btn-secondary" disabled={*busy} onclick={on_upgrade}>
                        { "Tornar-se PRO" }
                    </button>
                }
            </div>
            <div class="mt-6">
                <button class="btn btn-error" onclick={on_clear}>{ "Remover todos os ingredientes" }</button>
            </div>
            { render_toast(&toast) }
        </div>
    }
}

#[function_component(Login)]
pub fn login() -> Html {
    let ctx = use_app();
    let email = use_text_input("");
    let password = use_text_input("");
    let form_error = use_state(|| None::<String>);

    let on_submit = {
        let services = ctx.services.clone();
        let user = ctx.user.clone();
        let navigate = ctx.navigate.clone();
        let form_error = form_error.clone();
        let email = email.text.clone();
        let password = password.text.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let credentials = match validate_credentials(&email, &password) {
                Ok(c) => c,
                Err(err) => {
                    form_error.set(Some(err.to_string()));
                    return;
                }
            };
            let services = services.clone();
            let user = user.clone();
            let navigate = navigate.clone();
            let form_error = form_error.clone();
            spawn_local(async move {
                match services.session.login(services.api.as_ref(), &credentials).await {
                    Ok(logged_in) => {
                        user.set(Some(logged_in));
                        navigate.emit(Page::Dashboard);
                    }
                    Err(e) => {
                        error!("Error logging in: {}", e);
                        form_error.set(Some("Credenciais inválidas".into()));
                    }
                }
            });
        })
    };

    html! {
        <div class="auth-page">
            <form class="card-body" onsubmit={on_submit}>
                <h1 class="text-2xl font-bold">{ "Entrar" }</h1>
                <input type="email" class="input input-bordered" placeholder="Email"
                    value={email.text.clone()} oninput={email.oninput.clone()} />
                <input type="password" class="input input-bordered" placeholder="Senha"
                    value={password.text.clone()} oninput={password.oninput.clone()} />
                if let Some(err) = &*form_error {
                    <div class="input-error">{ err.clone() }</div>
                }
                <button type="submit" class="btn btn-secondary">{ "Entrar" }</button>
                <a class="link" onclick={ctx.navigate.reform(|_: MouseEvent| Page::Register)}>{ "Criar conta" }</a>
            </form>
        </div>
    }
}

#[function_component(Register)]
pub fn register() -> Html {
    let ctx = use_app();
    let name = use_text_input("");
    let email = use_text_input("");
    let password = use_text_input("");
    let form_error = use_state(|| None::<String>);

    let on_submit = {
        let services = ctx.services.clone();
        let navigate = ctx.navigate.clone();
        let form_error = form_error.clone();
        let name = name.text.clone();
        let email = email.text.clone();
        let password = password.text.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let registration = match validate_registration(&name, &email, &password) {
                Ok(r) => r,
                Err(err) => {
                    form_error.set(Some(err.to_string()));
                    return;
                }
            };
            let services = services.clone();
            let navigate = navigate.clone();
            let form_error = form_error.clone();
            spawn_local(async move {
                match services.api.register(&registration).await {
                    Ok(_) => navigate.emit(Page::Login),
                    Err(e) => {
                        warn!("Error registering: {}", e);
                        form_error.set(Some(e.to_string()));
                    }
                }
            });
        })
    };

    html! {
        <div class="auth-page">
            <form class="card-body" onsubmit={on_submit}>
                <h1 class="text-2xl font-bold">{ "Criar conta" }</h1>
                <input type="text" class="input input-bordered" placeholder="Nome"
                    value={name.text.clone()} oninput={name.oninput.clone()} />
                <input type="email" class="input input-bordered" placeholder="Email"
                    value={email.text.clone()} oninput={email.oninput.clone()} />
                <input type="password" class="input input-bordered" placeholder="Senha"
                    value={password.text.clone()} oninput={password.oninput.clone()} />
                if let Some(err) = &*form_error {
                    <div class="input-error">{ err.clone() }</div>
                }
                <button type="submit" class="btn btn-secondary">{ "Cadastrar" }</button>
                <a class="link" onclick={ctx.navigate.reform(|_: MouseEvent| Page::Login)}>{ "Já tenho conta" }</a>
            </form>
        </div>
    }
}
