use std::sync::Arc;

use askama::Template;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::assembler::{assemble, placeholder_blocks};
use crate::content;
use crate::fetcher::{
    effective_limit, parse_source_list, Fetcher, DEFAULT_COMICS_LIMIT, DEFAULT_NEWS_LIMIT,
    DEFAULT_REDDIT_LIMIT,
};
use crate::model::{ComicItem, NewsItem, PrintBlock, Quote, RedditItem, StripLength, Theme};
use crate::render::render_strip;
use crate::settings::{SettingsForm, SettingsStore, UserSettings};

pub struct AppState {
    pub fetcher: Arc<Fetcher>,
    pub store: SettingsStore,
    pub settings: RwLock<UserSettings>,
}

impl AppState {
    /// Loads the persisted settings once; they live in memory from then on.
    pub fn new(fetcher: Arc<Fetcher>, store: SettingsStore) -> Self {
        let settings = store.load();
        Self {
            fetcher,
            store,
            settings: RwLock::new(settings),
        }
    }

    pub async fn current_settings(&self) -> UserSettings {
        self.settings.read().await.clone()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/strip", get(strip))
        .route("/settings", get(settings_json).post(update_settings))
        .route("/api/rss", get(api_rss))
        .route("/api/reddit", get(api_reddit))
        .route("/api/comics", get(api_comics))
        .route("/api/quote", get(api_quote))
        .route("/api/puzzle", get(api_puzzle))
        .route("/api/strip", get(api_strip))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Template structs
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub strip_html: String,
    pub modules: Vec<ModuleToggle>,
    pub rss_feeds: String,
    pub subreddits: String,
    pub comic_feeds: String,
    pub lengths: Vec<Choice>,
    pub themes: Vec<Choice>,
}

pub struct ModuleToggle {
    pub name: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
    pub icon: Option<&'static str>,
    pub checked: bool,
}

impl IndexTemplate {
    fn new(settings: &UserSettings, strip_html: String) -> Self {
        let m = settings.modules;
        Self {
            strip_html,
            modules: vec![
                ModuleToggle { name: "news", label: "News / RSS", checked: m.news },
                ModuleToggle { name: "reddit", label: "Reddit", checked: m.reddit },
                ModuleToggle { name: "comics", label: "Comics", checked: m.comics },
                ModuleToggle { name: "quotes", label: "Quotes", checked: m.quotes },
                ModuleToggle { name: "puzzle", label: "Puzzle / Prompt", checked: m.puzzle },
            ],
            rss_feeds: settings.rss_feeds.join("\n"),
            subreddits: settings.subreddits.join("\n"),
            comic_feeds: settings.comic_feeds.join("\n"),
            lengths: StripLength::ALL
                .iter()
                .map(|l| Choice {
                    value: l.as_str(),
                    label: l.label(),
                    icon: None,
                    checked: *l == settings.strip_length,
                })
                .collect(),
            themes: Theme::ALL
                .iter()
                .map(|t| Choice {
                    value: t.as_str(),
                    label: t.label(),
                    icon: Some(t.decorations().icon),
                    checked: *t == settings.theme,
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "print_page.html")]
pub struct PrintPageTemplate {
    pub strip_html: String,
    pub auto_print: bool,
}

// Wrapper for HTML responses
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

// Response bodies
#[derive(Serialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

#[derive(Serialize)]
pub struct PuzzleResponse {
    pub puzzle: PuzzlePayload,
}

/// The puzzle as served: its kind stays internal.
#[derive(Serialize)]
pub struct PuzzlePayload {
    pub title: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct StripResponse {
    pub blocks: Vec<PrintBlock>,
}

/// `limit` stays a raw string so a malformed value falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct FeedsQuery {
    #[serde(default)]
    pub feeds: String,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubsQuery {
    #[serde(default)]
    pub subs: String,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrintQuery {
    #[serde(default = "default_auto_print")]
    pub print: bool,
}

fn default_auto_print() -> bool {
    true
}

// Route handlers
pub async fn index(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.current_settings().await;
    let strip_html = render_strip(
        &placeholder_blocks(),
        settings.theme,
        Local::now().date_naive(),
    )?;

    Ok(HtmlTemplate(IndexTemplate::new(&settings, strip_html)))
}

pub async fn strip(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PrintQuery>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.current_settings().await;
    let blocks = assemble(&settings, state.fetcher.as_ref()).await;
    info!("Generated strip with {} blocks", blocks.len());

    let strip_html = render_strip(&blocks, settings.theme, Local::now().date_naive())?;

    Ok(HtmlTemplate(PrintPageTemplate {
        strip_html,
        auto_print: query.print,
    }))
}

pub async fn api_strip(State(state): State<Arc<AppState>>) -> Json<StripResponse> {
    let settings = state.current_settings().await;
    let blocks = assemble(&settings, state.fetcher.as_ref()).await;
    Json(StripResponse { blocks })
}

pub async fn settings_json(State(state): State<Arc<AppState>>) -> Json<UserSettings> {
    Json(state.current_settings().await)
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    let updated = form.into_settings();

    {
        let mut settings = state.settings.write().await;
        *settings = updated.clone();
    }

    match state.store.save(&updated) {
        Ok(()) => info!("Saved settings to {}", state.store.path().display()),
        Err(e) => warn!("Failed to save settings: {:#}", e),
    }

    Redirect::to("/")
}

pub async fn api_rss(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedsQuery>,
) -> Json<ItemsResponse<NewsItem>> {
    let feeds = parse_source_list(&query.feeds);
    let limit = effective_limit(query.limit.as_deref(), DEFAULT_NEWS_LIMIT);

    let items = state.fetcher.fetch_news(&feeds, limit).await;
    Json(ItemsResponse { items })
}

pub async fn api_reddit(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubsQuery>,
) -> Json<ItemsResponse<RedditItem>> {
    let subs = parse_source_list(&query.subs);
    let limit = effective_limit(query.limit.as_deref(), DEFAULT_REDDIT_LIMIT);

    let items = state.fetcher.fetch_reddit(&subs, limit).await;
    Json(ItemsResponse { items })
}

pub async fn api_comics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedsQuery>,
) -> Json<ItemsResponse<ComicItem>> {
    let feeds = parse_source_list(&query.feeds);
    let limit = effective_limit(query.limit.as_deref(), DEFAULT_COMICS_LIMIT);

    let items = state.fetcher.fetch_comics(&feeds, limit).await;
    Json(ItemsResponse { items })
}

pub async fn api_quote() -> Json<Quote> {
    Json(content::random_quote(&mut rand::thread_rng()))
}

pub async fn api_puzzle() -> Json<PuzzleResponse> {
    let puzzle = content::random_puzzle(&mut rand::thread_rng());
    Json(PuzzleResponse {
        puzzle: PuzzlePayload {
            title: puzzle.title,
            content: puzzle.content,
        },
    })
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
