//! Development server
//!
//! Content is loaded once at start into an immutable [`AppState`]; every
//! request renders from that snapshot through the same [`Pages`] renderer the
//! static build uses, with clean absolute URLs.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Component, PathBuf};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::BuildMode;
use crate::helpers::UrlMode;
use crate::site::aggregate::media_dirs;
use crate::templates::{NotFound, Pages};
use crate::Folio;

/// Images rarely change while a site is being written
const MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Read-only state shared by all handlers
pub struct AppState {
    pages: Pages,
    assets_dir: PathBuf,
    /// Image directories of each project, by slug
    project_media: HashMap<String, Vec<PathBuf>>,
    blog_media: PathBuf,
}

impl AppState {
    pub fn new(folio: &Folio, pages: Pages) -> Self {
        let mut project_media: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for (slug, dir) in media_dirs(pages.site().projects(), &folio.content_dir) {
            project_media.entry(slug.to_string()).or_default().push(dir);
        }

        Self {
            assets_dir: folio.assets_dir.clone(),
            blog_media: folio.content_dir.join("blog").join("img"),
            project_media,
            pages,
        }
    }
}

/// Handler error: logged, answered with a generic 500 page
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("Request failed: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>500 - Internal Server Error</h1>"),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

type HandlerResult = std::result::Result<Response, AppError>;

/// All routes of the dev server
pub fn router(state: Arc<AppState>) -> Router {
    let styles = ServeDir::new(state.assets_dir.join("styles"));
    let statics = ServeDir::new(state.assets_dir.join("static"));

    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/posts", get(projects_index))
        .route("/projects/:slug", get(project))
        .route("/blog", get(blog_index))
        .route("/articles/:slug", get(blog_post))
        .route("/tags", get(tags_index))
        .route("/topics/:tag", get(tag))
        .route("/media/projects/:slug/*file", get(project_media))
        .route("/media/blog/*file", get(blog_media))
        .nest_service("/styles", styles)
        .nest_service("/static", statics)
        .fallback(fallback)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, open: bool) -> Result<()> {
    let site = folio.load_site(BuildMode::Dev)?;
    tracing::info!(
        "Loaded {} projects and {} blog posts",
        site.projects().len(),
        site.blog_posts().len()
    );
    let pages = Pages::new(site, folio.config.clone())?;
    let state = Arc::new(AppState::new(folio, pages));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn html(body: String) -> Response {
    Html(body).into_response()
}

/// 404 page for `what`, or the rendered page
fn page_or_not_found(state: &AppState, page: Option<String>, what: NotFound) -> HandlerResult {
    match page {
        Some(body) => Ok(html(body)),
        None => not_found(state, what),
    }
}

fn not_found(state: &AppState, what: NotFound) -> HandlerResult {
    let body = state.pages.not_found(what, UrlMode::LIVE)?;
    Ok((StatusCode::NOT_FOUND, Html(body)).into_response())
}

async fn home(State(state): State<Arc<AppState>>) -> HandlerResult {
    Ok(html(state.pages.home(UrlMode::LIVE)?))
}

async fn about(State(state): State<Arc<AppState>>) -> HandlerResult {
    Ok(html(state.pages.about(UrlMode::LIVE)?))
}

async fn projects_index(State(state): State<Arc<AppState>>) -> HandlerResult {
    Ok(html(state.pages.projects_index(UrlMode::LIVE)?))
}

async fn project(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> HandlerResult {
    let page = state.pages.project(&slug, UrlMode::LIVE)?;
    page_or_not_found(&state, page, NotFound::Project)
}

async fn blog_index(State(state): State<Arc<AppState>>) -> HandlerResult {
    Ok(html(state.pages.blog_index(UrlMode::LIVE)?))
}

async fn blog_post(State(state): State<Arc<AppState>>, Path(slug): Path<String>) -> HandlerResult {
    let page = state.pages.blog_post(&slug, UrlMode::LIVE)?;
    page_or_not_found(&state, page, NotFound::BlogPost)
}

async fn tags_index(State(state): State<Arc<AppState>>) -> HandlerResult {
    Ok(html(state.pages.tags_index(UrlMode::LIVE)?))
}

/// `Path` has already percent-decoded the tag
async fn tag(State(state): State<Arc<AppState>>, Path(tag): Path<String>) -> HandlerResult {
    let page = state.pages.tag(&tag, UrlMode::LIVE)?;
    page_or_not_found(&state, page, NotFound::Tag)
}

async fn project_media(
    State(state): State<Arc<AppState>>,
    Path((slug, file)): Path<(String, String)>,
) -> HandlerResult {
    let Some(dirs) = state.project_media.get(&slug) else {
        return Ok(image_not_found());
    };
    for dir in dirs {
        if let Some(response) = serve_image(dir, &file).await? {
            return Ok(response);
        }
    }
    Ok(image_not_found())
}

async fn blog_media(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> HandlerResult {
    Ok(serve_image(&state.blog_media, &file)
        .await?
        .unwrap_or_else(image_not_found))
}

async fn fallback(State(state): State<Arc<AppState>>) -> HandlerResult {
    not_found(&state, NotFound::Page)
}

fn image_not_found() -> Response {
    (StatusCode::NOT_FOUND, "Image not found").into_response()
}

/// Read `file` below `dir`; `None` if it does not exist or escapes `dir`
async fn serve_image(dir: &std::path::Path, file: &str) -> Result<Option<Response>> {
    let relative = std::path::Path::new(file);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        tracing::warn!("Rejected media path {:?}", file);
        return Ok(None);
    }

    let path = dir.join(relative);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Ok(None),
    }

    let bytes = tokio::fs::read(&path).await?;
    let response = (
        [
            (header::CONTENT_TYPE, content_type(file)),
            (header::CACHE_CONTROL, MEDIA_CACHE_CONTROL),
        ],
        bytes,
    )
        .into_response();
    Ok(Some(response))
}

fn content_type(file: &str) -> &'static str {
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
