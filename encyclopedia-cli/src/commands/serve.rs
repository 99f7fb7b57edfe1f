//! HTTP server for browsing and editing the wiki.

use super::{load_config, open_wiki};
use anyhow::{Context, Result};
use askama::Template;
use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use encyclopedia_core::{EntryForm, EntryStore, FileStore, SearchOutcome, Wiki, WikiError};
use encyclopedia_render::{
    entry_url, CreateTemplate, EditTemplate, EmptyTemplate, EntryLink, EntryTemplate, FormView,
    IndexTemplate, NotFoundTemplate, SearchTemplate,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const STYLESHEET: &str = include_str!("../../static/styles.css");

const ALREADY_EXISTS: &str = "Entry already exists with the provided title.";

/// Overrides for the configured server settings
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seed: Option<u64>,
}

#[derive(Clone)]
pub struct AppState {
    site_title: String,
    wiki: Arc<Wiki<FileStore>>,
    rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    pub fn new(site_title: impl Into<String>, wiki: Wiki<FileStore>, rng: StdRng) -> Self {
        Self {
            site_title: site_title.into(),
            wiki: Arc::new(wiki),
            rng: Arc::new(Mutex::new(rng)),
        }
    }
}

/// Start the web server
pub async fn serve(config_path: Option<&Path>, opts: ServeOptions) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = opts.host {
        config.server.host = host;
    }
    if let Some(port) = opts.port {
        config.server.port = port;
    }

    let rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let state = AppState::new(config.site.title.clone(), open_wiki(&config), rng);
    let app = router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(
        "Serving entries from {:?} on http://{}",
        config.entries_dir(),
        addr
    );
    println!("\nServing at http://{}", addr);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Routes for every wiki page
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/wiki/{title}", get(view_entry))
        .route("/search", get(search_query).post(search_form))
        .route("/create", get(create_page).post(create_submit))
        .route("/edit/{title}", get(edit_page).post(edit_submit))
        .route("/random", get(random_page))
        .route("/static/styles.css", get(stylesheet))
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---- Response helpers ----

fn page<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            tracing::error!("Failed to render template: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn not_found(state: &AppState, title: Option<String>) -> Response {
    let template = NotFoundTemplate {
        site_title: state.site_title.clone(),
        title,
    };
    page(StatusCode::NOT_FOUND, &template)
}

fn server_error(err: WikiError) -> Response {
    tracing::error!("Request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

// ---- Handlers ----

async fn index(State(state): State<AppState>) -> Response {
    match state.wiki.list() {
        Ok(titles) => {
            let template = IndexTemplate {
                site_title: state.site_title.clone(),
                entries: EntryLink::all(titles),
            };
            page(StatusCode::OK, &template)
        }
        Err(err) => server_error(err),
    }
}

async fn view_entry(State(state): State<AppState>, AxumPath(title): AxumPath<String>) -> Response {
    match state.wiki.view(&title) {
        Ok(entry) => {
            let template = EntryTemplate::new(&state.site_title, &entry.title, entry.html);
            page(StatusCode::OK, &template)
        }
        Err(WikiError::NotFound(_)) => not_found(&state, Some(title)),
        Err(err) => server_error(err),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_query(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    search(state, params.q).await
}

async fn search_form(State(state): State<AppState>, Form(params): Form<SearchParams>) -> Response {
    search(state, params.q).await
}

async fn search(state: AppState, query: String) -> Response {
    // Content search reads every entry; keep it off the async workers
    let result = tokio::task::spawn_blocking({
        let wiki = state.wiki.clone();
        let query = query.clone();
        move || wiki.search(&query)
    })
    .await;

    match result {
        Ok(Ok(SearchOutcome::Exact(title))) => redirect(&entry_url(&title)),
        Ok(Ok(SearchOutcome::Matches(results))) => {
            let template = SearchTemplate {
                site_title: state.site_title.clone(),
                query,
                results: EntryLink::all(results),
            };
            page(StatusCode::OK, &template)
        }
        Ok(Err(err)) => server_error(err),
        Err(err) => {
            tracing::error!("Search task panicked: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn create_page(State(state): State<AppState>) -> Response {
    let template = CreateTemplate {
        site_title: state.site_title.clone(),
        form: FormView::blank(),
        warning: None,
    };
    page(StatusCode::OK, &template)
}

async fn create_submit(State(state): State<AppState>, Form(form): Form<EntryForm>) -> Response {
    let (view, warning) = match state.wiki.create(&form) {
        Ok(title) => return redirect(&entry_url(&title)),
        Err(WikiError::Validation(errors)) => (FormView::submitted(&form, &errors), None),
        Err(WikiError::AlreadyExists(existing)) => {
            tracing::debug!("Refusing to create duplicate of {:?}", existing);
            (FormView::submitted(&form, &[]), Some(ALREADY_EXISTS.to_string()))
        }
        Err(err) => return server_error(err),
    };

    let template = CreateTemplate {
        site_title: state.site_title.clone(),
        form: view,
        warning,
    };
    page(StatusCode::OK, &template)
}

async fn edit_page(State(state): State<AppState>, AxumPath(title): AxumPath<String>) -> Response {
    match state.wiki.edit_form(&title) {
        Ok(entry) => {
            let template =
                EditTemplate::new(&state.site_title, &entry.title, FormView::from_entry(&entry));
            page(StatusCode::OK, &template)
        }
        Err(WikiError::NotFound(_)) => not_found(&state, Some(title)),
        Err(err) => server_error(err),
    }
}

async fn edit_submit(
    State(state): State<AppState>,
    AxumPath(title): AxumPath<String>,
    Form(form): Form<EntryForm>,
) -> Response {
    match state.wiki.edit(&title, &form) {
        Ok(saved) => redirect(&entry_url(&saved)),
        Err(WikiError::Validation(errors)) => {
            // Show the stored casing, as the edit page does
            let shown = match state.wiki.store().resolve_title(&title) {
                Ok(Some(resolved)) => resolved,
                Ok(None) => title,
                Err(err) => return server_error(err.into()),
            };
            let template = EditTemplate::new(
                &state.site_title,
                &shown,
                FormView::submitted(&form, &errors),
            );
            page(StatusCode::OK, &template)
        }
        Err(WikiError::NotFound(_)) => not_found(&state, Some(title)),
        Err(err) => server_error(err),
    }
}

async fn random_page(State(state): State<AppState>) -> Response {
    let choice = {
        let mut rng = state.rng.lock();
        state.wiki.random(&mut *rng)
    };

    match choice {
        Ok(title) => redirect(&entry_url(&title)),
        Err(WikiError::EmptyStore) => {
            let template = EmptyTemplate {
                site_title: state.site_title.clone(),
            };
            page(StatusCode::OK, &template)
        }
        Err(err) => server_error(err),
    }
}

async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

async fn fallback(State(state): State<AppState>) -> Response {
    not_found(&state, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    fn setup(entries: &[(&str, &str)]) -> (TempDir, AppState) {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("entries"));
        for (title, content) in entries {
            store.save_entry(title, content).unwrap();
        }
        let state = AppState::new("Encyclopedia", Wiki::new(store), StdRng::seed_from_u64(3));
        (dir, state)
    }

    async fn get(state: &AppState, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn post(state: &AppState, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_index_lists_entries() {
        let (_dir, state) = setup(&[("CSS", "styles"), ("Git", "vcs")]);

        let response = get(&state, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("href=\"/wiki/CSS\""));
        assert!(html.contains("href=\"/wiki/Git\""));
    }

    #[tokio::test]
    async fn test_view_resolves_case() {
        let (_dir, state) = setup(&[("Cat", "Cats are animals.")]);

        let response = get(&state, "/wiki/cat").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<title>Cat</title>"));
        assert!(html.contains("<p>Cats are animals.</p>"));
    }

    #[tokio::test]
    async fn test_view_unknown_is_404() {
        let (_dir, state) = setup(&[]);

        let response = get(&state, "/wiki/Ghost").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Ghost"));
    }

    #[tokio::test]
    async fn test_search_exact_match_redirects() {
        let (_dir, state) = setup(&[
            ("Python", "A language. See also Snakes."),
            ("Snakes", "Reptiles."),
        ]);

        let response = post(&state, "/search", "q=snakes").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/wiki/Snakes");
    }

    #[tokio::test]
    async fn test_search_lists_content_matches() {
        let (_dir, state) = setup(&[
            ("Python", "A language. See also Snakes."),
            ("Snakes", "Reptiles."),
        ]);

        let response = get(&state, "/search?q=see").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("href=\"/wiki/Python\""));
        assert!(!html.contains("href=\"/wiki/Snakes\""));
    }

    #[tokio::test]
    async fn test_create_redirects_and_saves() {
        let (_dir, state) = setup(&[]);

        let response = post(&state, "/create", "title=Cat&content=Cats+are+animals.").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/wiki/Cat");
        assert_eq!(
            state.wiki.store().get_entry("Cat").unwrap(),
            "Cats are animals."
        );
    }

    #[tokio::test]
    async fn test_create_duplicate_shows_warning() {
        let (_dir, state) = setup(&[("Cat", "original")]);

        let response = post(&state, "/create", "title=CAT&content=replacement").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(ALREADY_EXISTS));
        assert!(html.contains(">replacement</textarea>"));
        assert_eq!(state.wiki.store().get_entry("Cat").unwrap(), "original");
        assert_eq!(state.wiki.list().unwrap(), vec!["Cat"]);
    }

    #[tokio::test]
    async fn test_create_invalid_rerenders_form() {
        let (_dir, state) = setup(&[]);

        let response = post(&state, "/create", "title=&content=").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("This field is required."));
        assert!(state.wiki.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_form_prefilled() {
        let (_dir, state) = setup(&[("Git", "vcs")]);

        let response = get(&state, "/edit/git").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("value=\"Git\" readonly"));
        assert!(html.contains(">vcs</textarea>"));
    }

    #[tokio::test]
    async fn test_edit_submit_ignores_title_field() {
        let (_dir, state) = setup(&[("Git", "vcs")]);

        let response = post(&state, "/edit/Git", "title=Hijacked&content=updated").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/wiki/Git");
        assert_eq!(state.wiki.list().unwrap(), vec!["Git"]);
        assert_eq!(state.wiki.store().get_entry("Git").unwrap(), "updated");
    }

    #[tokio::test]
    async fn test_edit_invalid_rerenders_with_stored_title() {
        let (_dir, state) = setup(&[("Git", "vcs")]);

        let response = post(&state, "/edit/git", "title=git&content=++").await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("value=\"Git\" readonly"));
        assert!(html.contains("action=\"/edit/Git\""));
        assert!(html.contains("This field is required."));
        assert_eq!(state.wiki.store().get_entry("Git").unwrap(), "vcs");
    }

    #[tokio::test]
    async fn test_storage_failure_is_500() {
        let dir = tempdir().unwrap();
        let blocked = dir.path().join("entries");
        fs::write(&blocked, "a file where the entries directory should be").unwrap();
        let state = AppState::new(
            "Encyclopedia",
            Wiki::new(FileStore::new(&blocked)),
            StdRng::seed_from_u64(3),
        );

        assert_eq!(
            get(&state, "/").await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let response = post(&state, "/create", "title=Cat&content=Cats+are+animals.").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            get(&state, "/search?q=cats").await.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_edit_unknown_is_404() {
        let (_dir, state) = setup(&[]);

        assert_eq!(get(&state, "/edit/Ghost").await.status(), StatusCode::NOT_FOUND);
        let response = post(&state, "/edit/Ghost", "title=Ghost&content=boo").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(state.wiki.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_random_redirects_to_an_entry() {
        let (_dir, state) = setup(&[("CSS", "a"), ("Git", "b")]);

        let response = get(&state, "/random").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(["/wiki/CSS", "/wiki/Git"].contains(&location(&response)));
    }

    #[tokio::test]
    async fn test_random_on_empty_wiki() {
        let (_dir, state) = setup(&[]);

        let response = get(&state, "/random").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("no entries to pick from"));
    }

    #[tokio::test]
    async fn test_encoded_titles_roundtrip() {
        let (_dir, state) = setup(&[]);

        let response = post(&state, "/create", "title=Rust+%26+C&content=systems").await;
        assert_eq!(location(&response), "/wiki/Rust%20%26%20C");

        let response = get(&state, "/wiki/Rust%20%26%20C").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (_dir, state) = setup(&[]);
        assert_eq!(get(&state, "/nope").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stylesheet_served() {
        let (_dir, state) = setup(&[]);

        let response = get(&state, "/static/styles.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
    }
}
