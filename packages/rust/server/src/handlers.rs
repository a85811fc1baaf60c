//! Route handlers. Each one parses the URL, asks the core, and writes bytes.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, info};

use steplab_core::{InitOutcome, PageContext, read_source};
use steplab_shared::{
    Article, FileRequest, ResolvedSource, Step, StepLabError, content_type, is_article_page,
};

use crate::AppState;
use crate::error::HttpResult;

/// Reports where an asset body came from (`step-specific`, `shared-base`, `composed`).
pub const ORIGIN_HEADER: HeaderName = HeaderName::from_static("x-steplab-origin");

const NO_STORE: &str = "no-cache, no-store";

// ---------------------------------------------------------------------------
// Landing & panels
// ---------------------------------------------------------------------------

pub async fn index(State(state): State<AppState>) -> HttpResult<Response> {
    let steps = state.tutorial.steps().await?;
    let body = json!({ "steps": steps }).to_string();
    Ok(respond(
        headers("application/json", NO_STORE),
        body.into_bytes(),
    ))
}

pub async fn info(
    State(state): State<AppState>,
    Path(step): Path<String>,
) -> HttpResult<Response> {
    let content = &state.tutorial.content;
    let info = match Step::parse(&step) {
        Ok(step) => content.select_info(step).await?,
        Err(_) => content.fallback_info().await,
    };
    debug!(step = %step, source = ?info.source, "info");
    Ok(respond(
        headers("text/markdown; charset=utf-8", NO_STORE),
        info.text.into_bytes(),
    ))
}

pub async fn info_article(
    state: State<AppState>,
    Path((step, _article)): Path<(String, String)>,
) -> HttpResult<Response> {
    info(state, Path(step)).await
}

pub async fn test(
    State(state): State<AppState>,
    Path(step): Path<String>,
) -> HttpResult<Response> {
    let step = Step::parse(&step)?;
    let test = state.tutorial.content.select_test(step).await?;
    Ok(respond(
        headers("application/javascript; charset=utf-8", NO_STORE),
        test.text.into_bytes(),
    ))
}

pub async fn test_article(
    state: State<AppState>,
    Path((step, _article)): Path<(String, String)>,
) -> HttpResult<Response> {
    test(state, Path(step)).await
}

// ---------------------------------------------------------------------------
// Step initialization
// ---------------------------------------------------------------------------

pub async fn init(
    State(state): State<AppState>,
    Path(step): Path<String>,
) -> HttpResult<Response> {
    let step = Step::parse(&step)?;
    let outcome = state
        .tutorial
        .initializer
        .initialize(step)
        .await?
        .into_result(step)?;

    if let InitOutcome::Populated { copied, .. } = &outcome {
        info!(%step, copied = copied.len(), "init");
    }
    Ok(respond(
        headers("text/plain; charset=utf-8", NO_STORE),
        b"ok".to_vec(),
    ))
}

pub async fn init_article(
    state: State<AppState>,
    Path((step, _article)): Path<(String, String)>,
) -> HttpResult<Response> {
    init(state, Path(step)).await
}

// ---------------------------------------------------------------------------
// Mock API
// ---------------------------------------------------------------------------

pub async fn api(
    State(state): State<AppState>,
    Path(method): Path<String>,
) -> HttpResult<Response> {
    let body = state
        .tutorial
        .api
        .load(&method)
        .await?
        .ok_or_else(|| StepLabError::not_found(format!("api {method}")))?;

    let cache = format!("public, max-age={}", state.cache.api_max_age);
    Ok(respond(headers("application/json", &cache), body))
}

// ---------------------------------------------------------------------------
// App pages & assets
// ---------------------------------------------------------------------------

pub async fn home(
    State(state): State<AppState>,
    Path(step): Path<String>,
) -> HttpResult<Response> {
    let step = Step::parse(&step)?;
    let page = state.tutorial.pages.page(step, None).await?;
    serve_page(page).await
}

/// `/{step}/{name}`: an article page when `name` matches the page pattern,
/// otherwise a step asset.
pub async fn step_file(
    State(state): State<AppState>,
    Path((step, name)): Path<(String, String)>,
) -> HttpResult<Response> {
    let step = Step::parse(&step)?;

    if is_article_page(&name) {
        let article = Article::parse(&name)?;
        let page = state.tutorial.pages.page(step, Some(&article)).await?;
        return serve_page(page).await;
    }

    serve_asset(&state, FileRequest::new(step, None, name)).await
}

pub async fn article_file(
    State(state): State<AppState>,
    Path((step, article, file)): Path<(String, String, String)>,
) -> HttpResult<Response> {
    let step = Step::parse(&step)?;
    let article = Article::parse(&article)?;
    serve_asset(&state, FileRequest::new(step, Some(article), file)).await
}

/// Everything no route claims.
pub async fn hello() -> Response {
    respond(headers("application/json", NO_STORE), b"\"hello\"".to_vec())
}

async fn serve_page(page: PageContext) -> HttpResult<Response> {
    let body = read_source(&page.template)
        .await?
        .ok_or_else(|| StepLabError::not_found(format!("page for {}", page.step)))?;

    let mut map = HeaderMap::new();
    map.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    if page.has_manifest {
        map.insert(
            header::LINK,
            HeaderValue::from_static("<manifest.json>; rel=\"manifest\""),
        );
    }
    Ok(respond(map, body))
}

async fn serve_asset(state: &AppState, request: FileRequest) -> HttpResult<Response> {
    let source = state.tutorial.resolver.resolve(&request).await?;
    let origin = source.origin();
    let cache = format!("public, max-age={}", state.cache.asset_max_age);

    let (mut map, body) = match source {
        ResolvedSource::NotFound => {
            return Err(StepLabError::not_found(format!(
                "{}/{}",
                request.step, request.filename
            ))
            .into());
        }
        ResolvedSource::Synthesized(asset) => {
            let mut map = headers(asset.content_type, &cache);
            map.insert(header::CONTENT_LENGTH, HeaderValue::from(asset.content_length()));
            if let Ok(etag) = HeaderValue::from_str(&asset.etag) {
                map.insert(header::ETAG, etag);
            }
            (map, asset.body)
        }
        ref found => {
            let body = read_source(found).await?.ok_or_else(|| {
                StepLabError::not_found(format!("{}/{}", request.step, request.filename))
            })?;
            (headers(content_type(&request.filename), &cache), body)
        }
    };

    if let Ok(value) = HeaderValue::from_str(&origin.to_string()) {
        map.insert(ORIGIN_HEADER, value);
    }
    Ok(respond(map, body))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn headers(content_type: &str, cache_control: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Ok(v) = HeaderValue::from_str(content_type) {
        map.insert(header::CONTENT_TYPE, v);
    }
    if let Ok(v) = HeaderValue::from_str(cache_control) {
        map.insert(header::CACHE_CONTROL, v);
    }
    map
}

fn respond(headers: HeaderMap, body: Vec<u8>) -> Response {
    (StatusCode::OK, headers, Body::from(body)).into_response()
}
