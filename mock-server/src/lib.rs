//! In-memory stand-in for the WordPress `wp/v2/posts` REST endpoints.
//!
//! Posts live in a `BTreeMap` behind a `tokio::sync::RwLock`. A post is
//! either active or trashed; a forced delete removes it from the map, after
//! which every lookup is a 404. Errors use the WordPress envelope
//! `{"code", "message", "data": {"status", "params"}}`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub const NAMESPACE: &str = "/wp/v2";

/// Statuses a client may set. `trash` is only reachable through delete.
pub const ALLOWED_STATUSES: [&str; 5] = ["publish", "future", "draft", "pending", "private"];

const DEFAULT_PER_PAGE: usize = 10;
const MAX_PER_PAGE: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Trashed,
}

#[derive(Clone, Debug)]
pub struct StoredPost {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub slug: String,
    pub status: String,
    pub lifecycle: Lifecycle,
}

impl StoredPost {
    fn status(&self) -> &str {
        match self.lifecycle {
            Lifecycle::Active => self.status.as_str(),
            Lifecycle::Trashed => "trash",
        }
    }

    /// Wire representation. Rendered content gets a trailing newline the way
    /// WordPress' auto-paragraph filter leaves one.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "status": self.status(),
            "slug": self.slug,
            "link": format!("http://localhost/?p={}", self.id),
            "title": { "rendered": self.title },
            "content": { "rendered": rendered(&self.content), "protected": false },
            "excerpt": { "rendered": rendered(&self.excerpt), "protected": false },
        })
    }
}

fn rendered(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!("{text}\n")
    }
}

#[derive(Debug)]
pub struct Store {
    posts: BTreeMap<u64, StoredPost>,
    next_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            posts: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Store {
    /// A store holding the post a fresh WordPress install ships with.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        store.insert(PostInput {
            title: Some("Hello world!".to_string()),
            content: Some("<p>Welcome to WordPress. This is your first post.</p>".to_string()),
            status: Some("publish".to_string()),
            ..PostInput::default()
        });
        store
    }

    fn insert(&mut self, input: PostInput) -> StoredPost {
        let id = self.next_id;
        self.next_id += 1;
        let title = input.title.unwrap_or_default();
        let post = StoredPost {
            id,
            slug: input.slug.unwrap_or_else(|| slugify(&title, id)),
            title,
            content: input.content.unwrap_or_default(),
            excerpt: input.excerpt.unwrap_or_default(),
            status: input.status.unwrap_or_else(|| "draft".to_string()),
            lifecycle: Lifecycle::Active,
        };
        self.posts.insert(id, post.clone());
        post
    }

    pub fn get(&self, id: u64) -> Option<&StoredPost> {
        self.posts.get(&id)
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub status: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub per_page: Option<String>,
    pub page: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub force: Option<String>,
}

/// Error response in the WordPress REST envelope.
#[derive(Debug)]
pub struct RestError {
    status: StatusCode,
    code: &'static str,
    message: String,
    params: Option<Value>,
}

impl RestError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            params: None,
        }
    }

    fn invalid_post_id() -> Self {
        Self::new(StatusCode::NOT_FOUND, "rest_post_invalid_id", "Invalid post ID.")
    }

    fn invalid_param(param: &str, reason: String) -> Self {
        let mut params = Map::new();
        params.insert(param.to_string(), Value::String(reason));
        Self {
            params: Some(Value::Object(params)),
            ..Self::new(
                StatusCode::BAD_REQUEST,
                "rest_invalid_param",
                format!("Invalid parameter(s): {param}"),
            )
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let mut data = json!({ "status": self.status.as_u16() });
        if let Some(params) = self.params {
            data["params"] = params;
        }
        let body = json!({ "code": self.code, "message": self.message, "data": data });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    router(Db::default())
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route(
            &format!("{NAMESPACE}/posts"),
            get(list_posts).post(create_post),
        )
        .route(
            &format!("{NAMESPACE}/posts/{{id}}"),
            get(get_post)
                .post(update_post)
                .put(update_post)
                .patch(update_post)
                .delete(delete_post),
        )
        .fallback(no_route)
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    axum::serve(listener, router(db)).await
}

async fn no_route() -> RestError {
    RestError::new(
        StatusCode::NOT_FOUND,
        "rest_no_route",
        "No route was found matching the URL and request method.",
    )
}

async fn list_posts(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
) -> Result<(HeaderMap, Json<Vec<Value>>), RestError> {
    let per_page = bounded_param("per_page", query.per_page.as_deref(), DEFAULT_PER_PAGE, MAX_PER_PAGE)?;
    let page = bounded_param("page", query.page.as_deref(), 1, usize::MAX)?;
    let search = query.search.map(|s| s.to_lowercase());

    let store = db.read().await;
    let matching: Vec<&StoredPost> = store
        .posts
        .values()
        .rev()
        .filter(|p| p.lifecycle == Lifecycle::Active)
        .filter(|p| {
            search.as_deref().map_or(true, |needle| {
                p.title.to_lowercase().contains(needle) || p.content.to_lowercase().contains(needle)
            })
        })
        .collect();

    let total = matching.len();
    let total_pages = total.div_ceil(per_page);
    let posts = matching
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .map(StoredPost::to_json)
        .collect();

    let mut headers = HeaderMap::new();
    headers.insert("x-wp-total", HeaderValue::from(total));
    headers.insert("x-wp-totalpages", HeaderValue::from(total_pages));
    Ok((headers, Json(posts)))
}

async fn create_post(
    State(db): State<Db>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> Result<impl IntoResponse, RestError> {
    let input = json_body(payload)?;
    validate_status(input.status.as_deref())?;

    let empty = |field: &Option<String>| field.as_deref().map_or(true, str::is_empty);
    if empty(&input.title) && empty(&input.content) && empty(&input.excerpt) {
        return Err(RestError::new(
            StatusCode::BAD_REQUEST,
            "empty_content",
            "Content, title, and excerpt are empty.",
        ));
    }

    let post = db.write().await.insert(input);
    info!(id = post.id, status = %post.status, "post created");

    let location = format!("{NAMESPACE}/posts/{}", post.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(post.to_json()),
    ))
}

async fn get_post(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, RestError> {
    let id = parse_id(&id)?;
    let store = db.read().await;
    store
        .get(id)
        .map(|p| Json(p.to_json()))
        .ok_or_else(RestError::invalid_post_id)
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Result<Json<PostInput>, JsonRejection>,
) -> Result<Json<Value>, RestError> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;
    validate_status(input.status.as_deref())?;

    let mut store = db.write().await;
    let post = store.posts.get_mut(&id).ok_or_else(RestError::invalid_post_id)?;
    if let Some(title) = input.title {
        post.title = title;
    }
    if let Some(content) = input.content {
        post.content = content;
    }
    if let Some(excerpt) = input.excerpt {
        post.excerpt = excerpt;
    }
    if let Some(slug) = input.slug {
        post.slug = slug;
    }
    if let Some(status) = input.status {
        post.status = status;
        post.lifecycle = Lifecycle::Active;
    }
    debug!(id, "post updated");
    Ok(Json(post.to_json()))
}

async fn delete_post(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<Value>, RestError> {
    let id = parse_id(&id)?;
    let force = matches!(query.force.as_deref(), Some("true" | "1"));

    let mut store = db.write().await;
    if force {
        let previous = store.posts.remove(&id).ok_or_else(RestError::invalid_post_id)?;
        info!(id, "post deleted permanently");
        return Ok(Json(json!({ "deleted": true, "previous": previous.to_json() })));
    }

    let post = store.posts.get_mut(&id).ok_or_else(RestError::invalid_post_id)?;
    if post.lifecycle == Lifecycle::Trashed {
        return Err(RestError::new(
            StatusCode::GONE,
            "rest_already_trashed",
            "The post has already been deleted.",
        ));
    }
    post.lifecycle = Lifecycle::Trashed;
    info!(id, "post moved to trash");
    Ok(Json(post.to_json()))
}

/// Item routes only match numeric ids; anything else has no route.
fn parse_id(raw: &str) -> Result<u64, RestError> {
    raw.parse().map_err(|_| {
        RestError::new(
            StatusCode::NOT_FOUND,
            "rest_no_route",
            "No route was found matching the URL and request method.",
        )
    })
}

fn json_body(payload: Result<Json<PostInput>, JsonRejection>) -> Result<PostInput, RestError> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        RestError::new(
            StatusCode::BAD_REQUEST,
            "rest_invalid_json",
            format!("Invalid JSON body passed. {}", rejection.body_text()),
        )
    })
}

fn validate_status(status: Option<&str>) -> Result<(), RestError> {
    match status {
        Some(status) if !ALLOWED_STATUSES.contains(&status) => Err(RestError::invalid_param(
            "status",
            format!("status is not one of {}.", ALLOWED_STATUSES.join(", ")),
        )),
        _ => Ok(()),
    }
}

fn bounded_param(name: &str, raw: Option<&str>, default: usize, max: usize) -> Result<usize, RestError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<usize>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        Ok(_) if max != usize::MAX => Err(RestError::invalid_param(
            name,
            format!("{name} must be between 1 (inclusive) and {max} (inclusive)"),
        )),
        Ok(_) => Err(RestError::invalid_param(
            name,
            format!("{name} must be greater than or equal to 1"),
        )),
        Err(_) => Err(RestError::invalid_param(name, format!("{name} is not of type integer."))),
    }
}

fn slugify(title: &str, id: u64) -> String {
    let slug = title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        id.to_string()
    } else {
        slug
    }
}
