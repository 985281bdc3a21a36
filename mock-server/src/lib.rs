use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Redirect,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<u64>,
}

#[derive(Default)]
pub struct Store {
    posts: BTreeMap<u64, Post>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

/// Length of the string served by `/large`, past ureq's default 10 MiB read cap.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

/// Posts 1 and 2 exist at startup.
pub fn seed() -> Store {
    let mut store = Store {
        posts: BTreeMap::new(),
        next_id: 101,
    };
    for (id, title) in [(1, "sunt aut facere"), (2, "qui est esse")] {
        store.posts.insert(
            id,
            Post {
                id,
                user_id: 1,
                title: title.to_string(),
                body: format!("body of post {id}"),
            },
        );
    }
    store
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seed()));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/echo", any(echo))
        .route("/status/{code}", get(status))
        .route("/text", get(text))
        .route("/empty", get(empty))
        .route("/large", get(large))
        .route("/redirect", get(redirect))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found(id: u64) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("post {id} not found") })),
    )
}

async fn list_posts(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<Vec<Post>> {
    let store = db.read().await;
    Json(
        store
            .posts
            .values()
            .filter(|p| query.user_id.map_or(true, |uid| p.user_id == uid))
            .cloned()
            .collect(),
    )
}

async fn get_post(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Post>> {
    let store = db.read().await;
    store.posts.get(&id).cloned().map(Json).ok_or_else(|| not_found(id))
}

/// Echoes the submitted fields back with an assigned `id`, like
/// JSONPlaceholder. The post is also stored.
async fn create_post(
    State(db): State<Db>,
    Json(input): Json<Map<String, Value>>,
) -> (StatusCode, Json<Value>) {
    let mut store = db.write().await;
    let id = store.next_id;
    store.next_id += 1;

    let mut echoed = input;
    echoed.insert("id".to_string(), json!(id));
    if let Ok(post) = serde_json::from_value::<Post>(Value::Object(echoed.clone())) {
        store.posts.insert(id, post);
    }
    (StatusCode::CREATED, Json(Value::Object(echoed)))
}

async fn update_post(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let mut store = db.write().await;
    if !store.posts.contains_key(&id) {
        return Err(not_found(id));
    }

    let mut echoed = input;
    echoed.insert("id".to_string(), json!(id));
    if let Ok(post) = serde_json::from_value::<Post>(Value::Object(echoed.clone())) {
        store.posts.insert(id, post);
    }
    Ok(Json(Value::Object(echoed)))
}

async fn delete_post(State(db): State<Db>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let mut store = db.write().await;
    store
        .posts
        .remove(&id)
        .map(|_| Json(json!({})))
        .ok_or_else(|| not_found(id))
}

/// Describes the request as received: method, raw query, headers (names
/// lowercased) and raw body.
async fn echo(
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "headers": headers,
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> ApiResult<(StatusCode, Json<Value>)> {
    let status = StatusCode::from_u16(code).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": format!("invalid status {code}") })),
        )
    })?;
    let reason = status.canonical_reason().unwrap_or("unknown");
    Ok((status, Json(json!({ "message": reason }))))
}

async fn text() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/plain")], "plain text, not json")
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// A JSON string of `LARGE_BODY_LEN` bytes.
async fn large() -> Json<Value> {
    Json(Value::String("x".repeat(LARGE_BODY_LEN)))
}

async fn redirect() -> Redirect {
    Redirect::temporary("/posts/1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_serializes_with_camel_case_user_id() {
        let post = Post {
            id: 1,
            user_id: 7,
            title: "Test".to_string(),
            body: "b".to_string(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["userId"], 7);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn post_rejects_missing_title() {
        let result: Result<Post, _> = serde_json::from_str(r#"{"id":1,"userId":1,"body":"b"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn seed_contains_two_posts_and_reserves_later_ids() {
        let store = seed();
        assert_eq!(store.posts.len(), 2);
        assert_eq!(store.posts[&1].title, "sunt aut facere");
        assert_eq!(store.next_id, 101);
    }
}
