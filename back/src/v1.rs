use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tick_api::v1::{trimmed_text, CreateTodo, Deleted, Todo, UpdateTodo};
use tracing::{debug, info};

use crate::{
    error::{ApiError, TEXT_REQUIRED},
    store::{TodoChanges, TodoStore},
};

pub fn router() -> Router<TodoStore> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
}

async fn list_todos(State(store): State<TodoStore>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = (store.list().await).map_err(ApiError::store("Failed to fetch todos"))?;
    Ok(Json(todos))
}

async fn create_todo(
    State(store): State<TodoStore>,
    body: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(body) = body?;

    let text = (body.text.as_deref())
        .and_then(trimmed_text)
        .ok_or(ApiError::Validation(TEXT_REQUIRED))?;

    let todo = (store.create(text).await).map_err(ApiError::store("Failed to create todo"))?;

    info!(
        id = todo.id,
        text = %todo.text,
        "created todo"
    );

    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(store): State<TodoStore>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;

    let changes = changes(body)?;
    if changes.is_empty() {
        debug!(id, "empty update, refreshing timestamp only");
    }

    let todo = (store.update(id, &changes).await)
        .map_err(ApiError::store("Failed to update todo"))?
        .ok_or(ApiError::NotFound)?;

    info!(
        id = todo.id,
        text = %todo.text,
        completed = todo.completed,
        "updated todo"
    );

    Ok(Json(todo))
}

async fn delete_todo(
    State(store): State<TodoStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path(id) = id?;

    let deleted = (store.delete(id).await).map_err(ApiError::store("Failed to delete todo"))?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!(id, "deleted todo");

    Ok(Json(Deleted::default()))
}

/// An empty body is accepted and only refreshes `updated_at`.
fn changes(update: UpdateTodo) -> Result<TodoChanges, ApiError> {
    let mut changes = TodoChanges::new();

    if let Some(text) = update.text {
        let text = trimmed_text(&text).ok_or(ApiError::Validation(TEXT_REQUIRED))?;
        changes = changes.text(text);
    }

    if let Some(completed) = update.completed {
        changes = changes.completed(completed);
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
    };
    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use serde_json::{json, Value};
    use tick_api::v1::DELETED_MESSAGE;
    use tower::ServiceExt;

    use super::*;

    struct TestApp {
        router: Router,
        store: TodoStore,
    }

    impl TestApp {
        async fn new() -> Self {
            let store = TodoStore::in_memory().await.unwrap();
            let router = Router::new()
                .nest("/api", router())
                .with_state(store.clone());

            Self { router, store }
        }

        async fn send(
            &self,
            method: Method,
            uri: &str,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let request = Request::builder().method(method).uri(uri);

            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => request.body(Body::empty()),
            };

            let response = (self.router.clone())
                .oneshot(request.unwrap())
                .await
                .unwrap();

            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

            let body = match bytes.is_empty() {
                true => Value::Null,
                false => serde_json::from_slice(&bytes).unwrap(),
            };

            (status, body)
        }

        async fn create(&self, text: &str) -> Value {
            let (status, body) = self
                .send(Method::POST, "/api/todos", Some(json!({ "text": text })))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            body
        }
    }

    fn timestamp(value: &Value) -> DateTime<Utc> {
        value.as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn buy_milk_scenario() {
        let app = TestApp::new().await;

        let (status, todo) = app
            .send(Method::POST, "/api/todos", Some(json!({ "text": " Buy milk " })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(todo["id"], 1);
        assert_eq!(todo["text"], "Buy milk");
        assert_eq!(todo["completed"], false);

        let (status, todo) = app
            .send(Method::PUT, "/api/todos/1", Some(json!({ "completed": true })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(todo["completed"], true);
        assert_eq!(todo["text"], "Buy milk");

        let (status, body) = app.send(Method::DELETE, "/api/todos/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": DELETED_MESSAGE }));

        let (status, body) = app.send(Method::GET, "/api/todos", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn created_todo_is_listed_once() {
        let app = TestApp::new().await;
        app.create("older").await;
        let created = app.create("  Walk the dog\t").await;

        let (_, todos) = app.send(Method::GET, "/api/todos", None).await;
        let todos = todos.as_array().unwrap();

        let matching: Vec<_> = todos
            .iter()
            .filter(|todo| todo["text"] == "Walk the dog")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0]["id"], created["id"]);
        assert_eq!(matching[0]["completed"], false);
        assert_eq!(matching[0]["created_at"], matching[0]["updated_at"]);
    }

    #[rstest]
    #[case::empty(json!({ "text": "" }))]
    #[case::whitespace(json!({ "text": "   " }))]
    #[case::missing(json!({}))]
    #[case::null(json!({ "text": null }))]
    #[tokio::test]
    async fn create_rejects_blank_text(#[case] body: Value) {
        let app = TestApp::new().await;

        let (status, body) = app.send(Method::POST, "/api/todos", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": TEXT_REQUIRED }));
        assert_eq!(app.store.count().await, 0);
    }

    #[tokio::test]
    async fn malformed_bodies_are_client_errors() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(Method::POST, "/api/todos", Some(json!({ "text": 5 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let request = Request::post("/api/todos")
            .body(Body::from(r#"{"text":"no content type"}"#))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(app.store.count().await, 0);
    }

    #[tokio::test]
    async fn toggling_preserves_text_and_id() {
        let app = TestApp::new().await;
        let created = app.create("Read a book").await;
        let uri = format!("/api/todos/{}", created["id"]);
        tokio::time::sleep(Duration::from_millis(2)).await;

        let (status, updated) = app
            .send(Method::PUT, &uri, Some(json!({ "completed": true })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["text"], created["text"]);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert!(timestamp(&updated["updated_at"]) >= timestamp(&created["updated_at"]));

        let (_, updated) = app
            .send(Method::PUT, &uri, Some(json!({ "completed": false })))
            .await;
        assert_eq!(updated["completed"], false);
    }

    #[tokio::test]
    async fn update_trims_and_validates_text() {
        let app = TestApp::new().await;
        let created = app.create("draft").await;
        let uri = format!("/api/todos/{}", created["id"]);

        let (status, updated) = app
            .send(Method::PUT, &uri, Some(json!({ "text": "  final  ", "completed": true })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["text"], "final");
        assert_eq!(updated["completed"], true);

        let (status, body) = app.send(Method::PUT, &uri, Some(json!({ "text": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": TEXT_REQUIRED }));

        let (_, todos) = app.send(Method::GET, "/api/todos", None).await;
        assert_eq!(todos[0]["text"], "final");
    }

    #[tokio::test]
    async fn empty_update_only_refreshes_timestamp() {
        let app = TestApp::new().await;
        let created = app.create("unchanged").await;
        let uri = format!("/api/todos/{}", created["id"]);
        tokio::time::sleep(Duration::from_millis(2)).await;

        let (status, updated) = app.send(Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["text"], "unchanged");
        assert_eq!(updated["completed"], false);
        assert!(timestamp(&updated["updated_at"]) > timestamp(&created["updated_at"]));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = TestApp::new().await;
        app.create("only one").await;

        let (status, body) = app
            .send(Method::PUT, "/api/todos/99", Some(json!({ "completed": true })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Todo not found" }));

        let (status, _) = app.send(Method::DELETE, "/api/todos/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        assert_eq!(app.store.count().await, 1);
    }

    #[tokio::test]
    async fn deleted_todo_is_gone() {
        let app = TestApp::new().await;
        let keep = app.create("keep").await;
        let drop = app.create("drop").await;
        let uri = format!("/api/todos/{}", drop["id"]);

        let (status, _) = app.send(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, todos) = app.send(Method::GET, "/api/todos", None).await;
        let ids: Vec<_> = todos.as_array().unwrap().iter().map(|t| &t["id"]).collect();
        assert_eq!(ids, [&keep["id"]]);

        let (status, _) = app
            .send(Method::PUT, &uri, Some(json!({ "completed": true })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.send(Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_is_strictly_newest_first() {
        let app = TestApp::new().await;

        for text in ["a", "b", "c", "d"] {
            app.create(text).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let (_, todos) = app.send(Method::GET, "/api/todos", None).await;
        let created: Vec<_> = (todos.as_array().unwrap().iter())
            .map(|todo| timestamp(&todo["created_at"]))
            .collect();

        assert_eq!(created.len(), 4);
        assert!(created.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_client_error() {
        let app = TestApp::new().await;

        let (status, body) = app.send(Method::DELETE, "/api/todos/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn store_failures_are_server_errors() {
        let app = TestApp::new().await;
        app.store.close().await;

        let (status, body) = app.send(Method::GET, "/api/todos", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to fetch todos" }));

        let (status, body) = app
            .send(Method::POST, "/api/todos", Some(json!({ "text": "lost" })))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to create todo" }));
    }
}
