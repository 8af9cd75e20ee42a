pub mod api;
pub mod state;
pub mod ui;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    api::ApiClient,
    state::TodoList,
    ui::{
        todo_input::{AddTodo, RenameTodo},
        RenderError,
    },
};

const NOT_FOUND: &str = "Todo not found";

/// Drives the API client from the page's actions and folds the answers into
/// the view-state.
///
/// The lock is only held while reading or updating the view-state, never
/// across a request, so the page can be drawn while a call is in flight.
pub struct App {
    client: ApiClient,
    list: Mutex<TodoList>,
}

impl App {
    /// The first load is pending until [`App::load`] finishes.
    pub fn new(client: ApiClient) -> Self {
        let mut list = TodoList::default();
        list.begin_load();

        Self {
            client,
            list: Mutex::new(list),
        }
    }

    pub async fn list(&self) -> TodoList {
        self.list.lock().await.clone()
    }

    pub async fn load(&self) {
        self.list.lock().await.begin_load();
        let result = self.client.get_todos().await;
        self.list.lock().await.finish_load(result);
    }

    pub async fn add(&self, text: String) {
        let submission = {
            let mut list = self.list.lock().await;
            list.set_input(text);
            list.submission()
        };

        let Some(todo) = submission else {
            debug!("ignored blank submission");
            return;
        };

        let result = self.client.add_todo(&todo).await;
        self.list.lock().await.finish_create(result);
    }

    pub async fn toggle(&self, id: i64) {
        let update = self.list.lock().await.toggle(id);
        let Some(update) = update else {
            self.list.lock().await.set_error(NOT_FOUND);
            return;
        };

        let result = self.client.update_todo(id, &update).await;
        self.list.lock().await.finish_update(result);
    }

    pub async fn rename(&self, id: i64, text: &str) {
        let update = self.list.lock().await.rename(id, text);
        let Some(update) = update else {
            return;
        };

        let result = self.client.update_todo(id, &update).await;
        self.list.lock().await.finish_update(result);
    }

    pub async fn delete(&self, id: i64) {
        let result = self.client.delete_todo(id).await;
        self.list.lock().await.finish_delete(id, result);
    }
}

pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/todos", post(add_todo))
        .route("/todos/:id/toggle", post(toggle_todo))
        .route("/todos/:id/text", post(rename_todo))
        .route("/todos/:id/delete", post(delete_todo))
        .with_state(app)
}

async fn index(State(app): State<Arc<App>>) -> Result<Html<String>, RenderError> {
    let list = app.list().await;
    Ok(Html(ui::view(&list)?))
}

async fn add_todo(State(app): State<Arc<App>>, Form(form): Form<AddTodo>) -> Redirect {
    app.add(form.text).await;
    Redirect::to("/")
}

async fn toggle_todo(State(app): State<Arc<App>>, Path(id): Path<i64>) -> Redirect {
    app.toggle(id).await;
    Redirect::to("/")
}

async fn rename_todo(
    State(app): State<Arc<App>>,
    Path(id): Path<i64>,
    Form(form): Form<RenameTodo>,
) -> Redirect {
    app.rename(id, &form.text).await;
    Redirect::to("/")
}

async fn delete_todo(State(app): State<Arc<App>>, Path(id): Path<i64>) -> Redirect {
    app.delete(id).await;
    Redirect::to("/")
}
