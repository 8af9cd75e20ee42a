pub mod todo;
pub mod todo_input;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::state::TodoList;

pub const LOADING: &str = "Loading todos...";
pub const EMPTY: &str = "No tasks yet. Add one above to get started!";

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Todo List</title>
{% if loading %}<meta http-equiv="refresh" content="1">{% endif %}
<style>
body { font-family: sans-serif; background: #f4f5f7; margin: 0; }
main { max-width: 36rem; margin: 3rem auto; background: #fff; border-radius: 8px; padding: 1.5rem; }
.subtitle, .stats, .loading, .empty { color: #6b7280; }
.error { background: #fee2e2; color: #b91c1c; border-radius: 4px; padding: 0.5rem 0.75rem; }
.todos { list-style: none; padding: 0; }
.todo { display: flex; gap: 0.5rem; align-items: center; border-bottom: 1px solid #e5e7eb; padding: 0.5rem 0; }
.todo .text { flex: 1; }
.todo .text input { width: 100%; border: none; font: inherit; }
.todo.completed .text input { color: #9ca3af; text-decoration: line-through; }
.delete { color: #b91c1c; }
</style>
</head>
<body>
<main>
<h1>Todo List</h1>
<p class="subtitle">Stay organized and productive</p>
{{ input|safe }}
{% if let Some(error) = error %}<div class="error" role="alert">{{ error }}</div>{% endif %}
{% if loading %}<p class="loading">{{ loading_text }}</p>
{% else if items.is_empty() %}<p class="empty">{{ empty_text }}</p>
{% else %}<ul class="todos">
{% for item in items %}{{ item|safe }}
{% endfor %}</ul>
{% endif %}
{% if total > 0 %}<p class="stats">{{ completed }} of {{ total }} completed</p>{% endif %}
</main>
</body>
</html>"#,
    ext = "html"
)]
struct Page<'a> {
    input: String,
    error: Option<&'a str>,
    loading: bool,
    loading_text: &'a str,
    empty_text: &'a str,
    items: Vec<String>,
    completed: usize,
    total: usize,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to render page: {0}")]
pub struct RenderError(#[from] askama::Error);

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        error!("{}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
    }
}

/// Renders the whole list page.
pub fn view(list: &TodoList) -> Result<String, RenderError> {
    let input = todo_input::TodoInput::new(list.input(), list.is_loading()).render()?;

    let items = (list.todos().iter())
        .map(todo::view)
        .collect::<Result<Vec<_>, _>>()?;

    let page = Page {
        input,
        error: list.error(),
        loading: list.is_loading(),
        loading_text: LOADING,
        empty_text: EMPTY,
        items,
        completed: list.completed_count(),
        total: list.total_count(),
    };

    Ok(page.render()?)
}
