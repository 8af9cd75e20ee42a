use askama::Template;
use serde::Deserialize;

pub const PLACEHOLDER: &str = "Add a new task...";

/// The form that adds a todo.
#[derive(Template)]
#[template(
    source = r#"<form class="todo-input" method="post" action="/todos">
<input type="text" name="text" value="{{ value }}" placeholder="{{ placeholder }}" autofocus>
<button type="submit"{% if disabled %} disabled{% endif %}>Add</button>
</form>"#,
    ext = "html"
)]
pub struct TodoInput<'a> {
    value: &'a str,
    placeholder: &'a str,
    disabled: bool,
}

impl<'a> TodoInput<'a> {
    /// Keeps `value` in the field, the Add button is disabled while `loading`.
    pub fn new(value: &'a str, loading: bool) -> Self {
        Self {
            value,
            placeholder: PLACEHOLDER,
            disabled: loading,
        }
    }
}

/// Submitted by [`TodoInput`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AddTodo {
    #[serde(default)]
    pub text: String,
}

/// Submitted by the per-item rename field.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RenameTodo {
    #[serde(default)]
    pub text: String,
}
