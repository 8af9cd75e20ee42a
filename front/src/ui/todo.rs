use askama::Template;
use tick_api::v1::Todo;

/// One row of the list: completion checkbox, editable text and a delete
/// button. Each control posts to the todo's own route.
#[derive(Template)]
#[template(
    source = r#"<li class="todo{% if todo.completed %} completed{% endif %}">
<form method="post" action="/todos/{{ todo.id }}/toggle">
<input type="checkbox" aria-label="{{ toggle_label }}"{% if todo.completed %} checked{% endif %} onchange="this.form.submit()">
</form>
<form class="text" method="post" action="/todos/{{ todo.id }}/text">
<input type="text" name="text" value="{{ todo.text }}">
</form>
<form method="post" action="/todos/{{ todo.id }}/delete">
<button class="delete" type="submit" aria-label="Delete todo">Delete</button>
</form>
</li>"#,
    ext = "html"
)]
pub struct TodoItem<'a> {
    todo: &'a Todo,
    toggle_label: &'static str,
}

pub fn view(todo: &Todo) -> askama::Result<String> {
    let toggle_label = match todo.completed {
        true => "Mark as not completed",
        false => "Mark as completed",
    };

    TodoItem { todo, toggle_label }.render()
}
