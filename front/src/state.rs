use tick_api::v1::{trimmed_text, CreateTodo, Todo, UpdateTodo};

use crate::api::ClientError;

/// Everything the list view shows.
///
/// Remote calls are split into a request half, which decides what to send,
/// and a `finish_*` half, which folds the server's answer back in. Local todos
/// only change once the server has confirmed a mutation.
#[derive(Clone, Debug, Default)]
pub struct TodoList {
    todos: Vec<Todo>,
    input: String,
    loading: bool,
    error: Option<String>,
}

impl TodoList {
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.todos.len()
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn finish_load(&mut self, result: Result<Vec<Todo>, ClientError>) {
        self.loading = false;

        match result {
            Ok(todos) => {
                self.todos = todos;
                self.error = None;
            }
            Err(err) => self.fail(err),
        }
    }

    /// The create request for the current input, if it isn't blank.
    pub fn submission(&self) -> Option<CreateTodo> {
        if self.loading {
            return None;
        }

        trimmed_text(&self.input).map(|_| CreateTodo::new(self.input.clone()))
    }

    pub fn finish_create(&mut self, result: Result<Todo, ClientError>) {
        match result {
            Ok(todo) => {
                self.todos.insert(0, todo);
                self.input.clear();
                self.error = None;
            }
            Err(err) => self.fail(err),
        }
    }

    /// The update that flips completion of the todo with `id`.
    pub fn toggle(&self, id: i64) -> Option<UpdateTodo> {
        let todo = self.get(id)?;
        Some(UpdateTodo::completed(!todo.completed))
    }

    /// The update that replaces the text of the todo with `id`. Blank or
    /// unchanged text sends nothing.
    pub fn rename(&self, id: i64, text: &str) -> Option<UpdateTodo> {
        let todo = self.get(id)?;
        let text = trimmed_text(text)?;

        match text == todo.text {
            true => None,
            false => Some(UpdateTodo::text(text)),
        }
    }

    pub fn finish_update(&mut self, result: Result<Todo, ClientError>) {
        match result {
            Ok(updated) => {
                if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == updated.id) {
                    *todo = updated;
                }

                self.error = None;
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn finish_delete<T>(&mut self, id: i64, result: Result<T, ClientError>) {
        match result {
            Ok(_) => {
                self.todos.retain(|todo| todo.id != id);
                self.error = None;
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: ClientError) {
        tracing::error!(status = ?err.status(), "{}", err);
        self.error = Some(err.to_string());
    }
}
