use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tick_api::v1::{CreateTodo, Deleted, ErrorBody, Todo, UpdateTodo};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error status.
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get_todos(&self) -> Result<Vec<Todo>, ClientError> {
        let response = self.client.get(self.url("todos")).send().await?;
        decode(response).await
    }

    pub async fn add_todo(&self, todo: &CreateTodo) -> Result<Todo, ClientError> {
        let response = (self.client.post(self.url("todos")))
            .json(todo)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn update_todo(&self, id: i64, update: &UpdateTodo) -> Result<Todo, ClientError> {
        let response = (self.client.put(self.url(&format!("todos/{id}"))))
            .json(update)
            .send()
            .await?;

        decode(response).await
    }

    pub async fn delete_todo(&self, id: i64) -> Result<Deleted, ClientError> {
        let response = (self.client.delete(self.url(&format!("todos/{id}"))))
            .send()
            .await?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => (status.canonical_reason())
            .unwrap_or("Request failed")
            .to_owned(),
    };

    Err(ClientError::Server { status, message })
}
