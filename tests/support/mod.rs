//! Local axum stub standing in for the text generation endpoint
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;

/// Request as seen by the stub
#[derive(Debug, Clone)]
pub struct Captured
{   pub headers: HeaderMap
  , pub body: String
}

#[derive(Debug)]
enum Reply
{   Respond(u16, String)
  , Hang
}

struct StubState
{   reply: Reply
  , hits: AtomicUsize
  , requests: Mutex<Vec<Captured>>
}

pub struct StubServer
{   pub url: String
  , state: Arc<StubState>
}

impl StubServer
{   pub fn hit_count(&self) -> usize
    {   self.state.hits.load(Ordering::SeqCst)
    }

    /// Body of the n-th request received
    pub fn body(&self, n: usize) -> serde_json::Value
    {   let body = self.state.requests.lock().unwrap()[n].body.clone();
        serde_json::from_str(&body).unwrap()
    }

    /// Header value of the n-th request, case-insensitive name
    pub fn header(&self, n: usize, name: &str) -> Option<String>
    {   let requests = self.state.requests.lock().unwrap();
        requests[n]
          .headers
          .get(name)
          .and_then(|v| v.to_str().ok())
          .map(str::to_string)
    }
}

/// Server answering every request with `status` and `body`
pub async fn respond(status: u16, body: &str) -> StubServer
{   spawn(Reply::Respond(status, body.to_string())).await
}

/// Server that accepts the request and never answers
pub async fn hang() -> StubServer
{   spawn(Reply::Hang).await
}

/// Address nobody is listening on
pub async fn closed_url() -> String
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/ml/v1/text/generation", addr)
}

async fn handle(
  State(state): State<Arc<StubState>>
, headers: HeaderMap
, body: String
) -> Response
{   state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(Captured { headers, body });

    match &state.reply
    {   Reply::Respond(status, body) => {
          let status = StatusCode::from_u16(*status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
          (
            status
          , [(header::CONTENT_TYPE, "application/json")]
          , body.clone()
          ).into_response()
        }
      , Reply::Hang => {
          tokio::time::sleep(Duration::from_secs(30)).await;
          StatusCode::GATEWAY_TIMEOUT.into_response()
        }
    }
}

async fn spawn(reply: Reply) -> StubServer
{   let state = Arc::new(StubState
    {   reply
      , hits: AtomicUsize::new(0)
      , requests: Mutex::new(Vec::new())
    });
    let app = Router::new()
      .fallback(handle)
      .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let _ = axum::serve(listener, app).await;
    });

    StubServer
    {   url: format!("http://{}/ml/v1/text/generation?version=2023-05-29", addr)
      , state
    }
}
