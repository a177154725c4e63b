//! Model server stub for adapter tests, served by axum on a local port.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Canned response for one path
#[derive(Clone)]
pub struct Route {
    path: &'static str,
    status: u16,
    body: &'static str,
}

impl Route {
    pub fn ok(path: &'static str, body: &'static str) -> Self {
        Self::status(path, 200, body)
    }

    pub fn status(path: &'static str, status: u16, body: &'static str) -> Self {
        Self { path, status, body }
    }
}

/// A request the stub received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub body: serde_json::Value,
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl StubState {
    fn record(&self, uri: &Uri, body: &Bytes) {
        let body = serde_json::from_slice(body).unwrap_or(serde_json::Value::Null);
        self.requests.lock().unwrap().push(Recorded {
            path: uri.path().to_string(),
            body,
        });
    }
}

fn reply(status: u16, body: &'static str) -> Response {
    let status = StatusCode::from_u16(status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

pub struct StubServer {
    addr: std::net::SocketAddr,
    state: StubState,
}

impl StubServer {
    pub async fn start(routes: Vec<Route>) -> Self {
        let state = StubState::default();

        let mut app: Router<StubState> = Router::new();
        for route in routes {
            app = app.route(
                route.path,
                any(
                    move |State(state): State<StubState>, uri: Uri, body: Bytes| async move {
                        state.record(&uri, &body);
                        reply(route.status, route.body)
                    },
                ),
            );
        }
        let app = app
            .fallback(
                |State(state): State<StubState>, uri: Uri, body: Bytes| async move {
                    state.record(&uri, &body);
                    reply(404, r#"{"error":"not found"}"#)
                },
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_records_json_body_and_serves_route() {
        let server = StubServer::start(vec![Route::status(
            "/api/chat",
            500,
            r#"{"error":"busy"}"#,
        )])
        .await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/chat", server.base_url()))
            .json(&serde_json::json!({"model": "llama3.2"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(response.text().await.unwrap(), r#"{"error":"busy"}"#);
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/api/chat");
        assert_eq!(requests[0].body["model"], "llama3.2");
    }

    #[tokio::test]
    async fn test_unknown_path_is_recorded_as_not_found() {
        let server = StubServer::start(Vec::new()).await;

        let response = reqwest::get(format!("{}/api/tags", server.base_url()))
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 404);
        let requests = server.requests();
        assert_eq!(requests[0].path, "/api/tags");
        assert!(requests[0].body.is_null());
    }

    #[tokio::test]
    async fn test_chunked_request_body_is_recorded() {
        let server = StubServer::start(vec![Route::ok("/api/chat", r#"{"done":true}"#)]).await;
        let addr = server.base_url().trim_start_matches("http://").to_string();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"POST /api/chat HTTP/1.1\r\n\
                  Host: localhost\r\n\
                  Content-Type: application/json\r\n\
                  Transfer-Encoding: chunked\r\n\
                  Connection: close\r\n\r\n\
                  8\r\n{\"model\"\r\n\
                  b\r\n:\"phi3\"}   \r\n\
                  0\r\n\r\n",
            )
            .await
            .unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();

        assert!(response.starts_with(b"HTTP/1.1 200"));
        let requests = server.requests();
        assert_eq!(requests[0].body["model"], "phi3");
    }
}
