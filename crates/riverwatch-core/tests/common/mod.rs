#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use riverwatch_core::config::HttpConfig;
use riverwatch_core::http::HttpClient;

/// Start an Axum server on a random port, return its base URL.
pub async fn start_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// HTTP client with short backoff so retry tests stay fast.
pub fn fast_http(max_retries: u32) -> HttpClient {
    HttpClient::new(&HttpConfig {
        request_timeout_secs: 5,
        max_retries,
        backoff_base_ms: 1,
        ..HttpConfig::default()
    })
    .unwrap()
}

/// Shared request counter for stub handlers.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
