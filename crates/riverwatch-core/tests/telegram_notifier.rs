//! Telegram notifier against a stub Bot API.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde_json::json;

use common::{fast_http, start_server, Hits};
use riverwatch_core::config::ChatConfig;
use riverwatch_core::notify::{Delivery, Notifier, TelegramNotifier};
use riverwatch_core::Error;

const SEND_PATH: &str = "/botTESTTOKEN/sendMessage";

type Captured = Arc<Mutex<Vec<HashMap<String, String>>>>;

fn notifier(api_base: &str) -> TelegramNotifier {
    let config = ChatConfig {
        api_base: api_base.to_string(),
        bot_token: Some("TESTTOKEN".to_string()),
        chat_id: Some("-100777".to_string()),
        ..ChatConfig::default()
    };
    TelegramNotifier::new(fast_http(2), &config).unwrap()
}

fn bot_api(status: StatusCode, captured: Captured, hits: Hits) -> Router {
    Router::new().route(
        SEND_PATH,
        post(move |Form(form): Form<HashMap<String, String>>| {
            let captured = captured.clone();
            let hits = hits.clone();
            async move {
                hits.hit();
                captured.lock().unwrap().push(form);
                let body = if status.is_success() {
                    json!({"ok": true, "result": {"message_id": 1}})
                } else {
                    json!({"ok": false, "error_code": status.as_u16(), "description": "Internal Server Error: retry later"})
                };
                (status, Json(body))
            }
        }),
    )
}

#[tokio::test]
async fn test_message_posted_as_form() {
    let captured = Captured::default();
    let hits = Hits::default();
    let base = start_server(bot_api(StatusCode::OK, captured.clone(), hits.clone())).await;

    let delivery = notifier(&base)
        .deliver(Some("<b>📰 New Important Articles:</b>\n\n"))
        .await
        .unwrap();

    assert_eq!(delivery, Delivery::Sent);
    assert_eq!(hits.count(), 1);

    let forms = captured.lock().unwrap();
    assert_eq!(forms[0]["chat_id"], "-100777");
    assert_eq!(forms[0]["parse_mode"], "HTML");
    assert_eq!(forms[0]["text"], "<b>📰 New Important Articles:</b>\n\n");
}

#[tokio::test]
async fn test_server_error_is_delivery_failed() {
    let hits = Hits::default();
    let base = start_server(bot_api(StatusCode::INTERNAL_SERVER_ERROR, Captured::default(), hits.clone())).await;

    let err = notifier(&base).deliver(Some("digest")).await.unwrap_err();

    match err {
        Error::DeliveryFailed(reason) => {
            assert!(reason.contains("500"));
            assert!(reason.contains("retry later"));
            assert!(!reason.contains("TESTTOKEN"));
        }
        other => panic!("expected DeliveryFailed, got {:?}", other),
    }
    // Status errors are not retried
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn test_no_message_makes_no_request() {
    let hits = Hits::default();
    let base = start_server(bot_api(StatusCode::OK, Captured::default(), hits.clone())).await;

    let delivery = notifier(&base).deliver(None).await.unwrap();

    assert_eq!(delivery, Delivery::NothingToSend);
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_delivery_failed() {
    let err = notifier(&common::closed_base_url())
        .deliver(Some("digest"))
        .await
        .unwrap_err();

    match err {
        Error::DeliveryFailed(reason) => assert!(!reason.contains("TESTTOKEN")),
        other => panic!("expected DeliveryFailed, got {:?}", other),
    }
}

/// Answers one request with a 500 whose body ends before its Content-Length
async fn truncated_error_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        // Consume the whole request so closing the socket does not reset it
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            request.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| l.to_ascii_lowercase().strip_prefix("content-length:").map(|v| v.trim().to_string()))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: 200\r\n\r\n{\"ok\":")
            .await
            .unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_unreadable_error_body_is_named_in_reason() {
    let base = truncated_error_server().await;

    let err = notifier(&base).deliver(Some("digest")).await.unwrap_err();

    match err {
        Error::DeliveryFailed(reason) => {
            assert!(reason.contains("500"), "{}", reason);
            assert!(reason.contains("unreadable body"), "{}", reason);
            assert!(!reason.contains("TESTTOKEN"));
        }
        other => panic!("expected DeliveryFailed, got {:?}", other),
    }
}
