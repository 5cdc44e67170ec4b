//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pc_repair_site::{Shutdown, SiteConfig, SiteServer};

/// In-process stand-in for the durable store's REST interface.
#[derive(Default)]
pub struct MockKv {
    pub fail: AtomicBool,
    pub commands: Mutex<Vec<Vec<String>>>,
    counters: Mutex<HashMap<String, u64>>,
}

impl MockKv {
    pub fn commands_named(&self, name: &str) -> Vec<Vec<String>> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.first().map(String::as_str) == Some(name))
            .cloned()
            .collect()
    }

    fn execute(&self, command: &[String]) -> Value {
        self.commands.lock().unwrap().push(command.to_vec());
        match command.first().map(String::as_str) {
            Some("INCR") => {
                let mut counters = self.counters.lock().unwrap();
                let count = counters.entry(command[1].clone()).or_insert(0);
                *count += 1;
                json!({ "result": *count })
            }
            Some("EXPIRE") => json!({ "result": 1 }),
            Some("HSET") => json!({ "result": (command.len() - 2) / 2 }),
            _ => json!({ "error": "ERR unknown command" }),
        }
    }
}

/// Read one HTTP/1.1 request and return its body.
async fn read_request(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = header_end + 4;
        while buf.len() < body_start + length {
            let n = socket.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        return Some(buf[body_start..body_start + length].to_vec());
    }
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Start the mock store on an ephemeral port.
pub async fn start_mock_kv() -> (SocketAddr, Arc<MockKv>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let kv = Arc::new(MockKv::default());
    let shared = kv.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let kv = shared.clone();
            tokio::spawn(async move {
                let Some(body) = read_request(&mut socket).await else {
                    return;
                };
                if kv.fail.load(Ordering::SeqCst) {
                    respond(&mut socket, "500 Internal Server Error", "{}").await;
                    return;
                }
                let commands: Vec<Vec<String>> = match serde_json::from_slice(&body) {
                    Ok(c) => c,
                    Err(_) => {
                        respond(&mut socket, "400 Bad Request", "{}").await;
                        return;
                    }
                };
                let replies: Vec<Value> = commands.iter().map(|c| kv.execute(c)).collect();
                respond(&mut socket, "200 OK", &Value::Array(replies).to_string()).await;
            });
        }
    });

    (addr, kv)
}

/// Config for a test server, optionally wired to a mock store.
pub fn test_config(kv: Option<SocketAddr>, pages: &Path) -> SiteConfig {
    let mut config = SiteConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.pages.root = pages.to_string_lossy().into_owned();
    if let Some(addr) = kv {
        config.store.rest_url = Some(format!("http://{}", addr));
        config.store.rest_token = Some("test-token".into());
    }
    config
}

/// Start a server on an ephemeral port.
pub async fn start_server(config: SiteConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = SiteServer::new(config);
    let server_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
