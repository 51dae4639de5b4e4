//! In-process HTTP stub that replays canned responses over a real socket.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct StubResponse {
  status: u16,
  headers: Vec<(String, String)>,
  body: Vec<u8>,
  hang: bool,
}

impl StubResponse {
  pub fn status(status: u16, body: &str) -> Self {
    Self {
      status,
      headers: Vec::new(),
      body: body.as_bytes().to_vec(),
      hang: false,
    }
  }

  pub fn ok(body: &str) -> Self {
    Self::status(200, body)
  }

  pub fn not_modified() -> Self {
    Self::status(304, "")
  }

  /// Read the request, then never answer.
  pub fn hang() -> Self {
    Self {
      hang: true,
      ..Self::status(200, "")
    }
  }

  pub fn with_header(mut self, name: &str, value: &str) -> Self {
    self.headers.push((name.to_string(), value.to_string()));
    self
  }
}

/// Serves one canned response per accepted connection, in order.
pub struct StubServer {
  addr: SocketAddr,
  requests: Arc<Mutex<Vec<String>>>,
  task: JoinHandle<()>,
}

impl StubServer {
  pub async fn start(responses: Vec<StubResponse>) -> Self {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&requests);
    let task = tokio::spawn(async move {
      for response in responses {
        let Ok((stream, _)) = listener.accept().await else {
          return;
        };
        tokio::spawn(respond(stream, response, Arc::clone(&recorded)));
      }
    });

    Self {
      addr,
      requests,
      task,
    }
  }

  /// A URL nothing is listening on.
  pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/evolution.json", addr)
  }

  pub fn url(&self) -> String {
    format!("http://{}/evolution.json", self.addr)
  }

  /// Lowercased request heads received so far.
  pub fn requests(&self) -> Vec<String> {
    self.requests.lock().unwrap().clone()
  }
}

impl Drop for StubServer {
  fn drop(&mut self) {
    self.task.abort();
  }
}

async fn respond(mut stream: TcpStream, response: StubResponse, recorded: Arc<Mutex<Vec<String>>>) {
  let mut head = Vec::new();
  let mut buf = [0u8; 1024];
  while !head.windows(4).any(|w| w == b"\r\n\r\n") {
    match stream.read(&mut buf).await {
      Ok(0) | Err(_) => return,
      Ok(n) => head.extend_from_slice(&buf[..n]),
    }
  }
  recorded
    .lock()
    .unwrap()
    .push(String::from_utf8_lossy(&head).to_lowercase());

  if response.hang {
    tokio::time::sleep(Duration::from_secs(30)).await;
    return;
  }

  let reason = reqwest::StatusCode::from_u16(response.status)
    .ok()
    .and_then(|s| s.canonical_reason())
    .unwrap_or("Unknown");
  let mut out = format!("HTTP/1.1 {} {}\r\n", response.status, reason);
  for (name, value) in &response.headers {
    out.push_str(&format!("{}: {}\r\n", name, value));
  }
  out.push_str(&format!(
    "Content-Length: {}\r\nConnection: close\r\n\r\n",
    response.body.len()
  ));

  let mut bytes = out.into_bytes();
  bytes.extend_from_slice(&response.body);
  let _ = stream.write_all(&bytes).await;
  let _ = stream.shutdown().await;
}
