//! YouTube collaborators
//!
//! HTTP implementations of the core's collaborator boundaries.

pub mod captions;
pub mod data_api;

pub use captions::WatchPageCaptions;
pub use data_api::YouTubeDataApi;

use std::time::Duration;

use crate::error::ServerResult;

const USER_AGENT: &str = concat!("tubeindex-mcp/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for all collaborators
pub fn http_client(timeout: Duration) -> ServerResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

#[cfg(test)]
pub(crate) mod fake_http {
    //! Loopback HTTP server answering canned bodies by path

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub struct FakeHttp {
        base_url: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeHttp {
        /// `routes` receives the server's base URL and returns `(path, status, body)` triples.
        /// The query string is ignored when matching; unknown paths answer 404.
        pub async fn start<F>(routes: F) -> Self
        where
            F: FnOnce(&str) -> Vec<(&'static str, u16, String)>,
        {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let routes: HashMap<String, (u16, String)> = routes(&base_url)
                .into_iter()
                .map(|(path, status, body)| (path.to_string(), (status, body)))
                .collect();

            let requests = Arc::new(Mutex::new(Vec::new()));
            let log = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 4096];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&head);
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    let path = target.split('?').next().unwrap_or("/").to_string();
                    log.lock().unwrap().push(target);

                    let (status, body) = routes
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, "not found".to_string()));
                    let response = format!(
                        "HTTP/1.1 {} Fake\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            Self { base_url, requests }
        }

        pub fn base_url(&self) -> String {
            self.base_url.clone()
        }

        pub fn client(&self) -> reqwest::Client {
            reqwest::Client::builder().no_proxy().build().unwrap()
        }

        /// Request targets (path and query) in arrival order
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub fn hits(&self, path: &str) -> usize {
            self.requests()
                .iter()
                .filter(|target| target.split('?').next() == Some(path))
                .count()
        }
    }
}
