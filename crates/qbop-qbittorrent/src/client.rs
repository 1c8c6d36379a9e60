//! HTTP client for the qBittorrent Web API (`/api/v2`).

use std::time::Duration;

use async_trait::async_trait;
use qbop_torrent_core::{RemoteError, RemoteResult, RemoteTorrent, RemoteTorrentService};
use reqwest::header::COOKIE;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::session::{Credentials, SESSION_COOKIE, Session, session_cookie};

const LOGIN_PATH: &str = "/api/v2/auth/login";
const TORRENTS_INFO_PATH: &str = "/api/v2/torrents/info";
const TORRENTS_ADD_PATH: &str = "/api/v2/torrents/add";
const TORRENTS_DELETE_PATH: &str = "/api/v2/torrents/delete";

const LIST_OPERATION: &str = "torrents.info";
const ADD_OPERATION: &str = "torrents.add";
const DELETE_OPERATION: &str = "torrents.delete";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for [`QbClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QbClientOptions {
    /// Timeout applied to every request, login included.
    pub timeout: Duration,
    /// Log in again and retry once when the service rejects the session.
    pub reauthenticate: bool,
}

impl Default for QbClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            reauthenticate: true,
        }
    }
}

/// Session-authenticated qBittorrent client.
///
/// The session token is shared by every call made through one client. The
/// client is safe to share across concurrent reconcile passes.
#[derive(Debug)]
pub struct QbClient {
    http: Client,
    base_url: String,
    reauthenticate: bool,
    session: RwLock<Session>,
}

impl QbClient {
    /// Build a client with default options.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] when the HTTP client cannot be built.
    pub fn new(base_url: &str) -> RemoteResult<Self> {
        Self::with_options(base_url, QbClientOptions::default())
    }

    /// Build a client with explicit options. A trailing `/` on the base URL is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Transport`] when the HTTP client cannot be built.
    pub fn with_options(base_url: &str, options: QbClientOptions) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|source| RemoteError::transport("client.build", source))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            reauthenticate: options.reauthenticate,
            session: RwLock::new(Session::default()),
        })
    }

    /// Base URL without the trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a session token is currently held.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.sid.is_some()
    }

    /// Log in and store the session token for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Authentication`] when the request fails, the
    /// service answers with a non-success status, or no `SID` cookie is set.
    pub async fn login(&self, username: &str, password: &str) -> RemoteResult<()> {
        let mut session = self.session.write().await;
        let sid = self.request_session(username, password).await?;
        session.sid = Some(sid);
        session.credentials = Some(Credentials::new(username, password));
        Ok(())
    }

    async fn request_session(&self, username: &str, password: &str) -> RemoteResult<String> {
        let url = self.endpoint(LOGIN_PATH);
        info!(url = %url, username, "logging in to qbittorrent");

        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|source| {
                warn!(error = %source, "qbittorrent login request failed");
                RemoteError::Authentication {
                    reason: "login request failed",
                    status: None,
                    source: Some(Box::new(source)),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "qbittorrent rejected login");
            return Err(RemoteError::authentication(
                "login rejected",
                Some(status.as_u16()),
            ));
        }

        let sid = session_cookie(response.headers()).ok_or_else(|| {
            warn!(
                status = status.as_u16(),
                "qbittorrent login response carried no session cookie"
            );
            RemoteError::authentication("missing session cookie", Some(status.as_u16()))
        })?;

        debug!(username, "qbittorrent session established");
        Ok(sid)
    }

    /// Send an authenticated request, logging in again once if the session was rejected.
    ///
    /// `build` is invoked per attempt because multipart bodies cannot be cloned.
    async fn execute<F>(&self, operation: &'static str, build: F) -> RemoteResult<Response>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let sid = self.session.read().await.sid.clone();
        match self.send(operation, build(&self.http), sid.as_deref()).await {
            Err(err) if err.is_unauthorized() && self.reauthenticate => {
                let Some(fresh) = self.refresh_session(sid.as_deref()).await? else {
                    return Err(err);
                };
                self.send(operation, build(&self.http), Some(&fresh)).await
            }
            result => result,
        }
    }

    /// Replace the session token if it is still the one that was rejected.
    async fn refresh_session(&self, rejected: Option<&str>) -> RemoteResult<Option<String>> {
        let mut session = self.session.write().await;
        if session.sid.as_deref() != rejected {
            // a concurrent pass already logged in again
            return Ok(session.sid.clone());
        }
        let Some(credentials) = session.credentials.clone() else {
            return Ok(None);
        };

        info!("qbittorrent session rejected, logging in again");
        let sid = self
            .request_session(&credentials.username, &credentials.password)
            .await?;
        session.sid = Some(sid.clone());
        Ok(Some(sid))
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        sid: Option<&str>,
    ) -> RemoteResult<Response> {
        let request = match sid {
            Some(sid) => request.header(COOKIE, format!("{SESSION_COOKIE}={sid}")),
            None => request,
        };
        let response = request
            .send()
            .await
            .map_err(|source| RemoteError::transport(operation, source))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        warn!(operation, status = status.as_u16(), "qbittorrent request failed");
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized {
                operation,
                status: status.as_u16(),
            });
        }
        Err(RemoteError::Status {
            operation,
            status: status.as_u16(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RemoteTorrentService for QbClient {
    async fn list_torrents(&self) -> RemoteResult<Vec<RemoteTorrent>> {
        let url = self.endpoint(TORRENTS_INFO_PATH);
        debug!(url = %url, "listing qbittorrent torrents");

        let response = self.execute(LIST_OPERATION, |http| http.get(&url)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| RemoteError::transport(LIST_OPERATION, source))?;
        let torrents: Vec<RemoteTorrent> = serde_json::from_slice(&body)
            .map_err(|source| RemoteError::decode(LIST_OPERATION, source))?;

        debug!(count = torrents.len(), "listed qbittorrent torrents");
        Ok(torrents)
    }

    async fn get_torrent(&self, hash: &str) -> RemoteResult<Option<RemoteTorrent>> {
        let found = self
            .list_torrents()
            .await?
            .into_iter()
            .find(|torrent| torrent.matches_hash(hash));
        if found.is_none() {
            debug!(hash, "torrent not present on qbittorrent");
        }
        Ok(found)
    }

    async fn add_torrent(&self, magnet_uri: &str) -> RemoteResult<()> {
        let url = self.endpoint(TORRENTS_ADD_PATH);
        info!(url = %url, "adding torrent to qbittorrent");

        // qBittorrent expects the magnet in a `urls` part; it is sent twice as
        // plain form fields for compatibility with older Web API versions.
        self.execute(ADD_OPERATION, |http| {
            let form = Form::new()
                .text("urls", magnet_uri.to_string())
                .text("urls", magnet_uri.to_string());
            http.post(&url).multipart(form)
        })
        .await?;

        info!("torrent added to qbittorrent");
        Ok(())
    }

    async fn delete_torrent(&self, hash: &str, delete_files: bool) -> RemoteResult<()> {
        let url = self.endpoint(TORRENTS_DELETE_PATH);
        info!(hash, delete_files, "deleting torrent from qbittorrent");

        let delete_files = if delete_files { "true" } else { "false" };
        self.execute(DELETE_OPERATION, |http| {
            http.post(&url)
                .form(&[("hashes", hash), ("deleteFiles", delete_files)])
        })
        .await?;

        info!(hash, "torrent deleted from qbittorrent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    async fn logged_in(server: &MockServer) -> anyhow::Result<QbClient> {
        let mut login = server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(200)
                .header("set-cookie", "SID=session-1; HttpOnly; path=/")
                .body("Ok.");
        });
        let client = QbClient::new(&format!("{}/", server.base_url()))?;
        client.login("admin", "adminadmin").await?;
        login.assert();
        login.delete();
        Ok(client)
    }

    #[tokio::test]
    async fn login_stores_session_cookie() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;
        assert!(client.is_authenticated().await);
        assert_eq!(client.base_url(), server.base_url());
        Ok(())
    }

    #[tokio::test]
    async fn login_sends_form_credentials() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let login = server.mock(|when, then| {
            when.method(POST)
                .path(LOGIN_PATH)
                .body("username=admin&password=secret");
            then.status(200).header("set-cookie", "SID=xyz; path=/");
        });
        let client = QbClient::new(&server.base_url())?;
        client.login("admin", "secret").await?;
        login.assert();
        Ok(())
    }

    #[tokio::test]
    async fn login_without_cookie_is_an_authentication_error() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(200).body("Fails.");
        });
        let client = QbClient::new(&server.base_url())?;
        let err = client
            .login("admin", "wrong")
            .await
            .expect_err("missing cookie should fail");
        assert!(matches!(
            err,
            RemoteError::Authentication {
                reason: "missing session cookie",
                status: Some(200),
                ..
            }
        ));
        assert!(!client.is_authenticated().await);
        Ok(())
    }

    #[tokio::test]
    async fn login_rejected_status_is_an_authentication_error() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(403).body("banned");
        });
        let client = QbClient::new(&server.base_url())?;
        let err = client
            .login("admin", "adminadmin")
            .await
            .expect_err("forbidden login should fail");
        assert!(matches!(
            err,
            RemoteError::Authentication {
                status: Some(403),
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn login_transport_failure_is_an_authentication_error() -> anyhow::Result<()> {
        let client = QbClient::with_options(
            "http://127.0.0.1:9",
            QbClientOptions {
                timeout: Duration::from_millis(500),
                reauthenticate: true,
            },
        )?;
        let err = client
            .login("admin", "adminadmin")
            .await
            .expect_err("closed port should fail");
        assert!(matches!(
            err,
            RemoteError::Authentication {
                status: None,
                source: Some(_),
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn list_sends_session_cookie_and_decodes() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;
        let list = server.mock(|when, then| {
            when.method(GET)
                .path(TORRENTS_INFO_PATH)
                .header("cookie", "SID=session-1");
            then.status(200).json_body(json!([
                {
                    "hash": "abc123",
                    "name": "ubuntu.iso",
                    "state": "downloading",
                    "total_size": 4096,
                    "amount_left": 1024,
                    "added_on": 1_700_000_000,
                    "progress": 0.75
                }
            ]));
        });

        let torrents = client.list_torrents().await?;
        list.assert();
        assert_eq!(torrents.len(), 1);
        assert_eq!(torrents[0].name, "ubuntu.iso");
        assert_eq!(torrents[0].amount_left, 1024);
        Ok(())
    }

    #[tokio::test]
    async fn list_classifies_error_statuses() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = QbClient::with_options(
            &server.base_url(),
            QbClientOptions {
                reauthenticate: false,
                ..QbClientOptions::default()
            },
        )?;
        let mut forbidden = server.mock(|when, then| {
            when.method(GET).path(TORRENTS_INFO_PATH);
            then.status(403);
        });
        let err = client.list_torrents().await.expect_err("403 should fail");
        assert!(matches!(
            err,
            RemoteError::Unauthorized {
                operation: LIST_OPERATION,
                status: 403
            }
        ));
        forbidden.delete();

        forbidden = server.mock(|when, then| {
            when.method(GET).path(TORRENTS_INFO_PATH);
            then.status(500);
        });
        let err = client.list_torrents().await.expect_err("500 should fail");
        assert!(matches!(err, RemoteError::Status { status: 500, .. }));
        forbidden.assert();
        Ok(())
    }

    #[tokio::test]
    async fn list_rejects_malformed_bodies() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;
        server.mock(|when, then| {
            when.method(GET).path(TORRENTS_INFO_PATH);
            then.status(200).body("not json");
        });
        let err = client.list_torrents().await.expect_err("decode should fail");
        assert!(matches!(
            err,
            RemoteError::Decode {
                operation: LIST_OPERATION,
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn get_torrent_distinguishes_absent_from_present() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;
        server.mock(|when, then| {
            when.method(GET).path(TORRENTS_INFO_PATH);
            then.status(200)
                .json_body(json!([{ "hash": "aaa" }, { "hash": "abc123", "state": "uploading" }]));
        });

        let found = client.get_torrent("ABC123").await?;
        assert_eq!(found.map(|torrent| torrent.state), Some("uploading".to_string()));
        assert!(client.get_torrent("fff").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn add_posts_multipart_magnet() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;
        let add = server.mock(|when, then| {
            when.method(POST)
                .path(TORRENTS_ADD_PATH)
                .header("cookie", "SID=session-1")
                .header_exists("content-type")
                .body_includes("name=\"urls\"")
                .body_includes("magnet:?xt=urn:btih:abc123");
            then.status(200).body("Ok.");
        });

        client.add_torrent("magnet:?xt=urn:btih:abc123").await?;
        add.assert();
        Ok(())
    }

    #[tokio::test]
    async fn delete_posts_hash_and_file_flag() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;
        let delete = server.mock(|when, then| {
            when.method(POST)
                .path(TORRENTS_DELETE_PATH)
                .body("hashes=abc123&deleteFiles=true");
            then.status(200);
        });
        client.delete_torrent("abc123", true).await?;
        delete.assert();

        let keep = server.mock(|when, then| {
            when.method(POST)
                .path(TORRENTS_DELETE_PATH)
                .body("hashes=abc123&deleteFiles=false");
            then.status(200);
        });
        client.delete_torrent("abc123", false).await?;
        keep.assert();
        Ok(())
    }

    #[tokio::test]
    async fn rejected_session_is_renewed_once() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;

        let stale = server.mock(|when, then| {
            when.method(GET)
                .path(TORRENTS_INFO_PATH)
                .header("cookie", "SID=session-1");
            then.status(403);
        });
        let relogin = server.mock(|when, then| {
            when.method(POST)
                .path(LOGIN_PATH)
                .body("username=admin&password=adminadmin");
            then.status(200).header("set-cookie", "SID=session-2; path=/");
        });
        let fresh = server.mock(|when, then| {
            when.method(GET)
                .path(TORRENTS_INFO_PATH)
                .header("cookie", "SID=session-2");
            then.status(200).json_body(json!([]));
        });

        assert!(client.list_torrents().await?.is_empty());
        stale.assert();
        relogin.assert();
        fresh.assert();
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_rejections_share_one_login() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = logged_in(&server).await?;

        let stale = server.mock(|when, then| {
            when.method(GET)
                .path(TORRENTS_INFO_PATH)
                .header("cookie", "SID=session-1");
            then.status(403).delay(Duration::from_millis(100));
        });
        let relogin = server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(200).header("set-cookie", "SID=session-2; path=/");
        });
        let fresh = server.mock(|when, then| {
            when.method(GET)
                .path(TORRENTS_INFO_PATH)
                .header("cookie", "SID=session-2");
            then.status(200).json_body(json!([]));
        });

        let (first, second) = tokio::join!(client.list_torrents(), client.list_torrents());
        assert!(first?.is_empty());
        assert!(second?.is_empty());
        stale.assert_hits(2);
        relogin.assert_hits(1);
        fresh.assert_hits(2);
        Ok(())
    }

    #[tokio::test]
    async fn renewal_is_skipped_without_credentials() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let client = QbClient::new(&server.base_url())?;
        server.mock(|when, then| {
            when.method(GET).path(TORRENTS_INFO_PATH);
            then.status(403);
        });
        let login = server.mock(|when, then| {
            when.method(POST).path(LOGIN_PATH);
            then.status(200).header("set-cookie", "SID=unused");
        });

        let err = client.list_torrents().await.expect_err("no session");
        assert!(err.is_unauthorized());
        login.assert_hits(0);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() -> anyhow::Result<()> {
        let client = QbClient::with_options(
            "http://127.0.0.1:9",
            QbClientOptions {
                timeout: Duration::from_millis(500),
                reauthenticate: true,
            },
        )?;
        let err = client
            .delete_torrent("abc123", true)
            .await
            .expect_err("closed port should fail");
        assert!(matches!(
            err,
            RemoteError::Transport {
                operation: DELETE_OPERATION,
                ..
            }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn slow_response_is_a_transport_error() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(TORRENTS_INFO_PATH);
            then.status(200)
                .json_body(json!([]))
                .delay(Duration::from_millis(1_000));
        });
        let client = QbClient::with_options(
            &server.base_url(),
            QbClientOptions {
                timeout: Duration::from_millis(100),
                reauthenticate: true,
            },
        )?;

        let err = client
            .list_torrents()
            .await
            .expect_err("request should time out");
        assert!(matches!(
            err,
            RemoteError::Transport {
                operation: LIST_OPERATION,
                ..
            }
        ));
        Ok(())
    }
}
