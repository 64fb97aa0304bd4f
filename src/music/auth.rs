// SPDX-License-Identifier: MPL-2.0

use crate::config::{AUTHORIZE_URL, CLIENT_ID, SCOPES};
use crate::music::MusicError;
use crate::runtime;
use crate::state::{StoredToken, TokenStatus, TokenStore, now_ms};
use regex::Regex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use url::Url;

/// Extract a single parameter from a URL by name. The parameter may sit in
/// the query string or the fragment, so it can follow `?`, `&`, or `#`.
pub fn get_url_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let pattern = format!("(?i)[?&#]{}=([^&#]*)", regex::escape(name));
    let re = Regex::new(&pattern).expect("escaped parameter name forms a valid pattern");
    re.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// How an authorization attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized(StoredToken),
    /// The user dismissed the provider's consent page.
    Canceled,
}

/// Seam between the token handshake and the browser. The default
/// implementation is [`LoopbackFlow`]; tests substitute canned callbacks.
#[allow(async_fn_in_trait)]
pub trait BrowserFlow {
    /// The redirect target the provider sends the browser back to.
    fn redirect_uri(&self) -> String;

    /// Open the authorization page and wait for the redirect, returning the
    /// full callback URL.
    async fn authorize(&self, authorize_url: &Url) -> Result<String, MusicError>;
}

/// Drives the implicit-grant handshake against the music service and owns
/// the persisted token that results from it.
pub struct Authenticator<F> {
    store: TokenStore,
    flow: F,
    in_flight: AtomicBool,
}

impl<F: BrowserFlow> Authenticator<F> {
    pub fn new(store: TokenStore, flow: F) -> Self {
        Self {
            store,
            flow,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Check the persisted credential, clearing it if it has expired.
    pub fn check_stored_token(&self) -> Result<TokenStatus, MusicError> {
        Ok(self.store.status()?)
    }

    /// Run the browser handshake and persist the resulting token.
    ///
    /// At most one flow may be in flight; a concurrent call fails with
    /// [`MusicError::AlreadyInProgress`] and has no side effect. Cancellation
    /// and failure both leave the stored credential untouched.
    pub async fn begin_authorization(&self) -> Result<AuthOutcome, MusicError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("authorization attempt blocked: a browser session is already open");
            return Err(MusicError::AlreadyInProgress);
        }
        let _armed = InFlightGuard(&self.in_flight);

        let redirect_uri = self.flow.redirect_uri();
        let authorize_url = build_authorize_url(&redirect_uri)?;
        let callback = self.flow.authorize(&authorize_url).await?;
        self.complete_at(&callback, now_ms())
    }

    fn complete_at(&self, callback: &str, now_ms: i64) -> Result<AuthOutcome, MusicError> {
        if let Some(error) = get_url_param(callback, "error") {
            debug!(error, "authorization denied or canceled");
            return Ok(AuthOutcome::Canceled);
        }

        let access_token = get_url_param(callback, "access_token")
            .ok_or_else(|| MusicError::InvalidCallback("missing access_token".to_string()))?;
        let ttl_secs: i64 = get_url_param(callback, "expires_in")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| MusicError::InvalidCallback("missing or invalid expires_in".to_string()))?;

        let token = StoredToken {
            access_token: access_token.to_string(),
            expires_at_ms: now_ms + ttl_secs * 1000,
        };
        self.store.store(&token)?;
        Ok(AuthOutcome::Authorized(token))
    }
}

/// Releases the single-flight flag on every exit path, including drops of an
/// unresolved flow.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn build_authorize_url(redirect_uri: &str) -> Result<Url, MusicError> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", CLIENT_ID),
            ("response_type", "token"),
            ("redirect_uri", redirect_uri),
            ("scope", &SCOPES.join(" ")),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| MusicError::Transport(format!("invalid authorize url: {e}")))
}

/// Default browser flow: a loopback HTTP listener receives the provider's
/// redirect while the system browser shows the consent page.
pub struct LoopbackFlow {
    server: Arc<tiny_http::Server>,
    port: u16,
}

impl LoopbackFlow {
    pub fn bind() -> Result<Self, MusicError> {
        let server =
            tiny_http::Server::http("127.0.0.1:0").map_err(|e| MusicError::Transport(e.to_string()))?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| MusicError::Transport("listener has no IP address".to_string()))?;

        Ok(Self {
            server: Arc::new(server),
            port,
        })
    }

    /// The provider delivers the token in the URL fragment, which never
    /// reaches an HTTP server. The first response is a relay page that
    /// re-submits the fragment as a query string; the second request then
    /// carries the parameters where the listener can see them.
    fn wait_for_callback(server: &tiny_http::Server, port: u16) -> Result<String, MusicError> {
        loop {
            let request = server.recv().map_err(|e| MusicError::Transport(e.to_string()))?;
            let tail = request.url().to_string();

            let has_params = tail.split_once('?').is_some_and(|(_, q)| !q.is_empty());
            if has_params {
                let _ = request.respond(page("You can close this window and return to Duet."));
                return Ok(format!("http://127.0.0.1:{port}{tail}"));
            }

            let _ = request.respond(page(RELAY_SCRIPT));
        }
    }
}

impl BrowserFlow for LoopbackFlow {
    fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/callback", self.port)
    }

    async fn authorize(&self, authorize_url: &Url) -> Result<String, MusicError> {
        open::that(authorize_url.as_str()).map_err(|e| MusicError::Transport(e.to_string()))?;

        let server = Arc::clone(&self.server);
        let port = self.port;
        runtime::spawn_blocking(move || Self::wait_for_callback(&server, port))
            .await
            .map_err(|e| MusicError::Transport(e.to_string()))?
    }
}

const RELAY_SCRIPT: &str =
    "<script>var h=location.hash.slice(1);location.replace('/capture?'+h);</script>";

fn page(body: &str) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..])
        .expect("static header is valid");
    tiny_http::Response::from_string(format!("<html><body>{body}</body></html>")).with_header(header)
}
