// Booking site HTTP client
//
// Wraps `reqwest::Client` with the endpoint set, a private cookie jar and
// an optional captcha solver. Login and submit flows live in `auth.rs` and
// `seat.rs` as inherent methods to keep this module about transport.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::captcha::CaptchaSolver;
use crate::endpoints::Endpoints;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for one user's session on the booking site.
///
/// Each instance owns its cookie jar, so two clients never share a
/// session. Create one per user.
pub struct SeatClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    cookie_jar: Option<Arc<Jar>>,
    captcha: Option<Arc<dyn CaptchaSolver>>,
}

impl SeatClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the login flow requires cookies).
    pub fn new(endpoints: Endpoints, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            endpoints,
            cookie_jar,
            captcha: None,
        })
    }

    /// Attach a slider captcha solver, used when a submit asks for one.
    pub fn with_captcha_solver(mut self, solver: Arc<dyn CaptchaSolver>) -> Self {
        self.captcha = Some(solver);
        self
    }

    /// The underlying HTTP client (for flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The configured endpoint set.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn captcha_solver(&self) -> Option<&Arc<dyn CaptchaSolver>> {
        self.captcha.as_ref()
    }

    /// The `Cookie` header the jar would send to `url`, if any.
    pub(crate) fn cookies_for(&self, url: &Url) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the body as text.
    pub(crate) async fn get_text(&self, url: Url) -> Result<String, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let resp = check_status(resp).await?;
        resp.text().await.map_err(Error::Transport)
    }

    /// Send a GET request with query parameters and decode a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;
        let resp = check_status(resp).await?;
        let body = resp.text().await.map_err(Error::Transport)?;
        decode_json(&body)
    }
}

/// Map auth and error statuses onto [`Error`], passing successes through.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::SessionExpired);
    }

    if !status.is_success() {
        let body = error_body(resp).await;
        return Err(Error::Http {
            status: status.as_u16(),
            message: preview(&body).to_owned(),
        });
    }

    Ok(resp)
}

/// Body of a non-2xx reply, for error messages. A failed read yields "".
pub(crate) async fn error_body(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            debug!(%status, error = %e, "could not read error response body");
            String::new()
        }
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
