// Booking site authentication
//
// Form login against the passport host. A successful login leaves the
// session cookies in the client's jar; seat pages and submits on the
// office host reuse them automatically.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::client::{SeatClient, decode_json, error_body};
use crate::error::Error;

/// Cookie names the office host uses to identify a signed-in user.
const SESSION_COOKIES: &[&str] = &["UID", "_uid"];

/// Whether the client currently holds a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Authenticated,
    Anonymous,
}

#[derive(Deserialize)]
struct LoginResponse {
    status: bool,
    #[serde(default)]
    msg2: Option<String>,
    #[serde(default)]
    mes: Option<String>,
}

impl SeatClient {
    /// Probe the current session.
    ///
    /// Fetches the login page (which also primes the anonymous cookies the
    /// login form expects) and reports `Authenticated` if the jar already
    /// carries a session cookie for the office host.
    pub async fn login_status(&self) -> Result<LoginStatus, Error> {
        let url = self.endpoints().login_page()?;
        self.get_text(url).await?;

        let has_session = self
            .cookies_for(&self.endpoints().office)
            .is_some_and(|header| {
                header.split(';').any(|pair| {
                    let name = pair.trim().split('=').next().unwrap_or_default();
                    SESSION_COOKIES.contains(&name)
                })
            });

        let status = if has_session {
            LoginStatus::Authenticated
        } else {
            LoginStatus::Anonymous
        };
        debug!(?status, "login status probed");
        Ok(status)
    }

    /// Authenticate with username/password.
    ///
    /// On success the session cookie is stored in the client's cookie jar
    /// and used for all subsequent requests.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.endpoints().login()?;

        debug!("logging in at {}", url);

        let form = [
            ("fid", "-1"),
            ("uname", username),
            ("password", password.expose_secret()),
            ("refer", self.endpoints().office.as_str()),
            ("t", "true"),
        ];

        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = error_body(resp).await;
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let reply: LoginResponse = decode_json(&body)?;

        if !reply.status {
            return Err(Error::Authentication {
                message: reply
                    .msg2
                    .or(reply.mes)
                    .unwrap_or_else(|| "login rejected".into()),
            });
        }

        debug!("login successful");
        Ok(())
    }
}
