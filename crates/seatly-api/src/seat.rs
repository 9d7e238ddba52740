// Seat reservation submit
//
// Two requests per attempt: the seat page (which embeds a one-shot submit
// token) and the submit endpoint itself. The reply is returned as-is;
// deciding whether a rejection is worth retrying is up to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::client::SeatClient;
use crate::error::Error;

/// One reservation claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRequest {
    pub room_id: String,
    pub seat_id: String,
    /// Slot start, `HH:MM`.
    pub start_time: String,
    /// Slot end, `HH:MM`.
    pub end_time: String,
    /// Calendar day the seat is claimed for.
    pub day: NaiveDate,
    /// Run slider verification before submitting.
    pub captcha: bool,
}

/// Submit endpoint reply: `{"success": bool, "msg": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

impl SeatClient {
    /// Claim a seat.
    ///
    /// Returns the site's reply whether or not the claim was accepted;
    /// `Err` is reserved for transport, auth, token and decoding failures.
    pub async fn submit(&self, request: &SeatRequest) -> Result<SubmitResponse, Error> {
        let page_url = self
            .endpoints()
            .seat_page(&request.room_id, &request.seat_id)?;
        let page = self.get_text(page_url).await?;
        let token = extract_page_token(&page).ok_or(Error::MissingToken)?;
        trace!("seat page token acquired");

        let captcha = if request.captcha {
            let solver = self.captcha_solver().ok_or_else(|| Error::Captcha {
                message: "slider verification enabled but no solver is configured".into(),
            })?;
            solver.solve(self.http()).await?
        } else {
            String::new()
        };

        let day = request.day.format("%Y-%m-%d").to_string();
        let query = [
            ("roomId", request.room_id.as_str()),
            ("startTime", request.start_time.as_str()),
            ("endTime", request.end_time.as_str()),
            ("day", day.as_str()),
            ("seatNum", request.seat_id.as_str()),
            ("captcha", captcha.as_str()),
            ("token", token),
        ];

        let url = self.endpoints().submit()?;
        let reply: SubmitResponse = self.get_json(url, &query).await?;
        debug!(success = reply.success, msg = ?reply.msg, "submit replied");
        Ok(reply)
    }
}

/// Pull the submit token out of the seat page markup.
///
/// Accepts the `token = '...'`, `token: "..."` and `"token":"..."` shapes
/// the page has used in its inline scripts.
pub(crate) fn extract_page_token(html: &str) -> Option<&str> {
    let mut rest = html;
    while let Some(idx) = rest.find("token") {
        let after = &rest[idx + "token".len()..];
        let candidate = after
            .trim_start_matches(|c: char| c.is_whitespace() || c == '"')
            .strip_prefix(['=', ':'])
            .map(str::trim_start);

        if let Some(value) = candidate {
            if let Some(quote) = value.chars().next().filter(|c| matches!(c, '\'' | '"')) {
                let body = &value[quote.len_utf8()..];
                if let Some(end) = body.find(quote) {
                    let token = &body[..end];
                    if !token.is_empty() {
                        return Some(token);
                    }
                }
            }
        }
        rest = after;
    }
    None
}
