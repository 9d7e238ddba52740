use futures_util::future::BoxFuture;

use crate::error::Error;

/// Completes the booking site's slider verification.
///
/// The solver receives the user's HTTP client (so it shares the session
/// cookies) and returns the validation string the submit endpoint expects
/// in its `captcha` parameter. No solver ships with this crate; when the
/// slider flag is on and none is attached, submits fail with
/// [`Error::Captcha`].
pub trait CaptchaSolver: Send + Sync {
    fn solve<'a>(&'a self, http: &'a reqwest::Client) -> BoxFuture<'a, Result<String, Error>>;
}
