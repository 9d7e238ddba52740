use url::Url;

use crate::error::Error;

const DEFAULT_PASSPORT: &str = "https://passport2.chaoxing.com";
const DEFAULT_OFFICE: &str = "https://office.chaoxing.com";

/// Base URLs of the two hosts the booking flow talks to.
///
/// The passport host handles login; the office host serves seat pages
/// and accepts reservation submits. Both are configurable so tests (and
/// mirror deployments) can point the client elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub passport: Url,
    pub office: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            passport: Url::parse(DEFAULT_PASSPORT).expect("default passport URL is valid"),
            office: Url::parse(DEFAULT_OFFICE).expect("default office URL is valid"),
        }
    }
}

impl Endpoints {
    /// Point both hosts at the same base URL.
    pub fn single_host(base: Url) -> Self {
        Self {
            passport: base.clone(),
            office: base,
        }
    }

    /// Login page, fetched to prime session cookies.
    pub fn login_page(&self) -> Result<Url, Error> {
        let mut url = self.passport.join("/login")?;
        url.query_pairs_mut()
            .append_pair("fid", "")
            .append_pair("newversion", "true");
        Ok(url)
    }

    /// Form login endpoint.
    pub fn login(&self) -> Result<Url, Error> {
        Ok(self.passport.join("/fanyalogin")?)
    }

    /// Seat selection page for a room/seat pair; carries the submit token.
    pub fn seat_page(&self, room_id: &str, seat_id: &str) -> Result<Url, Error> {
        let mut url = self.office.join("/front/third/apps/seat/code")?;
        url.query_pairs_mut()
            .append_pair("id", room_id)
            .append_pair("seatNum", seat_id);
        Ok(url)
    }

    /// Reservation submit endpoint.
    pub fn submit(&self) -> Result<Url, Error> {
        Ok(self.office.join("/data/apps/seat/submit")?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seat_page_carries_room_and_seat() {
        let endpoints = Endpoints::single_host(Url::parse("http://127.0.0.1:8080").unwrap());
        let url = endpoints.seat_page("2609", "001").unwrap();
        assert_eq!(url.path(), "/front/third/apps/seat/code");
        assert_eq!(url.query(), Some("id=2609&seatNum=001"));
    }

    #[test]
    fn defaults_use_separate_hosts() {
        let endpoints = Endpoints::default();
        assert_ne!(endpoints.passport.host_str(), endpoints.office.host_str());
        assert_eq!(endpoints.login().unwrap().path(), "/fanyalogin");
    }
}
