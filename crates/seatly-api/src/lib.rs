// seatly-api: Async Rust client for the library seat booking site

pub mod auth;
pub mod captcha;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod seat;
pub mod transport;

pub use auth::LoginStatus;
pub use captcha::CaptchaSolver;
pub use client::SeatClient;
pub use endpoints::Endpoints;
pub use error::Error;
pub use seat::{SeatRequest, SubmitResponse};
pub use transport::TransportConfig;
