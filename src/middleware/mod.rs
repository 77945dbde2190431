pub mod auth;
pub mod client;

pub use auth::AuthUser;
pub use client::ClientContext;
