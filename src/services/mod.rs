pub mod catalog_service;
pub mod geolocation;
pub mod mailer;
pub mod notification_service;
pub mod password_reset_service;
pub mod region_gate;
pub mod vote_service;
