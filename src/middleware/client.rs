use std::net::IpAddr;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::config::AppConfig;
use crate::error::ApiError;

/// Ce que l'on sait d'un visiteur sans authentification:
/// adresse réseau, cookie de session et quelques headers du navigateur
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub ip: Option<String>,
    pub session_key: Option<String>,
    pub timezone: Option<String>,
    pub accept_language: Option<String>,
}

impl ClientContext {
    /// Adresse absente, loopback ou "localhost"
    pub fn is_local(&self) -> bool {
        match self.ip.as_deref() {
            None | Some("localhost") => true,
            Some(ip) => ip.parse::<IpAddr>().map(|addr| addr.is_loopback()).unwrap_or(false),
        }
    }
}

impl FromRequest for ClientContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let cookie_name = req
            .app_data::<web::Data<AppConfig>>()
            .map(|config| config.session_cookie.clone())
            .unwrap_or_else(|| "sessionid".to_string());

        ready(Ok(ClientContext {
            ip: client_ip(req),
            session_key: req
                .cookie(&cookie_name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty()),
            timezone: header(req, "Timezone"),
            accept_language: header(req, "Accept-Language"),
        }))
    }
}

/// Premier élément de X-Forwarded-For s'il s'agit d'une adresse IP, sinon l'adresse du pair
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(forwarded) = header(req, "X-Forwarded-For") {
        if let Some(first) = forwarded.split(',').next().map(str::trim) {
            if let Ok(addr) = first.parse::<IpAddr>() {
                return Some(addr.to_string());
            }
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn forwarded_for_wins_over_peer() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.1:4000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "84.54.1.2, 10.0.0.1"))
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("84.54.1.2"));
    }

    #[test]
    fn garbage_forwarded_for_is_ignored() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.7:4000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "x".repeat(100)))
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("192.168.1.7"));
    }

    #[test]
    fn falls_back_to_peer_address() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.7:4000".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("192.168.1.7"));
    }

    #[test]
    fn loopback_and_missing_addresses_are_local() {
        let local = |ip: Option<&str>| ClientContext {
            ip: ip.map(str::to_string),
            ..Default::default()
        };
        assert!(local(None).is_local());
        assert!(local(Some("127.0.0.1")).is_local());
        assert!(local(Some("::1")).is_local());
        assert!(local(Some("localhost")).is_local());
        assert!(!local(Some("84.54.1.2")).is_local());
    }
}
