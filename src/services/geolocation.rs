// ============================================================================
// GÉOLOCALISATION IP
// ============================================================================
//
// Interroge des services publics de géolocalisation, dans l'ordre configuré,
// et normalise leurs réponses en un GeoRecord unique.
//
// Fournisseurs:
//   - ip-api     : http://ip-api.com/json/{ip}?fields=...
//   - ipapi.co   : https://ipapi.co/{ip}/json/
//   - ipwho.is   : http://ipwho.is/{ip}
//
// Points d'attention:
//   - Chaque appel est borné par GEO_TIMEOUT_SECS, aucun retry
//   - La première réponse HTTP 200 exploitable gagne
//   - Une réponse "fail"/"error" d'un fournisseur passe au suivant
//
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Réponse normalisée, champs texte en minuscules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoRecord {
    pub country: String,
    pub country_code: String,
    pub isp: String,
    pub org: String,
    pub asn: String,
    pub proxy: bool,
    pub hosting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoProvider {
    IpApi,
    IpapiCo,
    IpWhoIs,
}

impl GeoProvider {
    pub fn all() -> Vec<Self> {
        vec![GeoProvider::IpApi, GeoProvider::IpapiCo, GeoProvider::IpWhoIs]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ip-api" | "ip-api.com" => Some(GeoProvider::IpApi),
            "ipapi.co" | "ipapi" => Some(GeoProvider::IpapiCo),
            "ipwho.is" | "ipwhois" => Some(GeoProvider::IpWhoIs),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeoProvider::IpApi => "ip-api",
            GeoProvider::IpapiCo => "ipapi.co",
            GeoProvider::IpWhoIs => "ipwho.is",
        }
    }

    fn url(&self, ip: &str) -> String {
        match self {
            GeoProvider::IpApi => format!(
                "http://ip-api.com/json/{ip}?fields=status,country,countryCode,isp,org,as,proxy,hosting"
            ),
            GeoProvider::IpapiCo => format!("https://ipapi.co/{ip}/json/"),
            GeoProvider::IpWhoIs => format!("http://ipwho.is/{ip}"),
        }
    }

    /// Normalise le corps JSON du fournisseur, None si la réponse signale un échec
    pub fn parse(&self, body: &Value) -> Option<GeoRecord> {
        match self {
            GeoProvider::IpApi => {
                if body.get("status").and_then(Value::as_str) == Some("fail") {
                    return None;
                }
                Some(GeoRecord {
                    country: text(body, "country"),
                    country_code: text(body, "countryCode"),
                    isp: text(body, "isp"),
                    org: text(body, "org"),
                    asn: text(body, "as"),
                    proxy: flag(body, "proxy"),
                    hosting: flag(body, "hosting"),
                })
            }
            GeoProvider::IpapiCo => {
                if flag(body, "error") {
                    return None;
                }
                // ipapi.co ne distingue pas isp et org
                Some(GeoRecord {
                    country: text(body, "country_name"),
                    country_code: text(body, "country_code"),
                    isp: text(body, "org"),
                    org: text(body, "org"),
                    asn: text(body, "asn"),
                    proxy: flag(body, "proxy"),
                    hosting: flag(body, "hosting"),
                })
            }
            GeoProvider::IpWhoIs => {
                if body.get("success").and_then(Value::as_bool) == Some(false) {
                    return None;
                }
                let connection = body.get("connection").cloned().unwrap_or(Value::Null);
                Some(GeoRecord {
                    country: text(body, "country"),
                    country_code: text(body, "country_code"),
                    isp: text(&connection, "isp"),
                    org: text(&connection, "org"),
                    asn: text(&connection, "asn"),
                    proxy: flag(&connection, "proxy"),
                    hosting: flag(&connection, "hosting"),
                })
            }
        }
    }
}

fn text(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.to_lowercase(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn flag(body: &Value, key: &str) -> bool {
    body.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Point d'injection: les tests fournissent un localisateur figé
#[async_trait]
pub trait GeoLocator: Send + Sync {
    /// None quand aucun fournisseur n'a répondu
    async fn locate(&self, ip: &str) -> Option<GeoRecord>;
}

pub struct HttpGeoLocator {
    client: reqwest::Client,
    providers: Vec<GeoProvider>,
    timeout: Duration,
}

impl HttpGeoLocator {
    pub fn new(client: reqwest::Client, providers: Vec<GeoProvider>, timeout: Duration) -> Self {
        Self { client, providers, timeout }
    }

    async fn query(&self, provider: GeoProvider, ip: &str) -> Result<Option<GeoRecord>, reqwest::Error> {
        let response = self
            .client
            .get(provider.url(ip))
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(provider = provider.name(), status = %response.status(), "geolocation provider refused");
            return Ok(None);
        }

        let body: Value = response.json().await?;
        Ok(provider.parse(&body))
    }
}

#[async_trait]
impl GeoLocator for HttpGeoLocator {
    async fn locate(&self, ip: &str) -> Option<GeoRecord> {
        for provider in &self.providers {
            match self.query(*provider, ip).await {
                Ok(Some(record)) => return Some(record),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(provider = provider.name(), error = %e, "geolocation provider failed");
                }
            }
        }
        None
    }
}
