// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Chargée une seule fois au démarrage depuis l'environnement (.env accepté),
// puis partagée en lecture seule via web::Data<AppConfig>.
//
// Variables obligatoires: DATABASE_URL, JWT_SECRET
// Les tables de mots-clés (VPN, opérateurs locaux, fuseaux) ont des valeurs
// par défaut et peuvent être remplacées par des listes séparées par virgules.
//
// ============================================================================

use std::{env, net::SocketAddr, time::Duration};

use anyhow::Context;

use crate::services::geolocation::GeoProvider;
use crate::services::region_gate::RegionPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub api_prefix: String,
    pub cors_allowed_origins: Vec<String>,
    /// Nom (ou fragment) du département des bandes-annonces
    pub trailers_department: String,
    pub session_cookie: String,
    pub mail: MailConfig,
    pub geo: GeoConfig,
    pub region: RegionPolicy,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub from: String,
}

#[derive(Clone, Debug)]
pub struct GeoConfig {
    pub providers: Vec<GeoProvider>,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT")?;

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let providers = match env::var("GEO_PROVIDERS") {
            Ok(raw) => split_list(&raw)
                .iter()
                .map(|name| {
                    GeoProvider::from_name(name)
                        .with_context(|| format!("unknown geolocation provider: {name}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            Err(_) => GeoProvider::all(),
        };

        let timeout_secs: u64 = env::var("GEO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let mut region = RegionPolicy::default();
        if let Ok(country) = env::var("RESTRICTED_COUNTRY") {
            region.country_name = country.to_lowercase();
        }
        if let Ok(code) = env::var("RESTRICTED_COUNTRY_CODE") {
            region.country_code = code.to_lowercase();
        }
        if let Ok(raw) = env::var("VPN_KEYWORDS") {
            region.vpn_keywords = split_list(&raw);
        }
        if let Ok(raw) = env::var("LOCAL_TELECOM_KEYWORDS") {
            region.telecom_keywords = split_list(&raw);
        }
        if let Ok(raw) = env::var("REGION_TIMEZONE_HINTS") {
            region.timezone_hints = split_list(&raw);
        }
        if let Ok(hint) = env::var("REGION_LANGUAGE_HINT") {
            region.language_hint = hint.to_lowercase();
        }

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            jwt_secret,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/watch-anime/api".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            trailers_department: env::var("TRAILERS_DEPARTMENT")
                .unwrap_or_else(|_| "Treylerlar".to_string()),
            session_cookie: env::var("SESSION_COOKIE").unwrap_or_else(|_| "sessionid".to_string()),
            mail: MailConfig {
                relay_url: env::var("MAIL_RELAY_URL").ok().filter(|s| !s.trim().is_empty()),
                relay_token: env::var("MAIL_RELAY_TOKEN").ok().filter(|s| !s.trim().is_empty()),
                from: env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@localhost".to_string()),
            },
            geo: GeoConfig { providers, timeout: Duration::from_secs(timeout_secs) },
            region,
        })
    }
}

/// Découpe "a, b,,c" en ["a", "b", "c"] (minuscules)
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_lowercases() {
        assert_eq!(split_list(" NordVPN, hetzner,, "), vec!["nordvpn", "hetzner"]);
        assert!(split_list("").is_empty());
    }
}
