// ============================================================================
// FILTRAGE RÉGIONAL
// ============================================================================
//
// Décide si un film marqué is_possible peut être servi à un visiteur.
//
// Règles:
//   1. Film non marqué                       -> Unrestricted
//   2. Visiteur LOCAL (loopback, sans IP)    -> heuristique headers
//   3. Géolocalisation indisponible          -> heuristique headers
//   4. Pays restreint + signal VPN           -> VpnDetected (servi)
//   5. Pays restreint sans signal VPN        -> Blocked
//   6. Autre pays                            -> Allowed
//
// Heuristique headers: header Timezone contenant un fuseau de la région,
// ou Accept-Language contenant le code langue -> Blocked.
//
// Points d'attention:
//   - Un opérateur télécom local annule le signal VPN
//   - Ne renvoie jamais d'erreur, au pire on retombe sur les headers
//
// ============================================================================

use std::sync::Arc;

use crate::middleware::ClientContext;
use crate::services::geolocation::{GeoLocator, GeoRecord};

/// Tables de mots-clés, remplaçables par l'environnement
#[derive(Debug, Clone)]
pub struct RegionPolicy {
    pub country_name: String,
    pub country_code: String,
    pub vpn_keywords: Vec<String>,
    pub telecom_keywords: Vec<String>,
    pub timezone_hints: Vec<String>,
    pub language_hint: String,
}

impl Default for RegionPolicy {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Self {
            country_name: "uzbekistan".to_string(),
            country_code: "uz".to_string(),
            vpn_keywords: owned(&[
                "vpn", "proxy", "hosting", "datacenter", "server",
                "expressvpn", "nordvpn", "surfshark", "cyberghost",
                "private internet access", "windscribe", "vyprvpn",
                "ipvanish", "hotspot shield", "hide.me", "purevpn",
                "worldstream", "digital ocean", "amazon aws",
                "google cloud", "microsoft azure", "linode", "vultr",
                "ovh", "hetzner", "alibaba cloud", "tencent cloud",
                "ibm cloud", "oracle cloud",
            ]),
            telecom_keywords: owned(&[
                "uzbektelekom", "uztelecom", "ucell", "beeline uz",
                "mobiuz", "ums", "perfectum", "uzmobile",
            ]),
            timezone_hints: owned(&["tashkent", "samarkand", "utc+5", "+05:00", "asia/tashkent"]),
            language_hint: "uz".to_string(),
        }
    }
}

impl RegionPolicy {
    pub fn is_restricted(&self, record: &GeoRecord) -> bool {
        record.country == self.country_name || record.country_code == self.country_code
    }

    pub fn has_vpn_signal(&self, record: &GeoRecord) -> bool {
        let fields = [&record.isp, &record.org, &record.asn];
        let mentions = |keyword: &String| fields.iter().any(|field| field.contains(keyword.as_str()));

        if self.telecom_keywords.iter().any(mentions) {
            return false;
        }

        self.vpn_keywords.iter().any(mentions) || record.proxy || record.hosting
    }

    /// true si les headers du navigateur désignent la région restreinte
    pub fn headers_suggest_region(&self, client: &ClientContext) -> bool {
        let timezone = client.timezone.as_deref().unwrap_or_default().to_lowercase();
        if self.timezone_hints.iter().any(|hint| timezone.contains(hint.as_str())) {
            return true;
        }

        let language = client.accept_language.as_deref().unwrap_or_default().to_lowercase();
        !self.language_hint.is_empty() && language.contains(self.language_hint.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Unrestricted,
    Allowed,
    VpnDetected,
    Blocked,
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked)
    }
}

pub struct RegionGate {
    policy: RegionPolicy,
    locator: Arc<dyn GeoLocator>,
}

impl RegionGate {
    pub fn new(policy: RegionPolicy, locator: Arc<dyn GeoLocator>) -> Self {
        Self { policy, locator }
    }

    pub async fn evaluate(&self, is_possible: bool, client: &ClientContext) -> Verdict {
        if !is_possible {
            return Verdict::Unrestricted;
        }

        let verdict = match client.ip.as_deref() {
            Some(ip) if !client.is_local() => match self.locator.locate(ip).await {
                Some(record) => self.judge(&record),
                None => self.from_headers(client),
            },
            _ => self.from_headers(client),
        };

        tracing::debug!(ip = ?client.ip, ?verdict, "region gate verdict");
        verdict
    }

    fn judge(&self, record: &GeoRecord) -> Verdict {
        if !self.policy.is_restricted(record) {
            return Verdict::Allowed;
        }
        if self.policy.has_vpn_signal(record) {
            Verdict::VpnDetected
        } else {
            Verdict::Blocked
        }
    }

    fn from_headers(&self, client: &ClientContext) -> Verdict {
        if self.policy.headers_suggest_region(client) {
            Verdict::Blocked
        } else {
            Verdict::Allowed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedLocator(Option<GeoRecord>);

    #[async_trait]
    impl GeoLocator for FixedLocator {
        async fn locate(&self, _ip: &str) -> Option<GeoRecord> {
            self.0.clone()
        }
    }

    fn gate(record: Option<GeoRecord>) -> RegionGate {
        RegionGate::new(RegionPolicy::default(), Arc::new(FixedLocator(record)))
    }

    fn uzbek(isp: &str) -> GeoRecord {
        GeoRecord {
            country: "uzbekistan".into(),
            country_code: "uz".into(),
            isp: isp.into(),
            ..Default::default()
        }
    }

    fn remote() -> ClientContext {
        ClientContext { ip: Some("84.54.1.2".into()), ..Default::default() }
    }

    #[actix_web::test]
    async fn unflagged_movies_skip_the_lookup() {
        let verdict = gate(Some(uzbek("uztelecom"))).evaluate(false, &remote()).await;
        assert_eq!(verdict, Verdict::Unrestricted);
    }

    #[actix_web::test]
    async fn restricted_country_without_vpn_is_blocked() {
        let verdict = gate(Some(uzbek("uztelecom"))).evaluate(true, &remote()).await;
        assert_eq!(verdict, Verdict::Blocked);
    }

    #[actix_web::test]
    async fn vpn_keyword_or_flag_lets_the_visitor_through() {
        let verdict = gate(Some(uzbek("nordvpn s.a."))).evaluate(true, &remote()).await;
        assert_eq!(verdict, Verdict::VpnDetected);

        let flagged = GeoRecord { hosting: true, ..uzbek("some isp") };
        assert_eq!(gate(Some(flagged)).evaluate(true, &remote()).await, Verdict::VpnDetected);
    }

    #[actix_web::test]
    async fn local_telecom_clears_the_vpn_signal() {
        let record = GeoRecord { proxy: true, ..uzbek("ucell server farm") };
        assert_eq!(gate(Some(record)).evaluate(true, &remote()).await, Verdict::Blocked);
    }

    #[actix_web::test]
    async fn other_countries_are_allowed() {
        let record = GeoRecord { country: "germany".into(), country_code: "de".into(), ..Default::default() };
        assert_eq!(gate(Some(record)).evaluate(true, &remote()).await, Verdict::Allowed);
    }

    #[actix_web::test]
    async fn missing_geolocation_falls_back_to_headers() {
        let client = ClientContext {
            timezone: Some("Asia/Tashkent".into()),
            ..remote()
        };
        assert_eq!(gate(None).evaluate(true, &client).await, Verdict::Blocked);
        assert_eq!(gate(None).evaluate(true, &remote()).await, Verdict::Allowed);
    }

    #[actix_web::test]
    async fn local_clients_use_headers_only() {
        // Le localisateur n'est pas consulté pour une adresse loopback
        let gate = gate(Some(uzbek("uztelecom")));
        let plain = ClientContext { ip: Some("127.0.0.1".into()), ..Default::default() };
        assert_eq!(gate.evaluate(true, &plain).await, Verdict::Allowed);

        let uzbek_browser = ClientContext {
            accept_language: Some("uz-UZ,uz;q=0.9".into()),
            ..plain
        };
        assert_eq!(gate.evaluate(true, &uzbek_browser).await, Verdict::Blocked);
    }
}
