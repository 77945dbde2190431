// Outils partagés par les tests de routes: base SQLite en mémoire,
// géolocalisation figée, mailer qui enregistre, fixtures.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};

use crate::config::{AppConfig, GeoConfig, MailConfig};
use crate::models::{departments, movie_series, movies, users};
use crate::services::geolocation::{GeoLocator, GeoRecord};
use crate::services::mailer::{EmailMessage, MailError, Mailer};
use crate::services::region_gate::{RegionGate, RegionPolicy};
use crate::utils::{jwt, password};

pub const PREFIX: &str = "/api";
const SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: SECRET.to_string(),
        api_prefix: PREFIX.to_string(),
        cors_allowed_origins: Vec::new(),
        trailers_department: "Treylerlar".to_string(),
        session_cookie: "sessionid".to_string(),
        mail: MailConfig { relay_url: None, relay_token: None, from: "no-reply@test".to_string() },
        geo: GeoConfig { providers: Vec::new(), timeout: Duration::from_secs(1) },
        region: RegionPolicy::default(),
    }
}

/// Une seule connexion: chaque connexion SQLite en mémoire a sa propre base
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    crate::db::migrate(&db).await.unwrap();
    db
}

pub struct FixedLocator(pub Option<GeoRecord>);

#[async_trait]
impl GeoLocator for FixedLocator {
    async fn locate(&self, _ip: &str) -> Option<GeoRecord> {
        self.0.clone()
    }
}

/// Garde les messages au lieu de les envoyer
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    /// Dernier code à 6 chiffres envoyé
    pub fn last_code(&self) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        let text = &sent.last()?.text;
        text.split(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == 6)
            .map(str::to_string)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Rejected(503));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct TestContext {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub gate: Arc<RegionGate>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_geo(None).await
    }

    pub async fn with_geo(record: Option<GeoRecord>) -> Self {
        let config = test_config();
        let gate = RegionGate::new(config.region.clone(), Arc::new(FixedLocator(record)));
        Self {
            db: setup_db().await,
            config,
            gate: Arc::new(gate),
            mailer: Arc::new(RecordingMailer::default()),
        }
    }
}

/// Monte l'application complète sur un TestContext
macro_rules! test_app {
    ($ctx:expr) => {{
        let ctx: &$crate::test_support::TestContext = &$ctx;
        let mailer: std::sync::Arc<dyn $crate::services::mailer::Mailer> = ctx.mailer.clone();
        let prefix = ctx.config.api_prefix.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new(ctx.db.clone()))
                .app_data(actix_web::web::Data::new(ctx.config.clone()))
                .app_data(actix_web::web::Data::from(ctx.gate.clone()))
                .app_data(actix_web::web::Data::new(mailer))
                .configure($crate::routes::extractor_errors)
                .configure(move |cfg| $crate::routes::configure_routes(cfg, &prefix)),
        )
        .await
    }};
}
pub(crate) use test_app;

pub fn url(path: &str) -> String {
    format!("{PREFIX}{path}")
}

pub fn bearer(user: &users::Model) -> (&'static str, String) {
    let token = jwt::generate_token(SECRET, user.id, &user.username).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

pub async fn create_user(db: &DatabaseConnection, username: &str, plain_password: &str) -> users::Model {
    users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        password_hash: Set(password::hash_password(plain_password).unwrap()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        profile_image: Set(None),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_department(db: &DatabaseConnection, name: &str) -> departments::Model {
    departments::ActiveModel {
        name: Set(name.to_string()),
        description: Set(String::new()),
        image: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_movie(
    db: &DatabaseConnection,
    department_id: i32,
    name: &str,
    created_at: DateTime<Utc>,
) -> movies::Model {
    movies::ActiveModel {
        department_id: Set(department_id),
        name: Set(name.to_string()),
        description: Set(format!("{name} description")),
        preview_url: Set(None),
        url: Set(None),
        local_file: Set(None),
        country: Set("Japan".to_string()),
        count: Set(0),
        year: Set("2024".to_string()),
        genre: Set("Action".to_string()),
        all_series: Set("12".to_string()),
        created_at: Set(created_at),
        is_possible: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_series(
    db: &DatabaseConnection,
    movie_id: i32,
    title: &str,
    created_at: DateTime<Utc>,
) -> movie_series::Model {
    movie_series::ActiveModel {
        movie_id: Set(movie_id),
        title: Set(title.to_string()),
        video_url: Set(format!("https://cdn.example.com/{title}.mp4")),
        video_file: Set(None),
        created_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
