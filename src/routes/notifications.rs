use std::collections::HashSet;

use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, ClientContext};
use crate::models::dto::NotificationResponse;
use crate::models::notifications::{ActiveModel as NotificationActiveModel, Entity as Notifications};
use crate::services::notification_service::{NotificationService, ReadOutcome, Reader};

#[derive(Deserialize)]
pub struct NotificationInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

impl NotificationInput {
    /// Titre et texte obligatoires, espaces retirés
    fn cleaned(self) -> ApiResult<(String, String)> {
        let title = self.title.trim().to_string();
        let text = self.text.trim().to_string();
        if title.is_empty() || text.is_empty() {
            return Err(ApiError::Validation("Title and text must not be empty".to_string()));
        }
        Ok((title, text))
    }
}

/// GET /notifications/ - Avec is_read pour le lecteur courant
#[get("/")]
pub async fn list_notifications(
    auth_user: Option<AuthUser>,
    client: ClientContext,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let reader = Reader::identify(auth_user.as_ref(), &client);
    let data: Vec<NotificationResponse> = NotificationService::list(db.get_ref(), &reader)
        .await?
        .into_iter()
        .map(|(notification, is_read)| NotificationResponse::new(notification, is_read))
        .collect();

    Ok(HttpResponse::Ok().json(data))
}

/// POST /notifications/ (PROTÉGÉE)
#[post("/")]
pub async fn create_notification(
    _auth_user: AuthUser,
    body: web::Json<NotificationInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let (title, text) = body.into_inner().cleaned()?;

    let notification = NotificationActiveModel {
        title: Set(title),
        text: Set(text),
        created_at: Set(Utc::now()),
        views_count: Set(0),
        read_by_ips: Set(serde_json::json!([])),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(NotificationResponse::new(notification, false)))
}

/// GET /notifications/unread_count/
#[get("/unread_count/")]
pub async fn unread_count(
    auth_user: Option<AuthUser>,
    client: ClientContext,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let reader = Reader::identify(auth_user.as_ref(), &client);
    let count = NotificationService::unread_count(db.get_ref(), &reader).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "unread_count": count })))
}

#[get(r"/{pk:\d+}/")]
pub async fn get_notification(
    path: web::Path<i32>,
    auth_user: Option<AuthUser>,
    client: ClientContext,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let notification = NotificationService::find(db.get_ref(), path.into_inner()).await?;

    let reader = Reader::identify(auth_user.as_ref(), &client);
    let read_ids = match reader {
        Reader::User(user_id) => NotificationService::read_ids(db.get_ref(), user_id).await?,
        _ => HashSet::new(),
    };
    let is_read = NotificationService::is_read(&notification, &reader, &read_ids);

    Ok(HttpResponse::Ok().json(NotificationResponse::new(notification, is_read)))
}

/// PUT /notifications/{pk}/ (PROTÉGÉE)
#[put(r"/{pk:\d+}/")]
pub async fn update_notification(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<NotificationInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let notification = NotificationService::find(db.get_ref(), path.into_inner()).await?;
    let (title, text) = body.into_inner().cleaned()?;

    let mut active: NotificationActiveModel = notification.into();
    active.title = Set(title);
    active.text = Set(text);
    active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Notification updated successfully" })))
}

/// DELETE /notifications/{pk}/ (PROTÉGÉE)
#[delete(r"/{pk:\d+}/")]
pub async fn delete_notification(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let notification = NotificationService::find(db.get_ref(), path.into_inner()).await?;
    Notifications::delete_by_id(notification.id).exec(db.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PATCH /notifications/{pk}/read/ (PROTÉGÉE) - marque lu pour le compte
#[patch(r"/{pk:\d+}/read/")]
pub async fn mark_read(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let reader = Reader::User(auth_user.user_id);
    let (outcome, _) = NotificationService::mark_read(db.get_ref(), path.into_inner(), &reader).await?;

    let message = match outcome {
        ReadOutcome::AlreadyRead => "Already read",
        _ => "Notification marked as read",
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": message })))
}

/// POST /notifications/{pk}/view/ - compte une vue (compte ou adresse IP)
#[post(r"/{pk:\d+}/view/")]
pub async fn record_view(
    path: web::Path<i32>,
    auth_user: Option<AuthUser>,
    client: ClientContext,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let reader = Reader::identify(auth_user.as_ref(), &client);
    let (_, views_count) = NotificationService::mark_read(db.get_ref(), path.into_inner(), &reader).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "views_count": views_count })))
}

pub fn notifications_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .service(list_notifications)
            .service(create_notification)
            .service(unread_count)
            .service(get_notification)
            .service(update_notification)
            .service(delete_notification)
            .service(mark_read)
            .service(record_view),
    );
}
