use std::sync::Arc;

use actix_web::{post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::services::mailer::Mailer;
use crate::services::password_reset_service::PasswordResetService;

#[derive(Deserialize, Validate)]
pub struct ResetRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetVerify {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 6, message = "token must be at most 6 characters"))]
    pub token: String,
}

#[derive(Deserialize, Validate)]
pub struct ResetConfirm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 6, message = "token must be at most 6 characters"))]
    pub token: String,
    #[validate(length(min = 1, max = 32, message = "new_password must be 1 to 32 characters"))]
    pub new_password: String,
    pub confirm_password: String,
}

/// POST /password-reset/request/ - envoie un code à 6 chiffres valable 5 minutes
#[post("/request/")]
pub async fn request_code(
    body: web::Json<ResetRequest>,
    mailer: web::Data<Arc<dyn Mailer>>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    PasswordResetService::request(db.get_ref(), mailer.get_ref().as_ref(), &body.email).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset code sent to your email"
    })))
}

/// POST /password-reset/verify/
#[post("/verify/")]
pub async fn verify_code(body: web::Json<ResetVerify>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    body.validate()?;
    PasswordResetService::verify(db.get_ref(), &body.email, &body.token).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Code verified. Enter a new password."
    })))
}

/// POST /password-reset/confirm/ - nouveau mot de passe, le code devient inutilisable
#[post("/confirm/")]
pub async fn confirm_reset(body: web::Json<ResetConfirm>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    body.validate()?;
    if body.new_password != body.confirm_password {
        return Err(ApiError::Validation("Passwords don't match.".to_string()));
    }

    PasswordResetService::confirm(db.get_ref(), &body.email, &body.token, &body.new_password).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password updated successfully."
    })))
}

pub fn password_reset_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/password-reset")
            .service(request_code)
            .service(verify_code)
            .service(confirm_reset),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::test;
    use chrono::{Duration, Utc};
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};
    use serde_json::{json, Value};

    use crate::models::{password_reset_tokens, users};
    use crate::test_support::*;
    use crate::utils::password;

    #[actix_web::test]
    async fn new_code_replaces_the_old_one() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let app = test_app!(ctx);

        let request = || {
            test::TestRequest::post()
                .uri(&url("/password-reset/request/"))
                .set_json(json!({ "email": user.email }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, request()).await.status(), 200);
        let first = ctx.mailer.last_code().unwrap();
        assert_eq!(test::call_service(&app, request()).await.status(), 200);
        let second = ctx.mailer.last_code().unwrap();

        let tokens = password_reset_tokens::Entity::find().all(&ctx.db).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, second);

        if first != second {
            let req = test::TestRequest::post()
                .uri(&url("/password-reset/verify/"))
                .set_json(json!({ "email": user.email, "token": first }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 400);
        }

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/verify/"))
            .set_json(json!({ "email": user.email, "token": second }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Code verified. Enter a new password.");
    }

    #[actix_web::test]
    async fn confirmed_code_cannot_be_reused() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/request/"))
            .set_json(json!({ "email": user.email }))
            .to_request();
        test::call_service(&app, req).await;
        let code = ctx.mailer.last_code().unwrap();

        let confirm = |new_password: &str| {
            test::TestRequest::post()
                .uri(&url("/password-reset/confirm/"))
                .set_json(json!({
                    "email": user.email,
                    "token": code,
                    "new_password": new_password,
                    "confirm_password": new_password
                }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, confirm("n3wpass")).await.status(), 200);
        assert_eq!(test::call_service(&app, confirm("other")).await.status(), 400);

        let stored = users::Entity::find_by_id(user.id).one(&ctx.db).await.unwrap().unwrap();
        assert!(password::verify_password("n3wpass", &stored.password_hash).unwrap());
    }

    #[actix_web::test]
    async fn expired_code_is_refused() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/request/"))
            .set_json(json!({ "email": user.email }))
            .to_request();
        test::call_service(&app, req).await;
        let code = ctx.mailer.last_code().unwrap();

        let token = password_reset_tokens::Entity::find().one(&ctx.db).await.unwrap().unwrap();
        let mut active: password_reset_tokens::ActiveModel = token.into();
        active.expires_at = Set(Utc::now() - Duration::minutes(1));
        active.update(&ctx.db).await.unwrap();

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/verify/"))
            .set_json(json!({ "email": user.email, "token": code }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn unknown_email_and_mismatch() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/request/"))
            .set_json(json!({ "email": "ghost@example.com" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/confirm/"))
            .set_json(json!({
                "email": "ghost@example.com",
                "token": "123456",
                "new_password": "a",
                "confirm_password": "b"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn mail_failure_is_reported() {
        let mut ctx = TestContext::new().await;
        ctx.mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url("/password-reset/request/"))
            .set_json(json!({ "email": user.email }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 500);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to send email");
    }
}
