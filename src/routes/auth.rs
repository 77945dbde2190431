use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::UserResponse;
use crate::models::users::{self, ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users};
use crate::utils::password;

// DTO pour l'inscription
#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(max = 150, message = "first_name must be at most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "last_name must be at most 150 characters"))]
    pub last_name: String,
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"), length(max = 512, message = "email must be at most 512 characters"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

// DTO pour la connexion
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// DTO pour la modification du profil (tout est optionnel)
#[derive(Deserialize, Validate)]
pub struct EditProfileRequest {
    #[validate(length(max = 150, message = "first_name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "last_name must be at most 150 characters"))]
    pub last_name: Option<String>,
    #[validate(email(message = "Enter a valid email address"), length(max = 512, message = "email must be at most 512 characters"))]
    pub email: Option<String>,
    pub profile_image: Option<String>,
    pub old_password: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: Option<String>,
}

async fn email_taken(db: &DatabaseConnection, email: &str, except: Option<i32>) -> ApiResult<bool> {
    let mut query = Users::find()
        .filter(Expr::expr(Func::lower(Expr::col(UserColumn::Email))).eq(email.to_lowercase()));
    if let Some(id) = except {
        query = query.filter(UserColumn::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

async fn find_user(db: &DatabaseConnection, id: i32) -> ApiResult<users::Model> {
    Users::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

/// POST /signup/ - Créer un compte (PUBLIC)
#[post("/signup/")]
pub async fn signup(
    body: web::Json<SignupRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    // 1. Username et email doivent être libres
    let existing = Users::find()
        .filter(UserColumn::Username.eq(body.username.trim()))
        .one(db.get_ref())
        .await?;
    if existing.is_some() {
        return Err(ApiError::Validation("A user with that username already exists".to_string()));
    }
    if email_taken(db.get_ref(), body.email.trim(), None).await? {
        return Err(ApiError::Validation("This email is already registered".to_string()));
    }

    // 2. Hash le mot de passe
    let password_hash = password::hash_password(&body.password).map_err(ApiError::Internal)?;

    // 3. Créer l'utilisateur
    let body = body.into_inner();
    let user = UserActiveModel {
        username: Set(body.username.trim().to_string()),
        email: Set(body.email.trim().to_string()),
        password_hash: Set(password_hash),
        first_name: Set(body.first_name),
        last_name: Set(body.last_name),
        profile_image: Set(None),
        date_joined: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(user_id = user.id, "user signed up");
    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User created successfully"
    })))
}

/// POST /login/ - Vérifier des identifiants (PUBLIC)
/// Les tokens sont émis ailleurs, cette route ne fait que valider
#[post("/login/")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let invalid = || ApiError::Validation("Unable to log in with provided credentials".to_string());

    if body.username.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation("Must include 'username' and 'password'".to_string()));
    }

    let user = Users::find()
        .filter(UserColumn::Username.eq(&body.username))
        .one(db.get_ref())
        .await?
        .ok_or_else(invalid)?;

    let is_valid = password::verify_password(&body.password, &user.password_hash)
        .map_err(ApiError::Internal)?;
    if !is_valid {
        return Err(invalid());
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Login successful" })))
}

/// GET /get_profile/ - Profil de l'utilisateur connecté (PROTÉGÉE)
#[get("/get_profile/")]
pub async fn get_profile(
    auth_user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let user = find_user(db.get_ref(), auth_user.user_id).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PATCH /edit_profile/ - Modifier son profil (PROTÉGÉE)
#[patch("/edit_profile/")]
pub async fn edit_profile(
    auth_user: AuthUser,
    body: web::Json<EditProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();
    let user = find_user(db.get_ref(), auth_user.user_id).await?;

    // 1. Changement de mot de passe: l'ancien doit être correct
    let new_hash = match (&body.old_password, &body.new_password) {
        (Some(old), Some(new)) => {
            if !password::verify_password(old, &user.password_hash).map_err(ApiError::Internal)? {
                return Err(ApiError::Validation("Old password is incorrect".to_string()));
            }
            Some(password::hash_password(new).map_err(ApiError::Internal)?)
        }
        _ => None,
    };

    if let Some(email) = &body.email {
        if email_taken(db.get_ref(), email.trim(), Some(user.id)).await? {
            return Err(ApiError::Validation("This email is already registered".to_string()));
        }
    }

    // 2. Appliquer les champs fournis
    let mut active: UserActiveModel = user.into();
    if let Some(first_name) = body.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = body.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(email) = body.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(image) = body.profile_image {
        active.profile_image = Set(Some(image).filter(|s| !s.is_empty()));
    }
    if let Some(hash) = new_hash {
        active.password_hash = Set(hash);
    }
    active.update(db.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Profile updated successfully" })))
}

/// GET /users/ - Liste des comptes
#[get("/")]
pub async fn list_users(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let users: Vec<UserResponse> = Users::find()
        .order_by_asc(UserColumn::Id)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

#[get("/{id}/")]
pub async fn get_user(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let user = find_user(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// DELETE /users/{id}/ - Supprimer son propre compte (PROTÉGÉE)
/// Votes, commentaires, films sauvegardés et codes partent en cascade
#[delete("/{id}/")]
pub async fn delete_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let user = find_user(db.get_ref(), path.into_inner()).await?;
    if user.id != auth_user.user_id {
        return Err(ApiError::Forbidden("You can only delete your own account".to_string()));
    }

    Users::delete_by_id(user.id).exec(db.get_ref()).await?;
    tracing::info!(user_id = user.id, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(login)
        .service(get_profile)
        .service(edit_profile)
        .service(
            web::scope("/users")
                .service(list_users)
                .service(get_user)
                .service(delete_user),
        );
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::test_support::*;

    #[actix_web::test]
    async fn signup_then_login() {
        let ctx = TestContext::new().await;
        let app = test_app!(ctx);

        let signup = |username: &str, email: &str| {
            test::TestRequest::post()
                .uri(&url("/signup/"))
                .set_json(json!({ "username": username, "email": email, "password": "secret123" }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, signup("alice", "alice@example.com")).await.status(), 201);
        assert_eq!(test::call_service(&app, signup("alice", "other@example.com")).await.status(), 400);
        assert_eq!(test::call_service(&app, signup("bob", "ALICE@example.com")).await.status(), 400);

        let login = |password: &str| {
            test::TestRequest::post()
                .uri(&url("/login/"))
                .set_json(json!({ "username": "alice", "password": password }))
                .to_request()
        };
        let body: Value = test::call_and_read_body_json(&app, login("secret123")).await;
        assert_eq!(body["message"], "Login successful");
        assert_eq!(test::call_service(&app, login("wrong")).await.status(), 400);
    }

    #[actix_web::test]
    async fn users_can_only_delete_themselves() {
        let ctx = TestContext::new().await;
        let alice = create_user(&ctx.db, "alice", "secret123").await;
        let bob = create_user(&ctx.db, "bob", "secret123").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::delete()
            .uri(&url(&format!("/users/{}/", bob.id)))
            .insert_header(bearer(&alice))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let req = test::TestRequest::delete()
            .uri(&url(&format!("/users/{}/", alice.id)))
            .insert_header(bearer(&alice))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 204);

        let req = test::TestRequest::get().uri(&url("/users/")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert!(body[0].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn password_change_needs_old_password() {
        let ctx = TestContext::new().await;
        let alice = create_user(&ctx.db, "alice", "secret123").await;
        let app = test_app!(ctx);

        let req = test::TestRequest::patch()
            .uri(&url("/edit_profile/"))
            .insert_header(bearer(&alice))
            .set_json(json!({ "old_password": "nope", "new_password": "another1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Old password is incorrect");
    }
}
