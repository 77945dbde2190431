use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::comments::{ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as Comments};
use crate::models::dto::CommentResponse;
use crate::models::movies::Entity as Movies;
use crate::models::users::Entity as Users;

// Les commentaires sont immuables: pas de PUT/PATCH
#[derive(Deserialize, Validate)]
pub struct CommentInput {
    pub movie: i32,
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
}

#[derive(Deserialize)]
pub struct CommentQuery {
    pub movie: Option<i32>,
}

/// GET /films-comments/ - Plus récents d'abord, filtre optionnel ?movie=
#[get("/")]
pub async fn list_comments(query: web::Query<CommentQuery>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let mut select = Comments::find();
    if let Some(movie_id) = query.movie {
        select = select.filter(CommentColumn::MovieId.eq(movie_id));
    }

    let comments: Vec<CommentResponse> = select
        .find_also_related(Users)
        .order_by_desc(CommentColumn::CreatedAt)
        .order_by_desc(CommentColumn::Id)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(|(comment, author)| CommentResponse::new(comment, author.map(|u| u.username).unwrap_or_default()))
        .collect();

    Ok(HttpResponse::Ok().json(comments))
}

#[get("/{id}/")]
pub async fn get_comment(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let (comment, author) = Comments::find_by_id(path.into_inner())
        .find_also_related(Users)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;

    Ok(HttpResponse::Ok().json(CommentResponse::new(comment, author.map(|u| u.username).unwrap_or_default())))
}

/// POST /films-comments/ (PROTÉGÉE) - l'auteur vient du token
#[post("/")]
pub async fn create_comment(
    auth_user: AuthUser,
    body: web::Json<CommentInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;

    let author = Users::find_by_id(auth_user.user_id)
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    if Movies::find_by_id(body.movie).one(db.get_ref()).await?.is_none() {
        return Err(ApiError::Validation("Movie not found".to_string()));
    }

    let comment = CommentActiveModel {
        user_id: Set(author.id),
        movie_id: Set(body.movie),
        text: Set(body.text.trim().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(CommentResponse::new(comment, author.username)))
}

/// DELETE /films-comments/{id}/ (PROTÉGÉE) - seul l'auteur peut supprimer
#[delete("/{id}/")]
pub async fn delete_comment(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let comment = Comments::find_by_id(path.into_inner())
        .one(db.get_ref())
        .await?
        .ok_or_else(|| ApiError::not_found("Comment"))?;

    if comment.user_id != auth_user.user_id {
        return Err(ApiError::Forbidden("You can only delete your own comments".to_string()));
    }

    Comments::delete_by_id(comment.id).exec(db.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn comments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/films-comments")
            .service(list_comments)
            .service(create_comment)
            .service(get_comment)
            .service(delete_comment),
    );
}
