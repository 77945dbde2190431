use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::SavedFilmResponse;
use crate::models::movies::Entity as Movies;
use crate::models::saved_films::{ActiveModel as SavedActiveModel, Column as SavedColumn, Entity as SavedFilms};
use crate::services::catalog_service::CatalogService;
use crate::services::vote_service::is_unique_violation;

#[derive(Deserialize)]
pub struct SaveFilmRequest {
    #[serde(rename = "filmId")]
    pub film_id: Option<i32>,
}

/// Films sauvegardés d'un utilisateur, plus récents d'abord
async fn saved_list(db: &DatabaseConnection, user_id: i32) -> ApiResult<Vec<SavedFilmResponse>> {
    let rows = SavedFilms::find()
        .filter(SavedColumn::UserId.eq(user_id))
        .find_also_related(Movies)
        .order_by_desc(SavedColumn::SavedAt)
        .order_by_desc(SavedColumn::Id)
        .all(db)
        .await?;

    let (saved_at, films): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .filter_map(|(saved, movie)| movie.map(|m| (saved.saved_at, m)))
        .unzip();

    let cards = CatalogService::cards(db, films).await?;
    Ok(cards
        .iter()
        .zip(saved_at)
        .map(|(card, saved_at)| SavedFilmResponse::new(card, saved_at))
        .collect())
}

/// GET /saved-films/ (PROTÉGÉE)
#[get("/")]
pub async fn list_saved(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(saved_list(db.get_ref(), auth_user.user_id).await?))
}

/// POST /saved-films/ {"filmId": n} (PROTÉGÉE) - sauvegarder deux fois ne crée qu'une ligne
#[post("/")]
pub async fn save_film(
    auth_user: AuthUser,
    body: web::Json<SaveFilmRequest>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let film_id = body
        .film_id
        .ok_or_else(|| ApiError::Validation("Film ID is required.".to_string()))?;

    if Movies::find_by_id(film_id).one(db.get_ref()).await?.is_none() {
        return Err(ApiError::NotFound("Film not found.".to_string()));
    }

    let already = SavedFilms::find()
        .filter(SavedColumn::UserId.eq(auth_user.user_id))
        .filter(SavedColumn::MovieId.eq(film_id))
        .one(db.get_ref())
        .await?
        .is_some();

    if !already {
        let row = SavedActiveModel {
            user_id: Set(auth_user.user_id),
            movie_id: Set(film_id),
            saved_at: Set(Utc::now()),
            ..Default::default()
        };
        match row.insert(db.get_ref()).await {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(HttpResponse::Created().json(saved_list(db.get_ref(), auth_user.user_id).await?))
}

/// DELETE /saved-films/{film_id}/ (PROTÉGÉE)
#[delete("/{film_id}/")]
pub async fn unsave_film(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let film_id = path.into_inner();

    let result = SavedFilms::delete_many()
        .filter(SavedColumn::UserId.eq(auth_user.user_id))
        .filter(SavedColumn::MovieId.eq(film_id))
        .exec(db.get_ref())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::NotFound("Film not found in saved list.".to_string()));
    }

    Ok(HttpResponse::Ok().json(saved_list(db.get_ref(), auth_user.user_id).await?))
}

pub fn saved_films_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/saved-films")
            .service(list_saved)
            .service(save_film)
            .service(unsave_film),
    );
}
