use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::movie_series::{self, ActiveModel as SeriesActiveModel, Column as SeriesColumn, Entity as Series};
use crate::models::movies::Entity as Movies;

// Même forme que la réponse: `movie` est l'id du film parent
#[derive(Deserialize, Validate)]
pub struct SeriesInput {
    pub movie: Option<i32>,
    #[validate(length(min = 1, max = 128, message = "title must be 1 to 128 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 2048, message = "video_url must be 1 to 2048 characters"))]
    pub video_url: Option<String>,
    pub video_file: Option<String>,
}

#[derive(Deserialize)]
pub struct SeriesQuery {
    pub movie: Option<i32>,
}

async fn find_series(db: &DatabaseConnection, id: i32) -> ApiResult<movie_series::Model> {
    Series::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Series"))
}

async fn ensure_movie(db: &DatabaseConnection, id: i32) -> ApiResult<()> {
    match Movies::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::Validation("Movie not found".to_string())),
    }
}

/// GET /series/?movie={id} - Épisodes, plus récents d'abord
#[get("/")]
pub async fn list_series(query: web::Query<SeriesQuery>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let mut select = Series::find()
        .order_by_desc(SeriesColumn::CreatedAt)
        .order_by_desc(SeriesColumn::Id);
    if let Some(movie_id) = query.movie {
        select = select.filter(SeriesColumn::MovieId.eq(movie_id));
    }

    Ok(HttpResponse::Ok().json(select.all(db.get_ref()).await?))
}

#[get("/{id}/")]
pub async fn get_series(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(find_series(db.get_ref(), path.into_inner()).await?))
}

/// POST /series/ (PROTÉGÉE) - le film remonte en tête des listes
#[post("/")]
pub async fn create_series(
    _auth_user: AuthUser,
    body: web::Json<SeriesInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let movie_id = body.movie.ok_or_else(|| ApiError::Validation("movie is required".to_string()))?;
    ensure_movie(db.get_ref(), movie_id).await?;

    let (Some(title), Some(video_url)) = (body.title, body.video_url) else {
        return Err(ApiError::Validation("title and video_url are required".to_string()));
    };

    let series = SeriesActiveModel {
        movie_id: Set(movie_id),
        title: Set(title),
        video_url: Set(video_url),
        video_file: Set(body.video_file.filter(|s| !s.is_empty())),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(series))
}

async fn apply_update(db: &DatabaseConnection, id: i32, body: SeriesInput, partial: bool) -> ApiResult<movie_series::Model> {
    body.validate()?;
    let series = find_series(db, id).await?;

    if !partial && (body.title.is_none() || body.video_url.is_none()) {
        return Err(ApiError::Validation("title and video_url are required".to_string()));
    }
    if let Some(movie_id) = body.movie {
        ensure_movie(db, movie_id).await?;
    }

    let mut active: SeriesActiveModel = series.into();
    if let Some(movie_id) = body.movie {
        active.movie_id = Set(movie_id);
    }
    if let Some(title) = body.title {
        active.title = Set(title);
    }
    if let Some(video_url) = body.video_url {
        active.video_url = Set(video_url);
    }
    if let Some(file) = body.video_file {
        active.video_file = Set(Some(file).filter(|s| !s.is_empty()));
    }

    Ok(active.update(db).await?)
}

#[put("/{id}/")]
pub async fn update_series(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<SeriesInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let series = apply_update(db.get_ref(), path.into_inner(), body.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(series))
}

#[patch("/{id}/")]
pub async fn patch_series(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<SeriesInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let series = apply_update(db.get_ref(), path.into_inner(), body.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(series))
}

#[delete("/{id}/")]
pub async fn delete_series(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let series = find_series(db.get_ref(), path.into_inner()).await?;
    Series::delete_by_id(series.id).exec(db.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn series_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/series")
            .service(list_series)
            .service(create_series)
            .service(get_series)
            .service(update_series)
            .service(patch_series)
            .service(delete_series),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use chrono::Utc;
    use serde_json::{json, Value};

    use crate::test_support::*;

    #[actix_web::test]
    async fn episodes_are_filtered_by_movie() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "admin", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let naruto = create_movie(&ctx.db, dept.id, "Naruto", Utc::now()).await;
        let bleach = create_movie(&ctx.db, dept.id, "Bleach", Utc::now()).await;
        let app = test_app!(ctx);

        for (movie, title) in [(naruto.id, "1-qism"), (naruto.id, "2-qism"), (bleach.id, "1-qism")] {
            let req = test::TestRequest::post()
                .uri(&url("/series/"))
                .insert_header(bearer(&user))
                .set_json(json!({ "movie": movie, "title": title, "video_url": "https://cdn.example.com/v.mp4" }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), 201);
        }

        let req = test::TestRequest::get()
            .uri(&url(&format!("/series/?movie={}", naruto.id)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["title"], "2-qism");
        assert_eq!(body[0]["movie"], naruto.id);

        let req = test::TestRequest::post()
            .uri(&url("/series/"))
            .insert_header(bearer(&user))
            .set_json(json!({ "movie": 999, "title": "x", "video_url": "y" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn long_title_is_rejected() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "admin", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Naruto", Utc::now()).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url("/series/"))
            .insert_header(bearer(&user))
            .set_json(json!({ "movie": movie.id, "title": "t".repeat(129), "video_url": "https://cdn.example.com/v.mp4" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }
}
