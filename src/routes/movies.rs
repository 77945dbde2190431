use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, ClientContext};
use crate::models::departments::Entity as Departments;
use crate::models::dto::{MovieCard, MovieListItem};
use crate::models::movies::{self, ActiveModel as MovieActiveModel, Column as MovieColumn, Entity as Movies};
use crate::services::catalog_service::{CatalogService, Viewer};
use crate::services::region_gate::RegionGate;

// DTO création / modification. `add_departments` est l'ancien nom du champ.
#[derive(Deserialize, Validate)]
pub struct MovieInput {
    #[serde(alias = "add_departments")]
    pub department_id: Option<i32>,
    #[validate(length(min = 1, max = 128, message = "movies_name must be 1 to 128 characters"))]
    pub movies_name: Option<String>,
    #[validate(length(max = 2048, message = "movies_description must be at most 2048 characters"))]
    pub movies_description: Option<String>,
    pub movies_preview_url: Option<String>,
    pub movies_url: Option<String>,
    pub local_file: Option<String>,
    #[validate(length(max = 32, message = "country must be at most 32 characters"))]
    pub country: Option<String>,
    #[validate(range(min = 0, message = "count must not be negative"))]
    pub count: Option<i32>,
    #[validate(length(max = 32, message = "year must be at most 32 characters"))]
    pub year: Option<String>,
    #[validate(length(max = 512, message = "genre must be at most 512 characters"))]
    pub genre: Option<String>,
    #[validate(length(max = 512, message = "all_series must be at most 512 characters"))]
    pub all_series: Option<String>,
    pub is_possible: Option<bool>,
}

#[derive(Deserialize)]
pub struct MovieListQuery {
    pub movie_id: Option<i32>,
}

fn blank_to_none(value: String) -> Option<String> {
    Some(value).filter(|s| !s.trim().is_empty())
}

async fn find_movie(db: &DatabaseConnection, id: i32) -> ApiResult<movies::Model> {
    Movies::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Movie"))
}

async fn ensure_department(db: &DatabaseConnection, id: i32) -> ApiResult<()> {
    Departments::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::Validation("Department not found".to_string()))
}

async fn list_item(db: &DatabaseConnection, movie: movies::Model) -> ApiResult<MovieListItem> {
    let cards: Vec<MovieCard> = CatalogService::cards(db, vec![movie]).await?;
    cards
        .first()
        .map(MovieListItem::from)
        .ok_or_else(|| ApiError::Internal("movie card assembly returned nothing".to_string()))
}

/// GET /movies/ - Catalogue complet trié par activité récente
#[get("/")]
pub async fn list_movies(
    query: web::Query<MovieListQuery>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let cards = CatalogService::list(db.get_ref(), query.movie_id).await?;
    let items: Vec<MovieListItem> = cards.iter().map(MovieListItem::from).collect();
    Ok(HttpResponse::Ok().json(items))
}

/// GET /movies/{id}/ - Fiche complète, soumise au filtrage régional
#[get("/{id}/")]
pub async fn get_movie(
    path: web::Path<i32>,
    auth_user: Option<AuthUser>,
    client: ClientContext,
    gate: web::Data<RegionGate>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let movie = find_movie(db.get_ref(), path.into_inner()).await?;

    // 1. Filtrage régional (uniquement pour les films is_possible)
    let verdict = gate.evaluate(movie.is_possible, &client).await;
    if verdict.is_blocked() {
        tracing::info!(movie_id = movie.id, ip = ?client.ip, "movie blocked for region");
        return Err(ApiError::RegionBlocked { movie_name: movie.name });
    }

    // 2. Annotations propres au lecteur
    let viewer = Viewer::of(auth_user.as_ref());
    let detail = CatalogService::detail(db.get_ref(), movie, viewer).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// POST /movies/ (PROTÉGÉE)
#[post("/")]
pub async fn create_movie(
    _auth_user: AuthUser,
    body: web::Json<MovieInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let department_id = body
        .department_id
        .ok_or_else(|| ApiError::Validation("add_departments is required".to_string()))?;
    ensure_department(db.get_ref(), department_id).await?;

    let name = body
        .movies_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("movies_name is required".to_string()))?;

    let movie = MovieActiveModel {
        department_id: Set(department_id),
        name: Set(name),
        description: Set(body.movies_description.unwrap_or_default()),
        preview_url: Set(body.movies_preview_url.and_then(blank_to_none)),
        url: Set(body.movies_url.and_then(blank_to_none)),
        local_file: Set(body.local_file.and_then(blank_to_none)),
        country: Set(body.country.unwrap_or_default()),
        count: Set(body.count.unwrap_or(0)),
        year: Set(body.year.unwrap_or_default()),
        genre: Set(body.genre.unwrap_or_default()),
        all_series: Set(body.all_series.unwrap_or_default()),
        created_at: Set(Utc::now()),
        is_possible: Set(body.is_possible.unwrap_or(false)),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    tracing::info!(movie_id = movie.id, "movie created");
    Ok(HttpResponse::Created().json(list_item(db.get_ref(), movie).await?))
}

async fn apply_update(db: &DatabaseConnection, id: i32, body: MovieInput, partial: bool) -> ApiResult<MovieListItem> {
    body.validate()?;
    let movie = find_movie(db, id).await?;

    if !partial && body.movies_name.is_none() {
        return Err(ApiError::Validation("movies_name is required".to_string()));
    }
    // Le compteur de vues ne recule jamais
    if let Some(count) = body.count {
        if count < movie.count {
            return Err(ApiError::Validation("count cannot be decreased".to_string()));
        }
    }

    // Sans département fourni, on garde l'actuel
    if let Some(department_id) = body.department_id {
        ensure_department(db, department_id).await?;
    }

    let mut active: MovieActiveModel = movie.into();
    if let Some(department_id) = body.department_id {
        active.department_id = Set(department_id);
    }
    if let Some(name) = body.movies_name {
        active.name = Set(name);
    }
    if let Some(description) = body.movies_description {
        active.description = Set(description);
    }
    if let Some(preview) = body.movies_preview_url {
        active.preview_url = Set(blank_to_none(preview));
    }
    if let Some(url) = body.movies_url {
        active.url = Set(blank_to_none(url));
    }
    if let Some(file) = body.local_file {
        active.local_file = Set(blank_to_none(file));
    }
    if let Some(country) = body.country {
        active.country = Set(country);
    }
    if let Some(count) = body.count {
        active.count = Set(count);
    }
    if let Some(year) = body.year {
        active.year = Set(year);
    }
    if let Some(genre) = body.genre {
        active.genre = Set(genre);
    }
    if let Some(all_series) = body.all_series {
        active.all_series = Set(all_series);
    }
    if let Some(is_possible) = body.is_possible {
        active.is_possible = Set(is_possible);
    }

    let updated = active.update(db).await?;
    list_item(db, updated).await
}

/// PUT /movies/{id}/ (PROTÉGÉE)
#[put("/{id}/")]
pub async fn update_movie(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<MovieInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let item = apply_update(db.get_ref(), path.into_inner(), body.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// PATCH /movies/{id}/ (PROTÉGÉE)
#[patch("/{id}/")]
pub async fn patch_movie(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<MovieInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let item = apply_update(db.get_ref(), path.into_inner(), body.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(item))
}

/// DELETE /movies/{id}/ (PROTÉGÉE) - épisodes, commentaires et votes suivent
#[delete("/{id}/")]
pub async fn delete_movie(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let movie = find_movie(db.get_ref(), path.into_inner()).await?;
    Movies::delete_by_id(movie.id).exec(db.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /movies/{id}/increment-count/ - +1 vue, atomique côté SQL (PUBLIC)
#[post("/{id}/increment-count/")]
pub async fn increment_count(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();

    let result = Movies::update_many()
        .col_expr(MovieColumn::Count, Expr::col(MovieColumn::Count).add(1))
        .filter(MovieColumn::Id.eq(id))
        .exec(db.get_ref())
        .await?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Movie"));
    }

    let movie = find_movie(db.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Count incremented successfully",
        "new_count": movie.count
    })))
}

pub fn movies_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/movies")
            .service(list_movies)
            .service(create_movie)
            .service(get_movie)
            .service(update_movie)
            .service(patch_movie)
            .service(delete_movie)
            .service(increment_count),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::test;
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};
    use serde_json::{json, Value};

    use crate::models::movies;
    use crate::services::geolocation::GeoRecord;
    use crate::test_support::*;

    fn uzbek_isp() -> GeoRecord {
        GeoRecord {
            country: "uzbekistan".into(),
            country_code: "uz".into(),
            isp: "uztelecom".into(),
            ..Default::default()
        }
    }

    async fn gated_movie(ctx: &TestContext) -> movies::Model {
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Attack on Titan", Utc::now()).await;
        let mut active: movies::ActiveModel = movie.into();
        active.is_possible = Set(true);
        active.update(&ctx.db).await.unwrap()
    }

    #[actix_web::test]
    async fn restricted_region_without_vpn_is_blocked() {
        let ctx = TestContext::with_geo(Some(uzbek_isp())).await;
        let movie = gated_movie(&ctx).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri(&url(&format!("/movies/{}/", movie.id)))
            .insert_header(("X-Forwarded-For", "84.54.1.2"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["is_blocked"], true);
        assert_eq!(body["requires_vpn"], true);
        assert_eq!(body["movie_name"], "Attack on Titan");
    }

    #[actix_web::test]
    async fn vpn_user_sees_the_detail() {
        let mut record = uzbek_isp();
        record.country = "germany".into();
        record.country_code = "de".into();
        record.isp = "nordvpn".into();
        let ctx = TestContext::with_geo(Some(record)).await;
        let movie = gated_movie(&ctx).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::get()
            .uri(&url(&format!("/movies/{}/", movie.id)))
            .insert_header(("X-Forwarded-For", "84.54.1.2"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["movies_name"], "Attack on Titan");
        assert_eq!(body["is_saved"], false);
    }

    #[actix_web::test]
    async fn count_goes_up_but_never_down() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "admin", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "One Piece", Utc::now()).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url(&format!("/movies/{}/increment-count/", movie.id)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["new_count"], 1);

        let req = test::TestRequest::patch()
            .uri(&url(&format!("/movies/{}/", movie.id)))
            .insert_header(bearer(&user))
            .set_json(json!({ "count": 0 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post().uri(&url("/movies/999/increment-count/")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }

    #[actix_web::test]
    async fn oversized_fields_are_rejected() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "admin", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let app = test_app!(ctx);

        let create = |body: Value| {
            test::TestRequest::post()
                .uri(&url("/movies/"))
                .insert_header(bearer(&user))
                .set_json(body)
                .to_request()
        };

        for body in [
            json!({ "add_departments": dept.id, "movies_name": "n".repeat(129) }),
            json!({ "add_departments": dept.id, "movies_name": "Naruto", "country": "c".repeat(33) }),
            json!({ "add_departments": dept.id, "movies_name": "Naruto", "movies_description": "d".repeat(2049) }),
        ] {
            assert_eq!(test::call_service(&app, create(body)).await.status(), 400);
        }

        let resp = test::call_service(&app, create(json!({ "add_departments": dept.id, "movies_name": "n".repeat(128) }))).await;
        assert_eq!(resp.status(), 201);
    }

    #[actix_web::test]
    async fn detail_reflects_the_viewer() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Naruto", Utc::now()).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url("/saved-films/"))
            .insert_header(bearer(&user))
            .set_json(json!({ "filmId": movie.id }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);

        let req = test::TestRequest::post()
            .uri(&url(&format!("/vote/{}/", movie.id)))
            .insert_header(bearer(&user))
            .set_json(json!({ "vote": true }))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::get()
            .uri(&url(&format!("/movies/{}/", movie.id)))
            .insert_header(bearer(&user))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["is_saved"], true);
        assert_eq!(body["user_vote"], true);
        assert_eq!(body["like_count"], 1);
        assert_eq!(body["dislike_count"], 0);

        // Même film sans compte: compteurs identiques, pas d'état personnel
        let req = test::TestRequest::get()
            .uri(&url(&format!("/movies/{}/", movie.id)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["is_saved"], false);
        assert!(body["user_vote"].is_null());
        assert_eq!(body["like_count"], 1);
    }
}
