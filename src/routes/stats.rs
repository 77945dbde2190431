use actix_web::{get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::error::ApiResult;
use crate::models::{comments, departments, movie_series, movies, users};

// Compteurs globaux pour le tableau de bord, réponse {"totalX": n}

#[get("/totalMovies/")]
pub async fn total_movies(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let total = movies::Entity::find().count(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "totalMovies": total })))
}

#[get("/totalUsers/")]
pub async fn total_users(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let total = users::Entity::find().count(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "totalUsers": total })))
}

#[get("/totalDepartments/")]
pub async fn total_departments(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let total = departments::Entity::find().count(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "totalDepartments": total })))
}

#[get("/totalSeries/")]
pub async fn total_series(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let total = movie_series::Entity::find().count(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "totalSeries": total })))
}

#[get("/totalComments/")]
pub async fn total_comments(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let total = comments::Entity::find().count(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "totalComments": total })))
}

pub fn stats_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(total_movies)
        .service(total_users)
        .service(total_departments)
        .service(total_series)
        .service(total_comments);
}
