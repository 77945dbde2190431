use actix_web::{delete, get, patch, post, put, web, HttpRequest, HttpResponse};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::departments::{self, ActiveModel as DepartmentActiveModel, Entity as Departments};
use crate::models::dto::{DataEnvelope, DepartmentMovieCard, DepartmentResponse};
use crate::routes::paged;
use crate::services::catalog_service::{CatalogService, PageRequest};

// DTO commun création / modification, champs optionnels pour PATCH
#[derive(Deserialize, Validate)]
pub struct DepartmentInput {
    #[validate(length(min = 1, max = 512, message = "department_name must not be empty"))]
    pub department_name: Option<String>,
    #[validate(length(max = 30, message = "description must be at most 30 characters"))]
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

async fn find_department(db: &DatabaseConnection, id: i32) -> ApiResult<departments::Model> {
    Departments::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Department"))
}

async fn respond(db: &DatabaseConnection, department: departments::Model) -> ApiResult<DepartmentResponse> {
    let counts = CatalogService::department_movie_counts(db).await?;
    let movies = counts.get(&department.id).copied().unwrap_or(0) as u64;
    Ok(DepartmentResponse::new(department, movies))
}

fn wrap<T: Serialize>(data: T) -> DataEnvelope<T> {
    DataEnvelope { data }
}

/// GET /departments/ - Tous les départements avec leur nombre de films
#[get("/")]
pub async fn list_departments(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let counts = CatalogService::department_movie_counts(db.get_ref()).await?;
    let departments: Vec<DepartmentResponse> = Departments::find()
        .order_by_asc(departments::Column::Id)
        .all(db.get_ref())
        .await?
        .into_iter()
        .map(|d| {
            let movies = counts.get(&d.id).copied().unwrap_or(0) as u64;
            DepartmentResponse::new(d, movies)
        })
        .collect();

    Ok(HttpResponse::Ok().json(wrap(departments)))
}

#[get("/{id}/")]
pub async fn get_department(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let department = find_department(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(wrap(respond(db.get_ref(), department).await?)))
}

/// POST /departments/ (PROTÉGÉE)
#[post("/")]
pub async fn create_department(
    _auth_user: AuthUser,
    body: web::Json<DepartmentInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let name = body
        .department_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("department_name is required".to_string()))?;

    let department = DepartmentActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(body.description.unwrap_or_default()),
        image: Set(body.image.filter(|s| !s.is_empty())),
        ..Default::default()
    }
    .insert(db.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(DepartmentResponse::new(department, 0)))
}

async fn apply_update(
    db: &DatabaseConnection,
    id: i32,
    body: DepartmentInput,
    partial: bool,
) -> ApiResult<DepartmentResponse> {
    body.validate()?;
    let department = find_department(db, id).await?;

    if !partial && body.department_name.is_none() {
        return Err(ApiError::Validation("department_name is required".to_string()));
    }

    let mut active: DepartmentActiveModel = department.into();
    if let Some(name) = body.department_name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("department_name must not be empty".to_string()));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = body.description {
        active.description = Set(description);
    }
    if let Some(image) = body.image {
        active.image = Set(Some(image).filter(|s| !s.is_empty()));
    }

    let updated = active.update(db).await?;
    respond(db, updated).await
}

/// PUT /departments/{id}/ (PROTÉGÉE)
#[put("/{id}/")]
pub async fn update_department(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<DepartmentInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let response = apply_update(db.get_ref(), path.into_inner(), body.into_inner(), false).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// PATCH /departments/{id}/ (PROTÉGÉE)
#[patch("/{id}/")]
pub async fn patch_department(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<DepartmentInput>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let response = apply_update(db.get_ref(), path.into_inner(), body.into_inner(), true).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// DELETE /departments/{id}/ (PROTÉGÉE) - supprime aussi ses films
#[delete("/{id}/")]
pub async fn delete_department(
    _auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let department = find_department(db.get_ref(), path.into_inner()).await?;
    Departments::delete_by_id(department.id).exec(db.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /departments/{id}/movies/ - Films du département, paginés
#[get("/{id}/movies/")]
pub async fn department_movies(
    req: HttpRequest,
    path: web::Path<i32>,
    query: web::Query<PageQuery>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let department = find_department(db.get_ref(), path.into_inner()).await?;
    let request = PageRequest::new(query.page, query.page_size);

    let page = CatalogService::paginate(db.get_ref(), CatalogService::in_department(department.id), request).await?;
    Ok(HttpResponse::Ok().json(paged(&req, page, |card| DepartmentMovieCard::from(card))))
}

pub fn departments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/departments")
            .service(list_departments)
            .service(create_department)
            .service(get_department)
            .service(update_department)
            .service(patch_department)
            .service(delete_department)
            .service(department_movies),
    );
}
