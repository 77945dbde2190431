use actix_web::{get, web, HttpRequest, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::dto::{AllMoviesCard, DataEnvelope, HomeCard, SearchEnvelope, SearchResult, SimilarMovie, SwiperCard, TrailerCard};
use crate::routes::paged;
use crate::services::catalog_service::{CatalogService, PageRequest, DEFAULT_SIMILAR_LIMIT, HOME_SIZE, SWIPER_SIZE};

// Listes de la page d'accueil. Noms courts (sprmvs, hmvs, trls) conservés
// pour le frontend existant.

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct SimilarQuery {
    pub movie_id: Option<i32>,
    pub limit: Option<u64>,
}

/// GET /sprmvs/ - 8 films les plus actifs, tous départements
#[get("/sprmvs/")]
pub async fn swiper_movies(db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let cards = CatalogService::top(db.get_ref(), CatalogService::ranked(), SWIPER_SIZE).await?;
    let data: Vec<SwiperCard> = cards.iter().map(SwiperCard::from).collect();
    Ok(HttpResponse::Ok().json(DataEnvelope { data }))
}

/// GET /hmvs/ - 12 films hors bandes-annonces
#[get("/hmvs/")]
pub async fn home_movies(db: web::Data<DatabaseConnection>, config: web::Data<AppConfig>) -> ApiResult<HttpResponse> {
    let select = CatalogService::without_trailers(&config.trailers_department);
    let cards = CatalogService::top(db.get_ref(), select, HOME_SIZE).await?;
    let data: Vec<HomeCard> = cards.iter().map(HomeCard::from).collect();
    Ok(HttpResponse::Ok().json(DataEnvelope { data }))
}

/// GET /trls/ - Toutes les bandes-annonces
#[get("/trls/")]
pub async fn trailers(db: web::Data<DatabaseConnection>, config: web::Data<AppConfig>) -> ApiResult<HttpResponse> {
    let movies = CatalogService::trailers(&config.trailers_department).all(db.get_ref()).await?;
    let cards = CatalogService::cards(db.get_ref(), movies).await?;
    let data: Vec<TrailerCard> = cards.iter().map(TrailerCard::from).collect();
    Ok(HttpResponse::Ok().json(DataEnvelope { data }))
}

/// GET /all-movies/?page=&page_size= - Catalogue paginé hors bandes-annonces
#[get("/all-movies/")]
pub async fn all_movies(
    req: HttpRequest,
    query: web::Query<PageQuery>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ApiResult<HttpResponse> {
    let request = PageRequest::new(query.page, query.page_size);
    let select = CatalogService::without_trailers(&config.trailers_department);

    let page = CatalogService::paginate(db.get_ref(), select, request).await?;
    Ok(HttpResponse::Ok().json(paged(&req, page, |card| AllMoviesCard::from(card))))
}

/// GET /search/?q= - Recherche par nom, insensible à la casse
#[get("/search/")]
pub async fn search(query: web::Query<SearchQuery>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let cards = CatalogService::search(db.get_ref(), &query.q).await?;
    let data: Vec<SearchResult> = cards.iter().map(SearchResult::from).collect();

    Ok(HttpResponse::Ok().json(SearchEnvelope {
        count: data.len(),
        data,
        query: query.into_inner().q,
    }))
}

/// GET /similar-movies/?movie_id=&limit= - Même département
#[get("/similar-movies/")]
pub async fn similar_movies(query: web::Query<SimilarQuery>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let movie_id = query
        .movie_id
        .ok_or_else(|| ApiError::Validation("movie_id parameter is required".to_string()))?;
    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);

    let cards = CatalogService::similar(db.get_ref(), movie_id, limit).await?;
    let data: Vec<SimilarMovie> = cards.iter().map(SimilarMovie::from).collect();
    Ok(HttpResponse::Ok().json(data))
}

pub fn carousels_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(swiper_movies)
        .service(home_movies)
        .service(trailers)
        .service(all_movies)
        .service(search)
        .service(similar_movies);
}
