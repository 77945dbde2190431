pub mod auth;
pub mod carousels;
pub mod comments;
pub mod departments;
pub mod health;
pub mod movies;
pub mod notifications;
pub mod password_reset;
pub mod saved_films;
pub mod series;
pub mod stats;
pub mod votes;

use actix_web::{web, HttpRequest};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::dto::{MovieCard, PageInfo, PagedEnvelope};
use crate::services::catalog_service::Page;

/// Toutes les routes API vivent sous `api_prefix` (ex: /watch-anime/api),
/// le health check reste à la racine
pub fn configure_routes(cfg: &mut web::ServiceConfig, api_prefix: &str) {
    cfg.service(health::health_check).service(
        web::scope(api_prefix)
            .configure(auth::auth_routes)
            .configure(stats::stats_routes)
            .configure(departments::departments_routes)
            .configure(movies::movies_routes)
            .configure(series::series_routes)
            .configure(comments::comments_routes)
            .configure(carousels::carousels_routes)
            .configure(votes::votes_routes)
            .configure(saved_films::saved_films_routes)
            .configure(notifications::notifications_routes)
            .configure(password_reset::password_reset_routes),
    );
}

/// Corps JSON, query string et segments de chemin invalides: même format que ApiError
pub fn extractor_errors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::NotFound(err.to_string()).into()),
    );
}

/// Enveloppe {data, pagination} avec liens absolus vers les pages voisines
pub(crate) fn paged<T, F>(req: &HttpRequest, page: Page<MovieCard>, shape: F) -> PagedEnvelope<T>
where
    T: Serialize,
    F: Fn(&MovieCard) -> T,
{
    let next = (page.page < page.total_pages).then(|| page_link(req, page.page + 1));
    let previous = (page.page > 1).then(|| page_link(req, page.page - 1));

    PagedEnvelope {
        data: page.items.iter().map(shape).collect(),
        pagination: PageInfo {
            count: page.count,
            total_pages: page.total_pages,
            current_page: page.page,
            page_size: page.page_size,
            next,
            previous,
        },
    }
}

fn page_link(req: &HttpRequest, page: u64) -> String {
    let info = req.connection_info();
    let page_param = format!("page={page}");
    let mut params: Vec<&str> = req
        .query_string()
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("page="))
        .collect();
    params.push(&page_param);

    format!("{}://{}{}?{}", info.scheme(), info.host(), req.path(), params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn page_link_keeps_other_params() {
        let req = TestRequest::get()
            .uri("/watch-anime/api/all-movies/?page=2&page_size=4")
            .insert_header(("Host", "example.uz"))
            .to_http_request();
        assert_eq!(
            page_link(&req, 3),
            "http://example.uz/watch-anime/api/all-movies/?page_size=4&page=3"
        );
    }
}
