// ============================================================================
// CATALOGUE - REQUÊTES ET ANNOTATIONS
// ============================================================================
//
// Toutes les listes de films passent par ranked():
//   movies LEFT JOIN movie_series GROUP BY movies.id
//   ORDER BY COALESCE(MAX(movie_series.created_at), movies.created_at) DESC, id DESC
//
// Un film remonte donc en tête dès qu'un nouvel épisode est ajouté.
//
// Les cartes (MovieCard) sont assemblées par page: noms de départements
// et nombres d'épisodes chargés en deux requêtes groupées, pas une par film.
//
// ============================================================================

use std::collections::HashMap;

use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::*;

use crate::error::{ApiError, ApiResult};
use crate::middleware::AuthUser;
use crate::models::dto::{CommentResponse, MovieCard, MovieDetail};
use crate::models::{comments, departments, movie_series, movies, saved_films, users, votes};
use crate::services::vote_service::VoteService;

const RECENCY: &str = "COALESCE(MAX(movie_series.created_at), movies.created_at)";

pub const DEFAULT_PAGE_SIZE: u64 = 16;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const SWIPER_SIZE: u64 = 8;
pub const HOME_SIZE: u64 = 12;
pub const DEFAULT_SIMILAR_LIMIT: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1),
            page_size: page_size
                .filter(|size| *size > 0)
                .map(|size| size.min(MAX_PAGE_SIZE))
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub total_pages: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Qui regarde la fiche: seul un compte a des sauvegardes et un vote à lui
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    Authenticated(i32),
    Anonymous,
}

impl Viewer {
    pub fn of(auth: Option<&AuthUser>) -> Self {
        match auth {
            Some(user) => Viewer::Authenticated(user.user_id),
            None => Viewer::Anonymous,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Engagement {
    pub is_saved: bool,
    pub like_count: u64,
    pub dislike_count: u64,
    pub user_vote: Option<bool>,
}

pub struct CatalogService;

impl CatalogService {
    /// Requête de base, triée par activité récente
    pub fn ranked() -> Select<movies::Entity> {
        movies::Entity::find()
            .join(JoinType::LeftJoin, movies::Relation::Series.def())
            .group_by(movies::Column::Id)
            .order_by_desc(Expr::cust(RECENCY))
            .order_by_desc(movies::Column::Id)
    }

    pub fn in_department(department_id: i32) -> Select<movies::Entity> {
        Self::ranked().filter(movies::Column::DepartmentId.eq(department_id))
    }

    pub fn trailers(trailers_department: &str) -> Select<movies::Entity> {
        Self::ranked()
            .join(JoinType::InnerJoin, movies::Relation::Department.def())
            .filter(department_name().like(contains(trailers_department)))
    }

    pub fn without_trailers(trailers_department: &str) -> Select<movies::Entity> {
        Self::ranked()
            .join(JoinType::InnerJoin, movies::Relation::Department.def())
            .filter(department_name().not_like(contains(trailers_department)))
    }

    /// Recherche insensible à la casse: "contient" ou "commence par"
    pub fn matching(query: &str) -> Select<movies::Entity> {
        let needle = escape_like(&query.to_lowercase());
        let name = || Expr::expr(Func::lower(Expr::col((movies::Entity, movies::Column::Name))));

        Self::ranked().filter(
            Condition::any()
                .add(name().like(LikeExpr::new(format!("%{needle}%")).escape('\\')))
                .add(name().like(LikeExpr::new(format!("{needle}%")).escape('\\'))),
        )
    }

    pub async fn list(db: &DatabaseConnection, movie_id: Option<i32>) -> Result<Vec<MovieCard>, DbErr> {
        let mut select = Self::ranked();
        if let Some(id) = movie_id {
            select = select.filter(movies::Column::Id.eq(id));
        }
        let movies = select.all(db).await?;
        Self::cards(db, movies).await
    }

    pub async fn top(db: &DatabaseConnection, select: Select<movies::Entity>, limit: u64) -> Result<Vec<MovieCard>, DbErr> {
        let movies = select.limit(limit).all(db).await?;
        Self::cards(db, movies).await
    }

    pub async fn search(db: &DatabaseConnection, query: &str) -> Result<Vec<MovieCard>, DbErr> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let movies = Self::matching(query).all(db).await?;
        Self::cards(db, movies).await
    }

    /// Même département, sans le film lui-même
    pub async fn similar(db: &DatabaseConnection, movie_id: i32, limit: u64) -> ApiResult<Vec<MovieCard>> {
        let current = movies::Entity::find_by_id(movie_id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Movie"))?;

        let movies = movies::Entity::find()
            .filter(movies::Column::DepartmentId.eq(current.department_id))
            .filter(movies::Column::Id.ne(movie_id))
            .order_by_desc(movies::Column::Id)
            .limit(limit)
            .all(db)
            .await?;

        Ok(Self::cards(db, movies).await?)
    }

    pub async fn paginate(
        db: &DatabaseConnection,
        select: Select<movies::Entity>,
        request: PageRequest,
    ) -> ApiResult<Page<MovieCard>> {
        let paginator = select.paginate(db, request.page_size);
        let totals = paginator.num_items_and_pages().await?;

        // Une liste vide a quand même une page 1
        let total_pages = totals.number_of_pages.max(1);
        if request.page == 0 || request.page > total_pages {
            return Err(ApiError::NotFound("Invalid page.".to_string()));
        }

        let movies = paginator.fetch_page(request.page - 1).await?;
        Ok(Page {
            items: Self::cards(db, movies).await?,
            count: totals.number_of_items,
            total_pages,
            page: request.page,
            page_size: request.page_size,
        })
    }

    /// Ajoute nom du département et nombre d'épisodes à chaque film
    pub async fn cards(db: &DatabaseConnection, movies: Vec<movies::Model>) -> Result<Vec<MovieCard>, DbErr> {
        if movies.is_empty() {
            return Ok(Vec::new());
        }

        let mut department_ids: Vec<i32> = movies.iter().map(|m| m.department_id).collect();
        department_ids.sort_unstable();
        department_ids.dedup();

        let names: HashMap<i32, String> = departments::Entity::find()
            .filter(departments::Column::Id.is_in(department_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        let movie_ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
        let series_counts = Self::series_counts(db, &movie_ids).await?;

        Ok(movies
            .into_iter()
            .map(|movie| MovieCard {
                department_name: names.get(&movie.department_id).cloned(),
                series_count: series_counts.get(&movie.id).copied().unwrap_or(0),
                movie,
            })
            .collect())
    }

    pub async fn series_counts(db: &DatabaseConnection, movie_ids: &[i32]) -> Result<HashMap<i32, i64>, DbErr> {
        let rows: Vec<(i32, i64)> = movie_series::Entity::find()
            .select_only()
            .column(movie_series::Column::MovieId)
            .column_as(Expr::col(movie_series::Column::Id).count(), "series_count")
            .filter(movie_series::Column::MovieId.is_in(movie_ids.to_vec()))
            .group_by(movie_series::Column::MovieId)
            .into_tuple()
            .all(db)
            .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn department_movie_counts(db: &DatabaseConnection) -> Result<HashMap<i32, i64>, DbErr> {
        let rows: Vec<(i32, i64)> = movies::Entity::find()
            .select_only()
            .column(movies::Column::DepartmentId)
            .column_as(Expr::col(movies::Column::Id).count(), "movie_count")
            .group_by(movies::Column::DepartmentId)
            .into_tuple()
            .all(db)
            .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn engagement(db: &DatabaseConnection, movie_id: i32, viewer: Viewer) -> Result<Engagement, DbErr> {
        let totals = VoteService::totals(db, movie_id).await?;

        let (is_saved, user_vote) = match viewer {
            Viewer::Authenticated(user_id) => {
                let saved = saved_films::Entity::find()
                    .filter(saved_films::Column::UserId.eq(user_id))
                    .filter(saved_films::Column::MovieId.eq(movie_id))
                    .count(db)
                    .await?
                    > 0;
                let vote = votes::Entity::find()
                    .filter(votes::Column::UserId.eq(user_id))
                    .filter(votes::Column::MovieId.eq(movie_id))
                    .one(db)
                    .await?
                    .map(|v| v.vote);
                (saved, vote)
            }
            Viewer::Anonymous => (false, None),
        };

        Ok(Engagement {
            is_saved,
            like_count: totals.like_count,
            dislike_count: totals.dislike_count,
            user_vote,
        })
    }

    /// Fiche complète: épisodes, commentaires, votes, état pour le lecteur
    pub async fn detail(db: &DatabaseConnection, movie: movies::Model, viewer: Viewer) -> Result<MovieDetail, DbErr> {
        let department_name = departments::Entity::find_by_id(movie.department_id)
            .one(db)
            .await?
            .map(|d| d.name);

        let series = movie_series::Entity::find()
            .filter(movie_series::Column::MovieId.eq(movie.id))
            .order_by_desc(movie_series::Column::CreatedAt)
            .order_by_desc(movie_series::Column::Id)
            .all(db)
            .await?;

        let comments = comments::Entity::find()
            .filter(comments::Column::MovieId.eq(movie.id))
            .find_also_related(users::Entity)
            .order_by_desc(comments::Column::CreatedAt)
            .order_by_desc(comments::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|(comment, author)| {
                CommentResponse::new(comment, author.map(|u| u.username).unwrap_or_default())
            })
            .collect();

        let engagement = Self::engagement(db, movie.id, viewer).await?;

        Ok(MovieDetail {
            id: movie.id,
            department_id: movie.department_id,
            department_name,
            movies_preview_url: movie.preview_url,
            movies_name: movie.name,
            movies_description: movie.description,
            movies_url: movie.url,
            country: movie.country,
            count: movie.count,
            year: movie.year,
            genre: movie.genre,
            all_series: movie.all_series,
            created_at: movie.created_at,
            series,
            like_count: engagement.like_count,
            dislike_count: engagement.dislike_count,
            comments,
            is_possible: movie.is_possible,
            is_saved: engagement.is_saved,
            user_vote: engagement.user_vote,
        })
    }
}

fn department_name() -> Expr {
    Expr::expr(Func::lower(Expr::col((departments::Entity, departments::Column::Name))))
}

/// '%fragment%' en minuscules, jokers échappés
fn contains(fragment: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&fragment.to_lowercase()))).escape('\\')
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
