// Formes des réponses JSON. Les noms de champs (movies_name, dmnme, hfsnme...)
// sont ceux que le frontend consomme déjà, ne pas les renommer.
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{comments, departments, movie_series, movies, notifications, users};

/// Film + données jointes nécessaires à toutes les cartes de liste
#[derive(Debug, Clone)]
pub struct MovieCard {
    pub movie: movies::Model,
    pub department_name: Option<String>,
    pub series_count: i64,
}

// ---------------------------------------------------------------------------
// Enveloppes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T: Serialize> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub page_size: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PagedEnvelope<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    pub data: Vec<SearchResult>,
    pub query: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Films
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MovieListItem {
    pub id: i32,
    pub add_departments: i32,
    pub department_name: Option<String>,
    pub movies_description: String,
    pub movies_preview_url: Option<String>,
    pub movies_name: String,
    pub country: String,
    pub all_series: String,
    pub count: i32,
    pub year: String,
    pub series_count: i64,
    pub genre: String,
    pub created_at: DateTime<Utc>,
    pub is_possible: bool,
    pub movies_url: Option<String>,
}

impl From<&MovieCard> for MovieListItem {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        MovieListItem {
            id: m.id,
            add_departments: m.department_id,
            department_name: card.department_name.clone(),
            movies_description: m.description.clone(),
            movies_preview_url: m.preview_url.clone(),
            movies_name: m.name.clone(),
            country: m.country.clone(),
            all_series: m.all_series.clone(),
            count: m.count,
            year: m.year.clone(),
            series_count: card.series_count,
            genre: m.genre.clone(),
            created_at: m.created_at,
            is_possible: m.is_possible,
            movies_url: m.url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub department_id: i32,
    pub department_name: Option<String>,
    pub movies_preview_url: Option<String>,
    pub movies_name: String,
    pub movies_description: String,
    pub movies_url: Option<String>,
    pub country: String,
    pub count: i32,
    pub year: String,
    pub genre: String,
    pub all_series: String,
    pub created_at: DateTime<Utc>,
    pub series: Vec<movie_series::Model>,
    pub like_count: u64,
    pub dislike_count: u64,
    pub comments: Vec<CommentResponse>,
    pub is_possible: bool,
    pub is_saved: bool,
    pub user_vote: Option<bool>,
}

/// Carte "films du département"
#[derive(Debug, Serialize)]
pub struct DepartmentMovieCard {
    pub id: i32,
    pub dmdnme: Option<String>,
    pub dmnme: String,
    pub dmimage: Option<String>,
    pub dmcont: String,
    pub dmcnt: i32,
    pub dmscnt: i64,
    pub dmllsrs: String,
    pub department_id: i32,
}

impl From<&MovieCard> for DepartmentMovieCard {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        DepartmentMovieCard {
            id: m.id,
            dmdnme: card.department_name.clone(),
            dmnme: m.name.clone(),
            dmimage: m.preview_url.clone(),
            dmcont: m.country.clone(),
            dmcnt: m.count,
            dmscnt: card.series_count,
            dmllsrs: m.all_series.clone(),
            department_id: m.department_id,
        }
    }
}

/// Carrousel d'en-tête (8 films)
#[derive(Debug, Serialize)]
pub struct SwiperCard {
    pub mcrntindx: i32,
    pub dindx: i32,
    pub dnme: Option<String>,
    pub mnme: String,
    pub image: Option<String>,
}

impl From<&MovieCard> for SwiperCard {
    fn from(card: &MovieCard) -> Self {
        SwiperCard {
            mcrntindx: card.movie.id,
            dindx: card.movie.department_id,
            dnme: card.department_name.clone(),
            mnme: card.movie.name.clone(),
            image: card.movie.preview_url.clone(),
        }
    }
}

/// Page d'accueil (12 films)
#[derive(Debug, Serialize)]
pub struct HomeCard {
    pub id: i32,
    pub hfsdindx: i32,
    pub hfsdnme: Option<String>,
    pub hfsnme: String,
    pub hfsimage: Option<String>,
    pub hfscont: String,
    pub hfscnt: i32,
    pub hfsscnt: i64,
    pub hfsllsrs: String,
    pub created_at: DateTime<Utc>,
}

impl From<&MovieCard> for HomeCard {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        HomeCard {
            id: m.id,
            hfsdindx: m.department_id,
            hfsdnme: card.department_name.clone(),
            hfsnme: m.name.clone(),
            hfsimage: m.preview_url.clone(),
            hfscont: m.country.clone(),
            hfscnt: m.count,
            hfsscnt: card.series_count,
            hfsllsrs: m.all_series.clone(),
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrailerCard {
    pub id: i32,
    pub tdindx: i32,
    pub tdnme: Option<String>,
    pub tnme: String,
    pub timage: Option<String>,
    pub tcont: String,
    pub tcnt: i32,
    pub tscnt: i64,
    pub tllsrs: String,
}

impl From<&MovieCard> for TrailerCard {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        TrailerCard {
            id: m.id,
            tdindx: m.department_id,
            tdnme: card.department_name.clone(),
            tnme: m.name.clone(),
            timage: m.preview_url.clone(),
            tcont: m.country.clone(),
            tcnt: m.count,
            tscnt: card.series_count,
            tllsrs: m.all_series.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllMoviesCard {
    pub id: i32,
    pub aldindx: i32,
    pub aldnme: Option<String>,
    pub alnme: String,
    pub alimage: Option<String>,
    pub alcont: String,
    pub alcnt: i32,
    pub alscnt: i64,
    pub alllsrs: String,
}

impl From<&MovieCard> for AllMoviesCard {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        AllMoviesCard {
            id: m.id,
            aldindx: m.department_id,
            aldnme: card.department_name.clone(),
            alnme: m.name.clone(),
            alimage: m.preview_url.clone(),
            alcont: m.country.clone(),
            alcnt: m.count,
            alscnt: card.series_count,
            alllsrs: m.all_series.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub id: i32,
    pub department_id: i32,
    pub department_name: Option<String>,
    pub movies_preview_url: Option<String>,
    pub movies_name: String,
    pub country: String,
    pub count: i32,
    pub year: String,
    pub all_series: String,
    pub series_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&MovieCard> for SearchResult {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        SearchResult {
            id: m.id,
            department_id: m.department_id,
            department_name: card.department_name.clone(),
            movies_preview_url: m.preview_url.clone(),
            movies_name: m.name.clone(),
            country: m.country.clone(),
            count: m.count,
            year: m.year.clone(),
            all_series: m.all_series.clone(),
            series_count: card.series_count,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SimilarMovie {
    pub id: i32,
    pub add_departments: i32,
    pub department_name: Option<String>,
    pub movies_preview_url: Option<String>,
    pub movies_name: String,
    pub movies_description: String,
    pub country: String,
}

impl From<&MovieCard> for SimilarMovie {
    fn from(card: &MovieCard) -> Self {
        let m = &card.movie;
        SimilarMovie {
            id: m.id,
            add_departments: m.department_id,
            department_name: card.department_name.clone(),
            movies_preview_url: m.preview_url.clone(),
            movies_name: m.name.clone(),
            movies_description: m.description.clone(),
            country: m.country.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SavedFilmResponse {
    pub id: i32,
    pub add_departments: i32,
    pub department_name: Option<String>,
    pub movies_preview_url: Option<String>,
    pub movies_name: String,
    pub country: String,
    pub all_series: String,
    pub count: i32,
    pub series_count: i64,
    pub saved_at: DateTime<Utc>,
}

impl SavedFilmResponse {
    pub fn new(card: &MovieCard, saved_at: DateTime<Utc>) -> Self {
        let m = &card.movie;
        SavedFilmResponse {
            id: m.id,
            add_departments: m.department_id,
            department_name: card.department_name.clone(),
            movies_preview_url: m.preview_url.clone(),
            movies_name: m.name.clone(),
            country: m.country.clone(),
            all_series: m.all_series.clone(),
            count: m.count,
            series_count: card.series_count,
            saved_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Autres ressources
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DepartmentResponse {
    pub department_id: i32,
    pub department_name: String,
    pub image: Option<String>,
    pub description: String,
    pub movies: u64,
}

impl DepartmentResponse {
    pub fn new(department: departments::Model, movies: u64) -> Self {
        DepartmentResponse {
            department_id: department.id,
            department_name: department.name,
            image: department.image,
            description: department.description,
            movies,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i32,
    pub user: String,
    pub user_id: i32,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub movie: i32,
}

impl CommentResponse {
    pub fn new(comment: comments::Model, username: String) -> Self {
        CommentResponse {
            id: comment.id,
            user: username.clone(),
            user_id: comment.user_id,
            username,
            text: comment.text,
            created_at: comment.created_at,
            movie: comment.movie_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub views_count: i32,
    pub is_read: bool,
}

impl NotificationResponse {
    pub fn new(notification: notifications::Model, is_read: bool) -> Self {
        NotificationResponse {
            id: notification.id,
            title: notification.title,
            text: notification.text,
            created_at: notification.created_at,
            views_count: notification.views_count,
            is_read,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
    pub username: String,
    pub email: String,
    pub profile_image: Option<String>,
}

impl From<users::Model> for UserResponse {
    fn from(user: users::Model) -> Self {
        UserResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.date_joined,
            username: user.username,
            email: user.email,
            profile_image: user.profile_image,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteTotalsResponse {
    pub like_count: u64,
    pub dislike_count: u64,
}
