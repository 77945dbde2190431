use actix_web::cookie::Cookie;
use actix_web::{get, post, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, ClientContext};
use crate::models::dto::VoteTotalsResponse;
use crate::models::movies::Entity as Movies;
use crate::services::vote_service::{VoteService, VoterIdentity};

#[derive(Deserialize)]
pub struct VoteRequest {
    pub vote: Option<bool>,
}

async fn ensure_movie(db: &DatabaseConnection, id: i32) -> ApiResult<()> {
    match Movies::find_by_id(id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("Movie")),
    }
}

/// Compte si connecté, sinon cookie de session + IP
fn identity(auth_user: Option<&AuthUser>, client: &ClientContext, session_key: Option<String>) -> VoterIdentity {
    match auth_user {
        Some(user) => VoterIdentity::User(user.user_id),
        None => VoterIdentity::Anonymous {
            session_key,
            ip: client.ip.clone(),
        },
    }
}

/// POST /vote/{movie_id}/ - Like (true) ou dislike (false), un seul par votant
#[post("/vote/{movie_id}/")]
pub async fn cast_vote(
    path: web::Path<i32>,
    body: web::Json<VoteRequest>,
    auth_user: Option<AuthUser>,
    client: ClientContext,
    config: web::Data<AppConfig>,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let movie_id = path.into_inner();
    ensure_movie(db.get_ref(), movie_id).await?;

    let vote = body
        .vote
        .ok_or_else(|| ApiError::Validation("Vote not provided".to_string()))?;

    // 1. Un anonyme sans cookie reçoit une nouvelle session
    let mut new_session = None;
    let session_key = match (&auth_user, &client.session_key) {
        (Some(_), _) => None,
        (None, Some(key)) => Some(key.clone()),
        (None, None) => {
            let key = Uuid::new_v4().simple().to_string();
            new_session = Some(key.clone());
            Some(key)
        }
    };

    // 2. Créer ou mettre à jour
    let voter = identity(auth_user.as_ref(), &client, session_key);
    let (action, totals) = VoteService::cast(db.get_ref(), movie_id, &voter, vote).await?;

    let mut response = HttpResponse::Ok();
    if let Some(key) = new_session {
        response.cookie(
            Cookie::build(config.session_cookie.clone(), key)
                .path("/")
                .http_only(true)
                .finish(),
        );
    }

    Ok(response.json(serde_json::json!({
        "like_count": totals.like_count,
        "dislike_count": totals.dislike_count,
        "message": action.message()
    })))
}

/// GET /check-vote/{movie_id}/ - Vote actuel du visiteur
#[get("/check-vote/{movie_id}/")]
pub async fn check_vote(
    path: web::Path<i32>,
    auth_user: Option<AuthUser>,
    client: ClientContext,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let movie_id = path.into_inner();
    ensure_movie(db.get_ref(), movie_id).await?;

    let voter = identity(auth_user.as_ref(), &client, client.session_key.clone());
    let vote = VoteService::find_vote(db.get_ref(), movie_id, &voter).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "vote": vote.map(|v| v.vote),
        "can_change": true
    })))
}

/// GET /vote-count/{movie_id}/
#[get("/vote-count/{movie_id}/")]
pub async fn vote_count(path: web::Path<i32>, db: web::Data<DatabaseConnection>) -> ApiResult<HttpResponse> {
    let movie_id = path.into_inner();
    ensure_movie(db.get_ref(), movie_id).await?;

    let totals = VoteService::totals(db.get_ref(), movie_id).await?;
    Ok(HttpResponse::Ok().json(VoteTotalsResponse {
        like_count: totals.like_count,
        dislike_count: totals.dislike_count,
    }))
}

pub fn votes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(cast_vote).service(check_vote).service(vote_count);
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::test;
    use chrono::Utc;
    use sea_orm::{EntityTrait, PaginatorTrait};
    use serde_json::{json, Value};

    use crate::models::votes;
    use crate::test_support::*;

    #[actix_web::test]
    async fn account_votes_twice_keeps_one_row() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Naruto", Utc::now()).await;
        let app = test_app!(ctx);

        let path = url(&format!("/vote/{}/", movie.id));
        let first = test::TestRequest::post()
            .uri(&path)
            .insert_header(bearer(&user))
            .set_json(json!({ "vote": true }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, first).await;
        assert_eq!(body["message"], "Vote created successfully");
        assert_eq!(body["like_count"], 1);

        let second = test::TestRequest::post()
            .uri(&path)
            .insert_header(bearer(&user))
            .set_json(json!({ "vote": false }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, second).await;
        assert_eq!(body["message"], "Vote updated successfully");
        assert_eq!(body["like_count"], 0);
        assert_eq!(body["dislike_count"], 1);

        assert_eq!(votes::Entity::find().count(&ctx.db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn same_vote_twice_counts_once() {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx.db, "alice", "secret123").await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Naruto", Utc::now()).await;
        let app = test_app!(ctx);

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri(&url(&format!("/vote/{}/", movie.id)))
                .insert_header(bearer(&user))
                .set_json(json!({ "vote": true }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["like_count"], 1);
            assert_eq!(body["dislike_count"], 0);
        }

        let req = test::TestRequest::get()
            .uri(&url(&format!("/vote-count/{}/", movie.id)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["like_count"], 1);
        assert_eq!(votes::Entity::find().count(&ctx.db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn anonymous_voter_gets_a_session_cookie() {
        let ctx = TestContext::new().await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Bleach", Utc::now()).await;
        let app = test_app!(ctx);

        let path = url(&format!("/vote/{}/", movie.id));
        let req = test::TestRequest::post().uri(&path).set_json(json!({ "vote": true })).to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let session = resp
            .response()
            .cookies()
            .find(|c| c.name() == "sessionid")
            .map(|c| c.value().to_string())
            .expect("session cookie");

        let req = test::TestRequest::post()
            .uri(&path)
            .cookie(Cookie::new("sessionid", session.clone()))
            .set_json(json!({ "vote": false }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "Vote updated successfully");

        let req = test::TestRequest::get()
            .uri(&url(&format!("/check-vote/{}/", movie.id)))
            .cookie(Cookie::new("sessionid", session))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["vote"], false);
        assert_eq!(body["can_change"], true);

        assert_eq!(votes::Entity::find().count(&ctx.db).await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn missing_vote_or_movie_is_rejected() {
        let ctx = TestContext::new().await;
        let dept = create_department(&ctx.db, "Anime").await;
        let movie = create_movie(&ctx.db, dept.id, "Bleach", Utc::now()).await;
        let app = test_app!(ctx);

        let req = test::TestRequest::post()
            .uri(&url(&format!("/vote/{}/", movie.id)))
            .set_json(json!({}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::get().uri(&url("/vote-count/999/")).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
