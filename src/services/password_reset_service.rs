use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::*;

use crate::error::{ApiError, ApiResult};
use crate::models::{password_reset_tokens, users};
use crate::services::mailer::{EmailMessage, Mailer};
use crate::utils::password;

pub const CODE_TTL_MINUTES: i64 = 5;
const SITE_NAME: &str = "AFD Platform";

pub struct PasswordResetService;

impl PasswordResetService {
    /// Code numérique à 6 chiffres
    pub fn generate_code() -> String {
        let mut rng = rand::thread_rng();
        (0..6).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
    }

    async fn user_by_email(db: &impl ConnectionTrait, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim()))
            .order_by_asc(users::Column::Id)
            .one(db)
            .await
    }

    fn unknown_email() -> ApiError {
        ApiError::NotFound("No user is registered with this email".to_string())
    }

    fn invalid_code() -> ApiError {
        ApiError::Validation("Invalid or expired code".to_string())
    }

    /// Remplace tout code existant par un nouveau et l'envoie par email
    pub async fn request(db: &DatabaseConnection, mailer: &dyn Mailer, email: &str) -> ApiResult<()> {
        let user = Self::user_by_email(db, email).await?.ok_or_else(Self::unknown_email)?;

        password_reset_tokens::Entity::delete_many()
            .filter(password_reset_tokens::Column::UserId.eq(user.id))
            .exec(db)
            .await?;

        let now = Utc::now();
        let code = Self::generate_code();
        password_reset_tokens::ActiveModel {
            user_id: Set(user.id),
            token: Set(code.clone()),
            created_at: Set(now),
            expires_at: Set(now + Duration::minutes(CODE_TTL_MINUTES)),
            is_used: Set(false),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let message = reset_email(&user.email, &code);
        if let Err(e) = mailer.send(&message).await {
            tracing::error!(user_id = user.id, error = %e, "failed to send reset code");
            return Err(ApiError::Delivery("Failed to send email".to_string()));
        }

        tracing::info!(user_id = user.id, "password reset code issued");
        Ok(())
    }

    async fn valid_token(
        db: &impl ConnectionTrait,
        user_id: i32,
        code: &str,
    ) -> Result<Option<password_reset_tokens::Model>, DbErr> {
        password_reset_tokens::Entity::find()
            .filter(password_reset_tokens::Column::UserId.eq(user_id))
            .filter(password_reset_tokens::Column::Token.eq(code.trim()))
            .filter(password_reset_tokens::Column::IsUsed.eq(false))
            .filter(password_reset_tokens::Column::ExpiresAt.gte(Utc::now()))
            .one(db)
            .await
    }

    pub async fn verify(db: &DatabaseConnection, email: &str, code: &str) -> ApiResult<()> {
        let user = Self::user_by_email(db, email).await?.ok_or_else(Self::unknown_email)?;
        Self::valid_token(db, user.id, code).await?.ok_or_else(Self::invalid_code)?;
        Ok(())
    }

    /// Change le mot de passe et consomme le code, tout ou rien
    pub async fn confirm(db: &DatabaseConnection, email: &str, code: &str, new_password: &str) -> ApiResult<()> {
        let txn = db.begin().await?;

        // Email inconnu ou code invalide: même réponse 400
        let user = Self::user_by_email(&txn, email).await?.ok_or_else(Self::invalid_code)?;
        let token = Self::valid_token(&txn, user.id, code).await?.ok_or_else(Self::invalid_code)?;

        let hash = password::hash_password(new_password).map_err(ApiError::Internal)?;
        let user_id = user.id;

        let mut active_user: users::ActiveModel = user.into();
        active_user.password_hash = Set(hash);
        active_user.update(&txn).await?;

        let mut active_token: password_reset_tokens::ActiveModel = token.into();
        active_token.is_used = Set(true);
        active_token.update(&txn).await?;

        txn.commit().await?;
        tracing::info!(user_id, "password reset completed");
        Ok(())
    }
}

fn reset_email(to: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Password reset code".to_string(),
        text: format!(
            "Hello,\n\nYour password reset code is: {code}\n\
             This code is valid for {CODE_TTL_MINUTES} minutes.\n\
             If you did not request a reset, ignore this message.\n\n{SITE_NAME} team\n"
        ),
        html: format!(
            "<p>Hello,</p><p>Your password reset code is: <strong>{code}</strong></p>\
             <p>This code is valid for {CODE_TTL_MINUTES} minutes.</p>\
             <p>If you did not request a reset, ignore this message.</p><p>{SITE_NAME} team</p>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..50 {
            let code = PasswordResetService::generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn email_carries_the_code() {
        let message = reset_email("a@b.uz", "042917");
        assert_eq!(message.to, "a@b.uz");
        assert!(message.text.contains("042917"));
        assert!(message.html.contains("<strong>042917</strong>"));
    }
}
