// ============================================================================
// NOTIFICATIONS - SUIVI DES LECTURES
// ============================================================================
//
// Deux registres de lecteurs:
//   - comptes   : table notification_reads (paire unique)
//   - anonymes  : notifications.read_by_ips, tableau JSON d'adresses
//
// views_count n'augmente qu'à la première lecture d'un lecteur donné.
// Vérification + insertion + incrément dans une même transaction,
// l'index unique sert de filet si deux requêtes se croisent.
//
// ============================================================================

use std::collections::HashSet;

use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthUser, ClientContext};
use crate::models::{notification_reads, notifications};
use crate::services::vote_service::is_unique_violation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reader {
    User(i32),
    Address(String),
    Unknown,
}

impl Reader {
    pub fn identify(auth: Option<&AuthUser>, client: &ClientContext) -> Self {
        match (auth, &client.ip) {
            (Some(user), _) => Reader::User(user.user_id),
            (None, Some(ip)) => Reader::Address(ip.clone()),
            (None, None) => Reader::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Recorded,
    AlreadyRead,
    /// Lecteur sans identité: rien à mémoriser
    NotTracked,
}

pub struct NotificationService;

impl NotificationService {
    pub async fn find(db: &DatabaseConnection, id: i32) -> ApiResult<notifications::Model> {
        notifications::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found("Notification"))
    }

    /// Marque la notification lue, renvoie le résultat et le views_count à jour
    pub async fn mark_read(db: &DatabaseConnection, id: i32, reader: &Reader) -> ApiResult<(ReadOutcome, i32)> {
        let outcome = match reader {
            Reader::User(user_id) => Self::mark_read_by_user(db, id, *user_id).await?,
            Reader::Address(ip) => Self::mark_read_by_address(db, id, ip).await?,
            Reader::Unknown => {
                Self::find(db, id).await?;
                ReadOutcome::NotTracked
            }
        };

        let views = Self::find(db, id).await?.views_count;
        tracing::debug!(notification_id = id, ?reader, ?outcome, views, "notification read");
        Ok((outcome, views))
    }

    async fn mark_read_by_user(db: &DatabaseConnection, id: i32, user_id: i32) -> ApiResult<ReadOutcome> {
        let txn = db.begin().await?;

        notifications::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::not_found("Notification"))?;

        let already = notification_reads::Entity::find()
            .filter(notification_reads::Column::NotificationId.eq(id))
            .filter(notification_reads::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .is_some();
        if already {
            txn.commit().await?;
            return Ok(ReadOutcome::AlreadyRead);
        }

        let row = notification_reads::ActiveModel {
            notification_id: Set(id),
            user_id: Set(user_id),
            ..Default::default()
        };
        match row.insert(&txn).await {
            Ok(_) => {}
            // Lecture concurrente déjà enregistrée, la transaction est abandonnée
            Err(e) if is_unique_violation(&e) => return Ok(ReadOutcome::AlreadyRead),
            Err(e) => return Err(e.into()),
        }

        notifications::Entity::update_many()
            .col_expr(
                notifications::Column::ViewsCount,
                Expr::col(notifications::Column::ViewsCount).add(1),
            )
            .filter(notifications::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(ReadOutcome::Recorded)
    }

    /// Ligne verrouillée jusqu'à la fin de la transaction (FOR UPDATE)
    fn locked(id: i32) -> Select<notifications::Entity> {
        notifications::Entity::find_by_id(id).lock_exclusive()
    }

    async fn mark_read_by_address(db: &DatabaseConnection, id: i32, ip: &str) -> ApiResult<ReadOutcome> {
        let txn = db.begin().await?;

        // Deux vues concurrentes attendent ici: la seconde relit la liste à jour
        let notification = Self::locked(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ApiError::not_found("Notification"))?;

        if notification.read_by_ip(ip) {
            txn.commit().await?;
            return Ok(ReadOutcome::AlreadyRead);
        }

        let mut readers = notification.reader_ips();
        readers.push(ip.to_string());

        notifications::Entity::update_many()
            .col_expr(notifications::Column::ReadByIps, Expr::value(serde_json::json!(readers)))
            .col_expr(
                notifications::Column::ViewsCount,
                Expr::col(notifications::Column::ViewsCount).add(1),
            )
            .filter(notifications::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(ReadOutcome::Recorded)
    }

    /// Ids des notifications déjà lues par un compte
    pub async fn read_ids(db: &DatabaseConnection, user_id: i32) -> Result<HashSet<i32>, DbErr> {
        let ids: Vec<i32> = notification_reads::Entity::find()
            .select_only()
            .column(notification_reads::Column::NotificationId)
            .filter(notification_reads::Column::UserId.eq(user_id))
            .into_tuple()
            .all(db)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Notifications les plus récentes d'abord, avec l'état lu/non lu du lecteur
    pub async fn list(db: &DatabaseConnection, reader: &Reader) -> Result<Vec<(notifications::Model, bool)>, DbErr> {
        let notifications = notifications::Entity::find()
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .all(db)
            .await?;

        let read_ids = match reader {
            Reader::User(user_id) => Self::read_ids(db, *user_id).await?,
            _ => HashSet::new(),
        };

        Ok(notifications
            .into_iter()
            .map(|n| {
                let is_read = Self::is_read(&n, reader, &read_ids);
                (n, is_read)
            })
            .collect())
    }

    pub fn is_read(notification: &notifications::Model, reader: &Reader, read_ids: &HashSet<i32>) -> bool {
        match reader {
            Reader::User(_) => read_ids.contains(&notification.id),
            Reader::Address(ip) => notification.read_by_ip(ip),
            Reader::Unknown => false,
        }
    }

    pub async fn unread_count(db: &DatabaseConnection, reader: &Reader) -> Result<u64, DbErr> {
        match reader {
            Reader::User(user_id) => {
                let read = notification_reads::Entity::find()
                    .filter(notification_reads::Column::UserId.eq(*user_id))
                    .count(db)
                    .await?;
                let total = notifications::Entity::find().count(db).await?;
                Ok(total.saturating_sub(read))
            }
            Reader::Address(ip) => {
                let notifications = notifications::Entity::find().all(db).await?;
                Ok(notifications.iter().filter(|n| !n.read_by_ip(ip)).count() as u64)
            }
            Reader::Unknown => notifications::Entity::find().count(db).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_wins_over_address() {
        let client = ClientContext { ip: Some("84.54.1.2".into()), ..Default::default() };
        let user = AuthUser { user_id: 3, username: "dilnoza".into() };

        assert_eq!(Reader::identify(Some(&user), &client), Reader::User(3));
        assert_eq!(Reader::identify(None, &client), Reader::Address("84.54.1.2".into()));
        assert_eq!(Reader::identify(None, &ClientContext::default()), Reader::Unknown);
    }

    #[test]
    fn address_membership_is_exact() {
        let notification = notifications::Model {
            id: 1,
            title: "t".into(),
            text: "x".into(),
            created_at: chrono::Utc::now(),
            views_count: 1,
            read_by_ips: serde_json::json!(["10.0.0.12"]),
        };
        let none = HashSet::new();
        assert!(NotificationService::is_read(&notification, &Reader::Address("10.0.0.12".into()), &none));
        assert!(!NotificationService::is_read(&notification, &Reader::Address("10.0.0.1".into()), &none));
    }

    #[test]
    fn address_reads_lock_the_row() {
        let sql = NotificationService::locked(5).build(DbBackend::Postgres).to_string();
        assert!(sql.ends_with("FOR UPDATE"), "{sql}");
    }
}
