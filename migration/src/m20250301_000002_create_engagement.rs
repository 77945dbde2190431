use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(pk_auto(Votes::Id))
                    .col(integer_null(Votes::UserId))
                    .col(integer(Votes::MovieId))
                    .col(boolean(Votes::Vote))
                    .col(string_len_null(Votes::SessionKey, 40))
                    .col(string_len_null(Votes::IpAddress, 45))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_user")
                            .from(Votes::Table, Votes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_movie")
                            .from(Votes::Table, Votes::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Une seule ligne par identité et par film (NULL n'entre pas en conflit).
        for (name, column) in [
            ("idx_votes_user_movie", Votes::UserId),
            ("idx_votes_session_movie", Votes::SessionKey),
            ("idx_votes_ip_movie", Votes::IpAddress),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Votes::Table)
                        .col(column)
                        .col(Votes::MovieId)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(SavedFilms::Table)
                    .if_not_exists()
                    .col(pk_auto(SavedFilms::Id))
                    .col(integer(SavedFilms::UserId))
                    .col(integer(SavedFilms::MovieId))
                    .col(timestamp_with_time_zone(SavedFilms::SavedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_films_user")
                            .from(SavedFilms::Table, SavedFilms::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_films_movie")
                            .from(SavedFilms::Table, SavedFilms::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_saved_films_user_movie")
                    .table(SavedFilms::Table)
                    .col(SavedFilms::UserId)
                    .col(SavedFilms::MovieId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(pk_auto(Notifications::Id))
                    .col(text(Notifications::Title))
                    .col(text(Notifications::Text))
                    .col(timestamp_with_time_zone(Notifications::CreatedAt))
                    .col(integer(Notifications::ViewsCount).default(0))
                    .col(json(Notifications::ReadByIps))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NotificationReads::Table)
                    .if_not_exists()
                    .col(pk_auto(NotificationReads::Id))
                    .col(integer(NotificationReads::NotificationId))
                    .col(integer(NotificationReads::UserId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_reads_notification")
                            .from(NotificationReads::Table, NotificationReads::NotificationId)
                            .to(Notifications::Table, Notifications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_reads_user")
                            .from(NotificationReads::Table, NotificationReads::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notification_reads_unique")
                    .table(NotificationReads::Table)
                    .col(NotificationReads::NotificationId)
                    .col(NotificationReads::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PasswordResetTokens::Table)
                    .if_not_exists()
                    .col(pk_auto(PasswordResetTokens::Id))
                    .col(integer(PasswordResetTokens::UserId))
                    .col(string_len(PasswordResetTokens::Token, 6))
                    .col(timestamp_with_time_zone(PasswordResetTokens::CreatedAt))
                    .col(timestamp_with_time_zone(PasswordResetTokens::ExpiresAt))
                    .col(boolean(PasswordResetTokens::IsUsed).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_password_reset_tokens_user")
                            .from(PasswordResetTokens::Table, PasswordResetTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_password_reset_tokens_user_token")
                    .table(PasswordResetTokens::Table)
                    .col(PasswordResetTokens::UserId)
                    .col(PasswordResetTokens::Token)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PasswordResetTokens::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(NotificationReads::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Notifications::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SavedFilms::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Votes::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
}

#[derive(DeriveIden, Clone, Copy)]
enum Votes {
    Table,
    Id,
    UserId,
    MovieId,
    Vote,
    SessionKey,
    IpAddress,
}

#[derive(DeriveIden)]
enum SavedFilms {
    Table,
    Id,
    UserId,
    MovieId,
    SavedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    Title,
    Text,
    CreatedAt,
    ViewsCount,
    ReadByIps,
}

#[derive(DeriveIden)]
enum NotificationReads {
    Table,
    Id,
    NotificationId,
    UserId,
}

#[derive(DeriveIden)]
enum PasswordResetTokens {
    Table,
    Id,
    UserId,
    Token,
    CreatedAt,
    ExpiresAt,
    IsUsed,
}
