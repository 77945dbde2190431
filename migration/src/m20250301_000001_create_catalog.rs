use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string_len(Users::Username, 150).unique_key())
                    .col(string_len(Users::Email, 512))
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::FirstName, 150).default(""))
                    .col(string_len(Users::LastName, 150).default(""))
                    .col(string_null(Users::ProfileImage))
                    .col(timestamp_with_time_zone(Users::DateJoined))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Departments::Table)
                    .if_not_exists()
                    .col(pk_auto(Departments::Id))
                    .col(string_len(Departments::Name, 512))
                    .col(string_len(Departments::Description, 30))
                    .col(string_null(Departments::Image))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(integer(Movies::DepartmentId))
                    .col(string_len(Movies::Name, 128))
                    .col(string_len(Movies::Description, 2048))
                    .col(text_null(Movies::PreviewUrl))
                    .col(text_null(Movies::Url))
                    .col(string_null(Movies::LocalFile))
                    .col(string_len(Movies::Country, 32))
                    .col(integer(Movies::Count).default(0))
                    .col(string_len(Movies::Year, 32).default(""))
                    .col(string_len(Movies::Genre, 512).default(""))
                    .col(string_len(Movies::AllSeries, 512).default(""))
                    .col(timestamp_with_time_zone(Movies::CreatedAt))
                    .col(boolean(Movies::IsPossible).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_department")
                            .from(Movies::Table, Movies::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_department")
                    .table(Movies::Table)
                    .col(Movies::DepartmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieSeries::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieSeries::Id))
                    .col(integer(MovieSeries::MovieId))
                    .col(string_len(MovieSeries::Title, 128))
                    .col(string_len(MovieSeries::VideoUrl, 2048))
                    .col(string_null(MovieSeries::VideoFile))
                    .col(timestamp_with_time_zone(MovieSeries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_series_movie")
                            .from(MovieSeries::Table, MovieSeries::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_series_movie_created")
                    .table(MovieSeries::Table)
                    .col(MovieSeries::MovieId)
                    .col(MovieSeries::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(pk_auto(Comments::Id))
                    .col(integer(Comments::UserId))
                    .col(integer(Comments::MovieId))
                    .col(text(Comments::Text))
                    .col(timestamp_with_time_zone(Comments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_user")
                            .from(Comments::Table, Comments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_movie")
                            .from(Comments::Table, Comments::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Comments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieSeries::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Departments::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    ProfileImage,
    DateJoined,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
    Name,
    Description,
    Image,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    DepartmentId,
    Name,
    Description,
    PreviewUrl,
    Url,
    LocalFile,
    Country,
    Count,
    Year,
    Genre,
    AllSeries,
    CreatedAt,
    IsPossible,
}

#[derive(DeriveIden)]
enum MovieSeries {
    Table,
    Id,
    MovieId,
    Title,
    VideoUrl,
    VideoFile,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    UserId,
    MovieId,
    Text,
    CreatedAt,
}
