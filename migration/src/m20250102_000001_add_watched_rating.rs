use sea_orm_migration::{prelude::*, schema::*};

const TABLE: &str = "movies";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // SQLite only accepts one ADD COLUMN per ALTER TABLE.
        if !manager.has_column(TABLE, "watched").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Movies::Table)
                        .add_column(integer(Movies::Watched).default(0))
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column(TABLE, "rating").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Movies::Table)
                        .add_column(integer_null(Movies::Rating))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(Table::alter().table(Movies::Table).drop_column(Movies::Rating).to_owned())
            .await?;
        manager
            .alter_table(Table::alter().table(Movies::Table).drop_column(Movies::Watched).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Watched,
    Rating,
}
