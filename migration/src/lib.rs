pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_movies;
mod m20250102_000001_add_watched_rating;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_movies::Migration),
            Box::new(m20250102_000001_add_watched_rating::Migration),
        ]
    }
}
