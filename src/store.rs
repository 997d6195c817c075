use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{entities::movie, error::AppResult, models::Movie};

const SAMPLE_MOVIES: [(&str, i32); 3] =
    [("Inception", 2010), ("Interstellar", 2014), ("The Matrix", 1999)];

/// Persisted movie rows. Every write is committed before the call returns.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts an unwatched movie stamped with the current time. Callers
    /// validate the title; no uniqueness is enforced here.
    pub async fn create(&self, title: &str, year: Option<i32>, rating: Option<i32>) -> AppResult<i32> {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(title.to_string()),
            year: Set(year),
            watched: Set(false),
            rating: Set(rating),
            created_at: Set(now_ms()),
        };

        let res = movie::Entity::insert(model).exec(&self.db).await?;
        debug!(movie_id = res.last_insert_id, title = %title, "created movie");
        Ok(res.last_insert_id)
    }

    /// Overwrites title, year and rating. Unknown ids are ignored.
    pub async fn update(
        &self,
        id: i32,
        title: &str,
        year: Option<i32>,
        rating: Option<i32>,
    ) -> AppResult<()> {
        let res = movie::Entity::update_many()
            .col_expr(movie::Column::Title, Expr::value(title.to_string()))
            .col_expr(movie::Column::Year, Expr::value(year))
            .col_expr(movie::Column::Rating, Expr::value(rating))
            .filter(movie::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        debug!(movie_id = id, rows = res.rows_affected, "updated movie");
        Ok(())
    }

    pub async fn remove(&self, id: i32) -> AppResult<()> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        debug!(movie_id = id, rows = res.rows_affected, "removed movie");
        Ok(())
    }

    /// Flips `watched` for an existing movie; a missing id is a no-op.
    pub async fn toggle_watched(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let Some(found) = movie::Entity::find_by_id(id).one(&txn).await? else {
            debug!(movie_id = id, "toggle on missing movie ignored");
            return Ok(());
        };

        let watched = !found.watched;
        let mut active: movie::ActiveModel = found.into();
        active.watched = Set(watched);
        active.update(&txn).await?;

        txn.commit().await?;

        debug!(movie_id = id, watched, "toggled watched");
        Ok(())
    }

    /// True iff a movie with exactly this `(title, year)` key is stored. A
    /// missing year only matches other rows without a year.
    pub async fn exists(&self, title: &str, year: Option<i32>) -> AppResult<bool> {
        let year_matches = match year {
            Some(y) => movie::Column::Year.eq(y),
            None => movie::Column::Year.is_null(),
        };

        let count = movie::Entity::find()
            .filter(movie::Column::Title.eq(title))
            .filter(year_matches)
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Most recently created first.
    pub async fn list_all(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find()
            .order_by_desc(movie::Column::CreatedAt)
            .order_by_desc(movie::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(movie::Entity::find().count(&self.db).await?)
    }

    /// Inserts a few well-known titles into an empty table.
    pub async fn seed_if_empty(&self) -> AppResult<usize> {
        if self.count().await? > 0 {
            return Ok(0);
        }

        for (title, year) in SAMPLE_MOVIES {
            self.create(title, Some(year), None).await?;
        }

        debug!(seeded = SAMPLE_MOVIES.len(), "seeded sample movies");
        Ok(SAMPLE_MOVIES.len())
    }
}

fn now_ms() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}
