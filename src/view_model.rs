use std::cmp::Ordering;

use icu_collator::{Collator, CollatorBorrowed, options::CollatorOptions};
use icu_locale_core::locale;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

use crate::{
    error::AppResult,
    importer::Importer,
    models::{ImportSummary, ListSnapshot, Movie, MovieForm, SortBy, ViewQuery, WatchedFilter},
    store::MovieStore,
    validate,
};

#[derive(Debug)]
struct ListState {
    movies: Vec<Movie>,
    loading: bool,
    sort_by: SortBy,
}

/// In-memory movie list kept in step with the store. Mutations go to the
/// store first and are followed by a full reload; a failed call leaves the
/// previously loaded list untouched.
pub struct MovieList {
    store: MovieStore,
    importer: Importer,
    state: RwLock<ListState>,
    // Held across each write and its reload so an import's exists-then-create
    // loop never interleaves with another mutation.
    writes: Mutex<()>,
}

impl MovieList {
    pub fn new(store: MovieStore, importer: Importer) -> Self {
        Self {
            store,
            importer,
            state: RwLock::new(ListState {
                movies: Vec::new(),
                loading: true,
                sort_by: SortBy::default(),
            }),
            writes: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> AppResult<()> {
        let result = self.store.list_all().await;

        let mut state = self.state.write().await;
        state.loading = false;
        let movies = result?;
        debug!(count = movies.len(), "loaded movies");
        state.movies = movies;
        Ok(())
    }

    pub async fn add(&self, form: &MovieForm) -> AppResult<()> {
        let draft = validate::movie_form(form)?;
        let _guard = self.writes.lock().await;

        let result: AppResult<()> = async {
            self.store.create(&draft.title, draft.year, draft.rating).await?;
            self.load().await
        }
        .await;
        log_failure("add movie", result)
    }

    pub async fn edit(&self, id: i32, form: &MovieForm) -> AppResult<()> {
        let draft = validate::movie_form(form)?;
        let _guard = self.writes.lock().await;

        let result: AppResult<()> = async {
            self.store.update(id, &draft.title, draft.year, draft.rating).await?;
            self.load().await
        }
        .await;
        log_failure("edit movie", result)
    }

    pub async fn remove(&self, id: i32) -> AppResult<()> {
        let _guard = self.writes.lock().await;

        let result: AppResult<()> = async {
            self.store.remove(id).await?;
            self.load().await
        }
        .await;
        log_failure("delete movie", result)
    }

    pub async fn toggle_watched(&self, id: i32) -> AppResult<()> {
        let _guard = self.writes.lock().await;

        let result: AppResult<()> = async {
            self.store.toggle_watched(id).await?;
            self.load().await
        }
        .await;
        log_failure("toggle watched", result)
    }

    pub async fn import_from_api(&self, url: &str) -> AppResult<ImportSummary> {
        let url = validate::import_url(url)?;
        let _guard = self.writes.lock().await;

        let result: AppResult<ImportSummary> = async {
            let summary = self.importer.import(&self.store, url).await?;
            self.load().await?;
            Ok(summary)
        }
        .await;
        log_failure("import from API", result)
    }

    pub async fn set_sort_by(&self, sort_by: SortBy) {
        self.state.write().await.sort_by = sort_by;
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        let state = self.state.read().await;
        ListSnapshot {
            loading: state.loading,
            sort_by: state.sort_by,
            total: state.movies.len(),
            watched: state.movies.iter().filter(|m| m.watched).count(),
        }
    }

    /// Filtered, sorted copy of the loaded list. Falls back to the current
    /// `sort_by` when the query names no order.
    pub async fn view(&self, query: &ViewQuery) -> Vec<Movie> {
        let state = self.state.read().await;
        let sort_by = query.sort.unwrap_or(state.sort_by);
        derive_view(&state.movies, &query.search, query.filter, sort_by)
    }
}

fn log_failure<T>(action: &str, result: AppResult<T>) -> AppResult<T> {
    if let Err(err) = &result {
        error!(action, error = %err, "movie list update failed");
    }
    result
}

pub fn derive_view(
    movies: &[Movie],
    search: &str,
    filter: WatchedFilter,
    sort_by: SortBy,
) -> Vec<Movie> {
    let needle = search.trim().to_lowercase();

    let mut out: Vec<Movie> = movies
        .iter()
        .filter(|m| needle.is_empty() || m.title.to_lowercase().contains(&needle))
        .filter(|m| filter.matches(m.watched))
        .cloned()
        .collect();

    match sort_by {
        SortBy::Year => out.sort_by(|a, b| compare_year_desc(a.year, b.year)),
        SortBy::Title => {
            let collator = title_collator();
            out.sort_by(|a, b| compare_titles(collator.as_ref(), &a.title, &b.title));
        },
        SortBy::CreatedAt => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    out
}

/// Newest year first; movies without a year go last.
fn compare_year_desc(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Vietnamese collation, matching the language the list was first kept in.
fn title_collator() -> Option<CollatorBorrowed<'static>> {
    match Collator::try_new(locale!("vi").into(), CollatorOptions::default()) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!(error = %err, "title collation unavailable, sorting case-insensitively");
            None
        },
    }
}

fn compare_titles(collator: Option<&CollatorBorrowed<'static>>, a: &str, b: &str) -> Ordering {
    let primary = match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    };
    primary.then_with(|| a.cmp(b))
}
