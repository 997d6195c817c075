use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    models::ImportSummary,
    store::MovieStore,
    validate,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<i32>,
}

/// Pulls a JSON array of movies from a remote endpoint and inserts the
/// entries the store does not already know by `(title, year)`.
#[derive(Clone)]
pub struct Importer {
    http: reqwest::Client,
}

impl Importer {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    pub async fn import(&self, store: &MovieStore, url: &str) -> AppResult<ImportSummary> {
        let body = self.fetch(url).await?;
        let candidates = normalize(&body)?;
        debug!(url = %url, candidates = candidates.len(), "normalized import feed");

        let summary = insert_new(store, &candidates).await?;
        info!(url = %url, imported = summary.imported, skipped = summary.skipped, "import finished");
        Ok(summary)
    }

    async fn fetch(&self, url: &str) -> AppResult<Value> {
        debug!(url = %url, "fetching import feed");
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("HTTP error, status: {status}")));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Maps feed entries onto candidates, dropping those without a usable title.
pub fn normalize(body: &Value) -> AppResult<Vec<Candidate>> {
    let Value::Array(items) = body else {
        return Err(AppError::Format);
    };

    let candidates: Vec<Candidate> = items
        .iter()
        .map(|item| Candidate {
            title: title_of(item),
            year: item.get("year").and_then(lenient_int),
            rating: item.get("rating").and_then(lenient_int),
        })
        .filter(|c| !c.title.trim().is_empty())
        .collect();

    if candidates.is_empty() {
        return Err(AppError::EmptyImport);
    }
    Ok(candidates)
}

/// Checks and inserts one candidate at a time, in feed order. A later
/// duplicate within the same feed is skipped because the earlier insert has
/// already landed. Callers must keep other writers out until this returns.
pub async fn insert_new(store: &MovieStore, candidates: &[Candidate]) -> AppResult<ImportSummary> {
    let mut summary = ImportSummary::default();

    for c in candidates {
        if store.exists(&c.title, c.year).await? {
            debug!(title = %c.title, year = ?c.year, "skipping known movie");
            summary.skipped += 1;
            continue;
        }
        store.create(&c.title, c.year, c.rating).await?;
        summary.imported += 1;
    }

    Ok(summary)
}

fn title_of(item: &Value) -> String {
    ["title", "name"]
        .iter()
        .filter_map(|key| item.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Reads a feed number the forgiving way: zero and empty values count as
/// absent, strings contribute their leading integer, and anything that does
/// not parse is dropped instead of failing the import.
fn lenient_int(value: &Value) -> Option<i32> {
    match value {
        // Only an exact zero is absent; 0.5 keeps its integer part and stores 0.
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => validate::whole_part(n),
        Value::String(s) if !s.is_empty() => validate::leading_int(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;
    use crate::db::test_db;

    async fn serve(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body.to_string()))
            .mount(&server)
            .await;
        server
    }

    async fn setup() -> (tempfile::TempDir, MovieStore, Importer) {
        let (dir, db) = test_db().await;
        (dir, MovieStore::new(db), Importer::new(reqwest::Client::new()))
    }

    #[test]
    fn title_falls_back_to_name() {
        assert_eq!(title_of(&json!({"title": "A", "name": "B"})), "A");
        assert_eq!(title_of(&json!({"title": "", "name": "B"})), "B");
        assert_eq!(title_of(&json!({"name": "B"})), "B");
        assert_eq!(title_of(&json!({"title": 7})), "");
        assert_eq!(title_of(&json!({})), "");
    }

    #[test]
    fn numbers_parse_leniently() {
        assert_eq!(lenient_int(&json!(2020)), Some(2020));
        assert_eq!(lenient_int(&json!("1999")), Some(1999));
        assert_eq!(lenient_int(&json!(" 2001 A Space Odyssey")), Some(2001));
        assert_eq!(lenient_int(&json!(4.8)), Some(4));
        assert_eq!(lenient_int(&json!("-3")), Some(-3));
        assert_eq!(lenient_int(&json!("abc")), None);
        assert_eq!(lenient_int(&json!("")), None);
        assert_eq!(lenient_int(&json!(0)), None);
        assert_eq!(lenient_int(&json!(0.5)), Some(0));
        assert_eq!(lenient_int(&json!(-0.5)), Some(0));
        assert_eq!(lenient_int(&json!(true)), None);
        assert_eq!(lenient_int(&json!(null)), None);
        assert_eq!(lenient_int(&json!("99999999999")), None);
    }

    #[test]
    fn normalize_drops_blank_titles_and_keeps_order() {
        let body = json!([
            {"title": "A", "year": "2020", "rating": "x"},
            {"title": "   "},
            {"name": "B", "rating": 4},
        ]);

        let candidates = normalize(&body).unwrap();
        assert_eq!(
            candidates,
            vec![
                Candidate { title: "A".to_string(), year: Some(2020), rating: None },
                Candidate { title: "B".to_string(), year: None, rating: Some(4) },
            ]
        );
    }

    #[test]
    fn normalize_rejects_non_arrays_and_empty_feeds() {
        assert!(matches!(normalize(&json!({"title": "A"})), Err(AppError::Format)));
        assert!(matches!(normalize(&json!([])), Err(AppError::EmptyImport)));
        assert!(matches!(normalize(&json!([{"title": "  "}])), Err(AppError::EmptyImport)));
    }

    #[tokio::test]
    async fn duplicates_within_a_feed_are_inserted_once() {
        let (_dir, store, importer) = setup().await;
        let server = serve(
            200,
            r#"[{"title":"A","year":2020},{"title":"A","year":2020},{"title":"B"}]"#,
        )
        .await;

        let summary =
            importer.import(&store, &format!("{}/movies", server.uri())).await.unwrap();

        assert_eq!(summary, ImportSummary { imported: 2, skipped: 1 });
        let mut movies: Vec<(String, Option<i32>)> =
            store.list_all().await.unwrap().into_iter().map(|m| (m.title, m.year)).collect();
        movies.sort();
        assert_eq!(movies, vec![("A".to_string(), Some(2020)), ("B".to_string(), None)]);
    }

    #[tokio::test]
    async fn known_movies_are_skipped_but_other_years_are_not() {
        let (_dir, store, importer) = setup().await;
        store.create("Dune", Some(2021), Some(5)).await.unwrap();
        let server = serve(
            200,
            r#"[{"title":"Dune","year":2021,"rating":1},{"title":"Dune","year":"1984"},{"title":"Dune"}]"#,
        )
        .await;

        let summary =
            importer.import(&store, &format!("{}/movies", server.uri())).await.unwrap();

        assert_eq!(summary, ImportSummary { imported: 2, skipped: 1 });
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn not_found_is_a_fetch_error_and_leaves_store_alone() {
        let (_dir, store, importer) = setup().await;
        store.create("Keep", None, None).await.unwrap();
        let server = serve(404, "nope").await;

        let err = importer.import(&store, &format!("{}/movies", server.uri())).await.unwrap_err();

        assert!(matches!(err, AppError::Fetch(_)));
        assert!(err.to_string().contains("404"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_json_is_a_parse_error() {
        let (_dir, store, importer) = setup().await;
        let server = serve(200, "<html>not json</html>").await;

        let err = importer.import(&store, &format!("{}/movies", server.uri())).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn object_body_is_a_format_error() {
        let (_dir, store, importer) = setup().await;
        let server = serve(200, r#"{"results":[]}"#).await;

        let err = importer.import(&store, &format!("{}/movies", server.uri())).await.unwrap_err();
        assert!(matches!(err, AppError::Format));
    }

    #[tokio::test]
    async fn blank_feed_is_an_empty_import_and_store_is_unchanged() {
        let (_dir, store, importer) = setup().await;
        let server = serve(200, r#"[{"title":"  "},{"year":2001}]"#).await;

        let err = importer.import(&store, &format!("{}/movies", server.uri())).await.unwrap_err();

        assert!(matches!(err, AppError::EmptyImport));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        let (_dir, store, importer) = setup().await;
        let server = MockServer::start().await;
        let url = format!("{}/movies", server.uri());
        drop(server);

        let err = importer.import(&store, &url).await.unwrap_err();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
