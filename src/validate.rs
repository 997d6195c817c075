use crate::{
    error::{AppError, AppResult},
    models::{FormNumber, MovieDraft, MovieForm},
};

pub const MIN_YEAR: i32 = 1900;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn current_year() -> i32 {
    i32::from(jiff::Zoned::now().year())
}

pub fn movie_form(form: &MovieForm) -> AppResult<MovieDraft> {
    movie_form_for_year(form, current_year())
}

pub fn movie_form_for_year(form: &MovieForm, current_year: i32) -> AppResult<MovieDraft> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }

    let year = optional_int(form.year.as_ref(), "year")?;
    if let Some(year) = year {
        if year < MIN_YEAR {
            return Err(AppError::validation(format!("year must be >= {MIN_YEAR}, got {year}")));
        }
        if year > current_year {
            return Err(AppError::validation(format!(
                "year must be <= {current_year} (current year), got {year}"
            )));
        }
    }

    let rating = optional_int(form.rating.as_ref(), "rating")?;
    if let Some(rating) = rating {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
            )));
        }
    }

    Ok(MovieDraft { title: title.to_string(), year, rating })
}

pub fn import_url(raw: &str) -> AppResult<&str> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(AppError::validation("API URL is required"));
    }
    Ok(url)
}

/// Integer prefix of `s` after leading whitespace and an optional sign, so
/// `"2001abc"` is 2001 and `"3.5"` is 3. `None` when no digit leads.
pub fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

/// Integer part of a JSON number, truncated toward zero.
pub fn whole_part(n: &serde_json::Number) -> Option<i32> {
    let whole = n
        .as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))?;
    i32::try_from(whole).ok()
}

fn optional_int(value: Option<&FormNumber>, field: &str) -> AppResult<Option<i32>> {
    let not_a_number = || AppError::validation(format!("{field} must be a number"));

    match value {
        None => Ok(None),
        Some(FormNumber::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(FormNumber::Text(s)) => leading_int(s).map(Some).ok_or_else(not_a_number),
        Some(FormNumber::Number(n)) => whole_part(n).map(Some).ok_or_else(not_a_number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, year: Option<FormNumber>, rating: Option<FormNumber>) -> MovieForm {
        MovieForm { title: title.to_string(), year, rating }
    }

    fn num(v: i64) -> Option<FormNumber> {
        Some(FormNumber::Number(v.into()))
    }

    fn text(s: &str) -> Option<FormNumber> {
        Some(FormNumber::Text(s.to_string()))
    }

    #[test]
    fn trims_title_and_accepts_missing_numbers() {
        let draft = movie_form_for_year(&form("  Heat  ", None, text("  ")), 2026).unwrap();
        assert_eq!(draft, MovieDraft { title: "Heat".to_string(), year: None, rating: None });
    }

    #[test]
    fn rejects_blank_title() {
        let err = movie_form_for_year(&form("   ", num(2000), None), 2026).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(movie_form_for_year(&form("A", None, num(1)), 2026).is_ok());
        assert!(movie_form_for_year(&form("A", None, num(5)), 2026).is_ok());
        assert!(matches!(
            movie_form_for_year(&form("A", None, num(0)), 2026),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            movie_form_for_year(&form("A", None, num(6)), 2026),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn year_must_fall_between_1900_and_current_year() {
        assert!(movie_form_for_year(&form("A", num(1900), None), 2026).is_ok());
        assert!(movie_form_for_year(&form("A", text("2026"), None), 2026).is_ok());
        assert!(movie_form_for_year(&form("A", num(1899), None), 2026).is_err());
        let err = movie_form_for_year(&form("A", num(2027), None), 2026).unwrap_err();
        assert!(err.to_string().contains("2027"));
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        assert!(matches!(
            movie_form_for_year(&form("A", text("nineteen"), None), 2026),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            movie_form_for_year(&form("A", None, text("stars: 4")), 2026),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn numbers_keep_their_leading_integer() {
        let draft = movie_form_for_year(&form("A", text("2001abc"), text("3.5")), 2026).unwrap();
        assert_eq!(draft.year, Some(2001));
        assert_eq!(draft.rating, Some(3));

        let fractional = serde_json::Number::from_f64(4.9).map(FormNumber::Number);
        let draft = movie_form_for_year(&form("A", None, fractional), 2026).unwrap();
        assert_eq!(draft.rating, Some(4));

        assert!(movie_form_for_year(&form("A", None, text("5.9")), 2026).is_ok());
        assert!(matches!(
            movie_form_for_year(&form("A", None, text("6.1")), 2026),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            movie_form_for_year(&form("A", None, text("0.9")), 2026),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn import_url_is_trimmed_and_required() {
        assert_eq!(import_url("  http://x/movies ").unwrap(), "http://x/movies");
        assert!(matches!(import_url("   "), Err(AppError::Validation(_))));
    }
}
