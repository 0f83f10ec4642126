//! Boundary checks for book requests. Nothing here touches the store.

use shelf_db::{BookChanges, BookFilter, BookPatch, BookReplacement, NewBook, Pagination};
use shelf_http::AppError;

use super::models::{CreateBookRequest, ListBooksQuery, PatchBookRequest, UpdateBookRequest};

const MIN_FILTER_LEN: usize = 2;
const MAX_FILTER_LEN: usize = 50;
const DEFAULT_PAGE: u64 = 1;

pub const CREATE_REQUIRES: &str = "Please provide title and author";
pub const UPDATE_REQUIRES: &str = "Please provide title, author";
pub const PATCH_REQUIRES: &str = "Please provide at least one field to update";

/// Checks the optional text filters, reporting every violation.
pub fn validate_list_query(query: &ListBooksQuery) -> Result<(), Vec<String>> {
    let errors: Vec<String> = [
        ("Genre", query.genre.as_deref()),
        ("Author", query.author.as_deref()),
        ("Title", query.title.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.and_then(|value| check_filter_text(label, value)))
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_filter_text(label: &str, value: &str) -> Option<String> {
    let len = value.chars().count();
    if len < MIN_FILTER_LEN {
        Some(format!(
            "{} must have at least {} characters",
            label, MIN_FILTER_LEN
        ))
    } else if len > MAX_FILTER_LEN {
        Some(format!(
            "{} must not exceed {} characters",
            label, MAX_FILTER_LEN
        ))
    } else {
        None
    }
}

/// Filter for an already validated query.
pub fn build_filter(query: &ListBooksQuery) -> BookFilter {
    BookFilter {
        genre: query.genre.clone(),
        author: query.author.clone(),
        title: query.title.clone(),
    }
}

/// Page window from `limit`/`page`; missing, unparsable or non-positive
/// values use the defaults.
pub fn pagination(query: &ListBooksQuery) -> Pagination {
    let limit = positive_or(query.limit.as_deref(), Pagination::DEFAULT_LIMIT);
    let page = positive_or(query.page.as_deref(), DEFAULT_PAGE);
    Pagination::page(page, limit)
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(parse_leading_int)
        .and_then(|value| u64::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// Reads an optionally signed integer prefix, ignoring leading whitespace
/// and anything after the digits (`"12abc"` is 12). Values past the `i64`
/// range saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude = rest[..digits_end].bytes().fold(0i64, |acc, digit| {
        acc.saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'))
    });
    Some(sign * magnitude)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

/// `title` and `author` must both be non-empty.
pub fn new_book(request: CreateBookRequest) -> Result<NewBook, AppError> {
    match (non_empty(request.title), non_empty(request.author)) {
        (Some(title), Some(author)) => Ok(NewBook {
            title,
            author,
            genre: request.genre,
            read: request.read,
        }),
        _ => Err(AppError::bad_request(CREATE_REQUIRES)),
    }
}

/// Full update: `title` and `author` required, `genre` passed through.
pub fn replacement(request: UpdateBookRequest) -> Result<BookChanges, AppError> {
    match (non_empty(request.title), non_empty(request.author)) {
        (Some(title), Some(author)) => Ok(BookChanges::Replace(BookReplacement {
            title,
            author,
            genre: request.genre,
        })),
        _ => Err(AppError::bad_request(UPDATE_REQUIRES)),
    }
}

/// Partial update: at least one field, and no blanked-out required field.
pub fn patch(request: PatchBookRequest) -> Result<BookChanges, AppError> {
    let patch = BookPatch {
        title: request.title,
        author: request.author,
        genre: request.genre,
        read: request.read,
    };
    if patch.is_empty() {
        return Err(AppError::bad_request(PATCH_REQUIRES));
    }

    let errors: Vec<String> = [("Title", &patch.title), ("Author", &patch.author)]
        .into_iter()
        .filter(|(_, value)| value.as_deref() == Some(""))
        .map(|(label, _)| format!("{} must not be empty", label))
        .collect();
    if !errors.is_empty() {
        return Err(AppError::validation(errors, shelf_http::error::VALIDATION_FAILED));
    }

    Ok(BookChanges::Partial(patch))
}
