//! Domain model for a catalog entry plus the typed request that guards the
//! store from raw form input. Everything stored in a [`BookRecord`] has already
//! been trimmed and parsed; the loosely typed shapes ([`BookFields`] from the
//! form, [`BookInput`] from persisted JSON) only exist at the edges.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Storage format for the two date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One book in the catalog. The struct serializes to the canonical wire shape
/// written under the `lib_books` key.
pub struct BookRecord {
    /// Opaque identifier. Assigned once and never changed; edit, delete and
    /// toggle flows address the record through it.
    pub id: String,
    /// Title as typed (trimmed). Title casing only happens on display.
    pub title: String,
    /// Author as typed (trimmed). Distinct-author statistics compare this
    /// case-insensitively.
    pub author: String,
    pub pages: u32,
    pub published: NaiveDate,
    pub acquired: NaiveDate,
    /// `true` once the book has been read.
    pub status: bool,
    /// `true` while the book sits in the trash.
    pub deleted: bool,
}

impl BookRecord {
    /// Build a record from an already validated draft.
    pub fn create(id: impl Into<String>, draft: BookDraft, deleted: bool) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            author: draft.author,
            pages: draft.pages,
            published: draft.published,
            acquired: draft.acquired,
            status: draft.status,
            deleted,
        }
    }

    /// Build a record from loosely typed input such as a persisted array
    /// element or a seed file entry.
    pub fn from_input(input: BookInput) -> Result<Self, ValidationError> {
        let id = input.id.trim();
        if id.is_empty() {
            return Err(ValidationError::MissingField("Id"));
        }

        let draft = BookDraft {
            title: required_text("Title", &input.title)?,
            author: required_text("Author", &input.author)?,
            pages: pages_from_value(&input.pages)?,
            published: parse_date("Published", &input.published)?,
            acquired: parse_date("Acquired", &input.acquired)?,
            status: flag_from_value("Status", &input.status)?,
        };
        let deleted = flag_from_value("Deleted", &input.deleted)?;

        Ok(Self::create(id, draft, deleted))
    }

    /// Overwrite every user-editable field. `id` and `deleted` stay put.
    pub fn apply(&mut self, draft: BookDraft) {
        self.title = draft.title;
        self.author = draft.author;
        self.pages = draft.pages;
        self.published = draft.published;
        self.acquired = draft.acquired;
        self.status = draft.status;
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    pub fn mark_restored(&mut self) {
        self.deleted = false;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    pub fn toggle_read_status(&mut self) {
        self.status = !self.status;
    }

    pub fn display_title(&self) -> String {
        title_case(&self.title)
    }

    pub fn display_author(&self) -> String {
        title_case(&self.author)
    }

    /// Page count with thousands separators (`1,234`).
    pub fn display_pages(&self) -> String {
        group_thousands(u64::from(self.pages))
    }

    pub fn display_published(&self) -> String {
        display_date(self.published)
    }

    pub fn display_acquired(&self) -> String {
        display_date(self.acquired)
    }

    pub fn status_label(&self) -> &'static str {
        if self.status {
            "Read"
        } else {
            "Unread"
        }
    }

    /// Label used in the recycle bin: `"Title" - Author`.
    pub fn trash_label(&self) -> String {
        format!("\"{}\" - {}", self.display_title(), self.display_author())
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

/// Validated create/update request. The only way into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub pages: u32,
    pub published: NaiveDate,
    pub acquired: NaiveDate,
    pub status: bool,
}

/// Raw strings exactly as they come out of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub pages: String,
    pub published: String,
    pub acquired: String,
    pub status: String,
}

impl BookFields {
    /// Coerce every field into its typed form, rejecting the whole set on the
    /// first invalid value.
    pub fn validate(&self) -> Result<BookDraft, ValidationError> {
        Ok(BookDraft {
            title: required_text("Title", &self.title)?,
            author: required_text("Author", &self.author)?,
            pages: parse_pages(&self.pages)?,
            published: parse_date("Published", &self.published)?,
            acquired: parse_date("Acquired", &self.acquired)?,
            status: parse_flag("Status", &self.status)?,
        })
    }
}

impl From<&BookRecord> for BookFields {
    /// Prefill the edit form with the stored (untransformed) values.
    fn from(book: &BookRecord) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            pages: book.pages.to_string(),
            published: book.published.format(DATE_FORMAT).to_string(),
            acquired: book.acquired.format(DATE_FORMAT).to_string(),
            status: if book.status { "1" } else { "0" }.to_string(),
        }
    }
}

impl TryFrom<&BookFields> for BookDraft {
    type Error = ValidationError;

    fn try_from(fields: &BookFields) -> Result<Self, Self::Error> {
        fields.validate()
    }
}

/// Lenient wire shape of one persisted or seeded record. Numbers may arrive as
/// strings and the flags as `0`/`1`, which is what older saves contain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub pages: Value,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub acquired: String,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub deleted: Value,
}

fn required_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse a page count typed by the user. Grouping commas are tolerated since
/// that is how the catalog displays the number.
pub fn parse_pages(raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("Pages"));
    }
    let digits: String = trimmed.chars().filter(|ch| *ch != ',').collect();
    digits
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidPages(trimmed.to_string()))
}

pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: trimmed.to_string(),
    })
}

/// Parse a boolean flag from form text.
pub fn parse_flag(field: &'static str, raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "0" | "false" | "unread" => Ok(false),
        "1" | "true" | "read" => Ok(true),
        _ => Err(ValidationError::InvalidFlag {
            field,
            value: raw.trim().to_string(),
        }),
    }
}

fn pages_from_value(value: &Value) -> Result<u32, ValidationError> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|pages| u32::try_from(pages).ok())
            .ok_or_else(|| ValidationError::InvalidPages(number.to_string())),
        Value::String(text) => parse_pages(text),
        Value::Null => Err(ValidationError::MissingField("Pages")),
        other => Err(ValidationError::InvalidPages(other.to_string())),
    }
}

/// Absent flags read as `false`, so records saved before a flag existed load as
/// unread and active.
fn flag_from_value(field: &'static str, value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ValidationError::InvalidFlag {
                field,
                value: number.to_string(),
            }),
        },
        Value::String(text) => parse_flag(field, text),
        other => Err(ValidationError::InvalidFlag {
            field,
            value: other.to_string(),
        }),
    }
}

/// Lowercase the text, then capitalize the first letter of every word. A word
/// starts after any character that is not alphanumeric or `_`, so `o'brien`
/// becomes `O'Brien`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        let is_word = ch.is_alphanumeric() || ch == '_';
        if is_word && !in_word {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        in_word = is_word;
    }
    out
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> BookFields {
        BookFields {
            title: "  the great escape ".to_string(),
            author: "jane doe".to_string(),
            pages: "250".to_string(),
            published: "2020-01-01".to_string(),
            acquired: "2023-05-05".to_string(),
            status: "0".to_string(),
        }
    }

    #[test]
    fn validate_trims_and_parses_fields() {
        let draft = fields().validate().unwrap();
        assert_eq!(draft.title, "the great escape");
        assert_eq!(draft.author, "jane doe");
        assert_eq!(draft.pages, 250);
        assert_eq!(draft.published, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert!(!draft.status);
    }

    #[test]
    fn validate_rejects_non_numeric_pages() {
        let mut input = fields();
        input.pages = "many".to_string();
        assert_eq!(
            input.validate(),
            Err(ValidationError::InvalidPages("many".to_string()))
        );

        input.pages = "-4".to_string();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidPages(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_title() {
        let mut input = fields();
        input.title = "   ".to_string();
        assert_eq!(input.validate(), Err(ValidationError::MissingField("Title")));
    }

    #[test]
    fn validate_rejects_bad_dates_and_flags() {
        let mut input = fields();
        input.published = "01/02/2020".to_string();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidDate { field: "Published", .. })
        ));

        let mut input = fields();
        input.status = "maybe".to_string();
        assert!(matches!(
            input.validate(),
            Err(ValidationError::InvalidFlag { field: "Status", .. })
        ));
    }

    #[test]
    fn from_input_accepts_legacy_numeric_flags() {
        let input: BookInput = serde_json::from_value(json!({
            "id": "kx3c9q",
            "title": "Dune ",
            "author": "frank herbert",
            "pages": "412",
            "published": "1965-08-01",
            "acquired": "2021-03-14",
            "status": 1,
            "deleted": 0
        }))
        .unwrap();

        let book = BookRecord::from_input(input).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.pages, 412);
        assert!(book.status);
        assert!(book.is_active());
    }

    #[test]
    fn from_input_defaults_missing_flags() {
        let input: BookInput = serde_json::from_value(json!({
            "id": "a1",
            "title": "Emma",
            "author": "Jane Austen",
            "pages": 474,
            "published": "1815-12-23",
            "acquired": "2020-01-01"
        }))
        .unwrap();

        let book = BookRecord::from_input(input).unwrap();
        assert!(!book.status);
        assert!(!book.deleted);
    }

    #[test]
    fn from_input_rejects_out_of_range_flag() {
        let input: BookInput = serde_json::from_value(json!({
            "id": "a1",
            "title": "Emma",
            "author": "Jane Austen",
            "pages": 474,
            "published": "1815-12-23",
            "acquired": "2020-01-01",
            "deleted": 7
        }))
        .unwrap();

        assert!(matches!(
            BookRecord::from_input(input),
            Err(ValidationError::InvalidFlag { field: "Deleted", .. })
        ));
    }

    #[test]
    fn delete_restore_and_toggle_flip_flags() {
        let mut book = BookRecord::create("b1", fields().validate().unwrap(), false);
        book.mark_deleted();
        book.mark_deleted();
        assert!(book.is_deleted() && !book.is_active());
        book.mark_restored();
        assert!(book.is_active());

        book.toggle_read_status();
        assert_eq!(book.status_label(), "Read");
        book.toggle_read_status();
        assert_eq!(book.status_label(), "Unread");
    }

    #[test]
    fn display_helpers_format_for_humans() {
        let mut book = BookRecord::create("b1", fields().validate().unwrap(), false);
        book.pages = 1_234_567;
        book.author = "JOHN o'brien-smith".to_string();

        assert_eq!(book.display_title(), "The Great Escape");
        assert_eq!(book.display_author(), "John O'Brien-Smith");
        assert_eq!(book.display_pages(), "1,234,567");
        assert_eq!(book.display_published(), "1/1/2020");
        assert_eq!(book.display_acquired(), "5/5/2023");
        assert_eq!(book.trash_label(), "\"The Great Escape\" - John O'Brien-Smith");
    }

    #[test]
    fn serializes_canonical_shape() {
        let book = BookRecord::create("b1", fields().validate().unwrap(), true);
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["pages"], json!(250));
        assert_eq!(value["published"], json!("2020-01-01"));
        assert_eq!(value["status"], json!(false));
        assert_eq!(value["deleted"], json!(true));
    }

    #[test]
    fn fields_round_trip_through_edit_form() {
        let book = BookRecord::create("b1", fields().validate().unwrap(), false);
        let prefill = BookFields::from(&book);
        assert_eq!(prefill.pages, "250");
        assert_eq!(BookDraft::try_from(&prefill).unwrap().title, book.title);
    }
}
