//! Column ordering for the catalog table.

use std::cmp::Ordering;
use std::fmt;

use crate::models::BookRecord;

/// Sortable columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Title,
    Author,
    Pages,
    Published,
    Acquired,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Title,
        SortField::Author,
        SortField::Pages,
        SortField::Published,
        SortField::Acquired,
        SortField::Status,
    ];

    /// Field name as it appears in the record JSON.
    pub fn name(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Pages => "pages",
            SortField::Published => "published",
            SortField::Acquired => "acquired",
            SortField::Status => "status",
        }
    }

    /// Column heading.
    pub fn label(self) -> &'static str {
        match self {
            SortField::Title => "Title",
            SortField::Author => "Author",
            SortField::Pages => "Pages",
            SortField::Published => "Published",
            SortField::Acquired => "Acquired",
            SortField::Status => "Status",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow shown next to the active column heading.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Total order on records for one column. Text compares case-insensitively,
/// falling back to a case-sensitive comparison; unread sorts before read.
/// Remaining ties are broken by id so no two distinct records compare equal.
pub fn compare(a: &BookRecord, b: &BookRecord, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Title => compare_text(&a.title, &b.title),
        SortField::Author => compare_text(&a.author, &b.author),
        SortField::Pages => a.pages.cmp(&b.pages),
        SortField::Published => a.published.cmp(&b.published),
        SortField::Acquired => a.acquired.cmp(&b.acquired),
        SortField::Status => a.status.cmp(&b.status),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable in-place sort.
pub fn sort_books(books: &mut [BookRecord], field: SortField, direction: SortDirection) {
    match direction {
        SortDirection::Ascending => books.sort_by(|a, b| compare(a, b, field)),
        SortDirection::Descending => books.sort_by(|a, b| compare(b, a, field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookFields;

    fn book(id: &str, title: &str, pages: &str, status: &str) -> BookRecord {
        let fields = BookFields {
            title: title.to_string(),
            author: "someone".to_string(),
            pages: pages.to_string(),
            published: "2000-01-01".to_string(),
            acquired: "2001-01-01".to_string(),
            status: status.to_string(),
        };
        BookRecord::create(id, fields.validate().unwrap(), false)
    }

    fn ids(books: &[BookRecord]) -> Vec<&str> {
        books.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn titles_sort_case_insensitively() {
        let mut books = vec![
            book("1", "zebra", "10", "0"),
            book("2", "Apple", "10", "0"),
            book("3", "apple", "10", "0"),
        ];
        sort_books(&mut books, SortField::Title, SortDirection::Ascending);
        assert_eq!(ids(&books), vec!["2", "3", "1"]);
    }

    #[test]
    fn descending_is_exact_reverse_even_with_ties() {
        let mut books = vec![
            book("c", "same", "10", "1"),
            book("a", "same", "10", "0"),
            book("b", "same", "5", "0"),
        ];
        sort_books(&mut books, SortField::Pages, SortDirection::Ascending);
        let ascending = ids(&books).join(",");
        assert_eq!(ascending, "b,a,c");

        sort_books(&mut books, SortField::Pages, SortDirection::Descending);
        assert_eq!(ids(&books).join(","), "c,a,b");

        sort_books(&mut books, SortField::Pages, SortDirection::Descending);
        assert_eq!(ids(&books).join(","), "c,a,b");
    }

    #[test]
    fn unread_sorts_before_read() {
        let mut books = vec![book("1", "x", "1", "1"), book("2", "y", "1", "0")];
        sort_books(&mut books, SortField::Status, SortDirection::Ascending);
        assert_eq!(ids(&books), vec!["2", "1"]);
    }

    #[test]
    fn field_names_match_record_keys() {
        let saved = serde_json::to_value(book("1", "x", "1", "0")).unwrap();
        for field in SortField::ALL {
            assert!(saved.get(field.to_string()).is_some(), "no key {field}");
        }
    }
}
