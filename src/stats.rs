use std::collections::HashSet;

use crate::models::BookRecord;

/// Summary numbers shown above the catalog. Always derived from the current
/// records, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Active books.
    pub total: usize,
    /// Sum of pages over active books.
    pub pages: u64,
    /// Distinct active authors, compared case-insensitively.
    pub authors: usize,
    pub read: usize,
    pub unread: usize,
    /// Books in the trash.
    pub trash: usize,
}

impl Statistics {
    pub fn from_books(books: &[BookRecord]) -> Self {
        let mut stats = Self::default();
        let mut authors = HashSet::new();

        for book in books {
            if book.is_deleted() {
                stats.trash += 1;
                continue;
            }

            stats.total += 1;
            stats.pages += u64::from(book.pages);
            authors.insert(book.author.to_lowercase());
            if book.status {
                stats.read += 1;
            } else {
                stats.unread += 1;
            }
        }

        stats.authors = authors.len();
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookFields;

    fn book(id: &str, author: &str, pages: &str, status: &str, deleted: bool) -> BookRecord {
        let fields = BookFields {
            title: format!("book {id}"),
            author: author.to_string(),
            pages: pages.to_string(),
            published: "1999-09-09".to_string(),
            acquired: "2009-09-09".to_string(),
            status: status.to_string(),
        };
        BookRecord::create(id, fields.validate().unwrap(), deleted)
    }

    #[test]
    fn counts_only_active_books_and_dedupes_authors() {
        let books = vec![
            book("1", "Jane Doe", "100", "1", false),
            book("2", "jane doe", "200", "0", false),
            book("3", "John Roe", "300", "0", false),
            book("4", "Trash Author", "999", "1", true),
        ];

        let stats = Statistics::from_books(&books);
        assert_eq!(
            stats,
            Statistics {
                total: 3,
                pages: 600,
                authors: 2,
                read: 1,
                unread: 2,
                trash: 1,
            }
        );
        assert_eq!(stats.total, stats.read + stats.unread);
        assert_eq!(stats.total + stats.trash, books.len());
    }

    #[test]
    fn empty_collection_is_all_zero() {
        assert_eq!(Statistics::from_books(&[]), Statistics::default());
    }
}
