use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::ValidationError;
use crate::models::{BookDraft, BookFields, BookRecord, DATE_FORMAT};
use crate::theme::{ThemeSettings, STYLE_NAMES};

/// Fields of the add/edit form, in tab order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Pages,
    Published,
    Acquired,
    Status,
}

impl BookField {
    pub(crate) const ALL: [BookField; 6] = [
        BookField::Title,
        BookField::Author,
        BookField::Pages,
        BookField::Published,
        BookField::Acquired,
        BookField::Status,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Pages => "Pages",
            BookField::Published => "Published",
            BookField::Acquired => "Acquired",
            BookField::Status => "Status",
        }
    }

    fn index(self) -> usize {
        BookField::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0)
    }

    fn offset(self, step: isize) -> Self {
        let len = BookField::ALL.len() as isize;
        let idx = (self.index() as isize + step).rem_euclid(len) as usize;
        BookField::ALL[idx]
    }
}

/// Internal representation of the add/edit book form.
#[derive(Clone, Debug, Default)]
pub(crate) struct BookForm {
    pub(crate) fields: BookFields,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

impl BookForm {
    /// Blank form for a new book. Acquired defaults to today, status to unread.
    pub(crate) fn blank(today: NaiveDate) -> Self {
        let fields = BookFields {
            acquired: today.format(DATE_FORMAT).to_string(),
            status: "0".to_string(),
            ..BookFields::default()
        };
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Populate the form from an existing book when editing.
    pub(crate) fn from_book(book: &BookRecord) -> Self {
        Self {
            fields: BookFields::from(book),
            ..Self::default()
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.offset(1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.offset(-1);
    }

    fn value(&self, field: BookField) -> &String {
        match field {
            BookField::Title => &self.fields.title,
            BookField::Author => &self.fields.author,
            BookField::Pages => &self.fields.pages,
            BookField::Published => &self.fields.published,
            BookField::Acquired => &self.fields.acquired,
            BookField::Status => &self.fields.status,
        }
    }

    fn value_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.fields.title,
            BookField::Author => &mut self.fields.author,
            BookField::Pages => &mut self.fields.pages,
            BookField::Published => &mut self.fields.published,
            BookField::Acquired => &mut self.fields.acquired,
            BookField::Status => &mut self.fields.status,
        }
    }

    /// Append a character to the active field, filtering what each field
    /// accepts. On the status field any of space, `0`, `1` flips the value.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Title | BookField::Author => {
                if ch.is_control() {
                    return false;
                }
                self.value_mut(self.active).push(ch);
            }
            BookField::Pages => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.fields.pages.push(ch);
            }
            BookField::Published | BookField::Acquired => {
                if !(ch.is_ascii_digit() || ch == '-') {
                    return false;
                }
                self.value_mut(self.active).push(ch);
            }
            BookField::Status => match ch {
                '0' | '1' => self.fields.status = ch.to_string(),
                ' ' => self.toggle_status(),
                _ => return false,
            },
        }
        self.error = None;
        true
    }

    fn toggle_status(&mut self) {
        self.fields.status = if self.fields.status == "1" { "0" } else { "1" }.to_string();
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        if self.active == BookField::Status {
            return;
        }
        self.value_mut(self.active).pop();
    }

    /// Validate the inputs and return a typed draft ready for the store.
    pub(crate) fn parse_inputs(&self) -> Result<BookDraft, ValidationError> {
        self.fields.validate()
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField, accent: Color) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = match field {
            BookField::Status => {
                if value == "1" {
                    "Read".to_string()
                } else {
                    "Unread".to_string()
                }
            }
            BookField::Published | BookField::Acquired if value.is_empty() => {
                "<YYYY-MM-DD>".to_string()
            }
            _ if value.is_empty() => "<required>".to_string(),
            _ => value.clone(),
        };

        let style = if is_active {
            Style::default().fg(accent)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:<10} ", format!("{}:", field.label()))),
            Span::styled(display, style),
        ])
    }

    /// Character count for the cursor position of the active field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}

/// Pending permanent erase of one or more trashed books.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmErase {
    pub(crate) ids: Vec<String>,
    pub(crate) labels: Vec<String>,
}

impl ConfirmErase {
    pub(crate) fn from_books<'a>(books: impl IntoIterator<Item = &'a BookRecord>) -> Self {
        let (ids, labels) = books
            .into_iter()
            .map(|book| (book.id.clone(), book.trash_label()))
            .unzip();
        Self { ids, labels }
    }
}

/// Theme editor working on a copy of the saved settings. Cancelling simply
/// drops the copy.
#[derive(Clone, Debug)]
pub(crate) struct ThemeForm {
    pub(crate) settings: ThemeSettings,
    pub(crate) active: usize,
    pub(crate) error: Option<String>,
}

impl ThemeForm {
    pub(crate) fn new(settings: ThemeSettings) -> Self {
        Self {
            settings,
            active: 0,
            error: None,
        }
    }

    pub(crate) fn active_name(&self) -> &'static str {
        STYLE_NAMES[self.active % STYLE_NAMES.len()]
    }

    pub(crate) fn next_field(&mut self) {
        self.active = (self.active + 1) % STYLE_NAMES.len();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = (self.active + STYLE_NAMES.len() - 1) % STYLE_NAMES.len();
    }

    fn active_value(&self) -> String {
        self.settings
            .get(self.active_name())
            .unwrap_or_default()
            .to_string()
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let mut value = self.active_value();
        value.push(ch);
        self.store_active(&value)
    }

    pub(crate) fn backspace(&mut self) {
        let mut value = self.active_value();
        value.pop();
        self.store_active(&value);
    }

    fn store_active(&mut self, value: &str) -> bool {
        match self.settings.set(self.active_name(), value) {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    pub(crate) fn build_line(&self, idx: usize, accent: Color) -> Line<'static> {
        let name = STYLE_NAMES[idx % STYLE_NAMES.len()];
        let value = self.settings.get(name).unwrap_or_default().to_string();
        let style = if idx == self.active {
            Style::default().fg(accent)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::raw(format!("{name:<13} ")),
            Span::styled(value, style),
        ])
    }

    pub(crate) fn active_len(&self) -> usize {
        self.active_value().chars().count()
    }
}
