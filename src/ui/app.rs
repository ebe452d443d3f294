use std::cell::Cell;
use std::collections::HashSet;
use std::iter;
use std::mem;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell as TableCell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
    TableState, Wrap,
};
use ratatui::Frame;

use crate::db::KeyValueStore;
use crate::events::StoreEvent;
use crate::models::BookRecord;
use crate::sort::{SortDirection, SortField};
use crate::store::{BulkReport, LibraryStore};
use crate::theme::{ThemeSettings, STYLE_NAMES};

use super::forms::{BookField, BookForm, ConfirmErase, ThemeForm};
use super::helpers::{centered_rect, key_hint, mark, statistics_pairs, surface_error};
use super::palette::Palette;

/// Height of the statistics strip above the table.
const STATS_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 4;
/// Width of the field label column in the book form, see `BookForm::build_line`.
const FORM_LABEL_WIDTH: u16 = 11;
/// Width of the style name column in the theme form.
const THEME_LABEL_WIDTH: u16 = 14;
/// Trash entries listed in the erase confirmation before summarizing.
const CONFIRM_PREVIEW: usize = 8;

/// The two lists the user can look at.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Screen {
    Catalog,
    Trash,
}

/// Fine-grained modes layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: String, form: BookForm },
    ConfirmErase(ConfirmErase),
    ConfirmPurge,
    EditingTheme(ThemeForm),
    About,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Warning,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Warning => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Presentation state wrapped around the library store. The store is the only
/// owner of book data; the app keeps cursor positions, multi-select marks and
/// the dialog currently open, and re-derives everything else on each draw.
pub struct App {
    store: LibraryStore,
    backend: Rc<dyn KeyValueStore>,
    theme: ThemeSettings,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    catalog_selected: usize,
    trash_selected: usize,
    catalog_marked: HashSet<String>,
    trash_marked: HashSet<String>,
    sort: Option<(SortField, SortDirection)>,
    /// Set by the store observer whenever the collection changes.
    changed: Rc<Cell<bool>>,
}

impl App {
    pub fn new(mut store: LibraryStore, backend: Rc<dyn KeyValueStore>, theme: ThemeSettings) -> Self {
        let changed = Rc::new(Cell::new(true));
        let flag = changed.clone();
        store.subscribe(move |_event: &StoreEvent| flag.set(true));

        let mut app = Self {
            store,
            backend,
            theme,
            screen: Screen::Catalog,
            mode: Mode::Normal,
            status: None,
            catalog_selected: 0,
            trash_selected: 0,
            catalog_marked: HashSet::new(),
            trash_marked: HashSet::new(),
            sort: None,
            changed,
        };
        app.refresh_if_changed();
        app
    }

    /// Show a message in the footer, e.g. a startup problem.
    pub fn notify_error<S: Into<String>>(&mut self, text: S) {
        self.set_status(text, StatusKind::Error);
    }

    pub fn store(&self) -> &LibraryStore {
        &self.store
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let result = match mode {
            Mode::Normal => match self.screen {
                Screen::Catalog => self.handle_catalog_key(code, &mut exit),
                Screen::Trash => self.handle_trash_key(code, &mut exit),
            },
            Mode::AddingBook(form) => self.handle_book_form(code, None, form),
            Mode::EditingBook { id, form } => self.handle_book_form(code, Some(id), form),
            Mode::ConfirmErase(confirm) => self.handle_confirm_erase(code, confirm),
            Mode::ConfirmPurge => self.handle_confirm_purge(code),
            Mode::EditingTheme(form) => self.handle_theme_form(code, form),
            Mode::About => Ok(Self::handle_about(code)),
        };

        match result {
            Ok(mode) => self.mode = mode,
            Err(err) => {
                self.mode = Mode::Normal;
                self.set_status(surface_error(&err), StatusKind::Error);
            }
        }

        self.refresh_if_changed();
        exit
    }

    /// Select or deselect every row on the current screen.
    pub(crate) fn handle_ctrl_a(&mut self) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }

        let (ids, marked): (Vec<String>, &mut HashSet<String>) = match self.screen {
            Screen::Catalog => (
                self.store.active_books().map(|b| b.id.clone()).collect(),
                &mut self.catalog_marked,
            ),
            Screen::Trash => (
                self.store.trashed_books().map(|b| b.id.clone()).collect(),
                &mut self.trash_marked,
            ),
        };

        if !ids.is_empty() && ids.iter().all(|id| marked.contains(id)) {
            marked.clear();
        } else {
            marked.extend(ids);
        }
    }

    fn handle_catalog_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.catalog_selected = 0,
            KeyCode::End => self.catalog_selected = self.active_count().saturating_sub(1),
            KeyCode::Char(' ') => self.toggle_mark(),
            KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::blank(Local::now().date_naive())));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(book) = self.current_book() {
                    return Ok(Mode::EditingBook {
                        id: book.id.clone(),
                        form: BookForm::from_book(book),
                    });
                }
                self.set_status("No book selected.", StatusKind::Error);
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selection(),
            KeyCode::Char('s') => self.toggle_current_status()?,
            KeyCode::Char(ch @ '1'..='6') => self.sort_column(ch),
            KeyCode::Char('t') | KeyCode::Tab => {
                self.screen = Screen::Trash;
                self.clear_status();
            }
            KeyCode::Char('c') => {
                return Ok(Mode::EditingTheme(ThemeForm::new(self.theme.clone())));
            }
            KeyCode::Char('?') => return Ok(Mode::About),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_trash_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Char('t') | KeyCode::Tab => {
                self.screen = Screen::Catalog;
                self.clear_status();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home => self.trash_selected = 0,
            KeyCode::End => self.trash_selected = self.trash_count().saturating_sub(1),
            KeyCode::Char(' ') => self.toggle_mark(),
            KeyCode::Char('r') => self.restore_selection(),
            KeyCode::Char('x') | KeyCode::Delete => {
                let ids = self.trash_selection();
                if ids.is_empty() {
                    self.set_status("Trash is empty.", StatusKind::Error);
                } else {
                    let confirm =
                        ConfirmErase::from_books(ids.iter().filter_map(|id| self.store.get(id)));
                    return Ok(Mode::ConfirmErase(confirm));
                }
            }
            KeyCode::Char('?') => return Ok(Mode::About),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_book_form(&mut self, code: KeyCode, id: Option<String>, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(draft) => {
                    match id.as_deref() {
                        Some(id) => {
                            let title = self
                                .store
                                .update_book(id, draft)
                                .context("failed to update book")?
                                .display_title();
                            self.set_status(format!("Updated \"{title}\"."), StatusKind::Info);
                        }
                        None => {
                            let book = self.store.add_book(draft);
                            self.focus_book(&book.id);
                            self.set_status(
                                format!("Added \"{}\".", book.display_title()),
                                StatusKind::Info,
                            );
                        }
                    }
                    return Ok(Mode::Normal);
                }
                Err(err) => form.error = Some(err.to_string()),
            },
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }

        Ok(match id {
            Some(id) => Mode::EditingBook { id, form },
            None => Mode::AddingBook(form),
        })
    }

    fn handle_confirm_erase(&mut self, code: KeyCode, confirm: ConfirmErase) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let report = self.store.erase_many(&confirm.ids);
                self.trash_marked.clear();
                self.report_bulk("Erased", &report);
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_status("Erase cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            _ => Ok(Mode::ConfirmErase(confirm)),
        }
    }

    fn handle_confirm_purge(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.store.purge().context("failed to purge saved books")?;
                ThemeSettings::purge(self.backend.as_ref())
                    .context("failed to purge theme settings")?;
                self.set_status(
                    "Saved data cleared. The next change saves the current list again.",
                    StatusKind::Info,
                );
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmPurge),
        }
    }

    fn handle_theme_form(&mut self, code: KeyCode, mut form: ThemeForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Theme reset to last save.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => {
                self.theme = form.settings;
                self.theme
                    .save(self.backend.as_ref())
                    .context("failed to save theme")?;
                self.set_status("Theme saved.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Ok(Mode::EditingTheme(form))
    }

    fn handle_about(code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('P') => Mode::ConfirmPurge,
            _ => Mode::Normal,
        }
    }

    fn delete_selection(&mut self) {
        let ids = self.catalog_selection();
        if ids.is_empty() {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        }
        let report = self.store.delete_many(&ids);
        self.catalog_marked.clear();
        self.report_bulk("Moved to trash:", &report);
    }

    fn restore_selection(&mut self) {
        let ids = self.trash_selection();
        if ids.is_empty() {
            self.set_status("Trash is empty.", StatusKind::Error);
            return;
        }
        let report = self.store.restore_many(&ids);
        self.trash_marked.clear();
        self.report_bulk("Restored", &report);
    }

    fn toggle_current_status(&mut self) -> Result<()> {
        let Some(id) = self.current_book().map(|book| book.id.clone()) else {
            self.set_status("No book selected.", StatusKind::Error);
            return Ok(());
        };
        let read = self
            .store
            .toggle_status(&id)
            .context("failed to toggle read status")?;
        let label = if read { "Read" } else { "Unread" };
        self.set_status(format!("Marked as {label}."), StatusKind::Info);
        Ok(())
    }

    /// Header link behaviour: a new column sorts ascending, the active column
    /// flips direction.
    fn sort_column(&mut self, ch: char) {
        let idx = ch as usize - '1' as usize;
        let Some(&field) = SortField::ALL.get(idx) else {
            return;
        };
        let direction = match self.sort {
            Some((current, direction)) if current == field => direction.reversed(),
            _ => SortDirection::Ascending,
        };
        let focus = self.current_book().map(|book| book.id.clone());

        self.store.sort_by(field, direction);
        self.sort = Some((field, direction));
        if let Some(id) = focus {
            self.focus_book(&id);
        }
        self.set_status(
            format!("Sorted by {} {}", field.label(), direction.arrow()),
            StatusKind::Info,
        );
    }

    fn report_bulk(&mut self, verb: &str, report: &BulkReport) {
        let count = report.applied.len();
        let noun = if count == 1 { "book" } else { "books" };
        if report.skipped.is_empty() {
            self.set_status(format!("{verb} {count} {noun}."), StatusKind::Info);
        } else {
            self.set_status(
                format!(
                    "{verb} {count} {noun}; {} no longer existed.",
                    report.skipped.len()
                ),
                StatusKind::Warning,
            );
        }
    }

    /// Marked rows in display order, or the row under the cursor.
    fn catalog_selection(&self) -> Vec<String> {
        if self.catalog_marked.is_empty() {
            return self.current_book().map(|b| vec![b.id.clone()]).unwrap_or_default();
        }
        self.store
            .active_books()
            .filter(|book| self.catalog_marked.contains(&book.id))
            .map(|book| book.id.clone())
            .collect()
    }

    fn trash_selection(&self) -> Vec<String> {
        if self.trash_marked.is_empty() {
            return self.current_trash().map(|b| vec![b.id.clone()]).unwrap_or_default();
        }
        self.store
            .trashed_books()
            .filter(|book| self.trash_marked.contains(&book.id))
            .map(|book| book.id.clone())
            .collect()
    }

    fn toggle_mark(&mut self) {
        let (id, marked) = match self.screen {
            Screen::Catalog => (
                self.current_book().map(|b| b.id.clone()),
                &mut self.catalog_marked,
            ),
            Screen::Trash => (
                self.current_trash().map(|b| b.id.clone()),
                &mut self.trash_marked,
            ),
        };
        if let Some(id) = id {
            if !marked.remove(&id) {
                marked.insert(id);
            }
        }
    }

    fn move_selection(&mut self, offset: isize) {
        let (selected, count) = match self.screen {
            Screen::Catalog => (&mut self.catalog_selected, self.store.active_books().count()),
            Screen::Trash => (&mut self.trash_selected, self.store.trashed_books().count()),
        };
        if count == 0 {
            *selected = 0;
            return;
        }
        let next = (*selected as isize + offset).clamp(0, count as isize - 1);
        *selected = next as usize;
    }

    fn focus_book(&mut self, id: &str) {
        if let Some(idx) = self.store.active_books().position(|book| book.id == id) {
            self.catalog_selected = idx;
        }
    }

    fn current_book(&self) -> Option<&BookRecord> {
        self.store.active_books().nth(self.catalog_selected)
    }

    fn current_trash(&self) -> Option<&BookRecord> {
        self.store.trashed_books().nth(self.trash_selected)
    }

    fn active_count(&self) -> usize {
        self.store.active_books().count()
    }

    fn trash_count(&self) -> usize {
        self.store.trashed_books().count()
    }

    /// Re-sync cursor and marks after a store notification, and surface a
    /// failed save.
    fn refresh_if_changed(&mut self) {
        if !self.changed.replace(false) {
            return;
        }

        let store = &self.store;
        self.catalog_marked
            .retain(|id| store.get(id).is_some_and(BookRecord::is_active));
        self.trash_marked
            .retain(|id| store.get(id).is_some_and(BookRecord::is_deleted));

        self.catalog_selected = self
            .catalog_selected
            .min(self.active_count().saturating_sub(1));
        self.trash_selected = self.trash_selected.min(self.trash_count().saturating_sub(1));

        if let Some(warning) = self.store.last_persist_warning() {
            let text = format!("Changes are not being saved: {warning}");
            self.set_status(text, StatusKind::Warning);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    /// Colors for this frame. While the theme dialog is open the edited copy
    /// is previewed.
    fn palette(&self) -> Palette {
        match &self.mode {
            Mode::EditingTheme(form) => Palette::from_theme(&form.settings),
            _ => Palette::from_theme(&self.theme),
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let palette = self.palette();
        let area = frame.area();
        frame.render_widget(Block::default().style(palette.base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(STATS_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_statistics(frame, chunks[0], &palette);
        match self.screen {
            Screen::Catalog => self.draw_catalog(frame, chunks[1], &palette),
            Screen::Trash => self.draw_trash(frame, chunks[1], &palette),
        }
        self.draw_footer(frame, chunks[2], &palette);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add New Book", form, &palette),
            Mode::EditingBook { form, .. } => {
                self.draw_book_form(frame, area, "Edit Book", form, &palette)
            }
            Mode::ConfirmErase(confirm) => self.draw_confirm_erase(frame, area, confirm, &palette),
            Mode::ConfirmPurge => self.draw_confirm_purge(frame, area, &palette),
            Mode::EditingTheme(form) => self.draw_theme_form(frame, area, form, &palette),
            Mode::About => self.draw_about(frame, area, &palette),
            Mode::Normal => {}
        }
    }

    fn draw_statistics(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let stats = self.store.statistics();
        let spans: Vec<Span<'static>> = statistics_pairs(&stats)
            .into_iter()
            .flat_map(|(label, value)| {
                [
                    Span::styled(format!("{label} "), palette.hint()),
                    Span::styled(value, palette.heading()),
                    Span::raw("   "),
                ]
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(Span::styled(" Personal Library ", palette.heading()));
        let paragraph = Paragraph::new(Line::from(spans))
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
    }

    fn draw_catalog(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(" Library ");

        let books: Vec<&BookRecord> = self.store.active_books().collect();
        if books.is_empty() {
            let message = Paragraph::new("No books yet. Press 'a' to add one.")
                .block(block)
                .alignment(Alignment::Center)
                .style(palette.hint());
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(iter::once(TableCell::from("")).chain(
            SortField::ALL.iter().enumerate().map(|(idx, field)| {
                let arrow = match self.sort {
                    Some((current, direction)) if current == *field => {
                        format!(" {}", direction.arrow())
                    }
                    _ => String::new(),
                };
                TableCell::from(format!("{} {}{arrow}", idx + 1, field.label()))
            }),
        ))
        .style(palette.heading());

        let rows = books.iter().map(|book| {
            Row::new(vec![
                TableCell::from(mark(self.catalog_marked.contains(&book.id))),
                TableCell::from(book.display_title()),
                TableCell::from(book.display_author()),
                TableCell::from(Line::from(book.display_pages()).alignment(Alignment::Right)),
                TableCell::from(book.display_published()),
                TableCell::from(book.display_acquired()),
                TableCell::from(book.status_label()),
            ])
        });

        let widths = [
            Constraint::Length(3),
            Constraint::Percentage(32),
            Constraint::Percentage(24),
            Constraint::Length(9),
            Constraint::Length(13),
            Constraint::Length(13),
            Constraint::Length(9),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(palette.selected())
            .highlight_symbol("> ");

        let mut state =
            TableState::default().with_selected(Some(self.catalog_selected.min(books.len() - 1)));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_trash(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(" Recycle Bin ");

        let items: Vec<ListItem> = self
            .store
            .trashed_books()
            .map(|book| {
                ListItem::new(format!(
                    "{} {}",
                    mark(self.trash_marked.contains(&book.id)),
                    book.trash_label()
                ))
            })
            .collect();

        if items.is_empty() {
            let message = Paragraph::new("The recycle bin is empty.")
                .block(block)
                .alignment(Alignment::Center)
                .style(palette.hint());
            frame.render_widget(message, area);
            return;
        }

        let selected = self.trash_selected.min(items.len() - 1);
        let list = List::new(items)
            .block(block)
            .highlight_style(palette.selected())
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(palette.border());
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = match &self.status {
            Some(status) => Line::from(Span::styled(status.text.clone(), status.kind.style())),
            None => Line::from(""),
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions(palette)])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self, palette: &Palette) -> Line<'static> {
        let key_style = palette.heading();
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(form) | Mode::EditingBook { form, .. })
                if form.active == BookField::Status =>
            {
                &[
                    ("Tab", "Next field"),
                    ("Shift+Tab", "Previous"),
                    ("Space", "Toggle status"),
                    ("Enter", "Save"),
                    ("Esc", "Cancel"),
                ]
            }
            (_, Mode::AddingBook(_) | Mode::EditingBook { .. }) => &[
                ("Tab", "Next field"),
                ("Shift+Tab", "Previous"),
                ("Enter", "Save"),
                ("Esc", "Cancel"),
            ],
            (_, Mode::EditingTheme(_)) => &[
                ("Tab", "Next setting"),
                ("Enter", "Save"),
                ("Esc", "Reset"),
            ],
            (_, Mode::ConfirmErase(_) | Mode::ConfirmPurge) => &[("y", "Confirm"), ("n", "Cancel")],
            (_, Mode::About) => &[("P", "Purge saved data"), ("any key", "Close")],
            (Screen::Catalog, Mode::Normal) => &[
                ("a", "Add"),
                ("e", "Edit"),
                ("d", "Delete"),
                ("s", "Read/Unread"),
                ("1-6", "Sort"),
                ("Space", "Select"),
                ("Ctrl+A", "All"),
                ("t", "Trash"),
                ("c", "Theme"),
                ("q", "Quit"),
            ],
            (Screen::Trash, Mode::Normal) => &[
                ("r", "Restore"),
                ("x", "Erase"),
                ("Space", "Select"),
                ("Ctrl+A", "All"),
                ("t", "Library"),
                ("q", "Quit"),
            ],
        };

        Line::from(
            hints
                .iter()
                .flat_map(|(key, text)| key_hint(key, text, key_style))
                .collect::<Vec<_>>(),
        )
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm, palette: &Palette) {
        let popup_area = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(format!(" {title} "), palette.heading()))
            .borders(Borders::ALL)
            .border_style(palette.border())
            .style(palette.base());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field, palette.accent))
            .collect();
        lines.push(Line::from(""));

        match &form.error {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                StatusKind::Error.style(),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Dates as YYYY-MM-DD. Enter to save, Esc to cancel.",
                palette.hint(),
            ))),
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        if form.active != BookField::Status {
            let row = BookField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let cursor_x = inner.x + FORM_LABEL_WIDTH + form.value_len(form.active) as u16;
            frame.set_cursor_position((cursor_x, inner.y + row));
        }
    }

    fn draw_confirm_erase(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmErase, palette: &Palette) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(" Erase Permanently ", palette.heading()))
            .borders(Borders::ALL)
            .border_style(palette.border())
            .style(palette.base());

        let mut lines: Vec<Line> = confirm
            .labels
            .iter()
            .take(CONFIRM_PREVIEW)
            .map(|label| Line::from(format!("  {label}")))
            .collect();
        if confirm.labels.len() > CONFIRM_PREVIEW {
            lines.push(Line::from(Span::styled(
                format!("  ...and {} more", confirm.labels.len() - CONFIRM_PREVIEW),
                palette.hint(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "This cannot be undone. Erase? (y/n)",
            StatusKind::Warning.style(),
        )));

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_confirm_purge(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(" Purge Saved Data ", palette.heading()))
            .borders(Borders::ALL)
            .border_style(palette.border())
            .style(palette.base());
        let lines = vec![
            Line::from("Remove the saved books and theme from this computer?"),
            Line::from(""),
            Line::from(Span::styled("(y/n)", StatusKind::Warning.style())),
        ];
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_theme_form(&self, frame: &mut Frame, area: Rect, form: &ThemeForm, palette: &Palette) {
        let popup_area = centered_rect(50, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(" Settings ", palette.heading()))
            .borders(Borders::ALL)
            .border_style(palette.border())
            .style(palette.base());
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = (0..STYLE_NAMES.len())
            .map(|idx| form.build_line(idx, palette.accent))
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Accent ", palette.heading()),
            Span::styled("text ", palette.base()),
            Span::styled("hint ", palette.hint()),
            Span::styled(" selected ", palette.selected()),
        ]));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                StatusKind::Error.style(),
            )));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let cursor_x = inner.x + THEME_LABEL_WIDTH + form.active_len() as u16;
        frame.set_cursor_position((cursor_x, inner.y + form.active as u16));
    }

    fn draw_about(&self, frame: &mut Frame, area: Rect, palette: &Palette) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(Span::styled(" About ", palette.heading()))
            .borders(Borders::ALL)
            .border_style(palette.border())
            .style(palette.base());
        let lines = vec![
            Line::from("A personal catalog of the books on your shelves."),
            Line::from(""),
            Line::from("Deleted books go to the recycle bin, where they can be"),
            Line::from("restored or erased for good. Everything is saved on this"),
            Line::from("computer after each change."),
            Line::from(""),
            Line::from(Span::styled(
                "Press P to purge all saved data, any other key to close.",
                palette.hint(),
            )),
        ];
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, BOOKS_KEY};
    use crate::seed::EmbeddedSeed;

    fn app() -> (App, Rc<MemoryStore>) {
        let backend = Rc::new(MemoryStore::new());
        let mut store = LibraryStore::new(backend.clone(), Box::new(EmbeddedSeed));
        store.initialize().unwrap();
        let app = App::new(store, backend.clone(), ThemeSettings::default());
        (app, backend)
    }

    fn type_keys(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    #[test]
    fn add_form_creates_a_book() {
        let (mut app, backend) = app();
        let before = app.store().statistics().total;

        app.handle_key(KeyCode::Char('a'));
        type_keys(&mut app, "the great escape");
        app.handle_key(KeyCode::Tab);
        type_keys(&mut app, "jane doe");
        app.handle_key(KeyCode::Tab);
        type_keys(&mut app, "250");
        app.handle_key(KeyCode::Tab);
        type_keys(&mut app, "2020-01-01");
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.store().statistics().total, before + 1);
        assert_eq!(app.current_book().unwrap().title, "the great escape");
        assert!(backend
            .get(BOOKS_KEY)
            .unwrap()
            .unwrap()
            .contains("the great escape"));
    }

    #[test]
    fn invalid_form_stays_open_with_error() {
        let (mut app, _) = app();
        app.handle_key(KeyCode::Char('a'));
        app.handle_key(KeyCode::Enter);

        match &app.mode {
            Mode::AddingBook(form) => assert_eq!(form.error.as_deref(), Some("Title is required.")),
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn marked_rows_are_deleted_together_and_restored() {
        let (mut app, _) = app();
        app.handle_key(KeyCode::Char(' '));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Char(' '));
        app.handle_key(KeyCode::Char('d'));

        assert_eq!(app.store().statistics().trash, 2);
        assert!(app.catalog_marked.is_empty());

        app.handle_key(KeyCode::Char('t'));
        app.handle_ctrl_a();
        app.handle_key(KeyCode::Char('r'));
        assert_eq!(app.store().statistics().trash, 0);
    }

    #[test]
    fn erase_requires_confirmation() {
        let (mut app, _) = app();
        let total = app.store().len();
        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('t'));

        app.handle_key(KeyCode::Char('x'));
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.store().len(), total);

        app.handle_key(KeyCode::Char('x'));
        app.handle_key(KeyCode::Char('y'));
        assert_eq!(app.store().len(), total - 1);
        assert_eq!(app.store().statistics().trash, 0);
    }

    #[test]
    fn sort_keys_cycle_direction() {
        let (mut app, _) = app();
        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.sort, Some((SortField::Pages, SortDirection::Ascending)));
        let first = app.store().active_books().next().unwrap().pages;

        app.handle_key(KeyCode::Char('3'));
        assert_eq!(app.sort, Some((SortField::Pages, SortDirection::Descending)));
        assert!(app.store().active_books().next().unwrap().pages >= first);

        app.handle_key(KeyCode::Char('1'));
        assert_eq!(app.sort, Some((SortField::Title, SortDirection::Ascending)));
    }

    #[test]
    fn theme_cancel_keeps_saved_theme() {
        let (mut app, _) = app();
        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Esc);
        assert_eq!(app.theme, ThemeSettings::default());

        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Backspace);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.theme.color_accent, "#4fa3e");
    }

    fn footer_text(app: &App) -> String {
        let palette = Palette::from_theme(&app.theme);
        app.footer_instructions(&palette)
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect()
    }

    #[test]
    fn status_toggle_hint_only_on_status_field() {
        let (mut app, _) = app();
        app.handle_key(KeyCode::Char('a'));
        assert!(!footer_text(&app).contains("Toggle status"));

        app.handle_key(KeyCode::BackTab);
        assert!(footer_text(&app).contains("Toggle status"));

        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char(' '));
        assert!(!footer_text(&app).contains("Toggle status"));
        match &app.mode {
            Mode::AddingBook(form) => assert_eq!(form.fields.title, " "),
            _ => panic!("form should stay open"),
        }
    }

    #[test]
    fn failed_save_is_reported_in_footer() {
        let (mut app, backend) = app();
        backend.set_fail_writes(true);
        app.handle_key(KeyCode::Char('s'));

        let status = app.status.as_ref().unwrap();
        assert!(matches!(status.kind, StatusKind::Warning));
        assert!(status.text.contains("not being saved"));
    }
}
