mod ui;
pub(crate) mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::db::RecordStore;
use crate::error::StorageError;
use crate::models::{LearningRecord, RecordForm, FIELD_COUNT};
use crate::views::DashboardViews;

/// What the content panel is showing. Each variant owns the state its
/// renderer needs, so drawing never reaches into shared UI state.
#[derive(Debug, Clone)]
pub enum Screen {
    Dashboard(DashboardViews),
    Records(RecordsState),
    Record(LearningRecord),
    Form(FormState),
}

impl Screen {
    pub fn menu_index(&self) -> Option<usize> {
        match self {
            Screen::Dashboard(_) => Some(0),
            Screen::Records(_) | Screen::Record(_) => Some(1),
            Screen::Form(FormState {
                mode: FormMode::Add,
                ..
            }) => Some(2),
            Screen::Form(_) => Some(1),
        }
    }
}

pub const MENU: [&str; 3] = ["Dashboard", "View Data", "Add Data"];

#[derive(Debug, Clone)]
pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        Self::with_selection(items, 0)
    }

    // Keeps the cursor near where it was, clamped to the new length
    fn with_selection(items: Vec<T>, index: usize) -> Self {
        let selected = if items.is_empty() {
            None
        } else {
            Some(index.min(items.len() - 1))
        };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

#[derive(Debug, Clone)]
pub struct RecordsState {
    pub list: StatefulList<LearningRecord>,
    pub pending_delete: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit(i64),
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub mode: FormMode,
    pub form: RecordForm,
    pub focused: usize,
}

impl FormState {
    fn add() -> Self {
        Self {
            mode: FormMode::Add,
            form: RecordForm::default(),
            focused: 0,
        }
    }

    fn edit(record: &LearningRecord) -> Self {
        Self {
            mode: FormMode::Edit(record.serial_no),
            form: RecordForm::from_record(record),
            focused: 1,
        }
    }

    // The key of an existing record cannot change
    pub fn is_locked(&self, index: usize) -> bool {
        index == 0 && matches!(self.mode, FormMode::Edit(_))
    }

    fn first_editable(&self) -> usize {
        if self.is_locked(0) {
            1
        } else {
            0
        }
    }

    fn focus_next(&mut self) {
        self.focused = if self.focused + 1 >= FIELD_COUNT {
            self.first_editable()
        } else {
            self.focused + 1
        };
    }

    fn focus_prev(&mut self) {
        self.focused = if self.focused <= self.first_editable() {
            FIELD_COUNT - 1
        } else {
            self.focused - 1
        };
    }

    fn push(&mut self, c: char) {
        if !self.is_locked(self.focused) {
            self.form.values[self.focused].push(c);
        }
    }

    fn pop(&mut self) {
        if !self.is_locked(self.focused) {
            self.form.values[self.focused].pop();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

pub struct App {
    store: RecordStore,
    pub screen: Screen,
    pub search_mode: bool,
    pub search_input: String,
    pub status: Option<Status>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: RecordStore) -> Result<Self, StorageError> {
        let records = store.fetch_all()?;
        Ok(Self {
            store,
            screen: Screen::Dashboard(DashboardViews::from_records(&records)),
            search_mode: false,
            search_input: String::new(),
            status: None,
            should_quit: false,
        })
    }

    fn show_dashboard(&mut self) -> Result<(), StorageError> {
        let records = self.store.fetch_all()?;
        self.screen = Screen::Dashboard(DashboardViews::from_records(&records));
        Ok(())
    }

    fn show_records(&mut self) -> Result<(), StorageError> {
        self.show_records_at(0)
    }

    fn show_records_at(&mut self, index: usize) -> Result<(), StorageError> {
        let records = self.store.fetch_all()?;
        self.screen = Screen::Records(RecordsState {
            list: StatefulList::with_selection(records, index),
            pending_delete: None,
        });
        Ok(())
    }

    fn show_record(&mut self, serial_no: i64) -> Result<(), StorageError> {
        match self.store.fetch_by_key(serial_no)? {
            Some(record) => self.screen = Screen::Record(record),
            None => {
                self.status = Some(Status::error(format!(
                    "No record found with Serial No {}.",
                    serial_no
                )))
            }
        }
        Ok(())
    }

    fn edit_record(&mut self, serial_no: i64) -> Result<(), StorageError> {
        match self.store.fetch_by_key(serial_no)? {
            Some(record) => self.screen = Screen::Form(FormState::edit(&record)),
            None => {
                self.status = Some(Status::error(format!(
                    "No record found with Serial No {}.",
                    serial_no
                )))
            }
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), StorageError> {
        debug!("Refreshing current screen");
        match &self.screen {
            Screen::Dashboard(_) => self.show_dashboard(),
            Screen::Records(state) => {
                let index = state.list.selected.unwrap_or(0);
                self.show_records_at(index)
            }
            Screen::Record(record) => {
                let serial_no = record.serial_no;
                match self.store.fetch_by_key(serial_no)? {
                    Some(record) => {
                        self.screen = Screen::Record(record);
                        Ok(())
                    }
                    None => {
                        self.show_records()?;
                        self.status = Some(Status::info(format!(
                            "Serial No {} no longer exists.",
                            serial_no
                        )));
                        Ok(())
                    }
                }
            }
            Screen::Form(_) => Ok(()),
        }
    }

    fn search(&mut self) -> Result<(), StorageError> {
        let input = self.search_input.trim().to_string();
        if input.is_empty() {
            self.status = Some(Status::error("Please enter a Serial No."));
            return Ok(());
        }
        match input.parse::<i64>() {
            Ok(serial_no) => self.show_record(serial_no),
            Err(_) => {
                self.status = Some(Status::error(format!(
                    "No record found with Serial No {}.",
                    input
                )));
                Ok(())
            }
        }
    }

    fn save_form(&mut self) -> Result<(), StorageError> {
        let Screen::Form(state) = &self.screen else {
            return Ok(());
        };
        let mode = state.mode;
        let record = match state.form.parse() {
            Ok(record) => record,
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
                return Ok(());
            }
        };

        match mode {
            FormMode::Add => {
                self.store.insert(&record)?;
                self.show_records()?;
                self.status = Some(Status::info(format!(
                    "Added record {}.",
                    record.serial_no
                )));
            }
            FormMode::Edit(serial_no) => {
                let rows = self.store.update(serial_no, &record.fields())?;
                self.show_records()?;
                self.status = Some(if rows == 0 {
                    Status::error(format!(
                        "No record found with Serial No {}; nothing was saved.",
                        serial_no
                    ))
                } else {
                    Status::info(format!("Saved changes to record {}.", serial_no))
                });
            }
        }
        Ok(())
    }

    fn confirm_delete(&mut self, serial_no: i64, index: usize) -> Result<(), StorageError> {
        let rows = self.store.delete(serial_no)?;
        self.show_records_at(index)?;
        self.status = Some(if rows == 0 {
            Status::info(format!("Serial No {} was already gone.", serial_no))
        } else {
            Status::info(format!("Deleted Serial No {}.", serial_no))
        });
        Ok(())
    }

    /// Storage and validation failures land in the status bar; they never end the session.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if let Err(e) = self.dispatch_key(key, modifiers) {
            self.status = Some(Status::error(e.to_string()));
        }
    }

    fn dispatch_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Result<(), StorageError> {
        if self.search_mode {
            match key {
                KeyCode::Esc => {
                    self.search_mode = false;
                    self.search_input.clear();
                }
                KeyCode::Enter => {
                    self.search_mode = false;
                    self.status = None;
                    self.search()?;
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                }
                KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => {}
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                }
                _ => {}
            }
            return Ok(());
        }

        if let Screen::Form(state) = &mut self.screen {
            match key {
                KeyCode::Esc => {
                    self.status = None;
                    return self.show_records();
                }
                KeyCode::Enter => return self.save_form(),
                KeyCode::Tab | KeyCode::Down => state.focus_next(),
                KeyCode::BackTab | KeyCode::Up => state.focus_prev(),
                KeyCode::Backspace => state.pop(),
                KeyCode::Char(_) if modifiers.contains(KeyModifiers::CONTROL) => {}
                KeyCode::Char(c) => state.push(c),
                _ => {}
            }
            return Ok(());
        }

        if let Screen::Records(state) = &mut self.screen {
            if let Some(serial_no) = state.pending_delete.take() {
                if key == KeyCode::Char('y') {
                    let index = state.list.selected.unwrap_or(0);
                    return self.confirm_delete(serial_no, index);
                }
                self.status = Some(Status::info("Delete cancelled."));
                return Ok(());
            }
        }

        self.status = None;

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => self.refresh()?,

            KeyCode::Char('1') => self.show_dashboard()?,
            KeyCode::Char('2') => self.show_records()?,
            KeyCode::Char('a') => self.screen = Screen::Form(FormState::add()),

            KeyCode::Char('/') => {
                self.search_mode = true;
                self.search_input.clear();
            }

            _ => match &mut self.screen {
                Screen::Records(state) => match key {
                    KeyCode::Char('j') | KeyCode::Down => state.list.next(),
                    KeyCode::Char('k') | KeyCode::Up => state.list.previous(),
                    KeyCode::Char('g') if !state.list.items.is_empty() => {
                        state.list.selected = Some(0);
                    }
                    KeyCode::Char('G') if !state.list.items.is_empty() => {
                        state.list.selected = Some(state.list.items.len() - 1);
                    }
                    KeyCode::Enter | KeyCode::Char('l') => {
                        if let Some(serial_no) = state.list.selected_item().map(|r| r.serial_no) {
                            self.show_record(serial_no)?;
                        } else {
                            self.status = Some(Status::error("No record selected!"));
                        }
                    }
                    KeyCode::Char('e') => {
                        if let Some(serial_no) = state.list.selected_item().map(|r| r.serial_no) {
                            self.edit_record(serial_no)?;
                        } else {
                            self.status = Some(Status::error("No record selected!"));
                        }
                    }
                    KeyCode::Char('d') => {
                        if let Some(serial_no) = state.list.selected_item().map(|r| r.serial_no) {
                            state.pending_delete = Some(serial_no);
                        } else {
                            self.status = Some(Status::error("No record selected!"));
                        }
                    }
                    _ => {}
                },
                Screen::Record(record) => match key {
                    KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left => self.show_records()?,
                    KeyCode::Char('e') => {
                        let serial_no = record.serial_no;
                        self.edit_record(serial_no)?;
                    }
                    _ => {}
                },
                Screen::Dashboard(_) | Screen::Form(_) => {}
            },
        }
        Ok(())
    }
}

pub fn run(store: RecordStore) -> Result<(), Box<dyn std::error::Error>> {
    // Load before touching the terminal so a bad database reports normally
    let mut app = App::new(store)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
