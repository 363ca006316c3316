use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::api::{DirectoryClient, FetchError};
use crate::bookmarks::BookmarkStore;
use crate::directory::{Directory, DirectoryError, Field, ValidationErrors};
use crate::filter::DirectoryView;
use crate::models::{Employee, NewEmployee};
use crate::profile::stars;
use crate::truncate;

const FORM_FIELDS: [Field; 5] = [
    Field::FirstName,
    Field::LastName,
    Field::Email,
    Field::Department,
    Field::Rating,
];

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Default)]
struct AddForm {
    input: NewEmployee,
    focus: usize,
    errors: ValidationErrors,
}

impl AddForm {
    fn new() -> Self {
        Self {
            input: NewEmployee {
                rating: 3,
                ..NewEmployee::default()
            },
            ..Self::default()
        }
    }

    fn focused(&self) -> Field {
        FORM_FIELDS[self.focus]
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focused() {
            Field::FirstName => Some(&mut self.input.first_name),
            Field::LastName => Some(&mut self.input.last_name),
            Field::Email => Some(&mut self.input.email),
            Field::Department => Some(&mut self.input.department),
            Field::Rating => None,
        }
    }

    fn value(&self, field: Field) -> String {
        match field {
            Field::FirstName => self.input.first_name.clone(),
            Field::LastName => self.input.last_name.clone(),
            Field::Email => self.input.email.clone(),
            Field::Department => self.input.department.clone(),
            Field::Rating => format!("{} {}", self.input.rating, stars(self.input.rating)),
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Browse,
    Search,
    Departments { cursor: usize },
    Ratings { cursor: usize },
    Bookmarks { cursor: usize },
    Add(AddForm),
}

#[derive(Debug, PartialEq)]
enum Action {
    None,
    Quit,
    Retry,
}

struct AppState<'a> {
    directory: Directory,
    bookmarks: BookmarkStore<'a>,
    view: DirectoryView,
    load: LoadState,
    mode: Mode,
    selected: usize,
    message: Option<String>,
}

impl<'a> AppState<'a> {
    fn new(bookmarks: BookmarkStore<'a>, page_size: usize) -> Self {
        Self {
            directory: Directory::new(),
            bookmarks,
            view: DirectoryView::new(page_size),
            load: LoadState::Loading,
            mode: Mode::Browse,
            selected: 0,
            message: None,
        }
    }

    fn apply_fetch(&mut self, result: Result<Vec<Employee>, FetchError>) {
        match result {
            Ok(employees) => match self.directory.initialize(employees) {
                Ok(()) | Err(DirectoryError::AlreadyInitialized) => {
                    self.load = LoadState::Loaded;
                    self.message = None;
                }
                Err(e) => self.load = LoadState::Failed(e.to_string()),
            },
            Err(e) => {
                log::debug!("Failed to fetch employees: {}", e);
                self.load = LoadState::Failed(e.to_string());
            }
        }
        self.clamp_selection();
    }

    fn page(&self) -> Vec<&Employee> {
        self.view.current_page(self.directory.list())
    }

    fn current_employee(&self) -> Option<&Employee> {
        match &self.mode {
            Mode::Bookmarks { cursor } => self.bookmarks.list().get(*cursor),
            _ => self.page().get(self.selected).copied(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.page().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn toggle_bookmark(&mut self) {
        let Some(employee) = self.current_employee().cloned() else { return };
        match self.bookmarks.toggle(&employee) {
            Ok(true) => self.message = Some(format!("Bookmarked {}", employee.full_name())),
            Ok(false) => self.message = Some(format!("Removed bookmark for {}", employee.full_name())),
            Err(e) => self.message = Some(format!("Could not save bookmarks: {:#}", e)),
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        self.message = None;
        let mode = std::mem::replace(&mut self.mode, Mode::Browse);
        let (next, action) = match mode {
            Mode::Browse => self.browse_key(code),
            Mode::Search => self.search_key(code),
            Mode::Departments { cursor } => self.departments_key(code, cursor),
            Mode::Ratings { cursor } => self.ratings_key(code, cursor),
            Mode::Bookmarks { cursor } => self.bookmarks_key(code, cursor),
            Mode::Add(form) => self.add_key(code, form),
        };
        self.mode = next;
        self.clamp_selection();
        action
    }

    fn browse_key(&mut self, code: KeyCode) -> (Mode, Action) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return (Mode::Browse, Action::Quit),
            KeyCode::Char('R') if matches!(self.load, LoadState::Failed(_)) => {
                return (Mode::Browse, Action::Retry);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.page().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('n') => {
                self.view.next_page(self.directory.list());
                self.selected = 0;
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.view.prev_page();
                self.selected = 0;
            }
            KeyCode::Char('/') => return (Mode::Search, Action::None),
            KeyCode::Char('d') => return (Mode::Departments { cursor: 0 }, Action::None),
            KeyCode::Char('r') => return (Mode::Ratings { cursor: 0 }, Action::None),
            KeyCode::Char('B') => return (Mode::Bookmarks { cursor: 0 }, Action::None),
            KeyCode::Char('a') => return (Mode::Add(AddForm::new()), Action::None),
            KeyCode::Char('b') | KeyCode::Char(' ') => self.toggle_bookmark(),
            KeyCode::Char('c') => {
                self.view.clear();
                self.selected = 0;
            }
            _ => {}
        }
        (Mode::Browse, Action::None)
    }

    fn search_key(&mut self, code: KeyCode) -> (Mode, Action) {
        let mut search = self.view.criteria().search.clone();
        match code {
            KeyCode::Enter | KeyCode::Esc => return (Mode::Browse, Action::None),
            KeyCode::Backspace => {
                search.pop();
            }
            KeyCode::Char(c) => search.push(c),
            _ => {}
        }
        self.view.set_search(search);
        self.selected = 0;
        (Mode::Search, Action::None)
    }

    fn departments_key(&mut self, code: KeyCode, cursor: usize) -> (Mode, Action) {
        let departments = self.directory.departments();
        let cursor = match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return (Mode::Browse, Action::None),
            KeyCode::Down | KeyCode::Char('j') => (cursor + 1).min(departments.len().saturating_sub(1)),
            KeyCode::Up | KeyCode::Char('k') => cursor.saturating_sub(1),
            KeyCode::Char(' ') => {
                if let Some(department) = departments.get(cursor) {
                    self.view.toggle_department(department);
                    self.selected = 0;
                }
                cursor
            }
            _ => cursor,
        };
        (Mode::Departments { cursor }, Action::None)
    }

    fn ratings_key(&mut self, code: KeyCode, cursor: usize) -> (Mode, Action) {
        let cursor = match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => return (Mode::Browse, Action::None),
            KeyCode::Down | KeyCode::Char('j') => (cursor + 1).min(4),
            KeyCode::Up | KeyCode::Char('k') => cursor.saturating_sub(1),
            KeyCode::Char(' ') => {
                self.view.toggle_rating(cursor as u8 + 1);
                self.selected = 0;
                cursor
            }
            KeyCode::Char(c @ '1'..='5') => {
                self.view.toggle_rating(c as u8 - b'0');
                self.selected = 0;
                cursor
            }
            _ => cursor,
        };
        (Mode::Ratings { cursor }, Action::None)
    }

    fn bookmarks_key(&mut self, code: KeyCode, cursor: usize) -> (Mode, Action) {
        let cursor = match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('B') => return (Mode::Browse, Action::None),
            KeyCode::Down | KeyCode::Char('j') => (cursor + 1).min(self.bookmarks.len().saturating_sub(1)),
            KeyCode::Up | KeyCode::Char('k') => cursor.saturating_sub(1),
            KeyCode::Char('x') | KeyCode::Char('b') | KeyCode::Delete => {
                self.mode = Mode::Bookmarks { cursor };
                self.toggle_bookmark();
                cursor.min(self.bookmarks.len().saturating_sub(1))
            }
            _ => cursor,
        };
        (Mode::Bookmarks { cursor }, Action::None)
    }

    fn add_key(&mut self, code: KeyCode, mut form: AddForm) -> (Mode, Action) {
        match code {
            KeyCode::Esc => return (Mode::Browse, Action::None),
            KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % FORM_FIELDS.len(),
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = (form.focus + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
            }
            KeyCode::Left if form.focused() == Field::Rating => {
                form.input.rating = form.input.rating.saturating_sub(1).max(1);
            }
            KeyCode::Right if form.focused() == Field::Rating => {
                form.input.rating = (form.input.rating + 1).min(5);
            }
            KeyCode::Backspace => {
                if let Some(text) = form.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.text_mut() {
                    text.push(c);
                } else if let Some(rating) = c.to_digit(10).filter(|d| (1..=5).contains(d)) {
                    form.input.rating = rating as u8;
                }
            }
            KeyCode::Enter => match self.directory.add(form.input.clone()) {
                Ok(employee) => {
                    self.message = Some(format!("Added {} (#{})", employee.full_name(), employee.id));
                    self.view.clear();
                    self.selected = 0;
                    return (Mode::Browse, Action::None);
                }
                Err(DirectoryError::Invalid(errors)) => form.errors = errors,
                Err(e) => self.message = Some(e.to_string()),
            },
            _ => {}
        }
        (Mode::Add(form), Action::None)
    }
}

pub fn run_browse(client: &DirectoryClient, limit: usize, bookmarks: BookmarkStore, page_size: usize) -> Result<()> {
    let mut state = AppState::new(bookmarks, page_size);
    state.apply_fetch(client.fetch_employees(limit));

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, client, limit);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    client: &DirectoryClient,
    limit: usize,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match state.handle_key(key.code) {
                Action::Quit => break,
                Action::Retry => {
                    state.message = Some("Retrying...".to_string());
                    terminal.draw(|frame| draw(frame, state, &mut list_state))?;
                    state.apply_fetch(client.fetch_employees(limit));
                }
                Action::None => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    frame.render_widget(build_header(state), rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    if let Mode::Bookmarks { cursor } = &state.mode {
        draw_bookmarks(frame, state, *cursor, chunks[0]);
    } else {
        draw_directory(frame, state, list_state, chunks[0]);
    }

    let detail = Paragraph::new(build_detail(state))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, chunks[1]);

    let footer = match (&state.message, &state.mode) {
        (Some(msg), Mode::Browse) => msg.clone(),
        (_, Mode::Browse) => {
            " j/k:move n/p:page /:search d:dept r:rating c:clear b:bookmark B:bookmarks a:add q:quit".to_string()
        }
        (_, Mode::Search) => " type to search, Enter/Esc: done".to_string(),
        (_, Mode::Departments { .. }) | (_, Mode::Ratings { .. }) => {
            " j/k:move space:toggle Enter/Esc:close".to_string()
        }
        (_, Mode::Bookmarks { .. }) => " j/k:move x:remove Esc:back".to_string(),
        (_, Mode::Add(_)) => " Tab:next field  Left/Right:rating  Enter:save  Esc:cancel".to_string(),
    };
    frame.render_widget(
        Paragraph::new(footer).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );

    match &state.mode {
        Mode::Departments { cursor } => draw_departments(frame, state, *cursor),
        Mode::Ratings { cursor } => draw_ratings(frame, state, *cursor),
        Mode::Add(form) => draw_add_form(frame, form),
        _ => {}
    }
}

fn build_header(state: &AppState) -> Paragraph<'static> {
    let criteria = state.view.criteria();
    let search_style = if matches!(state.mode, Mode::Search) {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let departments = if criteria.departments.is_empty() {
        "all".to_string()
    } else {
        criteria.departments.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    let ratings = if criteria.ratings.is_empty() {
        "all".to_string()
    } else {
        criteria.ratings.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(",")
    };

    let line = Line::from(vec![
        Span::styled(format!("Search: {}", criteria.search), search_style),
        Span::raw(format!("   Dept: {}   Rating: {}", departments, ratings)),
    ]);
    let title = if criteria.is_empty() {
        " Employee Directory "
    } else {
        " Employee Directory (filtered, c to clear) "
    };
    Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title))
}

fn draw_directory(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let filtered = state.view.filtered(state.directory.list()).len();
    let pager = state.view.pager();
    let title = format!(
        " {} of {} employees | page {}/{} ",
        filtered,
        state.directory.len(),
        pager.current(),
        pager.total_pages(filtered).max(1)
    );

    let items: Vec<ListItem> = if state.load == LoadState::Loading {
        vec![ListItem::new("Loading employees...")]
    } else if let LoadState::Failed(reason) = &state.load {
        vec![
            ListItem::new(Span::styled(reason.clone(), Style::default().fg(Color::Red))),
            ListItem::new("Press R to retry"),
        ]
    } else if state.directory.is_empty() {
        vec![ListItem::new("No employees available")]
    } else {
        let page = state.page();
        if page.is_empty() {
            vec![ListItem::new("No employees found. Try adjusting your search or filters (c clears).")]
        } else {
            page.iter().map(|e| employee_item(state, e)).collect()
        }
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, list_state);
}

fn employee_item<'a>(state: &AppState, employee: &Employee) -> ListItem<'a> {
    let marker = if state.bookmarks.is_bookmarked(employee.id) { "+" } else { " " };
    ListItem::new(format!(
        "{} {} {:<22} {}",
        marker,
        stars(employee.rating()),
        truncate(&employee.full_name(), 22),
        employee.department
    ))
}

fn draw_bookmarks(frame: &mut Frame, state: &AppState, cursor: usize, area: Rect) {
    let items: Vec<ListItem> = if state.bookmarks.is_empty() {
        vec![ListItem::new("No bookmarks yet")]
    } else {
        state
            .bookmarks
            .list()
            .iter()
            .map(|e| ListItem::new(format!("#{:<5} {} | {}", e.id, e.full_name(), e.department)))
            .collect()
    };
    let mut list_state = ListState::default();
    list_state.select(Some(cursor));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(" Bookmarks ({}) ", state.bookmarks.len())))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn build_detail(state: &AppState) -> Text<'static> {
    let Some(employee) = state.current_employee() else {
        return Text::raw("No employee selected");
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        employee.full_name(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(title) = &employee.title {
        lines.push(Line::from(title.clone()));
    }
    lines.push(Line::from(format!("Email: {}", employee.email)));
    lines.push(Line::from(format!("Department: {}", employee.department)));
    if let Some(age) = employee.age {
        lines.push(Line::from(format!("Age: {}", age)));
    }
    if let Some(phone) = &employee.phone {
        lines.push(Line::from(format!("Phone: {}", phone)));
    }

    let rating = employee.rating();
    let rating_color = match rating {
        4..=5 => Color::Green,
        3 => Color::Yellow,
        _ => Color::Red,
    };
    lines.push(Line::from(Span::styled(
        format!("Rating: {} ({}/5)", stars(rating), rating),
        Style::default().fg(rating_color),
    )));
    lines.push(Line::from(""));

    let bookmark = if state.bookmarks.is_bookmarked(employee.id) {
        "Bookmarked (b to remove)"
    } else {
        "Not bookmarked (b to add)"
    };
    lines.push(Line::from(Span::styled(bookmark, Style::default().fg(Color::Cyan))));

    Text::from(lines)
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_departments(frame: &mut Frame, state: &AppState, cursor: usize) {
    let departments = state.directory.departments();
    let selected = &state.view.criteria().departments;
    let items: Vec<ListItem> = if departments.is_empty() {
        vec![ListItem::new("No departments available")]
    } else {
        departments
            .iter()
            .map(|d| {
                let mark = if selected.contains(d) { "[x]" } else { "[ ]" };
                ListItem::new(format!("{} {}", mark, d))
            })
            .collect()
    };
    let area = popup_area(frame.area(), 40, departments.len() as u16 + 2);
    let mut list_state = ListState::default();
    list_state.select(Some(cursor));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(" Departments ({}) ", departments.len())))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_ratings(frame: &mut Frame, state: &AppState, cursor: usize) {
    let selected = &state.view.criteria().ratings;
    let items: Vec<ListItem> = (1..=5u8)
        .map(|r| {
            let mark = if selected.contains(&r) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{} {}", mark, stars(r)))
        })
        .collect();
    let area = popup_area(frame.area(), 24, 7);
    let mut list_state = ListState::default();
    list_state.select(Some(cursor));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Ratings "))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_add_form(frame: &mut Frame, form: &AddForm) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in FORM_FIELDS.iter().enumerate() {
        let style = if i == form.focus {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:>11}: ", field.label()), style),
            Span::raw(form.value(*field)),
        ]));
        if let Some(err) = form.errors.get(*field) {
            lines.push(Line::from(Span::styled(
                format!("{:>13}{}", "", err),
                Style::default().fg(Color::Red),
            )));
        }
    }
    let area = popup_area(frame.area(), 60, lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" New Employee ")),
        area,
    );
}
