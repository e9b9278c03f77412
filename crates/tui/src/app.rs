use std::{cmp, io, panic, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use station_core::{Adjustment, CollectionKind, Repository, RepositoryResult};
use tokio::sync::mpsc;
use tracing::{error, info};

const TICK_RATE: Duration = Duration::from_millis(250);
const MAX_INPUT_LEN: usize = 64;

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    muted: Color,
    selection_bg: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            warning: Color::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptAction {
    Edit,
    Rename,
}

/// Single-line editor over a record value. `cursor` counts chars, not bytes.
#[derive(Debug, Clone)]
struct PromptModal {
    action: PromptAction,
    kind: CollectionKind,
    key: String,
    input: String,
    cursor: usize,
}

impl PromptModal {
    fn new(action: PromptAction, kind: CollectionKind, key: String, initial: String) -> Self {
        let cursor = initial.chars().count();
        Self {
            action,
            kind,
            key,
            input: initial,
            cursor,
        }
    }

    fn title(&self) -> String {
        match self.action {
            PromptAction::Edit => format!("Edit {} of {}", edit_label(self.kind), self.key),
            PromptAction::Rename => format!("Rename {}", self.key),
        }
    }

    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    /// Byte offset of the char at position `index`, or the end of input.
    fn byte_offset(&self, index: usize) -> usize {
        self.input
            .char_indices()
            .nth(index)
            .map_or(self.input.len(), |(offset, _)| offset)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.char_count() as isize;
        let next = (self.cursor as isize + delta).clamp(0, len);
        self.cursor = next as usize;
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    fn insert(&mut self, ch: char) {
        if ch.is_control() || self.char_count() >= MAX_INPUT_LEN {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.input.insert(offset, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        if offset < self.input.len() {
            self.input.remove(offset);
        }
    }

    fn delete(&mut self) {
        let offset = self.byte_offset(self.cursor);
        if offset < self.input.len() {
            self.input.remove(offset);
        }
    }

    fn value(&self) -> &str {
        self.input.trim()
    }
}

/// Label of the field `e` edits in each collection.
fn edit_label(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Workers => "seniority",
        CollectionKind::TrainTimetables => "ticket price",
        CollectionKind::Trains => "number of carriages",
        CollectionKind::TrainBrigades => "brigade number",
        CollectionKind::TicketSalesSheets => "number of tickets",
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Terminal browser over the station registry.
pub struct StationApp {
    repository: Repository,
    state: UiState,
    prompt: Option<PromptModal>,
    theme: Theme,
}

impl StationApp {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            state: UiState::default(),
            prompt: None,
            theme: Theme::default(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        self.repository.rewind();
        self.refresh_keys();
        self.state.set_status(format!(
            "Loaded {} from {}",
            self.collection_summary(),
            self.repository.snapshot_path().display()
        ));

        install_panic_hook();
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }
            let maybe_event = event_rx.recv().await;
            if !self.process_app_event(maybe_event) {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                let result = if self.prompt.is_some() {
                    self.handle_prompt_key(key)
                } else {
                    self.handle_key(key)
                };
                if let Err(err) = result {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn collection_summary(&self) -> String {
        self.repository
            .collections()
            .map(|(kind, len)| format!("{len} {}", kind.title().to_lowercase()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn refresh_keys(&mut self) {
        let kind = self.repository.current_collection();
        self.state.set_keys(self.repository.keys(kind));
    }

    fn switch_collection(&mut self, forward: bool) {
        let moved = if forward {
            self.repository.next_collection()
        } else {
            self.repository.prev_collection()
        };
        match moved {
            Some(kind) => {
                self.state.reset_cursor();
                self.refresh_keys();
                self.state
                    .set_status(format!("{}: {} entries", kind.title(), self.state.keys.len()));
            }
            None if forward => self.state.set_status("Already at the last collection".to_string()),
            None => self.state.set_status("Already at the first collection".to_string()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.state.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.should_quit = true
            }
            KeyCode::Tab | KeyCode::Right => self.switch_collection(true),
            KeyCode::BackTab | KeyCode::Left => self.switch_collection(false),
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to(usize::MAX),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('e') => self.open_prompt(PromptAction::Edit),
            KeyCode::Char('r') => self.open_prompt(PromptAction::Rename),
            KeyCode::Char('R') => self.reload()?,
            KeyCode::Char('+') => self.adjust_selected(Adjustment::Add(1)),
            KeyCode::Char('-') => self.adjust_selected(Adjustment::Sub(1)),
            _ => {}
        }
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.repository.reload()?;
        self.refresh_keys();
        info!("Registry reloaded from disk");
        self.state
            .set_status(format!("Reloaded {}", self.collection_summary()));
        Ok(())
    }

    fn delete_selected(&mut self) {
        let Some(key) = self.state.current_key().map(str::to_string) else {
            self.state.set_status("Nothing to delete".to_string());
            return;
        };
        let kind = self.repository.current_collection();
        match self.repository.delete(kind, &key) {
            Ok(()) => {
                self.refresh_keys();
                self.state.set_status(format!("Deleted {key} from {}", kind.title()));
            }
            Err(err) => self.report_failure("Delete", err),
        }
    }

    fn adjust_selected(&mut self, adjustment: Adjustment) {
        let Some(key) = self.state.current_key().map(str::to_string) else {
            self.state.set_status("No entry selected".to_string());
            return;
        };
        let kind = self.repository.current_collection();
        let result = match kind {
            CollectionKind::Workers => self.repository.adjust_worker_seniority(&key, adjustment),
            CollectionKind::TrainTimetables => self.repository.adjust_ticket_price(&key, adjustment),
            CollectionKind::Trains => self.repository.adjust_number_of_carriages(&key, adjustment),
            CollectionKind::TrainBrigades => {
                self.state
                    .set_status("Brigade numbers change with e or r".to_string());
                return;
            }
            CollectionKind::TicketSalesSheets => {
                self.repository.adjust_number_of_tickets(&key, adjustment)
            }
        };
        match result {
            Ok(value) => self.state.set_status(format!(
                "{} of {key} is now {value}",
                edit_label(kind)
            )),
            Err(err) => self.report_failure(&format!("Adjust {}", edit_label(kind)), err),
        }
    }

    fn open_prompt(&mut self, action: PromptAction) {
        let Some(key) = self.state.current_key().map(str::to_string) else {
            self.state.set_status("No entry selected".to_string());
            return;
        };
        let kind = self.repository.current_collection();
        if action == PromptAction::Rename
            && !matches!(kind, CollectionKind::Workers | CollectionKind::TrainBrigades)
        {
            self.state
                .set_status(format!("Keys of {} cannot be renamed", kind.title()));
            return;
        }
        let initial = match (action, kind) {
            (PromptAction::Rename, _) | (PromptAction::Edit, CollectionKind::TrainBrigades) => {
                key.clone()
            }
            (PromptAction::Edit, _) => self.current_value(kind, &key).unwrap_or_default(),
        };
        self.prompt = Some(PromptModal::new(action, kind, key, initial));
    }

    fn current_value(&self, kind: CollectionKind, key: &str) -> Option<String> {
        let value = match kind {
            CollectionKind::Workers => self.repository.worker(key)?.read().seniority(),
            CollectionKind::TrainTimetables => {
                self.repository.train_timetable(key)?.read().ticket_price()?
            }
            CollectionKind::Trains => self.repository.train(key)?.read().carriages()?,
            CollectionKind::TrainBrigades => return Some(key.to_string()),
            CollectionKind::TicketSalesSheets => {
                self.repository.ticket_sales_sheet(key)?.read().tickets()
            }
        };
        Some(value.to_string())
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                self.state.set_status("Cancelled".to_string());
                return Ok(());
            }
            KeyCode::Enter => {
                if let Some(prompt) = self.prompt.take() {
                    self.apply_prompt(prompt);
                }
                return Ok(());
            }
            _ => {}
        }

        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Left => prompt.move_cursor(-1),
            KeyCode::Right => prompt.move_cursor(1),
            KeyCode::Home => prompt.move_home(),
            KeyCode::End => prompt.move_end(),
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Delete => prompt.delete(),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    prompt.insert(ch);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_prompt(&mut self, prompt: PromptModal) {
        let value = prompt.value();
        let key = prompt.key.as_str();
        let result = match (prompt.action, prompt.kind) {
            (PromptAction::Rename, CollectionKind::Workers) => {
                self.repository.rename_worker(key, value)
            }
            (_, CollectionKind::TrainBrigades) => self.repository.change_brigade_number(key, value),
            (PromptAction::Edit, kind) => self.apply_edit(kind, key, value),
            (PromptAction::Rename, kind) => {
                self.state
                    .set_status(format!("Keys of {} cannot be renamed", kind.title()));
                return;
            }
        };
        match result {
            Ok(()) => {
                self.refresh_keys();
                let selected = match prompt.action {
                    PromptAction::Rename => value,
                    PromptAction::Edit if prompt.kind == CollectionKind::TrainBrigades => value,
                    PromptAction::Edit => key,
                };
                self.state.select_key(selected);
                self.state.set_status(format!("Updated {}", prompt.title().to_lowercase()));
            }
            Err(err) => self.report_failure(&prompt.title(), err),
        }
    }

    fn apply_edit(&mut self, kind: CollectionKind, key: &str, value: &str) -> RepositoryResult<()> {
        match kind {
            CollectionKind::Workers => self.repository.change_worker_seniority(key, value),
            CollectionKind::TrainTimetables => self.repository.change_ticket_price(key, value),
            CollectionKind::Trains => self.repository.change_number_of_carriages(key, value),
            CollectionKind::TrainBrigades => self.repository.change_brigade_number(key, value),
            CollectionKind::TicketSalesSheets => {
                self.repository.change_number_of_tickets(key, value)
            }
        }
    }

    fn report_failure(&mut self, action: &str, err: station_core::RepositoryError) {
        error!(?err, action, "Registry operation failed");
        self.state.set_status(format!("{action} failed: {err}"));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_tabs(frame, chunks[0]);
        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(chunks[1]);
        self.render_key_list(frame, body_chunks[0]);
        self.render_details(frame, body_chunks[1]);
        self.render_status(frame, chunks[2]);

        if let Some(prompt) = &self.prompt {
            self.render_prompt(frame, prompt);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = self
            .repository
            .collections()
            .map(|(kind, len)| Line::from(format!("{} ({len})", kind.title())))
            .collect();
        let current = self.repository.current_collection();
        let selected = CollectionKind::ALL
            .iter()
            .position(|kind| *kind == current)
            .unwrap_or_default();
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Station registry"))
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_key_list(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(2) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let mut list_state = ListState::default();
        let keys = self.state.visible_keys();
        if !keys.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(keys.len().saturating_sub(1));
            list_state.select(Some(selected));
        }
        let items: Vec<ListItem> = keys
            .iter()
            .enumerate()
            .map(|(idx, key)| {
                let is_selected = self.state.cursor == self.state.offset + idx;
                let marker = if is_selected {
                    Span::styled(
                        "▶ ",
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw("  ")
                };
                ListItem::new(Line::from(vec![marker, Span::raw(key.clone())]))
            })
            .collect();

        let title = self.repository.current_collection().title();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let kind = self.repository.current_collection();
        let summary = self
            .state
            .current_key()
            .and_then(|key| self.repository.describe(kind, key));
        let Some(summary) = summary else {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "No entries",
                Style::default().fg(self.theme.muted),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let lines: Vec<Line> = summary
            .split('\t')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once(": ") {
                Some((label, value)) => Line::from(vec![
                    Span::styled(
                        format!("{label}: "),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value.to_string()),
                ]),
                None => Line::from(part.to_string()),
            })
            .collect();
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let help = Line::from(Span::styled(
            "Tab/Shift+Tab collections  j/k move  e edit  +/- adjust  r rename  d delete  R reload  q quit",
            Style::default().fg(self.theme.muted),
        ));
        let paragraph = Paragraph::new(vec![Line::from(self.state.status.clone()), help])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_prompt(&self, frame: &mut Frame, prompt: &PromptModal) {
        let frame_area = frame.size();
        let mut width = cmp::min(60_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = 6_u16.min(frame_area.height.saturating_sub(2)).max(5_u16);
        let x = frame_area.x + (frame_area.width.saturating_sub(width)) / 2;
        let y = frame_area.y + (frame_area.height.saturating_sub(height)) / 2;
        let area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, area);

        let input_line = Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(prompt.input.clone()),
        ]);
        let helper = Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" apply  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]);
        let hint = Line::from(Span::styled(
            "Non-negative integers only",
            Style::default().fg(self.theme.warning),
        ));
        let mut lines = vec![input_line, Line::from(""), helper];
        if prompt.action == PromptAction::Edit || prompt.kind == CollectionKind::TrainBrigades {
            lines.push(hint);
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(prompt.title()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);

        let cursor_x =
            (area.x + 3 + prompt.cursor as u16).min(area.x + area.width.saturating_sub(2));
        frame.set_cursor(cursor_x, area.y + 1);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leave raw mode and the alternate screen before the panic message prints.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        previous(info);
    }));
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    keys: Vec<String>,
    cursor: usize,
    offset: usize,
    list_height: usize,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            status: format!("Ready ({})", Local::now().format("%H:%M")),
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_keys(&mut self, keys: Vec<String>) {
        self.keys = keys;
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.keys.is_empty() {
            return;
        }
        let last = self.keys.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.keys.is_empty() {
            return;
        }
        self.cursor = index.min(self.keys.len() - 1);
        self.ensure_cursor_visible();
    }

    fn select_key(&mut self, key: &str) {
        if let Some(pos) = self.keys.iter().position(|candidate| candidate == key) {
            self.move_to(pos);
        }
    }

    fn visible_keys(&self) -> &[String] {
        if self.keys.is_empty() {
            return &[];
        }
        let end = (self.offset + self.list_height).min(self.keys.len());
        &self.keys[self.offset..end]
    }

    fn current_key(&self) -> Option<&str> {
        self.keys.get(self.cursor).map(String::as_str)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.keys.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.keys.len() {
            self.cursor = self.keys.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.keys.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.keys.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(count: usize, height: usize) -> UiState {
        let mut state = UiState {
            list_height: height,
            ..UiState::default()
        };
        state.set_keys((0..count).map(|idx| format!("key{idx}")).collect());
        state
    }

    #[test]
    fn cursor_scrolls_within_bounds() {
        let mut state = state_with(10, 3);
        state.move_cursor(5);
        assert_eq!(state.cursor, 5);
        assert_eq!(state.offset, 3);
        state.move_cursor(100);
        assert_eq!(state.current_key(), Some("key9"));
        assert_eq!(state.visible_keys(), ["key7", "key8", "key9"]);
        state.move_cursor(-100);
        assert_eq!((state.cursor, state.offset), (0, 0));
    }

    #[test]
    fn shrinking_key_list_clamps_cursor() {
        let mut state = state_with(5, 10);
        state.move_to(4);
        state.set_keys(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(state.current_key(), Some("b"));
        state.set_keys(Vec::new());
        assert_eq!(state.current_key(), None);
    }

    #[test]
    fn prompt_edits_at_cursor() {
        let mut prompt = PromptModal::new(
            PromptAction::Edit,
            CollectionKind::Trains,
            "42".to_string(),
            "12".to_string(),
        );
        prompt.move_home();
        prompt.insert('1');
        prompt.move_end();
        prompt.backspace();
        assert_eq!(prompt.value(), "11");
        prompt.move_cursor(-10);
        prompt.delete();
        assert_eq!(prompt.value(), "1");
        assert_eq!(prompt.title(), "Edit number of carriages of 42");
    }

    #[test]
    fn prompt_edits_cyrillic_names() {
        let mut prompt = PromptModal::new(
            PromptAction::Rename,
            CollectionKind::Workers,
            "Иван".to_string(),
            "Иван".to_string(),
        );
        assert_eq!(prompt.cursor, 4);
        prompt.backspace();
        assert_eq!(prompt.value(), "Ива");
        prompt.move_cursor(-1);
        prompt.delete();
        assert_eq!(prompt.value(), "Ив");
        prompt.insert('я');
        assert_eq!(prompt.value(), "Ивя");
        prompt.move_home();
        prompt.move_cursor(1);
        prompt.insert('ё');
        prompt.insert('\u{7}');
        assert_eq!(prompt.value(), "Иёвя");
        assert_eq!(prompt.cursor, 2);
        prompt.move_end();
        prompt.delete();
        assert_eq!(prompt.value(), "Иёвя");
        assert_eq!(prompt.title(), "Rename Иван");
    }
}
