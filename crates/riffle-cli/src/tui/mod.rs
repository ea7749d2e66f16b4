//! Interactive TUI (Terminal User Interface) for Riffle.
//!
//! Provides debounced search-as-you-type over a loaded CSV:
//! - Keystrokes update the query immediately; matching fires only after the
//!   configured quiescence window
//! - Matches run on a worker thread; responses apply last-write-wins
//! - The status bar shows the synthesized location, mirroring what a web
//!   client would put in its address bar

use crate::app::App;
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use riffle_core::{search, sync::Location, Config, Query, QuerySession, RecordSet};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct MatchRequest {
    id: u64,
    query: Query,
}

struct MatchDone {
    id: u64,
    set: RecordSet,
    took: Duration,
}

/// TUI application state.
struct TuiApp {
    /// The main application
    app: App,

    /// Debounce, location, and response-application state
    session: QuerySession,

    /// Selected row index within the visible set
    selected: usize,

    /// Vertical scroll offset
    scroll_offset: usize,

    /// Whether we should quit
    should_quit: bool,

    /// Duration of the last applied match
    last_match_time: Duration,

    /// Match worker channels
    req_tx: Sender<MatchRequest>,
    done_rx: Receiver<MatchDone>,
}

impl TuiApp {
    fn new(app: App, seed_query: Option<String>) -> Self {
        let mut location = Location::new("/");
        if let Some(q) = &seed_query {
            location.apply(q);
        }

        let session = QuerySession::new(
            Arc::clone(&app.store),
            app.config.debounce_window(),
            location,
            Instant::now(),
        );

        // Spawn background match worker
        let (req_tx, req_rx) = unbounded::<MatchRequest>();
        let (done_tx, done_rx) = unbounded::<MatchDone>();
        let worker_store = Arc::clone(&app.store);
        let threshold = app.config.parallel_threshold();
        thread::spawn(move || {
            while let Ok(req) = req_rx.recv() {
                let start = Instant::now();
                let set = search::filter_with(&req.query, &worker_store.current(), threshold);
                let _ = done_tx.send(MatchDone {
                    id: req.id,
                    set,
                    took: start.elapsed(),
                });
            }
        });

        TuiApp {
            app,
            session,
            selected: 0,
            scroll_offset: 0,
            should_quit: false,
            last_match_time: Duration::ZERO,
            req_tx,
            done_rx,
        }
    }

    /// Advance debounce state and drain worker responses.
    fn tick(&mut self) {
        let now = Instant::now();

        if let Some(dispatch) = self.session.poll(now) {
            let _ = self.req_tx.send(MatchRequest {
                id: dispatch.id,
                query: dispatch.query,
            });
        }

        while let Ok(done) = self.done_rx.try_recv() {
            if self.session.apply_response(done.id, done.set) {
                self.last_match_time = done.took;
                self.selected = 0;
                self.scroll_offset = 0;
            }
        }

        // The visible set can also shrink on a local empty-query reset
        let len = self.session.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Handle input character.
    fn on_char(&mut self, c: char) {
        let mut query = self.session.input().to_string();
        query.push(c);
        self.session.on_input(query, Instant::now());
    }

    /// Handle backspace.
    fn on_backspace(&mut self) {
        let mut query = self.session.input().to_string();
        query.pop();
        self.session.on_input(query, Instant::now());
    }

    /// Move selection up.
    fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.ensure_visible();
        }
    }

    /// Move selection down.
    fn select_next(&mut self) {
        if self.selected + 1 < self.session.visible().len() {
            self.selected += 1;
            self.ensure_visible();
        }
    }

    /// Page up.
    fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
        self.ensure_visible();
    }

    /// Page down.
    fn page_down(&mut self, page_size: usize) {
        let len = self.session.visible().len();
        self.selected = (self.selected + page_size).min(len.saturating_sub(1));
        self.ensure_visible();
    }

    /// Ensure selected item is visible.
    fn ensure_visible(&mut self) {
        // This will be set properly based on visible area
        let visible_height = 20; // Approximate

        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + visible_height {
            self.scroll_offset = self.selected - visible_height + 1;
        }
    }
}

/// Run the TUI application.
pub fn run(config: Config, file: &Path, seed_query: Option<String>) -> anyhow::Result<()> {
    let app = App::new(config)?;
    app.load_file(file)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut tui_app = TuiApp::new(app, seed_query);

    // Main loop
    let result = run_loop(&mut terminal, &mut tui_app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop.
fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut TuiApp) -> anyhow::Result<()> {
    loop {
        app.tick();

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc => {
                            app.should_quit = true;
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.should_quit = true;
                        }
                        KeyCode::Char(c) => {
                            app.on_char(c);
                        }
                        KeyCode::Backspace => {
                            app.on_backspace();
                        }
                        KeyCode::Up => {
                            app.select_previous();
                        }
                        KeyCode::Down => {
                            app.select_next();
                        }
                        KeyCode::PageUp => {
                            let page = app.app.config.ui.page_size;
                            app.page_up(page);
                        }
                        KeyCode::PageDown => {
                            let page = app.app.config.ui.page_size;
                            app.page_down(page);
                        }
                        KeyCode::Home => {
                            app.selected = 0;
                            app.scroll_offset = 0;
                        }
                        KeyCode::End => {
                            let len = app.session.visible().len();
                            if len > 0 {
                                app.selected = len - 1;
                                app.ensure_visible();
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

mod ui {
    use super::*;

    /// Draw the UI.
    pub fn draw(f: &mut Frame, app: &mut TuiApp) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Search box
                Constraint::Min(10),   // Results
                Constraint::Length(2), // Status bar
            ])
            .split(f.area());

        draw_search_box(f, app, chunks[0]);
        draw_results(f, app, chunks[1]);
        draw_status_bar(f, app, chunks[2]);
    }

    /// Draw the search input box.
    fn draw_search_box(f: &mut Frame, app: &TuiApp, area: Rect) {
        let title = if app.session.is_pending() {
            " Search (waiting...) "
        } else {
            " Search (type to filter) "
        };

        let input = Paragraph::new(app.session.input())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(input, area);

        // Show cursor
        f.set_cursor_position(Position::new(
            area.x + app.session.input().len() as u16 + 1,
            area.y + 1,
        ));
    }

    /// Draw the results list.
    fn draw_results(f: &mut Frame, app: &mut TuiApp, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;

        // Update scroll offset based on visible height
        if app.selected >= app.scroll_offset + visible_height {
            app.scroll_offset = app.selected - visible_height + 1;
        }

        let set = Arc::clone(app.session.visible());
        let show_ids = app.app.config.ui.show_row_numbers;

        let items: Vec<ListItem> = set
            .records
            .iter()
            .skip(app.scroll_offset)
            .take(visible_height)
            .enumerate()
            .map(|(i, record)| {
                let row = record.values.join(" | ");
                let line = if show_ids {
                    format!("{:>6}  {}", record.id, row)
                } else {
                    row
                };

                let style = if i + app.scroll_offset == app.selected {
                    Style::default()
                        .bg(Color::Blue)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                ListItem::new(line).style(style)
            })
            .collect();

        let title = format!(
            " {} ({} of {} rows, {:.1}ms) ",
            set.fields.join(" | "),
            set.len(),
            app.app.store.len(),
            app.last_match_time.as_secs_f64() * 1000.0
        );

        let results = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

        f.render_widget(results, area);
    }

    /// Draw the status bar.
    fn draw_status_bar(f: &mut Frame, app: &TuiApp, area: Rect) {
        let status = format!(
            "{} | {} records, {} fields | ↑↓:Navigate PgUp/PgDn:Page Esc:Quit",
            app.session.location(),
            app.app.store.len(),
            app.app.store.current().field_count()
        );

        let status_bar = Paragraph::new(status).style(Style::default().fg(Color::Gray));

        f.render_widget(status_bar, area);
    }
}
