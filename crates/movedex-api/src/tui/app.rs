//! Main application state and event loop

use super::input::{InputChange, TextInput};
use super::loader::{spawn_index_loader, IndexLoaded};
use super::ui;
use crate::client::{MoveApi, PokeApiClient};
use crate::coordinator::RequestCoordinator;
use crate::debounce::{Debouncer, INPUT_DEBOUNCE};
use crate::index::NameIndex;
use crate::nav::{NavKey, NavOutcome, SuggestionBox};
use crate::suggest::suggest;
use anyhow::Result;
use crossterm::{
    cursor::SetCursorStyle,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Toast notification state
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
    pub is_error: bool,
}

impl Toast {
    pub fn new(message: String, now: Instant, duration: Duration) -> Self {
        Self {
            message,
            expires_at: now + duration,
            is_error: false,
        }
    }

    pub fn error(message: String, now: Instant, duration: Duration) -> Self {
        Self {
            message,
            expires_at: now + duration,
            is_error: true,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Name index lifecycle. Search is disabled unless `Ready`.
pub enum IndexState {
    Loading { started_at: Instant },
    Ready(NameIndex),
    Failed(String),
}

impl IndexState {
    pub fn index(&self) -> Option<&NameIndex> {
        match self {
            IndexState::Ready(index) => Some(index),
            _ => None,
        }
    }
}

/// Application state
pub struct App {
    /// Search input
    pub search_input: TextInput,
    /// Suggestions and keyboard focus
    pub suggestions: SuggestionBox,
    pub index_state: IndexState,
    /// Session lifecycle and the result area
    pub coordinator: RequestCoordinator,
    pub should_quit: bool,
    pub toast: Option<Toast>,
    /// Where the last frame drew the suggestion rows (for mouse clicks)
    pub suggestions_area: Option<Rect>,
    /// When the current lookup started (drives the spinner)
    pub session_started: Option<Instant>,
    /// First visible line of the results panel
    pub results_scroll: u16,
    /// Largest useful `results_scroll` for the last frame drawn
    pub results_max_scroll: u16,
    debouncer: Debouncer<String>,
    api: Arc<dyn MoveApi>,
    load_attempt: u64,
    index_tx: Sender<IndexLoaded>,
    index_rx: Receiver<IndexLoaded>,
}

fn nav_key(code: KeyCode) -> Option<NavKey> {
    match code {
        KeyCode::Up => Some(NavKey::Up),
        KeyCode::Down => Some(NavKey::Down),
        KeyCode::Enter => Some(NavKey::Enter),
        KeyCode::Esc => Some(NavKey::Escape),
        _ => None,
    }
}

impl App {
    pub fn new(api: Arc<dyn MoveApi>) -> Result<Self> {
        let (index_tx, index_rx) = mpsc::channel();
        let coordinator = RequestCoordinator::new(Arc::clone(&api));

        spawn_index_loader(Arc::clone(&api), 1, index_tx.clone());

        Ok(Self {
            search_input: TextInput::new(),
            suggestions: SuggestionBox::new(),
            index_state: IndexState::Loading {
                started_at: Instant::now(),
            },
            coordinator,
            should_quit: false,
            toast: None,
            suggestions_area: None,
            session_started: None,
            results_scroll: 0,
            results_max_scroll: 0,
            debouncer: Debouncer::new(INPUT_DEBOUNCE),
            api,
            load_attempt: 1,
            index_tx,
            index_rx,
        })
    }

    pub fn is_ready(&self) -> bool {
        self.index_state.index().is_some()
    }

    /// Re-run the index load after a failure
    fn retry_index_load(&mut self, now: Instant) {
        if !matches!(self.index_state, IndexState::Failed(_)) {
            return;
        }
        self.load_attempt += 1;
        self.index_state = IndexState::Loading { started_at: now };
        spawn_index_loader(Arc::clone(&self.api), self.load_attempt, self.index_tx.clone());
    }

    /// Poll for the index loader (non-blocking)
    fn poll_index(&mut self, now: Instant) {
        while let Ok(loaded) = self.index_rx.try_recv() {
            // Ignore attempts we no longer care about
            if loaded.attempt != self.load_attempt {
                continue;
            }

            match loaded.result {
                Ok(index) => {
                    self.toast = Some(Toast::new(
                        format!(
                            "Loaded {} moves in {}",
                            index.len(),
                            ui::format_duration(loaded.duration)
                        ),
                        now,
                        Duration::from_secs(2),
                    ));
                    self.index_state = IndexState::Ready(index);
                    // Text typed while loading still deserves suggestions
                    if !self.search_input.text.trim().is_empty() {
                        self.debouncer.reset(self.search_input.text.clone(), now);
                    }
                }
                Err(e) => {
                    let message = e.user_message().to_string();
                    self.toast = Some(Toast::error(e.to_string(), now, Duration::from_secs(5)));
                    self.index_state = IndexState::Failed(message);
                }
            }
        }
    }

    fn refresh_suggestions(&mut self, text: &str) {
        if let Some(index) = self.index_state.index() {
            let items = suggest(text, index);
            self.suggestions.set_items(items);
        }
    }

    /// Start a lookup for `name`; this is the only path into a new session
    fn commit(&mut self, name: String, now: Instant) {
        self.debouncer.cancel();
        if !name.is_empty() {
            self.search_input.set(&name);
        }
        self.coordinator.select(&name);
        if self.coordinator.is_loading() {
            self.session_started = Some(now);
            self.results_scroll = 0;
        }
    }

    /// Clear expired toast
    fn update_toast(&mut self, now: Instant) {
        if let Some(ref toast) = self.toast {
            if toast.is_expired(now) {
                self.toast = None;
            }
        }
    }

    /// Advance timers and apply background results
    pub fn tick(&mut self, now: Instant) {
        self.poll_index(now);
        if let Some(text) = self.debouncer.poll(now) {
            self.refresh_suggestions(&text);
        }
        if self.coordinator.poll() > 0 {
            self.session_started = None;
        }
        self.update_toast(now);
    }

    fn scroll_results(&mut self, delta: i32) {
        let next = (self.results_scroll as i32 + delta).clamp(0, self.results_max_scroll as i32);
        self.results_scroll = next as u16;
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: Instant) {
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                self.retry_index_load(now);
                return;
            }
            (KeyCode::PageDown, _) => {
                self.scroll_results(10);
                return;
            }
            (KeyCode::PageUp, _) => {
                self.scroll_results(-10);
                return;
            }
            _ => {}
        }

        if let Some(key) = nav_key(code) {
            if !self.is_ready() {
                if key == NavKey::Escape {
                    self.should_quit = true;
                }
                return;
            }
            match self.suggestions.handle_key(key, &self.search_input.text) {
                NavOutcome::Commit(name) => self.commit(name, now),
                NavOutcome::Moved => {}
                NavOutcome::Ignored => {
                    if key == NavKey::Escape {
                        self.should_quit = true;
                    }
                }
            }
            return;
        }

        match self.search_input.handle_key(code, modifiers) {
            InputChange::Edited => {
                self.suggestions.focus_input();
                self.debouncer.reset(self.search_input.text.clone(), now);
            }
            InputChange::Moved => self.suggestions.focus_input(),
            InputChange::Ignored => {}
        }
    }

    fn handle_click(&mut self, column: u16, row: u16, now: Instant) {
        if !self.is_ready() {
            return;
        }
        let Some(area) = self.suggestions_area else {
            return;
        };
        let inside = column >= area.x
            && column < area.x + area.width
            && row >= area.y
            && row < area.y + area.height;
        if !inside {
            return;
        }
        if let NavOutcome::Commit(name) = self.suggestions.click((row - area.y) as usize) {
            self.commit(name, now);
        }
    }

    /// Handle input event
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.handle_key(key.code, key.modifiers, now)
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    self.handle_click(mouse.column, mouse.row, now)
                }
                MouseEventKind::ScrollDown => self.scroll_results(1),
                MouseEventKind::ScrollUp => self.scroll_results(-1),
                _ => {}
            },
            _ => {}
        }
    }
}

/// Run the TUI application
pub fn run(base_url: String) -> Result<()> {
    let api: Arc<dyn MoveApi> = Arc::new(PokeApiClient::new(base_url)?);
    let mut app = App::new(api)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::BlinkingBar
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        SetCursorStyle::DefaultUserShape
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // ~60Hz is plenty for a spinner and typing
    const FRAME_TIME: Duration = Duration::from_micros(16_667);

    loop {
        let frame_start = Instant::now();

        // Drain all pending events first (lowest latency for input)
        let mut events_processed = 0usize;
        while event::poll(Duration::from_millis(0))? && events_processed < 100 {
            let ev = event::read()?;
            app.handle_event(ev, Instant::now());
            events_processed += 1;
            if app.should_quit {
                break;
            }
        }

        if app.should_quit {
            break;
        }

        app.tick(Instant::now());

        terminal.draw(|f| ui::render(f, app))?;

        // Sleep for remainder of frame time to maintain consistent frame rate
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - elapsed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{
        ApiError, MoveDetail, MoveList, NamedResource, Pokemon, Sprites, TypeName, TypeSlot,
    };
    use crossterm::event::{KeyEvent, MouseEvent};
    use ratatui::backend::TestBackend;

    struct FakeDex {
        names: Option<Vec<&'static str>>,
    }

    impl MoveApi for FakeDex {
        fn move_list(&self) -> Result<MoveList, ApiError> {
            match &self.names {
                Some(names) => Ok(MoveList {
                    results: names
                        .iter()
                        .map(|n| NamedResource {
                            name: n.to_string(),
                            url: format!("fake://move/{n}"),
                        })
                        .collect(),
                }),
                None => Err(ApiError::Status {
                    url: "fake://move".to_string(),
                    status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                }),
            }
        }

        fn move_detail(&self, name: &str) -> Result<MoveDetail, ApiError> {
            Ok(MoveDetail {
                learned_by_pokemon: vec![NamedResource {
                    name: format!("{name}-learner"),
                    url: format!("fake://pokemon/{name}"),
                }],
            })
        }

        fn pokemon(&self, url: &str) -> Result<Pokemon, ApiError> {
            Ok(Pokemon {
                id: 1,
                name: url.trim_start_matches("fake://pokemon/").to_string(),
                sprites: Sprites::default(),
                types: vec![TypeSlot {
                    kind: TypeName {
                        name: "electric".to_string(),
                    },
                }],
            })
        }
    }

    fn ready_app(names: Vec<&'static str>) -> App {
        let mut app = App::new(Arc::new(FakeDex { names: Some(names) })).unwrap();
        wait_for_index(&mut app);
        assert!(app.is_ready());
        app
    }

    fn wait_for_index(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(app.index_state, IndexState::Loading { .. }) && Instant::now() < deadline {
            app.tick(Instant::now());
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn key(app: &mut App, code: KeyCode, now: Instant) {
        app.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), now);
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            key(app, KeyCode::Char(c), now);
        }
    }

    #[test]
    fn test_suggestions_wait_for_quiet_period() {
        let mut app = ready_app(vec!["tackle", "thunder", "thunderbolt"]);
        let t0 = Instant::now();

        type_text(&mut app, "th", t0);
        type_text(&mut app, "u", t0 + Duration::from_millis(200));

        app.tick(t0 + Duration::from_millis(400));
        assert!(app.suggestions.is_empty());

        app.tick(t0 + Duration::from_millis(500));
        assert_eq!(app.suggestions.items(), ["thunder", "thunderbolt"]);
    }

    #[test]
    fn test_keyboard_commit_starts_lookup() {
        let mut app = ready_app(vec!["tackle", "thunder", "thunderbolt"]);
        let t0 = Instant::now();

        type_text(&mut app, "thu", t0);
        app.tick(t0 + Duration::from_millis(300));
        key(&mut app, KeyCode::Down, t0);
        key(&mut app, KeyCode::Down, t0);
        key(&mut app, KeyCode::Enter, t0);

        assert_eq!(app.search_input.text, "thunderbolt");
        assert!(app.suggestions.is_empty());
        assert_eq!(app.coordinator.active_name(), Some("thunderbolt"));

        assert!(app.coordinator.wait_settled(Duration::from_secs(5)));
        let names: Vec<_> = app
            .coordinator
            .area()
            .cards
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["thunderbolt"]);
    }

    #[test]
    fn test_mouse_click_commits_suggestion() {
        let mut app = ready_app(vec!["tackle", "tail-whip", "take-down"]);
        let t0 = Instant::now();

        type_text(&mut app, "ta", t0);
        app.tick(t0 + Duration::from_millis(300));
        assert_eq!(app.suggestions.items().len(), 3);

        app.suggestions_area = Some(Rect::new(0, 2, 30, 8));
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 4,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_event(Event::Mouse(click), t0);

        assert_eq!(app.search_input.text, "tail-whip");
        assert_eq!(app.coordinator.active_name(), Some("tail-whip"));
    }

    #[test]
    fn test_commit_cancels_pending_suggestions() {
        let mut app = ready_app(vec!["surf", "swift"]);
        let t0 = Instant::now();

        type_text(&mut app, "s", t0);
        key(&mut app, KeyCode::Enter, t0 + Duration::from_millis(50));
        app.tick(t0 + Duration::from_secs(1));

        assert!(app.suggestions.is_empty());
        assert_eq!(app.coordinator.active_name(), Some("s"));
    }

    #[test]
    fn test_escape_in_input_quits() {
        let mut app = ready_app(vec!["surf"]);
        let t0 = Instant::now();
        type_text(&mut app, "s", t0);
        app.tick(t0 + Duration::from_millis(300));
        key(&mut app, KeyCode::Down, t0);

        // First Escape closes the list, second one quits
        key(&mut app, KeyCode::Esc, t0);
        assert!(!app.should_quit);
        key(&mut app, KeyCode::Esc, t0);
        assert!(app.should_quit);
    }

    #[test]
    fn test_results_scroll_is_clamped_to_content() {
        let mut app = ready_app(vec!["thunder"]);
        let t0 = Instant::now();

        // Nothing drawn yet, nothing to scroll
        key(&mut app, KeyCode::PageDown, t0);
        assert_eq!(app.results_scroll, 0);

        type_text(&mut app, "thunder", t0);
        key(&mut app, KeyCode::Enter, t0);
        assert!(app.coordinator.wait_settled(Duration::from_secs(5)));

        let mut terminal = Terminal::new(TestBackend::new(80, 3)).unwrap();
        terminal.draw(|f| ui::render(f, &mut app)).unwrap();
        let max = app.results_max_scroll;
        assert!(max > 0);

        for _ in 0..5 {
            key(&mut app, KeyCode::PageDown, t0);
        }
        assert_eq!(app.results_scroll, max);

        key(&mut app, KeyCode::PageUp, t0);
        assert_eq!(app.results_scroll, 0);
    }

    #[test]
    fn test_failed_index_disables_search() {
        let mut app = App::new(Arc::new(FakeDex { names: None })).unwrap();
        wait_for_index(&mut app);
        assert!(matches!(app.index_state, IndexState::Failed(_)));

        let t0 = Instant::now();
        type_text(&mut app, "surf", t0);
        key(&mut app, KeyCode::Enter, t0);
        app.tick(t0 + Duration::from_secs(1));

        assert!(app.suggestions.is_empty());
        assert_eq!(app.coordinator.active_name(), None);

        // Ctrl+R starts another attempt
        app.handle_event(
            Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            t0,
        );
        assert!(matches!(app.index_state, IndexState::Loading { .. }));
    }
}
