//! Keyboard and mouse focus over the suggestion list

/// Where keyboard focus sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Suggestion(usize),
}

/// Keys the focus state machine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Focus changed or the list was dismissed
    Moved,
    /// Start a session for this name. The name may be empty.
    Commit(String),
    /// The key has no meaning in the current state; the host may use it
    Ignored,
}

/// Suggestion list plus the focus state machine that drives selection
#[derive(Debug, Clone)]
pub struct SuggestionBox {
    items: Vec<String>,
    focus: Focus,
}

impl Default for SuggestionBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionBox {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            focus: Focus::Input,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of the focused suggestion, if focus is on the list
    pub fn selected(&self) -> Option<usize> {
        match self.focus {
            Focus::Suggestion(i) => Some(i),
            Focus::Input => None,
        }
    }

    /// Replace the list wholesale; focus returns to the input
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.focus = Focus::Input;
    }

    pub fn clear(&mut self) {
        self.set_items(Vec::new());
    }

    /// Move focus back to the input without touching the list
    pub fn focus_input(&mut self) {
        self.focus = Focus::Input;
    }

    /// Apply a navigation key. `input` is the current text of the search field.
    pub fn handle_key(&mut self, key: NavKey, input: &str) -> NavOutcome {
        match (self.focus, key) {
            (Focus::Input, NavKey::Down) => {
                if self.items.is_empty() {
                    return NavOutcome::Ignored;
                }
                self.focus = Focus::Suggestion(0);
                NavOutcome::Moved
            }
            (Focus::Input, NavKey::Enter) => self.commit(input.trim().to_string()),
            (Focus::Input, NavKey::Up | NavKey::Escape) => NavOutcome::Ignored,

            (Focus::Suggestion(i), NavKey::Enter) => match self.items.get(i) {
                Some(name) => {
                    let name = name.clone();
                    self.commit(name)
                }
                None => {
                    self.focus = Focus::Input;
                    NavOutcome::Ignored
                }
            },
            (Focus::Suggestion(i), NavKey::Down) => {
                let len = self.items.len();
                self.focus = if len == 0 {
                    Focus::Input
                } else {
                    Focus::Suggestion((i + 1) % len)
                };
                NavOutcome::Moved
            }
            (Focus::Suggestion(i), NavKey::Up) => {
                let len = self.items.len();
                self.focus = if len == 0 {
                    Focus::Input
                } else {
                    Focus::Suggestion((i + len - 1) % len)
                };
                NavOutcome::Moved
            }
            (Focus::Suggestion(_), NavKey::Escape) => {
                self.clear();
                NavOutcome::Moved
            }
        }
    }

    /// Mouse click on suggestion `index`; same as Enter with that item focused
    pub fn click(&mut self, index: usize) -> NavOutcome {
        match self.items.get(index) {
            Some(name) => {
                let name = name.clone();
                self.commit(name)
            }
            None => NavOutcome::Ignored,
        }
    }

    fn commit(&mut self, name: String) -> NavOutcome {
        self.clear();
        NavOutcome::Commit(name)
    }
}
