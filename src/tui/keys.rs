use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub label: &'static str,
    pub description: &'static str,
}

impl KeyBinding {
    pub fn new(
        key: KeyCode,
        modifiers: KeyModifiers,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers,
            label,
            description,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    pub quit: KeyBinding,
    pub quit_alt: KeyBinding,
    pub help: KeyBinding,
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub select: KeyBinding,
    pub clear: KeyBinding,
    pub refresh: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: KeyBinding::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                "Ctrl+C",
                "Quit application",
            ),
            quit_alt: KeyBinding::new(
                KeyCode::Char('q'),
                KeyModifiers::NONE,
                "q",
                "Quit application",
            ),
            help: KeyBinding::new(
                KeyCode::Char('g'),
                KeyModifiers::CONTROL,
                "Ctrl+G",
                "Show/hide help",
            ),
            up: KeyBinding::new(KeyCode::Up, KeyModifiers::NONE, "Up", "Previous theatre"),
            down: KeyBinding::new(KeyCode::Down, KeyModifiers::NONE, "Down", "Next theatre"),
            select: KeyBinding::new(KeyCode::Enter, KeyModifiers::NONE, "Enter", "Show details"),
            clear: KeyBinding::new(KeyCode::Esc, KeyModifiers::NONE, "Esc", "Clear selection"),
            refresh: KeyBinding::new(KeyCode::Char('r'), KeyModifiers::NONE, "r", "Reload"),
        }
    }
}

impl KeyMap {
    /// Check if the event should quit the application
    pub fn should_quit(&self, event: &KeyEvent) -> bool {
        self.quit.matches(event) || self.quit_alt.matches(event)
    }

    /// Check if the event should show help
    pub fn should_show_help(&self, event: &KeyEvent) -> bool {
        self.help.matches(event)
    }

    fn bindings(&self) -> [&KeyBinding; 7] {
        [
            &self.up,
            &self.down,
            &self.select,
            &self.clear,
            &self.refresh,
            &self.help,
            &self.quit,
        ]
    }

    /// Get help text for all key bindings
    pub fn help_text(&self) -> String {
        self.bindings()
            .iter()
            .map(|b| format!("{:<8} {}", b.label, b.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
