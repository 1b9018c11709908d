//! Enumerations for TUI state management.

/// Top-level screens, switched with 1-5 or Tab.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Dashboard,
    Board,
    MyTasks,
    Hierarchy,
    Settings,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Dashboard,
        Screen::Board,
        Screen::MyTasks,
        Screen::Hierarchy,
        Screen::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Board => "Board",
            Screen::MyTasks => "My Tasks",
            Screen::Hierarchy => "Hierarchy",
            Screen::Settings => "Settings",
        }
    }

    pub fn index(self) -> usize {
        Screen::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// The next screen in tab order, wrapping around.
    pub fn cycle(self, forward: bool) -> Screen {
        let n = Screen::ALL.len();
        let i = self.index();
        let next = if forward { (i + 1) % n } else { (i + n - 1) % n };
        Screen::ALL[next]
    }
}

/// Overlay state on top of the current screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    Main,
    TaskDetail,
    AddTask,
    EditTask,
    Help,
    Confirm,
}

/// Rows of the settings screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SettingsRow {
    CurrentUser,
    DefaultProject,
    ShowDone,
}

impl SettingsRow {
    pub const ALL: [SettingsRow; 3] = [
        SettingsRow::CurrentUser,
        SettingsRow::DefaultProject,
        SettingsRow::ShowDone,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_cycle_wraps() {
        assert_eq!(Screen::Dashboard.cycle(true), Screen::Board);
        assert_eq!(Screen::Settings.cycle(true), Screen::Dashboard);
        assert_eq!(Screen::Dashboard.cycle(false), Screen::Settings);
    }
}
