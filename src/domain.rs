use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;
use tracing_error::SpanTrace;

pub const HELP_TEXT: &str = r#"
    Tabs
    1-5           Select tab (All Orders, Pending, Reviewed, Approved, Rejected)
    Tab/BackTab   Next/previous tab

    Toolbar
    t             Show/hide the toolbar
    x             Hide Fields (toggles the Due Date column)
    s             Sort by Job Request, ascending
    f             Show/hide the search box
    c             Cell View

    Table
    ↑/k ↓/j       Move selection up/down
    PgUp/PgDown   Move one page up/down
    g/Home G/End  Jump to first/last row
    ←/h →/l       Select column header
    Enter/o       Cycle sort of the selected column (asc, desc, off)
    /             Focus the search box
    y             Copy the link of the selected row
    Y             Copy the selected row as csv

    Search box
    Enter/Esc     Leave the search box
    Ctrl+u        Clear the search text

    ?             Show this help
    q             Quit
"#;

/// Tabs of the view, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    AllOrders,
    Pending,
    Reviewed,
    Approved,
    Rejected,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::AllOrders,
        Tab::Pending,
        Tab::Reviewed,
        Tab::Approved,
        Tab::Rejected,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::AllOrders => "All Orders",
            Tab::Pending => "Pending",
            Tab::Reviewed => "Reviewed",
            Tab::Approved => "Approved",
            Tab::Rejected => "Rejected",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Parse a tab from its label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Result<Tab, SheetError> {
        let wanted = label.trim();
        Tab::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SheetError::UnknownTab(label.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveLeft,
    MoveRight,
    SelectTab(Tab),
    NextTab,
    PreviousTab,
    ToggleToolbar,
    HideFields,
    Sort,
    ToggleSearch,
    CellView,
    ToggleHeaderSort,
    Search,
    CopyLink,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct SheetConfig {
    pub event_poll_time: u64,
    pub initial_tab: Tab,
    pub show_toolbar: bool,
    pub show_search: bool,
    pub max_column_width: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            initial_tab: Tab::AllOrders,
            show_toolbar: true,
            show_search: true,
            max_column_width: 40,
        }
    }
}

#[derive(Debug)]
pub enum SheetError {
    IoError(Error, SpanTrace),
    UnknownTab(String),
    LogSetup(String),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::IoError(err, trace) => write!(f, "I/O error: {err}\n{trace}"),
            SheetError::UnknownTab(name) => write!(
                f,
                "Unknown tab \"{name}\", expected one of: {}",
                Tab::ALL.map(|t| t.label()).join(", ")
            ),
            SheetError::LogSetup(reason) => write!(f, "Could not set up logging: {reason}"),
        }
    }
}

impl std::error::Error for SheetError {}

impl From<Error> for SheetError {
    fn from(err: Error) -> Self {
        SheetError::IoError(err, SpanTrace::capture())
    }
}

impl From<tracing_subscriber::filter::ParseError> for SheetError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        SheetError::LogSetup(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_labels_parse_back() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_label(tab.label()).unwrap(), tab);
        }
        assert_eq!(Tab::from_label(" all orders ").unwrap(), Tab::AllOrders);
    }

    #[test]
    fn unknown_tab_is_an_error() {
        let err = Tab::from_label("Archived").unwrap_err();
        assert!(matches!(err, SheetError::UnknownTab(ref name) if name == "Archived"));
        assert!(err.to_string().contains("All Orders"));
    }

    #[test]
    fn tabs_cycle_in_both_directions() {
        assert_eq!(Tab::AllOrders.next(), Tab::Pending);
        assert_eq!(Tab::Rejected.next(), Tab::AllOrders);
        assert_eq!(Tab::AllOrders.previous(), Tab::Rejected);
        assert_eq!(Tab::Approved.previous(), Tab::Reviewed);
    }

    #[test]
    fn config_setters_chain() {
        let cfg = SheetConfig::default()
            .with_event_poll_time(250)
            .with_initial_tab(Tab::Pending)
            .with_show_toolbar(false);
        assert_eq!(cfg.event_poll_time, 250);
        assert_eq!(cfg.initial_tab, Tab::Pending);
        assert!(!cfg.show_toolbar);
        assert!(cfg.show_search);
    }
}
