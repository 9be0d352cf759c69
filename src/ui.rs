use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs},
};

use crate::data::ColumnId;
use crate::domain::Tab;
use crate::model::{CellView, Model, UIData};

pub const TOOLBAR_HEIGHT: usize = 3;
pub const SEARCH_HEIGHT: usize = 3;
pub const TABS_HEIGHT: usize = 2;
pub const STATUSLINE_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const TABLE_BORDER_HEIGHT: usize = 2;
pub const COLUMN_WIDTH_MARGIN: usize = 1;

const TOOLBAR_BUTTONS: [(&str, &str); 5] = [
    ("t", "Tool Bar"),
    ("x", "Hide Fields"),
    ("s", "Sort"),
    ("f", "Filter"),
    ("c", "Cell View"),
];

const SEARCH_PLACEHOLDER: &str = "Search...";

pub fn status_style(status: &str) -> Style {
    let (fg, bg) = match status {
        "In-process" => (Color::Black, Color::Yellow),
        "Need to start" => (Color::Black, Color::LightBlue),
        "Complete" => (Color::Black, Color::Green),
        "Blocked" => (Color::White, Color::Red),
        _ => (Color::Black, Color::Gray),
    };
    Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD)
}

pub fn priority_style(priority: &str) -> Style {
    match priority {
        "High" => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        "Medium" => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        "Low" => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        _ => Style::default(),
    }
}

#[derive(Debug, Default)]
pub struct TableUI {
    table_state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();

        let mut constraints = Vec::new();
        if uidata.toolbar_visible {
            constraints.push(Constraint::Length(TOOLBAR_HEIGHT as u16));
        }
        if uidata.search_visible {
            constraints.push(Constraint::Length(SEARCH_HEIGHT as u16));
        }
        constraints.push(Constraint::Length(TABS_HEIGHT as u16));
        constraints.push(Constraint::Min(0));
        constraints.push(Constraint::Length(STATUSLINE_HEIGHT as u16));
        let areas = Layout::vertical(constraints).split(frame.area());

        let mut next = 0;
        if uidata.toolbar_visible {
            self.render_toolbar(frame, areas[next]);
            next += 1;
        }
        if uidata.search_visible {
            self.render_search(frame, uidata, areas[next]);
            next += 1;
        }
        self.render_tabs(frame, uidata, areas[next]);
        self.render_table(frame, uidata, areas[next + 1]);
        self.render_statusline(frame, uidata, areas[next + 2]);

        if uidata.show_popup {
            self.render_popup(frame, uidata);
        }
    }

    fn render_toolbar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (key, label) in TOOLBAR_BUTTONS {
            spans.push(Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::Black).bg(Color::Gray),
            ));
            spans.push(Span::styled(format!("({key})"), Style::default().fg(Color::DarkGray)));
            spans.push(Span::raw("  "));
        }
        let toolbar = Paragraph::new(Line::from(spans)).block(Block::bordered().title(" Toolbar "));
        frame.render_widget(toolbar, area);
    }

    fn render_search(&self, frame: &mut Frame, uidata: &UIData, area: Rect) {
        let text = if uidata.search.input.is_empty() && !uidata.active_search {
            Line::from(SEARCH_PLACEHOLDER.dark_gray())
        } else {
            Line::from(uidata.search.input.clone())
        };
        let border_style = if uidata.active_search {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::bordered()
            .title(" Search (/) ")
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(text).block(block), area);

        if uidata.active_search {
            let x = inner.x + uidata.search.curser_pos.min(inner.width as usize) as u16;
            frame.set_cursor_position((x, inner.y));
        }
    }

    fn render_tabs(&self, frame: &mut Frame, uidata: &UIData, area: Rect) {
        let labels = Tab::ALL
            .iter()
            .enumerate()
            .map(|(idx, tab)| Line::from(format!(" {} {} ", idx + 1, tab.label())))
            .collect::<Vec<_>>();
        let tabs = Tabs::new(labels)
            .select(uidata.active_tab.index())
            .divider(Span::styled("|", Style::default().fg(Color::DarkGray)))
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(tabs, area);
    }

    fn render_table(&mut self, frame: &mut Frame, uidata: &UIData, area: Rect) {
        let header = Row::new(uidata.headers.iter().enumerate().map(|(idx, h)| {
            let style = if idx == uidata.selected_column {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Cell::from(h.name.clone()).style(style)
        }))
        .height(TABLE_HEADER_HEIGHT as u16);

        let rows = uidata.rows.iter().enumerate().map(|(idx, row)| {
            let stripe = if (uidata.abs_selected_row - uidata.selected_row + idx) % 2 == 0 {
                Style::default()
            } else {
                Style::default().bg(Color::Indexed(236))
            };
            Row::new(row.cells.iter().map(render_cell)).style(stripe)
        });

        let widths = uidata
            .headers
            .iter()
            .map(|h| Constraint::Length(h.width as u16));

        let title = Line::from(format!(" {} ", uidata.active_tab.label()).bold());
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .block(Block::bordered().title(title).border_set(border::PLAIN));

        if uidata.rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(uidata.selected_row));
        }
        *self.table_state.offset_mut() = 0;
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_statusline(&self, frame: &mut Frame, uidata: &UIData, area: Rect) {
        let first = if uidata.nrows == 0 {
            0
        } else {
            uidata.abs_selected_row - uidata.selected_row + 1
        };
        let last = std::cmp::min(first + uidata.layout.table_height, uidata.nrows + 1)
            .saturating_sub(1);
        let info = format!(
            " rows {}-{} of {} ({} total) | sort: {} | ? help ",
            first, last, uidata.nrows, uidata.total_rows, uidata.sort_description
        );
        let [message_area, info_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(info.chars().count() as u16),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::from(uidata.status_message.clone().yellow())),
            message_area,
        );
        frame.render_widget(Paragraph::new(Line::from(info.dark_gray())), info_area);
    }

    fn render_popup(&self, frame: &mut Frame, uidata: &UIData) {
        let [vertical] = Layout::vertical([Constraint::Percentage(80)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [popup] = Layout::horizontal([Constraint::Percentage(70)])
            .flex(Flex::Center)
            .areas(vertical);

        frame.render_widget(Clear, popup);
        let help = Paragraph::new(Text::from(uidata.popup_message.as_str())).block(
            Block::bordered()
                .title(Line::from(" Help ".bold()).centered())
                .title_bottom(Line::from(" Esc to close ").centered())
                .border_set(border::THICK),
        );
        frame.render_widget(help, popup);
    }
}

fn render_cell(cell: &CellView) -> Cell<'static> {
    match cell.column {
        ColumnId::Status => Cell::from(Span::styled(cell.text.clone(), status_style(cell.value))),
        ColumnId::Priority => Cell::from(Span::styled(cell.text.clone(), priority_style(cell.value))),
        ColumnId::Url => Cell::from(Span::styled(
            cell.text.clone(),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
        )),
        _ => Cell::from(cell.text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Message, SheetConfig};
    use ratatui::{Terminal, backend::TestBackend};

    fn render(model: &Model, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut ui = TableUI::new();
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn model() -> Model {
        Model::init(&SheetConfig::default(), 200, 30)
    }

    #[test]
    fn renders_tabs_toolbar_and_headers() {
        let model = model();
        let screen = render(&model, 200, 30);
        for tab in Tab::ALL {
            assert!(screen.contains(tab.label()), "missing tab {}", tab.label());
        }
        for (_, label) in TOOLBAR_BUTTONS {
            assert!(screen.contains(label), "missing button {label}");
        }
        for column in ColumnId::ALL {
            assert!(screen.contains(column.header()), "missing header {}", column.header());
        }
        assert!(screen.contains(SEARCH_PLACEHOLDER));
        assert!(screen.contains("Launch social media campaign"));
    }

    #[test]
    fn hidden_toolbar_and_column_are_not_drawn() {
        let mut model = model();
        model.update(Some(Message::HideFields)).unwrap();
        model.update(Some(Message::ToggleToolbar)).unwrap();
        let screen = render(&model, 200, 30);
        assert!(!screen.contains("Hide Fields"));
        assert!(!screen.contains("Due Date"));
        assert!(!screen.contains("20-11-2024"));
        assert!(screen.contains("Est. Value"));
    }

    #[test]
    fn pending_tab_draws_single_row() {
        let mut model = model();
        model.update(Some(Message::SelectTab(Tab::Pending))).unwrap();
        let screen = render(&model, 200, 30);
        assert!(screen.contains("Update press kit"));
        assert!(!screen.contains("Launch social media campaign"));
        assert!(screen.contains("rows 1-1 of 1 (5 total)"));
    }

    #[test]
    fn help_popup_is_drawn() {
        let mut model = model();
        model.update(Some(Message::Help)).unwrap();
        let screen = render(&model, 200, 40);
        assert!(screen.contains("Help"));
        assert!(screen.contains("Hide Fields (toggles the Due Date column)"));
    }

    #[test]
    fn unknown_values_fall_back_to_neutral_styles() {
        assert_eq!(status_style("Archived").bg, Some(Color::Gray));
        assert_eq!(status_style("Complete").bg, Some(Color::Green));
        assert_eq!(priority_style("Urgent"), Style::default());
        assert_eq!(priority_style("High").fg, Some(Color::Red));
    }
}
