use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, trace};

use crate::data::{ColumnId, RECORDS, Record};
use crate::domain::{HELP_TEXT, Message, SheetConfig, SheetError, Tab};
use crate::inputter::{InputResult, Inputter};
use crate::table::{RowModel, SortDirection, SortEntry, sort_indicator};
use crate::ui::{
    COLUMN_WIDTH_MARGIN, SEARCH_HEIGHT, STATUSLINE_HEIGHT, TABLE_BORDER_HEIGHT,
    TABLE_HEADER_HEIGHT, TABS_HEIGHT, TOOLBAR_HEIGHT,
};

/// Column forced by the toolbar "Sort" control.
pub const SORT_TARGET: ColumnId = ColumnId::JobRequest;
/// Column toggled by the toolbar "Hide Fields" control.
pub const HIDE_FIELDS_TARGET: ColumnId = ColumnId::DueDate;

/// Global filter implied by selecting a tab.
///
/// Reviewed and Rejected have no matching status value and show every row.
pub fn tab_filter(tab: Tab) -> &'static str {
    match tab {
        Tab::Pending => "Need to start",
        Tab::Approved => "Complete",
        Tab::AllOrders | Tab::Reviewed | Tab::Rejected => "",
    }
}

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
    SEARCH,
}

/// Everything the user can change about the view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub active_tab: Tab,
    pub sort: Vec<SortEntry>,
    pub filter_text: String,
    pub toolbar_visible: bool,
    pub search_visible: bool,
    pub hidden_columns: HashSet<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            active_tab: Tab::AllOrders,
            sort: Vec::new(),
            filter_text: String::new(),
            toolbar_visible: true,
            search_visible: true,
            hidden_columns: HashSet::new(),
        }
    }
}

impl ViewState {
    pub fn from_config(config: &SheetConfig) -> Self {
        ViewState {
            active_tab: config.initial_tab,
            filter_text: tab_filter(config.initial_tab).to_string(),
            toolbar_visible: config.show_toolbar,
            search_visible: config.show_search,
            ..ViewState::default()
        }
    }

    /// Switches to `tab` and overwrites the filter text with the tab's filter.
    /// Selecting the active tab is not a switch and keeps the filter text.
    /// Returns whether the tab changed.
    pub fn select_tab(&mut self, tab: Tab) -> bool {
        if tab == self.active_tab {
            return false;
        }
        self.active_tab = tab;
        self.filter_text = tab_filter(tab).to_string();
        true
    }

    pub fn set_filter_text(&mut self, text: &str) {
        self.filter_text = text.to_string();
    }

    pub fn toggle_column(&mut self, id: &str) {
        if ColumnId::from_id(id).is_none() {
            debug!("Toggling unknown column id \"{id}\"");
        }
        if !self.hidden_columns.remove(id) {
            self.hidden_columns.insert(id.to_string());
        }
    }

    pub fn is_column_visible(&self, column: ColumnId) -> bool {
        !self.hidden_columns.contains(column.id())
    }

    pub fn force_sort(&mut self) {
        self.sort = vec![SortEntry::ascending(SORT_TARGET)];
    }

    /// Header activation: unsorted -> ascending -> descending -> unsorted.
    /// A column other than the sorted one starts at ascending.
    pub fn toggle_header_sort(&mut self, column: ColumnId) {
        let current = self
            .sort
            .first()
            .filter(|entry| entry.column == column)
            .map(|entry| entry.direction);
        self.sort = match current {
            None => vec![SortEntry::ascending(column)],
            Some(SortDirection::Ascending) => vec![SortEntry::descending(column)],
            Some(SortDirection::Descending) => Vec::new(),
        };
    }

    pub fn toggle_toolbar(&mut self) {
        self.toolbar_visible = !self.toolbar_visible;
    }

    pub fn toggle_search(&mut self) {
        self.search_visible = !self.search_visible;
    }

    pub fn row_model(&self, records: &[Record]) -> RowModel {
        RowModel::build(records, &self.filter_text, &self.sort, &self.hidden_columns)
    }

    pub fn sort_description(&self) -> String {
        match self.sort.first() {
            Some(entry) => {
                let direction = match entry.direction {
                    SortDirection::Ascending => "asc",
                    SortDirection::Descending => "desc",
                };
                format!("{} {}", entry.column.header(), direction)
            }
            None => "unsorted".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub column: ColumnId,
    pub name: String,
    pub width: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub column: ColumnId,
    pub text: String,
    pub value: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub record: usize,
    pub cells: Vec<CellView>,
}

pub struct UIData {
    pub active_tab: Tab,
    pub toolbar_visible: bool,
    pub search_visible: bool,
    pub active_search: bool,
    pub search: InputResult,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub nrows: usize, // Rows left after filtering
    pub total_rows: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub sort_description: String,
    pub layout: UILayout,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            active_tab: Tab::AllOrders,
            toolbar_visible: true,
            search_visible: true,
            active_search: false,
            search: InputResult::default(),
            headers: Vec::new(),
            rows: Vec::new(),
            nrows: 0,
            total_rows: 0,
            selected_row: 0,
            selected_column: 0,
            abs_selected_row: 0,
            show_popup: false,
            popup_message: String::new(),
            sort_description: String::new(),
            layout: UILayout::default(),
            status_message: String::new(),
        }
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_height: usize, // Number of data rows that fit in the table
}

impl UILayout {
    pub fn from_values(
        ui_width: usize,
        ui_height: usize,
        toolbar_visible: bool,
        search_visible: bool,
    ) -> Self {
        let mut chrome = TABS_HEIGHT + STATUSLINE_HEIGHT + TABLE_HEADER_HEIGHT + TABLE_BORDER_HEIGHT;
        if toolbar_visible {
            chrome += TOOLBAR_HEIGHT;
        }
        if search_visible {
            chrome += SEARCH_HEIGHT;
        }
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_height: ui_height.saturating_sub(chrome),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    config: SheetConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    records: &'static [Record],
    view: ViewState,
    row_model: RowModel,
    curser_row: usize,
    offset_row: usize,
    curser_column: usize,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    status_message: String,
}

impl Model {
    pub fn init(config: &SheetConfig, ui_width: usize, ui_height: usize) -> Self {
        let records: &'static [Record] = &RECORDS;
        let view = ViewState::from_config(config);
        let uilayout =
            UILayout::from_values(ui_width, ui_height, view.toolbar_visible, view.search_visible);
        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            records,
            row_model: view.row_model(records),
            view,
            curser_row: 0,
            offset_row: 0,
            curser_column: 0,
            uilayout,
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            status_message: String::new(),
        };
        model.set_status_message(format!("Loaded {} records", records.len()));
        model.refresh();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn row_model(&self) -> &RowModel {
        &self.row_model
    }

    /// When true, the controller forwards every key unmapped.
    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCH
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    #[instrument(level = "trace", skip(self))]
    pub fn update(&mut self, message: Option<Message>) -> Result<(), SheetError> {
        let Some(msg) = message else {
            return Ok(());
        };
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(1),
                Message::MoveDown => self.move_selection_down(1),
                Message::MovePageUp => self.move_selection_up(self.page_size()),
                Message::MovePageDown => self.move_selection_down(self.page_size()),
                Message::MoveBeginning => self.move_selection_beginning(),
                Message::MoveEnd => self.move_selection_end(),
                Message::MoveLeft => self.move_column_selection(-1),
                Message::MoveRight => self.move_column_selection(1),
                Message::SelectTab(tab) => self.select_tab(tab),
                Message::NextTab => self.select_tab(self.view.active_tab.next()),
                Message::PreviousTab => self.select_tab(self.view.active_tab.previous()),
                Message::ToggleToolbar => self.toggle_toolbar(),
                Message::HideFields => self.toolbar_action(Self::hide_fields),
                Message::Sort => self.toolbar_action(Self::force_sort),
                Message::ToggleSearch => self.toolbar_action(Self::toggle_search),
                Message::CellView => self.toolbar_action(Self::cell_view),
                Message::ToggleHeaderSort => self.toggle_header_sort(),
                Message::Search => self.enter_search_mode(),
                Message::CopyLink => self.copy_link(),
                Message::CopyRow => self.copy_row(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit | Message::RawKey(_) => (),
            },
            Modus::POPUP => match msg {
                Message::Quit | Message::Exit | Message::ToggleHeaderSort => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::SEARCH => match msg {
                Message::Quit => self.quit(),
                Message::RawKey(key) => self.raw_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- View state transitions ---------------------- //

    fn select_tab(&mut self, tab: Tab) {
        if !self.view.select_tab(tab) {
            trace!("Tab {} is already active", tab.label());
            return;
        }
        if matches!(tab, Tab::Reviewed | Tab::Rejected) {
            debug!("Tab {} has no status filter, showing all rows", tab.label());
        }
        info!(
            "Selected tab {}, filter \"{}\"",
            tab.label(),
            self.view.filter_text
        );
        self.reset_selection();
        self.refresh();
        self.set_status_message(format!(
            "{}: {} of {} rows",
            tab.label(),
            self.row_model.rows.len(),
            self.records.len()
        ));
    }

    fn toolbar_action(&mut self, action: fn(&mut Self)) {
        if self.view.toolbar_visible {
            action(self);
        } else {
            trace!("Toolbar is hidden, ignoring toolbar action");
        }
    }

    fn toggle_toolbar(&mut self) {
        self.view.toggle_toolbar();
        self.relayout();
        self.set_status_message(if self.view.toolbar_visible {
            "Toolbar shown"
        } else {
            "Toolbar hidden (t to show)"
        });
    }

    fn hide_fields(&mut self) {
        self.view.toggle_column(HIDE_FIELDS_TARGET.id());
        let visible = self.view.is_column_visible(HIDE_FIELDS_TARGET);
        debug!("Column {} visible: {}", HIDE_FIELDS_TARGET.id(), visible);
        self.refresh();
        self.set_status_message(format!(
            "{} {}",
            HIDE_FIELDS_TARGET.header(),
            if visible { "shown" } else { "hidden" }
        ));
    }

    fn force_sort(&mut self) {
        self.view.force_sort();
        self.reset_selection();
        self.refresh();
        self.set_status_message(format!("Sorted by {}", self.view.sort_description()));
    }

    fn toggle_search(&mut self) {
        self.view.toggle_search();
        self.relayout();
        self.set_status_message(if self.view.search_visible {
            "Search box shown"
        } else {
            "Search box hidden"
        });
    }

    fn cell_view(&mut self) {
        info!("Cell View clicked");
        self.set_status_message("Cell View clicked");
    }

    fn toggle_header_sort(&mut self) {
        let Some(&column) = self.row_model.columns.get(self.curser_column) else {
            return;
        };
        self.view.toggle_header_sort(column);
        self.reset_selection();
        self.refresh();
        self.set_status_message(format!("Sort: {}", self.view.sort_description()));
    }

    fn enter_search_mode(&mut self) {
        if !self.view.search_visible {
            trace!("Search box is hidden, ignoring search");
            return;
        }
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
        self.input.set(&self.view.filter_text);
        self.update_uidata();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        let result = self.input.read(key);
        if result.changed {
            self.view.set_filter_text(&result.input);
            self.reset_selection();
            self.refresh();
        }
        if result.finished {
            trace!("Leaving search mode with \"{}\"", result.input);
            self.modus = self.previous_modus;
            self.previous_modus = Modus::SEARCH;
            self.set_status_message(format!(
                "Filter \"{}\": {} of {} rows",
                self.view.filter_text,
                self.row_model.rows.len(),
                self.records.len()
            ));
        }
        self.update_uidata();
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.update_uidata();
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.update_uidata();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout.width = width;
        self.uilayout.height = height;
        self.relayout();
    }

    // Chrome visibility changes the space left for table rows.
    fn relayout(&mut self) {
        self.uilayout = UILayout::from_values(
            self.uilayout.width,
            self.uilayout.height,
            self.view.toolbar_visible,
            self.view.search_visible,
        );
        self.clamp_selection();
        self.update_uidata();
    }

    // -------------------- Clipboard ---------------------- //

    fn selected_record(&self) -> Option<&'static Record> {
        let records = self.records;
        self.row_model
            .rows
            .get(self.offset_row + self.curser_row)
            .map(|&idx| &records[idx])
    }

    fn copy_link(&mut self) {
        let Some(record) = self.selected_record() else {
            self.set_status_message("No row selected");
            return;
        };
        let link = record.link();
        self.copy_to_clipboard(link.clone(), &format!("Copied {link}"));
    }

    fn copy_row(&mut self) {
        let Some(record) = self.selected_record() else {
            self.set_status_message("No row selected");
            return;
        };
        let content = self
            .row_model
            .columns
            .iter()
            .map(|&c| Model::wrap_cell_content(record.value(c)))
            .collect::<Vec<String>>()
            .join(",");
        self.copy_to_clipboard(content, "Copied row");
    }

    fn copy_to_clipboard(&mut self, content: String, success_message: &str) {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    error!("Could not open clipboard: {:?}", e);
                    self.set_status_message(format!("Clipboard unavailable: {e}"));
                    return;
                }
            }
        }
        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(content),
            None => return,
        };
        match result {
            Ok(_) => {
                trace!("Copied content to clipboard.");
                self.set_status_message(success_message);
            }
            Err(e) => {
                error!("Error copying to clipboard: {:?}", e);
                self.set_status_message(format!("Copy failed: {e}"));
            }
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',' || c == '"');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    // -------------------- Selection ---------------------- //

    fn page_size(&self) -> usize {
        std::cmp::max(self.uilayout.table_height, 1)
    }

    fn reset_selection(&mut self) {
        self.curser_row = 0;
        self.offset_row = 0;
    }

    // Keep the cursor inside the rows and columns that are currently visible.
    fn clamp_selection(&mut self) {
        let nrows = self.row_model.rows.len();
        let height = self.page_size();
        let abs = std::cmp::min(self.offset_row + self.curser_row, nrows.saturating_sub(1));
        if abs < self.offset_row || abs >= self.offset_row + height {
            self.offset_row = abs.saturating_sub(height - 1);
        }
        self.offset_row = std::cmp::min(self.offset_row, nrows.saturating_sub(height));
        self.curser_row = abs - std::cmp::min(abs, self.offset_row);
        self.curser_column = std::cmp::min(
            self.curser_column,
            self.row_model.columns.len().saturating_sub(1),
        );
    }

    fn select_row(&mut self, abs_row: usize) {
        let nrows = self.row_model.rows.len();
        if nrows == 0 {
            self.reset_selection();
        } else {
            let abs_row = std::cmp::min(abs_row, nrows - 1);
            let height = self.page_size();
            if abs_row < self.offset_row {
                self.offset_row = abs_row;
            } else if abs_row >= self.offset_row + height {
                self.offset_row = abs_row + 1 - height;
            }
            self.curser_row = abs_row - self.offset_row;
        }
        self.update_uidata();
    }

    fn move_selection_up(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs.saturating_sub(size));
    }

    fn move_selection_down(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        self.select_row(abs + size);
    }

    fn move_selection_beginning(&mut self) {
        self.select_row(0);
    }

    fn move_selection_end(&mut self) {
        self.select_row(self.row_model.rows.len().saturating_sub(1));
    }

    fn move_column_selection(&mut self, step: i32) {
        let ncolumns = self.row_model.columns.len();
        if ncolumns == 0 {
            return;
        }
        self.curser_column = if step < 0 {
            self.curser_column.saturating_sub(1)
        } else {
            std::cmp::min(self.curser_column + 1, ncolumns - 1)
        };
        self.update_uidata();
    }

    // -------------------- Derived data ---------------------- //

    fn refresh(&mut self) {
        self.row_model = self.view.row_model(self.records);
        self.clamp_selection();
        self.update_uidata();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    fn calculate_column_width(&self, column: ColumnId) -> usize {
        // Leave room for the sort indicator
        let header = column.header().chars().count() + 2;
        let values = self
            .records
            .iter()
            .map(|r| r.value(column).chars().count())
            .max()
            .unwrap_or(0);
        std::cmp::min(
            std::cmp::max(header, values) + COLUMN_WIDTH_MARGIN,
            self.config.max_column_width,
        )
    }

    fn get_visible_name(name: &str, width: usize) -> String {
        if width < 3 {
            return String::new();
        }
        if name.chars().count() > width {
            let mut reduced: String = name.chars().take(width - 3).collect();
            reduced.push_str("...");
            reduced
        } else {
            name.to_string()
        }
    }

    fn update_uidata(&mut self) {
        let headers: Vec<HeaderView> = self
            .row_model
            .columns
            .iter()
            .map(|&column| HeaderView {
                column,
                name: format!("{}{}", column.header(), sort_indicator(column, &self.view.sort)),
                width: self.calculate_column_width(column),
            })
            .collect();

        let rbegin = std::cmp::min(self.offset_row, self.row_model.rows.len());
        let rend = std::cmp::min(rbegin + self.uilayout.table_height, self.row_model.rows.len());
        let rows = self.row_model.rows[rbegin..rend]
            .iter()
            .map(|&record| RowView {
                record,
                cells: headers
                    .iter()
                    .map(|h| {
                        let value = self.records[record].value(h.column);
                        CellView {
                            column: h.column,
                            text: Model::get_visible_name(value, h.width.saturating_sub(1)),
                            value,
                        }
                    })
                    .collect(),
            })
            .collect();

        let search = if self.modus == Modus::SEARCH {
            self.input.get()
        } else {
            InputResult {
                input: self.view.filter_text.clone(),
                curser_pos: self.view.filter_text.chars().count(),
                ..InputResult::default()
            }
        };

        self.uidata = UIData {
            active_tab: self.view.active_tab,
            toolbar_visible: self.view.toolbar_visible,
            search_visible: self.view.search_visible,
            active_search: self.modus == Modus::SEARCH,
            search,
            headers,
            rows,
            nrows: self.row_model.rows.len(),
            total_rows: self.records.len(),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            abs_selected_row: self.offset_row + self.curser_row,
            show_popup: self.modus == Modus::POPUP,
            popup_message: if self.modus == Modus::POPUP {
                HELP_TEXT.to_string()
            } else {
                String::new()
            },
            sort_description: self.view.sort_description(),
            layout: self.uilayout.clone(),
            status_message: self.status_message.clone(),
        };
    }
}
