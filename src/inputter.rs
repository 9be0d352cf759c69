use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor behind the search box.
///
/// The cursor position counts characters, not bytes.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub changed: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        let before = self.current_input.clone();
        let mut result = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) | (KeyCode::Esc, _) => self.enter(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear_input(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        };
        result.changed = result.input != before;
        trace!("Search input: {:?}", result);
        result
    }

    /// Replace the content and place the cursor behind it.
    pub fn set(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
        self.finished = false;
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            finished: self.finished,
            changed: false,
            curser_pos: self.curser_pos,
        }
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn clear_input(&mut self) -> InputResult {
        self.current_input.clear();
        self.curser_pos = 0;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return self.get();
        }
        if let Some(chr) = code.as_char() {
            self.current_input.insert(self.getbytepos(), chr);
            self.curser_pos += 1;
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(input: &mut Inputter, text: &str) -> InputResult {
        let mut last = input.get();
        for chr in text.chars() {
            last = input.read(key(KeyCode::Char(chr)));
        }
        last
    }

    #[test]
    fn typing_appends_and_reports_change() {
        let mut input = Inputter::default();
        let result = type_text(&mut input, "Blocked");
        assert_eq!(result.input, "Blocked");
        assert_eq!(result.curser_pos, 7);
        assert!(result.changed);
        assert!(!result.finished);
    }

    #[test]
    fn insert_and_delete_in_the_middle() {
        let mut input = Inputter::default();
        type_text(&mut input, "Complte");
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Left));
        let result = input.read(key(KeyCode::Char('e')));
        assert_eq!(result.input, "Complete");

        input.read(key(KeyCode::Home));
        let result = input.read(key(KeyCode::Delete));
        assert_eq!(result.input, "omplete");
        let result = input.read(key(KeyCode::Backspace));
        assert_eq!(result.input, "omplete");
        assert!(!result.changed);
    }

    #[test]
    fn backspace_handles_multibyte_characters() {
        let mut input = Inputter::default();
        input.set("200 ₹");
        let result = input.read(key(KeyCode::Backspace));
        assert_eq!(result.input, "200 ");
        assert_eq!(result.curser_pos, 4);
    }

    #[test]
    fn enter_and_escape_finish_but_keep_text() {
        let mut input = Inputter::default();
        type_text(&mut input, "khan");
        let result = input.read(key(KeyCode::Enter));
        assert!(result.finished);
        assert_eq!(result.input, "khan");

        input.set("khan");
        let result = input.read(key(KeyCode::Esc));
        assert!(result.finished);
        assert_eq!(result.input, "khan");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = Inputter::default();
        input.set("Need to start");
        let result = input.read(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(result.input, "");
        assert_eq!(result.curser_pos, 0);
        assert!(result.changed);
    }

    #[test]
    fn shifted_characters_are_inserted() {
        let mut input = Inputter::default();
        let result = input.read(KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT));
        assert_eq!(result.input, "Q");
    }
}
