use crate::chat::{FlowStatus, UiHost};
use crate::models::{ChatTurn, TurnId, TurnStyle};
use crate::status_indicator::StatusIndicator;

/// The terminal's chat view state: turns, the flow status and the input line.
#[derive(Debug, Default)]
pub struct Transcript {
    pub turns: Vec<ChatTurn>,
    pub status: StatusIndicator,
    pub input: String,
    pub scroll: u16,
    // follow new output until the user scrolls up
    pub follow: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            follow: true,
            ..Self::default()
        }
    }

    pub fn scroll_up(&mut self) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(3);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(3);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
    }
}

impl UiHost for Transcript {
    fn append_turn(&mut self, turn: ChatTurn) -> TurnId {
        self.turns.push(turn);
        self.scroll_to_bottom();
        TurnId(self.turns.len() - 1)
    }

    fn update_turn(&mut self, id: TurnId, text: &str, style: TurnStyle) {
        match self.turns.get_mut(id.0) {
            Some(turn) => {
                turn.text.clear();
                turn.text.push_str(text);
                turn.style = style;
            }
            None => log::warn!("Update for missing turn {}", id.0),
        }
    }

    fn set_status(&mut self, status: FlowStatus) {
        self.status.set_status(status);
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn clear_turns(&mut self) {
        self.turns.clear();
        self.scroll = 0;
        self.follow = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turns_are_addressed_by_position() {
        let mut transcript = Transcript::new();
        let first = transcript.append_turn(ChatTurn::user("hi"));
        let second = transcript.append_turn(ChatTurn::bot_placeholder());
        assert_eq!((first, second), (TurnId(0), TurnId(1)));

        transcript.update_turn(second, "hello", TurnStyle::Normal);
        assert_eq!(transcript.turns[1].text, "hello");
        assert_eq!(transcript.turns[1].style, TurnStyle::Normal);

        // stale ids are ignored
        transcript.update_turn(TurnId(9), "nope", TurnStyle::Error);
        assert_eq!(transcript.turns.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut transcript = Transcript::new();
        transcript.input = "draft".to_string();
        transcript.append_turn(ChatTurn::user("hi"));
        transcript.scroll_up();

        transcript.clear_turns();
        transcript.clear_input();

        assert!(transcript.turns.is_empty());
        assert!(transcript.input.is_empty());
        assert!(transcript.follow);
    }
}
