use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Action, Direction};

/// What a key press asks the game to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    Restart,
    /// Show or hide the movement heatmap overlay
    ToggleHeatmap,
    /// Forget the recorded movement heatmap
    ClearHeatmap,
    Quit,
    None,
}

/// Letter bindings; matched case-insensitively
const LETTER_BINDINGS: [(char, KeyAction); 8] = [
    ('w', KeyAction::GameAction(Action::Move(Direction::Up))),
    ('s', KeyAction::GameAction(Action::Move(Direction::Down))),
    ('a', KeyAction::GameAction(Action::Move(Direction::Left))),
    ('d', KeyAction::GameAction(Action::Move(Direction::Right))),
    ('q', KeyAction::Quit),
    ('r', KeyAction::Restart),
    ('h', KeyAction::ToggleHeatmap),
    ('c', KeyAction::ClearHeatmap),
];

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('C') => KeyAction::Quit,
                _ => KeyAction::None,
            };
        }

        match key.code {
            KeyCode::Up => Direction::Up.into(),
            KeyCode::Down => Direction::Down.into(),
            KeyCode::Left => Direction::Left.into(),
            KeyCode::Right => Direction::Right.into(),
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char(c) => letter_binding(c),
            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Direction> for KeyAction {
    fn from(direction: Direction) -> Self {
        KeyAction::GameAction(Action::Move(direction))
    }
}

fn letter_binding(c: char) -> KeyAction {
    let c = c.to_ascii_lowercase();
    LETTER_BINDINGS
        .iter()
        .find(|(key, _)| *key == c)
        .map(|(_, action)| action.clone())
        .unwrap_or(KeyAction::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyAction {
        InputHandler::new().handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn press_with(code: KeyCode, modifiers: KeyModifiers) -> KeyAction {
        InputHandler::new().handle_key_event(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_arrow_keys() {
        let cases = [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Down, Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::Right, Direction::Right),
        ];
        for (code, direction) in cases {
            assert_eq!(press(code), KeyAction::GameAction(Action::Move(direction)));
        }
    }

    #[test]
    fn test_wasd_keys_ignore_case() {
        let cases = [
            ('w', Direction::Up),
            ('a', Direction::Left),
            ('s', Direction::Down),
            ('d', Direction::Right),
        ];
        for (c, direction) in cases {
            let expected = KeyAction::GameAction(Action::Move(direction));
            assert_eq!(press(KeyCode::Char(c)), expected);
            assert_eq!(
                press_with(KeyCode::Char(c.to_ascii_uppercase()), KeyModifiers::SHIFT),
                expected
            );
        }
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(press(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(press(KeyCode::Esc), KeyAction::Quit);
        assert_eq!(press(KeyCode::Char('R')), KeyAction::Restart);
        assert_eq!(press(KeyCode::Char('h')), KeyAction::ToggleHeatmap);
        assert_eq!(press(KeyCode::Char('C')), KeyAction::ClearHeatmap);
    }

    #[test]
    fn test_ctrl_c_quits_instead_of_clearing() {
        assert_eq!(
            press_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit
        );
        assert_eq!(
            press_with(KeyCode::Char('r'), KeyModifiers::CONTROL),
            KeyAction::None
        );
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(press(KeyCode::Char('x')), KeyAction::None);
        assert_eq!(press(KeyCode::Char('7')), KeyAction::None);
        assert_eq!(press(KeyCode::Tab), KeyAction::None);
    }
}
