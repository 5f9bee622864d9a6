//! Key mapping from terminal events to game actions.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map a key press to a game action.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(GameAction::MoveLeft)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(GameAction::MoveRight)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(GameAction::FastDropStart)
        }

        // Rotation
        KeyCode::Up
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W') => Some(GameAction::RotateCw),

        // Actions
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Char('e') | KeyCode::Char('E') => {
            Some(GameAction::ClearOfficers)
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameAction::Pause),

        // Restart
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),

        _ => None,
    }
}

/// Map a key release. Only the fast-drop keys care about releases.
pub fn handle_key_release(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(GameAction::FastDropEnd)
        }
        _ => None,
    }
}

/// Route a key event by kind. Repeats are treated as presses.
pub fn map_key(key: KeyEvent) -> Option<GameAction> {
    match key.kind {
        KeyEventKind::Release => handle_key_release(key),
        KeyEventKind::Press | KeyEventKind::Repeat => handle_key_event(key),
    }
}

/// Fast drop on terminals without release events: a second press of the drop
/// key ends it and autorepeat is ignored. With releases the action passes
/// through unchanged.
pub fn toggle_fast_drop(
    action: GameAction,
    kind: KeyEventKind,
    releases: bool,
    fast_drop_active: bool,
) -> Option<GameAction> {
    if releases || !matches!(action, GameAction::FastDropStart) {
        return Some(action);
    }
    match kind {
        KeyEventKind::Repeat => None,
        _ if fast_drop_active => Some(GameAction::FastDropEnd),
        _ => Some(action),
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(GameAction::MoveLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('d'))),
            Some(GameAction::MoveRight)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('J'))),
            Some(GameAction::FastDropStart)
        );
    }

    #[test]
    fn test_rotation_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Up)),
            Some(GameAction::RotateCw)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('W'))),
            Some(GameAction::RotateCw)
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('x'))),
            Some(GameAction::ClearOfficers)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('p'))),
            Some(GameAction::Pause)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('R'))),
            Some(GameAction::Restart)
        );
    }

    #[test]
    fn test_release_ends_fast_drop() {
        assert_eq!(map_key(release(KeyCode::Down)), Some(GameAction::FastDropEnd));
        assert_eq!(map_key(release(KeyCode::Left)), None);
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Down)),
            Some(GameAction::FastDropStart)
        );
    }

    #[test]
    fn test_toggle_ignores_autorepeat() {
        let start = GameAction::FastDropStart;
        assert_eq!(toggle_fast_drop(start, KeyEventKind::Press, false, false), Some(start));
        assert_eq!(toggle_fast_drop(start, KeyEventKind::Repeat, false, true), None);
        assert_eq!(toggle_fast_drop(start, KeyEventKind::Repeat, false, false), None);
        assert_eq!(
            toggle_fast_drop(start, KeyEventKind::Press, false, true),
            Some(GameAction::FastDropEnd)
        );
        assert_eq!(toggle_fast_drop(start, KeyEventKind::Repeat, true, true), Some(start));
        assert_eq!(
            toggle_fast_drop(GameAction::MoveLeft, KeyEventKind::Repeat, false, true),
            Some(GameAction::MoveLeft)
        );
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }
}
