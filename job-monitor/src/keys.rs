//! Key bindings for the shortcut legend.
//!
//! The dispatcher only resolves keys that appear in the shortcut set the
//! legend is currently showing, and never resolves a disabled entry. Legend
//! and bindings therefore cannot drift apart.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::MonitorAction;
use crate::widgets::ShortcutAction;

/// Key printed in the legend for `action`.
pub fn default_key(action: MonitorAction) -> &'static str {
    match action {
        MonitorAction::Pause => "P",
        MonitorAction::Resume => "R",
        MonitorAction::Cancel => "C",
        MonitorAction::Refresh => "F5",
        MonitorAction::Quit => "Q",
        MonitorAction::ScrollLogsUp => "↑",
        MonitorAction::ScrollLogsDown => "↓",
    }
}

/// Parse a legend key label into the key code it stands for.
pub fn parse_key(label: &str) -> Option<KeyCode> {
    match label {
        "↑" => return Some(KeyCode::Up),
        "↓" => return Some(KeyCode::Down),
        "Esc" => return Some(KeyCode::Esc),
        "Enter" => return Some(KeyCode::Enter),
        _ => {}
    }

    if let Some(n) = label.strip_prefix('F') {
        if let Ok(n) = n.parse::<u8>() {
            return Some(KeyCode::F(n));
        }
    }

    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeyCode::Char(c.to_ascii_lowercase())),
        _ => None,
    }
}

/// Fold aliases onto the keys used in the legend.
fn canonical(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char('k') => KeyCode::Up,
        KeyCode::Char('j') => KeyCode::Down,
        KeyCode::Esc => KeyCode::Char('q'),
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Map a key press onto an enabled shortcut.
///
/// Ctrl+C always quits.
pub fn resolve_key(event: &KeyEvent, shortcuts: &[ShortcutAction]) -> Option<MonitorAction> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(MonitorAction::Quit);
    }

    let code = canonical(event.code);
    shortcuts
        .iter()
        .filter(|shortcut| !shortcut.disabled)
        .find(|shortcut| parse_key(&shortcut.key).map(canonical) == Some(code))
        .and_then(|shortcut| shortcut.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shortcuts() -> Vec<ShortcutAction> {
        vec![
            ShortcutAction::for_action("C", MonitorAction::Cancel),
            ShortcutAction::for_action("P", MonitorAction::Pause).disabled(true),
            ShortcutAction::for_action("F5", MonitorAction::Refresh),
            ShortcutAction::for_action("Q", MonitorAction::Quit),
            ShortcutAction::for_action("↑", MonitorAction::ScrollLogsUp),
        ]
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(parse_key("P"), Some(KeyCode::Char('p')));
        assert_eq!(parse_key("↑"), Some(KeyCode::Up));
        assert_eq!(parse_key("Fx"), None);
        assert_eq!(parse_key("Ctrl"), None);
    }

    #[test]
    fn test_resolves_case_insensitively() {
        let set = shortcuts();
        assert_eq!(
            resolve_key(&press(KeyCode::Char('c')), &set),
            Some(MonitorAction::Cancel)
        );
        assert_eq!(
            resolve_key(&press(KeyCode::Char('C')), &set),
            Some(MonitorAction::Cancel)
        );
        assert_eq!(
            resolve_key(&press(KeyCode::F(5)), &set),
            Some(MonitorAction::Refresh)
        );
    }

    #[test]
    fn test_disabled_and_unknown_keys_are_ignored() {
        let set = shortcuts();
        assert_eq!(resolve_key(&press(KeyCode::Char('p')), &set), None);
        assert_eq!(resolve_key(&press(KeyCode::Char('z')), &set), None);
    }

    #[test]
    fn test_aliases() {
        let set = shortcuts();
        assert_eq!(
            resolve_key(&press(KeyCode::Esc), &set),
            Some(MonitorAction::Quit)
        );
        assert_eq!(
            resolve_key(&press(KeyCode::Char('k')), &set),
            Some(MonitorAction::ScrollLogsUp)
        );
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(resolve_key(&ctrl_c, &[]), Some(MonitorAction::Quit));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut event = press(KeyCode::Char('q'));
        event.kind = KeyEventKind::Release;
        assert_eq!(resolve_key(&event, &shortcuts()), None);
    }
}
