use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, DialogKind};

/// Handle a key event, dispatching on the current mode.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode.clone() {
        AppMode::Normal => handle_normal_key(app, key),
        AppMode::FilterInput => handle_filter_key(app, key),
        AppMode::Dialog(DialogKind::Rename { .. }) => handle_input_dialog_key(app, key),
        AppMode::Dialog(DialogKind::DeleteConfirm { .. }) => handle_confirm_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('E') => app.expand_all(),
        KeyCode::Char('a') => app.start_add(),
        KeyCode::Char('r') | KeyCode::F(2) => app.start_rename(),
        KeyCode::Char('d') | KeyCode::Delete => app.start_delete(),
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('m') => app.toggle_filter_mode(),
        KeyCode::Esc => app.clear_filter(),
        _ => {}
    }
}

fn handle_filter_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.commit_filter(),
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::Left => app.filter_input.move_left(),
        KeyCode::Right => app.filter_input.move_right(),
        KeyCode::Backspace => {
            app.filter_input.delete_char();
            app.update_filter();
        }
        KeyCode::Char(c) => {
            app.filter_input.insert_char(c);
            app.update_filter();
        }
        _ => {}
    }
}

fn handle_input_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Esc => app.cancel_dialog(),
        KeyCode::Backspace => app.dialog_state.delete_char(),
        KeyCode::Left => app.dialog_state.move_left(),
        KeyCode::Right => app.dialog_state.move_right(),
        KeyCode::Home => app.dialog_state.home(),
        KeyCode::End => app.dialog_state.end(),
        KeyCode::Char(c) => app.dialog_state.insert_char(c),
        _ => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_dialog(),
        _ => {}
    }
}

/// Handle a mouse event. Only the wheel is bound.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != AppMode::Normal {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::Checklist;
    use crate::tree::{sample_checklist, FilterMode};
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn press_all(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            handle_key_event(app, key(*code));
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key_event(app, key(KeyCode::Char(c)));
        }
    }

    fn setup_app() -> App {
        App::new(
            Checklist::new(sample_checklist(), FilterMode::Hide, false),
            true,
            false,
        )
    }

    fn selected_name(app: &App) -> String {
        let record = app.selected_record().unwrap();
        app.checklist.view().record(record).unwrap().name.clone()
    }

    #[test]
    fn quit_keys() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = setup_app();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn q_types_into_dialog_instead_of_quitting() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Char('r')]);
        type_text(&mut app, "q");
        assert!(!app.should_quit);
        assert_eq!(app.dialog_state.input, "Fruitsq");
    }

    #[test]
    fn navigation_and_expansion() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Char('l'), KeyCode::Char('j')]);
        assert_eq!(selected_name(&app), "Bananas");
        press_all(&mut app, &[KeyCode::Left]);
        assert_eq!(selected_name(&app), "Fruits");
        press_all(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.rows.len(), 2);
        press_all(&mut app, &[KeyCode::Char('E'), KeyCode::Char('G')]);
        assert_eq!(selected_name(&app), "Carrots");
    }

    #[test]
    fn add_child_via_keys() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Char('a')]);
        type_text(&mut app, "Kiwis");
        press_all(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(selected_name(&app), "Kiwis");
    }

    #[test]
    fn escape_cancels_add() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Char('a'), KeyCode::Esc]);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(crate::tree::node::count(app.checklist.roots()), 8);
    }

    #[test]
    fn delete_with_confirmation() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Delete, KeyCode::Char('n')]);
        assert_eq!(app.rows.len(), 2);
        press_all(&mut app, &[KeyCode::Char('d'), KeyCode::Char('y')]);
        assert_eq!(app.rows.len(), 1);
        assert_eq!(selected_name(&app), "Vegetables");
    }

    #[test]
    fn filter_typing_is_live_and_escape_clears() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Char('/')]);
        assert_eq!(app.mode, AppMode::FilterInput);
        type_text(&mut app, "blue");
        assert_eq!(app.rows.len(), 3);
        press_all(&mut app, &[KeyCode::Backspace]);
        assert_eq!(app.filter_input.input, "blu");

        press_all(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.checklist.view().is_filtering());

        press_all(&mut app, &[KeyCode::Esc]);
        assert!(!app.checklist.view().is_filtering());
    }

    #[test]
    fn mode_toggle_key() {
        let mut app = setup_app();
        press_all(&mut app, &[KeyCode::Char('m')]);
        assert_eq!(app.checklist.view().mode(), FilterMode::Prune);
    }

    #[test]
    fn mouse_wheel_moves_selection() {
        let mut app = setup_app();
        let wheel = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(&mut app, wheel(MouseEventKind::ScrollDown));
        assert_eq!(app.selected_index, 1);
        handle_mouse_event(&mut app, wheel(MouseEventKind::ScrollUp));
        assert_eq!(app.selected_index, 0);
    }
}
