use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action_queue::{Action, ActionTx};

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

pub(super) fn handle_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') if app.input.is_empty() => app.quit(),
            KeyCode::Char('c') => app.input.clear(),
            KeyCode::Char('r') => enqueue_action(action_tx, Action::Reload),
            _ => {}
        }
        return;
    }

    if app.view().current_alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.page.view_mut().dismiss_alert();
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') if app.input.is_empty() => app.quit(),
        KeyCode::Esc => app.input.clear(),
        KeyCode::Up => app.scroll_entries_up(),
        KeyCode::Down => app.scroll_entries_down(),
        _ if !app.view().accepts_input() => {}
        KeyCode::Tab | KeyCode::BackTab => app.toggle_input_target(),
        KeyCode::Enter => enqueue_action(action_tx, Action::SubmitInput),
        KeyCode::Char(c) => app.input.insert(c),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.home(),
        KeyCode::End => app.input.end(),
        _ => {}
    }
}
