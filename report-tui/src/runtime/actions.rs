use crate::app::{App, InputTarget};
use tracing::info;

use super::action_queue::Action;

pub(super) async fn run_action(action: Action, app: &mut App) {
    match action {
        Action::SubmitInput => submit_input(app).await,
        Action::Reload => {
            if app.page.load_and_display().await.is_ok() {
                app.set_status("Reloaded");
            }
        }
    }
}

async fn submit_input(app: &mut App) {
    match app.input_target {
        InputTarget::Entry => {
            let Some(text) = app.input.submission().map(str::to_string) else {
                return;
            };
            if app.page.submit_report_entry(&text).await {
                info!("Added report entry");
                app.input.clear();
                app.set_status("Entry added");
            }
        }
        InputTarget::Summary => {
            let text = app.input.value.clone();
            if app.page.submit_summary(&text).await {
                info!("Updated summary");
                app.toggle_input_target();
                app.set_status("Summary updated");
            }
        }
    }
}
