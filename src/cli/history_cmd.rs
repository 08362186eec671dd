//! History command handler

use crate::application::ports::{PersistenceError, RecordStore};

use super::presenter::Presenter;

/// List the newest `limit` recordings, oldest first
pub async fn handle_history_command<S: RecordStore>(
    store: &S,
    limit: usize,
    json: bool,
    presenter: &Presenter,
) -> Result<(), PersistenceError> {
    store.ensure_schema().await?;
    let rows = store.recent_recordings(limit).await?;

    if json {
        let text = serde_json::to_string_pretty(&rows)
            .map_err(|e| PersistenceError(e.to_string()))?;
        presenter.output(&text);
    } else if rows.is_empty() {
        presenter.info("No recordings yet");
    } else {
        for row in &rows {
            presenter.history_row(row);
        }
    }

    Ok(())
}
