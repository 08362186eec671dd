//! Interactive board runner

use std::process::ExitCode;

use tracing::{debug, info};

use crate::application::ports::{AudioDeviceGateway, Notifier, RecordStore};
use crate::application::{BoardSnapshot, RecordToggle, Soundboard, SoundboardConfig};
use crate::domain::effects::EffectCatalog;
use crate::domain::recorder::RecorderState;
use crate::infrastructure::{create_notifier, RodioGateway, SqliteRecordStore};

use super::app::{EXIT_ERROR, EXIT_SUCCESS};
use super::args::BoardOptions;
use super::console::{spawn_stdin_reader, BoardCommand};
use super::presenter::Presenter;
use super::signals::ShutdownSignals;

/// Run the board until `q`, end of input, or a shutdown signal
pub async fn run_board(options: BoardOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let gateway = match RodioGateway::open(&options.recordings_dir) {
        Ok(gateway) => gateway,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let store = match SqliteRecordStore::open(&options.database) {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let mut signals = match ShutdownSignals::new() {
        Ok(signals) => signals,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let catalog = EffectCatalog::from_dir(&options.effects_dir);
    for key in catalog.missing() {
        presenter.warn(&format!(
            "{} not found in {}",
            key.file_name(),
            options.effects_dir.display()
        ));
    }

    let config = SoundboardConfig {
        quality: options.quality,
        enable_notify: options.notify,
        restore_slots: options.restore_slots,
        preload_effects: options.preload_effects,
    };
    let (board, mut completions) = Soundboard::open(
        gateway,
        store,
        create_notifier(options.notify),
        catalog,
        config,
    )
    .await;

    let mut updates = board.subscribe();
    let mut input = spawn_stdin_reader();
    let mut recorder = RecorderState::Idle;

    presenter.help();
    presenter.board(&updates.borrow_and_update());

    loop {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<BoardCommand>() {
                    Ok(BoardCommand::Quit) => break,
                    Ok(command) => dispatch(&board, &presenter, command).await,
                    Err(e) => presenter.warn(&e),
                }
            }
            Some(token) = completions.recv() => {
                if let Some(key) = board.on_playback_finished(token).await {
                    presenter.info(&format!("{} finished", key));
                }
            }
            Ok(()) = updates.changed() => {
                let snapshot = updates.borrow_and_update().clone();
                follow_recorder(&mut presenter, &mut recorder, &snapshot);
            }
            _ = signals.recv() => {
                debug!("shutdown signal");
                break;
            }
        }
    }

    presenter.stop_spinner();
    board.close().await;
    info!("exiting");
    ExitCode::from(EXIT_SUCCESS)
}

async fn dispatch<G, S, N>(board: &Soundboard<G, S, N>, presenter: &Presenter, command: BoardCommand)
where
    G: AudioDeviceGateway,
    S: RecordStore,
    N: Notifier,
{
    match command {
        BoardCommand::Toggle(key) => match board.toggle_sound(key).await {
            Ok(state) => presenter.sound_state(key, state),
            Err(e) => presenter.error(&e.to_string()),
        },
        BoardCommand::Record => match board.toggle_recording().await {
            Ok(RecordToggle::Started) => {}
            Ok(RecordToggle::Stored(index)) => presenter.success(&format!("Saved to {}", index)),
            Err(e) => presenter.error(&e.to_string()),
        },
        BoardCommand::Status => presenter.board(&board.snapshot().await),
        BoardCommand::Help => presenter.help(),
        BoardCommand::Quit => {}
    }
}

/// Keep the recording spinner in step with the recorder state
fn follow_recorder(presenter: &mut Presenter, last: &mut RecorderState, snapshot: &BoardSnapshot) {
    if snapshot.recorder == *last {
        return;
    }
    *last = snapshot.recorder;

    match snapshot.recorder {
        RecorderState::Recording => presenter.start_spinner(&format!(
            "Recording into {} (r to stop)",
            snapshot.next_slot
        )),
        RecorderState::Finishing => presenter.update_spinner("Saving clip"),
        RecorderState::Idle | RecorderState::Arming => presenter.stop_spinner(),
    }
}
