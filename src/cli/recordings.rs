use crate::{
    cli::{RecordingsArgs, RecordingsCommand},
    error::Failure,
    prelude::*,
    storage::RecordingStore,
    tables::{build_recording_table, build_recordings_table},
};

pub fn recordings(args: &RecordingsArgs) -> Result {
    let store = args.storage.recordings();
    match &args.command {
        RecordingsCommand::List => {
            println!("{}", build_recordings_table(&store.list()?));
        }
        RecordingsCommand::Show { id } => {
            let recording = store
                .get(id)?
                .ok_or_else(|| Failure::DataUnavailable(format!("no recording `{id}`")))?;
            println!("{}", build_recording_table(&recording));
        }
        RecordingsCommand::Delete { id } => {
            if store.delete(id)? {
                info!(%id, "deleted");
            } else {
                warn!(%id, "no such recording");
            }
        }
    }
    Ok(())
}
