use crate::{core::recording::ConsumptionRecording, prelude::*, storage::BlobStore};

/// Persistent collection of the consumption recordings.
pub trait RecordingStore {
    fn list(&self) -> Result<Vec<ConsumptionRecording>>;

    fn get(&self, id: &str) -> Result<Option<ConsumptionRecording>>;

    fn put(&self, recording: &ConsumptionRecording) -> Result;

    /// Remove the recording and tell whether it existed.
    fn delete(&self, id: &str) -> Result<bool>;
}

/// Recordings kept as a single JSON array in a blob slot.
pub struct JsonRecordings<B>(B);

impl<B: BlobStore> JsonRecordings<B> {
    pub const fn new(blob: B) -> Self {
        Self(blob)
    }

    fn write(&self, recordings: &[ConsumptionRecording]) -> Result {
        self.0.save(&serde_json::to_vec(recordings)?)
    }
}

impl<B: BlobStore> RecordingStore for JsonRecordings<B> {
    #[instrument(skip_all)]
    fn list(&self) -> Result<Vec<ConsumptionRecording>> {
        match self.0.load()? {
            Some(blob) => serde_json::from_slice(&blob).context("failed to parse the recordings"),
            None => Ok(Vec::new()),
        }
    }

    #[instrument(skip(self))]
    fn get(&self, id: &str) -> Result<Option<ConsumptionRecording>> {
        Ok(self.list()?.into_iter().find(|recording| recording.id == id))
    }

    #[instrument(skip_all, fields(id = %recording.id))]
    fn put(&self, recording: &ConsumptionRecording) -> Result {
        let mut recordings = self.list()?;
        recordings.push(recording.clone());
        self.write(&recordings)?;
        info!(n_recordings = recordings.len(), "stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&self, id: &str) -> Result<bool> {
        let mut recordings = self.list()?;
        let n_recordings = recordings.len();
        recordings.retain(|recording| recording.id != id);
        if recordings.len() == n_recordings {
            return Ok(false);
        }
        self.write(&recordings)?;
        info!(n_recordings = recordings.len(), "deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{quantity::Quantity, storage::FileBlob};

    fn recording(name: &str) -> ConsumptionRecording {
        ConsumptionRecording::builder()
            .name(name)
            .entity_id("sensor.dishwasher_power")
            .interval_length_minutes(NonZeroU32::new(5).unwrap())
            .intervals(Vec::new())
            .total_consumption(Quantity(0.0))
            .build()
    }

    #[test]
    fn test_put_get_list_delete() -> Result {
        let directory = tempfile::tempdir()?;
        let store = JsonRecordings::new(FileBlob::new(directory.path().join("recordings.json")));
        assert!(store.list()?.is_empty());

        let dishwasher = recording("Dishwasher");
        let dryer = recording("Dryer");
        store.put(&dishwasher)?;
        store.put(&dryer)?;

        assert_eq!(store.list()?.len(), 2);
        assert_eq!(store.get(&dryer.id)?.map(|recording| recording.name).as_deref(), Some("Dryer"));
        assert!(store.get("missing")?.is_none());

        assert!(store.delete(&dishwasher.id)?);
        assert!(!store.delete(&dishwasher.id)?);
        let remaining = store.list()?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, dryer.id);
        Ok(())
    }
}
