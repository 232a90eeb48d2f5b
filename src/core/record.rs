use std::{num::NonZeroU32, ops::Range};

use chrono::{DateTime, Local};

use crate::{
    core::{aggregate::aggregate, provider::HistoryProvider, recording::ConsumptionRecording},
    error::Failure,
    prelude::*,
    storage::RecordingStore,
};

/// What to record: the entity, the period, and how to bucket the readings.
#[must_use]
#[derive(Clone, Debug, bon::Builder)]
pub struct RecordRequest {
    #[builder(into)]
    pub entity_id: String,

    pub period: Range<DateTime<Local>>,

    #[builder(into, default)]
    pub name: String,

    #[builder(default = crate::core::aggregate::DEFAULT_INTERVAL_LENGTH_MINUTES)]
    pub interval_length_minutes: NonZeroU32,
}

/// Fetch the readings, aggregate them, and persist the resulting recording.
#[instrument(skip_all, fields(entity_id = %request.entity_id))]
pub async fn record<H, R>(
    history: &H,
    recordings: &R,
    request: &RecordRequest,
) -> Result<ConsumptionRecording>
where
    H: HistoryProvider,
    R: RecordingStore,
{
    let series = history.get_readings(&request.entity_id, request.period.clone()).await?;
    if series.is_empty() {
        return Err(Failure::DataUnavailable(format!(
            "no readings for `{}` between {} and {}",
            request.entity_id, request.period.start, request.period.end,
        ))
        .into());
    }
    let recording = aggregate(&series, &request.name, request.interval_length_minutes);
    recordings.put(&recording)?;
    Ok(recording)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::{
        core::reading::{Reading, ReadingSeries},
        error::FailureKind,
        quantity::Quantity,
        storage::{FileBlob, JsonRecordings},
    };

    struct FixedHistory(Vec<Reading>);

    #[async_trait]
    impl HistoryProvider for FixedHistory {
        async fn get_readings(
            &self,
            entity_id: &str,
            period: Range<DateTime<Local>>,
        ) -> Result<ReadingSeries> {
            let readings = self
                .0
                .iter()
                .filter(|reading| period.contains(&reading.timestamp))
                .copied()
                .collect();
            Ok(ReadingSeries::from_readings(entity_id, Some("W".to_owned()), readings))
        }
    }

    struct NeverStore(AtomicUsize);

    impl RecordingStore for NeverStore {
        fn list(&self) -> Result<Vec<ConsumptionRecording>> {
            Ok(Vec::new())
        }

        fn get(&self, _id: &str) -> Result<Option<ConsumptionRecording>> {
            Ok(None)
        }

        fn put(&self, _recording: &ConsumptionRecording) -> Result {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn delete(&self, _id: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 7, 8, hour, minute, 0).unwrap()
    }

    #[tokio::test]
    async fn test_record_ok() -> Result {
        let history = FixedHistory(vec![
            Reading::new(at(8, 44), Quantity(3410.0)),
            Reading::new(at(8, 46), Quantity(3124.0)),
            Reading::new(at(8, 50), Quantity(2000.0)),
        ]);
        let directory = tempfile::tempdir()?;
        let store = JsonRecordings::new(FileBlob::new(directory.path().join("recordings.json")));
        let request = RecordRequest::builder()
            .entity_id("sensor.randometer")
            .period(at(8, 0)..at(11, 0))
            .name("Oven")
            .build();

        let recording = record(&history, &store, &request).await?;
        assert_eq!(recording.name, "Oven");
        assert_eq!(recording.intervals.len(), 2);
        assert_abs_diff_eq!(recording.intervals[0].average_power.0, 3267.0);
        assert_eq!(store.get(&recording.id)?.map(|stored| stored.intervals), Some(recording.intervals));
        Ok(())
    }

    #[tokio::test]
    async fn test_record_empty_series() {
        let history = FixedHistory(vec![Reading::new(at(8, 44), Quantity(3410.0))]);
        let store = NeverStore(AtomicUsize::new(0));
        let request = RecordRequest::builder()
            .entity_id("sensor.randometer")
            .period(at(9, 0)..at(9, 0) + TimeDelta::hours(1))
            .build();

        let error = record(&history, &store, &request).await.unwrap_err();
        assert_eq!(Failure::kind_of(&error), Some(FailureKind::DataUnavailable));
        assert_eq!(store.0.load(Ordering::Relaxed), 0);
    }
}
