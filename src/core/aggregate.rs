use std::num::NonZeroU32;

use average::Variance;
use chrono::{DateTime, Local, TimeDelta};

use crate::{
    core::{
        reading::ReadingSeries,
        recording::{ConsumptionInterval, ConsumptionRecording},
    },
    prelude::*,
    quantity::{Quantity, energy::WattHours},
};

pub const DEFAULT_INTERVAL_LENGTH_MINUTES: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Aggregate the raw readings into fixed-width buckets starting at the first reading.
///
/// A reading belongs to the current bucket while it is strictly before the bucket end.
/// After a gap in the series, the bucket boundary catches up past the reading,
/// so that the following readings stay aligned with their actual buckets.
/// Empty buckets are never synthesized.
///
/// The averages and deviations are rounded half away from zero to whole watts.
/// The total energy is rounded once, after summing the unrounded per-bucket energies.
///
/// An empty series produces an empty recording: callers are expected to reject it beforehand.
#[instrument(skip_all, fields(entity_id = %series.entity_id, n_readings = series.readings.len()))]
pub fn aggregate(
    series: &ReadingSeries,
    name: &str,
    interval_length_minutes: NonZeroU32,
) -> ConsumptionRecording {
    let interval_length = TimeDelta::minutes(i64::from(interval_length_minutes.get()));
    let buckets = bucket(series, interval_length);

    let intervals: Vec<ConsumptionInterval> = buckets
        .iter()
        .map(|values| {
            let estimate: Variance = values.iter().copied().collect();
            let std_deviation =
                if estimate.len() < 2 { 0.0 } else { estimate.sample_variance().sqrt() };
            ConsumptionInterval {
                average_power: Quantity(estimate.mean()).round(),
                std_deviation: Quantity(std_deviation).round(),
            }
        })
        .collect();

    let total_consumption: WattHours =
        intervals.iter().map(|interval| interval.average_power * interval_length).sum();

    let recording = ConsumptionRecording::builder()
        .entity_id(&series.entity_id)
        .maybe_unit_of_measurement(series.unit_of_measurement.clone())
        .interval_length_minutes(interval_length_minutes)
        .intervals(intervals)
        .total_consumption(total_consumption.round())
        .build();
    let recording = ConsumptionRecording {
        name: if name.is_empty() { recording.id.clone() } else { name.to_owned() },
        ..recording
    };
    info!(
        id = %recording.id,
        n_intervals = recording.intervals.len(),
        total_consumption = %recording.total_consumption,
        "aggregated",
    );
    recording
}

/// Split the reading values into the populated buckets.
fn bucket(series: &ReadingSeries, interval_length: TimeDelta) -> Vec<Vec<f64>> {
    let Some(mut boundary) = series
        .first_reading_at
        .or_else(|| series.readings.first().map(|reading| reading.timestamp))
    else {
        return Vec::new();
    };

    let mut buckets: Vec<Vec<f64>> = Vec::new();
    for reading in &series.readings {
        match buckets.last_mut() {
            Some(values) if reading.timestamp < boundary => values.push(reading.value.0),
            _ => {
                buckets.push(vec![reading.value.0]);
                boundary = next_boundary(boundary, reading.timestamp, interval_length);
            }
        }
    }
    buckets
}

/// Advance the boundary by at least one interval and until it is past the timestamp.
fn next_boundary(
    mut boundary: DateTime<Local>,
    timestamp: DateTime<Local>,
    interval_length: TimeDelta,
) -> DateTime<Local> {
    boundary += interval_length;
    if boundary <= timestamp {
        let n_missed = (timestamp - boundary).num_seconds() / interval_length.num_seconds() + 1;
        boundary += interval_length * i32::try_from(n_missed).unwrap_or(i32::MAX);
    }
    boundary
}
