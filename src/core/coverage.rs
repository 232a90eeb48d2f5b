use std::{cmp::Reverse, num::NonZeroU32, ops::Range};

use chrono::{DateTime, DurationRound, Local, TimeDelta};
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::{
        forecast::SolarForecast,
        prediction::{Prediction, PredictionInterval, round_ratio},
        recording::ConsumptionRecording,
    },
    prelude::*,
    quantity::{energy::WattHours, power::Watts},
};

pub const DEFAULT_SPAN_MINUTES: NonZeroU32 = NonZeroU32::new(15).unwrap();
pub const DEFAULT_TOP_N: usize = 3;

/// Slides the recording along the forecast timeline to find the best-covered start times.
#[must_use]
pub struct CoverageSearch<'a> {
    recording: &'a ConsumptionRecording,
    forecast: &'a SolarForecast,
}

impl<'a> CoverageSearch<'a> {
    pub const fn new(recording: &'a ConsumptionRecording, forecast: &'a SolarForecast) -> Self {
        Self { recording, forecast }
    }

    /// Permitted start times: from the hour after the forecast begins,
    /// and until the recording would run past the forecast end.
    #[must_use]
    pub fn start_window(&self) -> Range<DateTime<Local>> {
        let begin_at = self.forecast.info.begin_at;
        let top_of_hour = match begin_at.duration_trunc(TimeDelta::hours(1)) {
            Ok(top_of_hour) => top_of_hour,
            Err(error) => {
                warn!(%begin_at, "failed to truncate the forecast begin to the hour: {error}");
                begin_at
            }
        };
        let earliest = top_of_hour + TimeDelta::hours(1);
        let latest = self.forecast.info.end_at - self.recording.span();
        earliest..latest
    }

    /// Candidate start times, stepping by the span from the earliest start.
    pub fn candidates(&self, span: TimeDelta) -> impl Iterator<Item = DateTime<Local>> + use<> {
        let window = self.start_window();
        let mut next = Some(window.start);
        std::iter::from_fn(move || {
            let current = next.filter(|start| *start < window.end)?;
            next = current.checked_add_signed(span);
            Some(current)
        })
    }

    /// Rank the candidates by the covered energy, best first.
    ///
    /// Candidates which cover nothing are discarded. Ties go to the earlier start.
    #[instrument(
        skip_all,
        fields(recording_id = %self.recording.id, span_minutes = span_minutes.get(), top_n = top_n),
    )]
    pub fn rank(&self, span_minutes: NonZeroU32, top_n: usize) -> Vec<Prediction> {
        let span = TimeDelta::minutes(i64::from(span_minutes.get()));
        let predictions = self
            .candidates(span)
            .map(|begin| self.simulate(begin))
            .filter(|prediction| prediction.energy_covered > WattHours::ZERO)
            .sorted_by_key(|prediction| {
                (Reverse(OrderedFloat(prediction.energy_covered.0)), prediction.begin)
            })
            .take(top_n)
            .collect_vec();
        info!(n_predictions = predictions.len(), "ranked");
        predictions
    }

    /// Replay the recording starting at `begin` against the forecast.
    pub fn simulate(&self, begin: DateTime<Local>) -> Prediction {
        let interval_length = self.recording.interval_length();
        let length_minutes = f64::from(self.recording.interval_length_minutes.get());

        let mut interval_begin = begin;
        let mut total_deficit_watt_minutes = 0.0;
        let mut intervals = Vec::with_capacity(self.recording.intervals.len());

        for recorded in &self.recording.intervals {
            let power_required = recorded.average_power;
            let power_available = self.forecast.power_after(interval_begin);
            let power_deficit = (power_required - power_available).max(Watts::ZERO);
            intervals.push(PredictionInterval {
                begin: interval_begin,
                power_required,
                power_available,
                power_deficit,
                coverage_ratio: if power_required > Watts::ZERO {
                    round_ratio(power_available.0 / power_required.0)
                } else {
                    1.0
                },
            });
            total_deficit_watt_minutes += power_deficit.0 * length_minutes;
            interval_begin += interval_length;
        }

        let energy_consumption = self.recording.total_consumption;
        let total_deficit = WattHours::from(total_deficit_watt_minutes / 60.0).round();
        let energy_covered = energy_consumption - total_deficit;
        let coverage_ratio = if energy_consumption > WattHours::ZERO {
            round_ratio(energy_covered.0 / energy_consumption.0).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Prediction {
            begin,
            recording_id: self.recording.id.clone(),
            energy_consumption,
            energy_covered,
            coverage_ratio,
            intervals,
        }
    }
}
