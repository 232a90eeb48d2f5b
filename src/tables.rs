use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    api::home_assistant::Entity,
    core::{
        forecast::SolarForecast,
        prediction::Prediction,
        provider::SiteCheck,
        reading::ReadingSeries,
        recording::ConsumptionRecording,
    },
    quantity::power::Watts,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn ratio_cell(ratio: f64) -> Cell {
    Cell::new(format!("{:.0}%", ratio * 100.0)).set_alignment(CellAlignment::Right).fg(
        if ratio >= 1.0 {
            Color::Green
        } else if ratio >= 0.5 {
            Color::DarkYellow
        } else {
            Color::Red
        },
    )
}

fn power_cell(power: Watts) -> Cell {
    let cell = Cell::new(power).set_alignment(CellAlignment::Right);
    if power > Watts::ZERO { cell } else { cell.add_attribute(Attribute::Dim) }
}

pub fn build_entities_table(entities: &[Entity]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Entity", "Name", "Unit"]);
    for entity in entities {
        table.add_row(vec![
            Cell::new(&entity.id),
            Cell::new(entity.name.as_deref().unwrap_or_default()),
            Cell::new(entity.unit_of_measurement.as_deref().unwrap_or_default())
                .add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_readings_table(series: &ReadingSeries) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Power"]);
    for reading in &series.readings {
        table.add_row(vec![
            Cell::new(reading.timestamp.format("%Y-%m-%d %H:%M:%S")),
            power_cell(reading.value),
        ]);
    }
    table
}

pub fn build_recordings_table(recordings: &[ConsumptionRecording]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Name", "Entity", "Recorded", "Duration", "Peak", "Total"]);
    for recording in recordings {
        table.add_row(vec![
            Cell::new(&recording.id).add_attribute(Attribute::Dim),
            Cell::new(&recording.name),
            Cell::new(&recording.entity_id),
            Cell::new(recording.recorded_at.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{} min", recording.span().num_minutes()))
                .set_alignment(CellAlignment::Right),
            power_cell(recording.peak_power()),
            Cell::new(recording.total_consumption).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_recording_table(recording: &ConsumptionRecording) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Offset", "Average", "Deviation"]);
    let interval_length = recording.interval_length();
    for (offset, interval) in (0..).map(|i| interval_length * i).zip(&recording.intervals) {
        table.add_row(vec![
            Cell::new(format!("+{} min", offset.num_minutes())).add_attribute(Attribute::Dim),
            power_cell(interval.average_power),
            Cell::new(interval.std_deviation).set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(recording.total_consumption)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    table
}

pub fn build_forecast_table(forecast: &SolarForecast) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Power"]);
    for point in &forecast.intervals {
        table.add_row(vec![Cell::new(point.timestamp.format("%a %H:%M")), power_cell(point.power)]);
    }
    table
}

pub fn build_site_check_table(check: &SiteCheck) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Place", "Time zone", "Latitude", "Longitude"]);
    table.add_row(vec![
        Cell::new(check.place.as_deref().unwrap_or("unknown")),
        Cell::new(check.timezone.as_deref().unwrap_or("unknown")),
        Cell::new(check.latitude).set_alignment(CellAlignment::Right),
        Cell::new(check.longitude).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Summary of the best start times.
pub fn build_predictions_table(predictions: &[Prediction]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Start", "Consumption", "Covered", "Coverage"]);
    for prediction in predictions {
        table.add_row(vec![
            Cell::new(prediction.begin.format("%a %H:%M")),
            Cell::new(prediction.energy_consumption).set_alignment(CellAlignment::Right),
            Cell::new(prediction.energy_covered).set_alignment(CellAlignment::Right),
            ratio_cell(prediction.coverage_ratio),
        ]);
    }
    table
}

/// Interval breakdown of a single prediction.
pub fn build_prediction_table(prediction: &Prediction) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Time", "Required", "Available", "Deficit", "Coverage"]);
    for interval in &prediction.intervals {
        table.add_row(vec![
            Cell::new(interval.begin.format("%H:%M")),
            Cell::new(interval.power_required).set_alignment(CellAlignment::Right),
            power_cell(interval.power_available),
            Cell::new(interval.power_deficit).set_alignment(CellAlignment::Right).fg(
                if interval.power_deficit > Watts::ZERO { Color::Red } else { Color::Green },
            ),
            ratio_cell(interval.coverage_ratio),
        ]);
    }
    table
}
