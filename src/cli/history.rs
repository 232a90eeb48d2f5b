use crate::{
    cli::{HomeAssistantConnectionArgs, ReadingsArgs, RecordArgs},
    core::{
        provider::HistoryProvider,
        record::{RecordRequest, record as record_consumption},
    },
    prelude::*,
    tables::{build_entities_table, build_readings_table, build_recording_table},
};

pub async fn entities(args: &HomeAssistantConnectionArgs) -> Result {
    let entities = args.try_new_client()?.get_power_entities().await?;
    println!("{}", build_entities_table(&entities));
    Ok(())
}

pub async fn readings(args: &ReadingsArgs) -> Result {
    let series = args
        .home_assistant
        .try_new_client()?
        .get_readings(&args.period.entity_id, args.period.period()?)
        .await?;
    if series.is_empty() {
        warn!(entity_id = %series.entity_id, "no readings in the period");
    }
    println!("{}", build_readings_table(&series));
    Ok(())
}

pub async fn record(args: RecordArgs) -> Result {
    let request = RecordRequest::builder()
        .entity_id(args.period.entity_id.as_str())
        .period(args.period.period()?)
        .name(args.name)
        .interval_length_minutes(args.interval_length_minutes)
        .build();
    let history = args.home_assistant.try_new_client()?;
    let recording = record_consumption(&history, &args.storage.recordings(), &request).await?;
    info!(id = %recording.id, total = %recording.total_consumption, "recorded");
    println!("{}", build_recording_table(&recording));
    Ok(())
}
