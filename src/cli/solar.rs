use crate::{
    cli::{ContextArgs, PredictArgs},
    context::Context,
    core::{coverage::CoverageSearch, provider::ForecastProvider},
    error::Failure,
    prelude::*,
    storage::RecordingStore,
    tables::{
        build_forecast_table,
        build_prediction_table,
        build_predictions_table,
        build_site_check_table,
    },
};

pub async fn forecast(args: ContextArgs) -> Result {
    let context = Context::try_new(args)?;
    let forecast = context.forecasts.get_forecast(&context.site).await?;
    println!("{}", build_forecast_table(&forecast));
    Ok(())
}

pub async fn check(args: ContextArgs) -> Result {
    let context = Context::try_new(args)?;
    let check = context.forecasts.provider().check(&context.site).await?;
    info!("the site is valid");
    println!("{}", build_site_check_table(&check));
    Ok(())
}

#[instrument(skip_all, fields(recording_id = %args.recording_id))]
pub async fn predict(args: PredictArgs) -> Result {
    let context = Context::try_new(args.context)?;
    let recording = context.recordings.get(&args.recording_id)?.ok_or_else(|| {
        Failure::DataUnavailable(format!("no recording `{}`", args.recording_id))
    })?;
    let forecast = context.forecasts.get_forecast(&context.site).await?;
    if forecast.is_empty() {
        return Err(Failure::DataUnavailable("the forecast is empty".to_owned()).into());
    }

    let predictions =
        CoverageSearch::new(&recording, &forecast).rank(args.span_minutes, args.top_n);
    if predictions.is_empty() {
        warn!("no start time within the forecast horizon gets any solar coverage");
        return Ok(());
    }
    println!("{}", build_predictions_table(&predictions));
    for prediction in &predictions {
        println!("{}", build_prediction_table(prediction));
    }
    Ok(())
}
