mod history;
mod recordings;
mod solar;

use std::{num::NonZeroU32, ops::Range, path::PathBuf};

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use reqwest::Url;

pub use self::{
    history::{entities, readings, record},
    recordings::recordings,
    solar::{check, forecast, predict},
};
use crate::{
    api::{forecast_solar, home_assistant},
    core::{
        aggregate::DEFAULT_INTERVAL_LENGTH_MINUTES,
        coverage::{DEFAULT_SPAN_MINUTES, DEFAULT_TOP_N},
        forecast::SolarSite,
    },
    prelude::*,
    storage::{FileBlob, JsonRecordings},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the Home Assistant entities which report power.
    #[clap(name = "entities")]
    Entities(HomeAssistantConnectionArgs),

    /// Show the raw sensor readings of an entity.
    #[clap(name = "readings")]
    Readings(Box<ReadingsArgs>),

    /// Aggregate the sensor readings into a consumption recording and store it.
    #[clap(name = "record")]
    Record(Box<RecordArgs>),

    /// Manage the stored consumption recordings.
    #[clap(name = "recordings")]
    Recordings(Box<RecordingsArgs>),

    /// Show the solar forecast, fetching a fresh one if the cached one is outdated.
    #[clap(name = "forecast")]
    Forecast(Box<ContextArgs>),

    /// Validate the solar panel geometry with the forecast provider.
    #[clap(name = "check")]
    Check(Box<ContextArgs>),

    /// Find the start times at which the forecast best covers a recording.
    #[clap(name = "predict")]
    Predict(Box<PredictArgs>),
}

#[derive(Parser)]
pub struct HomeAssistantConnectionArgs {
    /// Home Assistant API access token.
    #[clap(long = "home-assistant-access-token", env = "HOME_ASSISTANT_ACCESS_TOKEN")]
    pub access_token: String,

    /// Home Assistant API base URL. For example: `http://localhost:8123/api`.
    #[clap(long = "home-assistant-api-base-url", env = "HOME_ASSISTANT_API_BASE_URL")]
    pub base_url: Url,
}

impl HomeAssistantConnectionArgs {
    pub fn try_new_client(&self) -> Result<home_assistant::Api> {
        home_assistant::Api::try_new(&self.access_token, self.base_url.clone())
    }
}

#[derive(Parser)]
pub struct PeriodArgs {
    /// Home Assistant entity ID, for example: `sensor.washing_machine_power`.
    #[clap(long = "entity-id", env = "ENTITY_ID")]
    pub entity_id: String,

    /// Period start, for example: `2024-07-08T08:40:00+02:00`.
    #[clap(long)]
    pub begin: DateTime<Local>,

    /// Period end, exclusive.
    #[clap(long)]
    pub end: DateTime<Local>,
}

impl PeriodArgs {
    pub fn period(&self) -> Result<Range<DateTime<Local>>> {
        ensure!(self.begin < self.end, "the period must begin before it ends");
        Ok(self.begin..self.end)
    }
}

#[derive(Parser)]
pub struct ReadingsArgs {
    #[clap(flatten)]
    pub home_assistant: HomeAssistantConnectionArgs,

    #[clap(flatten)]
    pub period: PeriodArgs,
}

#[derive(Parser)]
pub struct RecordArgs {
    #[clap(flatten)]
    pub home_assistant: HomeAssistantConnectionArgs,

    #[clap(flatten)]
    pub period: PeriodArgs,

    #[clap(flatten)]
    pub storage: StorageArgs,

    /// Recording name, defaults to the generated ID.
    #[clap(long, default_value = "")]
    pub name: String,

    /// Bucket width in minutes.
    #[clap(long = "interval-length-minutes", default_value_t = DEFAULT_INTERVAL_LENGTH_MINUTES)]
    pub interval_length_minutes: NonZeroU32,
}

#[derive(Parser)]
pub struct StorageArgs {
    /// Directory for the stored recordings and the forecast cache.
    #[clap(long = "data-dir", env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

impl StorageArgs {
    pub fn recordings(&self) -> JsonRecordings<FileBlob> {
        JsonRecordings::new(FileBlob::new(self.data_dir.join("recordings.json")))
    }

    pub fn forecast_cache(&self) -> FileBlob {
        FileBlob::new(self.data_dir.join("forecast-cache.json"))
    }
}

#[derive(Parser)]
pub struct RecordingsArgs {
    #[clap(flatten)]
    pub storage: StorageArgs,

    #[command(subcommand)]
    pub command: RecordingsCommand,
}

#[derive(Subcommand)]
pub enum RecordingsCommand {
    /// List the stored recordings.
    List,

    /// Show the recording intervals.
    Show { id: String },

    /// Delete the recording.
    Delete { id: String },
}

#[derive(Copy, Clone, Parser)]
pub struct SolarSiteArgs {
    /// Site latitude in degrees, −90…90.
    #[clap(long, env = "LATITUDE", allow_negative_numbers = true)]
    pub latitude: f64,

    /// Site longitude in degrees, −180…180.
    #[clap(long, env = "LONGITUDE", allow_negative_numbers = true)]
    pub longitude: f64,

    /// Panel inclination in degrees: 0 is horizontal, 90 is vertical.
    #[clap(long, env = "DECLINATION")]
    pub declination: f64,

    /// Panel orientation in degrees: −90 is east, 0 is south, 90 is west.
    #[clap(long, env = "AZIMUTH", allow_negative_numbers = true)]
    pub azimuth: f64,

    /// Installed peak power in kilowatts.
    #[clap(long = "max-power-kw", env = "MAX_POWER_KW")]
    pub max_power_kw: f64,
}

impl TryFrom<SolarSiteArgs> for SolarSite {
    type Error = Error;

    fn try_from(args: SolarSiteArgs) -> Result<Self> {
        ensure!((-90.0..=90.0).contains(&args.latitude), "latitude is out of range");
        ensure!((-180.0..=180.0).contains(&args.longitude), "longitude is out of range");
        ensure!((0.0..=90.0).contains(&args.declination), "declination is out of range");
        ensure!((-180.0..=180.0).contains(&args.azimuth), "azimuth is out of range");
        ensure!(args.max_power_kw > 0.0, "maximum power must be positive");
        Ok(Self {
            latitude: args.latitude,
            longitude: args.longitude,
            declination: args.declination,
            azimuth: args.azimuth,
            max_power_kw: args.max_power_kw,
        })
    }
}

#[derive(Parser)]
pub struct ForecastSolarArgs {
    #[clap(long = "forecast-solar-base-url", env = "FORECAST_SOLAR_BASE_URL", default_value = forecast_solar::DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Personal or professional plan API key.
    #[clap(long = "forecast-solar-api-key", env = "FORECAST_SOLAR_API_KEY")]
    pub api_key: Option<String>,
}

#[derive(Parser)]
pub struct ContextArgs {
    #[clap(flatten)]
    pub site: SolarSiteArgs,

    #[clap(flatten)]
    pub forecast_solar: ForecastSolarArgs,

    #[clap(flatten)]
    pub storage: StorageArgs,
}

#[derive(Parser)]
pub struct PredictArgs {
    #[clap(flatten)]
    pub context: ContextArgs,

    /// Recording ID.
    pub recording_id: String,

    /// Step between the inspected start times in minutes.
    #[clap(long = "span-minutes", default_value_t = DEFAULT_SPAN_MINUTES)]
    pub span_minutes: NonZeroU32,

    /// Maximum number of the proposed start times.
    #[clap(long = "top-n", default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,
}
