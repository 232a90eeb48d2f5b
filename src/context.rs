use crate::{
    api::forecast_solar,
    cli::ContextArgs,
    core::{cache::ForecastCache, forecast::SolarSite},
    prelude::*,
    storage::{FileBlob, JsonRecordings},
};

/// Everything the forecast-dependent commands share, built once from the command line.
pub struct Context {
    pub site: SolarSite,
    pub recordings: JsonRecordings<FileBlob>,
    pub forecasts: ForecastCache<FileBlob, forecast_solar::Api>,
}

impl Context {
    #[instrument(skip_all)]
    pub fn try_new(args: ContextArgs) -> Result<Self> {
        let site = SolarSite::try_from(args.site)?;
        let provider =
            forecast_solar::Api::try_new(args.forecast_solar.base_url, args.forecast_solar.api_key)?;
        info!(%site, data_dir = %args.storage.data_dir.display(), "initialized");
        Ok(Self {
            site,
            recordings: args.storage.recordings(),
            forecasts: ForecastCache::new(args.storage.forecast_cache(), provider),
        })
    }
}
