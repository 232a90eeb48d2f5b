pub mod aggregate;
pub mod cache;
pub mod coverage;
pub mod forecast;
pub mod prediction;
pub mod provider;
pub mod reading;
pub mod record;
pub mod recording;
