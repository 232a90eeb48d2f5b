mod client;
pub mod forecast_solar;
pub mod home_assistant;
