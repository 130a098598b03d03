use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{BenchmarkConfig, Config, ProviderCredentials, ProvidersConfig};

/// Loads the application configuration from the `config.toml` file.
///
/// Environment variables prefixed with `PULSE_` override file values
/// (e.g. `PULSE_PROVIDERS__ALCHEMY__API_KEY`), so credentials can stay out
/// of the checked-in file.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml").required(false))
        .add_source(config::Environment::with_prefix("PULSE").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;

    if config.benchmark.accuracy_tolerance <= 0.0 {
        return Err(ConfigError::ValidationError(
            "benchmark.accuracy_tolerance must be positive".to_string(),
        ));
    }

    Ok(config)
}
