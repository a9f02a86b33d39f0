use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
#[cfg(feature = "clap")]
pub mod overrides;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
#[cfg(feature = "clap")]
pub use overrides::CliOverrides;
pub use settings::{
    AnalysisSettings, LoggingSettings, PartnerSettings, PeriodSettings, ResilienceSettings,
    SectorAnalysisSettings, SectorDefinition, SensitivitySettings, Settings, TrackedPartner,
    ValidationSettings,
};
pub use telemetry::init_tracing;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "derisk";

/// Prefix of environment overrides, e.g. `DERISK__ANALYSIS__SUBJECT=IND`.
pub const ENV_PREFIX: &str = "DERISK";

/// Loads the application configuration.
///
/// Sources are layered, later ones winning: built-in defaults, the TOML file
/// (`path`, or an optional `derisk.toml` in the working directory), then
/// `DERISK__SECTION__KEY` environment variables. A `.env` file is loaded into
/// the environment first when present.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let file = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let result = load_settings(Some(Path::new("does/not/exist/derisk.toml")));
        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
