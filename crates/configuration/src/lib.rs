use crate::error::ConfigError;
use crate::settings::DEFAULTS;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::Settings;

/// Loads the application configuration.
///
/// A `.env` file in the working directory is loaded into the process
/// environment first (if present). Values then come from, in increasing
/// priority: built-in defaults, an optional `config.toml`, and the environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from(config::Environment::default())
}

/// Same as [`load_config`], with an explicit environment source and no `.env`
/// handling.
pub fn load_config_from(environment: config::Environment) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();
    for (key, value) in DEFAULTS {
        builder = builder.set_default(*key, *value)?;
    }

    let settings = builder
        .add_source(config::File::with_name("config").required(false))
        .add_source(environment)
        .build()?
        .try_deserialize::<Settings>()?;

    validate(&settings)?;
    Ok(settings)
}

fn validate(settings: &Settings) -> Result<(), ConfigError> {
    let has_url = settings
        .database_url
        .as_deref()
        .is_some_and(|url| !url.is_empty());
    if !has_url && (settings.db_name.is_empty() || settings.db_user.is_empty()) {
        return Err(ConfigError::ValidationError(
            "either DATABASE_URL or both DB_NAME and DB_USER must be set".to_string(),
        ));
    }

    for (key, url) in [
        ("gender_api_url", &settings.gender_api_url),
        ("age_api_url", &settings.age_api_url),
        ("nationality_api_url", &settings.nationality_api_url),
    ] {
        if url.is_empty() {
            return Err(ConfigError::ValidationError(format!("{key} must not be empty")));
        }
    }
    Ok(())
}
