use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_DB, EXIT_MIGRATION, EXIT_RUNTIME};
use tastemap_core::config::{AppConfig, LoadOptions};
use tastemap_db::{connect_with_settings, migrations};

type Failure = (&'static str, String, u8);

pub fn run() -> CommandResult {
    match apply_migrations() {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}

fn apply_migrations() -> Result<(), Failure> {
    let config = AppConfig::load(LoadOptions::default())
        .map_err(|error| ("config_validation", format!("configuration issue: {error}"), EXIT_CONFIG))?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(
        |error| {
            ("runtime_init", format!("failed to initialize async runtime: {error}"), EXIT_RUNTIME)
        },
    )?;

    runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB))?;

        let outcome = migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION));
        pool.close().await;
        outcome
    })
}
