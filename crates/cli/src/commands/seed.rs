use crate::commands::{
    CommandResult, EXIT_CONFIG, EXIT_DB, EXIT_MIGRATION, EXIT_RUNTIME, EXIT_VERIFICATION,
};
use tastemap_core::config::{AppConfig, LoadOptions};
use tastemap_db::{connect_with_settings, fixtures, migrations};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

        let seeded = fixtures::seed(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

        let verification = fixtures::verify_seed(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;

        let run_result = if verification.passed {
            Ok((seeded, verification))
        } else {
            Err((
                "seed_verification",
                format!(
                    "seed contract not satisfied: {} rows across {} cities",
                    verification.total_restaurants,
                    verification.cities.len()
                ),
                EXIT_VERIFICATION,
            ))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok((seeded, verification)) => {
            let city_lines: Vec<String> = verification
                .cities
                .iter()
                .map(|(city, count)| format!("  - {city}: {count}"))
                .collect();
            let message = format!(
                "demo dataset loaded: {} restaurants across {} cities\n{}",
                seeded.inserted,
                verification.cities.len(),
                city_lines.join("\n")
            );
            CommandResult::success("seed", message)
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}
