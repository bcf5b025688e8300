use p1meter::{config::OutputFormat, report, Config, Meter};
use log::{error, info};
use std::{env, process::ExitCode};


fn main() -> ExitCode {
    // Initialize logging
    let default_filter = env::var("P1_LOG_LEVEL").unwrap_or("info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    /* munin plugin protocol */
    match env::args().nth(1).as_deref() {
        None => {}
        Some("config") => {
            print!("{}", report::MUNIN_CONFIG);
            return ExitCode::SUCCESS;
        }
        Some("autoconf") => {
            println!("yes");
            return ExitCode::SUCCESS;
        }
        Some(other) => {
            error!("Unknown command {:?}", other);
            return ExitCode::FAILURE;
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut meter = match Meter::open(&config.device, config.protocol) {
        Ok(meter) => meter,
        Err(e) => {
            error!("Unable to open {}: {}", config.device.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let telegram = match meter.read_telegram() {
        Ok(telegram) => telegram,
        Err(e) => {
            error!("Reading telegram failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Telegram from {} with {} fields", telegram.header_id, telegram.len());

    let rendered = match config.output {
        OutputFormat::Json => report::json(&telegram),
        OutputFormat::Munin => report::munin_values(&telegram),
    };

    match rendered {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
