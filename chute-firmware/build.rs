//! Build script for chute-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates flight.toml and bakes it into the firmware as a constant

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chute_core::config::{ConfigError, FlightConfig};

fn main() {
    setup_linker();
    let config = load_config();
    emit_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate flight.toml
fn load_config() -> FlightConfig {
    println!("cargo:rerun-if-changed=flight.toml");

    let config_path = Path::new("flight.toml");

    // A missing file means "all defaults"
    if !config_path.exists() {
        println!("cargo:warning=flight.toml not found, using built-in defaults");
        return FlightConfig::DEFAULT;
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read flight.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Syntax errors and unknown keys both land here
    let config: FlightConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid flight.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid flight configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            ║  • {:<62} ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            describe(e)
        );
    }

    println!("cargo:warning=flight.toml validated successfully");
    config
}

fn describe(error: ConfigError) -> String {
    match error {
        ConfigError::AngleOutOfRange(angle) => {
            format!("servo angle {} is outside 0-180", angle)
        }
        ConfigError::ThresholdOutOfRange(mg) => {
            format!("free_fall.threshold_mg {} exceeds 15937", mg)
        }
        ConfigError::DurationOutOfRange(ms) => {
            format!("free_fall.duration_ms {} exceeds 1275", ms)
        }
        ConfigError::WatchdogTooShort => {
            "loop periods and reboot_timeout_ms must be below watchdog_ms".to_string()
        }
        ConfigError::ZeroDuration => "timing and alarm periods must be non-zero".to_string(),
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `$OUT_DIR/flight_config.rs` holding the validated config
fn emit_config(config: &FlightConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let servo = &config.servo;
    let free_fall = &config.free_fall;
    let timing = &config.timing;
    let alarm = &config.alarm;
    let blink = &config.blink;

    let source = format!(
        "/// Flight configuration baked in from flight.toml\n\
        pub const FLIGHT_CONFIG: chute_core::config::FlightConfig = chute_core::config::FlightConfig {{\n\
        \x20   servo: chute_core::config::ServoConfig {{ start_angle: {}, end_angle: {} }},\n\
        \x20   free_fall: chute_core::config::FreeFallConfig {{ threshold_mg: {}, duration_ms: {} }},\n\
        \x20   timing: chute_core::config::TimingConfig {{\n\
        \x20       tick_ms: {},\n\
        \x20       heartbeat_ms: {},\n\
        \x20       watchdog_ms: {},\n\
        \x20       reboot_timeout_ms: {},\n\
        \x20       reboot_guard_ms: {},\n\
        \x20       console_settle_ms: {},\n\
        \x20       debounce_ms: {},\n\
        \x20   }},\n\
        \x20   alarm: chute_core::config::AlarmTiming {{ first_on_ms: {}, on_ms: {}, off_ms: {} }},\n\
        \x20   blink: chute_core::config::BlinkConfig {{\n\
        \x20       cold_boot: {},\n\
        \x20       watchdog_reboot: {},\n\
        \x20       sensor_fault: {},\n\
        \x20       dump_complete: {},\n\
        \x20       on_ms: {},\n\
        \x20       off_ms: {},\n\
        \x20   }},\n\
        }};\n",
        servo.start_angle,
        servo.end_angle,
        free_fall.threshold_mg,
        free_fall.duration_ms,
        timing.tick_ms,
        timing.heartbeat_ms,
        timing.watchdog_ms,
        timing.reboot_timeout_ms,
        timing.reboot_guard_ms,
        timing.console_settle_ms,
        timing.debounce_ms,
        alarm.first_on_ms,
        alarm.on_ms,
        alarm.off_ms,
        blink.cold_boot,
        blink.watchdog_reboot,
        blink.sensor_fault,
        blink.dump_complete,
        blink.on_ms,
        blink.off_ms,
    );

    fs::write(out_dir.join("flight_config.rs"), source).unwrap();
}
