use tracing_subscriber::EnvFilter;

use thinjar::core::config::{Config, THIN_CLASSPATH};
use thinjar::core::launch::Launcher;

/// Logging level for this run. The `classpath` mode owns stdout and must
/// stay machine-readable, so logging is forced off there; `--debug` and
/// `--trace` raise the level; otherwise `RUST_LOG` or quiet.
fn log_filter(config: &Config, args: &[String]) -> EnvFilter {
    if config.get_flag(THIN_CLASSPATH).unwrap_or(false) {
        return EnvFilter::new("off");
    }
    let pre_separator = args.iter().take_while(|a| a.as_str() != "--");
    let mut level: Option<&str> = None;
    for arg in pre_separator {
        match arg.as_str() {
            "--trace" => level = Some("trace"),
            "--debug" if level.is_none() => level = Some("debug"),
            _ => {}
        }
    }
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config, &args))
        .with_writer(std::io::stderr)
        .init();

    match Launcher::new(config.clone(), args).run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!(
                "Launch failed (name={:?}, profiles={:?}): {e}",
                config.name(),
                config.profiles()
            );
            std::process::exit(1);
        }
    }
}
