use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{ArgAction, Parser};
use paneql_adapters::mysql::MysqlConnectionProvider;
use paneql_core::config::{default_config_dir, AppConfig, ConfigError, DatabaseConfig};
use paneql_tui::{DatabaseSelection, TuiError};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "paneql.log";

#[derive(Debug, Parser)]
#[command(name = "paneql", version, about = "Browse and query MySQL databases from the terminal")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Configured database to open; defaults to the first entry
    #[arg(long, value_name = "NAME")]
    database: Option<String>,

    /// Where to write logs; defaults to paneql.log in the config directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn log_path(cli: &Cli) -> Result<PathBuf, ConfigError> {
    match &cli.log_file {
        Some(path) => Ok(path.clone()),
        None => Ok(default_config_dir()?.join(LOG_FILE_NAME)),
    }
}

fn init_logging(path: &Path, verbose: u8) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| -> Box<dyn Error> { error })?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    match &cli.config {
        Some(path) => AppConfig::load_from_path(path.clone()),
        None => AppConfig::load_default(),
    }
}

fn select_database(cli: &Cli) -> Result<DatabaseConfig, ConfigError> {
    let config = load_config(cli)?;
    let selected = config.select(cli.database.as_deref())?.clone();
    Ok(selected)
}

/// Config problems do not stop the UI; they are shown in the Database pane.
fn database_selection(cli: &Cli) -> DatabaseSelection {
    match select_database(cli) {
        Ok(database) => {
            info!(name = %database.name, address = %database.address(), "database selected");
            DatabaseSelection::Configured(database)
        }
        Err(error) => {
            warn!(%error, "no database selected");
            DatabaseSelection::Unavailable(error.to_string())
        }
    }
}

fn run_app(
    cli: &Cli,
    run_tui: impl FnOnce(DatabaseSelection) -> Result<(), TuiError>,
) -> Result<(), Box<dyn Error>> {
    run_tui(database_selection(cli))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&log_path(&cli)?, cli.verbose)?;
    run_app(&cli, |selection| {
        paneql_tui::run(MysqlConnectionProvider, selection)
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::path::Path;

    use clap::Parser;
    use paneql_tui::{DatabaseSelection, TuiError};

    use super::{database_selection, init_logging, log_level, log_path, run_app, Cli};

    const BLOG_CONFIG: &str = r#"
[[databases]]
name = "blog"
host = "127.0.0.1"
user = "root"
database = "blog"

[[databases]]
name = "shop"
host = "db.internal"
port = 3307
user = "reader"
"#;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("paneql").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    fn write_config(dir: &Path, contents: &str) -> String {
        let path = dir.join("config.toml");
        fs::write(&path, contents).expect("config should be written");
        path.display().to_string()
    }

    #[test]
    fn parses_every_flag() {
        let cli = cli(&[
            "--config",
            "/tmp/paneql.toml",
            "--database",
            "shop",
            "--log-file",
            "/tmp/paneql.log",
            "-vv",
        ]);

        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/paneql.toml")));
        assert_eq!(cli.database.as_deref(), Some("shop"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(
            log_path(&cli).expect("explicit log path"),
            Path::new("/tmp/paneql.log")
        );
    }

    #[test]
    fn verbosity_maps_to_filter_levels() {
        assert_eq!(log_level(0), "info");
        assert_eq!(log_level(1), "debug");
        assert_eq!(log_level(5), "trace");
    }

    // Installs the global subscriber, so this is the only test that calls it.
    #[test]
    fn logging_writes_to_a_fresh_file_and_installs_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("paneql.log");

        init_logging(&path, 1).expect("first init should succeed");
        tracing::info!("hello from the test");

        assert!(path.exists());
        assert!(init_logging(&path, 0).is_err());
    }

    #[test]
    fn first_database_is_selected_by_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path(), BLOG_CONFIG);

        match database_selection(&cli(&["--config", &config])) {
            DatabaseSelection::Configured(database) => assert_eq!(database.name, "blog"),
            DatabaseSelection::Unavailable(reason) => panic!("unexpected failure: {reason}"),
        }
    }

    #[test]
    fn named_database_is_selected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path(), BLOG_CONFIG);

        match database_selection(&cli(&["--config", &config, "--database", "shop"])) {
            DatabaseSelection::Configured(database) => {
                assert_eq!(database.address(), "db.internal:3307");
            }
            DatabaseSelection::Unavailable(reason) => panic!("unexpected failure: {reason}"),
        }
    }

    #[test]
    fn unknown_database_is_reported_to_the_ui() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path(), BLOG_CONFIG);

        let selection = database_selection(&cli(&["--config", &config, "--database", "nope"]));
        assert!(
            matches!(selection, DatabaseSelection::Unavailable(reason) if reason.contains("nope"))
        );
    }

    #[test]
    fn missing_config_is_created_and_reported_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let config = path.display().to_string();

        let selection = database_selection(&cli(&["--config", &config]));

        assert!(path.exists());
        assert!(matches!(selection, DatabaseSelection::Unavailable(_)));
    }

    #[test]
    fn run_app_hands_the_selection_to_the_tui() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path(), BLOG_CONFIG);
        let mut seen = None;

        let result = run_app(&cli(&["--config", &config]), |selection| {
            seen = Some(selection);
            Ok(())
        });

        assert!(result.is_ok());
        assert!(matches!(seen, Some(DatabaseSelection::Configured(_))));
    }

    #[test]
    fn run_app_propagates_tui_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = write_config(dir.path(), BLOG_CONFIG);

        let result = run_app(&cli(&["--config", &config]), |_| {
            Err(TuiError::Io(io::Error::other("boom")))
        });
        assert!(result.is_err());
    }
}
