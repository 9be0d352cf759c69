use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{info, instrument};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod data;
mod domain;
mod inputter;
mod model;
mod table;
mod ui;

use controller::Controller;
use domain::{SheetConfig, SheetError, Tab};
use model::{Model, Status};
use ui::TableUI;

/// Spreadsheet view of job requests in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Write logs to this file. Logging is off without it.
    #[arg(long)]
    log_file: Option<String>,

    /// Log filter, e.g. "debug" or "sheetview=trace". Defaults to RUST_LOG, then "info".
    #[arg(long)]
    log_level: Option<String>,

    /// Event poll timeout in milliseconds.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Tab to open with.
    #[arg(long, default_value = "All Orders")]
    tab: String,

    /// Start with the toolbar hidden.
    #[arg(long)]
    no_toolbar: bool,

    /// Start with the search box hidden.
    #[arg(long)]
    no_search: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &Args) -> Result<(), SheetError> {
    init_logging(args)?;
    let cfg = config_from_args(args)?;
    info!("Starting sheetview with {:?}", cfg);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &cfg);
    ratatui::restore();
    result
}

#[instrument(skip_all)]
fn event_loop(terminal: &mut ratatui::DefaultTerminal, cfg: &SheetConfig) -> Result<(), SheetError> {
    let size = terminal.size()?;
    let mut model = Model::init(cfg, size.width as usize, size.height as usize);
    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
    }

    info!("Quitting sheetview");
    Ok(())
}

fn config_from_args(args: &Args) -> Result<SheetConfig, SheetError> {
    Ok(SheetConfig::default()
        .with_event_poll_time(args.poll_ms)
        .with_initial_tab(Tab::from_label(&args.tab)?)
        .with_show_toolbar(!args.no_toolbar)
        .with_show_search(!args.no_search))
}

// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(args: &Args) -> Result<(), SheetError> {
    let Some(log_file) = &args.log_file else {
        return Ok(());
    };
    let path = shellexpand::full(log_file).map_err(|e| SheetError::LogSetup(e.to_string()))?;
    let file = File::create(&*path)?;

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| SheetError::LogSetup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_command_line() {
        let args = Args::try_parse_from(["sheetview"]).unwrap();
        let cfg = config_from_args(&args).unwrap();
        assert_eq!(cfg.event_poll_time, 100);
        assert_eq!(cfg.initial_tab, Tab::AllOrders);
        assert!(cfg.show_toolbar);
        assert!(cfg.show_search);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn flags_map_to_config() {
        let args = Args::try_parse_from([
            "sheetview",
            "--tab",
            "approved",
            "--poll-ms",
            "20",
            "--no-toolbar",
            "--no-search",
        ])
        .unwrap();
        let cfg = config_from_args(&args).unwrap();
        assert_eq!(cfg.initial_tab, Tab::Approved);
        assert_eq!(cfg.event_poll_time, 20);
        assert!(!cfg.show_toolbar);
        assert!(!cfg.show_search);
    }

    #[test]
    fn unknown_tab_is_rejected() {
        let args = Args::try_parse_from(["sheetview", "--tab", "Drafts"]).unwrap();
        assert!(matches!(
            config_from_args(&args),
            Err(SheetError::UnknownTab(_))
        ));
    }

    #[test]
    fn logging_is_off_without_log_file() {
        let args = Args::try_parse_from(["sheetview", "--log-level", "trace"]).unwrap();
        assert!(init_logging(&args).is_ok());
    }
}
