//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::cli::server::{self, AppState};
use crate::config::AppConfig;
use crate::driver::PageDriver;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{FetchController, FetchDecision};
use crate::source::{PageSource, RoochTransactionSource};
use crate::store::ResultStore;
use crate::types::FetchStatus;
use crate::view::GridView;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List { page, page_size } => self.list(*page, *page_size).await,
            Commands::Browse { page_size } => self.browse(*page_size).await,
            Commands::Serve { port } => self.serve(*port).await,
            Commands::Config => self.show_config(),
        }
    }

    /// Load the config file, if any, and apply command-line overrides
    fn load_config(&self, page_size: Option<u32>) -> Result<AppConfig> {
        let mut config = match &self.cli.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(url) = &self.cli.rpc_url {
            config.rpc.url.clone_from(url);
        }
        if let Some(size) = page_size {
            config.pagination.page_size = size;
        }
        config.validate()?;
        Ok(config)
    }

    fn build_store(config: &AppConfig) -> Result<Arc<ResultStore>> {
        let source: Arc<dyn PageSource> = Arc::new(RoochTransactionSource::from_config(config)?);
        Ok(Arc::new(ResultStore::new(source)))
    }

    /// Fetch one page and print it
    async fn list(&self, page: u32, page_size: Option<u32>) -> Result<()> {
        let config = self.load_config(page_size)?;
        let store = Self::build_store(&config)?;
        let model = config.initial_model()?.with_page(page);

        let snapshot = store.snapshot();
        let decision = FetchController::new().evaluate(&model, &snapshot.result, snapshot.status);
        if let FetchDecision::Fetch(request) = decision {
            store.fetch(request).await;
        }

        let snapshot = store.snapshot();
        self.print_view(&GridView::new(&model, &snapshot))?;
        match (snapshot.status, snapshot.error) {
            (FetchStatus::Error, Some(message)) => Err(Error::Other(message)),
            _ => Ok(()),
        }
    }

    /// Drive pages from stdin commands until `q` or end of input
    async fn browse(&self, page_size: Option<u32>) -> Result<()> {
        let config = self.load_config(page_size)?;
        let store = Self::build_store(&config)?;
        let driver = PageDriver::spawn(
            Arc::clone(&store),
            config.initial_model()?,
            config.driver_config()?,
        )?;
        info!(url = %config.rpc.url, "Browsing transactions");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut store_rx = store.subscribe();
        let mut last_printed: Option<GridView> = None;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else { break };
                    match BrowseCommand::parse(&line) {
                        Ok(Some(BrowseCommand::Quit)) => break,
                        Ok(Some(command)) => {
                            if let Err(e) = apply(&driver, command) {
                                eprintln!("{e}");
                            }
                            if command == BrowseCommand::Redraw {
                                let view = GridView::new(&driver.model(), &store.snapshot());
                                self.print_view(&view)?;
                                last_printed = Some(view);
                            }
                        }
                        Ok(None) => {}
                        Err(e) => eprintln!("{e}"),
                    }
                }
                changed = store_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = store_rx.borrow_and_update().clone();
                    if snapshot.is_loading() {
                        continue;
                    }
                    let view = GridView::new(&driver.model(), &snapshot);
                    if last_printed.as_ref() != Some(&view) {
                        self.print_view(&view)?;
                        last_printed = Some(view);
                    }
                }
            }
        }

        driver.shutdown().await;
        Ok(())
    }

    /// Serve the grid over HTTP
    async fn serve(&self, port: Option<u16>) -> Result<()> {
        let config = self.load_config(None)?;
        let store = Self::build_store(&config)?;
        let driver = PageDriver::spawn(store, config.initial_model()?, config.driver_config()?)?;
        let state = Arc::new(AppState::new(
            driver,
            Duration::from_millis(config.server.settle_timeout_ms),
        ));
        server::serve(state, port.unwrap_or(config.server.port)).await
    }

    /// Print the effective configuration
    fn show_config(&self) -> Result<()> {
        let config = self.load_config(None)?;
        print!("{}", config.to_yaml()?);
        Ok(())
    }

    fn print_view(&self, view: &GridView) -> Result<()> {
        print!("{}", format_view(view, self.cli.format)?);
        Ok(())
    }
}

/// Render a view in the requested format, newline-terminated
fn format_view(view: &GridView, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(view)
            .map(|line| line + "\n")
            .map_err(|e| Error::decode(format!("Failed to encode view: {e}"))),
        OutputFormat::Pretty => Ok(view.render_text()),
    }
}

/// A line of input in browse mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseCommand {
    Next,
    Prev,
    /// Zero-based page
    Goto(u32),
    PageSize(u32),
    Redraw,
    Quit,
}

impl BrowseCommand {
    /// Parse a line; blank lines yield `None`
    ///
    /// `g` takes the one-based page number shown in the grid footer.
    fn parse(line: &str) -> Result<Option<Self>> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(None);
        };
        let arg = parts.next();

        let command = match (verb, arg) {
            ("n", None) => Self::Next,
            ("p", None) => Self::Prev,
            ("r", None) => Self::Redraw,
            ("q", None) => Self::Quit,
            ("g", Some(page)) => {
                let page: u32 = parse_number(page)?;
                if page == 0 {
                    return Err(Error::pagination("pages are numbered from 1"));
                }
                Self::Goto(page - 1)
            }
            ("s", Some(size)) => Self::PageSize(parse_number(size)?),
            _ => {
                return Err(Error::Other(format!(
                    "unknown command '{}' (n, p, g <page>, s <size>, r, q)",
                    line.trim()
                )))
            }
        };
        if parts.next().is_some() {
            return Err(Error::Other(format!("trailing input in '{}'", line.trim())));
        }
        Ok(Some(command))
    }
}

fn parse_number(value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| Error::Other(format!("'{value}' is not a number")))
}

fn apply(driver: &PageDriver, command: BrowseCommand) -> Result<()> {
    debug!(?command, "Browse command");
    match command {
        BrowseCommand::Next => driver.next_page(),
        BrowseCommand::Prev => driver.prev_page(),
        BrowseCommand::Goto(page) => driver.set_page(page),
        BrowseCommand::PageSize(size) => driver.set_page_size(size)?,
        BrowseCommand::Redraw | BrowseCommand::Quit => {}
    }
    Ok(())
}
