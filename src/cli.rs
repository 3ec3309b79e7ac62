use anyhow::{anyhow, ensure, Context as _, Result};
use console::{style, StyledObject};
use futures::future::join_all;
use indicatif::{MultiProgress, ProgressBar};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::args::{Args, Command, IntervalArgs, OptionArgs};
use crate::bank::{CsvHistoryFile, Router, RoutingSummary, TransactionSource as _};
use crate::catalog::{self, Catalog, CatalogSource as _, CsvCatalogSource, Interval, PeriodRecord};
use crate::config::{self, AccountConfig, Config};
use crate::ledger::{self, AppendOutcome, CsvLedgerSink, Destination, LedgerAppender};
use crate::terminal::{BulletPointPrinter, LineWriter};

pub async fn main(args: Args) -> Result<()> {
    let Args { options, command } = args;
    match command {
        Command::Init => main_init(&options).await,
        Command::Periods(interval) => Cli::new(&options).await?.main_periods(&interval).await,
        Command::Update {
            interval,
            timeout_secs,
        } => {
            Cli::new(&options)
                .await?
                .main_update(&interval, timeout_secs)
                .await
        }
    }
}

async fn main_init(options: &OptionArgs) -> Result<()> {
    let path = config::config_path(options)?;
    let config = Config::default().merge(options);
    config.validate()?;
    config::create(&config, &path)
        .await
        .context("Failed to create options file")?;
    println!("{} {}", style_header("Created options file"), style_path(&path));
    Ok(())
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct Cli {
    config: Config,
}

struct AccountReport {
    produced: usize,
    routing: RoutingSummary,
    outcomes: Vec<AppendOutcome>,
}

impl Cli {
    pub async fn new(options: &OptionArgs) -> Result<Self> {
        let config = config::load(options)
            .await
            .context("Failed to load options")?;
        Ok(Self { config })
    }

    async fn load_catalog(&self) -> Result<Catalog> {
        let catalog = &self.config.catalog;
        CsvCatalogSource::new(&catalog.catalog_dir)
            .load(&catalog.catalog_id)
            .await
            .context("Couldn't read budget catalog")
    }

    pub async fn main_periods(&self, interval: &IntervalArgs) -> Result<()> {
        let interval = interval.interval(today())?;
        let catalog = self.load_catalog().await?;

        println!(
            "{}",
            style_header(&format!(
                "Budget periods in {} for {}:",
                catalog.catalog_id(),
                format_interval(interval)
            ))
        );
        if catalog.is_empty() {
            println!("(none)");
        } else {
            let printer = BulletPointPrinter::new_stdout();
            for record in catalog.records() {
                print_period(&printer, record, catalog::is_active(record, interval));
            }
        }
        Ok(())
    }

    pub async fn main_update(
        &self,
        interval: &IntervalArgs,
        timeout_secs: Option<u64>,
    ) -> Result<()> {
        let interval = interval.interval(today())?;
        ensure!(
            !self.config.accounts.is_empty(),
            "No accounts to update, add one with --account NAME=HISTORY_CSV"
        );
        let catalog = self.load_catalog().await?;
        let periods = catalog.active_periods(interval);

        println!(
            "{}",
            style_header(&format!("Updating {}:", format_interval(interval)))
        );
        if periods.is_empty() {
            log::info!("No active budget periods for {}", format_interval(interval));
            println!("No active budget periods, nothing to do");
            return Ok(());
        }

        let sink = CsvLedgerSink::new(&self.config.ledger.ledger_dir);
        let appender = LedgerAppender::new(Arc::new(sink));
        let mp = MultiProgress::new();

        let appender = &appender;
        let periods = periods.as_slice();
        let updates = join_all(self.config.accounts.iter().map(|account| {
            let progress = mp.add(spinner(&account.name));
            async move {
                let result = self
                    .update_account(appender, periods, account, interval)
                    .await;
                progress.finish_and_clear();
                (account, result)
            }
        }));
        let results = match timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), updates)
                .await
                .map_err(|_| anyhow!("Update didn't finish within {secs} seconds"))?,
            None => updates.await,
        };

        let printer = BulletPointPrinter::new_multiprogress(&mp);
        let mut num_failed = 0;
        for (account, result) in &results {
            match result {
                Ok(report) => print_report(&printer, account, report),
                Err(err) => {
                    num_failed += 1;
                    printer.print_item(format!(
                        "{}: {}",
                        style_account(&account.name),
                        style_error(&format!("{err:#}"))
                    ));
                }
            }
        }
        ensure!(
            num_failed == 0,
            "{num_failed} of {} accounts failed to update",
            results.len()
        );
        Ok(())
    }

    /// One producer, one router and one append pipeline per destination. If reading
    /// or routing fails, the pipelines are cancelled and nothing is appended.
    async fn update_account(
        &self,
        appender: &LedgerAppender<CsvLedgerSink>,
        periods: &[PeriodRecord],
        account: &AccountConfig,
        interval: Interval,
    ) -> Result<AccountReport> {
        let mut pipelines = HashMap::new();
        let mut handles = Vec::new();
        for period in periods {
            if pipelines.contains_key(period.destination_id()) {
                continue;
            }
            let (sender, receiver) = ledger::channel();
            handles.push(appender.spawn_append(
                receiver,
                Destination {
                    destination_id: period.destination_id().to_string(),
                    worksheet: account.name.clone(),
                    category_label: self.config.ledger.category_label.clone(),
                    layout: self.config.ledger.layout,
                },
            ));
            pipelines.insert(period.destination_id().to_string(), sender);
        }
        let router = Router::new(periods.to_vec(), pipelines)?;

        let history = CsvHistoryFile::new(&account.history_file, interval);
        let (sender, receiver) = ledger::channel();
        let (produced, routing) = tokio::join!(history.produce(sender), router.run(receiver));
        if produced.is_err() || routing.is_err() {
            for handle in &mut handles {
                handle.cancel();
            }
        }
        // Closes the pipelines, after any cancellation
        drop(router);

        // Wait for every pipeline before reporting errors so no append is left running
        let outcomes = ledger::wait_all(handles).await;
        let produced = produced
            .with_context(|| anyhow!("Couldn't read history of account {}", account.name))?;
        let routing = routing?;
        let outcomes = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;

        Ok(AccountReport {
            produced,
            routing,
            outcomes,
        })
    }
}

fn spinner(account_name: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner().with_message(format!("Updating {account_name}..."));
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn format_interval(interval: Interval) -> String {
    if interval.start() == interval.end() {
        ledger::format_date(interval.start())
    } else {
        format!(
            "{} - {}",
            ledger::format_date(interval.start()),
            ledger::format_date(interval.end())
        )
    }
}

fn print_period(
    printer: &BulletPointPrinter<impl LineWriter + Clone>,
    record: &PeriodRecord,
    active: bool,
) {
    let last_updated = record
        .last_updated()
        .map(|updated| format!(", updated {}", updated.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    printer.print_item(format!(
        "{} {} {}{}",
        style_period(record.file_label()),
        format!(
            "{} - {}",
            ledger::format_date(record.start()),
            ledger::format_date(record.end())
        ),
        style_destination(record.destination_id()),
        last_updated,
    ));
    printer.indent().print_item(style_status(active));
}

fn print_report(
    printer: &BulletPointPrinter<impl LineWriter + Clone>,
    account: &AccountConfig,
    report: &AccountReport,
) {
    printer.print_item(format!(
        "{}: read {} transactions, appended {}, {} outside active periods",
        style_account(&account.name),
        report.produced,
        report.routing.routed,
        report.routing.unrouted,
    ));
    let printer = printer.indent();
    for outcome in &report.outcomes {
        printer.print_item(format!(
            "{} {}: {} rows",
            style_destination(&outcome.destination_id),
            outcome.range,
            outcome.rows_appended,
        ));
    }
}

fn style_header(header: &str) -> StyledObject<&str> {
    style(header).bold().underlined()
}

fn style_path(path: &Path) -> StyledObject<String> {
    style(path.display().to_string()).italic()
}

fn style_period(label: &str) -> StyledObject<&str> {
    style(label).cyan().bold()
}

fn style_destination(destination_id: &str) -> StyledObject<&str> {
    style(destination_id).blue()
}

fn style_account(name: &str) -> StyledObject<&str> {
    style(name).magenta()
}

fn style_status(active: bool) -> StyledObject<&'static str> {
    if active {
        style("active").green()
    } else {
        style("inactive").dim()
    }
}

fn style_error(message: &str) -> StyledObject<&str> {
    style(message).red()
}
