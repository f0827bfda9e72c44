//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into
//! services, start the scheduler and the polling loop. No business logic here.

use dotenv::dotenv;
use nutrition_bot::adapters::assets::MenuCatalog;
use nutrition_bot::adapters::clock::SystemClock;
use nutrition_bot::adapters::persistence::{CsvLedger, StateJson};
use nutrition_bot::adapters::telegram::BotApiGateway;
use nutrition_bot::adapters::ui;
use nutrition_bot::ports::{ChatGateway, Clock, Ledger, StateStore, UpdateHandler};
use nutrition_bot::shared::config::AppConfig;
use nutrition_bot::usecases::{
    CommandService, Dispatcher, ExportService, Job, PollingService, ReminderService,
    ReportService, ScheduledJob, Scheduler,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load()?;
    let token = cfg.bot_token()?;
    let chat_id = cfg.chat_id()?;
    let reminders = cfg.reminders()?;
    let export_at = cfg.export_at()?;
    let offset = cfg.utc_offset();
    let data_dir = PathBuf::from(cfg.data_dir_or_default());
    let assets_dir = PathBuf::from(cfg.assets_dir_or_default());
    let poll_timeout = cfg.poll_timeout_secs_or_default();

    let schedule = reminders
        .iter()
        .map(|(slot, at)| format!("{} {}", slot, at.format("%H:%M")))
        .collect::<Vec<_>>()
        .join(", ");
    ui::print_welcome(&[
        ("chat", chat_id.to_string()),
        ("timezone", offset.to_string()),
        ("reminders", schedule),
        ("export", export_at.format("%H:%M").to_string()),
        ("data", data_dir.display().to_string()),
    ]);

    tokio::fs::create_dir_all(&data_dir).await?;

    let ledger = CsvLedger::new(&data_dir);
    ledger.load().await?;
    let ledger: Arc<dyn Ledger> = Arc::new(ledger);

    let state = StateJson::new(data_dir.join("state.json"));
    state.load().await?;
    let state: Arc<dyn StateStore> = Arc::new(state);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(offset));
    let gateway: Arc<dyn ChatGateway> = Arc::new(BotApiGateway::new(
        &cfg.api_url_or_default(),
        &token,
        poll_timeout,
    )?);

    let reminder_service = Arc::new(ReminderService::new(
        Arc::clone(&gateway),
        Arc::clone(&ledger),
        Arc::clone(&state),
        Arc::clone(&clock),
        chat_id,
    ));
    let export_service = Arc::new(ExportService::new(
        Arc::clone(&gateway),
        Arc::clone(&ledger),
        Arc::clone(&state),
        Arc::clone(&clock),
        chat_id,
        cfg.reset_after_export_or_default(),
    ));
    let report_service = Arc::new(ReportService::new(
        Arc::clone(&ledger),
        Arc::clone(&state),
        Arc::clone(&clock),
        cfg.auto_register_or_default(),
    ));
    let command_service = Arc::new(CommandService::new(
        Arc::clone(&gateway),
        Arc::new(MenuCatalog::new(&assets_dir)),
        Arc::clone(&reminder_service),
        Arc::clone(&export_service),
        cfg.admin_ids(),
        reminders.iter().map(|(slot, _)| *slot).collect(),
    ));

    let mut jobs: Vec<ScheduledJob> = reminders
        .iter()
        .map(|(slot, at)| ScheduledJob {
            at: *at,
            job: Job::Reminder(*slot),
        })
        .collect();
    jobs.push(ScheduledJob {
        at: export_at,
        job: Job::DailyExport,
    });
    let scheduler = Scheduler::new(
        jobs,
        Arc::clone(&clock),
        Arc::clone(&reminder_service),
        Arc::clone(&export_service),
    );
    tokio::spawn(scheduler.run());

    let dispatcher: Arc<dyn UpdateHandler> = Arc::new(Dispatcher::new(
        Arc::clone(&gateway),
        command_service,
        report_service,
    ));
    let polling = PollingService::new(
        gateway,
        dispatcher,
        poll_timeout,
        cfg.max_concurrent_updates_or_default(),
    );

    info!(chat_id, "bot started");
    tokio::select! {
        _ = polling.run() => {}
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }
    Ok(())
}
