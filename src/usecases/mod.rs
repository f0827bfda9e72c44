//! Use cases. Orchestrate ports; report workflow, commands, reminders,
//! daily export, scheduling and the polling loop.

pub mod command_service;
pub mod dispatcher;
pub mod export_service;
pub mod polling_service;
pub mod reminder_service;
pub mod report_service;
pub mod scheduler;

pub use command_service::{Command, CommandService};
pub use dispatcher::Dispatcher;
pub use export_service::ExportService;
pub use polling_service::PollingService;
pub use reminder_service::ReminderService;
pub use report_service::{AppliedReport, ReportOutcome, ReportService, WeightUpdate};
pub use scheduler::{Job, ScheduledJob, Scheduler, next_run};
