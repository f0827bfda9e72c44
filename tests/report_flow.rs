//! End-to-end flows over the real file-backed ledger and state, with a
//! recording chat gateway and a fixed clock.

use chrono::{NaiveDate, NaiveDateTime};
use nutrition_bot::adapters::assets::MenuCatalog;
use nutrition_bot::adapters::persistence::{CsvLedger, StateJson};
use nutrition_bot::domain::{
    CallbackQuery, CellColor, ChatMessage, DomainError, IncomingUpdate, Keyboard, LedgerColumn,
    MealMark, MealSlot, RowHandle, Sender, UpdateEnvelope,
};
use nutrition_bot::ports::{ChatGateway, Clock, Ledger, StateStore, UpdateHandler};
use nutrition_bot::usecases::{
    CommandService, Dispatcher, ExportService, ReminderService, ReportOutcome, ReportService,
    WeightUpdate,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const CHAT: i64 = -1001;
const ADMIN: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Message { chat_id: i64, text: String },
    File { chat_id: i64, path: PathBuf, caption: Option<String> },
    Callback { text: Option<String>, alert: bool },
}

#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingGateway {
    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ChatGateway for RecordingGateway {
    async fn get_updates(&self, _: i64, _: u64) -> Result<Vec<UpdateEnvelope>, DomainError> {
        Ok(Vec::new())
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        _keyboard: Option<&Keyboard>,
    ) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(Sent::Message {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(Sent::File {
            chat_id,
            path: path.to_path_buf(),
            caption: caption.map(str::to_string),
        });
        Ok(())
    }

    async fn answer_callback(
        &self,
        _callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(Sent::Callback {
            text: text.map(str::to_string),
            alert,
        });
        Ok(())
    }
}

struct FixedClock(Mutex<NaiveDateTime>);

impl FixedClock {
    fn at(h: u32, m: u32) -> Self {
        Self(Mutex::new(day().and_hms_opt(h, m, 0).unwrap()))
    }

    fn set(&self, h: u32, m: u32) {
        *self.0.lock().unwrap() = day().and_hms_opt(h, m, 0).unwrap();
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

struct Harness {
    _dir: tempfile::TempDir,
    gateway: Arc<RecordingGateway>,
    ledger: Arc<CsvLedger>,
    state: Arc<StateJson>,
    clock: Arc<FixedClock>,
    reports: Arc<ReportService>,
    reminders: Arc<ReminderService>,
    export: Arc<ExportService>,
    dispatcher: Dispatcher,
}

async fn harness(auto_register: bool) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Arc::new(RecordingGateway::default());
    let ledger = Arc::new(CsvLedger::new(dir.path()));
    ledger.load().await.unwrap();
    let state = Arc::new(StateJson::new(dir.path().join("state.json")));
    state.load().await.unwrap();
    let clock = Arc::new(FixedClock::at(10, 0));

    let reports = Arc::new(ReportService::new(
        ledger.clone(),
        state.clone(),
        clock.clone(),
        auto_register,
    ));
    let reminders = Arc::new(ReminderService::new(
        gateway.clone(),
        ledger.clone(),
        state.clone(),
        clock.clone(),
        CHAT,
    ));
    let export = Arc::new(ExportService::new(
        gateway.clone(),
        ledger.clone(),
        state.clone(),
        clock.clone(),
        CHAT,
        true,
    ));
    let commands = Arc::new(CommandService::new(
        gateway.clone(),
        Arc::new(MenuCatalog::new(dir.path().join("menus"))),
        reminders.clone(),
        export.clone(),
        HashSet::from([ADMIN]),
        vec![MealSlot::Lunch],
    ));
    let dispatcher = Dispatcher::new(gateway.clone(), commands, reports.clone());

    Harness {
        _dir: dir,
        gateway,
        ledger,
        state,
        clock,
        reports,
        reminders,
        export,
        dispatcher,
    }
}

fn sender(id: i64, username: Option<&str>) -> Sender {
    Sender {
        id,
        username: username.map(str::to_string),
        first_name: "Анна".to_string(),
    }
}

fn message(id: i64, text: &str) -> ChatMessage {
    ChatMessage {
        message_id: 1,
        chat_id: CHAT,
        sender: sender(id, Some("sunko")),
        text: text.to_string(),
        date: 0,
        has_photo: false,
    }
}

async fn cell(h: &Harness, row: usize, column: LedgerColumn) -> String {
    h.ledger.read_cell(RowHandle(row), column).await.unwrap()
}

#[tokio::test]
async fn test_first_report_links_sender_by_surname() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко Анна", 0).await.unwrap();
    h.ledger
        .write_cell(RowHandle(1), LedgerColumn::SenderId, "")
        .await
        .unwrap();
    h.ledger.append_row("Петрова", 99).await.unwrap();

    let outcome = h
        .reports
        .handle_message(&message(42, "Сунко Анна завтрак"))
        .await
        .unwrap();

    let ReportOutcome::Applied(applied) = outcome else {
        panic!("expected applied, got {:?}", outcome);
    };
    assert_eq!(applied.row, RowHandle(1));
    assert_eq!(applied.meal, Some((MealSlot::Breakfast, MealMark::Eaten)));
    assert_eq!(cell(&h, 1, LedgerColumn::SenderId).await, "42");
    assert_eq!(cell(&h, 1, LedgerColumn::Meal(MealSlot::Breakfast)).await, "+");
    assert_eq!(
        h.state.mentions().await.unwrap().get(&42).map(String::as_str),
        Some("@sunko")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_surname_senders_cannot_both_claim_one_row() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 0).await.unwrap();
    h.ledger
        .write_cell(RowHandle(1), LedgerColumn::SenderId, "")
        .await
        .unwrap();

    let tasks: Vec<_> = [42, 43]
        .into_iter()
        .map(|id| {
            let reports = h.reports.clone();
            tokio::spawn(async move {
                let outcome = reports
                    .handle_message(&message(id, "Сунко обед"))
                    .await
                    .unwrap();
                (id, outcome)
            })
        })
        .collect();
    let mut linked = Vec::new();
    for task in tasks {
        let (id, outcome) = task.await.unwrap();
        match outcome {
            ReportOutcome::Applied(_) => linked.push(id),
            other => assert_eq!(other, ReportOutcome::Unlinked),
        }
    }

    assert_eq!(linked.len(), 1);
    assert_eq!(
        cell(&h, 1, LedgerColumn::SenderId).await,
        linked[0].to_string()
    );
}

#[tokio::test]
async fn test_unknown_sender_is_unlinked_unless_auto_register() {
    let h = harness(false).await;
    let outcome = h
        .reports
        .handle_message(&message(42, "Сунко обед"))
        .await
        .unwrap();
    assert_eq!(outcome, ReportOutcome::Unlinked);
    assert!(h.ledger.list_rows().await.unwrap().is_empty());

    let h = harness(true).await;
    let outcome = h
        .reports
        .handle_message(&message(42, "Сунко обед"))
        .await
        .unwrap();
    assert!(matches!(outcome, ReportOutcome::Applied(_)));
    let rows = h.ledger.list_rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].surname, "Сунко");
    assert_eq!(rows[0].sender_id, Some(42));
}

#[tokio::test]
async fn test_chatter_is_ignored() {
    let h = harness(true).await;
    let outcome = h
        .reports
        .handle_message(&message(42, "Всем доброе утро!"))
        .await
        .unwrap();
    assert_eq!(outcome, ReportOutcome::Ignored);
    assert!(h.ledger.list_rows().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_weight_absolute_then_delta() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();

    let outcome = h
        .reports
        .handle_message(&message(42, "Сунко первый вес 80.0"))
        .await
        .unwrap();
    let ReportOutcome::Applied(applied) = outcome else {
        panic!("expected applied");
    };
    assert_eq!(
        applied.weight,
        Some(WeightUpdate::Written {
            weight: 80.0,
            delta: None
        })
    );

    h.reports
        .handle_message(&message(42, "Сунко минус 300"))
        .await
        .unwrap();
    assert_eq!(cell(&h, 1, LedgerColumn::Weight).await, "79.7");
    assert_eq!(cell(&h, 1, LedgerColumn::Delta).await, "-0.3");

    h.reports
        .handle_message(&message(42, "Сунко вес 79.2"))
        .await
        .unwrap();
    assert_eq!(cell(&h, 1, LedgerColumn::Weight).await, "79.2");
    assert_eq!(cell(&h, 1, LedgerColumn::Delta).await, "-0.5");
}

#[tokio::test]
async fn test_delta_without_previous_weight_is_skipped() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();
    let outcome = h
        .reports
        .handle_message(&message(42, "Сунко -1.2"))
        .await
        .unwrap();
    let ReportOutcome::Applied(applied) = outcome else {
        panic!("expected applied");
    };
    assert_eq!(applied.weight, Some(WeightUpdate::NoPreviousWeight));
    assert_eq!(cell(&h, 1, LedgerColumn::Weight).await, "");
}

#[tokio::test]
async fn test_late_lunch_is_painted_and_warned() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();
    h.clock.set(14, 5);

    h.dispatcher
        .handle_update(IncomingUpdate::Message(message(42, "Сунко обед")))
        .await
        .unwrap();

    assert_eq!(cell(&h, 1, LedgerColumn::Meal(MealSlot::Lunch)).await, "+");
    let texts = h.gateway.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("14:00"));

    let path = h.ledger.export_visual_snapshot().await.unwrap();
    let svg = std::fs::read_to_string(path).unwrap();
    assert!(svg.contains(CellColor::Red.hex()));
}

#[tokio::test]
async fn test_skipped_meal_after_cutoff_is_not_late() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();
    h.clock.set(15, 0);

    h.dispatcher
        .handle_update(IncomingUpdate::Message(message(42, "Сунко обед не будет")))
        .await
        .unwrap();

    assert_eq!(cell(&h, 1, LedgerColumn::Meal(MealSlot::Lunch)).await, "-");
    assert!(h.gateway.texts().is_empty());
}

#[tokio::test]
async fn test_excuse_until_date_skips_reminders() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();
    h.ledger.append_row("Петрова", 7).await.unwrap();

    let outcome = h
        .reports
        .handle_message(&message(42, "Сунко уехала до 14 января"))
        .await
        .unwrap();
    let ReportOutcome::Applied(applied) = outcome else {
        panic!("expected applied");
    };
    assert_eq!(
        applied.excuse.and_then(|e| e.until_date),
        NaiveDate::from_ymd_opt(2026, 1, 14)
    );
    assert!(h.state.is_excused_today(42, day()).await.unwrap());

    let pinged = h.reminders.ping_missing(MealSlot::Lunch).await.unwrap();
    assert_eq!(pinged, 1);
    let texts = h.gateway.texts();
    assert!(texts[0].contains("обед"));
    assert!(texts[0].contains("tg://user?id=7"));
    assert!(!texts[0].contains("sunko"));
}

#[tokio::test]
async fn test_no_reminder_when_everyone_reported() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();
    h.reports
        .handle_message(&message(42, "Сунко обед"))
        .await
        .unwrap();

    assert_eq!(h.reminders.ping_missing(MealSlot::Lunch).await.unwrap(), 0);
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn test_daily_export_sends_snapshot_and_rolls_over() {
    let h = harness(false).await;
    h.ledger.append_row("Сунко", 42).await.unwrap();
    h.reports
        .handle_message(&message(42, "Сунко первый вес 80"))
        .await
        .unwrap();
    h.reports
        .handle_message(&message(42, "Сунко завтрак"))
        .await
        .unwrap();
    h.ledger.paint_row(RowHandle(1), CellColor::Green).await.unwrap();

    let path = h.export.export_daily().await.unwrap();

    let sent = h.gateway.sent();
    assert_eq!(sent.len(), 1);
    let Sent::File {
        chat_id, caption, ..
    } = &sent[0]
    else {
        panic!("expected a file, got {:?}", sent[0]);
    };
    assert_eq!(*chat_id, CHAT);
    assert!(caption.as_deref().unwrap_or("").contains("05.01.2026"));
    assert!(path.exists());

    let rows = h.ledger.list_rows().await.unwrap();
    assert_eq!(rows[0].meal(MealSlot::Breakfast), "");
    assert_eq!(rows[0].weight, Some(80.0));
}

#[tokio::test]
async fn test_admin_commands_are_guarded() {
    let h = harness(false).await;
    let mut msg = message(42, "/export");
    h.dispatcher
        .handle_update(IncomingUpdate::Message(msg.clone()))
        .await
        .unwrap();
    assert_eq!(h.gateway.sent().len(), 1);
    assert!(h.gateway.texts()[0].contains("администратор"));

    msg.sender.id = ADMIN;
    msg.text = "/reset".to_string();
    h.dispatcher
        .handle_update(IncomingUpdate::Message(msg))
        .await
        .unwrap();
    assert!(h.gateway.texts().last().unwrap().contains("очищены"));
}

#[tokio::test]
async fn test_unknown_menu_callback_alerts() {
    let h = harness(false).await;
    let cb = CallbackQuery {
        id: "cb".to_string(),
        chat_id: Some(CHAT),
        sender: sender(42, None),
        data: "menu:42".to_string(),
    };
    h.dispatcher
        .handle_update(IncomingUpdate::Callback(cb))
        .await
        .unwrap();
    assert_eq!(
        h.gateway.sent(),
        vec![Sent::Callback {
            text: Some("Меню не найдено".to_string()),
            alert: true
        }]
    );
}

#[tokio::test]
async fn test_missing_menu_file_is_reported() {
    let h = harness(false).await;
    let cb = CallbackQuery {
        id: "cb".to_string(),
        chat_id: Some(CHAT),
        sender: sender(42, None),
        data: "menu:3".to_string(),
    };
    h.dispatcher
        .handle_update(IncomingUpdate::Callback(cb))
        .await
        .unwrap();
    let texts = h.gateway.texts();
    assert_eq!(texts, vec!["Файл не найден: menu_3.jpg".to_string()]);
}
