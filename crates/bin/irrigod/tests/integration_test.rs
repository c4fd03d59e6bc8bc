//! End-to-end tests for the full irrigod stack.
//!
//! Each test wires the real components (in-memory `SQLite`, the virtual
//! board, the actuator, the router, the scheduler) and drives them through
//! the same entry points the daemon uses. No broker is involved: outbound
//! messages land in a recording sink.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use irrigo_adapter_storage_sqlite_sqlx::{Config, SqliteProgramStore};
use irrigo_adapter_virtual::{OutputEvent, VirtualBoard};
use irrigo_app::command_router::{DELETE_FAILED, PROGRAM_CREATED, PROGRAM_DELETED};
use irrigo_app::ports::{NotificationSink, ProgramStore};
use irrigo_app::{CommandRouter, ProgramScheduler, Topics, ZoneActuator};
use irrigo_domain::error::IrrigoError;
use irrigo_domain::time::LocalDateTime;
use irrigo_domain::zone::ZoneId;
use serde_json::{Value, json};

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    fn on(&self, topic: &str) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| serde_json::from_str(payload).unwrap())
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(
        &self,
        topic: &str,
        payload: String,
    ) -> impl Future<Output = Result<(), IrrigoError>> + Send {
        self.sent.lock().unwrap().push((topic.to_string(), payload));
        async { Ok(()) }
    }
}

type Store = Arc<SqliteProgramStore>;
type Board = Arc<VirtualBoard>;

struct Stack {
    store: Store,
    board: Board,
    sink: Arc<RecordingSink>,
    actuator: ZoneActuator<Board>,
    router: CommandRouter<Store, Board, Arc<RecordingSink>>,
    topics: Topics,
}

/// Build a fully-wired stack backed by an in-memory `SQLite` database.
async fn stack() -> Stack {
    stack_with_settle(Duration::ZERO).await
}

async fn stack_with_settle(settle_delay: Duration) -> Stack {
    let db = Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise");

    let store = Arc::new(SqliteProgramStore::new(db.pool().clone()));
    let board = Arc::new(VirtualBoard::default());
    let sink = Arc::new(RecordingSink::default());
    let actuator = ZoneActuator::new(Arc::clone(&board), settle_delay);
    let topics = Topics::default();
    let router = CommandRouter::new(
        Arc::clone(&store),
        actuator.clone(),
        Arc::clone(&sink),
        topics.clone(),
    );

    Stack {
        store,
        board,
        sink,
        actuator,
        router,
        topics,
    }
}

fn tuesday(hour: u32, minute: u32, second: u32) -> LocalDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 4)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

fn lawn() -> Value {
    json!({
        "name": "Lawn",
        "zone": "zone_2",
        "active_day": "1-3-5",
        "start_time": "06:00",
        "duration": 600,
        "is_active": true,
        "is_running": false
    })
}

impl Stack {
    async fn send(&self, topic: &str, payload: &Value) {
        self.router
            .handle(topic, payload.to_string().as_bytes())
            .await;
    }

    async fn create(&self, program: Value) {
        let topic = self.topics.program.clone();
        self.send(&topic, &json!({"action": "create", "program": program}))
            .await;
    }
}

// ---------------------------------------------------------------------------
// Program commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_persist_program_and_publish_status_when_create_valid() {
    let s = stack().await;

    s.create(lawn()).await;

    let programs = s.store.list_all().await.unwrap();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0].definition.name, "Lawn");
    assert_eq!(programs[0].definition.zone, ZoneId::Zone2);

    assert_eq!(
        s.sink.on(&s.topics.notification),
        vec![json!({"data": PROGRAM_CREATED})]
    );
    let status = s.sink.on(&s.topics.status);
    assert_eq!(status.len(), 1);
    assert_eq!(status[0]["programs"][0]["name"], "Lawn");
    assert_eq!(status[0]["programs"][0]["active_day"], "1-3-5");
    assert_eq!(status[0]["programs"][0]["start_time"], "06:00");
}

#[tokio::test]
async fn should_leave_database_untouched_when_create_invalid() {
    let s = stack().await;
    let mut program = lawn();
    program["start_time"] = json!("6:00");

    s.create(program).await;

    assert!(s.store.list_all().await.unwrap().is_empty());
    let notices = s.sink.on(&s.topics.notification);
    assert_eq!(notices.len(), 1);
    assert!(notices[0]["data"].is_string());
    assert!(s.sink.on(&s.topics.status).is_empty());
}

#[tokio::test]
async fn should_edit_then_delete_program() {
    let s = stack().await;
    s.create(lawn()).await;
    let id = s.store.list_all().await.unwrap()[0].id;
    let topic = s.topics.program.clone();

    s.send(
        &topic,
        &json!({"action": "edit", "id": id.as_row(), "program": {"name": "Roses", "duration": 300}}),
    )
    .await;
    let edited = s.store.get(id).await.unwrap().unwrap();
    assert_eq!(edited.definition.name, "Roses");
    assert_eq!(edited.definition.duration_secs, 300);
    assert_eq!(edited.definition.zone, ZoneId::Zone2);

    s.send(&topic, &json!({"action": "delete", "id": id.as_row()}))
        .await;
    assert!(s.store.list_all().await.unwrap().is_empty());

    s.send(&topic, &json!({"action": "delete", "id": id.as_row()}))
        .await;

    let notices = s.sink.on(&s.topics.notification);
    assert_eq!(notices.len(), 4);
    assert_eq!(notices[2], json!({"data": PROGRAM_DELETED}));
    assert_eq!(notices[3], json!({"data": DELETE_FAILED}));
    let status = s.sink.on(&s.topics.status);
    assert_eq!(status.len(), 3);
    assert_eq!(status[1]["programs"][0]["name"], "Roses");
    assert_eq!(status[2]["programs"], json!([]));
}

// ---------------------------------------------------------------------------
// Zone commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_sequence_valve_when_zone_toggled() {
    let s = stack().await;
    let topic = s.topics.zone.clone();

    s.send(&topic, &json!({"zone": "zone_3"})).await;
    assert_eq!(s.board.energized_zones(), vec![ZoneId::Zone3]);
    assert!(s.board.main_valve());

    s.send(&topic, &json!({"zone": "zone_3"})).await;

    assert!(s.board.energized_zones().is_empty());
    assert!(!s.board.main_valve());
    assert_eq!(
        s.board.journal(),
        vec![
            OutputEvent::MainValve(true),
            OutputEvent::Zone(ZoneId::Zone3, true),
            OutputEvent::Zone(ZoneId::Zone3, false),
            OutputEvent::MainValve(false),
        ]
    );
    assert_eq!(s.actuator.active_zone().await, None);
}

#[tokio::test]
async fn should_close_zone_when_toggle_timer_elapses() {
    let s = stack().await;
    let topic = s.topics.zone.clone();

    s.send(&topic, &json!({"zone": "zone_4", "time": 1})).await;
    assert_eq!(s.actuator.active_zone().await, Some(ZoneId::Zone4));

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    assert_eq!(s.actuator.active_zone().await, None);
    assert!(s.board.energized_zones().is_empty());
    assert!(!s.board.main_valve());
}

#[tokio::test]
async fn should_leave_everything_off_when_command_dropped_before_final_reset() {
    let s = stack_with_settle(Duration::from_millis(100)).await;
    let topic = s.topics.zone.clone();
    let toggle = json!({"zone": "zone_5"});

    // Same order as daemon shutdown: inbound handling stops, then the reset.
    tokio::select! {
        () = s.send(&topic, &toggle) => panic!("toggle should still be settling"),
        () = tokio::time::sleep(Duration::from_millis(30)) => {}
    }
    s.actuator.deactivate_all().await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(s.board.energized_zones().is_empty());
    assert!(!s.board.main_valve());
    assert_eq!(s.actuator.active_zone().await, None);
}

#[tokio::test]
async fn should_ignore_malformed_zone_payload() {
    let s = stack().await;

    s.router.handle(&s.topics.zone, b"{not json").await;
    s.send(&s.topics.zone.clone(), &json!({"zone": "zone_9"}))
        .await;

    assert!(s.board.journal().is_empty());
    assert!(s.sink.on(&s.topics.notification).is_empty());
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_start_and_stop_program_against_sqlite() {
    let s = stack().await;
    s.create(lawn()).await;
    let id = s.store.list_all().await.unwrap()[0].id;
    let scheduler = ProgramScheduler::new(
        Arc::clone(&s.store),
        s.actuator.clone(),
        irrigo_app::ports::SystemClock,
    );

    let report = scheduler.evaluate(tuesday(6, 0, 0)).await.unwrap();
    assert_eq!(report.started, vec![id]);
    assert_eq!(s.board.energized_zones(), vec![ZoneId::Zone2]);
    assert!(s.store.get(id).await.unwrap().unwrap().definition.is_running);

    let report = scheduler.evaluate(tuesday(6, 0, 30)).await.unwrap();
    assert!(report.started.is_empty());
    assert!(report.stopped.is_empty());

    let report = scheduler.evaluate(tuesday(6, 10, 0)).await.unwrap();
    assert_eq!(report.stopped, vec![id]);
    assert!(!s.store.get(id).await.unwrap().unwrap().definition.is_running);

    s.actuator.deactivate_all().await;
    assert!(s.board.energized_zones().is_empty());
}

#[tokio::test]
async fn should_not_start_program_on_unlisted_day() {
    let s = stack().await;
    let mut program = lawn();
    program["active_day"] = json!("0-6");
    s.create(program).await;
    let scheduler = ProgramScheduler::new(
        Arc::clone(&s.store),
        s.actuator.clone(),
        irrigo_app::ports::SystemClock,
    );

    let report = scheduler.evaluate(tuesday(6, 0, 0)).await.unwrap();

    assert!(report.started.is_empty());
    assert!(s.board.journal().is_empty());
}
