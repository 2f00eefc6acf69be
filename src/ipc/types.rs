use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::model::{AttendanceRecord, CalendarEvent, LeaveRequest, Transaction, User};
use crate::seed;
use crate::store::{Collection, RecordStore};
use crate::substrate::SqliteSubstrate;
use crate::sync::Notice;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// The in-memory copy of every collection. Handlers mutate these and write
/// the whole collection back through the store; the sync pump overwrites
/// them when another process saves.
pub struct Collections {
    pub staff: Vec<User>,
    pub students: Vec<User>,
    pub transactions: Vec<Transaction>,
    pub leaves: Vec<LeaveRequest>,
    pub events: Vec<CalendarEvent>,
    pub attendance: Vec<AttendanceRecord>,
}

/// An open workspace: the durable store plus the collections loaded from it.
pub struct Erp {
    pub store: RecordStore<SqliteSubstrate>,
    pub data: Collections,
}

impl Erp {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let mut store = RecordStore::new(SqliteSubstrate::open(workspace)?);
        let data = Collections {
            staff: store.load_or_seed(Collection::Staff, seed::staff_list()),
            students: store.load_or_seed(Collection::Students, seed::students()),
            transactions: store.load_or_seed(Collection::Transactions, seed::transactions()),
            leaves: store.load_or_seed(Collection::Leaves, seed::leaves()),
            events: store.load_or_seed(Collection::Events, Vec::new()),
            attendance: store.load_or_seed(Collection::Attendance, Vec::new()),
        };
        Ok(Self { store, data })
    }
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub erp: Option<Erp>,
    pub session: Option<User>,
    pub notices: Vec<Notice>,
    /// Keys applied by the most recent sync pump, surfaced via `sync.poll`.
    pub last_sync: Vec<String>,
    pub login_delay: Duration,
    pub notice_ttl: Duration,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            erp: None,
            session: None,
            notices: Vec::new(),
            last_sync: Vec::new(),
            login_delay: env_ms("ERPD_LOGIN_DELAY_MS", 600),
            notice_ttl: env_ms("ERPD_NOTICE_TTL_MS", 4000),
        }
    }
}

fn env_ms(var: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}
