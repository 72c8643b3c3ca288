use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::bowlers::BowlerRecord;
use crate::roster::RosterCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Csv,
    Dummy,
}

/// Result of one fetch cycle. Replaced wholesale on the next successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<T> {
    pub data: Vec<T>,
    pub updated_at: DateTime<Utc>,
    pub source: DataSource,
}

impl<T> Snapshot<T> {
    pub fn new(data: Vec<T>, source: DataSource) -> Self {
        Self {
            data,
            updated_at: Utc::now(),
            source,
        }
    }
}

pub type BowlerSnapshot = Snapshot<BowlerRecord>;
pub type RosterSnapshot = Snapshot<RosterCard>;

/// Last successful snapshots per league.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    bowlers: Arc<RwLock<HashMap<String, BowlerSnapshot>>>,
    roster: Arc<RwLock<HashMap<String, RosterSnapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn bowlers(&self, league: &str) -> Option<BowlerSnapshot> {
        self.bowlers.read().await.get(league).cloned()
    }

    pub async fn store_bowlers(&self, league: &str, snapshot: BowlerSnapshot) {
        self.bowlers.write().await.insert(league.to_string(), snapshot);
    }

    pub async fn roster(&self, league: &str) -> Option<RosterSnapshot> {
        self.roster.read().await.get(league).cloned()
    }

    pub async fn store_roster(&self, league: &str, snapshot: RosterSnapshot) {
        self.roster.write().await.insert(league.to_string(), snapshot);
    }
}
