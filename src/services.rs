pub mod league_service;
pub mod snapshot_store;

pub use league_service::LeagueService;
pub use snapshot_store::{BowlerSnapshot, DataSource, RosterSnapshot, Snapshot, SnapshotStore};
