pub mod health;
pub mod league;
pub mod refresh;
pub mod roster;
pub mod snapshot;
pub mod ttl_cache;

pub use health::{HealthReport, HealthStatus};
pub use league::{LeagueSample, LeagueService, PlayerCard, PlayerDetail};
pub use refresh::{roster_query, RefreshPhase, RefreshScheduler, RefreshState, SharedRefreshState};
pub use roster::RosterService;
pub use snapshot::PlayerSnapshotCache;
pub use ttl_cache::TtlCache;
