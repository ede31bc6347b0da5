pub mod adapters;
pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;

pub use adapters::{PostgrestClient, RemoteStore, SelectQuery};
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use domain::{PlayerCategory, PlayerRecord, StatsScope};
pub use error::{Result, StatsError};
pub use services::{LeagueService, RefreshState, RosterService};
