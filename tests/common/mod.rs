//! In-memory stand-in for the PostgREST store

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use rinkstats::adapters::{Filter, FilterOp, RemoteStore, SelectQuery};
use rinkstats::domain::Row;
use rinkstats::{AppConfig, AppState, LeagueService, Result, RosterService, StatsError};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
pub struct FakeStore {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: &str, rows: Vec<Value>) -> Self {
        self.set_table(name, rows);
        self
    }

    pub fn set_table(&self, name: &str, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .map(|v| v.as_object().cloned().expect("fixture rows are objects"))
            .collect();
        self.tables.lock().unwrap().insert(name.to_string(), rows);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StatsError::UpstreamUnavailable(format!(
                "{} unreachable",
                query.table
            )));
        }

        let mut rows = self
            .tables
            .lock()
            .unwrap()
            .get(&query.table)
            .cloned()
            .unwrap_or_default();

        rows.retain(|row| matches_all(row, &query.filters));
        rows.sort_by(|a, b| {
            query
                .order_by
                .iter()
                .map(|o| {
                    let ord = compare(a.get(&o.column), b.get(&o.column));
                    if o.descending {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(Value::as_f64), b.and_then(Value::as_f64)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.map(Value::to_string).cmp(&b.map(Value::to_string)),
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches(row, f))
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let Some(value) = row.get(&filter.column) else {
        return false;
    };
    let ord = match (value.as_f64(), filter.value.parse::<f64>().ok()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => value.as_str().unwrap_or_default().cmp(&filter.value),
    };
    match filter.op {
        FilterOp::Eq => ord == Ordering::Equal,
        FilterOp::Gt => ord == Ordering::Greater,
        FilterOp::Gte => ord != Ordering::Less,
        FilterOp::Lt => ord == Ordering::Less,
        FilterOp::Lte => ord != Ordering::Greater,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<FakeStore>,
    pub roster: Arc<RosterService>,
}

/// Router wired to `store`, without a running refresh loop
pub fn test_app(store: FakeStore) -> TestApp {
    let store = Arc::new(store);
    let config = AppConfig::for_store("http://fake.local", "test-key");
    let roster = Arc::new(RosterService::new());
    let league = Arc::new(LeagueService::new(
        store.clone() as Arc<dyn RemoteStore>,
        Arc::clone(&roster),
        &config,
    ));
    let router = rinkstats::create_router(AppState::new(Arc::clone(&roster), league));
    TestApp {
        router,
        store,
        roster,
    }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    /// Start the refresh loop and wait for its first cycle to finish
    pub async fn start_refresh(&self) {
        self.roster
            .start(
                self.store.clone() as Arc<dyn RemoteStore>,
                "test_database",
                Duration::from_secs(3600),
            )
            .await
            .unwrap();
        for _ in 0..200 {
            let state = self.roster.refresh_state().await;
            if state.last_success_at.is_some() || state.consecutive_failures > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("first refresh cycle did not finish");
    }
}
