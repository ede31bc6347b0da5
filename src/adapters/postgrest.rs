//! Supabase / PostgREST adapter (plain reqwest, no SDK dependency).
//!
//! Translates [`SelectQuery`] into PostgREST's query-string grammar:
//! `select=a,"Spaced Col"`, `col=op.value`, `order=a.desc,b.asc`,
//! `limit`/`offset`.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{RemoteStore, SelectQuery};
use crate::config::StoreConfig;
use crate::domain::Row;
use crate::error::{Result, StatsError};

const REST_PATH: &str = "/rest/v1";
const MAX_ERROR_BODY: usize = 512;

#[derive(Clone)]
pub struct PostgrestClient {
    http: Client,
    base_url: String,
    api_key: String,
    page_size: usize,
}

impl PostgrestClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        page_size: usize,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("rinkstats/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| StatsError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            page_size: page_size.max(1),
        })
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        Self::new(
            &config.url,
            &config.api_key,
            Duration::from_secs(config.timeout_secs),
            config.page_size,
        )
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table)
    }

    async fn fetch_page(
        &self,
        query: &SelectQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Row>> {
        let params = query_params(query, offset, Some(limit));
        let resp = self
            .http
            .get(self.table_url(&query.table))
            .query(&params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            let message: String = text.chars().take(MAX_ERROR_BODY).collect();
            return Err(StatsError::Store {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str::<Vec<Row>>(&text)?)
    }
}

#[async_trait]
impl RemoteStore for PostgrestClient {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        if let Some(limit) = query.limit {
            return self.fetch_page(query, 0, limit).await;
        }

        // Servers cap rows per response; keep paging until a short page.
        // Offsets are only stable over a total order.
        if query.order_by.is_empty() {
            warn!(table = %query.table, "paging a query without an order");
        }
        let mut rows = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.fetch_page(query, offset, self.page_size).await?;
            let fetched = page.len();
            rows.extend(page);
            debug!(table = %query.table, offset, fetched, "fetched page");
            if fetched < self.page_size {
                break;
            }
            offset += fetched;
        }
        Ok(rows)
    }
}

/// Quote identifiers PostgREST would otherwise misparse (spaces, capitals)
fn quote_ident(column: &str) -> String {
    let plain = !column.is_empty()
        && column
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if plain || column == "*" {
        column.to_string()
    } else {
        format!("\"{}\"", column.replace('"', ""))
    }
}

fn query_params(
    query: &SelectQuery,
    offset: usize,
    limit: Option<usize>,
) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(query.filters.len() + 4);

    let select = if query.columns.is_empty() {
        "*".to_string()
    } else {
        query
            .columns
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(",")
    };
    params.push(("select".to_string(), select));

    for filter in &query.filters {
        params.push((
            quote_ident(&filter.column),
            format!("{}.{}", filter.op, filter.value),
        ));
    }

    if !query.order_by.is_empty() {
        let order = query
            .order_by
            .iter()
            .map(|o| {
                format!(
                    "{}.{}",
                    quote_ident(&o.column),
                    if o.descending { "desc" } else { "asc" }
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }

    if let Some(limit) = limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if offset > 0 {
        params.push(("offset".to_string(), offset.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::FilterOp;
    use crate::services::roster_query;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("first_name"), "first_name");
        assert_eq!(quote_ident("Player ID"), "\"Player ID\"");
        assert_eq!(quote_ident("Headshot"), "\"Headshot\"");
        assert_eq!(quote_ident("*"), "*");
    }

    #[test]
    fn test_query_params() {
        let query = SelectQuery::new("team_stats")
            .columns(["team_id", "Team Name"])
            .eq("season_id", 20252026)
            .filter("games_played", FilterOp::Gte, 10)
            .order_desc("points")
            .order_asc("goals_for");
        let params = query_params(&query, 2000, Some(1000));

        assert_eq!(param(&params, "select"), Some("team_id,\"Team Name\""));
        assert_eq!(param(&params, "season_id"), Some("eq.20252026"));
        assert_eq!(param(&params, "games_played"), Some("gte.10"));
        assert_eq!(param(&params, "order"), Some("points.desc,goals_for.asc"));
        assert_eq!(param(&params, "limit"), Some("1000"));
        assert_eq!(param(&params, "offset"), Some("2000"));
    }

    #[test]
    fn test_query_params_defaults() {
        let params = query_params(&SelectQuery::new("skater_stats"), 0, None);
        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "order"), None);
        assert_eq!(param(&params, "offset"), None);
    }

    #[test]
    fn test_paged_roster_request_is_ordered() {
        let params = query_params(&roster_query("test_database"), 1000, Some(1000));
        assert_eq!(param(&params, "order"), Some("\"Player ID\".asc"));
        assert_eq!(param(&params, "limit"), Some("1000"));
        assert_eq!(param(&params, "offset"), Some("1000"));
    }

    #[test]
    fn test_table_url_trims_slash() {
        let url = "https://abc.supabase.co/";
        let client = PostgrestClient::new(url, "key", Duration::from_secs(5), 1000);
        let client = client.unwrap();
        assert_eq!(
            client.table_url("skater_stats"),
            "https://abc.supabase.co/rest/v1/skater_stats"
        );
    }
}
