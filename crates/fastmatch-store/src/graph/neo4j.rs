//! Neo4j over the HTTP transactional Cypher endpoint.
//!
//! Every call is a single auto-committed transaction:
//! `POST {base}/db/{database}/tx/commit` with basic auth and a JSON body of
//! statements. Cypher errors come back in the body with status 200, so both
//! the status and the `errors` array are checked.

use super::{DeckRows, GraphCounts, GraphDriver};
use crate::config::GraphConfig;
use crate::{Result, StoreError};
use async_trait::async_trait;
use fastmatch_plane::{CardId, PointId};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

const PING: &str = "RETURN 1 AS ok";

const COUNT_POINTS: &str = "MATCH (p:Point) RETURN count(p) AS n";
const COUNT_CARDS: &str = "MATCH (c:Card) RETURN count(c) AS n";
const COUNT_INCIDENCES: &str = "MATCH (:Point)-[r:ON]->(:Card) RETURN count(r) AS n";

const POINT_CONSTRAINT: &str =
    "CREATE CONSTRAINT point_id IF NOT EXISTS FOR (p:Point) REQUIRE p.pointId IS UNIQUE";
const CARD_CONSTRAINT: &str =
    "CREATE CONSTRAINT card_id IF NOT EXISTS FOR (c:Card) REQUIRE c.cardId IS UNIQUE";

const MERGE_POINTS: &str = "\
UNWIND $rows AS row
MERGE (p:Point:Symbol {pointId: row.pointId})
SET p.name = row.name";

const MERGE_CARDS: &str = "\
UNWIND $rows AS row
MERGE (c:Line:Card {cardId: row.cardId})
SET c.label = row.label";

const MERGE_INCIDENCES: &str = "\
UNWIND $rows AS row
MATCH (p:Point {pointId: row.pointId})
MATCH (c:Card {cardId: row.cardId})
MERGE (p)-[:ON]->(c)";

const SYMBOLS_ON_CARD: &str = "\
MATCH (p:Point:Symbol)-[:ON]->(:Card {cardId: $card})
RETURN p.pointId AS pointId
ORDER BY pointId";

const SHARED_SYMBOL: &str = "\
MATCH (:Card {cardId: $a})<-[:ON]-(p:Point:Symbol)-[:ON]->(:Card {cardId: $b})
RETURN p.pointId AS pointId
ORDER BY pointId";

const SYMBOL_NAMES: &str = "MATCH (p:Point:Symbol) RETURN p.name AS name ORDER BY name";

// ============================================================================
// Wire Format
// ============================================================================

#[derive(Debug, Serialize)]
struct Statement {
    statement: &'static str,
    parameters: Value,
}

impl Statement {
    fn new(statement: &'static str) -> Self {
        Self {
            statement,
            parameters: json!({}),
        }
    }

    fn with(statement: &'static str, parameters: Value) -> Self {
        Self {
            statement,
            parameters,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
    #[serde(default)]
    errors: Vec<CypherError>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    data: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct CypherError {
    code: String,
    message: String,
}

fn decode_response(body: &str, expected: usize) -> Result<Vec<QueryResult>> {
    let response: TxResponse = serde_json::from_str(body)
        .map_err(|e| StoreError::Unavailable(format!("malformed Neo4j response: {e}")))?;
    if let Some(err) = response.errors.first() {
        return Err(StoreError::Unavailable(format!(
            "Neo4j rejected the query ({}): {}",
            err.code, err.message
        )));
    }
    if response.results.len() != expected {
        return Err(StoreError::Unavailable(format!(
            "Neo4j returned {} results for {expected} statements",
            response.results.len()
        )));
    }
    Ok(response.results)
}

impl QueryResult {
    fn column(&self, idx: usize) -> impl Iterator<Item = Option<&Value>> + '_ {
        self.data.iter().map(move |row| row.row.get(idx))
    }

    fn u64_column(&self) -> Result<Vec<u64>> {
        self.column(0)
            .map(|v| {
                v.and_then(Value::as_u64)
                    .ok_or_else(|| StoreError::Unavailable("expected an integer column".into()))
            })
            .collect()
    }

    fn string_column(&self) -> Result<Vec<String>> {
        self.column(0)
            .map(|v| {
                v.and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| StoreError::Unavailable("expected a string column".into()))
            })
            .collect()
    }

    fn point_ids(&self) -> Result<Vec<PointId>> {
        self.u64_column()?
            .into_iter()
            .map(|raw| {
                u32::try_from(raw)
                    .map(PointId::new)
                    .map_err(|_| StoreError::Unavailable(format!("pointId {raw} out of range")))
            })
            .collect()
    }

    fn single_count(&self) -> Result<u64> {
        self.u64_column()?
            .first()
            .copied()
            .ok_or_else(|| StoreError::Unavailable("count query returned no rows".into()))
    }
}

// ============================================================================
// Driver
// ============================================================================

pub struct Neo4jHttpDriver {
    client: Client,
    endpoint: String,
    user: String,
    password: String,
    query_timeout: Duration,
    write_timeout: Duration,
}

impl std::fmt::Debug for Neo4jHttpDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jHttpDriver")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("query_timeout", &self.query_timeout)
            .field("write_timeout", &self.write_timeout)
            .finish_non_exhaustive()
    }
}

impl Neo4jHttpDriver {
    /// Build a driver; `timeout` bounds each HTTP request until
    /// [`Neo4jHttpDriver::with_write_timeout`] gives seeding its own limit.
    pub fn new(config: &GraphConfig, timeout: Duration) -> Result<Self> {
        let base = config.http_base_url()?;
        if !config.uri.trim().starts_with("http") {
            tracing::warn!(
                uri = %config.uri,
                http = %base,
                "bolt URI configured; talking to the HTTP API instead"
            );
        }
        let client = Client::builder()
            .build()
            .map_err(|e| StoreError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{base}/db/{}/tx/commit", config.database.trim()),
            user: config.user.clone(),
            password: config.password.clone(),
            query_timeout: timeout,
            write_timeout: timeout,
        })
    }

    /// Limit for the requests that write the deck.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// (read, write) request limits.
    pub fn timeouts(&self) -> (Duration, Duration) {
        (self.query_timeout, self.write_timeout)
    }

    async fn run(&self, statements: Vec<Statement>) -> Result<Vec<QueryResult>> {
        self.run_within(statements, self.query_timeout).await
    }

    async fn run_within(&self, statements: Vec<Statement>, limit: Duration) -> Result<Vec<QueryResult>> {
        let expected = statements.len();
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(limit)
            .basic_auth(&self.user, Some(&self.password))
            .header("Accept", "application/json")
            .json(&json!({ "statements": statements }))
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("cannot reach Neo4j: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreError::Unavailable(format!(
                "Neo4j rejected the credentials of user `{}`",
                self.user
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Unavailable(format!("cannot read Neo4j response: {e}")))?;
        if !status.is_success() {
            return Err(StoreError::Unavailable(format!(
                "Neo4j answered {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        decode_response(&body, expected)
    }

    async fn run_one(&self, statement: Statement) -> Result<QueryResult> {
        self.run(vec![statement])
            .await?
            .pop()
            .ok_or_else(|| StoreError::Unavailable("Neo4j returned no result".into()))
    }
}

#[async_trait]
impl GraphDriver for Neo4jHttpDriver {
    fn name(&self) -> &str {
        "neo4j"
    }

    async fn ping(&self) -> Result<()> {
        self.run_one(Statement::new(PING)).await.map(|_| ())
    }

    async fn counts(&self) -> Result<GraphCounts> {
        let results = self
            .run(vec![
                Statement::new(COUNT_POINTS),
                Statement::new(COUNT_CARDS),
                Statement::new(COUNT_INCIDENCES),
            ])
            .await?;
        Ok(GraphCounts {
            points: results[0].single_count()?,
            cards: results[1].single_count()?,
            incidences: results[2].single_count()?,
        })
    }

    async fn merge_deck(&self, deck: &DeckRows) -> Result<()> {
        // schema changes cannot share a transaction with writes
        self.run_within(
            vec![
                Statement::new(POINT_CONSTRAINT),
                Statement::new(CARD_CONSTRAINT),
            ],
            self.write_timeout,
        )
        .await?;
        self.run_within(
            vec![
                Statement::with(MERGE_POINTS, json!({ "rows": deck.points })),
                Statement::with(MERGE_CARDS, json!({ "rows": deck.cards })),
                Statement::with(MERGE_INCIDENCES, json!({ "rows": deck.incidences })),
            ],
            self.write_timeout,
        )
        .await?;
        Ok(())
    }

    async fn points_on_card(&self, card: CardId) -> Result<Vec<PointId>> {
        self.run_one(Statement::with(SYMBOLS_ON_CARD, json!({ "card": card })))
            .await?
            .point_ids()
    }

    async fn shared_points(&self, a: CardId, b: CardId) -> Result<Vec<PointId>> {
        self.run_one(Statement::with(SHARED_SYMBOL, json!({ "a": a, "b": b })))
            .await?
            .point_ids()
    }

    async fn symbol_names(&self) -> Result<Vec<String>> {
        self.run_one(Statement::new(SYMBOL_NAMES))
            .await?
            .string_column()
    }
}
