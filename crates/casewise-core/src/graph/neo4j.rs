//! Neo4j-backed [`GraphSource`].

use async_trait::async_trait;
use neo4rs::{query, Graph};
use serde_json::Value;
use tracing::debug;

use super::error::GraphError;
use super::queries::Statement;
use super::{GraphSource, Record};
use crate::config::GraphConfig;

/// A live Bolt connection.
pub struct Neo4jSource {
    graph: Graph,
}

impl Neo4jSource {
    /// Open a connection and check it with a trivial query.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let uri = config.uri.as_deref().ok_or(GraphError::NotConfigured)?;
        let password = config.password.clone().unwrap_or_default();

        let graph = Graph::new(uri, config.username.as_str(), password.as_str()).await?;
        graph.run(query("RETURN 1")).await?;

        debug!(uri, "connected to graph database");
        Ok(Self { graph })
    }
}

#[async_trait]
impl GraphSource for Neo4jSource {
    async fn run(&self, statement: &Statement) -> Result<Vec<Record>, GraphError> {
        let mut q = query(statement.cypher);
        for (key, value) in &statement.params {
            q = q.param(key, value.as_str());
        }

        let mut stream = self.graph.execute(q).await?;
        let mut records = Vec::new();
        while let Some(row) = stream.next().await? {
            let mut record = Record::new();
            for column in statement.columns {
                let value: Value = row.get(column).map_err(|e| GraphError::Decode {
                    statement: statement.name,
                    message: format!("column {column}: {e}"),
                })?;
                record.insert((*column).to_string(), value);
            }
            records.push(record);
        }

        debug!(statement = statement.name, rows = records.len(), "graph query");
        Ok(records)
    }
}
