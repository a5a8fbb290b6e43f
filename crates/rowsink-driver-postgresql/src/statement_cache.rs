use std::collections::HashMap;

use tokio_postgres::{Client, Error, Statement};

/// Prepared statements keyed by query text.
///
/// The engine re-executes the same INSERT template until a record with an
/// unseen field shows up, so preparing once per distinct template avoids a
/// round trip per event.
#[derive(Debug, Default)]
pub(crate) struct StatementCache {
    map: HashMap<String, Statement>,
}

impl StatementCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn prepare(
        &mut self,
        client: &Client,
        query: &str,
    ) -> Result<Statement, Error> {
        if let Some(statement) = self.map.get(query) {
            return Ok(statement.clone());
        }

        let statement = client.prepare(query).await?;
        self.map.insert(query.to_string(), statement.clone());
        Ok(statement)
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }
}
