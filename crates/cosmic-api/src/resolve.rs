//! Single-match resolution by identifier
//!
//! Looking an entity up by id must yield exactly one result. Zero results
//! means the entity is gone; more than one means the reference itself can't
//! be trusted. The two are never collapsed into "take the first".

use crate::error::{CosmicError, INVALID_PARAMETER_ERROR, Result};
use crate::list::{ListQuery, PaginatedLister};
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub struct SingleMatchResolver<'a> {
    lister: PaginatedLister<'a>,
}

impl<'a> SingleMatchResolver<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            lister: PaginatedLister::new(transport),
        }
    }

    /// Resolve the one entity of `query` whose id is `id`
    pub async fn resolve_one(&self, query: ListQuery, id: &str) -> Result<Value> {
        let query = query.filter("id", id);

        // Repeats of the filtered id are an ambiguity, not a paging fault
        let result = match self.lister.fetch_all_with_duplicates(query).await {
            Ok(result) => result,
            Err(CosmicError::Transport {
                error_code: Some(INVALID_PARAMETER_ERROR),
                ..
            }) => {
                return Err(CosmicError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(e),
        };

        let mut items = result.items;
        match items.len() {
            0 => Err(CosmicError::NotFound { id: id.to_string() }),
            1 => Ok(items.remove(0)),
            count => Err(CosmicError::AmbiguousMatch {
                id: id.to_string(),
                count,
            }),
        }
    }

    /// Resolve and decode into `T`
    pub async fn resolve_one_as<T: DeserializeOwned>(&self, query: ListQuery, id: &str) -> Result<T> {
        let entity = self.resolve_one(query, id).await?;
        Ok(serde_json::from_value(entity)?)
    }
}
