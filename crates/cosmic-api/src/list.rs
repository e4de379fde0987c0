//! Paginated list assembly
//!
//! List endpoints return `{"count": N, "<list key>": [...]}` one page at a
//! time. [`PaginatedLister`] keeps fetching until it holds all `count`
//! entities. The next page size is always the size of the batch just
//! received, since the server decides how many records a page holds.

use crate::command::{Command, ParamValue};
use crate::envelope::Envelope;
use crate::error::{CosmicError, Result};
use crate::normalize::Normalizer;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// A list request: filters stay fixed, page and page size move
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    command: String,
    list_key: String,
    filters: BTreeMap<String, ParamValue>,
    page: Option<i64>,
    page_size: Option<i64>,
    normalizer: Normalizer,
}

impl ListQuery {
    pub fn new(command: impl Into<String>, list_key: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            list_key: list_key.into(),
            filters: BTreeMap::new(),
            page: None,
            page_size: None,
            normalizer: Normalizer::NONE,
        }
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn filter_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.filter(key, v),
            None => self,
        }
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn list_key(&self) -> &str {
        &self.list_key
    }

    pub fn filters(&self) -> &BTreeMap<String, ParamValue> {
        &self.filters
    }

    /// Build the command for the current page
    pub fn to_command(&self) -> Result<Command> {
        Command::builder(&self.command)
            .params(&self.filters)
            .param_opt("page", self.page)
            .param_opt("pagesize", self.page_size)
            .normalizer(self.normalizer)
            .build()
    }
}

/// Fully assembled list result
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<T> {
    /// Entities in server order
    pub items: Vec<T>,

    /// Server-reported total
    pub total_count: usize,
}

impl<T> ResultSet<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl ResultSet<Value> {
    /// Decode every raw entity into `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<ResultSet<T>> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?;
        Ok(ResultSet {
            items,
            total_count: self.total_count,
        })
    }
}

/// One decoded page
struct Page {
    count: usize,
    items: Vec<Value>,
}

impl Page {
    fn from_value(body: Value, list_key: &str) -> Result<Self> {
        let Value::Object(mut map) = body else {
            return Err(CosmicError::decode("list response is not an object"));
        };

        let count = match map.get("count") {
            None | Some(Value::Null) => 0,
            Some(v) => v
                .as_u64()
                .and_then(|c| usize::try_from(c).ok())
                .ok_or_else(|| CosmicError::decode(format!("invalid list count {}", v)))?,
        };

        let items = match map.remove(list_key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(CosmicError::decode(format!(
                    "list key '{}' is not an array",
                    list_key
                )));
            }
        };

        Ok(Self { count, items })
    }
}

/// Fetches every page of a list query
pub struct PaginatedLister<'a> {
    transport: &'a dyn Transport,
}

impl<'a> PaginatedLister<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    /// Assemble the complete result set for `query`
    pub async fn fetch_all(&self, query: ListQuery) -> Result<ResultSet<Value>> {
        self.assemble(query, true).await
    }

    /// Like [`fetch_all`](Self::fetch_all), but repeated ids are kept so the
    /// caller can count them
    pub(crate) async fn fetch_all_with_duplicates(
        &self,
        query: ListQuery,
    ) -> Result<ResultSet<Value>> {
        self.assemble(query, false).await
    }

    async fn assemble(&self, mut query: ListQuery, dedup: bool) -> Result<ResultSet<Value>> {
        let mut assembled: Vec<Value> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut total_count: Option<usize> = None;

        loop {
            let command = query.to_command()?;
            let raw = self.transport.send(&command).await?;
            let body = Envelope::from_bytes(&raw)?.into_value();
            let body = command.normalizer().normalize_value(body)?;
            let page = Page::from_value(body, &query.list_key)?;

            let total = *total_count.get_or_insert(page.count);
            if page.count != total {
                return Err(CosmicError::InconsistentPagination(format!(
                    "{}: total changed from {} to {} during listing",
                    query.command, total, page.count
                )));
            }

            let batch = page.items.len();
            for item in page.items {
                if let Some(id) = item.get("id").and_then(Value::as_str).filter(|_| dedup) {
                    if !seen.insert(id.to_string()) {
                        return Err(CosmicError::InconsistentPagination(format!(
                            "{}: entity {} returned twice",
                            query.command, id
                        )));
                    }
                }
                assembled.push(item);
            }

            tracing::trace!(
                command = %query.command,
                page = query.page.unwrap_or(1),
                batch,
                assembled = assembled.len(),
                total,
                "Fetched list page"
            );

            if assembled.len() == total {
                return Ok(ResultSet {
                    items: assembled,
                    total_count: total,
                });
            }

            if assembled.len() > total {
                return Err(CosmicError::InconsistentPagination(format!(
                    "{}: received {} entities but total is {}",
                    query.command,
                    assembled.len(),
                    total
                )));
            }

            if batch == 0 {
                return Err(CosmicError::InconsistentPagination(format!(
                    "{}: empty page after {} of {} entities",
                    query.command,
                    assembled.len(),
                    total
                )));
            }

            query.page = Some(query.page.unwrap_or(1) + 1);
            query.page_size = Some(batch as i64);
        }
    }

    /// Assemble and decode into `T`
    pub async fn fetch_all_as<T: DeserializeOwned>(&self, query: ListQuery) -> Result<ResultSet<T>> {
        self.fetch_all(query).await?.decode()
    }
}
