use crate::utils;
use cosmic_api::{CosmicClient, ListQuery};
use serde_json::{Map, Value};

pub async fn handle(
    client: &CosmicClient,
    command: String,
    list_key: String,
    args: Vec<String>,
) -> anyhow::Result<()> {
    let mut query = ListQuery::new(command, list_key.clone());
    for (key, value) in utils::parse_params(&args)? {
        query = query.filter(key, value);
    }

    let result = client.fetch_all(query).await?;
    utils::status(&format!("{} 件の {} が見つかりました", result.total_count, list_key));

    let mut body = Map::new();
    body.insert("count".to_string(), Value::from(result.total_count));
    body.insert(list_key, Value::Array(result.items));
    utils::print_json(&Value::Object(body))
}
