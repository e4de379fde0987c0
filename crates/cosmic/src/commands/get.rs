use crate::utils;
use cosmic_api::{CosmicClient, ListQuery};

pub async fn handle(
    client: &CosmicClient,
    command: String,
    list_key: String,
    id: String,
) -> anyhow::Result<()> {
    let entity = client
        .resolve_one(ListQuery::new(command, list_key), &id)
        .await?;
    utils::print_json(&entity)
}
