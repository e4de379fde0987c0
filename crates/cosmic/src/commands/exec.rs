use crate::utils;
use cosmic_api::{Command, CosmicClient};
use std::time::Duration;

pub async fn handle(
    client: &CosmicClient,
    name: String,
    args: Vec<String>,
    wait: bool,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    let params = utils::parse_params(&args)?;
    let command = Command::builder(name).params(&params).build()?;

    let mut poll = *client.poll_config();
    if let Some(secs) = timeout {
        poll.timeout = Duration::from_secs(secs);
    }

    // --async は設定で無効でも待機を強制する
    let client = if wait {
        client.clone().with_async_mode(true)
    } else {
        client.clone()
    };

    if client.async_mode() {
        utils::status(&format!(
            "{} を実行中（非同期ジョブは最大 {} 秒待機）",
            command.name(),
            poll.timeout.as_secs()
        ));
    } else {
        utils::status(&format!("{} を実行中", command.name()));
    }

    let result = client.execute_with(command, &poll).await?;
    utils::print_json(&result)
}
