use crate::utils;
use colored::Colorize;
use cosmic_api::{CosmicClient, JobStatus};

pub async fn handle(client: &CosmicClient, job_id: String) -> anyhow::Result<()> {
    let job = client.query_job(&job_id).await?;

    let status = match job.status {
        JobStatus::Pending => job.status.to_string().yellow(),
        JobStatus::Success => job.status.to_string().green(),
        JobStatus::Failed => job.status.to_string().red(),
    };
    utils::status(&format!("ジョブ {}: {}", job.id, status));

    utils::print_json(&serde_json::to_value(&job)?)
}
