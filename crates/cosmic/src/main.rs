mod commands;
mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cosmic_api::CosmicClient;
use cosmic_config::CosmicConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cosmic")]
#[command(about = "Cosmic クラウドAPIのコマンドラインクライアント", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// APIコマンドを実行
    Exec {
        /// APIコマンド名 (例: createFirewallRule)
        command: String,
        /// key=value 形式のパラメータ（タグは tags.<key>=<value>）
        params: Vec<String>,
        /// 非同期ジョブの完了を待つ
        #[arg(long = "async")]
        wait: bool,
        /// 非同期ジョブの待機上限（秒）
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// listコマンドの全ページを取得
    List {
        /// list系APIコマンド (例: listFirewallRules)
        command: String,
        /// エンティティを含むレスポンスのキー (例: firewallrule)
        list_key: String,
        /// key=value 形式のフィルタ
        params: Vec<String>,
    },
    /// IDでエンティティを1件だけ取得
    Get {
        command: String,
        list_key: String,
        id: String,
    },
    /// 非同期ジョブの現在の状態を表示
    Job {
        job_id: String,
    },
    /// バージョン情報を表示
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr へ（stdout は JSON 専用）
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Exec {
            command,
            params,
            wait,
            timeout,
        } => commands::exec::handle(&connect()?, command, params, wait, timeout).await?,
        Commands::List {
            command,
            list_key,
            params,
        } => commands::list::handle(&connect()?, command, list_key, params).await?,
        Commands::Get {
            command,
            list_key,
            id,
        } => commands::get::handle(&connect()?, command, list_key, id).await?,
        Commands::Job { job_id } => commands::job::handle(&connect()?, job_id).await?,
        Commands::Version => println!("cosmic {}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}

/// 設定を読み込んでクライアントを作成
fn connect() -> anyhow::Result<CosmicClient> {
    let config = CosmicConfig::load().context("設定の読み込みに失敗しました")?;
    tracing::debug!("APIエンドポイント: {}", config.api_url);
    Ok(CosmicClient::from_config(&config.to_client_config())?)
}
