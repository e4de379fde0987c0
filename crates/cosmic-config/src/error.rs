use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "設定ファイルが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: cosmic.yaml, .cosmic.yaml\n\
        - ~/.config/cosmic/config.yaml\n\
        COSMIC_CONFIG_PATH でファイルを直接指定することもできます"
    )]
    ConfigFileNotFound,

    #[error("必須設定 '{0}' がありません（設定ファイルか {1} で指定してください）")]
    MissingField(&'static str, &'static str),

    #[error("{path} のパースに失敗しました: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("{name} の値が不正です: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
