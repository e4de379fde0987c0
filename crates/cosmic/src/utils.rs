use anyhow::{Context, bail};
use colored::Colorize;
use cosmic_api::ParamValue;
use serde_json::Value;
use std::collections::BTreeMap;

const TAG_PREFIX: &str = "tags.";

/// `key=value` の値部分をパース
///
/// 整数は `Int`、`true`/`false` は `Bool`、それ以外は文字列として扱う。
pub fn parse_value(raw: &str) -> ParamValue {
    if let Ok(n) = raw.parse::<i64>() {
        return ParamValue::Int(n);
    }
    match raw {
        "true" => ParamValue::Bool(true),
        "false" => ParamValue::Bool(false),
        _ => ParamValue::Str(raw.to_string()),
    }
}

/// `key=value` 引数をコマンドパラメータに変換
///
/// `tags.<key>=<value>` はまとめて1つの `tags` として扱う。
pub fn parse_params(args: &[String]) -> anyhow::Result<BTreeMap<String, ParamValue>> {
    let mut params = BTreeMap::new();
    let mut tags = BTreeMap::new();

    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .with_context(|| format!("key=value 形式で指定してください: '{}'", arg))?;
        if key.is_empty() {
            bail!("パラメータ名が空です: '{}'", arg);
        }

        if let Some(tag) = key.strip_prefix(TAG_PREFIX) {
            if tag.is_empty() {
                bail!("タグ名が空です: '{}'", arg);
            }
            tags.insert(tag.to_string(), value.to_string());
        } else if params.insert(key.to_string(), parse_value(value)).is_some() {
            bail!("パラメータ '{}' が重複しています", key);
        }
    }

    if !tags.is_empty() {
        params.insert("tags".to_string(), ParamValue::Tags(tags));
    }
    Ok(params)
}

pub fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// ステータスを stderr に1行で表示
pub fn status(message: &str) {
    eprintln!("{} {}", "›".cyan(), message.dimmed());
}
