//! # Todo Service 設定
//!
//! 環境変数からサーバーの設定を読み込む。
//! 起動時に一度だけ読み込み、再読み込みはしない。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |

use thiserror::Error;

/// デフォルトのバインドアドレス
const DEFAULT_HOST: &str = "0.0.0.0";

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定（空文字列も未設定とみなす）
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// `PORT` がポート番号として解釈できない
    #[error("PORT は有効なポート番号である必要があります: {0:?}")]
    InvalidPort(String),
}

/// Todo Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// データベース接続 URL
    pub database_url: String,
}

impl TodoConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// `from_env` の実体。テストではプロセスの環境変数を書き換えずに済む。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port = required("PORT")?;
        let port: u16 = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;

        Ok(Self {
            host: lookup("HOST")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: required("DATABASE_URL")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_必須項目が揃っていれば読み込める() {
        let config = TodoConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/todo"),
        ]))
        .unwrap();

        assert_eq!(
            config,
            TodoConfig {
                host:         "0.0.0.0".to_string(),
                port:         8080,
                database_url: "postgres://localhost/todo".to_string(),
            }
        );
    }

    #[test]
    fn test_hostを上書きできる() {
        let config = TodoConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/todo"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
    }

    #[rstest]
    #[case(&[("DATABASE_URL", "postgres://localhost/todo")], ConfigError::Missing("PORT"))]
    #[case(&[("PORT", "8080")], ConfigError::Missing("DATABASE_URL"))]
    #[case(&[("PORT", "8080"), ("DATABASE_URL", "")], ConfigError::Missing("DATABASE_URL"))]
    #[case(&[("PORT", "http"), ("DATABASE_URL", "x")], ConfigError::InvalidPort("http".to_string()))]
    #[case(&[("PORT", "70000"), ("DATABASE_URL", "x")], ConfigError::InvalidPort("70000".to_string()))]
    fn test_不正な設定はエラーになる(
        #[case] pairs: &[(&str, &str)],
        #[case] expected: ConfigError,
    ) {
        assert_eq!(TodoConfig::from_lookup(lookup_from(pairs)), Err(expected));
    }
}
