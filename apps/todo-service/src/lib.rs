//! # Todo Service ライブラリ
//!
//! 設定、ルーター構築、ハンドラを公開する。
//! `main.rs` はインフラ初期化とサーバー起動に集中し、
//! テストは [`app_builder::build_app`] にモックリポジトリを注入して使う。

pub mod app_builder;
pub mod config;
pub mod cors;
pub mod error;
pub mod handler;
