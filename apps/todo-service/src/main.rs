//! # Todo Service サーバー
//!
//! `todos` テーブルに対する CRUD を JSON で提供する HTTP サーバー。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,todo=debug`） |
//!
//! `.env` ファイルがあれば起動時に読み込む。
//!
//! ## 起動方法
//!
//! ```bash
//! PORT=8080 DATABASE_URL=postgres://... cargo run -p todo-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use todo_infra::{db, repository::PostgresTodoRepository};
use todo_service::{
    app_builder::build_app,
    config::TodoConfig,
    cors::CorsSettings,
    handler::TodoState,
};
use todo_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("todo-service"));
    let _tracing_guard = tracing::info_span!("app", service = "todo-service").entered();

    let config = TodoConfig::from_env().context("設定の読み込みに失敗しました")?;

    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    tracing::info!("データベースに接続しました");

    let state = Arc::new(TodoState {
        repository: Arc::new(PostgresTodoRepository::new(pool)),
    });
    let app = build_app(state, CorsSettings::default_allowed());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("アドレスのパースに失敗しました: {}", config.host))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} にバインドできません"))?;

    tracing::info!("Server running on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
