//! # Core Service サーバー
//!
//! 認証プロセスのライフサイクルと一覧クエリを実行する内部サービス。
//!
//! ## 役割
//!
//! - **ビジネスロジック**: 一覧スコープ解決、レアペルトゥーラ、カスケード削除
//! - **データ永続化**: PostgreSQL へのエンティティ保存
//!
//! ## アクセス制御
//!
//! Core Service は内部ネットワークからのみアクセス可能とする。
//! 外部からのリクエストはフロントサービスを経由する必要がある。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CORE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CORE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! CORE_PORT=3001 DATABASE_URL=postgres://... cargo run -p sellotur-core-service
//! ```

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post},
};
use sellotur_core_service::{
    config::CoreConfig,
    handler::{
        ProcessState, delete_process, execute_reapertura, health_check, inspect_deletion,
        list_processes, list_processes_by_role,
    },
    usecase::ProcessUseCaseImpl,
};
use sellotur_infra::{
    db::{self, PgTransactionManager},
    deletion::PostgresProcessCascade,
    process_query::PostgresProcessQueries,
    repository::{
        PostgresCompanyRepository, PostgresProcessRepository, PostgresQuestionnaireRepository,
    },
};
use sellotur_shared::observability::{LogFormat, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Core Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    init_tracing(LogFormat::from_env());

    // 設定読み込み
    let config = CoreConfig::from_env()?;

    tracing::info!(
        "Core Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成し、マイグレーションを適用
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("データベースに接続しました");

    // 依存コンポーネントを初期化
    let process_repo = Arc::new(PostgresProcessRepository::new(pool.clone()));
    let company_repo = Arc::new(PostgresCompanyRepository::new(pool.clone()));
    let questionnaire_repo = Arc::new(PostgresQuestionnaireRepository::new(pool.clone()));
    let queries = Arc::new(PostgresProcessQueries::new(pool.clone()));
    let cascade = Arc::new(PostgresProcessCascade::new(pool.clone()));
    let tx_manager = Arc::new(PgTransactionManager::new(pool.clone()));

    let usecase = ProcessUseCaseImpl::new(
        process_repo,
        company_repo,
        questionnaire_repo,
        queries,
        cascade,
        tx_manager,
    );
    let process_state = Arc::new(ProcessState { usecase });

    // ルーター構築
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/internal/processes", get(list_processes))
        .route("/internal/processes/by-role", get(list_processes_by_role))
        .route(
            "/internal/processes/{process_id}/reapertura",
            post(execute_reapertura),
        )
        .route(
            "/internal/processes/{process_id}/deletion-check",
            get(inspect_deletion),
        )
        .route("/internal/processes/{process_id}", delete(delete_process))
        .with_state(process_state)
        .layer(TraceLayer::new_for_http());

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("リッスン開始: {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
