//! # SelloTur インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とトランザクション管理
//! - **リポジトリ実装**: ドメイン層のエンティティ永続化
//! - **一覧クエリエンジン**: ロールスコープ付き一覧の SQL 描画とページング
//! - **カスケード削除**: プロセス削除時の依存データ削除
//!
//! ## 依存関係
//!
//! ```text
//! core-service → infra → domain → shared
//! ```
//!
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続管理・トランザクション・リトライ
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - [`process_query`] - 一覧クエリエンジン
//! - [`deletion`] - カスケード削除基盤
//! - [`mock`] - テスト用インメモリモック（`test-utils` feature）

pub mod db;
pub mod deletion;
pub mod error;
pub mod process_query;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::InfraError;
