//! # リポジトリ実装
//!
//! ドメインエンティティの永続化トレイトと PostgreSQL 実装を提供する。
//!
//! ## 設計方針
//!
//! - **依存性逆転**: ユースケース層はトレイトにのみ依存する
//! - **書き込みは TxContext 必須**: 状態遷移の書き込みは
//!   トランザクションコンテキストを引数に取る（構造的強制）
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod company_repository;
pub mod process_repository;
pub mod questionnaire_repository;

pub use company_repository::{CompanyRepository, PostgresCompanyRepository};
pub use process_repository::{PostgresProcessRepository, ProcessRepository};
pub use questionnaire_repository::{PostgresQuestionnaireRepository, QuestionnaireRepository};
