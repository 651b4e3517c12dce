//! # ユースケース層
//!
//! Core Service のビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ロジックはユースケースに集約
//! - **現在時刻は引数**: 状態遷移は `now` を受け取り、テスタビリティを確保
//!
//! ## モジュール構成
//!
//! - `process`: 認証プロセス関連のユースケース（一覧・レアペルトゥーラ・削除）

pub(crate) mod helpers;

pub mod process;

pub use process::{DeletionInspection, ListProcessesInput, ProcessUseCaseImpl, ReaperturaOutcome};
