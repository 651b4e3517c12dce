//! # SelloTur ドメイン層
//!
//! ツーリズム品質認証（セロ・デ・カリダ）のビジネスロジック中核を定義する。
//!
//! ## 設計方針
//!
//! このクレートは DDD（ドメイン駆動設計）の原則に従い、以下を提供する:
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: CertificationProcess,
//!   Company）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: Stage,
//!   ProcessScope）
//! - **ドメインサービス**: エンティティに属さないビジネスロジック
//!   （ステータスコーデック、ロールスコープ解決）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、外部サービス）には一切依存しない。
//! これにより、ロールスコープやフィルタの述語はインメモリでも SQL でも
//! 同じ意味で評価できる。
//!
//! ## モジュール構成
//!
//! - [`status`] - 認証ステージと二言語テキストの相互変換（ステータスコーデック）
//! - [`scope`] - ロール別の可視範囲解決
//! - [`block`] - ブロックページネーション
//! - [`query`] - 認証プロセス一覧のフィルタ・射影
//! - [`process`] / [`company`] / [`questionnaire`] - 認証ワークフローのエンティティ
//! - [`cross_country`] - 国間監査委託リクエスト

#[macro_use]
mod macros;

pub mod block;
pub mod company;
pub mod cross_country;
pub mod error;
pub mod process;
pub mod query;
pub mod questionnaire;
pub mod scope;
pub mod status;
pub mod user;

pub use error::DomainError;
