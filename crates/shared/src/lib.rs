//! # SelloTur 共有ユーティリティ
//!
//! プロジェクト全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（axum 依存はサービス側の責務）

pub mod api_response;
pub mod error_response;
pub mod observability;

pub use api_response::ApiResponse;
pub use error_response::ErrorResponse;
