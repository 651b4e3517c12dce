//! # Core Service ライブラリ
//!
//! Core Service のユースケースとハンドラを公開する。
//! テストやバイナリから内部モジュールへのアクセスを提供する。

pub mod config;
pub mod error;
pub mod handler;
pub mod usecase;
