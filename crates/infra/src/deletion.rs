//! # 認証プロセスのカスケード削除基盤
//!
//! プロセス削除時に依存データを FK 制約に従って安全に削除するための基盤。
//!
//! ## 概要
//!
//! スキーマは `ON DELETE CASCADE` を持たない（誤操作による連鎖削除を防ぐ）。
//! そのため削除は子テーブルから順にアプリケーション側で実行する。
//! 削除順は [`CASCADE_ORDER`] に固定し、テストで FK 依存順を保証する。

mod postgres;

use async_trait::async_trait;
pub use postgres::PostgresProcessCascade;
use sellotur_domain::process::ProcessId;

use crate::error::InfraError;

/// カスケード削除の 1 ステップ（削除対象カテゴリ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum DeletionStep {
    /// 質問票項目の観察記録
    #[display("item_observations")]
    ItemObservations,
    /// 質問票項目の変更履歴
    #[display("item_history")]
    ItemHistory,
    /// 質問票項目
    #[display("questionnaire_items")]
    QuestionnaireItems,
    /// 質問票
    #[display("questionnaires")]
    Questionnaires,
    /// 認証結果
    #[display("process_results")]
    Results,
    /// 添付ファイル
    #[display("process_files")]
    Files,
    /// ホモロガシオン記録
    #[display("homologations")]
    Homologations,
    /// プロセス本体（最後）
    #[display("certification_processes")]
    Process,
}

/// FK 依存順の削除順序
///
/// 子テーブル（最深部）から親へ向かう。プロセス本体は必ず最後。
/// この順序を変える場合はスキーマの FK 定義と併せて見直すこと。
pub const CASCADE_ORDER: [DeletionStep; 8] = [
    DeletionStep::ItemObservations,
    DeletionStep::ItemHistory,
    DeletionStep::QuestionnaireItems,
    DeletionStep::Questionnaires,
    DeletionStep::Results,
    DeletionStep::Files,
    DeletionStep::Homologations,
    DeletionStep::Process,
];

/// プロセスに依存するデータの件数
///
/// 削除前の確認画面に表示するための集計。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyCounts {
    pub questionnaires: i64,
    pub results:        i64,
    pub files:          i64,
    pub homologations:  i64,
}

impl DependencyCounts {
    /// 依存データの説明行を生成する（0 件のカテゴリは出さない）
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.questionnaires > 0 {
            lines.push(format!("{} questionnaire(s)", self.questionnaires));
        }
        if self.results > 0 {
            lines.push(format!("{} result(s)", self.results));
        }
        if self.files > 0 {
            lines.push(format!("{} file(s)", self.files));
        }
        if self.homologations > 0 {
            lines.push(format!("{} homologation(s)", self.homologations));
        }
        lines
    }

    /// 依存データが 1 件も無いか
    pub fn is_empty(&self) -> bool {
        self.describe().is_empty()
    }
}

/// カスケード削除の実行結果
#[derive(Debug, Clone, Default)]
pub struct DeletionOutcome {
    /// ステップごとの削除件数（[`CASCADE_ORDER`] の順）
    pub deleted_by_step: Vec<(DeletionStep, u64)>,
}

impl DeletionOutcome {
    /// 全ステップの削除件数合計
    pub fn total_deleted(&self) -> u64 {
        self.deleted_by_step.iter().map(|(_, count)| count).sum()
    }
}

/// プロセスカスケード削除トレイト
///
/// 削除は all-or-nothing: 途中で失敗した場合は何も消えない。
#[async_trait]
pub trait ProcessCascadeRepository: Send + Sync {
    /// プロセスに依存するデータの件数を集計する
    async fn count_dependents(&self, process_id: &ProcessId)
    -> Result<DependencyCounts, InfraError>;

    /// プロセスと依存データを FK 依存順に削除する
    ///
    /// 単一トランザクションで実行し、失敗時は全体をロールバックする。
    async fn delete_cascade(&self, process_id: &ProcessId)
    -> Result<DeletionOutcome, InfraError>;
}
