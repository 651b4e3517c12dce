//! # 認証プロセス一覧のフィルタと射影
//!
//! 一覧クエリのアドホックフィルタ、結合済み行の平坦表現、
//! ロール・言語に応じた読み取り専用ビューを定義する。
//!
//! ## 設計方針
//!
//! - **述語はドメインで一度だけ定義**: [`ProcessFilter::matches`] の意味と
//!   インフラ層の SQL 描画は常に一致させる。
//!   モック・テストはインメモリ評価、本番は WHERE 句描画で同じ結果になる
//! - **未指定センチネルはノーオプ**: `0` / `-1` / 空文字 / `None`
//!   は「条件なし」であり、除外条件ではない
//! - **`status_id` は導出専用**: 射影のたびに
//!   [`Stage::decode`] で保存テキストから導出し、冗長保存によるドリフトを防ぐ

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    company::CompanyId,
    error::DomainError,
    process::ProcessId,
    scope::ProcessScope,
    status::{Language, Stage},
    user::{UserContext, UserId},
};

/// 一覧クエリのアドホックフィルタ（すべて AND 結合の任意条件）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessFilter {
    /// 国 ID（> 0 の場合のみ有効）
    pub country_id:     Option<i32>,
    /// ステージ番号（`None` / `-1` はノーオプ。`"<番号> - "`
    /// の完全一致プレフィックスで照合し、名称部分の部分一致は使わない）
    pub stage:          Option<i16>,
    /// ティポロジア（業種分類）ID（> 0 の場合のみ有効、関連の所属で照合）
    pub typology_id:    Option<i32>,
    /// 会社名の部分一致（大文字小文字を区別しない。空文字はノーオプ）
    pub name:           Option<String>,
    /// 授与ディスティンティーボ ID（> 0 の場合のみ有効、
    /// *承認済み* の結果に対して照合）
    pub distinction_id: Option<i32>,
}

impl ProcessFilter {
    /// 条件なしのフィルタ
    pub fn none() -> Self {
        Self::default()
    }

    /// 国フィルタが有効か
    pub fn country_active(&self) -> Option<i32> {
        self.country_id.filter(|id| *id > 0)
    }

    /// ステージフィルタが有効な場合、照合用プレフィックスを返す
    pub fn stage_prefix(&self) -> Option<String> {
        self.stage
            .filter(|stage| *stage != -1)
            .map(|stage| format!("{stage} - "))
    }

    /// ティポロジアフィルタが有効か
    pub fn typology_active(&self) -> Option<i32> {
        self.typology_id.filter(|id| *id > 0)
    }

    /// 名前フィルタが有効な場合、小文字化した検索語を返す
    ///
    /// 検索語はリテラルな部分文字列として扱う。`%` や `_` も文字通りに
    /// 照合する（SQL 描画側は LIKE メタ文字をエスケープして合わせる）。
    pub fn name_active(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    /// ディスティンティーボフィルタが有効か
    pub fn distinction_active(&self) -> Option<i32> {
        self.distinction_id.filter(|id| *id > 0)
    }

    /// すべての条件が未指定センチネルか
    pub fn is_noop(&self) -> bool {
        self.country_active().is_none()
            && self.stage_prefix().is_none()
            && self.typology_active().is_none()
            && self.name_active().is_none()
            && self.distinction_active().is_none()
    }

    /// 平坦行に対してフィルタを評価する（インメモリ評価）
    ///
    /// SQL 描画（インフラ層）と同じ意味を持つこと。
    pub fn matches(&self, row: &ProcessListRow) -> bool {
        if let Some(country_id) = self.country_active() {
            if row.country_id != country_id {
                return false;
            }
        }
        if let Some(prefix) = self.stage_prefix() {
            if !row.status.starts_with(&prefix) {
                return false;
            }
        }
        if let Some(typology_id) = self.typology_active() {
            if !row.typologies.iter().any(|t| t.id == typology_id) {
                return false;
            }
        }
        if let Some(needle) = self.name_active() {
            if !row.company_name.to_lowercase().contains(&needle) {
                return false;
            }
        }
        if let Some(distinction_id) = self.distinction_active() {
            if !row.approved_distinction_ids.contains(&distinction_id) {
                return false;
            }
        }
        true
    }
}

/// 一覧クエリの合成結果（可視範囲 + アドホックフィルタ + 再認証フラグ）
///
/// すべての組み立てパスはこの一つの形に合流する。
/// インフラ層はこれを SQL へ描画し、モックはインメモリで評価する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessListQuery {
    pub scope:              ProcessScope,
    pub filter:             ProcessFilter,
    /// `false` = 初回認証、`true` = 再認証
    pub es_recertificacion: bool,
}

impl ProcessListQuery {
    /// スコープなしの基底クエリ（管理画面・内部集計用）
    pub fn base(es_recertificacion: bool) -> Self {
        Self {
            scope: ProcessScope::All,
            filter: ProcessFilter::none(),
            es_recertificacion,
        }
    }

    /// ロールスコープ付きクエリ（厳格パス）
    pub fn role_scoped(user: &UserContext, es_recertificacion: bool) -> Result<Self, DomainError> {
        Ok(Self {
            scope: ProcessScope::resolve(user)?,
            filter: ProcessFilter::none(),
            es_recertificacion,
        })
    }

    /// 統合一覧クエリ（フェイルセーフパス）
    ///
    /// スコープ解決に失敗したロールデータは空集合スコープに落ちる。
    pub fn unified(user: &UserContext, es_recertificacion: bool) -> Self {
        Self {
            scope: ProcessScope::resolve_unified(user),
            filter: ProcessFilter::none(),
            es_recertificacion,
        }
    }

    /// アドホックフィルタを適用する
    pub fn with_filter(mut self, filter: ProcessFilter) -> Self {
        self.filter = filter;
        self
    }

    /// 平坦行に対してクエリ全体を評価する（インメモリ評価）
    ///
    /// 再認証フラグ → スコープ → フィルタの順で、すべて AND 結合。
    pub fn matches(&self, row: &ProcessListRow) -> bool {
        row.es_recertificacion == self.es_recertificacion
            && self.scope.matches(
                row.advisor_id.as_ref(),
                row.auditor_id.as_ref(),
                &row.company_id,
                row.country_id,
            )
            && self.filter.matches(row)
    }
}

/// ティポロジア（業種分類）の二言語名称付き参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypologyRef {
    pub id:      i32,
    pub name_es: String,
    pub name_en: String,
}

impl TypologyRef {
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::Es => &self.name_es,
            Language::En => &self.name_en,
        }
    }
}

/// 結合済みの認証プロセス行（平坦表現）
///
/// クエリエンジンが会社・国・ティポロジア・担当者・最新結果を
/// 先読みした結果。フィルタ評価と射影の共通入力になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessListRow {
    pub process_id:      ProcessId,
    pub company_id:      CompanyId,
    pub company_name:    String,
    pub company_estado:  i16,
    pub es_homologacion: bool,
    pub country_id:      i32,
    pub country_name:    String,
    pub typologies:      Vec<TypologyRef>,
    pub advisor_id:      Option<UserId>,
    pub advisor_name:    Option<String>,
    pub auditor_id:      Option<UserId>,
    pub auditor_name:    Option<String>,
    pub expediente:      i64,
    pub status:          String,
    pub fecha_inicio:    Option<DateTime<Utc>>,
    pub fecha_finalizacion: Option<DateTime<Utc>>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub es_recertificacion: bool,
    /// 最後に紐づいた結果のディスティンティーボ
    pub latest_distinction_id: Option<i32>,
    /// 承認済み結果のディスティンティーボ（フィルタ照合用）
    pub approved_distinction_ids: Vec<i32>,
    /// 未完了かつ非テストの最初の質問票の監査レビュー日
    pub questionnaire_review_date: Option<DateTime<Utc>>,
}

/// ロール別一覧の読み取り専用射影
///
/// ティポロジア名は要求言語で解決し、`status_id` は保存テキストから導出する。
/// ティポロジア・結果・担当者が未設定のプロセスは null で射影される
/// （エラーにはならない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessView {
    pub process_id:      ProcessId,
    pub company_id:      CompanyId,
    pub company_name:    String,
    pub country_name:    String,
    pub es_homologacion: bool,
    pub typology_names:  Vec<String>,
    pub status:          String,
    /// 保存テキストから導出した数値ステージ
    pub status_id:       i16,
    pub expediente:      i64,
    pub fecha_inicio:    Option<DateTime<Utc>>,
    pub fecha_finalizacion: Option<DateTime<Utc>>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub es_recertificacion: bool,
    pub distinction_id:  Option<i32>,
    pub advisor_name:    Option<String>,
    pub auditor_name:    Option<String>,
    pub questionnaire_review_date: Option<DateTime<Utc>>,
}

impl ProcessView {
    /// 平坦行から要求言語のビューへ射影する
    ///
    /// ステータスが復号できない行はデータ破損としてエラーを返す
    /// （`status_id` を推測で埋めることはしない）。
    pub fn project(row: &ProcessListRow, language: Language) -> Result<Self, DomainError> {
        let status_id = Stage::decode(&row.status)?.number();
        Ok(Self {
            process_id: row.process_id,
            company_id: row.company_id,
            company_name: row.company_name.clone(),
            country_name: row.country_name.clone(),
            es_homologacion: row.es_homologacion,
            typology_names: row
                .typologies
                .iter()
                .map(|t| t.name(language).to_string())
                .collect(),
            status: row.status.clone(),
            status_id,
            expediente: row.expediente,
            fecha_inicio: row.fecha_inicio,
            fecha_finalizacion: row.fecha_finalizacion,
            fecha_vencimiento: row.fecha_vencimiento,
            es_recertificacion: row.es_recertificacion,
            distinction_id: row.latest_distinction_id,
            advisor_name: row.advisor_name.clone(),
            auditor_name: row.auditor_name.clone(),
            questionnaire_review_date: row.questionnaire_review_date,
        })
    }
}

/// フィルタ済み全件に対する集約カウント（ページとは独立）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCounts {
    /// 保留中（会社 estado がコンサル開始前）
    pub pending:    i64,
    /// 進行中
    pub in_process: i64,
    /// 完了
    pub completed:  i64,
}

impl ProcessCounts {
    /// 会社 estado の列から集計する（インメモリ評価）
    pub fn tally(estados: impl IntoIterator<Item = i16>) -> Self {
        let mut counts = Self::default();
        for estado in estados {
            if Stage::estado_is_pending(estado) {
                counts.pending += 1;
            } else if Stage::estado_is_in_process(estado) {
                counts.in_process += 1;
            } else if Stage::estado_is_completed(estado) {
                counts.completed += 1;
            }
        }
        counts
    }
}
