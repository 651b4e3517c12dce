//! # 会社（認証対象企業）
//!
//! 認証プロセスの所有者となる会社エンティティ。
//!
//! ## 集約ステータス（estado）
//!
//! 会社はプロセスのステータステキストとは独立に、数値の集約ステータス
//! `estado`（0〜8 スケール、[`crate::status::Stage`] と同じ目盛り）を持つ。
//! 両者の整合はレアペルトゥーラなどの状態遷移操作側が責任を持つ。

use chrono::{DateTime, Utc};

use crate::status::Stage;

define_uuid_id! {
    /// 会社 ID
    pub struct CompanyId;
}

/// 会社エンティティ
///
/// # 不変条件
///
/// - 認証プロセスを削除しても会社は削除されない
/// - `estado` は 0〜8 の範囲（レガシーデータは範囲外があり得るため i16 で保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    id:              CompanyId,
    country_id:      i32,
    name:            String,
    estado:          i16,
    es_homologacion: bool,
    typology_ids:    Vec<i32>,
    created_at:      DateTime<Utc>,
    updated_at:      DateTime<Utc>,
}

impl Company {
    /// 既存のデータから会社を復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: CompanyId,
        country_id: i32,
        name: String,
        estado: i16,
        es_homologacion: bool,
        typology_ids: Vec<i32>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            country_id,
            name,
            estado,
            es_homologacion,
            typology_ids,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &CompanyId {
        &self.id
    }

    pub fn country_id(&self) -> i32 {
        self.country_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn estado(&self) -> i16 {
        self.estado
    }

    /// ホモロガシオン（別トラック認証）対象の会社か
    ///
    /// ホモロガシオンの会社は一部のステータスフィルタを迂回する。
    pub fn es_homologacion(&self) -> bool {
        self.es_homologacion
    }

    pub fn typology_ids(&self) -> &[i32] {
        &self.typology_ids
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // 不変更新メソッド

    /// 集約ステータスを更新する
    pub fn with_estado(self, stage: Stage, now: DateTime<Utc>) -> Self {
        Self {
            estado: stage.number(),
            updated_at: now,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn company(estado: i16) -> Company {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        Company::from_db(
            CompanyId::new(),
            10,
            "Hotel Mirador".to_string(),
            estado,
            false,
            vec![1, 3],
            now,
            now,
        )
    }

    #[test]
    fn test_with_estadoはステージ番号とupdated_atのみを書き換える() {
        let original = company(7);
        let later = DateTime::from_timestamp(1_700_100_000, 0).unwrap();

        let updated = original.clone().with_estado(Stage::AuditingInProcess, later);

        assert_eq!(updated.estado(), 5);
        assert_eq!(updated.updated_at(), later);
        assert_eq!(updated.id(), original.id());
        assert_eq!(updated.typology_ids(), original.typology_ids());
    }
}
