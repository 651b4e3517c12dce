//! # 質問票（クエスティオナリオ）
//!
//! 認証プロセスに紐づく質問票エンティティ。
//! プロセスごとに複数保持できるが、ビジネスルール上
//! 「生きている」質問票は常に高々 1 件とする。

use chrono::{DateTime, Utc};

use crate::{process::ProcessId, user::UserId};

define_uuid_id! {
    /// 質問票 ID
    pub struct QuestionnaireId;
}

define_uuid_id! {
    /// 質問票項目 ID
    pub struct QuestionnaireItemId;
}

/// 質問票エンティティ
///
/// `resultado` は結果コード（0 = 未確定）。完了・監査レビューの
/// タイムスタンプと担当技術者はレアペルトゥーラでクリアされる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Questionnaire {
    id:                    QuestionnaireId,
    process_id:            ProcessId,
    resultado:             i32,
    fecha_finalizado:      Option<DateTime<Utc>>,
    fecha_revision_auditor: Option<DateTime<Utc>>,
    /// 割り当てられた国の技術担当者
    technician_id:         Option<UserId>,
    /// テスト用（自己評価）の質問票か
    es_prueba:             bool,
}

impl Questionnaire {
    /// 既存のデータから質問票を復元する（データベースから取得時）
    pub fn from_db(
        id: QuestionnaireId,
        process_id: ProcessId,
        resultado: i32,
        fecha_finalizado: Option<DateTime<Utc>>,
        fecha_revision_auditor: Option<DateTime<Utc>>,
        technician_id: Option<UserId>,
        es_prueba: bool,
    ) -> Self {
        Self {
            id,
            process_id,
            resultado,
            fecha_finalizado,
            fecha_revision_auditor,
            technician_id,
            es_prueba,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &QuestionnaireId {
        &self.id
    }

    pub fn process_id(&self) -> &ProcessId {
        &self.process_id
    }

    pub fn resultado(&self) -> i32 {
        self.resultado
    }

    pub fn fecha_finalizado(&self) -> Option<DateTime<Utc>> {
        self.fecha_finalizado
    }

    pub fn fecha_revision_auditor(&self) -> Option<DateTime<Utc>> {
        self.fecha_revision_auditor
    }

    pub fn technician_id(&self) -> Option<&UserId> {
        self.technician_id.as_ref()
    }

    pub fn es_prueba(&self) -> bool {
        self.es_prueba
    }

    /// レアペルトゥーラに伴うリセットを適用した状態を返す
    ///
    /// 結果コードを 0 に戻し、完了日・監査レビュー日・担当技術者をクリアする。
    pub fn reset_for_reapertura(self) -> Self {
        Self {
            resultado: 0,
            fecha_finalizado: None,
            fecha_revision_auditor: None,
            technician_id: None,
            ..self
        }
    }
}
