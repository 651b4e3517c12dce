//! # QuestionnaireRepository
//!
//! 質問票の永続化を担当するリポジトリ。
//!
//! 「生きている」質問票 = 非テスト（`es_prueba = false`）の最新 1 件。
//! レアペルトゥーラはこの 1 件だけをリセットする。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sellotur_domain::{
    process::ProcessId,
    questionnaire::{Questionnaire, QuestionnaireId},
    user::UserId,
};

use crate::{db::TxContext, error::InfraError};

/// 質問票リポジトリトレイト
#[async_trait]
pub trait QuestionnaireRepository: Send + Sync {
    /// プロセスの「生きている」質問票を取得
    ///
    /// テスト用（自己評価）の質問票は対象外。
    async fn find_live_by_process(
        &self,
        process_id: &ProcessId,
    ) -> Result<Option<Questionnaire>, InfraError>;

    /// レアペルトゥーラに伴うリセット後の状態を保存する
    ///
    /// 結果コード・完了日・監査レビュー日・担当技術者のみを書き換える。
    async fn save_reapertura_reset(
        &self,
        tx: &mut TxContext,
        questionnaire: &Questionnaire,
    ) -> Result<(), InfraError>;
}

/// 質問票行の永続形
#[derive(sqlx::FromRow)]
struct QuestionnaireRow {
    id:                    Uuid,
    process_id:            Uuid,
    resultado:             i32,
    fecha_finalizado:      Option<DateTime<Utc>>,
    fecha_revision_auditor: Option<DateTime<Utc>>,
    technician_id:         Option<Uuid>,
    es_prueba:             bool,
}

impl From<QuestionnaireRow> for Questionnaire {
    fn from(row: QuestionnaireRow) -> Self {
        Questionnaire::from_db(
            QuestionnaireId::from_uuid(row.id),
            ProcessId::from_uuid(row.process_id),
            row.resultado,
            row.fecha_finalizado,
            row.fecha_revision_auditor,
            row.technician_id.map(UserId::from_uuid),
            row.es_prueba,
        )
    }
}

/// PostgreSQL 実装の QuestionnaireRepository
#[derive(Debug, Clone)]
pub struct PostgresQuestionnaireRepository {
    pool: PgPool,
}

impl PostgresQuestionnaireRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionnaireRepository for PostgresQuestionnaireRepository {
    async fn find_live_by_process(
        &self,
        process_id: &ProcessId,
    ) -> Result<Option<Questionnaire>, InfraError> {
        let row = sqlx::query_as::<_, QuestionnaireRow>(
            r#"
            SELECT id, process_id, resultado, fecha_finalizado,
                   fecha_revision_auditor, technician_id, es_prueba
            FROM questionnaires
            WHERE process_id = $1 AND es_prueba = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(process_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Questionnaire::from))
    }

    async fn save_reapertura_reset(
        &self,
        tx: &mut TxContext,
        questionnaire: &Questionnaire,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE questionnaires
            SET resultado = $2,
                fecha_finalizado = $3,
                fecha_revision_auditor = $4,
                technician_id = $5
            WHERE id = $1
            "#,
        )
        .bind(questionnaire.id().as_uuid())
        .bind(questionnaire.resultado())
        .bind(questionnaire.fecha_finalizado())
        .bind(questionnaire.fecha_revision_auditor())
        .bind(questionnaire.technician_id().map(|id| *id.as_uuid()))
        .execute(tx.conn())
        .await?;

        Ok(())
    }
}
