//! # PostgresProcessCascade
//!
//! 認証プロセスのカスケード削除 PostgreSQL 実装。
//! [`CASCADE_ORDER`] に従い、単一トランザクション内で
//! 子テーブルから順に DELETE する。
//!
//! ## FK 制約
//!
//! スキーマに `ON DELETE CASCADE` は無い。削除順を誤ると
//! FK 違反でトランザクション全体がロールバックされる（データは残る）。

use async_trait::async_trait;
use sellotur_domain::process::ProcessId;
use sqlx::PgPool;

use super::{CASCADE_ORDER, DeletionOutcome, DeletionStep, DependencyCounts, ProcessCascadeRepository};
use crate::error::InfraError;

/// ステップごとの DELETE 文（`$1` = プロセス ID）
fn delete_statement(step: DeletionStep) -> &'static str {
    match step {
        DeletionStep::ItemObservations => {
            r#"
            DELETE FROM item_observations
            WHERE item_id IN (
                SELECT i.id FROM questionnaire_items i
                JOIN questionnaires q ON q.id = i.questionnaire_id
                WHERE q.process_id = $1
            )
            "#
        }
        DeletionStep::ItemHistory => {
            r#"
            DELETE FROM item_history
            WHERE item_id IN (
                SELECT i.id FROM questionnaire_items i
                JOIN questionnaires q ON q.id = i.questionnaire_id
                WHERE q.process_id = $1
            )
            "#
        }
        DeletionStep::QuestionnaireItems => {
            r#"
            DELETE FROM questionnaire_items
            WHERE questionnaire_id IN (
                SELECT id FROM questionnaires WHERE process_id = $1
            )
            "#
        }
        DeletionStep::Questionnaires => "DELETE FROM questionnaires WHERE process_id = $1",
        DeletionStep::Results => "DELETE FROM process_results WHERE process_id = $1",
        DeletionStep::Files => "DELETE FROM process_files WHERE process_id = $1",
        DeletionStep::Homologations => "DELETE FROM homologations WHERE process_id = $1",
        DeletionStep::Process => "DELETE FROM certification_processes WHERE id = $1",
    }
}

/// PostgreSQL プロセスカスケード削除
pub struct PostgresProcessCascade {
    pool: PgPool,
}

impl PostgresProcessCascade {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessCascadeRepository for PostgresProcessCascade {
    async fn count_dependents(
        &self,
        process_id: &ProcessId,
    ) -> Result<DependencyCounts, InfraError> {
        let (questionnaires, results, files, homologations): (i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM questionnaires WHERE process_id = $1),
                    (SELECT COUNT(*) FROM process_results WHERE process_id = $1),
                    (SELECT COUNT(*) FROM process_files WHERE process_id = $1),
                    (SELECT COUNT(*) FROM homologations WHERE process_id = $1)
                "#,
            )
            .bind(process_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(DependencyCounts {
            questionnaires,
            results,
            files,
            homologations,
        })
    }

    async fn delete_cascade(&self, process_id: &ProcessId) -> Result<DeletionOutcome, InfraError> {
        let mut tx = self.pool.begin().await?;
        let mut outcome = DeletionOutcome::default();

        // 各 DELETE は実行時点で確定する。順序は CASCADE_ORDER が保証する
        for step in CASCADE_ORDER {
            let result = sqlx::query(delete_statement(step))
                .bind(process_id.as_uuid())
                .execute(&mut *tx)
                .await?;

            outcome.deleted_by_step.push((step, result.rows_affected()));
        }

        tx.commit().await?;

        tracing::info!(
            %process_id,
            total_deleted = outcome.total_deleted(),
            "認証プロセスをカスケード削除しました"
        );

        Ok(outcome)
    }
}
