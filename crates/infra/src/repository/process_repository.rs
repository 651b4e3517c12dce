//! # ProcessRepository
//!
//! 認証プロセスの永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **読み取りはプール、書き込みは TxContext**: 状態遷移の書き込みは
//!   必ずトランザクション内で行う（構造的強制）
//! - **エンティティ経由の更新**: 更新メソッドはカラム値ではなく
//!   遷移適用済みのエンティティを受け取り、永続形へ写す

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use chrono::{DateTime, Utc};
use sellotur_domain::{
    company::CompanyId,
    process::{CertificationProcess, ProcessId},
    user::UserId,
};

use crate::{db::TxContext, error::InfraError};

/// 認証プロセスリポジトリトレイト
#[async_trait]
pub trait ProcessRepository: Send + Sync {
    /// ID でプロセスを取得
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(process))`: プロセスが見つかった場合
    /// - `Ok(None)`: プロセスが見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: &ProcessId) -> Result<Option<CertificationProcess>, InfraError>;

    /// レアペルトゥーラ適用後の状態を保存する
    ///
    /// ステータステキストと終了日のみを書き換える。
    async fn save_reapertura(
        &self,
        tx: &mut TxContext,
        process: &CertificationProcess,
    ) -> Result<(), InfraError>;
}

/// プロセス行の永続形
#[derive(sqlx::FromRow)]
struct ProcessRow {
    id:                 Uuid,
    company_id:         Uuid,
    advisor_id:         Option<Uuid>,
    auditor_id:         Option<Uuid>,
    expediente:         i64,
    status:             String,
    fecha_inicio:       Option<DateTime<Utc>>,
    fecha_finalizacion: Option<DateTime<Utc>>,
    fecha_solicitud_auditoria: Option<DateTime<Utc>>,
    fecha_auditoria_programada: Option<DateTime<Utc>>,
    fecha_vencimiento:  Option<DateTime<Utc>>,
    es_recertificacion: bool,
}

impl From<ProcessRow> for CertificationProcess {
    fn from(row: ProcessRow) -> Self {
        CertificationProcess::from_db(
            ProcessId::from_uuid(row.id),
            CompanyId::from_uuid(row.company_id),
            row.advisor_id.map(UserId::from_uuid),
            row.auditor_id.map(UserId::from_uuid),
            row.expediente,
            row.status,
            row.fecha_inicio,
            row.fecha_finalizacion,
            row.fecha_solicitud_auditoria,
            row.fecha_auditoria_programada,
            row.fecha_vencimiento,
            row.es_recertificacion,
        )
    }
}

/// PostgreSQL 実装の ProcessRepository
#[derive(Debug, Clone)]
pub struct PostgresProcessRepository {
    pool: PgPool,
}

impl PostgresProcessRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessRepository for PostgresProcessRepository {
    async fn find_by_id(&self, id: &ProcessId) -> Result<Option<CertificationProcess>, InfraError> {
        let row = sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT id, company_id, advisor_id, auditor_id, expediente, status,
                   fecha_inicio, fecha_finalizacion, fecha_solicitud_auditoria,
                   fecha_auditoria_programada, fecha_vencimiento, es_recertificacion
            FROM certification_processes
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CertificationProcess::from))
    }

    async fn save_reapertura(
        &self,
        tx: &mut TxContext,
        process: &CertificationProcess,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE certification_processes
            SET status = $2, fecha_finalizacion = $3
            WHERE id = $1
            "#,
        )
        .bind(process.id().as_uuid())
        .bind(process.status())
        .bind(process.fecha_finalizacion())
        .execute(tx.conn())
        .await?;

        Ok(())
    }
}
