//! # CompanyRepository
//!
//! 会社の永続化を担当するリポジトリ。
//!
//! ティポロジア所属（`company_typologies`）はここで先読みして
//! エンティティに畳み込む。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sellotur_domain::company::{Company, CompanyId};

use crate::{db::TxContext, error::InfraError};

/// 会社リポジトリトレイト
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// ID で会社を取得
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(company))`: 会社が見つかった場合
    /// - `Ok(None)`: 会社が見つからない場合
    /// - `Err(_)`: データベースエラー
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, InfraError>;

    /// 集約ステータス（estado）を保存する
    async fn save_estado(&self, tx: &mut TxContext, company: &Company)
    -> Result<(), InfraError>;
}

/// 会社行の永続形（ティポロジア所属は別クエリで先読み）
#[derive(sqlx::FromRow)]
struct CompanyRow {
    id:              Uuid,
    country_id:      i32,
    name:            String,
    estado:          i16,
    es_homologacion: bool,
    created_at:      DateTime<Utc>,
    updated_at:      DateTime<Utc>,
}

/// PostgreSQL 実装の CompanyRepository
#[derive(Debug, Clone)]
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, InfraError> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT id, country_id, name, estado, es_homologacion, created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let typology_ids: Vec<(i32,)> = sqlx::query_as(
            r#"
            SELECT typology_id FROM company_typologies
            WHERE company_id = $1
            ORDER BY typology_id
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(Company::from_db(
            CompanyId::from_uuid(row.id),
            row.country_id,
            row.name,
            row.estado,
            row.es_homologacion,
            typology_ids.into_iter().map(|(id,)| id).collect(),
            row.created_at,
            row.updated_at,
        )))
    }

    async fn save_estado(
        &self,
        tx: &mut TxContext,
        company: &Company,
    ) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            UPDATE companies
            SET estado = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(company.id().as_uuid())
        .bind(company.estado())
        .bind(company.updated_at())
        .execute(tx.conn())
        .await?;

        Ok(())
    }
}
