//! # 認証プロセス一覧クエリエンジン
//!
//! [`ProcessListQuery`]（スコープ + フィルタ + 再認証フラグ）を
//! SQL へ描画し、ブロックページと集約カウントを取得する。
//!
//! ## 設計方針
//!
//! - **述語描画は一箇所**: ページクエリとカウントクエリは同じ
//!   [`push_predicates`] で WHERE 句を組み立てる。両者の対象集合は常に一致する
//! - **カウントはフィルタ済み全件**: ページの LIMIT/OFFSET に影響されない
//! - **決定的な順序**: `ORDER BY p.id ASC`（UUID v7 は時系列順）で
//!   ブロック間の重複・欠落を防ぐ
//! - **N+1 回避**: ティポロジアと承認済みディスティンティーボは
//!   ページ内の ID をまとめて 1 クエリで先読みする

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itertools::Itertools as _;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use sellotur_domain::{
    block::{BlockParams, BlockResult},
    company::CompanyId,
    process::ProcessId,
    query::{ProcessCounts, ProcessListQuery, ProcessListRow, ProcessView, TypologyRef},
    scope::ProcessScope,
    status::Language,
    user::UserId,
};

use crate::error::InfraError;

/// 一覧クエリの結果（ページ + フィルタ済み全件の集約カウント)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessPage {
    pub block:  BlockResult<ProcessView>,
    pub counts: ProcessCounts,
}

/// 認証プロセス一覧クエリトレイト
#[async_trait]
pub trait ProcessQueries: Send + Sync {
    /// クエリに一致するプロセスの 1 ブロックと集約カウントを取得する
    ///
    /// カウントはページではなくフィルタ済み全件に対して集計される。
    async fn fetch_block(
        &self,
        query: &ProcessListQuery,
        language: Language,
        params: BlockParams,
    ) -> Result<ProcessPage, InfraError>;
}

/// ページクエリの行（結合済み・ティポロジアは別クエリで合流）
#[derive(sqlx::FromRow)]
struct PageRow {
    id:                 Uuid,
    company_id:         Uuid,
    company_name:       String,
    company_estado:     i16,
    es_homologacion:    bool,
    country_id:         i32,
    country_name:       String,
    advisor_id:         Option<Uuid>,
    advisor_name:       Option<String>,
    auditor_id:         Option<Uuid>,
    auditor_name:       Option<String>,
    expediente:         i64,
    status:             String,
    fecha_inicio:       Option<DateTime<Utc>>,
    fecha_finalizacion: Option<DateTime<Utc>>,
    fecha_vencimiento:  Option<DateTime<Utc>>,
    es_recertificacion: bool,
    latest_distinction_id: Option<i32>,
    questionnaire_review_date: Option<DateTime<Utc>>,
}

/// ILIKE パターン内でメタ文字をリテラルとして扱うためのエスケープ
///
/// 名称フィルタの意味はリテラルな部分文字列一致
/// （[`sellotur_domain::query::ProcessFilter`] の `matches` と同じ）。
/// `%` や `_` を含む入力がワイルドカードとして振る舞ってはならない。
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// スコープ・フィルタ・再認証フラグを WHERE 句へ描画する
///
/// 意味は [`ProcessListQuery::matches`]（インメモリ評価）と
/// 一致させること。どちらかを変える場合は両方を直す。
fn push_predicates(builder: &mut QueryBuilder<'static, Postgres>, query: &ProcessListQuery) {
    builder
        .push(" AND p.es_recertificacion = ")
        .push_bind(query.es_recertificacion);

    match &query.scope {
        ProcessScope::All => {}
        ProcessScope::AdvisedBy(user) => {
            builder.push(" AND p.advisor_id = ").push_bind(*user.as_uuid());
        }
        ProcessScope::AuditedBy(user) => {
            builder.push(" AND p.auditor_id = ").push_bind(*user.as_uuid());
        }
        ProcessScope::InCountry(country_id) => {
            builder.push(" AND c.country_id = ").push_bind(*country_id);
        }
        ProcessScope::OfCompany(company) => {
            builder
                .push(" AND p.company_id = ")
                .push_bind(*company.as_uuid());
        }
        ProcessScope::Nothing => {
            builder.push(" AND FALSE");
        }
    }

    let filter = &query.filter;
    if let Some(country_id) = filter.country_active() {
        builder.push(" AND c.country_id = ").push_bind(country_id);
    }
    if let Some(prefix) = filter.stage_prefix() {
        // プレフィックスは "<番号> - " 形式のため LIKE メタ文字を含まない
        builder
            .push(" AND p.status LIKE ")
            .push_bind(format!("{prefix}%"));
    }
    if let Some(typology_id) = filter.typology_active() {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM company_typologies ct \
                 WHERE ct.company_id = p.company_id AND ct.typology_id = ",
            )
            .push_bind(typology_id)
            .push(")");
    }
    if let Some(needle) = filter.name_active() {
        builder
            .push(" AND c.name ILIKE ")
            .push_bind(format!("%{}%", escape_like(&needle)));
    }
    if let Some(distinction_id) = filter.distinction_active() {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM process_results r \
                 WHERE r.process_id = p.id AND r.aprobado AND r.distinction_id = ",
            )
            .push_bind(distinction_id)
            .push(")");
    }
}

/// PostgreSQL 実装の ProcessQueries
#[derive(Debug, Clone)]
pub struct PostgresProcessQueries {
    pool: PgPool,
}

impl PostgresProcessQueries {
    /// 新しいクエリエンジンを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// フィルタ済み全件に対する総件数と estado バケット別カウントを取得する
    async fn fetch_counts(&self, query: &ProcessListQuery) -> Result<(i64, ProcessCounts), InfraError> {
        let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE c.estado <= 1) AS pending,
                   COUNT(*) FILTER (WHERE c.estado BETWEEN 2 AND 7) AS in_process,
                   COUNT(*) FILTER (WHERE c.estado = 8) AS completed
            FROM certification_processes p
            JOIN companies c ON c.id = p.company_id
            WHERE TRUE
            "#,
        );
        push_predicates(&mut builder, query);

        let (total, pending, in_process, completed): (i64, i64, i64, i64) = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        Ok((
            total,
            ProcessCounts {
                pending,
                in_process,
                completed,
            },
        ))
    }

    /// ページ本体（結合済み行）を取得する
    async fn fetch_page_rows(
        &self,
        query: &ProcessListQuery,
        params: BlockParams,
    ) -> Result<Vec<PageRow>, InfraError> {
        let mut builder: QueryBuilder<'static, Postgres> = QueryBuilder::new(
            r#"
            SELECT p.id,
                   p.company_id,
                   c.name AS company_name,
                   c.estado AS company_estado,
                   c.es_homologacion,
                   c.country_id,
                   co.name AS country_name,
                   p.advisor_id,
                   adv.full_name AS advisor_name,
                   p.auditor_id,
                   aud.full_name AS auditor_name,
                   p.expediente,
                   p.status,
                   p.fecha_inicio,
                   p.fecha_finalizacion,
                   p.fecha_vencimiento,
                   p.es_recertificacion,
                   (SELECT r.distinction_id FROM process_results r
                    WHERE r.process_id = p.id
                    ORDER BY r.created_at DESC LIMIT 1) AS latest_distinction_id,
                   (SELECT q.fecha_revision_auditor FROM questionnaires q
                    WHERE q.process_id = p.id
                      AND q.fecha_finalizado IS NULL
                      AND q.es_prueba = FALSE
                    ORDER BY q.created_at LIMIT 1) AS questionnaire_review_date
            FROM certification_processes p
            JOIN companies c ON c.id = p.company_id
            JOIN countries co ON co.id = c.country_id
            LEFT JOIN users adv ON adv.id = p.advisor_id
            LEFT JOIN users aud ON aud.id = p.auditor_id
            WHERE TRUE
            "#,
        );
        push_predicates(&mut builder, query);
        builder
            .push(" ORDER BY p.id ASC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        Ok(builder.build_query_as().fetch_all(&self.pool).await?)
    }

    /// ページ内の会社のティポロジアをまとめて先読みする
    async fn fetch_typologies(
        &self,
        company_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<TypologyRef>>, InfraError> {
        let rows: Vec<(Uuid, i32, String, String)> = sqlx::query_as(
            r#"
            SELECT ct.company_id, t.id, t.name_es, t.name_en
            FROM company_typologies ct
            JOIN typologies t ON t.id = ct.typology_id
            WHERE ct.company_id = ANY($1)
            ORDER BY t.id
            "#,
        )
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(company_id, id, name_es, name_en)| {
                (company_id, TypologyRef { id, name_es, name_en })
            })
            .into_group_map())
    }

    /// ページ内のプロセスの承認済みディスティンティーボをまとめて先読みする
    async fn fetch_approved_distinctions(
        &self,
        process_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<i32>>, InfraError> {
        let rows: Vec<(Uuid, i32)> = sqlx::query_as(
            r#"
            SELECT r.process_id, r.distinction_id
            FROM process_results r
            WHERE r.process_id = ANY($1)
              AND r.aprobado
              AND r.distinction_id IS NOT NULL
            "#,
        )
        .bind(process_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().into_group_map())
    }
}


#[async_trait]
impl ProcessQueries for PostgresProcessQueries {
    async fn fetch_block(
        &self,
        query: &ProcessListQuery,
        language: Language,
        params: BlockParams,
    ) -> Result<ProcessPage, InfraError> {
        let (total_count, counts) = self.fetch_counts(query).await?;
        let rows = self.fetch_page_rows(query, params).await?;

        let process_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let company_ids: Vec<Uuid> = rows.iter().map(|row| row.company_id).unique().collect();

        let (typologies, mut approved) = if rows.is_empty() {
            (HashMap::new(), HashMap::new())
        } else {
            (
                self.fetch_typologies(&company_ids).await?,
                self.fetch_approved_distinctions(&process_ids).await?,
            )
        };

        let views = rows
            .into_iter()
            .map(|row| {
                let list_row = ProcessListRow {
                    process_id: ProcessId::from_uuid(row.id),
                    company_id: CompanyId::from_uuid(row.company_id),
                    company_name: row.company_name,
                    company_estado: row.company_estado,
                    es_homologacion: row.es_homologacion,
                    country_id: row.country_id,
                    country_name: row.country_name,
                    // 同じ会社のプロセスが複数並ぶことがあるためクローンして合流する
                    typologies: typologies.get(&row.company_id).cloned().unwrap_or_default(),
                    advisor_id: row.advisor_id.map(UserId::from_uuid),
                    advisor_name: row.advisor_name,
                    auditor_id: row.auditor_id.map(UserId::from_uuid),
                    auditor_name: row.auditor_name,
                    expediente: row.expediente,
                    status: row.status,
                    fecha_inicio: row.fecha_inicio,
                    fecha_finalizacion: row.fecha_finalizacion,
                    fecha_vencimiento: row.fecha_vencimiento,
                    es_recertificacion: row.es_recertificacion,
                    latest_distinction_id: row.latest_distinction_id,
                    approved_distinction_ids: approved.remove(&row.id).unwrap_or_default(),
                    questionnaire_review_date: row.questionnaire_review_date,
                };
                ProcessView::project(&list_row, language)
                    .map_err(|error| InfraError::unexpected(error.to_string()))
            })
            .collect::<Result<Vec<_>, InfraError>>()?;

        Ok(ProcessPage {
            block: BlockResult::new(views, total_count, params),
            counts,
        })
    }
}
