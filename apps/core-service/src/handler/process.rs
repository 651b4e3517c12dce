//! # 認証プロセス API ハンドラ
//!
//! Core Service の認証プロセス関連エンドポイントを実装する。
//!
//! ## エンドポイント
//!
//! | メソッド | パス | 説明 |
//! |----------|------|------|
//! | GET | `/internal/processes` | 統合一覧（フェイルセーフ） |
//! | GET | `/internal/processes/by-role` | ロールスコープ付き一覧（厳格） |
//! | POST | `/internal/processes/{process_id}/reapertura` | レアペルトゥーラ |
//! | GET | `/internal/processes/{process_id}/deletion-check` | 削除前インスペクション |
//! | DELETE | `/internal/processes/{process_id}` | カスケード削除 |

use std::{str::FromStr as _, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use sellotur_domain::{
    block::BlockParams,
    company::CompanyId,
    process::ProcessId,
    query::{ProcessCounts, ProcessFilter, ProcessView},
    status::Language,
    user::{Role, UserContext, UserId},
};
use sellotur_infra::process_query::ProcessPage;
use sellotur_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::CoreError,
    usecase::{ListProcessesInput, ProcessUseCaseImpl},
};

/// プロセスハンドラーの State
pub struct ProcessState {
    pub usecase: ProcessUseCaseImpl,
}

// =============================================================================
// 一覧
// =============================================================================

/// 一覧クエリパラメータ
///
/// `country_id` / `company_id` / `role` は呼び出しユーザーの属性。
/// フィルタ側の国は `filter_country_id` で区別する。
#[derive(Debug, Deserialize)]
pub struct ListProcessesQuery {
    pub user_id:    Uuid,
    pub country_id: i32,
    pub company_id: Option<Uuid>,
    pub role:       String,
    /// `"es"`（デフォルト） / `"en"`
    pub lang:       Option<String>,
    #[serde(default)]
    pub es_recertificacion: bool,
    pub block:      Option<i64>,
    pub block_size: Option<i64>,
    // アドホックフィルタ（未指定センチネルはノーオプ）
    pub filter_country_id: Option<i32>,
    pub stage:          Option<i16>,
    pub typology_id:    Option<i32>,
    pub name:           Option<String>,
    pub distinction_id: Option<i32>,
}

impl ListProcessesQuery {
    fn into_input(self) -> ListProcessesInput {
        ListProcessesInput {
            user_id: UserId::from_uuid(self.user_id),
            country_id: self.country_id,
            company_id: self.company_id.map(CompanyId::from_uuid),
            role: self.role,
            filter: ProcessFilter {
                country_id:     self.filter_country_id,
                stage:          self.stage,
                typology_id:    self.typology_id,
                name:           self.name,
                distinction_id: self.distinction_id,
            },
            es_recertificacion: self.es_recertificacion,
            language: Language::parse(self.lang.as_deref().unwrap_or("es")),
            params: BlockParams::new(self.block.unwrap_or(1), self.block_size.unwrap_or(-1)),
        }
    }
}

/// 一覧レスポンス DTO
#[derive(Debug, Serialize)]
pub struct ProcessListDto {
    pub items:          Vec<ProcessView>,
    pub total_count:    i64,
    pub block_number:   i64,
    pub block_size:     i64,
    pub total_blocks:   i64,
    pub has_more_items: bool,
    /// フィルタ済み全件に対する集約カウント
    pub counts:         ProcessCounts,
}

impl From<ProcessPage> for ProcessListDto {
    fn from(page: ProcessPage) -> Self {
        Self {
            items:          page.block.items,
            total_count:    page.block.total_count,
            block_number:   page.block.block_number,
            block_size:     page.block.block_size,
            total_blocks:   page.block.total_blocks,
            has_more_items: page.block.has_more_items,
            counts:         page.counts,
        }
    }
}

/// 統合一覧を取得する（フェイルセーフパス）
///
/// ## エンドポイント
/// GET /internal/processes
#[tracing::instrument(skip_all)]
pub async fn list_processes(
    State(state): State<Arc<ProcessState>>,
    Query(query): Query<ListProcessesQuery>,
) -> Result<Response, CoreError> {
    let page = state.usecase.list_unified(query.into_input()).await?;

    let response = ApiResponse::new(ProcessListDto::from(page));

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// ロールスコープ付き一覧を取得する（厳格パス）
///
/// ## エンドポイント
/// GET /internal/processes/by-role
#[tracing::instrument(skip_all)]
pub async fn list_processes_by_role(
    State(state): State<Arc<ProcessState>>,
    Query(query): Query<ListProcessesQuery>,
) -> Result<Response, CoreError> {
    let page = state.usecase.list_for_role(query.into_input()).await?;

    let response = ApiResponse::new(ProcessListDto::from(page));

    Ok((StatusCode::OK, Json(response)).into_response())
}

// =============================================================================
// レアペルトゥーラ
// =============================================================================

/// レアペルトゥーラのリクエストボディ
#[derive(Debug, Deserialize)]
pub struct ReaperturaRequest {
    /// 実行ユーザー（無い場合はリクエスト全体を拒否する）
    pub user_id: Option<Uuid>,
}

/// レアペルトゥーラのレスポンス DTO
#[derive(Debug, Serialize)]
pub struct ReaperturaDto {
    pub process_id: ProcessId,
    /// 巻き戻し後のステータステキスト
    pub status:     String,
}

/// レアペルトゥーラを実行する
///
/// ## エンドポイント
/// POST /internal/processes/{process_id}/reapertura
#[tracing::instrument(skip_all, fields(process_id = %process_id))]
pub async fn execute_reapertura(
    State(state): State<Arc<ProcessState>>,
    Path(process_id): Path<Uuid>,
    Json(request): Json<ReaperturaRequest>,
) -> Result<Response, CoreError> {
    let outcome = state
        .usecase
        .execute_reapertura(
            ProcessId::from_uuid(process_id),
            request.user_id.map(UserId::from_uuid),
            Utc::now(),
        )
        .await?;

    let response = ApiResponse::new(ReaperturaDto {
        process_id: outcome.process_id,
        status:     outcome.status,
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}

// =============================================================================
// 削除
// =============================================================================

/// 削除系エンドポイントの呼び出しユーザー
#[derive(Debug, Deserialize)]
pub struct DeletionUserQuery {
    pub user_id:    Uuid,
    pub country_id: i32,
    pub company_id: Option<Uuid>,
    pub role:       String,
}

impl DeletionUserQuery {
    /// ロール文字列を厳格にパースしてユーザーコンテキストを作る
    fn into_user_context(self) -> Result<UserContext, CoreError> {
        let role = Role::from_str(&self.role)
            .map_err(|_| CoreError::BadRequest(format!("未対応のロールです: {}", self.role)))?;
        Ok(UserContext {
            user_id: UserId::from_uuid(self.user_id),
            country_id: self.country_id,
            company_id: self.company_id.map(CompanyId::from_uuid),
            role,
        })
    }
}

/// 削除前インスペクションのレスポンス DTO
#[derive(Debug, Serialize)]
pub struct DeletionInspectionDto {
    pub process_id:   ProcessId,
    pub can_delete:   bool,
    pub dependencies: Vec<String>,
}

/// 削除結果のレスポンス DTO
#[derive(Debug, Serialize)]
pub struct DeletionResultDto {
    pub process_id:    ProcessId,
    pub total_deleted: u64,
}

/// 削除前に依存データを確認する
///
/// ## エンドポイント
/// GET /internal/processes/{process_id}/deletion-check
#[tracing::instrument(skip_all, fields(process_id = %process_id))]
pub async fn inspect_deletion(
    State(state): State<Arc<ProcessState>>,
    Path(process_id): Path<Uuid>,
    Query(query): Query<DeletionUserQuery>,
) -> Result<Response, CoreError> {
    let user = query.into_user_context()?;
    let process_id = ProcessId::from_uuid(process_id);

    let inspection = state.usecase.inspect_deletion(&process_id, &user).await?;

    let response = ApiResponse::new(DeletionInspectionDto {
        process_id:   inspection.process_id,
        can_delete:   inspection.can_delete,
        dependencies: inspection.dependencies,
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// プロセスと依存データを削除する
///
/// ## エンドポイント
/// DELETE /internal/processes/{process_id}
#[tracing::instrument(skip_all, fields(process_id = %process_id))]
pub async fn delete_process(
    State(state): State<Arc<ProcessState>>,
    Path(process_id): Path<Uuid>,
    Query(query): Query<DeletionUserQuery>,
) -> Result<Response, CoreError> {
    let user = query.into_user_context()?;
    let process_id = ProcessId::from_uuid(process_id);

    let outcome = state.usecase.delete_process(&process_id, &user).await?;

    let response = ApiResponse::new(DeletionResultDto {
        process_id,
        total_deleted: outcome.total_deleted(),
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}
