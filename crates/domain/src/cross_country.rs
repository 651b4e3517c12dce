//! # 国間監査委託リクエスト
//!
//! 監査員が不足する国が他国へ監査を委託するためのリクエスト。
//! ライフサイクルは Pending → Approved / Rejected で、
//! 終端状態に達した後は変更できない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{error::DomainError, user::UserId};

define_uuid_id! {
    /// 国間監査リクエスト ID
    pub struct AuditRequestId;
}

/// リクエストのステータス
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum AuditRequestStatus {
    /// 承認待ち
    Pending,
    /// 承認済み（終端）
    Approved,
    /// 却下（終端）
    Rejected,
}

impl AuditRequestStatus {
    /// 終端状態か（終端に達したリクエストは不変）
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// 国間監査委託リクエスト
///
/// # 不変条件
///
/// - `status` が終端に達した後の遷移は [`DomainError::Validation`] で拒否される
/// - 監査員の割り当ては承認時のみ行われる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCountryAuditRequest {
    id:                    AuditRequestId,
    requesting_country_id: i32,
    approving_country_id:  i32,
    auditor_id:            Option<UserId>,
    status:                AuditRequestStatus,
    created_at:            DateTime<Utc>,
    updated_at:            DateTime<Utc>,
}

impl CrossCountryAuditRequest {
    /// 新しいリクエストを承認待ち状態で作成する
    pub fn new(
        id: AuditRequestId,
        requesting_country_id: i32,
        approving_country_id: i32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            requesting_country_id,
            approving_country_id,
            auditor_id: None,
            status: AuditRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// 既存のデータから復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: AuditRequestId,
        requesting_country_id: i32,
        approving_country_id: i32,
        auditor_id: Option<UserId>,
        status: AuditRequestStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            requesting_country_id,
            approving_country_id,
            auditor_id,
            status,
            created_at,
            updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &AuditRequestId {
        &self.id
    }

    pub fn requesting_country_id(&self) -> i32 {
        self.requesting_country_id
    }

    pub fn approving_country_id(&self) -> i32 {
        self.approving_country_id
    }

    pub fn auditor_id(&self) -> Option<&UserId> {
        self.auditor_id.as_ref()
    }

    pub fn status(&self) -> AuditRequestStatus {
        self.status
    }

    // 状態遷移

    /// リクエストを承認し、監査員を割り当てる
    pub fn approved(self, auditor_id: UserId, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_pending()?;
        Ok(Self {
            status: AuditRequestStatus::Approved,
            auditor_id: Some(auditor_id),
            updated_at: now,
            ..self
        })
    }

    /// リクエストを却下する
    pub fn rejected(self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.ensure_pending()?;
        Ok(Self {
            status: AuditRequestStatus::Rejected,
            updated_at: now,
            ..self
        })
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::Validation(format!(
                "終端状態のリクエストは変更できません: {}",
                self.status
            )));
        }
        Ok(())
    }
}
