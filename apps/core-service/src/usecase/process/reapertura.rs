//! # レアペルトゥーラユースケース
//!
//! 監査完了（ステージ 6）・CTC 審査中（ステージ 7）のプロセスを
//! 監査進行中（ステージ 5）へ巻き戻す。
//!
//! ## トランザクション境界
//!
//! プロセスのステータス巻き戻し・質問票のリセット・会社の集約ステータス
//! 更新は 1 トランザクションで行う。一時的障害時は作業単位全体を
//! 再実行し、判定は毎回読み直した状態に対して行う。
//!
//! ## 応答の一様性
//!
//! 対象外ステージのプロセスは「見つかりません」と同じ応答を返す。
//! 呼び出し側にプロセスの存在とステージを探らせないため。

use chrono::{DateTime, Utc};
use sellotur_domain::{process::ProcessId, status::Stage, user::UserId};
use sellotur_infra::db::with_retry;

use crate::{error::CoreError, usecase::helpers::FindResultExt as _};

/// レアペルトゥーラの実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaperturaOutcome {
    pub process_id: ProcessId,
    /// 巻き戻し後のステータステキスト（元の言語を維持）
    pub status:     String,
}

impl super::ProcessUseCaseImpl {
    /// レアペルトゥーラを実行する
    ///
    /// リクエストにユーザー ID が無い場合は I/O 前に拒否する。
    pub async fn execute_reapertura(
        &self,
        process_id: ProcessId,
        requested_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<ReaperturaOutcome, CoreError> {
        let Some(user_id) = requested_by else {
            return Err(CoreError::BadRequest(
                "レアペルトゥーラにはユーザー ID が必要です".to_string(),
            ));
        };

        tracing::info!(%process_id, %user_id, "レアペルトゥーラを開始します");

        // 作業単位ごとリトライする。読み直しもクロージャ内で行う
        with_retry(|| self.try_reapertura(&process_id, now)).await
    }

    /// 1 回分の作業単位（読み直し → 判定 → 書き込み）
    async fn try_reapertura(
        &self,
        process_id: &ProcessId,
        now: DateTime<Utc>,
    ) -> Result<ReaperturaOutcome, CoreError> {
        let process = self
            .process_repo
            .find_by_id(process_id)
            .await
            .or_not_found("プロセス")?;

        // 対象外ステージは不在と同一の応答にする
        let Some(reopened) = process.clone().reopened() else {
            return Err(CoreError::NotFound("プロセスが見つかりません".to_string()));
        };

        let questionnaire = self
            .questionnaire_repo
            .find_live_by_process(process_id)
            .await
            .or_not_found("質問票")?;

        let company = self
            .company_repo
            .find_by_id(process.company_id())
            .await
            .or_not_found("会社")?;

        let mut tx = self.tx_manager.begin().await?;
        self.process_repo.save_reapertura(&mut tx, &reopened).await?;
        self.questionnaire_repo
            .save_reapertura_reset(&mut tx, &questionnaire.reset_for_reapertura())
            .await?;
        self.company_repo
            .save_estado(&mut tx, &company.with_estado(Stage::AuditingInProcess, now))
            .await?;
        tx.commit().await?;

        tracing::info!(%process_id, status = reopened.status(), "レアペルトゥーラを適用しました");

        Ok(ReaperturaOutcome {
            process_id: *process_id,
            status:     reopened.status().to_string(),
        })
    }
}
