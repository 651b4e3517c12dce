//! # プロセス削除ユースケース
//!
//! 削除前の依存データ確認（インスペクション）と、
//! FK 依存順のカスケード削除を提供する。
//!
//! ## 判定順序
//!
//! 存在確認 → 権限確認の順で行う。先に権限を見ると、
//! 存在しないプロセスに対して Forbidden を返してしまい、
//! 呼び出し側の復旧手順（404 なら一覧を更新）と噛み合わない。

use sellotur_domain::{
    process::{CertificationProcess, ProcessId},
    user::{Role, UserContext},
};
use sellotur_infra::{db::with_retry, deletion::DeletionOutcome};

use crate::{error::CoreError, usecase::helpers::FindResultExt as _};

/// 削除前インスペクションの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionInspection {
    pub process_id:   ProcessId,
    /// 存在確認と権限確認を通過したか（通過しない場合はエラーになるため常に true）
    pub can_delete:   bool,
    /// 削除される依存データの説明行（0 件のカテゴリは含まない）
    pub dependencies: Vec<String>,
}

impl super::ProcessUseCaseImpl {
    /// 削除前に依存データを確認する
    pub async fn inspect_deletion(
        &self,
        process_id: &ProcessId,
        user: &UserContext,
    ) -> Result<DeletionInspection, CoreError> {
        let process = self
            .process_repo
            .find_by_id(process_id)
            .await
            .or_not_found("プロセス")?;
        self.check_delete_permission(&process, user).await?;

        let counts = self.cascade.count_dependents(process_id).await?;

        Ok(DeletionInspection {
            process_id:   *process_id,
            can_delete:   true,
            dependencies: counts.describe(),
        })
    }

    /// プロセスと依存データを削除する
    ///
    /// 削除は all-or-nothing: 途中で失敗した場合は何も消えない。
    /// 一時的障害時は作業単位（読み直し → 権限確認 → カスケード削除）
    /// 全体を再実行する。
    pub async fn delete_process(
        &self,
        process_id: &ProcessId,
        user: &UserContext,
    ) -> Result<DeletionOutcome, CoreError> {
        let outcome = with_retry(|| self.try_delete(process_id, user)).await?;

        tracing::info!(
            %process_id,
            user_id = %user.user_id,
            total_deleted = outcome.total_deleted(),
            "プロセスを削除しました"
        );

        Ok(outcome)
    }

    /// 1 回分の作業単位（読み直し → 権限確認 → カスケード削除）
    async fn try_delete(
        &self,
        process_id: &ProcessId,
        user: &UserContext,
    ) -> Result<DeletionOutcome, CoreError> {
        let process = self
            .process_repo
            .find_by_id(process_id)
            .await
            .or_not_found("プロセス")?;
        self.check_delete_permission(&process, user).await?;

        Ok(self.cascade.delete_cascade(process_id).await?)
    }

    /// 削除権限を確認する
    ///
    /// Admin は無条件、CountryTechnician は会社の所属国が一致する場合のみ。
    async fn check_delete_permission(
        &self,
        process: &CertificationProcess,
        user: &UserContext,
    ) -> Result<(), CoreError> {
        if !user.role.may_delete_processes() {
            return Err(CoreError::Forbidden(
                "プロセスを削除する権限がありません".to_string(),
            ));
        }

        if user.role == Role::CountryTechnician {
            let company = self
                .company_repo
                .find_by_id(process.company_id())
                .await
                .or_not_found("会社")?;
            if company.country_id() != user.country_id {
                return Err(CoreError::Forbidden(
                    "自国のプロセスのみ削除できます".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sellotur_domain::user::{Role, UserContext, UserId};
    use sellotur_infra::{
        deletion::{DeletionStep, DependencyCounts},
        repository::ProcessRepository as _,
    };

    use super::super::test_fixtures::{company, deps, process};
    use super::*;

    fn user(role: Role, country_id: i32) -> UserContext {
        UserContext {
            user_id: UserId::new(),
            country_id,
            company_id: None,
            role,
        }
    }

    #[tokio::test]
    async fn test_インスペクションは0件のカテゴリを省いた説明を返す() {
        let d = deps();
        let c = company(10, 5);
        let p = process(*c.id(), "5 - Auditoría en proceso");
        let process_id = *p.id();
        d.company_repo.add_company(c);
        d.process_repo.add_process(p);
        d.cascade.set_dependents(
            process_id,
            DependencyCounts {
                questionnaires: 2,
                results: 0,
                files: 1,
                homologations: 0,
            },
        );

        let inspection = d
            .usecase
            .inspect_deletion(&process_id, &user(Role::Admin, 99))
            .await
            .unwrap();

        assert!(inspection.can_delete);
        assert_eq!(
            inspection.dependencies,
            vec!["2 questionnaire(s)".to_string(), "1 file(s)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_一時的障害の削除は作業単位ごと再実行されて成功する() {
        let d = deps();
        let c = company(10, 5);
        let p = process(*c.id(), "5 - Auditoría en proceso");
        let process_id = *p.id();
        d.company_repo.add_company(c);
        d.process_repo.add_process(p);
        d.cascade.set_dependents(
            process_id,
            DependencyCounts {
                questionnaires: 1,
                ..Default::default()
            },
        );
        // 初回の試行だけプールタイムアウトで失敗させる
        d.cascade.fail_transient_once();

        let outcome = d
            .usecase
            .delete_process(&process_id, &user(Role::Admin, 10))
            .await
            .unwrap();

        assert_eq!(outcome.total_deleted(), 2);
        assert!(d.process_repo.find_by_id(&process_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_存在確認は権限確認より先に行われる() {
        let d = deps();
        let missing = ProcessId::new();

        // 権限のないロールでも、不在のプロセスには not_found を返す
        let error = d
            .usecase
            .inspect_deletion(&missing, &user(Role::Advisor, 10))
            .await
            .unwrap_err();

        assert!(matches!(error, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_削除権限のないロールはforbiddenになる() {
        let d = deps();
        let c = company(10, 5);
        let p = process(*c.id(), "5 - Auditoría en proceso");
        let process_id = *p.id();
        d.company_repo.add_company(c);
        d.process_repo.add_process(p);

        let error = d
            .usecase
            .delete_process(&process_id, &user(Role::Auditor, 10))
            .await
            .unwrap_err();

        assert!(matches!(error, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_国の技術担当者は他国のプロセスを削除できない() {
        let d = deps();
        let c = company(10, 5);
        let p = process(*c.id(), "5 - Auditoría en proceso");
        let process_id = *p.id();
        d.company_repo.add_company(c);
        d.process_repo.add_process(p);

        let error = d
            .usecase
            .delete_process(&process_id, &user(Role::CountryTechnician, 20))
            .await
            .unwrap_err();

        assert!(matches!(error, CoreError::Forbidden(_)));

        let same_country = d
            .usecase
            .delete_process(&process_id, &user(Role::CountryTechnician, 10))
            .await;
        assert!(same_country.is_ok());
    }

    #[tokio::test]
    async fn test_削除後のインスペクションはnot_foundになる() {
        let d = deps();
        let c = company(10, 5);
        let p = process(*c.id(), "5 - Auditoría en proceso");
        let process_id = *p.id();
        d.company_repo.add_company(c);
        d.process_repo.add_process(p);
        d.cascade.set_dependents(
            process_id,
            DependencyCounts {
                questionnaires: 1,
                ..Default::default()
            },
        );

        let outcome = d
            .usecase
            .delete_process(&process_id, &user(Role::Admin, 10))
            .await
            .unwrap();
        assert_eq!(outcome.total_deleted(), 2);

        let error = d
            .usecase
            .inspect_deletion(&process_id, &user(Role::Admin, 10))
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_途中で失敗した削除は何も消さない() {
        let d = deps();
        let c = company(10, 5);
        let p = process(*c.id(), "5 - Auditoría en proceso");
        let process_id = *p.id();
        d.company_repo.add_company(c);
        d.process_repo.add_process(p);
        d.cascade.set_dependents(
            process_id,
            DependencyCounts {
                questionnaires: 3,
                ..Default::default()
            },
        );
        d.cascade.fail_during(DeletionStep::Results);

        let error = d
            .usecase
            .delete_process(&process_id, &user(Role::Admin, 10))
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::Database(_)));

        // プロセスも依存データも残っている
        assert!(d.process_repo.find_by_id(&process_id).await.unwrap().is_some());
        let inspection = d
            .usecase
            .inspect_deletion(&process_id, &user(Role::Admin, 10))
            .await
            .unwrap();
        assert_eq!(inspection.dependencies, vec!["3 questionnaire(s)".to_string()]);
    }
}
