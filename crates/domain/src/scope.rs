//! # ロールスコープ解決
//!
//! 「このロールのユーザーはどの認証プロセスを見てよいか」を
//! 決定的・副作用なしで解決する。
//!
//! ## 設計方針
//!
//! - **スコープはデータ**: 解決結果は [`ProcessScope`]（述語の値表現）として返す。
//!   インフラ層はこれを SQL の WHERE 句へ描画し、テストやモックは
//!   [`ProcessScope::matches`] でインメモリ評価する。両者の意味は常に一致する
//! - **広域アクセスが先**: [`Role::has_unscoped_access`]
//!   のロールは所有者別の分岐に入る前に無条件で [`ProcessScope::All`] になる
//! - **フェイルセーフ**: 統合パス（一覧クエリ）では想定外のロールデータを
//!   エラーにせず常偽述語 [`ProcessScope::Nothing`]
//!   に落とし、スコープなしの結果が漏れることを防ぐ

use std::str::FromStr;

use crate::{
    company::CompanyId,
    error::DomainError,
    user::{Role, UserContext, UserId},
};

/// 認証プロセスに対する可視範囲の述語
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessScope {
    /// スコープなし（広域アクセスロール）
    All,
    /// 自分がアドバイザーのプロセスのみ
    AdvisedBy(UserId),
    /// 自分が監査員のプロセスのみ
    AuditedBy(UserId),
    /// 会社の所属国が一致するプロセスのみ
    InCountry(i32),
    /// 自社のプロセスのみ
    OfCompany(CompanyId),
    /// 常偽（想定外のロールデータに対するフェイルセーフ）
    Nothing,
}

impl ProcessScope {
    /// ロールから可視範囲を解決する（厳格パス）
    ///
    /// 広域アクセス判定が所有者別の分岐より先に効く。
    /// Company ロールで所属会社が未設定の場合は I/O 前に検証エラーとする。
    pub fn resolve(user: &UserContext) -> Result<Self, DomainError> {
        if user.role.has_unscoped_access() {
            return Ok(Self::All);
        }

        match user.role {
            Role::Advisor => Ok(Self::AdvisedBy(user.user_id)),
            Role::Auditor => Ok(Self::AuditedBy(user.user_id)),
            Role::CommitteeReviewer => Ok(Self::InCountry(user.country_id)),
            Role::Company => user
                .company_id
                .map(Self::OfCompany)
                .ok_or_else(|| {
                    DomainError::Validation(
                        "Company ロールには所属会社が必要です".to_string(),
                    )
                }),
            // 広域アクセスロールは冒頭で処理済み
            Role::Admin | Role::CountryTechnician | Role::Consultant | Role::AuditingCompany => {
                Ok(Self::All)
            }
        }
    }

    /// 統合パス用の解決（フェイルセーフ）
    ///
    /// 解決できないロールデータ（不正な所属情報など）は
    /// エラーではなく空集合スコープに落とす。
    pub fn resolve_unified(user: &UserContext) -> Self {
        Self::resolve(user).unwrap_or(Self::Nothing)
    }

    /// ロール文字列境界での解決（厳格パス）
    ///
    /// 識別基盤から渡される未検証のロール文字列を受け取る。
    /// 未知のロール名は暗黙にスコープなしで続行せず、明示的に失敗する。
    pub fn resolve_role_str(
        user_id: UserId,
        country_id: i32,
        company_id: Option<CompanyId>,
        role: &str,
    ) -> Result<Self, DomainError> {
        let role = Role::from_str(role)
            .map_err(|_| DomainError::UnsupportedRole(role.to_string()))?;
        Self::resolve(&UserContext {
            user_id,
            country_id,
            company_id,
            role,
        })
    }

    /// ロール文字列境界での統合パス解決（フェイルセーフ）
    pub fn resolve_unified_role_str(
        user_id: UserId,
        country_id: i32,
        company_id: Option<CompanyId>,
        role: &str,
    ) -> Self {
        Self::resolve_role_str(user_id, country_id, company_id, role).unwrap_or(Self::Nothing)
    }

    /// プロセスの所有情報に対して述語を評価する（インメモリ評価）
    ///
    /// SQL 描画（インフラ層）と同じ意味を持つこと。
    pub fn matches(
        &self,
        advisor_id: Option<&UserId>,
        auditor_id: Option<&UserId>,
        company_id: &CompanyId,
        company_country_id: i32,
    ) -> bool {
        match self {
            Self::All => true,
            Self::AdvisedBy(user) => advisor_id == Some(user),
            Self::AuditedBy(user) => auditor_id == Some(user),
            Self::InCountry(country) => company_country_id == *country,
            Self::OfCompany(company) => company_id == company,
            Self::Nothing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn user(role: Role) -> UserContext {
        UserContext {
            user_id: UserId::new(),
            country_id: 10,
            company_id: Some(CompanyId::new()),
            role,
        }
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::CountryTechnician)]
    #[case(Role::Consultant)]
    #[case(Role::AuditingCompany)]
    fn test_広域アクセスロールは無条件で全件スコープになる(#[case] role: Role) {
        assert_eq!(ProcessScope::resolve(&user(role)).unwrap(), ProcessScope::All);
    }

    #[test]
    fn test_アドバイザーは自分の担当プロセスのみに絞られる() {
        let u = user(Role::Advisor);

        let scope = ProcessScope::resolve(&u).unwrap();

        assert_eq!(scope, ProcessScope::AdvisedBy(u.user_id));
    }

    #[test]
    fn test_委員会レビュアーは国スコープになる() {
        let scope = ProcessScope::resolve(&user(Role::CommitteeReviewer)).unwrap();
        assert_eq!(scope, ProcessScope::InCountry(10));
    }

    #[test]
    fn test_会社ロールで所属会社がないと検証エラーになる() {
        let mut u = user(Role::Company);
        u.company_id = None;

        assert!(matches!(
            ProcessScope::resolve(&u),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_未知のロール文字列は厳格パスでエラーになる() {
        let result =
            ProcessScope::resolve_role_str(UserId::new(), 10, None, "SuperDuperAdmin");

        assert!(matches!(result, Err(DomainError::UnsupportedRole(_))));
    }

    #[test]
    fn test_未知のロール文字列は統合パスで空集合スコープに落ちる() {
        let scope =
            ProcessScope::resolve_unified_role_str(UserId::new(), 10, None, "SuperDuperAdmin");

        assert_eq!(scope, ProcessScope::Nothing);
    }

    // ===== matches（インメモリ評価） =====

    #[test]
    fn test_アドバイザースコープは混在データから担当分のみを通す() {
        let mine = UserId::new();
        let other = UserId::new();
        let company = CompanyId::new();
        let scope = ProcessScope::AdvisedBy(mine);

        assert!(scope.matches(Some(&mine), None, &company, 10));
        assert!(!scope.matches(Some(&other), None, &company, 10));
        assert!(!scope.matches(None, None, &company, 10));
    }

    #[test]
    fn test_全件スコープは所有情報に関係なくすべて通す() {
        let company = CompanyId::new();

        assert!(ProcessScope::All.matches(None, None, &company, 99));
    }

    #[test]
    fn test_常偽スコープは何も通さない() {
        let company = CompanyId::new();
        let user_id = UserId::new();

        assert!(!ProcessScope::Nothing.matches(Some(&user_id), Some(&user_id), &company, 10));
    }
}
