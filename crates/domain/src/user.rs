//! # ユーザーとロール
//!
//! 呼び出し元の識別情報（ID・国・所属会社）と、固定集合のロールを定義する。
//!
//! ## 設計方針
//!
//! - **ロールは閉じた列挙型**: 外部から渡されるロール文字列は境界で
//!   [`Role`] にパースし、以降は網羅的 match で分岐する。
//!   新しいロールの追加は必ずコンパイルエラーとして現れる
//! - **広域アクセスは能力フラグ**: 「全プロセスを閲覧できるロールの一覧」を
//!   別管理のリストとして持たず、[`Role::has_unscoped_access`]
//!   として列挙型自身に持たせる

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::company::CompanyId;

define_uuid_id! {
    /// ユーザー ID（アドバイザー・監査員・技術担当者などの人物参照）
    pub struct UserId;
}

/// 認証ワークフローに関与するロール（固定集合）
///
/// 文字列表現は外部の認証基盤が発行するロール名と一致させる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum Role {
    /// システム管理者
    Admin,
    /// 国の技術担当者
    CountryTechnician,
    /// コンサルタント
    Consultant,
    /// 監査会社
    AuditingCompany,
    /// アドバイザー（事前指導担当）
    Advisor,
    /// 監査員
    Auditor,
    /// CTC 委員会レビュアー
    CommitteeReviewer,
    /// 認証対象の会社ユーザー
    Company,
}

impl Role {
    /// 所有者・国によるスコープを一切受けない広域アクセスロールか
    ///
    /// 広域アクセスの判定はロール別分岐より優先される
    /// （例: CountryTechnician は国スコープの分岐も持つが、
    /// 一覧クエリではこちらが先に効く）。
    pub fn has_unscoped_access(self) -> bool {
        match self {
            Self::Admin | Self::CountryTechnician | Self::Consultant | Self::AuditingCompany => {
                true
            }
            Self::Advisor | Self::Auditor | Self::CommitteeReviewer | Self::Company => false,
        }
    }

    /// プロセス削除を実行できるロールか（国チェックは別途）
    pub fn may_delete_processes(self) -> bool {
        matches!(self, Self::Admin | Self::CountryTechnician)
    }
}

/// 呼び出し元ユーザーのコンテキスト
///
/// 認証基盤（JWT 検証は外部協調者）から渡される識別情報。
/// このコアでは検証済みとして扱う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    /// ユーザー ID
    pub user_id:    UserId,
    /// 所属国の ID（カタログコード）
    pub country_id: i32,
    /// 所属会社の ID（Company ロールの場合のみ意味を持つ）
    pub company_id: Option<CompanyId>,
    /// ロール
    pub role:       Role,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case(Role::Admin, true)]
    #[case(Role::CountryTechnician, true)]
    #[case(Role::Consultant, true)]
    #[case(Role::AuditingCompany, true)]
    #[case(Role::Advisor, false)]
    #[case(Role::Auditor, false)]
    #[case(Role::CommitteeReviewer, false)]
    #[case(Role::Company, false)]
    fn test_広域アクセス能力フラグ(#[case] role: Role, #[case] expected: bool) {
        assert_eq!(role.has_unscoped_access(), expected);
    }

    #[test]
    fn test_削除権限はadminと国技術担当者のみ() {
        let can_delete: Vec<Role> = Role::iter().filter(|r| r.may_delete_processes()).collect();
        assert_eq!(can_delete, vec![Role::Admin, Role::CountryTechnician]);
    }

    #[test]
    fn test_ロール文字列は境界で閉じた列挙型にパースされる() {
        assert_eq!(Role::from_str("Advisor").unwrap(), Role::Advisor);
        assert_eq!(
            Role::from_str("CountryTechnician").unwrap(),
            Role::CountryTechnician
        );
        assert!(Role::from_str("SuperUser").is_err());
    }

    #[test]
    fn test_ロールの文字列表現は往復変換できる() {
        for role in Role::iter() {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
    }
}
