//! # 認証プロセス一覧ユースケース
//!
//! ロールの可視範囲とアドホックフィルタを合成し、
//! ブロックページと集約カウントを取得する。
//!
//! ## パスの使い分け
//!
//! - [`list_unified`](super::ProcessUseCaseImpl::list_unified):
//!   統合一覧（フェイルセーフ）。未知のロールデータは空集合になる
//! - [`list_for_role`](super::ProcessUseCaseImpl::list_for_role):
//!   厳格パス。不正なロールデータは明示的にエラーを返す

use sellotur_domain::{
    block::BlockParams,
    company::CompanyId,
    query::{ProcessFilter, ProcessListQuery},
    scope::ProcessScope,
    status::Language,
    user::UserId,
};
use sellotur_infra::process_query::ProcessPage;

use crate::error::CoreError;

/// 一覧取得の入力
#[derive(Debug, Clone)]
pub struct ListProcessesInput {
    pub user_id:            UserId,
    pub country_id:         i32,
    pub company_id:         Option<CompanyId>,
    /// 識別基盤から渡される未検証のロール文字列
    pub role:               String,
    pub filter:             ProcessFilter,
    pub es_recertificacion: bool,
    pub language:           Language,
    pub params:             BlockParams,
}

impl super::ProcessUseCaseImpl {
    /// 統合一覧を取得する（フェイルセーフパス）
    ///
    /// 解決できないロールデータはエラーにせず空ページを返す。
    /// 集約カウントはページではなくフィルタ済み全件に対して集計される。
    pub async fn list_unified(&self, input: ListProcessesInput) -> Result<ProcessPage, CoreError> {
        let scope = ProcessScope::resolve_unified_role_str(
            input.user_id,
            input.country_id,
            input.company_id,
            &input.role,
        );
        let query = ProcessListQuery {
            scope,
            filter: input.filter,
            es_recertificacion: input.es_recertificacion,
        };

        Ok(self
            .queries
            .fetch_block(&query, input.language, input.params)
            .await?)
    }

    /// ロールスコープ付き一覧を取得する（厳格パス）
    ///
    /// 未知のロールや不正な所属データは明示的にエラーを返す。
    pub async fn list_for_role(&self, input: ListProcessesInput) -> Result<ProcessPage, CoreError> {
        let scope = ProcessScope::resolve_role_str(
            input.user_id,
            input.country_id,
            input.company_id,
            &input.role,
        )
        .map_err(CoreError::from_domain)?;
        let query = ProcessListQuery {
            scope,
            filter: input.filter,
            es_recertificacion: input.es_recertificacion,
        };

        Ok(self
            .queries
            .fetch_block(&query, input.language, input.params)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sellotur_domain::query::ProcessCounts;
    use sellotur_domain::user::UserId;

    use super::super::test_fixtures::{deps, list_row};
    use super::*;

    fn input(user_id: UserId, role: &str) -> ListProcessesInput {
        ListProcessesInput {
            user_id,
            country_id: 10,
            company_id: None,
            role: role.to_string(),
            filter: ProcessFilter::none(),
            es_recertificacion: false,
            language: Language::Es,
            params: BlockParams::default(),
        }
    }

    #[tokio::test]
    async fn test_アドバイザーの統合一覧は担当プロセスのみを返す() {
        let d = deps();
        let me = UserId::new();
        d.queries.add_row(list_row(10, 5, Some(me), None));
        d.queries.add_row(list_row(10, 5, Some(UserId::new()), None));
        d.queries.add_row(list_row(10, 5, None, Some(me)));

        let page = d.usecase.list_unified(input(me, "Advisor")).await.unwrap();

        assert_eq!(page.block.total_count, 1);
        assert_eq!(page.block.items.len(), 1);
    }

    #[tokio::test]
    async fn test_管理者の統合一覧は全プロセスを返す() {
        let d = deps();
        for _ in 0..3 {
            d.queries.add_row(list_row(10, 5, Some(UserId::new()), None));
        }

        let page = d
            .usecase
            .list_unified(input(UserId::new(), "Admin"))
            .await
            .unwrap();

        assert_eq!(page.block.total_count, 3);
    }

    #[tokio::test]
    async fn test_未知のロールの統合一覧は空ページに落ちる() {
        let d = deps();
        d.queries.add_row(list_row(10, 5, Some(UserId::new()), None));

        let page = d
            .usecase
            .list_unified(input(UserId::new(), "SuperDuperAdmin"))
            .await
            .unwrap();

        assert_eq!(page.block.total_count, 0);
        assert!(page.block.items.is_empty());
    }

    #[tokio::test]
    async fn test_未知のロールの厳格パスはエラーになる() {
        let d = deps();

        let error = d
            .usecase
            .list_for_role(input(UserId::new(), "SuperDuperAdmin"))
            .await
            .unwrap_err();

        assert!(matches!(error, CoreError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_集約カウントはページサイズに影響されない() {
        let d = deps();
        for i in 0..25 {
            // estado を 0/5/8 で散らす
            let estado = match i % 3 {
                0 => 0,
                1 => 5,
                _ => 8,
            };
            d.queries.add_row(list_row(10, estado, Some(UserId::new()), None));
        }

        let mut small_page = input(UserId::new(), "Admin");
        small_page.params = BlockParams::new(1, 10);

        let page = d.usecase.list_unified(small_page).await.unwrap();

        assert_eq!(page.block.items.len(), 10);
        assert_eq!(page.block.total_count, 25);
        assert_eq!(page.block.total_blocks, 3);
        assert_eq!(
            page.counts,
            ProcessCounts {
                pending:    9,
                in_process: 8,
                completed:  8,
            }
        );
    }

    #[tokio::test]
    async fn test_最終ブロックは端数のみを返しhas_moreが消える() {
        let d = deps();
        for _ in 0..25 {
            d.queries.add_row(list_row(10, 5, Some(UserId::new()), None));
        }

        let mut last_block = input(UserId::new(), "Admin");
        last_block.params = BlockParams::new(3, 10);

        let page = d.usecase.list_unified(last_block).await.unwrap();

        assert_eq!(page.block.items.len(), 5);
        assert!(!page.block.has_more_items);
    }

    #[tokio::test]
    async fn test_フィルタは国とステージをand結合で絞る() {
        let d = deps();
        d.queries.add_row(list_row(10, 5, Some(UserId::new()), None));
        d.queries.add_row(list_row(20, 5, Some(UserId::new()), None));

        let mut filtered = input(UserId::new(), "Admin");
        filtered.filter.country_id = Some(20);
        filtered.filter.stage = Some(5);

        let page = d.usecase.list_unified(filtered).await.unwrap();

        assert_eq!(page.block.total_count, 1);
    }

    #[tokio::test]
    async fn test_会社ロールで所属会社がないと厳格パスはbad_requestになる() {
        let d = deps();

        let error = d
            .usecase
            .list_for_role(input(UserId::new(), "Company"))
            .await
            .unwrap_err();

        assert!(matches!(error, CoreError::BadRequest(_)));
    }
}
