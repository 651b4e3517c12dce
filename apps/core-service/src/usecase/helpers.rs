//! ユースケース層の共通ヘルパー
//!
//! リポジトリ呼び出し結果の変換など、複数のユースケースで
//! 繰り返されるパターンを共通化する。

use sellotur_infra::InfraError;

use crate::error::CoreError;

/// リポジトリの `Result<Option<T>, InfraError>` を `Result<T, CoreError>` に変換する
///
/// `find_by_id` 等の `Option` を返すリポジトリメソッドの結果を、
/// `CoreError::NotFound` または `CoreError::Database` に変換する。
///
/// ```ignore
/// let process = self.process_repo.find_by_id(&process_id).await
///     .or_not_found("プロセス")?;
/// ```
pub(crate) trait FindResultExt<T> {
    /// `None` の場合は `CoreError::NotFound`、`InfraError` はそのまま伝播する
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError> {
        self?
            .ok_or_else(|| CoreError::NotFound(format!("{entity_name}が見つかりません")))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_or_not_found_ok_some_は値を返す() {
        let result: Result<Option<i32>, InfraError> = Ok(Some(42));

        let value = result.or_not_found("テスト").unwrap();

        assert_eq!(value, 42);
    }

    #[test]
    fn test_or_not_found_ok_none_はnotfoundエラーを返す() {
        let result: Result<Option<i32>, InfraError> = Ok(None);

        let error = result.or_not_found("プロセス").unwrap_err();

        assert!(matches!(error, CoreError::NotFound(_)));
    }

    #[test]
    fn test_or_not_found_err_はデータベースエラーを伝播する() {
        let result: Result<Option<i32>, InfraError> = Err(InfraError::unexpected("boom"));

        let error = result.or_not_found("プロセス").unwrap_err();

        assert!(matches!(error, CoreError::Database(_)));
    }
}
