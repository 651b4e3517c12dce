//! # ブロックページネーション
//!
//! 固定サイズの「ブロック」単位でページングし、総件数・総ブロック数・
//! 続きの有無のメタデータを付与する汎用プリミティブ。
//! 認証プロセス一覧のほか、任意の一覧系クエリから再利用できる。
//!
//! ## 責務の境界
//!
//! ページネータ自身は並び替えを行わない。安定したページングに必要な
//! 決定的な順序付けは呼び出し側（クエリ構築側）が保証する。

use serde::{Deserialize, Serialize};

/// ブロックサイズ未指定・不正時のデフォルト値
const DEFAULT_BLOCK_SIZE: i64 = 100;

/// 正規化済みのブロック指定
///
/// 不正な入力はエラーにせず保守的な値に正規化する:
/// - `block_number < 1` → `1`
/// - `block_size < 1` → `100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockParams {
    block_number: i64,
    block_size:   i64,
}

impl BlockParams {
    /// ブロック指定を正規化して作成する
    pub fn new(block_number: i64, block_size: i64) -> Self {
        Self {
            block_number: block_number.max(1),
            block_size: if block_size < 1 {
                DEFAULT_BLOCK_SIZE
            } else {
                block_size
            },
        }
    }

    pub fn block_number(self) -> i64 {
        self.block_number
    }

    pub fn block_size(self) -> i64 {
        self.block_size
    }

    /// SQL の OFFSET に対応するスキップ件数
    pub fn offset(self) -> i64 {
        (self.block_number - 1) * self.block_size
    }

    /// SQL の LIMIT に対応する取得件数
    pub fn limit(self) -> i64 {
        self.block_size
    }
}

impl Default for BlockParams {
    fn default() -> Self {
        Self::new(1, DEFAULT_BLOCK_SIZE)
    }
}

/// ブロックページングの結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockResult<T> {
    pub items:          Vec<T>,
    pub total_count:    i64,
    pub block_number:   i64,
    pub block_size:     i64,
    pub total_blocks:   i64,
    pub has_more_items: bool,
}

impl<T> BlockResult<T> {
    /// スライス済みのページと総件数からメタデータを組み立てる
    ///
    /// SQL 側で LIMIT/OFFSET 済みの結果に使用する。
    pub fn new(items: Vec<T>, total_count: i64, params: BlockParams) -> Self {
        // 切り上げ除算は符号なしで行う（i64 の div_ceil は安定版に無い。
        // block_size は正規化済みで 1 以上）
        let total_blocks =
            (total_count.max(0) as u64).div_ceil(params.block_size() as u64) as i64;
        Self {
            items,
            total_count,
            block_number: params.block_number(),
            block_size: params.block_size(),
            total_blocks,
            has_more_items: params.block_number() < total_blocks,
        }
    }

    /// 全件の集合からページを切り出す（インメモリ評価用）
    ///
    /// 入力の順序をそのまま保持する（並び替えはしない）。
    pub fn from_full_set(all: Vec<T>, params: BlockParams) -> Self {
        let total_count = all.len() as i64;
        let items: Vec<T> = all
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Self::new(items, total_count, params)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn rows(n: i64) -> Vec<i64> {
        (1..=n).collect()
    }

    #[rstest]
    #[case(1, 10, true)]
    #[case(2, 10, true)]
    #[case(3, 5, false)]
    fn test_25件をサイズ10で切ると3ブロックになる(
        #[case] block_number: i64,
        #[case] expected_len: usize,
        #[case] expected_has_more: bool,
    ) {
        let params = BlockParams::new(block_number, 10);

        let result = BlockResult::from_full_set(rows(25), params);

        assert_eq!(result.total_count, 25);
        assert_eq!(result.total_blocks, 3);
        assert_eq!(result.items.len(), expected_len);
        assert_eq!(result.has_more_items, expected_has_more);
    }

    #[test]
    fn test_ブロック番号0は1と同一に扱われる() {
        let zero = BlockResult::from_full_set(rows(25), BlockParams::new(0, 10));
        let one = BlockResult::from_full_set(rows(25), BlockParams::new(1, 10));

        assert_eq!(zero, one);
    }

    #[test]
    fn test_負のブロックサイズはデフォルト100と同一に扱われる() {
        let negative = BlockResult::from_full_set(rows(25), BlockParams::new(1, -5));
        let default = BlockResult::from_full_set(rows(25), BlockParams::new(1, 100));

        assert_eq!(negative, default);
        assert_eq!(negative.block_size, 100);
        assert_eq!(negative.total_blocks, 1);
    }

    #[rstest]
    #[case(20, 10, 2)]
    #[case(21, 10, 3)]
    #[case(1, 100, 1)]
    fn test_総ブロック数は端数を切り上げる(
        #[case] total_count: i64,
        #[case] block_size: i64,
        #[case] expected_blocks: i64,
    ) {
        let result =
            BlockResult::new(Vec::<i64>::new(), total_count, BlockParams::new(1, block_size));

        assert_eq!(result.total_blocks, expected_blocks);
    }

    #[test]
    fn test_範囲外のブロックは空ページを返す() {
        let result = BlockResult::from_full_set(rows(25), BlockParams::new(4, 10));

        assert_eq!(result.items.len(), 0);
        assert_eq!(result.total_blocks, 3);
        assert!(!result.has_more_items);
    }

    #[test]
    fn test_0件の集合は0ブロックになる() {
        let result = BlockResult::from_full_set(Vec::<i64>::new(), BlockParams::new(1, 10));

        assert_eq!(result.total_count, 0);
        assert_eq!(result.total_blocks, 0);
        assert!(!result.has_more_items);
    }

    #[test]
    fn test_切り出しは入力の順序を保持する() {
        let result = BlockResult::from_full_set(rows(25), BlockParams::new(2, 10));

        assert_eq!(result.items, (11..=20).collect::<Vec<i64>>());
    }

    #[test]
    fn test_offsetとlimitはブロック指定に対応する() {
        let params = BlockParams::new(3, 10);

        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }
}
