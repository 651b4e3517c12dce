//! # 認証ステージとステータスコーデック
//!
//! 認証プロセスのステータスは互換性制約により
//! `"<数字> - <ローカライズ名称>"` 形式のフリーテキストとして保存されている
//! （例: `"5 - Auditoría en proceso"` / `"5 - Audit in process"`）。
//! 数値ステージとテキスト表現の両方が保存データに共存するため、
//! 相互変換はこのモジュールの単一のコーデックに集約し、
//! 他の場所でステータス文字列を手組みすることを禁止する。
//!
//! ## 設計方針
//!
//! - **正準値は数値ステージ**: 内部では [`Stage`] を唯一の真実とし、
//!   テキストは派生表現（エンコード結果）として扱う
//! - **復号は推測しない**: 先頭数字が認識できなければ明示的にエラーを返す
//! - **二言語**: 名称は es / en の二言語。言語選択は不透明な二値フラグ
//!
//! ## 会社の集約ステータス（estado）
//!
//! 会社側の数値 `estado` は同じ 0〜8 スケールを共有する。
//! 集計カウントのバケット分けもここで定義する
//! （保留 = コンサル前、進行中 = その間、完了 = 終了）。

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::error::DomainError;

/// 表示言語（es / en の二値フラグ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// スペイン語（本来の運用言語、フォールバック先）
    #[default]
    Es,
    /// 英語
    En,
}

impl Language {
    /// `"es"` / `"en"` からパースする。不明な値は Es にフォールバックする
    pub fn parse(s: &str) -> Self {
        match s {
            "en" => Self::En,
            _ => Self::Es,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }
}

/// 認証プロセスの 9 ステージ（0〜8、順序付き）
///
/// ステージ遷移はレアペルトゥーラ（明示的な巻き戻し）を除き単調に進む。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum Stage {
    /// 0 - 初期状態
    Initial,
    /// 1 - アドバイザリー待ち
    ToBeAdvised,
    /// 2 - アドバイザリー進行中
    AdvisingInProcess,
    /// 3 - アドバイザリー完了
    AdvisingFinalized,
    /// 4 - 監査待ち
    ToBeAudited,
    /// 5 - 監査進行中
    AuditingInProcess,
    /// 6 - 監査完了
    AuditingFinalized,
    /// 7 - CTC 委員会審査中
    UnderCtcReview,
    /// 8 - 終了
    Ended,
}

/// スペイン語のステージ名称（保存データの正準エンコードの一部）
const NAMES_ES: [&str; 9] = [
    "Inicial",
    "Por asesorar",
    "Asesoría en proceso",
    "Asesoría finalizada",
    "Por auditar",
    "Auditoría en proceso",
    "Auditoría finalizada",
    "En revisión CTC",
    "Finalizado",
];

/// 英語のステージ名称
const NAMES_EN: [&str; 9] = [
    "Initial",
    "To be advised",
    "Advisory in process",
    "Advisory finalized",
    "To be audited",
    "Audit in process",
    "Audit finalized",
    "Under CTC review",
    "Ended",
];

impl Stage {
    /// ステージ番号（0〜8）
    pub fn number(self) -> i16 {
        self as i16
    }

    /// 番号からステージを復元する。0〜8 以外は `None`
    pub fn from_number(n: i16) -> Option<Self> {
        match n {
            0 => Some(Self::Initial),
            1 => Some(Self::ToBeAdvised),
            2 => Some(Self::AdvisingInProcess),
            3 => Some(Self::AdvisingFinalized),
            4 => Some(Self::ToBeAudited),
            5 => Some(Self::AuditingInProcess),
            6 => Some(Self::AuditingFinalized),
            7 => Some(Self::UnderCtcReview),
            8 => Some(Self::Ended),
            _ => None,
        }
    }

    /// 指定言語のローカライズ名称
    pub fn name(self, language: Language) -> &'static str {
        match language {
            Language::Es => NAMES_ES[self as usize],
            Language::En => NAMES_EN[self as usize],
        }
    }

    /// 正準形 `"<数字> - <ローカライズ名称>"` にエンコードする
    ///
    /// ステータス文字列を生成してよいのはこのメソッドだけ。
    /// フィルタのプレフィックス検索（[`Stage::text_prefix`]）と
    /// 往復変換（`decode(encode(s, l)) == s`）が成立する。
    pub fn encode(self, language: Language) -> String {
        format!("{} - {}", self.number(), self.name(language))
    }

    /// 保存済みステータス文字列からステージを復号する
    ///
    /// `" - "` より前の先頭数字列のみを解釈する。数字が無い、
    /// または 0〜8 に対応しない場合は [`DomainError::UnknownStage`] を返す。
    /// 名称部分は検証しない（旧データには表記ゆれがある）。
    pub fn decode(text: &str) -> Result<Self, DomainError> {
        let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(DomainError::UnknownStage(text.to_string()));
        }
        digits
            .parse::<i16>()
            .ok()
            .and_then(Self::from_number)
            .ok_or_else(|| DomainError::UnknownStage(text.to_string()))
    }

    /// 保存済みステータス文字列の言語を判定する
    ///
    /// 名称部分が英語の正準名称と完全一致する場合のみ En。
    /// それ以外（スペイン語、旧データの表記ゆれ）は Es にフォールバックする。
    pub fn language_of(text: &str) -> Language {
        match Self::decode(text) {
            Ok(stage) if text == stage.encode(Language::En) => Language::En,
            _ => Language::Es,
        }
    }

    /// フィルタ用の完全一致プレフィックス `"<数字> - "`
    ///
    /// ステージによる絞り込みはこのプレフィックスでのみ照合する
    /// （名称部分の部分一致は言語によって結果が変わるため使用しない）。
    pub fn text_prefix(self) -> String {
        format!("{} - ", self.number())
    }

    // ===== 会社 estado のバケット分け =====

    /// 保留中（コンサルティング開始前）の estado か
    pub fn estado_is_pending(estado: i16) -> bool {
        estado <= Self::ToBeAdvised.number()
    }

    /// 進行中（コンサル開始後〜完了前）の estado か
    pub fn estado_is_in_process(estado: i16) -> bool {
        estado > Self::ToBeAdvised.number() && estado < Self::Ended.number()
    }

    /// 完了済みの estado か
    pub fn estado_is_completed(estado: i16) -> bool {
        estado == Self::Ended.number()
    }
}

impl fmt::Display for Stage {
    /// スペイン語の正準エンコードを表示する（ログ用）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode(Language::Es))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    // ===== 往復変換 =====

    #[rstest]
    #[case(Language::Es)]
    #[case(Language::En)]
    fn test_全ステージの正準エンコードが両言語で往復変換できる(
        #[case] language: Language,
    ) {
        for stage in Stage::iter() {
            let encoded = stage.encode(language);
            assert_eq!(Stage::decode(&encoded).unwrap(), stage, "{encoded}");
        }
    }

    #[test]
    fn test_エンコードは数字とローカライズ名称をハイフンで結合する() {
        assert_eq!(
            Stage::AuditingInProcess.encode(Language::Es),
            "5 - Auditoría en proceso"
        );
        assert_eq!(
            Stage::AuditingInProcess.encode(Language::En),
            "5 - Audit in process"
        );
    }

    // ===== 復号 =====

    #[rstest]
    #[case("0 - Inicial", Stage::Initial)]
    #[case("8 - Ended", Stage::Ended)]
    #[case("6 - 旧名称の表記ゆれ", Stage::AuditingFinalized)]
    #[case("7", Stage::UnderCtcReview)]
    fn test_復号は先頭数字列のみを解釈する(
        #[case] text: &str,
        #[case] expected: Stage,
    ) {
        assert_eq!(Stage::decode(text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("Auditoría en proceso")]
    #[case(" 5 - Audit in process")]
    #[case("9 - fuera de rango")]
    #[case("12 - dos dígitos")]
    fn test_認識できないプレフィックスは明示的にエラーになる(#[case] text: &str) {
        assert!(matches!(
            Stage::decode(text),
            Err(DomainError::UnknownStage(_))
        ));
    }

    // ===== 言語判定 =====

    #[rstest]
    #[case("6 - Audit finalized", Language::En)]
    #[case("6 - Auditoría finalizada", Language::Es)]
    #[case("7 - Under CTC review", Language::En)]
    #[case("7 - En revisión CTC", Language::Es)]
    fn test_言語判定は正準名称との完全一致で行う(
        #[case] text: &str,
        #[case] expected: Language,
    ) {
        assert_eq!(Stage::language_of(text), expected);
    }

    #[test]
    fn test_言語判定は非正準ラベルをスペイン語にフォールバックする() {
        assert_eq!(Stage::language_of("6 - algo antiguo"), Language::Es);
        assert_eq!(Stage::language_of("sin dígito"), Language::Es);
    }

    // ===== estado バケット =====

    #[rstest]
    #[case(0, true, false, false)]
    #[case(1, true, false, false)]
    #[case(2, false, true, false)]
    #[case(5, false, true, false)]
    #[case(7, false, true, false)]
    #[case(8, false, false, true)]
    fn test_estadoバケットの境界(
        #[case] estado: i16,
        #[case] pending: bool,
        #[case] in_process: bool,
        #[case] completed: bool,
    ) {
        assert_eq!(Stage::estado_is_pending(estado), pending);
        assert_eq!(Stage::estado_is_in_process(estado), in_process);
        assert_eq!(Stage::estado_is_completed(estado), completed);
    }

    #[test]
    fn test_ステージ番号は0から8まで連続している() {
        let numbers: Vec<i16> = Stage::iter().map(Stage::number).collect();
        assert_eq!(numbers, (0..=8).collect::<Vec<i16>>());
    }

    #[test]
    fn test_languageのパースは不明な値をesにフォールバックする() {
        assert_eq!(Language::parse("en"), Language::En);
        assert_eq!(Language::parse("es"), Language::Es);
        assert_eq!(Language::parse("pt"), Language::Es);
    }
}
