//! # 認証プロセス
//!
//! 会社がディスティンティーボ（認証シール）取得に向けて進む
//! アドバイザリー → 監査 → 委員会審査のライフサイクルを表すエンティティ。
//!
//! ## ステータスの扱い
//!
//! ステータスは互換性制約によりテキスト（`"<数字> - <名称>"`）のまま保持する。
//! 数値ステージが必要な場合は必ず [`Stage::decode`] 経由で導出し、
//! 冗長に保存してドリフトさせない。

use chrono::{DateTime, Utc};

use crate::{
    company::CompanyId,
    error::DomainError,
    status::{Language, Stage},
    user::UserId,
};

define_uuid_id! {
    /// 認証プロセス ID
    pub struct ProcessId;
}

define_uuid_id! {
    /// 認証結果 ID
    pub struct ResultId;
}

/// 認証プロセスエンティティ
///
/// # 不変条件
///
/// - 必ず 1 つの会社に属する（プロセス削除で会社は消えない）
/// - ステージ遷移はレアペルトゥーラを除き単調に進む
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificationProcess {
    id:                 ProcessId,
    company_id:         CompanyId,
    advisor_id:         Option<UserId>,
    auditor_id:         Option<UserId>,
    /// 整理番号（エクスペディエンテ）
    expediente:         i64,
    /// 保存形式のステータステキスト
    status:             String,
    fecha_inicio:       Option<DateTime<Utc>>,
    fecha_finalizacion: Option<DateTime<Utc>>,
    fecha_solicitud_auditoria: Option<DateTime<Utc>>,
    fecha_auditoria_programada: Option<DateTime<Utc>>,
    fecha_vencimiento:  Option<DateTime<Utc>>,
    es_recertificacion: bool,
}

impl CertificationProcess {
    /// 既存のデータからプロセスを復元する（データベースから取得時）
    #[allow(clippy::too_many_arguments)]
    pub fn from_db(
        id: ProcessId,
        company_id: CompanyId,
        advisor_id: Option<UserId>,
        auditor_id: Option<UserId>,
        expediente: i64,
        status: String,
        fecha_inicio: Option<DateTime<Utc>>,
        fecha_finalizacion: Option<DateTime<Utc>>,
        fecha_solicitud_auditoria: Option<DateTime<Utc>>,
        fecha_auditoria_programada: Option<DateTime<Utc>>,
        fecha_vencimiento: Option<DateTime<Utc>>,
        es_recertificacion: bool,
    ) -> Self {
        Self {
            id,
            company_id,
            advisor_id,
            auditor_id,
            expediente,
            status,
            fecha_inicio,
            fecha_finalizacion,
            fecha_solicitud_auditoria,
            fecha_auditoria_programada,
            fecha_vencimiento,
            es_recertificacion,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn advisor_id(&self) -> Option<&UserId> {
        self.advisor_id.as_ref()
    }

    pub fn auditor_id(&self) -> Option<&UserId> {
        self.auditor_id.as_ref()
    }

    pub fn expediente(&self) -> i64 {
        self.expediente
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn fecha_inicio(&self) -> Option<DateTime<Utc>> {
        self.fecha_inicio
    }

    pub fn fecha_finalizacion(&self) -> Option<DateTime<Utc>> {
        self.fecha_finalizacion
    }

    pub fn fecha_solicitud_auditoria(&self) -> Option<DateTime<Utc>> {
        self.fecha_solicitud_auditoria
    }

    pub fn fecha_auditoria_programada(&self) -> Option<DateTime<Utc>> {
        self.fecha_auditoria_programada
    }

    pub fn fecha_vencimiento(&self) -> Option<DateTime<Utc>> {
        self.fecha_vencimiento
    }

    pub fn es_recertificacion(&self) -> bool {
        self.es_recertificacion
    }

    /// ステータステキストから数値ステージを導出する
    pub fn stage(&self) -> Result<Stage, DomainError> {
        Stage::decode(&self.status)
    }

    /// ステータステキストの言語を判定する
    pub fn status_language(&self) -> Language {
        Stage::language_of(&self.status)
    }

    // ===== レアペルトゥーラ（監査進行中への巻き戻し） =====

    /// レアペルトゥーラ可能な状態か
    ///
    /// ステージ 6（監査完了）または 7（CTC 審査中）のみ巻き戻せる。
    /// ステータスが復号できない場合も不可として扱う。
    pub fn eligible_for_reapertura(&self) -> bool {
        matches!(
            self.stage(),
            Ok(Stage::AuditingFinalized | Stage::UnderCtcReview)
        )
    }

    /// レアペルトゥーラ後のステータステキスト
    ///
    /// 巻き戻し先はステージ 5（監査進行中）。エンコード言語は
    /// 巻き戻し前のステータスと同じ言語を維持する
    /// （ステージ 6/7 は es / en どちらかの形で保存されている）。
    pub fn reapertura_status(&self) -> Option<String> {
        self.eligible_for_reapertura()
            .then(|| Stage::AuditingInProcess.encode(self.status_language()))
    }

    /// レアペルトゥーラを適用した状態を返す
    ///
    /// ステータスをステージ 5 に戻し、終了日をクリアする。
    /// 対象外の状態では `None`（呼び出し元は不在と同一に扱う）。
    pub fn reopened(self) -> Option<Self> {
        let status = self.reapertura_status()?;
        Some(Self {
            status,
            fecha_finalizacion: None,
            ..self
        })
    }
}

/// 認証結果（プロセスごとに 0..n、承認時はディスティンティーボを持つ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    id:             ResultId,
    process_id:     ProcessId,
    /// 授与されたディスティンティーボ（シール）のカタログコード
    distinction_id: Option<i32>,
    aprobado:       bool,
    created_at:     DateTime<Utc>,
}

impl ProcessResult {
    pub fn from_db(
        id: ResultId,
        process_id: ProcessId,
        distinction_id: Option<i32>,
        aprobado: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            process_id,
            distinction_id,
            aprobado,
            created_at,
        }
    }

    pub fn id(&self) -> &ResultId {
        &self.id
    }

    pub fn process_id(&self) -> &ProcessId {
        &self.process_id
    }

    pub fn distinction_id(&self) -> Option<i32> {
        self.distinction_id
    }

    pub fn aprobado(&self) -> bool {
        self.aprobado
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn process_with_status(status: &str) -> CertificationProcess {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        CertificationProcess::from_db(
            ProcessId::new(),
            CompanyId::new(),
            Some(UserId::new()),
            Some(UserId::new()),
            42,
            status.to_string(),
            Some(now),
            Some(now),
            None,
            None,
            None,
            false,
        )
    }

    #[rstest]
    #[case("6 - Auditoría finalizada", "5 - Auditoría en proceso")]
    #[case("6 - Audit finalized", "5 - Audit in process")]
    #[case("7 - En revisión CTC", "5 - Auditoría en proceso")]
    #[case("7 - Under CTC review", "5 - Audit in process")]
    fn test_レアペルトゥーラは前のステータスと同じ言語でステージ5に戻す(
        #[case] before: &str,
        #[case] expected: &str,
    ) {
        let process = process_with_status(before);

        let reopened = process.reopened().unwrap();

        assert_eq!(reopened.status(), expected);
        assert_eq!(reopened.fecha_finalizacion(), None);
    }

    #[rstest]
    #[case("1 - Por asesorar")]
    #[case("5 - Auditoría en proceso")]
    #[case("8 - Finalizado")]
    #[case("estado corrupto")]
    fn test_ステージ6と7以外はレアペルトゥーラ対象外(#[case] status: &str) {
        let process = process_with_status(status);

        assert!(!process.eligible_for_reapertura());
        assert!(process.reopened().is_none());
    }

    #[test]
    fn test_ステージはステータステキストから毎回導出される() {
        let process = process_with_status("6 - Auditoría finalizada");
        assert_eq!(process.stage().unwrap(), Stage::AuditingFinalized);
    }
}
