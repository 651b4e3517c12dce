//! # 認証プロセスユースケース
//!
//! 認証プロセスの一覧取得・レアペルトゥーラ・削除のビジネスロジック。
//!
//! ## モジュール構成
//!
//! - `list`: ロールスコープ付き一覧とページング
//! - `reapertura`: 監査進行中への巻き戻し
//! - `deletion`: 依存データ確認とカスケード削除

mod deletion;
mod list;
mod reapertura;

use std::sync::Arc;

pub use deletion::DeletionInspection;
pub use list::ListProcessesInput;
pub use reapertura::ReaperturaOutcome;
use sellotur_infra::{
    db::TransactionManager,
    deletion::ProcessCascadeRepository,
    process_query::ProcessQueries,
    repository::{CompanyRepository, ProcessRepository, QuestionnaireRepository},
};

/// 認証プロセスユースケース実装
pub struct ProcessUseCaseImpl {
    process_repo:       Arc<dyn ProcessRepository>,
    company_repo:       Arc<dyn CompanyRepository>,
    questionnaire_repo: Arc<dyn QuestionnaireRepository>,
    queries:            Arc<dyn ProcessQueries>,
    cascade:            Arc<dyn ProcessCascadeRepository>,
    tx_manager:         Arc<dyn TransactionManager>,
}

impl ProcessUseCaseImpl {
    pub fn new(
        process_repo: Arc<dyn ProcessRepository>,
        company_repo: Arc<dyn CompanyRepository>,
        questionnaire_repo: Arc<dyn QuestionnaireRepository>,
        queries: Arc<dyn ProcessQueries>,
        cascade: Arc<dyn ProcessCascadeRepository>,
        tx_manager: Arc<dyn TransactionManager>,
    ) -> Self {
        Self {
            process_repo,
            company_repo,
            questionnaire_repo,
            queries,
            cascade,
            tx_manager,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    //! プロセスユースケーステストの共通フィクスチャ

    use chrono::{DateTime, Utc};
    use sellotur_domain::{
        company::{Company, CompanyId},
        process::{CertificationProcess, ProcessId},
        query::{ProcessListRow, TypologyRef},
        questionnaire::{Questionnaire, QuestionnaireId},
        user::UserId,
    };
    use sellotur_infra::mock::{
        MockCompanyRepository, MockProcessCascade, MockProcessQueries, MockProcessRepository,
        MockQuestionnaireRepository, MockTransactionManager,
    };
    use std::sync::Arc;

    use super::ProcessUseCaseImpl;

    pub(crate) fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    /// ユースケースとモック一式
    pub(crate) struct Deps {
        pub usecase:            ProcessUseCaseImpl,
        pub process_repo:       MockProcessRepository,
        pub company_repo:       MockCompanyRepository,
        pub questionnaire_repo: MockQuestionnaireRepository,
        pub queries:            MockProcessQueries,
        pub cascade:            MockProcessCascade,
    }

    pub(crate) fn deps() -> Deps {
        let process_repo = MockProcessRepository::new();
        let company_repo = MockCompanyRepository::new();
        let questionnaire_repo = MockQuestionnaireRepository::new();
        let queries = MockProcessQueries::new();
        let cascade = MockProcessCascade::new(process_repo.clone());

        let usecase = ProcessUseCaseImpl::new(
            Arc::new(process_repo.clone()),
            Arc::new(company_repo.clone()),
            Arc::new(questionnaire_repo.clone()),
            Arc::new(queries.clone()),
            Arc::new(cascade.clone()),
            Arc::new(MockTransactionManager::new()),
        );

        Deps {
            usecase,
            process_repo,
            company_repo,
            questionnaire_repo,
            queries,
            cascade,
        }
    }

    pub(crate) fn company(country_id: i32, estado: i16) -> Company {
        Company::from_db(
            CompanyId::new(),
            country_id,
            "Hotel Mirador del Valle".to_string(),
            estado,
            false,
            vec![1],
            fixed_now(),
            fixed_now(),
        )
    }

    pub(crate) fn process(company_id: CompanyId, status: &str) -> CertificationProcess {
        CertificationProcess::from_db(
            ProcessId::new(),
            company_id,
            Some(UserId::new()),
            Some(UserId::new()),
            42,
            status.to_string(),
            Some(fixed_now()),
            None,
            None,
            None,
            None,
            false,
        )
    }

    pub(crate) fn questionnaire(process_id: ProcessId) -> Questionnaire {
        Questionnaire::from_db(
            QuestionnaireId::new(),
            process_id,
            2,
            Some(fixed_now()),
            Some(fixed_now()),
            Some(UserId::new()),
            false,
        )
    }

    /// 一覧クエリ用の平坦行
    pub(crate) fn list_row(
        country_id: i32,
        estado: i16,
        advisor_id: Option<UserId>,
        auditor_id: Option<UserId>,
    ) -> ProcessListRow {
        ProcessListRow {
            process_id: ProcessId::new(),
            company_id: CompanyId::new(),
            company_name: "Posada del Río".to_string(),
            company_estado: estado,
            es_homologacion: false,
            country_id,
            country_name: "Costa Rica".to_string(),
            typologies: vec![TypologyRef {
                id:      1,
                name_es: "Alojamiento".to_string(),
                name_en: "Lodging".to_string(),
            }],
            advisor_id,
            advisor_name: advisor_id.map(|_| "Ana Pérez".to_string()),
            auditor_id,
            auditor_name: auditor_id.map(|_| "Luis Mora".to_string()),
            expediente: 7,
            status: "5 - Auditoría en proceso".to_string(),
            fecha_inicio: Some(fixed_now()),
            fecha_finalizacion: None,
            fecha_vencimiento: None,
            es_recertificacion: false,
            latest_distinction_id: None,
            approved_distinction_ids: vec![],
            questionnaire_review_date: None,
        }
    }
}
