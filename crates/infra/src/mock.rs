//! # テスト用モックリポジトリ
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! sellotur-infra = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! クエリモックはドメインの述語（[`ProcessListQuery::matches`] など）を
//! そのまま評価するため、SQL 描画と同じ結果になる。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use sellotur_domain::{
    block::{BlockParams, BlockResult},
    company::{Company, CompanyId},
    process::{CertificationProcess, ProcessId},
    query::{ProcessCounts, ProcessListQuery, ProcessListRow, ProcessView},
    questionnaire::Questionnaire,
    status::Language,
};

use crate::{
    db::{TransactionManager, TxContext},
    deletion::{
        CASCADE_ORDER, DeletionOutcome, DeletionStep, DependencyCounts, ProcessCascadeRepository,
    },
    error::InfraError,
    process_query::{ProcessPage, ProcessQueries},
    repository::{CompanyRepository, ProcessRepository, QuestionnaireRepository},
};

// ===== MockTransactionManager =====

/// モックのトランザクション管理
///
/// インメモリモックは実際のトランザクションを持たないため、
/// 常に [`TxContext::mock`] を返す。
#[derive(Clone, Default)]
pub struct MockTransactionManager;

impl MockTransactionManager {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionManager for MockTransactionManager {
    async fn begin(&self) -> Result<TxContext, InfraError> {
        Ok(TxContext::mock())
    }
}

// ===== MockProcessRepository =====

#[derive(Clone, Default)]
pub struct MockProcessRepository {
    processes: Arc<Mutex<Vec<CertificationProcess>>>,
}

impl MockProcessRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_process(&self, process: CertificationProcess) {
        self.processes.lock().unwrap().push(process);
    }

    /// プロセスを取り除く（カスケード削除モックが使用する）
    pub fn remove(&self, id: &ProcessId) -> bool {
        let mut processes = self.processes.lock().unwrap();
        let before = processes.len();
        processes.retain(|p| p.id() != id);
        processes.len() < before
    }
}

#[async_trait]
impl ProcessRepository for MockProcessRepository {
    async fn find_by_id(&self, id: &ProcessId) -> Result<Option<CertificationProcess>, InfraError> {
        Ok(self
            .processes
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn save_reapertura(
        &self,
        _tx: &mut TxContext,
        process: &CertificationProcess,
    ) -> Result<(), InfraError> {
        let mut processes = self.processes.lock().unwrap();
        if let Some(stored) = processes.iter_mut().find(|p| p.id() == process.id()) {
            *stored = process.clone();
        }
        Ok(())
    }
}

// ===== MockCompanyRepository =====

#[derive(Clone, Default)]
pub struct MockCompanyRepository {
    companies: Arc<Mutex<Vec<Company>>>,
}

impl MockCompanyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_company(&self, company: Company) {
        self.companies.lock().unwrap().push(company);
    }
}

#[async_trait]
impl CompanyRepository for MockCompanyRepository {
    async fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, InfraError> {
        Ok(self
            .companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }

    async fn save_estado(
        &self,
        _tx: &mut TxContext,
        company: &Company,
    ) -> Result<(), InfraError> {
        let mut companies = self.companies.lock().unwrap();
        if let Some(stored) = companies.iter_mut().find(|c| c.id() == company.id()) {
            *stored = company.clone();
        }
        Ok(())
    }
}

// ===== MockQuestionnaireRepository =====

#[derive(Clone, Default)]
pub struct MockQuestionnaireRepository {
    questionnaires: Arc<Mutex<Vec<Questionnaire>>>,
}

impl MockQuestionnaireRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_questionnaire(&self, questionnaire: Questionnaire) {
        self.questionnaires.lock().unwrap().push(questionnaire);
    }
}

#[async_trait]
impl QuestionnaireRepository for MockQuestionnaireRepository {
    async fn find_live_by_process(
        &self,
        process_id: &ProcessId,
    ) -> Result<Option<Questionnaire>, InfraError> {
        Ok(self
            .questionnaires
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.process_id() == process_id && !q.es_prueba())
            .cloned())
    }

    async fn save_reapertura_reset(
        &self,
        _tx: &mut TxContext,
        questionnaire: &Questionnaire,
    ) -> Result<(), InfraError> {
        let mut questionnaires = self.questionnaires.lock().unwrap();
        if let Some(stored) = questionnaires.iter_mut().find(|q| q.id() == questionnaire.id()) {
            *stored = questionnaire.clone();
        }
        Ok(())
    }
}

// ===== MockProcessQueries =====

/// 一覧クエリエンジンのインメモリ版
///
/// ドメインの述語をそのまま評価するため、SQL 描画実装と対象集合が一致する。
#[derive(Clone, Default)]
pub struct MockProcessQueries {
    rows: Arc<Mutex<Vec<ProcessListRow>>>,
}

impl MockProcessQueries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&self, row: ProcessListRow) {
        self.rows.lock().unwrap().push(row);
    }
}

#[async_trait]
impl ProcessQueries for MockProcessQueries {
    async fn fetch_block(
        &self,
        query: &ProcessListQuery,
        language: Language,
        params: BlockParams,
    ) -> Result<ProcessPage, InfraError> {
        let mut matched: Vec<ProcessListRow> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();
        // SQL 実装と同じ決定的順序
        matched.sort_by_key(|row| *row.process_id.as_uuid());

        let counts = ProcessCounts::tally(matched.iter().map(|row| row.company_estado));
        let views = matched
            .iter()
            .map(|row| {
                ProcessView::project(row, language)
                    .map_err(|error| InfraError::unexpected(error.to_string()))
            })
            .collect::<Result<Vec<_>, InfraError>>()?;

        Ok(ProcessPage {
            block: BlockResult::from_full_set(views, params),
            counts,
        })
    }
}

// ===== MockProcessCascade =====

/// カスケード削除のインメモリ版
///
/// all-or-nothing の性質をテストできるよう、指定ステップでの
/// 失敗注入（[`fail_during`](MockProcessCascade::fail_during)）に対応する。
/// 失敗時はプロセスも依存データも一切消えない。
#[derive(Clone)]
pub struct MockProcessCascade {
    process_repo: MockProcessRepository,
    counts:       Arc<Mutex<HashMap<ProcessId, DependencyCounts>>>,
    fail_during:  Arc<Mutex<Option<DeletionStep>>>,
    transient_failures: Arc<Mutex<u32>>,
}

impl MockProcessCascade {
    /// プロセスリポジトリを共有して作成する
    ///
    /// 削除成功時にプロセス本体も同じストアから消えるようにする。
    pub fn new(process_repo: MockProcessRepository) -> Self {
        Self {
            process_repo,
            counts: Arc::new(Mutex::new(HashMap::new())),
            fail_during: Arc::new(Mutex::new(None)),
            transient_failures: Arc::new(Mutex::new(0)),
        }
    }

    pub fn set_dependents(&self, process_id: ProcessId, counts: DependencyCounts) {
        self.counts.lock().unwrap().insert(process_id, counts);
    }

    /// 指定ステップで失敗させる（トランザクションロールバックの再現）
    pub fn fail_during(&self, step: DeletionStep) {
        *self.fail_during.lock().unwrap() = Some(step);
    }

    /// 次の 1 回だけ一時的障害で失敗させる（リトライ動作の検証用）
    pub fn fail_transient_once(&self) {
        *self.transient_failures.lock().unwrap() = 1;
    }
}

#[async_trait]
impl ProcessCascadeRepository for MockProcessCascade {
    async fn count_dependents(
        &self,
        process_id: &ProcessId,
    ) -> Result<DependencyCounts, InfraError> {
        Ok(self
            .counts
            .lock()
            .unwrap()
            .get(process_id)
            .copied()
            .unwrap_or_default())
    }

    async fn delete_cascade(&self, process_id: &ProcessId) -> Result<DeletionOutcome, InfraError> {
        {
            let mut remaining = self.transient_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(InfraError::from(sqlx::Error::PoolTimedOut));
            }
        }

        if let Some(step) = *self.fail_during.lock().unwrap() {
            // ロールバック相当: 状態には一切触れない
            return Err(InfraError::unexpected(format!(
                "simulated failure during {step}"
            )));
        }

        let dependents = self
            .counts
            .lock()
            .unwrap()
            .remove(process_id)
            .unwrap_or_default();
        let process_deleted = u64::from(self.process_repo.remove(process_id));

        let deleted_by_step = CASCADE_ORDER
            .into_iter()
            .map(|step| {
                let count = match step {
                    DeletionStep::Questionnaires => dependents.questionnaires as u64,
                    DeletionStep::Results => dependents.results as u64,
                    DeletionStep::Files => dependents.files as u64,
                    DeletionStep::Homologations => dependents.homologations as u64,
                    DeletionStep::Process => process_deleted,
                    // 項目レベルの内訳はモックでは追跡しない
                    DeletionStep::ItemObservations
                    | DeletionStep::ItemHistory
                    | DeletionStep::QuestionnaireItems => 0,
                };
                (step, count)
            })
            .collect();

        Ok(DeletionOutcome { deleted_by_step })
    }
}
