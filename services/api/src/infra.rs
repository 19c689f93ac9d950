use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use agrilend::workflows::lending::signals::simulated::{
    SimulatedAlternativeDataProvider, SimulatedMarketProvider, SimulatedSatelliteProvider,
    SimulatedWeatherProvider,
};
use agrilend::workflows::lending::{
    AssessmentRepository, FarmerId, FarmerProfile, FarmerRepository, LoanApplication, LoanId,
    LoanRepository, LoanStatus, RepositoryError, RiskAssessment, SignalHub,
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Signal hub backed by the simulated providers shipped with the core crate.
pub(crate) fn simulated_signal_hub() -> SignalHub {
    SignalHub::new(
        Arc::new(SimulatedWeatherProvider),
        Arc::new(SimulatedSatelliteProvider),
        Arc::new(SimulatedMarketProvider),
        Arc::new(SimulatedAlternativeDataProvider),
    )
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFarmerRepository {
    records: Arc<Mutex<HashMap<FarmerId, FarmerProfile>>>,
}

impl FarmerRepository for InMemoryFarmerRepository {
    fn insert(&self, farmer: FarmerProfile) -> Result<FarmerProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&farmer.farmer_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(farmer.farmer_id.clone(), farmer.clone());
        Ok(farmer)
    }

    fn update(&self, farmer: FarmerProfile) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&farmer.farmer_id) {
            guard.insert(farmer.farmer_id.clone(), farmer);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &FarmerId) -> Result<Option<FarmerProfile>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanRepository {
    records: Arc<Mutex<HashMap<LoanId, LoanApplication>>>,
}

impl LoanRepository for InMemoryLoanRepository {
    fn insert(&self, loan: LoanApplication) -> Result<LoanApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&loan.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(loan.loan_id.clone(), loan.clone());
        Ok(loan)
    }

    fn update(&self, loan: LoanApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&loan.loan_id) {
            guard.insert(loan.loan_id.clone(), loan);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn in_status(&self, statuses: &[LoanStatus]) -> Result<Vec<LoanApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|loan| statuses.contains(&loan.status))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAssessmentStore {
    records: Arc<Mutex<Vec<RiskAssessment>>>,
}

impl AssessmentRepository for InMemoryAssessmentStore {
    fn append(&self, assessment: RiskAssessment) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("assessment mutex poisoned");
        guard.push(assessment);
        Ok(())
    }

    fn latest_for(&self, farmer_id: &FarmerId) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .rev()
            .find(|assessment| &assessment.farmer_id == farmer_id)
            .cloned())
    }

    fn triggered_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<RiskAssessment>, RepositoryError> {
        let guard = self.records.lock().expect("assessment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|assessment| {
                assessment.assessed_at > since && !assessment.insurance_triggers.is_empty()
            })
            .cloned()
            .collect())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
