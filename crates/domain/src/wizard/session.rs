use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use tokio::{sync::Mutex, task::JoinHandle};
use ulid::Ulid;

use crate::{
    errors::Error,
    estimates::{EstimateProvider, EstimateRequest, Package},
};

use super::{
    cqrs::{self, WizardCqrs, WizardViewRepository},
    Command, DeliverySummary, View, AGGREGATE_TYPE,
};

/// Outcome of a command.
#[derive(Debug)]
pub enum Dispatch {
    Applied(View),
    /// Item collection finished; estimates are being calculated.
    Calculating { view: View, pending: PendingEstimate },
}

impl Dispatch {
    pub fn view(&self) -> &View {
        match self {
            Dispatch::Applied(view) | Dispatch::Calculating { view, .. } => view,
        }
    }

    pub fn into_view(self) -> View {
        match self {
            Dispatch::Applied(view) | Dispatch::Calculating { view, .. } => view,
        }
    }

    pub fn into_pending(self) -> Option<PendingEstimate> {
        match self {
            Dispatch::Applied(_) => None,
            Dispatch::Calculating { pending, .. } => Some(pending),
        }
    }
}

/// Handle on a background estimate calculation.
#[derive(Debug)]
pub struct PendingEstimate {
    pub generation: u64,
    handle: JoinHandle<Result<View, Error>>,
}

impl PendingEstimate {
    /// Session view once the result has been applied, or ignored because
    /// the session moved on in the meantime.
    pub async fn wait(self) -> Result<View, Error> {
        self.handle.await.map_err(|e| Error::Calculation {
            message: e.to_string(),
        })?
    }
}

/// Runs wizard sessions: one command at a time per session, estimate
/// calculations in the background.
#[derive(Clone)]
pub struct WizardService {
    cqrs: WizardCqrs,
    repo: WizardViewRepository,
    estimator: Arc<dyn EstimateProvider>,
    locks: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl WizardService {
    pub fn new(estimator: Arc<dyn EstimateProvider>) -> Self {
        let repo = cqrs::init_repo();
        let cqrs = cqrs::init(repo.clone());

        Self {
            cqrs,
            repo,
            estimator,
            locks: Arc::default(),
        }
    }

    pub async fn start(&self) -> Result<View, Error> {
        let id = Ulid::new().to_string();
        self.apply(&id, Command::StartSession { id: id.clone() })
            .await
    }

    pub async fn load(&self, wizard_id: &str) -> Result<View, Error> {
        self.repo
            .load(wizard_id)
            .await
            .map_err(|e| Error::Store {
                message: e.to_string(),
            })?
            .ok_or_else(|| Error::NotFound {
                entity: AGGREGATE_TYPE.to_string(),
            })
    }

    pub async fn summary(&self, wizard_id: &str) -> Result<DeliverySummary, Error> {
        let view = self.load(wizard_id).await?;
        DeliverySummary::from_state(&view.wizard.state)
    }

    pub async fn execute(&self, wizard_id: &str, command: Command) -> Result<Dispatch, Error> {
        let may_request = command.may_request_estimates();
        let view = self.apply(wizard_id, command).await?;

        let generation = match view.wizard.pending_estimate {
            Some(generation) if may_request => generation,
            _ => return Ok(Dispatch::Applied(view)),
        };

        let destination = view
            .wizard
            .state
            .address
            .clone()
            .ok_or_else(|| Error::NotFound {
                entity: "address".to_string(),
            })?;
        let request = EstimateRequest::new(Package::from_state(&view.wizard.state), destination);

        tracing::info!(
            "Calculating delivery estimates for {} (generation {})",
            wizard_id,
            generation
        );

        let service = self.clone();
        let id = wizard_id.to_string();
        let handle = tokio::spawn(async move {
            let estimates = service.estimator.estimate(&request).await;
            service
                .apply(
                    &id,
                    Command::ResolveEstimates {
                        generation,
                        estimates,
                    },
                )
                .await
        });

        Ok(Dispatch::Calculating {
            view,
            pending: PendingEstimate { generation, handle },
        })
    }

    async fn apply(&self, wizard_id: &str, command: Command) -> Result<View, Error> {
        let lock = self.session_lock(wizard_id);
        let result = {
            let _guard = lock.lock().await;
            self.apply_locked(wizard_id, command).await
        };
        drop(lock);
        self.release_lock(wizard_id);
        result
    }

    async fn apply_locked(&self, wizard_id: &str, command: Command) -> Result<View, Error> {
        tracing::info!("Executing {} for {}", command.name(), wizard_id);

        let mut metadata = HashMap::new();
        metadata.insert("command_id".to_string(), Ulid::new().to_string());

        if let Err(e) = self
            .cqrs
            .execute_with_metadata(wizard_id, command, metadata)
            .await
        {
            let err = Error::from(e);
            tracing::warn!("Rejected command for {}: {}", wizard_id, err);
            return Err(err);
        }

        self.load(wizard_id).await
    }

    fn session_lock(&self, wizard_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(wizard_id.to_string()).or_default().clone()
    }

    /// Forgets the session's lock once no caller holds or waits on it.
    fn release_lock(&self, wizard_id: &str) {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if locks
            .get(wizard_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(wizard_id);
        }
    }
}
