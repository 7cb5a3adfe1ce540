use std::sync::Arc;

use cqrs_es::{mem_store::MemStore, persist::ViewRepository, CqrsFramework};

use super::{MemViewRepository, Query, Services, View, Wizard};

pub type WizardCqrs = Arc<CqrsFramework<Wizard, MemStore<Wizard>>>;

pub type WizardViewRepository = Arc<Box<dyn ViewRepository<View, Wizard>>>;

pub fn init(repo: WizardViewRepository) -> WizardCqrs {
    let store = MemStore::<Wizard>::default();

    let query: Box<dyn cqrs_es::Query<Wizard>> = Box::new(Query::new(repo));

    Arc::new(CqrsFramework::new(store, vec![query], Services::default()))
}

pub fn init_repo() -> WizardViewRepository {
    Arc::new(Box::new(MemViewRepository::new()))
}
