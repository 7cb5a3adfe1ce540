use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use cqrs_es::{
    persist::{PersistenceError, ViewContext, ViewRepository},
    Aggregate, EventEnvelope, View as CqrsView,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Wizard, AGGREGATE_TYPE};

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub aggregate_type: String,
    pub command_id: String,
    pub id: String,
    pub wizard: Wizard,
}

impl CqrsView<Wizard> for View {
    fn update(&mut self, event: &EventEnvelope<Wizard>) {
        self.id.clone_from(&event.aggregate_id);
        self.aggregate_type = AGGREGATE_TYPE.to_string();
        self.command_id = event
            .metadata
            .get("command_id")
            .cloned()
            .unwrap_or_default();
        self.wizard.apply(event.payload.clone());
    }
}

pub struct Query {
    repo: Arc<Box<dyn ViewRepository<View, Wizard>>>,
    // projections of one session must not interleave
    updating: Mutex<()>,
}

impl Query {
    pub fn new(repo: Arc<Box<dyn ViewRepository<View, Wizard>>>) -> Self {
        Self {
            repo,
            updating: Mutex::new(()),
        }
    }

    async fn update(
        &self,
        wizard_id: &str,
        events: &[EventEnvelope<Wizard>],
    ) -> Result<(), PersistenceError> {
        let _guard = self.updating.lock().await;

        let (mut view, view_context) = match self.repo.load_with_context(wizard_id).await? {
            None => {
                let view_context = ViewContext::new(wizard_id.to_string(), 0);
                (Default::default(), view_context)
            }
            Some((view, context)) => (view, context),
        };

        for event in events {
            view.update(event);
        }

        self.repo.update_view(view, view_context).await
    }
}

#[async_trait]
impl cqrs_es::Query<Wizard> for Query {
    async fn dispatch(&self, wizard_id: &str, events: &[EventEnvelope<Wizard>]) {
        if let Err(err) = self.update(wizard_id, events).await {
            tracing::error!("WizardQuery error for {}: {}", wizard_id, err);
        }
    }
}

/// Session views kept in process memory.
#[derive(Default)]
pub struct MemViewRepository {
    views: RwLock<HashMap<String, (View, i64)>>,
}

impl MemViewRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ViewRepository<View, Wizard> for MemViewRepository {
    async fn load(&self, view_id: &str) -> Result<Option<View>, PersistenceError> {
        Ok(self.load_with_context(view_id).await?.map(|(view, _)| view))
    }

    async fn load_with_context(
        &self,
        view_id: &str,
    ) -> Result<Option<(View, ViewContext)>, PersistenceError> {
        let views = self.views.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(views.get(view_id).map(|(view, version)| {
            (view.clone(), ViewContext::new(view_id.to_string(), *version))
        }))
    }

    async fn update_view(&self, view: View, context: ViewContext) -> Result<(), PersistenceError> {
        let mut views = self.views.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let current = views.get(&context.view_instance_id).map_or(0, |(_, v)| *v);
        if current != context.version {
            return Err(PersistenceError::OptimisticLockError);
        }
        views.insert(context.view_instance_id, (view, context.version + 1));
        Ok(())
    }
}
