#![allow(dead_code)]

//! Shared test utilities for progression integration tests

use std::sync::{Arc, Mutex};

use questfolio::progression::{
    Achievement, Catalog, EvaluationMode, LevelCurve, ProgressionState, ProgressionStore,
    Subscription,
};

/// Collects every snapshot delivered to a listener
#[derive(Clone, Default)]
pub struct Recorder {
    snapshots: Arc<Mutex<Vec<ProgressionState>>>,
}

impl Recorder {
    pub fn attach(&self, store: &ProgressionStore) -> Subscription {
        let snapshots = Arc::clone(&self.snapshots);
        store.subscribe(move |state| {
            snapshots.lock().unwrap().push(state.clone());
        })
    }

    pub fn count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn snapshots(&self) -> Vec<ProgressionState> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<ProgressionState> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

/// Store with the default curve over the given achievements
pub fn store_with(achievements: Vec<Achievement>) -> ProgressionStore {
    let catalog = Catalog::new(achievements).expect("valid test catalog");
    ProgressionStore::new(catalog, LevelCurve::default(), EvaluationMode::SinglePass)
}

/// Store without any achievements, for pure leveling checks
pub fn bare_store() -> ProgressionStore {
    store_with(Vec::new())
}
