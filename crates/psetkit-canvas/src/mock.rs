//! In-memory assignment store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use psetkit_core::Assignment;

use crate::assignment::AssignmentRef;
use crate::error::CanvasError;
use crate::traits::AssignmentStore;

/// An assignment store that keeps assignments in memory, keyed by
/// assignment id, so uploads can be exercised without a Canvas instance.
#[derive(Default)]
pub struct MockStore {
    assignments: Mutex<HashMap<String, Assignment>>,
    fetch_count: AtomicU32,
    update_count: AtomicU32,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment with the given id and name.
    pub fn with_assignment(self, assignment_id: &str, name: &str) -> Self {
        self.lock().insert(
            assignment_id.to_string(),
            Assignment {
                id: assignment_id.parse().ok(),
                name: Some(name.to_string()),
                description: None,
            },
        );
        self
    }

    /// The stored assignment, if any.
    pub fn assignment(&self, assignment_id: &str) -> Option<Assignment> {
        self.lock().get(assignment_id).cloned()
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    pub fn update_count(&self) -> u32 {
        self.update_count.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Assignment>> {
        self.assignments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AssignmentStore for MockStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_assignment(&self, target: &AssignmentRef) -> anyhow::Result<Assignment> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.assignment(&target.assignment_id)
            .ok_or_else(|| CanvasError::NotFound(target.to_string()).into())
    }

    async fn update_description(
        &self,
        target: &AssignmentRef,
        html: &str,
    ) -> anyhow::Result<Assignment> {
        self.update_count.fetch_add(1, Ordering::Relaxed);
        let mut assignments = self.lock();
        let assignment = assignments
            .get_mut(&target.assignment_id)
            .ok_or_else(|| CanvasError::NotFound(target.to_string()))?;
        assignment.description = Some(html.to_string());
        Ok(assignment.clone())
    }
}
