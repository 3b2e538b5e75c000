//! The assignment store seam.

use async_trait::async_trait;

use psetkit_core::Assignment;

use crate::assignment::AssignmentRef;

/// Something that holds assignments whose description can be replaced.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Human-readable store name (e.g. "canvas").
    fn name(&self) -> &str;

    /// Fetch the current assignment.
    async fn fetch_assignment(&self, target: &AssignmentRef) -> anyhow::Result<Assignment>;

    /// Replace the assignment description with `html`, returning the
    /// assignment as stored afterwards.
    async fn update_description(
        &self,
        target: &AssignmentRef,
        html: &str,
    ) -> anyhow::Result<Assignment>;
}
