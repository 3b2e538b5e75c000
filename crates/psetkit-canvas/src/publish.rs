//! Replacing an assignment description with a generated page.

use anyhow::{Context, Result};

use crate::assignment::AssignmentRef;
use crate::body::extract_body;
use crate::traits::AssignmentStore;

/// What an upload did (or would have done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub assignment_name: String,
    /// Only the `<body>` contents were sent.
    pub used_body: bool,
    /// Characters in the description sent (or that would be sent).
    pub chars: usize,
    /// Description length reported back by the store; `None` on a dry run.
    pub updated_length: Option<usize>,
}

/// Replace the description of `target` with `html`.
///
/// The assignment is always fetched first so a bad URL or token fails before
/// anything is changed. With `dry_run` nothing is written.
pub async fn publish(
    store: &dyn AssignmentStore,
    target: &AssignmentRef,
    html: &str,
    dry_run: bool,
) -> Result<PublishOutcome> {
    let (description, used_body) = extract_body(html);

    let assignment = store
        .fetch_assignment(target)
        .await
        .with_context(|| format!("failed to fetch {target}"))?;
    let assignment_name = assignment.display_name().to_string();
    let chars = description.chars().count();
    tracing::info!(
        store = store.name(),
        used_body,
        chars,
        "assignment: {assignment_name}"
    );

    if dry_run {
        tracing::info!("dry run: not updating {target}");
        return Ok(PublishOutcome {
            assignment_name,
            used_body,
            chars,
            updated_length: None,
        });
    }

    let updated = store
        .update_description(target, description)
        .await
        .with_context(|| format!("failed to update {target}"))?;

    Ok(PublishOutcome {
        assignment_name,
        used_body,
        chars,
        updated_length: Some(
            updated
                .description
                .as_deref()
                .map_or(0, |d| d.chars().count()),
        ),
    })
}
