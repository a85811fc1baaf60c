//! Discovery of the steps present under the content root.

use tracing::debug;

use steplab_shared::{ContentLayout, Result, Step, StepLabError};

/// Every `step<N>` directory under the content root, in numeric order.
pub async fn list_steps(layout: &ContentLayout) -> Result<Vec<Step>> {
    let root = &layout.root;
    let mut entries = tokio::fs::read_dir(root)
        .await
        .map_err(|e| StepLabError::io(root, e))?;

    let mut steps = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StepLabError::io(root, e))?
    {
        let Some(step) = entry.file_name().to_str().and_then(|n| Step::parse(n).ok()) else {
            continue;
        };
        let is_dir = entry
            .file_type()
            .await
            .map_err(|e| StepLabError::io(entry.path(), e))?
            .is_dir();
        if is_dir {
            steps.push(step);
        }
    }

    steps.sort();
    debug!(count = steps.len(), "listed steps");
    Ok(steps)
}
