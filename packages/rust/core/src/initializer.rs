//! Seeding a step's workspace from the step before it.
//!
//! When `step<N>` is first visited, every regular file of `step<N-1>` that the
//! new step does not have yet is copied across, except protected files (test
//! definitions and READMEs by default). Running it again copies nothing.

use std::path::Path;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use steplab_shared::{ContentLayout, Result, Step, StepLabError};

use crate::files;

/// Why a file of the previous step was not copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Name matches the protected pattern.
    Protected,
    /// The target step already has an entry with this name.
    AlreadyPresent,
    /// Sub-directories and other non-regular entries are not inherited.
    NotAFile,
}

/// Result of [`StepInitializer::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InitOutcome {
    /// The previous step was walked; `copied` lists the new files.
    Populated {
        copied: Vec<String>,
        skipped: Vec<(String, SkipReason)>,
    },
    /// The previous step exists but holds no entries at all.
    EmptyPrevious,
    /// There is no previous step to inherit from.
    NoPrevious,
}

impl InitOutcome {
    /// Turn `EmptyPrevious` into [`StepLabError::EmptyPreviousStep`].
    pub fn into_result(self, step: Step) -> Result<Self> {
        match self {
            Self::EmptyPrevious => Err(StepLabError::EmptyPreviousStep {
                step: step
                    .previous()
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
            }),
            other => Ok(other),
        }
    }
}

/// Copies files forward from `step<N-1>` into `step<N>`.
#[derive(Debug, Clone)]
pub struct StepInitializer {
    layout: ContentLayout,
    protected: Regex,
}

impl StepInitializer {
    /// Fails with a config error if the protected pattern is not a valid regex.
    pub fn new(layout: ContentLayout) -> Result<Self> {
        let protected = Regex::new(&layout.protected_pattern).map_err(|e| {
            StepLabError::config(format!(
                "invalid protected_pattern {:?}: {e}",
                layout.protected_pattern
            ))
        })?;
        Ok(Self { layout, protected })
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.is_match(name)
    }

    /// Populate `step` from its predecessor.
    ///
    /// The target directory must already exist; it is never created here.
    /// Existing files in the target are never overwritten.
    #[instrument(skip_all, fields(step = %step))]
    pub async fn initialize(&self, step: Step) -> Result<InitOutcome> {
        let Some(prev) = step.previous() else {
            debug!("first step, nothing to inherit");
            return Ok(InitOutcome::NoPrevious);
        };

        let prev_dir = self.layout.step_dir(prev);
        if !files::is_dir(&prev_dir).await? {
            debug!(prev = %prev, "previous step does not exist");
            return Ok(InitOutcome::NoPrevious);
        }

        let target_dir = self.layout.step_dir(step);
        if !files::is_dir(&target_dir).await? {
            return Err(StepLabError::not_found(format!(
                "step directory {}",
                target_dir.display()
            )));
        }

        let mut entries = tokio::fs::read_dir(&prev_dir)
            .await
            .map_err(|e| StepLabError::io(&prev_dir, e))?;

        let mut copied = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = 0usize;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StepLabError::io(&prev_dir, e))?
        {
            seen += 1;

            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %entry.path().display(), "skipping non UTF-8 file name");
                continue;
            };

            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StepLabError::io(entry.path(), e))?;

            if !file_type.is_file() {
                skipped.push((name, SkipReason::NotAFile));
            } else if self.is_protected(&name) {
                skipped.push((name, SkipReason::Protected));
            } else if files::exists(&target_dir.join(&name)).await? {
                skipped.push((name, SkipReason::AlreadyPresent));
            } else if copy_file(&entry.path(), &target_dir, &name).await? {
                debug!(file = %name, "copied from previous step");
                copied.push(name);
            } else {
                debug!(file = %name, "appeared while copying");
                skipped.push((name, SkipReason::AlreadyPresent));
            }
        }

        if seen == 0 {
            warn!(prev = %prev, "previous step is empty");
            return Ok(InitOutcome::EmptyPrevious);
        }

        copied.sort();
        skipped.sort();

        info!(
            from = %prev,
            copied = copied.len(),
            skipped = skipped.len(),
            "step initialized"
        );

        Ok(InitOutcome::Populated { copied, skipped })
    }
}

/// Copy `src` to `dir/name` through a uniquely named hidden temp file, then
/// hard-link it into place so the target name only ever refers to a complete
/// copy and is never replaced.
///
/// Returns `false` when `dir/name` appeared in the meantime, e.g. from a
/// concurrent initialization of the same step.
async fn copy_file(src: &Path, dir: &Path, name: &str) -> Result<bool> {
    let temp = dir.join(format!(".{name}.{}.tmp", Uuid::now_v7()));
    let target = dir.join(name);

    if let Err(e) = tokio::fs::copy(src, &temp).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(StepLabError::io(src, e));
    }

    let linked = tokio::fs::hard_link(&temp, &target).await;
    let _ = tokio::fs::remove_file(&temp).await;

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(StepLabError::io(&target, e)),
    }
}
