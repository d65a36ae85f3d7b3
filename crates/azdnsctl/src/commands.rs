//! Subcommand handlers
//!
//! Each handler runs exactly one reconciler operation and persists the
//! resulting state.

use crate::state_file;
use anyhow::{Context, Result};
use azdns_core::{AaaaRecordReconciler, AaaaRecordState, ApplyOptions};
use std::path::Path;
use tracing::{info, warn};

/// Create the record set if the state has no ID yet, otherwise update it
pub async fn apply(
    reconciler: &AaaaRecordReconciler,
    path: &Path,
    import_guard: bool,
) -> Result<()> {
    let mut state = state_file::load(path).await?;
    let previous_id = state.id.clone();

    let options = if previous_id.is_none() {
        ApplyOptions::create(import_guard)
    } else {
        ApplyOptions::update()
    };

    if let Err(e) = reconciler.create_or_update(&mut state, options).await {
        // Keep track of a record set that was created before the failure
        if state.id.is_some() && state.id != previous_id {
            state_file::save(path, &state).await?;
        }
        return Err(e).with_context(|| format!("Failed to apply {}", path.display()));
    }

    state_file::save(path, &state).await?;
    info!("Applied {}", describe(&state));
    Ok(())
}

/// Refresh the state from the remote record set
pub async fn read(reconciler: &AaaaRecordReconciler, path: &Path) -> Result<()> {
    let mut state = state_file::load(path).await?;

    reconciler
        .read(&mut state)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if state.id.is_none() {
        warn!(
            "{} no longer exists remotely; removed its ID from {}",
            describe(&state),
            path.display()
        );
    } else {
        info!("Refreshed {}", describe(&state));
    }

    state_file::save(path, &state).await
}

/// Delete the remote record set and clear the ID in the state
pub async fn delete(reconciler: &AaaaRecordReconciler, path: &Path) -> Result<()> {
    let mut state = state_file::load(path).await?;

    reconciler
        .delete(&mut state)
        .await
        .with_context(|| format!("Failed to delete {}", path.display()))?;

    state_file::save(path, &state).await?;
    info!("Deleted {}", describe(&state));
    Ok(())
}

/// Adopt an existing record set by ID
///
/// The state is written to `out` when given, otherwise printed to stdout.
pub async fn import(reconciler: &AaaaRecordReconciler, id: &str, out: Option<&Path>) -> Result<()> {
    let state = reconciler
        .import(id)
        .await
        .with_context(|| format!("Failed to import {}", id))?;

    match out {
        Some(path) => {
            state_file::save(path, &state).await?;
            info!("Imported {} into {}", describe(&state), path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&state).context("Failed to serialize state")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn describe(state: &AaaaRecordState) -> String {
    format!(
        "DNS AAAA record {:?} (zone {:?} / resource group {:?})",
        state.name, state.zone_name, state.resource_group_name
    )
}
