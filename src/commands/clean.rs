//! Clean the output directory

use anyhow::{Context, Result};
use std::fs;

use crate::Folio;

/// Remove the static build output
pub fn run(folio: &Folio) -> Result<()> {
    if folio.output_dir.exists() {
        fs::remove_dir_all(&folio.output_dir)
            .with_context(|| format!("Failed to remove {:?}", folio.output_dir))?;
        tracing::info!("Deleted: {:?}", folio.output_dir);
    } else {
        tracing::info!("Nothing to clean at {:?}", folio.output_dir);
    }
    Ok(())
}
