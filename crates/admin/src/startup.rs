//! Backend preparation shared by every command that opens the shop.

use std::path::Path;

use tracing::{info, warn};

use sampleshop_infra::{Fixture, FixtureSummary, Shop};

use crate::error::AdminError;

/// Run migrations when asked, then load the fixture at `fixture`, if any.
///
/// Migrations come first so a fixture can target a fresh database.
pub async fn prepare(
    shop: &Shop,
    migrate: bool,
    fixture: Option<&Path>,
) -> Result<Option<FixtureSummary>, AdminError> {
    if migrate {
        if !shop.is_persistent() {
            warn!("DATABASE_URL not set; nothing to migrate");
        }
        shop.migrate().await?;
    }

    let Some(path) = fixture else {
        return Ok(None);
    };
    let json = std::fs::read_to_string(path)?;
    let summary = Fixture::from_json(&json)?.load_into(shop).await?;
    info!(path = %path.display(), rows = summary.total(), "fixture applied");
    Ok(Some(summary))
}
