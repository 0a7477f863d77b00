use dashrev_history::DiffFormat;

use crate::commands::Session;
use crate::error::{CliError, CliResult};
use crate::output::render_diff;

/// Compare two versions and print the diff
pub async fn run(session: &Session, a: u32, b: u32, format: Option<&str>) -> CliResult<()> {
    if a == b {
        return Err(CliError::invalid_argument("pick two different versions"));
    }

    let controller = &session.controller;
    controller.reset_from_source().await?;
    let older = session.ensure_loaded(a.min(b)).await?;
    let newer = session.ensure_loaded(a.max(b)).await?;

    controller.toggle(older.version, true);
    controller.toggle(newer.version, true);

    let format = format
        .map(DiffFormat::from)
        .unwrap_or_else(|| controller.config().default_diff_format.clone());
    let payload = controller.get_diff(format).await?;

    let latest = if controller.is_original_current() {
        " (Latest)"
    } else {
        ""
    };
    println!(
        "Comparing version {} ({}, {}) with version {} ({}, {}){}",
        older.version,
        session.date_of(&older),
        older.created_by,
        newer.version,
        session.date_of(&newer),
        newer.created_by,
        latest
    );
    println!("{}", render_diff(&payload));
    Ok(())
}
