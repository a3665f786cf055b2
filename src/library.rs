//! One-shot library commands over the built-in documents.
//!
//! Used by `prospan list`, `prospan show <id>` and `prospan dashboard`.
//! Each command starts from a fresh seeded session; nothing is persisted.

use anyhow::{Context, Result};
use prospan_core::session::Session;

use crate::render::{render_dashboard, render_document, render_library};

pub fn run_list() -> Result<()> {
    let session = Session::seeded()?;
    print!("{}", render_library(session.documents()));
    Ok(())
}

pub fn run_show(id: &str) -> Result<()> {
    let session = Session::seeded()?;
    let doc = session
        .store()
        .find_by_id(id)
        .with_context(|| format!("document not found: {}", id))?;
    print!("{}", render_document(doc));
    Ok(())
}

pub fn run_dashboard() -> Result<()> {
    let session = Session::seeded()?;
    print!("{}", render_dashboard(&session));
    Ok(())
}
