//! Plain-text screens for the shell and `GET /render`.

use std::fmt::{self, Write};

use prospan_core::citation::ResolvedCitation;
use prospan_core::dashboard::dashboard_stats;
use prospan_core::models::{Document, Role};
use prospan_core::session::{Session, View};

const NOT_AVAILABLE: &str = "N/A";
const RULE: &str = "────────────────────────────────────────────────────────────";

/// Render the header and the current screen.
pub fn render(session: &Session) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_screen(&mut out, session);
    out
}

/// The library table alone, without the header.
pub fn render_library(documents: &[Document]) -> String {
    let mut out = String::new();
    let _ = write_library(&mut out, documents);
    out
}

/// One document's detail screen, without the header.
pub fn render_document(doc: &Document) -> String {
    let mut out = String::new();
    let _ = write_detail(&mut out, doc);
    out
}

/// Dashboard statistics, without the header.
pub fn render_dashboard(session: &Session) -> String {
    let mut out = String::new();
    let _ = write_dashboard(&mut out, session);
    out
}

fn write_screen(out: &mut String, session: &Session) -> fmt::Result {
    write_header(out, session.view())?;
    match session.view() {
        View::Dashboard => write_dashboard(out, session),
        View::Library => write_library(out, session.documents()),
        View::Chat => write_chat(out, session),
        View::DocumentDetail { .. } => match session.selected_document() {
            Some(doc) => write_detail(out, doc),
            None => writeln!(out, "Document not found."),
        },
    }
}

fn write_header(out: &mut String, view: &View) -> fmt::Result {
    let menu = ["Dashboard", "Library", "Smart Search"]
        .iter()
        .map(|label| {
            if *label == view.label() {
                format!("[{}]", label)
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "Prospan Lib  |  {}", menu)?;
    writeln!(out, "{}", RULE)?;
    if let View::DocumentDetail { .. } = view {
        writeln!(out, "{}", view.label())?;
    }
    Ok(())
}

fn write_dashboard(out: &mut String, session: &Session) -> fmt::Result {
    let stats = dashboard_stats(session.store());
    writeln!(out, "Total documents:   {}", stats.total_documents)?;
    writeln!(out, "Clinical studies:  {}", stats.clinical_studies)?;
    writeln!(out, "AI processed:      {}", stats.ai_processed)?;
    writeln!(out)?;
    writeln!(out, "Distribution by type")?;
    if stats.distribution.is_empty() {
        return writeln!(out, "  No data yet. Import documents to get started.");
    }
    for entry in &stats.distribution {
        writeln!(
            out,
            "  {:<20} {:>3}  {}",
            entry.label,
            entry.count,
            "█".repeat(entry.count.min(40))
        )?;
    }
    Ok(())
}

fn write_library(out: &mut String, documents: &[Document]) -> fmt::Result {
    if documents.is_empty() {
        return writeln!(out, "No documents found. Import data to get started.");
    }
    writeln!(
        out,
        "{:<4} {:<36} {:<12} {:<10} {}",
        "#", "Title / File", "Type", "Published", "Ingredients"
    )?;
    for (i, doc) in documents.iter().enumerate() {
        let meta = doc.metadata();
        let ingredients = match meta.ingredients.as_deref() {
            Some(list) if !list.is_empty() => {
                let mut shown = list.iter().take(2).cloned().collect::<Vec<_>>().join(", ");
                if list.len() > 2 {
                    shown.push_str("...");
                }
                shown
            }
            _ => NOT_AVAILABLE.to_string(),
        };
        writeln!(
            out,
            "{:<4} {:<36} {:<12} {:<10} {}",
            i + 1,
            clip(&meta.title, 36),
            doc.doc_type().as_str(),
            clip(meta.publication_date.as_deref().unwrap_or(NOT_AVAILABLE), 10),
            ingredients
        )?;
        writeln!(
            out,
            "     {}  ({}, {})",
            clip(doc.file_name(), 36),
            doc.id(),
            doc.status().as_str()
        )?;
    }
    Ok(())
}

fn write_detail(out: &mut String, doc: &Document) -> fmt::Result {
    let meta = doc.metadata();
    writeln!(
        out,
        "{}  ·  {}",
        doc.doc_type().as_str().to_uppercase(),
        doc.upload_date().format("%Y-%m-%d")
    )?;
    writeln!(out, "{}", meta.title)?;
    if let Some(source) = &meta.source {
        writeln!(out, "Source: {}", source)?;
    }
    writeln!(out)?;

    writeln!(out, "Summary")?;
    writeln!(out, "  {}", meta.summary)?;
    writeln!(out)?;

    writeln!(out, "Clinical results")?;
    match meta.results.as_deref() {
        Some(results) if !results.is_empty() => {
            for r in results {
                writeln!(out, "  • {}", r)?;
            }
        }
        _ => writeln!(out, "  No specific results found.")?,
    }
    writeln!(out)?;

    writeln!(out, "Key data")?;
    writeln!(
        out,
        "  Population:        {}",
        meta.population.as_deref().unwrap_or("Unspecified")
    )?;
    writeln!(out, "  Indications:       {}", join_or_na(&meta.indications))?;
    writeln!(out, "  Ingredients:       {}", join_or_na(&meta.ingredients))?;
    writeln!(
        out,
        "  Mechanism:         {}",
        meta.mechanism.as_deref().unwrap_or(NOT_AVAILABLE)
    )?;
    writeln!(
        out,
        "  Contraindications: {}",
        join_or_na(&meta.contraindications)
    )?;
    writeln!(
        out,
        "  Dosage:            {}",
        meta.dosage.as_deref().unwrap_or(NOT_AVAILABLE)
    )?;
    writeln!(out)?;

    writeln!(out, "Raw text")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", doc.content().trim_end())
}

fn write_chat(out: &mut String, session: &Session) -> fmt::Result {
    let transcript = session.resolved_transcript();
    if transcript.is_empty() {
        writeln!(out, "Ask about clinical studies, dosage, or ingredients.")?;
        writeln!(out, "Example: \"What is the dosage for children under 6?\"")?;
    }
    for entry in &transcript {
        let role = match entry.message.role {
            Role::User => "You",
            Role::Assistant => "Assistant",
            Role::System => "System",
        };
        writeln!(out, "{}:", role)?;
        for line in entry.message.content.lines() {
            writeln!(out, "  {}", line)?;
        }
        write_sources(out, &entry.resolved_citations)?;
        writeln!(out)?;
    }
    if session.is_awaiting_response() {
        writeln!(out, "Assistant is thinking...")?;
    }
    Ok(())
}

fn write_sources(out: &mut String, citations: &[ResolvedCitation]) -> fmt::Result {
    if citations.is_empty() {
        return Ok(());
    }
    writeln!(out, "  Sources:")?;
    for c in citations {
        match &c.document_id {
            Some(id) => writeln!(out, "    - {} [{}]", c.label, id)?,
            None => writeln!(out, "    - {}", c.label)?,
        }
    }
    Ok(())
}

fn join_or_na(list: &Option<Vec<String>>) -> String {
    match list.as_deref() {
        Some(items) if !items.is_empty() => items.join(", "),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// At most `max` characters, with a trailing ellipsis when cut.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut cut: String = s.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
