//! Markdown change log rendering.
//!
//! The previous document is parsed into dated sections (`## YYYY-MM-DD`),
//! today's section is rebuilt from the change list, and the sections are
//! serialized back under a fixed header. Rendering the same day twice
//! replaces that day's section instead of duplicating it.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Change;
use crate::utils::time::{Clock, format_date};

pub const HEADER: &str = "# Changelog - Indiefolio Classificados API\n\n\
Todas as mudanças notáveis neste projeto serão documentadas neste arquivo.\n\n";

const UNSPECIFIED_LOCATION: &str = "Localização não especificada";

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^## (\d{4}-\d{2}-\d{2})").expect("section heading pattern is valid")
});

/// One dated section, kept verbatim (heading line included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub date: String,
    pub text: String,
}

/// A change log split into whatever precedes the first dated section and
/// the dated sections themselves, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogDocument {
    pub preamble: String,
    pub sections: Vec<Section>,
}

impl ChangelogDocument {
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();

        for line in text.split_inclusive('\n') {
            if let Some(caps) = SECTION_HEADING.captures(line) {
                doc.sections.push(Section {
                    date: caps[1].to_string(),
                    text: String::new(),
                });
            }
            match doc.sections.last_mut() {
                Some(section) => section.text.push_str(line),
                None => doc.preamble.push_str(line),
            }
        }

        doc
    }

    pub fn position(&self, date: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.date == date)
    }

    pub fn dates(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.date.as_str()).collect()
    }
}

/// Render today's section: added, removed and status-changed groups, each
/// present only when it has entries.
pub fn render_section(changes: &[Change], date: &str) -> String {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    let mut status = Vec::new();

    for change in changes {
        match change {
            Change::Add { record, .. } => {
                let local = record
                    .local
                    .display()
                    .unwrap_or_else(|| UNSPECIFIED_LOCATION.to_string());
                added.push(format!(
                    "- **{}** ({}) - {}",
                    record.titulo,
                    record.funcoes.join(", "),
                    local
                ));
            }
            Change::Remove { record, .. } => removed.push(format!("- {}", record.titulo)),
            Change::StatusChange {
                record, details, ..
            } => status.push(format!(
                "- **{}**: {} → {}",
                record.titulo, details.from, details.to
            )),
        }
    }

    let mut out = format!("## {date}\n\n");
    for (title, lines) in [
        ("✅ Adicionados", added),
        ("❌ Removidos", removed),
        ("🔄 Status Alterados", status),
    ] {
        if lines.is_empty() {
            continue;
        }
        out.push_str(&format!("### {} ({})\n\n", title, lines.len()));
        for line in &lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Render the full document for `today`, merging with the previous one.
///
/// - no changes: header plus every previous dated section, untouched
/// - no section for today yet: new section on top, previous sections below
/// - a section for today exists: only that section is replaced, every
///   other section keeps its place below the new one
pub fn render(changes: &[Change], existing: Option<&str>, today: &str) -> String {
    let mut out = String::from(HEADER);
    if !changes.is_empty() {
        out.push_str(&render_section(changes, today));
    }

    let Some(existing) = existing else {
        return out;
    };

    let doc = ChangelogDocument::parse(existing);
    let kept: Vec<&Section> = match doc.position(today) {
        Some(index) if !changes.is_empty() => doc.sections[..index]
            .iter()
            .chain(&doc.sections[index + 1..])
            .collect(),
        _ => doc.sections.iter().collect(),
    };
    for section in kept {
        out.push_str(&section.text);
    }
    out
}

/// Renderer bound to a clock for "today".
#[derive(Debug, Clone)]
pub struct ChangelogRenderer<C: Clock> {
    clock: C,
}

impl<C: Clock> ChangelogRenderer<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn render(&self, changes: &[Change], existing: Option<&str>) -> String {
        render(changes, existing, &format_date(self.clock.today()))
    }
}
