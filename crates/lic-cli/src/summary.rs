//! Text and JSON rendering of load results and the gate table.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use lic_format::gates::describe;
use lic_format::{Diagnostic, DiagnosticKind, GATES, LoadedDocument};
use lic_model::DocumentStats;

/// What `inspect` reports about a document.
#[derive(Debug, Clone, Serialize)]
pub struct InspectSummary {
    #[serde(flatten)]
    pub stats: DocumentStats,
    /// Template filename, when the document carries one.
    pub template: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl InspectSummary {
    #[must_use]
    pub fn new(loaded: &LoadedDocument) -> Self {
        let mut stats = loaded.document.stats();
        stats.version = Some(loaded.report.version);
        Self {
            stats,
            template: loaded.document.template.as_ref().map(|t| t.filename.clone()),
            diagnostics: loaded.report.diagnostics.clone(),
        }
    }
}

pub fn summary_table(summary: &InspectSummary) -> Table {
    let stats = &summary.stats;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Property"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    let version = stats
        .version
        .map_or_else(|| "-".to_string(), |v| v.to_string());
    let rows: Vec<(&str, Cell)> = vec![
        ("File", Cell::new(&stats.filename)),
        ("Format version", Cell::new(version)),
        (
            "Template",
            summary
                .template
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ),
        ("Parts", Cell::new(stats.parts)),
        ("Submodels", Cell::new(stats.submodels)),
        ("Pages", Cell::new(stats.pages)),
        ("Steps", Cell::new(stats.steps)),
        ("Callouts", Cell::new(stats.callouts)),
        ("Part instances", Cell::new(stats.part_instances)),
        ("PLI items", Cell::new(stats.pli_items)),
        ("Title page", flag_cell(stats.title_page)),
        ("Part list pages", Cell::new(stats.part_list_pages)),
        ("Guides", Cell::new(stats.guides)),
        ("Diagnostics", count_cell(summary.diagnostics.len(), Color::Yellow)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), value]);
    }
    table
}

/// Table of diagnostics, or `None` when there are none.
pub fn diagnostics_table(diagnostics: &[Diagnostic]) -> Option<Table> {
    if diagnostics.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Kind"), header_cell("Message")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(diagnostic.kind).fg(kind_color(diagnostic.kind)),
            Cell::new(&diagnostic.message),
        ]);
    }
    Some(table)
}

/// The version-gate table; with a version, marks which fields it stores.
pub fn gates_table(version: Option<i16>) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Field"), header_cell("Stored"), header_cell("Description")];
    if let Some(version) = version {
        header.push(header_cell(&format!("v{version}")));
    }
    table.set_header(header);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    match version {
        Some(version) => {
            for (gate, present) in describe(version) {
                table.add_row(vec![
                    Cell::new(format!("{:?}", gate.field)),
                    Cell::new(gate.presence),
                    Cell::new(gate.description),
                    flag_cell(present),
                ]);
            }
        }
        None => {
            for gate in &GATES {
                table.add_row(vec![
                    Cell::new(format!("{:?}", gate.field)),
                    Cell::new(gate.presence),
                    Cell::new(gate.description),
                ]);
            }
        }
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_color(kind: DiagnosticKind) -> Color {
    match kind {
        DiagnosticKind::UnresolvedReference | DiagnosticKind::UnknownColor => Color::Red,
        DiagnosticKind::CountMismatch | DiagnosticKind::UnplacedPart => Color::Yellow,
        DiagnosticKind::DuplicateEntry
        | DiagnosticKind::MissingTemplateItem
        | DiagnosticKind::SubmodelTree => Color::Magenta,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string())
        .fg(Color::DarkGrey)
        .add_attribute(Attribute::Dim)
}
