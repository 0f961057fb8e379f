//! PDF rendering of the consolidated checklist report.
//!
//! One table per day with that day's subtotals. Layout comes from
//! `fleetcheck_core::report`: column weights follow the widest cell of each
//! column and long cells are cut to fit.

use std::path::Path;

use fleetcheck_core::report::{
    day_heading, day_table, ConsolidatedReport, ReportFilter, ReportTable,
};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::Style;
use genpdf::{Document, Element, SimplePageDecorator, Size};

const FONT_SIZE_PT: u8 = 8;
const TITLE_SIZE_PT: u8 = 14;

/// One-line description of the filters applied to a report.
pub fn filter_description(filter: &ReportFilter, vehicle_name: Option<&str>) -> String {
    let mut parts = Vec::new();
    match (filter.from, filter.to) {
        (Some(from), Some(to)) => parts.push(format!(
            "Período: {} a {}",
            from.format("%d/%m/%Y"),
            to.format("%d/%m/%Y")
        )),
        (Some(from), None) => parts.push(format!("A partir de {}", from.format("%d/%m/%Y"))),
        (None, Some(to)) => parts.push(format!("Até {}", to.format("%d/%m/%Y"))),
        (None, None) => parts.push("Todo o período".to_string()),
    }
    if let Some(name) = vehicle_name {
        parts.push(format!("Conjunto: {name}"));
    }
    if let Some(kind) = &filter.checklist_kind {
        parts.push(format!("Tipo: {kind}"));
    }
    parts.join(" | ")
}

/// Render the report as a landscape A4 PDF.
///
/// Blocking: call from `spawn_blocking`.
pub fn render_report(
    report: &ConsolidatedReport,
    description: &str,
    font_dir: &Path,
    font_name: &str,
) -> Result<Vec<u8>, genpdf::error::Error> {
    let font_family = genpdf::fonts::from_files(font_dir, font_name, None)?;

    let mut doc = Document::new(font_family);
    doc.set_title("Relatório consolidado de checklists");
    doc.set_paper_size(Size::new(297, 210));
    doc.set_font_size(FONT_SIZE_PT);
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new("Relatório consolidado de checklists")
            .styled(Style::new().bold().with_font_size(TITLE_SIZE_PT)),
    );
    doc.push(Paragraph::new(description));
    doc.push(Paragraph::new(format!(
        "Checklists: {} | Itens avaliados: {} | Não conformes: {} | Conformidade: {:.1}%",
        report.submission_count, report.total_items, report.non_conforming, report.conformity_rate
    )));
    doc.push(Break::new(1));

    if report.days.is_empty() {
        doc.push(Paragraph::new("Nenhum checklist encontrado para os filtros informados."));
    }
    for day in &report.days {
        doc.push(Paragraph::new(day_heading(day)).styled(Style::new().bold()));
        doc.push(table_layout(&day_table(day))?);
        doc.push(Break::new(1));
    }

    let mut out = Vec::new();
    doc.render(&mut out)?;
    Ok(out)
}

fn table_layout(table: &ReportTable) -> Result<TableLayout, genpdf::error::Error> {
    let mut layout = TableLayout::new(table.column_weights());
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header = layout.row();
    for title in &table.headers {
        let cell = Paragraph::new(title.as_str()).styled(Style::new().bold());
        header = header.element(cell.padded(1));
    }
    header.push()?;

    for cells in table.fitted_rows() {
        let mut row = layout.row();
        for cell in cells {
            row = row.element(Paragraph::new(cell).padded(1));
        }
        row.push()?;
    }
    Ok(layout)
}
