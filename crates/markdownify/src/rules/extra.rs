//! Markdown Extra rules: tables, definition lists, abbreviations and
//! heading ids. Only consulted when `enable_extra_syntax` is set.

use once_cell::sync::Lazy;
use regex::Regex;

use super::commonmark::heading;
use super::{Filter, Rule};
use crate::frame::{Alignment, Frame, FrameContext, TableRow, TableState};
use crate::utilities::{prefix_lines, repeat};

static TEXT_ALIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)text-align\s*:\s*(left|center|right)").expect("text-align pattern is valid")
});

/// Create all extra-syntax rules
pub fn extra_rules() -> Vec<Rule> {
    vec![
        heading_id_rule(),
        table_rule(),
        table_section_rule(),
        definition_list_rule(),
        definition_term_rule(),
        definition_rule(),
        abbreviation_rule(),
    ]
}

fn heading_id_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, frame, _| {
            matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
                && frame.attr("id").is_some_and(|id| !id.trim().is_empty())
        }),
        |frame, content, ctx| heading(frame, content, ctx, frame.attr("id").map(str::trim)),
    )
}

/// Alignment from the `align` attribute or a `text-align` style.
pub(crate) fn cell_alignment(frame: &Frame) -> Alignment {
    let value = frame
        .attr("align")
        .map(str::to_string)
        .or_else(|| {
            let style = frame.attr("style")?;
            TEXT_ALIGN.captures(style).map(|caps| caps[1].to_string())
        })
        .unwrap_or_default();

    match value.to_ascii_lowercase().as_str() {
        "left" => Alignment::Left,
        "center" => Alignment::Center,
        "right" => Alignment::Right,
        _ => Alignment::None,
    }
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |frame, content, _| {
        let table = match frame.context() {
            FrameContext::Table(state) => render_table(state),
            _ => String::new(),
        };
        let stray = content.trim_matches('\n');

        let parts: Vec<&str> = [stray, table.as_str()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect();
        if parts.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", parts.join("\n\n"))
    })
}

/// Table sections only group rows; rows are collected by the table.
fn table_section_rule() -> Rule {
    Rule::for_tags(&["thead", "tbody", "tfoot"], |_, content, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

fn header_row_index(rows: &[TableRow]) -> usize {
    rows.iter()
        .position(|row| row.in_head)
        .or_else(|| {
            rows.iter()
                .position(|row| !row.cells.is_empty() && row.cells.iter().all(|c| c.header))
        })
        .unwrap_or(0)
}

fn separator(alignment: Alignment, width: usize) -> String {
    match alignment {
        Alignment::None => repeat("-", width),
        Alignment::Left => format!(":{}", repeat("-", width - 1)),
        Alignment::Right => format!("{}:", repeat("-", width - 1)),
        Alignment::Center => format!(":{}:", repeat("-", width - 2)),
    }
}

fn table_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, &width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{:<width$}", cell, width = width)
        })
        .collect();
    format!("| {} |", padded.join(" | "))
}

/// Render collected rows as a pipe table. The caption, if any, becomes a
/// paragraph above it.
pub(crate) fn render_table(state: &TableState) -> String {
    let columns = state.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    if columns == 0 {
        return state.caption.clone().unwrap_or_default();
    }

    let header_index = header_row_index(&state.rows);
    let header = &state.rows[header_index];
    let body: Vec<&TableRow> = state
        .rows
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != header_index)
        .map(|(_, row)| row)
        .collect();

    let alignments: Vec<Alignment> = (0..columns)
        .map(|i| {
            std::iter::once(header)
                .chain(body.iter().copied())
                .filter_map(|row| row.cells.get(i))
                .map(|cell| cell.alignment)
                .find(|alignment| *alignment != Alignment::None)
                .unwrap_or_default()
        })
        .collect();

    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            std::iter::once(header)
                .chain(body.iter().copied())
                .filter_map(|row| row.cells.get(i))
                .map(|cell| cell.content.chars().count())
                .max()
                .unwrap_or(0)
                .max(3)
        })
        .collect();

    let contents = |row: &TableRow| -> Vec<String> {
        row.cells.iter().map(|cell| cell.content.clone()).collect()
    };

    let mut lines = Vec::with_capacity(state.rows.len() + 1);
    lines.push(table_line(&contents(header), &widths));
    let separators: Vec<String> = alignments
        .iter()
        .zip(&widths)
        .map(|(&alignment, &width)| separator(alignment, width))
        .collect();
    lines.push(format!("| {} |", separators.join(" | ")));
    for row in body {
        lines.push(table_line(&contents(row), &widths));
    }

    let table = lines.join("\n");
    match state.caption.as_deref() {
        Some(caption) if !caption.is_empty() => format!("{caption}\n\n{table}"),
        _ => table,
    }
}

fn definition_list_rule() -> Rule {
    Rule::for_tag("dl", |_, content, _| {
        let content = content.trim_matches('\n');
        if content.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", content)
    })
}

fn definition_term_rule() -> Rule {
    Rule::for_tag("dt", |_, content, ctx| {
        let term = content.trim();
        if term.is_empty() {
            return String::new();
        }
        let after_definition = matches!(
            ctx.parent.map(Frame::context),
            Some(FrameContext::DefinitionList {
                after_definition: true
            })
        );
        if after_definition {
            format!("\n\n{}\n", term)
        } else {
            format!("\n{}\n", term)
        }
    })
}

fn definition_rule() -> Rule {
    Rule::for_tag("dd", |_, content, _| {
        let content = content.trim_matches('\n');
        format!("{}\n", prefix_lines(content, ":   ", "    "))
    })
}

fn abbreviation_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, frame, _| tag == "abbr" && frame.attr("title").is_some()),
        |frame, content, ctx| {
            let abbreviation = content.trim();
            let title = frame.attr("title").map(str::trim).unwrap_or_default();
            if !abbreviation.is_empty() && !title.is_empty() {
                ctx.record_abbreviation(abbreviation, title);
            }
            content.to_string()
        },
    )
}
