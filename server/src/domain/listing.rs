//! Table parsing for `ps` / `images` output
//!
//! The runtime CLI prints fixed-width tables whose columns are separated by
//! two or more spaces. A table with no data rows becomes an explicit empty
//! indicator rather than an empty table.

use serde::Serialize;

use super::command::{ACTION_IMAGES, ACTION_PS};

/// What a listing enumerates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Containers,
    Images,
}

impl ListingKind {
    /// Listing kind produced by an action, if any
    pub fn for_action(action: &str) -> Option<Self> {
        match action {
            ACTION_PS => Some(ListingKind::Containers),
            ACTION_IMAGES => Some(ListingKind::Images),
            _ => None,
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            ListingKind::Containers => "No containers running",
            ListingKind::Images => "No images available",
        }
    }
}

/// Parsed runtime table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    Empty {
        message: String,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl Listing {
    pub fn parse(kind: ListingKind, output: &str) -> Self {
        let lines: Vec<&str> = output.lines().collect();

        let rows: Vec<Vec<String>> = lines
            .iter()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| split_columns(line))
            .collect();

        if lines.len() <= 1 || rows.is_empty() {
            return Listing::Empty {
                message: kind.empty_message().to_string(),
            };
        }

        Listing::Table {
            headers: split_columns(lines[0]),
            rows,
        }
    }

    /// Plain-text rendering with aligned columns
    pub fn render_text(&self) -> String {
        let (headers, rows) = match self {
            Listing::Empty { message } => return message.clone(),
            Listing::Table { headers, rows } => (headers, rows),
        };

        let columns = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(headers.len()))
            .max()
            .unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for line in std::iter::once(headers).chain(rows.iter()) {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        std::iter::once(headers)
            .chain(rows.iter())
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                    .collect::<Vec<_>>()
                    .join("  ")
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Split on runs of two or more spaces
fn split_columns(line: &str) -> Vec<String> {
    line.trim()
        .split("  ")
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}
