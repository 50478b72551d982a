//! Styled, self-contained HTML documents.
//!
//! Cell values, titles and the address line are written verbatim. Callers may
//! embed markup (the checklist embeds `<img>` tags), so nothing is escaped.

use crate::error::Result;
use crate::ledger::{ShipmentRow, COL_CARD_NAME, COL_CONDITION, COL_FINISH, COL_PACKAGE_ID, COL_SET_NAME};
use std::fmt::Write as _;
use std::path::Path;

/// Title printed above every packing-slip table.
pub const SLIP_TITLE: &str = "Trade Details";

/// Columns shown on a packing slip, in order.
pub const SLIP_COLUMNS: [&str; 5] = [
    COL_PACKAGE_ID,
    COL_CARD_NAME,
    COL_SET_NAME,
    COL_CONDITION,
    COL_FINISH,
];

const STYLE: &str = r#"
    h2 {
        text-align: center;
        font-family: Helvetica, Arial, sans-serif;
    }
    table {
        margin-left: auto;
        margin-right: auto;
    }
    table, th, td {
        border: 1px solid black;
        border-collapse: collapse;
    }
    th, td {
        padding: 5px;
        text-align: center;
        font-family: Helvetica, Arial, sans-serif;
        font-size: 90%;
    }
    table tbody tr:hover {
        background-color: #dddddd;
    }
    .wide {
        width: 90%;
    }
"#;

/// A column subset of the ledger ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Project rows onto [`SLIP_COLUMNS`].
    pub fn packing_slip(rows: &[ShipmentRow]) -> Self {
        Self {
            columns: SLIP_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| {
                    vec![
                        r.package_id.clone(),
                        r.card_name.clone(),
                        r.set_name.clone(),
                        r.condition.clone(),
                        r.finish.clone(),
                    ]
                })
                .collect(),
        }
    }
}

/// Opening markup shared by every generated document: head, style and body start.
pub fn document_open() -> String {
    format!("<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n{STYLE}\n</style>\n</head>\n<body>\n")
}

pub fn document_close() -> &'static str {
    "\n</body>\n</html>\n"
}

/// Renders tables as standalone HTML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentRenderer;

impl DocumentRenderer {
    /// Render `table` with a centered title and the address below the table.
    pub fn render(&self, table: &Table, title: &str, address: &str) -> String {
        let mut html = document_open();
        // Writing into a String cannot fail.
        let _ = writeln!(html, "<h2> {title} </h2>");
        html.push_str(&Self::table_markup(table));
        let _ = write!(html, "<p> {address} </p>");
        html.push_str(document_close());
        html
    }

    fn table_markup(table: &Table) -> String {
        let mut out = String::from("<table border=\"1\" class=\"dataframe wide\">\n  <thead>\n    <tr style=\"text-align: right;\">\n");
        for column in &table.columns {
            let _ = writeln!(out, "      <th>{column}</th>");
        }
        out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for row in &table.rows {
            out.push_str("    <tr>\n");
            for cell in row {
                let _ = writeln!(out, "      <td>{cell}</td>");
            }
            out.push_str("    </tr>\n");
        }
        out.push_str("  </tbody>\n</table>\n");
        out
    }

    /// Render and write to `path`, replacing any existing file.
    pub fn write(&self, path: &Path, table: &Table, title: &str, address: &str) -> Result<()> {
        std::fs::write(path, self.render(table, title, address))?;
        Ok(())
    }
}
