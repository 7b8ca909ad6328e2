// src/extractors/rows.rs
use crate::report::format::{Column, Layout};
use crate::report::models::RoughRow;
use crate::utils::text::slice_column;

/// Slices proposal-table lines into rough rows using a layout's fixed columns.
pub struct RowParser<'l> {
    layout: &'l Layout,
}

impl<'l> RowParser<'l> {
    pub fn new(layout: &'l Layout) -> Self {
        Self { layout }
    }

    /// Parses table text line by line, preserving order.
    ///
    /// Each row's `document_id` is the 1-based ordinal of the table it sits
    /// in: layouts with a table header count opening lines and drop anything
    /// before the first one, layouts without one treat the whole text as
    /// table 1.
    pub fn parse(&self, text: &str) -> Vec<RoughRow> {
        let mut rows = Vec::new();
        let mut table = if self.layout.table_header.is_some() { 0 } else { 1 };

        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || self.layout.is_junk(trimmed) {
                continue;
            }

            if let Some(header) = &self.layout.table_header {
                if header.is_opening(line) {
                    table += 1;
                    continue;
                }
                if header.is_subheader(trimmed) {
                    continue;
                }
            }

            // Stray lines ahead of the first table
            if table == 0 {
                continue;
            }

            rows.push(self.slice(line, table));
        }

        tracing::debug!("Parsed {} rough rows from {} table(s)", rows.len(), table);
        rows
    }

    /// Slices a single line into a row tagged with `document_id`.
    pub fn slice(&self, line: &str, document_id: u32) -> RoughRow {
        let cut = |c: &Column| slice_column(line, c.start, c.end);
        RoughRow {
            document_id,
            number: cut(&self.layout.number),
            description: cut(&self.layout.description),
            secondary: self.layout.secondary.iter().map(cut).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::format::{NPX_LAYOUT, TABULAR_LAYOUT};

    /// Lays fields out at npx column offsets.
    fn npx_line(number: &str, description: &str, kind: &str, vote: &str, fam: &str) -> String {
        format!("{:<7}{:<51}{:<14}{:<23}{}", number, description, kind, vote, fam)
    }

    #[test]
    fn test_parse_npx_table() {
        let text = format!(
            "{}\n Prop.# Proposal{}Proposal      Proposal Vote          For/Against\n{}Type                                 Management\n{}\n{}\n\n{}\n",
            "-".repeat(60),
            " ".repeat(43),
            " ".repeat(58),
            npx_line(" 1", "Approve the plan", "Mgmt", "For", "For"),
            npx_line("", "as amended", "", "", ""),
            npx_line(" 2", "Elect X", "Mgmt", "Against", "Against"),
        );
        let rows = RowParser::new(&NPX_LAYOUT).parse(&text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].number, "1");
        assert_eq!(rows[0].description, "Approve the plan");
        assert_eq!(rows[0].secondary, vec!["Mgmt", "For", "For"]);
        assert_eq!(rows[1].number, "");
        assert_eq!(rows[1].description, "as amended");
        assert_eq!(rows[2].secondary, vec!["Mgmt", "Against", "Against"]);
        assert!(rows.iter().all(|r| r.document_id == 1));
    }

    #[test]
    fn test_lines_before_first_table_are_dropped() {
        let text = format!(
            "{}\n Prop.# Proposal\n{}\n",
            npx_line(" 9", "Stray row", "Mgmt", "For", "For"),
            npx_line(" 1", "Kept row", "Mgmt", "For", "For"),
        );
        let rows = RowParser::new(&NPX_LAYOUT).parse(&text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Kept row");
    }

    #[test]
    fn test_table_counter_increments_per_opening_line() {
        let text = format!(
            " Prop.# Proposal\n{}\n Prop.# Proposal\n{}\n{}\n",
            npx_line(" 1", "First co", "Mgmt", "For", "For"),
            npx_line(" 1", "Second co", "Mgmt", "For", "For"),
            npx_line(" 2", "Second co again", "Mgmt", "For", "For"),
        );
        let ids: Vec<u32> = RowParser::new(&NPX_LAYOUT)
            .parse(&text)
            .iter()
            .map(|r| r.document_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 2]);
    }

    #[test]
    fn test_junk_lines_are_skipped() {
        let text = format!(
            " Prop.# Proposal\n{}\n* Management position unknown\n</TABLE>\n",
            npx_line(" 1", "Approve", "Mgmt", "For", "For"),
        );
        assert_eq!(RowParser::new(&NPX_LAYOUT).parse(&text).len(), 1);
    }

    #[test]
    fn test_parse_tabular_table() {
        let line = format!(
            "{:<10}{:<26}{:<11}{:<10}{:<10}{}",
            "1.1", "Elect Director Jane Doe", "Mgmt", "For", "For", "For"
        );
        let text = format!("Issue No.  Description\n{}\n{:<10}{}\n", line, "", "and Others");
        let rows = RowParser::new(&TABULAR_LAYOUT).parse(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, "1.1");
        assert_eq!(rows[0].description, "Elect Director Jane Doe");
        assert_eq!(rows[0].secondary, vec!["Mgmt", "For", "For", "For"]);
        assert_eq!(rows[1].number, "");
        assert_eq!(rows[1].description, "and Others");
        assert!(rows.iter().all(|r| r.document_id == 1));
    }

    #[test]
    fn test_reslicing_a_repadded_line_is_stable() {
        let parser = RowParser::new(&NPX_LAYOUT);
        let first = parser.slice(&npx_line(" 3", "  Ratify  auditors ", "Mgmt", "For", "For"), 1);
        let repadded = npx_line(
            &first.number,
            &first.description,
            &first.secondary[0],
            &first.secondary[1],
            &first.secondary[2],
        );
        assert_eq!(parser.slice(&repadded, 1), first);
    }
}
