// src/report/format.rs
//! Declared per-vendor table schemas.
//!
//! Each report format observed so far gets one [`Layout`]: its column
//! offsets, the lines that are noise, how a table header looks and how
//! continuation lines are folded. Pipelines pick a layout by [`ReportFormat`]
//! instead of hardcoding offsets.

use clap::ValueEnum;

use crate::report::models::HeaderField;
use crate::utils::text::Encoding;

/// Report variants the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// "Agenda Number:" headers with dashed `Prop.# Proposal` tables.
    Npx,
    /// Underscore-separated company blocks with an `Issue No.` table.
    Tabular,
}

impl ReportFormat {
    pub fn layout(self) -> &'static Layout {
        match self {
            ReportFormat::Npx => &NPX_LAYOUT,
            ReportFormat::Tabular => &TABULAR_LAYOUT,
        }
    }

    pub fn name(self) -> &'static str {
        self.layout().name
    }
}

/// A fixed character range `[start, end)`; `end: None` runs to end of line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub start: usize,
    pub end: Option<usize>,
}

/// Two-line table header: an opening line that starts a new table and a
/// sub-header line that is simply dropped.
#[derive(Debug, Clone, Copy)]
pub struct TableHeader {
    pub opening_tokens: &'static [&'static str],
    pub subheader_prefix: &'static str,
    pub subheader_suffix: &'static str,
}

impl TableHeader {
    pub fn is_opening(&self, line: &str) -> bool {
        self.opening_tokens.iter().all(|t| line.contains(t))
    }

    /// `trimmed` must already be stripped of surrounding whitespace.
    pub fn is_subheader(&self, trimmed: &str) -> bool {
        trimmed.starts_with(self.subheader_prefix) && trimmed.ends_with(self.subheader_suffix)
    }
}

/// How the continuation merger treats rows without a proposal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// A `DIRECTOR` proposal opens a list of name rows kept as records.
    pub director_lists: bool,
    /// Emit an unnumbered first row as a record instead of dropping it.
    pub keep_leading_continuation: bool,
}

#[derive(Debug)]
pub struct Layout {
    pub name: &'static str,
    pub number: Column,
    pub description: Column,
    /// Remaining columns, blanked on `DIRECTOR` rows.
    pub secondary: &'static [Column],
    pub junk_tokens: &'static [&'static str],
    pub table_header: Option<TableHeader>,
    pub merge: MergePolicy,
    /// Export column names for header fields, in output order.
    pub header_columns: &'static [(HeaderField, &'static str)],
    pub id_column: &'static str,
    pub default_encoding: Encoding,
}

impl Layout {
    /// Output column names for the proposal side, in output order.
    pub fn proposal_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        [self.number.name, self.description.name]
            .into_iter()
            .chain(self.secondary.iter().map(|c| c.name))
    }

    pub fn is_junk(&self, trimmed: &str) -> bool {
        self.junk_tokens.iter().any(|junk| trimmed.contains(junk))
    }
}

pub static NPX_LAYOUT: Layout = Layout {
    name: "npx",
    number: Column { name: "Prop.#", start: 0, end: Some(7) },
    description: Column { name: "Proposal", start: 7, end: Some(58) },
    secondary: &[
        Column { name: "Proposal Type", start: 58, end: Some(72) },
        Column { name: "Proposal Vote", start: 72, end: Some(95) },
        Column { name: "For/Against Management", start: 95, end: None },
    ],
    junk_tokens: &["* Management", "----", "</TABLE>"],
    table_header: Some(TableHeader {
        opening_tokens: &["Prop.#", "Proposal"],
        subheader_prefix: "Type",
        subheader_suffix: "Management",
    }),
    merge: MergePolicy {
        director_lists: true,
        keep_leading_continuation: true,
    },
    header_columns: &[
        (HeaderField::CompanyName, "Company Name"),
        (HeaderField::AgendaNumber, "Agenda Number"),
        (HeaderField::Security, "Security"),
        (HeaderField::MeetingType, "Meeting Type"),
        (HeaderField::MeetingDate, "Meeting Date"),
        (HeaderField::Ticker, "Ticker"),
        (HeaderField::Isin, "ISIN"),
    ],
    id_column: "IDs",
    default_encoding: Encoding::Latin1,
};

pub static TABULAR_LAYOUT: Layout = Layout {
    name: "tabular",
    number: Column { name: "IssueNo", start: 0, end: Some(10) },
    description: Column { name: "Description", start: 10, end: Some(36) },
    secondary: &[
        Column { name: "Proponent", start: 36, end: Some(47) },
        Column { name: "MgmtRec", start: 47, end: Some(57) },
        Column { name: "VoteCast", start: 57, end: Some(67) },
        Column { name: "ForAgainstMgmt", start: 67, end: None },
    ],
    junk_tokens: &["Issue No.", "Description"],
    table_header: None,
    merge: MergePolicy {
        director_lists: false,
        keep_leading_continuation: false,
    },
    header_columns: &[
        (HeaderField::CompanyName, "CompanyName"),
        (HeaderField::Ticker, "Ticker"),
        (HeaderField::Security, "SecurityID"),
        (HeaderField::MeetingDate, "MeetingDate"),
        (HeaderField::MeetingStatus, "MeetingStatus"),
        (HeaderField::MeetingType, "MeetingType"),
        (HeaderField::CountryOfTrade, "CountryOfTrade"),
    ],
    id_column: "ID",
    default_encoding: Encoding::Utf8,
};
