// src/extractors/header.rs

// --- Imports ---
use crate::report::models::HeaderRecord;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// --- Regex Patterns (Lazy Static) ---
// Labeled fields of an npx filing header, in their fixed order. Fields may be
// separated by any amount of whitespace, including line breaks.
static NPX_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?s)\n\s*(?P<Company>[A-Z0-9 .,()&\-]+?)\s+Agenda Number:\s+(?P<Agenda>\d+).*?",
        r"Security:\s+(?P<Security>\S+).*?",
        r"Meeting Type:\s+(?P<MeetingType>.*?)\s+",
        r"Meeting Date:\s+(?P<MeetingDate>.*?)\s+",
        r"Ticker:\s+(?P<Ticker>.*?)\s+",
        r"ISIN:\s+(?P<ISIN>\S+)",
    ))
    .expect("Failed to compile NPX_HEADER_RE")
});

// Every npx filing header carries this label, matched or not
const AGENDA_LABEL: &str = "Agenda Number:";

static TABULAR_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)^(?P<CompanyName>.*?)\n",
        r"Ticker\s+Security ID:\s+Meeting Date\s+Meeting Status\n",
        r"(?P<Ticker>\S*)\s+CUSIP\s+(?P<SecurityID>\S*)\s+(?P<MeetingDate>\S*)\s+(?P<MeetingStatus>\S*)\n",
        r"Meeting Type\s+Country of Trade\n",
        r"(?P<MeetingType>\S*)\s+(?P<CountryOfTrade>.*?)\s*$",
    ))
    .expect("Failed to compile TABULAR_HEADER_RE")
});

/// An "Agenda Number:" label and the header record it produced, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub offset: usize,
    pub document_id: Option<u32>,
}

/// Headers found in one document plus how many header-looking blocks did not
/// match the full pattern.
#[derive(Debug, Default)]
pub struct HeaderExtraction {
    pub records: Vec<HeaderRecord>,
    /// Every header label in document order, matched or not.
    pub anchors: Vec<Anchor>,
    pub skipped: usize,
}

impl HeaderExtraction {
    /// Id of the filing whose header label is the last one before `offset`.
    /// `None` when no label precedes it or that label's header was skipped.
    pub fn document_at(&self, offset: usize) -> Option<u32> {
        let idx = self.anchors.partition_point(|a| a.offset < offset);
        idx.checked_sub(1).and_then(|i| self.anchors[i].document_id)
    }
}

fn group(caps: &Captures, name: &str) -> String {
    caps.name(name).map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}

/// Pulls every npx filing header, numbering them 1.. in document order.
///
/// Headers whose fields are missing or out of order produce no record; they
/// are only counted in `skipped`.
pub fn extract_npx_headers(content: &str) -> HeaderExtraction {
    let mut extraction = HeaderExtraction::default();
    // Offset of the label each record was matched from, ascending
    let mut labels: Vec<(usize, u32)> = Vec::new();

    for caps in NPX_HEADER_RE.captures_iter(content) {
        let (Some(whole), Some(agenda)) = (caps.get(0), caps.name("Agenda")) else {
            continue;
        };
        let document_id = extraction.records.len() as u32 + 1;
        let label = content[whole.start()..agenda.start()]
            .rfind(AGENDA_LABEL)
            .map_or(whole.start(), |i| whole.start() + i);
        labels.push((label, document_id));
        extraction.records.push(HeaderRecord {
            document_id,
            company_name: group(&caps, "Company"),
            security_id: group(&caps, "Security"),
            meeting_type: group(&caps, "MeetingType"),
            meeting_date: group(&caps, "MeetingDate"),
            ticker: group(&caps, "Ticker"),
            agenda_number: Some(group(&caps, "Agenda")),
            isin: Some(group(&caps, "ISIN")),
            meeting_status: None,
            country_of_trade: None,
        });
    }

    extraction.anchors = content
        .match_indices(AGENDA_LABEL)
        .map(|(start, _)| Anchor {
            offset: start,
            document_id: labels
                .binary_search_by_key(&start, |(offset, _)| *offset)
                .ok()
                .map(|i| labels[i].1),
        })
        .collect();
    extraction.skipped = extraction
        .anchors
        .iter()
        .filter(|a| a.document_id.is_none())
        .count();

    if extraction.skipped > 0 {
        tracing::warn!(
            "{} of {} filing headers did not match the expected field layout and were skipped",
            extraction.skipped,
            extraction.anchors.len()
        );
    }
    tracing::info!("Extracted {} company headers", extraction.records.len());
    extraction
}

/// Header of one tabular company block, if it has the expected grid.
pub fn extract_tabular_header(block: &str, document_id: u32) -> Option<HeaderRecord> {
    let caps = TABULAR_HEADER_RE.captures(block)?;
    Some(HeaderRecord {
        document_id,
        company_name: group(&caps, "CompanyName"),
        security_id: group(&caps, "SecurityID"),
        meeting_type: group(&caps, "MeetingType"),
        meeting_date: group(&caps, "MeetingDate"),
        ticker: group(&caps, "Ticker"),
        agenda_number: None,
        isin: None,
        meeting_status: Some(group(&caps, "MeetingStatus")),
        country_of_trade: Some(group(&caps, "CountryOfTrade")),
    })
}
