// src/report/models.rs
/// Labeled header fields a report format may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    CompanyName,
    AgendaNumber,
    Security,
    MeetingType,
    MeetingDate,
    MeetingStatus,
    Ticker,
    Isin,
    CountryOfTrade,
}

/// One company/filing header. `document_id` links it to its proposals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    pub document_id: u32,
    pub company_name: String,
    pub security_id: String,
    pub meeting_type: String,
    pub meeting_date: String,
    pub ticker: String,
    pub agenda_number: Option<String>, // npx only
    pub isin: Option<String>,          // npx only
    pub meeting_status: Option<String>,   // tabular only
    pub country_of_trade: Option<String>, // tabular only
}

impl HeaderRecord {
    /// Value of a labeled field; fields the format does not carry read as empty.
    pub fn field(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::CompanyName => &self.company_name,
            HeaderField::AgendaNumber => self.agenda_number.as_deref().unwrap_or_default(),
            HeaderField::Security => &self.security_id,
            HeaderField::MeetingType => &self.meeting_type,
            HeaderField::MeetingDate => &self.meeting_date,
            HeaderField::MeetingStatus => self.meeting_status.as_deref().unwrap_or_default(),
            HeaderField::Ticker => &self.ticker,
            HeaderField::Isin => self.isin.as_deref().unwrap_or_default(),
            HeaderField::CountryOfTrade => self.country_of_trade.as_deref().unwrap_or_default(),
        }
    }
}

/// Raw text of one proposal table and where it starts in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalBlock<'a> {
    pub offset: usize,
    pub text: &'a str,
}

/// A single table line sliced at fixed columns, before continuation merging.
/// An empty `number` marks a continuation or director-name line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoughRow {
    pub document_id: u32,
    pub number: String,
    pub description: String,
    pub secondary: Vec<String>,
}

/// A proposal after continuation lines have been folded in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposalRecord {
    pub document_id: u32,
    pub number: String,
    pub description: String,
    pub secondary: Vec<String>,
}

impl From<RoughRow> for ProposalRecord {
    fn from(row: RoughRow) -> Self {
        Self {
            document_id: row.document_id,
            number: row.number,
            description: row.description,
            secondary: row.secondary,
        }
    }
}

impl ProposalRecord {
    pub fn is_director_list(&self) -> bool {
        self.description.trim().eq_ignore_ascii_case("DIRECTOR")
    }
}
