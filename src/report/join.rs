// src/report/join.rs
use std::collections::HashMap;

use crate::report::format::Layout;
use crate::report::models::{HeaderRecord, ProposalRecord};

/// One output row: a header, repeated for each of its proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinedRow<'a> {
    pub header: &'a HeaderRecord,
    pub proposal: Option<&'a ProposalRecord>,
}

impl JoinedRow<'_> {
    /// Cell values in the layout's export column order.
    pub fn values(&self, layout: &Layout) -> Vec<String> {
        let mut values: Vec<String> = layout
            .header_columns
            .iter()
            .map(|(field, _)| self.header.field(*field).to_string())
            .collect();
        values.push(self.header.document_id.to_string());

        let proposal_len = 2 + layout.secondary.len();
        match self.proposal {
            Some(p) => {
                values.push(p.number.clone());
                values.push(p.description.clone());
                values.extend(
                    (0..layout.secondary.len()).map(|i| p.secondary.get(i).cloned().unwrap_or_default()),
                );
            }
            None => values.extend(std::iter::repeat(String::new()).take(proposal_len)),
        }
        values
    }
}

/// Export column names for a layout: header fields, the id, then proposal fields.
pub fn table_columns(layout: &Layout) -> Vec<&'static str> {
    layout
        .header_columns
        .iter()
        .map(|(_, name)| *name)
        .chain(std::iter::once(layout.id_column))
        .chain(layout.proposal_columns())
        .collect()
}

/// Left join of headers to proposals on `document_id`.
///
/// Returns `None` when either side is empty; callers skip the export
/// entirely in that case. Output follows header order, then proposal order;
/// proposals with no matching header are dropped.
pub fn left_join<'a>(
    headers: &'a [HeaderRecord],
    proposals: &'a [ProposalRecord],
) -> Option<Vec<JoinedRow<'a>>> {
    if headers.is_empty() || proposals.is_empty() {
        return None;
    }

    let mut by_document: HashMap<u32, Vec<&ProposalRecord>> = HashMap::new();
    for proposal in proposals {
        by_document.entry(proposal.document_id).or_default().push(proposal);
    }

    let mut rows = Vec::with_capacity(proposals.len().max(headers.len()));
    let mut matched = 0;
    for header in headers {
        match by_document.get(&header.document_id) {
            Some(found) => {
                matched += found.len();
                rows.extend(found.iter().map(|p| JoinedRow {
                    header,
                    proposal: Some(*p),
                }));
            }
            None => rows.push(JoinedRow { header, proposal: None }),
        }
    }

    let orphans = proposals.len() - matched;
    if orphans > 0 {
        tracing::warn!("{} proposals reference no extracted header and were dropped", orphans);
    }
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::format::NPX_LAYOUT;

    fn header(id: u32, name: &str) -> HeaderRecord {
        HeaderRecord {
            document_id: id,
            company_name: name.to_string(),
            security_id: "004498101".to_string(),
            meeting_type: "Annual".to_string(),
            meeting_date: "12-May-2022".to_string(),
            ticker: "ACME".to_string(),
            agenda_number: Some("933012345".to_string()),
            isin: Some("US0044981019".to_string()),
            meeting_status: None,
            country_of_trade: None,
        }
    }

    fn proposal(id: u32, number: &str) -> ProposalRecord {
        ProposalRecord {
            document_id: id,
            number: number.to_string(),
            description: format!("Proposal {}", number),
            secondary: vec!["Mgmt".into(), "For".into(), "For".into()],
        }
    }

    #[test]
    fn test_header_without_proposals_appears_once() {
        let headers = vec![header(1, "ACME"), header(2, "GLOBEX")];
        let proposals = vec![proposal(2, "1"), proposal(2, "2")];
        let rows = left_join(&headers, &proposals).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].header.company_name, "ACME");
        assert!(rows[0].proposal.is_none());
        assert_eq!(rows[1].proposal.map(|p| p.number.as_str()), Some("1"));
        assert_eq!(rows[2].proposal.map(|p| p.number.as_str()), Some("2"));
    }

    #[test]
    fn test_orphan_proposals_are_dropped() {
        let headers = vec![header(1, "ACME")];
        let proposals = vec![proposal(1, "1"), proposal(9, "1")];
        let rows = left_join(&headers, &proposals).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].proposal.map(|p| p.document_id), Some(1));
    }

    #[test]
    fn test_empty_side_skips_join() {
        let headers = vec![header(1, "ACME")];
        assert!(left_join(&headers, &[]).is_none());
        assert!(left_join(&[], &[proposal(1, "1")]).is_none());
    }

    #[test]
    fn test_values_follow_columns() {
        let headers = vec![header(1, "ACME")];
        let proposals = vec![proposal(1, "1")];
        let rows = left_join(&headers, &proposals).unwrap();
        let columns = table_columns(&NPX_LAYOUT);
        let values = rows[0].values(&NPX_LAYOUT);

        assert_eq!(columns.len(), values.len());
        assert_eq!(columns[7], "IDs");
        assert_eq!(values[7], "1");
        assert_eq!(values[0], "ACME");
        assert_eq!(values[8], "1");
        assert_eq!(values[9], "Proposal 1");
        assert_eq!(values[12], "For");
    }

    #[test]
    fn test_values_blank_without_proposal() {
        let h = header(3, "ACME");
        let row = JoinedRow { header: &h, proposal: None };
        let values = row.values(&NPX_LAYOUT);
        assert_eq!(values.len(), table_columns(&NPX_LAYOUT).len());
        assert!(values[8..].iter().all(String::is_empty));
    }
}
