// src/report/pipeline.rs
use clap::ValueEnum;

use crate::extractors::{
    company_blocks, extract_npx_headers, extract_tabular_header, merge_continuations,
    proposal_blocks, render_blocks, tabular_table, RowParser,
};
use crate::report::format::ReportFormat;
use crate::report::models::{HeaderRecord, ProposalBlock, ProposalRecord};

/// How npx proposal tables are tied to their filing header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdStrategy {
    /// A table belongs to the filing whose header label precedes it.
    Anchored,
    /// The n-th table belongs to the n-th header.
    Positional,
}

/// Both logical tables of one report, ready to be joined.
#[derive(Debug)]
pub struct ParsedReport {
    pub headers: Vec<HeaderRecord>,
    pub skipped_headers: usize,
    pub blocks: usize,
    pub proposals: Vec<ProposalRecord>,
}

pub fn parse_report(content: &str, format: ReportFormat, ids: IdStrategy) -> ParsedReport {
    let report = match format {
        ReportFormat::Npx => parse_npx(content, ids),
        ReportFormat::Tabular => parse_tabular(content),
    };
    tracing::info!(
        "Parsed {} report: {} headers ({} skipped), {} tables, {} proposals",
        format.name(),
        report.headers.len(),
        report.skipped_headers,
        report.blocks,
        report.proposals.len()
    );
    report
}

/// Proposal tables of a report, as they would be fed to the row parser.
pub fn table_blocks(content: &str, format: ReportFormat) -> Vec<ProposalBlock<'_>> {
    match format {
        ReportFormat::Npx => proposal_blocks(content).collect(),
        ReportFormat::Tabular => company_blocks(content)
            .into_iter()
            .filter_map(|block| {
                let table = tabular_table(block.text)?;
                Some(ProposalBlock {
                    offset: block.offset + (block.text.len() - table.len()),
                    text: table,
                })
            })
            .collect(),
    }
}

fn parse_npx(content: &str, ids: IdStrategy) -> ParsedReport {
    let layout = ReportFormat::Npx.layout();
    let headers = extract_npx_headers(content);
    let parser = RowParser::new(layout);
    let blocks: Vec<_> = proposal_blocks(content).collect();

    let rough = match ids {
        IdStrategy::Positional => parser.parse(&render_blocks(blocks.iter().copied())),
        IdStrategy::Anchored => {
            let mut rough = Vec::new();
            for block in &blocks {
                let Some(document_id) = headers.document_at(block.offset) else {
                    tracing::warn!(
                        "Proposal table at offset {} has no matching company header, skipping it",
                        block.offset
                    );
                    continue;
                };
                rough.extend(parser.parse(block.text).into_iter().map(|mut row| {
                    row.document_id = document_id;
                    row
                }));
            }
            rough
        }
    };

    ParsedReport {
        skipped_headers: headers.skipped,
        headers: headers.records,
        blocks: blocks.len(),
        proposals: merge_continuations(rough, layout.merge),
    }
}

fn parse_tabular(content: &str) -> ParsedReport {
    let layout = ReportFormat::Tabular.layout();
    let parser = RowParser::new(layout);

    let mut headers = Vec::new();
    let mut skipped_headers = 0;
    let mut tables = 0;
    let mut proposals = Vec::new();

    for (idx, block) in company_blocks(content).into_iter().enumerate() {
        let document_id = idx as u32 + 1;

        match extract_tabular_header(block.text, document_id) {
            Some(header) => headers.push(header),
            None => {
                skipped_headers += 1;
                tracing::debug!("Company block {} has no recognizable header", document_id);
            }
        }

        if let Some(table) = tabular_table(block.text) {
            tables += 1;
            let rows = parser
                .parse(table)
                .into_iter()
                .map(|mut row| {
                    row.document_id = document_id;
                    row
                })
                .collect();
            proposals.extend(merge_continuations(rows, layout.merge));
        }
    }

    if skipped_headers > 0 {
        tracing::warn!("{} company blocks had no recognizable header and were skipped", skipped_headers);
    }

    ParsedReport {
        headers,
        skipped_headers,
        blocks: tables,
        proposals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::blocks::COMPANY_SEPARATOR;
    use crate::report::join::left_join;

    fn rule() -> String {
        "-".repeat(122)
    }

    fn npx_line(number: &str, description: &str, kind: &str, vote: &str, fam: &str) -> String {
        format!("{:<7}{:<51}{:<14}{:<23}{}", number, description, kind, vote, fam)
    }

    fn npx_header(company: &str, agenda: &str, ticker: &str) -> String {
        format!(
            "{r}\n {company:<60} Agenda Number:  {agenda}\n{r}\n        Security:  00000{agenda}\n    Meeting Type:  Annual\n    Meeting Date:  12-May-2022\n          Ticker:  {ticker}\n            ISIN:  US{agenda}\n{r}\n",
            r = rule(),
        )
    }

    fn npx_table(rows: &[String]) -> String {
        let mut out = format!(
            " Prop.# Proposal{}Proposal      Proposal Vote          For/Against\n",
            " ".repeat(43)
        );
        out.push_str(&format!("{}Type                                 Management\n", " ".repeat(58)));
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    fn npx_filing(company: &str, agenda: &str, ticker: &str, rows: &[String]) -> String {
        npx_header(company, agenda, ticker) + &npx_table(rows)
    }

    fn npx_report() -> String {
        let mut doc = String::from("<TABLE>\nFund: Example Growth Fund\n\n");
        doc.push_str(&npx_filing(
            "ACME CORP.",
            "933012345",
            "ACME",
            &[
                npx_line(" 1", "Approve the amended and restated", "Mgmt", "For", "For"),
                npx_line("", "incentive plan", "", "", ""),
                npx_line(" 2", "DIRECTOR", "Mgmt", "", ""),
                npx_line("", "Alice Smith", "Mgmt", "For", "For"),
                npx_line("", "Bob Jones", "Mgmt", "Withheld", "Against"),
                npx_line(" 3", "Ratify auditors", "Mgmt", "For", "For"),
            ],
        ));
        doc.push_str(&npx_filing(
            "GLOBEX INC.",
            "933054321",
            "GLBX",
            &[npx_line(" 1", "Say on pay", "Mgmt", "Against", "Against")],
        ));
        doc.push_str("</TABLE>\n");
        doc
    }

    #[test]
    fn test_npx_end_to_end() {
        let doc = npx_report();
        for ids in [IdStrategy::Anchored, IdStrategy::Positional] {
            let report = parse_report(&doc, ReportFormat::Npx, ids);
            assert_eq!(report.headers.len(), 2);
            assert_eq!(report.blocks, 2);
            // 7 table lines, one continuation folded in, director names kept
            assert_eq!(report.proposals.len(), 6, "{:?}", ids);

            let p = &report.proposals;
            assert_eq!(p[0].description, "Approve the amended and restated incentive plan");
            assert_eq!(p[1].description, "DIRECTOR");
            assert!(p[1].secondary.iter().all(String::is_empty));
            assert_eq!(p[2].description, "Alice Smith");
            assert_eq!(p[3].secondary, vec!["Mgmt", "Withheld", "Against"]);
            assert_eq!(p[4].number, "3");
            assert_eq!(p[5].description, "Say on pay");

            let ids: Vec<u32> = p.iter().map(|r| r.document_id).collect();
            assert_eq!(ids, vec![1, 1, 1, 1, 1, 2]);

            let rows = left_join(&report.headers, &report.proposals).unwrap();
            assert_eq!(rows.len(), 6);
            assert_eq!(rows[5].header.ticker, "GLBX");
        }
    }

    #[test]
    fn test_anchored_ids_survive_a_filing_without_votes() {
        let mut doc = String::from("<TABLE>\n");
        doc.push_str(&npx_header("ACME CORP.", "933012345", "ACME"));
        doc.push_str(&npx_filing(
            "GLOBEX INC.",
            "933054321",
            "GLBX",
            &[npx_line(" 1", "Say on pay", "Mgmt", "Against", "Against")],
        ));
        doc.push_str("</TABLE>\n");

        let anchored = parse_report(&doc, ReportFormat::Npx, IdStrategy::Anchored);
        let rows = left_join(&anchored.headers, &anchored.proposals).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].header.ticker, "ACME");
        assert!(rows[0].proposal.is_none());
        assert_eq!(rows[1].header.ticker, "GLBX");
        assert_eq!(rows[1].proposal.map(|p| p.description.as_str()), Some("Say on pay"));

        // Counting tables hands the only table to the first filing
        let positional = parse_report(&doc, ReportFormat::Npx, IdStrategy::Positional);
        let rows = left_join(&positional.headers, &positional.proposals).unwrap();
        assert_eq!(rows[0].header.ticker, "ACME");
        assert!(rows[0].proposal.is_some());
    }

    #[test]
    fn test_anchored_drops_table_of_skipped_header() {
        let doc = npx_report().replacen("          Ticker:  GLBX\n", "", 1);
        let report = parse_report(&doc, ReportFormat::Npx, IdStrategy::Anchored);
        assert_eq!(report.headers.len(), 1);
        assert_eq!(report.skipped_headers, 1);
        assert!(report.proposals.iter().all(|p| p.document_id == 1));
        assert_eq!(report.proposals.len(), 5);
    }

    #[test]
    fn test_npx_without_tables() {
        let report = parse_report("no tables here", ReportFormat::Npx, IdStrategy::Anchored);
        assert!(report.headers.is_empty());
        assert!(report.proposals.is_empty());
        assert_eq!(report.blocks, 0);
    }

    fn tabular_line(no: &str, desc: &str, proponent: &str, rec: &str, cast: &str, fam: &str) -> String {
        format!("{:<10}{:<26}{:<11}{:<10}{:<10}{}", no, desc, proponent, rec, cast, fam)
    }

    fn tabular_company(name: &str, ticker: &str, rows: &[String]) -> String {
        let mut out = format!(
            "{name}\nTicker     Security ID:        Meeting Date    Meeting Status\n{ticker:<10} CUSIP 004498101     05/12/2022      Voted\nMeeting Type     Country of Trade\nAnnual           United States\n"
        );
        out.push_str(&tabular_line("Issue No.", "Description", "Proponent", "Mgmt Rec", "Vote Cast", "For/Against"));
        out.push('\n');
        out.push_str(&format!("{}Mgmt\n", " ".repeat(67)));
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_tabular_end_to_end() {
        let mut doc = String::from("Registrant: Example Trust\nReporting period\n\n");
        doc.push_str(COMPANY_SEPARATOR);
        doc.push('\n');
        doc.push_str(&tabular_company(
            "Acme Widgets Inc.",
            "AWI",
            &[
                tabular_line("1.1", "Elect Director Jane Doe", "Mgmt", "For", "For", "For"),
                tabular_line("2", "Approve Remuneration of", "Mgmt", "For", "Against", "Against"),
                tabular_line("", "Directors", "", "", "", ""),
            ],
        ));
        doc.push_str(COMPANY_SEPARATOR);
        doc.push('\n');
        doc.push_str("Malformed Co.\nno grid\n");
        doc.push_str(COMPANY_SEPARATOR);
        doc.push('\n');
        doc.push_str(&tabular_company(
            "Globex Corp.",
            "GLBX",
            &[tabular_line("1", "Ratify Auditors", "Mgmt", "For", "For", "For")],
        ));
        doc.push_str("\n<PAGE>\n SIGNATURES\nPursuant to the requirements\n");

        let report = parse_report(&doc, ReportFormat::Tabular, IdStrategy::Anchored);
        assert_eq!(report.headers.len(), 2);
        assert_eq!(report.skipped_headers, 1);
        assert_eq!(report.headers[1].document_id, 3);
        assert_eq!(report.blocks, 2);

        let p = &report.proposals;
        assert_eq!(p.len(), 3);
        assert_eq!(p[1].description, "Approve Remuneration of Directors");
        assert_eq!(p[1].secondary, vec!["Mgmt", "For", "Against", "Against"]);
        assert_eq!(p[2].document_id, 3);
        assert_eq!(p[2].description, "Ratify Auditors");

        let tables = table_blocks(&doc, ReportFormat::Tabular);
        assert_eq!(tables.len(), 2);
        assert!(tables[0].text.starts_with("1.1"));
        assert_eq!(&doc[tables[0].offset..tables[0].offset + 3], "1.1");
    }
}
