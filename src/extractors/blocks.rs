// src/extractors/blocks.rs

// --- Imports ---
use crate::report::models::ProposalBlock;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Constants ---
/// Separator between company blocks in tabular reports.
pub const COMPANY_SEPARATOR: &str =
    "____________________________________________________________________";

/// Closing line appended to the intermediate blocks artifact.
pub const BLOCKS_TRAILER: &str = "--------------------------------------------------------------------------------------------------------------------------";

// --- Regex Patterns (Lazy Static) ---
// A dashed rule followed by the `Prop.# Proposal` column header opens a table
static BLOCK_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-{50,}\s+Prop\.# Proposal").expect("Failed to compile BLOCK_START_RE")
});

// The next dashed rule or the end of the HTML table closes it
static BLOCK_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*-{50,}|</TABLE>").expect("Failed to compile BLOCK_END_RE")
});

static SIGNATURES_FOOTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<PAGE>\s+SIGNATURES").expect("Failed to compile SIGNATURES_FOOTER_RE")
});

static TABULAR_TABLE_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"For/Against\s+Mgmt\n").expect("Failed to compile TABULAR_TABLE_START_RE")
});

/// Lazily yields the proposal tables of an npx report, in document order.
pub fn proposal_blocks(content: &str) -> ProposalBlocks<'_> {
    ProposalBlocks { content, pos: 0 }
}

pub struct ProposalBlocks<'a> {
    content: &'a str,
    pos: usize,
}

impl<'a> Iterator for ProposalBlocks<'a> {
    type Item = ProposalBlock<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.content.len() {
            return None;
        }
        let start = BLOCK_START_RE.find_at(self.content, self.pos)?;
        // Without an end marker the block is never closed, and neither is any later one
        let end = match BLOCK_END_RE.find_at(self.content, start.end()) {
            Some(end) => end,
            None => {
                tracing::debug!("Unterminated proposal block at offset {}", start.start());
                self.pos = self.content.len() + 1;
                return None;
            }
        };
        self.pos = end.start();
        Some(ProposalBlock {
            offset: start.start(),
            text: &self.content[start.start()..end.start()],
        })
    }
}

/// Renders blocks as the intermediate text artifact: blank-line separated,
/// closed by a dashed rule.
pub fn render_blocks<'a, I>(blocks: I) -> String
where
    I: IntoIterator<Item = ProposalBlock<'a>>,
{
    let mut out = blocks
        .into_iter()
        .map(|b| b.text)
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out.push_str(BLOCKS_TRAILER);
    out
}

/// Splits a tabular report into per-company blocks, numbered from 1.
///
/// Everything before the first separator is preamble and everything from the
/// signatures page on is footer; blank blocks do not consume an id.
pub fn company_blocks(content: &str) -> Vec<ProposalBlock<'_>> {
    let body_start = content.find(COMPANY_SEPARATOR).unwrap_or(0);
    let body_end = SIGNATURES_FOOTER_RE
        .find_at(content, body_start)
        .map(|m| m.start())
        .unwrap_or(content.len());
    let body = &content[body_start..body_end];

    let mut blocks = Vec::new();
    let mut offset = body_start;
    for piece in body.split(COMPANY_SEPARATOR) {
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            let lead = piece.len() - piece.trim_start().len();
            blocks.push(ProposalBlock {
                offset: offset + lead,
                text: trimmed,
            });
        }
        offset += piece.len() + COMPANY_SEPARATOR.len();
    }
    blocks
}

/// The proposal table of one tabular company block: every line after the
/// `For/Against Mgmt` column header.
pub fn tabular_table(block: &str) -> Option<&str> {
    TABULAR_TABLE_START_RE
        .find(block)
        .map(|m| &block[m.end()..])
}
