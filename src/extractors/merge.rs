// src/extractors/merge.rs
//! Folds rough table rows into final proposal records.
//!
//! Multi-line descriptions arrive as extra rows with an empty proposal
//! number; they are appended to the record before them. The exception is a
//! `DIRECTOR` proposal, whose unnumbered rows are candidate names and stay
//! records of their own.

use crate::report::format::MergePolicy;
use crate::report::models::{ProposalRecord, RoughRow};
use crate::utils::text::collapse_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Normal,
    /// Inside the name list of the `DIRECTOR` proposal of `document_id`.
    InDirectorList { document_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start a new record.
    Emit,
    /// Append the description to the previous record.
    Append,
    /// Discard the row.
    Drop,
}

fn opens_director_list(row: &RoughRow) -> bool {
    row.description.trim().eq_ignore_ascii_case("DIRECTOR")
}

/// Decides what to do with `row` given the current state and whether a
/// record has been emitted yet. Pure: the caller applies the action.
pub fn transition(
    state: MergeState,
    row: &RoughRow,
    has_previous: bool,
    policy: MergePolicy,
) -> (Action, MergeState) {
    let numbered = !row.number.is_empty();

    let next = if numbered {
        if policy.director_lists && opens_director_list(row) {
            MergeState::InDirectorList { document_id: row.document_id }
        } else {
            MergeState::Normal
        }
    } else {
        match state {
            // A list never spans filings; an id of 0 means the row has none
            MergeState::InDirectorList { document_id }
                if row.document_id != 0 && row.document_id != document_id =>
            {
                MergeState::Normal
            }
            _ => state,
        }
    };

    let action = if !has_previous {
        if numbered || policy.keep_leading_continuation {
            Action::Emit
        } else {
            Action::Drop
        }
    } else if numbered {
        Action::Emit
    } else {
        match next {
            MergeState::InDirectorList { .. } => Action::Emit,
            MergeState::Normal => Action::Append,
        }
    };

    (action, next)
}

/// Runs the fold over `rows` in order and applies the final cleanup:
/// whitespace in descriptions is collapsed and `DIRECTOR` rows lose their
/// secondary fields.
pub fn merge_continuations(rows: Vec<RoughRow>, policy: MergePolicy) -> Vec<ProposalRecord> {
    let (mut merged, _) = rows.into_iter().fold(
        (Vec::<ProposalRecord>::new(), MergeState::Normal),
        |(mut merged, state), row| {
            let (action, next) = transition(state, &row, !merged.is_empty(), policy);
            match action {
                Action::Emit => {
                    let mut record = ProposalRecord::from(row);
                    // Name rows without an id of their own take the list's
                    if let (true, 0, MergeState::InDirectorList { document_id }) =
                        (record.number.is_empty(), record.document_id, next)
                    {
                        record.document_id = document_id;
                    }
                    merged.push(record);
                }
                Action::Append => {
                    if let Some(last) = merged.last_mut() {
                        last.description.push(' ');
                        last.description.push_str(&row.description);
                    }
                }
                Action::Drop => {
                    tracing::debug!("Dropping continuation with no preceding proposal: {:?}", row.description);
                }
            }
            (merged, next)
        },
    );

    for record in &mut merged {
        record.description = collapse_whitespace(&record.description);
        if record.is_director_list() {
            record.secondary.iter_mut().for_each(String::clear);
        }
    }

    merged
}
