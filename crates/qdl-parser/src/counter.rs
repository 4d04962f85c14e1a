use log::debug;
use qdl_core::{QdlError, BRANCH_CLOSE, COMMANDS_CLOSE, COMMAND_DELIMITER, QUOTE};

use crate::normalizer::NormalizedSource;

/// Exact table sizes for the tree builder: branches, objects per branch and
/// commands per object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCounts {
    branch_count: usize,
    object_counts: Box<[usize]>,
    command_counts: Box<[Box<[usize]>]>,
}

impl SectionCounts {
    pub fn branch_count(&self) -> usize {
        self.branch_count
    }

    pub fn object_count(&self, branch: usize) -> Option<usize> {
        self.object_counts.get(branch).copied()
    }

    pub fn command_count(&self, branch: usize, object: usize) -> Option<usize> {
        self.command_counts
            .get(branch)
            .and_then(|objects| objects.get(object))
            .copied()
    }
}

/// Structural chars outside strings, in order.
fn structural_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    let mut in_string = false;
    text.chars().filter(move |&ch| {
        if ch == QUOTE {
            in_string = !in_string;
            return false;
        }
        !in_string
    })
}

pub fn count_sections(source: &NormalizedSource) -> Result<SectionCounts, QdlError> {
    let text = source.as_str();

    let branch_count = structural_chars(text)
        .filter(|&ch| ch == BRANCH_CLOSE)
        .count();

    let mut object_counts = vec![0usize; branch_count].into_boxed_slice();
    let mut branch = 0usize;
    for ch in structural_chars(text) {
        match ch {
            BRANCH_CLOSE => branch += 1,
            COMMANDS_CLOSE => {
                let slot = object_counts
                    .get_mut(branch)
                    .ok_or_else(|| outside_branch(COMMANDS_CLOSE))?;
                *slot += 1;
            }
            _ => {}
        }
    }

    let mut command_counts = object_counts
        .iter()
        .map(|&objects| vec![0usize; objects].into_boxed_slice())
        .collect::<Box<[_]>>();
    let mut branch = 0usize;
    let mut object = 0usize;
    for ch in structural_chars(text) {
        match ch {
            BRANCH_CLOSE => {
                branch += 1;
                object = 0;
            }
            COMMANDS_CLOSE => object += 1,
            COMMAND_DELIMITER => {
                let slot = command_counts
                    .get_mut(branch)
                    .and_then(|objects| objects.get_mut(object))
                    .ok_or_else(|| outside_branch(COMMAND_DELIMITER))?;
                *slot += 1;
            }
            _ => {}
        }
    }

    debug!(
        "counted {} branches, {} objects",
        branch_count,
        object_counts.iter().sum::<usize>()
    );

    Ok(SectionCounts {
        branch_count,
        object_counts,
        command_counts,
    })
}

fn outside_branch(ch: char) -> QdlError {
    QdlError::new(
        "QDL_COUNT_OUT_OF_BOUNDS",
        format!("'{}' appears after the last branch closes.", ch),
    )
}
