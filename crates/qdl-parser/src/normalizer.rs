use log::debug;
use qdl_core::{
    QdlError, SourceLocation, BRANCH_CLOSE, BRANCH_OPEN, COMMANDS_CLOSE,
    COMMANDS_OPEN, COMMAND_DELIMITER, QUOTE, TITLE_CLOSE, TITLE_OPEN,
};

/// Delimited regions that keep their whitespace without being strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuasiRegion {
    Title,
    Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharOrigin {
    pub index: usize,
    pub location: SourceLocation,
}

/// Source text with formatting whitespace removed. Every kept char remembers
/// where it came from in the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSource {
    text: String,
    origins: Vec<CharOrigin>,
}

impl NormalizedSource {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Origin of the `position`-th char of the normalized text.
    pub fn origin(&self, position: usize) -> Option<CharOrigin> {
        self.origins.get(position).copied()
    }

    pub fn len_chars(&self) -> usize {
        self.origins.len()
    }
}

pub fn normalize(source: &str) -> Result<NormalizedSource, QdlError> {
    check_balance(source)?;
    let normalized = strip_whitespace(source);
    debug!(
        "normalized {} chars down to {}",
        source.chars().count(),
        normalized.len_chars()
    );
    Ok(normalized)
}

/// Drops whitespace outside strings, titles and command lists. Command lists
/// keep theirs verbatim; the builder decides which of it is layout.
pub fn strip_whitespace(source: &str) -> NormalizedSource {
    let mut text = String::with_capacity(source.len());
    let mut origins = Vec::with_capacity(source.len());
    let mut in_string = false;
    let mut quasi: Option<QuasiRegion> = None;

    for (index, location, ch) in located_chars(source) {
        let keep = if ch == QUOTE {
            in_string = !in_string;
            true
        } else if in_string {
            true
        } else {
            match ch {
                TITLE_OPEN => {
                    quasi = Some(QuasiRegion::Title);
                    true
                }
                TITLE_CLOSE if quasi == Some(QuasiRegion::Title) => {
                    quasi = None;
                    true
                }
                COMMANDS_OPEN => {
                    quasi = Some(QuasiRegion::Commands);
                    true
                }
                COMMANDS_CLOSE if quasi == Some(QuasiRegion::Commands) => {
                    quasi = None;
                    true
                }
                ch if ch.is_whitespace() => quasi.is_some(),
                _ => true,
            }
        };

        if keep {
            text.push(ch);
            origins.push(CharOrigin { index, location });
        }
    }

    NormalizedSource { text, origins }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Title,
    Branch,
    Commands,
}

impl Context {
    fn closer(self) -> char {
        match self {
            Self::Title => TITLE_CLOSE,
            Self::Branch => BRANCH_CLOSE,
            Self::Commands => COMMANDS_CLOSE,
        }
    }
}

/// Rejects unbalanced, nested or misplaced delimiters and unterminated
/// strings, pointing at the earliest offending char.
pub fn check_balance(source: &str) -> Result<(), QdlError> {
    let mut open: Vec<(Context, usize, SourceLocation)> = Vec::new();
    let mut string_open: Option<(usize, SourceLocation)> = None;

    for (index, location, ch) in located_chars(source) {
        if ch == QUOTE {
            string_open = match string_open {
                Some(_) => None,
                None => Some((index, location)),
            };
            continue;
        }
        if string_open.is_some() {
            continue;
        }

        let context = open.last().map(|(context, _, _)| *context);
        match (context, ch) {
            (None, TITLE_OPEN) => open.push((Context::Title, index, location)),
            (None, BRANCH_OPEN) => open.push((Context::Branch, index, location)),
            (Some(Context::Branch), COMMANDS_OPEN) => {
                open.push((Context::Commands, index, location))
            }
            (Some(Context::Commands), COMMAND_DELIMITER) => {}
            (Some(current), ch) if ch == current.closer() => {
                open.pop();
            }
            (_, TITLE_OPEN | BRANCH_OPEN | COMMANDS_OPEN) => {
                let nested = open.iter().any(|(context, _, _)| match context {
                    Context::Title => ch == TITLE_OPEN,
                    Context::Branch => ch == BRANCH_OPEN,
                    Context::Commands => ch == COMMANDS_OPEN,
                });
                let (code, message) = if nested {
                    ("QDL_SYNTAX_NESTED", format!("'{}' opened again before closing.", ch))
                } else {
                    ("QDL_SYNTAX_UNEXPECTED", format!("'{}' is not allowed here.", ch))
                };
                return Err(QdlError::at(code, message, index, ch, location));
            }
            (_, TITLE_CLOSE | BRANCH_CLOSE | COMMANDS_CLOSE) => {
                return Err(QdlError::at(
                    "QDL_SYNTAX_UNBALANCED",
                    format!("'{}' does not close an open delimiter.", ch),
                    index,
                    ch,
                    location,
                ));
            }
            (_, COMMAND_DELIMITER) => {
                return Err(QdlError::at(
                    "QDL_SYNTAX_UNEXPECTED",
                    "';' outside of a command list.",
                    index,
                    ch,
                    location,
                ));
            }
            _ => {}
        }
    }

    if let Some((index, location)) = string_open {
        return Err(QdlError::at(
            "QDL_SYNTAX_UNTERMINATED",
            "String never closes.",
            index,
            QUOTE,
            location,
        ));
    }

    if let Some((context, index, location)) = open.first() {
        let opener = match context {
            Context::Title => TITLE_OPEN,
            Context::Branch => BRANCH_OPEN,
            Context::Commands => COMMANDS_OPEN,
        };
        return Err(QdlError::at(
            "QDL_SYNTAX_UNTERMINATED",
            format!("'{}' is never closed.", opener),
            *index,
            opener,
            *location,
        ));
    }

    Ok(())
}

fn located_chars(source: &str) -> impl Iterator<Item = (usize, SourceLocation, char)> + '_ {
    let mut line = 1usize;
    let mut column = 1usize;
    source.chars().enumerate().map(move |(index, ch)| {
        let location = SourceLocation { line, column };
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
        (index, location, ch)
    })
}
