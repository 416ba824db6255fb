//! Nom-based parser for received lines.
//!
//! Splits one raw line into prefix, command, middle parameters, and
//! trailing text. Grammar:
//!
//! ```text
//! [':' prefix ' '] command [' ' middles]? [' :' trailing]?
//! ```

use nom::{bytes::complete::take_while1, character::complete::char, sequence::preceded, IResult};

use crate::error::MessageParseError;

/// A split line with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawLine<'a> {
    /// Raw prefix (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command token.
    pub command: &'a str,
    /// Middle parameters, not including the trailing.
    pub params: Vec<&'a str>,
    /// Trailing text (without the ` :` introducer), if present.
    pub trailing: Option<&'a str>,
}

/// Parse the prefix (the part after `:` and before the first space).
fn prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command token: any run of non-whitespace characters.
///
/// This layer is purely textual; it does not validate that the token is a
/// known IRC verb.
fn command(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(input)
}

/// Split a complete line into its components.
///
/// The input must already have its line terminator stripped.
pub(crate) fn split_line(input: &str) -> Result<RawLine<'_>, MessageParseError> {
    let (rest, pfx) = match prefix(input) {
        Ok((rest, pfx)) => {
            let rest = rest
                .strip_prefix(' ')
                .ok_or(MessageParseError::MissingCommand)?;
            (rest, Some(pfx))
        }
        Err(_) => (input, None),
    };

    let (mut rest, cmd) = command(rest).map_err(|_| MessageParseError::MissingCommand)?;

    let mut params = Vec::new();
    let mut trailing = None;

    while let Some(stripped) = rest.strip_prefix(' ') {
        if let Some(text) = stripped.strip_prefix(':') {
            // Trailing parameter consumes the remainder verbatim.
            trailing = Some(text);
            break;
        }

        let end = stripped.find(' ').unwrap_or(stripped.len());
        if end == 0 {
            break;
        }
        params.push(&stripped[..end]);
        rest = &stripped[end..];
    }

    Ok(RawLine {
        prefix: pfx,
        command: cmd,
        params,
        trailing,
    })
}
