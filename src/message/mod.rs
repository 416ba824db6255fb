//! Received message types.
//!
//! A [`Line`] is the immutable result of decoding one raw protocol line.
//! It is created fresh per received line and discarded after dispatch.

mod parse;

use crate::error::MessageParseError;

use self::parse::split_line;

/// The origin of a received line, taken from its prefix.
///
/// Exactly one of the two shapes applies to any prefixed line; a line with
/// no prefix has no source at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A user origin: `nick!ident@host`.
    User {
        /// The sender's nickname.
        name: String,
        /// The sender's ident (username).
        ident: String,
        /// The sender's host.
        host: String,
    },
    /// A server origin: a bare token with no `!`.
    Server(String),
}

impl Source {
    /// Parse a prefix token (without the leading `:`) into a source.
    ///
    /// A token containing `!` must carry the full `nick!ident@host` shape;
    /// anything else with a `!` is malformed. A token without `!` is a
    /// server origin, `@` and all.
    fn parse(prefix: &str) -> Result<Source, MessageParseError> {
        match prefix.split_once('!') {
            Some((name, rest)) => {
                let (ident, host) = rest
                    .split_once('@')
                    .ok_or_else(|| MessageParseError::InvalidPrefix(prefix.to_string()))?;
                if name.is_empty() || ident.is_empty() || host.is_empty() {
                    return Err(MessageParseError::InvalidPrefix(prefix.to_string()));
                }
                Ok(Source::User {
                    name: name.to_string(),
                    ident: ident.to_string(),
                    host: host.to_string(),
                })
            }
            None => Ok(Source::Server(prefix.to_string())),
        }
    }
}

/// One decoded protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The line as received, terminator stripped.
    pub raw: String,
    /// The command token, as received. Decoding does not validate it
    /// against known IRC verbs.
    pub command: String,
    /// Middle parameters. Empty when the line has none, never a
    /// one-element vec of the empty string.
    pub params: Vec<String>,
    /// The trailing parameter, if present. May contain spaces.
    pub message: Option<String>,
    /// The origin carried by the prefix, if any.
    pub source: Option<Source>,
}

impl Line {
    /// Decode one raw received line.
    ///
    /// Trailing `\r`/`\n` is stripped before parsing. Fails if the line is
    /// empty, has a prefix but no command, or carries a malformed user
    /// prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use slirc_bot::message::Line;
    ///
    /// let line = Line::parse(":nick!user@host PRIVMSG #chan :hello").unwrap();
    /// assert_eq!(line.command, "PRIVMSG");
    /// assert_eq!(line.params, vec!["#chan"]);
    /// assert_eq!(line.message.as_deref(), Some("hello"));
    /// ```
    pub fn parse(raw: &str) -> Result<Line, MessageParseError> {
        let trimmed = raw.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        let parsed = split_line(trimmed)?;
        let source = parsed.prefix.map(Source::parse).transpose()?;

        Ok(Line {
            raw: trimmed.to_string(),
            command: parsed.command.to_string(),
            params: parsed.params.into_iter().map(str::to_string).collect(),
            message: parsed.trailing.map(str::to_string),
            source,
        })
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
