//! Serialization of outgoing command lines.
//!
//! The encode side of the line codec: builds one raw protocol line from a
//! command name, a list of middle parameters, and an optional trailing
//! message.

/// Serialize one outgoing line.
///
/// The command is upper-cased. Non-empty params are joined by single
/// spaces. A trailing message, if present, is appended after ` :` verbatim,
/// even if it contains spaces or a leading `:`. The line is terminated
/// with a single `\n`.
///
/// No length limit is enforced here; the 512-byte limit of the IRC wire
/// protocol is left to the server to police.
///
/// # Examples
///
/// ```
/// use slirc_bot::encode;
///
/// assert_eq!(encode::line("nick", &["slircbot"], None), "NICK slircbot\n");
/// assert_eq!(
///     encode::line("USER", &["bot", "0", "*"], Some("A Bot")),
///     "USER bot 0 * :A Bot\n"
/// );
/// ```
pub fn line(command: &str, params: &[&str], message: Option<&str>) -> String {
    let mut result = command.to_uppercase();

    if !params.is_empty() {
        result.push(' ');
        result.push_str(&params.join(" "));
    }

    if let Some(message) = message {
        result.push_str(" :");
        result.push_str(message);
    }

    result.push('\n');
    result
}
