//! Backtick quoting of YQL identifiers.
//!
//! [`quote_to`] quotes a possibly dotted identifier segment by segment in a
//! single pass. Input that is already quoted keeps its quotes and literal
//! backticks inside a segment are doubled. Every character of the output
//! other than the dots separating segments lies inside a quoted identifier.

/// Per-segment state of [`quote_to`].
#[derive(Default)]
struct Segment {
    /// The opening quote has been written.
    opened: bool,
    /// The opening quote came from the input.
    self_quoted: bool,
    /// Backticks read but not yet written.
    pending: usize,
}

impl Segment {
    fn push_content(&mut self, out: &mut String, c: char) {
        if !self.opened {
            out.push('`');
            self.opened = true;
            if self.pending > 0 {
                self.self_quoted = true;
                self.pending -= 1;
            }
        }
        push_escaped(out, self.pending);
        self.pending = 0;
        out.push(c);
    }

    fn close(self, out: &mut String) {
        if self.opened {
            // a pending run of a self-quoted segment ends with its closing quote
            let run = if self.self_quoted {
                self.pending.saturating_sub(1)
            } else {
                self.pending
            };
            push_escaped(out, run);
            out.push('`');
        } else if self.pending > 0 {
            // backticks only: an empty quoted identifier
            out.push('`');
            push_escaped(out, self.pending.saturating_sub(2));
            out.push('`');
        }
    }
}

/// Writes a run of `n` literal backticks as escaped pairs.
fn push_escaped(out: &mut String, n: usize) {
    for _ in 0..n.div_ceil(2) {
        out.push_str("``");
    }
}

/// Appends the quoted form of `identifier` to `out`.
///
/// ```
/// use ydb_sql_core::quote::quote_to;
///
/// let mut out = String::new();
/// quote_to(&mut out, "orders.id");
/// assert_eq!(out, "`orders`.`id`");
/// ```
pub fn quote_to(out: &mut String, identifier: &str) {
    let mut segment = Segment::default();
    for c in identifier.chars() {
        match c {
            '`' => segment.pending += 1,
            '.' if segment.self_quoted && segment.pending == 0 => segment.push_content(out, c),
            '.' => {
                std::mem::take(&mut segment).close(out);
                out.push('.');
            }
            _ => segment.push_content(out, c),
        }
    }
    segment.close(out);
}

/// Returns the quoted form of `identifier`.
#[must_use]
pub fn quote(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 2);
    quote_to(&mut out, identifier);
    out
}

/// Appends `path` quoted as one identifier.
///
/// Table paths such as `/local/app/users` may contain dots that must not
/// split the identifier, so only backticks are escaped.
pub fn quote_path_to(out: &mut String, path: &str) {
    out.push('`');
    for c in path.chars() {
        if c == '`' {
            out.push_str("``");
        } else {
            out.push(c);
        }
    }
    out.push('`');
}

/// Returns `path` quoted as one identifier.
#[must_use]
pub fn quote_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    quote_path_to(&mut out, path);
    out
}
