//! List iterators (spec §4.2): given a buffer offset sitting on a `(`, `[`,
//! or `{`, split the interior into rows of cell spans.
//!
//! The comma-list/space-list split is the other half of what makes this
//! language hard to tokenize without a parser: `[1, 2, 3]` and `[1 2 3]`
//! must produce the same three cells, but `[1 -2]` and `[1 - 2]` must not.
//! Collapsing this logic into one module (rather than a generic token
//! stream, as `snow-lexer` emits) keeps the whitespace-significance rules
//! next to the scanner primitives they depend on.

use crate::buffer::Buffer;
use crate::error::ParseResult;
use crate::scanner::{self, findend_dots, findend_matrix, findend_paren, findend_string};

/// A cell's source span, half-open `[start, end)`.
pub type Span = (usize, usize);

/// The two ways a delimiter's contents can be split into cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    Comma,
    Space,
}

const TWO_CHAR_OPERATORS: [&str; 8] = [".^", ".\\", "./", ".*", "<=", ">=", "==", "~="];
const LOGIC_OPERATORS: [&str; 2] = ["&&", "||"];
const SINGLE_CHAR_OPERATORS: [char; 7] = ['^', '/', '*', ':', '<', '>', '&'];

fn trim(buf: &Buffer, mut start: usize, mut end: usize) -> Span {
    while start < end && matches!(buf.ch(start), ' ' | '\t' | '\r' | '\n') {
        start += 1;
    }
    while end > start && matches!(buf.ch(end - 1), ' ' | '\t' | '\r' | '\n') {
        end -= 1;
    }
    (start, end)
}

/// Locate the matching close and content bounds for a delimiter opening at
/// `start` (`(`, `[`, or `{`). `{` (bare cell literal) has no balanced-scan
/// primitive of its own in spec §4.1 -- cell literals are an acknowledged
/// "not implemented" stub (spec §7/§9), so callers never reach here with
/// `{`; this function only serves `(` and `[`.
pub fn delimiter_bounds(buf: &Buffer, start: usize) -> ParseResult<(usize, usize)> {
    match buf.ch(start) {
        '(' => {
            let close = findend_paren(buf, start)?;
            Ok((start + 1, close))
        }
        '[' => {
            let close = findend_matrix(buf, start)?;
            Ok((start + 1, close))
        }
        _ => unreachable!("delimiter_bounds called on non-paren/bracket"),
    }
}

/// Auto-detect comma-list vs space-list by scanning from `content_start`
/// for the first top-level comma/semicolon (-> comma) or any other
/// separator (whitespace, newline, or end of content -> space).
pub fn detect_mode(buf: &Buffer, content_start: usize, content_end: usize) -> ParseResult<ListMode> {
    let mut i = content_start;
    while i < content_end {
        let c = buf.ch(i);
        match c {
            ',' | ';' => return Ok(ListMode::Comma),
            ' ' | '\t' | '\n' | '\r' => return Ok(ListMode::Space),
            '(' => i = findend_paren(buf, i)? + 1,
            '[' => i = findend_matrix(buf, i)? + 1,
            '\'' if scanner::follows_operand(buf, i) => i += 1,
            '\'' => i = findend_string(buf, i)? + 1,
            _ if buf.starts_with(i, "...") => i = findend_dots(buf, i)? + 1,
            _ => i += 1,
        }
    }
    Ok(ListMode::Space)
}

/// Split `[content_start, content_end)` on top-level `,` (new cell) and
/// `;`/`\n` (new row).
pub fn iterate_comma_list(buf: &Buffer, content_start: usize, content_end: usize) -> ParseResult<Vec<Vec<Span>>> {
    let mut rows: Vec<Vec<Span>> = vec![Vec::new()];
    let mut cell_start = content_start;
    let mut i = content_start;
    while i < content_end {
        let c = buf.ch(i);
        match c {
            ',' => {
                rows.last_mut().unwrap().push(trim(buf, cell_start, i));
                i += 1;
                cell_start = i;
            }
            ';' | '\n' => {
                rows.last_mut().unwrap().push(trim(buf, cell_start, i));
                rows.push(Vec::new());
                i += 1;
                cell_start = i;
            }
            '(' => i = findend_paren(buf, i)? + 1,
            '[' => i = findend_matrix(buf, i)? + 1,
            '\'' if scanner::follows_operand(buf, i) => i += 1,
            '\'' => i = findend_string(buf, i)? + 1,
            _ if buf.starts_with(i, "...") => i = findend_dots(buf, i)? + 1,
            _ => i += 1,
        }
    }
    if cell_start < content_end || content_start == content_end {
        rows.last_mut().unwrap().push(trim(buf, cell_start, content_end));
    }
    rows.retain(|row| !(row.len() == 1 && row[0].0 == row[0].1));
    if rows.is_empty() {
        rows.push(Vec::new());
    }
    Ok(rows)
}

/// Classify the character at `j` (the first non-whitespace character
/// following a whitespace run) as one of the operator-absorption rules in
/// spec §4.2 items 1-4. Returns the new position to resume scanning from
/// on a non-boundary, or `None` if the whitespace run is an ordinary cell
/// boundary.
fn absorb_operator_whitespace(buf: &Buffer, j: usize) -> Option<usize> {
    for op in TWO_CHAR_OPERATORS.iter().chain(LOGIC_OPERATORS.iter()) {
        if buf.starts_with(j, op) {
            let after = j + op.len();
            let (skipped, _) = scanner::skip_ws_nl(buf, after);
            return Some(skipped);
        }
    }
    let c = buf.ch(j);
    if c == '+' || c == '-' {
        // Rule 3: binary +/- has whitespace on both sides. Rule 2: a sign
        // joined to the next token (no trailing whitespace) is unary and
        // starts a new cell, so it is NOT absorbed here.
        let next = buf.ch(j + 1);
        if matches!(next, ' ' | '\t' | '\n' | '\r') {
            let (skipped, _) = scanner::skip_ws_nl(buf, j + 1);
            return Some(skipped);
        }
        return None;
    }
    if SINGLE_CHAR_OPERATORS.contains(&c) {
        let (skipped, _) = scanner::skip_ws_nl(buf, j + 1);
        return Some(skipped);
    }
    None
}

/// Split `[content_start, content_end)` on whitespace runs (subject to the
/// operator-absorption rules) and on `,`/`;`/`\n`.
pub fn iterate_space_list(buf: &Buffer, content_start: usize, content_end: usize) -> ParseResult<Vec<Vec<Span>>> {
    let mut rows: Vec<Vec<Span>> = vec![Vec::new()];
    let mut cell_start = content_start;
    let mut i = content_start;

    while i < content_end {
        let c = buf.ch(i);
        match c {
            '(' => {
                i = findend_paren(buf, i)? + 1;
                continue;
            }
            '[' => {
                i = findend_matrix(buf, i)? + 1;
                continue;
            }
            '\'' if scanner::follows_operand(buf, i) => {
                i += 1;
                continue;
            }
            '\'' => {
                i = findend_string(buf, i)? + 1;
                continue;
            }
            _ if buf.starts_with(i, "...") => {
                i = findend_dots(buf, i)? + 1;
                continue;
            }
            ',' => {
                rows.last_mut().unwrap().push(trim(buf, cell_start, i));
                i += 1;
                while i < content_end && matches!(buf.ch(i), ' ' | '\t' | ',') {
                    i += 1;
                }
                cell_start = i;
                continue;
            }
            ';' => {
                rows.last_mut().unwrap().push(trim(buf, cell_start, i));
                rows.push(Vec::new());
                i += 1;
                while i < content_end && matches!(buf.ch(i), ' ' | '\t' | ';' | '\n') {
                    i += 1;
                }
                cell_start = i;
                continue;
            }
            ' ' | '\t' | '\r' | '\n' => {
                let had_newline = c == '\n' || {
                    let mut k = i;
                    let mut found = false;
                    while k < content_end && matches!(buf.ch(k), ' ' | '\t' | '\r' | '\n') {
                        if buf.ch(k) == '\n' {
                            found = true;
                        }
                        k += 1;
                    }
                    found
                };
                let (after_ws, _) = scanner::skip_ws_nl(buf, i);
                if after_ws >= content_end {
                    rows.last_mut().unwrap().push(trim(buf, cell_start, i));
                    i = after_ws;
                    cell_start = i;
                    continue;
                }
                if let Some(resume) = absorb_operator_whitespace(buf, after_ws) {
                    i = resume;
                    continue;
                }
                rows.last_mut().unwrap().push(trim(buf, cell_start, i));
                if had_newline {
                    rows.push(Vec::new());
                }
                i = after_ws;
                cell_start = i;
                continue;
            }
            _ => i += 1,
        }
    }
    if cell_start < content_end {
        rows.last_mut().unwrap().push(trim(buf, cell_start, content_end));
    }
    rows.retain(|row| !row.is_empty());
    if rows.is_empty() {
        rows.push(Vec::new());
    }
    Ok(rows)
}

/// Auto-detect the delimiter's list mode and split it into rows of cells.
pub fn iterate_list(buf: &Buffer, start: usize) -> ParseResult<Vec<Vec<Span>>> {
    let (content_start, close) = delimiter_bounds(buf, start)?;
    let content_end = close; // close is the inclusive index of the closer; content ends just before it
    match detect_mode(buf, content_start, content_end)? {
        ListMode::Comma => iterate_comma_list(buf, content_start, content_end),
        ListMode::Space => iterate_space_list(buf, content_start, content_end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(buf: &Buffer, rows: &[Vec<Span>]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|&(s, e)| buf.slice(s, e).to_string()).collect())
            .collect()
    }

    #[test]
    fn comma_matrix_three_cells() {
        let buf = Buffer::new("[1,2,3]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["1", "2", "3"]]);
    }

    #[test]
    fn space_matrix_three_cells() {
        let buf = Buffer::new("[1 2 3]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["1", "2", "3"]]);
    }

    #[test]
    fn space_matrix_unary_minus_is_new_cell() {
        let buf = Buffer::new("[1 -2]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["1", "-2"]]);
    }

    #[test]
    fn space_matrix_binary_minus_stays_one_cell() {
        let buf = Buffer::new("[1 - 2]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["1 - 2"]]);
    }

    #[test]
    fn semicolon_rows() {
        let buf = Buffer::new("[1,2;3,4]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn newline_rows_in_space_list() {
        let buf = Buffer::new("[1 2\n3 4]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["1", "2"], vec!["3", "4"]]);
    }

    #[test]
    fn elmul_operator_keeps_single_cell() {
        let buf = Buffer::new("[a .* b]");
        let rows = iterate_list(&buf, 0).unwrap();
        assert_eq!(cells(&buf, &rows), vec![vec!["a .* b"]]);
    }
}
