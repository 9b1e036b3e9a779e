//! Wrapping math for `TextField`: inner width, wrapped row counts and the
//! caret's row/column. Everything here is pure and takes the buffer by
//! reference.

use ratatui::layout::Rect;

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to content
pub(super) const BORDER_OFFSET: u16 = 1;

pub(super) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Wrapped row count, counting a trailing newline as its own empty row.
pub(super) fn row_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let rows = textwrap::wrap(text, wrap_options(width));
    let mut count = (rows.len() as u16).max(1);
    if text.ends_with('\n') && !rows.last().is_some_and(|r| r.is_empty()) {
        count += 1;
    }
    count
}

/// Row (0-based) the caret at byte `pos` sits on.
pub(super) fn caret_row(text: &str, pos: usize, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    row_count(&text[..pos], width).saturating_sub(1)
}

/// Column of the caret within its wrapped row, in chars.
///
/// textwrap drops trailing spaces from wrapped rows, so they are added back
/// from the logical line.
pub(super) fn caret_col(text: &str, pos: usize, width: u16) -> u16 {
    let before = &text[..pos];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let logical = &before[line_start..];
    if width == 0 || logical.is_empty() {
        return 0;
    }
    let rows = textwrap::wrap(logical, wrap_options(width));
    let last = rows.last().map(|r| r.chars().count()).unwrap_or(0);
    let trailing = logical.len() - logical.trim_end_matches(' ').len();
    (last + trailing) as u16
}

/// Screen position of the caret inside a bordered field at `area`.
pub(super) fn caret_screen_pos(text: &str, pos: usize, area: Rect, scroll: u16) -> (u16, u16) {
    let width = inner_width(area.width);
    let row = caret_row(text, pos, width).saturating_sub(scroll);
    let col = caret_col(text, pos, width);
    (
        area.x + BORDER_OFFSET + col,
        area.y + BORDER_OFFSET + row,
    )
}

/// Byte offset one wrapped row above (`-1`) or below (`1`) `pos`, keeping
/// the column where possible. `None` at the first/last row.
pub(super) fn vertical_target(text: &str, pos: usize, direction: i16, width: u16) -> Option<usize> {
    if width == 0 || text.is_empty() {
        return None;
    }
    let rows = textwrap::wrap(text, wrap_options(width));

    // Byte span of each row, including the hard newline that ends it
    let mut starts = Vec::with_capacity(rows.len());
    let mut offset = 0;
    for row in &rows {
        starts.push(offset);
        let ends_with_newline =
            offset + row.len() < text.len() && text.as_bytes()[offset + row.len()] == b'\n';
        offset += row.len() + usize::from(ends_with_newline);
    }

    let current = starts
        .iter()
        .zip(&rows)
        .position(|(&start, row)| start + row.len() >= pos)
        .unwrap_or(rows.len() - 1);
    let column = pos.saturating_sub(starts[current]);

    let target = match direction {
        d if d < 0 => current.checked_sub(1)?,
        _ if current + 1 < rows.len() => current + 1,
        _ => return None,
    };
    Some(starts[target] + column.min(rows[target].len()))
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos` (readline `backward-word`).
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[..pos].char_indices().rev().peekable();
    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }
    let mut boundary = 0;
    while let Some(&(i, c)) = chars.peek() {
        if !is_word_char(c) {
            boundary = i + c.len_utf8();
            break;
        }
        boundary = i;
        chars.next();
    }
    boundary
}

/// End of the word after `pos` (readline `forward-word`).
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[pos..].char_indices().peekable();
    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }
    while chars.peek().is_some_and(|&(_, c)| is_word_char(c)) {
        chars.next();
    }
    chars.peek().map(|&(i, _)| pos + i).unwrap_or(text.len())
}
