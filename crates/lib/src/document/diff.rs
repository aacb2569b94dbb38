//! Unified diffs.
//!
//! [`plan`] matches a unified diff against the current content of a text and
//! turns every run of deleted and added lines into one [`TextEdit`], so only
//! the characters the diff touches are replaced. Context and deleted lines
//! must match the text exactly.
//!
//! A diff without `@@` hunk headers is read as a single hunk starting at the
//! first line. Lines outside hunks (`diff --git`, `index`, `---`, `+++`) are
//! ignored, as are `\ No newline at end of file` markers: the patched text
//! ends with a newline exactly when the old text did.

use super::text::TextEdit;

#[derive(Debug, Clone, PartialEq)]
enum Line<'a> {
    Context(&'a str),
    Delete(&'a str),
    Add(&'a str),
}

#[derive(Debug, PartialEq)]
struct Hunk<'a> {
    /// Zero-based index of the first old line the hunk covers.
    old_start: usize,
    lines: Vec<Line<'a>>,
}

/// Parses `l` or `l,s` from a hunk header.
fn parse_range(range: &str) -> Option<(usize, usize)> {
    let (line, count) = match range.split_once(',') {
        Some((line, count)) => (line.parse().ok()?, count.parse().ok()?),
        None => (range.parse().ok()?, 1),
    };
    Some((line, count))
}

/// Old start line, old line count and new line count of `@@ -a,b +c,d @@`.
fn parse_header(header: &str) -> Result<(usize, usize, usize), String> {
    let mut parts = header.split_whitespace().skip(1);
    let ranges = parts
        .next()
        .and_then(|old| old.strip_prefix('-'))
        .and_then(parse_range)
        .zip(
            parts
                .next()
                .and_then(|new| new.strip_prefix('+'))
                .and_then(parse_range),
        );
    let Some(((old_line, old_count), (_, new_count))) = ranges else {
        return Err(format!("malformed hunk header '{header}'"));
    };
    // An empty range names the line before it.
    let old_start = if old_count == 0 {
        old_line
    } else {
        old_line.saturating_sub(1)
    };
    Ok((old_start, old_count, new_count))
}

fn parse_line(line: &str) -> Option<Line<'_>> {
    if let Some(rest) = line.strip_prefix('-') {
        Some(Line::Delete(rest))
    } else if let Some(rest) = line.strip_prefix('+') {
        Some(Line::Add(rest))
    } else if let Some(rest) = line.strip_prefix(' ') {
        Some(Line::Context(rest))
    } else if line.starts_with('\\') {
        None
    } else {
        // Some tools strip the leading space off blank context lines.
        Some(Line::Context(line))
    }
}

fn parse(diff: &str) -> Result<Vec<Hunk<'_>>, String> {
    let mut lines = diff.lines().peekable();
    let mut hunks = Vec::new();

    if !diff.lines().any(|line| line.starts_with("@@")) {
        let lines = lines
            .filter(|line| {
                !(line.starts_with("---") || line.starts_with("+++") || line.is_empty())
            })
            .filter_map(parse_line)
            .collect();
        return Ok(vec![Hunk { old_start: 0, lines }]);
    }

    while let Some(line) = lines.next() {
        if !line.starts_with("@@") {
            continue;
        }
        let (old_start, mut old_left, mut new_left) = parse_header(line)?;
        let mut hunk = Hunk {
            old_start,
            lines: Vec::new(),
        };
        while old_left > 0 || new_left > 0 {
            let Some(line) = lines.next() else {
                return Err(format!("hunk at line {} ends early", old_start + 1));
            };
            let Some(parsed) = parse_line(line) else {
                continue;
            };
            match parsed {
                Line::Context(_) => {
                    old_left = old_left.saturating_sub(1);
                    new_left = new_left.saturating_sub(1);
                }
                Line::Delete(_) => old_left = old_left.saturating_sub(1),
                Line::Add(_) => new_left = new_left.saturating_sub(1),
            }
            hunk.lines.push(parsed);
        }
        while lines.peek().is_some_and(|line| line.starts_with('\\')) {
            lines.next();
        }
        hunks.push(hunk);
    }
    Ok(hunks)
}

/// Collects edits, merging an edit that starts where the previous one ends.
#[derive(Default)]
struct Edits(Vec<TextEdit>);

impl Edits {
    fn push(&mut self, offset: usize, delete: usize, insert: String) {
        if delete == 0 && insert.is_empty() {
            return;
        }
        if let Some(last) = self.0.last_mut()
            && last.offset + last.delete == offset
        {
            last.delete += delete;
            last.insert.push_str(&insert);
            return;
        }
        self.0.push(TextEdit {
            offset,
            delete,
            insert,
        });
    }
}

/// Matches `diff` against `text` and returns the edits that apply it, in
/// ascending, non-overlapping character offsets of `text`.
pub(crate) fn plan(text: &str, diff: &str) -> Result<Vec<TextEdit>, String> {
    let hunks = parse(diff)?;

    // Matching runs on whole lines, so a last line without a newline gets a
    // virtual one that is taken back out of the edits at the end.
    let virtual_newline = !text.ends_with('\n');
    let mut padded = text.to_string();
    if virtual_newline && !text.is_empty() {
        padded.push('\n');
    }
    let old: Vec<&str> = padded.split_inclusive('\n').collect();
    let mut starts = Vec::with_capacity(old.len() + 1);
    let mut offset = 0;
    for line in &old {
        starts.push(offset);
        offset += line.chars().count();
    }
    starts.push(offset);
    let padded_len = offset;

    let line_matches = |index: usize, expected: &str| {
        old.get(index).is_some_and(|&line| {
            let line = line.strip_suffix('\n').unwrap_or(line);
            line == expected || line.strip_suffix('\r') == Some(expected)
        })
    };

    let mut edits = Edits::default();
    let mut cursor = 0;
    for hunk in hunks {
        if hunk.old_start < cursor {
            return Err(format!(
                "hunk at line {} overlaps the previous hunk",
                hunk.old_start + 1
            ));
        }
        if hunk.old_start > old.len() {
            return Err(format!(
                "hunk at line {} is past the end of the text ({} lines)",
                hunk.old_start + 1,
                old.len()
            ));
        }
        let mut index = hunk.old_start;
        let mut run_start = index;
        let mut inserted = String::new();
        for line in hunk.lines {
            match line {
                Line::Context(expected) => {
                    if !line_matches(index, expected) {
                        return Err(format!("context line {} does not match", index + 1));
                    }
                    edits.push(
                        starts[run_start],
                        starts[index] - starts[run_start],
                        std::mem::take(&mut inserted),
                    );
                    index += 1;
                    run_start = index;
                }
                Line::Delete(expected) => {
                    if !line_matches(index, expected) {
                        return Err(format!("deleted line {} does not match", index + 1));
                    }
                    index += 1;
                }
                Line::Add(added) => {
                    inserted.push_str(added);
                    inserted.push('\n');
                }
            }
        }
        edits.push(
            starts[run_start],
            starts[index] - starts[run_start],
            inserted,
        );
        cursor = index;
    }

    let mut edits = edits.0;
    if virtual_newline
        && let Some(last) = edits.last_mut()
    {
        if last.delete > 0 && last.offset + last.delete == padded_len {
            // The edit replaces the last line.
            last.delete -= 1;
            if last.insert.pop().is_none() && last.offset > 0 {
                // Nothing replaces it, so the line before loses its newline.
                last.offset -= 1;
                last.delete += 1;
            }
        } else if last.offset == padded_len {
            // Lines appended after the last line.
            last.insert.pop();
            if padded_len > 0 {
                last.offset = padded_len - 1;
                last.insert.insert(0, '\n');
            }
        }
    }
    Ok(edits)
}

/// Applies edits to a string; the document applies them as ops instead.
#[cfg(test)]
fn apply(text: &str, edits: &[TextEdit]) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut at = 0;
    for edit in edits {
        out.extend(&chars[at..edit.offset]);
        out.push_str(&edit.insert);
        at = edit.offset + edit.delete;
    }
    out.extend(&chars[at..]);
    out
}
