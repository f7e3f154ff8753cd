//! Text cleanup shared by the heuristic strategies, the selector and the
//! final output.

/// Clean one recovered run of text.
///
/// Non-printable characters other than tab and newline become spaces, runs of
/// five or more identical characters collapse to one, and all whitespace runs
/// collapse to a single space.
pub fn clean_run(text: &str) -> String {
    let replaced: Vec<char> = text
        .chars()
        .map(|ch| {
            if ch == '\t' || ch == '\n' || (' '..='~').contains(&ch) {
                ch
            } else {
                ' '
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    let mut i = 0;
    while i < replaced.len() {
        let ch = replaced[i];
        let mut j = i + 1;
        while j < replaced.len() && replaced[j] == ch {
            j += 1;
        }
        let repeat = j - i;
        if repeat >= 5 {
            collapsed.push(ch);
        } else {
            collapsed.extend(std::iter::repeat_n(ch, repeat));
        }
        i = j;
    }

    collapse_whitespace(&collapsed)
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Dedup key: whitespace collapsed and lowercased.
pub fn normalized_key(text: &str) -> String {
    collapse_whitespace(text).to_lowercase()
}

/// Normalize extracted text for output.
///
/// CRLF and lone CR become LF, space/tab runs become one space (an indent
/// shrinks to a single space), trailing blanks on each line are dropped,
/// three or more newlines become exactly two, and the result is trimmed.
pub fn normalize_output(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines = Vec::new();
    for line in unified.split('\n') {
        let mut out = String::with_capacity(line.len());
        let mut in_blank = false;
        for ch in line.chars() {
            if ch == ' ' || ch == '\t' {
                if !in_blank {
                    out.push(' ');
                }
                in_blank = true;
            } else {
                out.push(ch);
                in_blank = false;
            }
        }
        lines.push(out.trim_end().to_string());
    }

    let mut result = String::with_capacity(unified.len());
    let mut newlines = 0;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            newlines += 1;
        }
        if line.is_empty() {
            continue;
        }
        if !result.is_empty() {
            result.push_str(if newlines >= 2 { "\n\n" } else { "\n" });
        }
        result.push_str(line);
        newlines = 0;
    }

    result.trim().to_string()
}
