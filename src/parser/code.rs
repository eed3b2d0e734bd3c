//! Code regions of a markdown message.

use std::ops::Range;

/// Byte ranges of fenced code blocks, fence lines included. An unclosed
/// fence runs to the end of the text.
pub fn fenced_blocks(text: &str) -> Vec<Range<usize>> {
    walk(text, false)
}

/// Fenced code blocks plus inline code spans outside them.
pub fn code_ranges(text: &str) -> Vec<Range<usize>> {
    walk(text, true)
}

pub fn in_any(ranges: &[Range<usize>], at: usize) -> bool {
    ranges.iter().any(|r| r.contains(&at))
}

fn walk(text: &str, spans: bool) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut fence_start: Option<usize> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let end = offset + line.len();
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            match fence_start.take() {
                Some(start) => ranges.push(start..end),
                None => fence_start = Some(offset),
            }
        } else if spans && fence_start.is_none() {
            let mut open: Option<usize> = None;
            for (i, b) in line.bytes().enumerate() {
                if b == b'`' {
                    match open.take() {
                        Some(s) => ranges.push(offset + s..offset + i + 1),
                        None => open = Some(i),
                    }
                }
            }
        }
        offset = end;
    }

    if let Some(start) = fence_start {
        ranges.push(start..text.len());
    }
    ranges
}
