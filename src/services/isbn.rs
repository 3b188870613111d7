//! ISBN discovery over OCR text.
//!
//! ISBNs live on the front and back matter, so only the first
//! [`LEADING_PAGES`] and last [`TRAILING_PAGES`] pages are scanned. Results are
//! syntactic candidates only; no checksum is verified.

/// Pages scanned from the start of a publication.
pub const LEADING_PAGES: usize = 10;
/// Pages scanned from the end of a publication.
pub const TRAILING_PAGES: usize = 5;

/// Labels in priority order. The first one present in a line wins.
const ISBN_LABELS: [&str; 6] = [
    "ISBN-13",
    "ISBN-10",
    "ISBN",
    "International Standard Book Number-13",
    "International Standard Book Number-10",
    "International Standard Book Number",
];

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 13;

/// The pages that are searched, in page order.
pub fn scan_window<T>(pages: &[T]) -> impl Iterator<Item = &T> {
    let (head, tail) = if pages.len() > LEADING_PAGES + TRAILING_PAGES {
        (
            &pages[..LEADING_PAGES],
            &pages[pages.len() - TRAILING_PAGES..],
        )
    } else {
        (pages, &pages[..0])
    };
    head.iter().chain(tail.iter())
}

/// Extract a candidate from a single line of text.
///
/// Reading starts one character past the end of the label (the separator),
/// skips spaces, colons and hyphens, and stops at any other character or
/// once 13 digits are collected.
pub fn find_candidate_in_line(line: &str) -> Option<String> {
    let label_end = ISBN_LABELS
        .iter()
        .find_map(|label| line.find(label).map(|start| start + label.len()))?;

    let mut digits = String::with_capacity(MAX_DIGITS);
    for c in line[label_end..].chars().skip(1) {
        if digits.len() >= MAX_DIGITS {
            break;
        }
        match c {
            '0'..='9' => digits.push(c),
            ' ' | ':' | '-' => {}
            _ => break,
        }
    }

    (MIN_DIGITS..=MAX_DIGITS)
        .contains(&digits.len())
        .then_some(digits)
}

/// Every candidate in the scan window, in page order then line order.
/// Duplicates are kept.
pub fn find_candidates<S: AsRef<str>>(pages: &[S]) -> Vec<String> {
    scan_window(pages)
        .flat_map(|page| page.as_ref().lines())
        .filter_map(find_candidate_in_line)
        .collect()
}
