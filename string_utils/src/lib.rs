// Copyright (c) 2018 10X Genomics, Inc. All rights reserved.

// This file contains string utilities: natural ("human") ordering of strings, and
// extraction of KEY:VALUE fields from tab-delimited header lines.

use std::cmp::Ordering;

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// NATURAL ORDER
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Split a string into maximal runs of ASCII digits and of everything else.

fn chunks(s: &str) -> Vec<&str> {
    let b = s.as_bytes();
    let mut x = Vec::<&str>::new();
    let mut i = 0;
    while i < b.len() {
        let digit = b[i].is_ascii_digit();
        let mut j = i + 1;
        while j < b.len() && b[j].is_ascii_digit() == digit {
            j += 1;
        }
        x.push(&s[i..j]);
        i = j;
    }
    x
}

// Compare two digit runs by value.  Arbitrarily long runs are fine since the
// comparison never parses them.  Equal values with different zero padding put the
// shorter run first.

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let (ta, tb) = (a.trim_start_matches('0'), b.trim_start_matches('0'));
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Compare two strings so that embedded numbers compare numerically, e.g.
/// "chr2" < "chr10" and "9" < "10" < "100".  Non-numeric runs compare bytewise.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(cb.iter()) {
        let xd = x.as_bytes()[0].is_ascii_digit();
        let yd = y.as_bytes()[0].is_ascii_digit();
        let o = if xd && yd {
            cmp_digit_runs(x, y)
        } else {
            x.cmp(y)
        };
        if o != Ordering::Equal {
            return o;
        }
    }
    ca.len().cmp(&cb.len())
}

// Sort strings in natural order.

pub fn natural_sort<S: AsRef<str>>(x: &mut Vec<S>) {
    x.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
// HEADER FIELDS
// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Given a line like "@SQ\tSN:chr1\tLN:248956422", return the value of the first
// whitespace-separated field having the given key, e.g. field_value(line, "LN")
// returns "248956422".

pub fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    for f in line.split_whitespace() {
        if let Some(rest) = f.strip_prefix(key) {
            if let Some(v) = rest.strip_prefix(':') {
                return Some(v);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "100"), Ordering::Less);
        assert_eq!(natural_cmp("100", "9"), Ordering::Greater);
        assert_eq!(natural_cmp("chr2", "chr10"), Ordering::Less);
        assert_eq!(natural_cmp("chrX", "chr10"), Ordering::Greater);
        assert_eq!(natural_cmp("A", "AT"), Ordering::Less);
        assert_eq!(natural_cmp("ACG", "ACG"), Ordering::Equal);
        assert_eq!(natural_cmp("x007", "x7"), Ordering::Greater);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_natural_sort() {
        let mut x = vec!["chr10", "chr1", "chrY", "chr2", "chrX", "chr22"];
        natural_sort(&mut x);
        assert_eq!(x, vec!["chr1", "chr2", "chr10", "chr22", "chrX", "chrY"]);
    }

    #[test]
    fn test_field_value() {
        let line = "@SQ\tSN:chr1\tLN:248956422";
        assert_eq!(field_value(line, "SN"), Some("chr1"));
        assert_eq!(field_value(line, "LN"), Some("248956422"));
        assert_eq!(field_value(line, "M5"), None);
        assert_eq!(field_value("@RG\tID:x\tSMX:no\tSM:HG002", "SM"), Some("HG002"));
    }
}
