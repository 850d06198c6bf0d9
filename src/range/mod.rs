// src/range/mod.rs

//! Array index range codec.
//!
//! Converts between sets of array indices and the compact comma-separated
//! range strings schedulers use, e.g. `{0,1,2,3,5,7,8,9}` <-> `"0-3,5,7-9"`.
//!
//! [`expand`] also understands the bracketed array syntax reported by the
//! scheduler (`1234_[0-2,4%3]`); the `%throttle` suffix is a concurrency hint
//! and is dropped.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{DsqError, Result};

/// One maximal run of consecutive indices, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexRun {
    pub low: u64,
    pub high: u64,
}

impl IndexRun {
    pub fn len(&self) -> u64 {
        self.high - self.low + 1
    }
}

impl fmt::Display for IndexRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// Canonical run-length form of an index set.
///
/// Runs are sorted ascending, never overlap and never touch: two runs that
/// would be adjacent are always merged into one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayRange {
    runs: Vec<IndexRun>,
}

impl ArrayRange {
    /// Build the canonical runs for any collection of indices.
    ///
    /// Duplicates are ignored. Consecutive values share the same
    /// `value - position` key once sorted, which is what groups them.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let sorted: BTreeSet<u64> = indices.into_iter().collect();

        let mut runs: Vec<IndexRun> = Vec::new();
        let mut current_key: Option<u64> = None;

        for (pos, value) in sorted.into_iter().enumerate() {
            let key = value - pos as u64;
            if current_key == Some(key) {
                if let Some(run) = runs.last_mut() {
                    run.high = value;
                    continue;
                }
            }
            runs.push(IndexRun {
                low: value,
                high: value,
            });
            current_key = Some(key);
        }

        Self { runs }
    }

    pub fn runs(&self) -> &[IndexRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of indices covered by all runs.
    pub fn count(&self) -> u64 {
        self.runs.iter().map(IndexRun::len).sum()
    }
}

impl fmt::Display for ArrayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.runs.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{run}")?;
        }
        Ok(())
    }
}

impl FromStr for ArrayRange {
    type Err = DsqError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(ArrayRange::from_indices(expand(s)?))
    }
}

/// Collapse a set of indices into its canonical range string.
///
/// The empty set collapses to the empty string.
pub fn collapse<I>(indices: I) -> String
where
    I: IntoIterator<Item = u64>,
{
    ArrayRange::from_indices(indices).to_string()
}

/// Expand a range string into the set of indices it names.
///
/// Accepts `"0-3,5,7-9"`, a single `"5"`, or the bracketed scheduler form
/// `"base[0-3,5%2]"`. The empty string expands to the empty set.
pub fn expand(text: &str) -> Result<BTreeSet<u64>> {
    let list = strip_brackets(text)?;

    let mut out = BTreeSet::new();
    if list.trim().is_empty() {
        return Ok(out);
    }

    for token in list.split(',') {
        let (low, high) = parse_token(text, token.trim())?;
        out.extend(low..=high);
    }

    Ok(out)
}

/// Return the index list inside `base[...]`, minus any `%throttle`, or the
/// whole input when there are no brackets.
fn strip_brackets(text: &str) -> Result<&str> {
    let Some(open) = text.find('[') else {
        if text.contains(']') {
            return Err(DsqError::malformed(text, "unmatched ']'"));
        }
        return Ok(text);
    };

    let close = text[open..]
        .find(']')
        .map(|i| open + i)
        .ok_or_else(|| DsqError::malformed(text, "missing closing ']'"))?;

    if !text[close + 1..].trim().is_empty() {
        return Err(DsqError::malformed(text, "trailing text after ']'"));
    }

    let inner = &text[open + 1..close];
    let list = match inner.find('%') {
        Some(pct) => &inner[..pct],
        None => inner,
    };

    if list.trim().is_empty() {
        return Err(DsqError::malformed(text, "empty index list inside brackets"));
    }

    Ok(list)
}

fn parse_token(input: &str, token: &str) -> Result<(u64, u64)> {
    if token.is_empty() {
        return Err(DsqError::malformed(input, "empty range token"));
    }

    match token.split_once('-') {
        None => {
            let value = parse_index(input, token)?;
            Ok((value, value))
        }
        Some((low, high)) => {
            let low = parse_index(input, low.trim())?;
            let high = parse_index(input, high.trim())?;
            if low > high {
                return Err(DsqError::malformed(
                    input,
                    format!("range '{token}' has low > high"),
                ));
            }
            Ok((low, high))
        }
    }
}

fn parse_index(input: &str, s: &str) -> Result<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DsqError::malformed(
            input,
            format!("'{s}' is not a non-negative integer"),
        ));
    }
    s.parse::<u64>()
        .map_err(|e| DsqError::malformed(input, format!("'{s}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_groups_consecutive_runs() {
        assert_eq!(collapse([0, 1, 2, 3, 5, 7, 8, 9]), "0-3,5,7-9");
    }

    #[test]
    fn collapse_ignores_order_and_duplicates() {
        assert_eq!(collapse([9, 3, 3, 4, 1]), "1,3-4,9");
    }

    #[test]
    fn collapse_of_empty_set_is_empty_string() {
        assert_eq!(collapse(Vec::<u64>::new()), "");
        assert!(expand("").unwrap().is_empty());
    }

    #[test]
    fn expand_plain_list() {
        let got: Vec<u64> = expand("0-3,5,7-9").unwrap().into_iter().collect();
        assert_eq!(got, vec![0, 1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn expand_bracketed_ignores_throttle() {
        let got: Vec<u64> = expand("base[0-2,4%3]").unwrap().into_iter().collect();
        assert_eq!(got, vec![0, 1, 2, 4]);
    }

    #[test]
    fn expand_bare_bracket_suffix() {
        let got: Vec<u64> = expand("[7]").unwrap().into_iter().collect();
        assert_eq!(got, vec![7]);
    }

    #[test]
    fn expand_rejects_garbage_tokens() {
        for bad in ["a", "1-", "-3", "1-2-3", "1,,2", "5-2", "x[1-2", "1]", "b[]"] {
            match expand(bad) {
                Err(DsqError::MalformedRange { input, .. }) => assert_eq!(input, bad),
                other => panic!("expected MalformedRange for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn array_range_counts_and_runs() {
        let range: ArrayRange = "0-3,5,7-9".parse().unwrap();
        assert_eq!(range.count(), 8);
        assert_eq!(range.runs().len(), 3);
        assert_eq!(range.runs()[2], IndexRun { low: 7, high: 9 });
    }
}
