// MIT License - Copyright (c) 2026 hekit authors

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::error::{KitError, Result};

/// Parse a single positive integer or `start-end` span into an inclusive
/// range. Backward spans are rejected.
pub fn str_to_range(s: &str) -> Result<RangeInclusive<u64>> {
    let s = s.trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        let num: u64 = s.parse().map_err(|_| KitError::RangeSyntax {
            input: s.to_string(),
        })?;
        return Ok(num..=num);
    }

    let (start, end) = s.split_once('-').ok_or_else(|| KitError::RangeSyntax {
        input: s.to_string(),
    })?;

    let parse = |part: &str| -> Result<u64> {
        let part = part.trim();
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(KitError::RangeSyntax {
                input: s.to_string(),
            });
        }
        part.parse().map_err(|_| KitError::RangeSyntax {
            input: s.to_string(),
        })
    };

    let start = parse(start)?;
    let end = parse(end)?;
    if start > end {
        return Err(KitError::BackwardRange {
            input: s.to_string(),
        });
    }
    Ok(start..=end)
}

/// Parse a comma-separated list of numbers and spans (e.g. `"2, 5-9, 11"`)
/// into a sorted, deduplicated list.
pub fn parse_range(s: &str) -> Result<Vec<u64>> {
    parse_range_filtered(s, |_| Ok(true))
}

/// Like [`parse_range`], keeping only the numbers accepted by `filter`.
pub fn parse_range_filtered<F>(s: &str, mut filter: F) -> Result<Vec<u64>>
where
    F: FnMut(u64) -> Result<bool>,
{
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let mut unique = BTreeSet::new();
    for part in cleaned.split(',') {
        for n in str_to_range(part)? {
            if filter(n)? {
                unique.insert(n);
            }
        }
    }
    Ok(unique.into_iter().collect())
}
