//! Specificity ordering of sibling route entries.
//!
//! The order produced here is the match priority of the final route table,
//! so more specific entries must come first:
//!
//! - index files before their siblings, unless reached through a spread
//!   directory (a spread index would swallow every sibling)
//! - at each part position: a present part before a missing one, non-spread
//!   before spread, static before dynamic
//! - longer literals first, ties broken lexically
//! - qualified parameters before plain ones, longer qualifiers first

use std::cmp::Ordering;

use super::build::Entry;
use super::parts::Part;

/// Sort sibling entries by specificity, most specific first.
///
/// The comparator is not guaranteed to be a total order for every mix of
/// spreads and index files, so this uses a stable insertion sort that never
/// panics and keeps directory order for entries that compare equal.
pub(super) fn sort_entries(entries: &mut [Entry]) {
    for i in 1..entries.len() {
        let mut j = i;
        while j > 0 && specificity(&entries[j - 1], &entries[j]) == Ordering::Greater {
            entries.swap(j - 1, j);
            j -= 1;
        }
    }
}

pub(super) fn specificity(a: &Entry, b: &Entry) -> Ordering {
    if a.is_index != b.is_index {
        let index = if a.is_index { a } else { b };
        let index_first = !is_spread(&index.file);
        return if a.is_index == index_first {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    let max = a.parts.len().max(b.parts.len());
    for i in 0..max {
        let (pa, pb) = match (a.parts.get(i), b.parts.get(i)) {
            (None, _) => return Ordering::Greater,
            (_, None) => return Ordering::Less,
            (Some(pa), Some(pb)) => (pa, pb),
        };

        if pa.spread && pb.spread {
            return Ordering::Equal;
        }

        let ord = compare_parts(pa, pb);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

fn compare_parts(a: &Part, b: &Part) -> Ordering {
    if a.spread != b.spread {
        return if a.spread {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    if a.dynamic != b.dynamic {
        return if a.dynamic {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    if !a.dynamic {
        if a.content == b.content {
            return Ordering::Equal;
        }
        return b
            .content
            .len()
            .cmp(&a.content.len())
            .then_with(|| a.content.cmp(&b.content));
    }

    match (&a.qualifier, &b.qualifier) {
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(qa), Some(qb)) if qa != qb => qb.len().cmp(&qa.len()).then_with(|| qa.cmp(qb)),
        _ => Ordering::Equal,
    }
}

fn is_spread(file: &str) -> bool {
    file.contains("[...")
}
