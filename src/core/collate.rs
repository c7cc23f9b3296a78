//! Per-field ordering used by the table sorts.

use std::borrow::Cow;
use std::cmp::Ordering;

use super::record::{Field, Record};

/// Fold `ё`/`Ё` to `е`/`Е` so both spellings of a title order together.
/// Everything else is compared by code point, case-sensitively.
pub fn fold_title(title: &str) -> Cow<'_, str> {
    if title.contains(['ё', 'Ё']) {
        Cow::Owned(
            title
                .chars()
                .map(|c| match c {
                    'ё' => 'е',
                    'Ё' => 'Е',
                    other => other,
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(title)
    }
}

pub fn compare_titles(a: &str, b: &str) -> Ordering {
    fold_title(a).cmp(&fold_title(b))
}

/// Ascending order of two records on `field`.
pub fn compare_by(field: Field, a: &Record, b: &Record) -> Ordering {
    match field {
        Field::Id => a.id.cmp(&b.id),
        Field::Title => compare_titles(&a.title, &b.title),
        Field::Year => a.year.cmp(&b.year),
        Field::Imdb => a.imdb.total_cmp(&b.imdb),
    }
}
