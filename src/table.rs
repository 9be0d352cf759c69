use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Instant;

use rayon::prelude::*;
use tracing::trace;

use crate::data::{ColumnId, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortEntry {
    pub column: ColumnId,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn ascending(column: ColumnId) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: ColumnId) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// Comparison used for a sorted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortingFn {
    /// Case insensitive lexical comparison.
    Text,
    /// Case insensitive, digit runs compared by value.
    Alphanumeric,
}

impl SortingFn {
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            SortingFn::Text => a.to_lowercase().cmp(&b.to_lowercase()),
            SortingFn::Alphanumeric => compare_alphanumeric(a, b),
        }
    }
}

// Number of leading rows inspected to pick a column's sorting function.
const SORTING_FN_SAMPLE: usize = 10;

/// Alphanumeric when any of the first filtered values of `column` holds a
/// digit, text otherwise.
pub fn auto_sorting_fn(records: &[Record], rows: &[usize], column: ColumnId) -> SortingFn {
    let has_digits = rows
        .iter()
        .take(SORTING_FN_SAMPLE)
        .any(|&idx| records[idx].value(column).bytes().any(|b| b.is_ascii_digit()));
    if has_digits {
        SortingFn::Alphanumeric
    } else {
        SortingFn::Text
    }
}

/// Rows and columns that are visible for a given filter, sort and column visibility.
///
/// `rows` holds indices into the record slice the model was built from,
/// in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowModel {
    pub rows: Vec<usize>,
    pub columns: Vec<ColumnId>,
}

impl RowModel {
    pub fn build(
        records: &[Record],
        filter: &str,
        sort: &[SortEntry],
        hidden: &HashSet<String>,
    ) -> Self {
        let start_time = Instant::now();
        let columns = visible_columns(hidden);
        let mut rows = filter_rows(records, filter, &columns);
        if let Some(entry) = sort.first() {
            sort_rows(records, &mut rows, entry);
        }
        trace!(
            "Row model: {} of {} rows, {} columns, filter \"{}\", sort {:?} in {}us",
            rows.len(),
            records.len(),
            columns.len(),
            filter,
            sort,
            start_time.elapsed().as_micros()
        );
        RowModel { rows, columns }
    }
}

// Ids in `hidden` that name no column are ignored.
pub fn visible_columns(hidden: &HashSet<String>) -> Vec<ColumnId> {
    ColumnId::ALL
        .into_iter()
        .filter(|c| !hidden.contains(c.id()))
        .collect()
}

/// Indices of records where any of `columns` contains `filter`, ignoring case.
/// An empty filter keeps every record.
pub fn filter_rows(records: &[Record], filter: &str, columns: &[ColumnId]) -> Vec<usize> {
    if filter.is_empty() {
        return (0..records.len()).collect();
    }
    let term = filter.to_lowercase();
    records
        .par_iter()
        .enumerate()
        .filter(|(_, record)| {
            columns
                .iter()
                .any(|&c| record.value(c).to_lowercase().contains(&term))
        })
        .map(|(idx, _)| idx)
        .collect()
}

pub fn sort_rows(records: &[Record], rows: &mut [usize], entry: &SortEntry) {
    let sorting_fn = auto_sorting_fn(records, rows, entry.column);
    trace!("Sorting {} with {:?}", entry.column.id(), sorting_fn);
    // Stable, so equal values keep their original order in both directions.
    rows.sort_by(|&a, &b| {
        let ordering = sorting_fn.compare(
            records[a].value(entry.column),
            records[b].value(entry.column),
        );
        match entry.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Case insensitive comparison where runs of digits compare by numeric value.
///
/// Text runs sort before digit runs at the same position, and a value that is
/// a prefix of the other (in runs) sorts first.
pub fn compare_alphanumeric(a: &str, b: &str) -> Ordering {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let mut a_runs = split_runs(&a).into_iter();
    let mut b_runs = split_runs(&b).into_iter();

    loop {
        match (a_runs.next(), b_runs.next()) {
            (Some(ar), Some(br)) => {
                let ordering = match (is_digits(ar), is_digits(br)) {
                    (true, true) => compare_numeric(ar, br),
                    (false, false) => ar.cmp(br),
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

fn split_runs(s: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_digits = None;
    for (idx, chr) in s.char_indices() {
        let digit = chr.is_ascii_digit();
        if in_digits.is_some_and(|d| d != digit) {
            runs.push(&s[start..idx]);
            start = idx;
        }
        in_digits = Some(digit);
    }
    if start < s.len() {
        runs.push(&s[start..]);
    }
    runs
}

fn is_digits(run: &str) -> bool {
    run.bytes().all(|b| b.is_ascii_digit())
}

// Digit runs of any length, without overflowing an integer type.
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

pub fn sort_indicator(column: ColumnId, sort: &[SortEntry]) -> &'static str {
    match sort.first() {
        Some(entry) if entry.column == column => match entry.direction {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        },
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RECORDS;

    fn hidden(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_filter_keeps_all_rows_in_order() {
        let model = RowModel::build(&RECORDS, "", &[], &HashSet::new());
        assert_eq!(model.rows, vec![0, 1, 2, 3, 4]);
        assert_eq!(model.columns.len(), 9);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let columns = visible_columns(&HashSet::new());
        assert_eq!(filter_rows(&RECORDS, "need TO start", &columns), vec![1]);
        assert_eq!(filter_rows(&RECORDS, "complete", &columns), vec![3]);
        assert_eq!(filter_rows(&RECORDS, "in-process", &columns), vec![0, 2]);
        assert_eq!(filter_rows(&RECORDS, ".com", &columns), vec![0, 2, 3, 4]);
        assert!(filter_rows(&RECORDS, "no such text", &columns).is_empty());
    }

    #[test]
    fn filter_ignores_hidden_columns() {
        let all = RowModel::build(&RECORDS, "30-10", &[], &HashSet::new());
        assert_eq!(all.rows, vec![1]);

        let without_due = RowModel::build(&RECORDS, "30-10", &[], &hidden(&["dueDate"]));
        assert!(without_due.rows.is_empty());
        assert!(!without_due.columns.contains(&ColumnId::DueDate));
    }

    #[test]
    fn unknown_hidden_ids_are_ignored() {
        let columns = visible_columns(&hidden(&["bogus", "url"]));
        assert_eq!(columns.len(), 8);
        assert!(!columns.contains(&ColumnId::Url));
    }

    #[test]
    fn sorts_by_job_request() {
        let asc = RowModel::build(
            &RECORDS,
            "",
            &[SortEntry::ascending(ColumnId::JobRequest)],
            &HashSet::new(),
        );
        assert_eq!(asc.rows, vec![3, 2, 0, 4, 1]);

        let desc = RowModel::build(
            &RECORDS,
            "",
            &[SortEntry::descending(ColumnId::JobRequest)],
            &HashSet::new(),
        );
        assert_eq!(desc.rows, vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn dates_sort_by_leading_number() {
        let model = RowModel::build(
            &RECORDS,
            "",
            &[SortEntry::ascending(ColumnId::Submitted)],
            &HashSet::new(),
        );
        assert_eq!(model.rows, vec![2, 3, 0, 4, 1]);
    }

    #[test]
    fn equal_values_keep_original_order() {
        let asc = RowModel::build(
            &RECORDS,
            "",
            &[SortEntry::ascending(ColumnId::Priority)],
            &HashSet::new(),
        );
        // High, Low, Low, Medium, Medium
        assert_eq!(asc.rows, vec![1, 3, 4, 0, 2]);

        let desc = RowModel::build(
            &RECORDS,
            "",
            &[SortEntry::descending(ColumnId::Priority)],
            &HashSet::new(),
        );
        assert_eq!(desc.rows, vec![0, 2, 3, 4, 1]);
    }

    #[test]
    fn filter_then_sort() {
        let model = RowModel::build(
            &RECORDS,
            "low",
            &[SortEntry::descending(ColumnId::JobRequest)],
            &HashSet::new(),
        );
        assert_eq!(model.rows, vec![4, 3]);
    }

    #[test]
    fn alphanumeric_ordering() {
        assert_eq!(compare_alphanumeric("item2", "item10"), Ordering::Less);
        assert_eq!(compare_alphanumeric("Item2", "item2"), Ordering::Equal);
        assert_eq!(compare_alphanumeric("a", "a1"), Ordering::Less);
        assert_eq!(compare_alphanumeric("abc", "1abc"), Ordering::Less);
        assert_eq!(compare_alphanumeric("007", "7"), Ordering::Equal);
        assert_eq!(
            compare_alphanumeric("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
        assert_eq!(compare_alphanumeric("", ""), Ordering::Equal);
    }

    #[test]
    fn sorting_fn_follows_column_values() {
        let all = [0, 1, 2, 3, 4];
        assert_eq!(auto_sorting_fn(&RECORDS, &all, ColumnId::Priority), SortingFn::Text);
        assert_eq!(auto_sorting_fn(&RECORDS, &all, ColumnId::Status), SortingFn::Text);
        assert_eq!(
            auto_sorting_fn(&RECORDS, &all, ColumnId::Submitted),
            SortingFn::Alphanumeric
        );
        // Only "Prepare financial report for Q4" has a digit
        assert_eq!(
            auto_sorting_fn(&RECORDS, &all, ColumnId::JobRequest),
            SortingFn::Alphanumeric
        );
        assert_eq!(
            auto_sorting_fn(&RECORDS, &[0, 1, 2, 3], ColumnId::JobRequest),
            SortingFn::Text
        );
        assert_eq!(auto_sorting_fn(&RECORDS, &[], ColumnId::Submitted), SortingFn::Text);
    }

    #[test]
    fn text_sorting_compares_digits_as_characters() {
        assert_eq!(SortingFn::Text.compare("item10", "item2"), Ordering::Less);
        assert_eq!(SortingFn::Alphanumeric.compare("item10", "item2"), Ordering::Greater);
        assert_eq!(SortingFn::Text.compare("LOW", "low"), Ordering::Equal);
    }

    #[test]
    fn split_runs_alternates_digits_and_text() {
        assert_eq!(split_runs("15-11-2024"), vec!["15", "-", "11", "-", "2024"]);
        assert_eq!(split_runs("q4"), vec!["q", "4"]);
        assert!(split_runs("").is_empty());
    }

    #[test]
    fn indicator_only_on_sorted_column() {
        let sort = [SortEntry::descending(ColumnId::Status)];
        assert_eq!(sort_indicator(ColumnId::Status, &sort), " ▼");
        assert_eq!(sort_indicator(ColumnId::Url, &sort), "");
        assert_eq!(
            sort_indicator(ColumnId::Url, &[SortEntry::ascending(ColumnId::Url)]),
            " ▲"
        );
        assert_eq!(sort_indicator(ColumnId::Url, &[]), "");
    }
}
