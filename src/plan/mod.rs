// src/plan/mod.rs
use crate::error::PlanError;
use crate::ingest::Row;

/// A contiguous run of rows sent together in one model request.
pub type Batch = Vec<Row>;

/// Batches dispatched concurrently; the group width bounds in-flight requests.
pub type BatchGroup = Vec<Batch>;

/// True when every field is empty or whitespace-only.
pub fn is_blank_row(row: &Row) -> bool {
    row.values().all(|v| v.trim().is_empty())
}

/// Drop blank rows, cut the rest into batches of at most `batch_size`,
/// then bundle consecutive batches into groups of at most `group_width`.
/// Row order is preserved across the whole plan.
pub fn plan_batches(
    rows: Vec<Row>,
    batch_size: usize,
    group_width: usize,
) -> Result<Vec<BatchGroup>, PlanError> {
    if batch_size == 0 {
        return Err(PlanError::InvalidConfig(
            "batch size must be at least 1".into(),
        ));
    }
    if group_width == 0 {
        return Err(PlanError::InvalidConfig(
            "group width must be at least 1".into(),
        ));
    }

    let kept: Vec<Row> = rows.into_iter().filter(|r| !is_blank_row(r)).collect();
    let batches = chunk(kept, batch_size);
    Ok(chunk(batches, group_width))
}

fn chunk<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut out = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));
    for item in items {
        current.push(item);
        if current.len() == size {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn rows(n: usize) -> Vec<Row> {
        let headers = vec!["Q".to_string()];
        (0..n).map(|i| Row::new(&headers, [format!("q{i}")])).collect()
    }

    #[test]
    fn batch_and_group_counts() -> Result<()> {
        for (n, b, g) in [(1, 1, 1), (10, 3, 2), (100, 100, 4), (250, 100, 4), (9, 2, 4)] {
            let input = rows(n);
            let groups = plan_batches(input.clone(), b, g)?;
            let batches: Vec<Batch> = groups.iter().flatten().cloned().collect();

            assert_eq!(batches.len(), n.div_ceil(b), "n={n} b={b}");
            assert_eq!(groups.len(), batches.len().div_ceil(g), "n={n} b={b} g={g}");
            assert!(batches[..batches.len() - 1].iter().all(|x| x.len() == b));
            assert!(groups.iter().all(|x| !x.is_empty() && x.len() <= g));

            let flat: Vec<Row> = batches.into_iter().flatten().collect();
            assert_eq!(flat, input);
        }
        Ok(())
    }

    #[test]
    fn blank_rows_are_filtered() -> Result<()> {
        let headers = vec!["A".to_string(), "B".to_string()];
        let input = vec![
            Row::new(&headers, ["x", ""]),
            Row::new(&headers, [" ", "\t"]),
            Row::new(&headers, ["", "y"]),
        ];
        let groups = plan_batches(input, 10, 4)?;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0][0].len(), 2);
        assert_eq!(groups[0][0][1].get("B"), Some("y"));
        Ok(())
    }

    #[test]
    fn no_rows_means_no_groups() -> Result<()> {
        assert!(plan_batches(Vec::new(), 5, 2)?.is_empty());
        Ok(())
    }

    #[test]
    fn zero_sizes_are_rejected() {
        assert!(plan_batches(rows(3), 0, 4).is_err());
        assert!(plan_batches(rows(3), 2, 0).is_err());
    }
}
