use shared::Record;

/// Lowercased, trimmed query; `None` means "no filter"
fn normalize(query: &str) -> Option<String> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        None
    } else {
        Some(q)
    }
}

/// Keep the rows where any of `columns` contains `query`, case-insensitively.
///
/// An empty (or all-whitespace) query returns every row. Order is preserved.
pub fn filter_rows<'a, T: Record>(rows: &'a [T], query: &str, columns: &[&str]) -> Vec<&'a T> {
    let Some(q) = normalize(query) else {
        return rows.iter().collect();
    };
    rows.iter()
        .filter(|row| {
            columns.iter().any(|column| {
                row.field(column)
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(&q)
            })
        })
        .collect()
}

/// Same predicate over values that are already projected to text
pub fn matches_any<S: AsRef<str>>(values: &[S], query: &str) -> bool {
    match normalize(query) {
        None => true,
        Some(q) => values
            .iter()
            .any(|v| v.as_ref().to_lowercase().contains(&q)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: i64,
        a: Option<&'static str>,
        b: Option<&'static str>,
    }

    impl Record for Row {
        fn id(&self) -> i64 {
            self.id
        }

        fn field(&self, key: &str) -> Option<String> {
            match key {
                "a" => self.a.map(str::to_string),
                "b" => self.b.map(str::to_string),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, a: Some("Foo"), b: None },
            Row { id: 2, a: Some("bar"), b: Some("xfoox") },
            Row { id: 3, a: None, b: Some("baz") },
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let rows = rows();
        assert_eq!(ids(&filter_rows(&rows, "", &["a"])), vec![1, 2, 3]);
        assert_eq!(ids(&filter_rows(&rows, "   ", &["a", "b"])), vec![1, 2, 3]);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let rows = rows();
        assert_eq!(ids(&filter_rows(&rows, "foo", &["a"])), vec![1]);
        assert_eq!(ids(&filter_rows(&rows, "  FOO ", &["a"])), vec![1]);
    }

    #[test]
    fn test_any_column_matches_anywhere_in_order() {
        let rows = rows();
        assert_eq!(ids(&filter_rows(&rows, "foo", &["a", "b"])), vec![1, 2]);
        assert_eq!(ids(&filter_rows(&rows, "ba", &["a", "b"])), vec![2, 3]);
    }

    #[test]
    fn test_null_columns_never_match() {
        let rows = rows();
        assert!(filter_rows(&rows, "none", &["a", "b", "missing"]).is_empty());
    }

    #[test]
    fn test_matches_any() {
        assert!(matches_any(&["Alice Farms", "555"], "alice"));
        assert!(!matches_any(&["Alice Farms"], "bob"));
        assert!(matches_any::<&str>(&[], ""));
    }
}
