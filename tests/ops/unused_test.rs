#[cfg(test)]
mod tests {
    use std::fs;

    use tmdl::config::Settings;
    use tmdl::ops;

    #[test]
    fn test_unused_columns_across_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("model.tmdl"),
            "\
model M

table T1
{
\tcolumn A: int64
\tcolumn B: int64
\tmeasure 'M' = { T1[A] + 2 }
}

table T2
{
\tcolumn C: int64
}
",
        )
        .unwrap();

        let unused = ops::detect_unused_columns(dir.path(), &Settings::default());
        assert_eq!(unused, vec!["T1[B]", "T2[C]"]);
    }

    #[test]
    fn test_calculated_columns_count_as_usage() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("model.tmdl"),
            "\
table 'Sales Data'
{
\tcolumn Price: decimal
\tcolumn qty: int64
\tcolumn Line: decimal = { 'sales data'[PRICE] * 'Sales Data'[Qty] }
\tcolumn zeta: string
\tcolumn Alpha: string
}
",
        )
        .unwrap();

        let unused = ops::detect_unused_columns(dir.path(), &Settings::default());
        assert_eq!(
            unused,
            vec!["Sales Data[Alpha]", "Sales Data[Line]", "Sales Data[zeta]"]
        );
    }

    #[test]
    fn test_missing_model_has_no_unused_columns() {
        let dir = tempfile::tempdir().unwrap();
        let unused = ops::detect_unused_columns(dir.path().join("nothing"), &Settings::default());
        assert!(unused.is_empty());
    }
}
