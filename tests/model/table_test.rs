#[cfg(test)]
mod tests {
    use tmdl::model::Named;
    use tmdl::{
        Column, ColumnKind, ColumnRef, CrossFilter, DataType, Database, Hierarchy, Measure,
        Partition, PartitionMode, Relationship, Table,
    };

    fn sales() -> Table {
        Table::new("Sales")
            .with_column(Column::regular("Amount", DataType::Decimal).with_source_column("amount"))
            .unwrap()
            .with_column(Column::calculated("Net", DataType::Decimal, "Sales[Amount] * 0.8"))
            .unwrap()
            .with_measure(Measure::new("Total", "SUM(Sales[Amount])"))
            .unwrap()
            .with_hierarchy(Hierarchy::new("ByAmount").with_level("Amount", "Amount"))
            .unwrap()
            .with_partition(Partition::new("Sales", PartitionMode::Import, "SELECT 1"))
            .unwrap()
    }

    #[test]
    fn test_table_builder() {
        let table = sales();
        assert_eq!(table.name(), "Sales");
        assert_eq!(table.columns.names(), vec!["Amount", "Net"]);
        assert_eq!(table.measures.len(), 1);
        assert_eq!(table.hierarchies.get("byamount").unwrap().levels.len(), 1);
        assert_eq!(table.partitions.get("sales").unwrap().mode, PartitionMode::Import);
    }

    #[test]
    fn test_duplicate_column_in_builder() {
        let err = sales()
            .with_column(Column::regular("NET", DataType::String))
            .unwrap_err();
        assert_eq!(err.to_string(), "column 'NET' already exists in table 'Sales'");
    }

    #[test]
    fn test_column_kinds() {
        let table = sales();
        let amount = table.columns.get("Amount").unwrap();
        assert_eq!(
            amount.kind,
            ColumnKind::Regular {
                source_column: Some("amount".to_string())
            }
        );
        let net = table.columns.get("Net").unwrap();
        assert!(net.is_calculated());
        assert_eq!(net.expression(), Some("Sales[Amount] * 0.8"));
    }

    #[test]
    fn test_model_counts_and_lookups() {
        let mut db = Database::new("Retail");
        db.model.tables.add(sales()).unwrap();
        db.model
            .tables
            .add(
                Table::new("Date")
                    .with_column(Column::regular("Date", DataType::DateTime))
                    .unwrap(),
            )
            .unwrap();

        assert_eq!(db.name, "Retail");
        assert_eq!(db.model.name, "Retail");
        assert_eq!(db.model.column_count(), 3);
        assert_eq!(db.model.measure_count(), 1);
        assert!(db.model.has_column("sales", "AMOUNT"));
        assert!(!db.model.has_column("Sales", "Total"));
        assert!(!db.model.has_column("Ghost", "Amount"));
    }

    #[test]
    fn test_relationship_defaults() {
        let relationship = Relationship::new(
            "Sales_Date",
            ColumnRef::new("Sales", "DateKey"),
            ColumnRef::new("Date", "DateKey"),
        );
        assert!(relationship.is_active);
        assert_eq!(relationship.cross_filter, CrossFilter::OneDirection);
        assert!(relationship.from.matches("sales", "datekey"));
        assert_eq!(relationship.to.to_string(), "Date[DateKey]");

        let relationship = relationship
            .with_cross_filter(CrossFilter::BothDirections)
            .inactive();
        assert!(!relationship.is_active);
        assert_eq!(relationship.cross_filter.to_string(), "bothDirections");
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("INT64".parse::<DataType>().unwrap(), DataType::Int64);
        assert_eq!("dateTime".parse::<DataType>().unwrap(), DataType::DateTime);
        assert!("money".parse::<DataType>().is_err());
        assert_eq!(
            "directQuery".parse::<PartitionMode>().unwrap(),
            PartitionMode::DirectQuery
        );
        assert_eq!("both".parse::<CrossFilter>().unwrap(), CrossFilter::BothDirections);
    }
}
