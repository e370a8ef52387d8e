// Property-based tests for table regions and the table-formatted sheet writer.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use xlbench_io::layout::{fit_units, MAX_COLUMN_UNITS};
use xlbench_io::region::col_to_letter;
use xlbench_io::{create_sheet_from_table, AreaRef, CellRef, Package, TableRegion, WriteOptions};
use xlbench_table::{DataTable, FieldType, ScalarType, Value};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Text table with `cols` uniquely named columns.
fn text_table() -> impl Strategy<Value = DataTable> {
    (1usize..8, 1usize..25).prop_flat_map(|(cols, rows)| {
        proptest::collection::vec(proptest::collection::vec("[a-z0-9 ]{0,30}", cols), rows).prop_map(
            move |rows| {
                let mut table = DataTable::new("Props");
                for col in 0..cols {
                    table
                        .add_column(format!("col{col}"), FieldType::Scalar(ScalarType::Text))
                        .unwrap();
                }
                for row in rows {
                    table.add_row(row.into_iter().map(Value::Text).collect()).unwrap();
                }
                table
            },
        )
    })
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn region_ref_spans_header_and_data(rows in 1usize..5_000, cols in 1usize..200, id in 1u32..1_000) {
        let area = AreaRef::new(CellRef::new(0, 0).unwrap(), CellRef::new(rows, cols - 1).unwrap()).unwrap();
        let names: Vec<String> = (0..cols).map(|c| format!("c{c}")).collect();
        let region = TableRegion::new(id, area, &names).unwrap();

        prop_assert_eq!(region.area().to_string(), format!("A1:{}{}", col_to_letter(cols - 1), rows + 1));
        prop_assert_eq!(region.auto_filter(), region.area());
        prop_assert_eq!(region.name(), format!("Table{id}"));
        let ids: Vec<u32> = region.columns().iter().map(|c| c.id).collect();
        prop_assert_eq!(ids, (1..=cols as u32).collect::<Vec<u32>>());
    }

    #[test]
    fn widths_are_fit_plus_clamped_padding(table in text_table(), padding in 0u32..70_000) {
        let mut package = Package::new();
        let options = WriteOptions { filter_button_padding: padding, ..WriteOptions::default() };
        let report = create_sheet_from_table(&mut package, 0, &table, &options).unwrap();

        for (col, column) in table.columns().iter().enumerate() {
            let mut texts: Vec<String> = vec![column.name.clone()];
            texts.extend(table.rows().iter().map(|r| r[col].to_string()));
            let fit = fit_units(texts.iter().map(String::as_str)).unwrap();
            prop_assert_eq!(report.column_widths[col], (fit + padding).min(MAX_COLUMN_UNITS));
        }
    }

    #[test]
    fn cells_hold_display_text(table in text_table()) {
        let mut package = Package::new();
        create_sheet_from_table(&mut package, 3, &table, &WriteOptions::default()).unwrap();
        let sheet = package.sheet(0).unwrap();

        prop_assert_eq!(sheet.tables()[0].id(), 4);
        for (r, row) in table.rows().iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                let text = value.to_string();
                prop_assert_eq!(sheet.cell_text(r as u32 + 1, c as u16), Some(text.as_str()));
            }
        }
    }
}
