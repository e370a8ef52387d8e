//! Household living-costs price index (HLPI) rows, the benchmark dataset.

use serde::Deserialize;

xlbench_table::record! {
    /// One HLPI series observation for one quarter.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    pub struct HlpiRecord {
        pub hlpi_name: String,
        pub series_ref: String,
        pub quarter: String,
        pub hlpi: String,
        pub nzhec: f64,
        pub nzhec_name: String,
        pub nzhec_short: String,
        pub level: String,
        pub index: i64,
        #[serde(rename = "changeQ")]
        pub change_q: String as "changeQ",
        #[serde(rename = "changeA")]
        pub change_a: String as "changeA",
    }
}

/// Header row written by the flat writers and expected in the CSV.
pub const HLPI_COLUMNS: [&str; 11] = [
    "hlpi_name",
    "series_ref",
    "quarter",
    "hlpi",
    "nzhec",
    "nzhec_name",
    "nzhec_short",
    "level",
    "index",
    "changeQ",
    "changeA",
];

#[cfg(test)]
mod tests {
    use super::*;
    use xlbench_table::{FieldType, Record, ScalarType};

    #[test]
    fn test_columns_follow_declaration_order() {
        assert_eq!(HlpiRecord::column_names(), HLPI_COLUMNS);
        assert_eq!(HlpiRecord::TYPE_NAME, "HlpiRecord");
    }

    #[test]
    fn test_field_types() {
        let types: Vec<FieldType> = HlpiRecord::FIELDS.iter().map(|f| f.field_type).collect();
        assert_eq!(types[4], FieldType::Scalar(ScalarType::Float));
        assert_eq!(types[8], FieldType::Scalar(ScalarType::Integer));
        assert_eq!(types[9], FieldType::Scalar(ScalarType::Text));
    }

    #[test]
    fn test_parse_row() {
        let text = "hlpi_name,series_ref,quarter,hlpi,nzhec,nzhec_name,nzhec_short,level,index,changeQ,changeA\n\
                    All households,HPIQ.HAL.AA,2008Q3,allhh,1,Food,Food,group,925,,\n";
        let rows: Vec<HlpiRecord> = crate::csv::load_records_from_str(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quarter, "2008Q3");
        assert_eq!(rows[0].index, 925);
        assert_eq!(rows[0].change_q, "");
    }
}
