//! Dataset analysis and before/after comparison reports.

use std::collections::HashMap;

use serde::Serialize;
use titlescout_shared::TargetField;
use titlescout_table::AddressTable;

/// How many entries to keep in each top-N list.
const TOP_N: usize = 10;

/// Aggregate statistics for one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableAnalysis {
    /// Total data rows.
    pub total_rows: usize,
    /// Rows whose county is missing (blank or sentinel).
    pub missing_county: usize,
    /// Rows whose owner is missing (blank or sentinel).
    pub missing_owner: usize,
    /// County values by frequency, descending.
    pub counties: Vec<(String, usize)>,
    /// Top cities by frequency.
    pub cities: Vec<(String, usize)>,
    /// Top ZIP codes by frequency.
    pub zipcodes: Vec<(String, usize)>,
}

/// Missing-county delta between an original table and its enriched output.
#[derive(Debug, Clone, Serialize)]
pub struct TableComparison {
    /// Missing-county rows in the original.
    pub original_missing: usize,
    /// Missing-county rows in the updated table.
    pub updated_missing: usize,
    /// Rows that gained a county.
    pub records_updated: usize,
    /// Percentage of originally-missing rows that resolved.
    pub success_rate: f64,
}

/// Analyze a table: totals, missingness, and value frequencies.
pub fn analyze(table: &AddressTable) -> TableAnalysis {
    let missing_county = table.missing(TargetField::County).count();
    let missing_owner = table.missing(TargetField::Owner).count();

    let rows = 0..table.len();
    let counties = counted(rows.clone().map(|r| table.county(r)), usize::MAX);
    let cities = counted(rows.clone().map(|r| table.city(r)), TOP_N);
    let zipcodes = counted(rows.map(|r| table.zip(r)), TOP_N);

    TableAnalysis {
        total_rows: table.len(),
        missing_county,
        missing_owner,
        counties,
        cities,
        zipcodes,
    }
}

/// Compare missing-county counts before and after an enrichment run.
pub fn compare(original: &AddressTable, updated: &AddressTable) -> TableComparison {
    let original_missing = original.missing(TargetField::County).count();
    let updated_missing = updated.missing(TargetField::County).count();
    let records_updated = original_missing.saturating_sub(updated_missing);

    let success_rate = if original_missing == 0 {
        0.0
    } else {
        records_updated as f64 / original_missing as f64 * 100.0
    };

    TableComparison {
        original_missing,
        updated_missing,
        records_updated,
        success_rate,
    }
}

/// Count non-blank values, sorted by frequency descending, then by value
/// for a stable order. Truncated to `limit`.
fn counted<'a>(values: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let value = value.trim();
        if !value.is_empty() {
            *counts.entry(value.to_string()).or_default() += 1;
        }
    }

    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use titlescout_shared::{AppConfig, TableConfig};

    fn load_sample(name: &str, content: &str) -> AddressTable {
        let dir = std::env::temp_dir().join("titlescout-report-tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        AddressTable::load(&path, &TableConfig::from(&AppConfig::default())).unwrap()
    }

    const SAMPLE: &str = "\
StreetAddress,City,State,Zipcode,CountyName,TitleOwner
1 A St,Atlanta,GA,30309,Fulton County,JOHN DOE
2 B St,Atlanta,GA,30309,Fulton County,
3 C St,Decatur,GA,30030,DeKalb County,
4 D St,Decatur,GA,30030,UNKNOWN,
5 E St,Atlanta,GA,30310,,
";

    #[test]
    fn analyze_counts_values_and_missingness() {
        let table = load_sample("analyze.csv", SAMPLE);
        let analysis = analyze(&table);

        assert_eq!(analysis.total_rows, 5);
        assert_eq!(analysis.missing_county, 2);
        assert_eq!(analysis.missing_owner, 4);
        // Sentinel still counts as a raw value in the frequency list; the
        // missing_* counters are where missingness semantics live.
        assert_eq!(analysis.counties[0], ("Fulton County".to_string(), 2));
        assert_eq!(analysis.cities[0], ("Atlanta".to_string(), 3));
        assert_eq!(analysis.zipcodes[0], ("30309".to_string(), 2));
    }

    #[test]
    fn compare_reports_delta_and_rate() {
        let original = load_sample("compare-before.csv", SAMPLE);
        let updated = load_sample(
            "compare-after.csv",
            "\
StreetAddress,City,State,Zipcode,CountyName,TitleOwner
1 A St,Atlanta,GA,30309,Fulton County,JOHN DOE
2 B St,Atlanta,GA,30309,Fulton County,
3 C St,Decatur,GA,30030,DeKalb County,
4 D St,Decatur,GA,30030,DeKalb County,
5 E St,Atlanta,GA,30310,,
",
        );

        let comparison = compare(&original, &updated);
        assert_eq!(comparison.original_missing, 2);
        assert_eq!(comparison.updated_missing, 1);
        assert_eq!(comparison.records_updated, 1);
        assert_eq!(comparison.success_rate, 50.0);
    }

    #[test]
    fn compare_with_nothing_missing_is_zero_rate() {
        let table = load_sample(
            "compare-full.csv",
            "\
StreetAddress,City,State,Zipcode,CountyName,TitleOwner
1 A St,Atlanta,GA,30309,Fulton County,JOHN DOE
",
        );
        let comparison = compare(&table, &table);
        assert_eq!(comparison.records_updated, 0);
        assert_eq!(comparison.success_rate, 0.0);
    }

    #[test]
    fn analysis_serializes_to_json() {
        let table = load_sample("analyze-json.csv", SAMPLE);
        let analysis = analyze(&table);
        let json = serde_json::to_string_pretty(&analysis).unwrap();
        assert!(json.contains("\"total_rows\": 5"));
        assert!(json.contains("Fulton County"));
    }
}
