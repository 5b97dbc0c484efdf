//! Purpose: Public-API coverage for table construction and chained queries.
//! Exports: Integration tests only.
//! Role: Pin the observable behavior that scripts depend on (normalization, order, absent means).
//! Invariants: Tests only use `rowtable`'s re-exported surface.
use std::collections::HashMap;

use rowtable::{CsvSource, Key, Record, Table, Value};

const CITIES: &str = "\
City , Country,Temperature
Madrid, Spain ,15.2
Berlin,Germany,9.1
Seville,spain,19.0
Hamburg, GERMANY ,n/a
Bilbao,Spain,11.9
Munich,germany,10.4
";

fn cities() -> Table {
    Table::from_source(CsvSource::from_reader(CITIES.as_bytes())).expect("csv")
}

fn text(record: &Record, column: &str) -> String {
    record
        .field(column)
        .map(|value| value.to_string())
        .unwrap_or_default()
}

#[test]
fn padded_keys_and_values_are_normalized() {
    let mut raw = HashMap::new();
    raw.insert("  Name ", " X ");
    let table = Table::new(vec![raw]);
    let record = table.get(0).unwrap();
    assert_eq!(record.get(&Key::from("name")), Some(&Value::from("X")));
}

#[test]
fn length_matches_input() {
    let rows: Vec<Vec<(&str, i32)>> = (0..17).map(|i| vec![("n", i)]).collect();
    assert_eq!(Table::new(rows.clone()).len(), rows.len());
    assert!(Table::new(Vec::<Vec<(&str, i32)>>::new()).is_empty());
    assert_eq!(cities().len(), 6);
}

#[test]
fn csv_header_and_cells_are_normalized() {
    let table = cities();
    let first = table.get(0).unwrap();
    let keys: Vec<_> = first.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["city", "country", "temperature"]);
    assert_eq!(text(first, "country"), "Spain");
}

#[test]
fn select_never_adds_keys_or_reorders() {
    let table = cities();
    let projected = table.select(["temperature", "CITY", "population"]);
    assert_eq!(projected.len(), table.len());
    for (original, selected) in table.iter().zip(projected.iter()) {
        for key in selected.keys() {
            assert!(original.contains_key(key));
        }
        assert_eq!(text(original, "city"), text(selected, "city"));
        assert!(selected.field("country").is_none());
    }
    assert_eq!(
        table.select(["city", "country"]).select(["city", "country"]),
        table.select(["city", "country"])
    );
}

#[test]
fn filter_is_a_stable_subset() {
    let table = cities();
    let warm = table.filter(|r| {
        r.field("temperature")
            .and_then(rowtable::try_parse_number)
            .is_some_and(|t| t > 11.0)
    });
    assert!(warm.len() <= table.len());
    let names: Vec<_> = warm.iter().map(|r| text(r, "city")).collect();
    assert_eq!(names, vec!["Madrid", "Seville", "Bilbao"]);
}

#[test]
fn chained_country_and_temperature_filters() {
    let table = cities();
    let germany = table.filter(|r| {
        r.field("country")
            .is_some_and(|v| v.to_string().trim().to_lowercase() == "germany")
    });
    let names: Vec<_> = germany.iter().map(|r| text(r, "city")).collect();
    assert_eq!(names, vec!["Berlin", "Hamburg", "Munich"]);

    let mild = germany.filter(|r| {
        r.field("temperature")
            .and_then(rowtable::try_parse_number)
            .is_some_and(|t| t > 10.0)
    });
    let names: Vec<_> = mild.iter().map(|r| text(r, "city")).collect();
    assert_eq!(names, vec!["Munich"]);
    assert_eq!(germany.len(), 3, "filtering never mutates the source table");
}

#[test]
fn mean_drops_non_numeric_and_reports_absence() {
    let table = Table::new(vec![vec![("t", "10")], vec![("t", "20")], vec![("t", "abc")]]);
    assert_eq!(table.mean("t"), Some(15.0));
    assert_eq!(table.mean("missing"), None);
    assert_eq!(Table::default().mean("t"), None);

    let mean = cities().mean("Temperature").unwrap();
    let expected = (15.2 + 9.1 + 19.0 + 11.9 + 10.4) / 5.0;
    assert!((mean - expected).abs() < 1e-9);
}

#[test]
fn unique_and_nunique_use_case_insensitive_markers() {
    let table = Table::new(vec![
        vec![("country", "Spain")],
        vec![("country", " spain ")],
        vec![("country", "Germany")],
    ]);
    assert_eq!(
        table.unique("country"),
        vec![Value::from("Spain"), Value::from("Germany")]
    );
    assert_eq!(table.nunique("country"), 2);
    assert_eq!(cities().nunique("COUNTRY"), 2);
}

#[test]
fn aggregate_is_the_general_reduction() {
    let table = cities();
    let longest = table.aggregate("city", |values| {
        values
            .into_iter()
            .filter_map(Value::as_text)
            .max_by_key(|name| name.len())
            .map(str::to_string)
    });
    assert_eq!(longest.as_deref(), Some("Hamburg"));
}

#[test]
fn export_round_trips_and_is_detached() {
    let table = cities();
    assert_eq!(Table::new(table.to_list()).to_list(), table.to_list());

    let mut exported = table.to_list();
    exported.clear();
    assert_eq!(table.len(), 6);
}

#[test]
fn json_export_is_an_array_of_objects() {
    let table = cities().select(["city"]);
    let json = serde_json::to_string(&table).unwrap();
    assert!(json.starts_with(r#"[{"city":"Madrid"},{"city":"Berlin"}"#));
}

#[test]
fn tables_can_be_shared_across_threads() {
    let table = std::sync::Arc::new(cities());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let table = std::sync::Arc::clone(&table);
            std::thread::spawn(move || table.nunique("country"))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
