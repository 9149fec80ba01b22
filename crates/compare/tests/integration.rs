use std::path::PathBuf;

use cubadiff_compare::config::Locale;
use cubadiff_compare::export::{changes_to_csv, groups_to_csv};
use cubadiff_compare::{
    compare, Category, CompareConfig, FallbackReason, KeyScheme, RowKey, Table, Value,
};
use pretty_assertions::assert_eq;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn route_table(rows: &[(&str, f64)]) -> Table {
    Table::with_rows(
        cols(&["rotas", "peso"]),
        rows.iter()
            .map(|(id, peso)| vec![Value::text(*id), Value::Number(*peso)])
            .collect(),
    )
}

/// 40-column workbook row: `rotas` at A, `c1..c39` after it, all zero.
fn workbook(ids: &[&str]) -> Table {
    let mut columns = vec!["rotas".to_string()];
    columns.extend((1..40).map(|i| format!("c{i}")));
    let rows = ids
        .iter()
        .map(|id| {
            let mut row = vec![Value::text(*id)];
            row.extend((1..40).map(|_| Value::Integer(0)));
            row
        })
        .collect();
    Table::with_rows(columns, rows)
}

// -------------------------------------------------------------------------
// End to end
// -------------------------------------------------------------------------

#[test]
fn route_weights_end_to_end() {
    let old = route_table(&[("R1", 10.0), ("R2", 20.0)]);
    let new = route_table(&[("R1", 10.00000001), ("R2", 25.0)]);

    let report = compare(&old, &new, &CompareConfig::default());

    assert_eq!(
        report.summary.key_scheme,
        KeyScheme::Identifier {
            column: "rotas".into()
        }
    );
    assert_eq!(report.changes.len(), 1);
    let change = &report.changes[0];
    assert_eq!(change.row_key, RowKey::Identifier("R2".into()));
    assert_eq!(change.column, "peso");
    assert_eq!(change.old_value, "20.0");
    assert_eq!(change.new_value, "25.0");
    assert_eq!(change.category, Category::General);

    assert_eq!(report.display.cell(1, 1), &Value::text("20.0 ➡️ 25.0"));
    // R1 is within tolerance and untouched.
    assert_eq!(report.display.cell(0, 1), &Value::Number(10.00000001));

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].description, "[General] peso (20.0 ➡️ 25.0)");

    let csv = String::from_utf8(changes_to_csv(&report.changes, Locale::En).unwrap()).unwrap();
    assert_eq!(
        csv,
        "ID_REF,Rota,Coluna,Valor Antigo,Valor Novo,Categoria\nR2,R2,peso,20.0,25.0,General\n"
    );
}

#[test]
fn comparing_a_table_with_itself_is_clean() {
    let table = workbook(&["R1", "R2", "R3"]);
    let report = compare(&table, &table, &CompareConfig::default());

    assert!(!report.has_changes());
    assert!(report.changes.is_empty());
    assert!(report.groups.is_empty());
    assert_eq!(report.display, table);
}

#[test]
fn tolerance_boundaries() {
    let old = route_table(&[("A", 1.0), ("B", 1.0)]);
    let new = route_table(&[("A", 1.0 + 1e-9), ("B", 1.1)]);
    let report = compare(&old, &new, &CompareConfig::default());

    let keys: Vec<String> = report.changes.iter().map(|c| c.row_key.to_string()).collect();
    assert_eq!(keys, vec!["B"]);
}

#[test]
fn numeric_text_and_numbers_compare_as_numbers() {
    let old = Table::with_rows(
        cols(&["rotas", "peso"]),
        vec![vec![Value::text("R1"), Value::text(" 10 ")]],
    );
    let new = Table::with_rows(
        cols(&["rotas", "peso"]),
        vec![vec![Value::text("R1"), Value::Number(10.0)]],
    );
    assert!(!compare(&old, &new, &CompareConfig::default()).has_changes());
}

// -------------------------------------------------------------------------
// Presence
// -------------------------------------------------------------------------

#[test]
fn value_appearing_and_disappearing() {
    let old = Table::with_rows(
        cols(&["rotas", "frete"]),
        vec![
            vec![Value::text("R1"), Value::Empty],
            vec![Value::text("R2"), Value::text("5")],
        ],
    );
    let new = Table::with_rows(
        cols(&["rotas", "frete"]),
        vec![
            vec![Value::text("R1"), Value::text("5")],
            vec![Value::text("R2"), Value::Number(f64::NAN)],
        ],
    );
    let report = compare(&old, &new, &CompareConfig::default());

    let pairs: Vec<(&str, &str)> = report
        .changes
        .iter()
        .map(|c| (c.old_value.as_str(), c.new_value.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Empty", "5"), ("5", "Empty")]);
    assert_eq!(report.display.cell(0, 1), &Value::text("Empty ➡️ 5"));
}

// -------------------------------------------------------------------------
// Categories + suppression
// -------------------------------------------------------------------------

#[test]
fn workbook_layout_with_fixture_config() {
    let text = std::fs::read_to_string(fixtures_dir().join("routes.compare.toml")).unwrap();
    let config = CompareConfig::from_toml(&text).unwrap();
    assert_eq!(config.locale, Locale::PtBr);

    let old = workbook(&["R1"]);
    let mut new = workbook(&["R1"]);
    for pos in [7, 26, 30] {
        new.set(0, pos, Value::Integer(1));
    }

    let report = compare(&old, &new, &config);

    assert_eq!(report.summary.total_changes, 3);
    assert_eq!(report.summary.suppressed_changes, 1);
    let found: Vec<(usize, Category)> = report
        .changes
        .iter()
        .map(|c| (c.position, c.category))
        .collect();
    assert_eq!(
        found,
        vec![(7, Category::BranchChange), (26, Category::ReturnFreightChange)]
    );
    // Suppressed, but the display still carries the marker.
    assert_eq!(report.display.cell(0, 30), &Value::text("0 ➡️ 1"));

    assert_eq!(
        report.groups[0].description,
        "[Alterações Filiais] c7 (0 ➡️ 1) | [Alteração de Frete Retorno] c26 (0 ➡️ 1)"
    );
    let groups = String::from_utf8(groups_to_csv(&report.groups).unwrap()).unwrap();
    assert!(groups.starts_with("ID_REF,Rota,Alterações\nR1,R1,"));
}

#[test]
fn legacy_preset_matches_fixture() {
    let text = std::fs::read_to_string(fixtures_dir().join("routes.compare.toml")).unwrap();
    let config = CompareConfig::from_toml(&text).unwrap();
    let preset = CompareConfig::default()
        .with_legacy_suppression()
        .with_locale(Locale::PtBr);
    assert_eq!(config, preset);
}

// -------------------------------------------------------------------------
// Fallback
// -------------------------------------------------------------------------

#[test]
fn duplicate_identifiers_fall_back_to_position() {
    let old = route_table(&[("R1", 1.0), ("R1", 2.0), ("R3", 3.0)]);
    let new = route_table(&[("R1", 1.0), ("R2", 5.0)]);

    let report = compare(&old, &new, &CompareConfig::default());

    assert_eq!(report.summary.key_scheme, KeyScheme::Positional { bound: 2 });
    assert!(matches!(
        report.summary.fallback,
        Some(FallbackReason::IdentifierDuplicated { .. })
    ));
    assert!(report.alignment.fallback_engaged());
    assert_eq!(report.summary.rows_compared, 2);
    assert_eq!(report.summary.rows_only_in_old, 1);

    // Row 1 differs in both the identifier and the weight.
    let changed: Vec<(String, &str)> = report
        .changes
        .iter()
        .map(|c| (c.row_key.to_string(), c.column.as_str()))
        .collect();
    assert_eq!(
        changed,
        vec![("1".to_string(), "rotas"), ("1".to_string(), "peso")]
    );
    assert_eq!(report.changes[0].row_label, "R2");
    assert!(report.changes.iter().all(|c| matches!(c.row_key, RowKey::Position(_))));
}

#[test]
fn missing_identifier_falls_back_to_position() {
    let old = Table::with_rows(cols(&["peso"]), vec![vec![Value::Number(1.0)]]);
    let new = Table::with_rows(cols(&["peso"]), vec![vec![Value::Number(2.0)]]);
    let report = compare(&old, &new, &CompareConfig::default());

    assert!(report.alignment.identifier_missing());
    assert_eq!(report.changes[0].row_key, RowKey::Position(0));
    assert_eq!(report.changes[0].row_label, "0");
}

// -------------------------------------------------------------------------
// Intersection
// -------------------------------------------------------------------------

#[test]
fn only_shared_rows_and_columns_are_compared() {
    let old = Table::with_rows(
        cols(&["rotas", "peso", "antigo"]),
        vec![
            vec![Value::text("R1"), Value::Integer(1), Value::Integer(1)],
            vec![Value::text("R2"), Value::Integer(1), Value::Integer(1)],
        ],
    );
    let new = Table::with_rows(
        cols(&["rotas", "novo", "peso"]),
        vec![
            vec![Value::text("R3"), Value::Integer(9), Value::Integer(9)],
            vec![Value::text("R1"), Value::Integer(9), Value::Integer(2)],
        ],
    );
    let report = compare(&old, &new, &CompareConfig::default());

    assert_eq!(report.changes.len(), 1);
    assert_eq!(report.changes[0].row_key, RowKey::Identifier("R1".into()));
    assert_eq!(report.changes[0].column, "peso");
    assert_eq!(report.summary.rows_only_in_old, 1);
    assert_eq!(report.summary.rows_only_in_new, 1);
    assert_eq!(report.summary.columns_only_in_old, 1);
    assert_eq!(report.summary.columns_only_in_new, 1);
    // New-only row and column are left as they were.
    assert_eq!(report.display.cell(0, 1), &Value::Integer(9));
    assert_eq!(report.display.cell(1, 2), &Value::text("1 ➡️ 2"));
}

#[test]
fn focus_on_one_route() {
    let old = route_table(&[("R1", 1.0), ("R2", 2.0)]);
    let new = route_table(&[("R1", 1.5), ("R2", 2.0)]);
    let report = compare(&old, &new, &CompareConfig::default());

    let focus = report.focus("R1").unwrap();
    assert_eq!(focus.changes.len(), 1);
    assert_eq!(focus.display.cell(0, 0), &Value::text("R1"));
    assert_eq!(focus.display.cell(0, 1), &Value::text("1.0 ➡️ 1.5"));
}

#[test]
fn summary_serializes_to_json() {
    let old = route_table(&[("R1", 1.0)]);
    let new = route_table(&[("R1", 2.0)]);
    let report = compare(&old, &new, &CompareConfig::default());

    let json = serde_json::to_value(&report.summary).unwrap();
    assert_eq!(json["key_scheme"]["mode"], "identifier");
    assert_eq!(json["key_scheme"]["column"], "rotas");
    assert_eq!(json["total_changes"], 1);
    assert!(json.get("fallback").is_none());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["changes"][0]["row_key"], "R1");
    assert_eq!(json["changes"][0]["category"], "general");
    assert!(json.get("alignment").is_none());
}
