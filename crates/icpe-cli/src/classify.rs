//! `classify` command handler: a lookup against the classification table
//! without touching the network or the database.

use std::path::Path;

use icpe_core::ClassificationTable;

/// Prints the classification of `code` / `sub_code`, or `no match`.
///
/// # Errors
///
/// Returns an error if the table at `table_path` cannot be read or is
/// invalid, or if the embedded table fails to parse.
pub(crate) fn run_classify(
    code: &str,
    sub_code: Option<&str>,
    table_path: Option<&Path>,
) -> anyhow::Result<()> {
    let table = match table_path {
        Some(path) => ClassificationTable::load(path)?,
        None => ClassificationTable::embedded()?,
    };
    println!("{}", describe(&table, code, sub_code));
    Ok(())
}

fn describe(table: &ClassificationTable, code: &str, sub_code: Option<&str>) -> String {
    let key = match sub_code {
        Some(sub) => format!("{code}/{sub}"),
        None => code.to_owned(),
    };
    match table.classify(code, sub_code) {
        Some(c) => format!("{key}: {} {}", c.category, c.waste_type),
        None if table.contains_code(code) => format!("{key}: no match (unknown alinea)"),
        None => format!("{key}: no match"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ClassificationTable {
        ClassificationTable::embedded().unwrap()
    }

    #[test]
    fn describe_prints_wire_names() {
        assert_eq!(
            describe(&table(), "2710", Some("1a")),
            "2710/1a: WASTE_CENTER DANGEROUS"
        );
        assert_eq!(
            describe(&table(), "2715", None),
            "2715: COLLECTOR NOT_DANGEROUS"
        );
    }

    #[test]
    fn describe_distinguishes_unknown_alinea_from_unknown_code() {
        assert_eq!(
            describe(&table(), "2716", Some("3")),
            "2716/3: no match (unknown alinea)"
        );
        assert_eq!(describe(&table(), "4560", None), "4560: no match");
    }
}
