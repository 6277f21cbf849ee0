// src/process/reconcile.rs

use tracing::debug;

use super::header::UniqueNames;

/// Pad the declared names with `Unnamed_<slot>` until they cover every field
/// of the first data line. Surplus declared names are left in place.
pub fn reconcile(names: Vec<String>, first_data_line: &str) -> Vec<String> {
    let field_count = first_data_line.split_whitespace().count();
    if names.len() >= field_count {
        return names;
    }
    debug!(
        declared = names.len(),
        fields = field_count,
        "header under-declares columns"
    );
    let mut out = UniqueNames::from_names(names);
    for slot in out.len()..field_count {
        out.push(format!("Unnamed_{}", slot));
    }
    out.into_names()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pads_to_field_count() {
        let out = reconcile(names(&["Timestamp", "Pressure"]), "20230101T000000.0Z 1 2 3");
        assert_eq!(out, vec!["Timestamp", "Pressure", "Unnamed_2", "Unnamed_3"]);
    }

    #[test]
    fn no_header_at_all() {
        let out = reconcile(Vec::new(), "  a   b ");
        assert_eq!(out, vec!["Unnamed_0", "Unnamed_1"]);
    }

    #[test]
    fn never_truncates() {
        let declared = names(&["Timestamp", "Pressure", "Ozone"]);
        assert_eq!(reconcile(declared.clone(), "20230101T000000.0Z 1"), declared);
    }

    #[test]
    fn length_always_covers_fields() {
        for declared in 0..6 {
            let v: Vec<String> = (0..declared).map(|i| format!("c{}", i)).collect();
            let out = reconcile(v, "1 2 3 4");
            assert_eq!(out.len(), declared.max(4));
        }
    }
}
