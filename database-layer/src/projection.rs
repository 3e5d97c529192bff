// Field projection: reduce an entity to `id` plus caller-selected fields
use serde_json::{Map, Value};

use crate::entity::{normalize_name, Entity};

/// Split a comma-separated field list, dropping blanks
pub fn parse_fields(fields: &str) -> Vec<String> {
    fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Project `entity` onto `id` plus the requested fields
///
/// Names match serialized keys case-insensitively (`VisitDate` finds
/// `visit_date`). Unrecognized names are ignored. A missing or blank field
/// list returns the whole entity.
pub fn project<E: Entity>(entity: &E, fields: Option<&str>) -> Result<Value, serde_json::Error> {
    let full = serde_json::to_value(entity)?;
    let wanted = fields.map(parse_fields).unwrap_or_default();
    if wanted.is_empty() {
        return Ok(full);
    }

    let Value::Object(source) = full else {
        return Ok(full);
    };

    let mut projected = Map::new();
    if let Some(id) = source.get("id") {
        projected.insert("id".to_string(), id.clone());
    }

    for name in &wanted {
        let wanted_key = normalize_name(name);
        if let Some((key, value)) = source.iter().find(|(key, _)| normalize_name(key) == wanted_key) {
            projected.insert(key.clone(), value.clone());
        }
    }

    Ok(Value::Object(projected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct LabResult {
        id: Uuid,
        test_name: String,
        result_value: f64,
        unit: String,
    }

    crate::impl_entity!(LabResult, table = "lab_results", fields = [
        id: Uuid,
        test_name: Text [searchable],
        unit: Text,
    ]);

    fn hba1c() -> LabResult {
        LabResult {
            id: Uuid::nil(),
            test_name: "HbA1c".to_string(),
            result_value: 6.1,
            unit: "%".to_string(),
        }
    }

    #[test]
    fn test_projects_id_and_requested_fields() {
        let projected = project(&hba1c(), Some("TestName, unit")).unwrap();
        assert_eq!(
            projected,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "test_name": "HbA1c",
                "unit": "%",
            })
        );
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let projected = project(&hba1c(), Some("reference_range,unit")).unwrap();
        assert_eq!(projected.as_object().map(Map::len), Some(2));
        assert_eq!(projected["unit"], json!("%"));
    }

    #[test]
    fn test_no_fields_returns_everything() {
        let full = project(&hba1c(), None).unwrap();
        assert_eq!(full["result_value"], json!(6.1));
        let blank = project(&hba1c(), Some(" , ")).unwrap();
        assert_eq!(blank, full);
    }

    #[test]
    fn test_id_is_always_present() {
        let projected = project(&hba1c(), Some("resultValue")).unwrap();
        assert_eq!(projected["id"], json!("00000000-0000-0000-0000-000000000000"));
        assert_eq!(projected["result_value"], json!(6.1));
    }

    #[test]
    fn test_parse_fields() {
        assert_eq!(parse_fields(" a, ,b ,"), vec!["a".to_string(), "b".to_string()]);
    }
}
