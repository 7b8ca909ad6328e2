// src/api/models.rs
use serde_json::{Map, Value};

/// Public brewery directory; any endpoint taking `per_page`/`page` works.
pub const DEFAULT_API_URL: &str = "https://api.openbrewerydb.org/v1/breweries";
/// The API's maximum results per page.
pub const DEFAULT_PER_PAGE: u32 = 200;
pub const DEFAULT_DELAY_MS: u64 = 100;

/// Columns kept in the CSV dump, in output order.
pub const DEFAULT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "brewery_type",
    "street",
    "city",
    "state",
    "postal_code",
    "country",
    "longitude",
    "latitude",
    "phone",
    "website_url",
];

/// Flattens nested objects into dotted keys (`address.city`). Arrays and
/// scalars are kept as-is; a non-object record becomes a single `value` key.
pub fn flatten_record(record: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    match record {
        Value::Object(object) => flatten_into(&mut flat, None, object),
        other => {
            flat.insert("value".to_string(), other.clone());
        }
    }
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: Option<&str>, object: &Map<String, Value>) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(flat, Some(&name), inner),
            other => {
                flat.insert(name, other.clone());
            }
        }
    }
}

/// The wanted columns that occur in at least one record, in wanted order.
pub fn present_columns(wanted: &[String], records: &[Map<String, Value>]) -> Vec<String> {
    wanted
        .iter()
        .filter(|column| records.iter().any(|r| r.contains_key(column.as_str())))
        .cloned()
        .collect()
}
