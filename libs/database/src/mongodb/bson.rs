use chrono::{DateTime, Utc};
use mongodb::bson::{Bson, Document, doc, to_raw_document_buf};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
struct Field<'a, T: ?Sized> {
    v: &'a T,
}

/// Serialize through the raw document path used by `insert_one`, so filter
/// values have the same BSON type as the stored fields.
fn stored_form<T: Serialize + ?Sized>(value: &T) -> Bson {
    to_raw_document_buf(&Field { v: value })
        .ok()
        .and_then(|raw| raw.to_document().ok())
        .and_then(|mut doc| doc.remove("v"))
        .unwrap_or(Bson::Null)
}

/// BSON form of an entity id, matching how `_id: Uuid` fields are stored.
pub fn id_bson(id: &Uuid) -> Bson {
    stored_form(id)
}

/// `{ "_id": <id> }`
pub fn id_filter(id: &Uuid) -> Document {
    doc! { "_id": id_bson(id) }
}

pub fn ids_bson(ids: &[Uuid]) -> Bson {
    Bson::Array(ids.iter().map(id_bson).collect())
}

/// Timestamps are stored the way chrono serializes them (RFC 3339 strings),
/// so range filters must compare against the same representation.
pub fn date_bson(at: &DateTime<Utc>) -> Bson {
    stored_form(at)
}

/// Serialize an enum or value object for use inside a filter.
pub fn value_bson<T: Serialize>(value: &T) -> Bson {
    stored_form(value)
}

/// Case-insensitive "contains" match with the user input escaped.
pub fn contains_ci(term: &str) -> Document {
    doc! { "$regex": regex::escape(term.trim()), "$options": "i" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::from_bson;

    #[test]
    fn test_id_filter_decodes_back_to_id() {
        let id = Uuid::now_v7();
        let filter = id_filter(&id);
        let stored = filter.get("_id").cloned().unwrap();
        assert_ne!(stored, Bson::Null);
        assert_eq!(from_bson::<Uuid>(stored).unwrap(), id);
    }

    #[test]
    fn test_value_bson_for_unit_enum() {
        #[derive(Serialize)]
        #[serde(rename_all = "snake_case")]
        enum Status {
            OutForDelivery,
        }
        assert_eq!(
            value_bson(&Status::OutForDelivery),
            Bson::String("out_for_delivery".to_string())
        );
    }

    #[test]
    fn test_dates_compare_as_strings() {
        let early = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 11, 2, 3, 4, 5).unwrap();
        let (Bson::String(a), Bson::String(b)) = (date_bson(&early), date_bson(&late)) else {
            panic!("dates should serialize as strings");
        };
        assert!(a < b);
        assert!(a.starts_with("2025-01-02"));
    }

    #[test]
    fn test_contains_ci_escapes_input() {
        let filter = contains_ci(" t-shirt (xl) ");
        assert_eq!(filter.get_str("$regex").unwrap(), r"t\-shirt \(xl\)");
        assert_eq!(filter.get_str("$options").unwrap(), "i");
    }
}
