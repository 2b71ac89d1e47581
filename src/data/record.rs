use super::coerce::{discontinued_flag, to_f64, to_i64, ConversionError};
use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const INVENTORY_ID: &str = "Inventory_ID";
pub const NAME: &str = "Name";
pub const DESCRIPTION: &str = "Description";
pub const PRICE: &str = "Price";
pub const QUANTITY_IN_STOCK: &str = "Quantity_in_Stock";
pub const QUANTITY_IN_REORDER: &str = "Quantity_in_Reorder";
pub const DISCONTINUED: &str = "Discontinued";

/// One row of the inventory table. Fields are schema-free.
pub type Record = HashMap<String, Value>;

/// Typed projection of a record as returned by the lookup operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    #[serde(rename = "Inventory_ID")]
    pub inventory_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Quantity_in_Stock")]
    pub quantity_in_stock: i64,
    #[serde(rename = "Quantity_in_Reorder")]
    pub quantity_in_reorder: i64,
    #[serde(rename = "Discontinued")]
    pub discontinued: bool,
}

impl InventoryRecord {
    pub fn from_record(record: &Record) -> Result<Self, ConversionError> {
        Ok(Self {
            inventory_id: text_field(record, INVENTORY_ID),
            name: text_field(record, NAME),
            description: text_field(record, DESCRIPTION),
            price: numeric_field(record, PRICE, to_f64)?,
            quantity_in_stock: numeric_field(record, QUANTITY_IN_STOCK, to_i64)?,
            quantity_in_reorder: numeric_field(record, QUANTITY_IN_REORDER, to_i64)?,
            discontinued: discontinued_flag(record.get(DISCONTINUED)),
        })
    }
}

fn text_field(record: &Record, field: &str) -> String {
    record.get(field).map(|v| v.to_string()).unwrap_or_default()
}

fn numeric_field<T>(
    record: &Record,
    field: &str,
    convert: fn(&Value) -> Result<T, ConversionError>,
) -> Result<T, ConversionError> {
    let converted = match record.get(field) {
        Some(value) => convert(value),
        None => convert(&Value::Null),
    };
    converted.map_err(|e| e.in_field(field))
}

/// Render a record as a JSON object with every field untyped
pub fn record_to_json(record: &Record) -> serde_json::Map<String, serde_json::Value> {
    record
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect()
}

pub fn record_from_json(row: &serde_json::Map<String, serde_json::Value>) -> Record {
    row.iter()
        .map(|(name, value)| (name.clone(), Value::from_json(value)))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_record(id: &str, price: Value, stock: i64, discontinued: Value) -> Record {
        let mut row = HashMap::new();
        row.insert(INVENTORY_ID.to_string(), Value::String(id.to_string()));
        row.insert(NAME.to_string(), Value::String(format!("Item {}", id)));
        row.insert(DESCRIPTION.to_string(), Value::String("test item".to_string()));
        row.insert(PRICE.to_string(), price);
        row.insert(QUANTITY_IN_STOCK.to_string(), Value::Int64(stock));
        row.insert(QUANTITY_IN_REORDER.to_string(), Value::Int64(stock / 2));
        row.insert(DISCONTINUED.to_string(), discontinued);
        row
    }

    #[test]
    fn test_typed_projection() {
        let row = make_record("A1", Value::String("9.5".into()), 10, Value::String("yes".into()));
        let typed = InventoryRecord::from_record(&row).unwrap();

        assert_eq!(typed.inventory_id, "A1");
        assert_eq!(typed.name, "Item A1");
        assert_eq!(typed.price, 9.5);
        assert_eq!(typed.quantity_in_stock, 10);
        assert_eq!(typed.quantity_in_reorder, 5);
        assert!(typed.discontinued);
    }

    #[test]
    fn test_typed_projection_reports_field() {
        let row = make_record("A1", Value::String("cheap".into()), 1, Value::Null);
        let err = InventoryRecord::from_record(&row).unwrap_err();

        assert!(matches!(err, ConversionError::Field { ref field, .. } if field == PRICE));
        assert!(err.to_string().contains("cheap"));
    }

    #[test]
    fn test_typed_projection_serializes_wire_field_names() {
        let row = make_record("B2", Value::Float64(1.25), 4, Value::Int64(0));
        let typed = InventoryRecord::from_record(&row).unwrap();
        let json = serde_json::to_value(&typed).unwrap();

        assert_eq!(json["Inventory_ID"], "B2");
        assert_eq!(json["Quantity_in_Stock"], 4);
        assert_eq!(json["Discontinued"], false);
    }
}
