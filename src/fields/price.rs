use serde_json::Value;

use crate::{
    domain::price::{PriceValue, format_price},
    fields::{
        Field, FieldConfig, FieldOptions,
        render::{OptionRow, RenderRequest, TextInput, input_name, option_name},
    },
    storage::operations::EntityId,
};

/// Numeric amount with a configurable display symbol
pub struct PriceField;

impl PriceField {
    fn symbol(field: &FieldConfig) -> &str {
        match &field.options {
            FieldOptions::Price { symbol } => symbol.as_str(),
            _ => "",
        }
    }
}

/// Stored values are strings; anything else reads as empty
fn stored_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

impl Field for PriceField {
    fn name(&self) -> &'static str {
        "price"
    }

    fn title(&self) -> &'static str {
        "Price"
    }

    fn render_options(&self, key: &str, field: &FieldConfig) -> Vec<OptionRow> {
        let name = option_name(key, "symbol");
        vec![OptionRow {
            label: "Symbol".to_string(),
            input: TextInput {
                id: name.clone(),
                name,
                class: "text".to_string(),
                value: Self::symbol(field).to_string(),
            },
        }]
    }

    fn render_field(&self, field: &FieldConfig, value: &Value) -> RenderRequest {
        let name = input_name(&field.key);
        RenderRequest::Price {
            symbol: Self::symbol(field).to_string(),
            input: TextInput {
                id: name.clone(),
                name,
                class: self.name().to_string(),
                value: stored_text(value),
            },
        }
    }

    fn update_value(&self, _entity: EntityId, _field: &FieldConfig, value: &str) -> Value {
        Value::String(format_price(value))
    }

    fn format_value_for_api(&self, value: Value, field: &FieldConfig) -> Value {
        Value::String(PriceValue::with_symbol(
            Self::symbol(field),
            &stored_text(&value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn price_field(symbol: &str) -> FieldConfig {
        FieldConfig {
            key: "field_price".to_string(),
            label: "Price".to_string(),
            options: FieldOptions::Price {
                symbol: symbol.to_string(),
            },
        }
    }

    #[test]
    fn test_update_value_normalizes() {
        let field = price_field("$");

        assert_eq!(PriceField.update_value(1, &field, "3"), json!("3.00"));
        assert_eq!(PriceField.update_value(1, &field, "abc"), json!("0.00"));
        assert_eq!(PriceField.update_value(1, &field, "-1.5"), json!("-1.50"));
    }

    #[test]
    fn test_api_value_prefixes_symbol() {
        let field = price_field("$");

        assert_eq!(
            PriceField.format_value_for_api(json!("3.00"), &field),
            json!("$3.00")
        );
    }

    #[test]
    fn test_api_value_without_stored_value() {
        let field = price_field("£");

        assert_eq!(
            PriceField.format_value_for_api(Value::Null, &field),
            json!("£")
        );
    }

    #[test]
    fn test_render_options_symbol_row() {
        let field = price_field("€");

        let rows = PriceField.render_options("field_abc", &field);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Symbol");
        assert_eq!(rows[0].input.name, "fields[field_abc][symbol]");
        assert_eq!(rows[0].input.value, "€");
    }

    #[test]
    fn test_render_options_default_symbol() {
        let rows = PriceField.render_options("field_abc", &price_field(""));
        assert_eq!(rows[0].input.value, "");
    }

    #[test]
    fn test_render_field() {
        let field = price_field("$");

        let request = PriceField.render_field(&field, &json!("12.50"));

        assert_eq!(
            request,
            RenderRequest::Price {
                symbol: "$".to_string(),
                input: TextInput {
                    id: "fields[field_price]".to_string(),
                    name: "fields[field_price]".to_string(),
                    class: "price".to_string(),
                    value: "12.50".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_render_field_empty() {
        let request = PriceField.render_field(&price_field("$"), &Value::Null);

        let RenderRequest::Price { input, .. } = request else {
            panic!("expected price widget");
        };
        assert_eq!(input.value, "");
    }
}
