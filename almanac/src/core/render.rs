//! Plaintext flattening of records for chat display.
//!
//! The output is for people, not parsers: separators occurring inside scalar
//! values are not escaped.

use serde_json::Value;

/// Separator between mapping entries.
pub const ENTRY_SEPARATOR: &str = ",\n";
/// Separator between sequence elements.
pub const ITEM_SEPARATOR: &str = " ";

/// Flatten `data` into a single string.
///
/// Mappings render as `key: value` entries joined by [`ENTRY_SEPARATOR`],
/// sequences as their elements joined by [`ITEM_SEPARATOR`]. Strings render
/// unquoted; other scalars use their JSON text (`1`, `true`, `null`).
pub fn render(data: &Value) -> String {
    match data {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", render(value)))
            .collect::<Vec<_>>()
            .join(ENTRY_SEPARATOR),
        Value::Array(items) => items
            .iter()
            .map(render)
            .collect::<Vec<_>>()
            .join(ITEM_SEPARATOR),
        Value::String(text) => text.clone(),
        scalar => scalar.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mapping_entries_in_insertion_order() {
        assert_eq!(render(&json!({"x": 1, "y": "a"})), "x: 1,\ny: a");
    }

    #[test]
    fn sequences_join_with_spaces() {
        assert_eq!(render(&json!(["嫁娶", "祭祀", 3])), "嫁娶 祭祀 3");
        assert_eq!(render(&json!([])), "");
    }

    #[test]
    fn nested_mapping_inlines_entries() {
        let data = json!({"干支": {"年": "甲辰", "日": "甲子"}, "空亡": "戌亥"});
        assert_eq!(render(&data), "干支: 年: 甲辰,\n日: 甲子,\n空亡: 戌亥");
    }

    #[test]
    fn scalars_use_natural_text() {
        assert_eq!(render(&json!("plain")), "plain");
        assert_eq!(render(&json!(1.5)), "1.5");
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&Value::Null), "null");
    }

    #[test]
    fn separators_inside_values_are_not_escaped() {
        assert_eq!(render(&json!({"k": "a,\nb"})), "k: a,\nb");
    }
}
