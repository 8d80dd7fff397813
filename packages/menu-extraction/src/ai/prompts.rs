//! Menu interpretation prompt and response parsing.

use crate::error::{ExtractionError, Result};
use crate::types::menu::MenuItem;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that processes menu data.";

/// Default guidelines appended after the field list.
pub const MENU_GUIDELINES: &str = r#"Additional guidelines:
1. Ignore every item after the words "À la carte at all times".
2. Ignore irrelevant or garbled text.
3. Only assign availability to days the text names. With no days named, leave "availability" empty.
4. Leave "allergies" and "tags" as empty lists when nothing is indicated.
5. Prices are plain numbers without currency symbols.
6. Never invent dishes that are not in the text.
7. A three-digit week number keeps only its first two digits.
8. Keep names to two or three words and move the rest into the description.
9. Always tag vegan and vegetarian dishes."#;

const MENU_FIELDS: &str = r#"Extract the lunch menu for the week from the text below as a JSON array of objects with these fields:
- "name": dish name
- "description": short description
- "price": price as a number
- "availability": weekdays the dish is served (e.g. ["Monday", "Tuesday"])
- "allergies": allergens such as "milk" or "gluten", when clearly indicated
- "tags": tags such as "Vegetarian", "Vegan", "Gluten-Free"
- "week": week number (34 for V34). Without one, use the ISO week of the first clear date in the text."#;

/// Build the user prompt for `text`. `instructions` replaces the default
/// guidelines when given.
pub fn format_menu_prompt(text: &str, instructions: Option<&str>) -> String {
    format!(
        "{}\n\n{}\n\nText:\n\"\"\"{}\"\"\"\n\nReturn only the JSON array, without code block markers. \
         Use English weekday names (Monday, Tuesday, ...) for availability.",
        MENU_FIELDS,
        instructions.unwrap_or(MENU_GUIDELINES),
        text
    )
}

/// Parse a service reply into menu items.
///
/// Code fences (with or without a `json` tag) are stripped first. Anything
/// that is not a JSON array of items is a `MalformedResponse`.
pub fn parse_menu_response(response: &str) -> Result<Vec<MenuItem>> {
    let mut body = response.trim();
    if let Some(inner) = body
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    {
        body = inner.trim();
        if let Some(rest) = body.strip_prefix("json") {
            body = rest.trim();
        }
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ExtractionError::MalformedResponse(format!("invalid JSON: {}", e)))?;
    if !value.is_array() {
        return Err(ExtractionError::MalformedResponse(
            "expected a JSON array".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ExtractionError::MalformedResponse(format!("unexpected item shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_response() {
        let reply = "```json\n[{\"name\":\"Köttbullar\",\"price\":115,\"week\":46,\"availability\":[\"Monday\"]}]\n```";
        let items = parse_menu_response(reply).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Köttbullar");
        assert_eq!(items[0].price, Some(115.0));
        assert_eq!(items[0].week.as_ref().and_then(|w| w.as_integer()), Some(46));
    }

    #[test]
    fn test_parse_plain_response() {
        let items = parse_menu_response(r#"[{"name":"Soppa"},{"name":"Sallad","tags":["Vegan"]}]"#)
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].tags, vec!["Vegan".to_string()]);
    }

    #[test]
    fn test_malformed_responses() {
        for reply in ["Here is the menu!", r#"{"name":"Soppa"}"#, r#"[{"price":10}]"#] {
            let err = parse_menu_response(reply).unwrap_err();
            assert!(matches!(err, ExtractionError::MalformedResponse(_)), "{}", reply);
        }
    }

    #[test]
    fn test_instructions_replace_guidelines() {
        let default = format_menu_prompt("Måndag: soppa", None);
        assert!(default.contains("Always tag vegan"));
        assert!(default.contains("\"\"\"Måndag: soppa\"\"\""));

        let custom = format_menu_prompt("Måndag: soppa", Some("Only list soups."));
        assert!(custom.contains("Only list soups."));
        assert!(!custom.contains("Always tag vegan"));
    }
}
