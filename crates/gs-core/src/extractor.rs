//! Field Extractor
//!
//! Sends the order text to a completion API with a fixed instruction and
//! parses the line-prefixed answer into an [`OrderRecord`]:
//!
//! ```text
//! name: Jiho
//! item: 2 Americano
//! notes: extra hot
//! type: 3
//! ```
//!
//! `name:` and `item:` are required. A reply missing either is a parse
//! failure; nothing is printed from a partially filled record.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::llm::LlmClient;
use crate::menu::MenuReference;
use crate::order::{MAX_TYPE_NUMBER, OrderRecord};

const SYSTEM_PROMPT: &str = "\
You extract order details from a kiosk chat transcript.
Reply with exactly these lines and nothing else:
name: <customer name>
item: <ordered item or selection>
notes: <anything else worth printing, or leave empty>
type: <persona type number from the reference table, or leave empty>
Do not add explanations or formatting.";

/// Turns order text into an [`OrderRecord`]
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(&self, order_text: &str) -> Result<OrderRecord>;
}

/// [`FieldExtractor`] backed by an LLM completion API
pub struct LlmFieldExtractor {
    client: LlmClient,
    menu: Option<MenuReference>,
}

impl LlmFieldExtractor {
    pub fn new(client: LlmClient) -> Self {
        Self { client, menu: None }
    }

    /// Include a persona reference table in every prompt
    pub fn with_menu(mut self, menu: MenuReference) -> Self {
        self.menu = Some(menu);
        self
    }

    fn build_prompt(&self, order_text: &str) -> String {
        match &self.menu {
            Some(menu) if !menu.is_empty() => format!(
                "Reference table (number | name | description | drink | food | keywords):\n{}\n\nConversation:\n{}",
                menu.to_prompt_table(),
                order_text
            ),
            _ => format!("Conversation:\n{}", order_text),
        }
    }
}

#[async_trait]
impl FieldExtractor for LlmFieldExtractor {
    async fn extract(&self, order_text: &str) -> Result<OrderRecord> {
        let prompt = self.build_prompt(order_text);

        debug!(
            "Requesting field extraction ({} chars, model {})",
            order_text.len(),
            self.client.model()
        );

        let response = self.client.complete(SYSTEM_PROMPT, &prompt).await?;
        parse_order_response(&response)
    }
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. ```text) on the opening line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.rsplit_once("```")
        .map(|(inner, _)| inner)
        .unwrap_or(body)
        .trim()
}

/// Parse the extractor's line-prefixed reply
pub fn parse_order_response(response: &str) -> Result<OrderRecord> {
    let body = strip_code_fence(response);

    let mut name = None;
    let mut item = None;
    let mut notes = None;
    let mut type_number = None;

    for line in body.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_start_matches(['-', '*']).trim().to_lowercase();
        let value = value.trim().to_string();

        match key.as_str() {
            "name" if name.is_none() => name = Some(value),
            "item" if item.is_none() => item = Some(value),
            "notes" if notes.is_none() => notes = Some(value),
            "type" if type_number.is_none() => {
                if value.is_empty() {
                    continue;
                }
                match value.parse::<u8>() {
                    Ok(n) if (1..=MAX_TYPE_NUMBER).contains(&n) => type_number = Some(n),
                    _ => warn!("Ignoring invalid type value: {:?}", value),
                }
            }
            _ => {}
        }
    }

    let name = name
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Parse("missing \"name:\" field".to_string()))?;
    let item = item
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Parse("missing \"item:\" field".to_string()))?;

    let record = OrderRecord {
        name,
        item,
        notes: notes.unwrap_or_default(),
        type_number,
    };
    record.validate()?;

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, LlmProvider};
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_full_response() {
        let record =
            parse_order_response("name: Jiho\nitem: 2 Americano\nnotes: extra hot\ntype: 3").unwrap();

        assert_eq!(record.name, "Jiho");
        assert_eq!(record.item, "2 Americano");
        assert_eq!(record.notes, "extra hot");
        assert_eq!(record.type_number, Some(3));
    }

    #[test]
    fn test_parse_keys_are_case_insensitive_and_notes_optional() {
        let record = parse_order_response("Name: 지수\nITEM: 네그로니").unwrap();
        assert_eq!(record.name, "지수");
        assert_eq!(record.item, "네그로니");
        assert!(record.notes.is_empty());
        assert!(record.type_number.is_none());
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let record = parse_order_response("```text\nname: Mina\nitem: latte\n```").unwrap();
        assert_eq!(record.name, "Mina");
        assert_eq!(record.item, "latte");
    }

    #[test]
    fn test_parse_ignores_chatter_and_bullets() {
        let response = "Sure, here you go:\n- name: Joon\n- item: mocha: large\nThanks!";
        let record = parse_order_response(response).unwrap();
        assert_eq!(record.name, "Joon");
        assert_eq!(record.item, "mocha: large");
    }

    #[test]
    fn test_parse_missing_name_is_parse_error() {
        let err = parse_order_response("item: 2 Americano\nnotes: none").unwrap_err();
        assert!(matches!(err, Error::Parse(msg) if msg.contains("name:")));
    }

    #[test]
    fn test_parse_empty_item_is_parse_error() {
        assert!(matches!(
            parse_order_response("name: Jiho\nitem:   "),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_parse_invalid_type_is_ignored() {
        let record = parse_order_response("name: Jiho\nitem: tea\ntype: ninety").unwrap();
        assert!(record.type_number.is_none());

        let record = parse_order_response("name: Jiho\nitem: tea\ntype: 99").unwrap();
        assert!(record.type_number.is_none());
    }

    #[test]
    fn test_prompt_includes_menu_table() {
        let client = LlmClient::new(&LlmConfig::default()).unwrap();
        let menu = MenuReference::new(vec![crate::menu::PersonaType {
            number: 1,
            name: "Bold Creator".to_string(),
            description: String::new(),
            drink: "Negroni".to_string(),
            food: String::new(),
            keywords: String::new(),
        }]);

        let extractor = LlmFieldExtractor::new(client).with_menu(menu);
        let prompt = extractor.build_prompt("Negroni for 지수");
        assert!(prompt.contains("1 | Bold Creator"));
        assert!(prompt.ends_with("Negroni for 지수"));
    }

    #[tokio::test]
    async fn test_extract_through_llm() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"text": "name: Jiho\nitem: 2 Americano\nnotes:\ntype:"}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = LlmConfig {
            api_key: "k".to_string(),
            provider: LlmProvider::Gemini,
            ..Default::default()
        };
        let client = LlmClient::with_base_url(&config, server.uri()).unwrap();
        let extractor = LlmFieldExtractor::new(client);

        let record = extractor
            .extract("customer wants 2 Americano for Jiho")
            .await
            .unwrap();
        assert_eq!(record, OrderRecord::new("Jiho", "2 Americano"));
    }

    #[tokio::test]
    async fn test_extract_api_failure_is_not_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = LlmConfig {
            api_key: "k".to_string(),
            ..Default::default()
        };
        let client = LlmClient::with_base_url(&config, server.uri()).unwrap();
        let err = LlmFieldExtractor::new(client).extract("x").await.unwrap_err();
        assert!(matches!(err, Error::LlmApi(_)));
    }
}
