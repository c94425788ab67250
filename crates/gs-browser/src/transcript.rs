//! Chat transcript extraction and chat-input commands

use gs_core::{OperatorCommand, TranscriptSource};
use serde_json::Value;
use tracing::info;

use crate::error::BrowserError;
use crate::session::BrowserSession;

/// Collects the visible text of chat message elements, one per line
pub const TRANSCRIPT_SCRIPT: &str = r#"
(() => {
    const selectors = [
        '.model-response-text',
        '.response-container-content',
        '.presented-response-container',
        '[class*="message-content"]',
        '.message-text',
        '.response-text',
        '.markdown-container',
        'message-content'
    ];
    const found = [];
    for (const selector of selectors) {
        for (const el of document.querySelectorAll(selector)) {
            if (!found.includes(el)) found.push(el);
        }
    }
    // Nested matches would repeat text; keep outermost, in document order
    const roots = found.filter(el => !found.some(other => other !== el && other.contains(el)));
    roots.sort((a, b) =>
        a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1);
    return roots
        .map(el => (el.innerText || el.textContent || '').trim())
        .filter(text => text.length > 0)
        .join('\n');
})()
"#;

/// Clears the chat input and returns its text when it is one of `words`
const COMMAND_SCRIPT: &str = r#"
(() => {
    const words = {{WORDS}};
    const selectors = [
        'rich-textarea textarea',
        '.ql-editor',
        'textarea[placeholder]',
        '[contenteditable="true"]',
        'textarea',
        'input[type="text"]'
    ];
    for (const selector of selectors) {
        for (const el of document.querySelectorAll(selector)) {
            const text = (el.value !== undefined ? el.value : el.textContent) || '';
            if (words.includes(text.trim())) {
                if (el.value !== undefined) el.value = '';
                else el.textContent = '';
                return text.trim();
            }
        }
    }
    return null;
})()
"#;

/// Command check script with the command words filled in
pub fn command_script() -> String {
    let words = Value::Array(
        OperatorCommand::ALL
            .iter()
            .map(|command| Value::String(command.word().to_string()))
            .collect(),
    );
    COMMAND_SCRIPT.replace("{{WORDS}}", &words.to_string())
}

impl TranscriptSource for BrowserSession {
    fn snapshot(&self) -> gs_core::Result<String> {
        match self.evaluate_js(TRANSCRIPT_SCRIPT)? {
            Value::String(text) => Ok(text),
            Value::Null => Ok(String::new()),
            other => Err(BrowserError::Extraction(format!(
                "Unexpected transcript value: {}",
                other
            ))
            .into()),
        }
    }

    fn take_command(&self) -> gs_core::Result<Option<OperatorCommand>> {
        let command = match self.evaluate_js(&command_script())? {
            Value::String(text) => OperatorCommand::parse(&text),
            _ => None,
        };

        if let Some(command) = command {
            info!("Operator command from chat input: {}", command);
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_an_expression() {
        let script = TRANSCRIPT_SCRIPT.trim();
        assert!(script.starts_with("(() =>"));
        assert!(script.ends_with("})()"));
        assert!(script.contains("'.model-response-text'"));
    }

    #[test]
    fn test_command_script_lists_every_word() {
        let script = command_script();
        assert!(!script.contains("{{WORDS}}"));
        assert!(script.contains(r#"["종료","출력테스트"]"#));
        assert!(script.trim().ends_with("})()"));
    }
}
