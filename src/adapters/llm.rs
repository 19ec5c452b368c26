use crate::domain::model::Extraction;
use crate::domain::ports::{ConfigProvider, Extractor};
use crate::utils::error::{Result, SplitError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

pub const EXTRACTION_PROMPT: &str = r#"You turn a short description of a shared bill into JSON.

The description names people and what they paid for, and says who shared each item. An item may have a name or may only be a price (for example "$15"). The total may or may not be given.

Reply with JSON of the shape { "names": string[], "total"?: number, "items": [{ "itemName"?: string, "cost": number, "names": string[] }] }. Every name used in an item must also appear in "names". If the text is not about a bill, or you cannot tell, reply with {}.

Example input:
the total was $105. jack and jill split $20. jill ordered $25 salmon for herself. jack ordered two drinks for $30.
Example output:
{ "names": ["jack", "jill"], "total": 105, "items": [{ "cost": 20, "names": ["jack", "jill"] }, { "itemName": "salmon", "cost": 25, "names": ["jill"] }, { "itemName": "two drinks", "cost": 30, "names": ["jack"] }] }

Example input:
eric and kelsey split $35. eric and derek split $20. derek and raji split $10. raji ordered tuna for $20.
Example output:
{ "names": ["eric", "kelsey", "derek", "raji"], "items": [{ "cost": 35, "names": ["eric", "kelsey"] }, { "cost": 20, "names": ["eric", "derek"] }, { "cost": 10, "names": ["derek", "raji"] }, { "itemName": "tuna", "cost": 20, "names": ["raji"] }] }

Example input:
kelsey and eric split 15, taia and kelsey split 10, total was 500, derek and raji and eric split 40. oh wait, part of that 40 was also split with taia
Example output:
{ "names": ["kelsey", "eric", "taia", "derek", "raji"], "total": 500, "items": [{ "cost": 15, "names": ["kelsey", "eric"] }, { "cost": 10, "names": ["taia", "kelsey"] }, { "cost": 40, "names": ["derek", "raji", "eric", "taia"] }] }

Example input:
person 1 got the ball for $10. person 3 got super free for $6. person 2 got the $5. total was 55
Example output:
{ "names": ["person 1", "person 3", "person 2"], "total": 55, "items": [{ "cost": 10, "names": ["person 1"] }, { "itemName": "super free", "cost": 6, "names": ["person 3"] }, { "cost": 5, "names": ["person 2"] }] }

Example input:
hey there friends, what's going on!
Example output:
{}"#;

/// Client for any OpenAI-compatible `/chat/completions` endpoint that
/// supports `response_format: json_object` (Groq, OpenAI, local gateways).
pub struct ChatCompletionsExtractor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionsExtractor {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(
            config.extractor_endpoint(),
            config.model(),
            config.api_key().map(str::to_string),
            Duration::from_secs(config.timeout_seconds()),
        )
    }
}

#[async_trait]
impl Extractor for ChatCompletionsExtractor {
    async fn extract(&self, text: &str) -> Result<Extraction> {
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": EXTRACTION_PROMPT },
                { "role": "user", "content": text }
            ],
            "response_format": { "type": "json_object" }
        });

        tracing::debug!("Sending extraction request to: {}", self.endpoint);
        let mut request = self.client.post(&self.endpoint).json(&request_body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Extraction response status: {}", status);

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SplitError::ExtractionError {
                status: status.as_u16(),
                message,
            });
        }

        let response_json: Value = response.json().await?;
        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        if content.is_empty() {
            tracing::warn!("Extraction response carried no message content");
        }

        Ok(Extraction {
            input: text.to_string(),
            output: content.to_string(),
            model: self.model.clone(),
            latency_ms: request_start.elapsed().as_millis() as u64,
            created_at: chrono::Utc::now(),
        })
    }
}

/// Treats the input as an already extracted JSON document.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonPassthrough;

pub const PASSTHROUGH_MODEL: &str = "passthrough";

#[async_trait]
impl Extractor for JsonPassthrough {
    async fn extract(&self, text: &str) -> Result<Extraction> {
        Ok(Extraction {
            input: text.to_string(),
            output: text.to_string(),
            model: PASSTHROUGH_MODEL.to_string(),
            latency_ms: 0,
            created_at: chrono::Utc::now(),
        })
    }
}
