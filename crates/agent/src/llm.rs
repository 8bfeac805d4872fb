use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use papyra_core::config::LlmConfig;
use papyra_core::domain::chat::{ChatRole, Message};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm api key is not configured")]
    MissingApiKey,
    #[error("llm transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("llm api returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("llm returned an empty or unusable response")]
    EmptyResponse,
}

/// Declared function tool offered to the model alongside the conversation.
#[derive(Clone, Debug, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSpec {
    /// The order lookup declaration: one required string argument carrying
    /// the customer's CPF/CNPJ.
    pub fn check_order_status() -> Self {
        Self {
            name: crate::tools::ORDER_STATUS_TOOL_NAME.to_string(),
            description: "Fetches order history and current status based on the \
                 customer's CPF or CNPJ."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "document": {
                        "type": "string",
                        "description": "The CPF or CNPJ number the customer provided for identification."
                    }
                },
                "required": ["document"]
            }),
        }
    }
}

/// One dialogue turn in model terms. System notices never become context;
/// they are transcript-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextMessage {
    pub role: ContextRole,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextRole {
    User,
    Model,
}

impl ContextRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl ContextMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ContextRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ContextRole::Model, text: text.into() }
    }

    pub fn from_transcript(message: &Message) -> Option<Self> {
        match message.role {
            ChatRole::Customer => Some(Self::user(message.text.clone())),
            ChatRole::Agent => Some(Self::model(message.text.clone())),
            ChatRole::System => None,
        }
    }
}

/// What the model decided to do with a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelTurn {
    Reply(String),
    ToolCall { name: String, arguments: Value },
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        context: &[ContextMessage],
        tool: Option<&ToolSpec>,
    ) -> Result<ModelTurn, LlmError>;

    /// Second call of a tool turn: the executed tool result goes back to the
    /// model, which composes the customer-facing reply.
    async fn continue_with_tool_result(
        &self,
        system_instruction: &str,
        context: &[ContextMessage],
        tool_name: &str,
        tool_result: &Value,
    ) -> Result<String, LlmError>;
}

pub struct GeminiModel {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiModel {
    pub fn new(
        client: reqwest::Client,
        api_key: SecretString,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self::new(client, api_key, config.base_url.clone(), config.model.clone()))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            self.api_key.expose_secret()
        )
    }

    async fn post(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse, LlmError> {
        debug!(model = %self.model, "calling generateContent");
        let response = self.client.post(self.endpoint()).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    async fn generate(
        &self,
        system_instruction: &str,
        context: &[ContextMessage],
        tool: Option<&ToolSpec>,
    ) -> Result<ModelTurn, LlmError> {
        let request = GenerateContentRequest::new(system_instruction, context, tool);
        let response = self.post(&request).await?;
        parse_model_turn(response)
    }

    async fn continue_with_tool_result(
        &self,
        system_instruction: &str,
        context: &[ContextMessage],
        tool_name: &str,
        tool_result: &Value,
    ) -> Result<String, LlmError> {
        let mut request = GenerateContentRequest::new(system_instruction, context, None);
        request.contents.push(Content {
            role: "model".to_string(),
            parts: vec![Part {
                text: None,
                function_call: Some(FunctionCall {
                    name: tool_name.to_string(),
                    args: Value::Object(Default::default()),
                }),
                function_response: None,
            }],
        });
        request.contents.push(Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: None,
                function_call: None,
                function_response: Some(FunctionResponse {
                    name: tool_name.to_string(),
                    response: json!({ "result": tool_result }),
                }),
            }],
        });

        let response = self.post(&request).await?;
        match parse_model_turn(response)? {
            ModelTurn::Reply(text) => Ok(text),
            // A second tool request in the same turn is not part of the
            // protocol; treat it as an unusable response.
            ModelTurn::ToolCall { .. } => Err(LlmError::EmptyResponse),
        }
    }
}

fn parse_model_turn(response: GenerateContentResponse) -> Result<ModelTurn, LlmError> {
    let candidate = response.candidates.into_iter().next().ok_or(LlmError::EmptyResponse)?;

    for part in &candidate.content.parts {
        if let Some(call) = &part.function_call {
            return Ok(ModelTurn::ToolCall { name: call.name.clone(), arguments: call.args.clone() });
        }
    }

    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    Ok(ModelTurn::Reply(text))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: SystemInstruction,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDeclarations>>,
}

impl GenerateContentRequest {
    fn new(
        system_instruction: &str,
        context: &[ContextMessage],
        tool: Option<&ToolSpec>,
    ) -> Self {
        Self {
            system_instruction: SystemInstruction {
                parts: vec![TextPart { text: system_instruction.to_string() }],
            },
            contents: context
                .iter()
                .map(|message| Content {
                    role: message.role.as_str().to_string(),
                    parts: vec![Part {
                        text: Some(message.text.clone()),
                        function_call: None,
                        function_response: None,
                    }],
                })
                .collect(),
            tools: tool.map(|spec| {
                vec![ToolDeclarations { function_declarations: vec![spec.clone()] }]
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations {
    function_declarations: Vec<ToolSpec>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize, Serialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
