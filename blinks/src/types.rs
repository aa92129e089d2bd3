//! Solana Actions request/response payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Action,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionError {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionGetResponse {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<ActionLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionGetResponse {
    pub fn new(icon: &str, title: &str, description: &str, label: &str) -> Self {
        Self {
            action_type: ActionType::Action,
            icon: icon.into(),
            title: title.into(),
            description: description.into(),
            label: label.into(),
            disabled: None,
            links: None,
            error: None,
        }
    }

    /// Terminal card shown after a chained action finishes.
    pub fn completed(icon: &str, title: &str, description: &str) -> Self {
        Self {
            action_type: ActionType::Completed,
            ..Self::new(icon, title, description, "Done")
        }
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.disabled = Some(true);
        self.error = Some(ActionError {
            message: message.into(),
        });
        self
    }

    pub fn with_links(mut self, actions: Vec<LinkedAction>) -> Self {
        self.links = Some(ActionLinks { actions });
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLinks {
    pub actions: Vec<LinkedAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedAction {
    pub href: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ActionParameter>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionParameter {
    #[serde(rename = "type")]
    pub param_type: String,
    pub name: String,
    pub label: String,
    pub required: bool,
}

impl ActionParameter {
    pub fn text(name: &str, label: &str, required: bool) -> Self {
        Self {
            param_type: "text".into(),
            name: name.into(),
            label: label.into(),
            required,
        }
    }
}

/// Body of every action POST.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionPostRequest {
    pub account: String,
}

/// Body of a chained `next` POST, sent once the wallet confirmed the transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NextActionPostRequest {
    pub account: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPostResponse {
    pub transaction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<PostResponseLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponseLinks {
    pub next: NextActionLink,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NextActionLink {
    Post { href: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRule {
    #[serde(rename = "pathPattern")]
    pub path_pattern: String,
    #[serde(rename = "apiPath")]
    pub api_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionsJson {
    pub rules: Vec<ActionRule>,
}
