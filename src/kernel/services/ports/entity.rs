use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stable identity of a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

/// Entity identifiers in source order, newest first.
pub type EntitySnapshot = Arc<[EntityId]>;

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Notice,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Notice => "notice",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub id: EntityId,
    pub level: LogLevel,
    #[serde(default)]
    pub label: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTask {
    pub id: EntityId,
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub request_headers: Vec<(String, String)>,
    #[serde(default)]
    pub response_headers: Vec<(String, String)>,
    #[serde(default)]
    pub request_body: Option<Vec<u8>>,
    #[serde(default)]
    pub response_body: Option<Vec<u8>>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl NetworkTask {
    /// Host component of the URL, without port or credentials.
    pub fn host(&self) -> Option<&str> {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        let authority = rest.split(['/', '?', '#']).next()?;
        let authority = authority.rsplit('@').next()?;
        let host = match authority.strip_prefix('[') {
            Some(v6) => v6.split(']').next()?,
            None => authority.split(':').next()?,
        };
        (!host.is_empty()).then_some(host)
    }

    pub fn path(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        let rest = rest.split(['?', '#']).next().unwrap_or("");
        match rest.find('/') {
            Some(pos) => &rest[pos..],
            None => "",
        }
    }

    pub fn query(&self) -> &str {
        let Some((_, query)) = self.url.split_once('?') else {
            return "";
        };
        query.split('#').next().unwrap_or("")
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some() || self.status_code.is_some_and(|code| code >= 400)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Message(LogMessage),
    Task(NetworkTask),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Message(message) => message.id,
            Entity::Task(task) => task.id,
        }
    }
}

/// Read side of the persistent store the search runs against.
pub trait EntityStore: Send + Sync {
    /// Resolves an identifier; `None` when the entity was deleted.
    fn entity(&self, id: EntityId) -> Option<Arc<Entity>>;

    /// Known hosts, most frequent first.
    fn hosts(&self) -> Vec<String>;
}
