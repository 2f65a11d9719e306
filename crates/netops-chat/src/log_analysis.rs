//! Log analysis
//!
//! Works on pre-aggregated device log events: each event type carries a total
//! count and per-device items. The model grades every event's severity and
//! explains a selected event on request.

use netops_core::{Error, Result, Turn};
use netops_llm::{ChatModel, ChatRequest, LlmResponse, ModelId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompt::{EXPLANATION_PROMPT, SEVERITY_PROMPT};

pub const DEFAULT_ANALYSIS_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Mid,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Mid => "mid",
            Severity::High => "high",
        }
    }

    /// Sort rank, most severe first
    fn rank(&self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Mid => 1,
            Severity::Low => 2,
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "mid" | "medium" => Ok(Severity::Mid),
            "high" => Ok(Severity::High),
            other => Err(Error::invalid_argument(format!("unknown severity '{}'", other))),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One device's share of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogItem {
    pub ip: String,
    pub count: u64,
    pub message: String,
}

/// An aggregated event type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event_type: String,
    pub count: u64,
    #[serde(default)]
    pub items: Vec<LogItem>,
    /// Set by assessment; `None` reads as `n/a`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

impl LogEvent {
    pub fn severity_label(&self) -> &'static str {
        self.severity.map(|s| s.as_str()).unwrap_or("n/a")
    }

    /// Distinct device IPs, sorted
    pub fn devices(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|i| i.ip.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn example(&self) -> &str {
        self.items
            .first()
            .map(|i| i.message.as_str())
            .unwrap_or("(no example)")
    }

    fn item_lines(&self) -> String {
        self.items
            .iter()
            .map(|i| format!("IP: {}, Count: {}, Message: {}", i.ip, i.count, i.message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Model input for severity grading
    pub fn severity_input(&self) -> String {
        format!(
            "Event Type: {}\nTotal Count: {}\nItems:\n{}",
            self.event_type,
            self.count,
            self.item_lines()
        )
    }

    /// Model input for an explanation
    pub fn explanation_input(&self) -> String {
        format!(
            "Event type: {}\nTotal count: {}\nDetails by device:\n{}",
            self.event_type,
            self.count,
            self.item_lines()
        )
    }

    /// Plain-text card shown in listings
    pub fn describe(&self, position: usize) -> String {
        format!(
            "N: {}\nEvent type: {}\nExample: {}\nDevices: {}\nCount: {}\nSeverity: {}",
            position,
            self.event_type,
            self.example(),
            self.devices().join(", "),
            self.count,
            self.severity_label()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Total count, highest first
    #[default]
    Frequency,
    /// High, mid, low, then unassessed
    Severity,
}

/// A loaded set of events plus whether severity has been assessed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogBook {
    pub events: Vec<LogEvent>,
    pub assessed: bool,
}

impl LogBook {
    pub fn new(events: Vec<LogEvent>) -> Self {
        let assessed = !events.is_empty() && events.iter().all(|e| e.severity.is_some());
        Self { events, assessed }
    }

    pub fn parse(json: &str) -> Result<Self> {
        let events: Vec<LogEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::not_found(format!("log file {} not found", path.display()))
            }
            _ => Error::Io(e),
        })?;
        let book = Self::parse(&raw)?;
        info!(path = %path.display(), events = book.len(), "Loaded log events");
        Ok(book)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Stable sort. Severity order requires a prior assessment.
    pub fn sort(&mut self, order: SortOrder) -> Result<()> {
        match order {
            SortOrder::Frequency => {
                self.events.sort_by(|a, b| b.count.cmp(&a.count));
            }
            SortOrder::Severity => {
                if !self.assessed {
                    return Err(Error::invalid_argument(
                        "First, perform a log severity assessment",
                    ));
                }
                self.events
                    .sort_by_key(|e| e.severity.map(|s| s.rank()).unwrap_or(u8::MAX));
            }
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        self.events
            .iter()
            .enumerate()
            .map(|(i, e)| e.describe(i + 1))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Only the grade is read; the model's restated message is ignored
#[derive(Debug, Deserialize)]
struct SeverityVerdict {
    severity: String,
}

/// Extract the severity from a model reply; code fences and surrounding prose are tolerated
pub fn parse_severity(reply: &str) -> Result<Severity> {
    let start = reply
        .find('{')
        .ok_or_else(|| Error::upstream("severity reply carries no JSON object"))?;
    let end = reply
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| Error::upstream("severity reply carries no JSON object"))?;
    let verdict: SeverityVerdict = serde_json::from_str(&reply[start..=end])
        .map_err(|e| Error::upstream(format!("invalid severity reply: {}", e)))?;
    verdict.severity.parse()
}

pub struct LogAnalyzer {
    model: Arc<dyn ChatModel>,
    model_id: ModelId,
    temperature: f32,
}

impl LogAnalyzer {
    pub fn new(model: Arc<dyn ChatModel>, model_id: ModelId) -> Self {
        Self {
            model,
            model_id,
            temperature: DEFAULT_ANALYSIS_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    async fn complete(&self, system: &str, input: String) -> Result<String> {
        let request = ChatRequest::new(self.model_id, vec![Turn::user(input)])
            .with_system(system)
            .with_temperature(self.temperature);
        match self.model.chat(&request).await? {
            LlmResponse::Content(text) => Ok(text),
            LlmResponse::ToolCalls(_) => Err(Error::upstream(
                "model answered with a tool call where text was expected",
            )),
        }
    }

    async fn grade(&self, event: &LogEvent) -> Result<Severity> {
        let reply = self.complete(SEVERITY_PROMPT, event.severity_input()).await?;
        parse_severity(&reply)
    }

    /// Grade every event; failures are recorded as `n/a` and do not stop the run.
    ///
    /// Returns the number of events graded successfully.
    pub async fn assess_severity(&self, book: &mut LogBook) -> usize {
        let mut graded = 0;
        for event in &mut book.events {
            match self.grade(event).await {
                Ok(severity) => {
                    debug!(event = %event.event_type, %severity, "Event graded");
                    event.severity = Some(severity);
                    graded += 1;
                }
                Err(e) => {
                    warn!(event = %event.event_type, error = %e, "Severity assessment failed");
                    event.severity = None;
                }
            }
        }
        book.assessed = true;
        info!(events = book.len(), graded, "Severity assessment finished");
        graded
    }

    /// Ask the model to explain one event
    pub async fn explain(&self, event: &LogEvent) -> Result<String> {
        self.complete(EXPLANATION_PROMPT, event.explanation_input())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netops_llm::ScriptedModel;

    const EVENTS: &str = r#"[
        {"event_type": "LINK-3-UPDOWN", "count": 12, "items": [
            {"ip": "192.168.1.10", "count": 8, "message": "Interface Gi0/1, changed state to down"},
            {"ip": "192.168.1.11", "count": 4, "message": "Interface Gi0/3, changed state to down"}
        ]},
        {"event_type": "SYS-5-CONFIG_I", "count": 3, "items": [
            {"ip": "192.168.1.10", "count": 3, "message": "Configured from console by admin"}
        ]},
        {"event_type": "SYS-3-CPUHOG", "count": 40, "items": [
            {"ip": "10.0.0.1", "count": 40, "message": "Task ran for 3000ms"}
        ]}
    ]"#;

    #[test]
    fn test_parse_severity_tolerates_fences() {
        let reply = "```json\n{\"message\": \"CPU hog\", \"severity\": \"high\"}\n```";
        assert_eq!(parse_severity(reply).unwrap(), Severity::High);
        assert_eq!(
            parse_severity(r#"{"message":"x","severity":"Mid"}"#).unwrap(),
            Severity::Mid
        );
        assert_eq!(parse_severity(r#"{"severity":"low"}"#).unwrap(), Severity::Low);
        assert!(parse_severity("high").is_err());
        assert!(parse_severity(r#"{"severity":"critical"}"#).is_err());
    }

    #[test]
    fn test_frequency_sort() {
        let mut book = LogBook::parse(EVENTS).unwrap();
        assert!(!book.assessed);
        book.sort(SortOrder::Frequency).unwrap();
        let order: Vec<_> = book.events.iter().map(|e| e.count).collect();
        assert_eq!(order, vec![40, 12, 3]);
    }

    #[test]
    fn test_severity_sort_requires_assessment() {
        let mut book = LogBook::parse(EVENTS).unwrap();
        let err = book.sort(SortOrder::Severity).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: First, perform a log severity assessment");
    }

    #[test]
    fn test_describe_card() {
        let book = LogBook::parse(EVENTS).unwrap();
        let card = book.events[0].describe(1);
        assert!(card.contains("Devices: 192.168.1.10, 192.168.1.11"));
        assert!(card.contains("Severity: n/a"));
        assert!(card.contains("Example: Interface Gi0/1, changed state to down"));
    }

    #[tokio::test]
    async fn test_assess_then_sort_by_severity() {
        let model = Arc::new(
            ScriptedModel::new()
                .then_content(r#"{"message": "links flapping", "severity": "mid"}"#)
                .then_error("rate limited")
                .then_content("```json\n{\"message\": \"cpu\", \"severity\": \"high\"}\n```"),
        );
        let analyzer = LogAnalyzer::new(model.clone(), ModelId::default());
        let mut book = LogBook::parse(EVENTS).unwrap();

        assert_eq!(analyzer.assess_severity(&mut book).await, 2);
        assert_eq!(book.events[1].severity_label(), "n/a");

        book.sort(SortOrder::Severity).unwrap();
        let order: Vec<_> = book.events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(order, vec!["SYS-3-CPUHOG", "LINK-3-UPDOWN", "SYS-5-CONFIG_I"]);

        let requests = model.requests().await;
        assert_eq!(requests[0].temperature, DEFAULT_ANALYSIS_TEMPERATURE);
        assert!(requests[0].tools.is_empty());
        assert!(requests[0].turns[0].text().starts_with("Event Type: LINK-3-UPDOWN"));
    }

    #[tokio::test]
    async fn test_explain_sends_all_items() {
        let model = Arc::new(ScriptedModel::new().then_content("Links went down."));
        let analyzer = LogAnalyzer::new(model.clone(), ModelId::Gpt4o);
        let book = LogBook::parse(EVENTS).unwrap();

        let answer = analyzer.explain(&book.events[0]).await.unwrap();
        assert_eq!(answer, "Links went down.");

        let request = &model.requests().await[0];
        assert_eq!(request.system.as_deref(), Some(EXPLANATION_PROMPT));
        let input = request.turns[0].text();
        assert!(input.contains("IP: 192.168.1.10, Count: 8"));
        assert!(input.contains("IP: 192.168.1.11, Count: 4"));
    }
}
