use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Summary {
    pub total_accounts_analyzed: u64,
    pub suspicious_accounts_flagged: u64,
    pub fraud_rings_detected: u64,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Centrality {
    pub degree: f64,
    pub betweenness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuspiciousAccount {
    pub account_id: NodeId,
    #[serde(default)]
    pub suspicion_score: f64,
    #[serde(default)]
    pub ring_id: Option<String>,
    #[serde(default)]
    pub detected_patterns: Vec<String>,
    #[serde(default)]
    pub centrality: Option<Centrality>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FraudRing {
    pub ring_id: String,
    #[serde(default)]
    pub pattern_type: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub member_accounts: Vec<NodeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(default)]
    pub suspicious: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub in_degree: u32,
    #[serde(default)]
    pub out_degree: u32,
    #[serde(default)]
    pub centrality_score: f64,
}

impl GraphNode {
    pub fn degree(&self) -> u32 {
        self.in_degree + self.out_degree
    }
}

/// A link's time as it arrived. Exports usually carry text; a JSON number
/// is taken as epoch millis, and anything else (null, bool, object) is
/// `Missing`. Never a reason to reject the whole result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    Text(String),
    Millis(i64),
    #[default]
    Missing,
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Self::Text(s),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .map_or(Self::Missing, Self::Millis),
            _ => Self::Missing,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Millis(ms) => write!(f, "{ms}"),
            Self::Missing => Ok(()),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphLink {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub amount: f64,
    // Parsing happens viewer-side and may fail.
    #[serde(default)]
    pub timestamp: Timestamp,
    #[serde(default)]
    pub is_ring: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphPayload {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisResult {
    pub summary: Summary,
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    #[serde(rename = "_graph")]
    pub graph: GraphPayload,
}

impl AnalysisResult {
    pub fn account(&self, id: &str) -> Option<&SuspiciousAccount> {
        self.suspicious_accounts
            .iter()
            .find(|a| a.account_id.as_str() == id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.graph.nodes.iter().find(|n| n.id.as_str() == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Msg {
    Hello { version: String },
    RequestResult,
    Result { result: Box<AnalysisResult> },
    Error { detail: String },
    Ping,
    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_parses_with_missing_fields() {
        let raw = r#"{
            "summary": {"total_accounts_analyzed": 3},
            "suspicious_accounts": [
                {"account_id": "A", "suspicion_score": 91.5, "ring_id": "RING_001",
                 "detected_patterns": ["cycle_length_3"],
                 "centrality": {"degree": 0.5, "betweenness": 0.2}}
            ],
            "fraud_rings": [
                {"ring_id": "RING_001", "pattern_type": "cycle_length_3",
                 "risk_score": 95.0, "member_accounts": ["A", "B", "C"]}
            ],
            "_graph": {
                "nodes": [{"id": "A", "suspicious": true, "score": 91.5}, {"id": "B"}],
                "links": [{"source": "A", "target": "B", "amount": 10.0,
                           "timestamp": "2024-01-01 10:00:00", "is_ring": true}]
            }
        }"#;

        let result: AnalysisResult = serde_json::from_str(raw).expect("parse");
        assert_eq!(result.summary.total_accounts_analyzed, 3);
        assert_eq!(result.graph.nodes.len(), 2);
        assert_eq!(result.node("B").map(|n| n.degree()), Some(0));
        assert!(result.graph.links[0].is_ring);
        assert_eq!(
            result.account("A").map(|a| a.detected_patterns.clone()),
            Some(vec!["cycle_length_3".to_string()])
        );
    }

    #[test]
    fn msg_uses_tagged_envelope() {
        let msg = Msg::Error {
            detail: "bad csv".to_string(),
        };
        let encoded = serde_json::to_string(&msg).expect("encode");
        assert_eq!(encoded, r#"{"type":"Error","data":{"detail":"bad csv"}}"#);
    }

    fn link_with(ts: &str) -> serde_json::Result<GraphLink> {
        serde_json::from_str(&format!(r#"{{"source": "A", "target": "B", "timestamp": {ts}}}"#))
    }

    #[test]
    fn odd_timestamps_never_reject_the_link() {
        assert_eq!(
            link_with(r#""2024-01-01T10:00:00""#).expect("text").timestamp,
            Timestamp::from("2024-01-01T10:00:00")
        );
        assert_eq!(
            link_with("1704067200000").expect("int").timestamp,
            Timestamp::Millis(1_704_067_200_000)
        );
        assert_eq!(
            link_with("1704067200000.7").expect("float").timestamp,
            Timestamp::Millis(1_704_067_200_000)
        );
        assert_eq!(link_with("null").expect("null").timestamp, Timestamp::Missing);
        assert_eq!(link_with("true").expect("bool").timestamp, Timestamp::Missing);
        assert_eq!(link_with("{}").expect("object").timestamp, Timestamp::Missing);

        let absent: GraphLink =
            serde_json::from_str(r#"{"source": "A", "target": "B"}"#).expect("absent");
        assert_eq!(absent.timestamp, Timestamp::Missing);
    }

    #[test]
    fn one_null_timestamp_keeps_the_result() {
        let raw = r#"{"_graph": {"nodes": [{"id": "A"}, {"id": "B"}],
            "links": [{"source": "A", "target": "B", "timestamp": null},
                      {"source": "B", "target": "A", "timestamp": 5}]}}"#;
        let result: AnalysisResult = serde_json::from_str(raw).expect("parse");
        assert_eq!(result.graph.links.len(), 2);
        assert_eq!(result.graph.links[1].timestamp, Timestamp::Millis(5));
    }

    #[test]
    fn timestamps_survive_the_feed_round_trip() {
        let links = vec![
            Timestamp::from("2024-01-01"),
            Timestamp::Millis(42),
            Timestamp::Missing,
        ];
        for ts in links {
            let encoded = serde_json::to_string(&ts).expect("encode");
            let back: Timestamp = serde_json::from_str(&encoded).expect("decode");
            assert_eq!(back, ts);
        }
    }
}
