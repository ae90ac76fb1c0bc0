//! Semantic model of an extracted clinical case.
//!
//! Mirrors the JSON contract of the upstream LLM extraction step. Every field
//! is optional on the wire: the producer is an LLM and its output is treated
//! as untrusted, so absence always degrades to empty strings/lists rather
//! than a deserialization error.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseReport {
    #[serde(default)]
    pub cover: Cover,
    #[serde(default)]
    pub baseline: Baseline,
    #[serde(default)]
    pub treatments: Vec<TreatmentPhase>,
    #[serde(default)]
    pub current_admission: Option<CurrentAdmission>,
    #[serde(default)]
    pub timeline_events: Vec<TimelineEvent>,
    #[serde(default)]
    pub summary: CaseSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cover {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Baseline {
    #[serde(default)]
    pub patient_info: String,
    #[serde(default)]
    pub chief_complaint: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub key_exams: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreatmentPhase {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub regimen: String,
    #[serde(default)]
    pub imaging: String,
    #[serde(default)]
    pub markers: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentAdmission {
    #[serde(default, deserialize_with = "string_or_list")]
    pub exams: Vec<String>,
    #[serde(default)]
    pub imaging: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub plan: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseSummary {
    pub highlights: Vec<String>,
    pub discussion: Vec<String>,
}

/// One clinical milestone on the treatment timeline.
///
/// `date` is an opaque display string (typically year-month); the model never
/// parses it. Events are expected in chronological order as supplied by the
/// extraction step; nothing downstream re-sorts them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default, rename = "event_type", alias = "category")]
    pub category: EventCategory,
    #[serde(default, rename = "event", alias = "description")]
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventCategory {
    #[default]
    Treatment,
    Evaluation,
}

impl Serialize for EventCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Treatment => serializer.serialize_str("Treatment"),
            Self::Evaluation => serializer.serialize_str("Evaluation"),
        }
    }
}

impl<'de> Deserialize<'de> for EventCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Anything the LLM emits that is not recognizably an evaluation is a
        // treatment; unknown labels must not fail the whole report.
        let s = String::deserialize(deserializer)?;
        if s.trim().eq_ignore_ascii_case("evaluation") {
            Ok(Self::Evaluation)
        } else {
            Ok(Self::Treatment)
        }
    }
}

impl<'de> Deserialize<'de> for CaseSummary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Older extraction prompts returned `summary` as a bare list of
        // bullet points; the current shape is {highlights, discussion}.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Legacy(Vec<String>),
            Current {
                #[serde(default)]
                highlights: Vec<String>,
                #[serde(default)]
                discussion: Vec<String>,
            },
        }
        match Wire::deserialize(deserializer)? {
            Wire::Legacy(highlights) => Ok(Self {
                highlights,
                discussion: Vec::new(),
            }),
            Wire::Current {
                highlights,
                discussion,
            } => Ok(Self {
                highlights,
                discussion,
            }),
        }
    }
}

fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        One(String),
        Many(Vec<String>),
    }
    match Wire::deserialize(deserializer)? {
        Wire::One(s) => Ok(vec![s]),
        Wire::Many(v) => Ok(v),
    }
}

const SURGERY_MARKERS: &[&str] = &["根治术", "切除术", "手术切除"];
const ADJUVANT_MARKER: &str = "辅助";

impl CaseReport {
    /// Rewrites adjuvant phase labels to first-line labels for non-surgical
    /// patients.
    ///
    /// The upstream extraction occasionally labels an initial systemic phase
    /// as "adjuvant" even when the narrative records no resection; without a
    /// surgery there is nothing to be adjuvant to, so those labels become
    /// first-line. Surgery detection scans the whole serialized report, same
    /// as the reference pipeline.
    pub fn normalize_phases(&mut self) {
        let full_text = serde_json::to_string(self).unwrap_or_default();
        if SURGERY_MARKERS.iter().any(|m| full_text.contains(m)) {
            return;
        }
        for tx in &mut self.treatments {
            if tx.phase.contains(ADJUVANT_MARKER) {
                tx.phase = "一线治疗".to_string();
            }
        }
        for evt in &mut self.timeline_events {
            let adjuvant = evt
                .phase
                .as_deref()
                .is_some_and(|p| p.contains(ADJUVANT_MARKER));
            if adjuvant {
                evt.phase = Some("一线".to_string());
            }
        }
    }
}
