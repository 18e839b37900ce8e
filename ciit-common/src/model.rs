//! Data model for the interview catalog and session records
//!
//! Everything here serializes camelCase so the YAML catalog files and JSON
//! session files written by earlier tooling round-trip unchanged. Optional
//! fields are omitted from output when absent rather than written as null.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interview topic offered during topic selection.
///
/// Read-only from the client's perspective; topics change only by editing
/// the backing `topics.yaml` by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

/// Investment barrier offered on the barriers path of the interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Barrier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub color: String,
}

/// One titled detail block on a concept card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDetail {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// How a concept addresses one barrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarrierSolution {
    pub barrier_id: String,
    #[serde(default)]
    pub explanation: String,
}

/// Investment concept, one YAML file per record in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Concept {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub category: String,
    pub layer: String,
    /// Image filename under the images folder, empty when none uploaded.
    pub image: String,
    /// Ordered topic ids. Duplicates are not prevented.
    pub topics: Vec<String>,
    pub details: Vec<ConceptDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barrier_solutions: Option<Vec<BarrierSolution>>,
}

/// A participant's rating/notes/modifications for one concept.
///
/// Not versioned: each save fully replaces the prior entry for that concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptFeedback {
    /// 1-5 stars, 0 meaning "not rated".
    pub rating: u8,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub modifications: String,
    /// Last edit time.
    pub timestamp: DateTime<Utc>,
}

/// Free-form idea captured during a session. Append-only: existing ideas are
/// never edited or removed from the persisted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_concept_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One participant's full interview record, one JSON file per session.
///
/// The whole struct is defaultable so a partial create payload (down to `{}`)
/// deserializes; the session store assigns `id` and `startTime` when absent.
/// `id` is immutable after creation - the store forces it from the path
/// parameter on every write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Session {
    pub id: String,
    pub participant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_name: Option<String>,
    pub participant_role: String,
    pub organization_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_source: Option<String>,
    pub consent_given: bool,
    /// Assigned by the store on create; always present on persisted records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// Presence of an end time means the session completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Gates which downstream path was shown (topics vs. barriers).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_invested_in_climate: Option<bool>,
    pub selected_topics: Vec<String>,
    pub custom_topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_barriers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_barriers: Option<Vec<String>>,
    /// At most one feedback entry per concept, overwritten on re-save.
    /// Keys may reference concepts no longer in the catalog; dangling ids are
    /// tolerated here and filtered out at projection time.
    pub concept_feedback: BTreeMap<String, ConceptFeedback>,
    pub new_ideas: Vec<Idea>,
    pub notes: String,
}

impl Session {
    /// A session is completed once an end time has been stamped.
    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_deserializes_from_empty_object() {
        let session: Session = serde_json::from_str("{}").unwrap();
        assert!(session.id.is_empty());
        assert!(session.start_time.is_none());
        assert!(session.concept_feedback.is_empty());
    }

    #[test]
    fn session_serializes_camel_case() {
        let mut session = Session {
            id: "session-1".into(),
            participant_id: "p-01".into(),
            start_time: Some(Utc::now()),
            ..Default::default()
        };
        session.custom_topics.push("geothermal".into());

        let value = serde_json::to_value(&session).unwrap();
        assert!(value.get("participantId").is_some());
        assert!(value.get("startTime").is_some());
        assert!(value.get("customTopics").is_some());
        // Absent optionals are omitted, not null
        assert!(value.get("endTime").is_none());
        assert!(value.get("participantName").is_none());
    }

    #[test]
    fn session_round_trips() {
        let mut session = Session {
            id: "session-42".into(),
            participant_id: "p-42".into(),
            participant_role: "Asset manager".into(),
            organization_type: "Pension fund".into(),
            consent_given: true,
            start_time: Some("2025-03-01T10:00:00Z".parse().unwrap()),
            has_invested_in_climate: Some(false),
            selected_barriers: Some(vec!["liquidity".into()]),
            notes: "spoke quickly".into(),
            ..Default::default()
        };
        session.concept_feedback.insert(
            "acme-fund".into(),
            ConceptFeedback {
                rating: 4,
                notes: "liked the structure".into(),
                modifications: String::new(),
                timestamp: "2025-03-01T10:20:00Z".parse().unwrap(),
            },
        );

        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn concept_accepts_minimal_yaml() {
        let concept: Concept = serde_yaml::from_str("id: acme-fund\nname: Acme Fund\n").unwrap();
        assert_eq!(concept.id, "acme-fund");
        assert!(concept.topics.is_empty());
        assert!(concept.barrier_solutions.is_none());
    }
}
