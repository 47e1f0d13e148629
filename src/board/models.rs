use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline stage an opportunity occupies. Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStage {
    LeadsInterest,
    ProspectQuote,
    ProspectAppSigned,
    ProspectUnderwriting,
    ClientWonInForce,
    LostLost,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeadsInterest => "LEADS_INTEREST",
            Self::ProspectQuote => "PROSPECT_QUOTE",
            Self::ProspectAppSigned => "PROSPECT_APP_SIGNED",
            Self::ProspectUnderwriting => "PROSPECT_UNDERWRITING",
            Self::ClientWonInForce => "CLIENT_WON_IN_FORCE",
            Self::LostLost => "LOST_LOST",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LEADS_INTEREST" => Ok(Self::LeadsInterest),
            "PROSPECT_QUOTE" => Ok(Self::ProspectQuote),
            "PROSPECT_APP_SIGNED" => Ok(Self::ProspectAppSigned),
            "PROSPECT_UNDERWRITING" => Ok(Self::ProspectUnderwriting),
            "CLIENT_WON_IN_FORCE" => Ok(Self::ClientWonInForce),
            "LOST_LOST" => Ok(Self::LostLost),
            _ => Err(format!("Invalid pipeline stage: {}", s)),
        }
    }
}

/// Display grouping of one or more stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineCategory {
    Leads,
    Prospects,
    InForce,
    Lost,
}

impl PipelineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leads => "LEADS",
            Self::Prospects => "PROSPECTS",
            Self::InForce => "IN_FORCE",
            Self::Lost => "LOST",
        }
    }
}

impl std::fmt::Display for PipelineCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
    Unknown,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hot => "HOT",
            Self::Warm => "WARM",
            Self::Cold => "COLD",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Temperature {
    type Err = String;

    /// Case-insensitive so filter values like "Hot" parse too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HOT" => Ok(Self::Hot),
            "WARM" => Ok(Self::Warm),
            "COLD" => Ok(Self::Cold),
            "UNKNOWN" => Ok(Self::Unknown),
            _ => Err(format!("Invalid temperature: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl ContactSummary {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn default_persisted() -> bool {
    true
}

/// A sales record as the backend serves it.
///
/// `persisted` is local-only: it says whether the record is backed by the
/// persistence store. Decoded records default to `true`; seed data built in
/// [`crate::board::demo`] sets it to `false`, which makes every stage move on
/// it local and final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service: Option<String>,
    pub create_date: DateTime<Utc>,
    pub pipeline_stage: PipelineStage,
    #[serde(default)]
    pub temperature: Option<Temperature>,
    #[serde(default)]
    pub next_follow_up: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimate_close_target: Option<DateTime<Utc>>,
    #[serde(default)]
    pub opportunity_source: Option<String>,
    #[serde(default)]
    pub referred_by: Option<String>,
    #[serde(default)]
    pub writing_agent: Option<String>,
    #[serde(default)]
    pub split: Option<String>,
    #[serde(default)]
    pub service_sub_type: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub est_annual_premium: Option<f64>,
    #[serde(default)]
    pub opportunity_amount: Option<f64>,
    pub is_locked: bool,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locked_by: Option<String>,
    pub contact_id: String,
    pub agent_id: String,
    #[serde(default)]
    pub contact: Option<ContactSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip, default = "default_persisted")]
    pub persisted: bool,
}

impl Opportunity {
    /// Minimal persisted record in the given stage. Descriptive fields are
    /// left empty; callers fill what they need.
    pub fn new(id: impl Into<String>, name: impl Into<String>, stage: PipelineStage) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            service: None,
            create_date: now,
            pipeline_stage: stage,
            temperature: None,
            next_follow_up: None,
            estimate_close_target: None,
            opportunity_source: None,
            referred_by: None,
            writing_agent: None,
            split: None,
            service_sub_type: None,
            carrier: None,
            product: None,
            est_annual_premium: None,
            opportunity_amount: None,
            is_locked: false,
            locked_at: None,
            locked_by: None,
            contact_id: String::new(),
            agent_id: String::new(),
            contact: None,
            created_at: now,
            updated_at: now,
            persisted: true,
        }
    }

    pub fn locked(mut self, by: impl Into<String>) -> Self {
        self.is_locked = true;
        self.locked_at = Some(Utc::now());
        self.locked_by = Some(by.into());
        self
    }

    pub fn unpersisted(mut self) -> Self {
        self.persisted = false;
        self
    }

    pub fn temperature_or_unknown(&self) -> Temperature {
        self.temperature.unwrap_or(Temperature::Unknown)
    }

    pub fn contact_name(&self) -> Option<String> {
        self.contact.as_ref().map(ContactSummary::full_name)
    }
}

/// Body of `PUT /opportunities/{id}` when only the stage changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStageRequest {
    pub pipeline_stage: PipelineStage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_stage_roundtrip() {
        for s in &[
            "LEADS_INTEREST",
            "PROSPECT_QUOTE",
            "PROSPECT_APP_SIGNED",
            "PROSPECT_UNDERWRITING",
            "CLIENT_WON_IN_FORCE",
            "LOST_LOST",
        ] {
            let parsed: PipelineStage = s.parse().unwrap();
            assert_eq!(parsed.as_str(), *s);
        }
        assert!("leads_interest".parse::<PipelineStage>().is_err());
        assert!("column-3".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn test_stage_serde_matches_wire_names() {
        assert_eq!(
            serde_json::to_string(&PipelineStage::ClientWonInForce).unwrap(),
            "\"CLIENT_WON_IN_FORCE\""
        );
        assert_eq!(
            serde_json::from_str::<PipelineStage>("\"PROSPECT_APP_SIGNED\"").unwrap(),
            PipelineStage::ProspectAppSigned
        );
    }

    #[test]
    fn test_temperature_parse_is_case_insensitive() {
        assert_eq!("Hot".parse::<Temperature>().unwrap(), Temperature::Hot);
        assert_eq!("cold".parse::<Temperature>().unwrap(), Temperature::Cold);
        assert!("lukewarm".parse::<Temperature>().is_err());
    }

    #[test]
    fn test_opportunity_decodes_backend_json() {
        let json = serde_json::json!({
            "id": "3f1c8f5e-1b2a-4c3d-9e8f-0a1b2c3d4e5f",
            "name": "John Smith - Life Insurance",
            "service": "Life Insurance",
            "createDate": "2026-01-05T10:00:00Z",
            "pipelineStage": "LEADS_INTEREST",
            "temperature": "HOT",
            "opportunityAmount": 50000.0,
            "isLocked": false,
            "contactId": "contact-1",
            "agentId": "agent-1",
            "contact": {
                "id": "contact-1",
                "firstName": "John",
                "lastName": "Smith",
                "email": "john.smith@example.com"
            },
            "createdAt": "2026-01-05T10:00:00Z",
            "updatedAt": "2026-01-06T10:00:00Z"
        });
        let opp: Opportunity = serde_json::from_value(json).unwrap();
        assert_eq!(opp.pipeline_stage, PipelineStage::LeadsInterest);
        assert_eq!(opp.temperature, Some(Temperature::Hot));
        assert_eq!(opp.contact_name().as_deref(), Some("John Smith"));
        assert!(opp.persisted, "decoded records are backed by the store");
        assert!(opp.next_follow_up.is_none());
    }

    #[test]
    fn test_persisted_flag_is_not_serialized() {
        let opp = Opportunity::new("1", "Demo", PipelineStage::LostLost).unpersisted();
        let value = serde_json::to_value(&opp).unwrap();
        assert!(value.get("persisted").is_none());
        assert_eq!(value["pipelineStage"], "LOST_LOST");
        assert_eq!(value["isLocked"], false);
    }

    #[test]
    fn test_missing_temperature_reads_as_unknown() {
        let opp = Opportunity::new("a", "A", PipelineStage::LeadsInterest);
        assert_eq!(opp.temperature_or_unknown(), Temperature::Unknown);
    }
}
