use foundation::RecordId;
use serde::Serialize;

use crate::record::Record;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Low,
    Medium,
    High,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => ScoreBand::Low,
            40..=69 => ScoreBand::Medium,
            _ => ScoreBand::High,
        }
    }
}

/// What the detail popup shows for a selected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    pub customer_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_band: Option<ScoreBand>,
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

impl RecordSummary {
    pub fn from_record(record: &Record) -> Self {
        let name = [
            non_empty(record.first_name.as_deref()),
            non_empty(record.last_name.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        let display_name = if !name.is_empty() {
            name
        } else if let Some(email) = non_empty(record.email.as_deref()) {
            email.to_string()
        } else {
            format!("Visitor #{}", record.id)
        };

        let location = [
            non_empty(record.city.as_deref()),
            non_empty(record.country.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            id: record.id,
            display_name,
            email: record.email.clone(),
            avatar: record.avatar.clone(),
            location: (!location.is_empty()).then_some(location),
            country_code: record.country_code.clone(),
            customer_label: if record.is_customer() {
                "Customer"
            } else {
                "Visitor"
            },
            device: record.device_type().map(str::to_string),
            browser: record.browser_name().map(str::to_string),
            os: record.os_name().map(str::to_string),
            conversion_score: record.conversion_score,
            score_band: record.conversion_score.map(ScoreBand::from_score),
        }
    }
}
