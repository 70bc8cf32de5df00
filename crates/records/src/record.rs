use foundation::{LonLat, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Browser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Os {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A geolocated visitor.
///
/// Only `id` and the position are required; every display and classification
/// attribute may be absent. Keys are camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_customer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<Os>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_score: Option<u8>,
}

impl Record {
    /// A record with a position and nothing else.
    pub fn new(id: RecordId, longitude: f64, latitude: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
            first_name: None,
            last_name: None,
            email: None,
            avatar: None,
            city: None,
            country: None,
            country_code: None,
            is_customer: None,
            device: None,
            browser: None,
            os: None,
            conversion_score: None,
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_location(
        mut self,
        city: impl Into<String>,
        country: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        self.city = Some(city.into());
        self.country = Some(country.into());
        self.country_code = Some(country_code.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_customer(mut self, is_customer: bool) -> Self {
        self.is_customer = Some(is_customer);
        self
    }

    pub fn with_device(mut self, kind: impl Into<String>) -> Self {
        self.device = Some(Device {
            kind: Some(kind.into()),
        });
        self
    }

    pub fn with_conversion_score(mut self, score: u8) -> Self {
        self.conversion_score = Some(score);
        self
    }

    pub fn position(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }

    pub fn device_type(&self) -> Option<&str> {
        self.device.as_ref()?.kind.as_deref()
    }

    pub fn browser_name(&self) -> Option<&str> {
        self.browser.as_ref()?.name.as_deref()
    }

    pub fn os_name(&self) -> Option<&str> {
        self.os.as_ref()?.name.as_deref()
    }

    /// Absent customer flags count as "not a customer".
    pub fn is_customer(&self) -> bool {
        self.is_customer.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use foundation::RecordId;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_camel_case_fixture_shape() {
        let json = r#"{
            "id": 7,
            "latitude": 48.85,
            "longitude": 2.35,
            "firstName": "Amelie",
            "countryCode": "FR",
            "isCustomer": true,
            "device": { "type": "mobile" },
            "browser": { "name": "Firefox" },
            "conversionScore": 82
        }"#;
        let r: Record = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, RecordId(7));
        assert_eq!(r.first_name.as_deref(), Some("Amelie"));
        assert_eq!(r.country_code.as_deref(), Some("FR"));
        assert_eq!(r.device_type(), Some("mobile"));
        assert_eq!(r.browser_name(), Some("Firefox"));
        assert_eq!(r.os_name(), None);
        assert_eq!(r.conversion_score, Some(82));
        assert!(r.is_customer());
    }

    #[test]
    fn minimal_record_has_no_attributes() {
        let r: Record = serde_json::from_str(r#"{"id":1,"latitude":0,"longitude":0}"#).unwrap();
        assert_eq!(r, Record::new(RecordId(1), 0.0, 0.0));
        assert!(!r.is_customer());
        assert_eq!(r.device_type(), None);

        let out = serde_json::to_string(&r).unwrap();
        assert_eq!(out, r#"{"id":1,"latitude":0.0,"longitude":0.0}"#);
    }
}
