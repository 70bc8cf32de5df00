use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::Record;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    #[default]
    Any,
    Customer,
    Visitor,
}

impl std::str::FromStr for CustomerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" | "all" => Ok(CustomerType::Any),
            "customer" | "customers" => Ok(CustomerType::Customer),
            "visitor" | "visitors" => Ok(CustomerType::Visitor),
            other => Err(format!("unknown customer type: {other}")),
        }
    }
}

/// Filter state for the record list.
///
/// Empty strings and `CustomerType::Any` place no constraint, so
/// `FilterCriteria::default()` lets every record through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub search_text: String,
    pub country: String,
    pub device: String,
    pub customer_type: CustomerType,
    pub country_code: String,
}

/// Criteria fields that can be relaxed individually.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Criterion {
    SearchText,
    Country,
    Device,
    CustomerType,
    CountryCode,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::SearchText,
        Criterion::Country,
        Criterion::Device,
        Criterion::CustomerType,
        Criterion::CountryCode,
    ];
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search_text.trim().is_empty()
            && self.country.is_empty()
            && self.device.is_empty()
            && self.customer_type == CustomerType::Any
            && self.country_code.is_empty()
    }

    /// A copy with one criterion removed.
    pub fn cleared(&self, criterion: Criterion) -> Self {
        let mut out = self.clone();
        match criterion {
            Criterion::SearchText => out.search_text.clear(),
            Criterion::Country => out.country.clear(),
            Criterion::Device => out.device.clear(),
            Criterion::CustomerType => out.customer_type = CustomerType::Any,
            Criterion::CountryCode => out.country_code.clear(),
        }
        out
    }
}

fn eq_ignore_case(filter: &str, value: Option<&str>) -> bool {
    if filter.is_empty() {
        return true;
    }
    value.is_some_and(|v| v.to_lowercase() == filter.to_lowercase())
}

fn search_matches(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    [
        record.first_name.as_deref(),
        record.last_name.as_deref(),
        record.email.as_deref(),
        record.city.as_deref(),
        record.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn customer_matches(record: &Record, customer_type: CustomerType) -> bool {
    match customer_type {
        CustomerType::Any => true,
        CustomerType::Customer => record.is_customer == Some(true),
        CustomerType::Visitor => !record.is_customer(),
    }
}

/// True when `record` satisfies every active criterion.
///
/// Fields combine with AND; the free-text search is an OR over name, email,
/// city and country. A missing attribute only fails the check that reads it.
pub fn matches(record: &Record, criteria: &FilterCriteria) -> bool {
    let needle = criteria.search_text.trim().to_lowercase();
    matches_with_needle(record, criteria, &needle)
}

fn matches_with_needle(record: &Record, criteria: &FilterCriteria, needle: &str) -> bool {
    search_matches(record, needle)
        && eq_ignore_case(&criteria.country, record.country.as_deref())
        && eq_ignore_case(&criteria.device, record.device_type())
        && customer_matches(record, criteria.customer_type)
        && eq_ignore_case(&criteria.country_code, record.country_code.as_deref())
}

/// Records passing `criteria`, in input order.
pub fn filter<'a>(records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
    if criteria.is_empty() {
        return records.iter().collect();
    }
    let needle = criteria.search_text.trim().to_lowercase();
    records
        .iter()
        .filter(|r| matches_with_needle(r, criteria, &needle))
        .collect()
}

pub fn filter_owned(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    filter(records, criteria).into_iter().cloned().collect()
}

/// Record attributes that feed filter choice lists.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterField {
    Country,
    Device,
    CountryCode,
    City,
    Browser,
    Os,
}

impl FilterField {
    pub fn value(self, record: &Record) -> Option<&str> {
        match self {
            FilterField::Country => record.country.as_deref(),
            FilterField::Device => record.device_type(),
            FilterField::CountryCode => record.country_code.as_deref(),
            FilterField::City => record.city.as_deref(),
            FilterField::Browser => record.browser_name(),
            FilterField::Os => record.os_name(),
        }
    }
}

/// Distinct non-empty values of `field`, sorted ascending.
pub fn unique_values(records: &[Record], field: FilterField) -> Vec<String> {
    unique_values_by(records, |r| field.value(r))
}

pub fn unique_values_by<'a, F>(records: &'a [Record], mut select: F) -> Vec<String>
where
    F: FnMut(&'a Record) -> Option<&'a str>,
{
    let set: BTreeSet<&str> = records
        .iter()
        .filter_map(&mut select)
        .filter(|v| !v.is_empty())
        .collect();
    set.into_iter().map(str::to_string).collect()
}

/// Dropdown contents. Always built from the full record set so a choice never
/// disappears because another filter is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterChoices {
    pub countries: Vec<String>,
    pub devices: Vec<String>,
    pub country_codes: Vec<String>,
}

impl FilterChoices {
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            countries: unique_values(records, FilterField::Country),
            devices: unique_values(records, FilterField::Device),
            country_codes: unique_values(records, FilterField::CountryCode),
        }
    }
}

/// Header counts.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub total: usize,
    pub matched: usize,
    pub customers: usize,
}

impl FilterSummary {
    pub fn new(total: usize, matched: &[&Record]) -> Self {
        Self {
            total,
            matched: matched.len(),
            customers: matched.iter().filter(|r| r.is_customer()).count(),
        }
    }
}
