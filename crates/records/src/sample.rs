//! Built-in visitor fixture used when no record file is given.

use crate::load::{RecordLoadError, load_records_from_str};
use crate::record::Record;

pub const SAMPLE_RECORDS_JSON: &str = include_str!("../assets/visitors.json");

pub fn sample_records() -> Result<Vec<Record>, RecordLoadError> {
    load_records_from_str(SAMPLE_RECORDS_JSON)
}

#[cfg(test)]
mod tests {
    use super::sample_records;
    use crate::filter::{FilterChoices, FilterCriteria, FilterSummary, filter};
    use pretty_assertions::assert_eq;

    #[test]
    fn sample_set_loads_and_validates() {
        let records = sample_records().unwrap();
        assert_eq!(records.len(), 25);

        let matched = filter(&records, &FilterCriteria::default());
        let summary = FilterSummary::new(records.len(), &matched);
        assert_eq!(summary.customers, 12);
    }

    #[test]
    fn sample_choices_cover_every_device_type() {
        let records = sample_records().unwrap();
        let choices = FilterChoices::from_records(&records);
        assert_eq!(choices.devices, vec!["desktop", "mobile", "tablet"]);
        assert_eq!(choices.countries.len(), 18);
        assert!(choices.country_codes.contains(&"JP".to_string()));
    }
}
