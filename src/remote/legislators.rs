//! `congress-legislators` directory adapter (phone numbers, contact forms,
//! full term history).

use super::client::{FetchError, HttpClient};
use super::lenient::opt_year;
use crate::analysis::normalize::extract_start_year;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegislatorIds {
    #[serde(default)]
    pub bioguide: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegislatorTerm {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub begin: Option<String>,
    #[serde(default, alias = "startYear", deserialize_with = "opt_year")]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_form: Option<String>,
}

impl LegislatorTerm {
    pub fn first_year(&self) -> Option<i32> {
        extract_start_year(self.start_year, self.start.as_deref(), self.begin.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegislatorRecord {
    #[serde(default)]
    pub id: LegislatorIds,
    #[serde(default)]
    pub terms: Vec<LegislatorTerm>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub contact_form: Option<String>,
}

/// Contact details and service history for one legislator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactEntry {
    pub phone: Option<String>,
    pub contact_form: Option<String>,
    pub start_years: Vec<i32>,
}

/// Bioguide id → contact entry.
#[derive(Debug, Clone, Default)]
pub struct ContactDirectory {
    entries: HashMap<String, ContactEntry>,
}

impl ContactDirectory {
    pub fn from_records(records: Vec<LegislatorRecord>) -> Self {
        let mut entries = HashMap::with_capacity(records.len());

        for record in records {
            let Some(bioguide) = record.id.bioguide.filter(|id| !id.is_empty()) else {
                continue;
            };

            let latest = record.terms.last();
            let phone = latest
                .and_then(|t| t.phone.as_deref())
                .or(record.phone.as_deref())
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from);
            let contact_form = latest
                .and_then(|t| t.contact_form.clone())
                .or(record.contact_form.clone())
                .filter(|f| !f.is_empty());
            let start_years = record.terms.iter().filter_map(|t| t.first_year()).collect();

            entries.insert(
                bioguide,
                ContactEntry {
                    phone,
                    contact_form,
                    start_years,
                },
            );
        }

        Self { entries }
    }

    pub fn get(&self, bioguide_id: &str) -> Option<&ContactEntry> {
        self.entries.get(bioguide_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LegislatorsApi {
    http: HttpClient,
    url: String,
}

impl LegislatorsApi {
    pub fn new(http: HttpClient, url: &str) -> Self {
        Self {
            http,
            url: url.to_string(),
        }
    }

    pub async fn fetch(&self) -> Result<ContactDirectory, FetchError> {
        let records: Vec<LegislatorRecord> = self.http.get_json(&self.url, &[]).await?;
        Ok(ContactDirectory::from_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": {"bioguide": "S000033"},
            "terms": [
                {"type": "rep", "start": "1991-01-03", "phone": "202-000-0000"},
                {"type": "sen", "start": "2007-01-04", "phone": " 202-224-5141 ",
                 "contact_form": "https://www.sanders.senate.gov/contact/"}
            ]
        },
        {"id": {"govtrack": 1}, "terms": []}
    ]"#;

    #[test]
    fn test_directory_uses_latest_term_contact() {
        let records: Vec<LegislatorRecord> = serde_json::from_str(SAMPLE).unwrap();
        let directory = ContactDirectory::from_records(records);

        assert_eq!(directory.len(), 1);
        let entry = directory.get("S000033").unwrap();
        assert_eq!(entry.phone.as_deref(), Some("202-224-5141"));
        assert_eq!(
            entry.contact_form.as_deref(),
            Some("https://www.sanders.senate.gov/contact/")
        );
        assert_eq!(entry.start_years, vec![1991, 2007]);
    }

    #[test]
    fn test_records_without_bioguide_are_skipped() {
        let records: Vec<LegislatorRecord> =
            serde_json::from_str(r#"[{"id": {}, "terms": [{"start": "2001-01-03"}]}]"#).unwrap();
        assert!(ContactDirectory::from_records(records).is_empty());
    }
}
