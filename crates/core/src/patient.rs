//! Patient lookup.
//!
//! The webhook endpoints only ever ask one question of the patient directory: "who is this
//! medical id?". [`PatientDirectory`] captures that question so the compiled-in sample table
//! can be swapped for a real directory without touching the webhook contract.

use api_shared::Patient;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Lookup capability for patient records keyed by medical id.
pub trait PatientDirectory: Debug + Send + Sync {
    fn find(&self, medical_id: &str) -> Option<Patient>;
}

/// Fixed, in-memory patient table.
#[derive(Clone, Debug)]
pub struct SampleDirectory {
    patients: BTreeMap<String, Patient>,
}

impl SampleDirectory {
    /// Directory holding the two demo patients, `MED1001` and `MED1002`.
    pub fn new() -> Self {
        Self::with_patients([
            Patient {
                medical_id: "MED1001".into(),
                name: "Aisha Khan".into(),
                dob: "1990-02-14".into(),
                allergies: vec!["Penicillin".into()],
                last_visit: NaiveDate::from_ymd_opt(2025, 8, 5),
                notes: "Type 2 diabetes. Follow-up due in 1 month.".into(),
            },
            Patient {
                medical_id: "MED1002".into(),
                name: "Rahul Verma".into(),
                dob: "1985-10-03".into(),
                allergies: Vec::new(),
                last_visit: NaiveDate::from_ymd_opt(2025, 7, 21),
                notes: "Hypertension. On Amlodipine 5mg.".into(),
            },
        ])
    }

    /// Directory over an arbitrary set of patients, keyed by their `medical_id`.
    pub fn with_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        Self {
            patients: patients
                .into_iter()
                .map(|p| (p.medical_id.clone(), p))
                .collect(),
        }
    }

    pub fn medical_ids(&self) -> impl Iterator<Item = &str> {
        self.patients.keys().map(String::as_str)
    }
}

impl Default for SampleDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl PatientDirectory for SampleDirectory {
    fn find(&self, medical_id: &str) -> Option<Patient> {
        self.patients.get(medical_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_directory_has_demo_patients() {
        let directory = SampleDirectory::new();
        let ids: Vec<_> = directory.medical_ids().collect();
        assert_eq!(ids, vec!["MED1001", "MED1002"]);
    }

    #[test]
    fn test_find_aisha_khan() {
        let patient = SampleDirectory::new()
            .find("MED1001")
            .expect("MED1001 should exist");
        assert_eq!(patient.name, "Aisha Khan");
        assert_eq!(patient.allergies, vec!["Penicillin".to_string()]);
        assert_eq!(patient.last_visit, NaiveDate::from_ymd_opt(2025, 8, 5));
    }

    #[test]
    fn test_find_is_exact_match() {
        let directory = SampleDirectory::new();
        assert!(directory.find("med1001").is_none());
        assert!(directory.find("MED9999").is_none());
        assert!(directory.find("").is_none());
    }
}
