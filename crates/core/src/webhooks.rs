//! Voice-agent webhook contract.
//!
//! The platform calls three hooks around a phone call:
//!
//! - **pre-call**: who is calling? Returns the patient (or a placeholder) so the agent starts
//!   with context. Read-only.
//! - **in-call `getPatient` function**: fetch a patient mid-call. A hit is traced in the call
//!   log; a miss is reported in the response body and leaves the log untouched.
//! - **post-call**: the call outcome (transcript, metadata, traces) in whatever shape the
//!   platform sends. Always stored.
//!
//! Identifiers can arrive in the query string or the body depending on how the agent was
//! configured, so each hook checks a fixed list of places in order and falls back to the
//! configured default id.

use crate::patient::PatientDirectory;
use crate::repositories::call_logs::CallLogService;
use crate::IntakeResult;
use api_shared::{GetPatientRes, Patient, PostCallRes, PrecallRes};
use serde_json::Value;
use std::sync::Arc;

/// Service implementing the three webhook hooks.
#[derive(Clone, Debug)]
pub struct WebhookService {
    directory: Arc<dyn PatientDirectory>,
    call_logs: CallLogService,
    fallback_medical_id: Option<String>,
}

impl WebhookService {
    pub fn new(
        directory: Arc<dyn PatientDirectory>,
        call_logs: CallLogService,
        fallback_medical_id: Option<String>,
    ) -> Self {
        Self {
            directory,
            call_logs,
            fallback_medical_id,
        }
    }

    /// Pre-call lookup.
    ///
    /// The caller is taken from `?patientId=`, then the body's `callerId`, then the fallback.
    /// Unknown callers get a placeholder patient carrying the requested id.
    pub fn precall(&self, query_patient_id: Option<&str>, body: Option<&Value>) -> PrecallRes {
        let patient_id = self.resolve(
            "precall",
            [
                query_patient_id.and_then(text_identifier),
                body_identifier(body, "callerId"),
            ],
        );

        let patient = self
            .directory
            .find(&patient_id)
            .unwrap_or_else(|| Patient::unknown(patient_id));

        PrecallRes {
            success: true,
            patient,
        }
    }

    /// In-call `getPatient` function.
    ///
    /// The id is taken from the body's `medicalId`, then the body's `id`, then `?medicalId=`,
    /// then the fallback.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` only if the trace for a found patient cannot be written.
    pub fn get_patient(
        &self,
        body: Option<&Value>,
        query_medical_id: Option<&str>,
    ) -> IntakeResult<GetPatientRes> {
        let medical_id = self.resolve(
            "getPatient",
            [
                body_identifier(body, "medicalId"),
                body_identifier(body, "id"),
                query_medical_id.and_then(text_identifier),
            ],
        );

        match self.directory.find(&medical_id) {
            None => {
                tracing::info!(medical_id = %medical_id, "getPatient: no such patient");
                Ok(GetPatientRes::not_found(medical_id))
            }
            Some(patient) => {
                let trace = self.call_logs.record_function_call(&medical_id, &patient)?;
                tracing::info!(id = %trace.id, medical_id = %medical_id, "getPatient traced");
                Ok(GetPatientRes::found(patient))
            }
        }
    }

    /// Post-call receipt. A missing or `null` body is stored as `{}`.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if the receipt cannot be written.
    pub fn postcall(&self, payload: Option<Value>) -> IntakeResult<PostCallRes> {
        let payload = payload
            .filter(|p| !p.is_null())
            .unwrap_or_else(|| Value::Object(Default::default()));
        let receipt = self.call_logs.record_post_call(payload)?;
        tracing::info!(id = %receipt.id, "post-call webhook received and saved");

        Ok(PostCallRes {
            ok: true,
            id: receipt.id,
        })
    }

    fn resolve<const N: usize>(&self, hook: &str, candidates: [Option<String>; N]) -> String {
        if let Some(id) = candidates.into_iter().flatten().next() {
            return id;
        }

        match &self.fallback_medical_id {
            Some(fallback) => {
                tracing::warn!(
                    hook,
                    fallback = %fallback,
                    "no caller identifier supplied, using fallback medical id"
                );
                fallback.clone()
            }
            None => String::new(),
        }
    }
}

/// Identifier carried by a JSON value: a non-empty string, or a number in decimal form.
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => text_identifier(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_identifier(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn body_identifier(body: Option<&Value>, key: &str) -> Option<String> {
    body.and_then(|b| b.get(key)).and_then(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::SampleDirectory;
    use crate::store::{MemoryBackend, RecordStore};
    use api_shared::CallLogEntry;
    use serde_json::json;

    fn test_service(fallback: Option<&str>) -> (WebhookService, CallLogService) {
        let store = Arc::new(RecordStore::new(MemoryBackend::new()));
        let call_logs = CallLogService::new(store);
        let service = WebhookService::new(
            Arc::new(SampleDirectory::new()),
            call_logs.clone(),
            fallback.map(String::from),
        );
        (service, call_logs)
    }

    #[test]
    fn test_precall_known_patient() {
        let (service, call_logs) = test_service(Some("MED1001"));
        let res = service.precall(Some("MED1001"), None);

        assert!(res.success);
        assert_eq!(res.patient.name, "Aisha Khan");
        assert_eq!(res.patient.allergies, vec!["Penicillin".to_string()]);
        assert!(call_logs.list().is_empty(), "precall must not write");
    }

    #[test]
    fn test_precall_unknown_patient_gets_placeholder() {
        let (service, _) = test_service(Some("MED1001"));
        let res = service.precall(Some("MED9999"), None);

        assert_eq!(res.patient, Patient::unknown("MED9999"));
    }

    #[test]
    fn test_precall_query_beats_body() {
        let (service, _) = test_service(Some("MED1001"));
        let body = json!({ "callerId": "MED1001" });
        let res = service.precall(Some("MED1002"), Some(&body));

        assert_eq!(res.patient.medical_id, "MED1002");
    }

    #[test]
    fn test_precall_uses_body_caller_id() {
        let (service, _) = test_service(Some("MED1001"));
        let body = json!({ "callerId": "MED1002" });

        let res = service.precall(None, Some(&body));
        assert_eq!(res.patient.name, "Rahul Verma");

        let res = service.precall(Some(""), Some(&body));
        assert_eq!(res.patient.name, "Rahul Verma");
    }

    #[test]
    fn test_precall_falls_back_when_no_identifier() {
        let (service, _) = test_service(Some("MED1001"));
        let res = service.precall(None, Some(&json!({ "callerId": null })));
        assert_eq!(res.patient.name, "Aisha Khan");
    }

    #[test]
    fn test_precall_without_fallback_returns_placeholder() {
        let (service, _) = test_service(None);
        let res = service.precall(None, None);
        assert_eq!(res.patient, Patient::unknown(""));
    }

    #[test]
    fn test_get_patient_found_appends_one_trace() {
        let (service, call_logs) = test_service(Some("MED1001"));
        let body = json!({ "medicalId": "MED1002" });

        let res = service.get_patient(Some(&body), None).unwrap();
        match res {
            GetPatientRes::Found { ok, data } => {
                assert!(ok);
                assert_eq!(data.name, "Rahul Verma");
            }
            other => panic!("expected Found, got {:?}", other),
        }

        let logs = call_logs.list();
        assert_eq!(logs.len(), 1);
        match &logs[0] {
            CallLogEntry::FunctionCall(trace) => {
                assert_eq!(trace.medical_id, "MED1002");
                assert_eq!(trace.function, "getPatient");
            }
            other => panic!("expected function trace, got {:?}", other),
        }
    }

    #[test]
    fn test_get_patient_unknown_appends_nothing() {
        let (service, call_logs) = test_service(Some("MED1001"));
        let body = json!({ "medicalId": "MED9999" });

        let res = service.get_patient(Some(&body), None).unwrap();
        assert_eq!(res, GetPatientRes::not_found("MED9999"));
        assert!(call_logs.list().is_empty());
    }

    #[test]
    fn test_get_patient_identifier_precedence() {
        let (service, _) = test_service(Some("MED1001"));

        let body = json!({ "medicalId": "MED1002", "id": "MED9999" });
        let res = service.get_patient(Some(&body), Some("MED9999")).unwrap();
        assert!(matches!(res, GetPatientRes::Found { .. }));

        let body = json!({ "id": "MED1002" });
        let res = service.get_patient(Some(&body), Some("MED9999")).unwrap();
        assert!(matches!(res, GetPatientRes::Found { .. }));

        let res = service.get_patient(None, Some("MED9999")).unwrap();
        assert_eq!(res, GetPatientRes::not_found("MED9999"));
    }

    #[test]
    fn test_get_patient_numeric_identifier_is_text() {
        let (service, _) = test_service(Some("MED1001"));
        let body = json!({ "medicalId": 1002 });

        let res = service.get_patient(Some(&body), None).unwrap();
        assert_eq!(res, GetPatientRes::not_found("1002"));
    }

    #[test]
    fn test_postcall_wraps_payload() {
        let (service, call_logs) = test_service(Some("MED1001"));
        let res = service
            .postcall(Some(json!({ "transcript": "hi" })))
            .unwrap();

        assert!(res.ok);
        assert!(res.id.to_string().starts_with("call_"));

        match &call_logs.list()[..] {
            [CallLogEntry::PostCall(receipt)] => {
                assert_eq!(receipt.id, res.id);
                assert_eq!(receipt.payload["transcript"], "hi");
            }
            other => panic!("unexpected call logs: {:?}", other),
        }
    }

    #[test]
    fn test_postcall_without_body_stores_empty_object() {
        let (service, call_logs) = test_service(Some("MED1001"));
        service.postcall(None).unwrap();

        match &call_logs.list()[..] {
            [CallLogEntry::PostCall(receipt)] => assert_eq!(receipt.payload, json!({})),
            other => panic!("unexpected call logs: {:?}", other),
        }
    }
}
