//! Append-only call log.
//!
//! Two producers write here: the in-call `getPatient` function (one trace per successful
//! lookup) and the post-call webhook (one receipt per call). Entries are never modified or
//! removed.

use crate::constants::GET_PATIENT_FUNCTION;
use crate::store::{RecordStore, StoreDocument};
use crate::IntakeResult;
use api_shared::{CallLogEntry, FunctionCallTrace, Patient, PostCallReceipt, TraceKind};
use chrono::{DateTime, Utc};
use intake_ids::{IdPrefix, PrefixedId};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct CallLogService {
    store: Arc<RecordStore>,
}

impl CallLogService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// All entries, oldest first.
    pub fn list(&self) -> Vec<CallLogEntry> {
        self.store.load().call_logs
    }

    /// Append a trace of a `getPatient` call that returned `patient`.
    pub fn record_function_call(
        &self,
        medical_id: &str,
        patient: &Patient,
    ) -> IntakeResult<FunctionCallTrace> {
        self.record_function_call_at(medical_id, patient, Utc::now())
    }

    pub(crate) fn record_function_call_at(
        &self,
        medical_id: &str,
        patient: &Patient,
        now: DateTime<Utc>,
    ) -> IntakeResult<FunctionCallTrace> {
        self.store.transaction(|doc| {
            let trace = FunctionCallTrace {
                id: next_id(doc, IdPrefix::FunctionCall, now),
                kind: TraceKind::FunctionCall,
                function: GET_PATIENT_FUNCTION.into(),
                medical_id: medical_id.to_string(),
                result: patient.clone(),
                timestamp: now,
            };
            doc.call_logs.push(CallLogEntry::FunctionCall(trace.clone()));
            Ok(trace)
        })
    }

    /// Append a post-call payload exactly as received.
    pub fn record_post_call(&self, payload: Value) -> IntakeResult<PostCallReceipt> {
        self.record_post_call_at(payload, Utc::now())
    }

    pub(crate) fn record_post_call_at(
        &self,
        payload: Value,
        now: DateTime<Utc>,
    ) -> IntakeResult<PostCallReceipt> {
        self.store.transaction(move |doc| {
            let receipt = PostCallReceipt {
                id: next_id(doc, IdPrefix::CallReceipt, now),
                received_at: now,
                payload,
            };
            doc.call_logs.push(CallLogEntry::PostCall(receipt.clone()));
            Ok(receipt)
        })
    }
}

fn next_id(doc: &StoreDocument, prefix: IdPrefix, now: DateTime<Utc>) -> PrefixedId {
    PrefixedId::generate(prefix, now, |candidate| {
        doc.call_logs
            .iter()
            .any(|entry| entry.id().as_deref() == Some(candidate))
    })
}
