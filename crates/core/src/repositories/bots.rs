//! Bot configuration records.
//!
//! Bots are schemaless: the backend stores whatever fields the UI sends and only manages two
//! of them itself.
//!
//! - `uid` is assigned on creation when the caller does not supply one (`bot_<epoch millis>`,
//!   unique within the collection) and can never be changed afterwards.
//! - `createdAt` is stamped on creation and never updated.
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations. HTTP status codes and response shapes
//! belong in `api-rest`.

use crate::store::RecordStore;
use crate::{IntakeError, IntakeResult};
use api_shared::{timestamp, BotRecord};
use chrono::{DateTime, Utc};
use intake_ids::{IdPrefix, PrefixedId};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Service for listing, creating, updating and deleting bot records.
#[derive(Clone, Debug)]
pub struct BotService {
    store: Arc<RecordStore>,
}

impl BotService {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// All bot records, in insertion order.
    pub fn list(&self) -> Vec<BotRecord> {
        self.store.load().bots
    }

    /// Create a bot from arbitrary fields.
    ///
    /// A supplied `uid` is kept only when it is a non-empty string, since bots are addressed by
    /// string uid afterwards. Any other `uid` value (a number, `true`, an object) is replaced
    /// with a generated `bot_<epoch millis>` id.
    ///
    /// # Errors
    ///
    /// Returns an `IntakeError` if the store cannot be written.
    pub fn create(&self, fields: Map<String, Value>) -> IntakeResult<BotRecord> {
        self.create_at(fields, Utc::now())
    }

    pub(crate) fn create_at(
        &self,
        fields: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> IntakeResult<BotRecord> {
        let mut bot = BotRecord::new(fields);
        let has_uid = bot.uid().is_some_and(|uid| !uid.is_empty());

        let bot = self.store.transaction(move |doc| {
            if !has_uid {
                let uid = PrefixedId::generate(IdPrefix::Bot, now, |candidate| {
                    doc.bots.iter().any(|b| b.uid() == Some(candidate))
                });
                bot.insert(BotRecord::UID_KEY, Value::String(uid.to_string()));
            }
            bot.insert(
                BotRecord::CREATED_AT_KEY,
                Value::String(timestamp::format(&now)),
            );

            doc.bots.push(bot.clone());
            Ok(bot)
        })?;

        tracing::info!(uid = bot.uid().unwrap_or_default(), "bot created");
        Ok(bot)
    }

    /// Shallow-merge `fields` into the bot identified by `uid`.
    ///
    /// Protected keys in `fields` are ignored, so the stored `uid` and `createdAt` survive.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::BotNotFound`] (and writes nothing) if no bot has this `uid`, or
    /// another `IntakeError` if the store cannot be written.
    pub fn update(&self, uid: &str, fields: Map<String, Value>) -> IntakeResult<BotRecord> {
        self.store.transaction(|doc| {
            let bot = doc
                .bots
                .iter_mut()
                .find(|b| b.uid() == Some(uid))
                .ok_or_else(|| IntakeError::BotNotFound(uid.to_string()))?;

            for (key, value) in fields {
                if BotRecord::PROTECTED_KEYS.contains(&key.as_str()) {
                    continue;
                }
                bot.insert(key, value);
            }

            Ok(bot.clone())
        })
    }

    /// Remove every bot with this `uid`. Deleting an unknown `uid` succeeds.
    ///
    /// # Returns
    ///
    /// The number of records removed.
    pub fn delete(&self, uid: &str) -> IntakeResult<usize> {
        let removed = self.store.transaction(|doc| {
            let before = doc.bots.len();
            doc.bots.retain(|b| b.uid() != Some(uid));
            Ok(before - doc.bots.len())
        })?;

        if removed == 0 {
            tracing::debug!(uid, "delete of unknown bot");
        }
        Ok(removed)
    }
}
