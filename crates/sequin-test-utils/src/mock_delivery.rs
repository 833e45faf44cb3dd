// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery channel for deterministic dispatch tests.
//!
//! Every successful call is appended to an event log in call order.
//! Failures can be scripted per source message.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sequin_core::{
    AdapterType, ChatId, DeliveryChannel, DeliveryError, HealthStatus, MessageRef, PluginAdapter,
    SequinError,
};

/// Message ids handed out by the mock start here.
const FIRST_MESSAGE_ID: i32 = 10_000;

/// How the mock answers a `deliver` call for a given source message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// First attempt is rate limited, later attempts succeed.
    RateLimitOnce(Duration),
    /// Every attempt is rate limited.
    RateLimitAlways(Duration),
    /// Every attempt fails outright.
    Fail,
}

/// A successful call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryEvent {
    Delivered {
        destination: ChatId,
        source: MessageRef,
        message: MessageRef,
    },
    Captioned {
        destination: ChatId,
        message: MessageRef,
        text: String,
    },
    Marker {
        destination: ChatId,
        marker_id: String,
    },
    Removed {
        chat: ChatId,
        message: MessageRef,
    },
}

pub struct MockDelivery {
    events: Mutex<Vec<DeliveryEvent>>,
    scripts: Mutex<HashMap<MessageRef, Script>>,
    attempts: Mutex<HashMap<MessageRef, usize>>,
    next_id: AtomicI32,
    fail_captions: AtomicBool,
    fail_markers: AtomicBool,
    fail_removals: AtomicBool,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            scripts: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(FIRST_MESSAGE_ID),
            fail_captions: AtomicBool::new(false),
            fail_markers: AtomicBool::new(false),
            fail_removals: AtomicBool::new(false),
        }
    }

    /// Scripts the answer for deliveries of `source`.
    pub async fn script(&self, source: i32, script: Script) {
        self.scripts.lock().await.insert(MessageRef(source), script);
    }

    pub fn fail_captions(&self, fail: bool) {
        self.fail_captions.store(fail, Ordering::SeqCst);
    }

    pub fn fail_markers(&self, fail: bool) {
        self.fail_markers.store(fail, Ordering::SeqCst);
    }

    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    pub async fn events(&self) -> Vec<DeliveryEvent> {
        self.events.lock().await.clone()
    }

    /// Number of `deliver` calls made for `source`, successful or not.
    pub async fn attempts(&self, source: i32) -> usize {
        self.attempts
            .lock()
            .await
            .get(&MessageRef(source))
            .copied()
            .unwrap_or(0)
    }

    /// Delivered items and markers in order: `"item:<source>"` or `"marker"`.
    pub async fn timeline(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                DeliveryEvent::Delivered { source, .. } => Some(format!("item:{}", source.0)),
                DeliveryEvent::Marker { .. } => Some("marker".to_string()),
                _ => None,
            })
            .collect()
    }

    /// Source ids of delivered items, in delivery order.
    pub async fn delivered_sources(&self) -> Vec<i32> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                DeliveryEvent::Delivered { source, .. } => Some(source.0),
                _ => None,
            })
            .collect()
    }

    pub async fn captions(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                DeliveryEvent::Captioned { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn removed(&self) -> Vec<(ChatId, MessageRef)> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                DeliveryEvent::Removed { chat, message } => Some((*chat, *message)),
                _ => None,
            })
            .collect()
    }

    fn fresh_id(&self) -> MessageRef {
        MessageRef(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for MockDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockDelivery {
    fn name(&self) -> &str {
        "mock-delivery"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, SequinError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SequinError> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryChannel for MockDelivery {
    async fn deliver(
        &self,
        destination: ChatId,
        _source_chat: ChatId,
        source: MessageRef,
    ) -> Result<MessageRef, DeliveryError> {
        let attempt = {
            let mut attempts = self.attempts.lock().await;
            let n = attempts.entry(source).or_insert(0);
            *n += 1;
            *n
        };

        match self.scripts.lock().await.get(&source).copied() {
            Some(Script::RateLimitOnce(retry_after)) if attempt == 1 => {
                return Err(DeliveryError::RateLimited { retry_after });
            }
            Some(Script::RateLimitAlways(retry_after)) => {
                return Err(DeliveryError::RateLimited { retry_after });
            }
            Some(Script::Fail) => {
                return Err(DeliveryError::failed(format!("source {} is gone", source.0)));
            }
            _ => {}
        }

        let message = self.fresh_id();
        self.events.lock().await.push(DeliveryEvent::Delivered {
            destination,
            source,
            message,
        });
        Ok(message)
    }

    async fn rewrite_caption(
        &self,
        destination: ChatId,
        message: MessageRef,
        text: &str,
    ) -> Result<(), DeliveryError> {
        if self.fail_captions.load(Ordering::SeqCst) {
            return Err(DeliveryError::failed("caption edit refused"));
        }
        self.events.lock().await.push(DeliveryEvent::Captioned {
            destination,
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn emit_marker(
        &self,
        destination: ChatId,
        marker_id: &str,
    ) -> Result<MessageRef, DeliveryError> {
        if self.fail_markers.load(Ordering::SeqCst) {
            return Err(DeliveryError::failed("sticker refused"));
        }
        self.events.lock().await.push(DeliveryEvent::Marker {
            destination,
            marker_id: marker_id.to_string(),
        });
        Ok(self.fresh_id())
    }

    async fn remove_message(
        &self,
        chat: ChatId,
        message: MessageRef,
    ) -> Result<(), DeliveryError> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(DeliveryError::failed("message can't be deleted"));
        }
        self.events
            .lock()
            .await
            .push(DeliveryEvent::Removed { chat, message });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deliver_records_and_numbers_messages() {
        let mock = MockDelivery::new();
        let a = mock.deliver(ChatId(1), ChatId(2), MessageRef(5)).await.unwrap();
        let b = mock.deliver(ChatId(1), ChatId(2), MessageRef(6)).await.unwrap();
        assert_eq!(a, MessageRef(FIRST_MESSAGE_ID));
        assert_eq!(b, MessageRef(FIRST_MESSAGE_ID + 1));
        assert_eq!(mock.delivered_sources().await, vec![5, 6]);
    }

    #[tokio::test]
    async fn rate_limit_once_then_succeeds() {
        let mock = MockDelivery::new();
        mock.script(5, Script::RateLimitOnce(Duration::from_secs(2))).await;

        let first = mock.deliver(ChatId(1), ChatId(2), MessageRef(5)).await;
        assert_eq!(
            first.unwrap_err().retry_after(),
            Some(Duration::from_secs(2))
        );
        assert!(mock.deliver(ChatId(1), ChatId(2), MessageRef(5)).await.is_ok());
        assert_eq!(mock.attempts(5).await, 2);
    }

    #[tokio::test]
    async fn scripted_failure_is_not_recorded() {
        let mock = MockDelivery::new();
        mock.script(9, Script::Fail).await;
        assert!(mock.deliver(ChatId(1), ChatId(2), MessageRef(9)).await.is_err());
        assert!(mock.events().await.is_empty());
    }

    #[tokio::test]
    async fn failure_switches() {
        let mock = MockDelivery::new();
        mock.fail_markers(true);
        mock.fail_captions(true);
        mock.fail_removals(true);
        assert!(mock.emit_marker(ChatId(1), "CAAC").await.is_err());
        assert!(mock.rewrite_caption(ChatId(1), MessageRef(1), "x").await.is_err());
        assert!(mock.remove_message(ChatId(1), MessageRef(1)).await.is_err());
        assert!(mock.timeline().await.is_empty());
    }
}
