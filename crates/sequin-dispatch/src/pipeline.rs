// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered re-dispatch of a drained queue.
//!
//! A run is strictly sequential: each item is delivered, then captioned,
//! before the next one starts, so the destination sees exactly the computed
//! order. Failures are handled per call. A rate-limit signal pauses the run
//! for the requested time and earns a single retry; any other failure
//! skips the item. Nothing after the drain can abort a run.

use std::future::Future;
use std::sync::Arc;

use sequin_core::{
    ChatId, DeliveryChannel, DeliveryError, MessageRef, QueueItem, SequinError, SettingsStore,
    StatsStore, StickerMode, UserId, UserSettings,
};
use sequin_leaderboard::Leaderboard;
use sequin_meta::{Ordered, Quality, order_items, render};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::queue::{Notice, QueueManager, UserQueue};
use crate::report::RunReport;

/// Who asked for the run and where the results go by default.
#[derive(Debug, Clone)]
pub struct Requester {
    pub user: UserId,
    /// Name credited on the leaderboard.
    pub display_name: String,
    /// Chat the request came from; used when no dump chat is configured.
    pub chat: ChatId,
}

/// Where markers go during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerPlan {
    None,
    /// One marker after the last item.
    EndOfRun,
    /// A marker at every quality change and after the last group.
    QualityGroups,
}

impl MarkerPlan {
    fn for_settings(settings: &UserSettings) -> Self {
        match (&settings.sticker_id, settings.sticker_mode) {
            (None, _) => MarkerPlan::None,
            (Some(_), StickerMode::Quality) if settings.sort_mode.uses_quality() => {
                MarkerPlan::QualityGroups
            }
            (Some(_), _) => MarkerPlan::EndOfRun,
        }
    }
}

/// Drains a user's queue and re-emits it in sorted order.
pub struct DispatchPipeline {
    queues: Arc<QueueManager>,
    channel: Arc<dyn DeliveryChannel>,
    settings: Arc<dyn SettingsStore>,
    stats: Arc<dyn StatsStore>,
    leaderboard: Leaderboard,
}

impl DispatchPipeline {
    pub fn new(
        queues: Arc<QueueManager>,
        channel: Arc<dyn DeliveryChannel>,
        settings: Arc<dyn SettingsStore>,
        stats: Arc<dyn StatsStore>,
        leaderboard: Leaderboard,
    ) -> Self {
        Self {
            queues,
            channel,
            settings,
            stats,
            leaderboard,
        }
    }

    pub fn queues(&self) -> &Arc<QueueManager> {
        &self.queues
    }

    /// Runs one dispatch for `requester`.
    ///
    /// Returns [`SequinError::QueueEmpty`] when nothing was queued; every
    /// other failure is absorbed and reflected in the report's counts.
    pub async fn run(&self, requester: &Requester) -> Result<RunReport, SequinError> {
        let started = Instant::now();
        let UserQueue { items, notices } = self.queues.drain(requester.user);
        if items.is_empty() {
            return Err(SequinError::QueueEmpty);
        }

        let settings = self.resolve_settings(requester.user).await;
        let destination = settings.dump_chat.unwrap_or(requester.chat);
        let plan = MarkerPlan::for_settings(&settings);
        let marker = settings.sticker_id.as_deref().unwrap_or_default();
        let total = items.len();

        info!(
            user = %requester.user,
            total,
            mode = %settings.sort_mode,
            sticker_mode = %settings.sticker_mode,
            destination = %destination,
            "dispatch run started"
        );

        let origins: Vec<(ChatId, MessageRef)> = items
            .iter()
            .map(|i| (i.origin_chat, i.origin_message))
            .collect();
        let ordered = order_items(items, settings.sort_mode, |i| i.raw_text.as_str());

        let mut sent = 0usize;
        let mut last_group: Option<Option<Quality>> = None;
        for Ordered { fields, item } in ordered {
            let caption = render(
                settings.caption_template.as_deref(),
                &item.raw_text,
                &fields,
            );

            if plan == MarkerPlan::QualityGroups {
                let group = fields.quality;
                if last_group.is_some_and(|previous| previous != group) {
                    self.emit_marker(destination, marker).await;
                }
                last_group = Some(group);
            }

            if self
                .dispatch_item(destination, &item, caption.as_deref())
                .await
            {
                sent += 1;
            }
        }

        match plan {
            MarkerPlan::QualityGroups if sent > 0 => self.emit_marker(destination, marker).await,
            MarkerPlan::EndOfRun => self.emit_marker(destination, marker).await,
            _ => {}
        }

        if let Err(e) = self
            .leaderboard
            .increment(requester.user, &requester.display_name, sent as i64)
            .await
        {
            warn!(user = %requester.user, error = %e, "failed to update leaderboard");
        }

        self.cleanup(&origins, &notices).await;

        if sent > 0
            && let Err(e) = self.stats.add_sorted_files(sent as u64).await
        {
            warn!(error = %e, "failed to update lifetime total");
        }

        let report = RunReport {
            sent,
            total,
            mode: settings.sort_mode,
            elapsed: started.elapsed(),
        };
        info!(
            user = %requester.user,
            sent,
            total,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "dispatch run finished"
        );
        Ok(report)
    }

    async fn resolve_settings(&self, user: UserId) -> UserSettings {
        match self.settings.settings(user).await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(user = %user, error = %e, "settings unavailable, using defaults");
                UserSettings::default()
            }
        }
    }

    /// Delivers one item and rewrites its caption. Returns whether it was delivered.
    async fn dispatch_item(
        &self,
        destination: ChatId,
        item: &QueueItem,
        caption: Option<&str>,
    ) -> bool {
        let delivered = self
            .with_retry("deliver", || {
                self.channel
                    .deliver(destination, item.origin_chat, item.origin_message)
            })
            .await;

        let message = match delivered {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    source_message = item.origin_message.0,
                    error = %e,
                    "item skipped"
                );
                return false;
            }
        };

        if let Some(text) = caption
            && let Err(e) = self
                .with_retry("rewrite_caption", || {
                    self.channel.rewrite_caption(destination, message, text)
                })
                .await
        {
            debug!(message = message.0, error = %e, "caption rewrite failed");
        }
        true
    }

    async fn emit_marker(&self, destination: ChatId, marker: &str) {
        if let Err(e) = self
            .with_retry("emit_marker", || self.channel.emit_marker(destination, marker))
            .await
        {
            debug!(error = %e, "marker not delivered");
        }
    }

    /// Runs `call`, and after a rate-limit signal waits and runs it once more.
    async fn with_retry<T, F, Fut>(&self, op: &'static str, call: F) -> Result<T, DeliveryError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DeliveryError>>,
    {
        let first = call().await;
        let Some(pause) = first.as_ref().err().and_then(DeliveryError::retry_after) else {
            return first;
        };
        warn!(op, retry_after_ms = pause.as_millis() as u64, "rate limited");
        tokio::time::sleep(pause).await;
        call().await
    }

    async fn cleanup(&self, origins: &[(ChatId, MessageRef)], notices: &[Notice]) {
        let targets = origins
            .iter()
            .copied()
            .chain(notices.iter().map(|n| (n.chat, n.message)));
        for (chat, message) in targets {
            if let Err(e) = self.channel.remove_message(chat, message).await {
                debug!(chat = %chat, message = message.0, error = %e, "cleanup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use sequin_core::SortMode;

    use super::*;

    fn plan(sticker: Option<&str>, sort_mode: SortMode, sticker_mode: StickerMode) -> MarkerPlan {
        MarkerPlan::for_settings(&UserSettings {
            sticker_id: sticker.map(str::to_string),
            sort_mode,
            sticker_mode,
            ..UserSettings::default()
        })
    }

    #[test]
    fn no_sticker_means_no_markers() {
        assert_eq!(plan(None, SortMode::Quality, StickerMode::Quality), MarkerPlan::None);
        assert_eq!(plan(None, SortMode::Episode, StickerMode::Default), MarkerPlan::None);
    }

    #[test]
    fn quality_groups_need_a_quality_keyed_mode() {
        for mode in [SortMode::Quality, SortMode::Both, SortMode::Season] {
            assert_eq!(plan(Some("s"), mode, StickerMode::Quality), MarkerPlan::QualityGroups);
        }
        for mode in [SortMode::Episode, SortMode::Title] {
            assert_eq!(plan(Some("s"), mode, StickerMode::Quality), MarkerPlan::EndOfRun);
        }
    }

    #[test]
    fn default_sticker_mode_marks_end_of_run() {
        assert_eq!(plan(Some("s"), SortMode::Both, StickerMode::Default), MarkerPlan::EndOfRun);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn skipped_items_are_logged() {
        use sequin_leaderboard::MemoryLeaderboard;
        use sequin_test_utils::{MemorySettings, MemoryStats, MockDelivery, Script, item};

        let queues = Arc::new(QueueManager::new());
        let channel = Arc::new(MockDelivery::new());
        channel.script(8, Script::Fail).await;
        let pipeline = DispatchPipeline::new(
            queues.clone(),
            channel,
            Arc::new(MemorySettings::new()),
            Arc::new(MemoryStats::new()),
            Leaderboard::new(Arc::new(MemoryLeaderboard::new())),
        );
        queues.append(UserId(1), item(1, 8, "E01"));

        let report = pipeline
            .run(&Requester {
                user: UserId(1),
                display_name: "u".into(),
                chat: ChatId(1),
            })
            .await
            .unwrap();

        assert_eq!(report.sent, 0);
        assert!(logs_contain("item skipped"));
    }
}
