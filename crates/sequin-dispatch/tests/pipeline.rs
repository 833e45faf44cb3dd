// SPDX-FileCopyrightText: 2026 Sequin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dispatch runs against the mock delivery channel.

use std::sync::Arc;
use std::time::Duration;

use sequin_core::{
    ChatId, LeaderboardStore, MessageRef, Period, PeriodKeys, SequinError, SortMode, StatsStore,
    StickerMode, UserId, UserSettings,
};
use sequin_dispatch::{DispatchPipeline, Notice, QueueManager, Requester};
use sequin_leaderboard::Leaderboard;
use sequin_test_utils::{MemoryLeaderboard, MemorySettings, MemoryStats, MockDelivery, Script, item};

const USER: UserId = UserId(42);
const CHAT: ChatId = ChatId(42);
const STICKER: &str = "CAACAgIAAxkBAAEMarker";

struct Harness {
    queues: Arc<QueueManager>,
    channel: Arc<MockDelivery>,
    settings: Arc<MemorySettings>,
    stats: Arc<MemoryStats>,
    board: Arc<MemoryLeaderboard>,
    pipeline: DispatchPipeline,
}

fn harness() -> Harness {
    let queues = Arc::new(QueueManager::new());
    let channel = Arc::new(MockDelivery::new());
    let settings = Arc::new(MemorySettings::new());
    let stats = Arc::new(MemoryStats::new());
    let board = Arc::new(MemoryLeaderboard::new());
    let pipeline = DispatchPipeline::new(
        queues.clone(),
        channel.clone(),
        settings.clone(),
        stats.clone(),
        Leaderboard::new(board.clone()),
    );
    Harness {
        queues,
        channel,
        settings,
        stats,
        board,
        pipeline,
    }
}

fn requester() -> Requester {
    Requester {
        user: USER,
        display_name: "Tester".into(),
        chat: CHAT,
    }
}

impl Harness {
    fn enqueue(&self, files: &[(i32, &str)]) {
        for (id, text) in files {
            self.queues.append(USER, item(CHAT.0, *id, text));
        }
    }

    async fn configure(&self, settings: UserSettings) {
        self.settings.put(USER, settings).await;
    }
}

#[tokio::test]
async fn episode_mode_reorders_by_episode() {
    let h = harness();
    h.enqueue(&[(1, "E02, 720p"), (2, "E01, 1080p")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(h.channel.delivered_sources().await, vec![2, 1]);
    assert_eq!(report.sent, 2);
    assert_eq!(report.total, 2);
    assert_eq!(report.mode, SortMode::Episode);
}

#[tokio::test]
async fn quality_mode_puts_lower_quality_first() {
    let h = harness();
    h.configure(UserSettings {
        sort_mode: SortMode::Quality,
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[(1, "E02, 720p"), (2, "E01, 1080p")]);

    h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(h.channel.delivered_sources().await, vec![1, 2]);
}

#[tokio::test]
async fn empty_queue_is_reported_and_touches_nothing() {
    let h = harness();

    let err = h.pipeline.run(&requester()).await.unwrap_err();

    assert!(matches!(err, SequinError::QueueEmpty));
    assert!(h.channel.events().await.is_empty());
    assert_eq!(h.stats.stats().await.unwrap().total_sorted_files, 0);
}

#[tokio::test]
async fn second_run_after_drain_is_empty() {
    let h = harness();
    h.enqueue(&[(1, "E01")]);

    h.pipeline.run(&requester()).await.unwrap();

    assert!(matches!(
        h.pipeline.run(&requester()).await,
        Err(SequinError::QueueEmpty)
    ));
}

#[tokio::test(start_paused = true)]
async fn rate_limited_item_is_retried_after_the_signaled_pause() {
    let h = harness();
    h.channel
        .script(2, Script::RateLimitOnce(Duration::from_secs(5)))
        .await;
    h.enqueue(&[(1, "E01"), (2, "E02"), (3, "E03")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(h.channel.delivered_sources().await, vec![1, 2, 3]);
    assert_eq!(h.channel.attempts(2).await, 2);
    assert_eq!(report.sent, 3);
    assert!(report.elapsed >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn second_rate_limit_skips_only_that_item() {
    let h = harness();
    h.channel
        .script(2, Script::RateLimitAlways(Duration::from_secs(3)))
        .await;
    h.enqueue(&[(3, "E03"), (2, "E02"), (1, "E01")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(h.channel.delivered_sources().await, vec![1, 3]);
    assert_eq!(h.channel.attempts(2).await, 2);
    assert_eq!((report.sent, report.total), (2, 3));
}

#[tokio::test]
async fn hard_failure_is_skipped_without_retry() {
    let h = harness();
    h.channel.script(1, Script::Fail).await;
    h.enqueue(&[(1, "E01"), (2, "E02")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(h.channel.attempts(1).await, 1);
    assert_eq!(h.channel.delivered_sources().await, vec![2]);
    assert_eq!((report.sent, report.total), (1, 2));
}

#[tokio::test]
async fn captions_follow_delivery_order() {
    let h = harness();
    h.configure(UserSettings {
        caption_template: Some("{episode} - {quality}".into()),
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[(1, "Show E03 720p"), (2, "Show E01 480p"), (3, "Trailer")]);

    h.pipeline.run(&requester()).await.unwrap();

    // The trailer has neither field, so its caption is left alone.
    assert_eq!(h.channel.captions().await, vec!["1 - 480p", "3 - 720p"]);
}

#[tokio::test]
async fn caption_failure_still_counts_as_sent() {
    let h = harness();
    h.configure(UserSettings {
        caption_template: Some("{file_name}".into()),
        ..UserSettings::default()
    })
    .await;
    h.channel.fail_captions(true);
    h.enqueue(&[(1, "E01"), (2, "E02")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(report.sent, 2);
    assert!(h.channel.captions().await.is_empty());
}

#[tokio::test]
async fn quality_groups_are_separated_by_markers() {
    let h = harness();
    h.configure(UserSettings {
        sticker_id: Some(STICKER.into()),
        sort_mode: SortMode::Quality,
        sticker_mode: StickerMode::Quality,
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[
        (1, "E01 720p"),
        (2, "E02 1080p"),
        (3, "E01 1080p"),
        (4, "E02 720p"),
    ]);

    h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(
        h.channel.timeline().await,
        vec!["item:1", "item:4", "marker", "item:3", "item:2", "marker"]
    );
}

#[tokio::test]
async fn no_final_group_marker_when_nothing_was_sent() {
    let h = harness();
    h.configure(UserSettings {
        sticker_id: Some(STICKER.into()),
        sort_mode: SortMode::Season,
        sticker_mode: StickerMode::Quality,
        ..UserSettings::default()
    })
    .await;
    h.channel.script(1, Script::Fail).await;
    h.channel.script(2, Script::Fail).await;
    h.enqueue(&[(1, "S01E01 720p"), (2, "S01E01 1080p")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(report.sent, 0);
    assert_eq!(h.channel.timeline().await, vec!["marker"]);
}

#[tokio::test]
async fn default_sticker_mode_emits_one_marker_at_the_end() {
    let h = harness();
    h.configure(UserSettings {
        sticker_id: Some(STICKER.into()),
        sort_mode: SortMode::Quality,
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[(1, "E01 720p"), (2, "E01 1080p")]);

    h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(
        h.channel.timeline().await,
        vec!["item:1", "item:2", "marker"]
    );
}

#[tokio::test]
async fn quality_sticker_mode_without_quality_key_marks_end_only() {
    let h = harness();
    h.configure(UserSettings {
        sticker_id: Some(STICKER.into()),
        sort_mode: SortMode::Title,
        sticker_mode: StickerMode::Quality,
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[(1, "Alpha E01 720p"), (2, "Alpha E02 1080p")]);

    h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(
        h.channel.timeline().await,
        vec!["item:1", "item:2", "marker"]
    );
}

#[tokio::test]
async fn no_sticker_means_no_markers() {
    let h = harness();
    h.configure(UserSettings {
        sort_mode: SortMode::Quality,
        sticker_mode: StickerMode::Quality,
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[(1, "E01 720p"), (2, "E01 1080p")]);

    h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(h.channel.timeline().await, vec!["item:1", "item:2"]);
}

#[tokio::test]
async fn marker_failures_do_not_disturb_items() {
    let h = harness();
    h.configure(UserSettings {
        sticker_id: Some(STICKER.into()),
        ..UserSettings::default()
    })
    .await;
    h.channel.fail_markers(true);
    h.enqueue(&[(1, "E02"), (2, "E01")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(report.sent, 2);
    assert_eq!(h.channel.timeline().await, vec!["item:2", "item:1"]);
}

#[tokio::test]
async fn dump_chat_overrides_destination_and_cleanup_hits_origin() {
    let h = harness();
    let dump = ChatId(-100_123_456_789);
    h.configure(UserSettings {
        dump_chat: Some(dump),
        ..UserSettings::default()
    })
    .await;
    h.enqueue(&[(1, "E01")]);
    h.queues.append_notice(
        USER,
        Notice {
            chat: CHAT,
            message: MessageRef(500),
        },
    );

    h.pipeline.run(&requester()).await.unwrap();

    let delivered_to: Vec<ChatId> = h
        .channel
        .events()
        .await
        .into_iter()
        .filter_map(|e| match e {
            sequin_test_utils::DeliveryEvent::Delivered { destination, .. } => Some(destination),
            _ => None,
        })
        .collect();
    assert_eq!(delivered_to, vec![dump]);
    assert_eq!(
        h.channel.removed().await,
        vec![(CHAT, MessageRef(1)), (CHAT, MessageRef(500))]
    );
}

#[tokio::test]
async fn cleanup_failures_are_swallowed() {
    let h = harness();
    h.channel.fail_removals(true);
    h.enqueue(&[(1, "E01")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(report.sent, 1);
    assert!(h.channel.removed().await.is_empty());
}

#[tokio::test]
async fn unavailable_settings_fall_back_to_defaults() {
    let h = harness();
    h.configure(UserSettings {
        sort_mode: SortMode::Quality,
        dump_chat: Some(ChatId(-1)),
        ..UserSettings::default()
    })
    .await;
    h.settings.set_unavailable(true);
    h.enqueue(&[(1, "E02 480p"), (2, "E01 1080p")]);

    let report = h.pipeline.run(&requester()).await.unwrap();

    assert_eq!(report.mode, SortMode::Episode);
    assert_eq!(h.channel.delivered_sources().await, vec![2, 1]);
}

#[tokio::test]
async fn counters_track_items_actually_sent() {
    let h = harness();
    h.channel.script(3, Script::Fail).await;
    h.enqueue(&[(1, "E01"), (2, "E02"), (3, "E03")]);

    h.pipeline.run(&requester()).await.unwrap();

    let keys = PeriodKeys::now();
    assert_eq!(h.board.total(Period::Today, &keys).await.unwrap(), 2);
    let top = h.board.rank(Period::AllTime, &keys, 10).await.unwrap();
    assert_eq!(top[0].display_name, "Tester");
    assert_eq!(h.stats.stats().await.unwrap().total_sorted_files, 2);
}

#[tokio::test]
async fn nothing_sent_leaves_counters_untouched() {
    let h = harness();
    h.channel.script(1, Script::Fail).await;
    h.enqueue(&[(1, "E01")]);

    h.pipeline.run(&requester()).await.unwrap();

    assert!(h.board.entry(USER).await.is_none());
    assert_eq!(h.stats.stats().await.unwrap().total_sorted_files, 0);
}

#[tokio::test]
async fn runs_for_different_users_are_independent() {
    let h = harness();
    let other = Requester {
        user: UserId(7),
        display_name: "Other".into(),
        chat: ChatId(7),
    };
    h.enqueue(&[(1, "E02"), (2, "E01")]);
    h.queues.append(other.user, item(7, 11, "E05"));

    let me = requester();
    let (mine, theirs) = tokio::join!(h.pipeline.run(&me), h.pipeline.run(&other));

    assert_eq!(mine.unwrap().sent, 2);
    assert_eq!(theirs.unwrap().sent, 1);
    assert!(h.queues.is_empty(USER));
    assert!(h.queues.is_empty(other.user));
}
