//! End-to-end promotion flows
//!
//! Every test drives the service the way a command handler would and lets
//! the dialog behavior react to the published events on its own task.

use chrono::Duration;

use integration_tests::*;
use modix_core::{
    CampaignQuery, CampaignStatus, MessageDeletedEvent, PromotionEvent, PromotionSentiment,
};
use modix_service::testing::MessengerCall;

#[tokio::test]
async fn test_campaign_lifecycle() -> anyhow::Result<()> {
    let bot = TestBot::start()?;

    let created = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    assert_eq!(created.status, CampaignStatus::Active);
    assert_eq!(created.approvals, 1);

    wait_until(|| bot.dialog_in(created.id, DIALOG_CHANNEL).is_some()).await?;
    let location = bot.dialog_in(created.id, DIALOG_CHANNEL).unwrap();
    let content = bot.messenger.content_of(location).unwrap();
    assert!(content.contains("👍 1  👎 0  🤷 0"));
    assert!(content.ends_with(&format!("Campaign ID: {}", created.id)));

    bot.react(location, MEMBER_ID, "👎");
    wait_until(|| {
        bot.messenger
            .content_of(location)
            .is_some_and(|c| c.contains("👍 1  👎 1  🤷 0"))
    })
    .await?;
    assert!(bot.messenger.calls().contains(&MessengerCall::RemoveReaction {
        channel_id: location.channel_id,
        message_id: location.message_id,
        user_id: MEMBER_ID,
        emoji: "👎".to_string(),
    }));

    let early = bot
        .service()
        .accept_campaign(&staff(), created.id, false)
        .await
        .unwrap_err();
    assert_eq!(early.error_code(), "COOLDOWN_NOT_ELAPSED");

    bot.clock.advance(Duration::hours(48));
    let closed = bot
        .service()
        .accept_campaign(&staff(), created.id, false)
        .await
        .unwrap();
    assert_eq!(closed.status, CampaignStatus::Approved);
    assert!(!closed.forced);

    wait_until(|| bot.behavior.cache().is_empty()).await?;
    wait_until(|| bot.messenger.live_messages(DIALOG_CHANNEL).is_empty()).await?;

    let details = bot
        .service()
        .get_campaign(&member(OTHER_MEMBER_ID), created.id)
        .await
        .unwrap();
    assert_eq!(details.comments.len(), 2);
    let json = serde_json::to_value(&details)?;
    assert_eq!(json["status"], "APPROVED");
    assert_eq!(json["approval_percentage"], 0.5);
    assert_eq!(json["closed_by"], STAFF_ID.to_string());

    Ok(())
}

#[tokio::test]
async fn test_changing_a_vote_by_reaction() -> anyhow::Result<()> {
    let bot = TestBot::start()?;
    let created = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    wait_until(|| bot.dialog_in(created.id, DIALOG_CHANNEL).is_some()).await?;
    let location = bot.dialog_in(created.id, DIALOG_CHANNEL).unwrap();

    bot.react(location, MEMBER_ID, "👍");
    wait_until(|| bot.store.comment_count() == 2).await?;
    wait_until(|| {
        bot.messenger
            .content_of(location)
            .is_some_and(|c| c.contains("👍 2  👎 0  🤷 0"))
    })
    .await?;

    // Gender variants count as the same vote
    bot.react(location, MEMBER_ID, "🤷\u{200d}\u{2640}\u{fe0f}");
    wait_until(|| {
        bot.messenger
            .content_of(location)
            .is_some_and(|c| c.contains("👍 1  👎 0  🤷 1"))
    })
    .await?;
    assert_eq!(bot.store.comment_count(), 2);

    let details = bot
        .service()
        .get_campaign(&member(MEMBER_ID), created.id)
        .await
        .unwrap();
    let vote = details
        .comments
        .iter()
        .find(|c| c.author_id == MEMBER_ID.to_string())
        .unwrap();
    assert_eq!(vote.sentiment, PromotionSentiment::Abstain);
    assert!(vote.body.is_none());
    assert!(vote.modified_at.is_some());

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reactions_from_one_user_converge() -> anyhow::Result<()> {
    const REACTIONS: usize = 50;

    let bot = TestBot::start()?;
    let created = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    wait_until(|| bot.dialog_in(created.id, DIALOG_CHANNEL).is_some()).await?;
    let location = bot.dialog_in(created.id, DIALOG_CHANNEL).unwrap();
    // One send plus the three seeded reactions
    wait_until(|| bot.messenger.calls().len() == 4).await?;

    bot.messenger.clear_calls();
    for i in 0..REACTIONS {
        let emoji = if i % 2 == 0 { "👍" } else { "👎" };
        bot.react(location, MEMBER_ID, emoji);
    }

    // Every recorded vote ends with one re-render
    wait_until(|| bot.messenger.edits().len() == REACTIONS).await?;
    let removed = bot
        .messenger
        .calls()
        .iter()
        .filter(|call| {
            matches!(call, MessengerCall::RemoveReaction { user_id, .. } if *user_id == MEMBER_ID)
        })
        .count();
    assert_eq!(removed, REACTIONS);
    assert_eq!(bot.store.comment_count(), 2);

    let details = bot
        .service()
        .get_campaign(&member(MEMBER_ID), created.id)
        .await
        .unwrap();
    let votes: Vec<_> = details
        .comments
        .iter()
        .filter(|c| c.author_id == MEMBER_ID.to_string())
        .collect();
    assert_eq!(votes.len(), 1);

    // The last render shows the last committed vote
    let expected = match votes[0].sentiment {
        PromotionSentiment::Approve => "👍 2  👎 0  🤷 0",
        PromotionSentiment::Oppose => "👍 1  👎 1  🤷 0",
        PromotionSentiment::Abstain => unreachable!("no abstain reactions were sent"),
    };
    assert!(bot.messenger.content_of(location).unwrap().contains(expected));

    Ok(())
}

#[tokio::test]
async fn test_reaction_on_untracked_message_is_ignored() -> anyhow::Result<()> {
    let bot = TestBot::start()?;
    let stray = bot
        .messenger
        .seed_message(DIALOG_CHANNEL, MEMBER_ID, "unrelated chatter");

    bot.react(stray, OTHER_MEMBER_ID, "👍");
    settle().await;

    assert!(bot.messenger.calls().is_empty());
    assert_eq!(bot.store.comment_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_rejected_vote_is_shown_in_the_dialog() -> anyhow::Result<()> {
    let bot = TestBot::start()?;
    let created = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    wait_until(|| bot.dialog_in(created.id, DIALOG_CHANNEL).is_some()).await?;
    let location = bot.dialog_in(created.id, DIALOG_CHANNEL).unwrap();

    bot.react(location, SUBJECT_ID, "👍");
    wait_until(|| {
        bot.messenger
            .content_of(location)
            .is_some_and(|c| c.contains("> Cannot comment on your own campaign"))
    })
    .await?;
    assert_eq!(bot.store.comment_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_forced_close_evicts_every_dialog_even_when_a_delete_fails() -> anyhow::Result<()> {
    let bot = TestBot::start_with_channels(&[DIALOG_CHANNEL, SECOND_DIALOG_CHANNEL])?;
    let created = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    wait_until(|| bot.behavior.cache().locations_for(created.id).len() == 2).await?;
    let stuck = bot.dialog_in(created.id, DIALOG_CHANNEL).unwrap();
    let other = bot.dialog_in(created.id, SECOND_DIALOG_CHANNEL).unwrap();
    bot.messenger.fail_delete(stuck.message_id);

    let denied = bot
        .service()
        .reject_campaign(&staff(), created.id, true)
        .await
        .unwrap_err();
    assert_eq!(denied.error_code(), "MISSING_CLAIM");

    let closed = bot
        .service()
        .reject_campaign(&moderator(), created.id, true)
        .await
        .unwrap();
    assert_eq!(closed.status, CampaignStatus::Denied);
    assert!(closed.forced);

    wait_until(|| bot.messenger.deletes().len() == 2).await?;
    settle().await;
    let deletes = bot.messenger.deletes();
    assert_eq!(deletes.len(), 2);
    assert!(deletes.contains(&stuck) && deletes.contains(&other));
    assert!(bot.behavior.cache().is_empty());

    // The stuck message is no longer a live dialog
    bot.messenger.clear_calls();
    bot.react(stuck, MEMBER_ID, "👍");
    settle().await;
    assert!(bot.messenger.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_deleted_dialog_is_forgotten() -> anyhow::Result<()> {
    let bot = TestBot::start()?;
    let created = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    wait_until(|| bot.dialog_in(created.id, DIALOG_CHANNEL).is_some()).await?;
    let location = bot.dialog_in(created.id, DIALOG_CHANNEL).unwrap();

    bot.ctx
        .bus()
        .publish(PromotionEvent::MessageDeleted(MessageDeletedEvent {
            guild_id: GUILD_ID,
            channel_id: location.channel_id,
            message_id: location.message_id,
            timestamp: chrono::Utc::now(),
        }));
    wait_until(|| bot.behavior.cache().is_empty()).await?;

    // The campaign itself is untouched
    let active = bot
        .service()
        .search_campaigns(
            &staff(),
            CampaignQuery {
                status: Some(CampaignStatus::Active),
                ..CampaignQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_restart_reconciles_with_channel_history() -> anyhow::Result<()> {
    let mut bot = TestBot::start()?;
    let kept = bot
        .service()
        .create_campaign(&staff(), create_request(SUBJECT_ID))
        .await
        .unwrap();
    let dropped = bot
        .service()
        .create_campaign(&staff(), create_request(MEMBER_ID))
        .await
        .unwrap();
    wait_until(|| bot.behavior.cache().len() == 2).await?;
    let kept_location = bot.dialog_in(kept.id, DIALOG_CHANNEL).unwrap();
    let dropped_location = bot.dialog_in(dropped.id, DIALOG_CHANNEL).unwrap();

    // While the bot is down nobody is listening on the bus
    bot.stop().await?;
    bot.service()
        .reject_campaign(&moderator(), dropped.id, true)
        .await
        .unwrap();
    let missed = bot
        .service()
        .create_campaign(&staff(), create_request(OTHER_MEMBER_ID))
        .await
        .unwrap();
    assert!(bot.messenger.content_of(dropped_location).is_some());

    let report = bot.restart().await?;
    assert_eq!(report.restored, 1);
    assert_eq!(report.reposted, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(report.failures, 0);

    assert_eq!(bot.dialog_in(kept.id, DIALOG_CHANNEL), Some(kept_location));
    assert!(bot.dialog_in(missed.id, DIALOG_CHANNEL).is_some());
    assert!(bot.messenger.content_of(dropped_location).is_none());

    // Restored dialogs take votes again
    bot.react(kept_location, OTHER_MEMBER_ID, "👍");
    wait_until(|| {
        bot.messenger
            .content_of(kept_location)
            .is_some_and(|c| c.contains("👍 2  👎 0  🤷 0"))
    })
    .await?;

    bot.stop().await?;
    Ok(())
}
