//! Promotion dialog behavior
//!
//! Mirrors every active campaign as a message in the guild's promotion dialog
//! channels, turns vote reactions on those messages into comments, and
//! removes the messages once the campaign closes.
//!
//! The dialog cache is memory-only. [`PromotionDialogBehavior::reconcile`]
//! rebuilds it from channel history after a restart.

use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

use dashmap::DashMap;
use modix_core::tally;
use modix_core::traits::ChannelDesignation;
use modix_core::{
    CampaignClosedEvent, CampaignCreatedEvent, CampaignId, CampaignTally, DialogLocation,
    MessageDeletedEvent, PostedMessage, PromotionCampaign, PromotionEvent, PromotionSentiment,
    ReactionAddedEvent, Snowflake,
};

use super::cache::{DialogCache, DialogEntry};
use super::emoji::{self, VOTE_EMOJI};
use super::render::{parse_campaign_marker, render_dialog};
use crate::bus::Cancellation;
use crate::dto::CommentRequest;
use crate::services::{PromotionService, ServiceContext, ServiceResult};

/// Outcome of a startup reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Existing dialogs found in channel history and tracked again
    pub restored: usize,
    /// Dialogs posted for active campaigns that had none
    pub reposted: usize,
    /// Dialogs of closed campaigns and duplicates that were deleted
    pub removed: usize,
    /// Channel or message operations that failed and were skipped
    pub failures: usize,
}

/// Keeps dialog messages in sync with campaign state
pub struct PromotionDialogBehavior {
    ctx: ServiceContext,
    cache: DialogCache,
    /// Serializes renders, posts and deletions per campaign
    campaign_locks: DashMap<CampaignId, Arc<Mutex<()>>>,
}

impl PromotionDialogBehavior {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            cache: DialogCache::new(),
            campaign_locks: DashMap::new(),
        }
    }

    /// Read access to the dialog cache
    pub fn cache(&self) -> &DialogCache {
        &self.cache
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    /// Consume events until `cancel` fires or the bus closes
    ///
    /// Every event runs on its own task, so a slow or failing handler never
    /// holds up the others. In-flight handlers are awaited before returning.
    pub async fn run(
        self: Arc<Self>,
        mut events: broadcast::Receiver<PromotionEvent>,
        cancel: Cancellation,
    ) {
        let mut tasks = JoinSet::new();
        info!("Promotion dialog behavior started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(err) = joined {
                        error!(error = %err, "Dialog handler task panicked");
                    }
                }
                received = events.recv() => match received {
                    Ok(event) => {
                        let behavior = Arc::clone(&self);
                        let cancel = cancel.clone();
                        tasks.spawn(async move {
                            if let Err(err) = behavior.handle(&event, &cancel).await {
                                error!(
                                    event = event.event_type(),
                                    code = err.error_code(),
                                    error = %err,
                                    "Dialog handler failed"
                                );
                            }
                        });
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(lagged = n, "Promotion dialog behavior lagged behind");
                    }
                    Err(RecvError::Closed) => {
                        warn!("Notification bus closed");
                        break;
                    }
                },
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "Dialog handler task panicked");
            }
        }
        info!("Promotion dialog behavior stopped");
    }

    /// Handle a single event
    #[instrument(skip(self, event, cancel), fields(event = event.event_type(), guild_id = %event.guild_id()))]
    pub async fn handle(&self, event: &PromotionEvent, cancel: &Cancellation) -> ServiceResult<()> {
        if cancel.is_cancelled() {
            debug!("Cancelled before handling");
            return Ok(());
        }

        match event {
            PromotionEvent::CampaignCreated(e) => self.on_campaign_created(e, cancel).await,
            PromotionEvent::CampaignClosed(e) => self.on_campaign_closed(e, cancel).await,
            PromotionEvent::ReactionAdded(e) => self.on_reaction_added(e, cancel).await,
            PromotionEvent::MessageDeleted(e) => {
                self.on_message_deleted(e);
                Ok(())
            }
        }
    }

    async fn on_campaign_created(
        &self,
        event: &CampaignCreatedEvent,
        cancel: &Cancellation,
    ) -> ServiceResult<()> {
        let lock = self.campaign_lock(event.campaign_id);
        let _guard = lock.lock().await;

        let Some(campaign) = self
            .ctx
            .campaign_repo()
            .find_by_id(event.campaign_id)
            .await?
        else {
            warn!(campaign_id = %event.campaign_id, "Created campaign not found");
            return Ok(());
        };
        if !campaign.is_active() {
            debug!(campaign_id = %campaign.id, "Campaign closed before its dialog was posted");
            return Ok(());
        }

        let channels = self.dialog_channels(campaign.guild_id()).await?;
        if channels.is_empty() {
            debug!(campaign_id = %campaign.id, "Guild has no promotion dialog channels");
            return Ok(());
        }

        let content = self.render(&campaign, None).await?;
        for channel_id in channels {
            if self.cache.has_dialog_in_channel(campaign.id, channel_id) {
                debug!(campaign_id = %campaign.id, channel_id = %channel_id, "Dialog already posted");
                continue;
            }
            if cancel.is_cancelled() {
                debug!(campaign_id = %campaign.id, "Cancelled before posting dialog");
                break;
            }
            self.post_dialog(&campaign, channel_id, &content).await;
        }
        Ok(())
    }

    async fn on_campaign_closed(
        &self,
        event: &CampaignClosedEvent,
        cancel: &Cancellation,
    ) -> ServiceResult<()> {
        let lock = self.campaign_lock(event.campaign_id);
        let guard = lock.lock().await;

        // Evict first so the mapping never outlives the campaign
        let evicted = self.cache.remove_campaign(event.campaign_id);

        let results = join_all(evicted.iter().map(|location| async move {
            let result = self
                .ctx
                .messenger()
                .delete_message(location.channel_id, location.message_id)
                .await;
            (*location, result)
        }))
        .await;

        let mut failed = 0;
        for (location, result) in results {
            if let Err(err) = result {
                failed += 1;
                warn!(
                    campaign_id = %event.campaign_id,
                    channel_id = %location.channel_id,
                    message_id = %location.message_id,
                    error = %err,
                    "Failed to delete dialog"
                );
            }
        }

        let swept = if cancel.is_cancelled() {
            0
        } else {
            self.sweep_leftovers(event.guild_id, event.campaign_id, &evicted)
                .await
        };

        drop(guard);
        self.campaign_locks.remove(&event.campaign_id);

        info!(
            campaign_id = %event.campaign_id,
            outcome = event.outcome.as_str(),
            evicted = evicted.len(),
            failed,
            swept,
            "Campaign dialogs removed"
        );
        Ok(())
    }

    async fn on_reaction_added(
        &self,
        event: &ReactionAddedEvent,
        cancel: &Cancellation,
    ) -> ServiceResult<()> {
        if event.user_id == self.ctx.messenger().current_user_id() {
            return Ok(());
        }
        let Some(sentiment) = emoji::sentiment_for(&event.emoji) else {
            return Ok(());
        };
        let location = DialogLocation::new(event.channel_id, event.message_id);
        let Some(entry) = self.cache.get(&location) else {
            debug!(message_id = %event.message_id, "Reaction on untracked message");
            return Ok(());
        };

        if let Err(err) = self
            .ctx
            .messenger()
            .remove_reaction(event.channel_id, event.message_id, event.user_id, &event.emoji)
            .await
        {
            warn!(message_id = %event.message_id, error = %err, "Failed to remove vote reaction");
        }

        if cancel.is_cancelled() {
            debug!(campaign_id = %entry.campaign_id, "Cancelled before recording vote");
            return Ok(());
        }

        if let Err(err) = self.record_vote(entry, event.user_id, sentiment).await {
            if err.is_expected() {
                info!(
                    campaign_id = %entry.campaign_id,
                    user_id = %event.user_id,
                    code = err.error_code(),
                    "Vote rejected"
                );
            } else {
                error!(
                    campaign_id = %entry.campaign_id,
                    user_id = %event.user_id,
                    error = %err,
                    "Failed to record vote"
                );
            }
            self.render_notice(entry.campaign_id, location, &err.user_message())
                .await;
        }
        Ok(())
    }

    fn on_message_deleted(&self, event: &MessageDeletedEvent) {
        let location = DialogLocation::new(event.channel_id, event.message_id);
        if let Some(entry) = self.cache.remove_message(&location) {
            info!(
                campaign_id = %entry.campaign_id,
                message_id = %event.message_id,
                "Tracked dialog deleted"
            );
        }
    }

    /// Rebuild the cache for `guild_ids` from persisted campaigns and channel history
    ///
    /// Dialogs of campaigns that are no longer active are deleted, existing
    /// dialogs of active campaigns are tracked again and refreshed, and
    /// active campaigns without a dialog get one posted. A failing guild is
    /// logged and counted; the remaining guilds are still reconciled.
    #[instrument(skip(self, guild_ids, cancel), fields(guilds = guild_ids.len()))]
    pub async fn reconcile(
        &self,
        guild_ids: &[Snowflake],
        cancel: &Cancellation,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for &guild_id in guild_ids {
            if cancel.is_cancelled() {
                debug!("Reconciliation cancelled");
                break;
            }
            if let Err(err) = self.reconcile_guild(guild_id, cancel, &mut report).await {
                report.failures += 1;
                error!(guild_id = %guild_id, error = %err, "Failed to reconcile guild dialogs");
            }
        }

        info!(
            restored = report.restored,
            reposted = report.reposted,
            removed = report.removed,
            failures = report.failures,
            "Dialog reconciliation finished"
        );
        report
    }

    async fn reconcile_guild(
        &self,
        guild_id: Snowflake,
        cancel: &Cancellation,
        report: &mut ReconcileReport,
    ) -> ServiceResult<()> {
        let active: HashMap<CampaignId, PromotionCampaign> = self
            .ctx
            .campaign_repo()
            .find_active_by_guild(guild_id)
            .await?
            .into_iter()
            .map(|campaign| (campaign.id, campaign))
            .collect();

        // Cached as open but closed in storage
        for (location, entry) in self.cache.entries_for_guild(guild_id) {
            if !active.contains_key(&entry.campaign_id) {
                self.cache.remove_message(&location);
                self.delete_counted(location, report).await;
            }
        }

        let channels = self.dialog_channels(guild_id).await?;
        let mut restored_campaigns = BTreeSet::new();

        for &channel_id in &channels {
            if cancel.is_cancelled() {
                return Ok(());
            }
            let messages = match self
                .ctx
                .message_lookup()
                .recent_messages(channel_id, self.ctx.config().dialog_scan_limit)
                .await
            {
                Ok(messages) => messages,
                Err(err) => {
                    report.failures += 1;
                    warn!(channel_id = %channel_id, error = %err, "Failed to read channel history");
                    continue;
                }
            };

            // Newest first, so the newest copy of a duplicated dialog is kept
            for message in &messages {
                let Some(campaign_id) = self.dialog_marker(message) else {
                    continue;
                };
                let location = message.location();
                if self.cache.get(&location).is_some() {
                    continue;
                }

                match active.get(&campaign_id) {
                    Some(campaign) if !self.cache.has_dialog_in_channel(campaign_id, channel_id) => {
                        self.cache.insert(
                            location,
                            DialogEntry {
                                campaign_id,
                                guild_id: campaign.guild_id(),
                            },
                        );
                        restored_campaigns.insert(campaign_id);
                        report.restored += 1;
                    }
                    _ => self.delete_counted(location, report).await,
                }
            }
        }

        let mut campaigns: Vec<&PromotionCampaign> = active.values().collect();
        campaigns.sort_by_key(|campaign| campaign.id);
        for campaign in campaigns {
            let lock = self.campaign_lock(campaign.id);
            let _guard = lock.lock().await;

            let mut content: Option<String> = None;
            for &channel_id in &channels {
                if self.cache.has_dialog_in_channel(campaign.id, channel_id) {
                    continue;
                }
                if cancel.is_cancelled() {
                    return Ok(());
                }
                if content.is_none() {
                    content = Some(self.render(campaign, None).await?);
                }
                let Some(body) = content.as_deref() else {
                    continue;
                };
                if self.post_dialog(campaign, channel_id, body).await {
                    report.reposted += 1;
                } else {
                    report.failures += 1;
                }
            }
        }

        // Votes cast while the cache was empty never re-rendered these
        for campaign_id in restored_campaigns {
            self.refresh_dialogs(campaign_id).await?;
        }
        Ok(())
    }

    async fn record_vote(
        &self,
        entry: DialogEntry,
        user_id: Snowflake,
        sentiment: PromotionSentiment,
    ) -> ServiceResult<()> {
        let user = self
            .ctx
            .authorization()
            .authenticate(entry.guild_id, user_id)
            .await?;

        PromotionService::new(&self.ctx)
            .create_or_update_comment(&user, entry.campaign_id, CommentRequest::vote(sentiment))
            .await?;

        self.refresh_dialogs(entry.campaign_id).await
    }

    /// Re-render every tracked dialog of a campaign from persisted state
    async fn refresh_dialogs(&self, campaign_id: CampaignId) -> ServiceResult<()> {
        if self.cache.locations_for(campaign_id).is_empty() {
            return Ok(());
        }

        let lock = self.campaign_lock(campaign_id);
        let result = {
            let _guard = lock.lock().await;
            self.edit_dialogs(campaign_id).await
        };
        drop(lock);
        self.release_lock_if_untracked(campaign_id);
        result
    }

    async fn edit_dialogs(&self, campaign_id: CampaignId) -> ServiceResult<()> {
        let locations = self.cache.locations_for(campaign_id);
        if locations.is_empty() {
            return Ok(());
        }
        let Some(campaign) = self.ctx.campaign_repo().find_by_id(campaign_id).await? else {
            return Ok(());
        };
        if !campaign.is_active() {
            return Ok(());
        }

        let content = self.render(&campaign, None).await?;
        for location in locations {
            if let Err(err) = self
                .ctx
                .messenger()
                .edit_message(location.channel_id, location.message_id, &content)
                .await
            {
                warn!(
                    campaign_id = %campaign_id,
                    message_id = %location.message_id,
                    error = %err,
                    "Failed to refresh dialog"
                );
            }
        }
        Ok(())
    }

    /// Show `notice` in one dialog message; best effort
    async fn render_notice(&self, campaign_id: CampaignId, location: DialogLocation, notice: &str) {
        // Already evicted; the message is being deleted
        if self.cache.get(&location).is_none() {
            return;
        }

        let lock = self.campaign_lock(campaign_id);
        {
            let _guard = lock.lock().await;
            // Evicted while waiting for the lock
            if self.cache.get(&location).is_some() {
                self.edit_notice(campaign_id, location, notice).await;
            }
        }
        drop(lock);
        self.release_lock_if_untracked(campaign_id);
    }

    async fn edit_notice(&self, campaign_id: CampaignId, location: DialogLocation, notice: &str) {
        let result = async {
            let Some(campaign) = self.ctx.campaign_repo().find_by_id(campaign_id).await? else {
                return Ok(());
            };
            let content = self.render(&campaign, Some(notice)).await?;
            self.ctx
                .messenger()
                .edit_message(location.channel_id, location.message_id, &content)
                .await?;
            ServiceResult::Ok(())
        }
        .await;

        if let Err(err) = result {
            warn!(
                campaign_id = %campaign_id,
                message_id = %location.message_id,
                error = %err,
                "Failed to render notice into dialog"
            );
        }
    }

    /// Post a dialog, track it and seed the vote reactions
    ///
    /// Returns `false` when the message could not be sent.
    async fn post_dialog(
        &self,
        campaign: &PromotionCampaign,
        channel_id: Snowflake,
        content: &str,
    ) -> bool {
        let message_id = match self.ctx.messenger().send_message(channel_id, content).await {
            Ok(message_id) => message_id,
            Err(err) => {
                warn!(
                    campaign_id = %campaign.id,
                    channel_id = %channel_id,
                    error = %err,
                    "Failed to post dialog"
                );
                return false;
            }
        };

        self.cache.insert(
            DialogLocation::new(channel_id, message_id),
            DialogEntry {
                campaign_id: campaign.id,
                guild_id: campaign.guild_id(),
            },
        );

        for emoji in VOTE_EMOJI {
            if let Err(err) = self
                .ctx
                .messenger()
                .add_reaction(channel_id, message_id, emoji)
                .await
            {
                warn!(message_id = %message_id, emoji, error = %err, "Failed to seed reaction");
            }
        }

        info!(
            campaign_id = %campaign.id,
            channel_id = %channel_id,
            message_id = %message_id,
            "Dialog posted"
        );
        true
    }

    /// Delete uncached dialogs of a closed campaign found in channel history
    async fn sweep_leftovers(
        &self,
        guild_id: Snowflake,
        campaign_id: CampaignId,
        already_attempted: &[DialogLocation],
    ) -> usize {
        let channels = match self.dialog_channels(guild_id).await {
            Ok(channels) => channels,
            Err(err) => {
                warn!(guild_id = %guild_id, error = %err, "Failed to look up dialog channels");
                return 0;
            }
        };

        let mut removed = 0;
        for channel_id in channels {
            let messages = match self
                .ctx
                .message_lookup()
                .recent_messages(channel_id, self.ctx.config().dialog_scan_limit)
                .await
            {
                Ok(messages) => messages,
                Err(err) => {
                    warn!(channel_id = %channel_id, error = %err, "Failed to read channel history");
                    continue;
                }
            };

            for message in messages {
                let location = message.location();
                if self.dialog_marker(&message) != Some(campaign_id)
                    || already_attempted.contains(&location)
                {
                    continue;
                }
                match self
                    .ctx
                    .messenger()
                    .delete_message(location.channel_id, location.message_id)
                    .await
                {
                    Ok(()) => removed += 1,
                    Err(err) => warn!(
                        campaign_id = %campaign_id,
                        message_id = %location.message_id,
                        error = %err,
                        "Failed to delete leftover dialog"
                    ),
                }
            }
        }
        removed
    }

    async fn delete_counted(&self, location: DialogLocation, report: &mut ReconcileReport) {
        match self
            .ctx
            .messenger()
            .delete_message(location.channel_id, location.message_id)
            .await
        {
            Ok(()) => report.removed += 1,
            Err(err) => {
                report.failures += 1;
                warn!(
                    channel_id = %location.channel_id,
                    message_id = %location.message_id,
                    error = %err,
                    "Failed to delete stale dialog"
                );
            }
        }
    }

    async fn render(
        &self,
        campaign: &PromotionCampaign,
        notice: Option<&str>,
    ) -> ServiceResult<String> {
        let comments = self.ctx.comment_repo().find_by_campaign(campaign.id).await?;
        let closable_in = tally::time_until_closable(
            campaign,
            self.ctx.config().accept_cooldown(),
            self.ctx.clock().now(),
        );
        Ok(render_dialog(
            campaign,
            &CampaignTally::from_comments(&comments),
            closable_in,
            notice,
        ))
    }

    async fn dialog_channels(&self, guild_id: Snowflake) -> ServiceResult<Vec<Snowflake>> {
        Ok(self
            .ctx
            .channels()
            .channels_for_designation(guild_id, ChannelDesignation::PromotionDialog)
            .await?)
    }

    /// Campaign shown by a message, if the bot posted it as a dialog
    fn dialog_marker(&self, message: &PostedMessage) -> Option<CampaignId> {
        if message.author_id != self.ctx.messenger().current_user_id() {
            return None;
        }
        parse_campaign_marker(&message.content)
    }

    fn campaign_lock(&self, campaign_id: CampaignId) -> Arc<Mutex<()>> {
        self.campaign_locks
            .entry(campaign_id)
            .or_default()
            .value()
            .clone()
    }

    /// Forget the lock of a campaign with no tracked dialogs, unless someone holds it
    fn release_lock_if_untracked(&self, campaign_id: CampaignId) {
        self.campaign_locks.remove_if(&campaign_id, |_, lock| {
            Arc::strong_count(lock) == 1 && self.cache.locations_for(campaign_id).is_empty()
        });
    }
}

impl std::fmt::Debug for PromotionDialogBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionDialogBehavior")
            .field("dialogs", &self.cache.len())
            .field("campaign_locks", &self.campaign_locks.len())
            .finish()
    }
}
