//! Test harness
//!
//! Runs the promotion service and the dialog behavior over shared
//! in-process collaborators, the way the bot process wires them.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use tokio::task::JoinHandle;

use modix_common::{try_init_tracing, BusConfig, PromotionConfig};
use modix_core::{CampaignId, DialogLocation, PromotionEvent, ReactionAddedEvent, Snowflake};
use modix_db::InMemoryPromotionStore;
use modix_service::testing::{
    FixedClock, RecordingMessenger, StaticAuthorization, StaticChannelLookup,
};
use modix_service::{
    CancellationSource, NotificationBus, PromotionDialogBehavior, PromotionService,
    ReconcileReport, ServiceContext, ServiceContextBuilder,
};

use crate::fixtures::{start_time, DIALOG_CHANNEL, GUILD_ID};

/// How long [`wait_until`] polls before giving up
pub const WAIT_TIMEOUT: StdDuration = StdDuration::from_secs(2);

/// A running bot: service context plus a dialog behavior on the bus
pub struct TestBot {
    pub ctx: ServiceContext,
    pub store: Arc<InMemoryPromotionStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub authorization: Arc<StaticAuthorization>,
    pub clock: Arc<FixedClock>,
    pub behavior: Arc<PromotionDialogBehavior>,
    cancel: CancellationSource,
    task: Option<JoinHandle<()>>,
}

impl TestBot {
    /// Start a bot posting dialogs to [`DIALOG_CHANNEL`]
    pub fn start() -> anyhow::Result<Self> {
        Self::start_with_channels(&[DIALOG_CHANNEL])
    }

    pub fn start_with_channels(channels: &[Snowflake]) -> anyhow::Result<Self> {
        let _ = try_init_tracing();

        let store = Arc::new(InMemoryPromotionStore::new());
        let messenger = Arc::new(RecordingMessenger::default());
        let authorization = Arc::new(StaticAuthorization::default());
        let clock = Arc::new(FixedClock::new(start_time()));

        let ctx = ServiceContextBuilder::new()
            .in_memory(Arc::clone(&store))
            .channels(Arc::new(
                StaticChannelLookup::new().with(GUILD_ID, channels.iter().copied()),
            ))
            .messenger(messenger.clone())
            .message_lookup(messenger.clone())
            .authorization(authorization.clone())
            .clock(clock.clone())
            .bus(NotificationBus::new(BusConfig::default().buffer))
            .config(PromotionConfig::default())
            .build()?;

        let behavior = Arc::new(PromotionDialogBehavior::new(ctx.clone()));
        let mut bot = Self {
            ctx,
            store,
            messenger,
            authorization,
            clock,
            behavior,
            cancel: CancellationSource::new(),
            task: None,
        };
        bot.spawn_loop();
        Ok(bot)
    }

    pub fn service(&self) -> PromotionService<'_> {
        PromotionService::new(&self.ctx)
    }

    /// Deliver a reaction as the gateway would
    pub fn react(&self, location: DialogLocation, user_id: Snowflake, emoji: &str) {
        self.ctx
            .bus()
            .publish(PromotionEvent::ReactionAdded(ReactionAddedEvent {
                guild_id: GUILD_ID,
                channel_id: location.channel_id,
                message_id: location.message_id,
                user_id,
                emoji: emoji.to_string(),
                timestamp: Utc::now(),
            }));
    }

    /// Stop the event loop, waiting for in-flight handlers
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            tokio::time::timeout(WAIT_TIMEOUT, task).await??;
        }
        Ok(())
    }

    /// Replace the behavior with a fresh one, as after a process restart
    ///
    /// Storage and channel history survive; the dialog cache does not. The
    /// new behavior reconciles before it starts listening again.
    pub async fn restart(&mut self) -> anyhow::Result<ReconcileReport> {
        self.stop().await?;

        self.behavior = Arc::new(PromotionDialogBehavior::new(self.ctx.clone()));
        self.cancel = CancellationSource::new();
        let report = self
            .behavior
            .reconcile(&[GUILD_ID], &self.cancel.token())
            .await;
        self.spawn_loop();
        Ok(report)
    }

    /// The single dialog location tracked for a campaign in `channel_id`
    pub fn dialog_in(
        &self,
        campaign_id: CampaignId,
        channel_id: Snowflake,
    ) -> Option<DialogLocation> {
        self.behavior
            .cache()
            .locations_for(campaign_id)
            .into_iter()
            .find(|location| location.channel_id == channel_id)
    }

    fn spawn_loop(&mut self) {
        let events = self.ctx.bus().subscribe();
        let behavior = Arc::clone(&self.behavior);
        self.task = Some(tokio::spawn(behavior.run(events, self.cancel.token())));
    }
}

impl Drop for TestBot {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Poll `condition` until it holds or [`WAIT_TIMEOUT`] passes
pub async fn wait_until(condition: impl Fn() -> bool) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not met within {WAIT_TIMEOUT:?}");
        }
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    Ok(())
}

/// Give the event loop time to handle anything already published
pub async fn settle() {
    tokio::time::sleep(StdDuration::from_millis(50)).await;
}
