//! Dialog cache
//!
//! Maps posted dialog messages to the campaign they display. Only the dialog
//! behavior writes to it; everyone else gets read access.

use dashmap::DashMap;

use modix_core::{CampaignId, DialogLocation, Snowflake};

/// What a tracked dialog message displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogEntry {
    pub campaign_id: CampaignId,
    pub guild_id: Snowflake,
}

/// Location to campaign mapping for live dialogs
///
/// Uses `DashMap` so concurrent event handlers can read and write without a
/// global lock.
#[derive(Debug, Default)]
pub struct DialogCache {
    dialogs: DashMap<DialogLocation, DialogEntry>,
}

impl DialogCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Campaign shown by the message at `location`
    pub fn get(&self, location: &DialogLocation) -> Option<DialogEntry> {
        self.dialogs.get(location).map(|entry| *entry)
    }

    /// Every tracked location for a campaign, sorted
    pub fn locations_for(&self, campaign_id: CampaignId) -> Vec<DialogLocation> {
        let mut locations: Vec<_> = self
            .dialogs
            .iter()
            .filter(|entry| entry.value().campaign_id == campaign_id)
            .map(|entry| *entry.key())
            .collect();
        locations.sort_unstable();
        locations
    }

    /// Tracked locations whose campaign belongs to `guild_id`
    pub fn entries_for_guild(&self, guild_id: Snowflake) -> Vec<(DialogLocation, DialogEntry)> {
        self.dialogs
            .iter()
            .filter(|entry| entry.value().guild_id == guild_id)
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }

    /// Is a dialog for this campaign already tracked in `channel_id`?
    pub fn has_dialog_in_channel(&self, campaign_id: CampaignId, channel_id: Snowflake) -> bool {
        self.dialogs.iter().any(|entry| {
            entry.key().channel_id == channel_id && entry.value().campaign_id == campaign_id
        })
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    pub(crate) fn insert(&self, location: DialogLocation, entry: DialogEntry) {
        self.dialogs.insert(location, entry);
        tracing::debug!(
            campaign_id = %entry.campaign_id,
            channel_id = %location.channel_id,
            message_id = %location.message_id,
            "Dialog tracked"
        );
    }

    pub(crate) fn remove_message(&self, location: &DialogLocation) -> Option<DialogEntry> {
        self.dialogs.remove(location).map(|(_, entry)| entry)
    }

    /// Evict every dialog for a campaign, returning the evicted locations
    pub(crate) fn remove_campaign(&self, campaign_id: CampaignId) -> Vec<DialogLocation> {
        let mut removed = Vec::new();
        self.dialogs.retain(|location, entry| {
            if entry.campaign_id == campaign_id {
                removed.push(*location);
                false
            } else {
                true
            }
        });
        removed.sort_unstable();
        removed
    }
}
