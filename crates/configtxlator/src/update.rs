//! Update orchestration: diff two configs and stamp the result.

use configtx_core::{
    Config, ConfigUpdate, ConfigUpdateEnvelope, DynMessage, Envelope, EnvelopeParams,
};
use configtx_update::ConfigDiff;
use tracing::{debug, info};

use crate::config::EnvelopeDefaults;
use crate::error::Result;

/// The product of an update computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutput {
    /// The bare update.
    Update(ConfigUpdate),
    /// The update in an unsigned CONFIG_UPDATE envelope.
    Envelope(Envelope),
}

impl UpdateOutput {
    /// Borrow the output as a type-erased message for encoding.
    pub fn as_message(&self) -> &dyn DynMessage {
        match self {
            UpdateOutput::Update(update) => update,
            UpdateOutput::Envelope(envelope) => envelope,
        }
    }
}

/// Compute the update between two configs for `channel_id`.
///
/// The channel id always comes from the caller, whatever the diff produced.
/// With `wrap` set, the update is placed in a fresh, unsigned
/// ConfigUpdateEnvelope inside a CONFIG_UPDATE envelope.
pub fn compute_config_update(
    diff: &dyn ConfigDiff,
    original: &Config,
    updated: &Config,
    channel_id: &str,
    wrap: Option<EnvelopeDefaults>,
) -> Result<UpdateOutput> {
    let mut update = diff.compute(original, updated)?;
    update.channel_id = channel_id.to_string();

    debug!(
        channel_id,
        has_read_set = update.read_set.is_some(),
        has_write_set = update.write_set.is_some(),
        "computed config update"
    );

    let Some(defaults) = wrap else {
        return Ok(UpdateOutput::Update(update));
    };

    let envelope = wrap_update(&update, channel_id, defaults);
    info!(channel_id, "wrapped config update in envelope");
    Ok(UpdateOutput::Envelope(envelope))
}

/// Wrap a config update in an unsigned CONFIG_UPDATE envelope.
pub fn wrap_update(
    update: &ConfigUpdate,
    channel_id: &str,
    defaults: EnvelopeDefaults,
) -> Envelope {
    let cue = ConfigUpdateEnvelope::new(update);
    EnvelopeParams::config_update(channel_id, defaults.version, defaults.epoch).wrap_message(&cue)
}
