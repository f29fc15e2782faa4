//! The translator: one entry point per command, shared by the CLI and the
//! REST server.

use std::path::Path;

use configtx_core::{
    envelope, Config, ConfigUpdate, ConfigUpdateEnvelope, DynMessage, Envelope, MessageRegistry,
};
use configtx_io::Input;
use configtx_msp::{resolve_signer, Signer};
use configtx_update::{sanitycheck, ConfigDiff, Messages, ReadWriteSetDiff};
use tracing::debug;

use crate::config::TranslatorConfig;
use crate::error::Result;
use crate::sign::{self, SignedEnvelope};
use crate::update::{self, UpdateOutput};

/// Stateless translator operations over a message registry and a diff.
pub struct Translator {
    registry: MessageRegistry,
    diff: Box<dyn ConfigDiff>,
    config: TranslatorConfig,
}

impl Translator {
    /// A translator with the standard registry and diff.
    pub fn new(config: TranslatorConfig) -> Self {
        Self::with_parts(MessageRegistry::standard(), Box::new(ReadWriteSetDiff), config)
    }

    /// A translator with a custom registry and diff.
    pub fn with_parts(
        registry: MessageRegistry,
        diff: Box<dyn ConfigDiff>,
        config: TranslatorConfig,
    ) -> Self {
        Self {
            registry,
            diff,
            config,
        }
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// Decode `input` as the named message type.
    pub fn decode(&self, msg_name: &str, input: &Input) -> Result<Box<dyn DynMessage>> {
        let message_type = self.registry.lookup(msg_name)?;
        debug!(msg_name, "translating message");
        Ok(input.decode_dyn(message_type)?)
    }

    /// Diff two configs and stamp the channel id, optionally wrapping the
    /// update in an envelope.
    pub fn compute_update(
        &self,
        original: &Input,
        updated: &Input,
        channel_id: &str,
        wrap: bool,
    ) -> Result<UpdateOutput> {
        let original: Config = original.decode()?;
        let updated: Config = updated.decode()?;
        update::compute_config_update(
            self.diff.as_ref(),
            &original,
            &updated,
            channel_id,
            wrap.then_some(self.config.envelope),
        )
    }

    /// Sanity-check a config.
    pub fn verify(&self, input: &Input) -> Result<Messages> {
        let config: Config = input.decode()?;
        Ok(sanitycheck::check(&config))
    }

    /// Sign the ConfigUpdateEnvelope carried in an envelope.
    ///
    /// The envelope is unwrapped before the signer is loaded, so a malformed
    /// envelope is reported as such whatever the mspdir holds.
    pub fn sign_envelope(
        &self,
        input: &Input,
        channel_id: &str,
        msp_id: &str,
        msp_dir: Option<&Path>,
    ) -> Result<SignedEnvelope> {
        let env: Envelope = input.decode()?;
        let cue: ConfigUpdateEnvelope = envelope::unwrap(&env)?;
        let signer = resolve_signer(msp_id, msp_dir)?;
        sign::sign_and_wrap(
            cue,
            signer.as_ref().map(|s| s as &dyn Signer),
            channel_id,
            self.config.envelope,
        )
    }

    /// Sign a bare ConfigUpdateEnvelope and wrap it.
    pub fn sign_config_update_envelope(
        &self,
        input: &Input,
        channel_id: &str,
        msp_id: &str,
        msp_dir: Option<&Path>,
    ) -> Result<SignedEnvelope> {
        let cue: ConfigUpdateEnvelope = input.decode()?;
        let signer = resolve_signer(msp_id, msp_dir)?;
        sign::sign_and_wrap(
            cue,
            signer.as_ref().map(|s| s as &dyn Signer),
            channel_id,
            self.config.envelope,
        )
    }

    /// Start a signing session from a bare ConfigUpdate.
    pub fn sign_config_update(
        &self,
        input: &Input,
        channel_id: &str,
        msp_id: &str,
        msp_dir: Option<&Path>,
    ) -> Result<SignedEnvelope> {
        let update: ConfigUpdate = input.decode()?;
        let signer = resolve_signer(msp_id, msp_dir)?;
        sign::sign_config_update(
            &update,
            signer.as_ref().map(|s| s as &dyn Signer),
            channel_id,
            self.config.envelope,
        )
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
