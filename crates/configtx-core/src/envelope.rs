//! Envelope framing: ChannelHeader → Header → Payload → Envelope.
//!
//! [`wrap`] builds an unsigned envelope around already-serialized inner
//! bytes. It sets no timestamp and no transaction id, so the output depends
//! only on its arguments. [`unwrap`] reverses the framing without looking at
//! the channel header.

use prost::Message;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::protos::{ChannelHeader, Envelope, Header, HeaderType, Payload};

/// The header scalars an envelope is stamped with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeParams {
    /// Message type announced in the channel header.
    pub header_type: HeaderType,
    /// Protocol version of the channel header.
    pub version: i32,
    /// Target channel.
    pub channel_id: String,
    /// Epoch the envelope is valid in.
    pub epoch: u64,
}

impl EnvelopeParams {
    /// Parameters for a CONFIG_UPDATE envelope.
    pub fn config_update(channel_id: impl Into<String>, version: i32, epoch: u64) -> Self {
        Self {
            header_type: HeaderType::ConfigUpdate,
            version,
            channel_id: channel_id.into(),
            epoch,
        }
    }

    /// Wrap inner bytes with these parameters.
    pub fn wrap(&self, inner: impl Into<Vec<u8>>) -> Envelope {
        wrap(
            inner,
            self.header_type,
            self.version,
            &self.channel_id,
            self.epoch,
        )
    }

    /// Wrap a typed inner message with these parameters.
    pub fn wrap_message<M: Message>(&self, inner: &M) -> Envelope {
        self.wrap(inner.encode_to_vec())
    }
}

/// Wrap serialized inner bytes into an unsigned envelope.
pub fn wrap(
    inner: impl Into<Vec<u8>>,
    header_type: HeaderType,
    version: i32,
    channel_id: &str,
    epoch: u64,
) -> Envelope {
    let channel_header = ChannelHeader::new(header_type, version, channel_id, epoch);
    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: Vec::new(),
        }),
        data: inner.into(),
    };

    debug!(
        header_type = header_type.as_str_name(),
        channel_id,
        version,
        epoch,
        data_len = payload.data.len(),
        "wrapped envelope"
    );

    Envelope {
        payload: payload.encode_to_vec(),
        signature: Vec::new(),
    }
}

/// Wrap a typed inner message into an unsigned envelope.
pub fn wrap_message<M: Message>(
    inner: &M,
    header_type: HeaderType,
    version: i32,
    channel_id: &str,
    epoch: u64,
) -> Envelope {
    wrap(inner.encode_to_vec(), header_type, version, channel_id, epoch)
}

/// Decode the payload carried by an envelope.
pub fn unwrap_payload(envelope: &Envelope) -> Result<Payload> {
    Payload::decode(envelope.payload.as_slice())
        .map_err(|e| CoreError::MalformedEnvelope(format!("cannot unmarshal Payload: {}", e)))
}

/// Return the raw inner bytes of an envelope.
pub fn unwrap_data(envelope: &Envelope) -> Result<Vec<u8>> {
    Ok(unwrap_payload(envelope)?.data)
}

/// Decode the inner message of an envelope as `M`.
pub fn unwrap<M: Message + Default>(envelope: &Envelope) -> Result<M> {
    let payload = unwrap_payload(envelope)?;
    let inner = M::decode(payload.data.as_slice()).map_err(|e| {
        CoreError::MalformedEnvelope(format!("cannot unmarshal Payload.data: {}", e))
    })?;
    debug!(data_len = payload.data.len(), "unwrapped envelope");
    Ok(inner)
}

/// Inspect the channel header of an envelope.
pub fn channel_header(envelope: &Envelope) -> Result<ChannelHeader> {
    let payload = unwrap_payload(envelope)?;
    let header = payload
        .header
        .ok_or_else(|| CoreError::MalformedEnvelope("payload has no header".into()))?;
    ChannelHeader::decode(header.channel_header.as_slice()).map_err(|e| {
        CoreError::MalformedEnvelope(format!("cannot unmarshal ChannelHeader: {}", e))
    })
}
