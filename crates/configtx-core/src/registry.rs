//! Message-type registry.
//!
//! Maps fully qualified protobuf names (`common.Config`,
//! `msp.SerializedIdentity`, ...) to decoders producing a type-erased
//! [`DynMessage`]. The table is fixed at construction; there is no
//! reflection.

use std::collections::BTreeMap;
use std::fmt;

use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::error::{CoreError, Result};
use crate::protos::*;

/// A message with both wire encodings.
pub trait WireMessage: Message + Default + Serialize + DeserializeOwned + 'static {}

impl<T> WireMessage for T where T: Message + Default + Serialize + DeserializeOwned + 'static {}

/// A decoded message of a type known only at runtime.
pub trait DynMessage: fmt::Debug + Send + Sync {
    /// Encode to protobuf binary.
    fn encode_binary(&self) -> Vec<u8>;

    /// Encode the JSON projection.
    fn to_json(&self) -> Result<Vec<u8>>;
}

impl<M: WireMessage> DynMessage for M {
    fn encode_binary(&self) -> Vec<u8> {
        codec::encode_binary(self)
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        codec::to_json(self)
    }
}

type Decoder = fn(&[u8]) -> Result<Box<dyn DynMessage>>;

fn decode_binary_boxed<M: WireMessage>(bytes: &[u8]) -> Result<Box<dyn DynMessage>> {
    Ok(Box::new(codec::decode_binary::<M>(bytes)?))
}

fn decode_json_boxed<M: WireMessage>(bytes: &[u8]) -> Result<Box<dyn DynMessage>> {
    Ok(Box::new(codec::from_json::<M>(bytes)?))
}

/// Decoders for one registered message type.
#[derive(Clone, Copy)]
pub struct MessageType {
    name: &'static str,
    binary: Decoder,
    json: Decoder,
}

impl MessageType {
    /// Describe message type `M` under the given name.
    pub fn of<M: WireMessage>(name: &'static str) -> Self {
        Self {
            name,
            binary: decode_binary_boxed::<M>,
            json: decode_json_boxed::<M>,
        }
    }

    /// The registered name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Decode protobuf binary.
    pub fn decode_binary(&self, bytes: &[u8]) -> Result<Box<dyn DynMessage>> {
        (self.binary)(bytes)
    }

    /// Decode the JSON projection.
    pub fn decode_json(&self, bytes: &[u8]) -> Result<Box<dyn DynMessage>> {
        (self.json)(bytes)
    }

    /// Decode in the requested format.
    pub fn decode(&self, bytes: &[u8], json: bool) -> Result<Box<dyn DynMessage>> {
        if json {
            self.decode_json(bytes)
        } else {
            self.decode_binary(bytes)
        }
    }
}

impl fmt::Debug for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageType({})", self.name)
    }
}

/// Name → message type lookup.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    types: BTreeMap<&'static str, MessageType>,
}

impl MessageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of every message this crate defines.
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register(MessageType::of::<Envelope>("common.Envelope"));
        registry.register(MessageType::of::<Payload>("common.Payload"));
        registry.register(MessageType::of::<Header>("common.Header"));
        registry.register(MessageType::of::<ChannelHeader>("common.ChannelHeader"));
        registry.register(MessageType::of::<SignatureHeader>("common.SignatureHeader"));
        registry.register(MessageType::of::<Block>("common.Block"));
        registry.register(MessageType::of::<BlockHeader>("common.BlockHeader"));
        registry.register(MessageType::of::<BlockData>("common.BlockData"));
        registry.register(MessageType::of::<BlockMetadata>("common.BlockMetadata"));

        registry.register(MessageType::of::<Config>("common.Config"));
        registry.register(MessageType::of::<ConfigEnvelope>("common.ConfigEnvelope"));
        registry.register(MessageType::of::<ConfigGroup>("common.ConfigGroup"));
        registry.register(MessageType::of::<ConfigValue>("common.ConfigValue"));
        registry.register(MessageType::of::<ConfigPolicy>("common.ConfigPolicy"));
        registry.register(MessageType::of::<Policy>("common.Policy"));
        registry.register(MessageType::of::<ImplicitMetaPolicy>("common.ImplicitMetaPolicy"));
        registry.register(MessageType::of::<ConfigUpdate>("common.ConfigUpdate"));
        registry.register(MessageType::of::<ConfigUpdateEnvelope>("common.ConfigUpdateEnvelope"));
        registry.register(MessageType::of::<ConfigSignature>("common.ConfigSignature"));

        registry.register(MessageType::of::<HashingAlgorithm>("common.HashingAlgorithm"));
        registry.register(MessageType::of::<BlockDataHashingStructure>(
            "common.BlockDataHashingStructure",
        ));
        registry.register(MessageType::of::<OrdererAddresses>("common.OrdererAddresses"));
        registry.register(MessageType::of::<Consortium>("common.Consortium"));
        registry.register(MessageType::of::<Capabilities>("common.Capabilities"));
        registry.register(MessageType::of::<Capability>("common.Capability"));
        registry.register(MessageType::of::<BatchSize>("orderer.BatchSize"));
        registry.register(MessageType::of::<BatchTimeout>("orderer.BatchTimeout"));
        registry.register(MessageType::of::<ConsensusType>("orderer.ConsensusType"));

        registry.register(MessageType::of::<SerializedIdentity>("msp.SerializedIdentity"));

        registry
    }

    /// Add a message type, replacing any previous entry of the same name.
    pub fn register(&mut self, message_type: MessageType) {
        self.types.insert(message_type.name, message_type);
    }

    /// Find a message type by name.
    pub fn lookup(&self, name: &str) -> Result<&MessageType> {
        self.types
            .get(name)
            .ok_or_else(|| CoreError::UnknownMessageType(name.to_string()))
    }

    /// All registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.types.keys().copied()
    }
}
