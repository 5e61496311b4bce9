use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Binary, StdResult};
use sha3::{Digest, Keccak256};

use crate::{byte_utils::ByteUtils, cryptography::ethereum_ecrecover, error::CommonError};

// Verified action approval data
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ParsedVAA {
    pub version: u8,
    pub guardian_set_index: u32,
    pub timestamp: u32,
    pub nonce: u32,
    pub len_signers: u8,

    pub emitter_chain: u16,
    pub emitter_address: Vec<u8>,
    pub sequence: u64,
    pub consistency_level: u8,
    pub payload: Vec<u8>,

    pub hash: Vec<u8>,
}

impl ParsedVAA {
    /* VAA format:

    header (length 6):
    0   uint8   version (0x01)
    1   uint32  guardian set index
    5   uint8   len signatures

    per signature (length 66):
    0   uint8       index of the signer (in guardian keys)
    1   [65]uint8   signature

    body:
    0   uint32      timestamp (unix in seconds)
    4   uint32      nonce
    8   uint16      emitter_chain
    10  [32]uint8   emitter_address
    42  uint64      sequence
    50  uint8       consistency_level
    51  []uint8     payload
    */

    pub const HEADER_LEN: usize = 6;
    pub const SIGNATURE_LEN: usize = 66;

    pub const GUARDIAN_SET_INDEX_POS: usize = 1;
    pub const LEN_SIGNER_POS: usize = 5;

    pub const VAA_NONCE_POS: usize = 4;
    pub const VAA_EMITTER_CHAIN_POS: usize = 8;
    pub const VAA_EMITTER_ADDRESS_POS: usize = 10;
    pub const VAA_SEQUENCE_POS: usize = 42;
    pub const VAA_CONSISTENCY_LEVEL_POS: usize = 50;
    pub const VAA_PAYLOAD_POS: usize = 51;

    // Signature data offsets in the signature block
    pub const SIG_DATA_POS: usize = 1;
    // Signature length minus recovery id at the end
    pub const SIG_DATA_LEN: usize = 64;
    // Recovery byte is last after the main signature
    pub const SIG_RECOVERY_POS: usize = Self::SIG_DATA_POS + Self::SIG_DATA_LEN;

    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        if data.len() < Self::HEADER_LEN {
            return CommonError::MalformedPayload.std_err();
        }
        let version = data.get_u8(0);

        let guardian_set_index: u32 = data.get_u32(Self::GUARDIAN_SET_INDEX_POS);
        let len_signers = data.get_u8(Self::LEN_SIGNER_POS) as usize;
        let body_offset: usize = Self::HEADER_LEN + Self::SIGNATURE_LEN * len_signers;

        // Hash the body
        if body_offset >= data.len() {
            return CommonError::MalformedPayload.std_err();
        }
        let body = &data[body_offset..];
        let mut hasher = Keccak256::new();
        hasher.update(body);
        let hash = hasher.finalize().to_vec();

        // Rehash the hash
        let mut hasher = Keccak256::new();
        hasher.update(hash);
        let hash = hasher.finalize().to_vec();

        if body_offset + Self::VAA_PAYLOAD_POS > data.len() {
            return CommonError::MalformedPayload.std_err();
        }

        let timestamp = data.get_u32(body_offset);
        let nonce = data.get_u32(body_offset + Self::VAA_NONCE_POS);
        let emitter_chain = data.get_u16(body_offset + Self::VAA_EMITTER_CHAIN_POS);
        let emitter_address = data
            .get_bytes32(body_offset + Self::VAA_EMITTER_ADDRESS_POS)
            .to_vec();
        let sequence = data.get_u64(body_offset + Self::VAA_SEQUENCE_POS);
        let consistency_level = data.get_u8(body_offset + Self::VAA_CONSISTENCY_LEVEL_POS);
        let payload = data[body_offset + Self::VAA_PAYLOAD_POS..].to_vec();

        Ok(ParsedVAA {
            version,
            guardian_set_index,
            timestamp,
            nonce,
            len_signers: len_signers as u8,
            emitter_chain,
            emitter_address,
            sequence,
            consistency_level,
            payload,
            hash,
        })
    }
}

// Guardian address, 20 bytes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct GuardianAddress {
    pub bytes: Binary,
}

#[cfg(test)]
impl GuardianAddress {
    pub fn from(string: &str) -> GuardianAddress {
        GuardianAddress {
            bytes: hex::decode(string).expect("Decoding failed").into(),
        }
    }
}

// Guardian set information
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct GuardianSetInfo {
    // List of guardian addresses
    pub addresses: Vec<GuardianAddress>,
    // Guardian set expiration time
    pub expiration_time: u64,
}

impl GuardianSetInfo {
    pub fn quorum(&self) -> usize {
        // allow quorum of 0 for testing purposes...
        if self.addresses.is_empty() {
            return 0;
        }
        ((self.addresses.len() * 10 / 3) * 2) / 10 + 1
    }
}

/// Independently verify a raw VAA against a guardian set: recover every
/// signer over the double-keccak body digest and demand strictly increasing
/// signer indices. The required quorum is the caller's rule-set, not derived
/// here.
pub fn verify_signatures(
    data: &[u8],
    guardian_set: &GuardianSetInfo,
    quorum: usize,
) -> StdResult<ParsedVAA> {
    let parsed = ParsedVAA::deserialize(data)?;
    if parsed.version != 1 {
        return CommonError::InvalidVersion.std_err();
    }

    let len_signers = parsed.len_signers as usize;
    if len_signers < quorum {
        return CommonError::InsufficientSignatures.std_err();
    }

    let digest: [u8; 32] = parsed
        .hash
        .as_slice()
        .try_into()
        .or_else(|_| CommonError::MalformedPayload.std_err())?;

    let mut last_index: i32 = -1;
    let mut pos = ParsedVAA::HEADER_LEN;
    for _ in 0..len_signers {
        if pos + ParsedVAA::SIGNATURE_LEN > data.len() {
            return CommonError::MalformedPayload.std_err();
        }
        let index = data.get_u8(pos) as i32;
        if index <= last_index {
            return CommonError::BadSignerOrder.std_err();
        }
        last_index = index;

        let index = index as usize;
        if index >= guardian_set.addresses.len() {
            return CommonError::InvalidSignature.std_err();
        }

        let signature = &data[pos + ParsedVAA::SIG_DATA_POS..pos + ParsedVAA::SIGNATURE_LEN];
        let recovered = ethereum_ecrecover(signature, &digest)
            .or_else(|_| CommonError::InvalidSignature.std_err())?;
        if recovered != guardian_set.addresses[index].bytes.as_slice() {
            return CommonError::InvalidSignature.std_err();
        }

        pos += ParsedVAA::SIGNATURE_LEN;
    }

    Ok(parsed)
}
