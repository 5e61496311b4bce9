use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Api, StdResult, Uint128};
use cw20::Denom;

use crate::{byte_utils::ByteUtils, error::CommonError};

// Chain ID of Terra
pub const CHAIN_ID: u16 = 3;

// Wormhole chain id of Solana; the tag-5 SaleInit dialect is addressed to it.
pub const CHAIN_ID_SOLANA: u16 = 1;

// Conversion rates are fixed-point with 1e18 == 1.0
pub const CONVERSION_RATE_SCALE: u128 = 1_000_000_000_000_000_000;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SaleTimes {
    pub start: u64,
    pub end: u64,
    pub unlock: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SaleCore {
    pub id: Vec<u8>,
    pub token_address: Vec<u8>,
    pub token_chain: u16,
    pub token_decimals: u8,
    pub token_amount: Uint128,
    pub min_raise: Uint128,
    pub max_raise: Uint128,
    pub times: SaleTimes,
    pub recipient: Vec<u8>,
    pub refund_recipient: Vec<u8>,
    pub kyc_authority: Vec<u8>,
    pub num_accepted: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct AcceptedToken {
    pub index: u8,
    pub chain: u16,
    pub address: Vec<u8>,
    pub conversion_rate: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, JsonSchema)]
pub enum SaleStatus {
    Active,
    Sealed,
    Aborted,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Contribution {
    pub token_index: u8,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Allocation {
    pub token_index: u8,
    pub allocated: Uint128,
    pub excess_contributed: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SaleInit {
    pub core: SaleCore,
    pub accepted_tokens: Vec<AcceptedToken>,
    /// Sale-token custody account, only spoken by the tag-5 dialect.
    pub sale_token_custody: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ContributionsAttested {
    pub sale_id: Vec<u8>,
    pub chain_id: u16,
    pub contributions: Vec<Contribution>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SaleSealed {
    pub sale_id: Vec<u8>,
    pub allocations: Vec<Allocation>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct SaleAborted {
    pub sale_id: Vec<u8>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct AuthorityUpdated {
    pub sale_id: Vec<u8>,
    pub new_authority: Vec<u8>,
}

/// Tag + body view over a raw payload.
pub struct SaleMessage<'a> {
    pub id: u8,
    pub payload: &'a [u8],
}

impl<'a> SaleMessage<'a> {
    pub fn deserialize(data: &'a [u8]) -> StdResult<Self> {
        if data.is_empty() {
            return CommonError::MalformedPayload.std_err();
        }
        Ok(SaleMessage {
            id: data[0],
            payload: &data[1..],
        })
    }
}

/// Closed union of everything spoken over the sale channel, dispatched on the
/// tag byte.
#[derive(Clone, Debug, PartialEq)]
pub enum SalePayload {
    Init(SaleInit),
    InitSolana(SaleInit),
    Attest(ContributionsAttested),
    Sealed(SaleSealed),
    Aborted(SaleAborted),
    AuthorityUpdated(AuthorityUpdated),
}

impl SalePayload {
    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        let message = SaleMessage::deserialize(data)?;
        match message.id {
            SaleInit::PAYLOAD_ID => Ok(SalePayload::Init(SaleInit::deserialize(message.payload)?)),
            SaleInit::PAYLOAD_ID_SOLANA => Ok(SalePayload::InitSolana(
                SaleInit::deserialize_solana(message.payload)?,
            )),
            ContributionsAttested::PAYLOAD_ID => Ok(SalePayload::Attest(
                ContributionsAttested::deserialize(message.payload)?,
            )),
            SaleSealed::PAYLOAD_ID => Ok(SalePayload::Sealed(SaleSealed::deserialize(
                message.payload,
            )?)),
            SaleAborted::PAYLOAD_ID => Ok(SalePayload::Aborted(SaleAborted::deserialize(
                message.payload,
            )?)),
            AuthorityUpdated::PAYLOAD_ID => Ok(SalePayload::AuthorityUpdated(
                AuthorityUpdated::deserialize(message.payload)?,
            )),
            _ => CommonError::MalformedPayload.std_err(),
        }
    }
}

/// Amounts ride the wire as 32-byte words; anything that does not fit u128 is
/// out of range for every runtime this protocol targets.
pub fn read_amount(data: &[u8], index: usize) -> StdResult<Uint128> {
    let (high, low) = data.get_u256(index);
    if high > 0 {
        return CommonError::AmountTooLarge.std_err();
    }
    Ok(Uint128::new(low))
}

pub fn write_amount(amount: Uint128) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[16..32].copy_from_slice(&amount.u128().to_be_bytes());
    bytes
}

// Timestamps are encoded as u256 but only the low u64 carries time.
fn read_time(data: &[u8], index: usize) -> StdResult<u64> {
    let (high, low) = data.get_u256(index);
    if high > 0 || low > u64::MAX as u128 {
        return CommonError::AmountTooLarge.std_err();
    }
    Ok(low as u64)
}

fn write_time(time: u64) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    bytes[24..32].copy_from_slice(&time.to_be_bytes());
    bytes
}

impl AcceptedToken {
    // address 32 + chain 2 + conversion rate 16
    pub const N_BYTES: usize = 50;
    // index 1 + address 32
    pub const N_BYTES_SOLANA: usize = 33;

    fn deserialize(index: u8, data: &[u8]) -> StdResult<Self> {
        Ok(AcceptedToken {
            index,
            address: data.get_bytes32(0).to_vec(),
            chain: data.get_u16(32),
            conversion_rate: Uint128::new(data.get_u128_be(34)),
        })
    }

    /// Resolve a wire token address into a local asset. The flag byte `1`
    /// marks a native denom (right-aligned, zero-padded); anything else is a
    /// contract address.
    pub fn make_asset_info(api: &dyn Api, addr: &[u8]) -> StdResult<Denom> {
        if addr.len() != 32 {
            return CommonError::MalformedPayload.std_err();
        }
        match addr[0] {
            1u8 => {
                let denom: Vec<u8> = addr[1..32].iter().copied().filter(|b| *b != 0).collect();
                match String::from_utf8(denom) {
                    Ok(denom) if !denom.is_empty() => Ok(Denom::Native(denom)),
                    _ => CommonError::MalformedPayload.std_err(),
                }
            }
            _ => {
                let canonical = addr.get_address(0);
                Ok(Denom::Cw20(api.addr_humanize(&canonical)?))
            }
        }
    }
}

/// Wire form of a native denom: flag byte then the denom, right-aligned.
pub fn denom_to_wire(denom: &str) -> StdResult<Vec<u8>> {
    let bytes = denom.as_bytes();
    if bytes.is_empty() || bytes.len() > 31 {
        return CommonError::MalformedPayload.std_err();
    }
    let mut wire = vec![0u8; 32];
    wire[0] = 1;
    wire[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(wire)
}

impl SaleInit {
    pub const PAYLOAD_ID: u8 = 1;
    pub const PAYLOAD_ID_SOLANA: u8 = 5;

    const INDEX_ACCEPTED_TOKENS_START: usize = 260;
    const INDEX_ACCEPTED_TOKENS_START_SOLANA: usize = 164;

    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        if data.len() < Self::INDEX_ACCEPTED_TOKENS_START {
            return CommonError::MalformedPayload.std_err();
        }
        let num_accepted = data.get_u8(259) as usize;
        let expected = 344 + AcceptedToken::N_BYTES * num_accepted;
        if data.len() != expected {
            return CommonError::MalformedPayload.std_err();
        }

        let mut accepted_tokens = Vec::with_capacity(num_accepted);
        for i in 0..num_accepted {
            let start = Self::INDEX_ACCEPTED_TOKENS_START + AcceptedToken::N_BYTES * i;
            accepted_tokens.push(AcceptedToken::deserialize(
                i as u8,
                &data[start..start + AcceptedToken::N_BYTES],
            )?);
        }

        let tail = Self::INDEX_ACCEPTED_TOKENS_START + AcceptedToken::N_BYTES * num_accepted;
        Ok(SaleInit {
            core: SaleCore {
                id: data.get_bytes32(0).to_vec(),
                token_address: data.get_bytes32(32).to_vec(),
                token_chain: data.get_u16(64),
                token_decimals: data.get_u8(66),
                token_amount: read_amount(data, 67)?,
                min_raise: read_amount(data, 99)?,
                max_raise: read_amount(data, 131)?,
                times: SaleTimes {
                    start: read_time(data, 163)?,
                    end: read_time(data, 195)?,
                    unlock: read_time(data, 227)?,
                },
                recipient: data.get_bytes32(tail).to_vec(),
                refund_recipient: data.get_bytes32(tail + 32).to_vec(),
                kyc_authority: data.get_bytes(tail + 64, 20).to_vec(),
                num_accepted: num_accepted as u8,
            },
            accepted_tokens,
            sale_token_custody: vec![0u8; 32],
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let core = &self.core;
        let tokens = &self.accepted_tokens;
        let mut serialized =
            Vec::with_capacity(1 + 344 + AcceptedToken::N_BYTES * tokens.len());
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(core.id.iter());
        serialized.extend(core.token_address.iter());
        serialized.extend(core.token_chain.to_be_bytes());
        serialized.push(core.token_decimals);
        serialized.extend(write_amount(core.token_amount));
        serialized.extend(write_amount(core.min_raise));
        serialized.extend(write_amount(core.max_raise));
        serialized.extend(write_time(core.times.start));
        serialized.extend(write_time(core.times.end));
        serialized.extend(write_time(core.times.unlock));
        serialized.push(tokens.len() as u8);
        for token in tokens {
            serialized.extend(token.address.iter());
            serialized.extend(token.chain.to_be_bytes());
            serialized.extend(token.conversion_rate.u128().to_be_bytes());
        }
        serialized.extend(core.recipient.iter());
        serialized.extend(core.refund_recipient.iter());
        serialized.extend(core.kyc_authority.iter());
        serialized
    }

    /// The tag-5 dialect carries only what a Solana contributor needs: no
    /// raise amounts, no conversion rates, no refund recipient, but the
    /// original token indices and the custody account.
    pub fn deserialize_solana(data: &[u8]) -> StdResult<Self> {
        if data.len() < Self::INDEX_ACCEPTED_TOKENS_START_SOLANA {
            return CommonError::MalformedPayload.std_err();
        }
        let num_accepted = data.get_u8(163) as usize;
        let expected = 248 + AcceptedToken::N_BYTES_SOLANA * num_accepted;
        if data.len() != expected {
            return CommonError::MalformedPayload.std_err();
        }

        let mut accepted_tokens = Vec::with_capacity(num_accepted);
        for i in 0..num_accepted {
            let start =
                Self::INDEX_ACCEPTED_TOKENS_START_SOLANA + AcceptedToken::N_BYTES_SOLANA * i;
            accepted_tokens.push(AcceptedToken {
                index: data.get_u8(start),
                chain: CHAIN_ID_SOLANA,
                address: data.get_bytes32(start + 1).to_vec(),
                conversion_rate: Uint128::zero(),
            });
        }

        let tail =
            Self::INDEX_ACCEPTED_TOKENS_START_SOLANA + AcceptedToken::N_BYTES_SOLANA * num_accepted;
        Ok(SaleInit {
            core: SaleCore {
                id: data.get_bytes32(0).to_vec(),
                token_address: data.get_bytes32(32).to_vec(),
                token_chain: data.get_u16(64),
                token_decimals: data.get_u8(66),
                token_amount: Uint128::zero(),
                min_raise: Uint128::zero(),
                max_raise: Uint128::zero(),
                times: SaleTimes {
                    start: read_time(data, 67)?,
                    end: read_time(data, 99)?,
                    unlock: read_time(data, 131)?,
                },
                recipient: data.get_bytes32(tail).to_vec(),
                refund_recipient: vec![0u8; 32],
                kyc_authority: data.get_bytes(tail + 32, 20).to_vec(),
                num_accepted: num_accepted as u8,
            },
            accepted_tokens,
            sale_token_custody: data.get_bytes32(tail + 52).to_vec(),
        })
    }

    pub fn serialize_solana(&self) -> Vec<u8> {
        let core = &self.core;
        let tokens: Vec<&AcceptedToken> = self
            .accepted_tokens
            .iter()
            .filter(|t| t.chain == CHAIN_ID_SOLANA)
            .collect();
        let mut serialized =
            Vec::with_capacity(1 + 248 + AcceptedToken::N_BYTES_SOLANA * tokens.len());
        serialized.push(Self::PAYLOAD_ID_SOLANA);
        serialized.extend(core.id.iter());
        serialized.extend(core.token_address.iter());
        serialized.extend(core.token_chain.to_be_bytes());
        serialized.push(core.token_decimals);
        serialized.extend(write_time(core.times.start));
        serialized.extend(write_time(core.times.end));
        serialized.extend(write_time(core.times.unlock));
        serialized.push(tokens.len() as u8);
        for token in tokens {
            serialized.push(token.index);
            serialized.extend(token.address.iter());
        }
        serialized.extend(core.recipient.iter());
        serialized.extend(core.kyc_authority.iter());
        serialized.extend(self.sale_token_custody.iter());
        serialized
    }
}

impl ContributionsAttested {
    pub const PAYLOAD_ID: u8 = 2;
    // sale id + chain id + count, excluding the tag
    pub const HEADER_LEN: usize = 35;

    pub fn new(sale_id: &[u8], chain_id: u16, capacity: usize) -> Self {
        ContributionsAttested {
            sale_id: sale_id.to_vec(),
            chain_id,
            contributions: Vec::with_capacity(capacity),
        }
    }

    pub fn add_contribution(&mut self, token_index: u8, amount: Uint128) -> StdResult<()> {
        let contributions = &mut self.contributions;
        if contributions.iter().any(|c| c.token_index == token_index) {
            return CommonError::MalformedPayload.std_err();
        }
        contributions.push(Contribution {
            token_index,
            amount,
        });
        Ok(())
    }

    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        if data.len() < Self::HEADER_LEN {
            return CommonError::MalformedPayload.std_err();
        }
        let num = data.get_u8(34) as usize;
        if data.len() != Self::HEADER_LEN + 33 * num {
            return CommonError::MalformedPayload.std_err();
        }

        let mut contributions = Vec::with_capacity(num);
        for i in 0..num {
            let start = Self::HEADER_LEN + 33 * i;
            contributions.push(Contribution {
                token_index: data.get_u8(start),
                amount: read_amount(data, start + 1)?,
            });
        }

        Ok(ContributionsAttested {
            sale_id: data.get_bytes32(0).to_vec(),
            chain_id: data.get_u16(32),
            contributions,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let contributions = &self.contributions;
        let mut serialized =
            Vec::with_capacity(1 + Self::HEADER_LEN + 33 * contributions.len());
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id.iter());
        serialized.extend(self.chain_id.to_be_bytes());
        serialized.push(contributions.len() as u8);
        for contribution in contributions {
            serialized.push(contribution.token_index);
            serialized.extend(write_amount(contribution.amount));
        }
        serialized
    }
}

impl SaleSealed {
    pub const PAYLOAD_ID: u8 = 3;
    // sale id + count, excluding the tag
    pub const HEADER_LEN: usize = 33;

    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        if data.len() < Self::HEADER_LEN {
            return CommonError::MalformedPayload.std_err();
        }
        let num = data.get_u8(32) as usize;
        if data.len() != Self::HEADER_LEN + 65 * num {
            return CommonError::MalformedPayload.std_err();
        }

        let mut allocations = Vec::with_capacity(num);
        for i in 0..num {
            let start = Self::HEADER_LEN + 65 * i;
            allocations.push(Allocation {
                token_index: data.get_u8(start),
                allocated: read_amount(data, start + 1)?,
                excess_contributed: read_amount(data, start + 33)?,
            });
        }

        Ok(SaleSealed {
            sale_id: data.get_bytes32(0).to_vec(),
            allocations,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let allocations = &self.allocations;
        let mut serialized =
            Vec::with_capacity(1 + Self::HEADER_LEN + 65 * allocations.len());
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id.iter());
        serialized.push(allocations.len() as u8);
        for allocation in allocations {
            serialized.push(allocation.token_index);
            serialized.extend(write_amount(allocation.allocated));
            serialized.extend(write_amount(allocation.excess_contributed));
        }
        serialized
    }
}

impl SaleAborted {
    pub const PAYLOAD_ID: u8 = 4;

    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        if data.len() != 32 {
            return CommonError::MalformedPayload.std_err();
        }
        Ok(SaleAborted {
            sale_id: data.get_bytes32(0).to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut serialized = Vec::with_capacity(33);
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id.iter());
        serialized
    }
}

impl AuthorityUpdated {
    pub const PAYLOAD_ID: u8 = 6;

    pub fn deserialize(data: &[u8]) -> StdResult<Self> {
        if data.len() != 52 {
            return CommonError::MalformedPayload.std_err();
        }
        Ok(AuthorityUpdated {
            sale_id: data.get_bytes32(0).to_vec(),
            new_authority: data.get_bytes(32, 20).to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut serialized = Vec::with_capacity(53);
        serialized.push(Self::PAYLOAD_ID);
        serialized.extend(self.sale_id.iter());
        serialized.extend(self.new_authority.iter());
        serialized
    }
}
