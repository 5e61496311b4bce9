use cosmwasm_std::{Addr, StdResult, Storage, Uint128};
use cw20::Denom;
use cw_storage_plus::{Item, Map};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::common::{AcceptedToken, SaleCore, SaleStatus, SaleTimes};

use crate::error::ContributorError;

// per sale_id and token_index, we need to track a buyer's contribution, as
// well as whether he has been refunded or his allocation has been claimed

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub enum BuyerStatus {
    Active {
        contribution: Uint128,
    },
    AllocationIsClaimed {
        allocation: Uint128,
        excess: Uint128,
    },
    RefundIsClaimed {
        amount: Uint128,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    pub wormhole_contract: String,
    pub token_bridge_contract: String,
    pub conductor_chain: u16,
    pub conductor_address: Vec<u8>,
    pub owner: String,
}

pub type SaleId<'a> = &'a [u8];
pub type TokenIndexKey<'a> = (SaleId<'a>, u8);
pub type BuyerTokenIndexKey<'a> = (SaleId<'a>, u8, &'a Addr);

pub const CONFIG: Item<Config> = Item::new("config");
pub const SALES: Map<SaleId, SaleCore> = Map::new("sales");
pub const SALE_STATUSES: Map<SaleId, SaleStatus> = Map::new("sale_statuses");
pub const SALE_TIMES: Map<SaleId, SaleTimes> = Map::new("sale_times");
pub const SALE_ATTESTED: Map<SaleId, bool> = Map::new("sale_attested");
pub const SALE_TOKEN_ASSETS: Map<SaleId, Denom> = Map::new("sale_token_assets");
pub const ACCEPTED_TOKENS: Map<TokenIndexKey, AcceptedToken> = Map::new("accepted_tokens");
pub const ACCEPTED_ASSETS: Map<TokenIndexKey, Denom> = Map::new("accepted_assets");
pub const DISABLED_TOKENS: Map<TokenIndexKey, bool> = Map::new("disabled_tokens");
pub const TOTAL_CONTRIBUTIONS: Map<TokenIndexKey, Uint128> = Map::new("total_contributions");
pub const TOTAL_ALLOCATIONS: Map<TokenIndexKey, Uint128> = Map::new("total_allocations");
pub const TOTAL_EXCESS_CONTRIBUTIONS: Map<TokenIndexKey, Uint128> =
    Map::new("total_excess_contributions");

// applied VAAs by double-keccak hash
pub const VAA_ARCHIVE: Map<&[u8], bool> = Map::new("vaa_archive");

// per buyer
pub const BUYER_STATUSES: Map<BuyerTokenIndexKey, BuyerStatus> = Map::new("buyer_statuses");

pub fn load_sale_status(storage: &dyn Storage, sale_id: &[u8]) -> StdResult<SaleStatus> {
    match SALE_STATUSES.may_load(storage, sale_id)? {
        Some(status) => Ok(status),
        None => ContributorError::SaleNotFound.std_err(),
    }
}

pub fn load_accepted_token(
    storage: &dyn Storage,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<AcceptedToken> {
    match ACCEPTED_TOKENS.may_load(storage, (sale_id, token_index))? {
        Some(token) => Ok(token),
        None => ContributorError::AcceptedTokenNotFound.std_err(),
    }
}

pub fn load_total_contribution(
    storage: &dyn Storage,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<Uint128> {
    match TOTAL_CONTRIBUTIONS.may_load(storage, (sale_id, token_index))? {
        Some(amount) => Ok(amount),
        None => ContributorError::ContributionNotFound.std_err(),
    }
}

pub fn load_total_allocation(
    storage: &dyn Storage,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<Uint128> {
    match TOTAL_ALLOCATIONS.may_load(storage, (sale_id, token_index))? {
        Some(amount) => Ok(amount),
        None => ContributorError::AllocationNotFound.std_err(),
    }
}

pub fn load_total_excess(
    storage: &dyn Storage,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<Uint128> {
    match TOTAL_EXCESS_CONTRIBUTIONS.may_load(storage, (sale_id, token_index))? {
        Some(amount) => Ok(amount),
        None => ContributorError::AllocationNotFound.std_err(),
    }
}

pub fn update_buyer_contribution(
    storage: &mut dyn Storage,
    key: BuyerTokenIndexKey,
    amount: Uint128,
) -> StdResult<BuyerStatus> {
    BUYER_STATUSES.update(
        storage,
        key,
        |result: Option<BuyerStatus>| -> StdResult<BuyerStatus> {
            match result {
                Some(one) => match one {
                    BuyerStatus::Active { contribution } => Ok(BuyerStatus::Active {
                        contribution: contribution.checked_add(amount)?,
                    }),
                    _ => ContributorError::BuyerNotActive.std_err(),
                },
                None => Ok(BuyerStatus::Active {
                    contribution: amount,
                }),
            }
        },
    )
}

pub fn allocation_is_claimed(
    storage: &mut dyn Storage,
    key: BuyerTokenIndexKey,
    allocation: Uint128,
    excess: Uint128,
) -> StdResult<BuyerStatus> {
    BUYER_STATUSES.update(
        storage,
        key,
        |result: Option<BuyerStatus>| -> StdResult<BuyerStatus> {
            match result {
                Some(one) => match one {
                    BuyerStatus::Active { contribution: _ } => {
                        Ok(BuyerStatus::AllocationIsClaimed { allocation, excess })
                    }
                    _ => ContributorError::AlreadyClaimed.std_err(),
                },
                None => ContributorError::NonexistentBuyer.std_err(),
            }
        },
    )
}

pub fn refund_is_claimed(
    storage: &mut dyn Storage,
    key: BuyerTokenIndexKey,
) -> StdResult<BuyerStatus> {
    BUYER_STATUSES.update(
        storage,
        key,
        |result: Option<BuyerStatus>| -> StdResult<BuyerStatus> {
            match result {
                Some(one) => match one {
                    BuyerStatus::Active { contribution } => Ok(BuyerStatus::RefundIsClaimed {
                        amount: contribution,
                    }),
                    _ => ContributorError::AlreadyClaimed.std_err(),
                },
                None => ContributorError::NonexistentBuyer.std_err(),
            }
        },
    )
}
