use cosmwasm_std::{StdResult, Storage, Uint128};
use cw20::Denom;
use cw_storage_plus::{Item, Map};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::common::{AcceptedToken, Allocation, SaleCore, SaleStatus};

use crate::error::ConductorError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    pub wormhole_contract: String,
    pub token_bridge_contract: String,
    pub owner: String,
}

pub type SaleId<'a> = &'a [u8];
pub type TokenIndexKey<'a> = (SaleId<'a>, u8);

pub const CONFIG: Item<Config> = Item::new("config");

// monotonic; the next sale id is this counter rendered big-endian into
// 32 bytes
pub const NEXT_SALE_ID: Item<Uint128> = Item::new("next_sale_id");

pub const SALES: Map<SaleId, SaleCore> = Map::new("sales");
pub const SALE_STATUSES: Map<SaleId, SaleStatus> = Map::new("sale_statuses");
pub const SALE_TOKEN_ASSETS: Map<SaleId, Denom> = Map::new("sale_token_assets");
pub const ACCEPTED_TOKENS: Map<TokenIndexKey, AcceptedToken> = Map::new("accepted_tokens");
pub const TOTAL_CONTRIBUTIONS: Map<TokenIndexKey, Uint128> = Map::new("total_contributions");
pub const CONTRIBUTIONS_COLLECTED: Map<TokenIndexKey, bool> =
    Map::new("contributions_collected");
pub const ALLOCATIONS: Map<TokenIndexKey, Allocation> = Map::new("allocations");
pub const SALE_TOKEN_REFUNDS: Map<SaleId, Uint128> = Map::new("sale_token_refunds");
pub const REFUND_CLAIMED: Map<SaleId, bool> = Map::new("refund_claimed");

// chain id -> contributor emitter address (32 bytes)
pub const CONTRIBUTOR_EMITTERS: Map<u16, Vec<u8>> = Map::new("contributor_emitters");

// applied VAAs by double-keccak hash
pub const VAA_ARCHIVE: Map<&[u8], bool> = Map::new("vaa_archive");

pub fn load_sale(storage: &dyn Storage, sale_id: &[u8]) -> StdResult<SaleCore> {
    match SALES.may_load(storage, sale_id)? {
        Some(sale) => Ok(sale),
        None => ConductorError::SaleNotFound.std_err(),
    }
}

pub fn load_sale_status(storage: &dyn Storage, sale_id: &[u8]) -> StdResult<SaleStatus> {
    match SALE_STATUSES.may_load(storage, sale_id)? {
        Some(status) => Ok(status),
        None => ConductorError::SaleStatusNotFound.std_err(),
    }
}

pub fn load_accepted_token(
    storage: &dyn Storage,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<AcceptedToken> {
    match ACCEPTED_TOKENS.may_load(storage, (sale_id, token_index))? {
        Some(token) => Ok(token),
        None => ConductorError::AcceptedTokenNotFound.std_err(),
    }
}

pub fn next_sale_id(storage: &mut dyn Storage) -> StdResult<Vec<u8>> {
    let current = NEXT_SALE_ID.may_load(storage)?.unwrap_or_default();
    NEXT_SALE_ID.save(storage, &current.checked_add(Uint128::new(1))?)?;
    Ok(icco::common::write_amount(current).to_vec())
}
