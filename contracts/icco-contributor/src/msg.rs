use cosmwasm_std::{Binary, Uint128};
use cw20::Denom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::common::{SaleStatus, SaleTimes};

use crate::state::BuyerStatus;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub wormhole_contract: String,
    pub token_bridge_contract: String,

    pub conductor_chain: u16,
    pub conductor_address: Binary,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    InitSale {
        data: Binary,
    },

    Contribute {
        sale_id: Binary,
        token_index: u8,
        amount: Uint128,
        kyc_signature: Option<Binary>,
    },

    AttestContributions {
        sale_id: Binary,
    },

    SaleSealed {
        data: Binary,
    },

    SaleAborted {
        data: Binary,
    },

    UpdateSaleAuthority {
        data: Binary,
    },

    ClaimAllocation {
        sale_id: Binary,
        token_index: u8,
    },

    ClaimRefund {
        sale_id: Binary,
        token_index: u8,
    },

    DisableAcceptedToken {
        sale_id: Binary,
        token_index: u8,
        disabled: bool,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct MigrateMsg {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Config {},

    Sale {
        sale_id: Binary,
    },

    SaleStatus {
        sale_id: Binary,
    },

    SaleTimes {
        sale_id: Binary,
    },

    AcceptedToken {
        sale_id: Binary,
        token_index: u8,
    },

    TotalContribution {
        sale_id: Binary,
        token_index: u8,
    },

    TotalAllocation {
        sale_id: Binary,
        token_index: u8,
    },

    TotalExcessContribution {
        sale_id: Binary,
        token_index: u8,
    },

    BuyerStatus {
        sale_id: Binary,
        token_index: u8,
        buyer: String,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ConfigResponse {
    pub conductor_chain: u16,
    pub conductor_address: Vec<u8>,
    pub owner: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SaleResponse {
    pub id: Vec<u8>,
    pub token_address: Vec<u8>,
    pub token_chain: u16,
    pub token_decimals: u8,
    pub token_amount: Uint128,
    pub min_raise: Uint128,
    pub max_raise: Uint128,
    pub sale_start: u64,
    pub sale_end: u64,
    pub unlock_timestamp: u64,
    pub recipient: Vec<u8>,
    pub refund_recipient: Vec<u8>,
    pub kyc_authority: Vec<u8>,
    pub num_accepted: u8,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SaleStatusResponse {
    pub id: Vec<u8>,
    pub status: SaleStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SaleTimesResponse {
    pub id: Vec<u8>,
    pub times: SaleTimes,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct AcceptedTokenResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub chain: u16,
    pub address: Vec<u8>,
    pub conversion_rate: Uint128,
    pub disabled: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct TotalContributionResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct TotalAllocationResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct TotalExcessContributionResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct BuyerStatusResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub buyer: String,
    pub asset_info: Denom,
    pub status: BuyerStatus,
}
