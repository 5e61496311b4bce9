use cosmwasm_std::{Binary, Uint128};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use icco::common::{SaleStatus, SaleTimes};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub wormhole_contract: String,
    pub token_bridge_contract: String,
}

/// Seller-supplied sale parameters. Cross-chain identities are 32-byte wire
/// forms, the same shape they take in every payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RaiseParams {
    pub token_address: Binary,
    pub token_chain: u16,
    pub token_amount: Uint128,
    pub min_raise: Uint128,
    pub max_raise: Uint128,
    pub sale_start: u64,
    pub sale_end: u64,
    pub unlock_timestamp: u64,
    pub recipient: Binary,
    pub refund_recipient: Binary,
    pub kyc_authority: Binary,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct TokenParams {
    pub chain: u16,
    pub address: Binary,
    pub conversion_rate: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    CreateSale {
        raise: RaiseParams,
        accepted_tokens: Vec<TokenParams>,
    },

    RegisterContributor {
        chain: u16,
        address: Binary,
    },

    CollectContribution {
        data: Binary,
    },

    AbortSale {
        sale_id: Binary,
    },

    SealSale {
        sale_id: Binary,
    },

    ClaimRefund {
        sale_id: Binary,
    },

    UpdateSaleAuthority {
        sale_id: Binary,
        new_authority: Binary,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct MigrateMsg {}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    Config {},

    NextSaleId {},

    Sale {
        sale_id: Binary,
    },

    SaleStatus {
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

    Allocation {
        sale_id: Binary,
        token_index: u8,
    },

    Contributor {
        chain: u16,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ConfigResponse {
    pub wormhole_contract: String,
    pub token_bridge_contract: String,
    pub owner: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct NextSaleIdResponse {
    pub id: Vec<u8>,
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
    pub times: SaleTimes,
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
pub struct AcceptedTokenResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub chain: u16,
    pub address: Vec<u8>,
    pub conversion_rate: Uint128,
    pub collected: bool,
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
pub struct AllocationResponse {
    pub id: Vec<u8>,
    pub token_index: u8,
    pub allocated: Uint128,
    pub excess_contributed: Uint128,
    pub token_refund: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ContributorResponse {
    pub chain: u16,
    pub address: Vec<u8>,
}
