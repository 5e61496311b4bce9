use cosmwasm_std::{Addr, Binary, Deps, StdResult};

use crate::{
    error::ContributorError,
    msg::{
        AcceptedTokenResponse, BuyerStatusResponse, ConfigResponse, SaleResponse,
        SaleStatusResponse, SaleTimesResponse, TotalAllocationResponse,
        TotalContributionResponse, TotalExcessContributionResponse,
    },
    state::{
        load_accepted_token, load_total_allocation, load_total_contribution, load_total_excess,
        ACCEPTED_ASSETS, BUYER_STATUSES, CONFIG, DISABLED_TOKENS, SALES, SALE_STATUSES,
        SALE_TIMES,
    },
};

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    match CONFIG.load(deps.storage) {
        Ok(cfg) => Ok(ConfigResponse {
            conductor_chain: cfg.conductor_chain,
            conductor_address: cfg.conductor_address,
            owner: cfg.owner,
        }),
        Err(_) => ContributorError::NotInitialized.std_err(),
    }
}

pub fn query_sale(deps: Deps, sale_id: &Binary) -> StdResult<SaleResponse> {
    match SALES.load(deps.storage, sale_id.as_slice()) {
        Ok(sale) => Ok(SaleResponse {
            id: sale.id,
            token_address: sale.token_address,
            token_chain: sale.token_chain,
            token_decimals: sale.token_decimals,
            token_amount: sale.token_amount,
            min_raise: sale.min_raise,
            max_raise: sale.max_raise,
            sale_start: sale.times.start,
            sale_end: sale.times.end,
            unlock_timestamp: sale.times.unlock,
            recipient: sale.recipient,
            refund_recipient: sale.refund_recipient,
            kyc_authority: sale.kyc_authority,
            num_accepted: sale.num_accepted,
        }),
        Err(_) => ContributorError::SaleNotFound.std_err(),
    }
}

pub fn query_sale_status(deps: Deps, sale_id: &Binary) -> StdResult<SaleStatusResponse> {
    let sale_id = sale_id.as_slice();
    match SALE_STATUSES.load(deps.storage, sale_id) {
        Ok(status) => Ok(SaleStatusResponse {
            id: sale_id.to_vec(),
            status,
        }),
        Err(_) => ContributorError::SaleStatusNotFound.std_err(),
    }
}

pub fn query_sale_times(deps: Deps, sale_id: &Binary) -> StdResult<SaleTimesResponse> {
    let sale_id = sale_id.as_slice();
    match SALE_TIMES.load(deps.storage, sale_id) {
        Ok(times) => Ok(SaleTimesResponse {
            id: sale_id.to_vec(),
            times,
        }),
        Err(_) => ContributorError::SaleTimesNotFound.std_err(),
    }
}

pub fn query_accepted_token(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<AcceptedTokenResponse> {
    let sale_id = sale_id.as_slice();
    let token = load_accepted_token(deps.storage, sale_id, token_index)?;
    let disabled = DISABLED_TOKENS
        .may_load(deps.storage, (sale_id, token_index))?
        .unwrap_or_default();
    Ok(AcceptedTokenResponse {
        id: sale_id.to_vec(),
        token_index,
        chain: token.chain,
        address: token.address,
        conversion_rate: token.conversion_rate,
        disabled,
    })
}

pub fn query_total_contribution(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<TotalContributionResponse> {
    let sale_id = sale_id.as_slice();
    let amount = load_total_contribution(deps.storage, sale_id, token_index)?;
    Ok(TotalContributionResponse {
        id: sale_id.to_vec(),
        token_index,
        amount,
    })
}

pub fn query_total_allocation(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<TotalAllocationResponse> {
    let sale_id = sale_id.as_slice();
    let amount = load_total_allocation(deps.storage, sale_id, token_index)?;
    Ok(TotalAllocationResponse {
        id: sale_id.to_vec(),
        token_index,
        amount,
    })
}

pub fn query_total_excess_contribution(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<TotalExcessContributionResponse> {
    let sale_id = sale_id.as_slice();
    let amount = load_total_excess(deps.storage, sale_id, token_index)?;
    Ok(TotalExcessContributionResponse {
        id: sale_id.to_vec(),
        token_index,
        amount,
    })
}

pub fn query_buyer_status(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
    buyer: String,
) -> StdResult<BuyerStatusResponse> {
    let sale_id = sale_id.as_slice();
    let buyer_addr = Addr::unchecked(buyer.as_str());
    let asset_info = ACCEPTED_ASSETS.load(deps.storage, (sale_id, token_index))?;
    match BUYER_STATUSES.load(deps.storage, (sale_id, token_index, &buyer_addr)) {
        Ok(status) => Ok(BuyerStatusResponse {
            id: sale_id.to_vec(),
            token_index,
            buyer,
            asset_info,
            status,
        }),
        Err(_) => ContributorError::NonexistentBuyer.std_err(),
    }
}
