use cosmwasm_std::{Binary, Deps, StdResult, Uint128};

use icco::common::write_amount;

use crate::{
    error::ConductorError,
    msg::{
        AcceptedTokenResponse, AllocationResponse, ConfigResponse, ContributorResponse,
        NextSaleIdResponse, SaleResponse, SaleStatusResponse, TotalContributionResponse,
    },
    state::{
        load_accepted_token, load_sale, load_sale_status, ALLOCATIONS, CONFIG,
        CONTRIBUTIONS_COLLECTED, CONTRIBUTOR_EMITTERS, NEXT_SALE_ID, SALE_TOKEN_REFUNDS,
        TOTAL_CONTRIBUTIONS,
    },
};

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    match CONFIG.load(deps.storage) {
        Ok(cfg) => Ok(ConfigResponse {
            wormhole_contract: cfg.wormhole_contract,
            token_bridge_contract: cfg.token_bridge_contract,
            owner: cfg.owner,
        }),
        Err(_) => ConductorError::NotInitialized.std_err(),
    }
}

pub fn query_next_sale_id(deps: Deps) -> StdResult<NextSaleIdResponse> {
    let current = NEXT_SALE_ID.may_load(deps.storage)?.unwrap_or_default();
    Ok(NextSaleIdResponse {
        id: write_amount(current).to_vec(),
    })
}

pub fn query_sale(deps: Deps, sale_id: &Binary) -> StdResult<SaleResponse> {
    let sale = load_sale(deps.storage, sale_id.as_slice())?;
    Ok(SaleResponse {
        id: sale.id,
        token_address: sale.token_address,
        token_chain: sale.token_chain,
        token_decimals: sale.token_decimals,
        token_amount: sale.token_amount,
        min_raise: sale.min_raise,
        max_raise: sale.max_raise,
        times: sale.times,
        recipient: sale.recipient,
        refund_recipient: sale.refund_recipient,
        kyc_authority: sale.kyc_authority,
        num_accepted: sale.num_accepted,
    })
}

pub fn query_sale_status(deps: Deps, sale_id: &Binary) -> StdResult<SaleStatusResponse> {
    let sale_id = sale_id.as_slice();
    let status = load_sale_status(deps.storage, sale_id)?;
    Ok(SaleStatusResponse {
        id: sale_id.to_vec(),
        status,
    })
}

pub fn query_accepted_token(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<AcceptedTokenResponse> {
    let sale_id = sale_id.as_slice();
    let token = load_accepted_token(deps.storage, sale_id, token_index)?;
    let collected = CONTRIBUTIONS_COLLECTED
        .may_load(deps.storage, (sale_id, token_index))?
        .unwrap_or_default();
    Ok(AcceptedTokenResponse {
        id: sale_id.to_vec(),
        token_index,
        chain: token.chain,
        address: token.address,
        conversion_rate: token.conversion_rate,
        collected,
    })
}

pub fn query_total_contribution(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<TotalContributionResponse> {
    let sale_id = sale_id.as_slice();
    let amount = TOTAL_CONTRIBUTIONS
        .may_load(deps.storage, (sale_id, token_index))?
        .unwrap_or_else(Uint128::zero);
    Ok(TotalContributionResponse {
        id: sale_id.to_vec(),
        token_index,
        amount,
    })
}

pub fn query_allocation(
    deps: Deps,
    sale_id: &Binary,
    token_index: u8,
) -> StdResult<AllocationResponse> {
    let sale_id = sale_id.as_slice();
    match ALLOCATIONS.may_load(deps.storage, (sale_id, token_index))? {
        Some(allocation) => Ok(AllocationResponse {
            id: sale_id.to_vec(),
            token_index,
            allocated: allocation.allocated,
            excess_contributed: allocation.excess_contributed,
            token_refund: SALE_TOKEN_REFUNDS
                .may_load(deps.storage, sale_id)?
                .unwrap_or_else(Uint128::zero),
        }),
        None => ConductorError::SaleNotFinished.std_err(),
    }
}

pub fn query_contributor(deps: Deps, chain: u16) -> StdResult<ContributorResponse> {
    match CONTRIBUTOR_EMITTERS.may_load(deps.storage, chain)? {
        Some(address) => Ok(ContributorResponse { chain, address }),
        None => ConductorError::ContributorNotRegistered.std_err(),
    }
}
