use cosmwasm_std::{
    entry_point, to_binary, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult,
};

use crate::{
    execute::{
        abort_sale, claim_refund, collect_contribution, create_sale, register_contributor,
        seal_sale, update_sale_authority,
    },
    msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg},
    query::{
        query_accepted_token, query_allocation, query_config, query_contributor,
        query_next_sale_id, query_sale, query_sale_status, query_total_contribution,
    },
    state::{Config, CONFIG},
};

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(_deps: DepsMut, _env: Env, _msg: MigrateMsg) -> StdResult<Response> {
    Ok(Response::new())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> StdResult<Response> {
    let cfg = Config {
        wormhole_contract: msg.wormhole_contract,
        token_bridge_contract: msg.token_bridge_contract,
        owner: info.sender.to_string(),
    };
    CONFIG.save(deps.storage, &cfg)?;

    Ok(Response::default())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> StdResult<Response> {
    match msg {
        ExecuteMsg::CreateSale {
            raise,
            accepted_tokens,
        } => create_sale(deps, env, info, raise, accepted_tokens),
        ExecuteMsg::RegisterContributor { chain, address } => {
            register_contributor(deps, env, info, chain, &address)
        }
        ExecuteMsg::CollectContribution { data } => collect_contribution(deps, env, info, &data),
        ExecuteMsg::AbortSale { sale_id } => abort_sale(deps, env, info, sale_id.as_slice()),
        ExecuteMsg::SealSale { sale_id } => seal_sale(deps, env, info, sale_id.as_slice()),
        ExecuteMsg::ClaimRefund { sale_id } => claim_refund(deps, env, info, sale_id.as_slice()),
        ExecuteMsg::UpdateSaleAuthority {
            sale_id,
            new_authority,
        } => update_sale_authority(deps, env, info, sale_id.as_slice(), &new_authority),
    }
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::NextSaleId {} => to_binary(&query_next_sale_id(deps)?),
        QueryMsg::Sale { sale_id } => to_binary(&query_sale(deps, &sale_id)?),
        QueryMsg::SaleStatus { sale_id } => to_binary(&query_sale_status(deps, &sale_id)?),
        QueryMsg::AcceptedToken {
            sale_id,
            token_index,
        } => to_binary(&query_accepted_token(deps, &sale_id, token_index)?),
        QueryMsg::TotalContribution {
            sale_id,
            token_index,
        } => to_binary(&query_total_contribution(deps, &sale_id, token_index)?),
        QueryMsg::Allocation {
            sale_id,
            token_index,
        } => to_binary(&query_allocation(deps, &sale_id, token_index)?),
        QueryMsg::Contributor { chain } => to_binary(&query_contributor(deps, chain)?),
    }
}
