use cosmwasm_std::{
    coins, to_binary, Addr, BankMsg, Binary, CosmosMsg, Deps, DepsMut, Env, MessageInfo, Order,
    QueryRequest, Response, StdResult, Uint128, WasmMsg, WasmQuery,
};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, Denom};

use icco::{
    common::{AcceptedToken, ContributionsAttested, SalePayload, SaleStatus, CHAIN_ID},
    cryptography::{kyc_digest, verify_kyc_signature},
    settlement::pro_rata_share,
    vaa::ParsedVAA,
    wormhole::{
        TokenBridgeExecuteMsg, TokenBridgeQueryMsg, TransferAsset, WormholeExecuteMsg,
        WormholeQueryMsg, WrappedRegistryResponse,
    },
};

use crate::{
    error::ContributorError,
    state::{
        allocation_is_claimed, load_accepted_token, load_sale_status, load_total_allocation,
        load_total_contribution, load_total_excess, refund_is_claimed, update_buyer_contribution,
        BuyerStatus, ACCEPTED_ASSETS, ACCEPTED_TOKENS, BUYER_STATUSES, CONFIG, DISABLED_TOKENS,
        SALES, SALE_ATTESTED, SALE_STATUSES, SALE_TIMES, SALE_TOKEN_ASSETS,
        TOTAL_ALLOCATIONS, TOTAL_CONTRIBUTIONS, TOTAL_EXCESS_CONTRIBUTIONS, VAA_ARCHIVE,
    },
};

// nonce means nothing for single-shot messages
const WORMHOLE_NONCE: u32 = 0;

pub fn init_sale(deps: DepsMut, env: Env, _info: MessageInfo, vaa: &Binary) -> StdResult<Response> {
    let parsed = parse_vaa(deps.as_ref(), env.block.time.seconds(), vaa)?;
    verify_conductor(
        deps.as_ref(),
        parsed.emitter_chain,
        parsed.emitter_address.as_slice(),
    )?;
    if VAA_ARCHIVE.has(deps.storage, parsed.hash.as_slice()) {
        return ContributorError::VaaAlreadyExecuted.std_err();
    }

    let sale_init = match SalePayload::deserialize(parsed.payload.as_slice())? {
        SalePayload::Init(sale_init) => sale_init,
        _ => return ContributorError::InvalidVaaAction.std_err(),
    };
    let sale_id = sale_init.core.id.as_slice();

    if SALES.may_load(deps.storage, sale_id)? != None {
        return ContributorError::SaleAlreadyExists.std_err();
    }

    for token in sale_init.accepted_tokens.iter() {
        let key = (sale_id, token.index);
        if token.chain == CHAIN_ID {
            // resolve and probe the asset so a bogus address fails the whole
            // sale up front instead of at the first contribution
            let asset_info = AcceptedToken::make_asset_info(deps.api, token.address.as_slice())?;
            match asset_info.clone() {
                Denom::Native(denom) => {
                    if deps
                        .querier
                        .query_balance(env.contract.address.clone(), denom)
                        .is_err()
                    {
                        return ContributorError::NonexistentDenom.std_err();
                    }
                }
                Denom::Cw20(contract_addr) => {
                    if query_token_balance(deps.as_ref(), &contract_addr, &env.contract.address)
                        .is_err()
                    {
                        return ContributorError::NonexistentToken.std_err();
                    }
                }
            }
            ACCEPTED_ASSETS.save(deps.storage, key, &asset_info)?;
        }

        ACCEPTED_TOKENS.save(deps.storage, key, token)?;
        DISABLED_TOKENS.save(deps.storage, key, &false)?;
        TOTAL_CONTRIBUTIONS.save(deps.storage, key, &Uint128::zero())?;
    }

    SALES.save(deps.storage, sale_id, &sale_init.core)?;
    SALE_STATUSES.save(deps.storage, sale_id, &SaleStatus::Active)?;
    SALE_TIMES.save(deps.storage, sale_id, &sale_init.core.times)?;
    VAA_ARCHIVE.save(deps.storage, parsed.hash.as_slice(), &true)?;

    let sale = &sale_init.core;
    Ok(Response::new()
        .add_attribute("action", "init_sale")
        .add_attribute("sale_id", hex::encode(&sale.id))
        .add_attribute("token_chain", sale.token_chain.to_string())
        .add_attribute("token_address", hex::encode(&sale.token_address)))
}

#[allow(clippy::too_many_arguments)]
pub fn contribute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
    amount: Uint128,
    kyc_signature: Option<Binary>,
) -> StdResult<Response> {
    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        // an early abort kills the window even if the local clock says open
        _ => return ContributorError::SaleEnded.std_err(),
    }

    let times = SALE_TIMES.load(deps.storage, sale_id)?;
    let now = env.block.time.seconds();
    if now < times.start {
        return ContributorError::ContributionTooEarly.std_err();
    }
    if now >= times.end {
        return ContributorError::SaleEnded.std_err();
    }

    let token = load_accepted_token(deps.storage, sale_id, token_index)?;
    if token.chain != CHAIN_ID {
        return ContributorError::WrongChain.std_err();
    }
    if DISABLED_TOKENS
        .may_load(deps.storage, (sale_id, token_index))?
        .unwrap_or_default()
    {
        return ContributorError::DisabledToken.std_err();
    }
    if amount.is_zero() {
        return ContributorError::ZeroAmount.std_err();
    }

    let sale = SALES.load(deps.storage, sale_id)?;
    if sale.kyc_authority.iter().any(|b| *b != 0) {
        let prior = match BUYER_STATUSES
            .may_load(deps.storage, (sale_id, token_index, &info.sender))?
        {
            Some(BuyerStatus::Active { contribution }) => contribution,
            _ => Uint128::zero(),
        };
        let signature = match kyc_signature {
            Some(signature) => signature,
            None => return ContributorError::InvalidKycSignature.std_err(),
        };
        let digest = kyc_digest(sale_id, token_index, amount, info.sender.as_str(), prior);
        verify_kyc_signature(sale.kyc_authority.as_slice(), signature.as_slice(), &digest)
            .or_else(|_| ContributorError::InvalidKycSignature.std_err())?;
    }

    let asset_info = ACCEPTED_ASSETS.load(deps.storage, (sale_id, token_index))?;
    let mut response = Response::new();
    match asset_info {
        Denom::Native(denom) => {
            // the full contribution must ride along with the transaction
            let funded = info
                .funds
                .iter()
                .find(|c| c.denom == denom)
                .map(|c| c.amount)
                .unwrap_or_default();
            if funded != amount {
                return ContributorError::IncorrectFunds.std_err();
            }
            response = response.add_attribute("denom", denom);
        }
        Denom::Cw20(contract_addr) => {
            response = response
                .add_message(CosmosMsg::Wasm(WasmMsg::Execute {
                    contract_addr: contract_addr.to_string(),
                    funds: vec![],
                    msg: to_binary(&Cw20ExecuteMsg::TransferFrom {
                        owner: info.sender.to_string(),
                        recipient: env.contract.address.to_string(),
                        amount,
                    })?,
                }))
                .add_attribute("contract_addr", contract_addr.to_string());
        }
    }

    TOTAL_CONTRIBUTIONS.update(
        deps.storage,
        (sale_id, token_index),
        |total: Option<Uint128>| -> StdResult<Uint128> {
            match total {
                Some(total) => Ok(total.checked_add(amount)?),
                None => ContributorError::ContributionNotFound.std_err(),
            }
        },
    )?;
    update_buyer_contribution(deps.storage, (sale_id, token_index, &info.sender), amount)?;

    Ok(response
        .add_attribute("action", "contribute")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("amount", amount.to_string()))
}

pub fn attest_contributions(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    sale_id: &[u8],
) -> StdResult<Response> {
    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ContributorError::SaleEnded.std_err(),
    }
    if SALE_ATTESTED
        .may_load(deps.storage, sale_id)?
        .unwrap_or_default()
    {
        return ContributorError::SaleAlreadyAttested.std_err();
    }

    let times = SALE_TIMES.load(deps.storage, sale_id)?;
    if env.block.time.seconds() < times.end {
        return ContributorError::SaleNotAttestable.std_err();
    }

    let accepted_tokens: Vec<(u8, AcceptedToken)> = ACCEPTED_TOKENS
        .prefix(sale_id)
        .range(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    let mut attested =
        ContributionsAttested::new(sale_id, CHAIN_ID, accepted_tokens.len());
    for (token_index, token) in accepted_tokens.iter() {
        if token.chain == CHAIN_ID {
            let contributions = load_total_contribution(deps.storage, sale_id, *token_index)?;
            attested.add_contribution(*token_index, contributions)?;
        }
    }

    SALE_ATTESTED.save(deps.storage, sale_id, &true)?;

    let cfg = CONFIG.load(deps.storage)?;
    let wormhole_message = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: cfg.wormhole_contract,
        funds: vec![],
        msg: to_binary(&WormholeExecuteMsg::PostMessage {
            message: Binary::from(attested.serialize()),
            nonce: WORMHOLE_NONCE,
        })?,
    });

    Ok(Response::new()
        .add_attribute("action", "attest_contributions")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_message(wormhole_message))
}

pub fn sale_sealed(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    vaa: &Binary,
) -> StdResult<Response> {
    let parsed = parse_vaa(deps.as_ref(), env.block.time.seconds(), vaa)?;
    verify_conductor(
        deps.as_ref(),
        parsed.emitter_chain,
        parsed.emitter_address.as_slice(),
    )?;
    if VAA_ARCHIVE.has(deps.storage, parsed.hash.as_slice()) {
        return ContributorError::VaaAlreadyExecuted.std_err();
    }

    let sale_sealed = match SalePayload::deserialize(parsed.payload.as_slice())? {
        SalePayload::Sealed(sale_sealed) => sale_sealed,
        _ => return ContributorError::InvalidVaaAction.std_err(),
    };
    let sale_id = sale_sealed.sale_id.as_slice();

    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ContributorError::SaleEnded.std_err(),
    }

    let sale = SALES.load(deps.storage, sale_id)?;

    // the conductor must have bridged enough sale token into custody before
    // the seal can land here
    let sale_token = resolve_sale_token(deps.as_ref(), &env, &sale.token_address, sale.token_chain)?;
    let mut local_allocations = Uint128::zero();
    for allocation in sale_sealed.allocations.iter() {
        let token = load_accepted_token(deps.storage, sale_id, allocation.token_index)?;
        if token.chain == CHAIN_ID {
            local_allocations = local_allocations.checked_add(allocation.allocated)?;
        }
    }
    let custody = query_asset_balance(deps.as_ref(), &sale_token, &env.contract.address)?;
    if custody < local_allocations {
        return ContributorError::InsufficientFunds.std_err();
    }

    for allocation in sale_sealed.allocations.iter() {
        let key = (sale_id, allocation.token_index);
        TOTAL_ALLOCATIONS.save(deps.storage, key, &allocation.allocated)?;
        TOTAL_EXCESS_CONTRIBUTIONS.save(deps.storage, key, &allocation.excess_contributed)?;
    }

    SALE_TOKEN_ASSETS.save(deps.storage, sale_id, &sale_token)?;
    SALE_STATUSES.save(deps.storage, sale_id, &SaleStatus::Sealed)?;
    VAA_ARCHIVE.save(deps.storage, parsed.hash.as_slice(), &true)?;

    // collected contributions minus the buyers' excess head to the sale
    // recipient on the conductor chain
    let cfg = CONFIG.load(deps.storage)?;
    let mut response = Response::new();
    if cfg.conductor_chain != CHAIN_ID {
        for allocation in sale_sealed.allocations.iter() {
            let key = (sale_id, allocation.token_index);
            let token = load_accepted_token(deps.storage, sale_id, allocation.token_index)?;
            if token.chain != CHAIN_ID {
                continue;
            }
            let contributed = load_total_contribution(deps.storage, sale_id, allocation.token_index)?;
            let outbound = contributed.checked_sub(allocation.excess_contributed)?;
            if outbound.is_zero() {
                continue;
            }
            let denom = ACCEPTED_ASSETS.load(deps.storage, key)?;
            response = response.add_message(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: cfg.token_bridge_contract.clone(),
                funds: vec![],
                msg: to_binary(&TokenBridgeExecuteMsg::InitiateTransfer {
                    asset: TransferAsset {
                        denom,
                        amount: outbound,
                    },
                    recipient_chain: cfg.conductor_chain,
                    recipient: Binary::from(sale.recipient.clone()),
                    fee: Uint128::zero(),
                    nonce: WORMHOLE_NONCE,
                })?,
            }));
        }
    }

    Ok(response
        .add_attribute("action", "sale_sealed")
        .add_attribute("sale_id", hex::encode(sale_id)))
}

pub fn sale_aborted(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    vaa: &Binary,
) -> StdResult<Response> {
    let parsed = parse_vaa(deps.as_ref(), env.block.time.seconds(), vaa)?;
    verify_conductor(
        deps.as_ref(),
        parsed.emitter_chain,
        parsed.emitter_address.as_slice(),
    )?;
    if VAA_ARCHIVE.has(deps.storage, parsed.hash.as_slice()) {
        return ContributorError::VaaAlreadyExecuted.std_err();
    }

    let sale_aborted = match SalePayload::deserialize(parsed.payload.as_slice())? {
        SalePayload::Aborted(sale_aborted) => sale_aborted,
        _ => return ContributorError::InvalidVaaAction.std_err(),
    };
    let sale_id = sale_aborted.sale_id.as_slice();

    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ContributorError::SaleEnded.std_err(),
    }

    SALE_STATUSES.save(deps.storage, sale_id, &SaleStatus::Aborted)?;
    VAA_ARCHIVE.save(deps.storage, parsed.hash.as_slice(), &true)?;

    Ok(Response::new()
        .add_attribute("action", "sale_aborted")
        .add_attribute("sale_id", hex::encode(sale_id)))
}

pub fn update_sale_authority(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    vaa: &Binary,
) -> StdResult<Response> {
    let parsed = parse_vaa(deps.as_ref(), env.block.time.seconds(), vaa)?;
    verify_conductor(
        deps.as_ref(),
        parsed.emitter_chain,
        parsed.emitter_address.as_slice(),
    )?;
    if VAA_ARCHIVE.has(deps.storage, parsed.hash.as_slice()) {
        return ContributorError::VaaAlreadyExecuted.std_err();
    }

    let updated = match SalePayload::deserialize(parsed.payload.as_slice())? {
        SalePayload::AuthorityUpdated(updated) => updated,
        _ => return ContributorError::InvalidVaaAction.std_err(),
    };
    let sale_id = updated.sale_id.as_slice();

    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ContributorError::SaleEnded.std_err(),
    }

    let mut sale = SALES.load(deps.storage, sale_id)?;
    sale.kyc_authority = updated.new_authority.clone();
    SALES.save(deps.storage, sale_id, &sale)?;
    VAA_ARCHIVE.save(deps.storage, parsed.hash.as_slice(), &true)?;

    Ok(Response::new()
        .add_attribute("action", "update_sale_authority")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("new_authority", hex::encode(updated.new_authority)))
}

pub fn claim_allocation(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<Response> {
    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Sealed => {}
        SaleStatus::Active => return ContributorError::SaleNotFinished.std_err(),
        SaleStatus::Aborted => return ContributorError::SaleAborted.std_err(),
    }

    let token = load_accepted_token(deps.storage, sale_id, token_index)?;
    if token.chain != CHAIN_ID {
        return ContributorError::WrongChain.std_err();
    }

    let contribution = match BUYER_STATUSES
        .may_load(deps.storage, (sale_id, token_index, &info.sender))?
    {
        Some(BuyerStatus::Active { contribution }) => contribution,
        Some(_) => return ContributorError::AlreadyClaimed.std_err(),
        None => return ContributorError::NonexistentBuyer.std_err(),
    };

    let total_contribution = load_total_contribution(deps.storage, sale_id, token_index)?;
    let total_allocation = load_total_allocation(deps.storage, sale_id, token_index)?;
    let total_excess = load_total_excess(deps.storage, sale_id, token_index)?;

    let allocation = pro_rata_share(total_allocation, contribution, total_contribution)?;
    let excess = pro_rata_share(total_excess, contribution, total_contribution)?;

    allocation_is_claimed(
        deps.storage,
        (sale_id, token_index, &info.sender),
        allocation,
        excess,
    )?;

    let mut response = Response::new();
    if !allocation.is_zero() {
        let sale_token = SALE_TOKEN_ASSETS.load(deps.storage, sale_id)?;
        response = response.add_message(send_asset(&sale_token, allocation, &info.sender)?);
    }
    if !excess.is_zero() {
        let contributed_asset = ACCEPTED_ASSETS.load(deps.storage, (sale_id, token_index))?;
        response = response.add_message(send_asset(&contributed_asset, excess, &info.sender)?);
    }

    Ok(response
        .add_attribute("action", "claim_allocation")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("allocation", allocation.to_string())
        .add_attribute("excess", excess.to_string()))
}

pub fn claim_refund(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
) -> StdResult<Response> {
    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Aborted => {}
        SaleStatus::Active => return ContributorError::SaleNotFinished.std_err(),
        SaleStatus::Sealed => return ContributorError::SaleNotAborted.std_err(),
    }

    let status = refund_is_claimed(deps.storage, (sale_id, token_index, &info.sender))?;
    let amount = match status {
        BuyerStatus::RefundIsClaimed { amount } => amount,
        _ => return ContributorError::NonexistentBuyer.std_err(),
    };

    let contributed_asset = ACCEPTED_ASSETS.load(deps.storage, (sale_id, token_index))?;

    Ok(Response::new()
        .add_message(send_asset(&contributed_asset, amount, &info.sender)?)
        .add_attribute("action", "claim_refund")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("amount", amount.to_string()))
}

pub fn disable_accepted_token(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    token_index: u8,
    disabled: bool,
) -> StdResult<Response> {
    let cfg = CONFIG.load(deps.storage)?;
    if info.sender.as_str() != cfg.owner {
        return ContributorError::Unauthorized.std_err();
    }

    // loading proves the token exists
    load_accepted_token(deps.storage, sale_id, token_index)?;
    DISABLED_TOKENS.save(deps.storage, (sale_id, token_index), &disabled)?;

    Ok(Response::new()
        .add_attribute("action", "disable_accepted_token")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("token_index", token_index.to_string())
        .add_attribute("disabled", disabled.to_string()))
}

fn verify_conductor(deps: Deps, emitter_chain: u16, emitter_address: &[u8]) -> StdResult<()> {
    let cfg = CONFIG.load(deps.storage)?;

    if cfg.conductor_chain != emitter_chain || !cfg.conductor_address.eq(emitter_address) {
        return ContributorError::InvalidConductor.std_err();
    }

    Ok(())
}

fn parse_vaa(deps: Deps, block_time: u64, data: &Binary) -> StdResult<ParsedVAA> {
    let cfg = CONFIG.load(deps.storage)?;
    let vaa: ParsedVAA = deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: cfg.wormhole_contract,
        msg: to_binary(&WormholeQueryMsg::VerifyVAA {
            vaa: data.clone(),
            block_time,
        })?,
    }))?;
    Ok(vaa)
}

/// Local asset of the sale token: a wrapped cw20 via the token bridge when
/// bridged, otherwise the wire address resolved directly.
fn resolve_sale_token(
    deps: Deps,
    _env: &Env,
    token_address: &[u8],
    token_chain: u16,
) -> StdResult<Denom> {
    if token_chain == CHAIN_ID {
        return AcceptedToken::make_asset_info(deps.api, token_address);
    }
    let cfg = CONFIG.load(deps.storage)?;
    let response: WrappedRegistryResponse =
        deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: cfg.token_bridge_contract,
            msg: to_binary(&TokenBridgeQueryMsg::WrappedRegistry {
                chain: token_chain,
                address: Binary::from(token_address),
            })?,
        }))?;
    Ok(Denom::Cw20(Addr::unchecked(response.address)))
}

fn query_token_balance(deps: Deps, contract_addr: &Addr, account: &Addr) -> StdResult<Uint128> {
    let response: BalanceResponse =
        deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: contract_addr.to_string(),
            msg: to_binary(&Cw20QueryMsg::Balance {
                address: account.to_string(),
            })?,
        }))?;
    Ok(response.balance)
}

fn query_asset_balance(deps: Deps, asset: &Denom, account: &Addr) -> StdResult<Uint128> {
    match asset {
        Denom::Native(denom) => Ok(deps
            .querier
            .query_balance(account.clone(), denom.clone())?
            .amount),
        Denom::Cw20(contract_addr) => query_token_balance(deps, contract_addr, account),
    }
}

fn send_asset(asset: &Denom, amount: Uint128, recipient: &Addr) -> StdResult<CosmosMsg> {
    match asset {
        Denom::Native(denom) => Ok(CosmosMsg::Bank(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: coins(amount.u128(), denom),
        })),
        Denom::Cw20(contract_addr) => Ok(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: contract_addr.to_string(),
            funds: vec![],
            msg: to_binary(&Cw20ExecuteMsg::Transfer {
                recipient: recipient.to_string(),
                amount,
            })?,
        })),
    }
}
