use cosmwasm_std::{
    coins, to_binary, Addr, BankMsg, Binary, CosmosMsg, Deps, DepsMut, Env, MessageInfo,
    Order, QueryRequest, Response, StdResult, Uint128, WasmMsg, WasmQuery,
};
use cw20::{Cw20ExecuteMsg, Cw20QueryMsg, Denom, TokenInfoResponse};

use icco::{
    byte_utils::ByteUtils,
    common::{
        AcceptedToken, SaleAborted, SaleCore, SaleInit, SalePayload, SaleSealed, SaleStatus,
        SaleTimes, AuthorityUpdated, CHAIN_ID, CHAIN_ID_SOLANA,
    },
    settlement::{settle, total_raised, RaiseTerms, TokenTally},
    vaa::ParsedVAA,
    wormhole::{
        TokenBridgeExecuteMsg, TokenBridgeQueryMsg, TransferAsset, WormholeExecuteMsg,
        WormholeQueryMsg, WrappedRegistryResponse,
    },
};

use crate::{
    error::ConductorError,
    msg::{RaiseParams, TokenParams},
    state::{
        load_accepted_token, load_sale, load_sale_status, next_sale_id, ACCEPTED_TOKENS,
        ALLOCATIONS, CONFIG, CONTRIBUTIONS_COLLECTED, CONTRIBUTOR_EMITTERS, REFUND_CLAIMED,
        SALES, SALE_STATUSES, SALE_TOKEN_ASSETS, SALE_TOKEN_REFUNDS, TOTAL_CONTRIBUTIONS,
        VAA_ARCHIVE,
    },
};

const WORMHOLE_NONCE: u32 = 0;

const KYC_AUTHORITY_LEN: usize = 20;

pub fn create_sale(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    raise: RaiseParams,
    accepted_tokens: Vec<TokenParams>,
) -> StdResult<Response> {
    if accepted_tokens.is_empty() || accepted_tokens.len() > 255 {
        return ConductorError::InvalidAcceptedTokens.std_err();
    }
    for token in accepted_tokens.iter() {
        if token.address.len() != 32 || token.conversion_rate.is_zero() {
            return ConductorError::InvalidAcceptedTokens.std_err();
        }
    }

    if raise.token_address.len() != 32 {
        return ConductorError::InvalidRaiseParameters.std_err();
    }
    if raise.token_amount.is_zero() || raise.min_raise.is_zero() {
        return ConductorError::ZeroAmount.std_err();
    }
    let now = env.block.time.seconds();
    if raise.max_raise < raise.min_raise
        || raise.sale_end <= raise.sale_start
        || raise.sale_start < now
        || (raise.unlock_timestamp != 0 && raise.unlock_timestamp < raise.sale_end)
    {
        return ConductorError::InvalidRaiseParameters.std_err();
    }
    let kyc_authority: Vec<u8> = match raise.kyc_authority.len() {
        0 => vec![0u8; KYC_AUTHORITY_LEN],
        KYC_AUTHORITY_LEN => raise.kyc_authority.to_vec(),
        _ => return ConductorError::InvalidRaiseParameters.std_err(),
    };

    // the sale token must live here as a cw20, wrapped when it is bridged,
    // so the raise amount can be escrowed and later refunded
    let sale_token =
        resolve_sale_token(deps.as_ref(), raise.token_address.as_slice(), raise.token_chain)?;
    let sale_token_contract = match sale_token.clone() {
        Denom::Cw20(contract_addr) => contract_addr,
        Denom::Native(_) => return ConductorError::UnsupportedSaleToken.std_err(),
    };
    let token_info: TokenInfoResponse =
        deps.querier.query(&QueryRequest::Wasm(WasmQuery::Smart {
            contract_addr: sale_token_contract.to_string(),
            msg: to_binary(&Cw20QueryMsg::TokenInfo {})?,
        }))?;

    let sale_id = next_sale_id(deps.storage)?;

    let accepted: Vec<AcceptedToken> = accepted_tokens
        .iter()
        .enumerate()
        .map(|(i, token)| AcceptedToken {
            index: i as u8,
            chain: token.chain,
            address: token.address.to_vec(),
            conversion_rate: token.conversion_rate,
        })
        .collect();

    let sale = SaleCore {
        id: sale_id.clone(),
        token_address: raise.token_address.to_vec(),
        token_chain: raise.token_chain,
        token_decimals: token_info.decimals,
        token_amount: raise.token_amount,
        min_raise: raise.min_raise,
        max_raise: raise.max_raise,
        times: SaleTimes {
            start: raise.sale_start,
            end: raise.sale_end,
            unlock: raise.unlock_timestamp,
        },
        recipient: raise.recipient.to_vec(),
        refund_recipient: raise.refund_recipient.to_vec(),
        kyc_authority,
        num_accepted: accepted.len() as u8,
    };

    for token in accepted.iter() {
        let key = (sale_id.as_slice(), token.index);
        ACCEPTED_TOKENS.save(deps.storage, key, token)?;
        TOTAL_CONTRIBUTIONS.save(deps.storage, key, &Uint128::zero())?;
        CONTRIBUTIONS_COLLECTED.save(deps.storage, key, &false)?;
    }
    SALES.save(deps.storage, sale_id.as_slice(), &sale)?;
    SALE_STATUSES.save(deps.storage, sale_id.as_slice(), &SaleStatus::Active)?;
    SALE_TOKEN_ASSETS.save(deps.storage, sale_id.as_slice(), &sale_token)?;
    REFUND_CLAIMED.save(deps.storage, sale_id.as_slice(), &false)?;

    let sale_init = SaleInit {
        core: sale.clone(),
        accepted_tokens: accepted.clone(),
        sale_token_custody: vec![0u8; 32],
    };

    let cfg = CONFIG.load(deps.storage)?;
    let mut response = Response::new()
        // escrow the raise amount with this contract
        .add_message(CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: sale_token_contract.to_string(),
            funds: vec![],
            msg: to_binary(&Cw20ExecuteMsg::TransferFrom {
                owner: info.sender.to_string(),
                recipient: env.contract.address.to_string(),
                amount: raise.token_amount,
            })?,
        }))
        .add_message(post_message(&cfg, sale_init.serialize())?);

    // solana contributors speak their own dialect
    if accepted.iter().any(|t| t.chain == CHAIN_ID_SOLANA) {
        response = response.add_message(post_message(&cfg, sale_init.serialize_solana())?);
    }

    Ok(response
        .add_attribute("action", "create_sale")
        .add_attribute("sale_id", hex::encode(&sale_id))
        .add_attribute("token_chain", sale.token_chain.to_string())
        .add_attribute("token_address", hex::encode(&sale.token_address)))
}

pub fn register_contributor(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    chain: u16,
    address: &Binary,
) -> StdResult<Response> {
    let cfg = CONFIG.load(deps.storage)?;
    if info.sender.as_str() != cfg.owner {
        return ConductorError::Unauthorized.std_err();
    }
    if address.len() != 32 {
        return ConductorError::InvalidContributor.std_err();
    }
    if CONTRIBUTOR_EMITTERS.may_load(deps.storage, chain)? != None {
        return ConductorError::ContributorAlreadyRegistered.std_err();
    }
    CONTRIBUTOR_EMITTERS.save(deps.storage, chain, &address.to_vec())?;

    Ok(Response::new()
        .add_attribute("action", "register_contributor")
        .add_attribute("chain", chain.to_string())
        .add_attribute("address", hex::encode(address.as_slice())))
}

pub fn collect_contribution(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    vaa: &Binary,
) -> StdResult<Response> {
    let parsed = parse_vaa(deps.as_ref(), env.block.time.seconds(), vaa)?;
    verify_contributor(
        deps.as_ref(),
        parsed.emitter_chain,
        parsed.emitter_address.as_slice(),
    )?;
    if VAA_ARCHIVE.has(deps.storage, parsed.hash.as_slice()) {
        return ConductorError::VaaAlreadyExecuted.std_err();
    }

    let attested = match SalePayload::deserialize(parsed.payload.as_slice())? {
        SalePayload::Attest(attested) => attested,
        _ => return ConductorError::InvalidVaaAction.std_err(),
    };
    if attested.chain_id != parsed.emitter_chain {
        return ConductorError::InvalidContributor.std_err();
    }
    let sale_id = attested.sale_id.as_slice();

    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ConductorError::SaleEnded.std_err(),
    }
    let sale = load_sale(deps.storage, sale_id)?;
    if env.block.time.seconds() < sale.times.end {
        return ConductorError::SaleNotFinished.std_err();
    }

    for contribution in attested.contributions.iter() {
        let key = (sale_id, contribution.token_index);
        let token = load_accepted_token(deps.storage, sale_id, contribution.token_index)?;
        if token.chain != parsed.emitter_chain {
            return ConductorError::WrongChain.std_err();
        }
        if CONTRIBUTIONS_COLLECTED
            .may_load(deps.storage, key)?
            .unwrap_or_default()
        {
            return ConductorError::ContributionAlreadyCollected.std_err();
        }
        TOTAL_CONTRIBUTIONS.save(deps.storage, key, &contribution.amount)?;
        CONTRIBUTIONS_COLLECTED.save(deps.storage, key, &true)?;
    }

    VAA_ARCHIVE.save(deps.storage, parsed.hash.as_slice(), &true)?;

    Ok(Response::new()
        .add_attribute("action", "collect_contribution")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("emitter_chain", parsed.emitter_chain.to_string()))
}

pub fn abort_sale(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    sale_id: &[u8],
) -> StdResult<Response> {
    let cfg = CONFIG.load(deps.storage)?;
    if info.sender.as_str() != cfg.owner {
        return ConductorError::Unauthorized.std_err();
    }

    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ConductorError::SaleEnded.std_err(),
    }
    let sale = load_sale(deps.storage, sale_id)?;
    // only a sale that has not opened anywhere can be killed by fiat;
    // afterwards the raise outcome decides
    if env.block.time.seconds() >= sale.times.start {
        return ConductorError::SaleStarted.std_err();
    }

    SALE_STATUSES.save(deps.storage, sale_id, &SaleStatus::Aborted)?;

    let payload = SaleAborted {
        sale_id: sale_id.to_vec(),
    }
    .serialize();

    Ok(Response::new()
        .add_message(post_message(&cfg, payload)?)
        .add_attribute("action", "abort_sale")
        .add_attribute("sale_id", hex::encode(sale_id)))
}

pub fn seal_sale(deps: DepsMut, env: Env, _info: MessageInfo, sale_id: &[u8]) -> StdResult<Response> {
    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ConductorError::SaleEnded.std_err(),
    }
    let sale = load_sale(deps.storage, sale_id)?;
    if env.block.time.seconds() < sale.times.end {
        return ConductorError::SaleNotFinished.std_err();
    }

    let accepted_tokens: Vec<(u8, AcceptedToken)> = ACCEPTED_TOKENS
        .prefix(sale_id)
        .range(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    let mut tallies: Vec<TokenTally> = Vec::with_capacity(accepted_tokens.len());
    for (token_index, token) in accepted_tokens.iter() {
        if !CONTRIBUTIONS_COLLECTED
            .may_load(deps.storage, (sale_id, *token_index))?
            .unwrap_or_default()
        {
            return ConductorError::ContributionsNotCollected.std_err();
        }
        tallies.push(TokenTally {
            token_index: *token_index,
            chain: token.chain,
            conversion_rate: token.conversion_rate,
            contributed: TOTAL_CONTRIBUTIONS.load(deps.storage, (sale_id, *token_index))?,
        });
    }

    let cfg = CONFIG.load(deps.storage)?;

    // a raise below the floor dies here instead of sealing
    if total_raised(&tallies)? < sale.min_raise {
        SALE_STATUSES.save(deps.storage, sale_id, &SaleStatus::Aborted)?;
        let payload = SaleAborted {
            sale_id: sale_id.to_vec(),
        }
        .serialize();
        return Ok(Response::new()
            .add_message(post_message(&cfg, payload)?)
            .add_attribute("action", "seal_sale")
            .add_attribute("sale_id", hex::encode(sale_id))
            .add_attribute("aborted", "true"));
    }

    let terms = RaiseTerms {
        token_amount: sale.token_amount,
        min_raise: sale.min_raise,
        max_raise: sale.max_raise,
    };
    let settlement = settle(&terms, &tallies, sale.token_chain, sale.token_decimals)?;

    for allocation in settlement.allocations.iter() {
        ALLOCATIONS.save(deps.storage, (sale_id, allocation.token_index), allocation)?;
    }
    SALE_TOKEN_REFUNDS.save(deps.storage, sale_id, &settlement.token_refund)?;
    SALE_STATUSES.save(deps.storage, sale_id, &SaleStatus::Sealed)?;

    let payload = SaleSealed {
        sale_id: sale_id.to_vec(),
        allocations: settlement.allocations.clone(),
    }
    .serialize();
    let mut response = Response::new().add_message(post_message(&cfg, payload)?);

    // move every nonzero allocation into the custody of the contributor
    // that sold against it
    let sale_token = SALE_TOKEN_ASSETS.load(deps.storage, sale_id)?;
    for (allocation, (_, token)) in settlement.allocations.iter().zip(accepted_tokens.iter()) {
        if allocation.allocated.is_zero() {
            continue;
        }
        let emitter = match CONTRIBUTOR_EMITTERS.may_load(deps.storage, token.chain)? {
            Some(emitter) => emitter,
            None => return ConductorError::ContributorNotRegistered.std_err(),
        };
        if token.chain == CHAIN_ID {
            let contributor = deps
                .api
                .addr_humanize(&emitter.as_slice().get_address(0))?;
            response =
                response.add_message(send_asset(&sale_token, allocation.allocated, &contributor)?);
        } else {
            response = response.add_message(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: cfg.token_bridge_contract.clone(),
                funds: vec![],
                msg: to_binary(&TokenBridgeExecuteMsg::InitiateTransfer {
                    asset: TransferAsset {
                        denom: sale_token.clone(),
                        amount: allocation.allocated,
                    },
                    recipient_chain: token.chain,
                    recipient: Binary::from(emitter),
                    fee: Uint128::zero(),
                    nonce: WORMHOLE_NONCE,
                })?,
            }));
        }
    }

    Ok(response
        .add_attribute("action", "seal_sale")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("total_raised", settlement.total_raised.to_string())
        .add_attribute("token_refund", settlement.token_refund.to_string()))
}

pub fn claim_refund(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    sale_id: &[u8],
) -> StdResult<Response> {
    let sale = load_sale(deps.storage, sale_id)?;
    let amount = match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Aborted => sale.token_amount,
        SaleStatus::Sealed => SALE_TOKEN_REFUNDS.load(deps.storage, sale_id)?,
        SaleStatus::Active => return ConductorError::SaleNotFinished.std_err(),
    };
    if amount.is_zero() {
        return ConductorError::ZeroAmount.std_err();
    }

    if REFUND_CLAIMED
        .may_load(deps.storage, sale_id)?
        .unwrap_or_default()
    {
        return ConductorError::AlreadyClaimed.std_err();
    }
    REFUND_CLAIMED.save(deps.storage, sale_id, &true)?;

    let cfg = CONFIG.load(deps.storage)?;
    let sale_token = SALE_TOKEN_ASSETS.load(deps.storage, sale_id)?;
    let message = if sale.token_chain == CHAIN_ID {
        let recipient = deps
            .api
            .addr_humanize(&sale.refund_recipient.as_slice().get_address(0))?;
        send_asset(&sale_token, amount, &recipient)?
    } else {
        // the refund recipient lives with the sale token on its origin chain
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: cfg.token_bridge_contract,
            funds: vec![],
            msg: to_binary(&TokenBridgeExecuteMsg::InitiateTransfer {
                asset: TransferAsset {
                    denom: sale_token,
                    amount,
                },
                recipient_chain: sale.token_chain,
                recipient: Binary::from(sale.refund_recipient.clone()),
                fee: Uint128::zero(),
                nonce: WORMHOLE_NONCE,
            })?,
        })
    };

    Ok(Response::new()
        .add_message(message)
        .add_attribute("action", "claim_refund")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("amount", amount.to_string()))
}

pub fn update_sale_authority(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    sale_id: &[u8],
    new_authority: &Binary,
) -> StdResult<Response> {
    let cfg = CONFIG.load(deps.storage)?;
    if info.sender.as_str() != cfg.owner {
        return ConductorError::Unauthorized.std_err();
    }
    if new_authority.len() != KYC_AUTHORITY_LEN {
        return ConductorError::InvalidRaiseParameters.std_err();
    }

    match load_sale_status(deps.storage, sale_id)? {
        SaleStatus::Active => {}
        _ => return ConductorError::SaleEnded.std_err(),
    }

    let mut sale = load_sale(deps.storage, sale_id)?;
    sale.kyc_authority = new_authority.to_vec();
    SALES.save(deps.storage, sale_id, &sale)?;

    let payload = AuthorityUpdated {
        sale_id: sale_id.to_vec(),
        new_authority: new_authority.to_vec(),
    }
    .serialize();

    Ok(Response::new()
        .add_message(post_message(&cfg, payload)?)
        .add_attribute("action", "update_sale_authority")
        .add_attribute("sale_id", hex::encode(sale_id))
        .add_attribute("new_authority", hex::encode(new_authority.as_slice())))
}

fn verify_contributor(deps: Deps, emitter_chain: u16, emitter_address: &[u8]) -> StdResult<()> {
    match CONTRIBUTOR_EMITTERS.may_load(deps.storage, emitter_chain)? {
        Some(registered) if registered == emitter_address => Ok(()),
        Some(_) => ConductorError::InvalidContributor.std_err(),
        None => ConductorError::ContributorNotRegistered.std_err(),
    }
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

fn post_message(cfg: &crate::state::Config, payload: Vec<u8>) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: cfg.wormhole_contract.clone(),
        funds: vec![],
        msg: to_binary(&WormholeExecuteMsg::PostMessage {
            message: Binary::from(payload),
            nonce: WORMHOLE_NONCE,
        })?,
    }))
}

fn resolve_sale_token(deps: Deps, token_address: &[u8], token_chain: u16) -> StdResult<Denom> {
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
