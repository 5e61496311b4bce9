use cosmwasm_std::testing::{mock_env, mock_info};
use cosmwasm_std::{
    coins, from_binary, to_binary, Binary, CosmosMsg, Env, MessageInfo, StdResult, Timestamp,
    Uint128, WasmMsg,
};
use k256::ecdsa::recoverable::Signature as RecoverableSignature;
use k256::ecdsa::{signature::DigestSigner, SigningKey};
use k256::EncodedPoint;
use sha3::{Digest, Keccak256};

use icco::common::{
    denom_to_wire, AcceptedToken, Allocation, ContributionsAttested, SaleCore, SaleInit,
    SaleAborted, SaleSealed, SaleStatus, SaleTimes, AuthorityUpdated, CONVERSION_RATE_SCALE,
};
use icco::cryptography::{keccak256, kyc_message};
use icco::wormhole::{TokenBridgeExecuteMsg, TransferAsset, WormholeExecuteMsg};

use crate::{
    contract::{execute, instantiate, query},
    error::ContributorError,
    msg::{
        AcceptedTokenResponse, BuyerStatusResponse, ConfigResponse, ExecuteMsg, InstantiateMsg,
        QueryMsg, SaleResponse, SaleStatusResponse, TotalAllocationResponse,
        TotalContributionResponse,
    },
    state::BuyerStatus,
    testing::mock::{
        build_vaa, wormhole_dependencies, TOKEN_BRIDGE_ADDRESS, WORMHOLE_ADDRESS,
        WRAPPED_SALE_TOKEN,
    },
};

const CONDUCTOR_CHAIN: u16 = 2;
const CONDUCTOR_ADDRESS: &str = "0000000000000000000000005f8e26facc23fa4cbd87b8d9dbbd33d5047abde1";

const SALE_START: u64 = 10_000;
const SALE_END: u64 = 20_000;
const SALE_UNLOCK: u64 = 30_000;

const BUYER: &str = "addr0001";
const CONTRIBUTED: u128 = 5_000_000;

fn conductor_address() -> Vec<u8> {
    hex::decode(CONDUCTOR_ADDRESS).unwrap()
}

fn env_at(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = Timestamp::from_seconds(seconds);
    env
}

fn instantiate_msg() -> InstantiateMsg {
    InstantiateMsg {
        wormhole_contract: WORMHOLE_ADDRESS.into(),
        token_bridge_contract: TOKEN_BRIDGE_ADDRESS.into(),
        conductor_chain: CONDUCTOR_CHAIN,
        conductor_address: Binary::from(conductor_address()),
    }
}

fn sale_id() -> Vec<u8> {
    let mut id = vec![0u8; 32];
    id[31] = 1;
    id
}

fn sale_init(kyc_authority: Vec<u8>) -> SaleInit {
    let accepted_tokens = vec![
        AcceptedToken {
            index: 0,
            chain: 3,
            address: denom_to_wire("uusd").unwrap(),
            conversion_rate: Uint128::new(CONVERSION_RATE_SCALE),
        },
        AcceptedToken {
            index: 1,
            chain: 2,
            address: vec![13u8; 32],
            conversion_rate: Uint128::new(CONVERSION_RATE_SCALE / 5),
        },
    ];
    SaleInit {
        core: SaleCore {
            id: sale_id(),
            token_address: vec![3u8; 32],
            token_chain: 2,
            token_decimals: 9,
            token_amount: Uint128::new(1_000_000_000),
            min_raise: Uint128::new(1_000_000),
            max_raise: Uint128::new(100_000_000),
            times: SaleTimes {
                start: SALE_START,
                end: SALE_END,
                unlock: SALE_UNLOCK,
            },
            recipient: vec![9u8; 32],
            refund_recipient: vec![8u8; 32],
            kyc_authority,
            num_accepted: 2,
        },
        accepted_tokens,
        sale_token_custody: vec![0u8; 32],
    }
}

fn conductor_vaa(sequence: u64, payload: Vec<u8>) -> Binary {
    build_vaa(CONDUCTOR_CHAIN, &conductor_address(), sequence, &payload)
}

type Deps = cosmwasm_std::OwnedDeps<
    cosmwasm_std::testing::MockStorage,
    cosmwasm_std::testing::MockApi,
    cosmwasm_std::testing::MockQuerier,
>;

fn setup(custody_balance: u128) -> Deps {
    let mut deps = wormhole_dependencies(custody_balance);
    let info = mock_info("creator", &[]);
    instantiate(deps.as_mut(), mock_env(), info, instantiate_msg()).unwrap();
    deps
}

fn setup_with_sale(custody_balance: u128, kyc_authority: Vec<u8>) -> Deps {
    let mut deps = setup(custody_balance);
    let msg = ExecuteMsg::InitSale {
        data: conductor_vaa(1, sale_init(kyc_authority).serialize()),
    };
    execute(deps.as_mut(), env_at(5_000), mock_info("relayer", &[]), msg).unwrap();
    deps
}

fn contribute_msg(token_index: u8, amount: u128, kyc_signature: Option<Binary>) -> ExecuteMsg {
    ExecuteMsg::Contribute {
        sale_id: Binary::from(sale_id()),
        token_index,
        amount: Uint128::new(amount),
        kyc_signature,
    }
}

fn buyer_info(amount: u128) -> MessageInfo {
    mock_info(BUYER, &coins(amount, "uusd"))
}

fn contribute_default(deps: &mut Deps) {
    execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap();
}

fn sealed_payload(allocations: Vec<Allocation>) -> Vec<u8> {
    SaleSealed {
        sale_id: sale_id(),
        allocations,
    }
    .serialize()
}

fn default_allocations() -> Vec<Allocation> {
    vec![
        Allocation {
            token_index: 0,
            allocated: Uint128::new(1_000),
            excess_contributed: Uint128::zero(),
        },
        Allocation {
            token_index: 1,
            allocated: Uint128::new(500),
            excess_contributed: Uint128::zero(),
        },
    ]
}

fn query_status(deps: &Deps) -> SaleStatus {
    let response = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::SaleStatus {
            sale_id: Binary::from(sale_id()),
        },
    )
    .unwrap();
    let status: SaleStatusResponse = from_binary(&response).unwrap();
    status.status
}

#[test]
fn proper_initialization() -> StdResult<()> {
    let mut deps = wormhole_dependencies(0);
    let info = mock_info("creator", &[]);

    let response = instantiate(deps.as_mut(), mock_env(), info.clone(), instantiate_msg())?;
    assert_eq!(response.messages.len(), 0);

    let response = query(deps.as_ref(), mock_env(), QueryMsg::Config {})?;
    let config: ConfigResponse = from_binary(&response)?;
    assert_eq!(
        config,
        ConfigResponse {
            conductor_chain: CONDUCTOR_CHAIN,
            conductor_address: conductor_address(),
            owner: info.sender.to_string(),
        }
    );

    Ok(())
}

#[test]
fn init_sale() -> StdResult<()> {
    let deps = setup_with_sale(0, vec![0u8; 20]);

    assert_eq!(query_status(&deps), SaleStatus::Active);

    let response = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::Sale {
            sale_id: Binary::from(sale_id()),
        },
    )?;
    let sale: SaleResponse = from_binary(&response)?;
    assert_eq!(sale.id, sale_id());
    assert_eq!(sale.token_chain, 2u16);
    assert_eq!(sale.token_decimals, 9u8);
    assert_eq!(sale.token_amount, Uint128::new(1_000_000_000));
    assert_eq!(sale.sale_start, SALE_START);
    assert_eq!(sale.sale_end, SALE_END);
    assert_eq!(sale.unlock_timestamp, SALE_UNLOCK);
    assert_eq!(sale.num_accepted, 2u8);

    for token_index in 0u8..2u8 {
        let response = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::AcceptedToken {
                sale_id: Binary::from(sale_id()),
                token_index,
            },
        )?;
        let token: AcceptedTokenResponse = from_binary(&response)?;
        assert!(!token.disabled);

        let response = query(
            deps.as_ref(),
            mock_env(),
            QueryMsg::TotalContribution {
                sale_id: Binary::from(sale_id()),
                token_index,
            },
        )?;
        let total: TotalContributionResponse = from_binary(&response)?;
        assert_eq!(total.amount, Uint128::zero());
    }

    Ok(())
}

#[test]
fn duplicate_sale_init_rejected() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);

    // same payload, fresh vaa
    let msg = ExecuteMsg::InitSale {
        data: conductor_vaa(2, sale_init(vec![0u8; 20]).serialize()),
    };
    let err = execute(deps.as_mut(), env_at(5_000), mock_info("relayer", &[]), msg).unwrap_err();
    assert_eq!(err, ContributorError::SaleAlreadyExists.std());
}

#[test]
fn init_sale_rejects_unknown_emitter() {
    let mut deps = setup(0);

    let vaa = build_vaa(6, &[7u8; 32], 1, &sale_init(vec![0u8; 20]).serialize());
    let err = execute(
        deps.as_mut(),
        env_at(5_000),
        mock_info("relayer", &[]),
        ExecuteMsg::InitSale { data: vaa },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::InvalidConductor.std());
}

#[test]
fn init_sale_rejects_wrong_payload() {
    let mut deps = setup(0);

    let payload = SaleAborted { sale_id: sale_id() }.serialize();
    let err = execute(
        deps.as_mut(),
        env_at(5_000),
        mock_info("relayer", &[]),
        ExecuteMsg::InitSale {
            data: conductor_vaa(1, payload),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::InvalidVaaAction.std());
}

#[test]
fn contribution_window() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);

    // too early
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START - 1),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::ContributionTooEarly.std());

    // in window
    contribute_default(&mut deps);

    let response = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::TotalContribution {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap();
    let total: TotalContributionResponse = from_binary(&response).unwrap();
    assert_eq!(total.amount, Uint128::new(CONTRIBUTED));

    // accumulates
    execute(
        deps.as_mut(),
        env_at(SALE_END - 1),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap();
    let response = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::BuyerStatus {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
            buyer: BUYER.into(),
        },
    )
    .unwrap();
    let status: BuyerStatusResponse = from_binary(&response).unwrap();
    assert_eq!(
        status.status,
        BuyerStatus::Active {
            contribution: Uint128::new(2 * CONTRIBUTED)
        }
    );

    // window closed
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleEnded.std());
}

#[test]
fn contribution_guards() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);

    // token lives on another chain
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(1, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::WrongChain.std());

    // funds must match the declared amount
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        mock_info(BUYER, &coins(1, "uusd")),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::IncorrectFunds.std());

    // zero contributions buy nothing
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        mock_info(BUYER, &[]),
        contribute_msg(0, 0, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::ZeroAmount.std());
}

#[test]
fn disabled_token_rejects_contributions() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);

    // only the owner flips the switch
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        mock_info("addr0002", &[]),
        ExecuteMsg::DisableAcceptedToken {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
            disabled: true,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::Unauthorized.std());

    execute(
        deps.as_mut(),
        env_at(SALE_START),
        mock_info("creator", &[]),
        ExecuteMsg::DisableAcceptedToken {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
            disabled: true,
        },
    )
    .unwrap();

    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::DisabledToken.std());

    // re-enabled, contributions flow again
    execute(
        deps.as_mut(),
        env_at(SALE_START),
        mock_info("creator", &[]),
        ExecuteMsg::DisableAcceptedToken {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
            disabled: false,
        },
    )
    .unwrap();
    contribute_default(&mut deps);
}

#[test]
fn kyc_gated_contribution() {
    let secret = [9u8; 32];
    let signing_key = SigningKey::from_bytes(&secret).unwrap();
    let authority = {
        let point = EncodedPoint::from(&signing_key.verify_key());
        let point = point.decompress().unwrap();
        keccak256(&point.as_bytes()[1..])[12..32].to_vec()
    };

    let mut deps = setup_with_sale(0, authority);

    // no signature
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::InvalidKycSignature.std());

    // a signature over different parameters
    let message = kyc_message(
        &sale_id(),
        0,
        Uint128::new(CONTRIBUTED - 1),
        BUYER,
        Uint128::zero(),
    );
    let signature: RecoverableSignature =
        signing_key.sign_digest(Keccak256::new().chain(&message));
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, Some(Binary::from(signature.as_ref()))),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::InvalidKycSignature.std());

    // the real thing
    let message = kyc_message(
        &sale_id(),
        0,
        Uint128::new(CONTRIBUTED),
        BUYER,
        Uint128::zero(),
    );
    let signature: RecoverableSignature =
        signing_key.sign_digest(Keccak256::new().chain(&message));
    execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, Some(Binary::from(signature.as_ref()))),
    )
    .unwrap();

    // the signature binds the prior contribution, so a replay fails
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, Some(Binary::from(signature.as_ref()))),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::InvalidKycSignature.std());
}

#[test]
fn attest_contributions() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);
    contribute_default(&mut deps);

    // sale still running
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END - 1),
        mock_info("relayer", &[]),
        ExecuteMsg::AttestContributions {
            sale_id: Binary::from(sale_id()),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleNotAttestable.std());

    let response = execute(
        deps.as_mut(),
        env_at(SALE_END),
        mock_info("relayer", &[]),
        ExecuteMsg::AttestContributions {
            sale_id: Binary::from(sale_id()),
        },
    )
    .unwrap();

    // exactly the local token rides the attestation
    let mut expected = ContributionsAttested::new(&sale_id(), 3, 1);
    expected
        .add_contribution(0, Uint128::new(CONTRIBUTED))
        .unwrap();
    assert_eq!(response.messages.len(), 1);
    assert_eq!(
        response.messages[0].msg,
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: WORMHOLE_ADDRESS.to_string(),
            funds: vec![],
            msg: to_binary(&WormholeExecuteMsg::PostMessage {
                message: Binary::from(expected.serialize()),
                nonce: 0,
            })
            .unwrap(),
        })
    );

    // once only
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END),
        mock_info("relayer", &[]),
        ExecuteMsg::AttestContributions {
            sale_id: Binary::from(sale_id()),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleAlreadyAttested.std());
}

#[test]
fn sale_sealed_applies_allocations() {
    let mut deps = setup_with_sale(1_000, vec![0u8; 20]);
    contribute_default(&mut deps);

    let vaa = conductor_vaa(5, sealed_payload(default_allocations()));
    let response = execute(
        deps.as_mut(),
        env_at(SALE_END + 10),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleSealed { data: vaa.clone() },
    )
    .unwrap();

    assert_eq!(query_status(&deps), SaleStatus::Sealed);

    let query_response = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::TotalAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap();
    let allocation: TotalAllocationResponse = from_binary(&query_response).unwrap();
    assert_eq!(allocation.amount, Uint128::new(1_000));

    // collected uusd heads to the sale recipient on the conductor chain
    assert_eq!(response.messages.len(), 1);
    assert_eq!(
        response.messages[0].msg,
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: TOKEN_BRIDGE_ADDRESS.to_string(),
            funds: vec![],
            msg: to_binary(&TokenBridgeExecuteMsg::InitiateTransfer {
                asset: TransferAsset {
                    denom: cw20::Denom::Native("uusd".to_string()),
                    amount: Uint128::new(CONTRIBUTED),
                },
                recipient_chain: CONDUCTOR_CHAIN,
                recipient: Binary::from(vec![9u8; 32]),
                fee: Uint128::zero(),
                nonce: 0,
            })
            .unwrap(),
        })
    );

    // the same vaa cannot apply twice
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 11),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleSealed { data: vaa },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::VaaAlreadyExecuted.std());

    // a fresh seal vaa bounces off the terminal state
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 12),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleSealed {
            data: conductor_vaa(6, sealed_payload(default_allocations())),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleEnded.std());

    // so does an abort
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 13),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleAborted {
            data: conductor_vaa(7, SaleAborted { sale_id: sale_id() }.serialize()),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleEnded.std());
}

#[test]
fn sale_sealed_requires_custody() {
    let mut deps = setup_with_sale(999, vec![0u8; 20]);
    contribute_default(&mut deps);

    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 10),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleSealed {
            data: conductor_vaa(5, sealed_payload(default_allocations())),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::InsufficientFunds.std());
    assert_eq!(query_status(&deps), SaleStatus::Active);
}

#[test]
fn claim_allocation_once() {
    let mut deps = setup_with_sale(1_000, vec![0u8; 20]);
    contribute_default(&mut deps);

    // nothing to claim while the sale runs
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END - 1),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleNotFinished.std());

    execute(
        deps.as_mut(),
        env_at(SALE_END + 10),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleSealed {
            data: conductor_vaa(5, sealed_payload(default_allocations())),
        },
    )
    .unwrap();

    // sole contributor takes the whole local allocation, paid in the
    // wrapped sale token
    let response = execute(
        deps.as_mut(),
        env_at(SALE_END + 20),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap();
    assert_eq!(response.messages.len(), 1);
    assert_eq!(
        response.messages[0].msg,
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: WRAPPED_SALE_TOKEN.to_string(),
            funds: vec![],
            msg: to_binary(&cw20::Cw20ExecuteMsg::Transfer {
                recipient: BUYER.to_string(),
                amount: Uint128::new(1_000),
            })
            .unwrap(),
        })
    );

    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 21),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::AlreadyClaimed.std());

    // refunds are for aborted sales
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 22),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimRefund {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleNotAborted.std());

    // strangers have nothing here
    let err = execute(
        deps.as_mut(),
        env_at(SALE_END + 23),
        mock_info("addr0002", &[]),
        ExecuteMsg::ClaimAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::NonexistentBuyer.std());
}

#[test]
fn claim_allocation_pays_excess() {
    let mut deps = setup_with_sale(1_000, vec![0u8; 20]);
    contribute_default(&mut deps);

    let allocations = vec![
        Allocation {
            token_index: 0,
            allocated: Uint128::new(1_000),
            excess_contributed: Uint128::new(1_000_000),
        },
        Allocation {
            token_index: 1,
            allocated: Uint128::zero(),
            excess_contributed: Uint128::zero(),
        },
    ];
    let response = execute(
        deps.as_mut(),
        env_at(SALE_END + 10),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleSealed {
            data: conductor_vaa(5, sealed_payload(allocations)),
        },
    )
    .unwrap();

    // outbound transfer nets out the buyers' excess
    assert_eq!(
        response.messages[0].msg,
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr: TOKEN_BRIDGE_ADDRESS.to_string(),
            funds: vec![],
            msg: to_binary(&TokenBridgeExecuteMsg::InitiateTransfer {
                asset: TransferAsset {
                    denom: cw20::Denom::Native("uusd".to_string()),
                    amount: Uint128::new(CONTRIBUTED - 1_000_000),
                },
                recipient_chain: CONDUCTOR_CHAIN,
                recipient: Binary::from(vec![9u8; 32]),
                fee: Uint128::zero(),
                nonce: 0,
            })
            .unwrap(),
        })
    );

    let response = execute(
        deps.as_mut(),
        env_at(SALE_END + 20),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap();

    // sale token allocation plus the uusd excess
    assert_eq!(response.messages.len(), 2);
    assert_eq!(
        response.messages[1].msg,
        CosmosMsg::Bank(cosmwasm_std::BankMsg::Send {
            to_address: BUYER.to_string(),
            amount: coins(1_000_000, "uusd"),
        })
    );
}

#[test]
fn abort_and_refund() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);
    contribute_default(&mut deps);

    // refunds are not open while the sale runs
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START + 1),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimRefund {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleNotFinished.std());

    execute(
        deps.as_mut(),
        env_at(SALE_START + 2),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleAborted {
            data: conductor_vaa(5, SaleAborted { sale_id: sale_id() }.serialize()),
        },
    )
    .unwrap();
    assert_eq!(query_status(&deps), SaleStatus::Aborted);

    // window may still be open locally; the abort wins
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START + 3),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleEnded.std());

    // allocations never existed
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START + 4),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimAllocation {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleAborted.std());

    // full refund, exactly once
    let response = execute(
        deps.as_mut(),
        env_at(SALE_START + 5),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimRefund {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap();
    assert_eq!(response.messages.len(), 1);
    assert_eq!(
        response.messages[0].msg,
        CosmosMsg::Bank(cosmwasm_std::BankMsg::Send {
            to_address: BUYER.to_string(),
            amount: coins(CONTRIBUTED, "uusd"),
        })
    );

    let err = execute(
        deps.as_mut(),
        env_at(SALE_START + 6),
        mock_info(BUYER, &[]),
        ExecuteMsg::ClaimRefund {
            sale_id: Binary::from(sale_id()),
            token_index: 0,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::AlreadyClaimed.std());
}

#[test]
fn pre_start_abort_disables_contributions() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);

    // abort lands before the sale opens
    execute(
        deps.as_mut(),
        env_at(SALE_START - 100),
        mock_info("relayer", &[]),
        ExecuteMsg::SaleAborted {
            data: conductor_vaa(5, SaleAborted { sale_id: sale_id() }.serialize()),
        },
    )
    .unwrap();
    assert_eq!(query_status(&deps), SaleStatus::Aborted);

    // local clock says the window is open; status says otherwise
    let err = execute(
        deps.as_mut(),
        env_at(SALE_START + 1),
        buyer_info(CONTRIBUTED),
        contribute_msg(0, CONTRIBUTED, None),
    )
    .unwrap_err();
    assert_eq!(err, ContributorError::SaleEnded.std());
}

#[test]
fn authority_update() {
    let mut deps = setup_with_sale(0, vec![0u8; 20]);

    let payload = AuthorityUpdated {
        sale_id: sale_id(),
        new_authority: vec![11u8; 20],
    }
    .serialize();
    execute(
        deps.as_mut(),
        env_at(SALE_START),
        mock_info("relayer", &[]),
        ExecuteMsg::UpdateSaleAuthority {
            data: conductor_vaa(5, payload),
        },
    )
    .unwrap();

    let response = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::Sale {
            sale_id: Binary::from(sale_id()),
        },
    )
    .unwrap();
    let sale: SaleResponse = from_binary(&response).unwrap();
    assert_eq!(sale.kyc_authority, vec![11u8; 20]);
}
