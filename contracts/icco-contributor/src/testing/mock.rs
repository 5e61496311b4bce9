use cosmwasm_std::testing::{mock_dependencies, MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    from_binary, to_binary, Binary, ContractResult, OwnedDeps, SystemError, SystemResult,
    Uint128, WasmQuery,
};
use cw20::BalanceResponse;

use icco::vaa::ParsedVAA;
use icco::wormhole::{TokenBridgeQueryMsg, WormholeQueryMsg, WrappedRegistryResponse};

pub const WORMHOLE_ADDRESS: &str = "wormhole0000";
pub const TOKEN_BRIDGE_ADDRESS: &str = "tokenbridge0000";
pub const WRAPPED_SALE_TOKEN: &str = "wrapped0000";

/// Dependencies whose wasm querier stands in for the core bridge (VAA
/// attestation is assumed checked; the envelope is parsed for real), the
/// token bridge wrapped-asset registry, and the wrapped sale token's cw20
/// balance of this contract.
pub fn wormhole_dependencies(
    custody_balance: u128,
) -> OwnedDeps<MockStorage, MockApi, MockQuerier> {
    let mut deps = mock_dependencies();
    deps.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { contract_addr, msg } => match contract_addr.as_str() {
            WORMHOLE_ADDRESS => {
                let query: WormholeQueryMsg = match from_binary(msg) {
                    Ok(query) => query,
                    Err(e) => return SystemResult::Ok(ContractResult::Err(e.to_string())),
                };
                let WormholeQueryMsg::VerifyVAA { vaa, .. } = query;
                match ParsedVAA::deserialize(vaa.as_slice()) {
                    Ok(parsed) => SystemResult::Ok(to_binary(&parsed).into()),
                    Err(e) => SystemResult::Ok(ContractResult::Err(e.to_string())),
                }
            }
            TOKEN_BRIDGE_ADDRESS => {
                let query: TokenBridgeQueryMsg = match from_binary(msg) {
                    Ok(query) => query,
                    Err(e) => return SystemResult::Ok(ContractResult::Err(e.to_string())),
                };
                let TokenBridgeQueryMsg::WrappedRegistry { .. } = query;
                SystemResult::Ok(
                    to_binary(&WrappedRegistryResponse {
                        address: WRAPPED_SALE_TOKEN.to_string(),
                    })
                    .into(),
                )
            }
            WRAPPED_SALE_TOKEN => SystemResult::Ok(
                to_binary(&BalanceResponse {
                    balance: Uint128::new(custody_balance),
                })
                .into(),
            ),
            _ => SystemResult::Err(SystemError::NoSuchContract {
                addr: contract_addr.clone(),
            }),
        },
        _ => SystemResult::Err(SystemError::UnsupportedRequest {
            kind: "non-smart wasm query".to_string(),
        }),
    });
    deps
}

/// A VAA carrying `payload`, wearing zero signatures; attestation is the mock
/// core bridge's concern.
pub fn build_vaa(emitter_chain: u16, emitter_address: &[u8], sequence: u64, payload: &[u8]) -> Binary {
    let mut data = vec![1u8]; // version
    data.extend(0u32.to_be_bytes()); // guardian set index
    data.push(0u8); // no signatures
    data.extend(1_000u32.to_be_bytes()); // timestamp
    data.extend(0u32.to_be_bytes()); // nonce
    data.extend(emitter_chain.to_be_bytes());
    let mut emitter = [0u8; 32];
    emitter[32 - emitter_address.len()..].copy_from_slice(emitter_address);
    data.extend(emitter);
    data.extend(sequence.to_be_bytes());
    data.push(15u8); // consistency level
    data.extend(payload);
    Binary::from(data)
}
