use cosmwasm_std::{StdResult, Uint128};
use generic_array::GenericArray;
use k256::ecdsa::recoverable::{Id as RecoverableId, Signature as RecoverableSignature};
use k256::ecdsa::Signature;
use k256::EncodedPoint;
use sha3::{Digest, Keccak256};

use crate::{common::write_amount, error::CommonError};

pub const SIGNATURE_LEN: usize = 65;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Recover the ethereum-style 20-byte address that produced a recoverable
/// secp256k1 signature over a 32-byte digest. Recovery ids 0/1 and 27/28 are
/// both accepted.
pub fn ethereum_ecrecover(sig: &[u8], digest: &[u8; 32]) -> StdResult<[u8; 20]> {
    if sig.len() != SIGNATURE_LEN {
        return CommonError::InvalidSignature.std_err();
    }

    let signature = Signature::try_from(&sig[0..64])
        .or_else(|_| CommonError::InvalidSignature.std_err())?;
    let mut recovery = sig[64];
    if recovery >= 27 {
        recovery -= 27;
    }
    let id = RecoverableId::new(recovery)
        .or_else(|_| CommonError::InvalidSignature.std_err())?;
    let recoverable = RecoverableSignature::new(&signature, id)
        .or_else(|_| CommonError::InvalidSignature.std_err())?;

    let verify_key = recoverable
        .recover_verify_key_from_digest_bytes(GenericArray::from_slice(digest))
        .or_else(|_| CommonError::EcdsaRecoverFailure.std_err())?;

    let point: EncodedPoint = EncodedPoint::from(&verify_key);
    let point = point.decompress();
    if bool::from(point.is_none()) {
        return CommonError::EcdsaRecoverFailure.std_err();
    }
    let point = point.unwrap();

    let hash = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    Ok(address)
}

/// Preimage a KYC authority signs (keccak-prehashed) to admit one
/// contribution. The buyer enters as its address string bytes so the message
/// is computable off-chain without canonicalization rules.
pub fn kyc_message(
    sale_id: &[u8],
    token_index: u8,
    amount: Uint128,
    buyer: &str,
    prior_contribution: Uint128,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(sale_id.len() + 65 + buyer.len());
    message.extend(sale_id);
    message.push(token_index);
    message.extend(write_amount(amount));
    message.extend(buyer.as_bytes());
    message.extend(write_amount(prior_contribution));
    message
}

pub fn kyc_digest(
    sale_id: &[u8],
    token_index: u8,
    amount: Uint128,
    buyer: &str,
    prior_contribution: Uint128,
) -> [u8; 32] {
    keccak256(&kyc_message(
        sale_id,
        token_index,
        amount,
        buyer,
        prior_contribution,
    ))
}

pub fn verify_kyc_signature(
    authority: &[u8],
    signature: &[u8],
    digest: &[u8; 32],
) -> StdResult<()> {
    let recovered =
        ethereum_ecrecover(signature, digest).or_else(|_| CommonError::InvalidKycSignature.std_err())?;
    if authority != recovered {
        return CommonError::InvalidKycSignature.std_err();
    }
    Ok(())
}
