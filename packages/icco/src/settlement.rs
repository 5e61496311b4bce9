use cosmwasm_std::{StdResult, Uint128, Uint256};

use crate::{
    common::{Allocation, CONVERSION_RATE_SCALE},
    error::CommonError,
};

// Cross-chain transfers cap precision at 8 decimals; amounts of
// higher-precision tokens are truncated to what a bridge will deliver.
const BRIDGE_DECIMALS: u8 = 8;

#[derive(Clone, Debug, PartialEq)]
pub struct RaiseTerms {
    pub token_amount: Uint128,
    pub min_raise: Uint128,
    pub max_raise: Uint128,
}

/// Final per-token input to settlement: the conversion rate fixed at sale
/// init and the cumulative contribution collected across all chains.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenTally {
    pub token_index: u8,
    pub chain: u16,
    pub conversion_rate: Uint128,
    pub contributed: Uint128,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settlement {
    pub allocations: Vec<Allocation>,
    pub token_refund: Uint128,
    pub total_raised: Uint128,
}

fn narrow(value: Uint256) -> StdResult<Uint128> {
    Uint128::try_from(value).map_err(|_| CommonError::AmountTooLarge.std())
}

fn mul_div(a: Uint128, b: Uint128, denominator: Uint128) -> StdResult<Uint128> {
    // 128 x 128 fits 256; truncating division
    narrow(Uint256::from(a) * Uint256::from(b) / Uint256::from(denominator))
}

/// Value of one tally in reference units: contributed * rate / 1e18,
/// truncating.
pub fn scale_contribution(contributed: Uint128, conversion_rate: Uint128) -> StdResult<Uint128> {
    narrow(
        Uint256::from(contributed) * Uint256::from(conversion_rate)
            / Uint256::from(CONVERSION_RATE_SCALE),
    )
}

pub fn total_raised(tallies: &[TokenTally]) -> StdResult<Uint128> {
    let mut total = Uint256::zero();
    for tally in tallies {
        total += Uint256::from(scale_contribution(tally.contributed, tally.conversion_rate)?);
    }
    narrow(total)
}

/// A buyer's share of a sale-wide amount, pro rata against the token's total
/// contribution. Derived the same way the calculator derives the aggregate,
/// so per-buyer payouts never exceed the attested totals.
pub fn pro_rata_share(
    total: Uint128,
    contribution: Uint128,
    total_contribution: Uint128,
) -> StdResult<Uint128> {
    if total_contribution.is_zero() {
        return Ok(Uint128::zero());
    }
    mul_div(total, contribution, total_contribution)
}

/// Truncate to `decimals - 8` trailing zeroes when decimals exceed the bridge
/// cap; identity otherwise.
pub fn normalize_amount(amount: Uint128, decimals: u8) -> Uint128 {
    if decimals <= BRIDGE_DECIMALS {
        return amount;
    }
    let divisor = 10u128.pow((decimals - BRIDGE_DECIMALS) as u32);
    Uint128::new(amount.u128() / divisor)
}

/// Inverse expansion of `normalize_amount`.
pub fn denormalize_amount(amount: Uint128, decimals: u8) -> StdResult<Uint128> {
    if decimals <= BRIDGE_DECIMALS {
        return Ok(amount);
    }
    let multiplier = 10u128.pow((decimals - BRIDGE_DECIMALS) as u32);
    amount
        .u128()
        .checked_mul(multiplier)
        .map(Uint128::new)
        .ok_or_else(|| CommonError::AmountTooLarge.std())
}

/// The settlement calculator. Runs exactly once, on the conductor; every
/// other party copies the attested numbers.
///
/// Invariant on return: sum(allocated) + token_refund == token_amount.
pub fn settle(
    terms: &RaiseTerms,
    tallies: &[TokenTally],
    sale_token_chain: u16,
    sale_token_decimals: u8,
) -> StdResult<Settlement> {
    let total = total_raised(tallies)?;

    let mut allocations: Vec<Allocation> = tallies
        .iter()
        .map(|t| Allocation {
            token_index: t.token_index,
            allocated: Uint128::zero(),
            excess_contributed: Uint128::zero(),
        })
        .collect();

    // failed raise: nothing is sold, the full amount returns to the seller
    if total < terms.min_raise || total.is_zero() {
        return Ok(Settlement {
            allocations,
            token_refund: terms.token_amount,
            total_raised: total,
        });
    }

    let token_refund = if total >= terms.max_raise {
        // over-subscribed: everything is sold, contributions above the cap
        // flow back pro rata against the unscaled tallies
        let total_excess = total - terms.max_raise;
        for (allocation, tally) in allocations.iter_mut().zip(tallies.iter()) {
            allocation.excess_contributed = mul_div(total_excess, tally.contributed, total)?;
        }
        Uint128::zero()
    } else {
        // under-subscribed but successful: scale the sold amount down
        terms.token_amount - mul_div(terms.token_amount, total, terms.max_raise)?
    };

    let pool = terms.token_amount - token_refund;
    let mut allocated_sum = Uint128::zero();
    for (allocation, tally) in allocations.iter_mut().zip(tallies.iter()) {
        let scaled = scale_contribution(tally.contributed, tally.conversion_rate)?;
        let mut allocated = mul_div(pool, scaled, total)?;
        if tally.chain != sale_token_chain {
            // round down to bridge precision so the payout matches what the
            // bridge actually delivers on the buyer's chain
            allocated = denormalize_amount(
                normalize_amount(allocated, sale_token_decimals),
                sale_token_decimals,
            )?;
        }
        allocation.allocated = allocated;
        allocated_sum += allocated;
    }

    // integer-division dust accrues to the seller, never to a buyer
    Ok(Settlement {
        allocations,
        token_refund: terms.token_amount - allocated_sum,
        total_raised: total,
    })
}
