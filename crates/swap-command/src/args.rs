//! Checked construction of commands from arbitrary-precision arguments.
//!
//! Each builder narrows its inputs to the field widths of the layout and
//! fails with `FieldOverflow` instead of truncating.

use num_bigint::BigUint;
use swap_types::{fit_u32, fit_u64, Result, U256};

use crate::Command;

pub fn add_pool(token0: &BigUint, token1: &BigUint, nonce: &BigUint) -> Result<Command> {
    Ok(Command::AddPool {
        nonce: fit_u64("nonce", nonce)?,
        token0: fit_u32("token0", token0)?,
        token1: fit_u32("token1", token1)?,
    })
}

pub fn deposit(
    account_index: &BigUint,
    token_index: &BigUint,
    amount: &BigUint,
    nonce: &BigUint,
) -> Result<Command> {
    Ok(Command::Deposit {
        nonce: fit_u64("nonce", nonce)?,
        account_index: fit_u32("account_index", account_index)?,
        token_index: fit_u32("token_index", token_index)?,
        amount: U256::fit("amount", amount)?,
    })
}

pub fn withdraw(
    account_index: &BigUint,
    token_index: &BigUint,
    amount: &BigUint,
    l1_account: &BigUint,
    nonce: &BigUint,
) -> Result<Command> {
    Ok(Command::Withdraw {
        nonce: fit_u64("nonce", nonce)?,
        account_index: fit_u32("account_index", account_index)?,
        token_index: fit_u32("token_index", token_index)?,
        amount: U256::fit("amount", amount)?,
        l1_account: U256::fit("l1_account", l1_account)?,
    })
}

pub fn swap(
    account_index: &BigUint,
    pool_index: &BigUint,
    reverse: &BigUint,
    amount: &BigUint,
    nonce: &BigUint,
) -> Result<Command> {
    Ok(Command::Swap {
        nonce: fit_u64("nonce", nonce)?,
        account_index: fit_u32("account_index", account_index)?,
        pool_index: fit_u32("pool_index", pool_index)?,
        reverse: U256::fit("reverse", reverse)?,
        amount: U256::fit("amount", amount)?,
    })
}

pub fn supply(
    account_index: &BigUint,
    pool_index: &BigUint,
    amount0: &BigUint,
    amount1: &BigUint,
    nonce: &BigUint,
) -> Result<Command> {
    Ok(Command::Supply {
        nonce: fit_u64("nonce", nonce)?,
        account_index: fit_u32("account_index", account_index)?,
        pool_index: fit_u32("pool_index", pool_index)?,
        amount0: U256::fit("amount0", amount0)?,
        amount1: U256::fit("amount1", amount1)?,
    })
}

pub fn retrieve(
    account_index: &BigUint,
    pool_index: &BigUint,
    amount0: &BigUint,
    amount1: &BigUint,
    nonce: &BigUint,
) -> Result<Command> {
    Ok(Command::Retrieve {
        nonce: fit_u64("nonce", nonce)?,
        account_index: fit_u32("account_index", account_index)?,
        pool_index: fit_u32("pool_index", pool_index)?,
        amount0: U256::fit("amount0", amount0)?,
        amount1: U256::fit("amount1", amount1)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swap_types::SwapError;

    fn n(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_swap_amount_overflow() {
        let too_big = BigUint::from(1u32) << 256u32;
        match swap(&n(1), &n(2), &n(0), &too_big, &n(3)) {
            Err(SwapError::FieldOverflow { field, width }) => {
                assert_eq!(field, "amount");
                assert_eq!(width, 32);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_index_and_nonce_overflow() {
        let wide_index = n(u32::MAX as u64 + 1);
        assert!(matches!(
            add_pool(&wide_index, &n(0), &n(0)),
            Err(SwapError::FieldOverflow { field: "token0", width: 4 })
        ));

        let wide_nonce = BigUint::from(u64::MAX) + 1u32;
        assert!(matches!(
            deposit(&n(0), &n(0), &n(0), &wide_nonce),
            Err(SwapError::FieldOverflow { field: "nonce", width: 8 })
        ));
    }

    #[test]
    fn test_max_values_fit() {
        let max_word = (BigUint::from(1u32) << 256u32) - 1u32;
        let cmd = withdraw(
            &n(u32::MAX as u64),
            &n(u32::MAX as u64),
            &max_word,
            &max_word,
            &n(u64::MAX),
        )
        .unwrap();
        let buf = cmd.encode();
        assert!(buf.as_bytes()[1..].iter().all(|&b| b == 0xff));
    }

    #[test]
    fn test_builders_pick_variant() {
        let cmd = supply(&n(1), &n(2), &n(3), &n(4), &n(5)).unwrap();
        assert_eq!(cmd.op(), crate::CommandOp::Supply);
        let cmd = retrieve(&n(1), &n(2), &n(3), &n(4), &n(5)).unwrap();
        assert_eq!(cmd.op(), crate::CommandOp::Retrieve);
        assert_eq!(cmd.nonce(), 5);
    }
}
