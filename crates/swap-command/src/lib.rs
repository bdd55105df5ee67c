//! Fixed-layout command buffers for the swap service.
//!
//! Every command is an 81-byte big-endian buffer:
//!
//! ```text
//! 0      opcode
//! 1..9   nonce (u64)
//! 9..13  primary index (u32)
//! 13..17 secondary index (u32)
//! 17..49 payload word 0 (u256)
//! 49..81 payload word 1 (u256)
//! ```
//!
//! Unused slots stay zero.

use serde::{Deserialize, Serialize};
use swap_types::{Result, SwapError, U256};

pub mod args;

pub const COMMAND_SIZE: usize = 81;
pub const OPCODE_OFFSET: usize = 0;
pub const NONCE_OFFSET: usize = 1;
pub const PRIMARY_OFFSET: usize = 9;
pub const SECONDARY_OFFSET: usize = 13;
pub const PAYLOAD_OFFSETS: [usize; 2] = [17, 49];

/// Operation kind; the discriminant is the opcode in byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandOp {
    Deposit = 0,
    Withdraw = 1,
    Swap = 2,
    Retrieve = 3,
    Supply = 4,
    AddPool = 5,
    SetKey = 6,
}

impl CommandOp {
    /// Transport method name.
    pub fn method(self) -> &'static str {
        match self {
            CommandOp::Deposit => "deposit",
            CommandOp::Withdraw => "withdraw",
            CommandOp::Swap => "swap",
            CommandOp::Retrieve => "poolRetrieve",
            CommandOp::Supply => "poolSupply",
            CommandOp::AddPool => "addPool",
            CommandOp::SetKey => "setKey",
        }
    }
}

impl TryFrom<u8> for CommandOp {
    type Error = SwapError;

    fn try_from(b: u8) -> Result<Self> {
        Ok(match b {
            0 => CommandOp::Deposit,
            1 => CommandOp::Withdraw,
            2 => CommandOp::Swap,
            3 => CommandOp::Retrieve,
            4 => CommandOp::Supply,
            5 => CommandOp::AddPool,
            6 => CommandOp::SetKey,
            other => return Err(SwapError::UnknownOpcode(other)),
        })
    }
}

/// A signable command. `SetKey` carries no buffer and has no variant here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    AddPool {
        nonce: u64,
        token0: u32,
        token1: u32,
    },
    Deposit {
        nonce: u64,
        account_index: u32,
        token_index: u32,
        amount: U256,
    },
    Withdraw {
        nonce: u64,
        account_index: u32,
        token_index: u32,
        amount: U256,
        l1_account: U256,
    },
    Swap {
        nonce: u64,
        account_index: u32,
        pool_index: u32,
        reverse: U256,
        amount: U256,
    },
    Supply {
        nonce: u64,
        account_index: u32,
        pool_index: u32,
        amount0: U256,
        amount1: U256,
    },
    Retrieve {
        nonce: u64,
        account_index: u32,
        pool_index: u32,
        amount0: U256,
        amount1: U256,
    },
}

/// Flattened view of a command: the header plus up to two payload words.
struct Fields {
    op: CommandOp,
    nonce: u64,
    primary: u32,
    secondary: u32,
    payload: [Option<U256>; 2],
}

impl Command {
    pub fn op(&self) -> CommandOp {
        match self {
            Command::AddPool { .. } => CommandOp::AddPool,
            Command::Deposit { .. } => CommandOp::Deposit,
            Command::Withdraw { .. } => CommandOp::Withdraw,
            Command::Swap { .. } => CommandOp::Swap,
            Command::Supply { .. } => CommandOp::Supply,
            Command::Retrieve { .. } => CommandOp::Retrieve,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.fields().nonce
    }

    fn fields(&self) -> Fields {
        let op = self.op();
        match *self {
            // token ids live in the index slots, the payload stays empty
            Command::AddPool { nonce, token0, token1 } => Fields {
                op,
                nonce,
                primary: token0,
                secondary: token1,
                payload: [None, None],
            },
            Command::Deposit { nonce, account_index, token_index, amount } => Fields {
                op,
                nonce,
                primary: account_index,
                secondary: token_index,
                payload: [Some(amount), None],
            },
            Command::Withdraw { nonce, account_index, token_index, amount, l1_account } => {
                Fields {
                    op,
                    nonce,
                    primary: account_index,
                    secondary: token_index,
                    payload: [Some(amount), Some(l1_account)],
                }
            }
            Command::Swap { nonce, account_index, pool_index, reverse, amount } => Fields {
                op,
                nonce,
                primary: account_index,
                secondary: pool_index,
                payload: [Some(reverse), Some(amount)],
            },
            Command::Supply { nonce, account_index, pool_index, amount0, amount1 }
            | Command::Retrieve { nonce, account_index, pool_index, amount0, amount1 } => Fields {
                op,
                nonce,
                primary: account_index,
                secondary: pool_index,
                payload: [Some(amount0), Some(amount1)],
            },
        }
    }

    /// Lay the command out into a fresh zeroed buffer.
    pub fn encode(&self) -> CommandBuffer {
        let fields = self.fields();
        let mut buf = [0u8; COMMAND_SIZE];

        buf[OPCODE_OFFSET] = fields.op as u8;
        buf[NONCE_OFFSET..PRIMARY_OFFSET].copy_from_slice(&fields.nonce.to_be_bytes());
        buf[PRIMARY_OFFSET..SECONDARY_OFFSET].copy_from_slice(&fields.primary.to_be_bytes());
        buf[SECONDARY_OFFSET..PAYLOAD_OFFSETS[0]]
            .copy_from_slice(&fields.secondary.to_be_bytes());
        for (word, offset) in fields.payload.iter().zip(PAYLOAD_OFFSETS) {
            if let Some(word) = word {
                buf[offset..offset + 32].copy_from_slice(&word.to_be_bytes());
            }
        }

        CommandBuffer(buf)
    }

    /// Parse a buffer back into a command.
    ///
    /// Rejects `SetKey`, unknown opcodes, and non-zero bytes in slots the
    /// opcode does not use.
    pub fn decode(buf: &CommandBuffer) -> Result<Self> {
        let nonce = buf.nonce();
        let primary = buf.primary_index();
        let secondary = buf.secondary_index();
        let word0 = buf.payload_word(0);
        let word1 = buf.payload_word(1);

        let cmd = match buf.opcode()? {
            CommandOp::AddPool => Command::AddPool { nonce, token0: primary, token1: secondary },
            CommandOp::Deposit => Command::Deposit {
                nonce,
                account_index: primary,
                token_index: secondary,
                amount: word0,
            },
            CommandOp::Withdraw => Command::Withdraw {
                nonce,
                account_index: primary,
                token_index: secondary,
                amount: word0,
                l1_account: word1,
            },
            CommandOp::Swap => Command::Swap {
                nonce,
                account_index: primary,
                pool_index: secondary,
                reverse: word0,
                amount: word1,
            },
            CommandOp::Supply => Command::Supply {
                nonce,
                account_index: primary,
                pool_index: secondary,
                amount0: word0,
                amount1: word1,
            },
            CommandOp::Retrieve => Command::Retrieve {
                nonce,
                account_index: primary,
                pool_index: secondary,
                amount0: word0,
                amount1: word1,
            },
            CommandOp::SetKey => {
                return Err(SwapError::MalformedCommand(
                    "setKey is not a buffered command".into(),
                ))
            }
        };

        // anything outside the opcode's slots survives only if it was zero
        if cmd.encode() != *buf {
            return Err(SwapError::MalformedCommand(format!(
                "non-zero bytes in unused slots of {:?} command",
                cmd.op()
            )));
        }
        Ok(cmd)
    }
}

/// An encoded 81-byte command.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandBuffer([u8; COMMAND_SIZE]);

impl CommandBuffer {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; COMMAND_SIZE] = bytes.try_into().map_err(|_| {
            SwapError::MalformedCommand(format!(
                "expected {} bytes, got {}",
                COMMAND_SIZE,
                bytes.len()
            ))
        })?;
        Ok(CommandBuffer(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; COMMAND_SIZE] {
        &self.0
    }

    pub fn opcode(&self) -> Result<CommandOp> {
        CommandOp::try_from(self.0[OPCODE_OFFSET])
    }

    pub fn nonce(&self) -> u64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.0[NONCE_OFFSET..PRIMARY_OFFSET]);
        u64::from_be_bytes(b)
    }

    pub fn primary_index(&self) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.0[PRIMARY_OFFSET..SECONDARY_OFFSET]);
        u32::from_be_bytes(b)
    }

    pub fn secondary_index(&self) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.0[SECONDARY_OFFSET..PAYLOAD_OFFSETS[0]]);
        u32::from_be_bytes(b)
    }

    /// Payload word `i` (0 or 1).
    ///
    /// # Panics
    ///
    /// Panics if `i > 1`.
    pub fn payload_word(&self, i: usize) -> U256 {
        let offset = PAYLOAD_OFFSETS[i];
        let mut b = [0u8; 32];
        b.copy_from_slice(&self.0[offset..offset + 32]);
        U256(b)
    }
}

impl AsRef<[u8]> for CommandBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for CommandBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CommandBuffer(0x{})", hex::encode(self.0))
    }
}
