//! Signed command dispatch for the swap service.
//!
//! `SwapHelper` owns a private key derived from the account identifier and
//! exposes one method per operation. Each method builds the 81-byte command
//! buffer, signs it, and forwards the signature together with the decimal
//! arguments to the transport. The buffer itself never leaves the process.

use num_bigint::BigUint;
use swap_command::{args, Command, CommandBuffer, CommandOp};
use swap_crypto::CryptoUtil;
use swap_transport::{Transport, TransportArg};
use swap_types::Result;
use tracing::{debug, trace};

/// Domain-separation suffix mixed into key derivation.
pub const DOMAIN_SUFFIX: &str = "/delphinus/swap";

/// A command that has been encoded and signed but not yet sent.
#[derive(Debug, Clone)]
pub struct SignedCommand {
    pub command: Command,
    pub buffer: CommandBuffer,
    pub signature: Vec<u8>,
}

/// Command encoder/signer bound to one account.
pub struct SwapHelper<T, C> {
    private_key: Vec<u8>,
    transport: T,
    crypto: C,
}

impl<T: Transport, C: CryptoUtil> SwapHelper<T, C> {
    /// Derive the account key. Fails if the crypto capability cannot derive one.
    pub fn new(account: &str, transport: T, crypto: C) -> Result<Self> {
        let private_key =
            crypto.derive_private_key(account.as_bytes(), DOMAIN_SUFFIX.as_bytes())?;
        Ok(Self {
            private_key,
            transport,
            crypto,
        })
    }

    pub fn public_key(&self) -> Result<Vec<u8>> {
        self.crypto.get_public_key(&self.private_key)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encode and sign without dispatching.
    pub fn sign_command(&self, command: &Command) -> Result<SignedCommand> {
        let buffer = command.encode();
        let signature = self.crypto.sign(buffer.as_ref(), &self.private_key)?;
        trace!(buffer = %hex::encode(buffer.as_bytes()), "encoded command");
        Ok(SignedCommand {
            command: command.clone(),
            buffer,
            signature,
        })
    }

    /// Sign `command` and send it with the trailing decimal arguments.
    async fn dispatch(&self, command: Command, tail: &[&BigUint]) -> Result<T::Output> {
        let signed = self.sign_command(&command)?;
        let method = command.op().method();
        debug!(
            method,
            nonce = command.nonce(),
            signature_len = signed.signature.len(),
            "dispatching signed command"
        );

        let mut params = Vec::with_capacity(tail.len() + 1);
        params.push(TransportArg::Bytes(signed.signature));
        params.extend(tail.iter().map(|v| TransportArg::decimal(v)));
        self.transport.send(method, params).await
    }

    /// Register the account's public key. No command buffer is signed.
    pub async fn set_key(&self) -> Result<T::Output> {
        let public_key = self.public_key()?;
        debug!(method = CommandOp::SetKey.method(), "registering public key");
        self.transport
            .send(CommandOp::SetKey.method(), vec![TransportArg::Bytes(public_key)])
            .await
    }

    pub async fn add_pool(
        &self,
        token0: &BigUint,
        token1: &BigUint,
        nonce: &BigUint,
    ) -> Result<T::Output> {
        let command = args::add_pool(token0, token1, nonce)?;
        self.dispatch(command, &[token0, token1, nonce]).await
    }

    /// `l1_tx_hash` is forwarded to the service but is not part of the
    /// signed buffer.
    pub async fn deposit(
        &self,
        account_index: &BigUint,
        token_index: &BigUint,
        amount: &BigUint,
        l1_tx_hash: &BigUint,
        nonce: &BigUint,
    ) -> Result<T::Output> {
        let command = args::deposit(account_index, token_index, amount, nonce)?;
        self.dispatch(
            command,
            &[account_index, token_index, amount, l1_tx_hash, nonce],
        )
        .await
    }

    pub async fn withdraw(
        &self,
        account_index: &BigUint,
        token_index: &BigUint,
        amount: &BigUint,
        l1_account: &BigUint,
        nonce: &BigUint,
    ) -> Result<T::Output> {
        let command = args::withdraw(account_index, token_index, amount, l1_account, nonce)?;
        self.dispatch(command, &[token_index, amount, l1_account, nonce])
            .await
    }

    pub async fn swap(
        &self,
        account_index: &BigUint,
        pool_index: &BigUint,
        reverse: &BigUint,
        amount: &BigUint,
        nonce: &BigUint,
    ) -> Result<T::Output> {
        let command = args::swap(account_index, pool_index, reverse, amount, nonce)?;
        self.dispatch(command, &[pool_index, reverse, amount, nonce])
            .await
    }

    pub async fn pool_supply(
        &self,
        account_index: &BigUint,
        pool_index: &BigUint,
        amount0: &BigUint,
        amount1: &BigUint,
        nonce: &BigUint,
    ) -> Result<T::Output> {
        let command = args::supply(account_index, pool_index, amount0, amount1, nonce)?;
        self.dispatch(command, &[pool_index, amount0, amount1, nonce])
            .await
    }

    pub async fn pool_retrieve(
        &self,
        account_index: &BigUint,
        pool_index: &BigUint,
        amount0: &BigUint,
        amount1: &BigUint,
        nonce: &BigUint,
    ) -> Result<T::Output> {
        let command = args::retrieve(account_index, pool_index, amount0, amount1, nonce)?;
        self.dispatch(command, &[pool_index, amount0, amount1, nonce])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use swap_command::COMMAND_SIZE;
    use swap_crypto::BabyJubjub;
    use swap_transport::RecordingTransport;
    use swap_types::SwapError;

    /// Crypto double: the key is seed ‖ suffix, signatures are a fixed tag,
    /// and every signed message is recorded.
    #[derive(Default)]
    struct RecordingCrypto {
        signed: Mutex<Vec<Vec<u8>>>,
        fail_signing: bool,
    }

    impl CryptoUtil for RecordingCrypto {
        fn derive_private_key(&self, seed: &[u8], suffix: &[u8]) -> Result<Vec<u8>> {
            if seed.is_empty() {
                return Err(SwapError::KeyDerivation("empty seed".into()));
            }
            Ok([seed, suffix].concat())
        }

        fn get_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>> {
            Ok(private_key.iter().rev().copied().collect())
        }

        fn sign(&self, message: &[u8], _private_key: &[u8]) -> Result<Vec<u8>> {
            if self.fail_signing {
                return Err(SwapError::Signing("key unavailable".into()));
            }
            self.signed.lock().unwrap().push(message.to_vec());
            Ok(vec![0xaa, 0xbb])
        }
    }

    fn n(v: u64) -> BigUint {
        BigUint::from(v)
    }

    fn dec(v: &str) -> TransportArg {
        TransportArg::Decimal(v.to_string())
    }

    fn helper() -> (
        SwapHelper<Arc<RecordingTransport>, Arc<RecordingCrypto>>,
        Arc<RecordingTransport>,
        Arc<RecordingCrypto>,
    ) {
        let transport = Arc::new(RecordingTransport::new());
        let crypto = Arc::new(RecordingCrypto::default());
        let helper = SwapHelper::new("alice", transport.clone(), crypto.clone()).unwrap();
        (helper, transport, crypto)
    }

    #[test]
    fn test_key_derived_with_domain_suffix() {
        let (helper, _, _) = helper();
        assert_eq!(helper.private_key, b"alice/delphinus/swap".to_vec());
    }

    #[test]
    fn test_derivation_failure_is_fatal() {
        let result = SwapHelper::new(
            "",
            RecordingTransport::new(),
            RecordingCrypto::default(),
        );
        assert!(matches!(result, Err(SwapError::KeyDerivation(_))));
    }

    #[tokio::test]
    async fn test_deposit_argument_shape() {
        let (helper, transport, crypto) = helper();
        let l1_tx_hash = BigUint::parse_bytes(b"123456789012345678901234567890", 10).unwrap();

        let call = helper
            .deposit(&n(5), &n(2), &n(1000), &l1_tx_hash, &n(7))
            .await
            .unwrap();

        assert_eq!(call.method, "deposit");
        assert_eq!(
            call.args,
            vec![
                TransportArg::Bytes(vec![0xaa, 0xbb]),
                dec("5"),
                dec("2"),
                dec("1000"),
                dec("123456789012345678901234567890"),
                dec("7"),
            ]
        );

        let signed = crypto.signed.lock().unwrap();
        assert_eq!(signed.len(), 1);
        let buf = &signed[0];
        assert_eq!(buf.len(), COMMAND_SIZE);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[8], 7);
        assert_eq!(buf[12], 5);
        assert_eq!(buf[16], 2);
        assert_eq!(buf[47..49], [0x03, 0xe8]);
        assert!(buf[49..].iter().all(|&b| b == 0));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_operation_argument_lists() {
        let (helper, transport, _) = helper();

        helper.add_pool(&n(1), &n(2), &n(3)).await.unwrap();
        helper.withdraw(&n(4), &n(1), &n(50), &n(99), &n(4)).await.unwrap();
        helper.swap(&n(4), &n(0), &n(1), &n(10), &n(5)).await.unwrap();
        helper.pool_supply(&n(4), &n(0), &n(10), &n(20), &n(6)).await.unwrap();
        helper.pool_retrieve(&n(4), &n(0), &n(3), &n(4), &n(7)).await.unwrap();

        let sig = TransportArg::Bytes(vec![0xaa, 0xbb]);
        let calls = transport.calls();
        let expected = vec![
            ("addPool", vec![dec("1"), dec("2"), dec("3")]),
            ("withdraw", vec![dec("1"), dec("50"), dec("99"), dec("4")]),
            ("swap", vec![dec("0"), dec("1"), dec("10"), dec("5")]),
            ("poolSupply", vec![dec("0"), dec("10"), dec("20"), dec("6")]),
            ("poolRetrieve", vec![dec("0"), dec("3"), dec("4"), dec("7")]),
        ];
        assert_eq!(calls.len(), expected.len());
        for (call, (method, tail)) in calls.iter().zip(expected) {
            assert_eq!(call.method, method);
            assert_eq!(call.args[0], sig);
            assert_eq!(call.args[1..], tail[..], "arguments of {}", method);
        }
    }

    #[tokio::test]
    async fn test_signed_buffers_per_operation() {
        let (helper, _, crypto) = helper();

        helper.add_pool(&n(0x0a0b), &n(0x0c0d), &n(1)).await.unwrap();
        helper.swap(&n(4), &n(9), &n(1), &n(10), &n(2)).await.unwrap();
        helper.pool_retrieve(&n(4), &n(9), &n(3), &n(4), &n(3)).await.unwrap();

        let signed = crypto.signed.lock().unwrap();
        let add_pool = &signed[0];
        assert_eq!(add_pool[0], 5);
        assert_eq!(add_pool[9..17], [0, 0, 0x0a, 0x0b, 0, 0, 0x0c, 0x0d]);
        assert!(add_pool[17..].iter().all(|&b| b == 0));

        let swap = &signed[1];
        assert_eq!(swap[0], 2);
        assert_eq!(swap[16], 9);
        assert_eq!(swap[48], 1);
        assert_eq!(swap[80], 10);

        let retrieve = &signed[2];
        assert_eq!(retrieve[0], 3);
        assert_eq!(retrieve[48], 3);
        assert_eq!(retrieve[80], 4);
    }

    #[tokio::test]
    async fn test_set_key_sends_public_key_only() {
        let (helper, transport, crypto) = helper();

        let call = helper.set_key().await.unwrap();

        let mut expected_pk = b"alice/delphinus/swap".to_vec();
        expected_pk.reverse();
        assert_eq!(call.method, "setKey");
        assert_eq!(call.args, vec![TransportArg::Bytes(expected_pk)]);
        assert!(crypto.signed.lock().unwrap().is_empty());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_overflow_rejected_before_signing() {
        let (helper, transport, crypto) = helper();
        let too_big = BigUint::from(1u32) << 256u32;

        let err = helper
            .swap(&n(1), &n(2), &n(0), &too_big, &n(3))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::FieldOverflow { field: "amount", width: 32 }));
        assert!(crypto.signed.lock().unwrap().is_empty());
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_signing_failure_propagates() {
        let transport = Arc::new(RecordingTransport::new());
        let crypto = RecordingCrypto {
            fail_signing: true,
            ..Default::default()
        };
        let helper = SwapHelper::new("alice", transport.clone(), crypto).unwrap();

        let err = helper.add_pool(&n(1), &n(2), &n(3)).await.unwrap_err();
        assert!(matches!(err, SwapError::Signing(_)));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let (helper, transport, _) = helper();
        transport.fail_with("remote unavailable");

        let err = helper
            .pool_supply(&n(1), &n(2), &n(3), &n(4), &n(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Transport(ref m) if m == "remote unavailable"));
    }

    #[test]
    fn test_babyjubjub_keys_are_deterministic() {
        let a = SwapHelper::new("alice", RecordingTransport::new(), BabyJubjub).unwrap();
        let b = SwapHelper::new("alice", RecordingTransport::new(), BabyJubjub).unwrap();
        let c = SwapHelper::new("bob", RecordingTransport::new(), BabyJubjub).unwrap();

        assert_eq!(a.private_key, b.private_key);
        assert_eq!(a.public_key().unwrap(), b.public_key().unwrap());
        assert_ne!(a.public_key().unwrap(), c.public_key().unwrap());
    }

    #[tokio::test]
    async fn test_babyjubjub_signature_covers_buffer() {
        let helper = SwapHelper::new("alice", RecordingTransport::new(), BabyJubjub).unwrap();
        let command = args::deposit(&n(5), &n(2), &n(1000), &n(7)).unwrap();

        let signed = helper.sign_command(&command).unwrap();
        let public_key = helper.public_key().unwrap();
        BabyJubjub
            .verify(signed.buffer.as_ref(), &signed.signature, &public_key)
            .unwrap();

        let call = helper
            .deposit(&n(5), &n(2), &n(1000), &n(0), &n(7))
            .await
            .unwrap();
        assert_eq!(call.args[0], TransportArg::Bytes(signed.signature));
    }
}
