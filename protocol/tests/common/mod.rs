//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::Mutex;
use rand::rngs::OsRng;

use fcl_protocol::ledger::{
    AccountKey, LedgerAccount, LedgerReader, LedgerSubmitter, SealResult, TransactionId,
};
use fcl_protocol::service::codec::{self, RpcRequest, RpcResponse};
use fcl_protocol::service::{Service, ServiceMethod, ServiceType, SessionChannel};
use fcl_protocol::signer::SigningCapability;
use fcl_protocol::transaction::SignedTransaction;
use fcl_protocol::types::Address;
use fcl_protocol::{FclError, Result};

pub const BLOCK_ID: &str = "1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f1f";

pub fn addr(s: &str) -> Address {
    Address::parse(s).unwrap()
}

// ---------------------------------------------------------------------------
// KeyRing
// ---------------------------------------------------------------------------

/// Ed25519 keys for a fixed set of accounts, key index 0 each.
pub struct KeyRing {
    keys: HashMap<Address, SigningKey>,
}

impl KeyRing {
    pub fn new(addresses: &[Address]) -> Self {
        let keys = addresses
            .iter()
            .map(|a| (*a, SigningKey::generate(&mut OsRng)))
            .collect();
        Self { keys }
    }

    pub fn sign_hex(&self, address: &Address, message: &[u8]) -> String {
        hex::encode(self.keys[address].sign(message).to_bytes())
    }

    pub fn verify(&self, address: &Address, message: &[u8], signature_hex: &str) -> bool {
        let Ok(bytes) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&bytes) else {
            return false;
        };
        self.keys[address]
            .verifying_key()
            .verify(message, &signature)
            .is_ok()
    }
}

#[async_trait]
impl SigningCapability for KeyRing {
    async fn sign(&self, address: &Address, key_index: u32, message: &[u8]) -> Result<Vec<u8>> {
        if key_index != 0 {
            return Err(FclError::Signing(format!("no key {} for {}", key_index, address)));
        }
        let key = self
            .keys
            .get(address)
            .ok_or_else(|| FclError::Signing(format!("no key for {}", address)))?;
        Ok(key.sign(message).to_bytes().to_vec())
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

pub struct FakeLedger {
    pub sequence_number: u64,
    pub fail: bool,
    pub account_reads: AtomicUsize,
}

impl FakeLedger {
    pub fn new(sequence_number: u64) -> Self {
        Self {
            sequence_number,
            fail: false,
            account_reads: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(0)
        }
    }

    pub fn reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerReader for FakeLedger {
    async fn get_account(&self, address: &Address) -> Result<LedgerAccount> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FclError::Ledger("access node unreachable".into()));
        }
        Ok(LedgerAccount {
            address: *address,
            keys: vec![AccountKey {
                index: 0,
                sequence_number: self.sequence_number,
                public_key: String::new(),
                revoked: false,
            }],
        })
    }

    async fn latest_block_id(&self) -> Result<String> {
        Ok(BLOCK_ID.to_string())
    }
}

#[derive(Default)]
pub struct FakeSubmitter {
    pub submitted: Mutex<Vec<SignedTransaction>>,
}

#[async_trait]
impl LedgerSubmitter for FakeSubmitter {
    async fn submit(&self, transaction: &SignedTransaction) -> Result<TransactionId> {
        let mut submitted = self.submitted.lock();
        submitted.push(transaction.clone());
        Ok(TransactionId(format!("tx-{}", submitted.len())))
    }

    async fn await_seal(&self, _id: &TransactionId) -> Result<SealResult> {
        Ok(SealResult {
            is_complete: true,
            error_message: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Wallet channel
// ---------------------------------------------------------------------------

pub type Responder = Box<dyn Fn(&RpcRequest) -> Vec<RpcResponse> + Send + Sync>;

/// A session channel backed by a scripted wallet. Every request is
/// recorded and answered synchronously by the responder. Replies are
/// broadcast to every subscriber of the topic; frames sent before the
/// first subscription are held for it.
pub struct FakeWallet {
    pub requests: Mutex<Vec<RpcRequest>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<Vec<u8>>>>,
    backlog: Mutex<Vec<Vec<u8>>>,
    responder: Responder,
}

impl FakeWallet {
    pub fn new(responder: Responder) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            backlog: Mutex::new(Vec::new()),
            responder,
        })
    }

    /// Pushes a raw frame onto the response stream.
    pub fn inject(&self, bytes: Vec<u8>) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.is_empty() {
            self.backlog.lock().push(bytes);
            return;
        }
        subscribers.retain(|tx| tx.unbounded_send(bytes.clone()).is_ok());
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.method.clone()).collect()
    }
}

#[async_trait]
impl SessionChannel for FakeWallet {
    async fn send(&self, _topic: &str, _method: &str, payload: Vec<u8>) -> Result<()> {
        let request = codec::decode_request(&payload)?;
        let responses = (self.responder)(&request);
        self.requests.lock().push(request);
        for response in responses {
            self.inject(codec::encode_response(&response)?);
        }
        Ok(())
    }

    fn on_response(&self, _topic: &str) -> BoxStream<'static, Vec<u8>> {
        let (tx, rx) = mpsc::unbounded();
        for frame in self.backlog.lock().drain(..) {
            let _ = tx.unbounded_send(frame);
        }
        self.subscribers.lock().push(tx);
        rx.boxed()
    }
}

pub fn authz_service(address: Address) -> Service {
    Service::new(ServiceType::Authz, ServiceMethod::WalletConnectRpc, "flow_authz")
        .with_identity(address, Some(0))
}
