//! Test double for [`EthClient`].
//!
//! Each operation has its own stub table keyed by the operation's arguments,
//! so a registered result always has the shape the operation returns. Every
//! invocation is appended to an ordered call log before the stub is looked
//! up. A call with no matching stub panics: a missing stub is a bug in the
//! test, not a condition the code under test should handle.
//!
//! ```ignore
//! let mock = MockEthClient::new();
//! mock.on_finalized_block_height(Ok(100));
//! assert_eq!(mock.finalized_block_height().await, Ok(100));
//! mock.assert_called(&EthCall::FinalizedBlockHeight);
//! ```

use std::sync::Arc;

use alloy::primitives::{Address, BlockHash, BlockNumber, B256};
use alloy::rpc::types::{Filter, Header, Log};
use async_trait::async_trait;
use derive_more::Display;
use parking_lot::Mutex;
use tracing::trace;

use crate::client::{ClientError, EthClient};

/// Operation names, for querying the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EthMethod {
    #[display("header_by_number")]
    HeaderByNumber,
    #[display("finalized_block_height")]
    FinalizedBlockHeight,
    #[display("headers_by_range")]
    HeadersByRange,
    #[display("header_by_hash")]
    HeaderByHash,
    #[display("storage_hash")]
    StorageHash,
    #[display("filter_logs")]
    FilterLogs,
}

/// A recorded invocation and the arguments it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EthCall {
    HeaderByNumber { number: BlockNumber },
    FinalizedBlockHeight,
    HeadersByRange { from: BlockNumber, to: BlockNumber },
    HeaderByHash { hash: BlockHash },
    StorageHash { address: Address, block_number: BlockNumber },
    FilterLogs { filter: Filter },
}

impl EthCall {
    pub const fn method(&self) -> EthMethod {
        match self {
            Self::HeaderByNumber { .. } => EthMethod::HeaderByNumber,
            Self::FinalizedBlockHeight => EthMethod::FinalizedBlockHeight,
            Self::HeadersByRange { .. } => EthMethod::HeadersByRange,
            Self::HeaderByHash { .. } => EthMethod::HeaderByHash,
            Self::StorageHash { .. } => EthMethod::StorageHash,
            Self::FilterLogs { .. } => EthMethod::FilterLogs,
        }
    }
}

#[derive(Debug)]
struct Stub<T> {
    result: Result<T, ClientError>,
    hits: usize,
}

/// Arguments a stub is registered under, rendered the same way in every
/// panic message.
trait StubKey: PartialEq {
    fn render(&self) -> String;
}

impl StubKey for () {
    fn render(&self) -> String {
        String::new()
    }
}

impl StubKey for BlockNumber {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl StubKey for (BlockNumber, BlockNumber) {
    fn render(&self) -> String {
        format!("{}, {}", self.0, self.1)
    }
}

impl StubKey for BlockHash {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl StubKey for (Address, BlockNumber) {
    fn render(&self) -> String {
        format!("{}, {}", self.0, self.1)
    }
}

impl StubKey for Filter {
    fn render(&self) -> String {
        format!("{self:?}")
    }
}

/// Argument key -> programmed result for one operation.
///
/// A plain vector rather than a map: `Filter` is compared by equality only.
#[derive(Debug)]
struct StubTable<K, T> {
    entries: Vec<(K, Stub<T>)>,
}

impl<K, T> Default for StubTable<K, T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K: StubKey, T: Clone> StubTable<K, T> {
    /// Register `result` for `key`, replacing any earlier registration.
    fn insert(&mut self, key: K, result: Result<T, ClientError>) {
        let stub = Stub { result, hits: 0 };
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = stub,
            None => self.entries.push((key, stub)),
        }
    }

    fn respond(&mut self, key: &K) -> Option<Result<T, ClientError>> {
        let (_, stub) = self.entries.iter_mut().find(|(k, _)| k == key)?;
        stub.hits += 1;
        Some(stub.result.clone())
    }

    fn keys(&self, method: EthMethod) -> Vec<String> {
        self.entries.iter().map(|(k, _)| format!("{method}({})", k.render())).collect()
    }

    fn unused_keys(&self, method: EthMethod) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, stub)| stub.hits == 0)
            .map(|(k, _)| format!("{method}({})", k.render()))
            .collect()
    }
}

#[derive(Debug, Default)]
struct MockState {
    header_by_number: StubTable<BlockNumber, Header>,
    finalized_block_height: StubTable<(), BlockNumber>,
    headers_by_range: StubTable<(BlockNumber, BlockNumber), Vec<Header>>,
    header_by_hash: StubTable<BlockHash, Header>,
    storage_hash: StubTable<(Address, BlockNumber), B256>,
    filter_logs: StubTable<Filter, Vec<Log>>,
    calls: Vec<EthCall>,
}

impl MockState {
    fn unused_stubs(&self) -> Vec<String> {
        let mut unused = self.header_by_number.unused_keys(EthMethod::HeaderByNumber);
        unused.extend(self.finalized_block_height.unused_keys(EthMethod::FinalizedBlockHeight));
        unused.extend(self.headers_by_range.unused_keys(EthMethod::HeadersByRange));
        unused.extend(self.header_by_hash.unused_keys(EthMethod::HeaderByHash));
        unused.extend(self.storage_hash.unused_keys(EthMethod::StorageHash));
        unused.extend(self.filter_logs.unused_keys(EthMethod::FilterLogs));
        unused
    }
}

/// Programmable [`EthClient`] that records every call.
///
/// Clones share stubs and call history, so a test can keep one handle and
/// move another into the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockEthClient {
    state: Arc<Mutex<MockState>>,
}

impl MockEthClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_header_by_number(
        &self,
        number: BlockNumber,
        result: Result<Header, ClientError>,
    ) -> &Self {
        self.state.lock().header_by_number.insert(number, result);
        self
    }

    pub fn on_finalized_block_height(&self, result: Result<BlockNumber, ClientError>) -> &Self {
        self.state.lock().finalized_block_height.insert((), result);
        self
    }

    pub fn on_headers_by_range(
        &self,
        from: BlockNumber,
        to: BlockNumber,
        result: Result<Vec<Header>, ClientError>,
    ) -> &Self {
        self.state.lock().headers_by_range.insert((from, to), result);
        self
    }

    pub fn on_header_by_hash(&self, hash: BlockHash, result: Result<Header, ClientError>) -> &Self {
        self.state.lock().header_by_hash.insert(hash, result);
        self
    }

    pub fn on_storage_hash(
        &self,
        address: Address,
        block_number: BlockNumber,
        result: Result<B256, ClientError>,
    ) -> &Self {
        self.state.lock().storage_hash.insert((address, block_number), result);
        self
    }

    pub fn on_filter_logs(&self, filter: Filter, result: Result<Vec<Log>, ClientError>) -> &Self {
        self.state.lock().filter_logs.insert(filter, result);
        self
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<EthCall> {
        self.state.lock().calls.clone()
    }

    pub fn calls_to(&self, method: EthMethod) -> Vec<EthCall> {
        self.state.lock().calls.iter().filter(|c| c.method() == method).cloned().collect()
    }

    pub fn call_count(&self, method: EthMethod) -> usize {
        self.state.lock().calls.iter().filter(|c| c.method() == method).count()
    }

    /// Forget recorded calls. Stubs stay registered.
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Panics unless `call` was made at least once.
    #[track_caller]
    pub fn assert_called(&self, call: &EthCall) {
        let calls = self.calls();
        assert!(
            calls.contains(call),
            "expected call {call:?} was not made; recorded calls: {calls:?}"
        );
    }

    /// Panics if any registered stub was never invoked.
    #[track_caller]
    pub fn assert_expectations(&self) {
        let unused = self.state.lock().unused_stubs();
        assert!(unused.is_empty(), "stubs registered but never called: {}", unused.join(", "));
    }

    /// Record `call`, then answer it from the stub table `table` selects.
    fn respond<K, T>(
        &self,
        call: EthCall,
        key: &K,
        table: impl FnOnce(&mut MockState) -> &mut StubTable<K, T>,
    ) -> Result<T, ClientError>
    where
        K: StubKey,
        T: Clone,
    {
        trace!(?call, "mock eth client call");
        let response = {
            let mut state = self.state.lock();
            state.calls.push(call.clone());
            let table = table(&mut *state);
            table.respond(key).ok_or_else(|| table.keys(call.method()))
        };

        match response {
            Ok(result) => result,
            Err(registered) => panic!(
                "unexpected call to MockEthClient: {call:?}; registered {} stubs: [{}]",
                call.method(),
                registered.join(", ")
            ),
        }
    }
}

#[async_trait]
impl EthClient for MockEthClient {
    async fn header_by_number(&self, number: BlockNumber) -> Result<Header, ClientError> {
        self.respond(EthCall::HeaderByNumber { number }, &number, |s| &mut s.header_by_number)
    }

    async fn finalized_block_height(&self) -> Result<BlockNumber, ClientError> {
        self.respond(EthCall::FinalizedBlockHeight, &(), |s| &mut s.finalized_block_height)
    }

    async fn headers_by_range(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> Result<Vec<Header>, ClientError> {
        self.respond(EthCall::HeadersByRange { from, to }, &(from, to), |s| &mut s.headers_by_range)
    }

    async fn header_by_hash(&self, hash: BlockHash) -> Result<Header, ClientError> {
        self.respond(EthCall::HeaderByHash { hash }, &hash, |s| &mut s.header_by_hash)
    }

    async fn storage_hash(
        &self,
        address: Address,
        block_number: BlockNumber,
    ) -> Result<B256, ClientError> {
        self.respond(
            EthCall::StorageHash { address, block_number },
            &(address, block_number),
            |s| &mut s.storage_hash,
        )
    }

    async fn filter_logs(&self, filter: &Filter) -> Result<Vec<Log>, ClientError> {
        self.respond(EthCall::FilterLogs { filter: filter.clone() }, filter, |s| &mut s.filter_logs)
    }
}
