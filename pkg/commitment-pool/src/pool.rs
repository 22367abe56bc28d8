use std::{collections::BTreeSet, fmt, path::Path};

use borsh::{BorshDeserialize, BorshSerialize};
use imt::{
    Clock, HashCache, HistoricalTree, HistorySnapshot, SimpleHashCache, SystemClock, TreeEvent,
    CAPACITY,
};
use tracing::{debug, info, warn};
use zk_primitives::Element;

use crate::{
    CommitmentRecord, Error, PoolConfig, ProofVerifier, PublicInputs, Result, VerifierError,
};

/// The number of leaves inserted by each commitment
const LEAVES_PER_COMMITMENT: usize = 2;

/// Accepts proven deposits and commits them to a [`HistoricalTree`]
///
/// Each successful [`commit_entry`][Self::commit_entry] spends a nonce and inserts two leaves:
/// the main tree commitment, then the nonce commitment. Both are keyed by the low 64 bits of the
/// commitment, and store the full commitment as their value.
pub struct CommitmentPool<C = SimpleHashCache, K = SystemClock> {
    registry: HistoricalTree<C, K>,
    verifier: Option<Box<dyn ProofVerifier>>,
    spent_nonces: BTreeSet<Element>,
    records: Vec<CommitmentRecord>,
}

impl<C, K> fmt::Debug for CommitmentPool<C, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitmentPool")
            .field("leaves", &self.registry.tree().len())
            .field("historical_roots", &self.registry.total_historical_roots())
            .field("verifier", &self.verifier.is_some())
            .field("spent_nonces", &self.spent_nonces.len())
            .finish_non_exhaustive()
    }
}

impl<C: HashCache + Default, K: Clock + Default> Default for CommitmentPool<C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HashCache, K: Clock> CommitmentPool<C, K> {
    /// An empty pool with no verifier
    #[must_use]
    pub fn new() -> Self
    where
        C: Default,
        K: Default,
    {
        Self::with_registry(HistoricalTree::new())
    }

    /// A pool that commits to `registry`
    ///
    /// No nonces are considered spent.
    #[must_use]
    pub fn with_registry(registry: HistoricalTree<C, K>) -> Self {
        Self {
            registry,
            verifier: None,
            spent_nonces: BTreeSet::new(),
            records: Vec::new(),
        }
    }

    /// Open the pool described by `config`
    ///
    /// If the config names a snapshot file that exists, the pool is loaded from it, otherwise a new
    /// pool is created. Either way, the pool has no verifier.
    pub fn open(config: &PoolConfig) -> Result<Self>
    where
        C: Default,
        K: Default,
    {
        match &config.snapshot_path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                debug!(path = %path.display(), "no snapshot found, starting a new pool");
                Ok(Self::new())
            }
            None => Ok(Self::new()),
        }
    }

    /// Set the verifier used by [`commit_entry`][Self::commit_entry]
    pub fn set_verifier(&mut self, verifier: impl ProofVerifier + 'static) {
        self.verifier = Some(Box::new(verifier));
    }

    /// Verify a deposit proof, and commit its outputs to the tree
    ///
    /// `public_inputs` must hold exactly the seven elements described by [`PublicInputs`]. The
    /// checks run in this order, and the first to fail is returned:
    ///  - there are seven public inputs ([`Error::InvalidInputShape`])
    ///  - a verifier is set ([`Error::VerifierNotConfigured`])
    ///  - the verifier accepts the proof ([`Error::InvalidProof`])
    ///  - `attached_value` equals the amount ([`Error::ValueMismatch`])
    ///  - the token address and amount are non-zero ([`Error::InvalidParameter`])
    ///  - the nonce commitment is unspent ([`Error::ReplayedNonce`])
    ///  - the tree has room for both leaves ([`Error::Tree`])
    ///
    /// On failure the pool is unchanged.
    #[tracing::instrument(err, ret, skip(self, proof))]
    pub fn commit_entry(
        &mut self,
        proof: &[u8],
        public_inputs: &[Element],
        attached_value: Element,
    ) -> Result<CommitmentRecord> {
        let inputs = PublicInputs::from_slice(public_inputs)?;

        let verifier = self
            .verifier
            .as_deref()
            .ok_or(Error::VerifierNotConfigured)?;

        match verifier.verify(proof, public_inputs) {
            Ok(true) => {}
            Ok(false) => return Err(Error::InvalidProof),
            Err(VerifierError(reason)) => {
                warn!(%reason, "verifier failed");
                return Err(Error::InvalidProof);
            }
        }

        if attached_value != inputs.amount {
            return Err(Error::ValueMismatch {
                attached: attached_value,
                amount: inputs.amount,
            });
        }

        if inputs.token_address.is_zero() {
            return Err(Error::InvalidParameter("the token address is zero"));
        }

        if inputs.amount.is_zero() {
            return Err(Error::InvalidParameter("the amount is zero"));
        }

        let nonce = inputs.nonce_commitment;
        if self.spent_nonces.contains(&nonce) {
            return Err(Error::ReplayedNonce { nonce });
        }

        if self.registry.tree().remaining_capacity() < LEAVES_PER_COMMITMENT {
            return Err(imt::Error::CapacityExhausted { capacity: CAPACITY }.into());
        }

        // nothing below can fail, so the pool never holds half a commitment
        self.spent_nonces.insert(nonce);

        let main = inputs.main_tree_commitment;
        let (main_leaf_idx, main_root) = self.registry.insert_leaf(main.low_u64(), main)?;
        let (nonce_leaf_idx, nonce_root) = self.registry.insert_leaf(nonce.low_u64(), nonce)?;

        let record = CommitmentRecord {
            main_tree_commitment: main,
            main_leaf_idx,
            main_root,
            nonce_commitment: nonce,
            nonce_leaf_idx,
            nonce_root,
            historical_root_index: self.registry.total_historical_roots() - 1,
            encrypted_amount: inputs.encrypted_amount,
            encrypted_token_address: inputs.encrypted_token_address,
            encrypted_personal_root: inputs.encrypted_personal_root,
        };

        info!(
            main_leaf_idx,
            nonce_leaf_idx,
            root = %nonce_root,
            historical_root_index = record.historical_root_index,
            "committed entry"
        );

        self.records.push(record);

        Ok(record)
    }

    /// Capture the tree, its history, the spent nonces and every record
    pub fn snapshot(&mut self) -> PoolSnapshot {
        PoolSnapshot {
            registry: self.registry.snapshot(),
            spent_nonces: self.spent_nonces.iter().copied().collect(),
            records: self.records.clone(),
        }
    }

    /// Rebuild a pool from a [`PoolSnapshot`]
    ///
    /// The pool has no verifier.
    ///
    /// # Errors
    ///
    /// Fails if the registry cannot be restored (see [`HistoricalTree::restore`]), or with
    /// [`Error::InconsistentSnapshot`] if a nonce is listed twice or a record's nonce is not
    /// spent
    pub fn restore(snapshot: &PoolSnapshot, clock: K) -> Result<Self>
    where
        C: Default,
    {
        let registry = HistoricalTree::restore(&snapshot.registry, clock)?;
        let spent_nonces: BTreeSet<_> = snapshot.spent_nonces.iter().copied().collect();

        if spent_nonces.len() != snapshot.spent_nonces.len() {
            return Err(Error::InconsistentSnapshot("a nonce is spent twice"));
        }

        if snapshot
            .records
            .iter()
            .any(|record| !spent_nonces.contains(&record.nonce_commitment))
        {
            return Err(Error::InconsistentSnapshot(
                "a committed nonce is not marked as spent",
            ));
        }

        Ok(Self {
            registry,
            verifier: None,
            spent_nonces,
            records: snapshot.records.clone(),
        })
    }

    /// Write a snapshot of this pool to `path`
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = borsh::to_vec(&self.snapshot())?;
        std::fs::write(path, bytes)?;

        debug!(path = %path.display(), "saved pool snapshot");
        Ok(())
    }

    /// Read a pool from a snapshot file written by [`save`][Self::save]
    ///
    /// The pool has no verifier.
    pub fn load(path: impl AsRef<Path>) -> Result<Self>
    where
        C: Default,
        K: Default,
    {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let snapshot = borsh::from_slice(&bytes).map_err(imt::Error::from)?;
        let pool = Self::restore(&snapshot, K::default())?;

        debug!(path = %path.display(), records = pool.records.len(), "loaded pool snapshot");
        Ok(pool)
    }
}

impl<C, K> CommitmentPool<C, K> {
    /// The registry holding the tree and its historical roots
    #[must_use]
    pub fn registry(&self) -> &HistoricalTree<C, K> {
        &self.registry
    }

    /// Whether a verifier is set
    #[must_use]
    pub fn has_verifier(&self) -> bool {
        self.verifier.is_some()
    }

    /// Whether `nonce` has been spent by a previous commitment
    #[must_use]
    pub fn is_nonce_spent(&self, nonce: Element) -> bool {
        self.spent_nonces.contains(&nonce)
    }

    /// Every successful commitment, oldest first
    #[must_use]
    pub fn commitments(&self) -> &[CommitmentRecord] {
        &self.records
    }

    /// Take the events recorded by the tree and registry since the last call
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.registry.drain_events()
    }
}

/// The persisted form of a [`CommitmentPool`]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct PoolSnapshot {
    /// The tree and its history
    pub registry: HistorySnapshot,
    /// Every spent nonce, in ascending order
    pub spent_nonces: Vec<Element>,
    /// Every successful commitment, oldest first
    pub records: Vec<CommitmentRecord>,
}
