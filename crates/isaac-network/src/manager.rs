//! The connection manager: owns the roster, processes incoming handshakes,
//! and exposes broadcast. `start` performs the initial handshake round and
//! blocks until enough validators are connected to reach quorum.

use std::sync::Arc;
use std::time::Duration;

use isaac_consensus::ConsensusError;
use isaac_crypto::PublicKey;
use isaac_ledger::wire::{ConnectMessage, Envelope};
use isaac_types::Address;

use crate::broadcast::{wait_for_threshold, BroadcastReport, Broadcaster, PeerTransport};
use crate::errors::NetworkError;
use crate::roster::ValidatorRoster;

/// Owns the validator roster and the broadcast primitive built on top of it.
pub struct ConnectionManager<T: PeerTransport + 'static> {
    roster: ValidatorRoster,
    broadcaster: Broadcaster<T>,
    network_id: Vec<u8>,
}

impl<T: PeerTransport + 'static> ConnectionManager<T> {
    #[must_use]
    pub fn new(transport: Arc<T>, network_id: Vec<u8>) -> Self {
        ConnectionManager {
            roster: ValidatorRoster::new(),
            broadcaster: Broadcaster::new(transport),
            network_id,
        }
    }

    #[must_use]
    pub fn roster(&self) -> &ValidatorRoster {
        &self.roster
    }

    /// Validates and applies an incoming handshake: the sender must be a
    /// known validator, and its signature must verify under its own address.
    /// On success, the roster gains (or refreshes) that validator's
    /// endpoint, and every validator the peer reports becomes known too (via
    /// [`ValidatorRoster::learn`]) even though we have no endpoint for them
    /// yet — so when one of them dials in directly, its own handshake is no
    /// longer rejected as `ConnectFromUnknownValidator`.
    pub fn handle_connect(
        &self,
        sender: &Address,
        envelope: &Envelope<ConnectMessage>,
    ) -> Result<(), NetworkError> {
        if !self.roster.is_known(sender) {
            return Err(ConsensusError::ConnectFromUnknownValidator(sender.clone()).into());
        }
        let signer_key = PublicKey::from_address(sender)
            .map_err(|e| NetworkError::SendFailed {
                endpoint: sender.clone(),
                reason: e.to_string(),
            })?;
        envelope
            .verify(&self.network_id, &signer_key)
            .map_err(|e| NetworkError::SendFailed {
                endpoint: sender.clone(),
                reason: e.to_string(),
            })?;

        self.roster.upsert(sender.clone(), envelope.body.endpoint.clone());
        for validator in &envelope.body.validators {
            if !self.roster.is_known(validator) {
                tracing::debug!(%validator, "learned new validator from handshake");
            }
            self.roster.learn(validator.clone());
        }
        Ok(())
    }

    /// Looks up the endpoint for `validator`, failing if the connection
    /// manager has none on file.
    pub fn endpoint_for(&self, validator: &Address) -> Result<String, NetworkError> {
        self.roster
            .endpoint(validator)
            .ok_or_else(|| ConsensusError::EndpointNotFound(validator.clone()).into())
    }

    /// Blocks until at least `required` validators are connected, or
    /// `timeout` elapses.
    pub async fn start(&self, required: usize, timeout: Duration) -> Result<(), NetworkError> {
        wait_for_threshold(&self.roster, required, timeout).await
    }

    /// Fans `message` out to every connected validator.
    pub async fn broadcast(&self, message: Vec<u8>) -> BroadcastReport {
        self.broadcaster.broadcast(&self.roster, message).await
    }
}
