//! Order status state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order in its lifecycle.
///
/// Expected flow:
/// ```text
/// Pending ──► Confirmed ──► Preparing ──► OutForDelivery ──► Delivered
///    │            │             │                │
///    └────────────┴─────────────┴────────────────┴──► Cancelled
/// ```
/// `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order placed, awaiting restaurant confirmation.
    #[default]
    Pending,

    /// Restaurant accepted the order.
    Confirmed,

    /// Kitchen is preparing the order.
    Preparing,

    /// Order left the restaurant.
    OutForDelivery,

    /// Order handed to the customer (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

/// A status tag that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    /// Every status, in happy-path order with `Cancelled` last.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position along the happy path. `Cancelled` has no position.
    fn step(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Preparing => Some(2),
            OrderStatus::OutForDelivery => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Returns the wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Outcome of an accepted status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The status changes.
    Changed,
    /// The order already has the requested status.
    Unchanged,
}

/// A rejected status request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The order is in a terminal state.
    #[error("order is already {from} and its status can no longer change")]
    Terminal { from: OrderStatus },

    /// The policy does not allow this edge.
    #[error("cannot move order from {from} to {to}")]
    Illegal { from: OrderStatus, to: OrderStatus },
}

/// Which edges of the state machine are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitionPolicy {
    /// Any change out of a non-terminal status.
    #[default]
    TerminalOnly,

    /// Forward along the happy path (skipping allowed), or cancellation.
    Forward,
}

impl TransitionPolicy {
    /// Decides whether `from` may move to `to`.
    ///
    /// Terminal states reject every request, including a repeat of the
    /// current status. A repeat on a non-terminal state is `Unchanged`.
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> Result<Transition, TransitionError> {
        if from.is_terminal() {
            return Err(TransitionError::Terminal { from });
        }
        if from == to {
            return Ok(Transition::Unchanged);
        }
        match self {
            TransitionPolicy::TerminalOnly => Ok(Transition::Changed),
            TransitionPolicy::Forward => {
                let forward = match (from.step(), to.step()) {
                    (_, None) => true,
                    (Some(a), Some(b)) => b > a,
                    (None, Some(_)) => false,
                };
                if forward {
                    Ok(Transition::Changed)
                } else {
                    Err(TransitionError::Illegal { from, to })
                }
            }
        }
    }

    /// Statuses from which a request for `to` produces an actual change.
    pub fn sources(&self, to: OrderStatus) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|from| self.check(*from, to) == Ok(Transition::Changed))
            .collect()
    }

    /// Returns the configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPolicy::TerminalOnly => "terminal-only",
            TransitionPolicy::Forward => "forward",
        }
    }
}

impl std::fmt::Display for TransitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "terminal-only" | "terminal_only" => Ok(TransitionPolicy::TerminalOnly),
            "forward" => Ok(TransitionPolicy::Forward),
            other => Err(format!("unknown transition policy: {other}")),
        }
    }
}
