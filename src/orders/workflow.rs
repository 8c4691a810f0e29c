// SPDX-License-Identifier: MIT
// orders/workflow.rs — Order status workflow and transition policy.
//
// The status set is closed; display ordering comes from the order_statuses
// table's sequence_order column, not from this enum. What this module owns
// is the transition rule set: operators used to be able to set any status
// from any status, which is kept available as `TransitionPolicy::Any` but is
// no longer the silent default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a status transition was refused.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("order not found")]
    OrderNotFound,
    #[error("order has unknown status {0:?}")]
    UnknownStatus(String),
    #[error("transition {from} -> {to} not allowed by policy")]
    NotAllowed {
        from: &'static str,
        to: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Position on the main fulfilment sequence, `None` for the terminal
    /// side states.
    fn sequence_position(&self) -> Option<usize> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Processing => Some(2),
            Self::Shipped => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled | Self::Refunded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

/// Which transitions an admin may perform (`transition_policy` in
/// config.toml).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// One step forward along the fulfilment sequence; cancellation before
    /// shipping; refund after delivery or cancellation. Refunded is terminal.
    #[default]
    Linear,
    /// Any status from any status, with no validation.
    Any,
}

impl TransitionPolicy {
    pub fn allows(&self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            Self::Any => true,
            Self::Linear => {
                if from == to {
                    return false;
                }
                match to {
                    OrderStatus::Cancelled => matches!(
                        from,
                        OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
                    ),
                    OrderStatus::Refunded => {
                        matches!(from, OrderStatus::Delivered | OrderStatus::Cancelled)
                    }
                    _ => match (from.sequence_position(), to.sequence_position()) {
                        (Some(a), Some(b)) => b == a + 1,
                        _ => false,
                    },
                }
            }
        }
    }
}
