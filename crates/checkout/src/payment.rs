//! Payment method selection.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use tillpoint_core::DomainError;

/// Closed set of accepted payment methods.
///
/// Exactly one must be chosen before payment processing can start; the
/// register enforces this by requiring the method on the start-payment
/// command itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Contactless,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Card, PaymentMethod::Contactless];

    /// Stable machine identifier.
    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Contactless => "contactless",
        }
    }

    /// Human-facing label.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::Contactless => "Contactless Payment",
        }
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "contactless" => Ok(PaymentMethod::Contactless),
            other => Err(DomainError::validation(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_ids() {
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!(
            " Contactless ".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Contactless
        );
    }

    #[test]
    fn parse_rejects_unknown_method() {
        let err = "cash".parse::<PaymentMethod>().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn display_uses_human_label() {
        assert_eq!(PaymentMethod::Card.to_string(), "Credit/Debit Card");
    }
}
