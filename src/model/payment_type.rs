use serde::{Deserialize, Serialize};

/// How a transaction was paid.
///
/// Income categories do not ask for a payment type, but one is still stored with every record.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[default]
    Cash,
    Card,
    #[serde(rename = "UPI")]
    Upi,
}

serde_plain::derive_display_from_serialize!(PaymentType);
serde_plain::derive_fromstr_from_deserialize!(PaymentType);

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [PaymentType::Cash, PaymentType::Card, PaymentType::Upi];
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_names() {
        let names: Vec<String> = PaymentType::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(names, vec!["Cash", "Card", "UPI"]);
    }

    #[test]
    fn test_parse() {
        assert_eq!(PaymentType::from_str("UPI").unwrap(), PaymentType::Upi);
        assert!(PaymentType::from_str("Upi").is_err());
        assert!(PaymentType::from_str("Cheque").is_err());
    }
}
