use crate::model::{Amount, Category, FlowClass, PaymentType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded transaction. Records are created once by the entry workflow and never
/// edited afterwards.
///
/// The persisted form is a JSON object with camelCase keys:
///
/// ```json
/// {"id":"1","amount":50,"category":"Salary","paymentType":"Cash","date":"2025-01-05T10:00:00.000Z"}
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: String,
    amount: Amount,
    category: Category,
    payment_type: PaymentType,
    #[serde(with = "iso8601")]
    date: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        amount: Amount,
        category: Category,
        payment_type: PaymentType,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            category,
            payment_type,
            date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn flow_class(&self) -> FlowClass {
        self.category.flow_class()
    }

    pub fn is_income(&self) -> bool {
        self.category.is_income()
    }

    /// The number used to derive this record's display color.
    ///
    /// Reads an optional sign followed by the leading decimal digits of the id, ignoring
    /// anything after them. An id with no leading digits (a UUID starting with a letter, say)
    /// yields 0. Long digit runs round to the nearest `f64` instead of saturating.
    pub fn display_key(&self) -> f64 {
        leading_number(&self.id)
    }
}

fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value = rest[..len].parse::<f64>().unwrap_or(0.0);
    if negative {
        -value
    } else {
        value
    }
}

/// Dates are written as `2025-01-05T10:00:00.000Z`: UTC, millisecond precision.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| serde::de::Error::custom(format!("Invalid date '{s}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn salary() -> Transaction {
        Transaction::new(
            "1",
            Amount::from(50),
            Category::Salary,
            PaymentType::Cash,
            Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_serialize_persisted_shape() {
        let json = serde_json::to_string(&salary()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"1","amount":50,"category":"Salary","paymentType":"Cash","date":"2025-01-05T10:00:00.000Z"}"#
        );
    }

    #[test]
    fn test_round_trip_is_exact() {
        let json = r#"[{"id":"7","amount":12.5,"category":"Coffee","paymentType":"UPI","date":"2024-11-30T23:59:59.123Z"}]"#;
        let parsed: Vec<Transaction> = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0].payment_type(), PaymentType::Upi);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }

    #[test]
    fn test_deserialize_offset_date() {
        let json = r#"{"id":"1","amount":1,"category":"Food","paymentType":"Card","date":"2025-01-05T12:00:00+02:00"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.date(), Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_deserialize_rejects_unknown_category() {
        let json = r#"{"id":"1","amount":1,"category":"Lottery","paymentType":"Card","date":"2025-01-05T10:00:00.000Z"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_bad_date() {
        let json = r#"{"id":"1","amount":1,"category":"Food","paymentType":"Card","date":"yesterday"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_flow_class() {
        assert!(salary().is_income());
        assert_eq!(salary().flow_class(), FlowClass::Income);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("42"), 42.0);
        assert_eq!(leading_number("  17abc"), 17.0);
        assert_eq!(leading_number("-5"), -5.0);
        assert_eq!(leading_number("3f2a9c1e-uuid"), 3.0);
        assert_eq!(leading_number("abc"), 0.0);
        assert_eq!(leading_number(""), 0.0);
        assert_eq!(leading_number("-"), 0.0);
    }

    #[test]
    fn test_long_ids_round_instead_of_saturating() {
        let t = Transaction::new(
            "99999999999999999999999",
            Amount::from(1),
            Category::Food,
            PaymentType::Cash,
            Utc::now(),
        );
        assert_eq!(t.display_key(), 1e23);
        assert_eq!(crate::display::hash_to_hue(t.display_key()), 133);
    }
}
