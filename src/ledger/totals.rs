use crate::model::{FlowClass, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money in and money out across a set of transactions. Never persisted: always derived from the
/// ledger.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub spent: Decimal,
}

impl Totals {
    pub const fn new(income: Decimal, spent: Decimal) -> Self {
        Self { income, spent }
    }

    /// Folds every transaction into a fresh `Totals`.
    pub fn aggregate<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        transactions
            .into_iter()
            .fold(Self::default(), |totals, t| totals.apply(t))
    }

    /// Returns these totals with `transaction` added to the side its category belongs to.
    pub fn apply(self, transaction: &Transaction) -> Self {
        let amount = transaction.amount().value();
        match transaction.flow_class() {
            FlowClass::Income => Self::new(self.income + amount, self.spent),
            FlowClass::Expense => Self::new(self.income, self.spent + amount),
        }
    }

    /// Income minus spending. Negative when more went out than came in.
    pub fn balance(&self) -> Decimal {
        self.income - self.spent
    }

    /// The two values a chart of these totals is drawn from, `(income, spent)`. The chart is only
    /// drawn when both are non-zero, so this is `None` otherwise.
    pub fn chart_series(&self) -> Option<(Decimal, Decimal)> {
        if self.income.is_zero() || self.spent.is_zero() {
            None
        } else {
            Some((self.income, self.spent))
        }
    }
}

/// Computes `(income, spent)` over `transactions`.
pub fn aggregate(transactions: &[Transaction]) -> Totals {
    Totals::aggregate(transactions)
}

/// The totals after `transaction` is appended to a ledger whose totals were `totals`.
pub fn apply_increment(totals: Totals, transaction: &Transaction) -> Totals {
    totals.apply(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Category, PaymentType};
    use chrono::Utc;
    use std::str::FromStr;

    fn t(id: &str, amount: &str, category: Category) -> Transaction {
        Transaction::new(
            id,
            Amount::from_str(amount).unwrap(),
            category,
            PaymentType::Cash,
            Utc::now(),
        )
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            t("1", "50", Category::Salary),
            t("2", "20", Category::Food),
            t("3", "1200", Category::Freelance),
            t("4", "3.5", Category::Coffee),
            t("5", "0", Category::Utilities),
        ]
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[]), Totals::default());
    }

    #[test]
    fn test_aggregate_routes_by_flow_class() {
        let totals = aggregate(&sample());
        assert_eq!(totals.income, dec("1250"));
        assert_eq!(totals.spent, dec("23.5"));
    }

    #[test]
    fn test_increment_matches_aggregate() {
        let ledger = sample();
        for category in Category::ALL {
            let new = t("99", "7.25", category);
            let mut extended = ledger.clone();
            extended.push(new.clone());
            assert_eq!(
                apply_increment(aggregate(&ledger), &new),
                aggregate(&extended),
                "{category}"
            );
        }
    }

    #[test]
    fn test_increment_from_empty_builds_up() {
        let mut totals = Totals::default();
        let mut so_far = Vec::new();
        for transaction in sample() {
            totals = apply_increment(totals, &transaction);
            so_far.push(transaction);
            assert_eq!(totals, aggregate(&so_far));
        }
    }

    #[test]
    fn test_balance() {
        assert_eq!(aggregate(&sample()).balance(), dec("1226.5"));
        let overspent = Totals::new(dec("10"), dec("30"));
        assert_eq!(overspent.balance(), dec("-20"));
    }

    #[test]
    fn test_chart_series_needs_both_sides() {
        assert_eq!(Totals::default().chart_series(), None);
        assert_eq!(Totals::new(dec("50"), Decimal::ZERO).chart_series(), None);
        assert_eq!(Totals::new(Decimal::ZERO, dec("20")).chart_series(), None);
        assert_eq!(
            Totals::new(dec("50"), dec("20")).chart_series(),
            Some((dec("50"), dec("20")))
        );
    }
}
