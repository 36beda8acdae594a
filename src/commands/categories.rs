use crate::commands::Out;
use crate::model::{Category, FlowClass, PaymentType};
use serde::Serialize;

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub name: Category,
    pub flow_class: FlowClass,
    pub icon: String,
}

/// The closed taxonomy: every category and every payment type, in the order they are offered.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Taxonomy {
    pub categories: Vec<CategoryInfo>,
    pub payment_types: Vec<PaymentType>,
}

pub fn categories() -> Out<Taxonomy> {
    let taxonomy = Taxonomy {
        categories: Category::ALL
            .iter()
            .map(|c| CategoryInfo {
                name: *c,
                flow_class: c.flow_class(),
                icon: c.icon().to_string(),
            })
            .collect(),
        payment_types: PaymentType::ALL.to_vec(),
    };

    let mut message = String::from("Categories:");
    for info in &taxonomy.categories {
        message.push_str(&format!(
            "\n  {:<13} {:<7} {}",
            info.name.as_str(),
            info.flow_class.to_string(),
            info.icon
        ));
    }
    let payment_types: Vec<String> = taxonomy
        .payment_types
        .iter()
        .map(|p| p.to_string())
        .collect();
    message.push_str(&format!("\nPayment types: {}", payment_types.join(", ")));
    Out::new(message, taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let out = categories();
        let taxonomy = out.structure().unwrap();
        assert_eq!(taxonomy.categories.len(), 9);
        let income: Vec<Category> = taxonomy
            .categories
            .iter()
            .filter(|c| c.flow_class == FlowClass::Income)
            .map(|c| c.name)
            .collect();
        assert_eq!(income, vec![Category::Salary, Category::Freelance]);
        assert!(out.message().ends_with("Payment types: Cash, Card, UPI"));
        assert!(out.message().contains("Coffee        expense Feather:coffee"));
    }
}
