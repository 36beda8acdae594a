//! The closed set of transaction categories, their flow classes, and the tabs used to filter by
//! them.

use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// What a transaction is for. The set is closed: there are no user-defined categories.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Salary,
    Entertainment,
    Transport,
    Shopping,
    Coffee,
    Freelance,
    Utilities,
    Snacks,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every category, in the order they are offered to the user.
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Salary,
        Category::Entertainment,
        Category::Transport,
        Category::Shopping,
        Category::Coffee,
        Category::Freelance,
        Category::Utilities,
        Category::Snacks,
    ];

    /// The category a new draft starts with.
    pub const DEFAULT: Category = Category::Food;

    /// Whether money recorded under this category is coming in or going out.
    pub const fn flow_class(&self) -> FlowClass {
        match self {
            Category::Salary | Category::Freelance => FlowClass::Income,
            Category::Food
            | Category::Entertainment
            | Category::Transport
            | Category::Shopping
            | Category::Coffee
            | Category::Utilities
            | Category::Snacks => FlowClass::Expense,
        }
    }

    pub const fn is_income(&self) -> bool {
        matches!(self.flow_class(), FlowClass::Income)
    }

    /// The canonical name, e.g. `"Coffee"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Salary => "Salary",
            Category::Entertainment => "Entertainment",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Coffee => "Coffee",
            Category::Freelance => "Freelance",
            Category::Utilities => "Utilities",
            Category::Snacks => "Snacks",
        }
    }
}

/// Returns true iff `category` names an income category (Salary or Freelance). Unknown names are
/// not income.
pub fn is_income_category(category: &str) -> bool {
    Category::from_str(category)
        .map(|c| c.is_income())
        .unwrap_or(false)
}

/// The binary classification of a category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowClass {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(FlowClass);
serde_plain::derive_fromstr_from_deserialize!(FlowClass);

/// The filter selector above the transaction list: either everything or a single category.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Tab {
    #[default]
    All,
    Category(Category),
}

const ALL_STR: &str = "All";

impl Tab {
    /// All tabs in display order: `All` followed by every category.
    pub fn all() -> impl Iterator<Item = Tab> {
        std::iter::once(Tab::All).chain(Category::ALL.into_iter().map(Tab::Category))
    }

    /// Returns true when a transaction in `category` belongs under this tab.
    pub fn admits(&self, category: Category) -> bool {
        match self {
            Tab::All => true,
            Tab::Category(c) => *c == category,
        }
    }
}

impl Display for Tab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tab::All => f.write_str(ALL_STR),
            Tab::Category(c) => f.write_str(c.as_str()),
        }
    }
}

impl FromStr for Tab {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == ALL_STR {
            return Ok(Tab::All);
        }
        match Category::from_str(s) {
            Ok(c) => Ok(Tab::Category(c)),
            Err(_) => bail!("'{s}' is not a tab, expected 'All' or a category name"),
        }
    }
}

impl From<Category> for Tab {
    fn from(value: Category) -> Self {
        Tab::Category(value)
    }
}

impl Serialize for Tab {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Tab {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tab::from_str(&s).map_err(serde::de::Error::custom)
    }
}
