//! Presentation-facing derivations: per-record pastel colors, category glyphs, flow colors, and
//! the date labels shown next to records and drafts.
//!
//! Nothing here draws anything. These functions only choose *what* to draw, and they are pure so
//! that the same record always looks the same across restarts.

use crate::model::{Category, FlowClass};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Amount text color for income records.
pub const INCOME_AMOUNT_COLOR: &str = "#4CAF50";
/// Amount text color for expense records.
pub const EXPENSE_AMOUNT_COLOR: &str = "#FF6B6B";
/// Legend color of the income slice of the totals chart.
pub const INCOME_LEGEND_COLOR: &str = "#b7daae";
/// Legend color of the spent slice of the totals chart.
pub const SPENT_LEGEND_COLOR: &str = "#ffb8a9";

const SATURATION: f64 = 40.0;
const LIGHTNESS: f64 = 85.0;
const HASH_MULTIPLIER: f64 = 0x45d9f3b as f64;

/// An sRGB color. Displays as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The pastel background color for a record with the given display key.
///
/// Same key, same color, on every run.
pub fn display_color(key: f64) -> Rgb {
    let hue = hash_to_hue(key);
    hsl_to_rgb(f64::from(hue), SATURATION, LIGHTNESS)
}

/// Scrambles `key` into a hue in `0..360`.
///
/// The mixing is done the way a JavaScript engine evaluates `((h >> 16) ^ h) * 0x45d9f3b`: the
/// shift and xor operate on the value truncated to a signed 32-bit integer, while the
/// multiplication happens in double precision and is *not* wrapped. Only the next truncation
/// brings it back into 32 bits. Colors already shown to users depend on this exact sequence.
///
/// The final xor always combines two values of the same sign, so the result is never negative.
pub fn hash_to_hue(key: f64) -> i32 {
    let mut hash = key;
    for _ in 0..2 {
        let h = to_int32(hash);
        hash = f64::from((h >> 16) ^ h) * HASH_MULTIPLIER;
    }
    let h = to_int32(hash);
    ((h >> 16) ^ h) % 360
}

/// ECMAScript `ToInt32`: truncate, wrap modulo 2^32, reinterpret as signed. NaN and infinities
/// become 0.
fn to_int32(x: f64) -> i32 {
    if !x.is_finite() {
        return 0;
    }
    x.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
}

/// Standard HSL to RGB conversion. `s` and `l` are percentages.
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let s = s / 100.0;
    let l = l / 100.0;
    let k = |n: f64| (n + h / 30.0) % 12.0;
    let a = s * l.min(1.0 - l);
    let f = |n: f64| l - a * (-1.0_f64).max((k(n) - 3.0).min((9.0 - k(n)).min(1.0)));
    Rgb::new(channel(f(0.0)), channel(f(8.0)), channel(f(4.0)))
}

/// Scales a `0.0..=1.0` intensity to a byte, rounding halves up.
fn channel(intensity: f64) -> u8 {
    (255.0 * intensity + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// The icon font a glyph comes from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum IconSet {
    Ionicons,
    Feather,
}

serde_plain::derive_display_from_serialize!(IconSet);

/// A named glyph in an icon set.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Icon {
    pub set: IconSet,
    pub name: &'static str,
}

impl Icon {
    const fn new(set: IconSet, name: &'static str) -> Self {
        Self { set, name }
    }
}

impl Display for Icon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.set, self.name)
    }
}

/// Used for anything that is not a known category.
pub const DEFAULT_ICON: Icon = Icon::new(IconSet::Feather, "hash");

/// The glyph shown beside a record. Accepts any text and never fails.
pub fn category_icon(category: &str) -> Icon {
    match category {
        "Salary" => Icon::new(IconSet::Ionicons, "card-outline"),
        "Entertainment" => Icon::new(IconSet::Ionicons, "videocam-outline"),
        "Transport" => Icon::new(IconSet::Feather, "truck"),
        "Shopping" => Icon::new(IconSet::Feather, "shopping-cart"),
        "Coffee" => Icon::new(IconSet::Feather, "coffee"),
        "Freelance" => Icon::new(IconSet::Feather, "briefcase"),
        "Utilities" => Icon::new(IconSet::Feather, "settings"),
        "Snacks" | "Food" => Icon::new(IconSet::Ionicons, "fast-food-outline"),
        _ => DEFAULT_ICON,
    }
}

impl Category {
    pub fn icon(&self) -> Icon {
        category_icon(self.as_str())
    }
}

pub fn amount_color(flow: FlowClass) -> &'static str {
    match flow {
        FlowClass::Income => INCOME_AMOUNT_COLOR,
        FlowClass::Expense => EXPENSE_AMOUNT_COLOR,
    }
}

/// `January 5, 2025`
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// The label for the date on a draft: `Today`, `Yesterday`, `Jan 5`, or `Jan 5, 2024` when the
/// date falls outside the current year.
pub fn relative_date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}
