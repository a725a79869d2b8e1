//! Field values for model items.
//!
//! Every item exposes one value per field (column). [`ItemData`] is the
//! container those values travel in, and [`compare_item_data`]
//! is the ordering sorting uses when a model does not supply its own.

use std::cmp::Ordering;

/// Check state for checkable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is partially checked (for tri-state checkboxes).
    PartiallyChecked,
    /// Item is checked.
    Checked,
}

/// Container for a field value.
///
/// # Example
///
/// ```
/// use canopy::model::ItemData;
///
/// let data = ItemData::from("Hello");
/// assert_eq!(data.as_string(), Some("Hello"));
/// assert_eq!(ItemData::from(42u32).as_int(), Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data.
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Check state data.
    CheckState(CheckState),
}

impl ItemData {
    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Rank of the variant, used to order values of different kinds.
    fn kind_rank(&self) -> u8 {
        match self {
            ItemData::None => 0,
            ItemData::Bool(_) => 1,
            ItemData::Int(_) | ItemData::Float(_) => 2,
            ItemData::String(_) => 3,
            ItemData::CheckState(_) => 4,
        }
    }
}

/// Compares two field values for sorting.
///
/// This is a total order: `None` sorts first, integers and floats compare
/// by exact numeric value, NaN sorts after every other number, and values
/// of unrelated kinds are ordered by kind.
pub fn compare_item_data(a: &ItemData, b: &ItemData) -> Ordering {
    match (a, b) {
        (ItemData::String(sa), ItemData::String(sb)) => sa.cmp(sb),
        (ItemData::Int(ia), ItemData::Int(ib)) => ia.cmp(ib),
        (ItemData::Float(fa), ItemData::Float(fb)) => compare_floats(*fa, *fb),
        (ItemData::Int(ia), ItemData::Float(fb)) => compare_int_float(*ia, *fb),
        (ItemData::Float(fa), ItemData::Int(ib)) => compare_int_float(*ib, *fa).reverse(),
        (ItemData::Bool(ba), ItemData::Bool(bb)) => ba.cmp(bb),
        (ItemData::CheckState(sa), ItemData::CheckState(sb)) => {
            check_rank(*sa).cmp(&check_rank(*sb))
        }
        _ => a.kind_rank().cmp(&b.kind_rank()),
    }
}

/// NaNs are equal to each other and greater than any number. `-0.0`
/// equals `0.0`.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer with a float.
///
/// Converting `i` to `f64` rounds above 2^53, so the float is split into
/// its integral part (compared as `i64`) and its fractional part.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, exactly representable.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    // In range: -2^63 <= whole < 2^63.
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => {
            let fraction = f - whole;
            if fraction > 0.0 {
                Ordering::Less
            } else if fraction < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

fn check_rank(state: CheckState) -> u8 {
    match state {
        CheckState::Unchecked => 0,
        CheckState::PartiallyChecked => 1,
        CheckState::Checked => 2,
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<i32> for ItemData {
    fn from(n: i32) -> Self {
        ItemData::Int(i64::from(n))
    }
}

impl From<u32> for ItemData {
    fn from(n: u32) -> Self {
        ItemData::Int(i64::from(n))
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<CheckState> for ItemData {
    fn from(s: CheckState) -> Self {
        ItemData::CheckState(s)
    }
}
