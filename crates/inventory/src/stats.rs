use serde::{Deserialize, Serialize};

use crate::item::InventoryItem;

/// Aggregate figures for the admin overview.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_items: usize,
    pub sold_items: usize,
    /// Sum of `price` over sold items.
    pub total_revenue: f64,
}

impl InventoryStats {
    pub fn from_items(items: &[InventoryItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_items += 1;
            if item.is_history() {
                acc.sold_items += 1;
                acc.total_revenue += item.price();
            }
            acc
        })
    }
}
