use serde::{Deserialize, Serialize};

use consign_core::DomainError;
use consign_inventory::{
    InventoryItem, ItemPatch, ItemStatus, SearchDirective, SortDirection, SortDirective, SortField,
};

// -------------------------
// Request DTOs
// -------------------------

/// `GET /inventory/items?search=&sort=&direction=`
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl ListItemsQuery {
    pub fn directives(&self) -> Result<(SearchDirective, SortDirective), DomainError> {
        let search = SearchDirective::new(self.search.clone().unwrap_or_default());

        let sort = match self.sort.as_deref().filter(|s| !s.is_empty()) {
            None => SortDirective::none(),
            Some(field) => {
                let direction = match self.direction.as_deref().filter(|d| !d.is_empty()) {
                    Some(d) => d.parse::<SortDirection>()?,
                    None => SortDirection::Asc,
                };
                SortDirective::by(field.parse::<SortField>()?, direction)
            }
        };

        Ok((search, sort))
    }
}

/// `PATCH /inventory/items/:id`. `status` arrives as text so that an unknown
/// value is reported as an invalid state rather than a body error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditItemRequest {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub consignor_name: Option<String>,
    pub status: Option<String>,
    pub image_url: Option<String>,
}

impl EditItemRequest {
    pub fn into_patch(self) -> Result<ItemPatch, DomainError> {
        Ok(ItemPatch {
            sku: self.sku,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            consignor_name: self.consignor_name,
            status: self.status.as_deref().map(str::parse::<ItemStatus>).transpose()?,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageUploadQuery {
    pub filename: String,
}

// -------------------------
// Response DTOs
// -------------------------

/// One sortable column header: its arrow (if active) and the directive a
/// click on it yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortHeader {
    pub field: SortField,
    pub indicator: Option<SortDirection>,
    pub on_click: SortDirective,
}

pub fn sort_headers(active: SortDirective) -> Vec<SortHeader> {
    SortField::ALL
        .into_iter()
        .map(|field| SortHeader {
            field,
            indicator: active.indicator(field),
            on_click: active.select(field),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListResponse {
    pub items: Vec<InventoryItem>,
    pub search: SearchDirective,
    pub sort: SortDirective,
    pub headers: Vec<SortHeader>,
}

/// What the detail view offers for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_edit_image: bool,
    pub can_delete: bool,
    pub show_qr: bool,
}

impl Capabilities {
    /// Image upload, delete and QR code all enabled.
    pub fn full() -> Self {
        Self {
            can_edit_image: true,
            can_delete: true,
            show_qr: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetailResponse {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub capabilities: Capabilities,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_url: Option<String>,
}

impl ItemDetailResponse {
    pub fn new(item: InventoryItem, capabilities: Capabilities, public_base_url: &str) -> Self {
        let qr_url = capabilities
            .show_qr
            .then(|| format!("{}/item/{}", public_base_url.trim_end_matches('/'), item.id_typed()));
        Self {
            item,
            capabilities,
            qr_url,
        }
    }
}
