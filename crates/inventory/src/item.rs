use core::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use consign_core::{DomainError, DomainResult, Entity, ItemId};

/// Workflow state of a consignment item.
///
/// Flat, no ordering between states, none terminal: any state is reachable
/// from any other in one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "on hold")]
    OnHold,
    #[serde(rename = "sold")]
    Sold,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Available, ItemStatus::OnHold, ItemStatus::Sold];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::OnHold => "on hold",
            ItemStatus::Sold => "sold",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    /// Exact match against the wire values; anything else is `InvalidState`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::invalid_state(s))
    }
}

/// Fields supplied by the add-item flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub consignor_name: String,
}

impl NewItem {
    /// Required text fields must be non-empty. Price and quantity are not
    /// range-checked.
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty("sku", &self.sku)?;
        require_non_empty("name", &self.name)?;
        require_non_empty("consignorName", &self.consignor_name)?;
        Ok(())
    }
}

/// Partial field set for the edit flow. `id` and `dateAdded` are not editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consignor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ItemPatch {
    /// Mutation intent produced by a status change: only `status` is written.
    pub fn status_only(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Mutation intent produced by an image upload.
    pub fn image_only(url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(sku) = &self.sku {
            require_non_empty("sku", sku)?;
        }
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(consignor) = &self.consignor_name {
            require_non_empty("consignorName", consignor)?;
        }
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// A consignment inventory record.
///
/// `id` and `date_added` are fixed once the record exists; every other field
/// changes only through [`InventoryItem::apply_patch`], [`transition`] or
/// [`InventoryItem::with_image`], each of which returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    id: ItemId,
    sku: String,
    name: String,
    price: f64,
    quantity: i64,
    consignor_name: String,
    #[serde(default)]
    status: ItemStatus,
    date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl InventoryItem {
    /// Build a freshly inserted record: status `available`, `dateAdded` stamped
    /// from `date_added` as an ISO-8601 string.
    pub fn create(id: ItemId, new: NewItem, date_added: DateTime<Utc>) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self::restore(
            id,
            new,
            ItemStatus::Available,
            date_added.to_rfc3339_opts(SecondsFormat::Millis, true),
            None,
        ))
    }

    /// Rehydrate a record exactly as a gateway stored it (no validation).
    pub fn restore(
        id: ItemId,
        fields: NewItem,
        status: ItemStatus,
        date_added: String,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id,
            sku: fields.sku,
            name: fields.name,
            price: fields.price,
            quantity: fields.quantity,
            consignor_name: fields.consignor_name,
            status,
            date_added,
            image_url,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn consignor_name(&self) -> &str {
        &self.consignor_name
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn date_added(&self) -> &str {
        &self.date_added
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Membership in the sales-history view. Evaluated on the current status
    /// every time; a sold item moved back to `available` drops out.
    pub fn is_history(&self) -> bool {
        self.status == ItemStatus::Sold
    }

    /// Apply an edit, returning the edited copy.
    pub fn apply_patch(&self, patch: &ItemPatch) -> DomainResult<Self> {
        patch.validate()?;

        let mut next = self.clone();
        if let Some(sku) = &patch.sku {
            next.sku = sku.clone();
        }
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if let Some(quantity) = patch.quantity {
            next.quantity = quantity;
        }
        if let Some(consignor) = &patch.consignor_name {
            next.consignor_name = consignor.clone();
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(url) = &patch.image_url {
            next.image_url = Some(url.clone());
        }
        Ok(next)
    }

    /// Set (or overwrite) the uploaded image location.
    pub fn with_image(&self, url: impl Into<String>) -> Self {
        Self {
            image_url: Some(url.into()),
            ..self.clone()
        }
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Status change: a copy of `item` with only `status` replaced.
///
/// Persisting the new status is the caller's job (see `ItemPatch::status_only`).
pub fn transition(item: &InventoryItem, target: ItemStatus) -> InventoryItem {
    InventoryItem {
        status: target,
        ..item.clone()
    }
}

/// Status change from an untrusted status string.
///
/// Rejects anything outside the three recognized values with `InvalidState`.
pub fn transition_to(item: &InventoryItem, target: &str) -> DomainResult<InventoryItem> {
    let target = target.parse::<ItemStatus>()?;
    Ok(transition(item, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn test_new_item() -> NewItem {
        NewItem {
            sku: "B1".to_string(),
            name: "Oak chair".to_string(),
            price: 10.0,
            quantity: 1,
            consignor_name: "Alice".to_string(),
        }
    }

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn test_item() -> InventoryItem {
        InventoryItem::create(ItemId::new(), test_new_item(), test_time()).unwrap()
    }

    #[test]
    fn create_defaults_to_available_and_stamps_date() {
        let item = test_item();
        assert_eq!(item.status(), ItemStatus::Available);
        assert_eq!(item.date_added(), "2024-03-01T12:00:00.000Z");
        assert!(item.image_url().is_none());
    }

    #[test]
    fn create_rejects_blank_required_fields() {
        for field in ["sku", "name", "consignorName"] {
            let mut new = test_new_item();
            match field {
                "sku" => new.sku = "  ".to_string(),
                "name" => new.name = String::new(),
                _ => new.consignor_name = String::new(),
            }
            let err = InventoryItem::create(ItemId::new(), new, test_time()).unwrap_err();
            match err {
                DomainError::Validation(msg) => assert!(msg.starts_with(field)),
                other => panic!("expected Validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn create_does_not_range_check_numbers() {
        let mut new = test_new_item();
        new.price = -3.5;
        new.quantity = -1;
        assert!(InventoryItem::create(ItemId::new(), new, test_time()).is_ok());
    }

    #[test]
    fn status_wire_values() {
        assert_eq!(serde_json::to_string(&ItemStatus::OnHold).unwrap(), "\"on hold\"");
        assert_eq!("on hold".parse::<ItemStatus>().unwrap(), ItemStatus::OnHold);
        assert_eq!("sold".parse::<ItemStatus>().unwrap(), ItemStatus::Sold);
    }

    #[test]
    fn unknown_status_is_invalid_state() {
        for bad in ["Sold", "on_hold", "", "reserved"] {
            let err = bad.parse::<ItemStatus>().unwrap_err();
            assert_eq!(err, DomainError::InvalidState(bad.to_string()));
        }
    }

    #[test]
    fn transition_to_sold_enters_history() {
        let item = test_item();
        assert!(!item.is_history());

        let sold = transition(&item, ItemStatus::Sold);
        assert_eq!(sold.status(), ItemStatus::Sold);
        assert!(sold.is_history());
        assert_eq!(transition(&sold, item.status()), item);
    }

    #[test]
    fn sold_is_not_terminal() {
        let sold = transition(&test_item(), ItemStatus::Sold);
        let back = transition(&sold, ItemStatus::OnHold);
        assert_eq!(back.status(), ItemStatus::OnHold);
        assert!(!back.is_history());
    }

    #[test]
    fn transition_to_rejects_unknown_target() {
        let item = test_item();
        let err = transition_to(&item, "lost").unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(transition_to(&item, "on hold").unwrap().status(), ItemStatus::OnHold);
    }

    #[test]
    fn patch_keeps_id_and_date() {
        let item = test_item();
        let patch = ItemPatch {
            sku: Some("C9".to_string()),
            price: Some(42.5),
            status: Some(ItemStatus::OnHold),
            ..ItemPatch::default()
        };
        let edited = item.apply_patch(&patch).unwrap();

        assert_eq!(edited.id(), item.id());
        assert_eq!(edited.date_added(), item.date_added());
        assert_eq!(edited.sku(), "C9");
        assert_eq!(edited.price(), 42.5);
        assert_eq!(edited.status(), ItemStatus::OnHold);
        assert_eq!(edited.name(), item.name());
    }

    #[test]
    fn patch_rejects_blank_name() {
        let patch = ItemPatch {
            name: Some(" ".to_string()),
            ..ItemPatch::default()
        };
        assert!(matches!(
            test_item().apply_patch(&patch),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn patch_deserializes_partial_json_and_ignores_id() {
        let patch: ItemPatch = serde_json::from_str(
            r#"{"id":"ignored","consignorName":"Carol","status":"sold"}"#,
        )
        .unwrap();
        assert_eq!(patch.consignor_name.as_deref(), Some("Carol"));
        assert_eq!(patch.status, Some(ItemStatus::Sold));
        assert!(patch.sku.is_none());
    }

    #[test]
    fn image_upload_overwrites_url() {
        let item = test_item().with_image("memory://a.png");
        let item = item.with_image("memory://b.png");
        assert_eq!(item.image_url(), Some("memory://b.png"));
    }

    #[test]
    fn item_json_uses_camel_case() {
        let json = serde_json::to_value(test_item()).unwrap();
        assert_eq!(json["consignorName"], "Alice");
        assert_eq!(json["status"], "available");
        assert!(json.get("imageUrl").is_none());
        assert!(json.get("dateAdded").is_some());
    }

    fn status_strategy() -> impl Strategy<Value = ItemStatus> {
        prop_oneof![
            Just(ItemStatus::Available),
            Just(ItemStatus::OnHold),
            Just(ItemStatus::Sold),
        ]
    }

    proptest! {
        /// Property: a transition changes `status` and nothing else, and leaves
        /// the input untouched.
        #[test]
        fn transition_only_changes_status(
            from in status_strategy(),
            to in status_strategy(),
            price in -1.0e6f64..1.0e6f64,
            quantity in -100i64..100i64,
        ) {
            let mut new = test_new_item();
            new.price = price;
            new.quantity = quantity;
            let item = transition(
                &InventoryItem::create(ItemId::new(), new, test_time()).unwrap(),
                from,
            );
            let before = item.clone();

            let next = transition(&item, to);

            prop_assert_eq!(&item, &before);
            prop_assert_eq!(next.status(), to);
            prop_assert_eq!(next.is_history(), to == ItemStatus::Sold);
            prop_assert_eq!(transition(&next, from), item);
        }
    }
}
