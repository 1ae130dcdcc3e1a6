//! Vendor menus by weekday and meal slot.

use chrono::Weekday;
use serde::Deserialize;

use tiffin_core::{
    Error, MealType, Menu, MenuId, MenuItem, Page, PageRequest, Result, VendorId, VendorProfile,
};
use tiffin_store::Store;

use crate::validate;

/// Input for creating a menu.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenu {
    /// Vendor serving the menu
    pub vendor: VendorId,
    /// Day of the week
    pub day: Weekday,
    /// Meal slot
    pub meal_type: MealType,
    /// Dishes
    pub items: Vec<MenuItem>,
}

/// Partial update of a menu.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuUpdate {
    /// Replacement dishes
    pub items: Option<Vec<MenuItem>>,
    /// Show or hide the menu
    pub is_available: Option<bool>,
}

/// Listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuFilter {
    /// Menus of this vendor
    pub vendor: Option<VendorId>,
    /// Menus for this day
    pub day: Option<Weekday>,
    /// Menus for this slot
    pub meal_type: Option<MealType>,
}

/// Menu management.
#[derive(Clone, Debug)]
pub struct MenuService {
    store: Store,
}

impl MenuService {
    /// Creates the service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a menu. One menu per vendor, day and meal slot.
    pub fn create(&self, input: NewMenu) -> Result<Menu> {
        let items = clean_items(input.items)?;
        self.store.write(|tx| {
            let vendor = tx.require::<VendorProfile>(input.vendor)?;
            check_food_type(vendor, &items)?;
            let taken = tx.tables().find::<Menu, _>(|m| {
                m.vendor == input.vendor && m.day == input.day && m.meal_type == input.meal_type
            });
            if taken.is_some() {
                return Err(Error::conflict(format!(
                    "vendor already has a {} menu for {}",
                    input.meal_type, input.day
                )));
            }
            let menu = Menu::new(input.vendor, input.day, input.meal_type, items);
            tx.insert(menu.clone())?;
            Ok(menu)
        })
    }

    /// Applies a partial update.
    pub fn update(&self, id: MenuId, update: MenuUpdate) -> Result<Menu> {
        let items = update.items.map(clean_items).transpose()?;
        self.store.write(|tx| {
            let mut menu = tx.require::<Menu>(id)?.clone();
            if let Some(items) = items {
                check_food_type(tx.require::<VendorProfile>(menu.vendor)?, &items)?;
                menu.items = items;
            }
            if let Some(available) = update.is_available {
                menu.is_available = available;
            }
            menu.updated_at = chrono::Utc::now();
            tx.put(menu.clone());
            Ok(menu)
        })
    }

    /// Deletes a menu.
    pub fn delete(&self, id: MenuId) -> Result<Menu> {
        self.store.write(|tx| tx.remove::<Menu>(id))
    }

    /// Fetches a menu.
    pub fn get(&self, id: MenuId) -> Result<Menu> {
        self.store.read(|t| t.require::<Menu>(id).cloned())?
    }

    /// Lists menus by weekday then meal slot.
    pub fn list(&self, filter: &MenuFilter, page: PageRequest) -> Result<Page<Menu>> {
        self.store.read(|t| {
            t.page(
                |m: &Menu| {
                    filter.vendor.is_none_or(|v| m.vendor == v)
                        && filter.day.is_none_or(|d| m.day == d)
                        && filter.meal_type.is_none_or(|s| m.meal_type == s)
                },
                |a, b| {
                    a.day
                        .num_days_from_monday()
                        .cmp(&b.day.num_days_from_monday())
                        .then(a.meal_type.cmp(&b.meal_type))
                        .then(a.vendor.cmp(&b.vendor))
                },
                page,
            )
        })
    }
}

fn clean_items(items: Vec<MenuItem>) -> Result<Vec<MenuItem>> {
    if items.is_empty() {
        return Err(Error::validation_field("items", "at least one item is required"));
    }
    items
        .into_iter()
        .map(|item| {
            Ok(MenuItem {
                name: validate::non_empty("items.name", &item.name)?,
                description: item.description.trim().to_string(),
                food_type: item.food_type,
            })
        })
        .collect()
}

fn check_food_type(vendor: &VendorProfile, items: &[MenuItem]) -> Result<()> {
    match items.iter().find(|i| !vendor.food_type.can_serve(i.food_type)) {
        Some(item) => Err(Error::validation_field(
            "items.food_type",
            format!(
                "'{}' is {} but the vendor serves {}",
                item.name, item.food_type, vendor.food_type
            ),
        )),
        None => Ok(()),
    }
}
