//! Vendor menus.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::{FoodType, MealType, MenuId, VendorId};

/// A dish on a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Dish name
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Dietary category
    pub food_type: FoodType,
}

/// What a vendor serves for one meal slot on one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    /// Unique identifier
    pub id: MenuId,
    /// Vendor serving the menu
    pub vendor: VendorId,
    /// Day of the week
    pub day: Weekday,
    /// Meal slot
    pub meal_type: MealType,
    /// Dishes
    pub items: Vec<MenuItem>,
    /// Hidden menus are not listed to subscribers
    pub is_available: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Menu {
    /// Creates an available menu.
    pub fn new(vendor: VendorId, day: Weekday, meal_type: MealType, items: Vec<MenuItem>) -> Self {
        let now = Utc::now();
        Self {
            id: MenuId::new(),
            vendor,
            day,
            meal_type,
            items,
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Dietary category implied by the items: `Both` when mixed.
    pub fn food_type(&self) -> Option<FoodType> {
        let mut types = self.items.iter().map(|item| item.food_type);
        let first = types.next()?;
        Some(if types.all(|t| t == first) {
            first
        } else {
            FoodType::Both
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, food_type: FoodType) -> MenuItem {
        MenuItem {
            name: name.to_string(),
            description: String::new(),
            food_type,
        }
    }

    #[test]
    fn test_menu_food_type() {
        let vendor = VendorId::new();
        let veg = Menu::new(
            vendor,
            Weekday::Mon,
            MealType::Lunch,
            vec![item("Dal", FoodType::Veg), item("Rice", FoodType::Veg)],
        );
        assert_eq!(veg.food_type(), Some(FoodType::Veg));

        let mixed = Menu::new(
            vendor,
            Weekday::Mon,
            MealType::Dinner,
            vec![item("Dal", FoodType::Veg), item("Chicken curry", FoodType::NonVeg)],
        );
        assert_eq!(mixed.food_type(), Some(FoodType::Both));

        let empty = Menu::new(vendor, Weekday::Tue, MealType::Breakfast, vec![]);
        assert_eq!(empty.food_type(), None);
    }
}
