//! Food type and meal type vocabularies shared by plans, vendors, and menus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dietary category of a plan, vendor, or menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodType {
    /// Vegetarian only
    Veg,
    /// Non-vegetarian
    NonVeg,
    /// Both vegetarian and non-vegetarian
    Both,
}

impl FoodType {
    /// Returns `true` if a vendor of this type can fulfil a plan of type `plan`.
    ///
    /// A vendor cooking both kinds can serve any plan; otherwise the types
    /// must match exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiffin_core::FoodType;
    ///
    /// assert!(FoodType::Both.can_serve(FoodType::Veg));
    /// assert!(FoodType::Veg.can_serve(FoodType::Veg));
    /// assert!(!FoodType::Veg.can_serve(FoodType::Both));
    /// assert!(!FoodType::NonVeg.can_serve(FoodType::Veg));
    /// ```
    pub fn can_serve(self, plan: FoodType) -> bool {
        self == FoodType::Both || self == plan
    }
}

impl fmt::Display for FoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoodType::Veg => write!(f, "veg"),
            FoodType::NonVeg => write!(f, "non_veg"),
            FoodType::Both => write!(f, "both"),
        }
    }
}

/// Meal slot of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealType::Breakfast => write!(f, "breakfast"),
            MealType::Lunch => write!(f, "lunch"),
            MealType::Dinner => write!(f, "dinner"),
        }
    }
}
