//! Static property catalog: read-only board data supplied to the engine.
//!
//! The standard board is compiled in. Custom boards can be loaded from a JSON
//! file whose entries use the same field names as [`Property`], which lets a
//! game host tweak prices or add house-rule squares without recompiling.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ledger::errors::StoreError;
use crate::ledger::types::MAX_IMPROVEMENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorGroup {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    Blue,
    Railroad,
    Utility,
    /// Corner and tax squares, only purchasable in buy-everything games.
    #[serde(rename = "purple")]
    Corner,
}

impl ColorGroup {
    /// Streets are the only squares that take houses and follow the
    /// double-rent rule for a complete set.
    pub fn is_street(self) -> bool {
        !matches!(self, Self::Railroad | Self::Utility | Self::Corner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub color: ColorGroup,
    pub price: i64,
    /// Indexed by improvement level for streets, by railroads owned minus one
    /// for railroads, empty for utilities.
    pub rent: Vec<i64>,
    pub house_cost: i64,
    pub mortgage_value: i64,
    pub group_size: usize,
    #[serde(default)]
    pub buy_everything_only: bool,
}

impl Property {
    pub fn is_buildable(&self) -> bool {
        self.house_cost > 0
    }

    /// Cost to lift a mortgage: mortgage value plus 10%, rounded up.
    pub fn unmortgage_cost(&self) -> i64 {
        (self.mortgage_value * 11 + 9) / 10
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyCatalog {
    properties: Vec<Property>,
}

impl Default for PropertyCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl PropertyCatalog {
    /// Build a catalog from explicit entries, checking ids are unique and
    /// street rent tables cover every improvement level.
    pub fn new(properties: Vec<Property>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for prop in &properties {
            if !seen.insert(prop.id.as_str()) {
                return Err(StoreError::InvalidCatalog(format!(
                    "duplicate property id '{}'",
                    prop.id
                )));
            }
            if prop.is_buildable() && prop.rent.len() <= MAX_IMPROVEMENT as usize {
                return Err(StoreError::InvalidCatalog(format!(
                    "'{}' is buildable but lists {} rent tiers",
                    prop.id,
                    prop.rent.len()
                )));
            }
        }
        Ok(Self { properties })
    }

    /// Load a catalog from a JSON array of properties.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let properties: Vec<Property> = serde_json::from_str(&contents)?;
        Self::new(properties)
    }

    pub fn get(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn group(&self, color: ColorGroup) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(move |p| p.color == color)
    }

    /// Properties a game with the given buy-everything setting may sell.
    pub fn purchasable(&self, buy_everything: bool) -> impl Iterator<Item = &Property> {
        self.properties
            .iter()
            .filter(move |p| buy_everything || !p.buy_everything_only)
    }

    /// The classic board plus the six corner/tax squares of buy-everything games.
    pub fn standard() -> Self {
        use ColorGroup::*;

        let properties = vec![
            street("mediterranean", "Mediterranean Ave", Brown, 60, [2, 10, 30, 90, 160, 250], 50, 30, 2),
            street("baltic", "Baltic Ave", Brown, 60, [4, 20, 60, 180, 320, 450], 50, 30, 2),
            railroad("reading_rr", "Reading Railroad"),
            street("oriental", "Oriental Ave", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50, 50, 3),
            street("vermont", "Vermont Ave", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50, 50, 3),
            street("connecticut", "Connecticut Ave", LightBlue, 120, [8, 40, 100, 300, 450, 600], 50, 60, 3),
            street("st_charles", "St. Charles Place", Pink, 140, [10, 50, 150, 450, 625, 750], 100, 70, 3),
            utility("electric_co", "Electric Company"),
            street("states", "States Ave", Pink, 140, [10, 50, 150, 450, 625, 750], 100, 70, 3),
            street("virginia", "Virginia Ave", Pink, 160, [12, 60, 180, 500, 700, 900], 100, 80, 3),
            railroad("pennsylvania_rr", "Pennsylvania Railroad"),
            street("st_james", "St. James Place", Orange, 180, [14, 70, 200, 550, 750, 950], 100, 90, 3),
            street("tennessee", "Tennessee Ave", Orange, 180, [14, 70, 200, 550, 750, 950], 100, 90, 3),
            street("new_york", "New York Ave", Orange, 200, [16, 80, 220, 600, 800, 1000], 100, 100, 3),
            street("kentucky", "Kentucky Ave", Red, 220, [18, 90, 250, 700, 875, 1050], 150, 110, 3),
            street("indiana", "Indiana Ave", Red, 220, [18, 90, 250, 700, 875, 1050], 150, 110, 3),
            street("illinois", "Illinois Ave", Red, 240, [20, 100, 300, 750, 925, 1100], 150, 120, 3),
            railroad("b_o_rr", "B. & O. Railroad"),
            street("atlantic", "Atlantic Ave", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150, 130, 3),
            street("ventnor", "Ventnor Ave", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150, 130, 3),
            utility("water_works", "Water Works"),
            street("marvin", "Marvin Gardens", Yellow, 280, [24, 120, 360, 850, 1025, 1200], 150, 140, 3),
            street("pacific", "Pacific Ave", Green, 300, [26, 130, 390, 900, 1100, 1275], 200, 150, 3),
            street("north_carolina", "North Carolina Ave", Green, 300, [26, 130, 390, 900, 1100, 1275], 200, 150, 3),
            street("pennsylvania", "Pennsylvania Ave", Green, 320, [28, 150, 450, 1000, 1200, 1400], 200, 160, 3),
            railroad("short_line", "Short Line"),
            street("park_place", "Park Place", Blue, 350, [35, 175, 500, 1100, 1300, 1500], 200, 175, 2),
            street("boardwalk", "Boardwalk", Blue, 400, [50, 200, 600, 1400, 1700, 2000], 200, 200, 2),
            corner("jail", "Jail", 125, 50, 250),
            corner("just_visiting", "Just Visiting", 125, 40, 250),
            corner("free_parking_spot", "Free Parking Square", 125, 50, 250),
            corner("go_square", "GO Square", 125, 200, 500),
            corner("income_tax", "Income Tax Square", 200, 25, 100),
            corner("luxury_tax", "Luxury Tax Square", 200, 100, 100),
        ];

        Self { properties }
    }
}

#[allow(clippy::too_many_arguments)]
fn street(
    id: &str,
    name: &str,
    color: ColorGroup,
    price: i64,
    rent: [i64; 6],
    house_cost: i64,
    mortgage_value: i64,
    group_size: usize,
) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        color,
        price,
        rent: rent.to_vec(),
        house_cost,
        mortgage_value,
        group_size,
        buy_everything_only: false,
    }
}

fn railroad(id: &str, name: &str) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        color: ColorGroup::Railroad,
        price: 200,
        rent: vec![25, 50, 100, 200],
        house_cost: 0,
        mortgage_value: 100,
        group_size: 4,
        buy_everything_only: false,
    }
}

fn utility(id: &str, name: &str) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        color: ColorGroup::Utility,
        price: 150,
        rent: Vec::new(),
        house_cost: 0,
        mortgage_value: 75,
        group_size: 2,
        buy_everything_only: false,
    }
}

fn corner(id: &str, name: &str, price: i64, rent: i64, mortgage_value: i64) -> Property {
    Property {
        id: id.to_string(),
        name: name.to_string(),
        color: ColorGroup::Corner,
        price,
        rent: vec![rent],
        house_cost: 0,
        mortgage_value,
        group_size: 1,
        buy_everything_only: true,
    }
}
