//! The waste types collected by the municipality and the selection of them.

use std::{fmt, str::FromStr};

use bitmask_enum::bitmask;

use crate::error::ConfigError;

/// The selector value which selects every waste type.
pub static ALL_WASTE_TYPES: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WasteType {
    /// vegetable, fruit and garden waste
    Organic,
    Glass,
    /// small chemical waste
    Hazardous,
    Paper,
    /// plastic and drink cartons
    PlasticCarton,
    /// plastic, metal and drink cartons
    PlasticMetalCarton,
    Textile,
    Bulky,
    Residual,
}

impl WasteType {
    pub const ALL: [WasteType; 9] = [
        WasteType::Organic,
        WasteType::Glass,
        WasteType::Hazardous,
        WasteType::Paper,
        WasteType::PlasticCarton,
        WasteType::PlasticMetalCarton,
        WasteType::Textile,
        WasteType::Bulky,
        WasteType::Residual,
    ];

    /// The identifier the website uses for this waste type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteType::Organic => "gft",
            WasteType::Glass => "glas",
            WasteType::Hazardous => "kca",
            WasteType::Paper => "papier",
            WasteType::PlasticCarton => "pd",
            WasteType::PlasticMetalCarton => "pmd",
            WasteType::Textile => "textiel",
            WasteType::Bulky => "grofvuil",
            WasteType::Residual => "restafval",
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WasteType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WasteType::ALL
            .into_iter()
            .find(|waste_type| waste_type.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownWasteType(s.to_string()))
    }
}

#[bitmask(u16)]
pub enum WasteTypeBitmask {
    Organic,
    Glass,
    Hazardous,
    Paper,
    PlasticCarton,
    PlasticMetalCarton,
    Textile,
    Bulky,
    Residual,
}

impl From<WasteType> for WasteTypeBitmask {
    fn from(value: WasteType) -> Self {
        match value {
            WasteType::Organic => WasteTypeBitmask::Organic,
            WasteType::Glass => WasteTypeBitmask::Glass,
            WasteType::Hazardous => WasteTypeBitmask::Hazardous,
            WasteType::Paper => WasteTypeBitmask::Paper,
            WasteType::PlasticCarton => WasteTypeBitmask::PlasticCarton,
            WasteType::PlasticMetalCarton => WasteTypeBitmask::PlasticMetalCarton,
            WasteType::Textile => WasteTypeBitmask::Textile,
            WasteType::Bulky => WasteTypeBitmask::Bulky,
            WasteType::Residual => WasteTypeBitmask::Residual,
        }
    }
}

/// Which waste types end up in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelection {
    All,
    Only(WasteTypeBitmask),
}

impl CategorySelection {
    pub fn contains(&self, waste_type: WasteType) -> bool {
        match self {
            CategorySelection::All => true,
            CategorySelection::Only(bitmask) => bitmask.contains(waste_type.into()),
        }
    }
}

impl FromStr for CategorySelection {
    type Err = ConfigError;

    /// Parse `*` or a comma separated list like `gft,papier,restafval`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == ALL_WASTE_TYPES {
            return Ok(CategorySelection::All);
        }
        let mut waste_type_bitmask = WasteTypeBitmask::none();
        for identifier in s.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            waste_type_bitmask |= WasteTypeBitmask::from(identifier.parse::<WasteType>()?);
        }
        if waste_type_bitmask == WasteTypeBitmask::none() {
            return Err(ConfigError::EmptySelection);
        }
        Ok(CategorySelection::Only(waste_type_bitmask))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::ConfigError,
        waste_type::{CategorySelection, WasteType, WasteTypeBitmask},
    };

    #[test]
    fn test_waste_type_identifiers() {
        for waste_type in WasteType::ALL {
            assert_eq!(waste_type.as_str().parse::<WasteType>(), Ok(waste_type));
        }
        assert_eq!(
            "plastic".parse::<WasteType>(),
            Err(ConfigError::UnknownWasteType("plastic".to_string()))
        );
    }

    #[test]
    fn test_selection_all() {
        let selection: CategorySelection = "*".parse().unwrap();
        assert_eq!(selection, CategorySelection::All);
        assert!(WasteType::ALL
            .into_iter()
            .all(|waste_type| selection.contains(waste_type)));
    }

    #[test]
    fn test_selection_list() {
        let selection: CategorySelection = "gft,papier,restafval".parse().unwrap();
        assert_eq!(
            selection,
            CategorySelection::Only(
                WasteTypeBitmask::Organic | WasteTypeBitmask::Paper | WasteTypeBitmask::Residual
            )
        );
        assert!(selection.contains(WasteType::Organic));
        assert!(selection.contains(WasteType::Residual));
        assert!(!selection.contains(WasteType::Glass));
        assert!(!selection.contains(WasteType::PlasticMetalCarton));
    }

    #[test]
    fn test_selection_empty() {
        for selector in ["", ",", " , ,"] {
            assert_eq!(
                selector.parse::<CategorySelection>(),
                Err(ConfigError::EmptySelection)
            );
        }
    }

    #[test]
    fn test_selection_unknown() {
        assert_eq!(
            "gft,kerstbomen".parse::<CategorySelection>(),
            Err(ConfigError::UnknownWasteType("kerstbomen".to_string()))
        );
    }
}
