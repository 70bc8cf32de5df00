use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Globe,
    Flat,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Globe => ViewMode::Flat,
            ViewMode::Flat => ViewMode::Globe,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    #[default]
    Streets,
    Satellite,
    Dark,
}

impl std::str::FromStr for MapStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streets" | "street" => Ok(MapStyle::Streets),
            "satellite" | "sat" => Ok(MapStyle::Satellite),
            "dark" => Ok(MapStyle::Dark),
            other => Err(format!("unknown map style: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MapStyle, ViewMode};

    #[test]
    fn toggle_round_trips() {
        assert_eq!(ViewMode::Globe.toggled(), ViewMode::Flat);
        assert_eq!(ViewMode::Globe.toggled().toggled(), ViewMode::Globe);
    }

    #[test]
    fn style_parses() {
        assert_eq!("Satellite".parse::<MapStyle>(), Ok(MapStyle::Satellite));
        assert!("neon".parse::<MapStyle>().is_err());
    }
}
