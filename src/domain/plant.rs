// Plant domain model
use super::resolution::Resolution;

#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub id: String,
    pub name: String,
}

impl Plant {
    pub fn new(id: String, name: Option<String>) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| Self::format_name(&id));
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // "north_roof_" -> "north roof"
        id.trim_end_matches('_').replace('_', " ")
    }
}

/// Plant-level aggregates reported by the dashboard endpoint.
///
/// These are authoritative period totals and may legitimately differ from
/// the sum of the chart buckets for the same period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantSummary {
    pub monthly_production_kwh: Option<f64>,
    pub yearly_production_kwh: Option<f64>,
    pub total_production_kwh: Option<f64>,
}

impl PlantSummary {
    /// The production figure that heads the given resolution's tab.
    pub fn production_for(&self, resolution: Resolution) -> Option<f64> {
        match resolution {
            // Day is headed by live power, not a production total
            Resolution::Day => None,
            Resolution::Month => self.monthly_production_kwh,
            Resolution::Year => self.yearly_production_kwh,
            Resolution::Total => self.total_production_kwh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_falls_back_to_id() {
        let plant = Plant::new("north_roof_".to_string(), None);
        assert_eq!(plant.name, "north roof");

        let plant = Plant::new("site_7".to_string(), Some("  ".to_string()));
        assert_eq!(plant.name, "site 7");

        let plant = Plant::new("site_7".to_string(), Some("Barn Array".to_string()));
        assert_eq!(plant.name, "Barn Array");
    }

    #[test]
    fn test_production_for_resolution() {
        let summary = PlantSummary {
            monthly_production_kwh: Some(420.0),
            total_production_kwh: Some(9000.0),
            ..Default::default()
        };
        assert_eq!(summary.production_for(Resolution::Month), Some(420.0));
        assert_eq!(summary.production_for(Resolution::Total), Some(9000.0));
        assert_eq!(summary.production_for(Resolution::Year), None);
        assert_eq!(summary.production_for(Resolution::Day), None);
    }
}
