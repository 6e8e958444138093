// Energy unit scaling and headline figures
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyUnit {
    KWh,
    MWh,
    GWh,
    TWh,
}

impl EnergyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyUnit::KWh => "kWh",
            EnergyUnit::MWh => "MWh",
            EnergyUnit::GWh => "GWh",
            EnergyUnit::TWh => "TWh",
        }
    }
}

const LARGER_UNITS: [EnergyUnit; 3] = [EnergyUnit::MWh, EnergyUnit::GWh, EnergyUnit::TWh];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledEnergy {
    pub value: f64,
    pub unit: EnergyUnit,
}

impl ScaledEnergy {
    pub fn formatted_value(&self) -> String {
        format!("{:.2}", self.value)
    }
}

impl fmt::Display for ScaledEnergy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit.as_str())
    }
}

/// Pick the display unit for an energy magnitude given in kWh.
///
/// Values of 1000 kWh and above step through MWh, GWh and TWh; TWh is the
/// last unit however large the value. Zero, negative and non-finite input
/// is shown in kWh.
pub fn scale_energy(kwh: f64) -> ScaledEnergy {
    if !kwh.is_finite() {
        return ScaledEnergy {
            value: 0.0,
            unit: EnergyUnit::KWh,
        };
    }
    if kwh < 1000.0 {
        return ScaledEnergy {
            value: kwh,
            unit: EnergyUnit::KWh,
        };
    }

    let mut value = kwh;
    let mut unit = EnergyUnit::KWh;
    for next in LARGER_UNITS {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }

    ScaledEnergy { value, unit }
}

/// A single headline figure. `value: None` means no data for the period.
#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub value: Option<f64>,
    pub unit: String,
}

impl Headline {
    pub fn power_watts(watts: Option<f64>) -> Self {
        Self {
            value: watts,
            unit: "W".to_string(),
        }
    }

    /// Energy headline, scaled through the shared unit policy.
    pub fn energy_kwh(kwh: Option<f64>) -> Self {
        match kwh.filter(|v| v.is_finite()) {
            Some(kwh) => {
                let scaled = scale_energy(kwh);
                Self {
                    value: Some(scaled.value),
                    unit: scaled.unit.as_str().to_string(),
                }
            }
            None => Self {
                value: None,
                unit: EnergyUnit::KWh.as_str().to_string(),
            },
        }
    }
}
