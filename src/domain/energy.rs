// Daily energy integration and peak detection
use super::telemetry::{Reading, MINUTES_PER_DAY};

/// Energy produced over one day, integrated minute by minute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DailyEnergy {
    pub energy_wh: f64,
}

impl DailyEnergy {
    /// kWh rounded to two decimals.
    pub fn kwh(&self) -> f64 {
        (self.energy_wh / 1000.0 * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakInfo {
    pub power_watts: f64,
    pub time_offset_minutes: u16,
}

impl PeakInfo {
    pub fn time_label(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.time_offset_minutes / 60,
            self.time_offset_minutes % 60
        )
    }
}

/// Integrate power over the day.
///
/// Samples sharing a minute are averaged, and that average is held for the
/// whole minute. Minutes without samples contribute nothing.
pub fn integrate_energy(readings: &[Reading]) -> DailyEnergy {
    let mut sums = vec![0.0_f64; MINUTES_PER_DAY as usize];
    let mut counts = vec![0_u32; MINUTES_PER_DAY as usize];

    for reading in readings {
        let Some(power) = reading.valid_power() else { continue };
        let minute = reading.time_offset_minutes as usize;
        if minute < sums.len() {
            sums[minute] += power;
            counts[minute] += 1;
        }
    }

    let energy_wh = sums
        .iter()
        .zip(&counts)
        .filter(|(_, count)| **count > 0)
        .map(|(sum, count)| (sum / *count as f64) / 60.0)
        .sum();

    DailyEnergy { energy_wh }
}

/// Highest positive reading; ties go to the earliest time.
pub fn find_peak(readings: &[Reading]) -> Option<PeakInfo> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.time_offset_minutes);

    let mut peak: Option<PeakInfo> = None;
    for reading in ordered {
        let Some(power) = reading.valid_power() else { continue };
        if power <= 0.0 {
            continue;
        }
        if peak.is_none_or(|p| power > p.power_watts) {
            peak = Some(PeakInfo {
                power_watts: power,
                time_offset_minutes: reading.time_offset_minutes,
            });
        }
    }

    peak
}
