//! Fixed sample data for the demonstration view.

use crate::models::{DemoPatient, PatientRecord, Saline};

/// Sample monitors at varying fill levels, with time remaining precomputed.
pub fn demo_patients() -> Vec<DemoPatient> {
    let sample = |id: i64,
                  name: &str,
                  ward: &str,
                  bed: &str,
                  saline: Saline,
                  total: u32,
                  rate: u32,
                  current: u32| {
        let mut record = PatientRecord::new(
            id,
            name.to_string(),
            ward.to_string(),
            bed.to_string(),
            saline,
            total,
            rate,
            0,
        );
        record.current_volume = current;
        record.drip_level = crate::models::drip_level(current as f64, total as f64);
        DemoPatient::from(record)
    };

    vec![
        sample(1, "John Doe", "ICU", "B-01", Saline::NormalSaline, 500, 100, 225),
        sample(2, "Jane Smith", "General", "B-12", Saline::RingerLactate, 1000, 125, 800),
        sample(3, "Arjun Mehta", "Post-Op", "B-07", Saline::AntibioticSolution, 250, 150, 40),
        sample(4, "Maria Garcia", "Maternity", "B-03", Saline::Dextrose5, 500, 60, 480),
        sample(5, "Wei Chen", "Oncology", "B-09", Saline::PainManagement, 100, 20, 12),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_remaining_matches_volume_and_rate() {
        for demo in demo_patients() {
            let expected =
                demo.record.current_volume as f64 / demo.record.rate as f64 * 60.0;
            assert!((demo.time_remaining - expected).abs() < 1e-9);
            assert!(demo.record.current_volume <= demo.record.total_volume);
        }
    }

    #[test]
    fn test_includes_a_low_level_monitor() {
        assert!(demo_patients().iter().any(|d| d.record.drip_level < 20.0));
    }
}
