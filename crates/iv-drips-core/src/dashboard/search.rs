//! Search filter over the monitor list.

use strsim::jaro_winkler;

use super::MonitoredPatient;

/// Shortest term that gets typo-tolerant name matching.
const FUZZY_MIN_TERM_LEN: usize = 4;
const FUZZY_NAME_THRESHOLD: f64 = 0.9;

/// Case-insensitive substring match on name, ward, bed or saline, plus
/// Jaro-Winkler matching of longer terms against individual name words.
/// An empty term matches everything.
pub fn matches(patient: &MonitoredPatient, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    let fields = [&patient.name, &patient.ward, &patient.bed, &patient.saline];
    if fields
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    {
        return true;
    }

    term.chars().count() >= FUZZY_MIN_TERM_LEN
        && patient
            .name
            .split_whitespace()
            .any(|word| jaro_winkler(&word.to_lowercase(), &term) >= FUZZY_NAME_THRESHOLD)
}
