use std::collections::BTreeMap;

use chrono::NaiveDate;

/// date -> entity -> running total.
pub type CumulativeIncome<K = String> = BTreeMap<NaiveDate, BTreeMap<K, f64>>;

/// Running totals per entity over any date→entity→amount series.
///
/// The entity set on date D is every entity seen up to and including D; an
/// entity with no entry on D keeps its previous total.
/// `cumulative[D][e] == cumulative[D-1][e] + periodic[D].get(e).unwrap_or(0)`.
pub fn calculate_cumulative_income<K>(
    periodic_income: &BTreeMap<NaiveDate, BTreeMap<K, f64>>,
) -> CumulativeIncome<K>
where
    K: Ord + Clone,
{
    let mut running: BTreeMap<K, f64> = BTreeMap::new();
    let mut out = BTreeMap::new();

    for (date, entries) in periodic_income {
        for (entity, amount) in entries {
            *running.entry(entity.clone()).or_insert(0.0) += amount;
        }
        out.insert(*date, running.clone());
    }

    out
}
