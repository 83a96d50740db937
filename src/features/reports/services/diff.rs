use std::collections::BTreeMap;

use crate::features::reports::models::SpillReport;
use crate::shared::constants::EMPTY_MARKER;
use crate::shared::validation::clean_string;

/// Fields whose normalized value changed, mapped to their previous value.
///
/// Null and blank count as the same value. `id` and `last_updated` are never
/// compared.
pub fn get_diff(current: &SpillReport, previous: Option<&SpillReport>) -> BTreeMap<String, String> {
    let Some(previous) = previous else {
        return BTreeMap::new();
    };

    let previous_values = previous.fields.field_values();

    current
        .fields
        .field_values()
        .into_iter()
        .zip(previous_values)
        .filter_map(|((name, value), (_, last_value))| {
            let cmp_value = clean_string(value.as_deref().unwrap_or_default());
            let cmp_last_value = clean_string(last_value.as_deref().unwrap_or_default());
            if cmp_value == cmp_last_value {
                return None;
            }
            let shown = last_value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| EMPTY_MARKER.to_string());
            Some((name.to_string(), shown))
        })
        .collect()
}
