use crate::model::DicomRecord;
use std::collections::{BTreeMap, HashSet};

/// Files of one acquisition series, ordered by instance number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesGroup {
    pub series_number: i32,
    pub protocol_name: String,
    pub records: Vec<DicomRecord>,
}

/// One directory's records partitioned into series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedDirectory {
    /// Ordered by `(series_number, protocol_name)`.
    pub groups: Vec<SeriesGroup>,
    /// Distinct `SeriesInstanceUID` values, empty string included.
    pub unique_series_count: usize,
    /// Distinct `ProtocolName` values, empty string included.
    pub unique_protocol_count: usize,
}

impl GroupedDirectory {
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    pub fn is_single_series(&self) -> bool {
        self.unique_series_count == 1
    }
}

/// Partition `records` by `(series_number, protocol_name)`.
///
/// Within a group the sort is stable on `instance_number`, so equal instance numbers
/// keep their discovery order.
pub fn group(records: Vec<DicomRecord>) -> GroupedDirectory {
    let unique_series_count = records
        .iter()
        .map(|r| r.attributes.series_instance_uid.as_str())
        .collect::<HashSet<_>>()
        .len();
    let unique_protocol_count = records
        .iter()
        .map(|r| r.attributes.protocol_name.as_str())
        .collect::<HashSet<_>>()
        .len();

    let mut by_key: BTreeMap<(i32, String), Vec<DicomRecord>> = BTreeMap::new();
    for record in records {
        let key = (
            record.attributes.series_number,
            record.attributes.protocol_name.clone(),
        );
        by_key.entry(key).or_default().push(record);
    }

    let groups = by_key
        .into_iter()
        .map(|((series_number, protocol_name), mut records)| {
            records.sort_by_key(|r| r.attributes.instance_number);
            SeriesGroup {
                series_number,
                protocol_name,
                records,
            }
        })
        .collect();

    GroupedDirectory {
        groups,
        unique_series_count,
        unique_protocol_count,
    }
}
