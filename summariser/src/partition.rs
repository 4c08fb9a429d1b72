use polars::prelude::{col, lit, AnyValue, DataFrame, IntoLazy, UniqueKeepStrategy};
use std::collections::{BTreeMap, HashSet};

/// The label values that identify one partition, in column order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PartitionKey(pub Vec<String>);

impl PartitionKey {
    /// Human readable name, e.g. `scenario-io/cpu/prod`.
    pub fn label(&self) -> String {
        self.0.join("/")
    }

    /// A flat name usable as a file name prefix, e.g. `scenario-io_cpu_prod`.
    pub fn file_stem(&self) -> String {
        sanitize_file_stem(&self.0.join("_"))
    }
}

/// Replace path separators so a label can be used as a single file name.
pub fn sanitize_file_stem(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

pub enum Partition {
    Unpartitioned,
    Partitioned(BTreeMap<PartitionKey, DataFrame>),
}

/// Partition the [`DataFrame`] by unique combination of values across multiple label columns.
///
/// Values in the label columns MUST be in String format, rows with a missing label are left out.
///
/// If no columns are provided, returns [`Partition::Unpartitioned`]
pub fn partition_by_columns(data_frame: &DataFrame, columns: &[&str]) -> anyhow::Result<Partition> {
    let mut unique = HashSet::with_capacity(columns.len());
    for &column in columns {
        if !unique.insert(column) {
            return Err(anyhow::anyhow!("Duplicate column name found: {}", column));
        }
    }
    if columns.is_empty() {
        return Ok(Partition::Unpartitioned);
    }

    let subset: Vec<String> = columns.iter().map(|&c| c.to_string()).collect();
    let selectors = data_frame
        .clone()
        .lazy()
        .select(columns.iter().map(|&c| col(c)).collect::<Vec<_>>())
        .unique(Some(subset), UniqueKeepStrategy::Any)
        .collect()?;

    let mut partitioned = BTreeMap::new();

    'rows: for row_idx in 0..selectors.height() {
        let mut filter_expr = None;
        let mut key_parts = Vec::with_capacity(columns.len());

        for &column in columns {
            let value = match selectors.column(column)?.get(row_idx) {
                Ok(AnyValue::String(s)) => s.to_string(),
                Ok(AnyValue::StringOwned(s)) => s.into_string(),
                Ok(AnyValue::Null) => {
                    log::warn!("In column {column}, found rows without a label");
                    continue 'rows;
                }
                Ok(v) => {
                    log::warn!("In column {column}, found non String value: {v:?}");
                    continue 'rows;
                }
                Err(e) => {
                    log::error!("In column {column}: {e}");
                    continue 'rows;
                }
            };

            let column_filter = col(column).eq(lit(value.clone()));
            filter_expr = match filter_expr {
                None => Some(column_filter),
                Some(expr) => Some(expr.and(column_filter)),
            };
            key_parts.push(value);
        }

        let key = PartitionKey(key_parts);
        log::debug!("Partition for {}", key.label());

        if let Some(filter) = filter_expr {
            let filtered = data_frame.clone().lazy().filter(filter).collect()?;
            partitioned.insert(key, filtered);
        }
    }

    Ok(Partition::Partitioned(partitioned))
}
