//! Long-format panel keyed by `(datetime, symbol)`.
//!
//! A [`Panel`] wraps a polars [`DataFrame`], re-ordered by
//! `(symbol, datetime)` so that each symbol's history is one contiguous row
//! range. It also indexes every timestamp's cross-section. Numeric columns are
//! materialised once as `f64` arrays with nulls mapped to NaN, which is what the
//! [operator library](crate::ops) consumes.
//!
//! Time-series operators go through [`Panel::per_symbol`] and never see
//! another symbol's rows. Cross-sectional operators go through
//! [`Panel::per_timestamp`] and never see another timestamp's rows.

use crate::{FactorError, Result, ops};
use chrono::{NaiveDate, NaiveDateTime};
use ndarray::Array1;
use polars::prelude::*;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

/// Name of the timestamp key column.
pub const DATETIME: &str = "datetime";
/// Name of the symbol key column.
pub const SYMBOL: &str = "symbol";
/// Name of the value column in factor output frames.
pub const VALUE: &str = "value";

/// Days from 0001-01-01 (CE) to 1970-01-01, the epoch of polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One symbol's contiguous row range.
#[derive(Debug, Clone)]
struct SymbolSlice {
    symbol: String,
    rows: Range<usize>,
}

/// Row indices sharing one timestamp.
#[derive(Debug, Clone)]
struct CrossSection {
    date: NaiveDate,
    rows: Vec<usize>,
}

/// Long-format `(datetime, symbol)` panel with per-symbol and per-timestamp
/// grouping.
#[derive(Debug, Clone)]
pub struct Panel {
    frame: DataFrame,
    dates: Vec<NaiveDate>,
    symbol_index: Vec<usize>,
    symbols: Vec<SymbolSlice>,
    sections: Vec<CrossSection>,
    columns: HashMap<String, Array1<f64>>,
}

impl Panel {
    /// Build a panel from a long-format frame.
    ///
    /// `datetime` may be a `Date`, a `Datetime` (truncated to its date) or a
    /// string in `%Y-%m-%d`, `%Y%m%d` or `%Y/%m/%d` form. Rows are stably
    /// re-ordered by `(symbol, datetime)`.
    ///
    /// # Errors
    ///
    /// - [`FactorError::MissingColumn`] if `datetime` or `symbol` is absent.
    /// - [`FactorError::InvalidPanel`] for null or unparseable keys and for
    ///   duplicate `(datetime, symbol)` pairs.
    pub fn new(data: &DataFrame) -> Result<Self> {
        for key in [DATETIME, SYMBOL] {
            if data.column(key).is_err() {
                return Err(FactorError::MissingColumn(key.to_string()));
            }
        }

        let raw_dates = parse_dates(data.column(DATETIME)?)?;
        let raw_symbols = parse_symbols(data.column(SYMBOL)?)?;

        let mut order: Vec<usize> = (0..data.height()).collect();
        order.sort_by(|&a, &b| {
            raw_symbols[a]
                .cmp(&raw_symbols[b])
                .then(raw_dates[a].cmp(&raw_dates[b]))
        });

        for pair in order.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if raw_symbols[a] == raw_symbols[b] && raw_dates[a] == raw_dates[b] {
                return Err(FactorError::InvalidPanel(format!(
                    "duplicate row for symbol {} at {}",
                    raw_symbols[a], raw_dates[a]
                )));
            }
        }

        let take = IdxCa::from_vec(
            "order".into(),
            order.iter().map(|&i| i as IdxSize).collect(),
        );
        let frame = data.take(&take)?;

        let dates: Vec<NaiveDate> = order.iter().map(|&i| raw_dates[i]).collect();

        let mut symbols: Vec<SymbolSlice> = Vec::new();
        let mut symbol_index = Vec::with_capacity(order.len());
        for (row, &i) in order.iter().enumerate() {
            let symbol = &raw_symbols[i];
            match symbols.last_mut() {
                Some(slice) if &slice.symbol == symbol => slice.rows.end = row + 1,
                _ => symbols.push(SymbolSlice {
                    symbol: symbol.clone(),
                    rows: row..row + 1,
                }),
            }
            symbol_index.push(symbols.len() - 1);
        }

        let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (row, date) in dates.iter().enumerate() {
            by_date.entry(*date).or_default().push(row);
        }
        let sections = by_date
            .into_iter()
            .map(|(date, rows)| CrossSection { date, rows })
            .collect();

        let mut columns = HashMap::new();
        for column in frame.get_columns() {
            let name = column.name().as_str();
            if name == DATETIME || name == SYMBOL || !is_numeric(column.dtype()) {
                continue;
            }
            columns.insert(name.to_string(), to_f64_array(column)?);
        }

        Ok(Self {
            frame,
            dates,
            symbol_index,
            symbols,
            sections,
            columns,
        })
    }

    /// Underlying frame, ordered by `(symbol, datetime)`.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the panel has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Date of every row, in panel order.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Symbol of the given row.
    pub fn symbol(&self, row: usize) -> &str {
        &self.symbols[self.symbol_index[row]].symbol
    }

    /// Distinct symbols in panel order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|s| s.symbol.as_str())
    }

    /// Number of distinct symbols.
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Number of distinct timestamps.
    pub fn timestamp_count(&self) -> usize {
        self.sections.len()
    }

    /// Whether a numeric column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Numeric column as `f64`, nulls mapped to NaN.
    pub fn column(&self, name: &str) -> Result<&Array1<f64>> {
        self.columns
            .get(name)
            .ok_or_else(|| FactorError::MissingColumn(name.to_string()))
    }

    /// Check that every listed column is present (keys or numeric columns).
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names
            .iter()
            .find(|n| **n != DATETIME && **n != SYMBOL && !self.has_column(n))
        {
            Some(missing) => Err(FactorError::MissingColumn((*missing).to_string())),
            None => Ok(()),
        }
    }

    /// Apply a time-series operator to each symbol's slice of `x`.
    ///
    /// `x` must be aligned to the panel rows; a misaligned input yields all
    /// NaN. The operator is called once per symbol with that symbol's values
    /// only.
    pub fn per_symbol<F>(&self, x: &Array1<f64>, op: F) -> Array1<f64>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let mut out = vec![f64::NAN; self.len()];
        if x.len() != self.len() {
            return Array1::from(out);
        }

        let values = contiguous(x);
        for slice in &self.symbols {
            let result = op(&values[slice.rows.clone()]);
            for (row, v) in slice.rows.clone().zip(result) {
                out[row] = v;
            }
        }
        Array1::from(out)
    }

    /// Apply a two-input time-series operator to each symbol's slices of `x`
    /// and `y`.
    pub fn per_symbol_pair<F>(&self, x: &Array1<f64>, y: &Array1<f64>, op: F) -> Array1<f64>
    where
        F: Fn(&[f64], &[f64]) -> Vec<f64>,
    {
        let mut out = vec![f64::NAN; self.len()];
        if x.len() != self.len() || y.len() != self.len() {
            return Array1::from(out);
        }

        let (xs, ys) = (contiguous(x), contiguous(y));
        for slice in &self.symbols {
            let rows = slice.rows.clone();
            let result = op(&xs[rows.clone()], &ys[rows.clone()]);
            for (row, v) in rows.zip(result) {
                out[row] = v;
            }
        }
        Array1::from(out)
    }

    /// Apply a cross-sectional operator to each timestamp's members of `x`.
    pub fn per_timestamp<F>(&self, x: &Array1<f64>, op: F) -> Array1<f64>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let mut out = vec![f64::NAN; self.len()];
        if x.len() != self.len() {
            return Array1::from(out);
        }

        let mut members = Vec::new();
        for section in &self.sections {
            members.clear();
            members.extend(section.rows.iter().map(|&row| x[row]));
            for (&row, v) in section.rows.iter().zip(op(&members)) {
                out[row] = v;
            }
        }
        Array1::from(out)
    }

    /// Cross-sectional percentile rank, see [`ops::cs_rank`].
    pub fn cs_rank(&self, x: &Array1<f64>) -> Array1<f64> {
        self.per_timestamp(x, ops::cs_rank)
    }

    /// Cross-sectional z-score, see [`ops::cs_zscore`].
    pub fn cs_zscore(&self, x: &Array1<f64>) -> Array1<f64> {
        self.per_timestamp(x, ops::cs_zscore)
    }

    /// Timestamps in ascending order with their row indices.
    pub fn cross_sections(&self) -> impl Iterator<Item = (NaiveDate, &[usize])> {
        self.sections.iter().map(|s| (s.date, s.rows.as_slice()))
    }

    /// Symbols in panel order with their contiguous row ranges.
    pub fn symbol_ranges(&self) -> impl Iterator<Item = (&str, Range<usize>)> {
        self.symbols.iter().map(|s| (s.symbol.as_str(), s.rows.clone()))
    }

    /// Output frame with `datetime`, `symbol` and `value`, one row per panel
    /// row. Non-finite values are stored as null.
    pub fn factor_frame(&self, values: &[f64]) -> Result<DataFrame> {
        if values.len() != self.len() {
            return Err(FactorError::Computation(format!(
                "factor produced {} values for {} panel rows",
                values.len(),
                self.len()
            )));
        }

        let value = Column::new(VALUE.into(), finite_or_null(values));
        let frame = DataFrame::new(vec![
            self.frame.column(DATETIME)?.clone(),
            self.frame.column(SYMBOL)?.clone(),
            value,
        ])?;
        Ok(frame)
    }

    /// The panel frame with additional `f64` columns appended (or replaced).
    pub fn frame_with_columns(&self, extra: Vec<(String, Array1<f64>)>) -> Result<DataFrame> {
        let mut frame = self.frame.clone();
        for (name, values) in extra {
            if values.len() != self.len() {
                return Err(FactorError::Computation(format!(
                    "column {name} has {} values for {} panel rows",
                    values.len(),
                    self.len()
                )));
            }
            let column = Column::new(name.as_str().into(), finite_or_null(&values.to_vec()));
            frame.with_column(column)?;
        }
        Ok(frame)
    }
}

fn contiguous(x: &Array1<f64>) -> Cow<'_, [f64]> {
    match x.as_slice() {
        Some(values) => Cow::Borrowed(values),
        None => Cow::Owned(x.to_vec()),
    }
}

fn finite_or_null(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.is_finite().then_some(*v)).collect()
}

const fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

fn to_f64_array(column: &Column) -> Result<Array1<f64>> {
    let casted = column.cast(&DataType::Float64)?;
    let values = casted.f64()?;
    Ok(values.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

fn parse_symbols(column: &Column) -> Result<Vec<String>> {
    let casted = column.cast(&DataType::String)?;
    casted
        .str()?
        .iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string)
                .ok_or_else(|| FactorError::InvalidPanel(format!("null symbol at row {row}")))
        })
        .collect()
}

/// Parse a `datetime` key column into calendar dates.
pub(crate) fn parse_dates(column: &Column) -> Result<Vec<NaiveDate>> {
    match column.dtype() {
        DataType::String => column
            .str()?
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| FactorError::InvalidPanel(format!("null datetime at row {row}")))
                    .and_then(parse_date_str)
            })
            .collect(),
        DataType::Date | DataType::Datetime(_, _) => {
            let days = column.cast(&DataType::Date)?.cast(&DataType::Int32)?;
            days.i32()?
                .iter()
                .enumerate()
                .map(|(row, d)| {
                    d.and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE))
                        .ok_or_else(|| {
                            FactorError::InvalidPanel(format!("null datetime at row {row}"))
                        })
                })
                .collect()
        }
        other => Err(FactorError::InvalidPanel(format!(
            "unsupported datetime dtype: {other}"
        ))),
    }
}

fn parse_date_str(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| FactorError::InvalidPanel(format!("unparseable datetime: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample() -> DataFrame {
        // Deliberately interleaved and out of order
        df! {
            "datetime" => ["2024-01-02", "2024-01-01", "2024-01-01", "2024-01-03", "2024-01-02", "2024-01-03"],
            "symbol" => ["B", "B", "A", "A", "A", "B"],
            "close" => [21.0, 20.0, 10.0, 12.0, 11.0, 22.0],
        }
        .unwrap()
    }

    #[test]
    fn test_panel_orders_by_symbol_then_date() {
        let panel = Panel::new(&sample()).unwrap();
        assert_eq!(panel.len(), 6);
        assert_eq!(panel.symbol_count(), 2);
        assert_eq!(panel.timestamp_count(), 3);

        let close = panel.column("close").unwrap();
        assert_eq!(close.to_vec(), vec![10.0, 11.0, 12.0, 20.0, 21.0, 22.0]);
        assert_eq!(panel.symbol(0), "A");
        assert_eq!(panel.symbol(5), "B");
        assert_eq!(panel.dates()[3], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_per_symbol_never_crosses_boundary() {
        let panel = Panel::new(&sample()).unwrap();
        let close = panel.column("close").unwrap();
        let lagged = panel.per_symbol(close, |s| ops::delay(s, 1));

        // First row of each symbol has no predecessor
        assert!(lagged[0].is_nan());
        assert!(lagged[3].is_nan());
        assert_eq!(lagged[1], 10.0);
        assert_eq!(lagged[4], 20.0);
    }

    #[test]
    fn test_per_timestamp_isolates_dates() {
        let panel = Panel::new(&sample()).unwrap();
        let ranks = panel.cs_rank(panel.column("close").unwrap());
        // A is below B on every date
        for row in 0..3 {
            assert_eq!(ranks[row], 0.5);
            assert_eq!(ranks[row + 3], 1.0);
        }
    }

    #[test]
    fn test_missing_key_column() {
        let df = df! { "datetime" => ["2024-01-01"], "close" => [1.0] }.unwrap();
        assert!(matches!(Panel::new(&df), Err(FactorError::MissingColumn(c)) if c == "symbol"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let df = df! {
            "datetime" => ["2024-01-01", "2024-01-01"],
            "symbol" => ["A", "A"],
            "close" => [1.0, 2.0],
        }
        .unwrap();
        assert!(matches!(Panel::new(&df), Err(FactorError::InvalidPanel(_))));
    }

    #[test]
    fn test_compact_date_format_and_nulls() {
        let df = df! {
            "datetime" => ["20240102", "20240101"],
            "symbol" => ["A", "A"],
            "volume" => [None, Some(5.0)],
        }
        .unwrap();
        let panel = Panel::new(&df).unwrap();
        let volume = panel.column("volume").unwrap();
        assert_eq!(volume[0], 5.0);
        assert!(volume[1].is_nan());
    }

    #[test]
    fn test_require_reports_first_missing() {
        let panel = Panel::new(&sample()).unwrap();
        assert!(panel.require(&["datetime", "symbol", "close"]).is_ok());
        assert!(matches!(
            panel.require(&["close", "vwap"]),
            Err(FactorError::MissingColumn(c)) if c == "vwap"
        ));
    }

    #[test]
    fn test_factor_frame_nulls_non_finite() {
        let panel = Panel::new(&sample()).unwrap();
        let values = [1.0, f64::NAN, f64::INFINITY, 4.0, 5.0, 6.0];
        let out = panel.factor_frame(&values).unwrap();
        assert_eq!(out.height(), 6);
        assert_eq!(out.get_column_names(), &["datetime", "symbol", "value"]);
        assert_eq!(out.column("value").unwrap().null_count(), 2);
        assert!(panel.factor_frame(&values[..3]).is_err());
    }
}
