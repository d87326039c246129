//! Core types for datachat.
//!
//! This module defines the fundamental data structures shared by profiling,
//! querying, charting and export: cells, rows, datasets, column descriptors,
//! query configuration and chart configuration/output.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Cells
// ============================================================================

/// A single scalar value in a row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DataCell {
    Text(String),
    Number(f64),
    Boolean(bool),
    #[default]
    Empty,
}

static EMPTY_CELL: DataCell = DataCell::Empty;

impl DataCell {
    /// Null, or text that is blank after trimming
    pub fn is_empty(&self) -> bool {
        match self {
            DataCell::Empty => true,
            DataCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion. Booleans and blanks do not coerce.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DataCell::Number(n) if n.is_finite() => Some(*n),
            DataCell::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Date coercion for text cells
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            DataCell::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// True for booleans and for text matching a boolean literal
    pub fn is_boolean_like(&self) -> bool {
        self.as_bool().is_some()
    }

    /// Truth value of a boolean-like cell: `true`/`yes`/`1` or
    /// `false`/`no`/`0` (case-insensitive), or a real boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataCell::Boolean(b) => Some(*b),
            DataCell::Number(n) if *n == 1.0 => Some(true),
            DataCell::Number(n) if *n == 0.0 => Some(false),
            DataCell::Text(s) => {
                let lowered = s.trim().to_lowercase();
                let index = crate::constants::BOOLEAN_LITERALS
                    .iter()
                    .position(|literal| *literal == lowered)?;
                // Literals alternate true, false
                Some(index % 2 == 0)
            }
            _ => None,
        }
    }

    /// Hashable identity of the raw value, without type coercion
    pub fn key(&self) -> CellKey {
        match self {
            DataCell::Text(s) => CellKey::Text(s.clone()),
            // -0.0 and 0.0 are the same value
            DataCell::Number(n) => CellKey::Number(if *n == 0.0 { 0 } else { n.to_bits() }),
            DataCell::Boolean(b) => CellKey::Boolean(*b),
            DataCell::Empty => CellKey::Empty,
        }
    }
}

impl fmt::Display for DataCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataCell::Text(s) => f.write_str(s),
            DataCell::Number(n) => {
                // Format nicely: no trailing zeros for whole numbers
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            DataCell::Boolean(b) => write!(f, "{}", b),
            DataCell::Empty => Ok(()),
        }
    }
}

/// Hash/Eq identity of a [`DataCell`], used for grouping and uniqueness.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKey {
    Text(String),
    Number(u64),
    Boolean(bool),
    Empty,
}

impl From<Value> for DataCell {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DataCell::Empty,
            Value::Bool(b) => DataCell::Boolean(b),
            Value::Number(n) => n.as_f64().map(DataCell::Number).unwrap_or(DataCell::Empty),
            Value::String(s) => DataCell::Text(s),
            // Nested structures are kept as their JSON text
            other => DataCell::Text(other.to_string()),
        }
    }
}

impl From<DataCell> for Value {
    fn from(cell: DataCell) -> Self {
        match cell {
            DataCell::Text(s) => Value::String(s),
            DataCell::Number(n) => {
                // Use integer if it's a whole number
                if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
                    Value::Number(serde_json::Number::from(n as i64))
                } else {
                    serde_json::Number::from_f64(n)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            DataCell::Boolean(b) => Value::Bool(b),
            DataCell::Empty => Value::Null,
        }
    }
}

impl From<&str> for DataCell {
    fn from(s: &str) -> Self {
        DataCell::Text(s.to_string())
    }
}

impl From<String> for DataCell {
    fn from(s: String) -> Self {
        DataCell::Text(s)
    }
}

impl From<f64> for DataCell {
    fn from(n: f64) -> Self {
        DataCell::Number(n)
    }
}

impl From<i64> for DataCell {
    fn from(n: i64) -> Self {
        DataCell::Number(n as f64)
    }
}

impl From<i32> for DataCell {
    fn from(n: i32) -> Self {
        DataCell::Number(n as f64)
    }
}

impl From<usize> for DataCell {
    fn from(n: usize) -> Self {
        DataCell::Number(n as f64)
    }
}

impl From<bool> for DataCell {
    fn from(b: bool) -> Self {
        DataCell::Boolean(b)
    }
}

impl<T: Into<DataCell>> From<Option<T>> for DataCell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataCell::Empty)
    }
}

/// Parse text as a finite number, tolerating surrounding whitespace.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
];

/// Generic date parsing over the common textual date layouts.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(trimmed, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

// ============================================================================
// Rows and Datasets
// ============================================================================

/// A record: column name to cell, in source order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: IndexMap<String, DataCell>,
}

/// Build a [`Row`] from `key => value` pairs.
#[macro_export]
macro_rules! row {
    () => {
        $crate::types::Row::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::types::Row::new();
        $( row.insert($key, $value); )+
        row
    }};
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell for `column`, if the key is present
    pub fn get(&self, column: &str) -> Option<&DataCell> {
        self.cells.get(column)
    }

    /// The cell for `column`, treating a missing key as empty
    pub fn cell(&self, column: &str) -> &DataCell {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<DataCell>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<DataCell>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataCell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Key-order-sensitive JSON text, the identity used for duplicate rows
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<DataCell>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// A named collection of rows plus where it came from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    /// Human-readable name (from filename or user-defined)
    pub name: String,
    /// Data rows; key sets may differ between rows
    pub rows: Vec<Row>,
    /// Where this data came from
    pub origin: DataOrigin,
}

impl Dataset {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
            origin: DataOrigin::Manual,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of keys across all rows, in first-seen order
    pub fn column_names(&self) -> Vec<String> {
        let mut names: IndexMap<&str, ()> = IndexMap::new();
        for row in &self.rows {
            for key in row.keys() {
                names.entry(key).or_insert(());
            }
        }
        names.into_keys().map(str::to_string).collect()
    }

    /// Inferred column descriptors (sampled)
    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        crate::data::analyze_structure(&self.rows)
    }
}

/// Origin of a dataset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DataOrigin {
    /// Built in memory
    Manual,
    /// Imported from a CSV/TXT file
    Csv { path: PathBuf },
    /// Loaded from JSON
    Json { path: Option<PathBuf> },
}

// ============================================================================
// Profiling Types
// ============================================================================

/// Inferred type of a column
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

impl ColumnType {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        }
    }
}

/// Inferred metadata for one field across a dataset sample
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    pub inferred_type: ColumnType,
    pub nullable: bool,
    pub unique: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, inferred_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            inferred_type,
            nullable: false,
            unique: false,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

/// Outcome of [`crate::data::validate_data`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

// ============================================================================
// Query Types
// ============================================================================

/// One predicate over one column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub column: String,
    #[serde(flatten)]
    pub condition: FilterCondition,
}

impl SearchFilter {
    pub fn new(column: impl Into<String>, condition: FilterCondition) -> Self {
        Self {
            column: column.into(),
            condition,
        }
    }
}

/// Filter operator together with its operands
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "value", rename_all = "camelCase")]
pub enum FilterCondition {
    /// Strict typed equality
    Equals(DataCell),
    /// Case-insensitive substring
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    /// Numeric, exclusive
    Greater(f64),
    Less(f64),
    /// Numeric, inclusive on both ends
    Between(f64, f64),
    /// Strict membership
    In(Vec<DataCell>),
}

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub column: String,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// One page of a collection
#[derive(Clone, Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

// ============================================================================
// Chart Types
// ============================================================================

/// Chart configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Type of chart to render
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    /// Chart title
    #[serde(default)]
    pub title: String,
    /// Column used for labels / x values
    #[serde(default)]
    pub x_axis: Option<String>,
    /// Column used for values / y values
    #[serde(default)]
    pub y_axis: Option<String>,
    /// How to combine y values sharing an x label (bar/line/area)
    #[serde(default)]
    pub aggregation: Option<AggregationType>,
}

impl ChartConfig {
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            title: String::new(),
            x_axis: None,
            y_axis: None,
            aggregation: None,
        }
    }

    pub fn with_x(mut self, x: impl Into<String>) -> Self {
        self.x_axis = Some(x.into());
        self
    }

    pub fn with_axes(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_axis = Some(x.into());
        self.y_axis = Some(y.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_aggregation(mut self, aggregation: AggregationType) -> Self {
        self.aggregation = Some(aggregation);
        self
    }
}

/// Types of charts available
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
    Scatter,
    Area,
    Histogram,
}

impl ChartType {
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Bar => "Bar",
            ChartType::Line => "Line",
            ChartType::Pie => "Pie",
            ChartType::Scatter => "Scatter",
            ChartType::Area => "Area",
            ChartType::Histogram => "Histogram",
        }
    }

    pub fn all() -> &'static [ChartType] {
        &[
            ChartType::Bar,
            ChartType::Line,
            ChartType::Area,
            ChartType::Pie,
            ChartType::Scatter,
            ChartType::Histogram,
        ]
    }

    /// Parse a lowercase name such as `"bar"`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(name.trim()))
    }
}

/// Aggregation method for grouped numeric values
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    #[default]
    Sum,
    #[serde(alias = "average")]
    Avg,
    Count,
    Min,
    Max,
}

impl AggregationType {
    pub fn label(&self) -> &'static str {
        match self {
            AggregationType::Sum => "Sum",
            AggregationType::Avg => "Average",
            AggregationType::Count => "Count",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
        }
    }

    /// Suffix used for output column names, e.g. `sales_avg`
    pub fn suffix(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Avg => "avg",
            AggregationType::Count => "count",
            AggregationType::Min => "min",
            AggregationType::Max => "max",
        }
    }

    pub fn all() -> &'static [AggregationType] {
        &[
            AggregationType::Sum,
            AggregationType::Avg,
            AggregationType::Count,
            AggregationType::Min,
            AggregationType::Max,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "sum" => Some(AggregationType::Sum),
            "avg" | "average" | "mean" => Some(AggregationType::Avg),
            "count" => Some(AggregationType::Count),
            "min" => Some(AggregationType::Min),
            "max" => Some(AggregationType::Max),
            _ => None,
        }
    }
}

/// An sRGB color, serialized as `#rrggbb`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChartColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ChartColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Serialize for ChartColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChartColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChartColor::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid color: {s}")))
    }
}

/// One color for the whole series, or one per data point
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paint {
    Single(ChartColor),
    PerPoint(Vec<ChartColor>),
}

impl Paint {
    /// Color for point `index`
    pub fn at(&self, index: usize) -> ChartColor {
        match self {
            Paint::Single(c) => *c,
            Paint::PerPoint(colors) if !colors.is_empty() => colors[index % colors.len()],
            Paint::PerPoint(_) => ChartColor::rgb(0, 0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Values of a series: plain numbers, or x/y points for scatter plots
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesData {
    Values(Vec<f64>),
    Points(Vec<ScatterPoint>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Points(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> &[f64] {
        match self {
            SeriesData::Values(v) => v,
            SeriesData::Points(_) => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub label: String,
    pub data: SeriesData,
    pub background_color: Paint,
    pub border_color: Paint,
}

/// Chart-ready series produced by [`crate::data::generate_chart_data`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartSeries>,
}

impl ChartData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// No series, or only empty series
    pub fn is_empty(&self) -> bool {
        self.datasets.iter().all(|s| s.data.is_empty())
    }
}
