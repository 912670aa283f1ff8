use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Selection models
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
	#[error("Unknown country: {0}")]
	UnknownCountry(String),

	#[error("Unsupported year: {0}")]
	UnsupportedYear(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
	Peru,
	Mexico,
	Argentina,
	Chile,
	Colombia,
}

impl Country {
	pub const ALL: [Country; 5] = [
		Country::Peru,
		Country::Mexico,
		Country::Argentina,
		Country::Chile,
		Country::Colombia,
	];

	/// Value used in provider paths and API payloads.
	pub fn as_str(&self) -> &'static str {
		match self {
			Country::Peru => "peru",
			Country::Mexico => "mexico",
			Country::Argentina => "argentina",
			Country::Chile => "chile",
			Country::Colombia => "colombia",
		}
	}

	/// Dropdown label, with accents.
	pub fn label(&self) -> &'static str {
		match self {
			Country::Peru => "Perú",
			Country::Mexico => "México",
			Country::Argentina => "Argentina",
			Country::Chile => "Chile",
			Country::Colombia => "Colombia",
		}
	}

	/// The value with its first letter upper-cased and the rest lower-cased.
	pub fn capitalized(&self) -> String {
		capitalize(self.as_str())
	}
}

impl fmt::Display for Country {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Country {
	type Err = SelectionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let needle = s.trim();
		Country::ALL
			.iter()
			.copied()
			.find(|c| c.as_str().eq_ignore_ascii_case(needle))
			.ok_or_else(|| SelectionError::UnknownCountry(s.to_string()))
	}
}

pub fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

/// A year offered by the dashboard. Accepts a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "YearRepr", into = "u16")]
pub struct Year(u16);

impl Year {
	pub const SUPPORTED: [u16; 4] = [2018, 2019, 2020, 2021];

	pub fn new(value: u16) -> Result<Self, SelectionError> {
		if Self::SUPPORTED.contains(&value) {
			Ok(Year(value))
		} else {
			Err(SelectionError::UnsupportedYear(value.to_string()))
		}
	}

	pub fn all() -> impl Iterator<Item = Year> {
		Self::SUPPORTED.into_iter().map(Year)
	}

	pub fn value(&self) -> u16 {
		self.0
	}
}

impl fmt::Display for Year {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for Year {
	type Err = SelectionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let value: u16 = s
			.trim()
			.parse()
			.map_err(|_| SelectionError::UnsupportedYear(s.to_string()))?;
		Year::new(value)
	}
}

impl From<Year> for u16 {
	fn from(year: Year) -> Self {
		year.0
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
	Number(u16),
	Text(String),
}

impl TryFrom<YearRepr> for Year {
	type Error = SelectionError;

	fn try_from(repr: YearRepr) -> Result<Self, Self::Error> {
		match repr {
			YearRepr::Number(n) => Year::new(n),
			YearRepr::Text(s) => s.parse(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
	pub country: Country,
	pub year: Year,
}

impl Selection {
	pub fn new(country: Country, year: Year) -> Self {
		Self { country, year }
	}

	pub fn description(&self) -> String {
		format!(
			"Monthly exchange rate time series for {} in {}.",
			self.country.capitalized(),
			self.year
		)
	}
}

impl Default for Selection {
	fn default() -> Self {
		Self {
			country: Country::Colombia,
			year: Year(2018),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
	pub label: String,
	pub value: String,
}

// Provider models
/// Month as sent by the provider: an integer ordinal or a label, kept verbatim.
/// A fractional number such as `1.0` matches neither and fails the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonthKey {
	Ordinal(i64),
	Label(String),
}

impl fmt::Display for MonthKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MonthKey::Ordinal(n) => write!(f, "{}", n),
			MonthKey::Label(s) => f.write_str(s),
		}
	}
}

/// One month of exchange-rate statistics. `min <= open, last <= max` is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRateRecord {
	pub month: MonthKey,
	pub open: f64,
	pub max: f64,
	pub min: f64,
	pub last: f64,
	pub var: f64,
}

/// Records for one (country, year), in provider order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSeries(Vec<MonthlyRateRecord>);

impl RateSeries {
	pub fn records(&self) -> &[MonthlyRateRecord] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn months(&self) -> Vec<MonthKey> {
		self.0.iter().map(|r| r.month.clone()).collect()
	}

	pub fn column(&self, pick: impl Fn(&MonthlyRateRecord) -> f64) -> Vec<f64> {
		self.0.iter().map(pick).collect()
	}
}

impl From<Vec<MonthlyRateRecord>> for RateSeries {
	fn from(records: Vec<MonthlyRateRecord>) -> Self {
		RateSeries(records)
	}
}

// Chart payload models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTrace {
	pub name: String,
	pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPayload {
	pub x: Vec<MonthKey>,
	pub traces: Vec<LineTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
	pub month: MonthKey,
	pub value: f64,
	/// Index into `BarPayload::categories`.
	pub category: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPayload {
	pub bars: Vec<BarEntry>,
	/// Distinct `var` values, first-occurrence order. One colour each.
	pub categories: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleTrace {
	pub x: Vec<MonthKey>,
	pub open: Vec<f64>,
	pub high: Vec<f64>,
	pub low: Vec<f64>,
	pub close: Vec<f64>,
	pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayLine {
	pub x: Vec<MonthKey>,
	/// `None` renders as a gap.
	pub y: Vec<Option<f64>>,
	pub color: String,
	pub width: f64,
	pub marker_size: f64,
	pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleLayout {
	pub xaxis_rangeslider_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePayload {
	pub candles: CandleTrace,
	pub moving_average: OverlayLine,
	pub layout: CandleLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardCharts {
	pub time_series: TimeSeriesPayload,
	pub bar: BarPayload,
	pub candle: CandlePayload,
}
