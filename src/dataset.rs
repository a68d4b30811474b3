//! Loading and validating historical advertising records
//!
//! The loader turns a delimited text table into a [`Dataset`] of
//! [`Observation`]s. It is deliberately lenient at the field level and strict at
//! the table level:
//!
//! - A header row naming `TV`, `Radio`, `Newspaper` and `Sales` (any order, any
//!   case) is required. Other columns are ignored.
//! - A field that is missing, empty or non-numeric is **substituted with `0.0`**.
//!   This soft default is what downstream consumers expect from this data source;
//!   every substitution is counted in [`LoadReport::defaulted_fields`] so it is
//!   never silent.
//! - A row is skipped, not fatal, when it is unreadable, when none of its four
//!   fields is numeric, or when a value is negative or non-finite.
//! - A table that yields no usable rows is a [`ParseError::NoData`].
//!
//! # Example
//! ```rust
//! let text = "TV,Radio,Newspaper,Sales\n100,20,10,12\n,30,5,9";
//! let dataset = salesfit::load(text).unwrap();
//! assert_eq!(dataset.len(), 2);
//! assert_eq!(dataset[1].tv, 0.0);
//! ```
use rand::{seq::SliceRandom, SeedableRng};

use crate::{
    channel::Channel,
    error::{Column, Error, ParseError, Result},
};

/// One historical record: the spend on each channel and the resulting sales.
///
/// All four values are finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Observation {
    /// TV spend
    #[serde(alias = "TV")]
    pub tv: f64,

    /// Radio spend
    #[serde(alias = "Radio")]
    pub radio: f64,

    /// Newspaper spend
    #[serde(alias = "Newspaper")]
    pub newspaper: f64,

    /// Observed sales
    #[serde(alias = "Sales")]
    pub sales: f64,
}

impl Observation {
    /// Creates a validated observation.
    ///
    /// # Errors
    /// Returns [`Error::InvalidObservation`] if any value is negative or not finite.
    pub fn new(tv: f64, radio: f64, newspaper: f64, sales: f64) -> Result<Self> {
        let observation = Self {
            tv,
            radio,
            newspaper,
            sales,
        };

        if observation.is_valid() {
            Ok(observation)
        } else {
            Err(Error::InvalidObservation(format!("{observation:?}")))
        }
    }

    /// Returns true if every value is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.tv, self.radio, self.newspaper, self.sales]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Returns the spend on the given channel.
    #[must_use]
    pub fn spend(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Tv => self.tv,
            Channel::Radio => self.radio,
            Channel::Newspaper => self.newspaper,
        }
    }
}

/// An ordered, immutable, non-empty sequence of observations.
///
/// A dataset can only be built through [`load`], [`Dataset::new`],
/// [`Dataset::from_json`] or [`Dataset::train_test_split`], all of which
/// guarantee the invariants. It is never mutated afterward.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Dataset {
    observations: Vec<Observation>,
}

impl Dataset {
    /// Creates a dataset from already-parsed observations.
    ///
    /// # Errors
    /// - [`Error::InvalidObservation`] if an observation breaks the invariants.
    /// - [`ParseError::NoData`] if `observations` is empty.
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if let Some(bad) = observations.iter().find(|o| !o.is_valid()) {
            return Err(Error::InvalidObservation(format!("{bad:?}")));
        }
        if observations.is_empty() {
            return Err(ParseError::NoData.into());
        }

        Ok(Self { observations })
    }

    /// Decodes a JSON array of observations.
    ///
    /// Field names may be lowercase (`tv`) or the table headers (`TV`).
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed, or for the same reasons as [`Dataset::new`].
    pub fn from_json(json: &str) -> Result<Self> {
        let observations: Vec<Observation> = serde_json::from_str(json)?;
        Self::new(observations)
    }

    /// Number of observations. Always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// The observations, in load order.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Iterates over the observations.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    /// Iterates over the spend column for one channel.
    pub fn column(&self, channel: Channel) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(move |o| o.spend(channel))
    }

    /// Iterates over the sales column.
    pub fn sales(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.sales)
    }

    /// Splits the dataset into `(train, test)` halves after a seeded shuffle.
    ///
    /// The test half holds `ceil(len * test_fraction)` observations. The same
    /// seed always produces the same split.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSplit`] if `test_fraction` is not strictly between
    /// 0 and 1, or if either half would be empty.
    ///
    /// # Example
    /// ```rust
    /// # let rows: String = (0..10).map(|i| format!("{i},{i},{i},{i}\n")).collect();
    /// # let dataset = salesfit::load(&format!("TV,Radio,Newspaper,Sales\n{rows}")).unwrap();
    /// let (train, test) = dataset.train_test_split(0.2, 42).unwrap();
    /// assert_eq!((train.len(), test.len()), (8, 2));
    /// ```
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(Error::InvalidSplit(test_fraction));
        }

        let n = self.len();
        let n_test = (n as f64 * test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(Error::InvalidSplit(test_fraction));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test);
        let pick = |idx: &[usize]| Dataset {
            observations: idx.iter().map(|&i| self.observations[i]).collect(),
        };

        Ok((pick(train_idx), pick(test_idx)))
    }
}

impl std::ops::Index<usize> for Dataset {
    type Output = Observation;

    fn index(&self, index: usize) -> &Self::Output {
        &self.observations[index]
    }
}

impl AsRef<[Observation]> for Dataset {
    fn as_ref(&self) -> &[Observation] {
        &self.observations
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

impl<'de> serde::Deserialize<'de> for Dataset {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let observations = Vec::<Observation>::deserialize(deserializer)?;
        Dataset::new(observations).map_err(serde::de::Error::custom)
    }
}

/// Options controlling how raw text is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Field delimiter. Defaults to `,`.
    pub delimiter: u8,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Why a row was left out of the dataset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SkipReason {
    /// The record could not be read at all (e.g. invalid UTF-8).
    Unreadable(String),

    /// None of the four required fields held a number.
    NoNumericFields,

    /// A field parsed to a negative or non-finite number.
    OutOfDomain(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unreadable(e) => write!(f, "unreadable record: {e}"),
            SkipReason::NoNumericFields => f.write_str("no numeric fields"),
            SkipReason::OutOfDomain(column) => {
                write!(f, "`{column}` is negative or not finite")
            }
        }
    }
}

/// A row that was skipped while loading.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the input, if known
    pub line: Option<u64>,

    /// Why the row was skipped
    pub reason: SkipReason,
}

/// Side-channel summary of a load: what was used, defaulted and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadReport {
    /// Data rows encountered (blank lines excluded)
    pub rows_read: usize,

    /// Rows that became observations
    pub rows_used: usize,

    /// Fields that were missing or non-numeric and replaced with `0.0`
    pub defaulted_fields: usize,

    /// Rows that were left out, with reasons
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    /// Number of rows that were left out.
    #[must_use]
    pub fn rows_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Parses a comma-separated table into a dataset.
///
/// See [`load_with_report`] for the coercion rules; the report is discarded here.
///
/// # Errors
/// Returns [`ParseError`] if there is no header, a required column is missing,
/// or no valid rows remain.
pub fn load(raw_text: &str) -> Result<Dataset> {
    let (dataset, _) = load_with_report(raw_text, &LoaderOptions::default())?;
    Ok(dataset)
}

/// Parses a delimited table into a dataset, returning a report of what was
/// defaulted and skipped.
///
/// # Leniency policy
/// A missing, empty or non-numeric field becomes `0.0` instead of rejecting the
/// row. Each substitution is counted in [`LoadReport::defaulted_fields`].
///
/// # Errors
/// - [`ParseError::NoHeader`] if the input is empty or the header is unreadable.
/// - [`ParseError::MissingColumn`] if one of the four required columns is absent.
/// - [`ParseError::NoData`] if no row survives.
pub fn load_with_report(raw_text: &str, options: &LoaderOptions) -> Result<(Dataset, LoadReport)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw_text.as_bytes());

    let headers = reader.headers().map_err(|_| ParseError::NoHeader)?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(ParseError::NoHeader.into());
    }

    let layout = ColumnLayout::from_headers(&headers)?;
    tracing::debug!(?layout, "Resolved column layout");

    let mut report = LoadReport::default();
    let mut observations = Vec::new();
    for record in reader.records() {
        report.rows_read += 1;

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(csv::Position::line);
                skip(&mut report, line, SkipReason::Unreadable(e.to_string()));
                continue;
            }
        };

        let line = record.position().map(csv::Position::line);
        match layout.coerce(&record) {
            Ok((observation, defaulted)) => {
                report.defaulted_fields += defaulted;
                observations.push(observation);
            }
            Err(reason) => skip(&mut report, line, reason),
        }
    }

    report.rows_used = observations.len();
    tracing::debug!(
        rows_read = report.rows_read,
        rows_used = report.rows_used,
        rows_skipped = report.rows_skipped(),
        defaulted_fields = report.defaulted_fields,
        "Loaded advertising dataset"
    );

    if observations.is_empty() {
        return Err(ParseError::NoData.into());
    }

    Ok((Dataset { observations }, report))
}

fn skip(report: &mut LoadReport, line: Option<u64>, reason: SkipReason) {
    tracing::warn!(?line, %reason, "Skipping row");
    report.skipped.push(SkippedRow { line, reason });
}

/// Indices of the required columns within a record.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    tv: usize,
    radio: usize,
    newspaper: usize,
    sales: usize,
}

/// The outcome of reading a single field.
enum Field {
    Number(f64),
    Defaulted,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |column: Column| {
            let name = match column {
                Column::Channel(channel) => channel.header(),
                Column::Sales => "Sales",
            };
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(ParseError::MissingColumn(column))
        };

        Ok(Self {
            tv: find(Column::Channel(Channel::Tv))?,
            radio: find(Column::Channel(Channel::Radio))?,
            newspaper: find(Column::Channel(Channel::Newspaper))?,
            sales: find(Column::Sales)?,
        })
    }

    /// Turns a record into an observation and the number of defaulted fields.
    fn coerce(&self, record: &csv::StringRecord) -> std::result::Result<(Observation, usize), SkipReason> {
        let columns = [
            (self.tv, Column::Channel(Channel::Tv)),
            (self.radio, Column::Channel(Channel::Radio)),
            (self.newspaper, Column::Channel(Channel::Newspaper)),
            (self.sales, Column::Sales),
        ];

        let mut values = [0.0; 4];
        let mut defaulted = 0;
        for (slot, (index, column)) in values.iter_mut().zip(columns) {
            match Self::field(record, index) {
                Field::Number(v) if !v.is_finite() || v < 0.0 => {
                    return Err(SkipReason::OutOfDomain(column.to_string()));
                }
                Field::Number(v) => *slot = v,
                Field::Defaulted => defaulted += 1,
            }
        }

        if defaulted == values.len() {
            return Err(SkipReason::NoNumericFields);
        }

        let [tv, radio, newspaper, sales] = values;
        Ok((
            Observation {
                tv,
                radio,
                newspaper,
                sales,
            },
            defaulted,
        ))
    }

    fn field(record: &csv::StringRecord, index: usize) -> Field {
        match record.get(index).map(str::parse::<f64>) {
            Some(Ok(v)) => Field::Number(v),
            _ => Field::Defaulted,
        }
    }
}
