use std::fs;
use std::cell::RefCell;
use std::path::PathBuf;
use std::collections::HashMap;

use chrono::naive::NaiveDate;
use encoding_rs::{UTF_8,WINDOWS_1252};
use log::{debug,info,warn};

use super::error::{Result,Error};
use super::series::{self,DailySeries};


#[derive(Clone,Copy,Debug,PartialEq,Eq,Hash)]
pub enum Dataset {
    /// Patients currently in hospital, per department, sex and day.
    Hospitalieres,
    /// New admissions, returns home and deaths, per department and day.
    Nouveaux,
    /// Daily tests and positive tests, per age class.
    Positivite,
}

impl Dataset {

    pub fn name(&self) -> &'static str {
	match self {
	    Self::Hospitalieres => "donnees-hospitalieres-covid19",
	    Self::Nouveaux => "donnees-hospitalieres-nouveaux-covid19",
	    Self::Positivite => "sp-pos-quot-fra",
	}
    }

    pub fn default_location(&self) -> Option<Location> {
	match self {
	    Self::Hospitalieres => Some(Location::Remote(
		"https://www.data.gouv.fr/fr/datasets/r/63352e38-d353-4b54-bfd1-f1b3ee1cabd7".to_string())),
	    Self::Nouveaux => Some(Location::Remote(
		"https://www.data.gouv.fr/fr/datasets/r/6fadff46-9efd-4c53-942a-54aca783c30c".to_string())),
	    Self::Positivite => None,
	}
    }

}


#[derive(Clone,Debug,PartialEq,Eq)]
pub enum Location {
    Remote(String),
    File(PathBuf),
}

impl Location {

    /// Anything that looks like an http(s) URL is fetched, the rest is a path.
    pub fn parse(arg: &str) -> Self {
	match arg.starts_with("http://") || arg.starts_with("https://") {
	    true => Self::Remote(arg.to_string()),
	    false => Self::File(PathBuf::from(arg)),
	}
    }

    fn load(&self) -> Result<String> {
	match self {
	    Self::Remote(url) => download(url),
	    Self::File(path) => {
		info!("Reading {}...", path.display());
		Ok(decode(&fs::read(path)?))
	    }
	}
    }

}


/// Which rows to keep and which column to add up.
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct Query {
    pub column: String,
    pub filter: Option<(String,String)>,
}

impl Query {

    pub fn column(column: &str) -> Self {
	Self { column: column.to_string(), filter: None }
    }

    pub fn filter(mut self, column: &str, value: &str) -> Self {
	self.filter = Some((column.to_string(), value.to_string()));
	self
    }

}


pub trait DataSource {
    fn daily(&self, dataset: Dataset, query: &Query) -> Result<DailySeries>;
}


/// Dataset locations for one run. Raw text is kept in memory once
/// loaded, since several metrics come out of the same file.
pub struct Sources {
    locations: HashMap<Dataset,Location>,
    loaded: RefCell<HashMap<Dataset,String>>,
}

impl Sources {

    pub fn new() -> Self {
	let locations = [Dataset::Hospitalieres, Dataset::Nouveaux, Dataset::Positivite]
	    .iter().filter_map(|ds| ds.default_location().map(|loc| (*ds, loc)))
	    .collect();
	Self { locations, loaded: RefCell::new(HashMap::new()) }
    }

    pub fn with(mut self, dataset: Dataset, location: Location) -> Self {
	self.locations.insert(dataset, location);
	self
    }

    pub fn has(&self, dataset: Dataset) -> bool {
	self.locations.contains_key(&dataset)
    }

    fn text(&self, dataset: Dataset) -> Result<String> {
	if let Some(text) = self.loaded.borrow().get(&dataset) {
	    return Ok(text.clone());
	}
	let location = self.locations.get(&dataset)
	    .ok_or(Error::MissingSource(dataset.name()))?;
	let text = location.load()?;
	self.loaded.borrow_mut().insert(dataset, text.clone());
	Ok(text)
    }

}

impl DataSource for Sources {
    fn daily(&self, dataset: Dataset, query: &Query) -> Result<DailySeries> {
	parse_daily(&self.text(dataset)?, query)
    }
}


fn download(url: &str) -> Result<String> {

    info!("Downloading {}...", url);

    let res = reqwest::blocking::get(url)?;

    match res.status().is_success() {
	true => Ok(decode(&res.bytes()?)),
	false => Err(Error::HttpError(res.status())),
    }

}


/// UTF-8 with or without BOM; older exports were Windows-1252.
pub fn decode(bytes: &[u8]) -> String {
    let (text, _, malformed) = UTF_8.decode(bytes);
    match malformed {
	false => text.into_owned(),
	true => {
	    warn!("Input is not valid UTF-8, decoding as Windows-1252");
	    WINDOWS_1252.decode(bytes).0.into_owned()
	}
    }
}


pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    let value = value.split(|c: char| c == ' ' || c == 'T').next().unwrap_or(value);
    match value.contains('/') {
	true => Ok(NaiveDate::parse_from_str(value, "%d/%m/%Y")?),
	false => Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?),
    }
}


/// Parse a `;`-separated export into one value per day. Rows not
/// matching the query filter are dropped, the rest are summed by date.
pub fn parse_daily(text: &str, query: &Query) -> Result<DailySeries> {

    let mut reader = csv::ReaderBuilder::new()
	.delimiter(b';')
	.from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let index = |name: &str| headers.iter().position(|h| h.trim_matches('"') == name)
	.ok_or_else(|| Error::MissingColumn(name.to_string()));

    let date_col = index("jour")?;
    let value_col = index(query.column.as_str())?;
    let filter = match &query.filter {
	Some((column, value)) => Some((index(column.as_str())?, value.as_str())),
	None => None,
    };

    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in reader.records() {
	let record = record?;
	if let Some((col, expected)) = filter {
	    if record.get(col).map(str::trim) != Some(expected) {
		continue;
	    }
	}
	let value = record.get(value_col).unwrap_or("").trim();
	if value.is_empty() || value == "NA" {
	    skipped += 1;
	    continue;
	}
	let value = value.parse::<i64>().map_err(
	    |source| Error::ParseInt { value: value.to_string(), source })?;
	rows.push((parse_date(record.get(date_col).unwrap_or(""))?, value));
    }

    if skipped > 0 {
	warn!("Skipped {} rows without a value for {}", skipped, query.column);
    }
    debug!("Read {} rows for {}", rows.len(), query.column);

    Ok(series::accumulate(rows))

}
