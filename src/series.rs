use std::fmt;
use std::collections::BTreeMap;

use chrono::{Datelike,Weekday};
use chrono::naive::NaiveDate;
use serde::{Serialize,Serializer};


pub type DailySeries = Vec<(NaiveDate,i64)>;
pub type DailyVariation = Vec<(NaiveDate,i64)>;
pub type WeeklySeries = Vec<(WeekKey,i64)>;
pub type WeeklyVariation = Vec<(WeekKey,i64)>;


/// ISO-8601 week: (ISO year, week number). Near the new year the ISO
/// year can differ from the calendar year of the date.
#[derive(Clone,Copy,Debug,PartialEq,Eq,PartialOrd,Ord,Hash)]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {

    pub fn from_date(date: NaiveDate) -> Self {
	let week = date.iso_week();
	Self { year: week.year(), week: week.week() }
    }

    pub fn monday(&self) -> Option<NaiveDate> {
	NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
    }

}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
	serializer.collect_str(self)
    }
}


/// How the days of one week combine. Stock metrics (people currently
/// in hospital) are averaged, flow metrics (new admissions) are summed.
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    Mean,
}

impl Aggregation {

    /// Mean rounds half away from zero. An empty slice reduces to 0.
    pub fn reduce(&self, values: &[i64]) -> i64 {
	let sum : i64 = values.iter().sum();
	match self {
	    Self::Sum => sum,
	    Self::Mean => {
		let n = values.len() as i64;
		match (n, sum >= 0) {
		    (0, _) => 0,
		    (n, true) => (2 * sum + n) / (2 * n),
		    (n, false) => -((-2 * sum + n) / (2 * n)),
		}
	    }
	}
    }

}


#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct Analysis {
    pub daily: DailySeries,
    pub daily_variation: DailyVariation,
    pub weekly: WeeklySeries,
    pub weekly_variation: WeeklyVariation,
}


/// Fold rows into a series, one entry per date, ascending. Rows
/// sharing a date are added together.
pub fn accumulate<I>(rows: I) -> DailySeries
where I: IntoIterator<Item = (NaiveDate,i64)> {
    rows.into_iter().fold(BTreeMap::new(), |mut acc, (date,value)| {
	*acc.entry(date).or_insert(0) += value;
	acc
    }).into_iter().collect()
}


/// Difference of each entry with the one before it. The input order is
/// taken as chronological; nothing is re-sorted here.
pub fn daily_variation(data: &[(NaiveDate,i64)]) -> DailyVariation {
    (1..data.len()).map(
	|i| (data[i].0, data[i].1 - data[i-1].1)
    ).collect()
}


/// Contiguous-run grouping: consecutive entries with the same week are
/// reduced together. Two spans of one week separated by another week
/// stay two buckets, so callers wanting a full group-by sort first.
pub fn group_by_week(data: &[(NaiveDate,i64)], aggregation: Aggregation) -> WeeklySeries {

    let mut runs : Vec<(WeekKey,Vec<i64>)> = Vec::new();

    for (date,value) in data {
	let key = WeekKey::from_date(*date);
	match runs.last_mut() {
	    Some((last,values)) if *last == key => values.push(*value),
	    _ => runs.push((key, vec![*value])),
	}
    }

    runs.into_iter().map(
	|(key,values)| (key, aggregation.reduce(&values))
    ).collect()

}


pub fn group_variation_by_week(variation: &[(NaiveDate,i64)]) -> WeeklyVariation {
    group_by_week(variation, Aggregation::Sum)
}


pub fn cumulative(data: &[(NaiveDate,i64)]) -> DailySeries {
    let mut sum = 0;
    data.iter().map(
	|(k,v)| {sum += v; (*k, sum)}
    ).collect()
}


/// All four views of a series. The input is sorted by date and
/// duplicate dates are merged first, so weekly buckets never split.
pub fn analyze(series: DailySeries, aggregation: Aggregation) -> Analysis {

    let daily = accumulate(series);
    let daily_variation = daily_variation(&daily);
    let weekly = group_by_week(&daily, aggregation);
    let weekly_variation = group_variation_by_week(&daily_variation);

    Analysis { daily, daily_variation, weekly, weekly_variation }

}


#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn week(year: i32, week: u32) -> WeekKey {
	WeekKey { year, week }
    }

    fn march_series() -> DailySeries {
	vec![(day(2020, 3, 17), 100), (day(2020, 3, 18), 130), (day(2020, 3, 19), 90)]
    }

    #[test]
    fn variation_of_same_week_series() {
	assert_eq!(daily_variation(&march_series()),
		   vec![(day(2020, 3, 18), 30), (day(2020, 3, 19), -40)]);
    }

    #[test]
    fn variation_is_one_shorter() {
	let series : DailySeries = (1..=20).map(|d| (day(2020, 4, d), (d * d) as i64)).collect();
	let variation = daily_variation(&series);
	assert_eq!(variation.len(), series.len() - 1);
	for (i, (date, delta)) in variation.iter().enumerate() {
	    assert_eq!(*date, series[i + 1].0);
	    assert_eq!(*delta, series[i + 1].1 - series[i].1);
	}
    }

    #[test]
    fn variation_of_empty_and_singleton() {
	assert!(daily_variation(&[]).is_empty());
	assert!(daily_variation(&[(day(2020, 3, 17), 5)]).is_empty());
    }

    #[test]
    fn weekly_sum_and_mean() {
	assert_eq!(group_by_week(&march_series(), Aggregation::Sum), vec![(week(2020, 12), 320)]);
	assert_eq!(group_by_week(&march_series(), Aggregation::Mean), vec![(week(2020, 12), 107)]);
    }

    #[test]
    fn mean_rounds_half_away_from_zero() {
	assert_eq!(Aggregation::Mean.reduce(&[1, 2]), 2);
	assert_eq!(Aggregation::Mean.reduce(&[1, 1, 2]), 1);
	assert_eq!(Aggregation::Mean.reduce(&[-1, -2]), -2);
	assert_eq!(Aggregation::Mean.reduce(&[]), 0);
    }

    #[test]
    fn week_boundary_splits_buckets() {
	let series = vec![(day(2020, 3, 15), 10), (day(2020, 3, 17), 20)];
	assert_eq!(group_by_week(&series, Aggregation::Sum),
		   vec![(week(2020, 11), 10), (week(2020, 12), 20)]);
	assert_eq!(daily_variation(&series), vec![(day(2020, 3, 17), 10)]);
    }

    #[test]
    fn unordered_input_is_grouped_by_runs() {
	let series = vec![(day(2020, 3, 17), 1), (day(2020, 3, 10), 2), (day(2020, 3, 18), 3)];
	assert_eq!(group_by_week(&series, Aggregation::Sum),
		   vec![(week(2020, 12), 1), (week(2020, 11), 2), (week(2020, 12), 3)]);
    }

    #[test]
    fn analyze_sorts_before_grouping() {
	let series = vec![(day(2020, 3, 17), 1), (day(2020, 3, 10), 2), (day(2020, 3, 18), 3)];
	let analysis = analyze(series, Aggregation::Sum);
	assert_eq!(analysis.daily,
		   vec![(day(2020, 3, 10), 2), (day(2020, 3, 17), 1), (day(2020, 3, 18), 3)]);
	assert_eq!(analysis.weekly, vec![(week(2020, 11), 2), (week(2020, 12), 4)]);
	assert_eq!(analysis.weekly_variation, vec![(week(2020, 12), 1)]);
    }

    #[test]
    fn duplicate_dates_are_added() {
	let series = accumulate(vec![(day(2020, 3, 17), 5), (day(2020, 3, 17), 7)]);
	assert_eq!(series, vec![(day(2020, 3, 17), 12)]);
    }

    #[test]
    fn weekly_sum_conserves_total() {
	let series : DailySeries = (1..=31).map(|d| (day(2020, 5, d), (d * 7 % 13) as i64)).collect();
	let weekly = group_by_week(&series, Aggregation::Sum);
	assert_eq!(weekly.len(), 5);
	assert_eq!(weekly.iter().map(|(_, v)| v).sum::<i64>(),
		   series.iter().map(|(_, v)| v).sum::<i64>());
    }

    #[test]
    fn weekly_variation_telescopes() {
	let series : DailySeries = (1..=30).map(|d| (day(2020, 6, d), (d * d % 17) as i64)).collect();
	let analysis = analyze(series.clone(), Aggregation::Mean);

	let total : i64 = analysis.weekly_variation.iter().map(|(_, v)| v).sum();
	assert_eq!(total, series[series.len() - 1].1 - series[0].1);

	// each week's variation is its last day minus the previous week's last day
	let mut last_of_week = BTreeMap::new();
	for (date, value) in &series {
	    last_of_week.insert(WeekKey::from_date(*date), *value);
	}
	let lasts : Vec<_> = last_of_week.into_iter().collect();
	let expected : Vec<_> = (1..lasts.len()).map(
	    |i| (lasts[i].0, lasts[i].1 - lasts[i-1].1)
	).collect();
	assert_eq!(analysis.weekly_variation[1..].to_vec(), expected);
    }

    #[test]
    fn analyze_empty_series() {
	let analysis = analyze(vec![], Aggregation::Mean);
	assert!(analysis.daily.is_empty());
	assert!(analysis.daily_variation.is_empty());
	assert!(analysis.weekly.is_empty());
	assert!(analysis.weekly_variation.is_empty());
    }

    #[test]
    fn iso_week_across_new_year() {
	assert_eq!(WeekKey::from_date(day(2021, 1, 1)), week(2020, 53));
	assert_eq!(WeekKey::from_date(day(2020, 12, 28)), week(2020, 53));
	assert_eq!(week(2020, 53).monday(), Some(day(2020, 12, 28)));
	assert_eq!(week(2020, 12).to_string(), "2020-W12");
    }

    #[test]
    fn running_total() {
	assert_eq!(cumulative(&march_series()),
		   vec![(day(2020, 3, 17), 100), (day(2020, 3, 18), 230), (day(2020, 3, 19), 320)]);
    }
}
