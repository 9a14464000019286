use std::io::Write;

use chrono::Datelike;
use chrono::naive::NaiveDate;
use clap::ValueEnum;

use super::error::Result;
use super::series::WeeklySeries;


pub const DEFAULT_COLORS: &str = "#f6b4b4, #bb8033";

const FRENCH_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin",
    "juil.", "août", "sept.", "oct.", "nov.", "déc.",
];


/// How x-axis dates are written. Passed down explicitly instead of
/// depending on the process locale.
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq,ValueEnum)]
pub enum DateStyle {
    /// `17 Mar`, `2 June`, `8 Sept`
    #[default]
    English,
    /// `17 mars`, `1er juin`
    French,
    /// `2020-03-17`
    Iso,
}

impl DateStyle {

    pub fn label(&self, date: NaiveDate) -> String {
	match self {
	    Self::English => {
		let month = date.format("%b").to_string()
		    .replace("Jun", "June").replace("Sep", "Sept");
		format!("{} {}", date.day(), month)
	    },
	    Self::French => {
		let month = FRENCH_MONTHS[date.month0() as usize];
		match date.day() {
		    1 => format!("1er {}", month),
		    day => format!("{} {}", day, month),
		}
	    },
	    Self::Iso => date.format("%Y-%m-%d").to_string(),
	}
    }

}


#[derive(Clone,Debug,PartialEq)]
pub struct Chart {
    pub title: String,
    pub lecture: Option<String>,
    pub x_axis_title: Option<String>,
    pub y1_title: Option<String>,
    pub colors: String,
}

impl Chart {

    pub fn new(title: &str) -> Self {
	Self {
	    title: title.to_string(),
	    lecture: None,
	    x_axis_title: None,
	    y1_title: None,
	    colors: DEFAULT_COLORS.to_string(),
	}
    }

    pub fn lecture(mut self, lecture: &str) -> Self {
	self.lecture = Some(lecture.to_string());
	self
    }

    pub fn x_axis_title(mut self, title: &str) -> Self {
	self.x_axis_title = Some(title.to_string());
	self
    }

    pub fn y1_title(mut self, title: &str) -> Self {
	self.y1_title = Some(title.to_string());
	self
    }

    pub fn colors(mut self, colors: &str) -> Self {
	self.colors = colors.to_string();
	self
    }

}


/// Weeks are plotted at their Monday.
pub fn week_points(data: &WeeklySeries) -> Vec<(NaiveDate,i64)> {
    data.iter().filter_map(
	|(week,value)| week.monday().map(|date| (date, *value))
    ).collect()
}


/// Write one `{{Graph:Chart}}` table, ready to paste in an article.
pub fn chart<W: Write>(out: &mut W, style: DateStyle, chart: &Chart,
		       data: &[(NaiveDate,i64)]) -> Result<()> {

    let x = data.iter().map(|(date,_)| style.label(*date)).collect::<Vec<_>>();
    let y = data.iter().map(|(_,value)| value.to_string()).collect::<Vec<_>>();

    writeln!(out, "{{|")?;
    writeln!(out, "|-")?;
    writeln!(out, "| width=\"400\" | '''''{}'''''", chart.title)?;
    writeln!(out, "|-")?;
    writeln!(out, "|{{{{Graph:Chart")?;
    writeln!(out, "|type=line")?;
    writeln!(out, "|colors={}", chart.colors)?;
    writeln!(out, "|linewidth=1")?;
    writeln!(out, "|showSymbols=1")?;
    writeln!(out, "|width=700")?;
    writeln!(out, "|showValues=")?;
    writeln!(out, "|xAxisTitle={}", chart.x_axis_title.as_ref().unwrap_or(&chart.title))?;
    writeln!(out, "|xType=date")?;
    writeln!(out, "|xAxisAngle=-60")?;
    writeln!(out, "| x = {}", x.join(", "))?;
    writeln!(out, "| y = {}", y.join(", "))?;
    if let Some(title) = &chart.y1_title {
	writeln!(out, "|y1Title={}", title)?;
    }
    writeln!(out, "|yGrid= |xGrid=")?;
    writeln!(out, "}}}}")?;
    if let Some(lecture) = &chart.lecture {
	writeln!(out, "Lecture : {}", lecture)?;
    }
    writeln!(out, "|}}")?;
    writeln!(out)?;

    Ok(())

}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::WeekKey;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn english_labels() {
	assert_eq!(DateStyle::English.label(day(2020, 3, 17)), "17 Mar");
	assert_eq!(DateStyle::English.label(day(2020, 6, 2)), "2 June");
	assert_eq!(DateStyle::English.label(day(2020, 7, 2)), "2 Jul");
	assert_eq!(DateStyle::English.label(day(2020, 9, 8)), "8 Sept");
    }

    #[test]
    fn french_and_iso_labels() {
	assert_eq!(DateStyle::French.label(day(2020, 6, 1)), "1er juin");
	assert_eq!(DateStyle::French.label(day(2020, 2, 14)), "14 févr.");
	assert_eq!(DateStyle::Iso.label(day(2020, 3, 17)), "2020-03-17");
    }

    #[test]
    fn minimal_chart() {
	let mut out = Vec::new();
	let data = vec![(day(2020, 3, 18), 30), (day(2020, 3, 19), -40)];
	chart(&mut out, DateStyle::English, &Chart::new("Variation"), &data).unwrap();
	assert_eq!(String::from_utf8(out).unwrap(), "\
{|
|-
| width=\"400\" | '''''Variation'''''
|-
|{{Graph:Chart
|type=line
|colors=#f6b4b4, #bb8033
|linewidth=1
|showSymbols=1
|width=700
|showValues=
|xAxisTitle=Variation
|xType=date
|xAxisAngle=-60
| x = 18 Mar, 19 Mar
| y = 30, -40
|yGrid= |xGrid=
}}
|}

");
    }

    #[test]
    fn chart_with_titles_and_lecture() {
	let mut out = Vec::new();
	let chart_def = Chart::new("Sorties")
	    .x_axis_title("Sorties d'hôpital")
	    .y1_title("Sortis")
	    .colors("#79BE79, #bb8033")
	    .lecture("le 10 mai 2020.");
	chart(&mut out, DateStyle::Iso, &chart_def, &[(day(2020, 5, 10), 7)]).unwrap();
	let text = String::from_utf8(out).unwrap();
	assert!(text.contains("|colors=#79BE79, #bb8033\n"));
	assert!(text.contains("|xAxisTitle=Sorties d'hôpital\n"));
	assert!(text.contains("| x = 2020-05-10\n| y = 7\n|y1Title=Sortis\n|yGrid= |xGrid=\n"));
	assert!(text.contains("}}\nLecture : le 10 mai 2020.\n|}\n"));
    }

    #[test]
    fn weeks_plot_at_monday() {
	let weekly = vec![(WeekKey { year: 2020, week: 12 }, 320)];
	assert_eq!(week_points(&weekly), vec![(day(2020, 3, 16), 320)]);
    }
}
