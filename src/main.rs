mod error;
mod series;
mod source;
mod wiki;
mod report;

use std::io;
use std::fs::File;
use std::io::{BufWriter,Write};
use std::path::PathBuf;

use clap::{Parser,ValueEnum};
use log::{error,info};

use error::Result;
use report::Section;
use source::{Dataset,Location,Sources};
use wiki::DateStyle;


#[derive(Clone,Copy,Debug,PartialEq,Eq,ValueEnum)]
enum Format {
    /// `{{Graph:Chart}}` tables to paste in an article
    Wiki,
    /// Daily, daily variation, weekly and weekly variation series
    Json,
}

/// Print French Covid-19 hospital statistics as wiki charts.
#[derive(Parser,Debug)]
#[command(name = "covid19-wiki")]
struct Cli {
    /// Section to print, may be repeated (default: every section with a data source).
    #[arg(long = "section", value_enum)]
    sections: Vec<Section>,

    /// Path or URL of donnees-hospitalieres-covid19.
    #[arg(long)]
    hospitalieres: Option<String>,

    /// Path or URL of donnees-hospitalieres-nouveaux-covid19.
    #[arg(long)]
    nouveaux: Option<String>,

    /// Path or URL of sp-pos-quot-fra (no default).
    #[arg(long)]
    positivite: Option<String>,

    /// How dates are written on the x axis.
    #[arg(long, value_enum, default_value_t = DateStyle::English)]
    date_style: DateStyle,

    #[arg(long, value_enum, default_value_t = Format::Wiki)]
    format: Format,

    /// Write to this file instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Cli {

    fn sources(&self) -> Sources {
	[(Dataset::Hospitalieres, &self.hospitalieres),
	 (Dataset::Nouveaux, &self.nouveaux),
	 (Dataset::Positivite, &self.positivite)]
	    .into_iter().fold(Sources::new(), |sources, (dataset, arg)| match arg {
		Some(arg) => sources.with(dataset, Location::parse(arg)),
		None => sources,
	    })
    }

    fn sections(&self, sources: &Sources) -> Vec<Section> {
	match self.sections.is_empty() {
	    false => self.sections.clone(),
	    true => Section::ALL.iter().copied().filter(|section| {
		let available = section.metrics().iter().all(|m| sources.has(m.dataset));
		if !available {
		    info!("Skipping {}: no data source given", section.title());
		}
		available
	    }).collect(),
	}
    }

}


fn main() -> Result<()> {

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
	.target(env_logger::Target::Stderr)
	.init();

    let cli = Cli::parse();
    let sources = cli.sources();
    let sections = cli.sections(&sources);

    let mut out : Box<dyn Write> = match &cli.output {
	Some(path) => Box::new(BufWriter::new(File::create(path)?)),
	None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match cli.format {
	Format::Wiki => {
	    for section in sections {
		if let Err(err) = report::wiki(&mut out, &sources, section, cli.date_style) {
		    error!("{}: {}", section.title(), err);
		}
	    }
	},
	Format::Json => {
	    let reports = sections.into_iter().filter_map(
		|section| match report::analyze(&sources, section) {
		    Ok(report) => Some(report),
		    Err(err) => {
			error!("{}: {}", section.title(), err);
			None
		    }
		}).collect::<Vec<_>>();
	    report::json(&mut out, &reports)?;
	},
    }

    out.flush()?;

    Ok(())

}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sections_need_a_positivite_file() {
	let cli = Cli::parse_from(["covid19-wiki"]);
	let sources = cli.sources();
	assert_eq!(cli.sections(&sources), vec![
	    Section::Hospitalisations,
	    Section::Reanimation,
	    Section::RetourADomicile,
	    Section::Deces,
	]);
	assert_eq!(cli.date_style, DateStyle::English);
	assert_eq!(cli.format, Format::Wiki);
    }

    #[test]
    fn explicit_sources_and_sections() {
	let cli = Cli::parse_from([
	    "covid19-wiki", "--positivite", "sp-pos-quot-fra.csv",
	    "--section", "positivite", "--section", "retour-a-domicile",
	    "--date-style", "french", "--format", "json", "-o", "out.json",
	]);
	let sources = cli.sources();
	assert!(sources.has(Dataset::Positivite));
	assert_eq!(cli.sections(&sources), vec![Section::Positivite, Section::RetourADomicile]);
	assert_eq!(cli.date_style, DateStyle::French);
	assert_eq!(cli.format, Format::Json);
	assert_eq!(cli.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn cli_definition_is_valid() {
	use clap::CommandFactory;
	Cli::command().debug_assert();
    }
}
