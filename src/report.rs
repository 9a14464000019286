use std::io::Write;

use clap::ValueEnum;
use log::info;
use serde::Serialize;

use super::error::{Result,Error};
use super::series::{self,Aggregation,Analysis};
use super::source::{DataSource,Dataset,Query};
use super::wiki::{self,Chart,DateStyle,DEFAULT_COLORS};


const LEGEND_COMMENT: &str = "
<!--UNE LÉGENDE N'A PAS VOCATION À ÊTRE ACTUALISÉE, cela pour une raison simple : à la fin de l'épidémie, en adoptant une légende avec pour exemple le jour actuel, on arrive à une situation où la grande majorité des légendes des graphiques seront à 0. Une donnée stable doit être laissé dans la lecture : celle qui correspond au pic. Si le pic du graphique change, il est possible d'actualiser la lecture. Mais sinon, il ne faut pas remplacer la donnée de la lecture par une donnée éphémère. -->";


#[derive(Clone,Copy,Debug,PartialEq,Eq,ValueEnum,Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Hospitalisations,
    Reanimation,
    RetourADomicile,
    Deces,
    Positivite,
}

impl Section {

    pub const ALL: [Section; 5] = [
	Self::Hospitalisations,
	Self::Reanimation,
	Self::RetourADomicile,
	Self::Deces,
	Self::Positivite,
    ];

    pub fn title(&self) -> &'static str {
	match self {
	    Self::Hospitalisations => "Hospitalisations",
	    Self::Reanimation => "Réanimations",
	    Self::RetourADomicile => "Retours à domicile après hospitalisation",
	    Self::Deces => "Décès à l'hôpital",
	    Self::Positivite => "Tests positifs",
	}
    }

    pub fn metrics(&self) -> &'static [Metric] {
	match self {
	    Self::Hospitalisations => &[HOSP, INCID_HOSP],
	    Self::Reanimation => &[REA, INCID_REA],
	    Self::RetourADomicile => &[INCID_RAD],
	    Self::Deces => &[INCID_DC],
	    Self::Positivite => &[POSITIFS],
	}
    }

}


#[derive(Clone,Copy,Debug)]
pub struct Caption {
    pub title: &'static str,
    pub x_axis_title: Option<&'static str>,
    pub y1_title: Option<&'static str>,
    pub lecture: Option<&'static str>,
}

impl Caption {

    const fn titled(title: &'static str) -> Self {
	Self { title, x_axis_title: None, y1_title: None, lecture: None }
    }

    fn chart(&self, colors: &str) -> Chart {
	let mut chart = Chart::new(self.title).colors(colors);
	if let Some(title) = self.x_axis_title {
	    chart = chart.x_axis_title(title);
	}
	if let Some(title) = self.y1_title {
	    chart = chart.y1_title(title);
	}
	if let Some(lecture) = self.lecture {
	    chart = chart.lecture(&format!("{}{}", lecture, LEGEND_COMMENT));
	}
	chart
    }

}


/// One column of one dataset, with the way its days add up to a week
/// and the captions of its charts.
#[derive(Clone,Copy,Debug)]
pub struct Metric {
    pub dataset: Dataset,
    pub column: &'static str,
    pub filter: Option<(&'static str,&'static str)>,
    pub aggregation: Aggregation,
    pub colors: &'static str,
    pub daily: Caption,
    pub variation: Option<Caption>,
    pub cumulative: Option<Caption>,
}

impl Metric {

    pub fn query(&self) -> Query {
	let query = Query::column(self.column);
	match self.filter {
	    Some((column, value)) => query.filter(column, value),
	    None => query,
	}
    }

}


const HOSP: Metric = Metric {
    dataset: Dataset::Hospitalieres,
    column: "hosp",
    filter: Some(("sexe", "0")),
    aggregation: Aggregation::Mean,
    colors: DEFAULT_COLORS,
    daily: Caption {
	x_axis_title: Some("Nombre total d’hospitalisations en cours attribués à la Covid-19"),
	y1_title: Some("Hospitalisations en cours"),
	lecture: Some("le 5 octobre 2020, {{nombre|7294|personnes}} atteintes de Covid-19 étaient hospitalisées."),
	..Caption::titled("Nombre d'hospitalisations de personnes atteintes de Covid-19")
    },
    variation: Some(Caption {
	x_axis_title: Some("Variation journalière des hospitalisations attribués à la Covid-19"),
	y1_title: Some("Variation journalière des hospitalisations"),
	lecture: Some("le 5 octobre 2020, {{nombre|312|personnes}} de plus que la veille sont hospitalisées pour Covid-19. Le nombre de sorties de l'hôpital (pour amélioration ou décès) est soustrait du nombre d'entrées. À ne pas confondre avec le nombre de nouvelles personnes admises quotidiennement qui est donné ci-dessous."),
	..Caption::titled("Variation journalière du nombre d'hospitalisations de personnes atteintes de Covid-19")
    }),
    cumulative: None,
};

const INCID_HOSP: Metric = Metric {
    dataset: Dataset::Nouveaux,
    column: "incid_hosp",
    filter: None,
    aggregation: Aggregation::Sum,
    colors: DEFAULT_COLORS,
    daily: Caption {
	x_axis_title: Some("Nombre quotidien de nouvelles hospitalisations attribués à la Covid-19"),
	y1_title: Some("Nombre quotidien de nouvelles hospitalisations"),
	..Caption::titled("Nombre quotidien de personnes nouvellement hospitalisées pour Covid-19")
    },
    variation: None,
    cumulative: None,
};

const REA: Metric = Metric {
    dataset: Dataset::Hospitalieres,
    column: "rea",
    filter: Some(("sexe", "0")),
    aggregation: Aggregation::Mean,
    colors: DEFAULT_COLORS,
    daily: Caption {
	lecture: Some("Le {{date-|5 octobre 2020}}, {{unité|1415 personnes}} sont en réanimation ou en soins intensifs dans les hôpitaux d'une cause attribuée à la Covid-19."),
	..Caption::titled("Nombre de personnes en réanimation ou soins intensifs pour la Covid-19")
    },
    variation: Some(Caption {
	lecture: Some("Le {{date-|5 octobre 2020}}, {{nombre|74 personnes}} de plus que la veille sont en réanimation ou en soins intensifs attribués à la Covid-19. Le nombre de sorties du service de réanimation (pour amélioration ou décès) est soustrait du nombre d'entrées. À ne pas confondre avec le nombre de nouvelles personnes admises qui est donné ci-dessous."),
	..Caption::titled("Variation du nombre de personnes en réanimation ou en soins intensifs pour la Covid-19")
    }),
    cumulative: None,
};

const INCID_REA: Metric = Metric {
    dataset: Dataset::Nouveaux,
    column: "incid_rea",
    filter: None,
    aggregation: Aggregation::Sum,
    colors: DEFAULT_COLORS,
    daily: Caption {
	lecture: Some("Le {{date-|5 octobre 2020}}, {{nombre|152 personnes}} supplémentaires sont entrées en réanimation à l'hôpital."),
	..Caption::titled("Nombre de nouvelles admissions en réanimation dans les hôpitaux")
    },
    variation: None,
    cumulative: None,
};

const INCID_RAD: Metric = Metric {
    dataset: Dataset::Nouveaux,
    column: "incid_rad",
    filter: None,
    aggregation: Aggregation::Sum,
    colors: "#79BE79, #bb8033",
    daily: Caption {
	y1_title: Some("Retours à domicile"),
	..Caption::titled("Nombre quotidien de patients hospitalisés pour cause de Covid-19 et de retour à domicile")
    },
    variation: None,
    cumulative: Some(Caption {
	x_axis_title: Some("Nombre cumulé de sorties d’hôpital"),
	y1_title: Some("Sortis d’hôpital"),
	lecture: Some("entre le début du recensement et le {{date-|10 mai 2020}}, {{unité|56217 patients}} ont quitté l'hôpital, ils sont retournés à leur domicile en raison de l'amélioration de leur état de santé et selon les critères définis par Haut Conseil de la santé publique."),
	..Caption::titled("Nombre cumulé de patients ayant été hospitalisés pour cause de Covid-19 et de retour à domicile en raison de l'amélioration de leur état de santé<ref>[https://dashboard.covid19.data.gouv.fr/ Banque de données gouvernementales sur la Covid-19 en France].</ref>.")
    }),
};

const INCID_DC: Metric = Metric {
    dataset: Dataset::Nouveaux,
    column: "incid_dc",
    filter: None,
    aggregation: Aggregation::Sum,
    colors: DEFAULT_COLORS,
    daily: Caption::titled("Nombre quotidien de décès à l'hôpital attribués à la Covid-19"),
    variation: None,
    cumulative: Some(Caption {
	x_axis_title: Some("Nombre total de décès attribués à la Covid-19 à l’hôpital"),
	..Caption::titled("Nombre total cumulé de décès à l'hôpital attribués à la Covid-19")
    }),
};

// cl_age90=0 is the all-ages total; the other classes would count it twice
const POSITIFS: Metric = Metric {
    dataset: Dataset::Positivite,
    column: "P",
    filter: Some(("cl_age90", "0")),
    aggregation: Aggregation::Sum,
    colors: DEFAULT_COLORS,
    daily: Caption {
	y1_title: Some("Tests positifs"),
	..Caption::titled("Nombre quotidien de tests positifs à la Covid-19")
    },
    variation: None,
    cumulative: None,
};


#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct MetricReport {
    pub dataset: &'static str,
    pub column: &'static str,
    pub aggregation: Aggregation,
    #[serde(flatten)]
    pub analysis: Analysis,
}

#[derive(Clone,Debug,PartialEq,Serialize)]
pub struct SectionReport {
    pub section: Section,
    pub metrics: Vec<MetricReport>,
}


pub fn analyze(source: &dyn DataSource, section: Section) -> Result<SectionReport> {

    let metrics = section.metrics().iter().map(|metric| -> Result<MetricReport> {
	let daily = source.daily(metric.dataset, &metric.query())?;
	info!("{}: {} days of {}", section.title(), daily.len(), metric.column);
	Ok(MetricReport {
	    dataset: metric.dataset.name(),
	    column: metric.column,
	    aggregation: metric.aggregation,
	    analysis: series::analyze(daily, metric.aggregation),
	})
    }).collect::<Result<_>>()?;

    Ok(SectionReport { section, metrics })

}


/// Heading and charts of one section. Nothing is written if any of
/// its metrics fails to load or comes out empty.
pub fn wiki<W: Write>(out: &mut W, source: &dyn DataSource, section: Section,
		      style: DateStyle) -> Result<()> {

    let report = analyze(source, section)?;

    if report.metrics.iter().any(|m| m.analysis.daily.is_empty()) {
	return Err(Error::MissingData);
    }

    writeln!(out, "=== {} ===", section.title())?;

    for (metric,result) in section.metrics().iter().zip(&report.metrics) {

	let analysis = &result.analysis;

	wiki::chart(out, style, &metric.daily.chart(metric.colors), &analysis.daily)?;

	if let Some(caption) = &metric.variation {
	    wiki::chart(out, style, &caption.chart(metric.colors), &analysis.daily_variation)?;
	}

	if let Some(caption) = &metric.cumulative {
	    wiki::chart(out, style, &caption.chart(metric.colors),
			&series::cumulative(&analysis.daily))?;
	}

	let weekly_title = match metric.aggregation {
	    Aggregation::Mean => format!("{} (moyenne hebdomadaire)", metric.daily.title),
	    Aggregation::Sum => format!("{} (total hebdomadaire)", metric.daily.title),
	};
	wiki::chart(out, style, &Chart::new(&weekly_title).colors(metric.colors),
		    &wiki::week_points(&analysis.weekly))?;

	if metric.variation.is_some() {
	    let title = format!("{} (variation hebdomadaire)", metric.daily.title);
	    wiki::chart(out, style, &Chart::new(&title).colors(metric.colors),
			&wiki::week_points(&analysis.weekly_variation))?;
	}

    }

    Ok(())

}


pub fn json<W: Write>(out: &mut W, reports: &[SectionReport]) -> Result<()> {
    serde_json::to_writer_pretty(out.by_ref(), reports)?;
    writeln!(out)?;
    Ok(())
}
