//! Named price series: one instrument's cleaned daily bars.

use super::provider::{DataSource, RawBar};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct PriceSeries {
    /// Display name, e.g. "Crude Oil".
    pub name: String,
    /// Provider symbol, e.g. "CL=F".
    pub symbol: String,
    pub source: DataSource,
    /// Bars sorted ascending by date.
    pub bars: Vec<RawBar>,
}

impl PriceSeries {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        source: DataSource,
        bars: Vec<RawBar>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            source,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// `(date, close)` pairs.
    pub fn close_points(&self) -> Vec<(NaiveDate, f64)> {
        self.bars.iter().map(|b| (b.date, b.close)).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Chart file stem: lower-case name with spaces as underscores.
    pub fn slug(&self) -> String {
        self.name.replace(' ', "_").to_lowercase()
    }

    /// Span of the series in whole years, rounded to the nearest year (min 1).
    pub fn span_years(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => {
                let days = (last - first).num_days();
                ((days as f64 / 365.25).round() as i64).max(1)
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::generate_bars;

    #[test]
    fn slug_matches_chart_naming() {
        let s = PriceSeries::new("Crude Oil", "CL=F", DataSource::Csv, vec![]);
        assert_eq!(s.slug(), "crude_oil");
    }

    #[test]
    fn span_years_rounds() {
        let start = NaiveDate::from_ymd_opt(2004, 10, 18).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 10, 17).unwrap();
        let s = PriceSeries::new("Gold", "GC=F", DataSource::Synthetic, generate_bars("GC=F", start, end));
        assert_eq!(s.span_years(), 20);
        assert_eq!(PriceSeries::new("x", "x", DataSource::Csv, vec![]).span_years(), 0);
    }

    #[test]
    fn accessors_follow_bars() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let bars = generate_bars("CL=F", start, end);
        let s = PriceSeries::new("Crude Oil", "CL=F", DataSource::Synthetic, bars.clone());
        assert_eq!(s.len(), bars.len());
        assert_eq!(s.first_date(), Some(bars[0].date));
        assert_eq!(s.closes()[3], bars[3].close);
        assert_eq!(s.close_points()[3], (bars[3].date, bars[3].close));
    }
}
