//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. One request per
//! symbol; a failed request is reported to the caller, never retried.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Bars are stamped at local midnight or session open, so the calendar date
/// must be taken in exchange time.
#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// IANA zone, e.g. `America/New_York`.
    #[serde(default, rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
    /// Offset from UTC in seconds at request time. Only used when the zone
    /// name is missing or unknown, since it ignores DST changes.
    #[serde(default)]
    gmtoffset: i64,
}

/// How bar timestamps map to exchange calendar dates.
#[derive(Debug, Clone, Copy)]
enum ExchangeClock {
    Zone(Tz),
    FixedOffset(i64),
}

impl ExchangeClock {
    fn from_meta(meta: Option<&ChartMeta>) -> Self {
        let Some(meta) = meta else {
            return ExchangeClock::FixedOffset(0);
        };
        match meta
            .exchange_timezone_name
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
        {
            Some(tz) => ExchangeClock::Zone(tz),
            None => ExchangeClock::FixedOffset(meta.gmtoffset),
        }
    }

    fn date(self, ts: i64) -> Option<NaiveDate> {
        match self {
            ExchangeClock::Zone(tz) => Utc
                .timestamp_opt(ts, 0)
                .single()
                .map(|dt| dt.with_timezone(&tz).date_naive()),
            ExchangeClock::FixedOffset(offset) => ts
                .checked_add(offset)
                .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
                .map(|dt| dt.naive_utc().date()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at a different chart endpoint (mirrors, test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Build the chart API URL for a symbol and inclusive date range.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(chrono::NaiveTime::default()).and_utc().timestamp();
        let end_ts = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(chrono::NaiveTime::default())
            .and_utc()
            .timestamp();
        format!(
            "{}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true&events=div%2Csplit",
            self.base_url
        )
    }

    /// Parse the chart API response into RawBars.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A symbol with no trading history in range comes back without timestamps
        let timestamps = data.timestamp.ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let clock = ExchangeClock::from_meta(data.meta.as_ref());
        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = clock
                .date(ts)
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();
            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());

            // Holidays come back as all-null rows
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                continue;
            }

            let close = close.unwrap_or(f64::NAN);
            bars.push(RawBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close,
                volume: volume.unwrap_or(0),
                adj_close: adj_close.unwrap_or(close),
            });
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let url = self.chart_url(symbol, start, end);
        tracing::debug!(%symbol, %url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        let bars = Self::parse_response(symbol, chart)?;
        tracing::debug!(%symbol, bars = bars.len(), "chart parsed");

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::YahooFinance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RawBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("GC=F", resp)
    }

    #[test]
    fn parses_quotes_and_skips_null_rows() {
        // 2024-01-02, 2024-01-03 (all null), 2024-01-04
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704171600,1704258000,1704344400],
            "indicators":{
                "quote":[{
                    "open":[2064.4,null,2040.0],
                    "high":[2070.0,null,2050.1],
                    "low":[2060.1,null,2035.5],
                    "close":[2064.4,null,2042.3],
                    "volume":[120,null,95]
                }],
                "adjclose":[{"adjclose":[2064.4,null,2042.3]}]
            }
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 2042.3);
        assert_eq!(bars[1].volume, 95);
    }

    #[test]
    fn dates_are_taken_in_exchange_time() {
        // 2024-01-01T23:00:00Z is midnight on 2024-01-02 at UTC+1
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":3600},
            "timestamp":[1704150000],
            "indicators":{"quote":[{
                "open":[1.1],"high":[1.2],"low":[1.0],"close":[1.15],"volume":[0]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn summer_bars_use_exchange_dst() {
        // Mon 2024-07-01 00:00 EDT, requested in winter (gmtoffset is EST)
        let json = r#"{"chart":{"result":[{
            "meta":{"exchangeTimezoneName":"America/New_York","gmtoffset":-18000},
            "timestamp":[1719806400],
            "indicators":{"quote":[{
                "open":[83.4],"high":[84.1],"low":[82.9],"close":[83.4],"volume":[1000]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());

        let cleaned = crate::data::ingest::ingest(bars).unwrap();
        assert_eq!(cleaned.bars.len(), 1);
        assert_eq!(cleaned.report.weekend_dropped, 0);
    }

    #[test]
    fn london_zone_keeps_bst_dates() {
        // Mon 2024-07-01 00:00 BST is 2024-06-30T23:00:00Z
        let json = r#"{"chart":{"result":[{
            "meta":{"exchangeTimezoneName":"Europe/London","gmtoffset":0},
            "timestamp":[1719788400],
            "indicators":{"quote":[{
                "open":[1.07],"high":[1.08],"low":[1.06],"close":[1.07],"volume":[0]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn unknown_zone_falls_back_to_gmtoffset() {
        let json = r#"{"chart":{"result":[{
            "meta":{"exchangeTimezoneName":"Mars/Olympus","gmtoffset":3600},
            "timestamp":[1704150000],
            "indicators":{"quote":[{
                "open":[1.1],"high":[1.2],"low":[1.0],"close":[1.15],"volume":[0]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn missing_adjclose_falls_back_to_close() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704171600],
            "indicators":{"quote":[{
                "open":[1.1],"high":[1.2],"low":[1.0],"close":[1.15],"volume":[0]
            }]}
        }],"error":null}}"#;

        let bars = parse(json).unwrap();
        assert_eq!(bars[0].adj_close, 1.15);
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{
            "code":"Not Found","description":"No data found, symbol may be delisted"
        }}}"#;

        let err = parse(json).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { symbol } if symbol == "GC=F"));
    }

    #[test]
    fn other_error_maps_to_format_changed() {
        let json = r#"{"chart":{"result":null,"error":{
            "code":"Bad Request","description":"Invalid input"
        }}}"#;

        let err = parse(json).unwrap_err();
        assert!(matches!(err, DataError::ResponseFormatChanged(_)));
    }

    #[test]
    fn no_timestamps_means_no_data() {
        let json = r#"{"chart":{"result":[{
            "indicators":{"quote":[{}]}
        }],"error":null}}"#;

        assert!(matches!(
            parse(json).unwrap_err(),
            DataError::SymbolNotFound { .. }
        ));
    }

    #[test]
    fn chart_url_covers_end_date() {
        let provider = YahooProvider::with_base_url("http://localhost/chart").unwrap();
        let url = provider.chart_url(
            "CL=F",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        assert!(url.starts_with("http://localhost/chart/CL=F?"));
        // 2024-01-01T00:00:00Z
        assert!(url.contains("period1=1704067200"));
        // 2024-02-01T00:00:00Z, exclusive upper bound
        assert!(url.contains("period2=1706745600"));
        assert!(url.contains("interval=1d"));
    }
}
