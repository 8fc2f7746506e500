use once_cell::sync::Lazy;
use regex::Regex;

static PERIOD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:([HKM])(\d{1,2}))?$").expect("period regex should parse"));

/// Granularity below the year carried by a period code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPeriod {
    Year,
    Half(u8),
    Quarter(u8),
    Month(u8),
}

/// A parsed time-period code such as `2021`, `2021K4` or `2021M03`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub year: i32,
    pub sub: SubPeriod,
}

impl Period {
    /// Parse a period code; `None` for anything that is not `YYYY`, `YYYYHn`, `YYYYKn` or `YYYYMnn`.
    pub fn parse(code: &str) -> Option<Self> {
        let caps = PERIOD_RE.captures(code.trim())?;
        let year: i32 = caps[1].parse().ok()?;
        let sub = match (caps.get(2), caps.get(3)) {
            (None, _) => SubPeriod::Year,
            (Some(tag), Some(n)) => {
                let n: u8 = n.as_str().parse().ok()?;
                match tag.as_str() {
                    "H" if (1..=2).contains(&n) => SubPeriod::Half(n),
                    "K" if (1..=4).contains(&n) => SubPeriod::Quarter(n),
                    "M" if (1..=12).contains(&n) => SubPeriod::Month(n),
                    _ => return None,
                }
            }
            _ => return None,
        };
        Some(Self { year, sub })
    }
}

/// Which period codes survive into the year index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeriodFilter {
    /// Plain `YYYY` codes only.
    #[default]
    Annual,
    /// One quarter per year, e.g. `Quarter(4)` keeps `YYYYK4`.
    Quarter(u8),
    /// One month per year.
    Month(u8),
}

impl PeriodFilter {
    /// Year key for `code` if it passes the filter.
    pub fn year_of(&self, code: &str) -> Option<i32> {
        let period = Period::parse(code)?;
        let keep = match (self, period.sub) {
            (PeriodFilter::Annual, SubPeriod::Year) => true,
            (PeriodFilter::Quarter(q), SubPeriod::Quarter(p)) => *q == p,
            (PeriodFilter::Month(m), SubPeriod::Month(p)) => *m == p,
            _ => false,
        };
        keep.then_some(period.year)
    }
}
