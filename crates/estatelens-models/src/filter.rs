use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::PropertyType;

/// One discrete bucket offered for area or price filtering.
///
/// Two selections are the same bucket when their bounds match; the label is
/// presentation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeSelection {
    pub min: f64,
    pub max: f64,
    pub label: String,
}

impl RangeSelection {
    pub fn new(min: f64, max: f64, label: impl Into<String>) -> Self {
        Self {
            min,
            max,
            label: label.into(),
        }
    }

    fn bounds_cmp(&self, other: &Self) -> Ordering {
        self.min
            .total_cmp(&other.min)
            .then_with(|| self.max.total_cmp(&other.max))
    }
}

impl PartialEq for RangeSelection {
    fn eq(&self, other: &Self) -> bool {
        self.bounds_cmp(other) == Ordering::Equal
    }
}

/// Area buckets (㎡) offered by the filter sidebar.
pub fn area_presets() -> Vec<RangeSelection> {
    vec![
        RangeSelection::new(0.0, 33.0, "10평 이하"),
        RangeSelection::new(33.0, 66.0, "10-20평"),
        RangeSelection::new(66.0, 99.0, "20-30평"),
        RangeSelection::new(99.0, 132.0, "30-40평"),
        RangeSelection::new(132.0, 999.0, "40평 이상"),
    ]
}

/// Price buckets (만원) offered by the filter sidebar.
pub fn price_presets() -> Vec<RangeSelection> {
    vec![
        RangeSelection::new(0.0, 50_000.0, "5억 이하"),
        RangeSelection::new(50_000.0, 100_000.0, "5-10억"),
        RangeSelection::new(100_000.0, 150_000.0, "10-15억"),
        RangeSelection::new(150_000.0, 999_999.0, "15억 이상"),
    ]
}

/// How many months of transactions a query covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum MonthsWindow {
    Three,
    Six,
    #[default]
    Twelve,
    TwentyFour,
}

impl MonthsWindow {
    pub const ALL: [MonthsWindow; 4] = [
        MonthsWindow::Three,
        MonthsWindow::Six,
        MonthsWindow::Twelve,
        MonthsWindow::TwentyFour,
    ];

    pub fn months(&self) -> u32 {
        match self {
            MonthsWindow::Three => 3,
            MonthsWindow::Six => 6,
            MonthsWindow::Twelve => 12,
            MonthsWindow::TwentyFour => 24,
        }
    }
}

impl TryFrom<u32> for MonthsWindow {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        MonthsWindow::ALL
            .into_iter()
            .find(|w| w.months() == value)
            .ok_or_else(|| format!("unsupported months window: {value} (expected 3, 6, 12 or 24)"))
    }
}

impl From<MonthsWindow> for u32 {
    fn from(window: MonthsWindow) -> Self {
        window.months()
    }
}

/// A complete set of filter choices.
///
/// Range selections are kept sorted by bounds so that equality does not depend
/// on the order in which buckets were toggled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(from = "RawFilterState")]
pub struct FilterState {
    property_type: Option<PropertyType>,
    selected_area_ranges: Vec<RangeSelection>,
    selected_price_ranges: Vec<RangeSelection>,
    selected_dongs: BTreeSet<String>,
    months_window: MonthsWindow,
}

impl FilterState {
    pub fn property_type(&self) -> Option<PropertyType> {
        self.property_type
    }

    pub fn selected_area_ranges(&self) -> &[RangeSelection] {
        &self.selected_area_ranges
    }

    pub fn selected_price_ranges(&self) -> &[RangeSelection] {
        &self.selected_price_ranges
    }

    pub fn selected_dongs(&self) -> &BTreeSet<String> {
        &self.selected_dongs
    }

    pub fn months_window(&self) -> MonthsWindow {
        self.months_window
    }

    pub fn set_property_type(&mut self, property_type: Option<PropertyType>) {
        self.property_type = property_type;
    }

    pub fn set_months_window(&mut self, window: MonthsWindow) {
        self.months_window = window;
    }

    pub fn toggle_area_range(&mut self, range: RangeSelection) {
        toggle_range(&mut self.selected_area_ranges, range);
    }

    pub fn toggle_price_range(&mut self, range: RangeSelection) {
        toggle_range(&mut self.selected_price_ranges, range);
    }

    pub fn toggle_dong(&mut self, dong: &str) {
        if !self.selected_dongs.remove(dong) {
            self.selected_dongs.insert(dong.to_string());
        }
    }

    /// Build the request query for this filter.
    ///
    /// Multiple selections in one dimension merge into a single envelope
    /// spanning all of them, gaps included.
    pub fn compose(&self, page: u32, page_size: u32) -> ComposedQuery {
        let (min_area, max_area) = envelope(&self.selected_area_ranges);
        let (min_price, max_price) = envelope(&self.selected_price_ranges);
        ComposedQuery {
            property_type: self.property_type,
            min_area,
            max_area,
            min_price,
            max_price,
            dongs: self.selected_dongs.iter().cloned().collect(),
            months: self.months_window.months(),
            page,
            page_size,
        }
    }
}

/// Wire shape of [`FilterState`]; ranges may arrive unsorted or repeated.
#[derive(Deserialize)]
struct RawFilterState {
    #[serde(default)]
    property_type: Option<PropertyType>,
    #[serde(default)]
    selected_area_ranges: Vec<RangeSelection>,
    #[serde(default)]
    selected_price_ranges: Vec<RangeSelection>,
    #[serde(default)]
    selected_dongs: BTreeSet<String>,
    #[serde(default)]
    months_window: MonthsWindow,
}

impl From<RawFilterState> for FilterState {
    fn from(raw: RawFilterState) -> Self {
        Self {
            property_type: raw.property_type,
            selected_area_ranges: normalize_ranges(raw.selected_area_ranges),
            selected_price_ranges: normalize_ranges(raw.selected_price_ranges),
            selected_dongs: raw.selected_dongs,
            months_window: raw.months_window,
        }
    }
}

fn normalize_ranges(mut ranges: Vec<RangeSelection>) -> Vec<RangeSelection> {
    ranges.sort_by(|a, b| a.bounds_cmp(b));
    ranges.dedup_by(|a, b| a == b);
    ranges
}

fn toggle_range(selected: &mut Vec<RangeSelection>, range: RangeSelection) {
    match selected.binary_search_by(|probe| probe.bounds_cmp(&range)) {
        Ok(pos) => {
            selected.remove(pos);
        }
        Err(pos) => selected.insert(pos, range),
    }
}

fn envelope(selected: &[RangeSelection]) -> (Option<f64>, Option<f64>) {
    if selected.is_empty() {
        return (None, None);
    }
    let min = selected.iter().map(|r| r.min).fold(f64::INFINITY, f64::min);
    let max = selected
        .iter()
        .map(|r| r.max)
        .fold(f64::NEG_INFINITY, f64::max);
    (Some(min), Some(max))
}

/// Query derived from a [`FilterState`]; what a data source turns into request parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComposedQuery {
    pub property_type: Option<PropertyType>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub dongs: Vec<String>,
    pub months: u32,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

impl ComposedQuery {
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Query-string pairs in wire names. Absent bounds and an empty dong list are omitted.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(property_type) = self.property_type {
            params.push(("property_type".to_string(), property_type.as_param().to_string()));
        }
        let bounds = [
            ("min_area", self.min_area),
            ("max_area", self.max_area),
            ("min_price", self.min_price),
            ("max_price", self.max_price),
        ];
        for (name, value) in bounds {
            if let Some(v) = value {
                params.push((name.to_string(), v.to_string()));
            }
        }
        if !self.dongs.is_empty() {
            params.push(("dongs".to_string(), self.dongs.join(",")));
        }
        params.push(("months".to_string(), self.months.to_string()));
        params.push(("page".to_string(), self.page.to_string()));
        params.push(("page_size".to_string(), self.page_size.to_string()));
        params
    }
}
