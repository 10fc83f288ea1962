use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of property a transaction refers to. Serialized with the names the
/// transaction API uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyType {
    #[serde(rename = "아파트")]
    Apartment,
    #[serde(rename = "오피스텔")]
    Officetel,
    #[serde(rename = "연립다세대")]
    Rowhouse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 3] = [
        PropertyType::Apartment,
        PropertyType::Officetel,
        PropertyType::Rowhouse,
    ];

    /// Value sent as the `property_type` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "아파트",
            PropertyType::Officetel => "오피스텔",
            PropertyType::Rowhouse => "연립다세대",
        }
    }
}

impl std::str::FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apartment" | "아파트" => Ok(PropertyType::Apartment),
            "officetel" | "오피스텔" => Ok(PropertyType::Officetel),
            "rowhouse" | "연립다세대" => Ok(PropertyType::Rowhouse),
            other => Err(format!("unknown property type: {other}")),
        }
    }
}

/// A single real-estate transaction as returned by the list and detail endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: String,
    pub property_type: PropertyType,
    /// District (동) name.
    pub dong: String,
    pub apartment_name: String,
    /// Exclusive-use area in ㎡.
    pub exclusive_area: f64,
    pub deal_year: i32,
    pub deal_month: u32,
    pub deal_day: u32,
    /// Deal price in 만원.
    pub deal_amount: u64,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub build_year: Option<i32>,
    #[serde(default)]
    pub jibun: Option<String>,
    #[serde(default)]
    pub road_name: Option<String>,
    /// Server-formatted deal date (YYYY-MM-DD), when provided.
    #[serde(default)]
    pub deal_date: Option<String>,
    /// 용적률 (%).
    #[serde(default)]
    pub floor_area_ratio: Option<f64>,
    /// 건폐율 (%).
    #[serde(default)]
    pub building_coverage_ratio: Option<f64>,
    /// 대지지분 (㎡).
    #[serde(default)]
    pub land_share: Option<f64>,
    #[serde(default)]
    pub total_households: Option<u32>,
    #[serde(default)]
    pub total_parking: Option<u32>,
}

impl TransactionRecord {
    /// Calendar date of the deal. `None` when the year/month/day triple is not a real date.
    pub fn deal_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.deal_year, self.deal_month, self.deal_day)
    }

    /// Zero-padded `YYYY-MM` grouping key.
    pub fn month_key(&self) -> String {
        format!("{}-{:02}", self.deal_year, self.deal_month)
    }

    /// Records with a non-positive amount are excluded from price averages.
    pub fn is_validated(&self) -> bool {
        self.deal_amount > 0
    }

    pub fn has_building_info(&self) -> bool {
        let nonzero = |v: Option<f64>| v.is_some_and(|x| x != 0.0);
        nonzero(self.floor_area_ratio)
            || nonzero(self.building_coverage_ratio)
            || nonzero(self.land_share)
    }
}

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            total: 0,
        }
    }
}

impl Pagination {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }
}

/// Body of a paginated list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResponse<T> {
    #[serde(alias = "properties")]
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> ListResponse<T> {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}
