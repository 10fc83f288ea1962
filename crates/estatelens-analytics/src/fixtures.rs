use estatelens_models::{PropertyType, TransactionRecord};

pub fn record(year: i32, month: u32, day: u32, amount: u64) -> TransactionRecord {
    TransactionRecord {
        id: format!("{year}-{month}-{day}-{amount}"),
        property_type: PropertyType::Apartment,
        dong: "공덕동".to_string(),
        apartment_name: "공덕삼성래미안".to_string(),
        exclusive_area: 84.0,
        deal_year: year,
        deal_month: month,
        deal_day: day,
        deal_amount: amount,
        floor: None,
        build_year: None,
        jibun: None,
        road_name: None,
        deal_date: None,
        floor_area_ratio: None,
        building_coverage_ratio: None,
        land_share: None,
        total_households: None,
        total_parking: None,
    }
}
