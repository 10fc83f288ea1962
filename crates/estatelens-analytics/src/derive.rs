//! Pure numeric derivations and display rules used by the presentation layer.
//!
//! Prices are in 만원 (10,000 KRW); 10,000 만원 make one 억. Areas are in ㎡
//! and converted to 평 at 3.3㎡ per 평.

/// ㎡ per 평.
pub const SQM_PER_PYEONG: f64 = 3.3;

/// 만원 per 억.
pub const MAN_PER_EOK: u64 = 10_000;

/// Assumed walking speed in metres per minute.
pub const WALK_METRES_PER_MINUTE: f64 = 80.0;

/// An amount split into 억 and 만원 parts. Both parts absent means zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyParts {
    pub eok: Option<u64>,
    pub man: Option<u64>,
}

impl CurrencyParts {
    pub fn is_zero(&self) -> bool {
        self.eok.is_none() && self.man.is_none()
    }
}

pub fn split_currency(amount: u64) -> CurrencyParts {
    if amount == 0 {
        return CurrencyParts {
            eok: None,
            man: None,
        };
    }
    if amount < MAN_PER_EOK {
        return CurrencyParts {
            eok: None,
            man: Some(amount),
        };
    }
    let remainder = amount % MAN_PER_EOK;
    CurrencyParts {
        eok: Some(amount / MAN_PER_EOK),
        man: (remainder != 0).then_some(remainder),
    }
}

/// `0만원`, `9,999만원`, `3억원`, `1억 2,345만원`.
pub fn format_price(amount: u64) -> String {
    let parts = split_currency(amount);
    match (parts.eok, parts.man) {
        (None, None) => "0만원".to_string(),
        (None, Some(man)) => format!("{}만원", group_thousands(man)),
        (Some(eok), None) => format!("{eok}억원"),
        (Some(eok), Some(man)) => format!("{eok}억 {}만원", group_thousands(man)),
    }
}

/// Price per 평: `price / (area / 3.3)`. Zero when either input is zero or not finite.
pub fn price_per_pyeong(price: f64, area: f64) -> f64 {
    if price == 0.0 || area == 0.0 || !price.is_finite() || !area.is_finite() {
        return 0.0;
    }
    price / (area / SQM_PER_PYEONG)
}

pub fn format_price_per_pyeong(price: f64, area: f64) -> String {
    let per_pyeong = price_per_pyeong(price, area).round();
    format!("{}만원/평", group_thousands(per_pyeong.max(0.0) as u64))
}

pub fn to_pyeong(area: f64) -> f64 {
    area / SQM_PER_PYEONG
}

/// `84.9㎡ (25.7평)`.
pub fn format_area(area: f64) -> String {
    if area == 0.0 || !area.is_finite() {
        return "0㎡".to_string();
    }
    format!("{area:.1}㎡ ({:.1}평)", to_pyeong(area))
}

/// Minutes on foot for a distance in metres, rounded up.
pub fn walk_minutes(distance: f64) -> u32 {
    if distance <= 0.0 || !distance.is_finite() {
        return 0;
    }
    (distance / WALK_METRES_PER_MINUTE).ceil() as u32
}

pub fn format_walk_time(distance: f64) -> String {
    match walk_minutes(distance) {
        0 => "0분".to_string(),
        minutes => format!("도보 {minutes}분"),
    }
}

/// `850m` below a kilometre, `1.2km` from there on.
pub fn format_distance(distance: f64) -> String {
    if distance <= 0.0 || !distance.is_finite() {
        return "0m".to_string();
    }
    if distance >= 1000.0 {
        return format!("{:.1}km", distance / 1000.0);
    }
    format!("{}m", distance.round() as u64)
}

/// Location grade from a 0–100 score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LocationGrade {
    S,
    A,
    B,
    C,
    D,
}

impl LocationGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            LocationGrade::S
        } else if score >= 80.0 {
            LocationGrade::A
        } else if score >= 70.0 {
            LocationGrade::B
        } else if score >= 60.0 {
            LocationGrade::C
        } else {
            LocationGrade::D
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LocationGrade::S => "S급",
            LocationGrade::A => "A급",
            LocationGrade::B => "B급",
            LocationGrade::C => "C급",
            LocationGrade::D => "D급",
        }
    }
}

/// How a change rate should be toned when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTone {
    Rise,
    Fall,
    Flat,
}

pub fn change_tone(rate: Option<f64>) -> ChangeTone {
    match rate {
        Some(r) if r > 0.0 => ChangeTone::Rise,
        Some(r) if r < 0.0 => ChangeTone::Fall,
        _ => ChangeTone::Flat,
    }
}

/// `+1.23%`, `-0.50%`, `0.00%`; `-` when unknown.
pub fn format_change_rate(rate: Option<f64>) -> String {
    match rate {
        None => "-".to_string(),
        Some(r) if r > 0.0 => format!("+{r:.2}%"),
        Some(r) => format!("{r:.2}%"),
    }
}

/// `YYYY-MM-DD`; `-` when any part is zero.
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    if year == 0 || month == 0 || day == 0 {
        return "-".to_string();
    }
    format!("{year}-{month:02}-{day:02}")
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_split() {
        assert_eq!(
            split_currency(12_345),
            CurrencyParts {
                eok: Some(1),
                man: Some(2_345)
            }
        );
        assert_eq!(
            split_currency(9_999),
            CurrencyParts {
                eok: None,
                man: Some(9_999)
            }
        );
        assert_eq!(
            split_currency(30_000),
            CurrencyParts {
                eok: Some(3),
                man: None
            }
        );
        assert!(split_currency(0).is_zero());
    }

    #[test]
    fn price_rendering() {
        assert_eq!(format_price(0), "0만원");
        assert_eq!(format_price(9_999), "9,999만원");
        assert_eq!(format_price(12_345), "1억 2,345만원");
        assert_eq!(format_price(150_000), "15억원");
        assert_eq!(format_price(10_500), "1억 500만원");
    }

    #[test]
    fn per_pyeong_guards_zero_inputs() {
        assert_eq!(price_per_pyeong(0.0, 84.0), 0.0);
        assert_eq!(price_per_pyeong(100_000.0, 0.0), 0.0);
        assert_eq!(format_price_per_pyeong(0.0, 0.0), "0만원/평");

        let per = price_per_pyeong(100_000.0, 33.0);
        assert!((per - 10_000.0).abs() < 1e-9);
        assert_eq!(format_price_per_pyeong(100_000.0, 33.0), "10,000만원/평");
    }

    #[test]
    fn walking_time_rounds_up() {
        assert_eq!(walk_minutes(0.0), 0);
        assert_eq!(walk_minutes(80.0), 1);
        assert_eq!(walk_minutes(81.0), 2);
        assert_eq!(walk_minutes(400.0), 5);
        assert_eq!(format_walk_time(0.0), "0분");
        assert_eq!(format_walk_time(500.0), "도보 7분");
    }

    #[test]
    fn grade_breakpoints_are_inclusive() {
        assert_eq!(LocationGrade::from_score(90.0), LocationGrade::S);
        assert_eq!(LocationGrade::from_score(89.9), LocationGrade::A);
        assert_eq!(LocationGrade::from_score(80.0), LocationGrade::A);
        assert_eq!(LocationGrade::from_score(70.0), LocationGrade::B);
        assert_eq!(LocationGrade::from_score(60.0), LocationGrade::C);
        assert_eq!(LocationGrade::from_score(59.9), LocationGrade::D);
        assert_eq!(LocationGrade::from_score(0.0).label(), "D급");
    }

    #[test]
    fn change_rate_rendering() {
        assert_eq!(format_change_rate(None), "-");
        assert_eq!(format_change_rate(Some(1.234)), "+1.23%");
        assert_eq!(format_change_rate(Some(-0.5)), "-0.50%");
        assert_eq!(format_change_rate(Some(0.0)), "0.00%");
        assert_eq!(change_tone(Some(3.0)), ChangeTone::Rise);
        assert_eq!(change_tone(Some(-3.0)), ChangeTone::Fall);
        assert_eq!(change_tone(None), ChangeTone::Flat);
    }

    #[test]
    fn area_and_distance_rendering() {
        assert_eq!(format_area(0.0), "0㎡");
        assert_eq!(format_area(33.0), "33.0㎡ (10.0평)");
        assert_eq!(format_distance(0.0), "0m");
        assert_eq!(format_distance(349.6), "350m");
        assert_eq!(format_distance(1240.0), "1.2km");
    }

    #[test]
    fn date_rendering() {
        assert_eq!(format_date(2024, 3, 5), "2024-03-05");
        assert_eq!(format_date(2024, 0, 5), "-");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
