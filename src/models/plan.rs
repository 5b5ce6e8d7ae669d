//! Plan model
//!
//! The normalized shape every upstream plan is converted into before it is
//! filtered, sorted, cached and returned.

use serde::{Deserialize, Serialize};

/// Where a plan's price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Gora,
}

/// A single bookable plan for one course on one play date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Site-wide unique id, e.g. `gora-130001-42`
    pub plan_id: String,
    pub plan_name: String,
    /// Total price including taxes, in yen
    pub price_total: u32,
    pub course_id: String,
    pub course_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_url: Option<String>,
    pub source: PriceSource,
    /// Play date, `YYYY-MM-DD`
    pub play_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_zone: Option<String>,
    /// Lunch included
    #[serde(default)]
    pub lunch: bool,
}

// == Sort Order ==
/// Ordering applied to search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Cheapest first
    #[default]
    Price,
    /// Most expensive first
    PriceDesc,
    /// Course name, then price
    Name,
}

impl SortOrder {
    /// Parses the query-string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "price" => Some(Self::Price),
            "price_desc" => Some(Self::PriceDesc),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::PriceDesc => "price_desc",
            Self::Name => "name",
        }
    }

    /// Sorts `plans` in place. Ties keep their upstream order.
    pub fn apply(&self, plans: &mut [Plan]) {
        match self {
            Self::Price => plans.sort_by_key(|p| p.price_total),
            Self::PriceDesc => plans.sort_by(|a, b| b.price_total.cmp(&a.price_total)),
            Self::Name => plans.sort_by(|a, b| {
                a.course_name
                    .cmp(&b.course_name)
                    .then(a.price_total.cmp(&b.price_total))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(id: &str, course: &str, price: u32) -> Plan {
        Plan {
            plan_id: id.to_string(),
            plan_name: format!("Plan {id}"),
            price_total: price,
            course_id: "1".to_string(),
            course_name: course.to_string(),
            prefecture: None,
            image_url: None,
            reserve_url: None,
            source: PriceSource::Gora,
            play_date: "2026-02-24".to_string(),
            start_time_zone: None,
            lunch: false,
        }
    }

    fn ids(plans: &[Plan]) -> Vec<&str> {
        plans.iter().map(|p| p.plan_id.as_str()).collect()
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("price"), Some(SortOrder::Price));
        assert_eq!(SortOrder::parse("price_desc"), Some(SortOrder::PriceDesc));
        assert_eq!(SortOrder::parse("name"), Some(SortOrder::Name));
        assert_eq!(SortOrder::parse("rating"), None);
        assert_eq!(SortOrder::default().as_str(), "price");
    }

    #[test]
    fn test_sort_by_price_is_stable() {
        let mut plans = vec![plan("a", "X", 9000), plan("b", "Y", 8000), plan("c", "Z", 9000)];
        SortOrder::Price.apply(&mut plans);
        assert_eq!(ids(&plans), ["b", "a", "c"]);
    }

    #[test]
    fn test_sort_by_price_desc() {
        let mut plans = vec![plan("a", "X", 7000), plan("b", "Y", 8000)];
        SortOrder::PriceDesc.apply(&mut plans);
        assert_eq!(ids(&plans), ["b", "a"]);
    }

    #[test]
    fn test_sort_by_name_then_price() {
        let mut plans = vec![plan("a", "Beta", 7000), plan("b", "Alpha", 9000), plan("c", "Alpha", 8000)];
        SortOrder::Name.apply(&mut plans);
        assert_eq!(ids(&plans), ["c", "b", "a"]);
    }

    #[test]
    fn test_plan_serializes_camel_case() {
        let json = serde_json::to_value(plan("gora-1-2", "Course", 12000)).unwrap();
        assert_eq!(json["planId"], "gora-1-2");
        assert_eq!(json["priceTotal"], 12000);
        assert_eq!(json["source"], "gora");
        assert!(json.get("reserveUrl").is_none());
    }
}
