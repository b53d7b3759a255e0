//! Declarative rule tables for intent extraction.
//!
//! Kept as data rather than code so they are independently testable and
//! swappable without touching the extraction or scoring algorithms. Table
//! order is significant everywhere: extraction is first-match-wins.

use datamatch_core::types::{Domain, QueryType};
use regex::Regex;
use std::sync::OnceLock;

/// Ordered domain table. The first domain with any literal keyword hit in
/// the question is selected; no further domains are checked.
pub const DOMAIN_RULES: &[(Domain, &[&str])] = &[
    (
        Domain::Land,
        &["土地", "地块", "耕地", "用地", "土地利用", "地类", "面积", "DLTB", "DLBM"],
    ),
    (
        Domain::Finance,
        &["金融", "银行", "贷款", "投资", "理财", "股票", "基金"],
    ),
    (Domain::Population, &["人口", "户籍", "人员", "统计", "普查"]),
    (
        Domain::Economy,
        &["GDP", "经济", "收入", "产值", "财政", "税收"],
    ),
    (
        Domain::Environment,
        &["环境", "污染", "空气", "水质", "环保", "监测"],
    ),
    (
        Domain::Transport,
        &["交通", "道路", "车辆", "运输", "公路", "铁路"],
    ),
];

/// Ordered query-type table; the first category whose phrase set hits wins.
pub const QUERY_TYPE_RULES: &[(QueryType, &[&str])] = &[
    (
        QueryType::Statistics,
        &["统计", "多少", "总量", "总计", "汇总", "数量", "共有"],
    ),
    (
        QueryType::Comparison,
        &["比较", "对比", "相比", "差异", "差别"],
    ),
    (
        QueryType::Trend,
        &["趋势", "变化", "增长", "下降", "走势", "历年"],
    ),
    (
        QueryType::Distribution,
        &["分布", "构成", "组成", "结构"],
    ),
    (
        QueryType::Ranking,
        &["排名", "排行", "最多", "最少", "前十"],
    ),
    (
        QueryType::Proportion,
        &["占比", "比例", "比重", "百分比"],
    ),
];

/// Stopwords dropped from the question keyword pool.
pub const STOPWORDS: &[&str] = &[
    "是", "的", "了", "在", "有", "和", "与", "及", "或", "但", "而", "如何", "怎么", "什么",
    "哪个", "多少",
];

/// Administrative-unit suffix classes, most specific/compound first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    CityDistrict,
    Province,
    City,
    District,
    County,
    Town,
    Village,
    Zone,
}

/// Location patterns paired with their suffix class, in match order.
pub fn location_patterns() -> &'static [(LocationKind, Regex)] {
    static PATTERNS: OnceLock<Vec<(LocationKind, Regex)>> = OnceLock::new();
    // Unit names may not contain another unit suffix or a connective;
    // this is what keeps 南京市和玄武区 from matching as one compound.
    const NAME: &str = r"[一-龥--[省市县区镇乡村的和与及或]]";
    PATTERNS.get_or_init(|| {
        [
            (
                LocationKind::CityDistrict,
                format!("{NAME}{{1,6}}市{NAME}{{1,6}}区"),
            ),
            (LocationKind::Province, format!("{NAME}{{2,8}}(?:省|自治区)")),
            (LocationKind::City, format!("{NAME}{{1,8}}市")),
            (LocationKind::District, format!("{NAME}{{1,8}}区")),
            (LocationKind::County, format!("{NAME}{{1,8}}县")),
            (LocationKind::Town, format!("{NAME}{{1,8}}[镇乡]")),
            (LocationKind::Village, format!("{NAME}{{1,8}}村")),
            (
                LocationKind::Zone,
                format!("{NAME}{{1,8}}(?:地区|新区|开发区|园区)"),
            ),
        ]
        .into_iter()
        .map(|(kind, pattern)| {
            // Table patterns are fixed literals; a failure here is a
            // build-time defect, not a runtime condition.
            (kind, Regex::new(&pattern).expect("valid location pattern"))
        })
        .collect()
    })
}

/// Time-expression shapes, in match order. Every accepted shape normalizes
/// down to a single "<year>年" string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    ExplicitYear,
    BareYear,
    Relative,
    YearsAgoOrLater,
    Range,
    FiscalYear,
    HalfYear,
    Quarter,
}

pub fn time_patterns() -> &'static [(TimeKind, Regex)] {
    static PATTERNS: OnceLock<Vec<(TimeKind, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (TimeKind::ExplicitYear, r"(19\d{2}|20\d{2})年"),
            (TimeKind::BareYear, r"(19\d{2}|20\d{2})"),
            (TimeKind::Relative, r"今年|去年|前年"),
            (TimeKind::YearsAgoOrLater, r"(\d{1,2})年([前后])"),
            (
                TimeKind::Range,
                r"(19\d{2}|20\d{2})\s*[-~—至到]\s*(19\d{2}|20\d{2})",
            ),
            (TimeKind::FiscalYear, r"(19\d{2}|20\d{2})年度"),
            (TimeKind::HalfYear, r"(19\d{2}|20\d{2})年?[上下]半年"),
            (
                TimeKind::Quarter,
                r"(19\d{2}|20\d{2})年?第?[一二三四1-4]季度",
            ),
        ]
        .into_iter()
        .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid time pattern")))
        .collect()
    })
}

fn ideographic_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[一-鿿]+").expect("valid run pattern"))
}

/// Every maximal run of contiguous ideographic characters in `text`.
pub fn ideographic_runs(text: &str) -> Vec<String> {
    ideographic_run_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_table_order_puts_land_first() {
        assert_eq!(DOMAIN_RULES[0].0, Domain::Land);
        assert!(DOMAIN_RULES[0].1.contains(&"耕地"));
    }

    #[test]
    fn location_patterns_compile_and_order_compound_first() {
        let patterns = location_patterns();
        assert_eq!(patterns[0].0, LocationKind::CityDistrict);
        assert!(patterns[0].1.is_match("南京市玄武区"));
        assert!(!patterns[0].1.is_match("南京市和玄武区"));
        assert!(patterns[1].1.is_match("江西省"));
        assert!(patterns[1].1.is_match("内蒙古自治区"));
    }

    #[test]
    fn runs_split_on_non_ideographic_characters() {
        let runs = ideographic_runs("江西省2023年耕地面积");
        assert_eq!(runs, vec!["江西省", "年耕地面积"]);
    }
}
