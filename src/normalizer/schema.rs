use crate::models::row::ColumnKind;

/// 字段表中的一项：嵌套路径 -> 扁平列名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub path: &'static [&'static str],
    pub kind: ColumnKind,
}

impl FieldSpec {
    const fn number(column: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            column,
            path,
            kind: ColumnKind::Number,
        }
    }

    const fn text(column: &'static str, path: &'static [&'static str]) -> Self {
        Self {
            column,
            path,
            kind: ColumnKind::Text,
        }
    }

    /// 叶子所在的分支路径
    pub fn branch(&self) -> &'static [&'static str] {
        &self.path[..self.path.len() - 1]
    }

    pub fn leaf(&self) -> &'static str {
        self.path[self.path.len() - 1]
    }
}

pub const DATE_COLUMN: &str = "date";
pub const FII_CUMULATIVE_NET: &str = "fii_cumulative_net";
pub const DII_CUMULATIVE_NET: &str = "dii_cumulative_net";

/// 累计列及其来源列
pub const CUMULATIVE_COLUMNS: [(&str, &str); 2] = [
    (FII_CUMULATIVE_NET, "fii_cash_net"),
    (DII_CUMULATIVE_NET, "dii_cash_net"),
];

/// 全部可达字段。表结构按此顺序排列列。
///
/// 路径使用文档中的驼峰写法，生产方的 snake_case / kebab-case 写法由
/// key 规范化匹配。
pub static FIELDS: &[FieldSpec] = &[
    // 指数
    FieldSpec::number("nifty", &["nifty"]),
    FieldSpec::number("nifty_change_percent", &["niftyChangePercent"]),
    FieldSpec::number("banknifty", &["bankNifty"]),
    FieldSpec::number("banknifty_change_percent", &["bankNiftyChangePercent"]),
    // 现货
    FieldSpec::number("fii_cash_buy", &["cash", "FII", "buy"]),
    FieldSpec::number("fii_cash_sell", &["cash", "FII", "sell"]),
    FieldSpec::number("fii_cash_net", &["cash", "FII", "buySellDifference"]),
    FieldSpec::text("fii_cash_action", &["cash", "FII", "netAction"]),
    FieldSpec::text("fii_cash_view", &["cash", "FII", "netView"]),
    FieldSpec::text("fii_cash_view_strength", &["cash", "FII", "netViewStrength"]),
    FieldSpec::number("dii_cash_buy", &["cash", "DII", "buy"]),
    FieldSpec::number("dii_cash_sell", &["cash", "DII", "sell"]),
    FieldSpec::number("dii_cash_net", &["cash", "DII", "buySellDifference"]),
    FieldSpec::text("dii_cash_action", &["cash", "DII", "netAction"]),
    FieldSpec::text("dii_cash_view", &["cash", "DII", "netView"]),
    FieldSpec::text("dii_cash_view_strength", &["cash", "DII", "netViewStrength"]),
    // 期货，按数量
    FieldSpec::number("fii_future_net_oi", &["future", "FII", "quantityWise", "netOi"]),
    FieldSpec::text("fii_future_action", &["future", "FII", "quantityWise", "netAction"]),
    FieldSpec::text("fii_future_view", &["future", "FII", "quantityWise", "netView"]),
    FieldSpec::text("fii_future_view_strength", &["future", "FII", "quantityWise", "netViewStrength"]),
    // 期货，按金额（没有 action / strength）
    FieldSpec::number("fii_future_net_oi_amt", &["future", "FII", "amountWise", "netOi"]),
    FieldSpec::text("fii_future_view_amt", &["future", "FII", "amountWise", "netView"]),
    FieldSpec::number("dii_future_net_oi", &["future", "DII", "quantityWise", "netOi"]),
    FieldSpec::text("dii_future_action", &["future", "DII", "quantityWise", "netAction"]),
    FieldSpec::text("dii_future_view", &["future", "DII", "quantityWise", "netView"]),
    FieldSpec::text("dii_future_view_strength", &["future", "DII", "quantityWise", "netViewStrength"]),
    FieldSpec::number("dii_future_net_oi_amt", &["future", "DII", "amountWise", "netOi"]),
    FieldSpec::text("dii_future_view_amt", &["future", "DII", "amountWise", "netView"]),
    // 期权
    FieldSpec::number("fii_option_overall_net_oi", &["option", "FII", "overallNetOi"]),
    FieldSpec::text("fii_option_action", &["option", "FII", "overallNetOiChangeAction"]),
    FieldSpec::text("fii_option_view", &["option", "FII", "overallNetOiChangeView"]),
    FieldSpec::text("fii_option_view_strength", &["option", "FII", "overallNetOiChangeViewStrength"]),
    FieldSpec::number("dii_option_overall_net_oi", &["option", "DII", "overallNetOi"]),
    FieldSpec::text("dii_option_action", &["option", "DII", "overallNetOiChangeAction"]),
    FieldSpec::text("dii_option_view", &["option", "DII", "overallNetOiChangeView"]),
    FieldSpec::text("dii_option_view_strength", &["option", "DII", "overallNetOiChangeViewStrength"]),
];

/// 按列名查找字段定义
pub fn field(column: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|spec| spec.column == column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn column_names_are_unique() {
        let names: HashSet<_> = FIELDS.iter().map(|spec| spec.column).collect();
        assert_eq!(names.len(), FIELDS.len());
    }

    #[test]
    fn column_names_follow_participant_segment_convention() {
        for spec in FIELDS.iter().filter(|spec| spec.path.len() > 1) {
            let participant = spec.path[1].to_ascii_lowercase();
            let prefix = format!("{}_{}_", participant, spec.path[0]);
            assert!(spec.column.starts_with(&prefix), "{}", spec.column);
        }
    }

    #[test]
    fn amount_wise_has_no_action_or_strength() {
        let amount_wise: Vec<_> = FIELDS
            .iter()
            .filter(|spec| spec.path.contains(&"amountWise"))
            .map(|spec| spec.leaf())
            .collect();
        assert_eq!(amount_wise, vec!["netOi", "netView", "netOi", "netView"]);
    }

    #[test]
    fn cumulative_sources_exist_in_catalogue() {
        for (_, source) in CUMULATIVE_COLUMNS {
            assert_eq!(field(source).map(|spec| spec.kind), Some(ColumnKind::Number));
        }
    }
}
