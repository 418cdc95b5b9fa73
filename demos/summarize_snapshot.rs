//! 从内联 JSON 构建数据表并打印关键指标
//!
//! cargo run --example summarize_snapshot

use institutional_flows::analytics::correlation::correlation;
use institutional_flows::analytics::rolling::moving_average;
use institutional_flows::analytics::summary::{activity_summary, key_metrics};
use institutional_flows::{build_table, Snapshot};

const SNAPSHOT: &str = r#"{
  "asOfLabel": "Mar 2025",
  "availableMonths": ["Mar 2025"],
  "data": {
    "2025-03-03": {
      "nifty": 22119.3, "niftyChangePercent": -0.02,
      "cash": {"FII": {"buySellDifference": -4788.29, "netView": "BEARISH"},
               "DII": {"buySellDifference": 8790.8, "netView": "BULLISH"}}
    },
    "2025-03-04": {
      "nifty": 22082.65, "niftyChangePercent": -0.17,
      "cash": {"FII": {"buySellDifference": -3405.82, "netView": "BEARISH"},
               "DII": {"buySellDifference": 4851.43, "netView": "BULLISH"}}
    },
    "2025-03-05": {
      "nifty": 22337.3, "niftyChangePercent": 1.15,
      "cash": {"FII": {"buySellDifference": -2895.04, "netView": "BEARISH"},
               "DII": {"buySellDifference": 3370.0, "netView": "BULLISH"}}
    },
    "2025-03-06": {
      "nifty": 22544.7, "niftyChangePercent": 0.93,
      "cash": {"FII": {"buySellDifference": 1000.0, "netAction": "BUY", "netView": "BULLISH"},
               "DII": {"buySellDifference": -500.0, "netView": "BEARISH"}}
    },
    "2025-03-07": {
      "nifty": 22552.5, "niftyChangePercent": 0.03,
      "cash": {"FII": {"buySellDifference": -2035.1, "netAction": "SELL", "netView": "BEARISH"},
               "DII": {"buySellDifference": 2320.36, "netView": "BULLISH"}}
    }
  }
}"#;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let snapshot = Snapshot::from_json_str(SNAPSHOT)?;
    let table = build_table(&snapshot)?;
    let view = table.view();
    println!("{}: {} rows, {} columns", snapshot.as_of_label, table.len(), table.columns().len());

    let metrics = key_metrics(&view);
    if let Some(flow) = metrics.fii_cash_net {
        println!("FII cash net: {:.2} {}", flow.value, flow.trend.arrow());
    }
    if let Some(flow) = metrics.dii_cash_net {
        println!("DII cash net: {:.2} {}", flow.value, flow.trend.arrow());
    }

    for activity in activity_summary(&view) {
        println!(
            "{:<14} FII {} / {}  DII {} / {}",
            activity.segment, activity.fii_action, activity.fii_view, activity.dii_action, activity.dii_view
        );
    }

    if let Some(series) = moving_average(&view, "fii_cash_net", 3)?.value() {
        for (date, value) in series.iter() {
            match value {
                Some(v) => println!("{} MA3 {:.2}", date, v),
                None => println!("{} MA3 -", date),
            }
        }
    }

    match correlation(&view, "fii_cash_net", "nifty_change_percent")? {
        institutional_flows::Outcome::Value(c) => println!(
            "corr(fii_cash_net, nifty_change_percent) = {:.3} (p = {:.3}, n = {})",
            c.coefficient, c.p_value, c.observations
        ),
        other => println!("correlation unavailable: {:?}", other),
    }

    Ok(())
}
