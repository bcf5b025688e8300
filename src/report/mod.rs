use crate::metering_p1::structs::{Telegram, Value};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ReportError {
    #[error("Telegram has no usable {0} field")]
    MissingField(&'static str),
    #[error("Unable to render telegram: {0}")]
    Render(String),
}

/// Graph definitions printed for `munin config`
pub const MUNIN_CONFIG: &str = "multigraph p1_kWh
graph_title Electricity usage
graph_vlabel Watt
graph_category P1
kWh.label Watt
kWh.type DERIVE

multigraph p1_dm3
graph_title gas usage
graph_vlabel dm3/h
graph_period hour
graph_category P1
dm3.label dm3/h
dm3.type DERIVE
";

fn quantity(telegram: &Telegram, name: &'static str) -> Result<f64, ReportError> {
    telegram.quantity(name).ok_or(ReportError::MissingField(name))
}

/// Counters munin derives into rates: energy in Ws (so the graph shows Watt) and gas in dm3
pub fn munin_values(telegram: &Telegram) -> Result<String, ReportError> {
    let kwh = quantity(telegram, "kWh")? + quantity(telegram, "kWh-low")?;
    let gas = match telegram.get("gas") {
        Some(Value::Reading(reading)) => reading.value,
        _ => return Err(ReportError::MissingField("gas")),
    };

    let ws = (kwh * 60.0 * 60.0 * 1000.0) as i64;
    let dm3 = (gas * 1000.0) as i64;

    Ok(format!("multigraph p1_kWh\nkWh.value {}\n\nmultigraph p1_dm3\ndm3.value {}\n", ws, dm3))
}

pub fn json(telegram: &Telegram) -> Result<String, ReportError> {
    serde_json::to_string_pretty(telegram).map_err(|e| ReportError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metering_p1::structs::{Reading, Timestamp};

    fn telegram() -> Telegram {
        let mut telegram = Telegram::default();
        telegram.fields.insert("kWh".to_string(), Value::Quantity(185.0));
        telegram.fields.insert("kWh-low".to_string(), Value::Quantity(84.0));
        telegram.fields.insert("gas".to_string(), Value::Reading(Reading {
            timestamp: Timestamp::new(2012, 5, 17, 2, 0),
            value: 124.5,
        }));
        telegram
    }

    #[test]
    fn test_munin_values() {
        let report = munin_values(&telegram()).unwrap();
        assert_eq!(report, "multigraph p1_kWh\nkWh.value 968400000\n\nmultigraph p1_dm3\ndm3.value 124500\n");
    }

    #[test]
    fn test_munin_missing_gas() {
        let mut telegram = telegram();
        telegram.fields.remove("gas");
        assert_eq!(munin_values(&telegram), Err(ReportError::MissingField("gas")));
    }

    #[test]
    fn test_json() {
        let rendered = json(&telegram()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["fields"]["kWh"], 185.0);
        assert_eq!(parsed["fields"]["gas"]["timestamp"]["year"], 2012);
    }
}
