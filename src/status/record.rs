// src/status/record.rs

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Column names, in order, for a status log line.
pub const STATUS_HEADER: [&str; 7] = [
    "Array_Task_ID",
    "Exit_Code",
    "Hostname",
    "T_Start",
    "T_End",
    "T_Elapsed",
    "Task",
];

/// Timestamp layout used for `T_Start` / `T_End`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one completed task, as written by the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub index: u64,
    pub exit_code: i32,
    pub hostname: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub elapsed_seconds: f64,
    pub command: String,
}

impl StatusRecord {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// The full line as appended to the log, trailing newline included.
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
            self.index,
            self.exit_code,
            self.hostname,
            self.start_time.format(TIME_FORMAT),
            self.end_time.format(TIME_FORMAT),
            self.elapsed_seconds,
            self.command,
        )
    }
}

/// A status line that does not have the seven-field layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseRecordError(pub String);

impl FromStr for StatusRecord {
    type Err = ParseRecordError;

    /// Parse one line. Anything after the sixth tab belongs to the command.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let fields: Vec<&str> = line.splitn(STATUS_HEADER.len(), '\t').collect();
        if fields.len() != STATUS_HEADER.len() {
            return Err(ParseRecordError(format!(
                "expected {} tab-separated fields, found {}",
                STATUS_HEADER.len(),
                fields.len()
            )));
        }

        let field_err = |name: &str, value: &str| {
            ParseRecordError(format!("invalid {name} '{value}'"))
        };

        let index = fields[0]
            .parse::<u64>()
            .map_err(|_| field_err("Array_Task_ID", fields[0]))?;
        let exit_code = fields[1]
            .parse::<i32>()
            .map_err(|_| field_err("Exit_Code", fields[1]))?;
        let start_time = NaiveDateTime::parse_from_str(fields[3], TIME_FORMAT)
            .map_err(|_| field_err("T_Start", fields[3]))?;
        let end_time = NaiveDateTime::parse_from_str(fields[4], TIME_FORMAT)
            .map_err(|_| field_err("T_End", fields[4]))?;
        let elapsed_seconds = fields[5]
            .parse::<f64>()
            .ok()
            .filter(|secs| *secs >= 0.0)
            .ok_or_else(|| field_err("T_Elapsed", fields[5]))?;

        Ok(StatusRecord {
            index,
            exit_code,
            hostname: fields[2].to_string(),
            start_time,
            end_time,
            elapsed_seconds,
            command: fields[6].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn line_layout_matches_header() {
        let rec = StatusRecord {
            index: 12,
            exit_code: 3,
            hostname: "c01n04".into(),
            start_time: at(8, 0, 1),
            end_time: at(8, 1, 2),
            elapsed_seconds: 61.004,
            command: "python fit.py --seed 12".into(),
        };
        assert_eq!(
            rec.to_line(),
            "12\t3\tc01n04\t2024-03-09 08:00:01\t2024-03-09 08:01:02\t61.00\tpython fit.py --seed 12\n"
        );
    }

    #[test]
    fn parse_reads_back_a_written_line() {
        let line = "4\t0\tnode7\t2024-03-09 08:00:01\t2024-03-09 08:00:03\t2.25\techo a b\n";
        let rec: StatusRecord = line.parse().unwrap();
        assert_eq!(rec.index, 4);
        assert!(rec.succeeded());
        assert_eq!(rec.hostname, "node7");
        assert_eq!(rec.elapsed_seconds, 2.25);
        assert_eq!(rec.command, "echo a b");
    }

    #[test]
    fn parse_rejects_truncated_lines() {
        assert!("4\t0\tnode7\t2024-03-09 08:00:01".parse::<StatusRecord>().is_err());
        assert!("x\t0\th\t2024-03-09 08:00:01\t2024-03-09 08:00:03\t1.00\tls"
            .parse::<StatusRecord>()
            .is_err());
        assert!("1\t0\th\t2024-03-09 08:00:01\t2024-03-09 08:00:03\t-1.00\tls"
            .parse::<StatusRecord>()
            .is_err());
    }

    #[test]
    fn parse_error_displays_its_reason() {
        let err = "4\t0\tnode7".parse::<StatusRecord>().unwrap_err();
        assert_eq!(err.to_string(), "expected 7 tab-separated fields, found 3");

        assert!(std::error::Error::source(&err).is_none());
    }
}
