//! Text and JSON output for a scored run.

use crate::models::{IngestSummary, Report, ZScoreResult};
use anyhow::Result;

/// The one-line result message.
pub fn generate_text_report(result: &ZScoreResult, precision: usize) -> String {
    format!(
        "Z-Score for latest month ({}): {}",
        result.latest_month,
        format_fixed(result.z_score, precision)
    )
}

/// Fixed-point formatting that rounds half away from zero on the shortest
/// decimal representation, so `0.125` at two places is `0.13`.
pub fn format_fixed(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{:.*}", precision, value);
    }

    // Display for f64 never uses exponent notation.
    let shortest = format!("{}", value.abs());
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend(frac_part.bytes().take(precision));
    digits.resize(int_part.len() + precision, b'0');

    if frac_part.as_bytes().get(precision).is_some_and(|&d| d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - precision;
    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&digits[..split]));
    if precision > 0 {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(&digits[split..]));
    }
    out
}

/// A longer breakdown printed under the result line with `--verbose`.
pub fn generate_details(report: &Report, precision: usize) -> String {
    let r = &report.result;
    let mut section = String::new();

    section.push_str(&format!("   Data directory: {}\n", report.data_dir));
    section.push_str(&format!(
        "   Current value: {}\n",
        format_fixed(r.current_value, precision)
    ));
    section.push_str(&format!(
        "   Historical mean: {} over {} months\n",
        format_fixed(r.historical_mean, precision),
        r.history_len
    ));
    section.push_str(&format!(
        "   Historical std dev (population): {}\n",
        format_fixed(r.historical_std_dev, precision)
    ));
    section.push_str(&generate_ingest_line(&report.ingest));

    section
}

fn generate_ingest_line(summary: &IngestSummary) -> String {
    let mut line = format!(
        "   Files: {} read, {} skipped | Rows: {} used",
        summary.files_processed, summary.files_skipped, summary.rows_accepted
    );
    if summary.censored > 0 {
        line.push_str(&format!(" ({} censored)", summary.censored));
    }
    if summary.rows_skipped > 0 || summary.value_errors > 0 {
        line.push_str(&format!(
            ", {} malformed, {} invalid values",
            summary.rows_skipped, summary.value_errors
        ));
    }
    line.push('\n');
    line
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MonthlyValues;
    use chrono::Utc;

    fn create_test_result() -> ZScoreResult {
        ZScoreResult {
            latest_month: "2023-04".to_string(),
            current_value: 100.0,
            historical_mean: 20.0,
            historical_std_dev: 8.164_965_809,
            history_len: 3,
            z_score: -9.797_958_971,
        }
    }

    fn create_test_report() -> Report {
        let mut monthly_values = MonthlyValues::new();
        monthly_values.accumulate("2023-01", 10.0);

        Report {
            generated_at: Utc::now(),
            data_dir: "/tmp/Data".to_string(),
            result: create_test_result(),
            ingest: IngestSummary {
                files_found: 3,
                files_processed: 2,
                files_skipped: 1,
                rows_accepted: 4,
                rows_skipped: 0,
                value_errors: 1,
                censored: 1,
            },
            monthly_values,
        }
    }

    #[test]
    fn test_generate_text_report() {
        let text = generate_text_report(&create_test_result(), 2);
        assert_eq!(text, "Z-Score for latest month (2023-04): -9.80");
    }

    #[test]
    fn test_text_report_precision() {
        let text = generate_text_report(&create_test_result(), 4);
        assert!(text.ends_with("-9.7980"));
    }

    #[test]
    fn test_text_report_rounds_ties_up() {
        let result = ZScoreResult {
            latest_month: "2023-03".to_string(),
            current_value: 7.0,
            historical_mean: 8.0,
            historical_std_dev: 8.0,
            history_len: 2,
            z_score: 0.125,
        };
        assert_eq!(
            generate_text_report(&result, 2),
            "Z-Score for latest month (2023-03): 0.13"
        );
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(0.125, 2), "0.13");
        assert_eq!(format_fixed(-0.125, 2), "-0.13");
        // Stored as 2.67499999..., shortest form is 2.675.
        assert_eq!(format_fixed(2.675, 2), "2.68");
        assert_eq!(format_fixed(-9.797_958_971, 2), "-9.80");
        assert_eq!(format_fixed(9.996, 2), "10.00");
        assert_eq!(format_fixed(99.5, 0), "100");
        assert_eq!(format_fixed(3.0, 2), "3.00");
        assert_eq!(format_fixed(0.001, 2), "0.00");
        assert_eq!(format_fixed(-0.001, 2), "-0.00");
        assert_eq!(format_fixed(1.23, 4), "1.2300");
    }

    #[test]
    fn test_generate_details() {
        let details = generate_details(&create_test_report(), 2);

        assert!(details.contains("/tmp/Data"));
        assert!(details.contains("Historical mean: 20.00 over 3 months"));
        assert!(details.contains("1 skipped"));
        assert!(details.contains("(1 censored)"));
        assert!(details.contains("1 invalid values"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();

        assert!(json.contains("\"latest_month\": \"2023-04\""));
        assert!(json.contains("\"z_score\""));
        assert!(json.contains("\"files_skipped\": 1"));
        assert!(json.contains("\"2023-01\""));
    }
}
