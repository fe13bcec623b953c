//! Parsers for emission statistics, transition probabilities and transition
//! statistics tables.
//!
//! Layouts (comma separated):
//! - emission stats: header, then
//!   `name, scaleDiffMean, scaleDiffStd, distanceMean, distanceStd, angleMean, angleStd, sampleCount`
//! - transition probabilities: no header, 11 rows × 11 values, row = from
//!   generation, column = to generation
//! - transition stats: header, then
//!   `fromName, toName, scaleDiffMean, scaleDiffStd, angleMean, angleStd, sampleCount`

use super::tabular::{parse_number, Row, TabularReader};
use super::{ParseOutcome, ParseStatus, Truncation};
use crate::error::{LabelError, Result};
use crate::model::{EmissionStats, EmissionTable, TransitionStats, TransitionTable};
use crate::types::{ChestType, GENERATION_COUNT};
use log::{info, warn};
use std::fs;
use std::path::Path;

/// Transition stats rows need strictly more samples than this to be used.
pub const MIN_TRANSITION_SAMPLES: f64 = 10.0;

fn resolve_generation(name: &str) -> Option<ChestType> {
    ChestType::from_name(name).filter(|t| t.is_generation())
}

fn unknown(line: usize, name: &str) -> ParseStatus {
    ParseStatus::Truncated(Truncation::UnknownType {
        line,
        name: name.to_string(),
    })
}

fn malformed(line: usize, message: String) -> ParseStatus {
    ParseStatus::Truncated(Truncation::Malformed { line, message })
}

fn gap(line: usize) -> ParseStatus {
    malformed(line, "blank line before end of data".to_string())
}

pub fn parse_emission_stats(text: &str) -> ParseOutcome<EmissionTable> {
    let mut reader = TabularReader::new(text, true);
    let mut table = EmissionTable::new();
    let mut rows = 0;
    let status = loop {
        let (line, fields) = match reader.next_row() {
            Row::EndOfData => break ParseStatus::Complete,
            Row::Gap { line } => break gap(line),
            Row::Record { line, fields } => (line, fields),
        };
        let name = fields.first().copied().unwrap_or_default();
        let Some(label) = resolve_generation(name) else {
            break unknown(line, name);
        };
        let parsed = (|| -> std::result::Result<EmissionStats, String> {
            Ok(EmissionStats {
                scale_mean: parse_number(fields.get(1), "scaleDiffMean")?,
                scale_std: parse_number(fields.get(2), "scaleDiffStd")?,
                distance_mean: parse_number(fields.get(3), "distanceMean")?,
                distance_std: parse_number(fields.get(4), "distanceStd")?,
                angle_mean: parse_number(fields.get(5), "angleMean")?,
                angle_std: parse_number(fields.get(6), "angleStd")?,
                sample_count: parse_number(fields.get(7), "sampleCount")?,
            })
        })();
        match parsed {
            Ok(stats) => {
                table.set(label, stats);
                rows += 1;
            }
            Err(message) => break malformed(line, message),
        }
    };
    ParseOutcome {
        value: table,
        status,
        rows,
        skipped: 0,
    }
}

pub fn parse_transition_probabilities(text: &str) -> ParseOutcome<TransitionTable> {
    let mut reader = TabularReader::new(text, false);
    let mut table = TransitionTable::new();
    let mut rows = 0;
    let mut status = ParseStatus::Complete;
    for from_g in 0..GENERATION_COUNT {
        let (line, fields) = match reader.next_row() {
            Row::EndOfData => {
                status = ParseStatus::Truncated(Truncation::MissingRows {
                    expected: GENERATION_COUNT,
                    found: rows,
                });
                break;
            }
            Row::Gap { line } => {
                status = gap(line);
                break;
            }
            Row::Record { line, fields } => (line, fields),
        };
        let values: std::result::Result<Vec<f64>, String> = (0..GENERATION_COUNT)
            .map(|to_g| parse_number(fields.get(to_g), &format!("to generation {to_g}")))
            .collect();
        let values = match values {
            Ok(values) => values,
            Err(message) => {
                status = malformed(line, message);
                break;
            }
        };
        let Some(from) = ChestType::generation(from_g) else {
            break;
        };
        for (to_g, p) in values.into_iter().enumerate() {
            if let Some(to) = ChestType::generation(to_g) {
                table.set_probability(from, to, p);
            }
        }
        rows += 1;
    }
    ParseOutcome {
        value: table,
        status,
        rows,
        skipped: 0,
    }
}

pub fn parse_transition_stats(text: &str) -> ParseOutcome<TransitionTable> {
    let mut reader = TabularReader::new(text, true);
    let mut table = TransitionTable::new();
    let mut rows = 0;
    let mut skipped = 0;
    let status = loop {
        let (line, fields) = match reader.next_row() {
            Row::EndOfData => break ParseStatus::Complete,
            Row::Gap { line } => break gap(line),
            Row::Record { line, fields } => (line, fields),
        };
        let from_name = fields.first().copied().unwrap_or_default();
        let Some(from) = resolve_generation(from_name) else {
            break unknown(line, from_name);
        };
        let to_name = fields.get(1).copied().unwrap_or_default();
        let Some(to) = resolve_generation(to_name) else {
            break unknown(line, to_name);
        };
        let parsed = (|| -> std::result::Result<(TransitionStats, f64), String> {
            let scale_std = parse_number(fields.get(3), "scaleDiffStd")?;
            let angle_std = parse_number(fields.get(5), "angleStd")?;
            let stats = TransitionStats {
                scale_diff_mean: parse_number(fields.get(2), "scaleDiffMean")?,
                scale_diff_variance: scale_std * scale_std,
                angle_mean: parse_number(fields.get(4), "angleMean")?,
                angle_variance: angle_std * angle_std,
            };
            Ok((stats, parse_number(fields.get(6), "sampleCount")?))
        })();
        match parsed {
            Ok((stats, samples)) if samples > MIN_TRANSITION_SAMPLES => {
                table.set_stats(from, to, stats);
                rows += 1;
            }
            Ok(_) => skipped += 1,
            Err(message) => break malformed(line, message),
        }
    };
    ParseOutcome {
        value: table,
        status,
        rows,
        skipped,
    }
}

fn read_table(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| LabelError::io(path, e))
}

fn log_outcome<T>(kind: &str, path: &Path, outcome: &ParseOutcome<T>) {
    match &outcome.status {
        ParseStatus::Complete => info!(
            "{} {}: {} rows ({} skipped)",
            kind,
            path.display(),
            outcome.rows,
            outcome.skipped
        ),
        ParseStatus::Truncated(reason) => warn!(
            "{} {}: stopped after {} rows: {:?}",
            kind,
            path.display(),
            outcome.rows,
            reason
        ),
    }
}

pub fn load_emission_stats(path: &Path) -> Result<ParseOutcome<EmissionTable>> {
    let outcome = parse_emission_stats(&read_table(path)?);
    log_outcome("emission stats", path, &outcome);
    Ok(outcome)
}

pub fn load_transition_probabilities(path: &Path) -> Result<ParseOutcome<TransitionTable>> {
    let outcome = parse_transition_probabilities(&read_table(path)?);
    log_outcome("transition probabilities", path, &outcome);
    Ok(outcome)
}

pub fn load_transition_stats(path: &Path) -> Result<ParseOutcome<TransitionTable>> {
    let outcome = parse_transition_stats(&read_table(path)?);
    log_outcome("transition stats", path, &outcome);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMISSION_HEADER: &str =
        "name,scaleDiffMean,scaleDiffStd,distanceMean,distanceStd,angleMean,angleStd,sampleCount\n";

    fn gen(g: usize) -> ChestType {
        ChestType::generation(g).unwrap()
    }

    fn emission_row(name: &str) -> String {
        format!("{name},0.1,0.4,1.0,1.5,5.0,12.0,200\n")
    }

    #[test]
    fn emission_rows_populate_table() {
        let mut text = EMISSION_HEADER.to_string();
        for g in 0..5 {
            text.push_str(&emission_row(&format!("AIRWAYGENERATION{g}")));
        }
        let outcome = parse_emission_stats(&text);
        assert!(outcome.status.is_complete());
        assert_eq!(outcome.rows, 5);
        assert_eq!(outcome.value.len(), 5);
        let stats = outcome.value.get(gen(4)).unwrap();
        assert_eq!(stats.angle_std, 12.0);
        assert_eq!(stats.sample_count, 200.0);
    }

    #[test]
    fn bad_fourth_emission_row_keeps_first_three() {
        let mut text = EMISSION_HEADER.to_string();
        for g in 0..3 {
            text.push_str(&emission_row(&format!("AIRWAYGENERATION{g}")));
        }
        text.push_str(&emission_row("NOTATYPE"));
        text.push_str(&emission_row("AIRWAYGENERATION5"));
        let outcome = parse_emission_stats(&text);
        assert_eq!(outcome.value.len(), 3);
        assert!(outcome.value.get(gen(5)).is_none());
        assert_eq!(
            outcome.status,
            ParseStatus::Truncated(Truncation::UnknownType {
                line: 5,
                name: "NOTATYPE".to_string()
            })
        );
    }

    #[test]
    fn malformed_emission_value_stops_parsing() {
        let text = format!(
            "{EMISSION_HEADER}{}AIRWAYGENERATION1,0.1,x,1,1,1,1,1\n{}",
            emission_row("AIRWAYGENERATION0"),
            emission_row("AIRWAYGENERATION2")
        );
        let outcome = parse_emission_stats(&text);
        assert_eq!(outcome.value.len(), 1);
        assert!(matches!(
            outcome.status,
            ParseStatus::Truncated(Truncation::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn blank_line_between_emission_rows_is_reported() {
        let text = format!(
            "{EMISSION_HEADER}{}{}\n{}",
            emission_row("AIRWAYGENERATION0"),
            emission_row("AIRWAYGENERATION1"),
            emission_row("AIRWAYGENERATION2")
        );
        let outcome = parse_emission_stats(&text);
        assert_eq!(outcome.value.len(), 2);
        assert_eq!(outcome.rows, 2);
        assert!(outcome.value.get(gen(2)).is_none());
        assert!(
            matches!(
                outcome.status,
                ParseStatus::Truncated(Truncation::Malformed { line: 4, .. })
            ),
            "{:?}",
            outcome.status
        );
    }

    #[test]
    fn trailing_blank_lines_keep_emission_complete() {
        let text = format!("{EMISSION_HEADER}{}\n\n", emission_row("AIRWAYGENERATION0"));
        let outcome = parse_emission_stats(&text);
        assert!(outcome.status.is_complete());
        assert_eq!(outcome.rows, 1);
    }

    fn probability_grid() -> (String, Vec<Vec<f64>>) {
        let mut values = Vec::new();
        let mut text = String::new();
        for f in 0..GENERATION_COUNT {
            let row: Vec<f64> = (0..GENERATION_COUNT)
                .map(|t| match t as isize - f as isize {
                    0 => 0.6,
                    1 => 0.4,
                    _ => 0.0,
                })
                .collect();
            // the last generation has nowhere deeper to go
            let row = if f == GENERATION_COUNT - 1 {
                let mut r = vec![0.0; GENERATION_COUNT];
                r[f] = 1.0;
                r
            } else {
                row
            };
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            text.push_str(&line.join(","));
            text.push('\n');
            values.push(row);
        }
        (text, values)
    }

    #[test]
    fn transition_grid_is_reproduced_exactly() {
        let (text, values) = probability_grid();
        let outcome = parse_transition_probabilities(&text);
        assert!(outcome.status.is_complete());
        assert_eq!(outcome.rows, GENERATION_COUNT);
        for (f, row) in values.iter().enumerate() {
            for (t, &p) in row.iter().enumerate() {
                assert_eq!(outcome.value.probability(gen(f), gen(t)), Some(p));
            }
        }
    }

    #[test]
    fn short_transition_grid_is_truncated() {
        let (text, _) = probability_grid();
        let partial: String = text.lines().take(4).map(|l| format!("{l}\n")).collect();
        let outcome = parse_transition_probabilities(&partial);
        assert_eq!(outcome.rows, 4);
        assert_eq!(
            outcome.status,
            ParseStatus::Truncated(Truncation::MissingRows {
                expected: GENERATION_COUNT,
                found: 4
            })
        );
        assert!(outcome.value.probability(gen(3), gen(4)).is_some());
        assert!(outcome.value.probability(gen(4), gen(4)).is_none());
    }

    #[test]
    fn transition_stats_skip_low_support_rows() {
        let text = "from,to,scaleDiffMean,scaleDiffStd,angleMean,angleStd,sampleCount\n\
                    AIRWAYGENERATION0,AIRWAYGENERATION1,-1.5,0.5,25,10,40\n\
                    AIRWAYGENERATION1,AIRWAYGENERATION2,-1.0,0.4,30,12,10\n\
                    AIRWAYGENERATION1,AIRWAYGENERATION1,0.0,0.2,5,4,11\n";
        let outcome = parse_transition_stats(text);
        assert!(outcome.status.is_complete());
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.skipped, 1);
        let stats = outcome.value.stats(gen(0), gen(1)).unwrap();
        assert!((stats.scale_diff_variance - 0.25).abs() < 1e-12);
        assert!((stats.angle_variance - 100.0).abs() < 1e-12);
        assert!(outcome.value.stats(gen(1), gen(2)).is_none());
    }

    #[test]
    fn transition_stats_stop_at_unknown_name() {
        let text = "from,to,a,b,c,d,n\n\
                    AIRWAYGENERATION0,AIRWAYGENERATION1,-1.5,0.5,25,10,40\n\
                    AIRWAYGENERATION1,UNDEFINEDTYPE,-1.0,0.4,30,12,50\n\
                    AIRWAYGENERATION2,AIRWAYGENERATION3,-1.0,0.4,30,12,50\n";
        let outcome = parse_transition_stats(text);
        assert_eq!(outcome.rows, 1);
        assert!(matches!(
            outcome.status,
            ParseStatus::Truncated(Truncation::UnknownType { line: 3, .. })
        ));
        assert!(outcome.value.stats(gen(2), gen(3)).is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_emission_stats(Path::new("/nonexistent/emission.csv")).unwrap_err();
        assert!(matches!(err, LabelError::Io { .. }));
    }
}
