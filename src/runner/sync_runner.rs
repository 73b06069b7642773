use chrono::TimeDelta;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::{
    csv_utils::{read_csv_into_iter, write_csv},
    dto::Payment,
    Engine, VelocityStore,
};

/// Replays a payments file through a fresh velocity store and writes one
/// assessment per payment, in input order, to the provided writer.
///
/// # Arguments
/// * `input_path` - Path to the input CSV file containing payments
/// * `window` - Usage window each payment is assessed against
/// * `writer` - Where to write the assessments (e.g. stdout)
///
/// # Errors
/// Returns an error if:
/// * The window is negative
/// * The input file cannot be read
/// * The CSV is malformed
/// * Writing to the output fails
pub fn run<P, W>(input_path: P, window: TimeDelta, writer: W) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
    W: Write,
{
    let engine = Engine::new(Arc::new(VelocityStore::new()), window)?;

    let mut assessments = Vec::new();
    for payment in read_csv_into_iter::<Payment, _>(input_path)? {
        // CSV parsing errors are critical - propagate them
        assessments.push(engine.assess(payment?)?);
    }
    info!(
        payments = assessments.len(),
        cards = engine.provider().tracked_cards(),
        "Replay finished"
    );

    write_csv(writer, assessments.into_iter())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_input() -> Result<(), Box<dyn Error>> {
        let mut output = Vec::new();
        run("data/example_payments.csv", TimeDelta::minutes(5), &mut output)?;

        let expected = "card,timestamp,usage_count
K,2024-01-01T12:00:00Z,0
K,2024-01-01T12:01:00Z,1
K2,2024-01-01T12:01:30Z,0
K,2024-01-01T12:02:00Z,2
K,2024-01-01T12:03:00Z,3
K2,2024-01-01T12:04:00Z,1
K,2024-01-01T23:00:00Z,0
";
        assert_eq!(String::from_utf8(output)?, expected);
        Ok(())
    }

    #[test]
    fn test_example_input_narrow_window() -> Result<(), Box<dyn Error>> {
        let mut output = Vec::new();
        run("data/example_payments.csv", TimeDelta::seconds(90), &mut output)?;

        let counts: Vec<String> = String::from_utf8(output)?
            .lines()
            .skip(1)
            .map(|line| line.rsplit(',').next().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(counts, vec!["0", "1", "0", "1", "1", "0", "0"]);
        Ok(())
    }

    #[test]
    fn test_100_cards() -> Result<(), Box<dyn Error>> {
        let mut output = Vec::new();
        run("data/100_cards.csv", TimeDelta::minutes(5), &mut output)?;

        // Each card pays once a minute, so the n-th payment sees min(n, 5) earlier ones
        let mut expected = String::from("card,timestamp,usage_count\n");
        for minute in 0..20 {
            for card in 1..=100 {
                expected.push_str(&format!(
                    "card-{:03},2024-01-01T10:{:02}:{:02}Z,{}\n",
                    card,
                    minute,
                    card % 60,
                    minute.min(5)
                ));
            }
        }

        assert_eq!(String::from_utf8(output)?, expected);
        Ok(())
    }

    #[test]
    fn test_negative_window_fails() {
        let result = run("data/example_payments.csv", TimeDelta::seconds(-1), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_input_fails() {
        let result = run("data/does_not_exist.csv", TimeDelta::minutes(5), Vec::new());
        assert!(result.is_err());
    }
}
