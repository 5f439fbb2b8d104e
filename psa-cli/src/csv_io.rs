//! Reference CSV data source: two logical sections (parameter header+row,
//! then a job-durations header+row). The format is not part of the core;
//! [`InputData`] is the boundary type the CLI hands to `psa_core`.

use rand::Rng;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type CsvResult<T> = Result<T, CsvError>;

/// The data the core is bootstrapped from: processor/job counts, the
/// duration range used to generate synthetic data, and the durations
/// themselves.
#[derive(Debug, Clone)]
pub struct InputData {
    pub processor_count: u32,
    pub job_count: u32,
    pub min_duration: f64,
    pub max_duration: f64,
    pub job_durations: Vec<f64>,
}

/// Generates `job_count` durations uniformly in `[min_duration,
/// max_duration]` and writes the two-section CSV to `path`.
pub fn generate(
    path: &Path,
    processor_count: u32,
    job_count: u32,
    min_duration: f64,
    max_duration: f64,
) -> CsvResult<InputData> {
    if min_duration <= 0.0 || max_duration < min_duration {
        return Err(CsvError::Malformed(format!(
            "invalid duration range [{min_duration}, {max_duration}]"
        )));
    }

    let mut rng = rand::rng();
    let durations: Vec<f64> = (0..job_count)
        .map(|_| rng.random_range(min_duration..=max_duration))
        .collect();

    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(["processor_count", "job_count", "min_duration", "max_duration"])?;
    writer.write_record([
        processor_count.to_string(),
        job_count.to_string(),
        min_duration.to_string(),
        max_duration.to_string(),
    ])?;
    writer.write_record(["job_durations"])?;
    writer.write_record(durations.iter().map(|d| d.to_string()).collect::<Vec<_>>())?;
    writer.flush()?;

    Ok(InputData {
        processor_count,
        job_count,
        min_duration,
        max_duration,
        job_durations: durations,
    })
}

/// Reads a CSV produced by [`generate`] back into an [`InputData`], failing
/// on a malformed header, a missing row, or a `job_count` that does not
/// match the number of parsed durations.
pub fn read(path: &Path) -> CsvResult<InputData> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    let mut records = reader.records();

    let param_header = records
        .next()
        .ok_or_else(|| CsvError::Malformed("missing parameter header row".into()))??;
    if param_header.len() != 4 {
        return Err(CsvError::Malformed(
            "parameter header must have 4 columns".into(),
        ));
    }

    let param_row = records
        .next()
        .ok_or_else(|| CsvError::Malformed("missing parameter value row".into()))??;
    let processor_count: u32 = param_row
        .get(0)
        .ok_or_else(|| CsvError::Malformed("missing processor_count".into()))?
        .parse()
        .map_err(|_| CsvError::Malformed("processor_count is not an integer".into()))?;
    let job_count: u32 = param_row
        .get(1)
        .ok_or_else(|| CsvError::Malformed("missing job_count".into()))?
        .parse()
        .map_err(|_| CsvError::Malformed("job_count is not an integer".into()))?;
    let min_duration: f64 = param_row
        .get(2)
        .ok_or_else(|| CsvError::Malformed("missing min_duration".into()))?
        .parse()
        .map_err(|_| CsvError::Malformed("min_duration is not a float".into()))?;
    let max_duration: f64 = param_row
        .get(3)
        .ok_or_else(|| CsvError::Malformed("missing max_duration".into()))?
        .parse()
        .map_err(|_| CsvError::Malformed("max_duration is not a float".into()))?;

    let _durations_header = records
        .next()
        .ok_or_else(|| CsvError::Malformed("missing job_durations header row".into()))??;

    let durations_row = records
        .next()
        .ok_or_else(|| CsvError::Malformed("missing job_durations value row".into()))??;
    let job_durations: Vec<f64> = durations_row
        .iter()
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| CsvError::Malformed(format!("'{s}' is not a valid duration")))
        })
        .collect::<CsvResult<Vec<f64>>>()?;

    if job_durations.len() != job_count as usize {
        return Err(CsvError::Malformed(format!(
            "job_count {job_count} does not match {} parsed durations",
            job_durations.len()
        )));
    }

    Ok(InputData {
        processor_count,
        job_count,
        min_duration,
        max_duration,
        job_durations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn round_trips_generated_data() {
        let file = NamedTempFile::new().unwrap();
        let generated = generate(file.path(), 3, 8, 5.0, 20.0).unwrap();
        let read_back = read(file.path()).unwrap();
        assert_eq!(read_back.processor_count, 3);
        assert_eq!(read_back.job_count, 8);
        assert_eq!(read_back.job_durations.len(), 8);
        assert_eq!(generated.job_durations, read_back.job_durations);
        for d in read_back.job_durations {
            assert!((5.0..=20.0).contains(&d));
        }
    }

    #[test]
    fn rejects_job_count_mismatch() {
        let file = NamedTempFile::new().unwrap();
        {
            let mut w = csv::WriterBuilder::new().from_path(file.path()).unwrap();
            w.write_record(["processor_count", "job_count", "min_duration", "max_duration"])
                .unwrap();
            w.write_record(["2", "5", "1.0", "2.0"]).unwrap();
            w.write_record(["job_durations"]).unwrap();
            w.write_record(["1.0", "2.0"]).unwrap();
            w.flush().unwrap();
        }
        assert!(read(file.path()).is_err());
    }

    #[test]
    fn rejects_invalid_duration_range() {
        let file = NamedTempFile::new().unwrap();
        assert!(generate(file.path(), 2, 4, 10.0, 5.0).is_err());
    }
}
