use rayon::iter::ParallelBridge;
use rayon::prelude::ParallelIterator;
use serde_derive::Deserialize;
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::errors::EvalError;

pub type UserId = usize;
pub type ItemId = usize;
pub type TokenId = u32;

/// Dataset dimensions, supplied separately from the interaction files.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetMeta {
    pub num_users: usize,
    pub num_items: usize,
}

pub fn read_meta(meta_path: &str) -> Result<DatasetMeta, EvalError> {
    let file = File::open(meta_path)?;
    serde_json::from_reader(io::BufReader::new(file)).map_err(|parse_error| {
        EvalError::DataIntegrity(format!(
            "invalid metadata file {}: {}",
            meta_path, parse_error
        ))
    })
}

/// Reads whitespace-delimited `user_id item_id value` records, one per line,
/// skipping the header line. Record order is not preserved.
pub fn read_triplets(data_path: &str) -> Result<Vec<(UserId, ItemId, f32)>, EvalError> {
    let mut line_iterator = create_buffered_line_reader(data_path)?;
    line_iterator.next(); // skip header
    line_iterator
        .par_bridge()
        .filter_map(|result| match result {
            Ok(rawline) if rawline.trim().is_empty() => None,
            Ok(rawline) => Some(parse_triplet(&rawline)),
            Err(read_error) => Some(Err(EvalError::Io(read_error))),
        })
        .collect()
}

fn parse_triplet(rawline: &str) -> Result<(UserId, ItemId, f32), EvalError> {
    let mut parts = rawline.split_whitespace();
    let user = parts.next().and_then(|raw| raw.parse::<UserId>().ok());
    let item = parts.next().and_then(|raw| raw.parse::<ItemId>().ok());
    let value = parts.next().and_then(|raw| raw.parse::<f32>().ok());
    match (user, item, value) {
        (Some(user), Some(item), Some(value)) => Ok((user, item, value)),
        _ => Err(EvalError::DataIntegrity(format!(
            "malformed interaction record: '{}'",
            rawline
        ))),
    }
}

fn create_buffered_line_reader<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

/// Writes the final metrics as a two-line record: a header line naming the
/// metrics and a data line with their values.
pub fn write_report(out_path: &str, header: &str, values: &str) -> Result<(), EvalError> {
    let mut file = File::create(out_path)?;
    writeln!(file, "{}", header)?;
    write!(file, "{}", values)?;
    Ok(())
}

#[cfg(test)]
mod io_test {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn should_read_triplets_and_skip_header() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user_id item_id count").unwrap();
        writeln!(file, "0 3 1").unwrap();
        writeln!(file, "2 1 4.5").unwrap();
        writeln!(file).unwrap();

        let mut triplets = read_triplets(file.path().to_str().unwrap()).unwrap();
        triplets.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(vec![(0, 3, 1.0), (2, 1, 4.5)], triplets);
    }

    #[test]
    fn should_reject_malformed_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user_id item_id count").unwrap();
        writeln!(file, "0 not_an_item 1").unwrap();

        let result = read_triplets(file.path().to_str().unwrap());
        assert!(matches!(result, Err(EvalError::DataIntegrity(_))));
    }

    #[test]
    fn should_write_two_line_report() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("results.txt");
        let out_path = out_path.to_str().unwrap();

        write_report(out_path, "Recall@1,NDCG@5", "0.1000,0.2000").unwrap();

        let contents = std::fs::read_to_string(out_path).unwrap();
        assert_eq!("Recall@1,NDCG@5\n0.1000,0.2000", contents);
    }
}
