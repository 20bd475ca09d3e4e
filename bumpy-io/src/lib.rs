//! Read and write bumpy matrices as JSON interchange parts.
//!
//! Paths ending in `.gz` are gzip-compressed on write and decompressed on read.

use anyhow::{Context, Error};
use bumpy::{BumpyMatrix, BumpyParts, VectorLike};
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::Instant;

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Deserialize any JSON document, such as `SplitOptions` or `EngineOptions`.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, Error> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path).with_context(|| path.display().to_string())?);
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    serde_json::from_reader(reader).with_context(|| format!("parsing {}", path.display()))
}

/// Serialize any value as JSON.
pub fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), Error> {
    let path = path.as_ref();
    let file = BufWriter::new(File::create(path).with_context(|| path.display().to_string())?);
    if is_gzip(path) {
        let mut gz = GzEncoder::new(file, Compression::default());
        serde_json::to_writer(&mut gz, value)?;
        gz.finish()?.flush()?;
    } else {
        let mut file = file;
        serde_json::to_writer(&mut file, value)?;
        file.flush()?;
    }
    Ok(())
}

/// Write a bumpy matrix to `path` as triplet parts.
pub fn write_matrix<V>(path: impl AsRef<Path>, m: &BumpyMatrix<V>) -> Result<(), Error>
where
    V: VectorLike + Serialize,
{
    let path = path.as_ref();
    let tick = Instant::now();
    save_json(path, &m.to_parts()).with_context(|| format!("writing bumpy matrix to {}", path.display()))?;
    info!(
        "wrote {}x{} bumpy matrix ({} entries) to {} in {:.3}s",
        m.nrow(),
        m.ncol(),
        m.nnz(),
        path.display(),
        tick.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Read a bumpy matrix written by `write_matrix`. The layout is validated.
pub fn read_matrix<V>(path: impl AsRef<Path>) -> Result<BumpyMatrix<V>, Error>
where
    V: VectorLike + DeserializeOwned,
{
    let path = path.as_ref();
    let tick = Instant::now();
    let parts: BumpyParts<V> = load_json(path)?;
    let m = BumpyMatrix::from_parts(parts).with_context(|| format!("invalid bumpy matrix in {}", path.display()))?;
    info!(
        "read {}x{} bumpy matrix ({} entries) from {} in {:.3}s",
        m.nrow(),
        m.ncol(),
        m.nnz(),
        path.display(),
        tick.elapsed().as_secs_f64()
    );
    Ok(m)
}

#[cfg(test)]
mod test {
    use super::*;
    use bumpy::gen_rand::random_bumpy_mat;
    use bumpy::{split_frame, BumpyError, Column, Frame, SplitOptions};
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_plain_and_gzip() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let m = random_bumpy_mat(&mut rng, 30, 8, 0.3, 5);

        for name in ["plain.json", "packed.json.gz"] {
            let path = dir.path().join(name);
            write_matrix(&path, &m)?;
            let back: BumpyMatrix<Vec<f64>> = read_matrix(&path)?;
            assert_eq!(back, m);
        }
        Ok(())
    }

    #[test]
    fn test_gzip_is_compressed() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("magic.json.gz");
        write_matrix(&path, &random_bumpy_mat(&mut Pcg64Mcg::seed_from_u64(42), 4, 4, 0.5, 2))?;
        let bytes = std::fs::read(&path)?;
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        Ok(())
    }

    #[test]
    fn test_frame_matrix() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let frame = Frame::new(vec![
            ("x".to_string(), Column::F64(vec![1.0, 2.0, 3.0])),
            ("ok".to_string(), Column::Bool(vec![true, false, true])),
            ("r".to_string(), Column::Str(vec!["A".into(), "A".into(), "B".into()])),
            ("c".to_string(), Column::Str(vec!["P".into(), "Q".into(), "P".into()])),
        ])?;
        let m = split_frame(&frame, "r", "c", &SplitOptions::new())?;
        let path = dir.path().join("frame.json");
        write_matrix(&path, &m)?;
        let back: BumpyMatrix<Frame> = read_matrix(&path)?;
        assert_eq!(back, m);
        assert_eq!(back.field_bool("ok")?.get_named("A", "Q")?, vec![false]);
        Ok(())
    }

    #[test]
    fn test_corrupt_frame() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;

        // stored row count disagrees with the column lengths
        let path = dir.path().join("rows.json");
        std::fs::write(
            &path,
            r#"{"kind":"tabular","nrow":1,"ncol":1,
                "values":{"names":["x"],"columns":[{"f64":[1.0]}],"nrow":3},
                "rows":[0],"cols":[0],"starts":[0],"ends":[3]}"#,
        )?;
        assert!(read_matrix::<Frame>(&path).is_err());

        // more names than columns
        let path = dir.path().join("names.json");
        std::fs::write(
            &path,
            r#"{"kind":"tabular","nrow":1,"ncol":1,
                "values":{"names":["x","y"],"columns":[{"f64":[1.0]}],"nrow":1},
                "rows":[0],"cols":[0],"starts":[0],"ends":[1]}"#,
        )?;
        assert!(read_matrix::<Frame>(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_errors() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let missing = dir.path().join("does-not-exist.json");
        let e = read_matrix::<Vec<f64>>(&missing).unwrap_err();
        assert!(format!("{e:#}").contains("does-not-exist.json"));

        // a well-formed document with an invalid layout
        let m = random_bumpy_mat(&mut Pcg64Mcg::seed_from_u64(7), 5, 5, 0.8, 3);
        let mut parts = m.to_parts();
        parts.ends[0] += 1;
        let path = dir.path().join("overlap.json");
        save_json(&path, &parts)?;
        let e = read_matrix::<Vec<f64>>(&path).unwrap_err();
        assert!(matches!(e.downcast_ref::<BumpyError>(), Some(BumpyError::InvalidLayout(_))));

        // a numeric file read back as logical
        let path = dir.path().join("kind.json");
        write_matrix(&path, &m)?;
        assert!(read_matrix::<Vec<bool>>(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_options() -> Result<(), Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"key_order": "first_seen", "row_levels": ["b", "a"]}"#)?;
        let opts: SplitOptions = load_json(&path)?;
        assert_eq!(opts.key_order, bumpy::KeyOrder::FirstSeen);
        assert_eq!(opts.row_levels, Some(vec!["b".to_string(), "a".to_string()]));

        let path = dir.path().join("engine.json.gz");
        save_json(&path, &serde_json::json!({"recycle": "strict"}))?;
        let engine: bumpy::EngineOptions = load_json(&path)?;
        assert_eq!(engine, bumpy::EngineOptions::strict());
        Ok(())
    }
}
