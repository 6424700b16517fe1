use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::Path,
};

use flate2::read::GzDecoder;
use tempfile::NamedTempFile;

use crate::errors::KeoDataErr;

/// Does this path name a gzip file?
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Decompress a gzip file into a named temporary file ending in `suffix`.
///
/// The temporary file is deleted when the returned handle is dropped.
pub fn decompress_to_temp(path: &Path, suffix: &str) -> Result<NamedTempFile, KeoDataErr> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));

    let mut tmp = tempfile::Builder::new()
        .prefix("keogram-data-")
        .suffix(suffix)
        .tempfile()?;

    io::copy(&mut decoder, &mut tmp)?;
    tmp.flush()?;

    Ok(tmp)
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
#[cfg(test)]
mod unit {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use tempfile::TempDir;

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(Path::new("a/b/oe_m1m_dscovr_pub.nc.gz")));
        assert!(is_gzip(Path::new("X.GZ")));
        assert!(!is_gzip(Path::new("oe_m1m_dscovr_pub.nc")));
        assert!(!is_gzip(Path::new("gz")));
    }

    #[test]
    fn test_decompress_and_cleanup() {
        let dir = TempDir::new().unwrap();
        let gz_path = dir.path().join("data.nc.gz");

        let mut encoder = GzEncoder::new(File::create(&gz_path).unwrap(), Compression::default());
        encoder.write_all(b"not really netcdf").unwrap();
        encoder.finish().unwrap();

        let tmp = decompress_to_temp(&gz_path, ".nc").unwrap();
        let tmp_path = tmp.path().to_path_buf();
        assert!(tmp_path.to_string_lossy().ends_with(".nc"));
        assert_eq!(std::fs::read(&tmp_path).unwrap(), b"not really netcdf");

        drop(tmp);
        assert!(!tmp_path.exists());
    }

    #[test]
    fn test_corrupt_gzip_is_an_error() {
        let dir = TempDir::new().unwrap();
        let gz_path = dir.path().join("bad.nc.gz");
        std::fs::write(&gz_path, b"definitely not gzip").unwrap();

        assert!(decompress_to_temp(&gz_path, ".nc").is_err());
    }
}
