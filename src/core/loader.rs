use crate::config::cli::LocalStorage;
use crate::core::validation::{coerce_records, validate_records};
use crate::domain::fire_point::FirePoint;
use crate::domain::model::{DataModel, Record, ValidationReport};
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{HazardsError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use zip::ZipArchive;

/// Current NFDB fire point release, text distribution.
pub const DEFAULT_DATA_URL: &str =
    "https://cwfis.cfs.nrcan.gc.ca/downloads/nfdb/fire_pnt/current_version/NFDB_point_txt.zip";

pub const DEFAULT_TOLERANCE: f64 = 0.05;
pub const FIRE_TAG: &str = "🔥";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const EMPTY_ZIP_MAGIC: &[u8] = b"PK\x05\x06";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Default)]
struct LoaderState {
    data: Option<Arc<Vec<FirePoint>>>,
    report: Option<ValidationReport>,
}

/// Fire point loader over the Canadian National Fire Database.
///
/// Fetches the NFDB archive (HTTP or local path, optionally through a
/// download cache), extracts the delimited member and validates every row
/// against [`FirePoint`]. The result of [`load`](Self::load) is memoised until
/// a forced reload.
pub struct FirePointDataLoader<C: ConfigProvider> {
    config: C,
    client: Client,
    cache: Option<LocalStorage>,
    tolerance: f64,
    state: Mutex<LoaderState>,
}

impl<C: ConfigProvider> FirePointDataLoader<C> {
    pub fn new(config: C) -> Self {
        let cache = config
            .cache_dir()
            .map(|dir| LocalStorage::new(dir.to_string()));

        Self {
            config,
            client: Client::new(),
            cache,
            tolerance: DEFAULT_TOLERANCE,
            state: Mutex::new(LoaderState::default()),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn alias_map(&self) -> HashMap<&'static str, &'static str> {
        FirePoint::alias_map()
    }

    pub fn validate(
        &self,
        records: &[Record],
        tolerance: f64,
        tag: &str,
    ) -> (Vec<FirePoint>, ValidationReport) {
        validate_records::<FirePoint>(records, tolerance, tag)
    }

    /// Loads, validates and memoises the fire points.
    pub async fn load(&self, force_reload: bool, validate: bool) -> Result<Arc<Vec<FirePoint>>> {
        let mut state = self.state.lock().await;
        if let Some(data) = &state.data {
            if !force_reload {
                tracing::debug!("Using {} cached fire points", data.len());
                return Ok(Arc::clone(data));
            }
        }

        let records = self.fetch_records(force_reload).await?;

        let (fires, report) = if validate {
            let (fires, report) = self.validate(&records, self.tolerance, FIRE_TAG);
            (fires, Some(report))
        } else {
            (coerce_records::<FirePoint>(&records), None)
        };

        let data = Arc::new(fires);
        state.data = Some(Arc::clone(&data));
        state.report = report;
        Ok(data)
    }

    pub async fn data(&self) -> Option<Arc<Vec<FirePoint>>> {
        self.state.lock().await.data.clone()
    }

    pub async fn last_report(&self) -> Option<ValidationReport> {
        self.state.lock().await.report.clone()
    }

    /// Fetches the source and parses the delimited member into raw records.
    ///
    /// A cached archive that no longer opens is evicted and downloaded again.
    pub async fn fetch_records(&self, force_reload: bool) -> Result<Vec<Record>> {
        let extension = self.config.member_extension();
        let fetched = self.fetch_source(force_reload).await?;

        let member = match extract_member(&fetched.bytes, extension) {
            Err(HazardsError::ZipError(e)) if fetched.from_cache => {
                tracing::warn!("⚠️ Cached archive is unreadable ({}), downloading again", e);
                self.evict_cached();
                let fresh = self.fetch_source(true).await?;
                extract_member(&fresh.bytes, extension)?
            }
            other => other?,
        };

        let text = decode_text(&member);
        let records = parse_delimited(&text, self.config.delimiter())?;

        tracing::info!("📄 Parsed {} raw fire records", records.len());
        Ok(records)
    }

    pub async fn fetch_archive(&self, force_reload: bool) -> Result<Vec<u8>> {
        Ok(self.fetch_source(force_reload).await?.bytes)
    }

    async fn fetch_source(&self, force_reload: bool) -> Result<Fetched> {
        let source = self.config.source();

        if !is_remote(source) {
            tracing::info!("📂 Reading wildfire data from {}", source);
            return Ok(Fetched {
                bytes: tokio::fs::read(source).await?,
                from_cache: false,
            });
        }

        let cache_key = cache_key(source);
        if let Some(cache) = &self.cache {
            if !force_reload && cache.exists(&cache_key).await {
                tracing::info!("♻️ Using cached archive {}", cache_key);
                return Ok(Fetched {
                    bytes: cache.read_file(&cache_key).await?,
                    from_cache: true,
                });
            }
        }

        tracing::info!("📥 Downloading wildfire data from Canadian NFDB...");
        tracing::debug!("Making HTTP request to: {}", source);

        let mut request = self.client.get(source);
        if let Some(timeout) = self.config.request_timeout() {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("HTTP response status: {}", response.status());

        if !response.status().is_success() {
            return Err(HazardsError::HttpStatusError {
                url: source.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::info!("✅ Downloaded {} bytes", bytes.len());

        if let Some(cache) = &self.cache {
            match cache.write_file(&cache_key, &bytes).await {
                Ok(()) => tracing::debug!("Cached archive as {}", cache_key),
                Err(e) => tracing::warn!("⚠️ Could not cache archive as {}: {}", cache_key, e),
            }
        }

        Ok(Fetched {
            bytes,
            from_cache: false,
        })
    }

    fn evict_cached(&self) {
        if let Some(cache) = &self.cache {
            let cache_key = cache_key(self.config.source());
            if let Err(e) = cache.remove_file(&cache_key) {
                tracing::warn!("⚠️ Could not evict cached archive {}: {}", cache_key, e);
            }
        }
    }
}

struct Fetched {
    bytes: Vec<u8>,
    from_cache: bool,
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Cache file name for a remote source: host, port and file name, so two
/// mirrors of the same release never share an entry.
pub fn cache_key(source: &str) -> String {
    let Ok(url) = url::Url::parse(source) else {
        return "nfdb_archive.bin".to_string();
    };

    let file_name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("nfdb_archive.bin");

    let mut key = String::new();
    if let Some(host) = url.host_str() {
        key.push_str(host);
        key.push('_');
    }
    if let Some(port) = url.port() {
        key.push_str(&port.to_string());
        key.push('_');
    }
    key.push_str(file_name);

    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Returns the first archive member with `extension`, or `raw` itself when it
/// is not a ZIP archive.
pub fn extract_member(raw: &[u8], extension: &str) -> Result<Vec<u8>> {
    if !(raw.starts_with(ZIP_MAGIC) || raw.starts_with(EMPTY_ZIP_MAGIC)) {
        return Ok(raw.to_vec());
    }

    let mut archive = ZipArchive::new(Cursor::new(raw))?;
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let matches = !file.is_dir()
            && Path::new(file.name())
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false);

        if matches {
            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            tracing::info!("✅ Extracted {} ({} bytes) from archive", name, contents.len());
            return Ok(contents);
        }
    }

    Err(HazardsError::ArchiveMemberNotFound {
        extension: extension.to_string(),
    })
}

/// UTF-8 when valid, Latin-1 otherwise (agency exports mix both).
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

pub fn parse_delimited(text: &str, delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record = Record::from_pairs(
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.clone(), serde_json::Value::String(cell.to_string()))),
        );
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use zip::write::{FileOptions, ZipWriter};

    struct MockConfig {
        source: String,
    }

    impl ConfigProvider for MockConfig {
        fn source(&self) -> &str {
            &self.source
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn member_extension(&self) -> &str {
            "txt"
        }

        fn delimiter(&self) -> u8 {
            b','
        }

        fn request_timeout(&self) -> Option<Duration> {
            Some(Duration::from_secs(5))
        }

        fn cache_dir(&self) -> Option<&str> {
            None
        }
    }

    const SAMPLE: &str = "FIRE_ID,FIRENAME,YEAR,MONTH,REP_DATE,SIZE_HA,LATITUDE,LONGITUDE\n\
                          QC1,Rouge,2023,6,2023/06/12,1220.5,48.25,-70.1\n\
                          QC2,Bleu,2023,7,0000/00/00,2.0,47.7,-72.5\n\
                          QC3,,,8,,15.0,49.0,-71.0\n";

    fn zip_with(members: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in members {
            zip.start_file::<_, ()>(*name, FileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_member_picks_matching_extension() {
        let archive = zip_with(&[
            ("NFDB_point/readme.pdf", b"%PDF".as_slice()),
            ("NFDB_point/NFDB_point_20240613.TXT", SAMPLE.as_bytes()),
        ]);

        let member = extract_member(&archive, "txt").unwrap();
        assert_eq!(member, SAMPLE.as_bytes());
    }

    #[test]
    fn test_extract_member_missing_extension() {
        let archive = zip_with(&[("NFDB_point.shp", b"\0\0".as_slice())]);
        let err = extract_member(&archive, "txt").unwrap_err();
        assert!(matches!(err, HazardsError::ArchiveMemberNotFound { .. }));
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(extract_member(SAMPLE.as_bytes(), "txt").unwrap(), SAMPLE.as_bytes());
    }

    #[test]
    fn test_decode_text_falls_back_to_latin1() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFYEAR"), "YEAR");
        assert_eq!(decode_text(b"Rivi\xE8re"), "Rivière");
        assert_eq!(decode_text("Rivière".as_bytes()), "Rivière");
    }

    #[test]
    fn test_parse_delimited() {
        let records = parse_delimited(SAMPLE, b',').unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].data["FIRENAME"], serde_json::json!("Rouge"));
        assert_eq!(records[2].data["YEAR"], serde_json::json!(""));

        let tabbed = parse_delimited("YEAR\tMONTH\n2001\t5\n", b'\t').unwrap();
        assert_eq!(tabbed[0].data["MONTH"], serde_json::json!("5"));
    }

    #[test]
    fn test_cache_key_distinguishes_mirrors() {
        assert_eq!(cache_key(DEFAULT_DATA_URL), "cwfis.cfs.nrcan.gc.ca_NFDB_point_txt.zip");
        assert_eq!(
            cache_key("http://127.0.0.1:8080/mirror/NFDB_point_txt.zip"),
            "127.0.0.1_8080_NFDB_point_txt.zip"
        );
        assert_ne!(
            cache_key("https://mirror-a.example.com/NFDB_point_txt.zip"),
            cache_key("https://mirror-b.example.com/NFDB_point_txt.zip")
        );
        assert_eq!(cache_key("https://example.com/"), "example.com_nfdb_archive.bin");
        assert_eq!(cache_key("not a url"), "nfdb_archive.bin");
    }

    #[tokio::test]
    async fn test_load_from_local_archive_and_memoise() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("NFDB_point_txt.zip");
        std::fs::write(&path, zip_with(&[("NFDB_point.txt", SAMPLE.as_bytes())])).unwrap();

        let loader = FirePointDataLoader::new(MockConfig {
            source: path.to_str().unwrap().to_string(),
        });
        assert!(loader.data().await.is_none());

        let fires = loader.load(false, true).await.unwrap();
        assert_eq!(fires.len(), 2);

        let report = loader.last_report().await.unwrap();
        assert_eq!(report.skipped, 1);
        assert!(!report.healthy);

        // memoised: the source can disappear without breaking a plain reload
        std::fs::remove_file(&path).unwrap();
        let again = loader.load(false, true).await.unwrap();
        assert!(Arc::ptr_eq(&fires, &again));
        assert!(loader.load(true, true).await.is_err());
    }

    #[tokio::test]
    async fn test_load_without_validation_has_no_report() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("fires.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        let loader = FirePointDataLoader::new(MockConfig {
            source: path.to_str().unwrap().to_string(),
        });

        let fires = loader.load(false, false).await.unwrap();
        assert_eq!(fires.len(), 2);
        assert!(loader.last_report().await.is_none());
    }
}
