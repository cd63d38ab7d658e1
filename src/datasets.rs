//! Sample images for demos and tests.
//!
//! Files are fetched once, checked against a sha256 registry and cached on
//! disk. The cache lives in `IMAGEPLOT_DATA_DIR` when set, otherwise in
//! `$XDG_CACHE_HOME/imageplot`, `$HOME/.cache/imageplot` or the system temp
//! directory.
//!
//! ```rust,no_run
//! use imageplot::datasets::load_image;
//!
//! # fn example() -> imageplot::ImagePlotResult<()> {
//! let polymer = load_image("polymer")?.into_image()?;
//! assert!(!polymer.is_rgb());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::str::FromStr;

use ndarray::{Array2, ArrayD, IxDyn, ShapeBuilder};
use sha2::{Digest, Sha256};
use tiff::decoder::{Decoder, DecodingResult};
use tracing::{info, warn};

use crate::{ImageData, ImagePlotError, ImagePlotResult, ImageStack};

/// Where registry files are downloaded from.
pub const BASE_URL: &str = "https://github.com/SarthakJariwala/seaborn-image/raw/master/data/";

/// Environment variable overriding the cache directory.
pub const DATA_DIR_ENV: &str = "IMAGEPLOT_DATA_DIR";

/// A file in the dataset registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryFile {
    /// File name relative to the base URL and the cache directory.
    pub name: &'static str,
    /// Expected sha256 digest, lowercase hex.
    pub sha256: &'static str,
}

const POLYMER: RegistryFile = RegistryFile {
    name: "PolymerImage.txt",
    sha256: "7b6798865080adf3ecf11e342f3d86d7b52ea0700020a1f062544ee825fb8a0e",
};

const PEROVSKITE: RegistryFile = RegistryFile {
    name: "Perovskite.txt",
    sha256: "3228eeade5afec3c2b1ed116b2d4fe35877224d2d9bf7b4a17e04a432e6135c5",
};

const CELLS: RegistryFile = RegistryFile {
    name: "cells.tif",
    sha256: "2120cfe08e0396324793a10a905c9bbcb64b117215eb63b2c24b643e1600c8c9",
};

const CIFAR10: RegistryFile = RegistryFile {
    name: "cifar10.npy",
    sha256: "c0a12085b3b82f4a6d1f95e609a40701648a137eb9ff1fb5751071f54cc8e05c",
};

/// Height map values are stored in metres.
const METRES_TO_NANOMETRES: f64 = 1e9;
const OUTLIER_PIXEL: [usize; 2] = [25, 25];
const OUTLIER_VALUE: f64 = 80.0;

/// Datasets known to [`load_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetName {
    /// AFM height map of a polymer film, in nanometres.
    Polymer,
    /// [`DatasetName::Polymer`] with one spiked pixel.
    PolymerOutliers,
    /// Fluorescence image of a perovskite film.
    Fluorescence,
    /// Fluorescence microscopy stack of cells, with axes reversed from the
    /// file's `(plane, row, column)` order.
    Cells,
    /// CIFAR-10 sample as one `(N, 32, 32, 3)` stack.
    Cifar10,
    /// The same CIFAR-10 sample as a list of RGB images.
    Cifar10List,
}

impl DatasetName {
    /// Every dataset.
    pub const ALL: [Self; 6] = [
        Self::Polymer,
        Self::PolymerOutliers,
        Self::Fluorescence,
        Self::Cells,
        Self::Cifar10,
        Self::Cifar10List,
    ];

    /// Name accepted by [`load_image`].
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Polymer => "polymer",
            Self::PolymerOutliers => "polymer outliers",
            Self::Fluorescence => "fluorescence",
            Self::Cells => "cells",
            Self::Cifar10 => "cifar10",
            Self::Cifar10List => "cifar10 list",
        }
    }

    /// The registry file backing this dataset.
    pub const fn file(&self) -> RegistryFile {
        match self {
            Self::Polymer | Self::PolymerOutliers => POLYMER,
            Self::Fluorescence => PEROVSKITE,
            Self::Cells => CELLS,
            Self::Cifar10 | Self::Cifar10List => CIFAR10,
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetName {
    type Err = ImagePlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ImagePlotError::UnknownDataset {
                name: s.to_string(),
                available: Self::ALL
                    .iter()
                    .map(Self::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// A loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// One image.
    Image(ImageData),
    /// A stack of images.
    Stack(ImageStack),
    /// Independent images.
    List(Vec<ImageData>),
}

impl Dataset {
    /// The single image, or a shape error for stacks and lists.
    pub fn into_image(self) -> ImagePlotResult<ImageData> {
        match self {
            Self::Image(image) => Ok(image),
            _ => Err(ImagePlotError::shape("dataset is not a single image")),
        }
    }

    /// The stack, or a shape error otherwise.
    pub fn into_stack(self) -> ImagePlotResult<ImageStack> {
        match self {
            Self::Stack(stack) => Ok(stack),
            _ => Err(ImagePlotError::shape("dataset is not an image stack")),
        }
    }

    /// The list of images; a single image becomes a list of one.
    pub fn into_list(self) -> ImagePlotResult<Vec<ImageData>> {
        match self {
            Self::List(images) => Ok(images),
            Self::Image(image) => Ok(vec![image]),
            Self::Stack(_) => Err(ImagePlotError::shape("dataset is an image stack, not a list")),
        }
    }
}

/// Source of raw dataset bytes.
pub trait Fetcher: Send + Sync {
    /// Downloads `url` completely.
    fn fetch(&self, url: &str) -> ImagePlotResult<Vec<u8>>;
}

/// Fetches files over HTTPS with a blocking `reqwest` request.
#[cfg(feature = "download")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

#[cfg(feature = "download")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> ImagePlotResult<Vec<u8>> {
        let response = reqwest::blocking::get(url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ImagePlotError::Download(e.to_string()))?;
        let bytes = response
            .bytes()
            .map_err(|e| ImagePlotError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Loads registry datasets through a cache directory.
pub struct DataLoader {
    cache_dir: PathBuf,
    base_url: String,
    fetcher: Option<Box<dyn Fetcher>>,
    checksums: HashMap<String, String>,
}

impl fmt::Debug for DataLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataLoader")
            .field("cache_dir", &self.cache_dir)
            .field("base_url", &self.base_url)
            .field("fetcher", &self.fetcher.as_ref().map(|_| "..."))
            .field("checksums", &self.checksums)
            .finish()
    }
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// The default cache directory.
pub fn default_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = std::env::var_os("XDG_CACHE_HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir).join("imageplot");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(home).join(".cache").join("imageplot");
    }
    std::env::temp_dir().join("imageplot")
}

impl DataLoader {
    /// A loader using the default cache directory and, with the `download`
    /// feature, the HTTP fetcher.
    pub fn new() -> Self {
        #[cfg(feature = "download")]
        let fetcher: Option<Box<dyn Fetcher>> = Some(Box::new(HttpFetcher));
        #[cfg(not(feature = "download"))]
        let fetcher: Option<Box<dyn Fetcher>> = None;

        Self {
            cache_dir: default_cache_dir(),
            base_url: BASE_URL.to_string(),
            fetcher,
            checksums: HashMap::new(),
        }
    }

    /// Uses `dir` as the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Downloads from `base_url` instead of [`BASE_URL`].
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches files through `fetcher`.
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    /// Expects `sha256` for registry file `file` instead of the built-in digest.
    pub fn with_checksum(mut self, file: &str, sha256: &str) -> Self {
        self.checksums
            .insert(file.to_string(), sha256.to_ascii_lowercase());
        self
    }

    /// The cache directory.
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Loads dataset `name`.
    pub fn load(&self, name: &str) -> ImagePlotResult<Dataset> {
        let dataset: DatasetName = name.parse()?;
        let bytes = self.fetch_file(dataset.file())?;

        match dataset {
            DatasetName::Polymer => {
                let heights = parse_text_matrix(&bytes, 1)?.mapv(|v| v * METRES_TO_NANOMETRES);
                Ok(Dataset::Image(ImageData::gray(&heights)?))
            }
            DatasetName::PolymerOutliers => {
                let mut heights =
                    parse_text_matrix(&bytes, 1)?.mapv(|v| v * METRES_TO_NANOMETRES);
                let shape = heights.dim();
                let pixel = heights.get_mut(OUTLIER_PIXEL).ok_or_else(|| {
                    ImagePlotError::shape(format!(
                        "polymer image of shape {shape:?} is too small for the outlier pixel"
                    ))
                })?;
                *pixel = OUTLIER_VALUE;
                Ok(Dataset::Image(ImageData::gray(&heights)?))
            }
            DatasetName::Fluorescence => Ok(Dataset::Image(ImageData::gray(
                &parse_text_matrix(&bytes, 0)?,
            )?)),
            DatasetName::Cells => {
                let stack = parse_tiff(&bytes)?.reversed_axes();
                Ok(Dataset::Stack(ImageStack::new(&stack)?))
            }
            DatasetName::Cifar10 => Ok(Dataset::Stack(parse_npy_u8(&bytes)?)),
            DatasetName::Cifar10List => {
                let stack = parse_npy_u8(&bytes)?;
                let n = stack.shape()[0];
                let images = (0..n as isize)
                    .map(|i| stack.slice(0, i))
                    .collect::<ImagePlotResult<Vec<_>>>()?;
                Ok(Dataset::List(images))
            }
        }
    }

    fn expected_checksum<'a>(&'a self, file: &'a RegistryFile) -> &'a str {
        self.checksums
            .get(file.name)
            .map_or(file.sha256, String::as_str)
    }

    /// Returns the verified bytes of `file`, from the cache when possible.
    fn fetch_file(&self, file: RegistryFile) -> ImagePlotResult<Vec<u8>> {
        let expected = self.expected_checksum(&file);
        let path = self.cache_dir.join(file.name);

        if path.is_file() {
            let bytes = fs::read(&path)?;
            if sha256_hex(&bytes) == expected {
                info!(path = %path.display(), "using cached dataset");
                return Ok(bytes);
            }
            warn!(path = %path.display(), "cached dataset failed verification, fetching again");
        }

        let fetcher = self.fetcher.as_ref().ok_or_else(|| {
            ImagePlotError::Download(
                "no fetcher configured; enable the `download` feature or call `with_fetcher`"
                    .to_string(),
            )
        })?;
        let url = format!("{}{}", self.base_url, file.name);
        info!(%url, "downloading dataset");
        let bytes = fetcher.fetch(&url)?;

        let actual = sha256_hex(&bytes);
        if actual != expected {
            return Err(ImagePlotError::ChecksumMismatch {
                file: file.name.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "cached dataset");
        Ok(bytes)
    }
}

/// Loads dataset `name` with a default [`DataLoader`].
///
/// Known names: `polymer`, `polymer outliers`, `fluorescence`, `cells`,
/// `cifar10` and `cifar10 list`.
pub fn load_image(name: &str) -> ImagePlotResult<Dataset> {
    DataLoader::new().load(name)
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Parses whitespace separated floats, one image row per line.
fn parse_text_matrix(bytes: &[u8], skip_rows: usize) -> ImagePlotResult<Array2<f64>> {
    let text = std::str::from_utf8(bytes).map_err(|e| ImagePlotError::Decode(e.to_string()))?;
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;

    for (lineno, line) in text.lines().enumerate().skip(skip_rows) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImagePlotError::Decode(format!("line {}: {e}", lineno + 1)))?;
        match ncols {
            None => ncols = Some(row.len()),
            Some(n) if n != row.len() => {
                return Err(ImagePlotError::Decode(format!(
                    "line {} has {} values, expected {n}",
                    lineno + 1,
                    row.len()
                )));
            }
            Some(_) => {}
        }
        values.extend(row);
        nrows += 1;
    }

    let ncols = ncols.ok_or_else(|| ImagePlotError::Decode("no data rows".to_string()))?;
    Array2::from_shape_vec((nrows, ncols), values).map_err(|e| ImagePlotError::Decode(e.to_string()))
}

/// Decodes every page of a TIFF file into a `(page, row, column, sample)`
/// array. The page axis is dropped for single page files and the sample axis
/// for single sample pixels.
fn parse_tiff(bytes: &[u8]) -> ImagePlotResult<ArrayD<f64>> {
    let decode_err = |e: tiff::TiffError| ImagePlotError::Decode(e.to_string());
    let mut decoder = Decoder::new(Cursor::new(bytes)).map_err(decode_err)?;
    let (width, height) = decoder.dimensions().map_err(decode_err)?;

    let mut values = Vec::new();
    let mut pages = 0;
    loop {
        if decoder.dimensions().map_err(decode_err)? != (width, height) {
            return Err(ImagePlotError::Decode(format!(
                "page {pages} differs in size from the first {width}x{height} page"
            )));
        }
        values.extend(decoded_values(decoder.read_image().map_err(decode_err)?));
        pages += 1;
        if !decoder.more_images() {
            break;
        }
        decoder.next_image().map_err(decode_err)?;
    }

    let plane = width as usize * height as usize * pages;
    if plane == 0 || values.len() % plane != 0 {
        return Err(ImagePlotError::Decode(format!(
            "{} samples do not fill {pages} pages of {width}x{height}",
            values.len()
        )));
    }
    let samples = values.len() / plane;
    let mut shape = Vec::with_capacity(4);
    if pages > 1 {
        shape.push(pages);
    }
    shape.extend([height as usize, width as usize]);
    if samples > 1 {
        shape.push(samples);
    }
    ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|e| ImagePlotError::Decode(e.to_string()))
}

fn decoded_values(result: DecodingResult) -> Vec<f64> {
    fn widen<T: Copy + Into<f64>>(v: Vec<T>) -> Vec<f64> {
        v.into_iter().map(Into::into).collect()
    }
    match result {
        DecodingResult::U8(v) => widen(v),
        DecodingResult::U16(v) => widen(v),
        DecodingResult::U32(v) => widen(v),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => widen(v),
        DecodingResult::I16(v) => widen(v),
        DecodingResult::I32(v) => widen(v),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => widen(v),
        DecodingResult::F64(v) => v,
    }
}

/// Parses an `.npy` file of `u8` values into a stack.
fn parse_npy_u8(bytes: &[u8]) -> ImagePlotResult<ImageStack> {
    let npy = npyz::NpyFile::new(bytes).map_err(|e| ImagePlotError::Decode(e.to_string()))?;
    let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
    let fortran = matches!(npy.order(), npyz::Order::Fortran);
    let data = npy
        .into_vec::<u8>()
        .map_err(|e| ImagePlotError::Decode(e.to_string()))?;

    let dim = IxDyn(&shape);
    let arr = if fortran {
        ArrayD::from_shape_vec(dim.f(), data)
    } else {
        ArrayD::from_shape_vec(dim, data)
    }
    .map_err(|e| ImagePlotError::Decode(e.to_string()))?;
    ImageStack::new(&arr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemoryFetcher {
        files: HashMap<String, Vec<u8>>,
        calls: Arc<AtomicUsize>,
    }

    impl Fetcher for MemoryFetcher {
        fn fetch(&self, url: &str) -> ImagePlotResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = url.rsplit('/').next().unwrap_or(url);
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| ImagePlotError::Download(format!("404 {url}")))
        }
    }

    fn temp_cache(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "imageplot-datasets-{}-{test}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn loader(test: &str, files: &[(&str, Vec<u8>)]) -> (DataLoader, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = MemoryFetcher {
            files: files
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            calls: Arc::clone(&calls),
        };
        let mut loader = DataLoader::new()
            .with_cache_dir(temp_cache(test))
            .with_fetcher(fetcher);
        for (name, bytes) in files {
            loader = loader.with_checksum(name, &sha256_hex(bytes));
        }
        (loader, calls)
    }

    fn polymer_text() -> Vec<u8> {
        let mut text = String::from("height (m)\n");
        for r in 0..30 {
            let row: Vec<String> = (0..30).map(|c| format!("{:e}", (r * 30 + c) as f64 * 1e-9)).collect();
            text.push_str(&row.join(" "));
            text.push('\n');
        }
        text.into_bytes()
    }

    /// A version 1.0 `.npy` file of zero-based counting `u8` values.
    fn npy_u8(shape: &[usize]) -> Vec<u8> {
        let dims: Vec<String> = shape.iter().map(usize::to_string).collect();
        let shape_str = match dims.as_slice() {
            [one] => format!("({one},)"),
            _ => format!("({})", dims.join(", ")),
        };
        let mut header = format!(
            "{{'descr': '|u1', 'fortran_order': False, 'shape': {shape_str}, }}"
        );
        while (10 + header.len() + 1) % 64 != 0 {
            header.push(' ');
        }
        header.push('\n');

        let mut out = b"\x93NUMPY\x01\x00".to_vec();
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        let n: usize = shape.iter().product();
        out.extend((0..n).map(|i| (i % 256) as u8));
        out
    }

    #[test]
    fn test_unknown_dataset() {
        let err = DataLoader::new().load("unknown_name").unwrap_err();
        match err {
            ImagePlotError::UnknownDataset { name, available } => {
                assert_eq!(name, "unknown_name");
                assert!(available.contains("polymer outliers"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_polymer_is_scaled_and_cached() {
        let (loader, calls) = loader("polymer", &[("PolymerImage.txt", polymer_text())]);
        let first = loader.load("polymer").unwrap().into_image().unwrap();
        let second = loader.load("polymer").unwrap().into_image().unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let gray = first.as_gray().unwrap();
        assert_eq!(gray.dim(), (30, 30));
        assert!((gray[[1, 0]] - 30.0).abs() < 1e-9);

        let outliers = loader.load("polymer outliers").unwrap().into_image().unwrap();
        assert_eq!(outliers.as_gray().unwrap()[[25, 25]], 80.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_checksum_mismatch_and_corrupt_cache() {
        let bytes = b"1 2\n3 4\n".to_vec();
        let (loader, calls) = loader("checksum", &[("Perovskite.txt", bytes.clone())]);
        let image = loader.load("fluorescence").unwrap().into_image().unwrap();
        assert_eq!(image.as_gray().unwrap()[[1, 0]], 3.0);

        // a damaged cache entry is fetched again
        fs::write(loader.cache_dir().join("Perovskite.txt"), b"garbage").unwrap();
        assert!(loader.load("fluorescence").is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let strict = loader.with_checksum("Perovskite.txt", &"0".repeat(64));
        let _ = fs::remove_dir_all(strict.cache_dir());
        assert!(matches!(
            strict.load("fluorescence"),
            Err(ImagePlotError::ChecksumMismatch { .. })
        ));
    }

    fn tiff_gray8(pages: &[Vec<u8>], width: u32, height: u32) -> Vec<u8> {
        use tiff::encoder::{TiffEncoder, colortype};
        let mut bytes = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut bytes)).unwrap();
            for page in pages {
                encoder
                    .write_image::<colortype::Gray8>(width, height, page)
                    .unwrap();
            }
        }
        bytes
    }

    #[test]
    fn test_cells_stack_is_transposed() {
        // value = page * 100 + row * 10 + column
        let pages: Vec<Vec<u8>> = (0..2u8)
            .map(|p| {
                (0..2u8)
                    .flat_map(|r| (0..3u8).map(move |c| p * 100 + r * 10 + c))
                    .collect()
            })
            .collect();
        let (loader, calls) = loader("cells", &[("cells.tif", tiff_gray8(&pages, 3, 2))]);
        let stack = loader.load("cells").unwrap().into_stack().unwrap();
        assert_eq!(stack.shape(), &[3, 2, 2]);
        assert_eq!(stack.data()[&[2, 1, 1][..]], 112.0);
        assert_eq!(stack.data()[&[1, 0, 1][..]], 101.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let single = tiff_gray8(&pages[..1], 3, 2);
        let plane = parse_tiff(&single).unwrap();
        assert_eq!(plane.shape(), &[2, 3]);
        assert!(matches!(parse_tiff(b"not a tiff"), Err(ImagePlotError::Decode(_))));
    }

    #[test]
    fn test_cifar10_stack_and_list() {
        let (loader, _) = loader("cifar10", &[("cifar10.npy", npy_u8(&[2, 32, 32, 3]))]);
        let stack = loader.load("cifar10").unwrap().into_stack().unwrap();
        assert_eq!(stack.shape(), &[2, 32, 32, 3]);
        assert_eq!(stack.data()[&[0, 0, 1, 0][..]], 3.0);

        let list = loader.load("cifar10 list").unwrap().into_list().unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|img| img.is_rgb() && img.height() == 32));
    }

    #[test]
    fn test_text_parsing_errors() {
        assert!(matches!(
            parse_text_matrix(b"1 2\n3\n", 0),
            Err(ImagePlotError::Decode(_))
        ));
        assert!(matches!(parse_text_matrix(b"header\n", 1), Err(ImagePlotError::Decode(_))));
        assert!(matches!(parse_text_matrix(b"1 x\n", 0), Err(ImagePlotError::Decode(_))));
    }
}
