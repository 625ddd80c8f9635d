//! Data acquisition: the Sheets loader, its time-boxed cache, and the
//! offline sample generator.

use std::time::Duration;

use crate::cli::RunArgs;
use crate::domain::RawTable;
use crate::error::AppError;

pub mod cache;
pub mod sample;
pub mod sheets;

pub use cache::MemoSlot;
pub use sample::generate_sample;
pub use sheets::SheetsClient;

/// Number of days of data produced by `--sample`.
const SAMPLE_DAYS: u32 = 42;

/// Where raw worksheet data comes from.
///
/// `load` is idempotent and side-effect-free on the data. For the live
/// source the raw fetch result is memoized per the cache TTL, so repeated
/// filter interactions do not hit the network.
pub enum DataSource {
    Sheets {
        client: SheetsClient,
        worksheet: String,
        cache: MemoSlot<RawTable>,
    },
    Sample {
        seed: u64,
    },
}

impl DataSource {
    pub fn from_args(args: &RunArgs) -> Result<Self, AppError> {
        if args.sample {
            return Ok(DataSource::Sample { seed: args.seed });
        }

        Ok(DataSource::Sheets {
            client: SheetsClient::from_env()?,
            worksheet: args.worksheet.clone(),
            cache: MemoSlot::new(Duration::from_secs(args.cache_ttl)),
        })
    }

    pub fn load(&mut self) -> Result<RawTable, AppError> {
        match self {
            DataSource::Sheets {
                client,
                worksheet,
                cache,
            } => cache.get_with(|| client.fetch_worksheet(worksheet)),
            DataSource::Sample { seed } => generate_sample(*seed, SAMPLE_DAYS),
        }
    }

    /// Force the next `load` to bypass the cache (TUI refresh key).
    pub fn invalidate(&mut self) {
        if let DataSource::Sheets { cache, .. } = self {
            cache.invalidate();
        }
    }

    /// Short label for headers and status lines.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Sheets { worksheet, .. } => format!("sheet '{worksheet}'"),
            DataSource::Sample { seed } => format!("sample data (seed {seed})"),
        }
    }
}
