//! Price source adapters
//!
//! Sources:
//! - CoinGecko simple/contract price API
//! - Uniswap V2 pair reserves over JSON-RPC
//!
//! [`SourceSet`] queries every registered source concurrently, each under a
//! timeout, and hands back one quote per source. Failures never escape as
//! errors; they come back as invalid quotes for the aggregator to count.

pub mod coingecko;
pub mod dex;
pub mod feeds;
pub mod rpc;

pub use coingecko::CoinGeckoSource;
pub use dex::DexSource;
pub use feeds::{PriceSource, SourceSet};
