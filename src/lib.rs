pub mod config;
pub mod error;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod primers;
pub mod reader;
pub mod record;
pub mod recovery;
pub mod report;
pub mod store;
pub mod tools;
pub mod writer;

pub use config::Config;
pub use error::{AnnotError, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use record::{ReadRecord, Tri};
pub use store::ReadStore;
pub use tools::{SystemToolchain, Toolchain};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_parsing() {
        let info = store::parse_header("read1;barcodelabel=BC01_SampleA;ccs=5").unwrap();
        assert_eq!(info.barcode, "BC01");
        assert_eq!(info.sample, "SampleA");
        assert_eq!(info.ccs, 5);
    }
}
