//! Report output modules.
//!
//! Rendering and file output for [`crate::reports::CrmReport`].

pub mod generator;

pub use generator::{
    generate_csv_buckets, generate_json_report, generate_markdown_report, write_json_report,
    write_report,
};
