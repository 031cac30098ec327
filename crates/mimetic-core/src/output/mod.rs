//! Output
//!
//! Graph files in and out, and report rendering.

pub mod format;
pub mod io;

pub use format::{format_cascade, format_contagion, report_base_name, ReportFormat};
pub use io::{load_graph, parse_sign, save_graph, save_graph_as, GraphFormat, GraphIoError};
