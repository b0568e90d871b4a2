use crate::error::Result;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const OUTPUT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

pub type BoxedWriter = Box<dyn Write + Send>;

/// Buffered writer for an output path, or stdout for `None` / `-`
pub fn create_writer(output_path: Option<&Path>) -> Result<BoxedWriter> {
    match output_path {
        Some(path) if path.as_os_str() != "-" => {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?;
            Ok(Box::new(BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, file)))
        }
        _ => Ok(Box::new(BufWriter::with_capacity(
            OUTPUT_BUFFER_SIZE,
            io::stdout(),
        ))),
    }
}

pub fn format_bp(bp: usize) -> String {
    if bp >= 1_000_000_000 {
        format!("{:.1}Gbp", bp as f64 / 1_000_000_000.0)
    } else if bp >= 1_000_000 {
        format!("{:.1}Mbp", bp as f64 / 1_000_000.0)
    } else if bp >= 1_000 {
        format!("{:.1}Kbp", bp as f64 / 1_000.0)
    } else {
        format!("{}bp", bp)
    }
}
