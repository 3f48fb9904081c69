//! The steering log: one CSV row per captured frame.

use std::io::Write;

use crate::error::RecordError;

/// The CSV header row, written once at creation.
pub const HEADER: [&str; 2] = ["image_filename", "steering_angle"];

/// Appends `(image_filename, steering_angle)` rows to a CSV sink.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code writes to a file. The header is written and flushed on
/// construction, so a log with zero captures still reads back as
/// exactly the header row.
///
/// # Examples
///
/// ```
/// use veer_record::SteeringLog;
///
/// let mut buf = Vec::new();
/// {
///     let mut log = SteeringLog::new(&mut buf).unwrap();
///     log.append("image_000000.png", 0.15).unwrap();
///     log.append("image_000001.png", -0.4).unwrap();
///     assert_eq!(log.rows_written(), 2);
///     log.flush().unwrap();
/// }
/// let text = String::from_utf8(buf).unwrap();
/// assert_eq!(
///     text,
///     "image_filename,steering_angle\nimage_000000.png,0.15\nimage_000001.png,-0.4\n"
/// );
/// ```
pub struct SteeringLog<W: Write> {
    writer: csv::Writer<W>,
    rows_written: u64,
}

impl<W: Write> SteeringLog<W> {
    /// Create a new log, immediately writing and flushing the header.
    pub fn new(sink: W) -> Result<Self, RecordError> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append one data row.
    ///
    /// The steering value is serialized with Rust's shortest-roundtrip
    /// float formatting, so `0.15f32` lands in the file as `0.15`.
    pub fn append(&mut self, image_filename: &str, steering_angle: f32) -> Result<(), RecordError> {
        self.writer
            .write_record([image_filename, &steering_angle.to_string()])?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush buffered rows to the sink.
    pub fn flush(&mut self) -> Result<(), RecordError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of data rows appended so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_is_exactly_the_header() {
        let mut buf = Vec::new();
        {
            let mut log = SteeringLog::new(&mut buf).unwrap();
            log.flush().unwrap();
            assert_eq!(log.rows_written(), 0);
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "image_filename,steering_angle\n");
    }

    #[test]
    fn header_is_on_disk_before_any_append() {
        // The flush happens inside new(); no explicit flush afterwards.
        let mut buf = Vec::new();
        let log = SteeringLog::new(&mut buf);
        drop(log);
        assert!(String::from_utf8(buf)
            .unwrap()
            .starts_with("image_filename,steering_angle"));
    }

    #[test]
    fn rows_preserve_arrival_order() {
        let mut buf = Vec::new();
        {
            let mut log = SteeringLog::new(&mut buf).unwrap();
            for (i, steer) in [0.0f32, 0.25, -0.5].iter().enumerate() {
                log.append(&crate::frame_filename(i as u64), *steer).unwrap();
            }
            log.flush().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "image_filename,steering_angle",
                "image_000000.png,0",
                "image_000001.png,0.25",
                "image_000002.png,-0.5",
            ]
        );
    }
}
