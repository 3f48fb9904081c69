//! The session recorder: counter, encoder, and log under one lock.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::debug;

use veer_codec::FrameEncoder;
use veer_core::CameraFrame;

use crate::error::RecordError;
use crate::log::SteeringLog;
use crate::{frame_filename, STEERING_LOG_NAME};

/// A recorder shared between the session thread and the capture
/// callback. Every capture and the final finish take this single lock.
pub type SharedRecorder = Arc<Mutex<Recorder>>;

/// Wrap a recorder for sharing with a capture callback.
pub fn shared(recorder: Recorder) -> SharedRecorder {
    Arc::new(Mutex::new(recorder))
}

/// Lifecycle of a [`Recorder`]. One-way: once finished, a recorder
/// accepts nothing further.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecorderState {
    Recording,
    Finished,
}

/// One successfully persisted capture.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrame {
    /// Zero-based frame index within the session.
    pub index: u64,
    /// The image file name, e.g. `image_000000.png`.
    pub filename: String,
    /// Full path of the written image.
    pub path: PathBuf,
    /// The steering label written alongside it.
    pub steering: f32,
}

/// Totals reported when a recorder finishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSummary {
    /// Number of frames persisted.
    pub frames: u64,
    /// The dataset directory.
    pub directory: PathBuf,
    /// Path of the steering log.
    pub log_path: PathBuf,
}

/// Owns the output directory, the frame counter, the encoder, and the
/// steering log for one session.
///
/// [`record`](Recorder::record) performs the whole per-capture sequence
/// — name the file, encode the image, append the log row, advance the
/// counter — so holding the recorder lock around it makes the sequence
/// one critical section. A failed step advances nothing and removes any
/// partial image, keeping row count equal to image count.
pub struct Recorder {
    directory: PathBuf,
    log_path: PathBuf,
    encoder: Box<dyn FrameEncoder>,
    log: SteeringLog<File>,
    next_index: u64,
    state: RecorderState,
}

impl Recorder {
    /// Create the output directory (if absent) and open a fresh
    /// steering log inside it.
    ///
    /// An existing log at the same path is truncated: a session owns
    /// its directory for the duration of the run.
    pub fn create(
        directory: impl Into<PathBuf>,
        encoder: Box<dyn FrameEncoder>,
    ) -> Result<Self, RecordError> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        let log_path = directory.join(STEERING_LOG_NAME);
        let log = SteeringLog::new(File::create(&log_path)?)?;
        Ok(Self {
            directory,
            log_path,
            encoder,
            log,
            next_index: 0,
            state: RecorderState::Recording,
        })
    }

    /// Persist one capture: image file plus steering row.
    pub fn record(
        &mut self,
        frame: &CameraFrame,
        steering_angle: f32,
    ) -> Result<RecordedFrame, RecordError> {
        if self.state == RecorderState::Finished {
            return Err(RecordError::Finished);
        }

        let filename = frame_filename(self.next_index);
        let path = self.directory.join(&filename);
        if let Err(e) = self.encoder.encode_to_path(frame, &path) {
            // The encoder may have created the file before failing.
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        if let Err(e) = self.log.append(&filename, steering_angle) {
            // The row never landed; drop the orphan image as well.
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        let recorded = RecordedFrame {
            index: self.next_index,
            filename,
            path,
            steering: steering_angle,
        };
        self.next_index += 1;
        debug!(
            filename = %recorded.filename,
            steering_angle,
            "saved frame"
        );
        Ok(recorded)
    }

    /// Number of frames persisted so far.
    pub fn frames_recorded(&self) -> u64 {
        self.next_index
    }

    /// Whether [`finish`](Recorder::finish) has run.
    pub fn is_finished(&self) -> bool {
        self.state == RecorderState::Finished
    }

    /// The dataset directory.
    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    /// The encoding strategy in use, for logs.
    pub fn encoder_name(&self) -> &'static str {
        self.encoder.name()
    }

    /// Flush the log and close out the recorder.
    ///
    /// Exactly-once: a second call fails with
    /// [`RecordError::Finished`], as does any capture arriving after
    /// this returns.
    pub fn finish(&mut self) -> Result<RecordSummary, RecordError> {
        if self.state == RecorderState::Finished {
            return Err(RecordError::Finished);
        }
        self.log.flush()?;
        self.state = RecorderState::Finished;
        Ok(RecordSummary {
            frames: self.next_index,
            directory: self.directory.clone(),
            log_path: self.log_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use veer_codec::Encoding;
    use veer_test_utils::TempDir;

    fn test_frame(width: u32, height: u32, fill: u8) -> CameraFrame {
        CameraFrame {
            frame: 0,
            timestamp: 0.0,
            width,
            height,
            data: vec![fill; (width * height * 4) as usize],
        }
    }

    fn new_recorder(dir: &TempDir) -> Recorder {
        Recorder::create(dir.path(), Encoding::StripAlpha.encoder()).unwrap()
    }

    fn read_log(dir: &TempDir) -> Vec<String> {
        let text = fs::read_to_string(dir.path().join(STEERING_LOG_NAME)).unwrap();
        text.lines().map(str::to_string).collect()
    }

    fn image_count(dir: &TempDir) -> usize {
        fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".png"))
            .count()
    }

    #[test]
    fn create_writes_header_immediately() {
        let dir = TempDir::new("recorder-header").unwrap();
        let _recorder = new_recorder(&dir);
        assert_eq!(read_log(&dir), ["image_filename,steering_angle"]);
    }

    #[test]
    fn row_count_tracks_image_count() {
        let dir = TempDir::new("recorder-rows").unwrap();
        let mut recorder = new_recorder(&dir);
        for i in 0..5 {
            recorder
                .record(&test_frame(4, 3, i as u8), i as f32 / 10.0)
                .unwrap();
        }
        let summary = recorder.finish().unwrap();
        assert_eq!(summary.frames, 5);
        assert_eq!(image_count(&dir), 5);
        assert_eq!(read_log(&dir).len(), 6); // header + 5 rows
    }

    #[test]
    fn filenames_are_sequential_with_no_gaps() {
        let dir = TempDir::new("recorder-seq").unwrap();
        let mut recorder = new_recorder(&dir);
        for i in 0..3 {
            let rec = recorder.record(&test_frame(2, 2, 0), 0.1 * i as f32).unwrap();
            assert_eq!(rec.index, i);
            assert_eq!(rec.filename, frame_filename(i));
        }
        recorder.finish().unwrap();
        let rows = read_log(&dir);
        for (n, row) in rows.iter().skip(1).enumerate() {
            assert!(row.starts_with(&frame_filename(n as u64)));
        }
    }

    #[test]
    fn failed_capture_advances_nothing() {
        let dir = TempDir::new("recorder-fail").unwrap();
        let mut recorder = new_recorder(&dir);

        let malformed = CameraFrame {
            frame: 0,
            timestamp: 0.0,
            width: 4,
            height: 4,
            data: vec![0; 10],
        };
        let err = recorder.record(&malformed, 0.5).unwrap_err();
        assert!(matches!(err, RecordError::Codec(_)));
        assert_eq!(recorder.frames_recorded(), 0);
        assert_eq!(image_count(&dir), 0);

        // The next good frame still gets index zero.
        let rec = recorder.record(&test_frame(4, 4, 7), 0.5).unwrap();
        assert_eq!(rec.filename, "image_000000.png");
    }

    #[test]
    fn finish_is_exactly_once() {
        let dir = TempDir::new("recorder-finish").unwrap();
        let mut recorder = new_recorder(&dir);
        recorder.record(&test_frame(2, 2, 1), 0.15).unwrap();

        let summary = recorder.finish().unwrap();
        assert_eq!(summary.frames, 1);
        assert!(matches!(recorder.finish(), Err(RecordError::Finished)));
        assert!(matches!(
            recorder.record(&test_frame(2, 2, 1), 0.0),
            Err(RecordError::Finished)
        ));
    }

    #[test]
    fn steering_value_lands_verbatim() {
        let dir = TempDir::new("recorder-steer").unwrap();
        let mut recorder = new_recorder(&dir);
        recorder.record(&test_frame(2, 2, 3), 0.15).unwrap();
        recorder.finish().unwrap();
        assert_eq!(read_log(&dir)[1], "image_000000.png,0.15");
    }

    #[test]
    fn shared_recorder_is_usable_through_the_lock() {
        let dir = TempDir::new("recorder-shared").unwrap();
        let recorder = shared(new_recorder(&dir));
        {
            let mut guard = recorder.lock().unwrap();
            guard.record(&test_frame(2, 2, 9), -0.25).unwrap();
        }
        let frames = recorder.lock().unwrap().frames_recorded();
        assert_eq!(frames, 1);
    }
}
