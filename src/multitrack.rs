use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::audio::{AudioCapture, AudioPlayback, RingBuffer, play_blocking};
use crate::config::AudioConfig;
use crate::error::{Result, VocalsError};
use crate::pitch;
use crate::tone;
use crate::wav::{load_wav, save_wav};

/// A selected region: (track, start sample, end sample).
type Region = (usize, usize, usize);

const DRAIN_INTERVAL: Duration = Duration::from_millis(20);

/// Options for recording a take onto the selected track.
#[derive(Debug, Clone, Default)]
pub struct TakeOptions {
    /// Take length in seconds
    pub duration: f32,
    /// Countdown in seconds before recording starts
    pub countdown: u32,
    /// Mute the destination track in the backing mix while recording over it
    pub punch_in: bool,
    /// Tracks to play back while recording, keeping the take in sync
    pub play_tracks: Option<Vec<usize>>,
    /// Metronome tempo mixed into the backing playback
    pub metronome_bpm: Option<u32>,
    /// Reference tone played before the take starts
    pub reference_freq: Option<f32>,
    /// Substring match against input device descriptions
    pub device: Option<String>,
}

/// Multi track recorder supporting seek, punch-in recording, clipboard
/// editing, and a take library.
///
/// Tracks are mono sample vectors at a fixed session sample rate. Recording
/// captures through the same ring-buffer hand-off as the one-shot recorder,
/// optionally while playing a mix of backing tracks.
pub struct MultiTrackRecorder {
    audio: AudioConfig,
    tracks: Vec<Vec<f32>>,
    selected_track: usize,
    position: usize,
    selection: Option<Region>,
    clipboard: Vec<f32>,
    take_library: HashMap<Region, Vec<Vec<f32>>>,
}

impl MultiTrackRecorder {
    pub fn new(num_tracks: usize, audio: AudioConfig) -> Self {
        Self {
            audio,
            tracks: vec![Vec::new(); num_tracks],
            selected_track: 0,
            position: 0,
            selection: None,
            clipboard: Vec::new(),
            take_library: HashMap::new(),
        }
    }

    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    pub fn selected_track(&self) -> usize {
        self.selected_track
    }

    /// Current play/record position in samples.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn track(&self, index: usize) -> Result<&[f32]> {
        self.check_track(index)?;
        Ok(&self.tracks[index])
    }

    /// Replace a track's contents, e.g. with programmatically built audio.
    pub fn set_track(&mut self, index: usize, samples: Vec<f32>) -> Result<()> {
        self.check_track(index)?;
        self.tracks[index] = samples;
        Ok(())
    }

    /// Select track `index` for recording and playback.
    pub fn select_track(&mut self, index: usize) -> Result<()> {
        self.check_track(index)?;
        self.selected_track = index;
        self.position = 0;
        Ok(())
    }

    /// Seek to a position in seconds, zero-padding the selected track out to
    /// it if needed.
    pub fn seek(&mut self, seconds: f32) -> Result<()> {
        if seconds < 0.0 {
            return Err(VocalsError::InvalidSelection(
                "seek position must be non-negative".into(),
            ));
        }
        self.position = self.samples_at(seconds);
        self.ensure_length(self.selected_track, self.position);
        Ok(())
    }

    fn samples_at(&self, seconds: f32) -> usize {
        (seconds * self.audio.sample_rate as f32) as usize
    }

    fn check_track(&self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(VocalsError::InvalidTrack(index));
        }
        Ok(())
    }

    fn ensure_length(&mut self, track_index: usize, length: usize) {
        let track = &mut self.tracks[track_index];
        if track.len() < length {
            track.resize(length, 0.0);
        }
    }

    /// Record for `options.duration` seconds onto the selected track at the
    /// current position.
    ///
    /// When `play_tracks` is set, those tracks are mixed and played while
    /// capturing so the new take stays in sync with existing material; with
    /// `punch_in` the destination track is muted in that mix so old audio
    /// does not play over the new take. A metronome and a reference tone
    /// help vocalists keep time and pitch.
    pub fn record(&mut self, options: &TakeOptions) -> Result<()> {
        if options.countdown > 0 {
            tone::countdown(options.countdown, self.audio.sample_rate)?;
        }
        if let Some(freq) = options.reference_freq {
            tone::beep(freq, self.audio.sample_rate, tone::BEEP_SECS)?;
        }

        let frames = self.samples_at(options.duration);
        let start = self.position;
        let end = start + frames;
        self.ensure_length(self.selected_track, end);

        let backing = self.build_backing_mix(frames, start, options)?;
        let take = self.capture_take(frames, backing, options.device.as_deref())?;

        self.tracks[self.selected_track][start..end].copy_from_slice(&take);
        self.position = end;
        Ok(())
    }

    /// Mix of backing tracks and metronome clicks to play during a take, or
    /// `None` when the take records dry.
    fn build_backing_mix(
        &self,
        frames: usize,
        start: usize,
        options: &TakeOptions,
    ) -> Result<Option<Vec<f32>>> {
        let mut mix: Option<Vec<f32>> = None;

        if let Some(ref play_tracks) = options.play_tracks {
            let mut buffer = vec![0.0f32; frames];
            for &index in play_tracks {
                self.check_track(index)?;
                if index == self.selected_track && options.punch_in {
                    continue;
                }
                let track = &self.tracks[index];
                if start < track.len() {
                    let seg_end = (start + frames).min(track.len());
                    for (i, &sample) in track[start..seg_end].iter().enumerate() {
                        buffer[i] += sample;
                    }
                }
            }
            mix = Some(buffer);
        }

        if let Some(bpm) = options.metronome_bpm {
            let buffer = mix.get_or_insert_with(|| vec![0.0f32; frames]);
            let interval = (self.audio.sample_rate as f32 * 60.0 / bpm.max(1) as f32) as usize;
            let click = tone::click(self.audio.sample_rate);
            let mut at = 0;
            while at < frames {
                let seg_end = (at + click.len()).min(frames);
                for (i, &sample) in click[..seg_end - at].iter().enumerate() {
                    buffer[at + i] += sample;
                }
                at += interval.max(1);
            }
        }

        Ok(mix)
    }

    /// Capture `frames` mono samples, optionally while playing a backing mix.
    fn capture_take(
        &self,
        frames: usize,
        backing: Option<Vec<f32>>,
        device: Option<&str>,
    ) -> Result<Vec<f32>> {
        let channels = self.audio.channels.max(1) as usize;
        let buffer = Arc::new(Mutex::new(RingBuffer::new(self.audio.ring_capacity())?));
        let capture = AudioCapture::new(&self.audio, Arc::clone(&buffer), device)?;

        let _backing = match backing {
            Some(mix) => Some(AudioPlayback::start(mix, self.audio.sample_rate, 1)?),
            None => None,
        };

        let needed = frames * channels;
        let duration = Duration::from_secs_f32(frames as f32 / self.audio.sample_rate as f32);
        let deadline = Instant::now() + duration + Duration::from_secs(2);
        let mut captured = Vec::with_capacity(needed);

        while captured.len() < needed {
            if Instant::now() >= deadline {
                log::warn!(
                    "Capture fell short: {} of {} samples",
                    captured.len(),
                    needed
                );
                break;
            }
            thread::sleep(DRAIN_INTERVAL);
            let remaining = needed - captured.len();
            captured.extend(buffer.lock().pop(remaining));
        }

        drop(capture);

        // Tracks are mono: keep channel 0 of the interleaved input.
        let mut take: Vec<f32> = captured.chunks(channels).map(|frame| frame[0]).collect();
        take.resize(frames, 0.0);
        Ok(take)
    }

    /// Play the mix of all tracks from the current position, for `duration`
    /// seconds if given or to the end of the longest track otherwise.
    pub fn play(&mut self, duration: Option<f32>) -> Result<()> {
        let max_len = self.tracks.iter().map(|t| t.len()).max().unwrap_or(0);
        let end = match duration {
            None => max_len,
            Some(seconds) => (self.position + self.samples_at(seconds)).min(max_len),
        };
        if end <= self.position {
            return Ok(());
        }

        let mix = self.mix_range(self.position, end);
        play_blocking(mix, self.audio.sample_rate, 1)?;
        self.position = end;
        Ok(())
    }

    fn mix_range(&self, start: usize, end: usize) -> Vec<f32> {
        let mut mix = vec![0.0f32; end - start];
        for track in &self.tracks {
            if start < track.len() {
                let seg_end = end.min(track.len());
                for (i, &sample) in track[start..seg_end].iter().enumerate() {
                    mix[i] += sample;
                }
            }
        }
        mix
    }

    // Editing ---------------------------------------------------------------

    /// Select a region on a track between two positions in seconds.
    pub fn select_range(
        &mut self,
        start_seconds: f32,
        end_seconds: f32,
        track_index: Option<usize>,
    ) -> Result<()> {
        if start_seconds < 0.0 || end_seconds <= start_seconds {
            return Err(VocalsError::InvalidSelection(format!(
                "{}..{}",
                start_seconds, end_seconds
            )));
        }
        let track = track_index.unwrap_or(self.selected_track);
        self.check_track(track)?;

        let start = self.samples_at(start_seconds);
        let end = self.samples_at(end_seconds);
        self.ensure_length(track, end);
        self.selection = Some((track, start, end));
        self.position = start;
        Ok(())
    }

    /// Copy the selected audio to the clipboard.
    pub fn copy(&mut self) -> Result<()> {
        let (track, start, end) = self.selection.ok_or(VocalsError::NothingSelected)?;
        self.clipboard = self.tracks[track][start..end].to_vec();
        Ok(())
    }

    /// Cut the selected audio to the clipboard, closing the gap.
    pub fn cut(&mut self) -> Result<()> {
        let (track, start, end) = self.selection.ok_or(VocalsError::NothingSelected)?;
        self.clipboard = self.tracks[track][start..end].to_vec();
        self.tracks[track].drain(start..end);
        self.position = start;
        self.selection = None;
        Ok(())
    }

    /// Insert clipboard audio into a track at the current position.
    pub fn paste(&mut self, track_index: Option<usize>) -> Result<()> {
        if self.clipboard.is_empty() {
            return Ok(());
        }
        let track = track_index.unwrap_or(self.selected_track);
        self.check_track(track)?;
        self.ensure_length(track, self.position);

        let clip = self.clipboard.clone();
        let at = self.position;
        self.tracks[track].splice(at..at, clip);
        self.position += self.clipboard.len();
        Ok(())
    }

    /// Move the selected audio to another track, at `position_seconds` if
    /// given or the cut point otherwise.
    pub fn move_selection(
        &mut self,
        to_track_index: usize,
        position_seconds: Option<f32>,
    ) -> Result<()> {
        // Validate the destination before the cut mutates anything.
        self.check_track(to_track_index)?;
        if position_seconds.is_some_and(|s| s < 0.0) {
            return Err(VocalsError::InvalidSelection(
                "paste position must be non-negative".into(),
            ));
        }

        self.cut()?;
        if let Some(seconds) = position_seconds {
            self.position = self.samples_at(seconds);
        }
        self.selected_track = to_track_index;
        self.paste(None)
    }

    // Import/Export ---------------------------------------------------------

    /// Load a mono WAV file into a track, replacing its contents.
    pub fn import_wav<P: AsRef<Path>>(&mut self, path: P, track_index: Option<usize>) -> Result<()> {
        let track = track_index.unwrap_or(self.selected_track);
        self.check_track(track)?;

        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if extension != "wav" {
            return Err(VocalsError::UnsupportedFormat(extension));
        }

        let (samples, spec) = load_wav(&path)?;
        if spec.channels != self.audio.channels {
            return Err(VocalsError::ChannelMismatch {
                expected: self.audio.channels,
                actual: spec.channels,
            });
        }
        if spec.sample_rate != self.audio.sample_rate {
            return Err(VocalsError::SampleRateMismatch {
                expected: self.audio.sample_rate,
                actual: spec.sample_rate,
            });
        }

        self.tracks[track] = samples;
        self.position = 0;
        Ok(())
    }

    /// Mix tracks and export to a 16-bit PCM WAV file.
    pub fn export_wav<P: AsRef<Path>>(
        &self,
        path: P,
        track_indices: Option<&[usize]>,
    ) -> Result<()> {
        let mix = self.mix_tracks(track_indices)?;
        save_wav(path, &mix, self.audio.sample_rate, 1)
    }

    /// Mix of the given tracks, or of all tracks.
    pub fn mix_tracks(&self, track_indices: Option<&[usize]>) -> Result<Vec<f32>> {
        let indices: Vec<usize> = match track_indices {
            Some(list) => {
                for &index in list {
                    self.check_track(index)?;
                }
                list.to_vec()
            }
            None => (0..self.tracks.len()).collect(),
        };

        let max_len = indices
            .iter()
            .map(|&i| self.tracks[i].len())
            .max()
            .unwrap_or(0);
        let mut mix = vec![0.0f32; max_len];
        for &index in &indices {
            for (i, &sample) in self.tracks[index].iter().enumerate() {
                mix[i] += sample;
            }
        }
        Ok(mix)
    }

    // Take library -----------------------------------------------------------

    /// Store the currently selected audio segment in the take library.
    pub fn add_selection_to_library(&mut self) -> Result<()> {
        let region = self.selection.ok_or(VocalsError::NothingSelected)?;
        let (track, start, end) = region;
        let take = self.tracks[track][start..end].to_vec();
        self.take_library.entry(region).or_default().push(take);
        Ok(())
    }

    /// All stored takes for the currently selected region.
    pub fn list_takes(&self) -> Result<&[Vec<f32>]> {
        let region = self.selection.ok_or(VocalsError::NothingSelected)?;
        Ok(self
            .take_library
            .get(&region)
            .map(|takes| takes.as_slice())
            .unwrap_or(&[]))
    }

    /// Replace the selected region with the take at `index`.
    pub fn apply_take(&mut self, index: usize) -> Result<()> {
        let region = self.selection.ok_or(VocalsError::NothingSelected)?;
        let take = self
            .take_library
            .get(&region)
            .and_then(|takes| takes.get(index))
            .cloned()
            .ok_or(VocalsError::InvalidTake(index))?;

        let (track, start, end) = region;
        self.tracks[track][start..end].copy_from_slice(&take);
        Ok(())
    }

    /// Record a fresh punch-in take for the selected region and store it.
    pub fn record_take(&mut self, options: &TakeOptions) -> Result<()> {
        let (track, start, end) = self.selection.ok_or(VocalsError::NothingSelected)?;
        self.selected_track = track;
        self.position = start;

        let mut take_options = options.clone();
        take_options.duration = (end - start) as f32 / self.audio.sample_rate as f32;
        take_options.punch_in = true;

        self.record(&take_options)?;
        self.add_selection_to_library()
    }

    /// Pitch range of a track via the pitch estimator.
    pub fn pitch_range(&self, track_index: Option<usize>) -> Result<Option<(f32, f32)>> {
        let track = track_index.unwrap_or(self.selected_track);
        self.check_track(track)?;
        Ok(pitch::pitch_range(
            &self.tracks[track],
            self.audio.sample_rate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(num_tracks: usize, sample_rate: u32) -> MultiTrackRecorder {
        let audio = AudioConfig {
            sample_rate,
            ..AudioConfig::default()
        };
        MultiTrackRecorder::new(num_tracks, audio)
    }

    #[test]
    fn backing_mix_includes_played_tracks() {
        let mut rec = session(2, 4);
        rec.set_track(0, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        rec.select_track(1).unwrap();

        let options = TakeOptions {
            play_tracks: Some(vec![0]),
            ..TakeOptions::default()
        };
        let mix = rec.build_backing_mix(4, 0, &options).unwrap().unwrap();
        assert_eq!(mix, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn backing_mix_punch_in_mutes_destination() {
        let mut rec = session(2, 4);
        rec.set_track(0, vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        rec.set_track(1, vec![2.0, 2.0, 2.0, 2.0]).unwrap();
        rec.select_track(1).unwrap();

        let options = TakeOptions {
            punch_in: true,
            play_tracks: Some(vec![0, 1]),
            ..TakeOptions::default()
        };
        let mix = rec.build_backing_mix(4, 0, &options).unwrap().unwrap();
        // Track 1 is being recorded over, so only track 0 plays.
        assert_eq!(mix, vec![1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn backing_mix_metronome_clicks_at_tempo() {
        let rec = session(1, 100);
        let options = TakeOptions {
            metronome_bpm: Some(120),
            ..TakeOptions::default()
        };

        // 120 bpm at 100 Hz: clicks every 50 samples, each 5 samples long.
        let mix = rec.build_backing_mix(100, 0, &options).unwrap().unwrap();
        assert!(mix[1].abs() > 0.0 || mix[2].abs() > 0.0);
        assert!(mix[51].abs() > 0.0 || mix[52].abs() > 0.0);
        assert!(mix[10..50].iter().all(|&s| s == 0.0));
        assert!(mix[60..100].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn backing_mix_dry_take_is_none() {
        let rec = session(1, 100);
        let options = TakeOptions::default();
        assert!(rec.build_backing_mix(100, 0, &options).unwrap().is_none());
    }

    #[test]
    fn backing_mix_invalid_track_rejected() {
        let rec = session(1, 100);
        let options = TakeOptions {
            play_tracks: Some(vec![3]),
            ..TakeOptions::default()
        };
        assert!(matches!(
            rec.build_backing_mix(10, 0, &options),
            Err(VocalsError::InvalidTrack(3))
        ));
    }
}
