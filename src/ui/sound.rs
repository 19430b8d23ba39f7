/// Sound engine: procedural chiptune tones and ambient music via rodio.
///
/// Every sound is synthesized into an in-memory WAV buffer. One-shot
/// tones are fire-and-forget (detached sinks). The ambient melody is a
/// single pre-mixed buffer repeated forever on its own sink, so it keeps
/// playing without any help from the game loop.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::sim::schedule::Waveform;

/// Ambient melody: (note frequency, seconds). One note every 400 ms.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const MELODY: [(f32, f32); 16] = [
    (329.63, 0.3), // E4
    (392.00, 0.3), // G4
    (440.00, 0.4), // A4
    (392.00, 0.2), // G4
    (329.63, 0.3), // E4
    (293.66, 0.5), // D4
    (329.63, 0.3), // E4
    (440.00, 0.3), // A4
    (493.88, 0.4), // B4
    (440.00, 0.2), // A4
    (392.00, 0.3), // G4
    (329.63, 0.5), // E4
    (293.66, 0.3), // D4
    (329.63, 0.3), // E4
    (392.00, 0.4), // G4
    (440.00, 0.6), // A4
];
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const NOTE_SLOT_SECS: f32 = 0.4;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    use super::{Waveform, MELODY, NOTE_SLOT_SECS};

    const SAMPLE_RATE: u32 = 22050;
    /// Per-note peak before the master volume.
    const NOTE_GAIN: f32 = 0.3;
    /// Exponential decay floor reached at the end of each note.
    const NOTE_FLOOR: f32 = 0.01;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        volume: f32,
        sfx_interact: Arc<Vec<u8>>,
        music: Arc<Vec<u8>>,
        ambient: Option<Sink>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new(volume: f32) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output ({e}); running silent");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                volume,
                sfx_interact: Arc::new(make_wav(&gen_tone(440.0, 0.1, Waveform::Sine))),
                music: Arc::new(make_wav(&gen_melody())),
                ambient: None,
            })
        }

        fn play(&self, buf: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(buf)) {
                    sink.set_volume(self.volume);
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_tone(&self, freq: f32, secs: f32, wave: Waveform) {
            self.play(make_wav(&gen_tone(freq, secs, wave)));
        }

        pub fn play_interact_effect(&self) {
            self.play(self.sfx_interact.as_ref().clone());
        }

        /// Start the looping melody. A loop that is already running keeps going.
        pub fn start_ambient_loop(&mut self) {
            if self.ambient.is_some() { return; }
            let sink = match Sink::try_new(&self.handle) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("ambient music unavailable: {e}");
                    return;
                }
            };
            match rodio::Decoder::new(Cursor::new(self.music.as_ref().clone())) {
                Ok(src) => {
                    sink.set_volume(self.volume);
                    sink.append(src.repeat_infinite());
                    self.ambient = Some(sink);
                    log::debug!("ambient music started");
                }
                Err(e) => log::warn!("ambient music decode failed: {e}"),
            }
        }

        pub fn stop_ambient_loop(&mut self) {
            if let Some(sink) = self.ambient.take() {
                sink.stop();
                log::debug!("ambient music stopped");
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn oscillator(wave: Waveform, phase: f32) -> f32 {
        let p = phase.fract();
        match wave {
            Waveform::Sine => (p * 2.0 * std::f32::consts::PI).sin(),
            Waveform::Square => if p < 0.5 { 1.0 } else { -1.0 },
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
        }
    }

    /// One note with an exponential fade from NOTE_GAIN to NOTE_FLOOR.
    pub(super) fn gen_tone(freq: f32, secs: f32, wave: Waveform) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * secs) as usize;
        let decay = (NOTE_FLOOR / NOTE_GAIN).ln();
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = NOTE_GAIN * (decay * i as f32 / n as f32).exp();
                oscillator(wave, t * freq) * env
            })
            .collect()
    }

    /// The whole melody as one loopable buffer: square lead plus a
    /// triangle bass an octave down. Notes that ring past the end of the
    /// loop wrap around to its start.
    pub(super) fn gen_melody() -> Vec<f32> {
        let slot = (SAMPLE_RATE as f32 * NOTE_SLOT_SECS) as usize;
        let total = slot * MELODY.len();
        let mut mix = vec![0.0_f32; total];
        for (i, &(freq, secs)) in MELODY.iter().enumerate() {
            let start = i * slot;
            let lead = gen_tone(freq, secs, Waveform::Square);
            let bass = gen_tone(freq / 2.0, secs * 0.8, Waveform::Triangle);
            for (j, s) in lead.iter().enumerate() {
                mix[(start + j) % total] += s;
            }
            for (j, s) in bass.iter().enumerate() {
                mix[(start + j) % total] += s;
            }
        }
        mix
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn tone_length_and_envelope() {
            let s = gen_tone(440.0, 0.1, Waveform::Square);
            assert_eq!(s.len(), 2205);
            assert!((s[0].abs() - NOTE_GAIN).abs() < 1e-4);
            assert!(s[s.len() - 1].abs() < 0.02);
            assert!(s.iter().all(|v| v.abs() <= NOTE_GAIN + 1e-4));
        }

        #[test]
        fn oscillators_stay_in_range() {
            for wave in [Waveform::Sine, Waveform::Square, Waveform::Triangle] {
                for i in 0..100 {
                    let v = oscillator(wave, i as f32 * 0.013);
                    assert!((-1.0..=1.0).contains(&v), "{wave:?} {v}");
                }
            }
            assert_eq!(oscillator(Waveform::Triangle, 0.5), 1.0);
            assert_eq!(oscillator(Waveform::Triangle, 0.0), -1.0);
        }

        #[test]
        fn melody_is_sixteen_slots() {
            let m = gen_melody();
            let slot = (SAMPLE_RATE as f32 * NOTE_SLOT_SECS) as usize;
            assert_eq!(m.len(), slot * 16);
        }

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&[0.0, 0.5, -0.5, 2.0]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 8);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
            // Out-of-range samples clamp to full scale.
            assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_volume: f32) -> Option<Self> { Some(SoundEngine) }
    pub fn play_tone(&self, _freq: f32, _secs: f32, _wave: Waveform) {}
    pub fn play_interact_effect(&self) {}
    pub fn start_ambient_loop(&mut self) {}
    pub fn stop_ambient_loop(&mut self) {}
}
