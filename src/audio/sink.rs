use crate::audio::buffer::AudioBuffer;

/// Output device supplied by the host shell.
pub trait AudioSink: Send + Sync {
    fn play(&self, buffer: &AudioBuffer);
}

/// Discards everything. Useful for headless runs.
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&self, _buffer: &AudioBuffer) {}
}

impl<F> AudioSink for F
where
    F: Fn(&AudioBuffer) + Send + Sync,
{
    fn play(&self, buffer: &AudioBuffer) {
        self(buffer)
    }
}
