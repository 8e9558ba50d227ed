use std::fmt::Display;

/// Options of an [`H264Stream`](crate::H264Stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Emit a `trace!` event for every bit cursor read and write.
    pub trace_bits: bool,

    /// Reject NAL headers that fail [`NalHeader::validate`](crate::NalHeader::validate).
    pub strict_nal_header: bool,

    /// Reject a zero `rbsp_stop_one_bit` and non-zero `cabac_zero_word`s
    /// instead of skipping them.
    pub strict_trailing_bits: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            trace_bits: false,
            strict_nal_header: true,
            strict_trailing_bits: false,
        }
    }
}

impl Display for StreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StreamConfig {{ trace_bits: {}, strict_nal_header: {}, strict_trailing_bits: {} }}",
            self.trace_bits, self.strict_nal_header, self.strict_trailing_bits
        )
    }
}

impl StreamConfig {
    /// Starts a builder from the default options.
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::default()
    }
}

/// Builder for [`StreamConfig`].
#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    /// Sets [`StreamConfig::trace_bits`].
    pub fn trace_bits(mut self, trace_bits: bool) -> Self {
        self.config.trace_bits = trace_bits;
        self
    }

    /// Sets [`StreamConfig::strict_nal_header`].
    pub fn strict_nal_header(mut self, strict_nal_header: bool) -> Self {
        self.config.strict_nal_header = strict_nal_header;
        self
    }

    /// Sets [`StreamConfig::strict_trailing_bits`].
    pub fn strict_trailing_bits(mut self, strict_trailing_bits: bool) -> Self {
        self.config.strict_trailing_bits = strict_trailing_bits;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> StreamConfig {
        self.config
    }
}
