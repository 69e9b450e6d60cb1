//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "trackwav";

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "TRACKWAV_CONFIG";

/// Default timing tolerance in seconds before a block is flagged early or late.
pub const DEFAULT_JITTER_THRESHOLD: f64 = 0.01;

/// Extension appended to the output path for the JSON summary.
pub const SUMMARY_EXTENSION: &str = "json";

/// Width of the zero-padded per-stream sequence number in segment file names.
pub const SEQUENCE_WIDTH: usize = 4;

/// RIFF/WAV layout constants.
pub mod wav {
    /// Size of the canonical WAV header in bytes.
    pub const HEADER_SIZE: u64 = 44;

    /// Offset of the RIFF size field.
    pub const RIFF_SIZE_OFFSET: u64 = 4;

    /// Offset of the data chunk size field.
    pub const DATA_SIZE_OFFSET: u64 = 40;

    /// Bytes counted by the RIFF size besides the data payload.
    pub const RIFF_SIZE_BASE: u64 = 36;

    /// Size of the PCM `fmt ` chunk payload.
    pub const FMT_CHUNK_SIZE: u32 = 16;

    /// Maximum file size (exclusive) before a forced rollover.
    pub const SIZE_CAP: u64 = 1 << 32;

    /// File extension of WAV segments.
    pub const EXTENSION: &str = "wav";
}

/// Sony Wave64 layout constants.
pub mod w64 {
    /// Size of the Wave64 header in bytes.
    pub const HEADER_SIZE: u64 = 104;

    /// Offset of the riff chunk size field.
    pub const RIFF_SIZE_OFFSET: u64 = 16;

    /// Offset of the data chunk size field.
    pub const DATA_SIZE_OFFSET: u64 = 96;

    /// Size of a chunk header (GUID + 64-bit size).
    pub const CHUNK_HEADER_SIZE: u64 = 24;

    /// Maximum file size (exclusive) before a forced rollover.
    pub const SIZE_CAP: u64 = 1 << 40;

    /// File extension of Wave64 segments.
    pub const EXTENSION: &str = "w64";

    /// `riff` chunk GUID.
    pub const RIFF_GUID: [u8; 16] = [
        0x72, 0x69, 0x66, 0x66, 0x2E, 0x91, 0xCF, 0x11, 0xA5, 0xD6, 0x28, 0xDB, 0x04, 0xC1, 0x00,
        0x00,
    ];

    /// `wave` form GUID.
    pub const WAVE_GUID: [u8; 16] = [
        0x77, 0x61, 0x76, 0x65, 0xF3, 0xAC, 0xD3, 0x11, 0x8C, 0xD1, 0x00, 0xC0, 0x4F, 0x8E, 0xDB,
        0x8A,
    ];

    /// `fmt ` chunk GUID.
    pub const FMT_GUID: [u8; 16] = [
        0x66, 0x6D, 0x74, 0x20, 0xF3, 0xAC, 0xD3, 0x11, 0x8C, 0xD1, 0x00, 0xC0, 0x4F, 0x8E, 0xDB,
        0x8A,
    ];

    /// `data` chunk GUID.
    pub const DATA_GUID: [u8; 16] = [
        0x64, 0x61, 0x74, 0x61, 0xF3, 0xAC, 0xD3, 0x11, 0x8C, 0xD1, 0x00, 0xC0, 0x4F, 0x8E, 0xDB,
        0x8A,
    ];
}

/// WAVE format tags written in the `fmt ` chunk.
pub mod format_code {
    /// Integer PCM.
    pub const PCM: u16 = 1;
    /// IEEE floating point.
    pub const IEEE_FLOAT: u16 = 3;
    /// ITU G.711 A-law.
    pub const A_LAW: u16 = 6;
    /// ITU G.711 µ-law.
    pub const MU_LAW: u16 = 7;
}

/// Terminal status strings reported in the summary.
pub mod status {
    /// Status of a successful extraction.
    pub const SUCCESS: &str = "success";
    /// More than one audio stream in the container.
    pub const MULTIPLE_AUDIO_TRACKS: &str = "Multiple audio tracks found.";
    /// No audio stream in the container.
    pub const NO_AUDIO_TRACK: &str = "No audio track found.";
    /// Extraction interrupted by the user.
    pub const INTERRUPTED: &str = "Extraction interrupted.";
}
