// Copyright 2026 The av1e-core Authors
// Use of this source code is governed by a BSD-3-Clause license that can be
// found in the LICENSE file.

//! Session configuration (§6). Parsing config from a file or CLI is out of
//! scope; callers hand in an already-populated [`EncoderConfig`].

use crate::error::{ConfigError, ConfigResult};

pub const MAX_HIERARCHICAL_LEVELS: u8 = 5;
pub const MAX_TILE_LOG2: u8 = 6;
pub const MAX_TILE_PRODUCT: u32 = 128;
/// Hard cap on look-ahead distance regardless of requested value.
pub const MAX_LAD: u32 = 256;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RateControlMode {
    /// Constant/constrained QP.
    Cqp,
    Vbr,
    /// §6: capped VBR is silently remapped to VBR in this branch (see
    /// DESIGN.md open-question decision).
    CappedVbr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SuperresMode {
    Off,
    Fixed,
    Random,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorFormat {
    Yuv420,
    Yuv422,
    Yuv444,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    /// 10-bit "compressed": 8 MSBs in the plane, 2 LSBs packed 4-per-byte
    /// in an extension plane.
    TenCompressed,
    /// 10-bit "unpacked": 16-bit little-endian planes.
    TenUnpacked,
}

impl BitDepth {
    pub fn bits(self) -> u8 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::TenCompressed | BitDepth::TenUnpacked => 10,
        }
    }
}

/// −1 means "auto from preset" for the many toggles that default to it.
pub const AUTO: i32 = -1;

#[derive(Clone, Debug)]
pub struct EncoderConfig {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub color_format: ColorFormat,

    /// 0 = best quality .. 13 = fastest. Drives every feature-level table.
    pub enc_mode: u8,
    pub hierarchical_levels: u8,
    /// -2 auto (~1s), -1 auto per RC mode, or explicit frame count.
    pub intra_period_length: i32,
    pub rate_control_mode: RateControlMode,
    pub qp: u8,
    pub target_bitrate_bps: u32,

    pub look_ahead_distance: u32,
    pub tile_rows_log2: u8,
    pub tile_columns_log2: u8,

    /// -1 auto, or 0..6.
    pub tf_level: i32,
    pub superres_mode: SuperresMode,
    pub two_pass: bool,

    pub logical_processors: u32,
    pub target_socket: i32,
    pub unpin: bool,

    pub screen_content_mode: bool,
    pub enable_tpl: bool,
    /// 0 none, 1 forced recurring intra refresh, 2 first-pass style.
    pub intra_refresh_type: u8,
    pub recon_enabled: bool,
    pub rc_firstpass_stats_out: bool,

    /// -1 auto from preset, 0..2 otherwise.
    pub prehme_level: i32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            bit_depth: BitDepth::Eight,
            color_format: ColorFormat::Yuv420,
            enc_mode: 8,
            hierarchical_levels: 3,
            intra_period_length: -2,
            rate_control_mode: RateControlMode::Cqp,
            qp: 35,
            target_bitrate_bps: 8_000_000,
            look_ahead_distance: 40,
            tile_rows_log2: 0,
            tile_columns_log2: 0,
            tf_level: AUTO,
            superres_mode: SuperresMode::Off,
            two_pass: false,
            logical_processors: 0,
            target_socket: -1,
            unpin: false,
            screen_content_mode: false,
            enable_tpl: true,
            intra_refresh_type: 1,
            recon_enabled: false,
            rc_firstpass_stats_out: false,
            prehme_level: AUTO,
        }
    }
}

impl EncoderConfig {
    /// Validate against §6's rejection rules. Returns the first violated
    /// rule; does not attempt to collect every violation.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width < 64 || self.height < 64 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }

        if self.qp > 63 {
            return Err(ConfigError::QpOutOfRange(self.qp));
        }

        if self.hierarchical_levels > MAX_HIERARCHICAL_LEVELS {
            return Err(ConfigError::HierarchicalLevelsOutOfRange(
                self.hierarchical_levels,
            ));
        }

        match self.rate_control_mode {
            RateControlMode::Cqp => {
                if self.intra_period_length < -2 {
                    return Err(ConfigError::InvalidIntraPeriod(
                        self.intra_period_length,
                        self.rate_control_mode,
                    ));
                }
            }
            RateControlMode::Vbr | RateControlMode::CappedVbr => {
                if self.intra_period_length < -1 {
                    return Err(ConfigError::InvalidIntraPeriod(
                        self.intra_period_length,
                        self.rate_control_mode,
                    ));
                }
            }
        }

        if self.tile_rows_log2 > MAX_TILE_LOG2 || self.tile_columns_log2 > MAX_TILE_LOG2 {
            return Err(ConfigError::TileCountOutOfRange {
                rows: self.tile_rows_log2,
                cols: self.tile_columns_log2,
            });
        }
        let tile_product = 1u32 << (self.tile_rows_log2 as u32 + self.tile_columns_log2 as u32);
        if tile_product > MAX_TILE_PRODUCT {
            return Err(ConfigError::TileCountOutOfRange {
                rows: self.tile_rows_log2,
                cols: self.tile_columns_log2,
            });
        }

        if self.superres_mode != SuperresMode::Off && self.two_pass {
            return Err(ConfigError::SuperresIn2Pass);
        }

        match self.bit_depth {
            BitDepth::Eight => {}
            BitDepth::TenCompressed | BitDepth::TenUnpacked => {
                if self.width % 4 != 0 {
                    return Err(ConfigError::ProfileMismatch(
                        "10-bit compressed extension plane requires width divisible by 4",
                    ));
                }
            }
        }

        Ok(())
    }

    /// Effective look-ahead distance: capped to mini-GOP multiples and to
    /// [`MAX_LAD`] (§6).
    pub fn effective_look_ahead_distance(&self) -> u32 {
        let mini_gop = 1u32 << self.hierarchical_levels;
        let capped = self.look_ahead_distance.min(MAX_LAD);
        (capped / mini_gop).max(1) * mini_gop
    }

    pub fn mini_gop_size(&self) -> u32 {
        1u32 << self.hierarchical_levels
    }

    /// Two-pass, pass 1 forces enc_mode to the fastest preset, disables
    /// look-ahead and TPL, and selects first-pass-style intra refresh
    /// (§8 scenario 5).
    pub fn as_first_pass(&self) -> Self {
        let mut cfg = self.clone();
        cfg.enc_mode = 13;
        cfg.look_ahead_distance = 0;
        cfg.enable_tpl = false;
        cfg.intra_refresh_type = 2;
        cfg.rc_firstpass_stats_out = true;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EncoderConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_odd_resolution() {
        let mut cfg = EncoderConfig::default();
        cfg.width = 321;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidResolution {
                width: 321,
                height: cfg.height
            })
        );
    }

    #[test]
    fn rejects_qp_out_of_range() {
        let mut cfg = EncoderConfig::default();
        cfg.qp = 64;
        assert_eq!(cfg.validate(), Err(ConfigError::QpOutOfRange(64)));
    }

    #[test]
    fn rejects_hierarchical_levels_out_of_range() {
        let mut cfg = EncoderConfig::default();
        cfg.hierarchical_levels = 6;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::HierarchicalLevelsOutOfRange(6))
        );
    }

    #[test]
    fn rejects_superres_with_two_pass() {
        let mut cfg = EncoderConfig::default();
        cfg.superres_mode = SuperresMode::Fixed;
        cfg.two_pass = true;
        assert_eq!(cfg.validate(), Err(ConfigError::SuperresIn2Pass));
    }

    #[test]
    fn look_ahead_caps_to_mini_gop_multiple() {
        let mut cfg = EncoderConfig::default();
        cfg.hierarchical_levels = 3; // mini-GOP 8
        cfg.look_ahead_distance = 10;
        assert_eq!(cfg.effective_look_ahead_distance(), 8);
    }

    #[test]
    fn look_ahead_caps_to_max_lad() {
        let mut cfg = EncoderConfig::default();
        cfg.hierarchical_levels = 0;
        cfg.look_ahead_distance = 10_000;
        assert_eq!(cfg.effective_look_ahead_distance(), MAX_LAD);
    }

    #[test]
    fn first_pass_forces_fastest_preset() {
        let cfg = EncoderConfig::default().as_first_pass();
        assert_eq!(cfg.enc_mode, 13);
        assert_eq!(cfg.look_ahead_distance, 0);
        assert!(!cfg.enable_tpl);
        assert!(cfg.rc_firstpass_stats_out);
    }
}
